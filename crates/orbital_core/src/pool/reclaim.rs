//! Pressure-driven slot reclamation.
//!
//! When the pool is nearly full, low-value objects are marked
//! should-be-dead in the configured stage order until enough slots would
//! come free at the next reap. Nothing is freed here.

use crate::config::ReclaimStage;
use crate::memory::ListId;
use crate::object::{ObjectFlags, ObjectKind};

use super::ObjectPool;

impl ObjectPool {
    /// Marks objects should-be-dead until at most `target_used` would
    /// remain live after the next reap.
    ///
    /// Slots already free, already marked, or holding no object count
    /// toward the goal. Only debris, fireballs and weapons are candidates,
    /// and no more than that many are ever marked.
    ///
    /// # Returns
    ///
    /// Number of objects newly marked.
    pub fn reclaim(&mut self, target_used: usize) -> usize {
        let capacity = self.capacity();
        let mut already_free = self.lists.len(ListId::Free);
        if capacity - already_free < target_used {
            return 0;
        }
        self.stats.reclaim_passes += 1;

        let mut candidates = 0;
        for slot in self.lists.iter(ListId::Used) {
            let record = &self.records[slot];
            if record.should_be_dead() || record.kind == ObjectKind::None {
                already_free += 1;
            } else if matches!(
                record.kind,
                ObjectKind::Fireball | ObjectKind::Weapon | ObjectKind::Debris
            ) {
                candidates += 1;
            }
        }

        let mut remaining = (capacity - target_used).saturating_sub(already_free);
        if remaining == 0 {
            return 0;
        }
        if remaining > candidates {
            tracing::warn!(
                wanted = remaining,
                candidates,
                "not enough reclaimable objects"
            );
            remaining = candidates;
        }

        let mut marked = 0;
        for i in 0..self.config.reclaim_order.len() {
            if remaining == 0 {
                break;
            }
            let stage = self.config.reclaim_order[i];
            let n = match stage {
                ReclaimStage::ExpiringDebris => {
                    self.mark_where(remaining, |kind, flags| {
                        kind == ObjectKind::Debris && flags.contains(ObjectFlags::RECLAIMABLE)
                    })
                }
                ReclaimStage::PerishableFireballs => {
                    self.mark_where(remaining, |kind, flags| {
                        kind == ObjectKind::Fireball && flags.contains(ObjectFlags::RECLAIMABLE)
                    })
                }
                ReclaimStage::StaleWeapons => self
                    .collision
                    .remove_expired_weapons(&mut self.records)
                    .min(remaining),
                ReclaimStage::Weapons => {
                    self.mark_where(remaining, |kind, _| kind == ObjectKind::Weapon)
                }
            };
            tracing::debug!(?stage, marked = n, "reclaim stage");
            remaining -= n;
            marked += n;
        }

        self.stats.reclaimed += marked as u64;
        marked
    }

    /// Marks up to `limit` used objects matching `pred`, front to back.
    fn mark_where(
        &mut self,
        limit: usize,
        pred: impl Fn(ObjectKind, ObjectFlags) -> bool,
    ) -> usize {
        let mut marked = 0;
        let mut cursor = self.lists.first(ListId::Used);
        while let Some(slot) = cursor {
            if marked == limit {
                break;
            }
            cursor = self.lists.next(slot);
            let record = &mut self.records[slot];
            if !record.should_be_dead() && pred(record.kind, record.flags) {
                record.mark_should_be_dead();
                marked += 1;
            }
        }
        marked
    }
}
