//! # Docking Graph
//!
//! Rigid attachments between objects. Each object keeps a list of live
//! dock links and a list of dead ones (kept after undocking for cleanup).
//! Links are always stored on both ends.
//!
//! ## Propagation
//!
//! Once per tick, every object's motion is pushed to everything docked to
//! it, transitively. The `DOCKED_ALREADY_HANDLED` flag guards the walk so
//! each object moves at most once per tick, even in a cycle. The reap step
//! clears the flag at the start of every tick.
//!
//! ```text
//!   A ── B ── C        propagate(A): B, C follow A
//!   │         │        propagate(B): nothing, B already handled
//!   └─────────┘
//! ```

use orbital_shared::Vec3;

use crate::collab::DockAi;
use crate::error::{ObjectError, ObjectResult};
use crate::object::{DockLink, ObjectFlags, ObjectHandle, ObjectRecord};
use crate::pool::ObjectPool;

/// How docked children follow their parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DockMode {
    /// Gameplay: each object moves once per tick; objects in their final
    /// undock phase are not dragged along.
    Simulation,
    /// Mission editor: every docked object is re-snapped to its parent.
    Editor,
}

/// Dock propagation with reusable scratch storage.
#[derive(Debug, Default)]
pub struct DockingGraph {
    worklist: Vec<usize>,
    visited: Vec<usize>,
}

impl DockingGraph {
    /// Creates an empty graph walker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves everything docked to `root`, transitively, to follow it.
    ///
    /// # Returns
    ///
    /// Number of objects repositioned.
    pub fn propagate(
        &mut self,
        pool: &mut ObjectPool,
        root: usize,
        ai: &dyn DockAi,
        mode: DockMode,
    ) -> usize {
        let Some(record) = pool.get_mut(root) else {
            return 0;
        };
        if record.dock_list.is_empty() {
            return 0;
        }

        self.worklist.clear();
        self.visited.clear();
        match mode {
            DockMode::Simulation => {
                if record.has_flag(ObjectFlags::DOCKED_ALREADY_HANDLED) {
                    return 0;
                }
                record.flags.insert(ObjectFlags::DOCKED_ALREADY_HANDLED);
            }
            DockMode::Editor => self.visited.push(root),
        }
        self.worklist.push(root);

        let mut moved = 0;
        while let Some(parent) = self.worklist.pop() {
            let link_count = pool.get(parent).map_or(0, |r| r.dock_list.len());
            for i in 0..link_count {
                let Some((child, link)) = Self::live_link(pool, parent, i) else {
                    continue;
                };

                let follows = match mode {
                    DockMode::Simulation => {
                        let Some(record) = pool.get_mut(child) else {
                            continue;
                        };
                        if record.has_flag(ObjectFlags::DOCKED_ALREADY_HANDLED) {
                            continue;
                        }
                        record.flags.insert(ObjectFlags::DOCKED_ALREADY_HANDLED);
                        !Self::undocking_from(pool, ai, child, parent)
                    }
                    DockMode::Editor => {
                        if self.visited.contains(&child) {
                            continue;
                        }
                        self.visited.push(child);
                        true
                    }
                };

                if follows {
                    Self::snap_to_parent(pool, parent, child, &link);
                    moved += 1;
                }
                self.worklist.push(child);
            }
        }
        moved
    }

    fn live_link(pool: &ObjectPool, parent: usize, i: usize) -> Option<(usize, DockLink)> {
        let link = *pool.get(parent)?.dock_list.get(i)?;
        let child = link.other.slot();
        (pool.is_live(child) && pool.get(child)?.signature == link.other.signature())
            .then_some((child, link))
    }

    fn undocking_from(pool: &ObjectPool, ai: &dyn DockAi, child: usize, parent: usize) -> bool {
        let (Some(c), Some(p)) = (pool.get(child), pool.get(parent)) else {
            return false;
        };
        ai.undocking_goal(c) == Some(parent) || ai.undocking_goal(p) == Some(child)
    }

    fn snap_to_parent(pool: &mut ObjectPool, parent: usize, child: usize, link: &DockLink) {
        let Some((p, c)) = pool.pair_mut(parent, child) else {
            return;
        };
        c.position = p.position + p.orientation.unrotate(link.offset);
        c.orientation = link.relative_orientation * p.orientation;
    }

    // =========================================================================
    // Link management
    // =========================================================================

    fn link_between(
        from: &ObjectRecord,
        to: &ObjectRecord,
        dockpoint: i32,
        other_dockpoint: i32,
    ) -> DockLink {
        DockLink {
            other: to.handle(),
            dockpoint,
            other_dockpoint,
            offset: from.orientation.rotate(to.position - from.position),
            relative_orientation: to.orientation * from.orientation.transpose(),
        }
    }

    fn live_pair(
        pool: &mut ObjectPool,
        a: usize,
        b: usize,
    ) -> ObjectResult<(&mut ObjectRecord, &mut ObjectRecord)> {
        for slot in [a, b] {
            if !pool.is_live(slot) {
                return Err(ObjectError::InvalidSlot {
                    slot,
                    capacity: pool.capacity(),
                });
            }
        }
        pool.pair_mut(a, b)
            .ok_or(ObjectError::AlreadyDocked { a, b })
    }

    /// Docks `a` to `b` at the given dock points, capturing their current
    /// relative pose.
    ///
    /// # Errors
    ///
    /// [`ObjectError::InvalidSlot`] if either object is not live;
    /// [`ObjectError::AlreadyDocked`] if they are already docked (or `a == b`).
    pub fn dock(
        pool: &mut ObjectPool,
        a: usize,
        b: usize,
        a_dockpoint: i32,
        b_dockpoint: i32,
    ) -> ObjectResult<()> {
        let (ra, rb) = Self::live_pair(pool, a, b)?;
        if Self::docked_with(ra, b) {
            return Err(ObjectError::AlreadyDocked { a, b });
        }

        let ab = Self::link_between(ra, rb, a_dockpoint, b_dockpoint);
        let ba = Self::link_between(rb, ra, b_dockpoint, a_dockpoint);
        ra.dock_list.push(ab);
        rb.dock_list.push(ba);
        ra.flags.remove(ObjectFlags::DOCKED_ALREADY_HANDLED);
        rb.flags.remove(ObjectFlags::DOCKED_ALREADY_HANDLED);

        tracing::debug!(a, b, a_dockpoint, b_dockpoint, "objects docked");
        Ok(())
    }

    /// Breaks the dock between `a` and `b`, moving both links to the dead
    /// lists.
    ///
    /// # Errors
    ///
    /// [`ObjectError::InvalidSlot`] if either object is not live;
    /// [`ObjectError::NotDocked`] if they are not docked.
    pub fn undock(pool: &mut ObjectPool, a: usize, b: usize) -> ObjectResult<()> {
        let (ra, rb) = Self::live_pair(pool, a, b)?;
        let (Some(ab), Some(ba)) = (
            Self::take_link(&mut ra.dock_list, rb.handle()),
            Self::take_link(&mut rb.dock_list, ra.handle()),
        ) else {
            return Err(ObjectError::NotDocked { a, b });
        };
        ra.dead_dock_list.push(ab);
        rb.dead_dock_list.push(ba);
        ra.flags.remove(ObjectFlags::DOCKED_ALREADY_HANDLED);
        rb.flags.remove(ObjectFlags::DOCKED_ALREADY_HANDLED);

        tracing::debug!(a, b, "objects undocked");
        Ok(())
    }

    /// Drops the dead-dock links between `a` and `b`.
    ///
    /// # Errors
    ///
    /// [`ObjectError::InvalidSlot`] if either object is not live;
    /// [`ObjectError::NotDocked`] if neither holds a dead link to the other.
    pub fn dead_undock(pool: &mut ObjectPool, a: usize, b: usize) -> ObjectResult<()> {
        let (ra, rb) = Self::live_pair(pool, a, b)?;
        let removed_a = Self::take_link(&mut ra.dead_dock_list, rb.handle()).is_some();
        let removed_b = Self::take_link(&mut rb.dead_dock_list, ra.handle()).is_some();
        if removed_a || removed_b {
            Ok(())
        } else {
            Err(ObjectError::NotDocked { a, b })
        }
    }

    fn take_link(list: &mut Vec<DockLink>, other: ObjectHandle) -> Option<DockLink> {
        let index = list.iter().position(|link| link.other == other)?;
        Some(list.remove(index))
    }

    /// Releases every live dock link of `slot`, on both ends.
    pub fn free_dock_list(pool: &mut ObjectPool, slot: usize) {
        Self::free_links(pool, slot, false);
    }

    /// Releases every dead dock link of `slot`, on both ends.
    pub fn free_dead_dock_list(pool: &mut ObjectPool, slot: usize) {
        Self::free_links(pool, slot, true);
    }

    fn free_links(pool: &mut ObjectPool, slot: usize, dead: bool) {
        let Some(record) = pool.get_mut(slot) else {
            return;
        };
        let handle = record.handle();
        let links = if dead {
            std::mem::take(&mut record.dead_dock_list)
        } else {
            std::mem::take(&mut record.dock_list)
        };

        for link in links {
            let other = link.other.slot();
            let Some(partner) = pool.get_mut(other) else {
                continue;
            };
            if partner.signature != link.other.signature() {
                continue;
            }
            let list = if dead {
                &mut partner.dead_dock_list
            } else {
                &mut partner.dock_list
            };
            Self::take_link(list, handle);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// True if `object` has any live dock link.
    #[must_use]
    pub fn is_docked(object: &ObjectRecord) -> bool {
        !object.dock_list.is_empty()
    }

    /// True if `object` has any dead dock link.
    #[must_use]
    pub fn is_dead_docked(object: &ObjectRecord) -> bool {
        !object.dead_dock_list.is_empty()
    }

    /// True if `object` is docked directly to the object in `other`.
    #[must_use]
    pub fn docked_with(object: &ObjectRecord, other: usize) -> bool {
        object.dock_list.iter().any(|link| link.other.slot() == other)
    }

    /// Number of objects directly docked to `object`.
    #[must_use]
    pub fn dock_count(object: &ObjectRecord) -> usize {
        object.dock_list.len()
    }

    /// Object docked at `dockpoint` on `object`.
    #[must_use]
    pub fn find_docked_by_point(object: &ObjectRecord, dockpoint: i32) -> Option<ObjectHandle> {
        object
            .dock_list
            .iter()
            .find(|link| link.dockpoint == dockpoint)
            .map(|link| link.other)
    }

    /// Position `other` would have if snapped to `object` through their link.
    #[must_use]
    pub fn docked_position(object: &ObjectRecord, other: usize) -> Option<Vec3> {
        object
            .dock_list
            .iter()
            .find(|link| link.other.slot() == other)
            .map(|link| object.position + object.orientation.unrotate(link.offset))
    }
}
