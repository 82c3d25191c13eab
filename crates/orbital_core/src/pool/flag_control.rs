//! Controlled flag mutation.
//!
//! `COLLIDES` and `NOT_IN_COLL` must agree with the collision subsystem's
//! view of the object, so they only change here, in lockstep with
//! registration.

use crate::config::NetworkRole;
use crate::diagnostics;
use crate::error::{ObjectError, ObjectResult};
use crate::memory::ListId;
use crate::object::{ObjectFlags, ObjectKind};

use super::ObjectPool;

impl ObjectPool {
    /// Replaces the object's flags, keeping collision registration in sync.
    ///
    /// `NOT_IN_COLL` in `new_flags` is ignored; the pool owns that bit.
    ///
    /// # Errors
    ///
    /// - [`ObjectError::InvalidSlot`] out of range.
    /// - [`ObjectError::IllegalFlagTransition`] (fatal) when turning on
    ///   collision for an observer, or when a server marks anything other
    ///   than an instanced ship as a possible player.
    pub fn set_flags(&mut self, slot: usize, new_flags: ObjectFlags) -> ObjectResult<()> {
        self.check_slot(slot)?;
        let record = &self.records[slot];
        let old = record.flags;
        let kind = record.kind;

        if new_flags.contains(ObjectFlags::COULD_BE_PLAYER)
            && !old.contains(ObjectFlags::COULD_BE_PLAYER)
            && self.config.network_role == NetworkRole::Server
            && (kind != ObjectKind::Ship || record.instance_index.is_none())
        {
            return Err(diagnostics::report(
                self.invariant_policy(),
                ObjectError::IllegalFlagTransition {
                    slot,
                    kind,
                    reason: "only an instanced ship can be a player",
                },
            ));
        }

        let was_colliding = old.contains(ObjectFlags::COLLIDES);
        let will_collide = new_flags.contains(ObjectFlags::COLLIDES);
        let requested = new_flags.without(ObjectFlags::NOT_IN_COLL);

        match (was_colliding, will_collide) {
            (true, false) => {
                self.remove_collider(slot);
                self.records[slot].flags = requested | ObjectFlags::NOT_IN_COLL;
            }
            (false, true) => {
                if kind == ObjectKind::Observer {
                    return Err(diagnostics::report(
                        self.invariant_policy(),
                        ObjectError::IllegalFlagTransition {
                            slot,
                            kind,
                            reason: "observers cannot collide",
                        },
                    ));
                }
                self.records[slot].flags = requested | ObjectFlags::NOT_IN_COLL;
                // Pending objects register at merge.
                if self.lists.list_of(slot) == ListId::Used {
                    self.add_collider(slot);
                }
            }
            _ => {
                let registration = if old.contains(ObjectFlags::NOT_IN_COLL) {
                    ObjectFlags::NOT_IN_COLL
                } else {
                    ObjectFlags::EMPTY
                };
                self.records[slot].flags = requested | registration;
            }
        }

        tracing::trace!(slot, from = old.0, to = self.records[slot].flags.0, "flags changed");
        Ok(())
    }

    /// Turns collision on or off through [`Self::set_flags`].
    ///
    /// # Errors
    ///
    /// As [`Self::set_flags`].
    pub fn set_collides(&mut self, slot: usize, collides: bool) -> ObjectResult<()> {
        self.check_slot(slot)?;
        let mut flags = self.records[slot].flags.without(ObjectFlags::NOT_IN_COLL);
        flags.set(ObjectFlags::COLLIDES, collides);
        self.set_flags(slot, flags)
    }
}
