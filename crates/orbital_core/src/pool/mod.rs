//! # Object Pool
//!
//! Fixed-capacity storage for every world object.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ records: [ObjectRecord; capacity]   (never reallocated)  │
//! ├──────────────────────────────────────────────────────────┤
//! │ lists:   free ⇄ pending ⇄ used      (index-linked)       │
//! └──────────────────────────────────────────────────────────┘
//!
//!   allocate: free ──► pending     merge_pending: pending ──► used
//!   free:     pending/used ──► free
//! ```
//!
//! Objects created during a tick wait on the pending list and join the used
//! list, and the collision set, at the start of the next tick.
//!
//! ## Identity
//!
//! Slots are reused; signatures are not. Hold an [`ObjectHandle`] and
//! [`ObjectPool::resolve`] it rather than caching a bare slot.

mod flag_control;
mod reclaim;

use orbital_shared::{Matrix3, Vec3};

use crate::collab::{CollisionGateway, PhysicsIntegrator};
use crate::config::PoolConfig;
use crate::diagnostics::{self, InvariantPolicy};
use crate::dispatch::TypeDispatchTable;
use crate::dock::DockingGraph;
use crate::error::{ObjectError, ObjectResult};
use crate::memory::{ListId, SlotLists};
use crate::object::{ObjectFlags, ObjectHandle, ObjectKind, ObjectRecord, PhysicsState, Signature};

/// What `delete` did with the object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Slot released.
    Freed,
    /// Player ship turned into a ghost; slot still live.
    Ghosted,
    /// Slot was already free; nothing happened.
    AlreadyFree,
    /// Single-player ghost kept alive; should-be-dead cleared.
    Refused,
}

/// Lifetime counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Objects created.
    pub created: u64,
    /// Objects deleted and freed.
    pub deleted: u64,
    /// Player ships turned into ghosts.
    pub ghosted: u64,
    /// Reclamation passes run.
    pub reclaim_passes: u64,
    /// Objects marked should-be-dead by reclamation.
    pub reclaimed: u64,
    /// Largest live count seen.
    pub high_water_mark: usize,
}

/// Parameters for [`ObjectPool::create`].
///
/// # Example
///
/// ```rust,ignore
/// let spawn = SpawnParams::new(ObjectKind::Weapon)
///     .parent(ship_slot)
///     .at(muzzle)
///     .flags(ObjectFlags::COLLIDES);
/// let slot = pool.create(&spawn)?;
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnParams {
    /// Kind of the new object.
    pub kind: ObjectKind,
    /// Creating object, if any.
    pub parent: Option<usize>,
    /// Index into the owning collaborator's table.
    pub instance_index: Option<usize>,
    /// Starting orientation; identity if unset.
    pub orientation: Option<Matrix3>,
    /// Starting position; origin if unset.
    pub position: Option<Vec3>,
    /// Bounding radius.
    pub radius: f32,
    /// Initial flags.
    pub flags: ObjectFlags,
}

impl SpawnParams {
    /// Defaults for `kind`: no parent, origin, identity, zero radius.
    #[must_use]
    pub const fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            parent: None,
            instance_index: None,
            orientation: None,
            position: None,
            radius: 0.0,
            flags: ObjectFlags::EMPTY,
        }
    }

    /// Sets the parent slot.
    #[must_use]
    pub const fn parent(mut self, slot: usize) -> Self {
        self.parent = Some(slot);
        self
    }

    /// Sets the instance index.
    #[must_use]
    pub const fn instance(mut self, index: usize) -> Self {
        self.instance_index = Some(index);
        self
    }

    /// Sets the position.
    #[must_use]
    pub const fn at(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    /// Sets the orientation.
    #[must_use]
    pub const fn oriented(mut self, orientation: Matrix3) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Sets the radius.
    #[must_use]
    pub const fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the initial flags.
    #[must_use]
    pub const fn flags(mut self, flags: ObjectFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Fixed-capacity object storage with free/used/pending membership.
pub struct ObjectPool {
    records: Box<[ObjectRecord]>,
    lists: SlotLists,
    collision: Box<dyn CollisionGateway>,
    config: PoolConfig,
    /// Next signature to hand out. Never reset.
    next_signature: u64,
    live_count: usize,
    highest_index: Option<usize>,
    highest_ever_index: Option<usize>,
    player_slot: Option<usize>,
    viewer_slot: Option<usize>,
    stats: PoolStats,
}

impl std::fmt::Debug for ObjectPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("capacity", &self.capacity())
            .field("live", &self.live_count)
            .field("highest_index", &self.highest_index)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl ObjectPool {
    /// Creates a pool with every slot free.
    ///
    /// # Errors
    ///
    /// [`ObjectError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: PoolConfig, collision: Box<dyn CollisionGateway>) -> ObjectResult<Self> {
        config.validate()?;

        let capacity = config.capacity;
        let mut pool = Self {
            records: (0..capacity).map(ObjectRecord::empty).collect(),
            lists: SlotLists::new(capacity),
            collision,
            config,
            next_signature: 1,
            live_count: 0,
            highest_index: None,
            highest_ever_index: None,
            player_slot: None,
            viewer_slot: None,
            stats: PoolStats::default(),
        };
        pool.collision.reset_all();

        tracing::info!(capacity, "object pool initialized");
        Ok(pool)
    }

    /// Returns every slot to the free list for a new mission.
    ///
    /// Signatures keep counting, so handles from the previous mission never
    /// resolve to new objects.
    pub fn reset(&mut self) {
        self.clear_slots();
        tracing::info!(
            next_signature = self.next_signature,
            "object pool reset"
        );
    }

    /// Tears down every object's transient state at exit.
    pub fn shutdown(&mut self) {
        self.clear_slots();
        self.stats = PoolStats::default();
        tracing::info!("object pool shut down");
    }

    fn clear_slots(&mut self) {
        for record in self.records.iter_mut() {
            record.clear();
        }
        self.lists.reset();
        self.collision.reset_all();
        self.live_count = 0;
        self.highest_index = None;
        self.highest_ever_index = None;
        self.player_slot = None;
        self.viewer_slot = None;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// Objects on the used and pending lists.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Objects on the used list.
    #[inline]
    #[must_use]
    pub const fn used_count(&self) -> usize {
        self.lists.len(ListId::Used)
    }

    /// Objects waiting to be merged.
    #[inline]
    #[must_use]
    pub const fn pending_count(&self) -> usize {
        self.lists.len(ListId::Pending)
    }

    /// Free slots.
    #[inline]
    #[must_use]
    pub const fn free_count(&self) -> usize {
        self.lists.len(ListId::Free)
    }

    /// Highest slot currently live.
    #[inline]
    #[must_use]
    pub const fn highest_index(&self) -> Option<usize> {
        self.highest_index
    }

    /// Highest slot live at any point since the last reset.
    #[inline]
    #[must_use]
    pub const fn highest_ever_index(&self) -> Option<usize> {
        self.highest_ever_index
    }

    /// Lifetime counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Policy for contract violations.
    #[inline]
    #[must_use]
    pub const fn invariant_policy(&self) -> InvariantPolicy {
        self.config.invariant_policy
    }

    /// List `slot` is on.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    #[must_use]
    pub fn list_of(&self, slot: usize) -> ListId {
        self.lists.list_of(slot)
    }

    /// True if `slot` is in range and holds a live object.
    #[must_use]
    pub fn is_live(&self, slot: usize) -> bool {
        slot < self.capacity() && self.lists.list_of(slot) != ListId::Free
    }

    /// Every record, free slots included.
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[ObjectRecord] {
        &self.records
    }

    /// Record in `slot`, free or not.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&ObjectRecord> {
        self.records.get(slot)
    }

    /// Mutable record in `slot`, free or not.
    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut ObjectRecord> {
        self.records.get_mut(slot)
    }

    /// Two distinct records at once.
    pub fn pair_mut(
        &mut self,
        a: usize,
        b: usize,
    ) -> Option<(&mut ObjectRecord, &mut ObjectRecord)> {
        if a == b || a >= self.records.len() || b >= self.records.len() {
            return None;
        }
        if a < b {
            let (low, high) = self.records.split_at_mut(b);
            Some((&mut low[a], &mut high[0]))
        } else {
            let (low, high) = self.records.split_at_mut(a);
            Some((&mut high[0], &mut low[b]))
        }
    }

    /// Handle to the live object in `slot`.
    #[must_use]
    pub fn handle(&self, slot: usize) -> Option<ObjectHandle> {
        self.is_live(slot).then(|| self.records[slot].handle())
    }

    /// Slot a handle still points at.
    ///
    /// # Errors
    ///
    /// [`ObjectError::StaleHandle`] if the object was deleted or the slot
    /// reused.
    pub fn resolve(&self, handle: ObjectHandle) -> ObjectResult<usize> {
        let slot = handle.slot();
        match self.records.get(slot) {
            Some(record) if !handle.is_null() && record.signature == handle.signature() => {
                Ok(slot)
            }
            _ => Err(ObjectError::StaleHandle),
        }
    }

    /// Live object with this signature, by linear search of the used list.
    #[must_use]
    pub fn find_by_signature(&self, signature: Signature) -> Option<usize> {
        if signature.is_none() {
            return None;
        }
        self.lists
            .iter(ListId::Used)
            .find(|&slot| self.records[slot].signature == signature)
    }

    /// Parent slot, if the parent is still the object recorded at creation.
    #[must_use]
    pub fn parent_of(&self, slot: usize) -> Option<usize> {
        let record = self.records.get(slot)?;
        let parent = record.parent_slot;
        (parent != slot
            && !record.parent_signature.is_none()
            && self.records.get(parent)?.signature == record.parent_signature)
            .then_some(parent)
    }

    /// Used slots in list order.
    pub fn used_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.lists.iter(ListId::Used)
    }

    /// Pending slots in creation order.
    pub fn pending_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.lists.iter(ListId::Pending)
    }

    /// First slot on the used list, for cursor walks that mutate the pool.
    #[inline]
    #[must_use]
    pub fn first_used(&self) -> Option<usize> {
        self.lists.first(ListId::Used)
    }

    /// Slot after `slot` on its list. Read before mutating `slot`.
    #[inline]
    #[must_use]
    pub fn next_in_list(&self, slot: usize) -> Option<usize> {
        self.lists.next(slot)
    }

    /// Visits every used slot in list order with mutable access to the pool.
    ///
    /// The successor is read before `f` runs, so `f` may free or move the
    /// slot it is handed. It must not free any other used slot.
    pub fn for_each_used(&mut self, mut f: impl FnMut(&mut Self, usize)) {
        let mut cursor = self.first_used();
        while let Some(slot) = cursor {
            cursor = self.next_in_list(slot);
            f(self, slot);
        }
    }

    /// Re-initialises the physics of every used ship through `physics`.
    ///
    /// Pending ships are left alone; they start from a fresh record anyway.
    ///
    /// # Returns
    ///
    /// Number of ships re-initialised.
    pub fn init_all_ship_physics(&mut self, physics: &mut dyn PhysicsIntegrator) -> usize {
        let mut count = 0;
        let mut cursor = self.first_used();
        while let Some(slot) = cursor {
            cursor = self.next_in_list(slot);
            let record = &mut self.records[slot];
            if record.kind == ObjectKind::Ship {
                physics.init_ship(&mut record.physics);
                count += 1;
            }
        }
        tracing::debug!(count, "ship physics re-initialised");
        count
    }

    /// Mean position of live objects of `kind`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_position(&self, kind: ObjectKind) -> Option<Vec3> {
        let (sum, count) = self
            .used_slots()
            .map(|slot| &self.records[slot])
            .filter(|r| r.kind == kind)
            .fold((Vec3::ZERO, 0_u32), |(sum, n), r| (sum + r.position, n + 1));
        (count > 0).then(|| sum * (1.0 / count as f32))
    }

    /// Slot of the local player's ship.
    #[inline]
    #[must_use]
    pub const fn player_slot(&self) -> Option<usize> {
        self.player_slot
    }

    /// Designates the local player's ship.
    pub fn set_player_slot(&mut self, slot: Option<usize>) {
        self.player_slot = slot;
    }

    /// Slot the camera follows.
    #[inline]
    #[must_use]
    pub const fn viewer_slot(&self) -> Option<usize> {
        self.viewer_slot
    }

    /// Sets the slot the camera follows.
    pub fn set_viewer_slot(&mut self, slot: Option<usize>) {
        self.viewer_slot = slot;
    }

    /// Drops every move listener. Called when the scripting runtime is torn
    /// down, since listeners may hold script state.
    pub fn clear_all_listeners(&mut self) {
        for record in self.records.iter_mut() {
            record.pre_move_event.clear();
            record.post_move_event.clear();
        }
        tracing::debug!("object move listeners cleared");
    }

    /// Collision gateway.
    #[must_use]
    pub fn collision(&self) -> &dyn CollisionGateway {
        self.collision.as_ref()
    }

    /// Runs the collision pass over all records.
    pub fn sort_and_collide(&mut self) {
        self.collision.sort_and_collide(&mut self.records);
    }

    // =========================================================================
    // Slot lifecycle
    // =========================================================================

    fn check_slot(&self, slot: usize) -> ObjectResult<()> {
        if slot < self.capacity() {
            Ok(())
        } else {
            Err(ObjectError::InvalidSlot {
                slot,
                capacity: self.capacity(),
            })
        }
    }

    /// Takes a free slot and puts it on the pending list.
    ///
    /// Close to capacity this first runs reclamation, which only marks
    /// objects; they are freed at the next reap.
    ///
    /// # Errors
    ///
    /// [`ObjectError::Exhausted`] if every slot is live after reclamation.
    pub fn allocate(&mut self) -> ObjectResult<usize> {
        let capacity = self.capacity();
        let target = capacity.saturating_sub(self.config.reclaim_margin);
        if self.live_count >= target {
            let marked = self.reclaim(target);
            if marked > 0 {
                tracing::warn!(marked, live = self.live_count, "object slots reclaimed under pressure");
            }
        }

        let Some(slot) = self
            .lists
            .first(ListId::Free)
            .filter(|_| self.live_count < capacity)
        else {
            tracing::debug!(capacity, "object pool exhausted");
            return Err(ObjectError::Exhausted { capacity });
        };

        self.lists.move_to_back(slot, ListId::Pending);
        self.live_count += 1;
        self.stats.high_water_mark = self.stats.high_water_mark.max(self.live_count);
        if self.highest_index.map_or(true, |h| slot > h) {
            self.highest_index = Some(slot);
        }
        if self.highest_ever_index.map_or(true, |h| slot > h) {
            self.highest_ever_index = Some(slot);
            tracing::trace!(slot, "new highest object index");
        }
        Ok(slot)
    }

    /// Returns a live slot to the free list, unregistering it from
    /// collision and resetting its record.
    ///
    /// # Errors
    ///
    /// [`ObjectError::InvalidSlot`] out of range; [`ObjectError::DoubleFree`]
    /// (fatal) if the slot is already free.
    pub fn free(&mut self, slot: usize) -> ObjectResult<()> {
        self.check_slot(slot)?;
        if self.lists.list_of(slot) == ListId::Free {
            return Err(diagnostics::report(
                self.invariant_policy(),
                ObjectError::DoubleFree { slot },
            ));
        }

        if self.records[slot].flags.contains(ObjectFlags::COLLIDES) {
            self.remove_collider(slot);
        }
        self.lists.move_to_back(slot, ListId::Free);
        self.live_count -= 1;
        self.records[slot].clear();

        if self.highest_index == Some(slot) {
            self.highest_index = (0..slot)
                .rev()
                .find(|&s| self.lists.list_of(s) != ListId::Free);
        }
        Ok(())
    }

    /// Creates an object on the pending list.
    ///
    /// The object gets the next signature and `NOT_IN_COLL`; it joins the
    /// used list and the collision set at the next merge.
    ///
    /// # Errors
    ///
    /// [`ObjectError::Exhausted`] when full; [`ObjectError::InvalidSlot`]
    /// for an out-of-range parent; [`ObjectError::CreateNone`] (fatal) for
    /// kind `None`.
    pub fn create(&mut self, spawn: &SpawnParams) -> ObjectResult<usize> {
        if spawn.kind == ObjectKind::None {
            return Err(diagnostics::report(
                self.invariant_policy(),
                ObjectError::CreateNone,
            ));
        }
        let parent = match spawn.parent {
            Some(p) => {
                self.check_slot(p)?;
                Some((p, self.records[p].signature, self.records[p].kind))
            }
            None => None,
        };

        let slot = self.allocate()?;
        let signature = Signature::new(self.next_signature);
        self.next_signature += 1;

        let record = &mut self.records[slot];
        record.clear();
        record.kind = spawn.kind;
        record.signature = signature;
        record.instance_index = spawn.instance_index;
        if let Some((p, parent_signature, parent_kind)) = parent {
            record.parent_slot = p;
            record.parent_signature = parent_signature;
            record.parent_kind = parent_kind;
        } else {
            record.parent_signature = signature;
            record.parent_kind = spawn.kind;
        }
        record.flags = spawn.flags | ObjectFlags::NOT_IN_COLL;
        record.position = spawn.position.unwrap_or(Vec3::ZERO);
        record.last_position = record.position;
        record.orientation = spawn.orientation.unwrap_or(Matrix3::IDENTITY);
        record.last_orientation = record.orientation;
        record.radius = spawn.radius;
        record.set_shield_sections(self.config.default_shield_sections);

        self.stats.created += 1;
        tracing::debug!(
            slot,
            signature = signature.get(),
            kind = %spawn.kind,
            "object created"
        );
        Ok(slot)
    }

    /// Moves every pending object to the back of the used list, in creation
    /// order, registering collidable ones with the collision subsystem.
    pub fn merge_pending(&mut self) -> usize {
        let mut merged = 0;
        while let Some(slot) = self.lists.first(ListId::Pending) {
            self.lists.move_to_back(slot, ListId::Used);
            self.add_collider(slot);
            merged += 1;
        }
        merged
    }

    /// Registers `slot` with the collision subsystem if it collides and is
    /// not already registered.
    ///
    /// # Returns
    ///
    /// `true` if a registration happened.
    pub fn add_collider(&mut self, slot: usize) -> bool {
        let Some(record) = self.records.get_mut(slot) else {
            return false;
        };
        if !record.flags.contains(ObjectFlags::COLLIDES)
            || !record.flags.contains(ObjectFlags::NOT_IN_COLL)
        {
            return false;
        }
        self.collision.register(slot);
        record.flags.remove(ObjectFlags::NOT_IN_COLL);
        true
    }

    /// Unregisters `slot` from the collision subsystem if registered.
    ///
    /// # Returns
    ///
    /// `true` if an unregistration happened.
    pub fn remove_collider(&mut self, slot: usize) -> bool {
        let Some(record) = self.records.get_mut(slot) else {
            return false;
        };
        if record.flags.contains(ObjectFlags::NOT_IN_COLL) {
            return false;
        }
        self.collision.unregister(slot);
        record.flags.insert(ObjectFlags::NOT_IN_COLL);
        true
    }

    /// Deletes the object in `slot`.
    ///
    /// - Free slot: logged, nothing happens.
    /// - Live slot that never got a kind (bare [`Self::allocate`]): freed.
    /// - Local player ship outside the editor: becomes a [`ObjectKind::Ghost`].
    /// - Ghost in single player: refused, should-be-dead cleared.
    /// - Anything else: per-kind delete op, dock links released, slot freed.
    ///
    /// # Errors
    ///
    /// [`ObjectError::InvalidSlot`] out of range, or a fatal error from
    /// dispatch or free.
    pub fn delete(
        &mut self,
        slot: usize,
        dispatch: &mut TypeDispatchTable,
    ) -> ObjectResult<DeleteOutcome> {
        self.delete_inner(slot, dispatch, false)
    }

    /// Deletes every live object, ghosts included, for mission teardown.
    ///
    /// # Returns
    ///
    /// Number of slots freed.
    pub fn delete_all(&mut self, dispatch: &mut TypeDispatchTable) -> usize {
        self.player_slot = None;
        let mut freed = 0;
        for slot in 0..self.capacity() {
            if self.lists.list_of(slot) == ListId::Free {
                continue;
            }
            match self.delete_inner(slot, dispatch, true) {
                Ok(DeleteOutcome::Freed) => freed += 1,
                Ok(_) => {}
                Err(err) => tracing::error!(slot, error = %err, "delete_all skipped object"),
            }
        }
        tracing::info!(freed, "all objects deleted");
        freed
    }

    fn delete_inner(
        &mut self,
        slot: usize,
        dispatch: &mut TypeDispatchTable,
        force: bool,
    ) -> ObjectResult<DeleteOutcome> {
        self.check_slot(slot)?;
        let kind = self.records[slot].kind;

        if kind == ObjectKind::None {
            if self.lists.list_of(slot) != ListId::Free {
                // Allocated but never populated.
                tracing::warn!(slot, "freeing a live slot that never got an object");
                self.free(slot)?;
                return Ok(DeleteOutcome::Freed);
            }
            tracing::debug!(slot, "delete called for a free slot");
            return Ok(DeleteOutcome::AlreadyFree);
        }

        self.remove_collider(slot);

        if kind == ObjectKind::Ship
            && self.player_slot == Some(slot)
            && !self.config.editor_mode
        {
            let record = &mut self.records[slot];
            // Routed while the kind is still Ship so ship-side cleanup runs.
            let hook = dispatch.ghost(record);
            record.kind = ObjectKind::Ghost;
            record.flags.remove(ObjectFlags::SHOULD_BE_DEAD);
            record.physics = PhysicsState::default();
            self.stats.ghosted += 1;
            tracing::info!(slot, "player ship became a ghost");
            hook.map_err(|e| diagnostics::report(self.config.invariant_policy, e))?;
            return Ok(DeleteOutcome::Ghosted);
        }

        if kind == ObjectKind::Ghost && !force && !self.config.network_role.is_multiplayer() {
            tracing::warn!(slot, "refusing to delete a ghost outside multiplayer");
            self.records[slot]
                .flags
                .remove(ObjectFlags::SHOULD_BE_DEAD);
            return Ok(DeleteOutcome::Refused);
        }

        dispatch
            .delete(&mut self.records[slot])
            .map_err(|e| diagnostics::report(self.config.invariant_policy, e))?;
        DockingGraph::free_dock_list(self, slot);
        DockingGraph::free_dead_dock_list(self, slot);

        if self.player_slot == Some(slot) {
            self.player_slot = None;
        }
        if self.viewer_slot == Some(slot) {
            self.viewer_slot = None;
        }

        self.free(slot)?;
        self.stats.deleted += 1;
        tracing::debug!(slot, kind = %kind, "object deleted");
        Ok(DeleteOutcome::Freed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{NullCollision, RecordingCollision};
    use crate::diagnostics::audit;

    fn pool(capacity: usize) -> ObjectPool {
        let config = PoolConfig::with_capacity(capacity).with_reclaim_margin(0);
        ObjectPool::new(config, Box::new(NullCollision)).unwrap()
    }

    #[test]
    fn test_create_is_pending_until_merge() {
        let mut pool = pool(8);
        let slot = pool.create(&SpawnParams::new(ObjectKind::Ship)).unwrap();

        assert_eq!(pool.list_of(slot), ListId::Pending);
        assert!(pool.get(slot).unwrap().has_flag(ObjectFlags::NOT_IN_COLL));
        assert_eq!(pool.used_slots().count(), 0);

        assert_eq!(pool.merge_pending(), 1);
        assert_eq!(pool.list_of(slot), ListId::Used);
        assert!(audit(&pool).is_clean());
    }

    #[test]
    fn test_signatures_are_monotonic() {
        let mut pool = pool(4);
        let a = pool.create(&SpawnParams::new(ObjectKind::Debris)).unwrap();
        let b = pool.create(&SpawnParams::new(ObjectKind::Debris)).unwrap();
        let sig_a = pool.get(a).unwrap().signature;
        let sig_b = pool.get(b).unwrap().signature;
        assert!(sig_b > sig_a);
        assert_eq!(sig_a.get(), 1);

        pool.reset();
        let c = pool.create(&SpawnParams::new(ObjectKind::Debris)).unwrap();
        assert!(pool.get(c).unwrap().signature > sig_b);
    }

    #[test]
    fn test_double_free_under_log_policy() {
        let mut config = PoolConfig::with_capacity(4).with_reclaim_margin(0);
        config.invariant_policy = InvariantPolicy::Log;
        let mut pool = ObjectPool::new(config, Box::new(NullCollision)).unwrap();

        let slot = pool.allocate().unwrap();
        pool.free(slot).unwrap();
        assert_eq!(pool.free(slot), Err(ObjectError::DoubleFree { slot }));
    }

    #[test]
    #[should_panic(expected = "freed twice")]
    fn test_double_free_aborts() {
        let mut config = PoolConfig::with_capacity(4).with_reclaim_margin(0);
        config.invariant_policy = InvariantPolicy::Abort;
        let mut pool = ObjectPool::new(config, Box::new(NullCollision)).unwrap();
        let _ = pool.free(0);
    }

    #[test]
    fn test_highest_index_rescans_down() {
        let mut pool = pool(6);
        let slots: Vec<usize> = (0..4)
            .map(|_| pool.create(&SpawnParams::new(ObjectKind::Asteroid)).unwrap())
            .collect();
        assert_eq!(pool.highest_index(), Some(3));

        pool.free(slots[2]).unwrap();
        assert_eq!(pool.highest_index(), Some(3));
        pool.free(slots[3]).unwrap();
        assert_eq!(pool.highest_index(), Some(1));
        assert_eq!(pool.highest_ever_index(), Some(3));

        pool.free(slots[0]).unwrap();
        pool.free(slots[1]).unwrap();
        assert_eq!(pool.highest_index(), None);
    }

    #[test]
    fn test_collider_registration_is_exactly_once() {
        let collision = RecordingCollision::new();
        let log = collision.log();
        let mut pool = ObjectPool::new(
            PoolConfig::with_capacity(4).with_reclaim_margin(0),
            Box::new(collision),
        ).unwrap();

        let slot = pool
            .create(&SpawnParams::new(ObjectKind::Weapon).flags(ObjectFlags::COLLIDES))
            .unwrap();
        pool.merge_pending();
        assert!(!pool.add_collider(slot));
        assert!(pool.remove_collider(slot));
        assert!(!pool.remove_collider(slot));

        let log = log.borrow();
        assert_eq!(log.registered, vec![slot]);
        assert_eq!(log.unregistered, vec![slot]);
    }

    #[test]
    fn test_parent_of_detects_reuse() {
        let mut pool = pool(2);
        let ship = pool.create(&SpawnParams::new(ObjectKind::Ship)).unwrap();
        let shot = pool
            .create(&SpawnParams::new(ObjectKind::Weapon).parent(ship))
            .unwrap();
        assert_eq!(pool.parent_of(shot), Some(ship));
        assert_eq!(pool.get(shot).unwrap().parent_kind, ObjectKind::Ship);

        pool.free(ship).unwrap();
        assert_eq!(pool.parent_of(shot), None);
        assert_eq!(pool.parent_of(ship), None);
    }

    #[test]
    fn test_create_none_is_refused() {
        let mut config = PoolConfig::with_capacity(2).with_reclaim_margin(0);
        config.invariant_policy = InvariantPolicy::Log;
        let mut pool = ObjectPool::new(config, Box::new(NullCollision)).unwrap();
        assert_eq!(
            pool.create(&SpawnParams::new(ObjectKind::None)),
            Err(ObjectError::CreateNone)
        );
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_pair_mut() {
        let mut pool = pool(3);
        assert!(pool.pair_mut(1, 1).is_none());
        assert!(pool.pair_mut(0, 3).is_none());

        let (a, b) = pool.pair_mut(2, 0).unwrap();
        assert_eq!(a.slot_index(), 2);
        assert_eq!(b.slot_index(), 0);
    }

    #[test]
    fn test_average_position() {
        let mut pool = pool(4);
        assert!(pool.average_position(ObjectKind::Ship).is_none());
        pool.create(&SpawnParams::new(ObjectKind::Ship).at(Vec3::new(2.0, 0.0, 0.0)))
            .unwrap();
        pool.create(&SpawnParams::new(ObjectKind::Ship).at(Vec3::new(4.0, 2.0, 0.0)))
            .unwrap();
        pool.create(&SpawnParams::new(ObjectKind::Debris).at(Vec3::new(100.0, 0.0, 0.0)))
            .unwrap();
        pool.merge_pending();

        let mean = pool.average_position(ObjectKind::Ship).unwrap();
        assert!(mean.distance(Vec3::new(3.0, 1.0, 0.0)) < 1e-6);
    }

    #[test]
    fn test_for_each_used_survives_deleting_current() {
        let mut pool = pool(6);
        let mut dispatch = TypeDispatchTable::all_noop();
        for _ in 0..5 {
            pool.create(&SpawnParams::new(ObjectKind::Weapon)).unwrap();
        }
        pool.merge_pending();

        let mut visited = Vec::new();
        pool.for_each_used(|pool, slot| {
            visited.push(slot);
            if slot % 2 == 0 {
                pool.delete(slot, &mut dispatch).unwrap();
            }
        });

        assert_eq!(visited, vec![0, 1, 2, 3, 4]);
        assert_eq!(pool.used_slots().collect::<Vec<_>>(), vec![1, 3]);
        assert!(audit(&pool).is_clean());
    }
}
