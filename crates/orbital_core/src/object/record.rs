//! # Object Records
//!
//! An [`ObjectRecord`] is the per-slot data the core owns for every world
//! object. Per-type data (ship systems, weapon info, debris lifetimes) lives
//! in the collaborator that owns `instance_index`, not here.
//!
//! Records are never moved: a slot keeps the same record for the whole
//! process and [`ObjectRecord::clear`] resets it for reuse.

use orbital_shared::{Matrix3, Vec3};

use super::event::MoveEvent;
use super::flags::ObjectFlags;
use super::kind::ObjectKind;

/// Process-unique object identity.
///
/// Zero is reserved for free slots. Live signatures come from a monotonic
/// counter starting at 1 and are never reissued, so a signature check
/// detects a slot that was freed and reused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Signature(u64);

impl Signature {
    /// Signature of a free slot.
    pub const NONE: Self = Self(0);

    /// Wraps a raw signature value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// True for the reserved free-slot signature.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Weak reference to an object: slot plus the signature it had when the
/// handle was taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    slot: u32,
    signature: Signature,
}

impl ObjectHandle {
    /// Null/invalid handle.
    pub const NULL: Self = Self {
        slot: u32::MAX,
        signature: Signature::NONE,
    };

    /// Creates a handle from slot and signature.
    #[inline]
    #[must_use]
    pub const fn new(slot: u32, signature: Signature) -> Self {
        Self { slot, signature }
    }

    /// Slot the handle points at.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot as usize
    }

    /// Signature the object had when the handle was taken.
    #[inline]
    #[must_use]
    pub const fn signature(self) -> Signature {
        self.signature
    }

    /// Checks if this handle is null.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.signature.is_none()
    }
}

impl Default for ObjectHandle {
    fn default() -> Self {
        Self::NULL
    }
}

/// Physics-owned bits the core needs to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PhysicsFlags(pub u32);

impl PhysicsFlags {
    /// Afterburner engaged.
    pub const AFTERBURNER_ON: Self = Self(1 << 0);
    /// Damping reduced after a collision.
    pub const REDUCED_DAMP: Self = Self(1 << 1);
    /// Heavy damping used while dying.
    pub const DEAD_DAMP: Self = Self(1 << 2);
    /// Velocity decoupled from facing.
    pub const GLIDING: Self = Self(1 << 3);
    /// Gliding imposed by script or mission; not player-toggleable.
    pub const FORCE_GLIDE: Self = Self(1 << 4);

    /// True if any bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Sets `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears `other`.
    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

/// State block owned by the physics integrator.
///
/// The core only initializes it and reads the glide bits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsState {
    /// World-space velocity.
    pub velocity: Vec3,
    /// Local-space rotational velocity.
    pub rotational_velocity: Vec3,
    /// Velocity the controller is ramping toward.
    pub desired_velocity: Vec3,
    /// Rotational velocity the controller is ramping toward.
    pub desired_rotational_velocity: Vec3,
    /// Local-space velocity captured when gliding stops.
    pub prev_ramp_velocity: Vec3,
    /// Mass.
    pub mass: f32,
    /// Physics flags.
    pub flags: PhysicsFlags,
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            rotational_velocity: Vec3::ZERO,
            desired_velocity: Vec3::ZERO,
            desired_rotational_velocity: Vec3::ZERO,
            prev_ramp_velocity: Vec3::ZERO,
            mass: 10.0,
            flags: PhysicsFlags::default(),
        }
    }
}

/// One side of a rigid attachment between two objects.
///
/// `offset` and `relative_orientation` describe `other` in the frame of the
/// object that owns the link, captured at dock time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DockLink {
    /// The attached object.
    pub other: ObjectHandle,
    /// Dock point on the owning object.
    pub dockpoint: i32,
    /// Dock point on the attached object.
    pub other_dockpoint: i32,
    /// Attached object's position in the owner's local frame.
    pub offset: Vec3,
    /// Attached orientation relative to the owner's orientation.
    pub relative_orientation: Matrix3,
}

/// Per-slot object data.
#[derive(Debug)]
pub struct ObjectRecord {
    pub(crate) kind: ObjectKind,
    pub(crate) signature: Signature,
    slot: usize,
    /// Creating/owning object's slot, or own slot if none.
    pub parent_slot: usize,
    /// Parent signature at creation time.
    pub parent_signature: Signature,
    /// Parent kind at creation time.
    pub parent_kind: ObjectKind,
    /// Index into the owning collaborator's per-kind table.
    pub instance_index: Option<usize>,
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub orientation: Matrix3,
    /// Position at the start of the current tick.
    pub last_position: Vec3,
    /// Orientation at the start of the current tick.
    pub last_orientation: Matrix3,
    /// Bounding radius.
    pub radius: f32,
    /// Authoritative hull strength.
    pub hull_strength: f32,
    /// Effects-only / predicted hull strength.
    pub simulated_hull_strength: f32,
    /// Per-quadrant shield values.
    pub shield_sections: Vec<f32>,
    /// Integrator state.
    pub physics: PhysicsState,
    pub(crate) flags: ObjectFlags,
    /// Listeners fired after the per-kind pre-move op.
    pub pre_move_event: MoveEvent,
    /// Listeners fired after the per-kind post-move op.
    pub post_move_event: MoveEvent,
    pub(crate) dock_list: Vec<DockLink>,
    pub(crate) dead_dock_list: Vec<DockLink>,
}

impl ObjectRecord {
    /// Creates the empty record that lives in `slot` for the pool's lifetime.
    #[must_use]
    pub fn empty(slot: usize) -> Self {
        Self {
            kind: ObjectKind::None,
            signature: Signature::NONE,
            slot,
            parent_slot: slot,
            parent_signature: Signature::NONE,
            parent_kind: ObjectKind::None,
            instance_index: None,
            position: Vec3::ZERO,
            orientation: Matrix3::IDENTITY,
            last_position: Vec3::ZERO,
            last_orientation: Matrix3::IDENTITY,
            radius: 0.0,
            hull_strength: 0.0,
            simulated_hull_strength: 0.0,
            shield_sections: Vec::new(),
            physics: PhysicsState::default(),
            flags: ObjectFlags::EMPTY,
            pre_move_event: MoveEvent::default(),
            post_move_event: MoveEvent::default(),
            dock_list: Vec::new(),
            dead_dock_list: Vec::new(),
        }
    }

    /// Resets every field except the slot index.
    ///
    /// Dock lists are dropped without touching partners; reciprocal cleanup
    /// is the pool's job during delete.
    pub(crate) fn clear(&mut self) {
        self.kind = ObjectKind::None;
        self.signature = Signature::NONE;
        self.parent_slot = self.slot;
        self.parent_signature = Signature::NONE;
        self.parent_kind = ObjectKind::None;
        self.instance_index = None;
        self.position = Vec3::ZERO;
        self.last_position = Vec3::ZERO;
        self.orientation = Matrix3::IDENTITY;
        self.last_orientation = Matrix3::IDENTITY;
        self.radius = 0.0;
        self.hull_strength = 0.0;
        self.simulated_hull_strength = 0.0;
        self.shield_sections.clear();
        self.physics = PhysicsState::default();
        self.flags = ObjectFlags::EMPTY;
        self.pre_move_event.clear();
        self.post_move_event.clear();
        self.dock_list.clear();
        self.dead_dock_list.clear();
    }

    /// Kind tag. `None` means the slot is free.
    ///
    /// Only the pool changes it: on create, on free, and when the player's
    /// ship becomes a ghost.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Identity; `NONE` while free. Assigned by the pool on create.
    #[inline]
    #[must_use]
    pub const fn signature(&self) -> Signature {
        self.signature
    }

    /// Slot this record lives in. Never changes.
    #[inline]
    #[must_use]
    pub const fn slot_index(&self) -> usize {
        self.slot
    }

    /// Handle to this object.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn handle(&self) -> ObjectHandle {
        ObjectHandle::new(self.slot as u32, self.signature)
    }

    /// Current flag set.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> ObjectFlags {
        self.flags
    }

    /// True if `flag` is set.
    #[inline]
    #[must_use]
    pub const fn has_flag(&self, flag: ObjectFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Sets or clears attribute bits that do not affect collision
    /// registration.
    ///
    /// # Returns
    ///
    /// `false` (and nothing changes) if `flag` touches `COLLIDES` or
    /// `NOT_IN_COLL`; those go through `ObjectPool::set_flags`.
    pub fn set_attribute(&mut self, flag: ObjectFlags, value: bool) -> bool {
        if flag.intersects(ObjectFlags::COLLIDES | ObjectFlags::NOT_IN_COLL) {
            tracing::warn!(
                slot = self.slot,
                "collision flags must change through the pool's controlled path"
            );
            return false;
        }
        self.flags.set(flag, value);
        true
    }

    /// Soft delete: the object stays valid until the next reap pass.
    #[inline]
    pub fn mark_should_be_dead(&mut self) {
        self.flags.insert(ObjectFlags::SHOULD_BE_DEAD);
    }

    /// True once any subsystem has requested deletion.
    #[inline]
    #[must_use]
    pub const fn should_be_dead(&self) -> bool {
        self.flags.contains(ObjectFlags::SHOULD_BE_DEAD)
    }

    /// Live dock links.
    #[inline]
    #[must_use]
    pub fn dock_links(&self) -> &[DockLink] {
        &self.dock_list
    }

    /// Links kept after undocking for animation and cleanup.
    #[inline]
    #[must_use]
    pub fn dead_dock_links(&self) -> &[DockLink] {
        &self.dead_dock_list
    }

    /// Replaces the shield quadrant count, zeroing every quadrant.
    pub fn set_shield_sections(&mut self, count: usize) {
        self.shield_sections.clear();
        self.shield_sections.resize(count, 0.0);
    }

    /// Sum of all shield quadrants.
    #[must_use]
    pub fn shield_strength(&self) -> f32 {
        self.shield_sections.iter().sum()
    }

    /// Starts or stops gliding.
    ///
    /// `force` selects the script-imposed glide bit instead of the
    /// player-toggleable one. Stopping captures the current velocity in the
    /// local frame so the engine ramp restarts from it.
    pub fn set_gliding(&mut self, enable: bool, force: bool) {
        let bit = if force {
            PhysicsFlags::FORCE_GLIDE
        } else {
            PhysicsFlags::GLIDING
        };

        if enable {
            self.physics.flags.insert(bit);
        } else {
            self.physics.flags.remove(bit);
            self.physics.prev_ramp_velocity = self.orientation.rotate(self.physics.velocity);
        }
    }

    /// True if either glide bit is set.
    #[must_use]
    pub const fn is_gliding(&self) -> bool {
        self.physics
            .flags
            .intersects(PhysicsFlags(PhysicsFlags::GLIDING.0 | PhysicsFlags::FORCE_GLIDE.0))
    }

    /// True if gliding is imposed rather than player-selected.
    #[must_use]
    pub const fn glide_forced(&self) -> bool {
        self.physics.flags.intersects(PhysicsFlags::FORCE_GLIDE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_keeps_slot() {
        let mut record = ObjectRecord::empty(42);
        record.kind = ObjectKind::Ship;
        record.signature = Signature::new(9);
        record.position = Vec3::new(1.0, 2.0, 3.0);
        record.set_shield_sections(4);
        record.pre_move_event.add(|_| {});

        record.clear();

        assert_eq!(record.slot_index(), 42);
        assert_eq!(record.parent_slot, 42);
        assert_eq!(record.kind, ObjectKind::None);
        assert!(record.signature.is_none());
        assert!(record.shield_sections.is_empty());
        assert!(record.pre_move_event.is_empty());
    }

    #[test]
    fn test_set_attribute_refuses_collision_bits() {
        let mut record = ObjectRecord::empty(0);
        assert!(!record.set_attribute(ObjectFlags::COLLIDES, true));
        assert!(!record.has_flag(ObjectFlags::COLLIDES));

        assert!(record.set_attribute(ObjectFlags::RECLAIMABLE, true));
        assert!(record.has_flag(ObjectFlags::RECLAIMABLE));
    }

    #[test]
    fn test_gliding_captures_local_velocity() {
        let mut record = ObjectRecord::empty(0);
        record.orientation = Matrix3::from_yaw(std::f32::consts::FRAC_PI_2);
        record.physics.velocity = Vec3::new(0.0, 0.0, 10.0);

        record.set_gliding(true, false);
        assert!(record.is_gliding());
        assert!(!record.glide_forced());

        record.set_gliding(true, true);
        record.set_gliding(false, false);
        // Forced glide still holds.
        assert!(record.is_gliding());
        assert!(record.glide_forced());

        record.set_gliding(false, true);
        assert!(!record.is_gliding());
        let expected = record.orientation.rotate(record.physics.velocity);
        assert!(record.physics.prev_ramp_velocity.distance(expected) < 1e-5);
    }

    #[test]
    fn test_handle_null() {
        assert!(ObjectHandle::NULL.is_null());
        assert!(ObjectHandle::default().is_null());
        let record = ObjectRecord::empty(3);
        assert_eq!(record.handle().slot(), 3);
    }
}
