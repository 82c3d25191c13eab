//! # Collaborator Interfaces
//!
//! Traits the per-type simulation, physics, collision, scripting and
//! networking subsystems implement so the core can drive them.
//!
//! ## Architecture
//!
//! The core NEVER reaches into a collaborator's data. It hands over a slot,
//! a record or the pool and lets the collaborator do its own work.
//!
//! ```text
//! Core defines:          Subsystem implements:
//! ┌──────────────────┐   ┌──────────────────┐
//! │ trait Collision… │ ← │ impl Collision…  │
//! └──────────────────┘   └──────────────────┘
//! ```

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use orbital_shared::{Matrix3, Vec3};

use crate::object::{ObjectKind, ObjectRecord, PhysicsState};
use crate::pool::ObjectPool;

/// Scripting hook fired while an object is queued for rendering.
pub const HOOK_OBJECT_RENDER: &str = "On Object Render";

// ============================================================================
// PHYSICS
// ============================================================================

/// Advances one object's motion. Synchronous, must not allocate.
pub trait PhysicsIntegrator {
    /// Integrates position and orientation over `dt` seconds.
    fn integrate(
        &mut self,
        position: &mut Vec3,
        orientation: &mut Matrix3,
        physics: &mut PhysicsState,
        dt: f32,
    );

    /// Puts a ship's physics back to its starting state, e.g. after a
    /// mission restart or a change to the physics tables.
    fn init_ship(&mut self, physics: &mut PhysicsState) {
        *physics = PhysicsState::default();
    }
}

// ============================================================================
// COLLISION
// ============================================================================

/// Broad-phase pairing subsystem kept in sync by the pool.
pub trait CollisionGateway {
    /// Adds a slot to the collision set.
    fn register(&mut self, slot: usize);

    /// Removes a slot from the collision set.
    fn unregister(&mut self, slot: usize);

    /// Drops the whole collision set.
    fn reset_all(&mut self);

    /// Runs broad and narrow phase over the registered slots.
    fn sort_and_collide(&mut self, objects: &mut [ObjectRecord]);

    /// Marks stale weapons should-be-dead; returns how many were marked.
    fn remove_expired_weapons(&mut self, objects: &mut [ObjectRecord]) -> usize;
}

// ============================================================================
// SCRIPTING
// ============================================================================

/// Scripting runtime entry points.
pub trait ScriptHooks {
    /// Runs every script bound to `event` with `object` as the hook object.
    fn run_hook(&mut self, event: &str, object: &ObjectRecord);

    /// True if a script asked to override the default behavior for `event`.
    fn is_override(&mut self, event: &str, object: &ObjectRecord) -> bool;
}

// ============================================================================
// NETWORKING
// ============================================================================

/// Remote-object interpolation, consulted in place of physics.
pub trait NetworkInterpolation {
    /// True if this object's motion comes from the network this tick.
    fn is_interpolated(&self, object: &ObjectRecord) -> bool;

    /// Applies the interpolated state.
    fn interpolate(&mut self, object: &mut ObjectRecord, dt: f32);
}

// ============================================================================
// AI
// ============================================================================

/// Docking-relevant slice of the AI state.
pub trait DockAi {
    /// Slot this object is in the final undock phase from, if any.
    fn undocking_goal(&self, object: &ObjectRecord) -> Option<usize>;
}

// ============================================================================
// WEAPONS
// ============================================================================

/// Weapon passes that run after dock propagation.
pub trait WeaponPostPasses {
    /// Steers homing weapons toward this tick's active countermeasures.
    fn process_countermeasures(&mut self, pool: &mut ObjectPool, countermeasures: &[usize]);

    /// Prepares beams before collision.
    fn beams_pre_collision(&mut self, pool: &mut ObjectPool);

    /// Resolves beam hits after collision.
    fn beams_post_collision(&mut self, pool: &mut ObjectPool);

    /// Drops swarm missiles whose targets went away.
    fn validate_swarms(&mut self, pool: &mut ObjectPool);

    /// Ages artillery target locks.
    fn update_artillery_locks(&mut self, pool: &mut ObjectPool);
}

// ============================================================================
// DEFAULT IMPLEMENTATIONS
// ============================================================================

/// Explicit Euler: `position += velocity * dt`, yaw from rotational velocity.
#[derive(Debug, Default)]
pub struct EulerIntegrator {
    /// Number of integrate calls.
    pub calls: usize,
}

impl PhysicsIntegrator for EulerIntegrator {
    fn integrate(
        &mut self,
        position: &mut Vec3,
        orientation: &mut Matrix3,
        physics: &mut PhysicsState,
        dt: f32,
    ) {
        self.calls += 1;
        *position += physics.velocity * dt;
        let yaw = physics.rotational_velocity.y * dt;
        if yaw != 0.0 {
            *orientation = *orientation * Matrix3::from_yaw(yaw);
        }
    }
}

/// Collision gateway that ignores everything.
#[derive(Debug, Default)]
pub struct NullCollision;

impl CollisionGateway for NullCollision {
    fn register(&mut self, _slot: usize) {}
    fn unregister(&mut self, _slot: usize) {}
    fn reset_all(&mut self) {}
    fn sort_and_collide(&mut self, _objects: &mut [ObjectRecord]) {}
    fn remove_expired_weapons(&mut self, _objects: &mut [ObjectRecord]) -> usize {
        0
    }
}

/// Scripting runtime with no scripts loaded.
#[derive(Debug, Default)]
pub struct NullScripting;

impl ScriptHooks for NullScripting {
    fn run_hook(&mut self, _event: &str, _object: &ObjectRecord) {}
    fn is_override(&mut self, _event: &str, _object: &ObjectRecord) -> bool {
        false
    }
}

/// Standalone game: nothing is network-interpolated.
#[derive(Debug, Default)]
pub struct NoInterpolation;

impl NetworkInterpolation for NoInterpolation {
    fn is_interpolated(&self, _object: &ObjectRecord) -> bool {
        false
    }
    fn interpolate(&mut self, _object: &mut ObjectRecord, _dt: f32) {}
}

/// AI that never undocks.
#[derive(Debug, Default)]
pub struct NoDockAi;

impl DockAi for NoDockAi {
    fn undocking_goal(&self, _object: &ObjectRecord) -> Option<usize> {
        None
    }
}

/// Weapon subsystem with nothing to do.
#[derive(Debug, Default)]
pub struct NullWeaponPasses;

impl WeaponPostPasses for NullWeaponPasses {
    fn process_countermeasures(&mut self, _pool: &mut ObjectPool, _countermeasures: &[usize]) {}
    fn beams_pre_collision(&mut self, _pool: &mut ObjectPool) {}
    fn beams_post_collision(&mut self, _pool: &mut ObjectPool) {}
    fn validate_swarms(&mut self, _pool: &mut ObjectPool) {}
    fn update_artillery_locks(&mut self, _pool: &mut ObjectPool) {}
}

// ============================================================================
// RECORDING IMPLEMENTATIONS (For Testing)
// ============================================================================

/// What a [`RecordingCollision`] has seen.
#[derive(Debug, Default)]
pub struct CollisionLog {
    /// Every register call, in order.
    pub registered: Vec<usize>,
    /// Every unregister call, in order.
    pub unregistered: Vec<usize>,
    /// Slots currently in the collision set.
    pub active: BTreeSet<usize>,
    /// Number of `reset_all` calls.
    pub resets: usize,
    /// Number of `sort_and_collide` calls.
    pub collide_calls: usize,
    /// Weapon slots `remove_expired_weapons` should mark.
    pub stale_weapons: Vec<usize>,
}

/// Collision gateway that logs every call.
///
/// The pool owns its gateway, so the log is shared through an `Rc` the test
/// keeps a clone of.
#[derive(Debug, Default)]
pub struct RecordingCollision {
    log: Rc<RefCell<CollisionLog>>,
}

impl RecordingCollision {
    /// Creates a gateway with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the log.
    #[must_use]
    pub fn log(&self) -> Rc<RefCell<CollisionLog>> {
        Rc::clone(&self.log)
    }
}

impl CollisionGateway for RecordingCollision {
    fn register(&mut self, slot: usize) {
        let mut log = self.log.borrow_mut();
        log.registered.push(slot);
        log.active.insert(slot);
    }

    fn unregister(&mut self, slot: usize) {
        let mut log = self.log.borrow_mut();
        log.unregistered.push(slot);
        log.active.remove(&slot);
    }

    fn reset_all(&mut self) {
        let mut log = self.log.borrow_mut();
        log.resets += 1;
        log.active.clear();
    }

    fn sort_and_collide(&mut self, _objects: &mut [ObjectRecord]) {
        self.log.borrow_mut().collide_calls += 1;
    }

    fn remove_expired_weapons(&mut self, objects: &mut [ObjectRecord]) -> usize {
        let stale = std::mem::take(&mut self.log.borrow_mut().stale_weapons);
        let mut removed = 0;
        for slot in stale {
            if let Some(object) = objects.get_mut(slot) {
                if object.kind == ObjectKind::Weapon && !object.should_be_dead() {
                    object.mark_should_be_dead();
                    removed += 1;
                }
            }
        }
        removed
    }
}

/// Scripting runtime that logs hooks and can suppress chosen slots.
#[derive(Debug, Default)]
pub struct RecordingScripting {
    /// `(event, slot)` for every hook run.
    pub runs: Vec<(String, usize)>,
    /// Slots whose hooks report an override.
    pub overridden: BTreeSet<usize>,
}

impl ScriptHooks for RecordingScripting {
    fn run_hook(&mut self, event: &str, object: &ObjectRecord) {
        self.runs.push((event.to_owned(), object.slot_index()));
    }

    fn is_override(&mut self, _event: &str, object: &ObjectRecord) -> bool {
        self.overridden.contains(&object.slot_index())
    }
}

/// Interpolates chosen slots toward fixed targets.
#[derive(Debug, Default)]
pub struct ScriptedInterpolation {
    /// Slot -> position the network says it is at.
    pub targets: HashMap<usize, Vec3>,
    /// Number of interpolate calls.
    pub applied: usize,
}

impl NetworkInterpolation for ScriptedInterpolation {
    fn is_interpolated(&self, object: &ObjectRecord) -> bool {
        self.targets.contains_key(&object.slot_index())
    }

    fn interpolate(&mut self, object: &mut ObjectRecord, _dt: f32) {
        if let Some(target) = self.targets.get(&object.slot_index()) {
            object.position = *target;
            self.applied += 1;
        }
    }
}

/// Dock AI driven by a slot -> undock goal table.
#[derive(Debug, Default)]
pub struct ScriptedDockAi {
    /// Objects in the final undock phase, keyed by slot, valued by goal slot.
    pub undocking: HashMap<usize, usize>,
}

impl DockAi for ScriptedDockAi {
    fn undocking_goal(&self, object: &ObjectRecord) -> Option<usize> {
        self.undocking.get(&object.slot_index()).copied()
    }
}

/// Weapon passes that log call order.
#[derive(Debug, Default)]
pub struct RecordingWeaponPasses {
    /// Pass names in call order.
    pub calls: Vec<&'static str>,
    /// Countermeasure slots handed over, per call.
    pub countermeasures: Vec<Vec<usize>>,
}

impl WeaponPostPasses for RecordingWeaponPasses {
    fn process_countermeasures(&mut self, _pool: &mut ObjectPool, countermeasures: &[usize]) {
        self.calls.push("countermeasures");
        self.countermeasures.push(countermeasures.to_vec());
    }

    fn beams_pre_collision(&mut self, _pool: &mut ObjectPool) {
        self.calls.push("beams_pre");
    }

    fn beams_post_collision(&mut self, _pool: &mut ObjectPool) {
        self.calls.push("beams_post");
    }

    fn validate_swarms(&mut self, _pool: &mut ObjectPool) {
        self.calls.push("swarms");
    }

    fn update_artillery_locks(&mut self, _pool: &mut ObjectPool) {
        self.calls.push("artillery");
    }
}
