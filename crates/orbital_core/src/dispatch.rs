//! # Type Dispatch
//!
//! Routes per-kind operations to the subsystem that owns each kind.
//!
//! Every non-`None` kind must have a behavior before the table can be
//! built; a missing entry is a startup error, not a silent no-op at
//! runtime. Kinds with nothing to do register [`NoopBehavior`].
//!
//! ## Example
//!
//! ```rust,ignore
//! let dispatch = TypeDispatchTable::builder()
//!     .register(ObjectKind::Ship, ShipSystems::new())
//!     .register(ObjectKind::Weapon, WeaponSystems::new())
//!     .fill_noop()
//!     .build()?;
//! ```

use crate::error::{ObjectError, ObjectResult};
use crate::object::{ObjectKind, ObjectRecord};
use crate::pool::ObjectPool;

/// Team affiliation reported by a kind's owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Team(pub i32);

/// Opaque model reference reported by a kind's owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub u32);

/// Per-kind operations. Every method has a do-nothing default.
///
/// Move ops receive the pool and a slot rather than a record so they can
/// read other objects and spawn new ones. Spawned objects land on the
/// pending list and are not visited until the next tick.
pub trait KindBehavior {
    /// Runs before physics.
    fn pre_move(&mut self, _pool: &mut ObjectPool, _slot: usize, _dt: f32) {}

    /// Runs after physics.
    fn post_move(&mut self, _pool: &mut ObjectPool, _slot: usize, _dt: f32) {}

    /// Submits the object for drawing.
    fn render(&mut self, _object: &ObjectRecord) {}

    /// Releases per-kind resources. The record is still intact.
    fn delete(&mut self, _object: &mut ObjectRecord) {}

    /// Team, if the kind has one.
    fn team(&self, _object: &ObjectRecord) -> Option<Team> {
        None
    }

    /// Model, if the kind has one.
    fn model(&self, _object: &ObjectRecord) -> Option<ModelHandle> {
        None
    }

    /// True if this object emits an active countermeasure this tick.
    fn countermeasure_pulse(&mut self, _object: &ObjectRecord) -> bool {
        false
    }

    /// Called on the Ship behavior just before the player's ship becomes
    /// a ghost. The record still has kind `Ship`.
    fn ghost(&mut self, _object: &mut ObjectRecord) {}

    /// Full hull strength for fraction queries.
    fn max_hull_strength(&self, _object: &ObjectRecord) -> f32 {
        0.0
    }

    /// Full shield strength for fraction queries.
    fn max_shield_strength(&self, _object: &ObjectRecord) -> f32 {
        0.0
    }
}

/// Behavior for kinds that have no per-kind work.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBehavior;

impl KindBehavior for NoopBehavior {}

/// Kind -> behavior table. One entry per kind, fixed after build.
pub struct TypeDispatchTable {
    behaviors: Vec<Box<dyn KindBehavior>>,
}

impl std::fmt::Debug for TypeDispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDispatchTable")
            .field("kinds", &self.behaviors.len())
            .finish()
    }
}

impl TypeDispatchTable {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> DispatchTableBuilder {
        DispatchTableBuilder::new()
    }

    /// Table where every kind is a [`NoopBehavior`].
    #[must_use]
    pub fn all_noop() -> Self {
        Self {
            behaviors: ObjectKind::ALL
                .iter()
                .map(|_| Box::new(NoopBehavior) as Box<dyn KindBehavior>)
                .collect(),
        }
    }

    /// Behavior registered for `kind`. `None` for the free-slot kind.
    #[must_use]
    pub fn behavior(&self, kind: ObjectKind) -> Option<&dyn KindBehavior> {
        kind.is_live().then(|| self.behaviors[kind.index()].as_ref())
    }

    fn route(
        &mut self,
        kind: ObjectKind,
        slot: usize,
    ) -> ObjectResult<&mut (dyn KindBehavior + 'static)> {
        if kind.is_live() {
            Ok(self.behaviors[kind.index()].as_mut())
        } else {
            Err(ObjectError::DispatchOnFreeSlot { slot })
        }
    }

    fn route_ref(&self, object: &ObjectRecord) -> ObjectResult<&dyn KindBehavior> {
        self.behavior(object.kind)
            .ok_or(ObjectError::DispatchOnFreeSlot {
                slot: object.slot_index(),
            })
    }

    /// Dispatches the pre-move op for the object in `slot`.
    ///
    /// # Errors
    ///
    /// [`ObjectError::DispatchOnFreeSlot`] if the slot holds no object.
    pub fn pre_move(&mut self, pool: &mut ObjectPool, slot: usize, dt: f32) -> ObjectResult<()> {
        let kind = pool.get(slot).map_or(ObjectKind::None, |r| r.kind);
        self.route(kind, slot)?.pre_move(pool, slot, dt);
        Ok(())
    }

    /// Dispatches the post-move op for the object in `slot`.
    ///
    /// # Errors
    ///
    /// [`ObjectError::DispatchOnFreeSlot`] if the slot holds no object.
    pub fn post_move(&mut self, pool: &mut ObjectPool, slot: usize, dt: f32) -> ObjectResult<()> {
        let kind = pool.get(slot).map_or(ObjectKind::None, |r| r.kind);
        self.route(kind, slot)?.post_move(pool, slot, dt);
        Ok(())
    }

    /// Dispatches the render op.
    ///
    /// # Errors
    ///
    /// [`ObjectError::DispatchOnFreeSlot`] for a `None`-kind record.
    pub fn render(&mut self, object: &ObjectRecord) -> ObjectResult<()> {
        self.route(object.kind, object.slot_index())?.render(object);
        Ok(())
    }

    /// Dispatches the delete op.
    ///
    /// # Errors
    ///
    /// [`ObjectError::DispatchOnFreeSlot`] for a `None`-kind record.
    pub fn delete(&mut self, object: &mut ObjectRecord) -> ObjectResult<()> {
        self.route(object.kind, object.slot_index())?.delete(object);
        Ok(())
    }

    /// Dispatches the ghost hook.
    ///
    /// # Errors
    ///
    /// [`ObjectError::DispatchOnFreeSlot`] for a `None`-kind record.
    pub fn ghost(&mut self, object: &mut ObjectRecord) -> ObjectResult<()> {
        self.route(object.kind, object.slot_index())?.ghost(object);
        Ok(())
    }

    /// Asks the kind's owner whether a countermeasure fires this tick.
    ///
    /// # Errors
    ///
    /// [`ObjectError::DispatchOnFreeSlot`] for a `None`-kind record.
    pub fn countermeasure_pulse(&mut self, object: &ObjectRecord) -> ObjectResult<bool> {
        Ok(self
            .route(object.kind, object.slot_index())?
            .countermeasure_pulse(object))
    }

    /// Team query.
    ///
    /// # Errors
    ///
    /// [`ObjectError::DispatchOnFreeSlot`] for a `None`-kind record.
    pub fn team(&self, object: &ObjectRecord) -> ObjectResult<Option<Team>> {
        Ok(self.route_ref(object)?.team(object))
    }

    /// Model query.
    ///
    /// # Errors
    ///
    /// [`ObjectError::DispatchOnFreeSlot`] for a `None`-kind record.
    pub fn model(&self, object: &ObjectRecord) -> ObjectResult<Option<ModelHandle>> {
        Ok(self.route_ref(object)?.model(object))
    }

    /// Hull as a fraction of full strength.
    ///
    /// Zero for non-ships and for a zero or negative hull or maximum.
    #[must_use]
    pub fn hull_fraction(&self, object: &ObjectRecord) -> f32 {
        self.ship_fraction(object, object.hull_strength, |b, o| b.max_hull_strength(o))
    }

    /// Predicted hull as a fraction of full strength. Same clamping as
    /// [`Self::hull_fraction`].
    #[must_use]
    pub fn sim_hull_fraction(&self, object: &ObjectRecord) -> f32 {
        self.ship_fraction(
            object,
            object.simulated_hull_strength,
            |b, o| b.max_hull_strength(o),
        )
    }

    /// Total shield over maximum shield; zero for non-ships or a zero
    /// maximum.
    #[must_use]
    pub fn shield_fraction(&self, object: &ObjectRecord) -> f32 {
        self.ship_fraction(
            object,
            object.shield_strength(),
            |b, o| b.max_shield_strength(o),
        )
    }

    fn ship_fraction(
        &self,
        object: &ObjectRecord,
        current: f32,
        max: fn(&dyn KindBehavior, &ObjectRecord) -> f32,
    ) -> f32 {
        if object.kind != ObjectKind::Ship {
            return 0.0;
        }
        let total = max(self.behaviors[ObjectKind::Ship.index()].as_ref(), object);
        if total <= 0.0 || current < 0.0 {
            return 0.0;
        }
        current / total
    }
}

/// Collects behaviors and checks coverage on build.
pub struct DispatchTableBuilder {
    behaviors: Vec<Option<Box<dyn KindBehavior>>>,
}

impl DispatchTableBuilder {
    fn new() -> Self {
        Self {
            behaviors: ObjectKind::ALL.iter().map(|_| None).collect(),
        }
    }

    /// Registers `behavior` for `kind`, replacing any earlier one.
    ///
    /// Registering the free-slot kind is ignored.
    #[must_use]
    pub fn register(mut self, kind: ObjectKind, behavior: impl KindBehavior + 'static) -> Self {
        if kind.is_live() {
            self.behaviors[kind.index()] = Some(Box::new(behavior));
        } else {
            tracing::warn!("ignoring behavior registered for kind None");
        }
        self
    }

    /// Registers [`NoopBehavior`] for every kind not yet registered.
    #[must_use]
    pub fn fill_noop(mut self) -> Self {
        for (kind, entry) in ObjectKind::ALL.iter().zip(self.behaviors.iter_mut()) {
            if kind.is_live() && entry.is_none() {
                *entry = Some(Box::new(NoopBehavior));
            }
        }
        self
    }

    /// Builds the table.
    ///
    /// # Errors
    ///
    /// [`ObjectError::UnregisteredKind`] naming the first live kind with no
    /// behavior.
    pub fn build(self) -> ObjectResult<TypeDispatchTable> {
        let mut behaviors = Vec::with_capacity(ObjectKind::COUNT);
        for (kind, entry) in ObjectKind::ALL.iter().zip(self.behaviors) {
            match entry {
                Some(behavior) => behaviors.push(behavior),
                None if !kind.is_live() => behaviors.push(Box::new(NoopBehavior)),
                None => return Err(ObjectError::UnregisteredKind(*kind)),
            }
        }
        Ok(TypeDispatchTable { behaviors })
    }
}
