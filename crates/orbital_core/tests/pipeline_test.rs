//! # Frame Pipeline Integration Test
//!
//! Runs whole ticks against recording collaborators and checks the order
//! and skip rules of every step.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use orbital_core::collab::{
    EulerIntegrator, NoDockAi, NoInterpolation, NullScripting, RecordingCollision,
    RecordingScripting, RecordingWeaponPasses, ScriptedDockAi, ScriptedInterpolation,
};
use orbital_core::{
    audit, queue_render, Collaborators, CollisionGateway, DockingGraph, FramePipeline,
    FrameStats, KindBehavior, ObjectFlags, ObjectKind, ObjectPool, ObjectRecord,
    PhysicsIntegrator, PhysicsState, PipelineConfig, PoolConfig, SpawnParams, TypeDispatchTable,
    WeaponPostPasses,
};
use orbital_shared::{Matrix3, Vec3};

type Trace = Rc<RefCell<Vec<String>>>;

fn pool() -> ObjectPool {
    let config = PoolConfig::with_capacity(32).with_reclaim_margin(0);
    ObjectPool::new(config, Box::new(RecordingCollision::new())).unwrap()
}

fn moving(pool: &mut ObjectPool, kind: ObjectKind, velocity: Vec3) -> usize {
    let slot = pool.create(&SpawnParams::new(kind)).unwrap();
    pool.get_mut(slot).unwrap().physics.velocity = velocity;
    slot
}

/// Default collaborators with a chosen dispatch table.
struct Harness {
    dispatch: TypeDispatchTable,
    physics: EulerIntegrator,
    scripting: RecordingScripting,
    network: ScriptedInterpolation,
    dock_ai: ScriptedDockAi,
    weapons: RecordingWeaponPasses,
}

impl Harness {
    fn new(dispatch: TypeDispatchTable) -> Self {
        Self {
            dispatch,
            physics: EulerIntegrator::default(),
            scripting: RecordingScripting::default(),
            network: ScriptedInterpolation::default(),
            dock_ai: ScriptedDockAi::default(),
            weapons: RecordingWeaponPasses::default(),
        }
    }

    fn collaborators(&mut self) -> Collaborators<'_> {
        Collaborators {
            dispatch: &mut self.dispatch,
            physics: &mut self.physics,
            scripting: &mut self.scripting,
            network: &mut self.network,
            dock_ai: &self.dock_ai,
            weapons: &mut self.weapons,
        }
    }

    fn tick(&mut self, pipeline: &mut FramePipeline, pool: &mut ObjectPool) -> FrameStats {
        pipeline.run_tick(pool, &mut self.collaborators(), 1.0)
    }
}

// ============================================================================
// TRACING COLLABORATORS
// ============================================================================

struct TraceBehavior {
    name: &'static str,
    trace: Trace,
}

impl KindBehavior for TraceBehavior {
    fn pre_move(&mut self, _pool: &mut ObjectPool, slot: usize, _dt: f32) {
        self.trace.borrow_mut().push(format!("{}.pre_move({slot})", self.name));
    }

    fn post_move(&mut self, _pool: &mut ObjectPool, slot: usize, _dt: f32) {
        self.trace.borrow_mut().push(format!("{}.post_move({slot})", self.name));
    }

    fn render(&mut self, object: &ObjectRecord) {
        self.trace
            .borrow_mut()
            .push(format!("{}.render({})", self.name, object.slot_index()));
    }
}

struct TraceIntegrator(Trace);

impl PhysicsIntegrator for TraceIntegrator {
    fn integrate(
        &mut self,
        _position: &mut Vec3,
        _orientation: &mut Matrix3,
        _physics: &mut PhysicsState,
        _dt: f32,
    ) {
        self.0.borrow_mut().push("integrate".to_owned());
    }
}

struct TraceCollision(Trace);

impl CollisionGateway for TraceCollision {
    fn register(&mut self, slot: usize) {
        self.0.borrow_mut().push(format!("register({slot})"));
    }
    fn unregister(&mut self, slot: usize) {
        self.0.borrow_mut().push(format!("unregister({slot})"));
    }
    fn reset_all(&mut self) {}
    fn sort_and_collide(&mut self, _objects: &mut [ObjectRecord]) {
        self.0.borrow_mut().push("collide".to_owned());
    }
    fn remove_expired_weapons(&mut self, _objects: &mut [ObjectRecord]) -> usize {
        0
    }
}

struct TraceWeapons(Trace);

impl WeaponPostPasses for TraceWeapons {
    fn process_countermeasures(&mut self, _pool: &mut ObjectPool, countermeasures: &[usize]) {
        self.0
            .borrow_mut()
            .push(format!("countermeasures({countermeasures:?})"));
    }
    fn beams_pre_collision(&mut self, _pool: &mut ObjectPool) {
        self.0.borrow_mut().push("beams_pre".to_owned());
    }
    fn beams_post_collision(&mut self, _pool: &mut ObjectPool) {
        self.0.borrow_mut().push("beams_post".to_owned());
    }
    fn validate_swarms(&mut self, _pool: &mut ObjectPool) {
        self.0.borrow_mut().push("swarms".to_owned());
    }
    fn update_artillery_locks(&mut self, _pool: &mut ObjectPool) {
        self.0.borrow_mut().push("artillery".to_owned());
    }
}

/// Spawns one debris from its first pre-move.
struct Spawner {
    spawned: Option<usize>,
    shared: Rc<Cell<Option<usize>>>,
}

impl KindBehavior for Spawner {
    fn pre_move(&mut self, pool: &mut ObjectPool, slot: usize, _dt: f32) {
        if self.spawned.is_none() {
            let spawn = SpawnParams::new(ObjectKind::Debris).parent(slot);
            self.spawned = pool.create(&spawn).ok();
            self.shared.set(self.spawned);
        }
    }
}

/// Kills a target from its first pre-move.
struct Killer {
    target: Option<usize>,
}

impl KindBehavior for Killer {
    fn pre_move(&mut self, pool: &mut ObjectPool, _slot: usize, _dt: f32) {
        if let Some(record) = self.target.take().and_then(|t| pool.get_mut(t)) {
            record.mark_should_be_dead();
        }
    }
}

/// Weapons with an instance index emit a countermeasure pulse.
struct Flares;

impl KindBehavior for Flares {
    fn countermeasure_pulse(&mut self, object: &ObjectRecord) -> bool {
        object.instance_index.is_some()
    }
}

// ============================================================================
// TESTS
// ============================================================================

/// Test: One tick runs every step in the documented order.
#[test]
fn test_tick_runs_steps_in_order() {
    let trace: Trace = Rc::default();
    let config = PoolConfig::with_capacity(8).with_reclaim_margin(0);
    let mut pool = ObjectPool::new(config, Box::new(TraceCollision(Rc::clone(&trace)))).unwrap();

    let ship = pool
        .create(&SpawnParams::new(ObjectKind::Ship).flags(ObjectFlags::COLLIDES))
        .unwrap();
    let record = pool.get_mut(ship).unwrap();
    let pre = Rc::clone(&trace);
    record
        .pre_move_event
        .add(move |_| pre.borrow_mut().push("pre_listener".to_owned()));
    let post = Rc::clone(&trace);
    record
        .post_move_event
        .add(move |_| post.borrow_mut().push("post_listener".to_owned()));

    let mut dispatch = TypeDispatchTable::builder()
        .register(
            ObjectKind::Ship,
            TraceBehavior {
                name: "ship",
                trace: Rc::clone(&trace),
            },
        )
        .fill_noop()
        .build()
        .unwrap();
    let mut physics = TraceIntegrator(Rc::clone(&trace));
    let mut weapons = TraceWeapons(Rc::clone(&trace));
    let mut scripting = NullScripting;
    let mut network = NoInterpolation;
    let mut collab = Collaborators {
        dispatch: &mut dispatch,
        physics: &mut physics,
        scripting: &mut scripting,
        network: &mut network,
        dock_ai: &NoDockAi,
        weapons: &mut weapons,
    };

    let mut pipeline = FramePipeline::new(PipelineConfig::default());
    let stats = pipeline.run_tick(&mut pool, &mut collab, 1.0);

    assert_eq!(
        *trace.borrow(),
        vec![
            "register(0)",
            "ship.pre_move(0)",
            "pre_listener",
            "integrate",
            "ship.post_move(0)",
            "post_listener",
            "beams_pre",
            "collide",
            "swarms",
            "beams_post",
            "artillery",
        ]
    );
    assert_eq!(stats.merged, 1);
    assert_eq!(stats.moved, 1);
    assert!(stats.collided);
    assert_eq!(pipeline.frame(), 1);
    assert_eq!(pipeline.last_stats(), &stats);
}

/// Test: Objects created mid-tick wait on the pending list until the next.
#[test]
fn test_objects_created_during_move_wait_a_tick() {
    let mut pool = pool();
    moving(&mut pool, ObjectKind::Ship, Vec3::ZERO);

    let shared = Rc::new(Cell::new(None));
    let spawner = Spawner {
        spawned: None,
        shared: Rc::clone(&shared),
    };
    let dispatch = TypeDispatchTable::builder()
        .register(ObjectKind::Ship, spawner)
        .fill_noop()
        .build()
        .unwrap();
    let mut harness = Harness::new(dispatch);
    let mut pipeline = FramePipeline::new(PipelineConfig::default());

    let first = harness.tick(&mut pipeline, &mut pool);
    let debris = shared.get().unwrap();
    assert_eq!(first.moved, 1);
    assert_eq!(pool.pending_count(), 1);
    assert_eq!(pool.parent_of(debris), Some(0));

    let second = harness.tick(&mut pipeline, &mut pool);
    assert_eq!(second.merged, 1);
    assert_eq!(second.moved, 2);
    assert_eq!(pool.pending_count(), 0);
}

/// Test: An object killed mid-tick is skipped, then reaped next tick.
#[test]
fn test_should_be_dead_skipped_then_reaped() {
    let mut pool = pool();
    moving(&mut pool, ObjectKind::Ship, Vec3::ZERO);
    let debris = moving(&mut pool, ObjectKind::Debris, Vec3::X);

    let dispatch = TypeDispatchTable::builder()
        .register(
            ObjectKind::Ship,
            Killer {
                target: Some(debris),
            },
        )
        .fill_noop()
        .build()
        .unwrap();
    let mut harness = Harness::new(dispatch);
    let mut pipeline = FramePipeline::new(PipelineConfig::default());

    let first = harness.tick(&mut pipeline, &mut pool);
    assert_eq!(first.moved, 1);
    assert!(pool.is_live(debris));
    assert_eq!(pool.get(debris).unwrap().position, Vec3::ZERO);

    let second = harness.tick(&mut pipeline, &mut pool);
    assert_eq!(second.reaped, 1);
    assert!(!pool.is_live(debris));
    assert!(audit(&pool).is_clean());
}

/// Test: Immobile objects hold still only while they have hull left.
#[test]
fn test_immobile_objects_skip_physics_while_intact() {
    let mut pool = pool();
    let rock = moving(&mut pool, ObjectKind::Asteroid, Vec3::X);
    let record = pool.get_mut(rock).unwrap();
    assert!(record.set_attribute(ObjectFlags::IMMOBILE, true));
    record.hull_strength = 10.0;

    let mut harness = Harness::new(TypeDispatchTable::all_noop());
    let mut pipeline = FramePipeline::new(PipelineConfig::default());

    harness.tick(&mut pipeline, &mut pool);
    assert_eq!(pool.get(rock).unwrap().position, Vec3::ZERO);
    assert_eq!(harness.physics.calls, 0);

    pool.get_mut(rock).unwrap().hull_strength = 0.0;
    harness.tick(&mut pipeline, &mut pool);
    assert_eq!(pool.get(rock).unwrap().position, Vec3::X);
    assert_eq!(pool.get(rock).unwrap().last_position, Vec3::ZERO);
}

/// Test: Pausing physics still runs the per-kind ops.
#[test]
fn test_paused_physics_still_dispatches() {
    let trace: Trace = Rc::default();
    let mut pool = pool();
    let ship = moving(&mut pool, ObjectKind::Ship, Vec3::X);

    let dispatch = TypeDispatchTable::builder()
        .register(
            ObjectKind::Ship,
            TraceBehavior {
                name: "ship",
                trace: Rc::clone(&trace),
            },
        )
        .fill_noop()
        .build()
        .unwrap();
    let mut harness = Harness::new(dispatch);
    let mut pipeline = FramePipeline::new(PipelineConfig {
        physics_paused: true,
        ..PipelineConfig::default()
    });

    harness.tick(&mut pipeline, &mut pool);
    assert_eq!(pool.get(ship).unwrap().position, Vec3::ZERO);
    assert_eq!(*trace.borrow(), vec!["ship.pre_move(0)", "ship.post_move(0)"]);
}

/// Test: Planar missions pin objects to the y = 0 plane.
#[test]
fn test_planar_mode_clamps_height() {
    let mut pool = pool();
    let ship = moving(&mut pool, ObjectKind::Ship, Vec3::new(1.0, 5.0, 2.0));

    let mut harness = Harness::new(TypeDispatchTable::all_noop());
    let mut pipeline = FramePipeline::new(PipelineConfig {
        planar: true,
        ..PipelineConfig::default()
    });

    harness.tick(&mut pipeline, &mut pool);
    let record = pool.get(ship).unwrap();
    assert_eq!(record.position, Vec3::new(1.0, 0.0, 2.0));
    assert_eq!(record.physics.velocity.y, 0.0);
}

/// Test: Network-interpolated objects bypass the integrator.
#[test]
fn test_interpolated_objects_bypass_integrator() {
    let mut pool = pool();
    let remote = moving(&mut pool, ObjectKind::Ship, Vec3::X);
    let local = moving(&mut pool, ObjectKind::Ship, Vec3::X);

    let mut harness = Harness::new(TypeDispatchTable::all_noop());
    harness
        .network
        .targets
        .insert(remote, Vec3::new(7.0, 7.0, 7.0));
    let mut pipeline = FramePipeline::new(PipelineConfig::default());

    harness.tick(&mut pipeline, &mut pool);
    assert_eq!(pool.get(remote).unwrap().position, Vec3::new(7.0, 7.0, 7.0));
    assert_eq!(pool.get(local).unwrap().position, Vec3::X);
    assert_eq!(harness.network.applied, 1);
    assert_eq!(harness.physics.calls, 1);
}

/// Test: Pulsing weapons are handed to the countermeasure pass.
#[test]
fn test_countermeasures_collected_during_move() {
    let mut pool = pool();
    let flare = pool
        .create(&SpawnParams::new(ObjectKind::Weapon).instance(3))
        .unwrap();
    pool.create(&SpawnParams::new(ObjectKind::Weapon)).unwrap();

    let dispatch = TypeDispatchTable::builder()
        .register(ObjectKind::Weapon, Flares)
        .fill_noop()
        .build()
        .unwrap();
    let mut harness = Harness::new(dispatch);
    let mut pipeline = FramePipeline::new(PipelineConfig::default());

    let stats = harness.tick(&mut pipeline, &mut pool);
    assert_eq!(stats.countermeasures, 1);
    assert_eq!(harness.weapons.countermeasures, vec![vec![flare]]);
    assert_eq!(
        harness.weapons.calls,
        vec!["countermeasures", "beams_pre", "swarms", "beams_post", "artillery"]
    );

    // Nothing pulses without flares.
    pool.get_mut(flare).unwrap().mark_should_be_dead();
    harness.weapons.calls.clear();
    let stats = harness.tick(&mut pipeline, &mut pool);
    assert_eq!(stats.countermeasures, 0);
    assert!(!harness.weapons.calls.contains(&"countermeasures"));
}

/// Test: Disabling collision skips only the collision pass.
#[test]
fn test_collision_can_be_disabled() {
    let collision = RecordingCollision::new();
    let log = collision.log();
    let config = PoolConfig::with_capacity(8).with_reclaim_margin(0);
    let mut pool = ObjectPool::new(config, Box::new(collision)).unwrap();
    pool.create(&SpawnParams::new(ObjectKind::Ship).flags(ObjectFlags::COLLIDES))
        .unwrap();

    let mut harness = Harness::new(TypeDispatchTable::all_noop());
    let mut pipeline = FramePipeline::new(PipelineConfig::default());
    pipeline.config_mut().collision_enabled = false;

    let stats = harness.tick(&mut pipeline, &mut pool);
    assert!(!stats.collided);
    assert_eq!(log.borrow().collide_calls, 0);
    assert_eq!(log.borrow().registered, vec![0]);
    assert_eq!(harness.weapons.calls.len(), 4);

    pipeline.config_mut().collision_enabled = true;
    harness.tick(&mut pipeline, &mut pool);
    assert_eq!(log.borrow().collide_calls, 1);
}

/// Test: Client prediction moves the player's ship and non-ships only.
#[test]
fn test_client_prediction_filters_ships() {
    let mut pool = pool();
    let player = moving(&mut pool, ObjectKind::Ship, Vec3::X);
    let other = moving(&mut pool, ObjectKind::Ship, Vec3::X);
    let missile = moving(&mut pool, ObjectKind::Weapon, Vec3::Z);
    pool.set_player_slot(Some(player));

    let mut harness = Harness::new(TypeDispatchTable::all_noop());
    let mut pipeline = FramePipeline::new(PipelineConfig::default());

    pipeline.run_client_prediction(&mut pool, &mut harness.collaborators(), 1.0);
    assert_eq!(pool.get(player).unwrap().position, Vec3::X);
    assert_eq!(pool.get(other).unwrap().position, Vec3::ZERO);
    assert_eq!(pool.get(missile).unwrap().position, Vec3::Z);
    assert!(harness.weapons.calls.is_empty());
    assert_eq!(pipeline.frame(), 0);

    let stats = pipeline.run_client_post(&mut pool, &mut harness.collaborators());
    assert_eq!(stats.moved, 2);
    assert_eq!(harness.weapons.calls.len(), 4);
    assert_eq!(pipeline.frame(), 1);
}

/// Test: Observers never move.
#[test]
fn test_observers_are_not_moved() {
    let mut pool = pool();
    let camera = moving(&mut pool, ObjectKind::Observer, Vec3::X);

    let mut harness = Harness::new(TypeDispatchTable::all_noop());
    let mut pipeline = FramePipeline::new(PipelineConfig::default());

    let stats = harness.tick(&mut pipeline, &mut pool);
    assert_eq!(stats.moved, 0);
    assert_eq!(pool.get(camera).unwrap().position, Vec3::ZERO);
}

/// Test: Docked objects follow their parent within the same tick.
#[test]
fn test_docked_objects_follow_within_tick() {
    let mut pool = pool();
    let carrier = moving(&mut pool, ObjectKind::Ship, Vec3::new(10.0, 0.0, 0.0));
    let fighter = pool
        .create(&SpawnParams::new(ObjectKind::Ship).at(Vec3::new(0.0, 0.0, 5.0)))
        .unwrap();
    DockingGraph::dock(&mut pool, carrier, fighter, 0, 0).unwrap();

    let mut harness = Harness::new(TypeDispatchTable::all_noop());
    let mut pipeline = FramePipeline::new(PipelineConfig::default());

    let stats = harness.tick(&mut pipeline, &mut pool);
    assert_eq!(stats.dock_moves, 1);
    assert_eq!(pool.get(fighter).unwrap().position, Vec3::new(10.0, 0.0, 5.0));

    // The guard resets every tick.
    let stats = harness.tick(&mut pipeline, &mut pool);
    assert_eq!(stats.dock_moves, 1);
    assert_eq!(pool.get(fighter).unwrap().position, Vec3::new(20.0, 0.0, 5.0));

    // Final undock phase: the fighter is left behind.
    harness.dock_ai.undocking.insert(fighter, carrier);
    let stats = harness.tick(&mut pipeline, &mut pool);
    assert_eq!(stats.dock_moves, 0);
    assert_eq!(pool.get(fighter).unwrap().position, Vec3::new(20.0, 0.0, 5.0));
}

/// Test: Every object in a docking cycle moves exactly once per tick.
#[test]
fn test_dock_cycle_moves_each_object_once_per_tick() {
    let mut pool = pool();
    let lead = moving(&mut pool, ObjectKind::Ship, Vec3::new(10.0, 0.0, 0.0));
    let wing = pool
        .create(&SpawnParams::new(ObjectKind::Ship).at(Vec3::X))
        .unwrap();
    let tail = pool
        .create(&SpawnParams::new(ObjectKind::Ship).at(Vec3::Z))
        .unwrap();
    DockingGraph::dock(&mut pool, lead, wing, 0, 0).unwrap();
    DockingGraph::dock(&mut pool, wing, tail, 1, 0).unwrap();
    DockingGraph::dock(&mut pool, tail, lead, 1, 1).unwrap();

    let mut harness = Harness::new(TypeDispatchTable::all_noop());
    let mut pipeline = FramePipeline::new(PipelineConfig::default());

    for tick in 1..=3_u8 {
        let stats = harness.tick(&mut pipeline, &mut pool);
        assert_eq!(stats.moved, 3, "tick {tick}");
        assert_eq!(stats.dock_moves, 2, "tick {tick}");

        let x = 10.0 * f32::from(tick);
        let position = |slot: usize| pool.get(slot).unwrap().position;
        assert!(position(lead).distance(Vec3::new(x, 0.0, 0.0)) < 1e-4);
        assert!(position(wing).distance(Vec3::new(x + 1.0, 0.0, 0.0)) < 1e-4);
        assert!(position(tail).distance(Vec3::new(x, 0.0, 1.0)) < 1e-4);
    }
    assert!(audit(&pool).is_clean());
}

/// Test: Reap frees a used slot that was allocated but never populated.
#[test]
fn test_reap_frees_unpopulated_slot() {
    let mut pool = pool();
    let ship = pool.create(&SpawnParams::new(ObjectKind::Ship)).unwrap();
    let bare = pool.allocate().unwrap();
    pool.merge_pending();
    pool.get_mut(bare).unwrap().mark_should_be_dead();

    let mut harness = Harness::new(TypeDispatchTable::all_noop());
    let mut pipeline = FramePipeline::new(PipelineConfig::default());

    let stats = harness.tick(&mut pipeline, &mut pool);
    assert_eq!(stats.reaped, 1);
    assert_eq!(stats.moved, 1);
    assert_eq!(pool.used_slots().collect::<Vec<_>>(), vec![ship]);
    assert_eq!(pool.live_count(), 1);
    assert!(audit(&pool).is_clean());

    let stats = harness.tick(&mut pipeline, &mut pool);
    assert_eq!(stats.reaped, 0);
}

/// Test: Listeners see the object before and after physics.
#[test]
fn test_move_listeners_see_each_phase() {
    let mut pool = pool();
    let ship = moving(&mut pool, ObjectKind::Ship, Vec3::X);

    let before = Rc::new(Cell::new(Vec3::new(-1.0, -1.0, -1.0)));
    let after = Rc::new(Cell::new(Vec3::new(-1.0, -1.0, -1.0)));
    let record = pool.get_mut(ship).unwrap();
    let seen = Rc::clone(&before);
    record.pre_move_event.add(move |r| seen.set(r.position));
    let seen = Rc::clone(&after);
    record.post_move_event.add(move |r| seen.set(r.position));

    let mut harness = Harness::new(TypeDispatchTable::all_noop());
    let mut pipeline = FramePipeline::new(PipelineConfig::default());
    harness.tick(&mut pipeline, &mut pool);

    assert_eq!(before.get(), Vec3::ZERO);
    assert_eq!(after.get(), Vec3::X);
    assert_eq!(pool.get(ship).unwrap().pre_move_event.len(), 1);

    pool.clear_all_listeners();
    assert!(pool.get(ship).unwrap().post_move_event.is_empty());
}

/// Test: Script overrides suppress rendering but the hook still runs.
#[test]
fn test_render_override() {
    let trace: Trace = Rc::default();
    let mut pool = pool();
    let shown = pool.create(&SpawnParams::new(ObjectKind::Ship)).unwrap();
    let hidden = pool.create(&SpawnParams::new(ObjectKind::Ship)).unwrap();
    let dead = pool.create(&SpawnParams::new(ObjectKind::Ship)).unwrap();
    pool.get_mut(dead).unwrap().mark_should_be_dead();

    let mut dispatch = TypeDispatchTable::builder()
        .register(
            ObjectKind::Ship,
            TraceBehavior {
                name: "ship",
                trace: Rc::clone(&trace),
            },
        )
        .fill_noop()
        .build()
        .unwrap();
    let mut scripting = RecordingScripting::default();
    scripting.overridden.insert(hidden);

    assert!(queue_render(&pool, shown, &mut scripting, &mut dispatch));
    assert!(!queue_render(&pool, hidden, &mut scripting, &mut dispatch));
    assert!(!queue_render(&pool, dead, &mut scripting, &mut dispatch));

    assert_eq!(*trace.borrow(), vec![format!("ship.render({shown})")]);
    let hooked: Vec<usize> = scripting.runs.iter().map(|(_, slot)| *slot).collect();
    assert_eq!(hooked, vec![shown, hidden]);
}

/// Test: A reaped weapon's slot is reused with a greater signature.
#[test]
fn test_reaped_slot_reused_with_new_signature() {
    let config = PoolConfig::with_capacity(5).with_reclaim_margin(0);
    let mut pool = ObjectPool::new(config, Box::new(RecordingCollision::new())).unwrap();
    pool.create(&SpawnParams::new(ObjectKind::Ship)).unwrap();
    let weapon = pool.create(&SpawnParams::new(ObjectKind::Weapon)).unwrap();
    pool.create(&SpawnParams::new(ObjectKind::Debris)).unwrap();
    pool.merge_pending();
    assert_eq!(pool.merge_pending(), 0);
    let old_signature = pool.get(weapon).unwrap().signature();

    pool.get_mut(weapon).unwrap().mark_should_be_dead();
    let mut harness = Harness::new(TypeDispatchTable::all_noop());
    let mut pipeline = FramePipeline::new(PipelineConfig::default());
    let stats = harness.tick(&mut pipeline, &mut pool);

    assert_eq!(stats.reaped, 1);
    assert_eq!(pool.used_count(), 2);
    assert!(!pool.used_slots().any(|s| s == weapon));

    // Slots 3 and 4 were never used, so they are handed out first.
    pool.create(&SpawnParams::new(ObjectKind::Fireball)).unwrap();
    pool.create(&SpawnParams::new(ObjectKind::Fireball)).unwrap();
    let reused = pool.create(&SpawnParams::new(ObjectKind::Weapon)).unwrap();
    assert_eq!(reused, weapon);
    assert!(pool.get(reused).unwrap().signature() > old_signature);
}
