//! # Frame Pipeline
//!
//! The fixed per-tick order every world object goes through.
//!
//! ## Tick order
//!
//! ```text
//! 1. reap        delete should-be-dead objects, clear dock guards
//! 2. merge       pending → used, register colliders
//! 3. move        per object: pre-move, physics, post-move
//! 4. dock        rigid motion to docked objects
//! 5. weapons     countermeasures, beams (pre), collision, swarm
//!                validation, beams (post), artillery locks
//! ```
//!
//! Objects created during step 3 are pending and not visited until the
//! next tick. Objects marked should-be-dead are skipped from step 3 on and
//! freed at the next tick's step 1.
//!
//! A multiplayer client runs steps 1-3 for predicted objects only with
//! [`FramePipeline::run_client_prediction`], then steps 4-5 with
//! [`FramePipeline::run_client_post`] once server state is applied.

mod steps;

use crate::collab::{
    DockAi, NetworkInterpolation, PhysicsIntegrator, ScriptHooks, WeaponPostPasses,
    HOOK_OBJECT_RENDER,
};
use crate::config::PipelineConfig;
use crate::diagnostics;
use crate::dispatch::TypeDispatchTable;
use crate::dock::{DockMode, DockingGraph};
use crate::error::ObjectError;
use crate::object::ObjectKind;
use crate::pool::ObjectPool;

use steps::MoveFilter;

/// Everything outside the core the pipeline calls into.
pub struct Collaborators<'a> {
    /// Per-kind behaviors.
    pub dispatch: &'a mut TypeDispatchTable,
    /// Motion integration.
    pub physics: &'a mut dyn PhysicsIntegrator,
    /// Scripting hooks.
    pub scripting: &'a mut dyn ScriptHooks,
    /// Network interpolation.
    pub network: &'a mut dyn NetworkInterpolation,
    /// Undock state.
    pub dock_ai: &'a dyn DockAi,
    /// Weapon passes after docking.
    pub weapons: &'a mut dyn WeaponPostPasses,
}

/// Per-tick counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Tick number.
    pub frame: u64,
    /// Objects freed by the reap step.
    pub reaped: usize,
    /// Objects merged from pending.
    pub merged: usize,
    /// Objects that went through the move step.
    pub moved: usize,
    /// Objects repositioned by dock propagation.
    pub dock_moves: usize,
    /// Active countermeasures handed to the weapon passes.
    pub countermeasures: usize,
    /// Whether the collision pass ran.
    pub collided: bool,
}

/// Drives the pool through the tick order.
#[derive(Debug)]
pub struct FramePipeline {
    config: PipelineConfig,
    docking: DockingGraph,
    countermeasures: Vec<usize>,
    frame: u64,
    current: FrameStats,
    last: FrameStats,
}

impl FramePipeline {
    /// Creates a pipeline at tick zero.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            docking: DockingGraph::new(),
            countermeasures: Vec::new(),
            frame: 0,
            current: FrameStats::default(),
            last: FrameStats::default(),
        }
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Mutable configuration, for toggling collision or physics at runtime.
    #[inline]
    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    /// Number of completed ticks.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Counters from the last completed tick.
    #[inline]
    #[must_use]
    pub const fn last_stats(&self) -> &FrameStats {
        &self.last
    }

    /// Runs one full tick.
    pub fn run_tick(
        &mut self,
        pool: &mut ObjectPool,
        collab: &mut Collaborators<'_>,
        dt: f32,
    ) -> FrameStats {
        let span = tracing::debug_span!("frame", frame = self.frame);
        let _enter = span.enter();

        self.begin(pool, collab, dt, MoveFilter::All);
        self.finish(pool, collab)
    }

    /// Client phase one: reap, merge, and move only the local player's ship
    /// and non-ship objects.
    pub fn run_client_prediction(
        &mut self,
        pool: &mut ObjectPool,
        collab: &mut Collaborators<'_>,
        dt: f32,
    ) {
        let span = tracing::debug_span!("client_prediction", frame = self.frame);
        let _enter = span.enter();

        self.begin(pool, collab, dt, MoveFilter::Predicted);
    }

    /// Client phase two: dock propagation, weapon passes and collision.
    pub fn run_client_post(
        &mut self,
        pool: &mut ObjectPool,
        collab: &mut Collaborators<'_>,
    ) -> FrameStats {
        let span = tracing::debug_span!("client_post", frame = self.frame);
        let _enter = span.enter();

        self.finish(pool, collab)
    }

    fn begin(
        &mut self,
        pool: &mut ObjectPool,
        collab: &mut Collaborators<'_>,
        dt: f32,
        filter: MoveFilter,
    ) {
        self.current = FrameStats {
            frame: self.frame,
            ..FrameStats::default()
        };
        self.countermeasures.clear();

        self.current.reaped = steps::reap(pool, collab.dispatch);
        self.current.merged = pool.merge_pending();

        let mut cursor = pool.first_used();
        while let Some(slot) = cursor {
            cursor = pool.next_in_list(slot);
            if let Some(countermeasure) =
                steps::move_object(pool, slot, dt, filter, &self.config, collab)
            {
                self.current.moved += 1;
                if countermeasure {
                    self.countermeasures.push(slot);
                }
            }
        }
    }

    fn finish(&mut self, pool: &mut ObjectPool, collab: &mut Collaborators<'_>) -> FrameStats {
        let mode = if pool.config().editor_mode {
            DockMode::Editor
        } else {
            DockMode::Simulation
        };
        let mut cursor = pool.first_used();
        while let Some(slot) = cursor {
            cursor = pool.next_in_list(slot);
            if !pool.get(slot).is_some_and(|r| r.should_be_dead()) {
                self.current.dock_moves +=
                    self.docking.propagate(pool, slot, collab.dock_ai, mode);
            }
        }

        if !self.countermeasures.is_empty() {
            collab
                .weapons
                .process_countermeasures(pool, &self.countermeasures);
            self.current.countermeasures = self.countermeasures.len();
        }

        collab.weapons.beams_pre_collision(pool);
        if self.config.collision_enabled {
            pool.sort_and_collide();
            self.current.collided = true;
        }
        collab.weapons.validate_swarms(pool);
        collab.weapons.beams_post_collision(pool);
        collab.weapons.update_artillery_locks(pool);

        tracing::debug!(
            reaped = self.current.reaped,
            merged = self.current.merged,
            moved = self.current.moved,
            dock_moves = self.current.dock_moves,
            "frame complete"
        );
        self.frame += 1;
        self.last = self.current;
        self.last
    }
}

/// Queues one object for drawing.
///
/// A script override suppresses the kind's render op; the render hook runs
/// either way.
///
/// # Returns
///
/// `true` if the kind's render op ran.
pub fn queue_render(
    pool: &ObjectPool,
    slot: usize,
    scripting: &mut dyn ScriptHooks,
    dispatch: &mut TypeDispatchTable,
) -> bool {
    let Some(record) = pool.get(slot) else {
        return false;
    };
    if record.kind == ObjectKind::None {
        let _ = diagnostics::report(
            pool.invariant_policy(),
            ObjectError::DispatchOnFreeSlot { slot },
        );
        return false;
    }
    if record.should_be_dead() {
        return false;
    }

    let overridden = scripting.is_override(HOOK_OBJECT_RENDER, record);
    scripting.run_hook(HOOK_OBJECT_RENDER, record);
    if overridden {
        return false;
    }
    dispatch.render(record).is_ok()
}
