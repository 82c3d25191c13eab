//! # Tick Soak
//!
//! Runs the frame pipeline over a busy synthetic battle and audits the pool
//! afterwards:
//! - 50 fighters firing every 10 ticks
//! - Weapons expiring at a fixed range
//! - A carrier with docked escorts turning in place
//!
//! Usage: `tick_soak [config.toml]`. Set `RUST_LOG=debug` for per-frame logs.

use std::collections::HashMap;
use std::time::Instant;

use orbital_core::collab::{
    EulerIntegrator, NoDockAi, NoInterpolation, NullCollision, NullScripting, NullWeaponPasses,
};
use orbital_core::{
    audit, Collaborators, DockingGraph, FramePipeline, KindBehavior, ObjectFlags, ObjectKind,
    ObjectPool, ObjectRecord, ObjectResult, SimConfig, SpawnParams, TypeDispatchTable,
};
use orbital_shared::{Matrix3, Vec3, TICK_DT, TICK_RATE};

const FIGHTERS: usize = 50;
const ESCORTS: usize = 4;
const DURATION_SECS: u64 = 30;
const FIRE_INTERVAL: u32 = 10;
const WEAPON_SPEED: f32 = 200.0;
const WEAPON_RANGE: f32 = 1000.0;

/// Fighters fire straight ahead on a fixed cadence.
#[derive(Default)]
struct Fighters {
    cooldowns: HashMap<usize, u32>,
}

impl KindBehavior for Fighters {
    fn pre_move(&mut self, pool: &mut ObjectPool, slot: usize, _dt: f32) {
        let Some(ship) = pool.get(slot) else {
            return;
        };
        if ship.physics.velocity.length() < f32::EPSILON {
            // Carrier and escorts do not shoot.
            return;
        }

        let cooldown = self.cooldowns.entry(slot).or_insert(0);
        *cooldown += 1;
        if *cooldown < FIRE_INTERVAL {
            return;
        }
        *cooldown = 0;

        let spawn = SpawnParams::new(ObjectKind::Weapon)
            .parent(slot)
            .at(ship.position)
            .oriented(ship.orientation)
            .radius(0.5)
            .flags(ObjectFlags::COLLIDES);
        let heading = ship.orientation.fvec;
        match pool.create(&spawn) {
            Ok(weapon) => {
                if let Some(record) = pool.get_mut(weapon) {
                    record.physics.velocity = heading * WEAPON_SPEED;
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "shot dropped");
            }
        }
    }
}

/// Weapons die once they are out of range of where they were fired.
struct Weapons {
    origins: HashMap<u64, Vec3>,
}

impl KindBehavior for Weapons {
    fn post_move(&mut self, pool: &mut ObjectPool, slot: usize, _dt: f32) {
        let Some(record) = pool.get_mut(slot) else {
            return;
        };
        let origin = *self
            .origins
            .entry(record.signature().get())
            .or_insert(record.last_position);
        if record.position.distance(origin) > WEAPON_RANGE {
            record.mark_should_be_dead();
        }
    }

    fn delete(&mut self, object: &mut ObjectRecord) {
        self.origins.remove(&object.signature().get());
    }
}

#[allow(clippy::cast_precision_loss)]
fn spawn_fleet(pool: &mut ObjectPool) -> ObjectResult<()> {
    for i in 0..FIGHTERS {
        let angle = i as f32 / FIGHTERS as f32 * std::f32::consts::TAU;
        let slot = pool.create(
            &SpawnParams::new(ObjectKind::Ship)
                .at(Vec3::new(angle.cos() * 500.0, 0.0, angle.sin() * 500.0))
                .oriented(Matrix3::from_yaw(angle))
                .radius(10.0)
                .flags(ObjectFlags::COLLIDES),
        )?;
        if let Some(record) = pool.get_mut(slot) {
            record.physics.velocity = record.orientation.fvec * 40.0;
            record.hull_strength = 100.0;
        }
    }

    let carrier = pool.create(
        &SpawnParams::new(ObjectKind::Ship)
            .radius(300.0)
            .flags(ObjectFlags::COLLIDES),
    )?;
    if let Some(record) = pool.get_mut(carrier) {
        record.physics.rotational_velocity = Vec3::new(0.0, 0.1, 0.0);
        record.hull_strength = 5000.0;
    }
    for (i, dockpoint) in (0..ESCORTS).zip(0_i32..) {
        let escort = pool.create(
            &SpawnParams::new(ObjectKind::Ship)
                .at(Vec3::new(0.0, 50.0, 100.0 + i as f32 * 60.0))
                .radius(20.0),
        )?;
        DockingGraph::dock(pool, carrier, escort, dockpoint, 0)?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SimConfig::from_toml_file(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(error = %err, "failed to load config");
                std::process::exit(2);
            }
        },
        None => SimConfig::default(),
    };

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                 ORBITAL - PIPELINE SOAK TEST                     ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!("  Capacity:   {} slots", config.pool.capacity);
    println!("  Fighters:   {FIGHTERS}");
    println!("  Duration:   {DURATION_SECS} s at {TICK_RATE} Hz");
    println!();

    let mut pool = match ObjectPool::new(config.pool.clone(), Box::new(NullCollision)) {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(error = %err, "failed to create pool");
            std::process::exit(2);
        }
    };
    if let Err(err) = spawn_fleet(&mut pool) {
        tracing::error!(error = %err, "failed to spawn fleet");
        std::process::exit(2);
    }

    let mut dispatch = match TypeDispatchTable::builder()
        .register(ObjectKind::Ship, Fighters::default())
        .register(
            ObjectKind::Weapon,
            Weapons {
                origins: HashMap::new(),
            },
        )
        .fill_noop()
        .build()
    {
        Ok(table) => table,
        Err(err) => {
            tracing::error!(error = %err, "failed to build dispatch table");
            std::process::exit(2);
        }
    };

    let mut physics = EulerIntegrator::default();
    let mut scripting = NullScripting;
    let mut network = NoInterpolation;
    let mut weapons = NullWeaponPasses;
    let mut pipeline = FramePipeline::new(config.pipeline);

    let total_ticks = DURATION_SECS * u64::from(TICK_RATE);
    let mut peak_live = 0;
    let mut total_reaped = 0;
    let start = Instant::now();

    for _ in 0..total_ticks {
        let mut collab = Collaborators {
            dispatch: &mut dispatch,
            physics: &mut physics,
            scripting: &mut scripting,
            network: &mut network,
            dock_ai: &NoDockAi,
            weapons: &mut weapons,
        };
        let stats = pipeline.run_tick(&mut pool, &mut collab, TICK_DT);
        peak_live = peak_live.max(pool.live_count());
        total_reaped += stats.reaped;
    }

    let elapsed = start.elapsed();
    let report = audit(&pool);

    println!("┌─ RESULTS ────────────────────────────────────────────────────────┐");
    println!("  Ticks:          {}", pipeline.frame());
    println!("  Wall time:      {elapsed:.2?}");
    println!(
        "  Per tick:       {:.2?}",
        elapsed / u32::try_from(total_ticks).unwrap_or(u32::MAX)
    );
    println!("  Peak live:      {peak_live}");
    println!("  Reaped:         {total_reaped}");
    println!("  Created:        {}", pool.stats().created);
    println!("  Reclaim passes: {}", pool.stats().reclaim_passes);
    println!("  Audit:          {}", if report.is_clean() { "clean" } else { "FAILED" });
    println!("└──────────────────────────────────────────────────────────────────┘");

    if !report.is_clean() {
        for problem in &report.problems {
            tracing::error!(%problem, "pool audit");
        }
        std::process::exit(1);
    }
}
