//! # ORBITAL Core
//!
//! Object lifecycle and per-frame simulation pipeline for a space-combat
//! engine:
//! - Fixed-capacity pool with free/used/pending membership lists
//! - Slot + signature identity that survives slot reuse
//! - Docking graph with rigid motion propagation
//! - Kind -> behavior dispatch to the subsystems that own each kind
//!
//! ## Architecture Rules
//!
//! 1. **Single simulation thread** - No locks; collaborators are called
//!    synchronously inside the tick
//! 2. **Pre-allocated slots** - The pool never grows; pressure triggers
//!    reclamation, then allocation failure
//! 3. **Deferred lifecycle** - Creation lands on the pending list, deletion
//!    is a should-be-dead mark; both settle at the next tick
//!
//! ## Example
//!
//! ```rust,ignore
//! use orbital_core::{FramePipeline, ObjectPool, PoolConfig, SpawnParams, ObjectKind};
//!
//! let mut pool = ObjectPool::new(PoolConfig::default(), Box::new(collision))?;
//! let ship = pool.create(&SpawnParams::new(ObjectKind::Ship))?;
//! pipeline.run_tick(&mut pool, &mut collaborators, TICK_DT);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod collab;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod dock;
pub mod error;
pub mod memory;
pub mod object;
pub mod pipeline;
pub mod pool;

pub use collab::{
    CollisionGateway, DockAi, NetworkInterpolation, PhysicsIntegrator, ScriptHooks,
    WeaponPostPasses,
};
pub use config::{NetworkRole, PipelineConfig, PoolConfig, ReclaimStage, SimConfig};
pub use diagnostics::{audit, AuditReport, InvariantPolicy};
pub use dispatch::{KindBehavior, ModelHandle, NoopBehavior, Team, TypeDispatchTable};
pub use dock::{DockMode, DockingGraph};
pub use error::{ObjectError, ObjectResult};
pub use object::{
    DockLink, MoveEvent, ObjectFlags, ObjectHandle, ObjectKind, ObjectRecord, PhysicsState,
    Signature,
};
pub use pipeline::{queue_render, Collaborators, FramePipeline, FrameStats};
pub use pool::{DeleteOutcome, ObjectPool, PoolStats, SpawnParams};
