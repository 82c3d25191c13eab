//! # Engine Limits
//!
//! Compile-time defaults for the object pool and the frame pipeline.
//!
//! Every value here is only a default: the runtime values come from
//! `SimConfig` in `orbital_core`, which falls back to these when a field is
//! missing from the TOML file.

// =============================================================================
// OBJECT POOL
// =============================================================================

/// Default hard ceiling on simultaneously live objects.
pub const MAX_OBJECTS: usize = 5000;

/// Allocation starts reclaiming when fewer than this many slots remain.
pub const RECLAIM_MARGIN: usize = 10;

/// Shield quadrants given to every new object. Ship creation may override.
pub const DEFAULT_SHIELD_SECTIONS: usize = 4;

// =============================================================================
// FRAME PIPELINE
// =============================================================================

/// Tick rate (simulation frames per second)
pub const TICK_RATE: u32 = 60;

/// Fixed timestep matching [`TICK_RATE`], in seconds.
pub const TICK_DT: f32 = 1.0 / TICK_RATE as f32;
