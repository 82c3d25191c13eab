//! # ORBITAL Shared
//!
//! Common types used by the simulation core and its collaborators.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on the object pool or on any per-type
//! simulation module. If a type needs to know about objects, it belongs in
//! `orbital_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{DEFAULT_SHIELD_SECTIONS, MAX_OBJECTS, RECLAIM_MARGIN, TICK_DT, TICK_RATE};
pub use math::{Matrix3, Vec3};
