//! # World Objects
//!
//! The per-slot record and the small value types hanging off it.
//!
//! ## Design Philosophy
//!
//! - Records are plain data with no virtual dispatch
//! - Identity is slot + signature; slots are reused, signatures never are
//! - Per-type behavior is routed through the dispatch table, not stored here

mod event;
mod flags;
mod kind;
mod record;

pub use event::{MoveEvent, MoveListener};
pub use flags::ObjectFlags;
pub use kind::ObjectKind;
pub use record::{DockLink, ObjectHandle, ObjectRecord, PhysicsFlags, PhysicsState, Signature};
