//! # Memory Management
//!
//! Pre-allocated slot bookkeeping for the object pool.
//!
//! ## Design Philosophy
//!
//! All slots are allocated once at init. During gameplay:
//! - No heap allocations for membership changes
//! - Links are indices, never addresses
//! - Predictable, flat latency

mod list;

pub use list::{ListId, SlotLists};
