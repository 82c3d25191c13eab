//! # Object Error Types
//!
//! All errors that can occur in the object core.
//!
//! Only [`ObjectError::Exhausted`] is an expected runtime outcome. Everything
//! classified by [`ObjectError::is_fatal`] means a collaborator broke a
//! contract and is routed through [`crate::diagnostics`].

use thiserror::Error;

use crate::object::ObjectKind;

/// Errors that can occur in the object core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// Every slot is live even after reclamation.
    #[error("object pool exhausted: all {capacity} slots in use")]
    Exhausted {
        /// Pool capacity.
        capacity: usize,
    },

    /// Slot index outside the pool.
    #[error("slot {slot} out of range (capacity {capacity})")]
    InvalidSlot {
        /// The offending slot.
        slot: usize,
        /// Pool capacity.
        capacity: usize,
    },

    /// Tried to free a slot that is already on the free list.
    #[error("slot {slot} freed twice")]
    DoubleFree {
        /// The offending slot.
        slot: usize,
    },

    /// A free slot reached per-kind dispatch, meaning it leaked into the used list.
    #[error("dispatch on freed slot {slot}")]
    DispatchOnFreeSlot {
        /// The offending slot.
        slot: usize,
    },

    /// A flag change the controlled mutation path refuses.
    #[error("illegal flag transition on slot {slot} ({kind}): {reason}")]
    IllegalFlagTransition {
        /// The offending slot.
        slot: usize,
        /// Kind of the object.
        kind: ObjectKind,
        /// What was refused.
        reason: &'static str,
    },

    /// Create was asked for the free-slot kind.
    #[error("cannot create an object of kind None")]
    CreateNone,

    /// The dispatch table was built without a behavior for this kind.
    #[error("no behavior registered for kind {0}")]
    UnregisteredKind(ObjectKind),

    /// Handle signature no longer matches its slot.
    #[error("stale object handle")]
    StaleHandle,

    /// The two objects are already docked to each other.
    #[error("slots {a} and {b} are already docked")]
    AlreadyDocked {
        /// First object.
        a: usize,
        /// Second object.
        b: usize,
    },

    /// The two objects are not docked to each other.
    #[error("slots {a} and {b} are not docked")]
    NotDocked {
        /// First object.
        a: usize,
        /// Second object.
        b: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ObjectError {
    /// Returns true for contract violations that abort under the strict policy.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DoubleFree { .. }
                | Self::DispatchOnFreeSlot { .. }
                | Self::IllegalFlagTransition { .. }
                | Self::CreateNone
                | Self::UnregisteredKind(_)
        )
    }
}

/// Result type for object core operations.
pub type ObjectResult<T> = Result<T, ObjectError>;
