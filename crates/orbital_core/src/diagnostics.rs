//! # Invariant Diagnostics
//!
//! Contract violations are never silently ignored. Each one is logged at
//! `error` level and then, depending on [`InvariantPolicy`], either aborts
//! the process or is handed back to the caller, which skips the offending
//! object.
//!
//! [`audit`] walks the whole pool and lists every structural inconsistency
//! it finds. Tests call it after every mutation sequence.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ObjectError;
use crate::memory::ListId;
use crate::object::ObjectKind;
use crate::pool::ObjectPool;

/// Response to a fatal contract violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantPolicy {
    /// Log, then panic.
    Abort,
    /// Log, then return the error and keep going.
    Log,
}

impl Default for InvariantPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Abort
        } else {
            Self::Log
        }
    }
}

/// Routes a contract violation through the policy.
///
/// # Returns
///
/// `err` unchanged, for the caller to propagate.
///
/// # Panics
///
/// Under [`InvariantPolicy::Abort`].
pub fn report(policy: InvariantPolicy, err: ObjectError) -> ObjectError {
    tracing::error!(error = %err, fatal = err.is_fatal(), "object invariant violated");
    if policy == InvariantPolicy::Abort {
        panic!("object invariant violated: {err}");
    }
    err
}

/// Result of a full pool audit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuditReport {
    /// One line per inconsistency found.
    pub problems: Vec<String>,
}

impl AuditReport {
    /// True if nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Checks every structural invariant of the pool.
///
/// Slots handed out by a bare `allocate` and not yet populated are
/// reported too, so audit between complete operations.
#[must_use]
pub fn audit(pool: &ObjectPool) -> AuditReport {
    let mut problems = Vec::new();
    let capacity = pool.capacity();

    let free = pool.free_count();
    let used = pool.used_count();
    let pending = pool.pending_count();
    if free + used + pending != capacity {
        problems.push(format!(
            "lists hold {} slots, capacity is {capacity}",
            free + used + pending
        ));
    }
    if used + pending != pool.live_count() {
        problems.push(format!(
            "live count {} but {} slots on used and pending",
            pool.live_count(),
            used + pending
        ));
    }

    let mut highest = None;
    let mut signatures = HashSet::new();
    for (slot, record) in pool.records().iter().enumerate() {
        let free_slot = pool.list_of(slot) == ListId::Free;
        if free_slot != record.signature.is_none() {
            problems.push(format!(
                "slot {slot}: on {:?} with signature {}",
                pool.list_of(slot),
                record.signature.get()
            ));
        }
        if free_slot {
            if record.kind != ObjectKind::None {
                problems.push(format!("slot {slot}: free but kind {}", record.kind));
            }
            continue;
        }

        highest = Some(slot);
        if record.kind == ObjectKind::None {
            problems.push(format!("slot {slot}: live with kind None"));
        }
        if !record.signature.is_none() && !signatures.insert(record.signature) {
            problems.push(format!(
                "slot {slot}: duplicate signature {}",
                record.signature.get()
            ));
        }

        for link in record.dock_links() {
            let other = link.other.slot();
            let Some(partner) = pool.get(other) else {
                problems.push(format!("slot {slot}: dock link to missing slot {other}"));
                continue;
            };
            if partner.signature != link.other.signature() {
                problems.push(format!("slot {slot}: stale dock link to slot {other}"));
            } else if !partner
                .dock_links()
                .iter()
                .any(|back| back.other == record.handle())
            {
                problems.push(format!("slot {slot}: dock link to {other} not reciprocated"));
            }
        }
    }

    if highest != pool.highest_index() {
        problems.push(format!(
            "highest index {:?}, expected {highest:?}",
            pool.highest_index()
        ));
    }

    AuditReport { problems }
}
