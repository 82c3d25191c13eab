//! Per-object move listeners.
//!
//! The scripting collaborator attaches closures here; the pipeline fires
//! them right after the per-kind pre-move and post-move ops.

use std::fmt;

use super::record::ObjectRecord;

/// A listener fired once per tick with read access to its object.
pub type MoveListener = Box<dyn FnMut(&ObjectRecord)>;

/// Ordered list of move listeners.
#[derive(Default)]
pub struct MoveEvent {
    listeners: Vec<MoveListener>,
}

impl MoveEvent {
    /// Appends a listener. Listeners fire in insertion order.
    pub fn add<F>(&mut self, listener: F)
    where
        F: FnMut(&ObjectRecord) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True if nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Drops every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub(crate) fn fire(&mut self, object: &ObjectRecord) {
        for listener in &mut self.listeners {
            listener(object);
        }
    }
}

impl fmt::Debug for MoveEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveEvent")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
