//! # Cancellation registry.
//!
//! Tracks one [`CancellationToken`] per executing closure so shutdown can signal
//! all of them at once.
//!
//! ## Rules
//! - A handle is registered when an attempt starts.
//! - It is removed exactly once, when the closure settles. After a timeout the slot
//!   is freed right away but the handle stays until the closure really finishes.
//! - Tasks only ever see their own token, never the registry.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

/// Key of a registered handle.
pub(crate) type HandleId = u64;

/// Registry of live cancellation handles.
pub(crate) struct CancelRegistry {
    handles: HashMap<HandleId, CancellationToken>,
    next_id: HandleId,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
            next_id: 0,
        }
    }

    /// Creates and registers a fresh token.
    pub fn register(&mut self) -> (HandleId, CancellationToken) {
        let id = self.next_id;
        self.next_id += 1;
        let token = CancellationToken::new();
        self.handles.insert(id, token.clone());
        (id, token)
    }

    /// Removes a handle; returns `false` if it was already gone.
    pub fn unregister(&mut self, id: HandleId) -> bool {
        self.handles.remove(&id).is_some()
    }

    /// Triggers every registered token and returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        for token in self.handles.values() {
            token.cancel();
        }
        self.handles.len()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }
}
