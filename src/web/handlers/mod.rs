//! API handlers for the Web API.

pub mod file;

pub use file::*;

use crate::file::FileStore;

/// Application state shared across handlers.
///
/// Holds nothing mutable: every request works directly against the store
/// directory.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The file store.
    pub store: FileStore,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }
}
