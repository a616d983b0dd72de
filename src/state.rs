//! Shared application state for all routes. Stores are injected so tests can swap in memory.

use crate::store::{AuthRepository, MemoryStore, StudentRepository};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentRepository>,
    pub auth: Arc<dyn AuthRepository>,
}

impl AppState {
    /// Both repositories backed by one store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: StudentRepository + AuthRepository + 'static,
    {
        AppState {
            students: store.clone(),
            auth: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }
}
