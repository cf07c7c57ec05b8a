use std::sync::Arc;

use crate::config::Config;
use crate::roasts::service::EntryService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Owns the storage backend picked at startup (`Arc<dyn StorageBackend>`).
    pub roasts: Arc<EntryService>,
}
