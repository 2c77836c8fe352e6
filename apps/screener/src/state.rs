use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::ResumeClassifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup; read-only afterwards.
    pub classifier: Arc<ResumeClassifier>,
    pub config: Config,
}
