use std::sync::Arc;

use crate::capabilities::CapabilityRegistry;
use crate::config::Config;
use crate::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CapabilityRegistry>,
    pub pipeline: Arc<Pipeline>,
    pub config: Config,
}
