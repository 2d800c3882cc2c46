//! bozokbot-web: chat front end for the BozokBot question-answering backend.
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod services;
pub mod startup;

use services::QaBackend;
use std::sync::Arc;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn QaBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn QaBackend>) -> Self {
        Self { backend }
    }
}
