// src/web/state.rs
// Web server state management

use std::sync::Arc;

use crate::correlation::CorrelationEngine;
use crate::llm::Dispatcher;
use crate::storage::LocalImageStore;
use crate::voice::CredentialIssuer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Correlation tables, image store and injection logic
    pub engine: Arc<CorrelationEngine>,

    /// Model backend completions are forwarded to
    pub dispatcher: Arc<dyn Dispatcher>,

    /// Voice platform credential source for `/api/session`
    pub credentials: Arc<dyn CredentialIssuer>,

    /// Same store the engine writes to, addressed by file name for serving
    pub images: Arc<LocalImageStore>,
}

impl AppState {
    pub fn new(
        engine: Arc<CorrelationEngine>,
        dispatcher: Arc<dyn Dispatcher>,
        credentials: Arc<dyn CredentialIssuer>,
        images: Arc<LocalImageStore>,
    ) -> Self {
        Self {
            engine,
            dispatcher,
            credentials,
            images,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.engine.options().max_upload_bytes
    }
}
