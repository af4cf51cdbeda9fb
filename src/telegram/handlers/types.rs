//! Handler types and dependencies

use std::sync::Arc;

use crate::download::pipeline::BatchController;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub controller: Arc<BatchController>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(controller: Arc<BatchController>) -> Self {
        Self { controller }
    }
}
