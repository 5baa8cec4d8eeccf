//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use randex_core::SamplingStore;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Sampling store decorating the delegate indexer
    pub store: Arc<SamplingStore>,
}
