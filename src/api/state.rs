//! Application state for the Attendance Reconciliation Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::reconciliation::Reconciler;

/// Shared application state.
///
/// Holds the immutable reconciler built from the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    reconciler: Arc<Reconciler>,
}

impl AppState {
    /// Creates a new application state from a configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            reconciler: Arc::new(Reconciler::new(config.into_config())),
        }
    }

    /// Returns the shared reconciler.
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }
}
