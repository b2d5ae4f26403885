//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::store::LogStore;

/// State injected into every handler: the log store and configuration.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LogStore>,
    pub config: Config,
}
