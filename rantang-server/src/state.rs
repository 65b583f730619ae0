//! Application state shared across all request handlers.

use rantang_core::config::SharedConfig;
use rantang_core::lifecycle::OrderLifecycle;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Order lifecycle services over the configured record store.
    pub lifecycle: OrderLifecycle,
    /// Runtime configuration (auth and gateway sections reload on SIGHUP).
    pub config: SharedConfig,
}

impl AppState {
    pub fn new(lifecycle: OrderLifecycle, config: SharedConfig) -> Self {
        Self { lifecycle, config }
    }
}
