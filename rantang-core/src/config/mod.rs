//! Runtime configuration types for the Rantang order service.
//!
//! These types represent the validated runtime configuration and are shared
//! across crates. Loading and parsing the TOML file is handled by the server
//! crate.

mod auth;
mod gateway;
mod server;

pub use auth::AuthConfig;
pub use gateway::GatewayConfig;
pub use server::ServerConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// `auth` and `gateway` are swapped in place on SIGHUP; readers pick up
/// the new values on their next request.
#[derive(Clone)]
pub struct SharedConfig {
    pub server: Arc<RwLock<ServerConfig>>,
    /// Bearer token verification.
    pub auth: Arc<RwLock<AuthConfig>>,
    /// Payment gateway credentials and endpoints.
    pub gateway: Arc<RwLock<GatewayConfig>>,
}

impl SharedConfig {
    pub fn new(server: ServerConfig, auth: AuthConfig, gateway: GatewayConfig) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            auth: Arc::new(RwLock::new(auth)),
            gateway: Arc::new(RwLock::new(gateway)),
        }
    }
}
