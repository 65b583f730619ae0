//! TOML file configuration structures.
//!
//! These structs directly map to the `rantang-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// Bearer token section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the registration service.
    pub jwt_secret: String,
}

/// Payment gateway section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub server_key: String,
    #[serde(default = "default_snap_base_url")]
    pub snap_base_url: Url,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: Url,
    #[serde(default)]
    pub finish_redirect_url: Option<Url>,
    #[serde(default = "default_verify_signature")]
    pub verify_signature: bool,
}

fn default_snap_base_url() -> Url {
    sandbox_url("https://app.sandbox.midtrans.com/")
}

fn default_api_base_url() -> Url {
    sandbox_url("https://api.sandbox.midtrans.com/")
}

fn sandbox_url(raw: &str) -> Url {
    Url::parse(raw).expect("valid default URL")
}

fn default_verify_signature() -> bool {
    true
}
