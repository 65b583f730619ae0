//! Configuration module for rantang-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::FileConfig;
use rantang_core::config::{AuthConfig, GatewayConfig, ServerConfig, SharedConfig};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Secrets shorter than this are accepted with a warning.
const MIN_JWT_SECRET_LEN: usize = 32;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with Arc<RwLock<T>> wrappers.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(self.server, self.auth, self.gateway)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_from_str(&config_content)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn load_from_str(&self, content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        self.validate(&file_config)?;
        Ok(build_loaded_config(file_config))
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if config.auth.jwt_secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.jwt_secret must not be empty".to_string(),
            ));
        }
        if config.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            tracing::warn!(
                "auth.jwt_secret is shorter than {} bytes",
                MIN_JWT_SECRET_LEN
            );
        }
        if config.gateway.server_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gateway.server_key must not be empty".to_string(),
            ));
        }
        for (name, url) in [
            ("gateway.snap_base_url", &config.gateway.snap_base_url),
            ("gateway.api_base_url", &config.gateway.api_base_url),
        ] {
            if url.cannot_be_a_base() {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be a base URL"
                )));
            }
        }
        Ok(())
    }
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
        },
        auth: AuthConfig::new(file_config.auth.jwt_secret.into_bytes()),
        gateway: GatewayConfig {
            server_key: file_config.gateway.server_key,
            snap_base_url: file_config.gateway.snap_base_url,
            api_base_url: file_config.gateway.api_base_url,
            finish_redirect_url: file_config.gateway.finish_redirect_url,
            verify_signature: file_config.gateway.verify_signature,
        },
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[server]
listen = "127.0.0.1:3000"

[auth]
jwt_secret = "0123456789abcdef0123456789abcdef"

[gateway]
server_key = "SB-Mid-server-abc"
"#;

    #[test]
    fn test_listen_override_wins() {
        let override_addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let loader = ConfigLoader::new("unused.toml", Some(override_addr));
        let loaded = loader.load_from_str(CONFIG).unwrap();
        assert_eq!(loaded.server.listen, override_addr);
        assert_eq!(loaded.auth.secret_bytes(), b"0123456789abcdef0123456789abcdef");
        assert!(loaded.gateway.verify_signature);
    }

    #[test]
    fn test_empty_server_key_rejected() {
        let loader = ConfigLoader::new("unused.toml", None);
        let content = CONFIG.replace("SB-Mid-server-abc", " ");
        assert!(matches!(
            loader.load_from_str(&content),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
