//! Bearer token configuration.

/// Secret shared with the registration service that issues buyer and
/// seller tokens (HS256).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Box<[u8]>,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<Box<[u8]>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Get the secret key bytes for token verification.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.jwt_secret
    }
}
