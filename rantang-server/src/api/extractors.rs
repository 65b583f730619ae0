//! Custom Axum extractors for request authentication.
//!
//! Provides:
//! - `BuyerAuth` / `SellerAuth`: require a bearer token with the given role.
//! - `PartyAuth`: accepts either role and yields a [`Party`].
//!
//! Tokens are HS256 JWTs issued by the registration service, carrying
//! `{sub, role, exp}`.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use rantang_core::entities::Party;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Buyer or seller id.
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

impl From<Claims> for Party {
    fn from(claims: Claims) -> Self {
        match claims.role {
            Role::Buyer => Party::Buyer(claims.sub),
            Role::Seller => Party::Seller(claims.sub),
        }
    }
}

/// Errors returned by the bearer-token extractors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("invalid Authorization header format")]
    InvalidHeader,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("token role not allowed")]
    WrongRole,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingHeader => {
                (StatusCode::UNAUTHORIZED, "missing Authorization header")
            }
            AuthError::InvalidHeader => (
                StatusCode::UNAUTHORIZED,
                "invalid Authorization header format",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid or expired token"),
            AuthError::WrongRole => (StatusCode::FORBIDDEN, "token role not allowed"),
        };
        (status, message).into_response()
    }
}

async fn verified_claims(parts: &Parts, state: &AppState) -> Result<Claims, AuthError> {
    let header_value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader)?;

    let token = header_value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::InvalidHeader)?;

    let auth = state.config.auth.read().await;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.secret_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejecting bearer token");
        AuthError::InvalidToken
    })?;
    drop(auth);

    Ok(data.claims)
}

/// An authenticated buyer. Holds the buyer id.
pub struct BuyerAuth(pub String);

impl FromRequestParts<AppState> for BuyerAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verified_claims(parts, state).await?;
        match claims.role {
            Role::Buyer => Ok(BuyerAuth(claims.sub)),
            Role::Seller => Err(AuthError::WrongRole),
        }
    }
}

/// An authenticated seller. Holds the seller id.
pub struct SellerAuth(pub String);

impl FromRequestParts<AppState> for SellerAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verified_claims(parts, state).await?;
        match claims.role {
            Role::Seller => Ok(SellerAuth(claims.sub)),
            Role::Buyer => Err(AuthError::WrongRole),
        }
    }
}

/// Either a buyer or a seller.
pub struct PartyAuth(pub Party);

impl FromRequestParts<AppState> for PartyAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verified_claims(parts, state).await?;
        Ok(PartyAuth(claims.into()))
    }
}

/// Sign a token the way the registration service does.
#[cfg(test)]
pub(crate) fn issue_token(secret: &[u8], sub: &str, role: Role) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let exp = time::OffsetDateTime::now_utc().unix_timestamp() + 3600;
    let claims = Claims {
        sub: sub.to_string(),
        role,
        exp: exp as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}
