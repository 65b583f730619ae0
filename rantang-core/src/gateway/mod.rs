//! Payment gateway client.
//!
//! The lifecycle services only see [`PaymentGateway`]; [`SnapGateway`]
//! talks to the hosted checkout (Snap) and the transaction status API.

mod snap;

pub use snap::SnapGateway;

use async_trait::async_trait;
use rantang_sdk::objects::PaymentStatusResponse;
use rust_decimal::Decimal;
use uuid::Uuid;

/// What the gateway needs to open a checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    /// Doubles as the gateway's transaction reference.
    pub order_id: Uuid,
    pub amount: Decimal,
    pub customer: Option<CustomerDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A hosted checkout session (`snapToken` / `snapUrl`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("gateway endpoint error: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("gateway rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("transaction not found at the gateway")]
    NotFound,

    #[error("amount {0} cannot be charged")]
    InvalidAmount(Decimal),

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a hosted checkout session for the order.
    async fn create_session(&self, request: SessionRequest)
    -> Result<CheckoutSession, GatewayError>;

    /// Ask the gateway for the current state of the order's transaction.
    async fn transaction_status(&self, order_id: Uuid)
    -> Result<PaymentStatusResponse, GatewayError>;
}
