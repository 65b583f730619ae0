use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rantang_sdk::objects::{PaymentStatusResponse, TransactionStatus};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CheckoutSession, GatewayError, PaymentGateway, SessionRequest};
use crate::config::GatewayConfig;

/// Per-request timeout for gateway calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the hosted checkout and transaction status APIs.
///
/// Credentials are read from the shared config on every call, so a
/// SIGHUP reload applies to the next request.
pub struct SnapGateway {
    config: Arc<RwLock<GatewayConfig>>,
    http_client: reqwest::Client,
}

impl SnapGateway {
    pub fn new(config: Arc<RwLock<GatewayConfig>>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[derive(Debug, Serialize)]
struct SnapTransactionBody {
    transaction_details: TransactionDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_details: Option<SnapCustomer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callbacks: Option<SnapCallbacks>,
}

#[derive(Debug, Serialize)]
struct TransactionDetails {
    order_id: String,
    gross_amount: i64,
}

#[derive(Debug, Serialize)]
struct SnapCustomer {
    first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct SnapCallbacks {
    finish: String,
}

#[derive(Debug, Deserialize)]
struct SnapTransactionCreated {
    token: String,
    redirect_url: String,
}

/// The status API answers HTTP 200 even for unknown orders and puts the
/// real code in the body, so everything is optional here.
#[derive(Debug, Deserialize)]
struct RawTransactionStatus {
    status_code: Option<String>,
    status_message: Option<String>,
    order_id: Option<String>,
    transaction_status: Option<String>,
    fraud_status: Option<String>,
    payment_type: Option<String>,
    gross_amount: Option<String>,
}

fn session_body(
    request: &SessionRequest,
    finish_url: Option<&url::Url>,
) -> Result<SnapTransactionBody, GatewayError> {
    // IDR has no minor unit
    let gross_amount = request
        .amount
        .round()
        .to_i64()
        .filter(|amount| *amount > 0)
        .ok_or(GatewayError::InvalidAmount(request.amount))?;
    Ok(SnapTransactionBody {
        transaction_details: TransactionDetails {
            order_id: request.order_id.to_string(),
            gross_amount,
        },
        customer_details: request.customer.as_ref().map(|c| SnapCustomer {
            first_name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
        }),
        callbacks: finish_url.map(|url| SnapCallbacks {
            finish: url.to_string(),
        }),
    })
}

fn status_response(
    order_id: Uuid,
    raw: RawTransactionStatus,
) -> Result<PaymentStatusResponse, GatewayError> {
    if raw.status_code.as_deref() == Some("404") {
        return Err(GatewayError::NotFound);
    }
    let transaction_status = raw.transaction_status.ok_or_else(|| {
        GatewayError::InvalidResponse(
            raw.status_message
                .clone()
                .unwrap_or_else(|| "missing transaction_status".to_string()),
        )
    })?;
    Ok(PaymentStatusResponse {
        order_id: raw.order_id.unwrap_or_else(|| order_id.to_string()),
        transaction_status: TransactionStatus::from_raw(&transaction_status),
        fraud_status: raw.fraud_status,
        payment_type: raw.payment_type,
        status_code: raw.status_code,
        gross_amount: raw.gross_amount,
        status_message: raw.status_message,
    })
}

#[async_trait]
impl PaymentGateway for SnapGateway {
    #[tracing::instrument(skip_all, err, fields(order_id = %request.order_id))]
    async fn create_session(
        &self,
        request: SessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let (endpoint, server_key, body) = {
            let config = self.config.read().await;
            let endpoint = config.snap_base_url.join("snap/v1/transactions")?;
            let body = session_body(&request, config.finish_redirect_url.as_ref())?;
            (endpoint, config.server_key.clone(), body)
        };

        let response = self
            .http_client
            .post(endpoint)
            .basic_auth(server_key, Some(""))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let created: SnapTransactionCreated = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        tracing::info!(order_id = %request.order_id, "Checkout session created");
        Ok(CheckoutSession {
            token: created.token,
            redirect_url: created.redirect_url,
        })
    }

    #[tracing::instrument(skip(self), err)]
    async fn transaction_status(
        &self,
        order_id: Uuid,
    ) -> Result<PaymentStatusResponse, GatewayError> {
        let (endpoint, server_key) = {
            let config = self.config.read().await;
            let endpoint = config
                .api_base_url
                .join(&format!("v2/{order_id}/status"))?;
            (endpoint, config.server_key.clone())
        };

        let response = self
            .http_client
            .get(endpoint)
            .basic_auth(server_key, Some(""))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let raw: RawTransactionStatus = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        status_response(order_id, raw)
    }
}
