use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rantang_sdk::objects::PaymentNotification;
use uuid::Uuid;

use super::ApiError;
use crate::api::extractors::PartyAuth;
use crate::state::AppState;

/// `POST /payments/notification`: gateway webhook.
///
/// Answers `200 OK` both when the notification was applied and when the
/// order had already moved on. Any other failure is non-2xx so the
/// gateway retries.
pub(super) async fn notification(
    state: State<AppState>,
    Json(body): Json<PaymentNotification>,
) -> Result<impl IntoResponse, ApiError> {
    let server_key = {
        let gateway = state.config.gateway.read().await;
        gateway
            .verify_signature
            .then(|| gateway.server_key.clone())
    };

    state
        .lifecycle
        .reconcile_payment(body, server_key.as_deref())
        .await?;
    Ok((StatusCode::OK, "OK"))
}

/// `GET /payments/status/{order_id}`: live transaction status from the gateway.
pub(super) async fn payment_status(
    state: State<AppState>,
    PartyAuth(party): PartyAuth,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.lifecycle.payment_status(&party, order_id).await?;
    Ok(Json(status))
}
