//! HTTP API handlers.
//!
//! Buyers and sellers authenticate with a bearer JWT (see [`extractors`]).
//! The gateway notification endpoint takes no token and is checked by
//! signature instead.
//!
//! # Endpoints
//!
//! - `POST  /orders`                                - create an order (buyer)
//! - `GET   /orders`                                - list own orders
//! - `GET   /orders/{order_id}`                     - read one order
//! - `PATCH /orders/{order_id}`                     - progress or daily log (seller)
//! - `POST  /orders/{order_id}/complete-daily-delivery` - daily log (seller)
//! - `GET   /orders/{order_id}/delivery-logs`       - recurring delivery summary
//! - `GET   /orders/{order_id}/ws`                  - WebSocket order status stream
//! - `POST  /seller/orders/approve`                 - approve or reject (seller)
//! - `POST  /payments/notification`                 - gateway webhook
//! - `GET   /payments/status/{order_id}`            - gateway status proxy
//! - `POST  /reviews`                               - review a completed order (buyer)

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rantang_core::lifecycle::LifecycleError;

use crate::state::AppState;

pub mod extractors;
mod orders;
mod payments;
mod reviews;
mod seller;
mod ws;

#[cfg(test)]
mod tests;

/// Build the API router (mounted under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::create_order).get(orders::list_orders))
        .route(
            "/orders/{order_id}",
            get(orders::get_order).patch(orders::update_order),
        )
        .route(
            "/orders/{order_id}/complete-daily-delivery",
            post(orders::complete_daily_delivery),
        )
        .route(
            "/orders/{order_id}/delivery-logs",
            get(orders::delivery_logs),
        )
        .route("/orders/{order_id}/ws", get(ws::order_status_ws))
        .route("/seller/orders/approve", post(seller::approve_order))
        .route("/payments/notification", post(payments::notification))
        .route(
            "/payments/status/{order_id}",
            get(payments::payment_status),
        )
        .route("/reviews", post(reviews::submit_review))
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in API handlers.
#[derive(Debug)]
pub(crate) struct ApiError(LifecycleError);

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LifecycleError::Validation(_) | LifecycleError::InvalidOperation(_) => {
                StatusCode::BAD_REQUEST
            }
            LifecycleError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LifecycleError::Forbidden(_) => StatusCode::FORBIDDEN,
            LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
            LifecycleError::Conflict(_) | LifecycleError::Contended(_) => StatusCode::CONFLICT,
            LifecycleError::Gateway(e) => {
                tracing::error!(error = %e, "API payment gateway error");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "payment gateway unavailable, retry later",
                )
                    .into_response();
            }
            LifecycleError::Store(e) => {
                tracing::error!(error = %e, "API store error");
                return (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                    .into_response();
            }
        };
        (status, self.0.to_string()).into_response()
    }
}
