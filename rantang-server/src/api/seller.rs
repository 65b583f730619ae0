use axum::{Json, extract::State, response::IntoResponse};
use rantang_sdk::objects::{ApproveOrderRequest, ApproveOrderResponse};

use super::ApiError;
use crate::api::extractors::SellerAuth;
use crate::state::AppState;

/// `POST /seller/orders/approve`: approve or reject a pending order.
///
/// Approving a paid order opens a payment session; its token and
/// redirect URL are returned for the buyer's checkout.
pub(super) async fn approve_order(
    state: State<AppState>,
    SellerAuth(seller_id): SellerAuth,
    Json(body): Json<ApproveOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.lifecycle.approve_order(&seller_id, body).await?;
    let session = order.payment_session.as_ref();
    Ok(Json(ApproveOrderResponse {
        order_id: order.id,
        status_progress: order.status_progress,
        payment_status: order.payment_status,
        snap_token: session.map(|s| s.token.clone()),
        snap_url: session.map(|s| s.redirect_url.clone()),
        rejection_reason: order.rejection_reason.clone(),
    }))
}
