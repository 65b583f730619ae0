use axum::{Json, extract::State, response::IntoResponse};
use rantang_sdk::objects::{SubmitReviewRequest, SubmitReviewResponse};

use super::ApiError;
use crate::api::extractors::BuyerAuth;
use crate::state::AppState;

/// `POST /reviews`: review a completed order.
///
/// `sellerRating` is absent when the seller aggregate could not be
/// updated; the review itself is stored either way.
pub(super) async fn submit_review(
    state: State<AppState>,
    BuyerAuth(buyer_id): BuyerAuth,
    Json(body): Json<SubmitReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.lifecycle.submit_review(&buyer_id, body).await?;
    Ok(Json(SubmitReviewResponse {
        order_id: outcome.order.id,
        review: (&outcome.review).into(),
        seller_rating: outcome.seller_rating.map(Into::into),
    }))
}
