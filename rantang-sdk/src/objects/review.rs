use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for `POST /reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub order_id: Uuid,
    pub seller_id: String,
    pub rating: u8,
    #[serde(default)]
    pub review: String,
}

/// Review copy attached to the order (`ulasan`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAttachmentResponse {
    pub id: Uuid,
    pub rating: u8,
    pub review: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerRatingResponse {
    pub rating_average: f64,
    pub rating_count: i64,
}

/// `seller_rating` is `None` when the aggregate could not be updated; the
/// review itself is still recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewResponse {
    pub order_id: Uuid,
    pub review: ReviewAttachmentResponse,
    pub seller_rating: Option<SellerRatingResponse>,
}
