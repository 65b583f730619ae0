use kanau::processor::Processor;
use rantang_sdk::objects::{StatusProgress, SubmitReviewRequest};
use uuid::Uuid;

use super::{Change, LifecycleError, OrderLifecycle};
use crate::entities::order::{Order, ReviewAttachment};
use crate::entities::review::{InsertReviewRecord, ReviewRecord};
use crate::entities::seller::{ApplySellerRating, SellerRating};

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    pub order: Order,
    pub review: ReviewAttachment,
    /// `None` when the seller aggregate could not be updated.
    pub seller_rating: Option<SellerRating>,
}

impl OrderLifecycle {
    /// Attach the buyer's review to a completed order and fold the rating
    /// into the seller's average.
    ///
    /// The conditional write of the review onto the order decides which
    /// submission wins. The standalone review row and the seller
    /// aggregate follow it and are only logged when they fail.
    #[tracing::instrument(skip(self, request), fields(order_id = %request.order_id, rating = request.rating))]
    pub async fn submit_review(
        &self,
        buyer_id: &str,
        request: SubmitReviewRequest,
    ) -> Result<ReviewOutcome, LifecycleError> {
        if !(1..=5).contains(&request.rating) {
            return Err(LifecycleError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        let order_id = request.order_id;
        let text = request.review.trim().to_string();
        let review_id = Uuid::now_v7();

        let (review, order) = self
            .transition(order_id, |mut order, now| {
                if order.buyer_id != buyer_id {
                    return Err(LifecycleError::Forbidden(
                        "order belongs to another buyer".to_string(),
                    ));
                }
                if order.seller_id != request.seller_id {
                    return Err(LifecycleError::Validation(
                        "sellerId does not match the order".to_string(),
                    ));
                }
                if order.status_progress != StatusProgress::Completed {
                    return Err(LifecycleError::Conflict(format!(
                        "order is {}, reviews open after completion",
                        order.status_progress
                    )));
                }
                if order.review.is_some() {
                    return Err(LifecycleError::Conflict(
                        "order has already been reviewed".to_string(),
                    ));
                }
                let review = ReviewAttachment {
                    id: review_id,
                    rating: request.rating,
                    review: text.clone(),
                    created_at: now,
                };
                order.review = Some(review.clone());
                order.updated_at = now;
                Ok(Change::Write(order, review))
            })
            .await?;
        tracing::info!("Review attached to order");

        let record = ReviewRecord {
            id: review.id,
            order_id,
            buyer_id: order.buyer_id.clone(),
            seller_id: order.seller_id.clone(),
            rating: review.rating,
            review: review.review.clone(),
            created_at: review.created_at,
        };
        match self.store.process(InsertReviewRecord { record }).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!("Review record already existed for order"),
            Err(e) => tracing::error!(error = %e, "Failed to store review record"),
        }

        let seller_rating = match self
            .store
            .process(ApplySellerRating {
                seller_id: order.seller_id.clone(),
                rating: review.rating,
            })
            .await
        {
            Ok(Some(rating)) => Some(rating),
            Ok(None) => {
                tracing::error!(seller_id = %order.seller_id, "Seller missing, rating not applied");
                None
            }
            Err(e) => {
                tracing::error!(seller_id = %order.seller_id, error = %e, "Failed to apply seller rating");
                None
            }
        };

        Ok(ReviewOutcome {
            order,
            review,
            seller_rating,
        })
    }
}
