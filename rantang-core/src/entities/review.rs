use kanau::processor::Processor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::framework::DatabaseProcessor;

/// Standalone review row, one per order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub order_id: Uuid,
    pub buyer_id: String,
    pub seller_id: String,
    pub rating: u8,
    pub review: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
/// Insert a review record, ignoring a duplicate for the same order.
///
/// Returns whether a row was written.
pub struct InsertReviewRecord {
    pub record: ReviewRecord,
}

impl Processor<InsertReviewRecord> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertReviewRecord")]
    async fn process(&self, insert: InsertReviewRecord) -> Result<bool, sqlx::Error> {
        let ReviewRecord {
            id,
            order_id,
            buyer_id,
            seller_id,
            rating,
            review,
            created_at,
        } = insert.record;
        let result = sqlx::query(
            r#"
            INSERT INTO reviews (id, order_id, buyer_id, seller_id, rating, review, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (order_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(order_id)
        .bind(buyer_id)
        .bind(seller_id)
        .bind(i16::from(rating))
        .bind(review)
        .bind(created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
