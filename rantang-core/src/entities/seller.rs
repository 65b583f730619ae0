use kanau::processor::Processor;
use rantang_sdk::objects::{GeoPoint, SellerRatingResponse};
use serde::{Deserialize, Serialize};

use crate::framework::DatabaseProcessor;

/// Seller profile as owned by the registration service.
///
/// This service reads it when snapshotting orders and updates only the
/// rating aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub rating_average: f64,
    #[serde(default)]
    pub rating_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct SellerRating {
    pub rating_average: f64,
    pub rating_count: i64,
}

impl From<SellerRating> for SellerRatingResponse {
    fn from(rating: SellerRating) -> Self {
        SellerRatingResponse {
            rating_average: rating.rating_average,
            rating_count: rating.rating_count,
        }
    }
}

/// Running average after one more rating, rounded to one decimal.
pub fn next_rating_average(average: f64, count: i64, rating: u8) -> f64 {
    let total = average * count as f64 + f64::from(rating);
    let next = total / (count + 1) as f64;
    (next * 10.0).round() / 10.0
}

#[derive(sqlx::FromRow)]
struct SellerRow {
    id: String,
    name: String,
    phone: Option<String>,
    address: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    rating_average: f64,
    rating_count: i64,
}

impl From<SellerRow> for SellerProfile {
    fn from(row: SellerRow) -> Self {
        let location = match (row.lat, row.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };
        SellerProfile {
            id: row.id,
            name: row.name,
            phone: row.phone,
            address: row.address,
            location,
            rating_average: row.rating_average,
            rating_count: row.rating_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GetSellerProfile {
    pub seller_id: String,
}

impl Processor<GetSellerProfile> for DatabaseProcessor {
    type Output = Option<SellerProfile>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetSellerProfile")]
    async fn process(&self, query: GetSellerProfile) -> Result<Option<SellerProfile>, sqlx::Error> {
        let row = sqlx::query_as::<_, SellerRow>(
            r#"
            SELECT id, name, phone, address, lat, lng, rating_average, rating_count
            FROM sellers
            WHERE id = $1
            "#,
        )
        .bind(&query.seller_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

#[derive(Debug, Clone)]
/// Fold one rating into the seller aggregate in a single statement.
///
/// Returns `None` when the seller does not exist.
pub struct ApplySellerRating {
    pub seller_id: String,
    pub rating: u8,
}

impl Processor<ApplySellerRating> for DatabaseProcessor {
    type Output = Option<SellerRating>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ApplySellerRating")]
    async fn process(&self, cmd: ApplySellerRating) -> Result<Option<SellerRating>, sqlx::Error> {
        let rating = sqlx::query_as::<_, SellerRating>(
            r#"
            UPDATE sellers
            SET rating_average = ROUND(
                    ((rating_average * rating_count + $2) / (rating_count + 1))::numeric,
                    1
                )::float8,
                rating_count = rating_count + 1
            WHERE id = $1
            RETURNING rating_average, rating_count
            "#,
        )
        .bind(&cmd.seller_id)
        .bind(f64::from(cmd.rating))
        .fetch_optional(&self.pool)
        .await?;
        Ok(rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_rating_average() {
        assert_eq!(next_rating_average(0.0, 0, 5), 5.0);
        assert_eq!(next_rating_average(4.0, 2, 5), 4.3);
        assert_eq!(next_rating_average(4.5, 1, 4), 4.3);
        assert_eq!(next_rating_average(1.0, 3, 1), 1.0);
    }
}
