use kanau::processor::Processor;
use serde::{Deserialize, Serialize};

use super::order::BuyerContactSnapshot;
use crate::framework::DatabaseProcessor;

/// Buyer contact details as owned by the registration service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BuyerContact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<BuyerContact> for BuyerContactSnapshot {
    fn from(contact: BuyerContact) -> Self {
        BuyerContactSnapshot {
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GetBuyerContact {
    pub buyer_id: String,
}

impl Processor<GetBuyerContact> for DatabaseProcessor {
    type Output = Option<BuyerContact>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetBuyerContact")]
    async fn process(&self, query: GetBuyerContact) -> Result<Option<BuyerContact>, sqlx::Error> {
        let contact = sqlx::query_as::<_, BuyerContact>(
            r#"
            SELECT id, name, email, phone
            FROM buyers
            WHERE id = $1
            "#,
        )
        .bind(&query.buyer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contact)
    }
}
