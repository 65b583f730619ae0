use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use kanau::processor::Processor;
use serde::Deserialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::entities::buyer::{BuyerContact, GetBuyerContact};
use crate::entities::order::{
    GetOrderById, InsertOrder, ListOrders, Order, ReplaceOrder, VersionedOrder,
};
use crate::entities::review::{InsertReviewRecord, ReviewRecord};
use crate::entities::seller::{
    ApplySellerRating, GetSellerProfile, SellerProfile, SellerRating, next_rating_average,
};

/// Sellers and buyers to preload into the in-memory store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemorySeed {
    pub sellers: Vec<SellerProfile>,
    pub buyers: Vec<BuyerContact>,
}

#[derive(Debug, Default)]
struct MemoryTables {
    orders: HashMap<Uuid, VersionedOrder>,
    sellers: HashMap<String, SellerProfile>,
    buyers: HashMap<String, BuyerContact>,
    reviews: HashMap<Uuid, ReviewRecord>,
}

/// Process-local store for tests and local development.
///
/// One mutex guards all tables, so every query is atomic with respect
/// to the others, matching the per-statement atomicity of Postgres.
#[derive(Debug, Clone, Default)]
pub struct MemoryProcessor {
    tables: Arc<Mutex<MemoryTables>>,
}

impl MemoryProcessor {
    pub async fn from_seed(seed: MemorySeed) -> Self {
        let processor = Self::default();
        for seller in seed.sellers {
            processor.put_seller(seller).await;
        }
        for buyer in seed.buyers {
            processor.put_buyer(buyer).await;
        }
        processor
    }

    pub async fn put_seller(&self, seller: SellerProfile) {
        let mut tables = self.tables.lock().await;
        tables.sellers.insert(seller.id.clone(), seller);
    }

    pub async fn put_buyer(&self, buyer: BuyerContact) {
        let mut tables = self.tables.lock().await;
        tables.buyers.insert(buyer.id.clone(), buyer);
    }

    pub async fn review_records(&self) -> Vec<ReviewRecord> {
        let tables = self.tables.lock().await;
        tables.reviews.values().cloned().collect()
    }
}

impl Processor<GetOrderById> for MemoryProcessor {
    type Output = Option<VersionedOrder>;
    type Error = Infallible;
    async fn process(&self, query: GetOrderById) -> Result<Option<VersionedOrder>, Infallible> {
        let tables = self.tables.lock().await;
        Ok(tables.orders.get(&query.order_id).cloned())
    }
}

impl Processor<InsertOrder> for MemoryProcessor {
    type Output = VersionedOrder;
    type Error = Infallible;
    async fn process(&self, insert: InsertOrder) -> Result<VersionedOrder, Infallible> {
        let stored = VersionedOrder {
            order: insert.order,
            version: 1,
        };
        let mut tables = self.tables.lock().await;
        tables.orders.insert(stored.order.id, stored.clone());
        Ok(stored)
    }
}

impl Processor<ListOrders> for MemoryProcessor {
    type Output = Vec<Order>;
    type Error = Infallible;
    async fn process(&self, query: ListOrders) -> Result<Vec<Order>, Infallible> {
        let tables = self.tables.lock().await;
        let mut orders: Vec<&Order> = tables
            .orders
            .values()
            .map(|stored| &stored.order)
            .filter(|order| query.party.owns(order))
            .collect();
        orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(orders
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(0))
            .take(usize::try_from(query.limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}

impl Processor<ReplaceOrder> for MemoryProcessor {
    type Output = Option<VersionedOrder>;
    type Error = Infallible;
    async fn process(&self, cmd: ReplaceOrder) -> Result<Option<VersionedOrder>, Infallible> {
        let mut tables = self.tables.lock().await;
        let Some(stored) = tables.orders.get_mut(&cmd.order.id) else {
            return Ok(None);
        };
        if stored.version != cmd.expected_version {
            return Ok(None);
        }
        stored.order = cmd.order;
        stored.version += 1;
        Ok(Some(stored.clone()))
    }
}

impl Processor<GetSellerProfile> for MemoryProcessor {
    type Output = Option<SellerProfile>;
    type Error = Infallible;
    async fn process(&self, query: GetSellerProfile) -> Result<Option<SellerProfile>, Infallible> {
        let tables = self.tables.lock().await;
        Ok(tables.sellers.get(&query.seller_id).cloned())
    }
}

impl Processor<ApplySellerRating> for MemoryProcessor {
    type Output = Option<SellerRating>;
    type Error = Infallible;
    async fn process(&self, cmd: ApplySellerRating) -> Result<Option<SellerRating>, Infallible> {
        let mut tables = self.tables.lock().await;
        let Some(seller) = tables.sellers.get_mut(&cmd.seller_id) else {
            return Ok(None);
        };
        seller.rating_average =
            next_rating_average(seller.rating_average, seller.rating_count, cmd.rating);
        seller.rating_count += 1;
        Ok(Some(SellerRating {
            rating_average: seller.rating_average,
            rating_count: seller.rating_count,
        }))
    }
}

impl Processor<GetBuyerContact> for MemoryProcessor {
    type Output = Option<BuyerContact>;
    type Error = Infallible;
    async fn process(&self, query: GetBuyerContact) -> Result<Option<BuyerContact>, Infallible> {
        let tables = self.tables.lock().await;
        Ok(tables.buyers.get(&query.buyer_id).cloned())
    }
}

impl Processor<InsertReviewRecord> for MemoryProcessor {
    type Output = bool;
    type Error = Infallible;
    async fn process(&self, insert: InsertReviewRecord) -> Result<bool, Infallible> {
        let mut tables = self.tables.lock().await;
        if tables.reviews.contains_key(&insert.record.order_id) {
            return Ok(false);
        }
        tables.reviews.insert(insert.record.order_id, insert.record);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Party;
    use crate::entities::order::fixtures::catering_order;

    #[tokio::test]
    async fn test_replace_order_rejects_stale_version() {
        let store = MemoryProcessor::default();
        let order = catering_order();
        let stored = store.process(InsertOrder { order: order.clone() }).await.unwrap();
        assert_eq!(stored.version, 1);

        let mut first = order.clone();
        first.delivery_address = "Jl. Sudirman 2".into();
        let replaced = store
            .process(ReplaceOrder {
                order: first,
                expected_version: 1,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.version, 2);

        let stale = store
            .process(ReplaceOrder {
                order,
                expected_version: 1,
            })
            .await
            .unwrap();
        assert!(stale.is_none());

        let current = store
            .process(GetOrderById {
                order_id: replaced.order.id,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.order.delivery_address, "Jl. Sudirman 2");
    }

    #[tokio::test]
    async fn test_list_orders_filters_by_party_newest_first() {
        let store = MemoryProcessor::default();
        let mut older = catering_order();
        older.created_at -= time::Duration::hours(1);
        let newer = catering_order();
        let mut other = catering_order();
        other.buyer_id = "B2".into();
        for order in [older.clone(), newer.clone(), other] {
            store.process(InsertOrder { order }).await.unwrap();
        }

        let listed = store
            .process(ListOrders {
                party: Party::Buyer("B1".into()),
                limit: 10,
                offset: 0,
            })
            .await
            .unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        let paged = store
            .process(ListOrders {
                party: Party::Seller("S1".into()),
                limit: 1,
                offset: 1,
            })
            .await
            .unwrap();
        assert_eq!(paged.len(), 1);
    }

    #[tokio::test]
    async fn test_review_record_unique_per_order() {
        let store = MemoryProcessor::default();
        let record = ReviewRecord {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            buyer_id: "B1".into(),
            seller_id: "S1".into(),
            rating: 4,
            review: "ok".into(),
            created_at: time::OffsetDateTime::now_utc(),
        };
        assert!(store.process(InsertReviewRecord { record: record.clone() }).await.unwrap());
        assert!(!store.process(InsertReviewRecord { record }).await.unwrap());
        assert_eq!(store.review_records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_seed_deserializes_camel_case() {
        let seed: MemorySeed = serde_json::from_str(
            r#"{"sellers":[{"id":"S1","name":"Dapur","location":{"lat":-6.2,"lng":106.8}}],
                "buyers":[{"id":"B1","name":"Ani","email":"ani@example.com"}]}"#,
        )
        .unwrap();
        let store = MemoryProcessor::from_seed(seed).await;
        let seller = store
            .process(GetSellerProfile {
                seller_id: "S1".into(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seller.rating_count, 0);
        let rating = store
            .process(ApplySellerRating {
                seller_id: "S1".into(),
                rating: 5,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rating.rating_average, 5.0);
        assert_eq!(rating.rating_count, 1);
    }
}
