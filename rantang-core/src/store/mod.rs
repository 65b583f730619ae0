//! Record store backends.
//!
//! [`OrderStore`] is what the lifecycle services talk to. It forwards
//! every query object to either the Postgres processor or the in-memory
//! processor, so both backends answer exactly the same set of queries.

mod memory;

pub use memory::{MemoryProcessor, MemorySeed};

use kanau::processor::Processor;

use crate::entities::buyer::{BuyerContact, GetBuyerContact};
use crate::entities::order::{
    GetOrderById, InsertOrder, ListOrders, Order, ReplaceOrder, VersionedOrder,
};
use crate::entities::review::InsertReviewRecord;
use crate::entities::seller::{ApplySellerRating, GetSellerProfile, SellerProfile, SellerRating};
use crate::framework::DatabaseProcessor;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<std::convert::Infallible> for StoreError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

#[derive(Debug, Clone)]
pub enum OrderStore {
    Postgres(DatabaseProcessor),
    Memory(MemoryProcessor),
}

impl OrderStore {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        OrderStore::Postgres(DatabaseProcessor { pool })
    }

    pub fn memory() -> Self {
        OrderStore::Memory(MemoryProcessor::default())
    }
}

macro_rules! forward_to_backend {
    ($($query:ty => $output:ty),* $(,)?) => {
        $(
            impl Processor<$query> for OrderStore {
                type Output = $output;
                type Error = StoreError;
                async fn process(&self, query: $query) -> Result<$output, StoreError> {
                    match self {
                        OrderStore::Postgres(db) => Ok(db.process(query).await?),
                        OrderStore::Memory(memory) => Ok(memory.process(query).await?),
                    }
                }
            }
        )*
    };
}

forward_to_backend! {
    GetOrderById => Option<VersionedOrder>,
    InsertOrder => VersionedOrder,
    ListOrders => Vec<Order>,
    ReplaceOrder => Option<VersionedOrder>,
    GetSellerProfile => Option<SellerProfile>,
    ApplySellerRating => Option<SellerRating>,
    GetBuyerContact => Option<BuyerContact>,
    InsertReviewRecord => bool,
}
