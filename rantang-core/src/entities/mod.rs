pub mod buyer;
pub mod order;
pub mod review;
pub mod seller;

use order::Order;

/// An authenticated marketplace participant.
///
/// Produced by the bearer-token extractors and used to scope order reads
/// and listings to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Party {
    Buyer(String),
    Seller(String),
}

impl Party {
    pub fn id(&self) -> &str {
        match self {
            Party::Buyer(id) | Party::Seller(id) => id,
        }
    }

    /// Whether this party is the buyer or the seller of `order`.
    pub fn owns(&self, order: &Order) -> bool {
        match self {
            Party::Buyer(id) => order.buyer_id == *id,
            Party::Seller(id) => order.seller_id == *id,
        }
    }
}
