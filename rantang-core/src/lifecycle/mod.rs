//! Order lifecycle services.
//!
//! [`OrderLifecycle`] owns every state transition of an order:
//! creation, seller approval, payment reconciliation, delivery progress
//! and the final review. Each transition is a read-modify-write on the
//! order document guarded by its store version, retried a bounded number
//! of times when another writer wins the race.

mod approval;
mod creation;
mod delivery;
mod queries;
mod reconcile;
mod review;


pub use approval::DEFAULT_REJECTION_REASON;
pub use delivery::delivery_summary;
pub use reconcile::ReconcileOutcome;
pub use review::ReviewOutcome;

use std::sync::Arc;

use kanau::processor::Processor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::entities::order::{GetOrderById, Order, ReplaceOrder};
use crate::events::{OrderStatusSender, OrderStatusUpdate};
use crate::gateway::{GatewayError, PaymentGateway};
use crate::store::{OrderStore, StoreError};

/// How long an approval may hold its claim while the gateway call runs.
pub const APPROVAL_CLAIM_LEASE: time::Duration = time::Duration::seconds(120);

/// Attempts per transition before giving up on a contended order.
pub const MAX_WRITE_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("order {0} is being modified concurrently")]
    Contended(Uuid),

    #[error("payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl LifecycleError {
    fn order_not_found() -> Self {
        LifecycleError::NotFound("order not found".to_string())
    }
}

/// Outcome of one attempt of a transition closure.
pub(crate) enum Change<T> {
    /// Store the modified document.
    Write(Order, T),
    /// Leave the stored document as it is.
    Keep(T),
}

#[derive(Clone)]
pub struct OrderLifecycle {
    store: OrderStore,
    gateway: Arc<dyn PaymentGateway>,
    events: OrderStatusSender,
}

impl OrderLifecycle {
    pub fn new(
        store: OrderStore,
        gateway: Arc<dyn PaymentGateway>,
        events: OrderStatusSender,
    ) -> Self {
        Self {
            store,
            gateway,
            events,
        }
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn events(&self) -> &OrderStatusSender {
        &self.events
    }

    async fn load(&self, order_id: Uuid) -> Result<Order, LifecycleError> {
        self.store
            .process(GetOrderById { order_id })
            .await?
            .map(|stored| stored.order)
            .ok_or_else(LifecycleError::order_not_found)
    }

    fn publish(&self, order: &Order) {
        // No subscribers is not an error.
        let _ = self.events.send(OrderStatusUpdate {
            order_id: order.id,
            status_progress: order.status_progress,
        });
    }

    /// Run `decide` against the current document and store its result
    /// with a compare-and-swap.
    ///
    /// `decide` sees a fresh copy on every attempt and must re-check its
    /// preconditions there. Returns the value it produced and the order
    /// as stored afterwards.
    pub(crate) async fn transition<T, F>(
        &self,
        order_id: Uuid,
        mut decide: F,
    ) -> Result<(T, Order), LifecycleError>
    where
        F: FnMut(Order, OffsetDateTime) -> Result<Change<T>, LifecycleError> + Send,
        T: Send,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let stored = self
                .store
                .process(GetOrderById { order_id })
                .await?
                .ok_or_else(LifecycleError::order_not_found)?;

            let (next, value) = match decide(stored.order.clone(), OffsetDateTime::now_utc())? {
                Change::Keep(value) => return Ok((value, stored.order)),
                Change::Write(next, value) => (next, value),
            };

            match self
                .store
                .process(ReplaceOrder {
                    order: next,
                    expected_version: stored.version,
                })
                .await?
            {
                Some(written) => {
                    if visible_change(&stored.order, &written.order) {
                        self.publish(&written.order);
                    }
                    return Ok((value, written.order));
                }
                None => {
                    tracing::debug!(%order_id, attempt, "Order version moved, retrying");
                }
            }
        }

        tracing::warn!(%order_id, "Giving up on contended order");
        Err(LifecycleError::Contended(order_id))
    }
}

/// Whether subscribers should hear about a write. Taking or releasing the
/// approval claim alone is bookkeeping.
fn visible_change(before: &Order, after: &Order) -> bool {
    let strip = |order: &Order| Order {
        approval_claim: None,
        updated_at: before.updated_at,
        ..order.clone()
    };
    strip(before) != strip(after)
}
