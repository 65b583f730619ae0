use kanau::processor::Processor;
use rantang_sdk::objects::PaymentStatusResponse;
use uuid::Uuid;

use super::{LifecycleError, OrderLifecycle};
use crate::entities::Party;
use crate::entities::order::{ListOrders, Order};
use crate::gateway::GatewayError;

impl OrderLifecycle {
    /// Fetch one order for its buyer or seller.
    pub async fn get_order(&self, party: &Party, order_id: Uuid) -> Result<Order, LifecycleError> {
        let order = self.load(order_id).await?;
        if !party.owns(&order) {
            return Err(LifecycleError::Forbidden(
                "order belongs to someone else".to_string(),
            ));
        }
        Ok(order)
    }

    /// The caller's orders, newest first.
    pub async fn list_orders(
        &self,
        party: Party,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, LifecycleError> {
        let orders = self
            .store
            .process(ListOrders {
                party,
                limit,
                offset,
            })
            .await?;
        Ok(orders)
    }

    /// Ask the gateway for the transaction state of an order.
    #[tracing::instrument(skip(self, party))]
    pub async fn payment_status(
        &self,
        party: &Party,
        order_id: Uuid,
    ) -> Result<PaymentStatusResponse, LifecycleError> {
        let order = self.get_order(party, order_id).await?;
        if order.payment_session.is_none() {
            return Err(LifecycleError::NotFound(
                "order has no payment session".to_string(),
            ));
        }
        match self.gateway.transaction_status(order_id).await {
            Ok(status) => Ok(status),
            Err(GatewayError::NotFound) => Err(LifecycleError::NotFound(
                "transaction not found at the gateway".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
