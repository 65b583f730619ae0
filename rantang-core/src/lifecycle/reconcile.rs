use rantang_sdk::objects::{
    OrderStatus, PaymentNotification, StatusProgress, TransactionStatus,
};
use rantang_sdk::signature::verify_notification;
use uuid::Uuid;

use super::{Change, LifecycleError, OrderLifecycle};
use crate::entities::order::{GatewayReport, Order};

/// What a gateway notification did to the order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// The notification was written to the order.
    Applied(Order),
    /// The order had already moved past payment; nothing was written.
    Ignored(StatusProgress),
}

/// Raw status bucket a transaction status maps to.
fn order_status_for(status: TransactionStatus) -> Option<OrderStatus> {
    match status {
        TransactionStatus::Settlement | TransactionStatus::Capture => Some(OrderStatus::Success),
        TransactionStatus::Cancel | TransactionStatus::Deny | TransactionStatus::Expire => {
            Some(OrderStatus::Failed)
        }
        TransactionStatus::Pending => Some(OrderStatus::Pending),
        _ => None,
    }
}

fn apply(
    mut order: Order,
    notification: &PaymentNotification,
    transaction_status: TransactionStatus,
    now: time::OffsetDateTime,
) -> Result<Change<bool>, LifecycleError> {
    let mapped = order_status_for(transaction_status);
    match order.status_progress {
        StatusProgress::ApprovedAwaitingPayment => {}
        StatusProgress::AwaitingSellerApproval => match mapped {
            Some(OrderStatus::Success) | Some(OrderStatus::Pending) => {
                return Err(LifecycleError::Conflict(
                    "order approval has not been recorded yet".to_string(),
                ));
            }
            _ => {}
        },
        StatusProgress::Processing
        | StatusProgress::Delivery
        | StatusProgress::Completed
        | StatusProgress::Cancelled => return Ok(Change::Keep(false)),
    }

    if let Some(status) = mapped {
        order.status = status;
        match status {
            OrderStatus::Success => order.status_progress = StatusProgress::Processing,
            OrderStatus::Failed => {
                order.status_progress = StatusProgress::Cancelled;
                order.approval_claim = None;
            }
            _ => {}
        }
    }
    if let Some(payment_status) = transaction_status.payment_status() {
        order.payment_status = payment_status;
    }
    order.gateway_report = Some(GatewayReport {
        transaction_status: notification.transaction_status.clone(),
        fraud_status: notification.fraud_status.clone(),
        payment_type: notification.payment_type.clone(),
        reported_at: now,
    });
    order.updated_at = now;
    Ok(Change::Write(order, true))
}

impl OrderLifecycle {
    /// Apply an asynchronous payment notification from the gateway.
    ///
    /// `server_key` is given when signatures must be verified. Delivery
    /// is at-least-once: a notification for an order that already left
    /// `approved_awaiting_payment` is acknowledged without a write.
    #[tracing::instrument(
        skip_all,
        fields(order_id = %notification.order_id, transaction_status = %notification.transaction_status)
    )]
    pub async fn reconcile_payment(
        &self,
        notification: PaymentNotification,
        server_key: Option<&str>,
    ) -> Result<ReconcileOutcome, LifecycleError> {
        if let Some(key) = server_key {
            verify_notification(&notification, key).map_err(|e| {
                tracing::warn!(error = %e, "Rejecting notification with bad signature");
                LifecycleError::Unauthorized("invalid notification signature".to_string())
            })?;
        }

        let order_id: Uuid = notification
            .order_id
            .parse()
            .map_err(|_| LifecycleError::order_not_found())?;
        let transaction_status = TransactionStatus::from_raw(&notification.transaction_status);
        if transaction_status == TransactionStatus::Unknown {
            tracing::warn!("Unrecognised transaction status, recording report only");
        }

        let (applied, order) = self
            .transition(order_id, |order, now| {
                apply(order, &notification, transaction_status, now)
            })
            .await?;

        if applied {
            tracing::info!(
                status = %order.status,
                status_progress = %order.status_progress,
                "Payment notification applied"
            );
            Ok(ReconcileOutcome::Applied(order))
        } else {
            tracing::info!(
                status_progress = %order.status_progress,
                "Order already past payment, notification ignored"
            );
            Ok(ReconcileOutcome::Ignored(order.status_progress))
        }
    }
}
