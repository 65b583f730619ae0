use rantang_sdk::objects::{CompleteDailyDeliveryRequest, DeliverySummary, StatusProgress};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{Change, LifecycleError, OrderLifecycle};
use crate::entities::Party;
use crate::entities::order::{DailyDeliveryLog, Order};

/// Progress of a recurring order as of `today`.
///
/// Returns `None` for orders without a complete date range.
pub fn delivery_summary(order: &Order, today: Date) -> Option<DeliverySummary> {
    let (start, end) = order.delivery_range()?;
    let total_days = u32::try_from((end - start).whole_days() + 1).unwrap_or(0);
    let completed_days = u32::try_from(order.daily_delivery_logs.len()).unwrap_or(u32::MAX);
    let days_remaining = u32::try_from((end - today).whole_days().max(0)).unwrap_or(u32::MAX);
    Some(DeliverySummary {
        total_days,
        completed_days,
        days_remaining,
        is_fully_completed: completed_days >= total_days,
    })
}

fn ensure_seller(order: &Order, seller_id: &str) -> Result<(), LifecycleError> {
    if order.seller_id != seller_id {
        return Err(LifecycleError::Forbidden(
            "order belongs to another seller".to_string(),
        ));
    }
    Ok(())
}

fn one_shot_allowed(from: StatusProgress, to: StatusProgress) -> bool {
    matches!(
        (from, to),
        (StatusProgress::Processing, StatusProgress::Delivery)
            | (StatusProgress::Processing, StatusProgress::Completed)
            | (StatusProgress::Delivery, StatusProgress::Completed)
    )
}

fn clock_time(now: OffsetDateTime) -> String {
    format!("{:02}:{:02}", now.hour(), now.minute())
}

impl OrderLifecycle {
    /// Move a non-recurring order forward: `processing -> delivery ->
    /// completed`, or straight to `completed`.
    ///
    /// Asking for the current value again is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn update_progress(
        &self,
        seller_id: &str,
        order_id: Uuid,
        target: StatusProgress,
    ) -> Result<Order, LifecycleError> {
        let ((), order) = self
            .transition(order_id, |mut order, now| {
                ensure_seller(&order, seller_id)?;
                if order.is_recurring() {
                    return Err(LifecycleError::InvalidOperation(
                        "recurring orders progress through daily deliveries".to_string(),
                    ));
                }
                if order.status_progress == target {
                    return Ok(Change::Keep(()));
                }
                if !one_shot_allowed(order.status_progress, target) {
                    return Err(LifecycleError::Conflict(format!(
                        "cannot move order from {} to {}",
                        order.status_progress, target
                    )));
                }
                order.status_progress = target;
                if target == StatusProgress::Completed {
                    order.completed_at = Some(now);
                }
                order.updated_at = now;
                Ok(Change::Write(order, ()))
            })
            .await?;
        tracing::info!(%order_id, status_progress = %order.status_progress, "Order progress updated");
        Ok(order)
    }

    /// Record one day of a recurring order as delivered.
    ///
    /// Re-recording the same date replaces its log. The order completes
    /// once every day of its range has a log; until then it stays in
    /// `processing`.
    #[tracing::instrument(skip(self, request), fields(delivery_date = %request.delivery_date))]
    pub async fn complete_daily_delivery(
        &self,
        seller_id: &str,
        order_id: Uuid,
        request: CompleteDailyDeliveryRequest,
    ) -> Result<(Order, DailyDeliveryLog, DeliverySummary), LifecycleError> {
        let delivery_date = request.delivery_date;
        let delivery_time = request
            .delivery_time
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let ((log, summary), order) = self
            .transition(order_id, |mut order, now| {
                ensure_seller(&order, seller_id)?;
                if !order.is_recurring() {
                    return Err(LifecycleError::InvalidOperation(
                        "daily delivery is only for weekly or monthly Rantangan orders"
                            .to_string(),
                    ));
                }
                if !matches!(
                    order.status_progress,
                    StatusProgress::Processing | StatusProgress::Delivery
                ) {
                    return Err(LifecycleError::Conflict(format!(
                        "order is {}, not in delivery",
                        order.status_progress
                    )));
                }
                let Some((start, end)) = order.delivery_range() else {
                    return Err(LifecycleError::InvalidOperation(
                        "order has no delivery range".to_string(),
                    ));
                };
                if delivery_date < start || delivery_date > end {
                    return Err(LifecycleError::Validation(format!(
                        "deliveryDate must be between {start} and {end}"
                    )));
                }

                let log = DailyDeliveryLog {
                    delivery_date,
                    delivery_time: delivery_time.clone().unwrap_or_else(|| clock_time(now)),
                    completed_at: now,
                };
                order.upsert_delivery_log(log.clone());

                let summary = delivery_summary(&order, now.date()).ok_or_else(|| {
                    LifecycleError::InvalidOperation("order has no delivery range".to_string())
                })?;
                if summary.is_fully_completed {
                    order.status_progress = StatusProgress::Completed;
                    order.completed_at = Some(now);
                } else {
                    order.status_progress = StatusProgress::Processing;
                }
                order.updated_at = now;
                Ok(Change::Write(order, (log, summary)))
            })
            .await?;

        tracing::info!(
            %order_id,
            completed_days = summary.completed_days,
            total_days = summary.total_days,
            "Daily delivery recorded"
        );
        Ok((order, log, summary))
    }

    /// Read the delivery log of a recurring order.
    pub async fn delivery_logs(
        &self,
        party: &Party,
        order_id: Uuid,
    ) -> Result<(Order, DeliverySummary), LifecycleError> {
        let order = self.load(order_id).await?;
        if !party.owns(&order) {
            return Err(LifecycleError::Forbidden(
                "order belongs to someone else".to_string(),
            ));
        }
        if !order.is_recurring() {
            return Err(LifecycleError::InvalidOperation(
                "order has no daily deliveries".to_string(),
            ));
        }
        let summary = delivery_summary(&order, OffsetDateTime::now_utc().date()).ok_or_else(|| {
            LifecycleError::InvalidOperation("order has no delivery range".to_string())
        })?;
        Ok((order, summary))
    }
}
