//! Daily delivery types for recurring Rantangan orders.

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::order::StatusProgress;

/// Request body for `POST /orders/{order_id}/complete-daily-delivery`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteDailyDeliveryRequest {
    pub delivery_date: Date,
    /// Free-form local time of the drop-off (e.g. `"11:30"`).
    /// Defaults to the server time when omitted.
    #[serde(default)]
    pub delivery_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDeliveryLogResponse {
    pub delivery_date: Date,
    pub delivery_time: String,
    /// Unix timestamp of when the seller recorded the delivery.
    pub completed_time: i64,
}

/// Progress of a recurring order over its inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySummary {
    pub total_days: u32,
    pub completed_days: u32,
    pub days_remaining: u32,
    pub is_fully_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDeliveryResponse {
    pub order_id: Uuid,
    pub status_progress: StatusProgress,
    pub summary: DeliverySummary,
    pub log: DailyDeliveryLogResponse,
}

/// Response of `GET /orders/{order_id}/delivery-logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryLogsResponse {
    pub order_id: Uuid,
    pub status_progress: StatusProgress,
    pub summary: DeliverySummary,
    pub logs: Vec<DailyDeliveryLogResponse>,
}
