//! Seller approval request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::{PaymentStatus, StatusProgress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    Approve,
    Reject,
}

/// Request body for `POST /seller/orders/approve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveOrderRequest {
    pub order_id: Uuid,
    pub action: ApprovalAction,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Outcome of an approval or rejection.
///
/// `snap_token` / `snap_url` are only present when a payment session was
/// opened for a paid order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveOrderResponse {
    pub order_id: Uuid,
    pub status_progress: StatusProgress,
    pub payment_status: PaymentStatus,
    pub snap_token: Option<String>,
    pub snap_url: Option<String>,
    pub rejection_reason: Option<String>,
}
