//! Order request and response types.
//!
//! Field names follow the camelCase vocabulary the marketplace frontends
//! already speak (`statusProgress`, `snapToken`, `ulasan`, ...).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::delivery::DailyDeliveryLogResponse;
use super::review::ReviewAttachmentResponse;

/// Default page size for order listings.
pub const DEFAULT_PAGE_SIZE: i64 = 50;
/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 200;

/// The domain-level order state machine value.
///
/// This is the field buyer and seller UIs trust. The raw payment signal
/// lives in [`OrderStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusProgress {
    AwaitingSellerApproval,
    ApprovedAwaitingPayment,
    Processing,
    Delivery,
    Completed,
    Cancelled,
}

impl StatusProgress {
    /// `Completed` and `Cancelled` accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, StatusProgress::Completed | StatusProgress::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusProgress::AwaitingSellerApproval => "awaiting_seller_approval",
            StatusProgress::ApprovedAwaitingPayment => "approved_awaiting_payment",
            StatusProgress::Processing => "processing",
            StatusProgress::Delivery => "delivery",
            StatusProgress::Completed => "completed",
            StatusProgress::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for StatusProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw payment/delivery signal mirrored from the gateway or a seller action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Success,
    Failed,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Processing => write!(f, "processing"),
            OrderStatus::Success => write!(f, "success"),
            OrderStatus::Failed => write!(f, "failed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Payment state of an order.
///
/// `Pending` until the gateway reports, `NotRequired` for free orders,
/// otherwise the last transaction status the gateway reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    NotRequired,
    Capture,
    Settlement,
    Authorize,
    Deny,
    Cancel,
    Expire,
    Failure,
    Refund,
    PartialRefund,
    Chargeback,
    PartialChargeback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderType {
    #[default]
    Catering,
    Rantangan,
    BiteEco,
}

/// Rantangan package length: daily, weekly or monthly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageType {
    Harian,
    Mingguan,
    Bulanan,
}

impl PackageType {
    /// Weekly and monthly packages are fulfilled one delivery per day.
    pub fn is_recurring(self) -> bool {
        matches!(self, PackageType::Mingguan | PackageType::Bulanan)
    }
}

/// A single order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl OrderItem {
    /// Quantity, defaulting to one when the client omitted it.
    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Request body for `POST /orders`.
///
/// The required fields are optional here so a missing one is reported as
/// a validation error instead of a generic JSON rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub seller_id: Option<String>,
    pub items: Option<Vec<OrderItem>>,
    pub total_amount: Option<Decimal>,
    pub pax: Option<u32>,
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub delivery_address: String,
    pub buyer_lat: Option<f64>,
    pub buyer_lng: Option<f64>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub package_type: Option<PackageType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
    pub order: OrderResponse,
}

/// Seller fields captured when the order was placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSnapshotResponse {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
}

/// Full order view returned by every order endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: Uuid,
    pub buyer_id: String,
    pub seller_id: String,
    pub items: Vec<OrderItem>,
    pub pax: u32,
    pub total_amount: Decimal,
    pub order_type: OrderType,
    pub package_type: Option<PackageType>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub delivery_address: String,
    pub buyer_location: Option<GeoPoint>,
    pub seller: SellerSnapshotResponse,
    pub distance_km: Option<f64>,
    pub status: OrderStatus,
    pub status_progress: StatusProgress,
    pub payment_status: PaymentStatus,
    pub snap_token: Option<String>,
    pub snap_url: Option<String>,
    pub rejection_reason: Option<String>,
    pub midtrans_status: Option<String>,
    pub fraud_status: Option<String>,
    pub payment_type: Option<String>,
    pub daily_delivery_logs: Vec<DailyDeliveryLogResponse>,
    pub ulasan: Option<ReviewAttachmentResponse>,
    /// Unix timestamps.
    pub approved_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Request body for `PATCH /orders/{order_id}`.
///
/// Carries either a one-shot progress target or a daily delivery entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub status_progress: Option<StatusProgress>,
    pub daily_delivery_log: Option<super::delivery::CompleteDailyDeliveryRequest>,
}

/// Query parameters for `GET /orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub buyer_id: Option<String>,
    pub seller_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Clamp client pagination into `(limit, offset)` the store accepts.
pub fn clamp_pagination(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}
