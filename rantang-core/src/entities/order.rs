use kanau::processor::Processor;
use rantang_sdk::objects::{
    DailyDeliveryLogResponse, GeoPoint, OrderItem, OrderResponse, OrderStatus, OrderType,
    PackageType, PaymentStatus, ReviewAttachmentResponse, SellerSnapshotResponse, StatusProgress,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::Party;
use crate::framework::DatabaseProcessor;

/// One purchase, stored as a single document keyed by `id`.
///
/// The store keeps a `version` next to the document; every write after
/// the insert is a compare-and-swap on it (see [`ReplaceOrder`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
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
    pub buyer_contact: Option<BuyerContactSnapshot>,
    pub seller: SellerSnapshot,
    pub distance_km: Option<f64>,
    pub status: OrderStatus,
    pub status_progress: StatusProgress,
    pub payment_status: PaymentStatus,
    pub payment_session: Option<PaymentSession>,
    pub approval_claim: Option<ApprovalClaim>,
    pub rejection_reason: Option<String>,
    pub gateway_report: Option<GatewayReport>,
    #[serde(default)]
    pub daily_delivery_logs: Vec<DailyDeliveryLog>,
    pub review: Option<ReviewAttachment>,
    pub approved_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Seller display fields copied into the order at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSnapshot {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
}

/// Buyer contact copied into the order at creation, handed to the
/// gateway as customer details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerContactSnapshot {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Checkout session opened at the gateway (`snapToken` / `snapUrl`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: String,
    pub created_at: OffsetDateTime,
}

/// Lease held by the approval that is currently opening a payment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalClaim {
    pub token: Uuid,
    pub claimed_at: OffsetDateTime,
}

/// Audit copy of the last gateway notification applied to the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayReport {
    pub transaction_status: String,
    pub fraud_status: Option<String>,
    pub payment_type: Option<String>,
    pub reported_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDeliveryLog {
    pub delivery_date: Date,
    pub delivery_time: String,
    pub completed_at: OffsetDateTime,
}

/// The buyer's review, attached to the order exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAttachment {
    pub id: Uuid,
    pub rating: u8,
    pub review: String,
    pub created_at: OffsetDateTime,
}

impl Order {
    /// Free orders never open a payment session.
    pub fn is_free(&self) -> bool {
        self.order_type == OrderType::BiteEco || self.total_amount.is_zero()
    }

    /// Weekly or monthly Rantangan with a complete date range.
    pub fn is_recurring(&self) -> bool {
        self.order_type == OrderType::Rantangan
            && self.package_type.is_some_and(PackageType::is_recurring)
            && self.delivery_range().is_some()
    }

    /// Inclusive fulfilment range, when both dates are present.
    pub fn delivery_range(&self) -> Option<(Date, Date)> {
        Some((self.start_date?, self.end_date?))
    }

    /// Replace the log for the same date, or append a new one.
    pub fn upsert_delivery_log(&mut self, log: DailyDeliveryLog) {
        match self
            .daily_delivery_logs
            .iter_mut()
            .find(|existing| existing.delivery_date == log.delivery_date)
        {
            Some(existing) => *existing = log,
            None => self.daily_delivery_logs.push(log),
        }
    }

    /// The approval claim, unless it is older than `lease`.
    pub fn live_claim(&self, now: OffsetDateTime, lease: time::Duration) -> Option<ApprovalClaim> {
        self.approval_claim
            .filter(|claim| now - claim.claimed_at < lease)
    }
}

impl From<&DailyDeliveryLog> for DailyDeliveryLogResponse {
    fn from(log: &DailyDeliveryLog) -> Self {
        DailyDeliveryLogResponse {
            delivery_date: log.delivery_date,
            delivery_time: log.delivery_time.clone(),
            completed_time: log.completed_at.unix_timestamp(),
        }
    }
}

impl From<&ReviewAttachment> for ReviewAttachmentResponse {
    fn from(review: &ReviewAttachment) -> Self {
        ReviewAttachmentResponse {
            id: review.id,
            rating: review.rating,
            review: review.review.clone(),
            created_at: review.created_at.unix_timestamp(),
        }
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        let report = order.gateway_report.as_ref();
        OrderResponse {
            order_id: order.id,
            buyer_id: order.buyer_id.clone(),
            seller_id: order.seller_id.clone(),
            items: order.items.clone(),
            pax: order.pax,
            total_amount: order.total_amount,
            order_type: order.order_type,
            package_type: order.package_type,
            start_date: order.start_date,
            end_date: order.end_date,
            delivery_address: order.delivery_address.clone(),
            buyer_location: order.buyer_location,
            seller: SellerSnapshotResponse {
                name: order.seller.name.clone(),
                phone: order.seller.phone.clone(),
                address: order.seller.address.clone(),
                location: order.seller.location,
            },
            distance_km: order.distance_km,
            status: order.status,
            status_progress: order.status_progress,
            payment_status: order.payment_status,
            snap_token: order.payment_session.as_ref().map(|s| s.token.clone()),
            snap_url: order.payment_session.as_ref().map(|s| s.redirect_url.clone()),
            rejection_reason: order.rejection_reason.clone(),
            midtrans_status: report.map(|r| r.transaction_status.clone()),
            fraud_status: report.and_then(|r| r.fraud_status.clone()),
            payment_type: report.and_then(|r| r.payment_type.clone()),
            daily_delivery_logs: order.daily_delivery_logs.iter().map(Into::into).collect(),
            ulasan: order.review.as_ref().map(Into::into),
            approved_at: order.approved_at.map(OffsetDateTime::unix_timestamp),
            completed_at: order.completed_at.map(OffsetDateTime::unix_timestamp),
            created_at: order.created_at.unix_timestamp(),
            updated_at: order.updated_at.unix_timestamp(),
        }
    }
}

/// An order together with the store's concurrency token.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedOrder {
    pub order: Order,
    pub version: i64,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    doc: Json<Order>,
    version: i64,
}

impl From<OrderRow> for VersionedOrder {
    fn from(row: OrderRow) -> Self {
        VersionedOrder {
            order: row.doc.0,
            version: row.version,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GetOrderById {
    pub order_id: Uuid,
}

impl Processor<GetOrderById> for DatabaseProcessor {
    type Output = Option<VersionedOrder>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetOrderById")]
    async fn process(&self, query: GetOrderById) -> Result<Option<VersionedOrder>, sqlx::Error> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT doc, version
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(query.order_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

#[derive(Debug, Clone)]
/// Insert a freshly created order at version 1.
pub struct InsertOrder {
    pub order: Order,
}

impl Processor<InsertOrder> for DatabaseProcessor {
    type Output = VersionedOrder;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertOrder")]
    async fn process(&self, insert: InsertOrder) -> Result<VersionedOrder, sqlx::Error> {
        let InsertOrder { order } = insert;
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (id, buyer_id, seller_id, created_at, doc, version)
            VALUES ($1, $2, $3, $4, $5, 1)
            RETURNING doc, version
            "#,
        )
        .bind(order.id)
        .bind(&order.buyer_id)
        .bind(&order.seller_id)
        .bind(order.created_at)
        .bind(Json(&order))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }
}

#[derive(Debug, Clone)]
/// List the orders of one buyer or seller, newest first.
pub struct ListOrders {
    pub party: Party,
    pub limit: i64,
    pub offset: i64,
}

impl Processor<ListOrders> for DatabaseProcessor {
    type Output = Vec<Order>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListOrders")]
    async fn process(&self, query: ListOrders) -> Result<Vec<Order>, sqlx::Error> {
        let column = match query.party {
            Party::Buyer(_) => "buyer_id",
            Party::Seller(_) => "seller_id",
        };
        let sql = format!(
            "SELECT doc, version FROM orders WHERE {column} = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(query.party.id())
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|row| row.doc.0).collect())
    }
}

#[derive(Debug, Clone)]
/// Compare-and-swap the order document.
///
/// Succeeds only when the stored version still equals `expected_version`,
/// returning the new version. `None` means another writer got there first.
pub struct ReplaceOrder {
    pub order: Order,
    pub expected_version: i64,
}

impl Processor<ReplaceOrder> for DatabaseProcessor {
    type Output = Option<VersionedOrder>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ReplaceOrder")]
    async fn process(&self, cmd: ReplaceOrder) -> Result<Option<VersionedOrder>, sqlx::Error> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            UPDATE orders
            SET doc = $2, version = version + 1
            WHERE id = $1 AND version = $3
            RETURNING doc, version
            "#,
        )
        .bind(cmd.order.id)
        .bind(Json(&cmd.order))
        .bind(cmd.expected_version)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use time::macros::datetime;

    /// A paid catering order awaiting approval.
    pub fn catering_order() -> Order {
        let now = datetime!(2024-01-01 08:00 UTC);
        Order {
            id: Uuid::now_v7(),
            buyer_id: "B1".into(),
            seller_id: "S1".into(),
            items: vec![OrderItem {
                id: "m1".into(),
                name: "Nasi Box".into(),
                price: Decimal::from(10_000),
                quantity: None,
            }],
            pax: 1,
            total_amount: Decimal::from(10_000),
            order_type: OrderType::Catering,
            package_type: None,
            start_date: None,
            end_date: None,
            delivery_address: "Jl. Merdeka 1".into(),
            buyer_location: None,
            buyer_contact: None,
            seller: SellerSnapshot {
                name: "Dapur Bu Sri".into(),
                phone: None,
                address: None,
                location: None,
            },
            distance_km: None,
            status: OrderStatus::Pending,
            status_progress: StatusProgress::AwaitingSellerApproval,
            payment_status: PaymentStatus::Pending,
            payment_session: None,
            approval_claim: None,
            rejection_reason: None,
            gateway_report: None,
            daily_delivery_logs: Vec::new(),
            review: None,
            approved_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
