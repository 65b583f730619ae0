use kanau::processor::Processor;
use rantang_sdk::objects::{
    CreateOrderRequest, GeoPoint, OrderStatus, OrderType, PaymentStatus, StatusProgress,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{LifecycleError, OrderLifecycle};
use crate::entities::buyer::GetBuyerContact;
use crate::entities::order::{InsertOrder, Order, SellerSnapshot};
use crate::entities::seller::GetSellerProfile;
use crate::pricing::{expected_total, haversine_km};

fn invalid(message: &str) -> LifecycleError {
    LifecycleError::Validation(message.to_string())
}

/// Request fields that survived validation.
struct ValidOrder {
    seller_id: String,
    items: Vec<rantang_sdk::objects::OrderItem>,
    total_amount: Decimal,
    pax: u32,
    order_type: OrderType,
    buyer_location: Option<GeoPoint>,
    /// Item total recomputed server-side.
    computed_total: Decimal,
}

fn validate(request: &CreateOrderRequest) -> Result<ValidOrder, LifecycleError> {
    let seller_id = request
        .seller_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| invalid("sellerId is required"))?;
    let items = request
        .items
        .as_ref()
        .ok_or_else(|| invalid("items is required"))?;
    if items.is_empty() {
        return Err(invalid("items must not be empty"));
    }
    let total_amount = request
        .total_amount
        .ok_or_else(|| invalid("totalAmount is required"))?;
    if total_amount < Decimal::ZERO {
        return Err(invalid("totalAmount must not be negative"));
    }
    let pax = request.pax.unwrap_or(1);
    if pax == 0 {
        return Err(invalid("pax must be at least 1"));
    }
    for item in items {
        if item.price < Decimal::ZERO {
            return Err(invalid("item price must not be negative"));
        }
        if item.quantity == Some(0) {
            return Err(invalid("item quantity must be at least 1"));
        }
    }

    let order_type = request.order_type.unwrap_or_default();
    if let Some(package) = request.package_type {
        if order_type != OrderType::Rantangan {
            return Err(invalid("packageType is only valid for Rantangan orders"));
        }
        if package.is_recurring() && (request.start_date.is_none() || request.end_date.is_none())
        {
            return Err(invalid("recurring packages require startDate and endDate"));
        }
    }
    if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
        if end < start {
            return Err(invalid("endDate must not be before startDate"));
        }
    }

    let buyer_location = match (request.buyer_lat, request.buyer_lng) {
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(invalid("buyer coordinates are out of range"));
            }
            Some(GeoPoint { lat, lng })
        }
        _ => None,
    };

    let computed_total = expected_total(order_type, items, pax)
        .ok_or_else(|| invalid("order total is out of range"))?;

    Ok(ValidOrder {
        seller_id: seller_id.to_string(),
        items: items.clone(),
        total_amount,
        pax,
        order_type,
        buyer_location,
        computed_total,
    })
}

impl OrderLifecycle {
    /// Validate and store a new order in `awaiting_seller_approval`.
    #[tracing::instrument(skip(self, request), fields(buyer_id = %buyer_id))]
    pub async fn create_order(
        &self,
        buyer_id: &str,
        request: CreateOrderRequest,
    ) -> Result<Order, LifecycleError> {
        let valid = validate(&request)?;

        let seller = self
            .store
            .process(GetSellerProfile {
                seller_id: valid.seller_id.clone(),
            })
            .await?
            .ok_or_else(|| LifecycleError::NotFound("seller not found".to_string()))?;

        let buyer_contact = match self
            .store
            .process(GetBuyerContact {
                buyer_id: buyer_id.to_string(),
            })
            .await
        {
            Ok(contact) => contact.map(Into::into),
            Err(e) => {
                tracing::warn!(error = %e, "Buyer contact lookup failed, continuing without it");
                None
            }
        };

        let distance_km = match (valid.buyer_location, seller.location) {
            (Some(buyer), Some(seller)) => Some(haversine_km(buyer, seller)),
            _ => None,
        };

        if valid.computed_total != valid.total_amount {
            tracing::warn!(
                total_amount = %valid.total_amount,
                computed = %valid.computed_total,
                "Order total differs from item total"
            );
        }

        let now = OffsetDateTime::now_utc();
        let mut order = Order {
            id: Uuid::now_v7(),
            buyer_id: buyer_id.to_string(),
            seller_id: valid.seller_id,
            items: valid.items,
            pax: valid.pax,
            total_amount: valid.total_amount,
            order_type: valid.order_type,
            package_type: request.package_type,
            start_date: request.start_date,
            end_date: request.end_date,
            delivery_address: request.delivery_address,
            buyer_location: valid.buyer_location,
            buyer_contact,
            seller: SellerSnapshot {
                name: seller.name,
                phone: seller.phone,
                address: seller.address,
                location: seller.location,
            },
            distance_km,
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
        };
        if order.is_free() {
            order.payment_status = PaymentStatus::NotRequired;
        }

        let stored = self.store.process(InsertOrder { order }).await?;
        self.publish(&stored.order);
        tracing::info!(order_id = %stored.order.id, "Order created");
        Ok(stored.order)
    }
}
