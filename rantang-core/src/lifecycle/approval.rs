use rantang_sdk::objects::{
    ApprovalAction, ApproveOrderRequest, OrderStatus, PaymentStatus, StatusProgress,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{APPROVAL_CLAIM_LEASE, Change, LifecycleError, OrderLifecycle};
use crate::entities::order::{ApprovalClaim, Order, PaymentSession};
use crate::gateway::{CustomerDetails, SessionRequest};

pub const DEFAULT_REJECTION_REASON: &str = "Rejected by seller";

/// What the claim phase of an approval decided.
enum Claimed {
    /// Free order, approved outright.
    Free,
    /// We hold the approval claim and must open a payment session.
    Paid { token: Uuid, session: SessionRequest },
}

/// Preconditions shared by approve and reject.
fn ensure_approvable(
    order: &Order,
    seller_id: &str,
    now: OffsetDateTime,
) -> Result<(), LifecycleError> {
    if order.seller_id != seller_id {
        return Err(LifecycleError::Forbidden(
            "order belongs to another seller".to_string(),
        ));
    }
    if order.status_progress != StatusProgress::AwaitingSellerApproval {
        return Err(LifecycleError::Conflict(format!(
            "order is {}, not awaiting seller approval",
            order.status_progress
        )));
    }
    if order.live_claim(now, APPROVAL_CLAIM_LEASE).is_some() {
        return Err(LifecycleError::Conflict(
            "order approval is already in progress".to_string(),
        ));
    }
    Ok(())
}

fn holds_claim(order: &Order, token: Uuid) -> bool {
    order.approval_claim.is_some_and(|claim| claim.token == token)
}

impl OrderLifecycle {
    /// Approve or reject an order awaiting the seller.
    ///
    /// Approving a paid order opens a checkout session at the gateway.
    /// The gateway call runs outside any store write; an approval claim on
    /// the order keeps a concurrent approval from opening a second
    /// session.
    #[tracing::instrument(skip(self, request), fields(order_id = %request.order_id, action = ?request.action))]
    pub async fn approve_order(
        &self,
        seller_id: &str,
        request: ApproveOrderRequest,
    ) -> Result<Order, LifecycleError> {
        match request.action {
            ApprovalAction::Reject => {
                self.reject(seller_id, request.order_id, request.rejection_reason)
                    .await
            }
            ApprovalAction::Approve => self.approve(seller_id, request.order_id).await,
        }
    }

    async fn reject(
        &self,
        seller_id: &str,
        order_id: Uuid,
        reason: Option<String>,
    ) -> Result<Order, LifecycleError> {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());

        let ((), order) = self
            .transition(order_id, |mut order, now| {
                ensure_approvable(&order, seller_id, now)?;
                order.status = OrderStatus::Cancelled;
                order.status_progress = StatusProgress::Cancelled;
                order.rejection_reason = Some(reason.clone());
                order.updated_at = now;
                Ok(Change::Write(order, ()))
            })
            .await?;
        tracing::info!(%order_id, "Order rejected by seller");
        Ok(order)
    }

    async fn approve(&self, seller_id: &str, order_id: Uuid) -> Result<Order, LifecycleError> {
        let (claimed, order) = self
            .transition(order_id, |mut order, now| {
                ensure_approvable(&order, seller_id, now)?;
                if order.is_free() {
                    order.status_progress = StatusProgress::Processing;
                    order.status = OrderStatus::Processing;
                    order.payment_status = PaymentStatus::NotRequired;
                    order.approval_claim = None;
                    order.approved_at = Some(now);
                    order.updated_at = now;
                    return Ok(Change::Write(order, Claimed::Free));
                }

                let token = Uuid::new_v4();
                let session = SessionRequest {
                    order_id: order.id,
                    amount: order.total_amount,
                    customer: order.buyer_contact.as_ref().map(|c| CustomerDetails {
                        name: c.name.clone(),
                        email: c.email.clone(),
                        phone: c.phone.clone(),
                    }),
                };
                order.approval_claim = Some(ApprovalClaim {
                    token,
                    claimed_at: now,
                });
                order.updated_at = now;
                Ok(Change::Write(order, Claimed::Paid { token, session }))
            })
            .await?;

        let (token, session) = match claimed {
            Claimed::Free => {
                tracing::info!(%order_id, "Free order approved without payment");
                return Ok(order);
            }
            Claimed::Paid { token, session } => (token, session),
        };

        let checkout = match self.gateway.create_session(session).await {
            Ok(checkout) => checkout,
            Err(e) => {
                tracing::warn!(%order_id, error = %e, "Opening checkout session failed, releasing claim");
                self.release_claim(order_id, token).await;
                return Err(e.into());
            }
        };

        let ((), order) = self
            .transition(order_id, |mut order, now| {
                if !holds_claim(&order, token)
                    || order.status_progress != StatusProgress::AwaitingSellerApproval
                {
                    return Err(LifecycleError::Conflict(
                        "order changed while the payment session was being opened".to_string(),
                    ));
                }
                order.payment_session = Some(PaymentSession {
                    token: checkout.token.clone(),
                    redirect_url: checkout.redirect_url.clone(),
                    created_at: now,
                });
                order.status_progress = StatusProgress::ApprovedAwaitingPayment;
                order.payment_status = PaymentStatus::Pending;
                order.approval_claim = None;
                order.approved_at = Some(now);
                order.updated_at = now;
                Ok(Change::Write(order, ()))
            })
            .await
            .inspect_err(|e| {
                tracing::error!(%order_id, error = %e, "Checkout session opened but not recorded");
            })?;

        tracing::info!(%order_id, "Order approved, awaiting payment");
        Ok(order)
    }

    /// Drop our approval claim so the seller can retry.
    async fn release_claim(&self, order_id: Uuid, token: Uuid) {
        let released = self
            .transition(order_id, |mut order, now| {
                if !holds_claim(&order, token) {
                    return Ok(Change::Keep(()));
                }
                order.approval_claim = None;
                order.updated_at = now;
                Ok(Change::Write(order, ()))
            })
            .await;
        if let Err(e) = released {
            // The lease still expires on its own.
            tracing::error!(%order_id, error = %e, "Failed to release approval claim");
        }
    }
}
