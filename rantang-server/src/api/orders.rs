use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rantang_core::entities::Party;
use rantang_core::lifecycle::LifecycleError;
use rantang_sdk::objects::{
    CompleteDailyDeliveryRequest, CreateOrderRequest, CreateOrderResponse, DailyDeliveryResponse,
    DeliveryLogsResponse, ListOrdersQuery, OrderResponse, UpdateOrderRequest, clamp_pagination,
};
use uuid::Uuid;

use super::ApiError;
use crate::api::extractors::{BuyerAuth, PartyAuth, SellerAuth};
use crate::state::AppState;

/// `POST /orders`: place a new order for the authenticated buyer.
pub(super) async fn create_order(
    state: State<AppState>,
    BuyerAuth(buyer_id): BuyerAuth,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.lifecycle.create_order(&buyer_id, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id: order.id,
            order: OrderResponse::from(&order),
        }),
    ))
}

/// `GET /orders`: newest first, scoped to the caller.
///
/// `buyerId` / `sellerId` may be passed but must name the caller.
pub(super) async fn list_orders(
    state: State<AppState>,
    PartyAuth(party): PartyAuth,
    Query(query): Query<ListOrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let requested = match (query.buyer_id, query.seller_id) {
        (Some(_), Some(_)) => {
            return Err(LifecycleError::Validation(
                "pass either buyerId or sellerId, not both".to_string(),
            )
            .into());
        }
        (Some(buyer_id), None) => Some(Party::Buyer(buyer_id)),
        (None, Some(seller_id)) => Some(Party::Seller(seller_id)),
        (None, None) => None,
    };
    if requested.is_some_and(|requested| requested != party) {
        return Err(
            LifecycleError::Forbidden("cannot list orders of another user".to_string()).into(),
        );
    }

    let (limit, offset) = clamp_pagination(query.limit, query.offset);
    let orders = state.lifecycle.list_orders(party, limit, offset).await?;
    Ok(Json(
        orders.iter().map(OrderResponse::from).collect::<Vec<_>>(),
    ))
}

/// `GET /orders/{order_id}`: full order for its buyer or seller.
pub(super) async fn get_order(
    state: State<AppState>,
    PartyAuth(party): PartyAuth,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.lifecycle.get_order(&party, order_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// `PATCH /orders/{order_id}`: one-shot progress change or a daily
/// delivery entry, depending on which field the body carries.
pub(super) async fn update_order(
    state: State<AppState>,
    SellerAuth(seller_id): SellerAuth,
    Path(order_id): Path<Uuid>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<Response, ApiError> {
    match (body.status_progress, body.daily_delivery_log) {
        (Some(target), None) => {
            let order = state
                .lifecycle
                .update_progress(&seller_id, order_id, target)
                .await?;
            Ok(Json(OrderResponse::from(&order)).into_response())
        }
        (None, Some(entry)) => {
            let response = daily_delivery(&state, &seller_id, order_id, entry).await?;
            Ok(Json(response).into_response())
        }
        (Some(_), Some(_)) => Err(LifecycleError::Validation(
            "pass either statusProgress or dailyDeliveryLog, not both".to_string(),
        )
        .into()),
        (None, None) => Err(LifecycleError::Validation(
            "statusProgress or dailyDeliveryLog is required".to_string(),
        )
        .into()),
    }
}

/// `POST /orders/{order_id}/complete-daily-delivery`
pub(super) async fn complete_daily_delivery(
    state: State<AppState>,
    SellerAuth(seller_id): SellerAuth,
    Path(order_id): Path<Uuid>,
    Json(body): Json<CompleteDailyDeliveryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = daily_delivery(&state, &seller_id, order_id, body).await?;
    Ok(Json(response))
}

async fn daily_delivery(
    state: &AppState,
    seller_id: &str,
    order_id: Uuid,
    request: CompleteDailyDeliveryRequest,
) -> Result<DailyDeliveryResponse, ApiError> {
    let (order, log, summary) = state
        .lifecycle
        .complete_daily_delivery(seller_id, order_id, request)
        .await?;
    Ok(DailyDeliveryResponse {
        order_id: order.id,
        status_progress: order.status_progress,
        summary,
        log: (&log).into(),
    })
}

/// `GET /orders/{order_id}/delivery-logs`: read-only delivery summary.
pub(super) async fn delivery_logs(
    state: State<AppState>,
    PartyAuth(party): PartyAuth,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let (order, summary) = state.lifecycle.delivery_logs(&party, order_id).await?;
    Ok(Json(DeliveryLogsResponse {
        order_id: order.id,
        status_progress: order.status_progress,
        summary,
        logs: order.daily_delivery_logs.iter().map(Into::into).collect(),
    }))
}
