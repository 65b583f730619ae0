use axum::{
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use rantang_core::entities::Party;
use rantang_core::entities::order::Order;
use rantang_core::events::OrderStatusReceiver;
use rantang_core::lifecycle::LifecycleError;
use rantang_sdk::objects::OrderResponse;
use rantang_sdk::objects::ws::{WsCloseCode, WsServerMessage};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use super::ApiError;
use crate::api::extractors::PartyAuth;
use crate::state::AppState;

/// `GET /orders/{order_id}/ws`: WebSocket order status stream.
///
/// Upgrades the HTTP connection to a WebSocket and pushes the full
/// order whenever it changes. The first frame is always the current
/// order; the connection is closed after a terminal progress
/// (`completed`, `cancelled`).
pub(super) async fn order_status_ws(
    state: State<AppState>,
    PartyAuth(party): PartyAuth,
    Path(order_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    // Subscribe before reading the current order so that an update
    // racing with the read is still in the receiver's buffer.
    let updates = state.lifecycle.events().subscribe();
    let order = state.lifecycle.get_order(&party, order_id).await?;

    let app_state = state.0.clone();
    Ok(ws.on_upgrade(move |socket| handle_order_ws(socket, app_state, party, order, updates)))
}

/// Background task that drives a single WebSocket connection.
///
/// 1. Sends the current order as the first message.
/// 2. If already terminal, closes immediately.
/// 3. Otherwise forwards the re-read order for every update to this
///    `order_id` until a terminal progress is reached or the client
///    disconnects.
async fn handle_order_ws(
    mut socket: WebSocket,
    state: AppState,
    party: Party,
    order: Order,
    mut updates: OrderStatusReceiver,
) {
    let order_id = order.id;
    match send_order(&mut socket, &order).await {
        Ok(true) => return,
        Ok(false) => {}
        Err(()) => return,
    }

    loop {
        tokio::select! {
            result = updates.recv() => {
                match result {
                    Ok(update) if update.order_id == order_id => {}
                    Ok(_) => continue,
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(
                            %order_id,
                            skipped = n,
                            "WS: broadcast receiver lagged, re-reading order"
                        );
                    }
                    Err(RecvError::Closed) => break,
                }

                let order = match state.lifecycle.get_order(&party, order_id).await {
                    Ok(order) => order,
                    Err(LifecycleError::NotFound(_)) => {
                        close_with_error(&mut socket, WsCloseCode::ORDER_NOT_FOUND, "order not found").await;
                        return;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, %order_id, "WS: failed to read order on update");
                        close_with_error(&mut socket, WsCloseCode::INTERNAL_ERROR, "internal error").await;
                        return;
                    }
                };
                match send_order(&mut socket, &order).await {
                    Ok(true) | Err(()) => return,
                    Ok(false) => {}
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = socket.send(Message::Close(None)).await;
}

/// Push `order` and close the socket if it is terminal.
///
/// Returns `Ok(true)` once the stream is finished.
async fn send_order(socket: &mut WebSocket, order: &Order) -> Result<bool, ()> {
    let msg = WsServerMessage::StatusUpdate {
        order: OrderResponse::from(order),
    };
    send_json(socket, &msg).await?;

    if order.status_progress.is_terminal() {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: WsCloseCode::NORMAL,
                reason: order.status_progress.as_str().into(),
            })))
            .await;
        return Ok(true);
    }
    Ok(false)
}

async fn close_with_error(socket: &mut WebSocket, code: u16, reason: &'static str) {
    let _ = send_json(
        socket,
        &WsServerMessage::Error {
            code,
            reason: reason.to_string(),
        },
    )
    .await;
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await;
}

/// Serialize `value` as JSON and send it as a text WebSocket frame.
///
/// Returns `Err(())` if the send fails (client disconnected).
async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = serde_json::to_string(value).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}
