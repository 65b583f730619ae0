//! WebSocket message types for the order status stream.
//!
//! The `GET /orders/{order_id}/ws` endpoint upgrades to a WebSocket
//! connection and pushes [`WsServerMessage`] JSON frames.
//!
//! # Protocol
//!
//! 1. The server sends a [`WsServerMessage::StatusUpdate`] with the
//!    current order immediately after the upgrade.
//! 2. Another [`WsServerMessage::StatusUpdate`] follows every committed
//!    change to the order (progress, payment, delivery log, review).
//! 3. After a terminal progress (`completed`, `cancelled`) the server
//!    sends a normal close frame.
//! 4. If the order disappears or an internal error occurs, the server
//!    sends a close frame with an application-defined code
//!    (see [`WsCloseCode`]).

use serde::{Deserialize, Serialize};

use super::order::OrderResponse;

/// Server-to-client WebSocket message.
///
/// ```json
/// {"type":"status_update","order":{ ... }}
/// {"type":"error","code":4004,"reason":"order not found"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    StatusUpdate {
        order: OrderResponse,
    },
    Error {
        code: u16,
        reason: String,
    },
}

/// Close codes used by the order status stream.
///
/// Codes in the 4000-4999 range are reserved for application use by
/// [RFC 6455 §7.4.2](https://www.rfc-editor.org/rfc/rfc6455#section-7.4.2).
pub struct WsCloseCode;

impl WsCloseCode {
    pub const NORMAL: u16 = 1000;

    pub const INTERNAL_ERROR: u16 = 1011;

    pub const ORDER_NOT_FOUND: u16 = 4004;
}
