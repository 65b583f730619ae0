//! Event channel factories and handles.

use super::types::OrderStatusUpdate;
use tokio::sync::broadcast;

/// Default buffer size for event channels.
///
/// Slow subscribers that fall further behind than this see
/// `RecvError::Lagged` and should re-read the order.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for OrderStatusUpdate events.
pub type OrderStatusSender = broadcast::Sender<OrderStatusUpdate>;
/// Receiver handle for OrderStatusUpdate events.
pub type OrderStatusReceiver = broadcast::Receiver<OrderStatusUpdate>;

/// Create a new OrderStatusUpdate channel.
///
/// Receivers are created with [`broadcast::Sender::subscribe`]; the
/// initial receiver is dropped since nobody listens at startup.
pub fn order_status_channel() -> OrderStatusSender {
    let (tx, _rx) = broadcast::channel(DEFAULT_CHANNEL_BUFFER);
    tx
}
