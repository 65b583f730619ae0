//! In-process order events.
//!
//! Every committed order write publishes an [`OrderStatusUpdate`] on a
//! broadcast channel. WebSocket streams subscribe to it and re-read the
//! order from the store, so events carry identifiers rather than full
//! documents.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, OrderStatusReceiver, OrderStatusSender, order_status_channel,
};
pub use types::OrderStatusUpdate;
