//! Event type definitions.

use rantang_sdk::objects::StatusProgress;
use uuid::Uuid;

/// Emitted after a write to an order commits.
///
/// `status_progress` is the value that was committed; subscribers that
/// need the full document fetch it from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStatusUpdate {
    pub order_id: Uuid,
    pub status_progress: StatusProgress,
}
