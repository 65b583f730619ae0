pub mod approval;
pub mod delivery;
pub mod order;
pub mod payment;
pub mod review;
pub mod ws;

pub use approval::{ApprovalAction, ApproveOrderRequest, ApproveOrderResponse};
pub use delivery::{
    CompleteDailyDeliveryRequest, DailyDeliveryLogResponse, DailyDeliveryResponse,
    DeliveryLogsResponse, DeliverySummary,
};
pub use order::{
    CreateOrderRequest, CreateOrderResponse, GeoPoint, ListOrdersQuery, OrderItem, OrderResponse,
    OrderStatus, OrderType, PackageType, PaymentStatus, SellerSnapshotResponse, StatusProgress,
    UpdateOrderRequest, clamp_pagination,
};
pub use payment::{PaymentNotification, PaymentStatusResponse, TransactionStatus};
pub use review::{ReviewAttachmentResponse, SellerRatingResponse, SubmitReviewRequest, SubmitReviewResponse};
