use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use rantang_core::config::{AuthConfig, GatewayConfig, ServerConfig, SharedConfig};
use rantang_core::entities::buyer::BuyerContact;
use rantang_core::entities::seller::SellerProfile;
use rantang_core::events::order_status_channel;
use rantang_core::gateway::{CheckoutSession, GatewayError, PaymentGateway, SessionRequest};
use rantang_core::lifecycle::OrderLifecycle;
use rantang_core::store::{MemoryProcessor, OrderStore};
use rantang_sdk::objects::{
    ApprovalAction, ApproveOrderRequest, ApproveOrderResponse, CreateOrderRequest,
    CreateOrderResponse, OrderItem, OrderResponse, PaymentNotification, PaymentStatus,
    PaymentStatusResponse, StatusProgress, SubmitReviewRequest, SubmitReviewResponse,
    TransactionStatus, UpdateOrderRequest,
};
use rantang_sdk::signature::notification_signature;
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::ServiceExt;
use url::Url;
use uuid::Uuid;

use super::extractors::{Role, issue_token};
use crate::server::build_router;
use crate::state::AppState;

const SECRET: &[u8] = b"router-test-secret-0123456789abcdef";
const SERVER_KEY: &str = "SB-Mid-server-test";

#[derive(Default)]
struct StubGateway {
    sessions: AtomicUsize,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_session(
        &self,
        request: SessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(CheckoutSession {
            token: format!("snap-{}", request.order_id),
            redirect_url: format!("https://pay.example/{}", request.order_id),
        })
    }

    async fn transaction_status(
        &self,
        order_id: Uuid,
    ) -> Result<PaymentStatusResponse, GatewayError> {
        Ok(PaymentStatusResponse {
            order_id: order_id.to_string(),
            transaction_status: TransactionStatus::Pending,
            fraud_status: None,
            payment_type: Some("qris".into()),
            status_code: Some("201".into()),
            gross_amount: Some("25000.00".into()),
            status_message: None,
        })
    }
}

struct TestApp {
    router: Router,
    gateway: Arc<StubGateway>,
}

async fn app(verify_signature: bool) -> TestApp {
    let memory = MemoryProcessor::default();
    memory
        .put_seller(SellerProfile {
            id: "S1".into(),
            name: "Dapur Bu Sri".into(),
            phone: Some("0812".into()),
            address: None,
            location: None,
            rating_average: 0.0,
            rating_count: 0,
        })
        .await;
    memory
        .put_buyer(BuyerContact {
            id: "B1".into(),
            name: "Ani".into(),
            email: Some("ani@example.com".into()),
            phone: None,
        })
        .await;

    let gateway = Arc::new(StubGateway::default());
    let lifecycle = OrderLifecycle::new(
        OrderStore::Memory(memory),
        gateway.clone(),
        order_status_channel(),
    );
    let config = SharedConfig::new(
        ServerConfig {
            listen: "127.0.0.1:0".parse().unwrap(),
        },
        AuthConfig::new(SECRET.to_vec()),
        GatewayConfig {
            server_key: SERVER_KEY.into(),
            snap_base_url: Url::parse("https://app.sandbox.midtrans.com/").unwrap(),
            api_base_url: Url::parse("https://api.sandbox.midtrans.com/").unwrap(),
            finish_redirect_url: None,
            verify_signature,
        },
    );
    TestApp {
        router: build_router(AppState::new(lifecycle, config)),
        gateway,
    }
}

fn buyer(id: &str) -> String {
    issue_token(SECRET, id, Role::Buyer)
}

fn seller(id: &str) -> String {
    issue_token(SECRET, id, Role::Seller)
}

async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&impl Serialize>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn json<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

const NO_BODY: Option<&()> = None;

fn catering_request() -> CreateOrderRequest {
    CreateOrderRequest {
        seller_id: Some("S1".into()),
        items: Some(vec![OrderItem {
            id: "m1".into(),
            name: "Nasi Box".into(),
            price: Decimal::from(25_000),
            quantity: None,
        }]),
        total_amount: Some(Decimal::from(25_000)),
        delivery_address: "Jl. Merdeka 1".into(),
        ..Default::default()
    }
}

async fn create(app: &TestApp) -> Uuid {
    let (status, body) = call(
        &app.router,
        Method::POST,
        "/api/v1/orders",
        Some(&buyer("B1")),
        Some(&catering_request()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json::<CreateOrderResponse>(&body).order_id
}

fn settlement(order_id: Uuid, signed: bool) -> PaymentNotification {
    let order_id = order_id.to_string();
    let signature_key =
        signed.then(|| notification_signature(&order_id, "200", "25000.00", SERVER_KEY));
    PaymentNotification {
        order_id,
        transaction_status: "settlement".into(),
        fraud_status: Some("accept".into()),
        payment_type: Some("qris".into()),
        status_code: Some("200".into()),
        gross_amount: Some("25000.00".into()),
        signature_key,
    }
}

#[tokio::test]
async fn test_health() {
    let app = app(false).await;
    let (status, _) = call(&app.router, Method::GET, "/health", None, NO_BODY).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_required_and_role_checked() {
    let app = app(false).await;
    let request = catering_request();

    let (status, _) = call(&app.router, Method::POST, "/api/v1/orders", None, Some(&request)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = issue_token(b"some-other-secret", "B1", Role::Buyer);
    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/v1/orders",
        Some(&forged),
        Some(&request),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/v1/orders",
        Some(&seller("S1")),
        Some(&request),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_validation_error_is_400() {
    let app = app(false).await;
    let request = CreateOrderRequest {
        items: Some(Vec::new()),
        ..catering_request()
    };
    let (status, body) = call(
        &app.router,
        Method::POST,
        "/api/v1/orders",
        Some(&buyer("B1")),
        Some(&request),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"items must not be empty");
}

#[tokio::test]
async fn test_order_reads_are_scoped_to_owner() {
    let app = app(false).await;
    let order_id = create(&app).await;
    let uri = format!("/api/v1/orders/{order_id}");

    let (status, body) = call(&app.router, Method::GET, &uri, Some(&seller("S1")), NO_BODY).await;
    assert_eq!(status, StatusCode::OK);
    let order: OrderResponse = json(&body);
    assert_eq!(order.status_progress, StatusProgress::AwaitingSellerApproval);
    assert_eq!(order.seller.name, "Dapur Bu Sri");

    let (status, _) = call(&app.router, Method::GET, &uri, Some(&buyer("B2")), NO_BODY).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app.router,
        Method::GET,
        &format!("/api/v1/orders/{}", Uuid::new_v4()),
        Some(&buyer("B1")),
        NO_BODY,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_orders_rejects_foreign_filter() {
    let app = app(false).await;
    create(&app).await;
    create(&app).await;

    let (status, body) = call(
        &app.router,
        Method::GET,
        "/api/v1/orders?buyerId=B1&limit=1",
        Some(&buyer("B1")),
        NO_BODY,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json::<Vec<OrderResponse>>(&body).len(), 1);

    let (status, body) = call(&app.router, Method::GET, "/api/v1/orders", Some(&seller("S1")), NO_BODY).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json::<Vec<OrderResponse>>(&body).len(), 2);

    let (status, _) = call(
        &app.router,
        Method::GET,
        "/api/v1/orders?sellerId=S1",
        Some(&buyer("B1")),
        NO_BODY,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reject_then_approve_conflicts() {
    let app = app(false).await;
    let order_id = create(&app).await;

    let reject = ApproveOrderRequest {
        order_id,
        action: ApprovalAction::Reject,
        rejection_reason: Some("out of stock".into()),
    };
    let (status, body) = call(
        &app.router,
        Method::POST,
        "/api/v1/seller/orders/approve",
        Some(&seller("S1")),
        Some(&reject),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rejected: ApproveOrderResponse = json(&body);
    assert_eq!(rejected.status_progress, StatusProgress::Cancelled);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("out of stock"));

    let approve = ApproveOrderRequest {
        order_id,
        action: ApprovalAction::Approve,
        rejection_reason: None,
    };
    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/v1/seller/orders/approve",
        Some(&seller("S1")),
        Some(&approve),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.gateway.sessions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_notification_requires_valid_signature() {
    let app = app(true).await;
    let order_id = create(&app).await;
    let approve = ApproveOrderRequest {
        order_id,
        action: ApprovalAction::Approve,
        rejection_reason: None,
    };
    call(
        &app.router,
        Method::POST,
        "/api/v1/seller/orders/approve",
        Some(&seller("S1")),
        Some(&approve),
    )
    .await;

    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/v1/payments/notification",
        None,
        Some(&settlement(order_id, false)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(
        &app.router,
        Method::POST,
        "/api/v1/payments/notification",
        None,
        Some(&settlement(order_id, true)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/v1/payments/notification",
        None,
        Some(&settlement(Uuid::new_v4(), true)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_with_both_fields_is_rejected() {
    let app = app(false).await;
    let order_id = create(&app).await;
    let body = UpdateOrderRequest {
        status_progress: Some(StatusProgress::Completed),
        daily_delivery_log: Some(rantang_sdk::objects::CompleteDailyDeliveryRequest {
            delivery_date: time::macros::date!(2026 - 01 - 05),
            delivery_time: None,
        }),
    };
    let (status, _) = call(
        &app.router,
        Method::PATCH,
        &format!("/api/v1/orders/{order_id}"),
        Some(&seller("S1")),
        Some(&body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_paid_order_end_to_end() {
    let app = app(false).await;
    let order_id = create(&app).await;

    let approve = ApproveOrderRequest {
        order_id,
        action: ApprovalAction::Approve,
        rejection_reason: None,
    };
    let (status, body) = call(
        &app.router,
        Method::POST,
        "/api/v1/seller/orders/approve",
        Some(&seller("S1")),
        Some(&approve),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let approved: ApproveOrderResponse = json(&body);
    assert_eq!(approved.status_progress, StatusProgress::ApprovedAwaitingPayment);
    assert_eq!(approved.snap_token, Some(format!("snap-{order_id}")));

    let (status, body) = call(
        &app.router,
        Method::GET,
        &format!("/api/v1/payments/status/{order_id}"),
        Some(&buyer("B1")),
        NO_BODY,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let gateway_status: PaymentStatusResponse = json(&body);
    assert_eq!(gateway_status.transaction_status, TransactionStatus::Pending);

    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/v1/payments/notification",
        None,
        Some(&settlement(order_id, false)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let finish = UpdateOrderRequest {
        status_progress: Some(StatusProgress::Completed),
        daily_delivery_log: None,
    };
    let (status, body) = call(
        &app.router,
        Method::PATCH,
        &format!("/api/v1/orders/{order_id}"),
        Some(&seller("S1")),
        Some(&finish),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order: OrderResponse = json(&body);
    assert_eq!(order.status_progress, StatusProgress::Completed);
    assert_eq!(order.payment_status, PaymentStatus::Settlement);

    // Repeated settlement after completion is acknowledged without effect.
    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/v1/payments/notification",
        None,
        Some(&settlement(order_id, false)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let review = SubmitReviewRequest {
        order_id,
        seller_id: "S1".into(),
        rating: 5,
        review: "Enak".into(),
    };
    let (status, body) = call(
        &app.router,
        Method::POST,
        "/api/v1/reviews",
        Some(&buyer("B1")),
        Some(&review),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reviewed: SubmitReviewResponse = json(&body);
    let rating = reviewed.seller_rating.unwrap();
    assert_eq!(rating.rating_average, 5.0);
    assert_eq!(rating.rating_count, 1);

    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/v1/reviews",
        Some(&buyer("B1")),
        Some(&review),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.gateway.sessions.load(Ordering::SeqCst), 1);
}

type ClientStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn next_frame(
    stream: &mut ClientStream,
) -> Option<Result<tokio_tungstenite::tungstenite::Message, tokio_tungstenite::tungstenite::Error>> {
    use futures_util::StreamExt;
    tokio::time::timeout(std::time::Duration::from_secs(5), stream.next())
        .await
        .expect("no frame within five seconds")
}

#[tokio::test]
async fn test_order_stream_pushes_updates_and_closes_when_completed() {
    use rantang_sdk::objects::ws::WsServerMessage;
    use tokio_tungstenite::tungstenite::{Message, client::IntoClientRequest};

    let app = app(false).await;
    let order_id = create(&app).await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let mut request = format!("ws://{addr}/api/v1/orders/{order_id}/ws")
        .into_client_request()
        .unwrap();
    request.headers_mut().insert(
        "authorization",
        format!("Bearer {}", buyer("B1")).parse().unwrap(),
    );
    let (mut stream, _) = tokio_tungstenite::connect_async(request).await.unwrap();

    let progress_of = |text: &str| match serde_json::from_str::<WsServerMessage>(text).unwrap() {
        WsServerMessage::StatusUpdate { order } => {
            assert_eq!(order.order_id, order_id);
            order.status_progress
        }
        WsServerMessage::Error { code, reason } => panic!("stream error {code}: {reason}"),
    };

    match next_frame(&mut stream).await {
        Some(Ok(Message::Text(text))) => {
            assert_eq!(progress_of(&text), StatusProgress::AwaitingSellerApproval)
        }
        other => panic!("expected the current order first, got {other:?}"),
    }

    let approve = ApproveOrderRequest {
        order_id,
        action: ApprovalAction::Approve,
        rejection_reason: None,
    };
    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/v1/seller/orders/approve",
        Some(&seller("S1")),
        Some(&approve),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(
        &app.router,
        Method::POST,
        "/api/v1/payments/notification",
        None,
        Some(&settlement(order_id, false)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let finish = UpdateOrderRequest {
        status_progress: Some(StatusProgress::Completed),
        daily_delivery_log: None,
    };
    let (status, _) = call(
        &app.router,
        Method::PATCH,
        &format!("/api/v1/orders/{order_id}"),
        Some(&seller("S1")),
        Some(&finish),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut pushed = Vec::new();
    let close = loop {
        match next_frame(&mut stream).await {
            Some(Ok(Message::Text(text))) => pushed.push(progress_of(&text)),
            Some(Ok(Message::Close(frame))) => break frame,
            Some(Ok(_)) => {}
            other => panic!("stream ended without a close frame: {other:?}"),
        }
    };
    assert!(!pushed.is_empty());
    assert_eq!(pushed.last(), Some(&StatusProgress::Completed));
    let close = close.unwrap();
    assert_eq!(u16::from(close.code), 1000);
    assert_eq!(close.reason, "completed");
}
