//! HTTP behavior of the REST client against a local mock server.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storefront::StorefrontError;
use storefront::api::{FallbackReason, StoreApi};
use storefront::config::ServiceEndpoints;
use storefront::models::{NewOrder, Order, OrderLine, OrderStatus, PaymentStatus, UserProfile};
use storefront::reconcile::{PaymentProvenance, Reconciler};
use storefront::rest::RestClient;
use storefront::session::SessionContext;

const TOKEN: &str = "test-token";

fn client_for(server: &MockServer) -> RestClient {
    RestClient::new(
        ServiceEndpoints::single(&server.uri()),
        SessionContext::new(TOKEN, UserProfile::with_id(7)),
        None,
    )
    .expect("Failed to build client")
}

fn bearer() -> String {
    format!("Bearer {TOKEN}")
}

#[tokio::test]
async fn test_fetch_orders_sends_bearer_and_user_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(query_param("userId", "7"))
        .and(header("Authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "userId": 7, "status": "CONFIRMED", "createdDate": "2024-06-01T09:30:00",
             "items": [{"itemId": 5, "quantity": 2}]}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let orders = assert_ok!(client_for(&server).fetch_orders(7).await);

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn test_fetch_orders_unwraps_page_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"id": 1, "userId": 7, "status": "PAYMENT_PENDING", "createdDate": "a"},
                {"id": 2, "userId": 7, "status": "CONFIRMED", "createdDate": "b"}
            ],
            "totalElements": 2, "totalPages": 1, "size": 20, "number": 0
        })))
        .mount(&server)
        .await;

    let orders = assert_ok!(client_for(&server).get_orders(7).await);

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_unauthorized_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).get_orders(7).await.unwrap_err();

    assert!(err.is_auth());
    assert!(matches!(err, StorefrontError::Auth { status: 401 }));
}

#[tokio::test]
async fn test_server_error_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).get_items().await.unwrap_err();

    match err {
        StorefrontError::Status { status, url } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/api/items"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_body_is_a_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_items().await.unwrap_err();

    assert!(matches!(err, StorefrontError::Json(_)));
}

#[tokio::test]
async fn test_connection_failure_is_a_network_error() {
    let client = RestClient::new(
        ServiceEndpoints::single("http://127.0.0.1:1"),
        SessionContext::anonymous(),
        None,
    )
    .expect("Failed to build client");

    let err = client.get_orders(7).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Network(_)));

    let reason = client.fetch_authoritative_payments(7).await.unwrap_err();
    assert!(matches!(reason, FallbackReason::Unreachable(_)));
}

#[tokio::test]
async fn test_anonymous_session_sends_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = RestClient::new(
        ServiceEndpoints::single(&server.uri()),
        SessionContext::anonymous(),
        None,
    )
    .expect("Failed to build client");
    assert_ok!(client.get_items().await);

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_payment_service_failure_becomes_fallback_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/payments/confirmed-orders"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let reason = client_for(&server)
        .fetch_authoritative_payments(7)
        .await
        .unwrap_err();

    assert_eq!(reason, FallbackReason::Status { status: 503 });
}

#[tokio::test]
async fn test_payment_service_records_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/payments/confirmed-orders"))
        .and(query_param("userId", "7"))
        .and(header("Authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 501, "orderId": 1, "userId": 7, "amount": 23.5,
             "status": "COMPLETED", "paymentDate": "2024-06-01T09:31:12"}
        ])))
        .mount(&server)
        .await;

    let payments = client_for(&server)
        .fetch_authoritative_payments(7)
        .await
        .expect("payment service answered");

    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, dec!(23.5));
    assert_eq!(payments[0].status, PaymentStatus::Completed);
}

#[tokio::test]
async fn test_reconciles_over_http_when_payment_service_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/payments/confirmed-orders"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(query_param("userId", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "userId": 7, "status": "CONFIRMED", "createdDate": "2024-06-01T09:30:00",
             "items": [{"itemId": 5, "quantity": 2}]},
            {"id": 2, "userId": 7, "status": "PAYMENT_PENDING", "createdDate": "2024-06-02T09:30:00",
             "items": [{"itemId": 5, "quantity": 1}]}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"id": 5, "name": "Coffee Mug", "price": 10}]
        })))
        .mount(&server)
        .await;

    let result = assert_ok!(Reconciler::new(client_for(&server)).reconcile(7).await);

    assert_eq!(
        result.provenance,
        PaymentProvenance::Derived {
            reason: FallbackReason::Status { status: 502 }
        }
    );
    assert_eq!(result.payments.len(), 1);
    assert_eq!(result.payments[0].id, 1);
    assert_eq!(result.payments[0].amount, dec!(20));
    assert_eq!(result.payments[0].payment_date, "2024-06-01T09:30:00");
}

#[tokio::test]
async fn test_catalog_outage_over_http_yields_zero_amounts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/payments/confirmed-orders"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "userId": 7, "status": "CONFIRMED", "createdDate": "d",
             "items": [{"itemId": 5, "quantity": 2}]}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = assert_ok!(Reconciler::new(client_for(&server)).reconcile(7).await);

    assert_eq!(result.payments.len(), 1);
    assert_eq!(result.payments[0].amount, Decimal::ZERO);
    assert_eq!(
        result.provenance,
        PaymentProvenance::Derived {
            reason: FallbackReason::Unauthorized { status: 403 }
        }
    );
}

#[tokio::test]
async fn test_confirm_order_puts_confirmed_status() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/orders/3"))
        .and(header("Authorization", bearer().as_str()))
        .and(body_partial_json(json!({"id": 3, "status": "CONFIRMED"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            {"id": 3, "userId": 7, "status": "CONFIRMED", "createdDate": "2024-06-03T11:45:00"}
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut pending = Order::new(3, 7, OrderStatus::PaymentPending, vec![]);
    pending.created_date = "2024-06-03T11:45:00".to_string();
    pending.items = None;
    let confirmed = assert_ok!(client_for(&server).confirm_order(&pending).await);

    assert!(confirmed.is_confirmed());
}

#[tokio::test]
async fn test_delete_order() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/orders/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/orders/4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_ok!(client.delete_order(3).await);

    let err = client.delete_order(4).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_confirm_order_sends_the_order_back_unchanged_except_status() {
    let stored = json!({
        "id": 3,
        "userId": 7,
        "status": "PAYMENT_PENDING",
        "createdDate": "2024-06-03T11:45:00",
        "totalPrice": 3.5,
        "items": [{"id": 6, "name": "Notebook", "price": 3.5}, {"sku": "GIFT"}]
    });
    let mut expected = stored.clone();
    expected["status"] = json!("CONFIRMED");

    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/orders/3"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(&expected))
        .expect(1)
        .mount(&server)
        .await;

    let pending: Order = serde_json::from_value(stored).expect("valid order");
    let confirmed = assert_ok!(client_for(&server).confirm_order(&pending).await);

    assert!(confirmed.is_confirmed());
    assert_eq!(confirmed.extra["totalPrice"], json!(3.5));
}

#[tokio::test]
async fn test_create_order_posts_pending_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header("Authorization", bearer().as_str()))
        .and(body_json(json!({
            "userId": 7,
            "status": "PAYMENT_PENDING",
            "items": [{"itemId": 5, "quantity": 1}, {"itemId": 6, "quantity": 1}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 11, "userId": 7, "status": "PAYMENT_PENDING", "createdDate": "2024-06-05T08:00:00",
            "items": [{"itemId": 5, "quantity": 1}, {"itemId": 6, "quantity": 1}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let order = NewOrder::pending(7, vec![OrderLine::new(5, 1), OrderLine::new(6, 1)]);
    let created = assert_ok!(client_for(&server).create_order(&order).await);

    assert_eq!(created.id, 11);
    assert_eq!(created.status, OrderStatus::PaymentPending);
    assert_eq!(created.lines(), order.items.as_slice());
}
