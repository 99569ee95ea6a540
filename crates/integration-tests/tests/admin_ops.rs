//! Back-office calls: request shapes, local checks and role enforcement.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use tsmarket_client::models::OrderStatusUpdate;
use tsmarket_client::{ApiClient, ClientError, ValidationError};
use tsmarket_core::{OrderId, OrderStatus, PromoId, Role, UserId};
use tsmarket_integration_tests::{MockApi, PASSWORD};

async fn admin(api: &MockApi) -> ApiClient {
    let (client, _) = api.client();
    client.login("boss@example.com", PASSWORD).await.unwrap();
    client
}

#[tokio::test]
async fn test_set_role_sends_query() {
    let api = MockApi::start().await;
    let client = admin(&api).await;

    let ack = client
        .set_user_role(&UserId::new("user_ali"), Role::Helper)
        .await
        .unwrap();

    assert_eq!(ack.message.as_deref(), Some("Role updated"));
    let calls = api.state().admin_calls.clone();
    assert_eq!(
        calls,
        vec![("PUT users/user_ali/role".to_string(), json!({ "role": "helper" }))]
    );
}

#[tokio::test]
async fn test_order_status_update_body() {
    let api = MockApi::start().await;
    let client = admin(&api).await;

    let update = OrderStatusUpdate {
        status: OrderStatus::Shipped,
        note: Some("Left the warehouse".to_string()),
        tracking_number: Some("TJ123".to_string()),
    };
    client
        .update_order_status(&OrderId::new("ord_7"), &update)
        .await
        .unwrap();

    let (call, body) = api.state().admin_calls[0].clone();
    assert_eq!(call, "PUT orders/ord_7/status");
    assert_eq!(
        body,
        json!({ "status": "shipped", "note": "Left the warehouse", "tracking_number": "TJ123" })
    );
}

#[tokio::test]
async fn test_return_statuses_are_rejected_locally() {
    let api = MockApi::start().await;
    let client = admin(&api).await;

    for status in [OrderStatus::ReturnPending, OrderStatus::Returned] {
        let update = OrderStatusUpdate {
            status,
            note: None,
            tracking_number: None,
        };
        let err = client
            .update_order_status(&OrderId::new("ord_7"), &update)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::StatusNotSettable(s)) if s == status
        ));
    }
    assert!(api.state().admin_calls.is_empty());
}

#[tokio::test]
async fn test_toggle_promo_reports_new_state() {
    let api = MockApi::start().await;
    let client = admin(&api).await;

    let toggled = client
        .toggle_promo_code(&PromoId::new("promo_1"))
        .await
        .unwrap();

    assert!(!toggled.is_active);
    assert_eq!(toggled.message.as_deref(), Some("Promo code toggled"));
}

#[tokio::test]
async fn test_upload_image() {
    let api = MockApi::start().await;
    let client = admin(&api).await;

    let uploaded = client.upload_image("image/gif", b"GIF89a").await.unwrap();
    assert_eq!(uploaded.image_url, "https://cdn.example.com/img_1.png");

    let (_, body) = api.state().admin_calls[0].clone();
    assert_eq!(body["image"], "data:image/gif;base64,R0lGODlh");

    let err = client.upload_image("text/plain", b"hello").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::NotAnImage(_))
    ));
    let err = client.upload_image("image/png", b"").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(api.state().admin_calls.len(), 1);
}

#[tokio::test]
async fn test_customer_gets_forbidden() {
    let api = MockApi::start().await;
    let (client, _) = api.client();
    client.login("ali@example.com", PASSWORD).await.unwrap();

    let err = client
        .set_user_role(&UserId::new("user_ali"), Role::Admin)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(!err.is_unauthorized());
    assert_eq!(err.user_message("Request failed"), "Admin access required");
    // A forbidden call does not end the session.
    assert!(client.session().is_authenticated());
}
