//! Cart to order: promo validation, discount preview and submission.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use tsmarket_client::{
    CartStore, Checkout, ClientError, DeliveryDetails, LineOptions, ValidationError,
};
use tsmarket_core::{Percent, ProductId};
use tsmarket_integration_tests::{MockApi, PASSWORD};

async fn checkout_with_hoodies(api: &MockApi, quantity: u32) -> Checkout {
    let (client, storage) = api.client();
    client.login("ali@example.com", PASSWORD).await.unwrap();

    let cart = Arc::new(CartStore::load(storage));
    let hoodie = client.product(&ProductId::new("prod_hoodie")).await.unwrap();
    cart.add_item(
        &hoodie,
        quantity,
        LineOptions {
            size: Some("M".to_string()),
            ..LineOptions::default()
        },
    )
    .unwrap();

    Checkout::new(client, cart)
}

fn details() -> DeliveryDetails {
    DeliveryDetails {
        address: "Rudaki 12, Dushanbe".to_string(),
        phone: "+992900000000".to_string(),
    }
}

#[tokio::test]
async fn test_quote_with_level_and_promo() {
    let api = MockApi::start().await;
    let checkout = checkout_with_hoodies(&api, 2).await;
    let user = checkout_user(&api).await;

    let promo = checkout.apply_promo("  save10 ").await.unwrap().unwrap();
    assert_eq!(promo.code, "SAVE10");
    assert_eq!(promo.percent, Percent::whole(10));

    let summary = checkout.summary(&user).await;
    assert!(!summary.is_top10);
    assert_eq!(summary.quote.subtotal, Decimal::from(1000));
    assert_eq!(summary.quote.level_discount_amount, Decimal::from(50));
    assert_eq!(summary.quote.after_level, Decimal::from(950));
    assert_eq!(summary.quote.promo_discount_amount, Decimal::from(95));
    assert_eq!(summary.quote.final_total, Decimal::from(855));
    assert_eq!(summary.xp_to_gain, 100);
}

#[tokio::test]
async fn test_top10_doubles_both_discounts() {
    let api = MockApi::start().await;
    api.state().leaderboard.insert(
        0,
        json!({ "user_id": "user_ali", "name": "Ali", "level": 5, "xp": 10000 }),
    );
    let checkout = checkout_with_hoodies(&api, 2).await;
    let user = checkout_user(&api).await;

    checkout.apply_promo("SAVE10").await.unwrap();
    let summary = checkout.summary(&user).await;

    assert!(summary.is_top10);
    assert_eq!(summary.quote.level_discount_percent, Percent::whole(10));
    assert_eq!(summary.quote.promo_discount_percent, Percent::whole(20));
    assert_eq!(summary.quote.final_total, Decimal::from(720));
}

#[tokio::test]
async fn test_admin_on_leaderboard_is_not_top10() {
    let api = MockApi::start().await;
    api.state().leaderboard.insert(
        0,
        json!({ "user_id": "user_boss", "name": "Boss", "level": 3, "xp": 50000 }),
    );
    let (client, storage) = api.client();
    let boss = client.login("boss@example.com", PASSWORD).await.unwrap();
    let cart = Arc::new(CartStore::load(storage));
    let hoodie = client.product(&ProductId::new("prod_hoodie")).await.unwrap();
    cart.add_item(&hoodie, 2, LineOptions::default()).unwrap();
    let checkout = Checkout::new(client, cart);
    checkout.apply_promo("SAVE10").await.unwrap();

    let summary = checkout.summary(&boss).await;

    assert!(!summary.is_top10);
    assert_eq!(summary.quote.level_discount_percent, Percent::whole(3));
    assert_eq!(summary.quote.promo_discount_percent, Percent::whole(10));
    // 1000 - 3% = 970, then - 10% = 873.
    assert_eq!(summary.quote.final_total, Decimal::from(873));
}

#[tokio::test]
async fn test_leaderboard_failure_means_not_top10() {
    let api = MockApi::start().await;
    api.state().fail_leaderboard = true;
    let checkout = checkout_with_hoodies(&api, 1).await;
    let user = checkout_user(&api).await;

    assert!(!checkout.is_top10(&user).await);
}

#[tokio::test]
async fn test_rejected_promo_clears_previous_one() {
    let api = MockApi::start().await;
    let checkout = checkout_with_hoodies(&api, 1).await;

    checkout.apply_promo("SAVE10").await.unwrap();
    assert!(checkout.applied_promo().is_some());

    let err = checkout.apply_promo("BOGUS").await.unwrap_err();
    assert_eq!(err.user_message("Invalid code"), "Promo code not found");
    assert_eq!(checkout.applied_promo(), None);

    // Blank input leaves state alone.
    assert_eq!(checkout.apply_promo("   ").await.unwrap(), None);
}

#[tokio::test]
async fn test_submit_places_order_and_clears_cart() {
    let api = MockApi::start().await;
    let checkout = checkout_with_hoodies(&api, 2).await;
    let user = checkout_user(&api).await;
    checkout.apply_promo("SAVE10").await.unwrap();

    let outcome = checkout.submit(Some(&user), &details()).await.unwrap();

    assert_eq!(outcome.placed.order.order_id.as_str(), "ord_1");
    assert_eq!(outcome.placed.xp_gained, 100);
    assert!(checkout.cart().is_empty());
    assert_eq!(checkout.applied_promo(), None);

    let refreshed = outcome.user.unwrap();
    assert_eq!(refreshed.balance, Decimal::from(1000));

    let sent = api.state().placed_orders[0].clone();
    assert_eq!(
        sent,
        json!({
            "items": [{ "product_id": "prod_hoodie", "quantity": 2, "size": "M", "color": null }],
            "delivery_address": "Rudaki 12, Dushanbe",
            "phone_number": "+992900000000",
            "promo_code": "SAVE10",
        })
    );
}

#[tokio::test]
async fn test_insufficient_balance_keeps_cart() {
    let api = MockApi::start().await;
    // 5 hoodies at level 5: 2500 - 5% = 2375 > 2000.
    let checkout = checkout_with_hoodies(&api, 5).await;
    let user = checkout_user(&api).await;

    let err = checkout.submit(Some(&user), &details()).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::InsufficientBalance { .. })
    ));
    assert_eq!(checkout.cart().item_count(), 5);
    assert!(api.state().placed_orders.is_empty());
}

#[tokio::test]
async fn test_submit_without_user_is_rejected() {
    let api = MockApi::start().await;
    let checkout = checkout_with_hoodies(&api, 1).await;

    let err = checkout.submit(None, &details()).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!checkout.cart().is_empty());
}

async fn checkout_user(api: &MockApi) -> tsmarket_client::models::User {
    let (client, _) = api.client();
    client.login("ali@example.com", PASSWORD).await.unwrap();
    client.me().await.unwrap()
}
