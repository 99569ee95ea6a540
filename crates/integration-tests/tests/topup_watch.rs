//! Top-up submission and the approval watcher against a scripted server.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tsmarket_client::models::Receipt;
use tsmarket_client::{ClientError, TopupWatch, ValidationError, WatchConfig, WatchOutcome};
use tsmarket_integration_tests::{MockApi, PASSWORD, topup_request};

fn fast() -> WatchConfig {
    WatchConfig {
        poll_interval: Duration::from_millis(20),
        max_duration: Duration::from_secs(5),
        ..WatchConfig::default()
    }
}

fn script(api: &MockApi, answers: Vec<Vec<serde_json::Value>>) {
    api.state().topup_script = VecDeque::from(answers);
}

#[tokio::test]
async fn test_watch_reports_approval() {
    let api = MockApi::start().await;
    let now = Utc::now().to_rfc3339();
    script(
        &api,
        vec![
            vec![topup_request("tr_1", "pending", &now)],
            vec![topup_request("tr_1", "pending", &now)],
            vec![topup_request("tr_1", "approved", &now)],
        ],
    );
    let (client, _) = api.client();
    client.login("ali@example.com", PASSWORD).await.unwrap();

    let outcome = TopupWatch::spawn(client, fast()).wait().await;

    let WatchOutcome::Approved(request) = outcome else {
        panic!("expected approval, got {outcome:?}");
    };
    assert_eq!(request.request_id.as_str(), "tr_1");
    assert_eq!(request.amount, Decimal::from(200));
    assert_eq!(api.state().topup_polls, 3);
}

#[tokio::test]
async fn test_zero_poll_interval_still_polls() {
    let api = MockApi::start().await;
    let now = Utc::now().to_rfc3339();
    script(&api, vec![vec![topup_request("tr_5", "approved", &now)]]);
    let (client, _) = api.client();

    let config = WatchConfig {
        poll_interval: Duration::ZERO,
        ..fast()
    };
    let outcome = TopupWatch::spawn(client, config).wait().await;

    assert!(matches!(outcome, WatchOutcome::Approved(r) if r.request_id.as_str() == "tr_5"));
}

#[tokio::test]
async fn test_stale_approval_is_not_the_watched_one() {
    let api = MockApi::start().await;
    let long_ago = (Utc::now() - chrono::Duration::hours(2)).to_rfc3339();
    script(&api, vec![vec![topup_request("tr_old", "approved", &long_ago)]]);
    let (client, _) = api.client();

    let outcome = TopupWatch::spawn(client, fast()).wait().await;

    assert_eq!(outcome, WatchOutcome::NoPending);
}

#[tokio::test]
async fn test_watch_survives_failed_polls() {
    let api = MockApi::start().await;
    let (client, _) = api.client();
    // An empty script answers 503.
    let watch = TopupWatch::spawn(client, fast());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!watch.is_finished());

    script(&api, vec![vec![topup_request("tr_2", "rejected", "")]]);
    assert_eq!(watch.wait().await, WatchOutcome::NoPending);
    assert!(api.state().topup_polls >= 2);
}

#[tokio::test]
async fn test_watch_times_out() {
    let api = MockApi::start().await;
    script(&api, vec![vec![topup_request("tr_3", "pending", "")]]);
    let (client, _) = api.client();

    let config = WatchConfig {
        max_duration: Duration::from_millis(150),
        ..fast()
    };
    let outcome = TopupWatch::spawn(client, config).wait().await;

    assert_eq!(outcome, WatchOutcome::TimedOut);
    assert!(api.state().topup_polls >= 1);
}

#[tokio::test]
async fn test_cancel_stops_polling() {
    let api = MockApi::start().await;
    script(&api, vec![vec![topup_request("tr_4", "pending", "")]]);
    let (client, _) = api.client();

    let mut watch = TopupWatch::spawn(
        client,
        WatchConfig {
            max_duration: Duration::from_secs(60),
            ..fast()
        },
    );
    tokio::time::sleep(Duration::from_millis(60)).await;
    watch.cancel();

    assert_eq!(watch.wait().await, WatchOutcome::Cancelled);
    let polls = api.state().topup_polls;
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(api.state().topup_polls, polls);
}

#[tokio::test]
async fn test_image_receipt_is_sent_as_data_url() {
    let api = MockApi::start().await;
    let (client, _) = api.client();
    client.login("ali@example.com", PASSWORD).await.unwrap();

    let receipt = Receipt::Image {
        mime: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    };
    let request = client
        .request_topup(Decimal::from(150), &receipt)
        .await
        .unwrap();

    assert_eq!(request.request_id.as_str(), "tr_1");
    let sent = api.state().topup_submissions[0].clone();
    assert_eq!(sent["amount"], 150.0);
    assert_eq!(sent["receipt_url"], "data:image/png;base64,iVBORw==");
}

#[tokio::test]
async fn test_topup_validation_sends_nothing() {
    let api = MockApi::start().await;
    let (client, _) = api.client();
    client.login("ali@example.com", PASSWORD).await.unwrap();

    let err = client
        .request_topup(Decimal::ZERO, &Receipt::Url("https://example.com/r.jpg".into()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::InvalidAmount)
    ));

    let err = client
        .request_topup(Decimal::from(100), &Receipt::Url("  ".into()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::MissingReceipt)
    ));
    assert!(api.state().topup_submissions.is_empty());
}
