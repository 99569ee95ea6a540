//! Sign-in, bearer session and logout against the mock API.

#![allow(clippy::unwrap_used)]

use tsmarket_client::{ClientError, KeyValueStore, SESSION_TOKEN_KEY};
use tsmarket_integration_tests::{MockApi, PASSWORD};

#[tokio::test]
async fn test_login_stores_token_and_authenticates_requests() {
    let api = MockApi::start().await;
    let (client, storage) = api.client();

    assert!(!client.session().is_authenticated());
    let user = client.login("ali@example.com", PASSWORD).await.unwrap();
    assert_eq!(user.name, "Ali");
    assert!(client.session().is_authenticated());

    let token = storage.get(SESSION_TOKEN_KEY).unwrap().unwrap();
    assert!(token.starts_with("tok_"));

    let me = client.me().await.unwrap();
    assert_eq!(me.user_id, user.user_id);
}

#[tokio::test]
async fn test_every_request_carries_a_fresh_request_id() {
    let api = MockApi::start().await;
    let (client, _) = api.client();
    client.login("ali@example.com", PASSWORD).await.unwrap();

    client.me().await.unwrap();
    client.me().await.unwrap();

    let ids = api.state().request_ids.clone();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_rejected_login_surfaces_server_detail() {
    let api = MockApi::start().await;
    let (client, _) = api.client();

    let err = client.login("ali@example.com", "wrong-pass").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_invalid_email_is_not_sent() {
    let api = MockApi::start().await;
    let (client, _) = api.client();

    let err = client.login("not-an-email", PASSWORD).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(api.state().sessions.is_empty());
}

#[tokio::test]
async fn test_logout_clears_token_even_when_server_fails() {
    let api = MockApi::start().await;
    let (client, storage) = api.client();
    client.login("ali@example.com", PASSWORD).await.unwrap();
    api.state().fail_logout = true;

    client.logout().await.unwrap();

    assert_eq!(api.state().logout_calls, 1);
    assert_eq!(storage.get(SESSION_TOKEN_KEY).unwrap(), None);
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_refresh_user_drops_rejected_token() {
    let api = MockApi::start().await;
    let (client, storage) = api.client();
    client.login("ali@example.com", PASSWORD).await.unwrap();

    // Server forgets the session.
    api.state().sessions.clear();

    assert_eq!(client.refresh_user().await.unwrap(), None);
    assert_eq!(storage.get(SESSION_TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_clones_share_the_session() {
    let api = MockApi::start().await;
    let (client, _) = api.client();
    let other = client.clone();

    client.login("ali@example.com", PASSWORD).await.unwrap();
    assert!(other.session().is_authenticated());
    assert_eq!(other.me().await.unwrap().name, "Ali");
}
