//! REST client for the storefront API.
//!
//! One async method per endpoint, grouped by area in the submodules. Every
//! request carries the stored bearer token (if any) and a fresh
//! `X-Request-Id`. Catalog reads are cached with `moka` for the configured
//! TTL; admin catalog mutations invalidate the cache.

mod admin;
mod auth;
mod cache;
mod catalog;
mod delivery;
mod loyalty;
mod orders;
mod support;
mod wallet;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;
use uuid::Uuid;

use crate::config::{ClientConfig, ConfigError};
use crate::error::{ClientError, parse_detail};
use crate::session::SessionStore;
use crate::storage::KeyValueStore;

use cache::{CacheKey, CacheValue};

pub use auth::{NAME_MIN_LEN, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN};
pub use catalog::{CatalogSnapshot, ProductQuery};
pub use wallet::{CARD_NUMBER_MIN_LEN, validate_topup, validate_withdrawal};

/// Products fetched for the catalog landing snapshot.
pub const CATALOG_SNAPSHOT_LIMIT: u32 = 20;

const MAX_LOGGED_BODY_CHARS: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the HTTP connection pool, the session and
/// the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    /// `<base>/api/`
    api_base: Url,
    session: SessionStore,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot hold the API path.
    pub fn new(config: &ClientConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("tsmarket-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_base = config.api_url.join("api/").map_err(|e| {
            ConfigError::InvalidEnvVar("TSMARKET_API_URL".to_string(), e.to_string())
        })?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                api_base,
                session: SessionStore::new(storage),
                cache,
            }),
        })
    }

    /// The session token store used for bearer auth.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Root of all API routes (`<base>/api/`).
    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.inner.api_base
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.api_base.clone();
        // The base was validated as an absolute http(s) URL, which always has
        // path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let mut builder = self
            .inner
            .http
            .request(method, self.url(segments))
            .header("X-Request-Id", Uuid::new_v4().to_string());

        if let Some(token) = self.inner.session.token()? {
            builder = builder.bearer_auth(token.expose_secret());
        }

        Ok(builder)
    }

    /// Send a request and decode a JSON response.
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.inner.http.execute(request).await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let body = truncate(&response_text);
            if status.is_server_error() {
                error!(%method, %path, status = %status, body = %body, "Storefront API returned non-success status");
            } else {
                warn!(%method, %path, status = %status, body = %body, "Storefront API rejected request");
            }
            return Err(error_for_status(status, &response_text));
        }

        debug!(%method, %path, status = %status, "Storefront API request succeeded");

        serde_json::from_str(&response_text).map_err(|e| {
            error!(
                %method,
                %path,
                error = %e,
                body = %truncate(&response_text),
                "Failed to parse Storefront API response"
            );
            ClientError::Parse(e)
        })
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        self.execute(self.request(Method::GET, segments)?).await
    }

    async fn get_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.request(Method::GET, segments)?.query(query))
            .await
    }

    async fn post_json<T, B>(&self, segments: &[&str], body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::POST, segments)?.json(body))
            .await
    }

    async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        self.execute(self.request(Method::POST, segments)?).await
    }

    async fn post_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.request(Method::POST, segments)?.query(query))
            .await
    }

    async fn put_json<T, B>(&self, segments: &[&str], body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::PUT, segments)?.json(body))
            .await
    }

    async fn put_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        self.execute(self.request(Method::PUT, segments)?).await
    }

    async fn put_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.request(Method::PUT, segments)?.query(query))
            .await
    }

    async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        self.execute(self.request(Method::DELETE, segments)?).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_base", &self.inner.api_base.as_str())
            .field("session", &self.inner.session)
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

fn error_for_status(status: StatusCode, body: &str) -> ClientError {
    let detail = parse_detail(body);
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized { detail },
        StatusCode::NOT_FOUND => ClientError::NotFound { detail },
        _ => ClientError::Api {
            status: status.as_u16(),
            detail,
        },
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_LOGGED_BODY_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::storage::MemoryStore;

    fn client(base: &str) -> ApiClient {
        let config = ClientConfig::from_lookup(|_| None)
            .unwrap()
            .with_api_url(base)
            .unwrap();
        ApiClient::new(&config, Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_url_building() {
        let api = client("http://localhost:8001");
        assert_eq!(api.api_base().as_str(), "http://localhost:8001/api/");
        assert_eq!(
            api.url(&["products", "prod_1"]).as_str(),
            "http://localhost:8001/api/products/prod_1"
        );

        let api = client("https://shop.example.tj/backend/");
        assert_eq!(
            api.url(&["orders", "ord 1", "track"]).as_str(),
            "https://shop.example.tj/backend/api/orders/ord%201/track"
        );
    }

    #[test]
    fn test_request_attaches_bearer_and_request_id() {
        let api = client("http://localhost:8001");
        let request = api.request(Method::GET, &["auth", "me"]).unwrap().build().unwrap();
        assert!(request.headers().get("authorization").is_none());
        assert!(request.headers().get("x-request-id").is_some());

        api.session()
            .set_token(&SecretString::from("tok_abc".to_string()))
            .unwrap();
        let request = api.request(Method::GET, &["auth", "me"]).unwrap().build().unwrap();
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer tok_abc"
        );
    }

    #[test]
    fn test_error_for_status() {
        let err = error_for_status(StatusCode::UNAUTHORIZED, r#"{"detail": "Not authenticated"}"#);
        assert!(matches!(err, ClientError::Unauthorized { detail: Some(ref d) } if d == "Not authenticated"));

        let err = error_for_status(StatusCode::NOT_FOUND, "");
        assert!(matches!(err, ClientError::NotFound { detail: None }));

        let err = error_for_status(StatusCode::BAD_REQUEST, r#"{"detail": "Insufficient balance"}"#);
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.user_message("x"), "Insufficient balance");
    }
}
