//! Integration test support for the TSMarket client.
//!
//! [`MockApi`] serves a small in-memory imitation of the storefront REST API
//! on an ephemeral local port. Tests drive the real [`ApiClient`] against it
//! over HTTP and inspect what the server received through
//! [`MockApi::state`].
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tsmarket-integration-tests
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tsmarket_client::{ApiClient, ClientConfig, KeyValueStore, MemoryStore};

/// Password accepted by the mock login.
pub const PASSWORD: &str = "secret123";

type Shared = Arc<Mutex<MockState>>;
type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Everything the mock server knows and has seen.
#[derive(Debug, Default)]
pub struct MockState {
    /// Accounts by email.
    pub users: HashMap<String, Value>,
    /// Bearer token to email.
    pub sessions: HashMap<String, String>,
    pub products: Vec<Value>,
    pub categories: Vec<Value>,
    pub leaderboard: Vec<Value>,
    /// Promo code to discount percent.
    pub promos: HashMap<String, f64>,
    /// Successive answers to `GET /topup/requests`; the last one repeats.
    pub topup_script: VecDeque<Vec<Value>>,
    pub topup_polls: usize,
    pub placed_orders: Vec<Value>,
    pub topup_submissions: Vec<Value>,
    /// Product listing and single product fetches.
    pub product_hits: usize,
    pub category_hits: usize,
    pub logout_calls: usize,
    /// Make `POST /auth/logout` answer 500.
    pub fail_logout: bool,
    /// Make `GET /gamification/leaderboard` answer 500.
    pub fail_leaderboard: bool,
    /// `(method path, query or body)` of admin calls.
    pub admin_calls: Vec<(String, Value)>,
    pub request_ids: Vec<String>,
}

impl MockState {
    /// A shop with two products, one category, one promo code and one user.
    #[must_use]
    pub fn seeded() -> Self {
        let mut state = Self::default();
        state.add_user("ali@example.com", "user_ali", "Ali", 5, 2000.0, "user");
        state.add_user("boss@example.com", "user_boss", "Boss", 3, 0.0, "admin");
        state.products = vec![
            product("prod_hoodie", "Hoodie", 500.0, 0.0, 50),
            product("prod_cap", "Cap", 100.0, 10.0, 10),
        ];
        state.categories = vec![json!({
            "category_id": "cat_apparel",
            "name": "Apparel",
            "slug": "apparel",
            "subcategories": [],
        })];
        state.promos.insert("SAVE10".to_string(), 10.0);
        state.leaderboard = vec![json!({
            "user_id": "user_other", "name": "Someone", "level": 9, "xp": 9000
        })];
        state
    }

    pub fn add_user(&mut self, email: &str, id: &str, name: &str, level: u32, balance: f64, role: &str) {
        self.users.insert(
            email.to_string(),
            json!({
                "user_id": id,
                "email": email,
                "name": name,
                "level": level,
                "xp": 0,
                "balance": balance,
                "role": role,
                "is_admin": role == "admin",
                "claimed_rewards": [],
            }),
        );
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<&Value> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let email = self.sessions.get(token)?;
        self.users.get(email)
    }
}

/// A product as the API lists it.
#[must_use]
pub fn product(id: &str, name: &str, price: f64, discount: f64, xp: u32) -> Value {
    json!({
        "product_id": id,
        "name": name,
        "price": price,
        "discount_percent": discount,
        "xp_reward": xp,
        "sizes": ["S", "M", "L"],
        "colors": ["black"],
        "stock": 10,
    })
}

/// A top-up request as the API lists it.
#[must_use]
pub fn topup_request(id: &str, status: &str, created_at: &str) -> Value {
    json!({
        "request_id": id,
        "amount": 200.0,
        "receipt_url": "https://example.com/r.jpg",
        "status": status,
        "created_at": created_at,
    })
}

/// Mock storefront API bound to `127.0.0.1` on a free port.
pub struct MockApi {
    pub base_url: String,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Start a server over [`MockState::seeded`].
    pub async fn start() -> Self {
        Self::with_state(MockState::seeded()).await
    }

    pub async fn with_state(state: MockState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API listener");
        let addr = listener.local_addr().expect("Mock API has no local address");

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            server,
        }
    }

    /// Lock the server state for inspection or scripting.
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Client config pointing at this server. `overrides` supplies other
    /// environment values.
    pub fn config(&self, overrides: &[(&str, &str)]) -> ClientConfig {
        let base = self.base_url.clone();
        let overrides: HashMap<String, String> = overrides
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(move |key| {
            if key == "TSMARKET_API_URL" {
                return Some(base.clone());
            }
            overrides.get(key).cloned()
        })
        .expect("Invalid mock client config")
    }

    /// A fresh client with its own in-memory storage.
    pub fn client(&self) -> (ApiClient, Arc<dyn KeyValueStore>) {
        self.client_with(&[])
    }

    pub fn client_with(&self, overrides: &[(&str, &str)]) -> (ApiClient, Arc<dyn KeyValueStore>) {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let client = ApiClient::new(&self.config(overrides), Arc::clone(&storage))
            .expect("Failed to build client");
        (client, storage)
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/{id}", get(get_product))
        .route("/api/categories", get(list_categories))
        .route("/api/promo/validate", post(validate_promo))
        .route("/api/gamification/leaderboard", get(leaderboard))
        .route("/api/orders", post(place_order))
        .route("/api/topup/request", post(request_topup))
        .route("/api/topup/requests", get(topup_requests))
        .route("/api/admin/users/{id}/role", put(set_role))
        .route("/api/admin/orders/{id}/status", put(order_status))
        .route("/api/admin/promo-codes/{id}/toggle", put(toggle_promo))
        .route("/api/admin/upload-image", post(upload_image))
        .with_state(state)
}

fn reject(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record_request_id(state: &mut MockState, headers: &HeaderMap) {
    if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        state.request_ids.push(id.to_string());
    }
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    let mut state = lock(&state);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let Some(user) = state.users.get(&email).cloned() else {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    };
    if body["password"] != PASSWORD {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }
    let token = format!("tok_{}", uuid::Uuid::new_v4().simple());
    state.sessions.insert(token.clone(), email);
    Ok(Json(json!({ "user": user, "token": token })))
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> ApiResult {
    let mut state = lock(&state);
    record_request_id(&mut state, &headers);
    state
        .user_for(&headers)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not authenticated"))
}

async fn logout(State(state): State<Shared>) -> ApiResult {
    let mut state = lock(&state);
    state.logout_calls += 1;
    if state.fail_logout {
        return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "Session store down"));
    }
    Ok(Json(json!({ "message": "Logged out" })))
}

async fn list_products(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let mut state = lock(&state);
    state.product_hits += 1;
    let search = params.get("search").map(|s| s.to_lowercase());
    let products: Vec<Value> = state
        .products
        .iter()
        .filter(|p| {
            search.as_ref().is_none_or(|needle| {
                p["name"]
                    .as_str()
                    .is_some_and(|name| name.to_lowercase().contains(needle))
            })
        })
        .cloned()
        .collect();
    Ok(Json(Value::Array(products)))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> ApiResult {
    let mut state = lock(&state);
    state.product_hits += 1;
    state
        .products
        .iter()
        .find(|p| p["product_id"] == id.as_str())
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Product not found"))
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    let mut state = lock(&state);
    require_admin(&state, &headers)?;
    let id = format!("prod_{}", state.products.len() + 1);
    let mut created = product(
        &id,
        body["name"].as_str().unwrap_or_default(),
        body["price"].as_f64().unwrap_or_default(),
        0.0,
        10,
    );
    created["description"] = body["description"].clone();
    state.products.push(created.clone());
    Ok(Json(created))
}

async fn list_categories(State(state): State<Shared>) -> ApiResult {
    let mut state = lock(&state);
    state.category_hits += 1;
    Ok(Json(Value::Array(state.categories.clone())))
}

async fn validate_promo(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let state = lock(&state);
    let code = params.get("code").cloned().unwrap_or_default();
    state
        .promos
        .get(&code.to_uppercase())
        .map(|percent| {
            Json(json!({
                "valid": true,
                "discount_percent": percent,
                "code": code.to_uppercase(),
            }))
        })
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Promo code not found"))
}

async fn leaderboard(State(state): State<Shared>) -> ApiResult {
    let state = lock(&state);
    if state.fail_leaderboard {
        return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "Leaderboard unavailable"));
    }
    Ok(Json(Value::Array(state.leaderboard.clone())))
}

async fn place_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    let mut state = lock(&state);
    let Some(user) = state.user_for(&headers).cloned() else {
        return Err(reject(StatusCode::UNAUTHORIZED, "Not authenticated"));
    };

    let mut total = 0.0;
    let mut xp = 0;
    for item in body["items"].as_array().into_iter().flatten() {
        let Some(p) = state
            .products
            .iter()
            .find(|p| p["product_id"] == item["product_id"])
        else {
            return Err(reject(StatusCode::NOT_FOUND, "Product not found"));
        };
        let quantity = item["quantity"].as_f64().unwrap_or_default();
        let price = p["price"].as_f64().unwrap_or_default()
            * (1.0 - p["discount_percent"].as_f64().unwrap_or_default() / 100.0);
        total += price * quantity;
        xp += p["xp_reward"].as_u64().unwrap_or_default() * item["quantity"].as_u64().unwrap_or_default();
    }

    let balance = user["balance"].as_f64().unwrap_or_default();
    if total > balance {
        return Err(reject(StatusCode::BAD_REQUEST, "Insufficient balance"));
    }
    if let Some(email) = user["email"].as_str() {
        if let Some(stored) = state.users.get_mut(email) {
            let earned = stored["xp"].as_u64().unwrap_or_default() + xp;
            stored["balance"] = json!(balance - total);
            stored["xp"] = json!(earned);
        }
    }

    let order_id = format!("ord_{}", state.placed_orders.len() + 1);
    state.placed_orders.push(body.clone());
    Ok(Json(json!({
        "order": {
            "order_id": order_id,
            "user_id": user["user_id"],
            "items": [],
            "total": total,
            "total_xp": xp,
            "status": "pending",
            "delivery_address": body["delivery_address"],
            "phone_number": body["phone_number"],
            "promo_code": body["promo_code"],
        },
        "xp_gained": xp,
        "new_level": user["level"],
        "level_up": false,
        "discount_applied": 0.0,
    })))
}

async fn request_topup(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    let mut state = lock(&state);
    if state.user_for(&headers).is_none() {
        return Err(reject(StatusCode::UNAUTHORIZED, "Not authenticated"));
    }
    state.topup_submissions.push(body.clone());
    Ok(Json(json!({
        "request_id": format!("tr_{}", state.topup_submissions.len()),
        "amount": body["amount"],
        "receipt_url": body["receipt_url"],
        "status": "pending",
    })))
}

async fn topup_requests(State(state): State<Shared>) -> ApiResult {
    let mut state = lock(&state);
    state.topup_polls += 1;
    let answer = if state.topup_script.len() > 1 {
        state.topup_script.pop_front()
    } else {
        state.topup_script.front().cloned()
    };
    match answer {
        Some(requests) => Ok(Json(Value::Array(requests))),
        None => Err(reject(StatusCode::SERVICE_UNAVAILABLE, "Try again")),
    }
}

fn require_admin(state: &MockState, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    match state.user_for(headers) {
        Some(user) if user["role"] == "admin" => Ok(()),
        Some(_) => Err(reject(StatusCode::FORBIDDEN, "Admin access required")),
        None => Err(reject(StatusCode::UNAUTHORIZED, "Not authenticated")),
    }
}

async fn set_role(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let mut state = lock(&state);
    require_admin(&state, &headers)?;
    state
        .admin_calls
        .push((format!("PUT users/{id}/role"), json!(params)));
    Ok(Json(json!({ "message": "Role updated" })))
}

async fn order_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult {
    let mut state = lock(&state);
    require_admin(&state, &headers)?;
    state
        .admin_calls
        .push((format!("PUT orders/{id}/status"), body));
    Ok(Json(json!({ "message": "Order status updated" })))
}

async fn toggle_promo(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let mut state = lock(&state);
    require_admin(&state, &headers)?;
    state
        .admin_calls
        .push((format!("PUT promo-codes/{id}/toggle"), Value::Null));
    Ok(Json(json!({ "message": "Promo code toggled", "is_active": false })))
}

async fn upload_image(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    let mut state = lock(&state);
    require_admin(&state, &headers)?;
    let image = body["image"].as_str().unwrap_or_default();
    if !image.starts_with("data:image/") {
        return Err(reject(StatusCode::BAD_REQUEST, "Invalid image data"));
    }
    state
        .admin_calls
        .push(("POST upload-image".to_string(), body.clone()));
    Ok(Json(json!({ "image_url": "https://cdn.example.com/img_1.png" })))
}
