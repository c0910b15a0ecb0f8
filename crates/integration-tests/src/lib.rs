//! Integration tests for the QKart storefront client.
//!
//! [`MockBackend`] is an in-process axum server that speaks the QKart REST
//! API, bound to an ephemeral port. Tests drive it through the real
//! `ApiClient` and views, and inspect per-route hit counters.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qkart-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MockBackend::start().await?;
//! let token = backend.seed_user("crio.do", "learn-by-doing");
//! let client = ApiClient::new(&backend.config())?;
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use qkart_storefront::config::{ConfigError, StorefrontConfig};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// IDs of the seeded catalog.
pub mod fixtures {
    pub const LAMP: &str = "BW0jAAeDJmlZCF8i";
    pub const DUFFLE: &str = "KCRwjF7lN97HnEaY";
    pub const WATCH: &str = "a4sLtEcMpzabRyfx";
    pub const FAN: &str = "upLK9JbQ4rMhTwt4";
}

/// Route labels for [`MockBackend::hits`].
pub mod routes {
    pub const PRODUCTS: &str = "GET /products";
    pub const SEARCH: &str = "GET /products/search";
    pub const CART: &str = "GET /cart";
    pub const UPDATE_CART: &str = "POST /cart";
    pub const LOGIN: &str = "POST /auth/login";
    pub const REGISTER: &str = "POST /auth/register";
}

struct User {
    password: String,
    token: String,
}

#[derive(Default)]
struct Inner {
    products: Vec<Value>,
    users: HashMap<String, User>,
    carts: HashMap<String, Vec<(String, u32)>>,
    hits: HashMap<&'static str, usize>,
    fail_catalog: bool,
}

#[derive(Clone, Default)]
struct MockState {
    inner: Arc<Mutex<Inner>>,
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hit(&self, route: &'static str) -> MutexGuard<'_, Inner> {
        let mut inner = self.lock();
        *inner.hits.entry(route).or_default() += 1;
        inner
    }
}

/// Running mock backend. The server stops when this is dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: MockState,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend seeded with the [`fixtures`] catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = MockState::default();
        state.lock().products = catalog();

        let app = Router::new()
            .route("/api/v1/products", get(list_products))
            .route("/api/v1/products/search", get(search_products))
            .route("/api/v1/cart", get(fetch_cart).post(update_cart))
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/register", post(register))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Mock backend stopped: {e}");
            }
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL of the API.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// Client configuration pointing at this backend, with a short search
    /// debounce.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is rejected.
    pub fn config(&self) -> Result<StorefrontConfig, ConfigError> {
        self.config_with(&[])
    }

    /// Like [`config`](Self::config), with extra variables applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is rejected.
    pub fn config_with(&self, vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let mut env: HashMap<String, String> = HashMap::from([
            ("QKART_API_ENDPOINT".to_string(), self.endpoint()),
            ("QKART_SEARCH_DEBOUNCE_MS".to_string(), "50".to_string()),
        ]);
        for (key, value) in vars {
            env.insert((*key).to_string(), (*value).to_string());
        }
        StorefrontConfig::from_lookup(|key| env.get(key).cloned())
    }

    /// Create an account and return its bearer token.
    pub fn seed_user(&self, username: &str, password: &str) -> String {
        let token = format!("token-{username}");
        self.state.lock().users.insert(
            username.to_string(),
            User {
                password: password.to_string(),
                token: token.clone(),
            },
        );
        token
    }

    /// Replace the cart behind `token`. IDs are not checked against the
    /// catalog.
    pub fn seed_cart(&self, token: &str, entries: &[(&str, u32)]) {
        self.state.lock().carts.insert(
            token.to_string(),
            entries
                .iter()
                .map(|(id, qty)| ((*id).to_string(), *qty))
                .collect(),
        );
    }

    /// Make `GET /products` answer 500.
    pub fn fail_catalog(&self, fail: bool) {
        self.state.lock().fail_catalog = fail;
    }

    /// Number of requests served on `route` (see [`routes`]).
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        self.state.lock().hits.get(route).copied().unwrap_or(0)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn product(id: &str, name: &str, category: &str, cost: u32, rating: u8) -> Value {
    json!({
        "_id": id,
        "name": name,
        "category": category,
        "cost": cost,
        "rating": rating,
        "image": format!("https://crio-directus-assets.s3.ap-south-1.amazonaws.com/{id}.png"),
    })
}

fn catalog() -> Vec<Value> {
    vec![
        product(fixtures::LAMP, "Bonsai Spirit Tree Table Lamp", "Home & Kitchen", 100, 5),
        product(fixtures::DUFFLE, "Tan Leatherette Weekender Duffle", "Fashion", 150, 4),
        product(fixtures::WATCH, "The Minimalist Slim Leather Watch", "Electronics", 60, 5),
        product(fixtures::FAN, "Atomberg 1200mm BLDC Ceiling Fan", "Home & Kitchen", 3000, 4),
    ]
}

// =============================================================================
// Handlers
// =============================================================================

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn unauthorized() -> Response {
    failure(
        StatusCode::UNAUTHORIZED,
        "Protected route, Oauth2 Bearer token not found",
    )
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn is_known_token(inner: &Inner, token: &str) -> bool {
    inner.users.values().any(|u| u.token == token)
}

fn cart_json(entries: &[(String, u32)]) -> Json<Value> {
    Json(Value::Array(
        entries
            .iter()
            .map(|(id, qty)| json!({ "productId": id, "qty": qty }))
            .collect(),
    ))
}

async fn list_products(State(state): State<MockState>) -> Response {
    let inner = state.hit(routes::PRODUCTS);
    if inner.fail_catalog {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong");
    }
    Json(inner.products.clone()).into_response()
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    value: String,
}

async fn search_products(
    State(state): State<MockState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let inner = state.hit(routes::SEARCH);
    let needle = query.value.to_lowercase();

    let found: Vec<Value> = inner
        .products
        .iter()
        .filter(|p| {
            ["name", "category"].iter().any(|field| {
                p[*field]
                    .as_str()
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            })
        })
        .cloned()
        .collect();

    if found.is_empty() {
        return failure(StatusCode::NOT_FOUND, "No products found");
    }
    Json(found).into_response()
}

async fn fetch_cart(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let inner = state.hit(routes::CART);
    let Some(token) = bearer(&headers).filter(|t| is_known_token(&inner, t)) else {
        return unauthorized();
    };

    let entries = inner.carts.get(token).cloned().unwrap_or_default();
    cart_json(&entries).into_response()
}

#[derive(Deserialize)]
struct CartUpdate {
    #[serde(rename = "productId")]
    product_id: String,
    qty: u32,
}

async fn update_cart(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<CartUpdate>,
) -> Response {
    let mut inner = state.hit(routes::UPDATE_CART);
    let Some(token) = bearer(&headers)
        .filter(|t| is_known_token(&inner, t))
        .map(str::to_string)
    else {
        return unauthorized();
    };

    if !inner
        .products
        .iter()
        .any(|p| p["_id"].as_str() == Some(body.product_id.as_str()))
    {
        return failure(StatusCode::NOT_FOUND, "Product doesn't exist");
    }

    let cart = inner.carts.entry(token).or_default();
    match cart.iter().position(|(id, _)| *id == body.product_id) {
        Some(i) if body.qty == 0 => {
            cart.remove(i);
        }
        Some(i) => {
            if let Some(entry) = cart.get_mut(i) {
                entry.1 = body.qty;
            }
        }
        None if body.qty == 0 => {}
        None => cart.push((body.product_id, body.qty)),
    }

    cart_json(cart).into_response()
}

#[derive(Deserialize)]
struct AuthRequest {
    username: String,
    password: String,
}

async fn login(State(state): State<MockState>, Json(body): Json<AuthRequest>) -> Response {
    let inner = state.hit(routes::LOGIN);
    match inner.users.get(&body.username) {
        Some(user) if user.password == body.password => Json(json!({
            "success": true,
            "token": user.token,
            "username": body.username,
            "balance": 5000,
        }))
        .into_response(),
        Some(_) => failure(StatusCode::BAD_REQUEST, "Password is incorrect"),
        None => failure(StatusCode::BAD_REQUEST, "Username does not exist"),
    }
}

async fn register(State(state): State<MockState>, Json(body): Json<AuthRequest>) -> Response {
    let mut inner = state.hit(routes::REGISTER);
    if inner.users.contains_key(&body.username) {
        return failure(StatusCode::BAD_REQUEST, "Username is already taken");
    }

    let token = format!("token-{}", body.username);
    inner.users.insert(
        body.username,
        User {
            password: body.password,
            token,
        },
    );
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}
