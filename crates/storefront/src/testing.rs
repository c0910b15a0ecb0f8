//! In-memory [`Backend`] that records every call, for view tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use qkart_core::{CartEntry, Credentials, Product, ProductId};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use crate::api::{ApiError, AuthResponse, Backend};

pub const TOKEN: &str = "token-123";

/// Backend operation, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListProducts,
    Search,
    FetchCart,
    UpdateCart,
    Login,
    Register,
}

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListProducts,
    Search(String),
    FetchCart,
    UpdateCart(ProductId, u32),
    Login(String),
    Register(String),
}

/// Failure to return from an operation.
#[derive(Debug, Clone)]
pub enum Failure {
    Transport,
    Status(u16, Option<&'static str>),
}

impl Failure {
    fn to_error(&self) -> ApiError {
        match self {
            Self::Transport => ApiError::Transport("connection refused".to_string()),
            Self::Status(status, message) => status_error(*status, *message),
        }
    }
}

fn status_error(status: u16, message: Option<&str>) -> ApiError {
    let status_text = match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    };
    ApiError::Status {
        status,
        status_text: status_text.to_string(),
        message: message.map(str::to_string),
    }
}

#[derive(Default)]
struct FakeState {
    products: Vec<Product>,
    cart: Vec<CartEntry>,
    users: HashMap<String, String>,
    failures: HashMap<Op, Failure>,
    calls: Vec<Call>,
    empty_search_ok: bool,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new(products: Vec<Product>) -> Self {
        let backend = Self::default();
        backend.state().products = products;
        backend
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_cart(self, cart: Vec<CartEntry>) -> Self {
        self.state().cart = cart;
        self
    }

    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.state()
            .users
            .insert(username.to_string(), password.to_string());
        self
    }

    /// Answer searches without a match with 200 and `[]` instead of 404.
    pub fn with_empty_search_results(self) -> Self {
        self.state().empty_search_ok = true;
        self
    }

    pub fn fail(&self, op: Op, failure: Failure) {
        self.state().failures.insert(op, failure);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn cart(&self) -> Vec<CartEntry> {
        self.state().cart.clone()
    }

    fn record(&self, op: Op, call: Call) -> Result<(), ApiError> {
        let mut state = self.state();
        state.calls.push(call);
        state.failures.get(&op).map_or(Ok(()), |f| Err(f.to_error()))
    }

    fn authorize(token: &SecretString) -> Result<(), ApiError> {
        if token.expose_secret() == TOKEN {
            Ok(())
        } else {
            Err(status_error(
                401,
                Some("Protected route, Oauth2 Bearer token not found"),
            ))
        }
    }
}

impl Backend for FakeBackend {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.record(Op::ListProducts, Call::ListProducts)?;
        Ok(self.state().products.clone())
    }

    async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        self.record(Op::Search, Call::Search(text.to_string()))?;
        let needle = text.to_lowercase();
        let state = self.state();
        let found: Vec<Product> = state
            .products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        if found.is_empty() && !state.empty_search_ok {
            return Err(status_error(404, Some("No products found")));
        }
        Ok(found)
    }

    async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
        self.record(Op::FetchCart, Call::FetchCart)?;
        Self::authorize(token)?;
        Ok(self.state().cart.clone())
    }

    async fn update_cart(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        qty: u32,
    ) -> Result<Vec<CartEntry>, ApiError> {
        self.record(Op::UpdateCart, Call::UpdateCart(product_id.clone(), qty))?;
        Self::authorize(token)?;

        let mut state = self.state();
        if !state.products.iter().any(|p| &p.id == product_id) {
            return Err(status_error(404, Some("Product doesn't exist")));
        }

        let position = state.cart.iter().position(|e| &e.product_id == product_id);
        match (position, qty) {
            (Some(i), 0) => {
                state.cart.remove(i);
            }
            (Some(i), qty) => state.cart[i].quantity = qty,
            (None, 0) => {}
            (None, qty) => state.cart.push(CartEntry::new(product_id.clone(), qty)),
        }
        Ok(state.cart.clone())
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let username = credentials.username().to_string();
        self.record(Op::Login, Call::Login(username.clone()))?;

        let body = serde_json::to_value(credentials).map_err(ApiError::Parse)?;
        let password = body["password"].as_str().unwrap_or_default();

        match self.state().users.get(&username) {
            Some(expected) if expected == password => Ok(AuthResponse {
                success: true,
                token: TOKEN.to_string(),
                username,
                balance: Some(Decimal::from(5000)),
            }),
            Some(_) => Err(status_error(400, Some("Password is incorrect"))),
            None => Err(status_error(400, Some("Username does not exist"))),
        }
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let username = credentials.username().to_string();
        self.record(Op::Register, Call::Register(username.clone()))?;

        let body = serde_json::to_value(credentials).map_err(ApiError::Parse)?;
        let password = body["password"].as_str().unwrap_or_default().to_string();

        let mut state = self.state();
        if state.users.contains_key(&username) {
            return Err(status_error(400, Some("Username is already taken")));
        }
        state.users.insert(username, password);
        Ok(())
    }
}

/// Catalog product with placeholder presentation fields.
pub fn product(id: &str, name: &str, category: &str, cost: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        cost: cost.into(),
        rating: 4,
        image_url: format!("https://img.example.com/{id}.png"),
    }
}

/// A small catalog used across view tests.
pub fn catalog() -> Vec<Product> {
    vec![
        product("A", "Tan Leatherette Weekender Duffle", "Fashion", 150),
        product("B", "The Minimalist Slim Leather Watch", "Electronics", 60),
        product("C", "Atomberg 1200mm BLDC motor fan", "Home & Kitchen", 3000),
    ]
}
