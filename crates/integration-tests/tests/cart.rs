//! Cart reconciliation and add-to-cart flows against the mock backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use qkart_core::{Cost, ProductId};
use qkart_integration_tests::{MockBackend, fixtures, routes};
use qkart_storefront::api::{ApiClient, Backend};
use qkart_storefront::navigation::{History, Route};
use qkart_storefront::notify::NotificationQueue;
use qkart_storefront::session::Session;
use qkart_storefront::views::{
    AddToCartOptions, AddToCartOutcome, CheckoutOutcome, ProductsPage, messages,
};
use secrecy::SecretString;

struct Shop {
    backend: MockBackend,
    page: ProductsPage<ApiClient>,
    notifications: Arc<NotificationQueue>,
    history: Arc<History>,
}

impl Shop {
    async fn open(backend: MockBackend, session: Session) -> Self {
        let config = backend.config().unwrap();
        let client = ApiClient::new(&config).unwrap();
        let notifications = Arc::new(NotificationQueue::new());
        let history = Arc::new(History::new());
        let page = ProductsPage::new(
            client,
            session,
            notifications.clone(),
            history.clone(),
            config.search_debounce,
        );
        page.mount().await;
        Self {
            backend,
            page,
            notifications,
            history,
        }
    }

    fn messages(&self) -> Vec<String> {
        self.notifications
            .drain()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }

    fn cart_ids(&self) -> Vec<String> {
        self.page
            .cart_panel()
            .unwrap()
            .items()
            .iter()
            .map(|item| item.product_id().to_string())
            .collect()
    }
}

async fn logged_in(cart: &[(&str, u32)]) -> Shop {
    let backend = MockBackend::start().await.unwrap();
    let token = backend.seed_user("crio.do", "learn-by-doing");
    backend.seed_cart(&token, cart);
    Shop::open(backend, Session::with_token(token)).await
}

fn id(id: &str) -> ProductId {
    ProductId::new(id)
}

#[tokio::test]
async fn test_cart_requires_bearer_token() {
    let backend = MockBackend::start().await.unwrap();
    let client = ApiClient::new(&backend.config().unwrap()).unwrap();

    let err = client
        .fetch_cart(&SecretString::from("not-a-token"))
        .await
        .unwrap_err();

    assert_eq!(
        err.server_message(),
        Some("Protected route, Oauth2 Bearer token not found")
    );
}

#[tokio::test]
async fn test_mount_reconciles_in_backend_order() {
    let shop = logged_in(&[(fixtures::WATCH, 1), ("deleted-product", 3), (fixtures::LAMP, 2)]).await;

    assert_eq!(shop.cart_ids(), [fixtures::WATCH, fixtures::LAMP]);
    let totals = shop.page.cart_panel().unwrap().totals();
    assert_eq!(totals.value, Cost::from(260));
    assert_eq!(totals.items, 3);
    assert!(shop.messages().is_empty());
}

#[tokio::test]
async fn test_anonymous_visitor_cannot_add() {
    let backend = MockBackend::start().await.unwrap();
    let shop = Shop::open(backend, Session::anonymous()).await;

    let outcome = shop
        .page
        .add_to_cart(&id(fixtures::LAMP), 1, AddToCartOptions::from_product_card())
        .await;

    assert_eq!(outcome, AddToCartOutcome::LoginRequired);
    assert!(shop.page.cart_panel().is_none());
    assert_eq!(shop.backend.hits(routes::CART), 0);
    assert_eq!(shop.backend.hits(routes::UPDATE_CART), 0);
    assert_eq!(shop.messages(), [messages::LOGIN_TO_ADD]);
    assert_eq!(shop.history.current(), Route::Login);
}

#[tokio::test]
async fn test_add_duplicate_sends_nothing() {
    let shop = logged_in(&[(fixtures::LAMP, 1)]).await;

    let outcome = shop
        .page
        .add_to_cart(&id(fixtures::LAMP), 1, AddToCartOptions::from_product_card())
        .await;

    assert_eq!(outcome, AddToCartOutcome::Duplicate);
    assert_eq!(shop.backend.hits(routes::UPDATE_CART), 0);
    assert_eq!(shop.messages(), [messages::ALREADY_IN_CART]);
}

#[tokio::test]
async fn test_add_and_adjust_quantity() {
    let shop = logged_in(&[(fixtures::LAMP, 1)]).await;

    let outcome = shop
        .page
        .add_to_cart(&id(fixtures::DUFFLE), 1, AddToCartOptions::from_product_card())
        .await;
    assert!(matches!(outcome, AddToCartOutcome::Updated(ref items) if items.len() == 2));
    assert_eq!(shop.cart_ids(), [fixtures::LAMP, fixtures::DUFFLE]);

    shop.page.increment(&id(fixtures::DUFFLE)).await;
    let cart = shop.page.cart_panel().unwrap();
    assert_eq!(cart.quantity_of(&id(fixtures::DUFFLE)), Some(2));
    assert_eq!(cart.totals().value, Cost::from(400));

    shop.page.decrement(&id(fixtures::LAMP)).await;
    assert_eq!(shop.cart_ids(), [fixtures::DUFFLE]);

    assert_eq!(shop.backend.hits(routes::UPDATE_CART), 3);
    assert!(shop.messages().is_empty());
}

#[tokio::test]
async fn test_unknown_product_shows_backend_message() {
    let shop = logged_in(&[(fixtures::LAMP, 1)]).await;

    let outcome = shop
        .page
        .add_to_cart(&id("no-such-product"), 1, AddToCartOptions::default())
        .await;

    assert_eq!(outcome, AddToCartOutcome::Failed);
    assert_eq!(shop.messages(), ["Product doesn't exist"]);
    assert_eq!(shop.cart_ids(), [fixtures::LAMP]);
}

#[tokio::test]
async fn test_expired_token_is_reported() {
    let backend = MockBackend::start().await.unwrap();
    let shop = Shop::open(backend, Session::with_token("expired")).await;

    assert_eq!(
        shop.messages(),
        ["Protected route, Oauth2 Bearer token not found"]
    );
    assert!(shop.page.cart_panel().unwrap().is_empty());
    // The catalog still loads
    assert_eq!(shop.page.catalog().products().len(), 4);
}

#[tokio::test]
async fn test_checkout() {
    let empty = logged_in(&[]).await;
    assert_eq!(empty.page.checkout(), CheckoutOutcome::EmptyCart);
    assert_eq!(empty.messages(), [messages::CART_EMPTY]);

    let full = logged_in(&[(fixtures::FAN, 1)]).await;
    assert_eq!(full.page.checkout(), CheckoutOutcome::Proceed);
    assert_eq!(full.history.current(), Route::Checkout);
}
