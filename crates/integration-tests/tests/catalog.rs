//! Catalog listing, search and caching against the mock backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use qkart_core::Cost;
use qkart_integration_tests::{MockBackend, fixtures, routes};
use qkart_storefront::api::{ApiClient, ApiError, Backend};
use qkart_storefront::notify::{NotificationQueue, Variant};
use qkart_storefront::views::CatalogView;

async fn setup() -> (MockBackend, ApiClient) {
    let backend = MockBackend::start().await.unwrap();
    let client = ApiClient::new(&backend.config().unwrap()).unwrap();
    (backend, client)
}

#[tokio::test]
async fn test_list_products_decodes_catalog() {
    let (backend, client) = setup().await;

    let products = client.list_products().await.unwrap();

    assert_eq!(products.len(), 4);
    assert_eq!(products[0].id.as_str(), fixtures::LAMP);
    assert_eq!(products[0].cost, Cost::from(100));
    assert_eq!(products[0].rating, 5);
    assert!(products[0].image_url.ends_with(".png"));
    assert_eq!(backend.hits(routes::PRODUCTS), 1);
}

#[tokio::test]
async fn test_search_text_is_percent_encoded() {
    let (_backend, client) = setup().await;

    let products = client.search_products("home & kitchen").await.unwrap();

    let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, [fixtures::LAMP, fixtures::FAN]);
}

#[tokio::test]
async fn test_search_without_match_is_not_found() {
    let (_backend, client) = setup().await;

    let err = client.search_products("zzz").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.server_message(), Some("No products found"));
}

#[tokio::test]
async fn test_catalog_cache_serves_repeat_reads() {
    let backend = MockBackend::start().await.unwrap();
    let config = backend
        .config_with(&[("QKART_CATALOG_CACHE_TTL_SECS", "60")])
        .unwrap();
    let client = ApiClient::new(&config).unwrap();

    client.list_products().await.unwrap();
    client.list_products().await.unwrap();
    assert_eq!(backend.hits(routes::PRODUCTS), 1);

    client.invalidate_catalog().await;
    client.list_products().await.unwrap();
    assert_eq!(backend.hits(routes::PRODUCTS), 2);

    // Search always goes to the backend
    client.search_products("watch").await.unwrap();
    client.search_products("watch").await.unwrap();
    assert_eq!(backend.hits(routes::SEARCH), 2);
}

#[tokio::test]
async fn test_catalog_failure_notifies_status_text() {
    let (backend, client) = setup().await;
    backend.fail_catalog(true);
    let notifications = Arc::new(NotificationQueue::new());
    let view = CatalogView::new(client, notifications.clone(), Duration::from_millis(50));

    assert!(view.fetch_catalog().await.is_none());

    let state = view.snapshot();
    assert!(!state.loading);
    assert!(state.products.is_empty());
    let notes = notifications.drain();
    assert_eq!(notes[0].variant, Variant::Error);
    assert_eq!(notes[0].message, "Internal Server Error");
}

#[tokio::test]
async fn test_debounced_search_issues_one_request() {
    let (backend, client) = setup().await;
    let notifications = Arc::new(NotificationQueue::new());
    let view = CatalogView::new(client, notifications.clone(), Duration::from_millis(50));
    view.fetch_catalog().await.unwrap();

    let mut rx = view.subscribe();
    for text in ["l", "le", "lea", "leat", "leather"] {
        view.set_search_text(text);
    }

    // Wait for the search results to land
    tokio::time::timeout(Duration::from_secs(5), async {
        while rx.borrow_and_update().filtered.len() != 2 {
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap();

    assert_eq!(backend.hits(routes::SEARCH), 1);
    let ids: Vec<_> = view
        .snapshot()
        .filtered
        .iter()
        .map(|p| p.id.to_string())
        .collect();
    assert_eq!(ids, [fixtures::DUFFLE, fixtures::WATCH]);
    assert!(notifications.is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let backend = MockBackend::start().await.unwrap();
    let config = backend.config().unwrap();
    drop(backend);
    // Give the aborted server a moment to release the port
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = ApiClient::new(&config).unwrap();
    let err = client.list_products().await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
}
