//! Product listing and search.

use std::sync::Arc;
use std::time::Duration;

use qkart_core::Product;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use super::catalog_failure_message;
use crate::api::Backend;
use crate::debounce::Debouncer;
use crate::error::add_breadcrumb;
use crate::notify::{Notification, Notifier};

/// Observable state of the product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogState {
    /// Full catalog from the last successful fetch.
    pub products: Vec<Product>,
    /// What the grid shows: the search results, or the full catalog.
    pub filtered: Vec<Product>,
    /// A catalog fetch is in flight.
    pub loading: bool,
    /// Current contents of the search box.
    pub search_text: String,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            filtered: Vec::new(),
            loading: true,
            search_text: String::new(),
        }
    }
}

/// Catalog view: owns [`CatalogState`] and runs fetch and search against
/// the backend.
pub struct CatalogView<B: Backend> {
    backend: B,
    notifier: Arc<dyn Notifier>,
    state: Arc<watch::Sender<CatalogState>>,
    search: Debouncer<String>,
}

impl<B: Backend> std::fmt::Debug for CatalogView<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogView")
            .field("state", &*self.state.borrow())
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> CatalogView<B> {
    /// Create the view. Searches fire `search_debounce` after the last
    /// keystroke.
    pub fn new(backend: B, notifier: Arc<dyn Notifier>, search_debounce: Duration) -> Self {
        let state = Arc::new(watch::channel(CatalogState::default()).0);

        let search = {
            let backend = backend.clone();
            let state = Arc::clone(&state);
            Debouncer::new(search_debounce, move |text: String| {
                let backend = backend.clone();
                let state = Arc::clone(&state);
                async move { run_search(&backend, &state, &text).await }
            })
        };

        Self {
            backend,
            notifier,
            state,
            search,
        }
    }

    /// Fetch the full catalog.
    ///
    /// On success both the catalog and the visible list are replaced and
    /// the products are returned. On failure an error notification is
    /// queued and the previous lists are kept. Loading is cleared either
    /// way.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self) -> Option<Vec<Product>> {
        self.state.send_modify(|s| s.loading = true);

        match self.backend.list_products().await {
            Ok(products) => {
                debug!(count = products.len(), "Catalog loaded");
                self.state.send_modify(|s| {
                    s.products.clone_from(&products);
                    s.filtered.clone_from(&products);
                    s.loading = false;
                });
                Some(products)
            }
            Err(e) => {
                warn!(error = %e, "Catalog fetch failed");
                self.state.send_modify(|s| s.loading = false);
                self.notifier
                    .enqueue(Notification::error(catalog_failure_message(&e)));
                None
            }
        }
    }

    /// Update the search box.
    ///
    /// Non-empty text schedules a debounced search. Empty text cancels any
    /// pending search and shows the full catalog again.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|s| s.search_text.clone_from(&text));

        if text.is_empty() {
            self.search.cancel();
            self.state.send_modify(|s| s.filtered.clone_from(&s.products));
            return;
        }

        add_breadcrumb("search", "Search", Some(&[("text", text.as_str())]));
        self.search.call(text);
    }

    /// Run a search immediately, bypassing the debounce.
    pub async fn search_now(&self, text: &str) {
        self.state
            .send_modify(|s| s.search_text = text.to_string());
        run_search(&self.backend, &self.state, text).await;
    }

    /// Whether a debounced search is waiting to fire.
    #[must_use]
    pub fn search_pending(&self) -> bool {
        self.search.is_pending()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    /// Full catalog from the last successful fetch.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.state.borrow().products.clone()
    }
}

/// Search and write the outcome into the visible list. A 404 means no
/// match; any other failure leaves the list as it was.
#[instrument(skip(backend, state))]
async fn run_search<B: Backend>(backend: &B, state: &watch::Sender<CatalogState>, text: &str) {
    match backend.search_products(text).await {
        Ok(products) => {
            debug!(count = products.len(), "Search results");
            state.send_modify(|s| s.filtered = products);
        }
        Err(e) if e.is_not_found() => {
            debug!("No products match");
            state.send_modify(|s| s.filtered.clear());
        }
        Err(e) => warn!(error = %e, "Search failed; keeping current results"),
    }
}
