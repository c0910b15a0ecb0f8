//! The products page: catalog, search and the cart panel.
//!
//! # Cart flow
//!
//! ```text
//! mount ──┬── GET /products ──┐
//!         └── GET /cart ──────┴── generate_cart_items ── CartView
//!
//! add_to_cart ── no session?        → warn, navigate /login
//!             ── duplicate (opt-in)? → warn
//!             └─ POST /cart ── generate_cart_items ── CartView
//! ```

use std::sync::Arc;
use std::time::Duration;

use qkart_core::{CartEntry, CartItem, Product, ProductId, generate_cart_items};
use tracing::{debug, info, instrument, warn};

use super::cart::CartView;
use super::catalog::CatalogView;
use super::{failure_message, messages};
use crate::api::Backend;
use crate::error::add_breadcrumb;
use crate::navigation::{Navigator, Route};
use crate::notify::{Notification, Notifier};
use crate::session::Session;

/// Options for [`ProductsPage::add_to_cart`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AddToCartOptions {
    /// Refuse, without a request, when the product is already in the cart.
    /// Set by the product card's button; quantity controls leave it off.
    pub prevent_duplicate: bool,
}

impl AddToCartOptions {
    /// Options used by the "Add to cart" button on a product card.
    #[must_use]
    pub const fn from_product_card() -> Self {
        Self {
            prevent_duplicate: true,
        }
    }
}

/// Which branch an add-to-cart request took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddToCartOutcome {
    /// No session; the user was sent to the login page.
    LoginRequired,
    /// The product was already in the cart.
    Duplicate,
    /// The backend accepted the update; carries the new cart lines.
    Updated(Vec<CartItem>),
    /// The backend call failed; the cart is unchanged.
    Failed,
    /// Nothing to decrement; no request was sent.
    NotInCart,
}

/// Which branch a checkout request took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    LoginRequired,
    EmptyCart,
    Proceed,
}

/// Products page. Owns the catalog and the cart; the session is fixed for
/// the page's lifetime.
pub struct ProductsPage<B: Backend> {
    backend: B,
    session: Session,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    catalog: CatalogView<B>,
    cart: CartView,
}

impl<B: Backend> std::fmt::Debug for ProductsPage<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductsPage")
            .field("session", &self.session)
            .field("catalog", &self.catalog)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> ProductsPage<B> {
    pub fn new(
        backend: B,
        session: Session,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        search_debounce: Duration,
    ) -> Self {
        let catalog = CatalogView::new(backend.clone(), Arc::clone(&notifier), search_debounce);
        Self {
            backend,
            session,
            notifier,
            navigator,
            catalog,
            cart: CartView::new(),
        }
    }

    /// Load the catalog and, with a session, the cart concurrently;
    /// reconcile once both have arrived.
    #[instrument(skip(self), fields(logged_in = self.session.is_logged_in()))]
    pub async fn mount(&self) {
        let (products, entries) = tokio::join!(self.catalog.fetch_catalog(), self.fetch_cart());

        if let (Some(products), Some(entries)) = (products, entries) {
            self.reconcile(&entries, &products);
        }
    }

    /// Fetch the cart of the logged-in user.
    ///
    /// Returns `None` without a request when there is no session, and
    /// `None` with an error notification when the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Option<Vec<CartEntry>> {
        let token = self.session.token()?;

        match self.backend.fetch_cart(token).await {
            Ok(entries) => {
                debug!(count = entries.len(), "Cart loaded");
                Some(entries)
            }
            Err(e) => {
                warn!(error = %e, "Cart fetch failed");
                self.notifier.enqueue(Notification::error(failure_message(
                    &e,
                    messages::BACKEND_UNREACHABLE,
                )));
                None
            }
        }
    }

    /// Set the quantity of `product_id` in the cart.
    ///
    /// A quantity of zero removes the line. Every outcome the user should
    /// see is reported through the notifier; the return value says which
    /// branch was taken.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        qty: u32,
        options: AddToCartOptions,
    ) -> AddToCartOutcome {
        let Some(token) = self.session.token() else {
            self.notifier
                .enqueue(Notification::warning(messages::LOGIN_TO_ADD));
            self.navigator.push(Route::Login);
            return AddToCartOutcome::LoginRequired;
        };

        if options.prevent_duplicate && self.cart.contains(product_id) {
            self.notifier
                .enqueue(Notification::warning(messages::ALREADY_IN_CART));
            return AddToCartOutcome::Duplicate;
        }

        add_breadcrumb(
            "cart",
            "Update cart",
            Some(&[("product_id", product_id.as_str())]),
        );

        match self.backend.update_cart(token, product_id, qty).await {
            Ok(entries) => {
                let items = self.reconcile(&entries, &self.catalog.products());
                info!(lines = items.len(), "Cart updated");
                AddToCartOutcome::Updated(items)
            }
            Err(e) => {
                warn!(error = %e, "Cart update failed");
                self.notifier.enqueue(Notification::warning(failure_message(
                    &e,
                    messages::BACKEND_UNREACHABLE,
                )));
                AddToCartOutcome::Failed
            }
        }
    }

    /// Raise the quantity of a cart line by one.
    pub async fn increment(&self, product_id: &ProductId) -> AddToCartOutcome {
        let qty = self.cart.quantity_of(product_id).unwrap_or(0).saturating_add(1);
        self.add_to_cart(product_id, qty, AddToCartOptions::default())
            .await
    }

    /// Lower the quantity of a cart line by one; the backend drops the line
    /// at zero.
    pub async fn decrement(&self, product_id: &ProductId) -> AddToCartOutcome {
        let Some(current) = self.cart.quantity_of(product_id) else {
            debug!(product_id = %product_id, "Decrement of a product not in the cart");
            return AddToCartOutcome::NotInCart;
        };
        self.add_to_cart(product_id, current.saturating_sub(1), AddToCartOptions::default())
            .await
    }

    /// Move to checkout, if there is a session and something to buy.
    pub fn checkout(&self) -> CheckoutOutcome {
        if !self.session.is_logged_in() {
            self.notifier
                .enqueue(Notification::warning(messages::LOGIN_TO_CHECKOUT));
            self.navigator.push(Route::Login);
            return CheckoutOutcome::LoginRequired;
        }

        if self.cart.is_empty() {
            self.notifier
                .enqueue(Notification::warning(messages::CART_EMPTY));
            return CheckoutOutcome::EmptyCart;
        }

        add_breadcrumb("cart", "Checkout", None);
        self.navigator.push(Route::Checkout);
        CheckoutOutcome::Proceed
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogView<B> {
        &self.catalog
    }

    /// The cart panel, shown only with a session.
    #[must_use]
    pub const fn cart_panel(&self) -> Option<&CartView> {
        if self.session.is_logged_in() {
            Some(&self.cart)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn reconcile(&self, entries: &[CartEntry], products: &[Product]) -> Vec<CartItem> {
        let items = generate_cart_items(entries, products);
        if items.len() < entries.len() {
            debug!(
                dropped = entries.len() - items.len(),
                "Cart entries without a catalog product dropped"
            );
        }
        self.cart.replace(items.clone());
        items
    }
}
