//! Client-side routes and navigation.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Pages of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Products,
    Login,
    Register,
    Checkout,
    Thanks,
}

impl Route {
    /// URL path of the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Products => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Checkout => "/checkout",
            Self::Thanks => "/thanks",
        }
    }

    /// Resolve a path to a route. Unknown paths fall through to the
    /// products page.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/checkout" => Self::Checkout,
            "/thanks" => Self::Thanks,
            _ => Self::Products,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Something that can move the user to another page.
pub trait Navigator: Send + Sync {
    fn push(&self, route: Route);
}

/// In-memory navigation history.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<Route>>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently pushed route, or the products page if none.
    #[must_use]
    pub fn current(&self) -> Route {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
            .unwrap_or(Route::Products)
    }

    /// Every pushed route, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<Route> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for History {
    fn push(&self, route: Route) {
        tracing::debug!(path = route.path(), "Navigate");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}
