//! CLI commands.
//!
//! Each command builds the views it needs from a shared [`Context`], runs
//! one action and prints the result to stdout. Notifications and
//! navigation produced by the views go to stderr.

pub mod auth;
pub mod cart;
pub mod catalog;
mod render;
pub mod shop;

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use qkart_storefront::api::{ApiClient, ApiError};
use qkart_storefront::config::{ConfigError, StorefrontConfig};
use qkart_storefront::error::AppError;
use qkart_storefront::navigation::{History, Route};
use qkart_storefront::notify::NotificationQueue;
use qkart_storefront::session::{FileSessionStore, SessionError, SessionStore};
use qkart_storefront::views::{LoginPage, ProductsPage, RegisterPage};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Errors that end a command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The action ran but did not succeed; the reason was already shown
    /// as a notification.
    #[error("{0}")]
    Unsuccessful(&'static str),
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        Self::App(err.into())
    }
}

impl From<ApiError> for CommandError {
    fn from(err: ApiError) -> Self {
        Self::App(err.into())
    }
}

impl From<SessionError> for CommandError {
    fn from(err: SessionError) -> Self {
        Self::App(err.into())
    }
}

/// Shared wiring for every command.
pub struct Context {
    config: StorefrontConfig,
    client: ApiClient,
    store: Arc<FileSessionStore>,
    notifications: Arc<NotificationQueue>,
    history: Arc<History>,
    routes_shown: AtomicUsize,
}

impl Context {
    /// Build the client and open the session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CommandError> {
        let client = ApiClient::new(&config)?;
        let store = Arc::new(FileSessionStore::new(config.session_file.clone()));
        tracing::debug!(
            endpoint = client.endpoint(),
            session_file = %store.path().display(),
            "Context ready"
        );

        Ok(Self {
            config,
            client,
            store,
            notifications: Arc::new(NotificationQueue::new()),
            history: Arc::new(History::new()),
            routes_shown: AtomicUsize::new(0),
        })
    }

    /// Products page for the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file exists but cannot be read.
    pub fn products_page(&self) -> Result<ProductsPage<ApiClient>, CommandError> {
        let session = self.store.load()?;
        Ok(ProductsPage::new(
            self.client.clone(),
            session,
            self.notifications.clone(),
            self.history.clone(),
            self.config.search_debounce,
        ))
    }

    pub fn login_page(&self) -> LoginPage<ApiClient> {
        LoginPage::new(
            self.client.clone(),
            self.store.clone(),
            self.notifications.clone(),
            self.history.clone(),
        )
    }

    pub fn register_page(&self) -> RegisterPage<ApiClient> {
        RegisterPage::new(
            self.client.clone(),
            self.notifications.clone(),
            self.history.clone(),
        )
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Print pending notifications and navigation to stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if stderr cannot be written.
    pub fn flush(&self) -> io::Result<()> {
        let mut err = io::stderr().lock();

        for notification in self.notifications.drain() {
            writeln!(err, "{notification}")?;
        }

        let routes = self.history.entries();
        let shown = self.routes_shown.swap(routes.len(), Ordering::Relaxed);
        for route in routes.iter().skip(shown) {
            match route {
                Route::Login => writeln!(err, "=> {route} (run `qkart login -u <username>`)")?,
                _ => writeln!(err, "=> {route}")?,
            }
        }

        Ok(())
    }
}

/// Line-oriented reader for the interactive shop.
pub struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for Prompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next line of input, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }
}
