//! Login, registration and logout.

use std::sync::Arc;

use qkart_core::Credentials;
use tracing::{info, instrument, warn};

use super::{failure_message, messages};
use crate::api::Backend;
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::navigation::{Navigator, Route};
use crate::notify::{Notification, Notifier};
use crate::session::{Session, SessionError, SessionStore};

/// Login form.
pub struct LoginPage<B: Backend> {
    backend: B,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl<B: Backend> LoginPage<B> {
    pub fn new(
        backend: B,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            backend,
            store,
            notifier,
            navigator,
        }
    }

    /// Validate, log in and persist the session.
    ///
    /// Returns the new session, or `None` after notifying why not.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Option<Session> {
        let credentials = match Credentials::for_login(username, password) {
            Ok(credentials) => credentials,
            Err(e) => {
                self.notifier.enqueue(Notification::warning(e.to_string()));
                return None;
            }
        };

        add_breadcrumb("auth", "Login", Some(&[("username", username)]));

        let auth = match self.backend.login(&credentials).await {
            Ok(auth) => auth,
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.notifier.enqueue(Notification::error(failure_message(
                    &e,
                    messages::AUTH_UNREACHABLE,
                )));
                return None;
            }
        };

        let session = Session::from_auth(&auth);
        if let Err(e) = self.store.save(&session) {
            warn!(error = %e, "Could not persist session");
            self.notifier
                .enqueue(Notification::error(format!("Could not save session: {e}")));
            return None;
        }

        set_sentry_user(&auth.username);
        info!(username = %auth.username, "Logged in");
        self.notifier
            .enqueue(Notification::success(messages::LOGGED_IN));
        self.navigator.push(Route::Products);
        Some(session)
    }
}

/// Registration form.
pub struct RegisterPage<B: Backend> {
    backend: B,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl<B: Backend> RegisterPage<B> {
    pub fn new(backend: B, notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            backend,
            notifier,
            navigator,
        }
    }

    /// Validate and create an account. On success the user is sent to the
    /// login page.
    #[instrument(skip(self, password, confirm_password))]
    pub async fn register(&self, username: &str, password: &str, confirm_password: &str) -> bool {
        let credentials =
            match Credentials::for_registration(username, password, confirm_password) {
                Ok(credentials) => credentials,
                Err(e) => {
                    self.notifier.enqueue(Notification::warning(e.to_string()));
                    return false;
                }
            };

        match self.backend.register(&credentials).await {
            Ok(()) => {
                info!(username, "Registered");
                self.notifier
                    .enqueue(Notification::success(messages::REGISTERED));
                self.navigator.push(Route::Login);
                true
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.notifier.enqueue(Notification::error(failure_message(
                    &e,
                    messages::AUTH_UNREACHABLE,
                )));
                false
            }
        }
    }
}

/// Forget the stored session and return to the products page.
///
/// # Errors
///
/// Returns an error if the store cannot be cleared.
pub fn logout(
    store: &dyn SessionStore,
    notifier: &dyn Notifier,
    navigator: &dyn Navigator,
) -> Result<(), SessionError> {
    store.clear()?;
    clear_sentry_user();
    info!("Logged out");
    notifier.enqueue(Notification::success(messages::LOGGED_OUT));
    navigator.push(Route::Products);
    Ok(())
}
