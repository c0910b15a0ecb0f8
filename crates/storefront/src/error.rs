//! Unified error handling with Sentry integration.
//!
//! Views never propagate backend failures; they turn them into
//! notifications. `AppError` covers the failures that do escape: loading
//! configuration, building the client, and touching the session store.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session store could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Report an API failure to Sentry when it is not a plain backend answer.
///
/// Structured backend errors (4xx/5xx with a body) are expected outcomes
/// shown to the user; transport and parse failures point at an unhealthy
/// backend and are captured.
pub fn capture_api_error(err: &ApiError) {
    if err.has_response() {
        return;
    }

    let event_id = sentry::capture_error(err);
    tracing::error!(
        error = %err,
        sentry_event_id = %event_id,
        "QKart API request failed"
    );
}

/// Set the Sentry user context from a username.
///
/// Call this after a successful login to associate errors with users.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Add to cart", Some(&[("product_id", "BW0jAAeDJmlZCF8i")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(ApiError::Transport("connection refused".to_string()));
        assert_eq!(err.to_string(), "API error: Network error: connection refused");

        let err = AppError::from(ConfigError::InvalidEnvVar(
            "QKART_API_ENDPOINT".to_string(),
            "relative URL without a base".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid environment variable QKART_API_ENDPOINT: relative URL without a base"
        );
    }

    #[test]
    fn test_capture_without_sentry_client_is_noop() {
        // No Sentry client is bound in tests; capturing must not panic.
        capture_api_error(&ApiError::Transport("timeout".to_string()));
        add_breadcrumb("search", "Search", Some(&[("text", "shoes")]));
    }
}
