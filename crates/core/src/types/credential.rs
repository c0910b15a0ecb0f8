//! Login and registration credentials.
//!
//! Validation mirrors the storefront's login and register forms, so every
//! error's `Display` text is the notice shown to the user.

use core::fmt;

use serde::Serialize;

/// Errors that can occur when validating [`Credentials`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The username is empty.
    #[error("Username is a required field")]
    MissingUsername,
    /// The username is shorter than [`Username::MIN_LENGTH`].
    #[error("Username must be at least {min} characters")]
    UsernameTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The password is empty.
    #[error("Password is a required field")]
    MissingPassword,
    /// The password is shorter than [`Credentials::MIN_PASSWORD_LENGTH`].
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The confirmation does not match the password.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// A storefront username.
///
/// Login only requires the name to be present; registration additionally
/// enforces [`Username::MIN_LENGTH`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length of a newly registered username.
    pub const MIN_LENGTH: usize = 6;

    /// Parse a username for login (presence only).
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::MissingUsername`] if the input is empty
    /// after trimming.
    pub fn parse(s: &str) -> Result<Self, CredentialError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::MissingUsername);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse a username for registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or shorter than
    /// [`Username::MIN_LENGTH`] characters.
    pub fn parse_new(s: &str) -> Result<Self, CredentialError> {
        let username = Self::parse(s)?;
        if username.0.chars().count() < Self::MIN_LENGTH {
            return Err(CredentialError::UsernameTooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(username)
    }

    /// Get the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated username/password pair, serialized as the auth request body.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
pub struct Credentials {
    username: Username,
    password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Minimum length of a newly registered password.
    pub const MIN_PASSWORD_LENGTH: usize = 6;

    /// Validate credentials entered in the login form.
    ///
    /// # Errors
    ///
    /// Returns an error if either field is empty.
    pub fn for_login(username: &str, password: &str) -> Result<Self, CredentialError> {
        let username = Username::parse(username)?;
        if password.is_empty() {
            return Err(CredentialError::MissingPassword);
        }
        Ok(Self {
            username,
            password: password.to_owned(),
        })
    }

    /// Validate credentials entered in the registration form.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule, checked in form order: username,
    /// password, confirmation.
    pub fn for_registration(
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, CredentialError> {
        let username = Username::parse_new(username)?;
        if password.is_empty() {
            return Err(CredentialError::MissingPassword);
        }
        if password.chars().count() < Self::MIN_PASSWORD_LENGTH {
            return Err(CredentialError::PasswordTooShort {
                min: Self::MIN_PASSWORD_LENGTH,
            });
        }
        if password != confirm_password {
            return Err(CredentialError::PasswordMismatch);
        }
        Ok(Self {
            username,
            password: password.to_owned(),
        })
    }

    /// The validated username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }
}
