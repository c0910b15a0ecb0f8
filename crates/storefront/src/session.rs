//! Session context and its persistent store.
//!
//! The session token is read from the store once, at the composition root,
//! and then passed explicitly to the views as a [`Session`]. The store is
//! only written on login and cleared on logout.
//!
//! The on-disk format is a flat JSON object of string values, keyed by the
//! names in [`keys`]:
//!
//! ```json
//! { "token": "eyJhbGciOi...", "username": "crio.do", "balance": "5000" }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::api::AuthResponse;

/// Keys under which session data is stored.
pub mod keys {
    /// Key for the bearer token issued at login.
    pub const TOKEN: &str = "token";

    /// Key for the logged-in username.
    pub const USERNAME: &str = "username";

    /// Key for the wallet balance reported at login.
    pub const BALANCE: &str = "balance";
}

/// Errors reading or writing the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// Session
// =============================================================================

/// Login context for one run of the storefront.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
    username: Option<String>,
    balance: Option<Decimal>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish()
    }
}

impl Session {
    /// A visitor with no token.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session carrying only a token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
            ..Self::default()
        }
    }

    /// Session established by a successful login.
    #[must_use]
    pub fn from_auth(auth: &AuthResponse) -> Self {
        Self {
            token: Some(SecretString::from(auth.token.clone())),
            username: Some(auth.username.clone()),
            balance: auth.balance,
        }
    }

    /// Bearer token, if logged in.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Whether a token is present.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Logged-in username, if known.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Wallet balance reported at login, if known.
    #[must_use]
    pub const fn balance(&self) -> Option<Decimal> {
        self.balance
    }

    fn from_entries(entries: &BTreeMap<String, String>) -> Self {
        let non_empty = |key: &str| entries.get(key).filter(|v| !v.is_empty()).cloned();

        Self {
            token: non_empty(keys::TOKEN).map(SecretString::from),
            username: non_empty(keys::USERNAME),
            balance: non_empty(keys::BALANCE).and_then(|v| v.parse().ok()),
        }
    }

    fn to_entries(&self) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();
        if let Some(token) = &self.token {
            entries.insert(keys::TOKEN.to_string(), token.expose_secret().to_string());
        }
        if let Some(username) = &self.username {
            entries.insert(keys::USERNAME.to_string(), username.clone());
        }
        if let Some(balance) = self.balance {
            entries.insert(keys::BALANCE.to_string(), balance.to_string());
        }
        entries
    }
}

// =============================================================================
// Stores
// =============================================================================

/// Client-local persistent storage for the session.
pub trait SessionStore: Send + Sync {
    /// Load the stored session; an empty store yields an anonymous session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    fn load(&self) -> Result<Session, SessionError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Remove all stored session data. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be removed.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Session store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store at `path`. Nothing is touched until the first call.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session, SessionError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Session::anonymous()),
            Err(e) => return Err(e.into()),
        };

        let entries: BTreeMap<String, String> = serde_json::from_str(&contents)?;
        Ok(Session::from_entries(&entries))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&session.to_entries())?;
        write_private(&self.path, json.as_bytes())?;

        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `contents` to `path`. On unix the file is owner-only from the
/// moment it exists, since it holds a bearer token.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // `mode` only applies on creation; tighten a file left by an older run
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents)?;
    file.flush()
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session, SessionError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Session::from_entries(&entries))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = session.to_entries();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}
