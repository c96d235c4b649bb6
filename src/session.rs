//! The signed-in session and its keychain persistence.
//!
//! [`SessionContext`] is passed explicitly to the [`RestClient`](crate::rest::RestClient)
//! to build the `Authorization` header. The bearer token and the last-known
//! user profile can be kept in the system keychain; at startup
//! [`populate_env_from_keychain`] copies them into environment variables so
//! the config flow picks them up transparently.

use std::fmt;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::config::SessionConfig;
use crate::models::UserProfile;

/// Keychain service name used for all stored session values.
const SERVICE: &str = "storefront";

/// Session values managed in the keychain.
#[derive(Clone, Copy, Debug)]
pub enum SessionKey {
    /// The bearer token.
    Token,
    /// The user profile, stored as JSON.
    User,
}

impl SessionKey {
    /// Returns the keychain entry identifier.
    pub fn keyring_id(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::User => "user",
        }
    }

    /// Returns the environment variable this value is exported to.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::Token => "STOREFRONT_TOKEN",
            Self::User => "STOREFRONT_USER_ID",
        }
    }
}

/// Bearer token plus the user it belongs to.
#[derive(Clone, Default)]
pub struct SessionContext {
    token: Option<Zeroizing<String>>,
    user: Option<UserProfile>,
}

impl SessionContext {
    /// A session with no token and no user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: Some(Zeroizing::new(token.into())),
            user: Some(user),
        }
    }

    /// Builds the session from configuration, reusing the cached profile
    /// from the keychain when it belongs to the configured user.
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        let user = config.user_id.map(|id| {
            load_user()
                .filter(|cached| cached.id == id)
                .unwrap_or_else(|| UserProfile::with_id(id))
        });

        Self {
            token: config.token.clone().map(Zeroizing::new),
            user,
        }
    }

    /// `Authorization` header value, if a token is present.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t.as_str()))
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    /// Returns the signed-in user's id.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Session`](crate::StorefrontError::Session)
    /// when nobody is signed in.
    pub fn require_user_id(&self) -> crate::Result<i64> {
        self.user_id()
            .ok_or_else(|| crate::StorefrontError::Session("no signed-in user".to_string()))
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}

/// Loads a value from the keychain, returning `None` if not set.
pub fn load(key: SessionKey) -> Option<Zeroizing<String>> {
    let entry = keyring::Entry::new(SERVICE, key.keyring_id()).ok()?;
    match entry.get_password() {
        Ok(password) => Some(Zeroizing::new(password)),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(key = key.keyring_id(), error = %e, "failed to read keychain entry");
            None
        }
    }
}

/// Saves a value to the keychain.
pub fn save(key: SessionKey, value: &str) -> crate::Result<()> {
    let entry = keyring::Entry::new(SERVICE, key.keyring_id())
        .map_err(|e| crate::StorefrontError::Session(format!("keyring entry error: {e}")))?;
    entry
        .set_password(value)
        .map_err(|e| crate::StorefrontError::Session(format!("failed to save to keychain: {e}")))
}

/// Removes a value from the keychain. Missing entries are not an error.
pub fn clear(key: SessionKey) -> crate::Result<()> {
    let entry = keyring::Entry::new(SERVICE, key.keyring_id())
        .map_err(|e| crate::StorefrontError::Session(format!("keyring entry error: {e}")))?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(crate::StorefrontError::Session(format!(
            "failed to clear keychain entry: {e}"
        ))),
    }
}

/// Loads the cached user profile.
pub fn load_user() -> Option<UserProfile> {
    let raw = load(SessionKey::User)?;
    match serde_json::from_str(raw.as_str()) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!(error = %e, "ignoring unreadable cached user profile");
            None
        }
    }
}

/// Caches the user profile in the keychain.
pub fn save_user(user: &UserProfile) -> crate::Result<()> {
    let json = serde_json::to_string(user)?;
    save(SessionKey::User, &json)
}

/// Stores the token and the user profile so later runs start signed in.
///
/// # Errors
///
/// Returns [`StorefrontError::Session`](crate::StorefrontError::Session) if
/// the keychain rejects either value.
pub fn sign_in(token: &str, user: &UserProfile) -> crate::Result<()> {
    save(SessionKey::Token, token)?;
    save_user(user)?;
    info!(user_id = user.id, "Session stored in keychain");
    Ok(())
}

/// Removes the stored token and user profile.
///
/// # Errors
///
/// Returns [`StorefrontError::Session`](crate::StorefrontError::Session) if
/// the keychain cannot be updated.
pub fn sign_out() -> crate::Result<()> {
    clear(SessionKey::Token)?;
    clear(SessionKey::User)?;
    info!("Session removed from keychain");
    Ok(())
}

/// Populates environment variables from the keychain for any session
/// values not already set in the environment.
///
/// Call this at startup before [`crate::config::fetch_config`].
pub fn populate_env_from_keychain() {
    if std::env::var(SessionKey::Token.env_var()).is_err()
        && let Some(token) = load(SessionKey::Token)
    {
        debug!(key = SessionKey::Token.env_var(), "loaded session value from keychain");
        // SAFETY: single-threaded at this point (before the runtime starts tasks)
        unsafe {
            std::env::set_var(SessionKey::Token.env_var(), token.as_str());
        }
    }

    // A cached user without a token would fail config validation.
    if std::env::var(SessionKey::User.env_var()).is_err()
        && std::env::var(SessionKey::Token.env_var()).is_ok()
        && let Some(user) = load_user()
    {
        debug!(key = SessionKey::User.env_var(), "loaded session value from keychain");
        // SAFETY: see above
        unsafe {
            std::env::set_var(SessionKey::User.env_var(), user.id.to_string());
        }
    }
}
