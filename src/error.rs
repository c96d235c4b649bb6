//! Crate-level error types.
//!
//! [`StorefrontError`] unifies every error source (configuration, session,
//! HTTP transport, JSON, reconciliation) behind a single enum so callers can
//! match on the variant they care about while still using the `?` operator
//! for easy propagation.

use crate::api::FallbackReason;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum StorefrontError {
    /// Configuration could not be read or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable session (missing user, unreadable keychain entry).
    #[error("session error: {0}")]
    Session(String),

    /// TLS client configuration could not be built.
    #[error("tls error: {0}")]
    Tls(String),

    /// The request never produced an HTTP response (connect, DNS, I/O).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The collaborator rejected the bearer token (401/403).
    #[error("not authorized (HTTP {status})")]
    Auth { status: u16 },

    /// The collaborator answered with any other non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither the payment service nor the order service could be read.
    #[error("payment history unavailable: {source} (payment service: {fallback})")]
    Reconciliation {
        fallback: FallbackReason,
        #[source]
        source: Box<StorefrontError>,
    },
}

impl StorefrontError {
    /// Returns `true` for 401/403 responses.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}
