//! The collaborator seam the reconciliation engine is written against.
//!
//! [`StoreApi`] bundles the three collection fetches. [`RestClient`](crate::rest::RestClient)
//! implements it over HTTP; tests substitute an in-memory double.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, StorefrontError};
use crate::models::{Item, Order, PaymentRecord};

/// Why the payment service could not be used for this reconciliation run.
///
/// This is an expected outcome of
/// [`StoreApi::fetch_authoritative_payments`], not an error: it selects
/// the derivation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No HTTP response was received.
    Unreachable(String),
    /// The service rejected the bearer token.
    Unauthorized { status: u16 },
    /// The service answered with another non-success status.
    Status { status: u16 },
    /// The body was not a list of payment records.
    Malformed(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(cause) => write!(f, "unreachable: {cause}"),
            Self::Unauthorized { status } => write!(f, "unauthorized (HTTP {status})"),
            Self::Status { status } => write!(f, "HTTP {status}"),
            Self::Malformed(cause) => write!(f, "malformed response: {cause}"),
        }
    }
}

impl From<StorefrontError> for FallbackReason {
    fn from(err: StorefrontError) -> Self {
        match err {
            StorefrontError::Auth { status } => Self::Unauthorized { status },
            StorefrontError::Status { status, .. } => Self::Status { status },
            StorefrontError::Json(e) => Self::Malformed(e.to_string()),
            other => Self::Unreachable(other.to_string()),
        }
    }
}

/// Read access to the order, catalog and payment collaborators.
///
/// Every future must be `Send` so reconciliation runs can be spawned onto
/// the runtime by the [`refresh`](crate::refresh) scheduler.
pub trait StoreApi: Send + Sync + 'static {
    /// Lists all orders of a user.
    fn fetch_orders(&self, user_id: i64) -> impl Future<Output = Result<Vec<Order>>> + Send;

    /// Lists the whole catalog.
    fn fetch_items(&self) -> impl Future<Output = Result<Vec<Item>>> + Send;

    /// Lists the user's payments as recorded by the payment service.
    fn fetch_authoritative_payments(
        &self,
        user_id: i64,
    ) -> impl Future<Output = std::result::Result<Vec<PaymentRecord>, FallbackReason>> + Send;
}

impl<T: StoreApi> StoreApi for Arc<T> {
    fn fetch_orders(&self, user_id: i64) -> impl Future<Output = Result<Vec<Order>>> + Send {
        (**self).fetch_orders(user_id)
    }

    fn fetch_items(&self) -> impl Future<Output = Result<Vec<Item>>> + Send {
        (**self).fetch_items()
    }

    fn fetch_authoritative_payments(
        &self,
        user_id: i64,
    ) -> impl Future<Output = std::result::Result<Vec<PaymentRecord>, FallbackReason>> + Send {
        (**self).fetch_authoritative_payments(user_id)
    }
}
