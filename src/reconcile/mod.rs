//! Payment history reconciliation.
//!
//! The payment service is the source of truth for a user's payment
//! history. When it cannot be used, [`Reconciler`] derives an equivalent
//! history from the user's confirmed orders priced against the catalog.
//! A result is always entirely one or the other; the two are never mixed.

mod derive;

use std::fmt;

use tracing::{debug, info, warn};

pub use derive::{derive_payment, derive_payments, line_amount, order_amount};

use crate::api::{FallbackReason, StoreApi};
use crate::models::{Catalog, PaymentRecord};
use crate::{Result, StorefrontError};

/// Where the records of a [`Reconciliation`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentProvenance {
    /// Returned verbatim by the payment service.
    Authoritative,
    /// Derived from orders and the catalog because the payment service
    /// could not be used.
    Derived { reason: FallbackReason },
}

impl fmt::Display for PaymentProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authoritative => write!(f, "payment service"),
            Self::Derived { reason } => write!(f, "derived from orders ({reason})"),
        }
    }
}

/// The canonical payment history for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub payments: Vec<PaymentRecord>,
    pub provenance: PaymentProvenance,
}

impl Reconciliation {
    pub fn is_derived(&self) -> bool {
        matches!(self.provenance, PaymentProvenance::Derived { .. })
    }
}

/// Produces a user's payment history from a [`StoreApi`].
#[derive(Debug)]
pub struct Reconciler<A> {
    api: A,
}

impl<A: StoreApi> Reconciler<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Returns the user's payment history.
    ///
    /// Payment service records are returned unmodified whenever the service
    /// answers, even with an empty list. Otherwise the history is derived
    /// from the user's orders; a catalog failure only zeroes the amounts.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Reconciliation`] when the payment service
    /// and the order service both fail.
    pub async fn reconcile(&self, user_id: i64) -> Result<Reconciliation> {
        match self.api.fetch_authoritative_payments(user_id).await {
            Ok(payments) => {
                debug!(user_id, count = payments.len(), "Using payment service records");
                Ok(Reconciliation {
                    payments,
                    provenance: PaymentProvenance::Authoritative,
                })
            }
            Err(reason) => {
                info!(user_id, %reason, "Payment service unavailable, deriving payments from orders");
                self.derive(user_id, reason).await
            }
        }
    }

    async fn derive(&self, user_id: i64, reason: FallbackReason) -> Result<Reconciliation> {
        let (orders, catalog) = tokio::join!(self.api.fetch_orders(user_id), self.load_catalog());

        let orders = match orders {
            Ok(orders) => orders,
            Err(e) => {
                warn!(user_id, error = %e, "Order service unavailable, cannot derive payments");
                return Err(StorefrontError::Reconciliation {
                    fallback: reason,
                    source: Box::new(e),
                });
            }
        };

        let payments = derive_payments(&orders, &catalog);
        debug!(
            user_id,
            orders = orders.len(),
            derived = payments.len(),
            catalog_size = catalog.len(),
            "Derived payment history"
        );

        Ok(Reconciliation {
            payments,
            provenance: PaymentProvenance::Derived { reason },
        })
    }

    /// Fetches the catalog, treating any failure as an empty catalog.
    async fn load_catalog(&self) -> Catalog {
        match self.api.fetch_items().await {
            Ok(items) => Catalog::from(items.as_slice()),
            Err(e) => {
                warn!(error = %e, "Catalog unavailable, derived amounts fall back to zero");
                Catalog::empty()
            }
        }
    }
}
