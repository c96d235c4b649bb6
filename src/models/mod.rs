//! Shared models for the storefront REST collaborators.
//!
//! Contains the catalog, order, payment and user types plus the
//! [`Listing`] wrapper that hides whether a collection endpoint answered
//! with a bare JSON array or a page envelope.

pub mod item;
pub mod order;
pub mod payment;
pub mod user;

use serde::Deserialize;

pub use item::{Catalog, Item};
pub use order::{NewOrder, Order, OrderLine, OrderStatus};
pub use payment::{PaymentRecord, PaymentStatus};
pub use user::UserProfile;

/// A page envelope as returned by paginated collection endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub number: Option<u32>,
}

/// Body of a collection endpoint: either a bare array or a [`Page`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Page(Page<T>),
}

impl<T> Listing<T> {
    /// Normalizes either response shape into a plain sequence.
    ///
    /// Only the first page is ever requested; when the envelope reports
    /// more pages than it carries, the remainder is not fetched.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Page(page) => page.content,
        }
    }
}

impl<T> From<Listing<T>> for Vec<T> {
    fn from(listing: Listing<T>) -> Self {
        listing.into_vec()
    }
}
