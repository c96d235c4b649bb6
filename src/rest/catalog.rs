//! Catalog service calls.

use tracing::debug;

use super::RestClient;
use crate::Result;
use crate::models::{Item, Listing};

impl RestClient {
    /// Lists the catalog (`GET /api/items`).
    ///
    /// Accepts either a bare array or a page envelope. Only the first page
    /// is read.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`](crate::StorefrontError) if the request
    /// fails, is rejected, or the body cannot be decoded.
    pub async fn get_items(&self) -> Result<Vec<Item>> {
        let url = format!("{}/api/items", self.endpoints.orders_url);
        let listing: Listing<Item> = self.get_json(&url, &[]).await?;
        let items = listing.into_vec();
        debug!(count = items.len(), "Fetched catalog");

        Ok(items)
    }
}
