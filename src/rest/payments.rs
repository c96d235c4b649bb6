//! Payment service calls.

use tracing::debug;

use super::RestClient;
use crate::Result;
use crate::models::{Listing, PaymentRecord};

impl RestClient {
    /// Lists the payments the payment service recorded for a user's
    /// confirmed orders (`GET /api/payments/confirmed-orders?userId={id}`).
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`](crate::StorefrontError) if the request
    /// fails, is rejected, or the body cannot be decoded. Through
    /// [`StoreApi`](crate::api::StoreApi) these errors become a
    /// [`FallbackReason`](crate::api::FallbackReason).
    pub async fn get_confirmed_order_payments(&self, user_id: i64) -> Result<Vec<PaymentRecord>> {
        let url = format!(
            "{}/api/payments/confirmed-orders",
            self.endpoints.payments_url
        );
        let listing: Listing<PaymentRecord> = self
            .get_json(&url, &[("userId", user_id.to_string())])
            .await?;
        let payments = listing.into_vec();
        debug!(user_id, count = payments.len(), "Fetched payments");

        Ok(payments)
    }
}
