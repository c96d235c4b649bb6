//! Order service calls.

use tracing::{debug, info};

use super::RestClient;
use crate::Result;
use crate::models::{Listing, NewOrder, Order};

impl RestClient {
    /// Lists all orders of a user (`GET /api/orders?userId={id}`).
    ///
    /// Accepts either a bare array or a page envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`](crate::StorefrontError) if the request
    /// fails, is rejected, or the body cannot be decoded.
    pub async fn get_orders(&self, user_id: i64) -> Result<Vec<Order>> {
        let url = format!("{}/api/orders", self.endpoints.orders_url);
        let listing: Listing<Order> = self
            .get_json(&url, &[("userId", user_id.to_string())])
            .await?;
        let orders = listing.into_vec();
        debug!(user_id, count = orders.len(), "Fetched orders");

        Ok(orders)
    }

    /// Places an order (`POST /api/orders`) and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`](crate::StorefrontError) if the request
    /// fails, is rejected, or the body cannot be decoded.
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order> {
        let url = format!("{}/api/orders", self.endpoints.orders_url);
        debug!(method = "POST", %url, "Sending request");
        let request = self.http.post(&url).json(order);
        let created: Order = self.send_json(request, &url).await?;
        info!(order_id = created.id, lines = order.items.len(), "Order placed");

        Ok(created)
    }

    /// Replaces an order (`PUT /api/orders/{id}`) and returns the stored version.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`](crate::StorefrontError) if the request
    /// fails, is rejected, or the body cannot be decoded.
    pub async fn update_order(&self, order_id: i64, order: &Order) -> Result<Order> {
        let url = format!("{}/api/orders/{order_id}", self.endpoints.orders_url);
        debug!(method = "PUT", %url, "Sending request");
        let request = self.http.put(&url).json(order);
        self.send_json(request, &url).await
    }

    /// Marks a pending order as paid by moving it to `CONFIRMED`.
    ///
    /// # Errors
    ///
    /// See [`RestClient::update_order`].
    pub async fn confirm_order(&self, order: &Order) -> Result<Order> {
        let confirmed = self.update_order(order.id, &order.to_confirmed()).await?;
        info!(order_id = confirmed.id, "Order confirmed");

        Ok(confirmed)
    }

    /// Deletes an order (`DELETE /api/orders/{id}`).
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError`](crate::StorefrontError) if the request
    /// fails or is rejected.
    pub async fn delete_order(&self, order_id: i64) -> Result<()> {
        let url = format!("{}/api/orders/{order_id}", self.endpoints.orders_url);
        debug!(method = "DELETE", %url, "Sending request");
        self.send(self.http.delete(&url), &url).await?;
        info!(order_id, "Order deleted");

        Ok(())
    }
}
