//! HTTP client for the storefront collaborators.
//!
//! This module is organized by collaborator:
//! - [`orders`] - Order listing and lifecycle calls
//! - [`catalog`] - Catalog listing
//! - [`payments`] - Payment service listing
//!
//! [`RestClient`] implements [`StoreApi`] on top of these calls.

mod catalog;
mod orders;
mod payments;

use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::{FallbackReason, StoreApi};
use crate::config::{AppConfig, ServiceEndpoints};
use crate::models::{Item, Order, PaymentRecord};
use crate::session::SessionContext;
use crate::{Result, StorefrontError};

/// Typed client for the order, catalog and payment services.
///
/// Every request carries the session's bearer token when one is present.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    endpoints: ServiceEndpoints,
    session: SessionContext,
}

impl RestClient {
    /// Creates a client trusting the given TLS roots, or the default webpki
    /// roots when `tls_config` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Tls`] if the HTTP client cannot be built.
    pub fn new(
        endpoints: ServiceEndpoints,
        session: SessionContext,
        tls_config: Option<rustls::ClientConfig>,
    ) -> Result<Self> {
        let tls_config = tls_config.unwrap_or_else(crate::tls::default_tls_config);
        let http = reqwest::Client::builder()
            .use_preconfigured_tls(tls_config)
            .build()
            .map_err(|e| StorefrontError::Tls(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoints,
            session,
        })
    }

    /// Creates a client from loaded configuration and an explicit session.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Tls`] if the configured CA file is unusable.
    pub fn from_config(config: &AppConfig, session: SessionContext) -> Result<Self> {
        let tls_config = config
            .ca_cert
            .as_deref()
            .map(crate::tls::build_tls_config)
            .transpose()?;
        Self::new(config.services.clone(), session, tls_config)
    }

    /// Attaches the bearer token, if any.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.bearer() {
            Some(bearer) => request.header(AUTHORIZATION, bearer),
            None => request,
        }
    }

    /// Sends a request and maps non-success statuses to errors.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%url, status = status.as_u16(), "Request not authorized");
            return Err(StorefrontError::Auth {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Request failed");
            return Err(StorefrontError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    /// Sends a request and decodes the JSON body.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        let response = self.send(request, url).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// `GET` helper for collection and entity endpoints.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(method = "GET", %url, "Sending request");
        let request = self.http.get(url).query(query);
        self.send_json(request, url).await
    }
}

impl StoreApi for RestClient {
    async fn fetch_orders(&self, user_id: i64) -> Result<Vec<Order>> {
        self.get_orders(user_id).await
    }

    async fn fetch_items(&self) -> Result<Vec<Item>> {
        self.get_items().await
    }

    async fn fetch_authoritative_payments(
        &self,
        user_id: i64,
    ) -> std::result::Result<Vec<PaymentRecord>, FallbackReason> {
        self.get_confirmed_order_payments(user_id)
            .await
            .map_err(FallbackReason::from)
    }
}
