//! Storefront REST client library.
//!
//! Provides typed models and async fetchers for the order, catalog and
//! payment services, plus the payment history reconciliation engine and
//! its refresh scheduler. When the payment service is unavailable the
//! history is derived from confirmed orders priced against the catalog.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod refresh;
pub mod rest;
pub mod session;
pub mod tls;

pub use error::{Result, StorefrontError};
