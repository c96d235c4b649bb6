//! Application configuration loaded from environment variables.
//!
//! - `STOREFRONT_ORDERS_URL`: order and catalog service (default `http://localhost:8086`)
//! - `STOREFRONT_PAYMENTS_URL`: payment service (default `http://localhost:8087`)
//! - `STOREFRONT_TOKEN` / `STOREFRONT_USER_ID`: the signed-in session
//! - `STOREFRONT_REFRESH_SECS`: payment history refresh interval (default 30)
//! - `STOREFRONT_CA_CERT`: optional PEM file with the roots to trust

use std::path::PathBuf;
use std::time::Duration;

/// Default order service endpoint (also serves `/api/items`).
const DEFAULT_ORDERS_URL: &str = "http://localhost:8086";

/// Default payment service endpoint.
const DEFAULT_PAYMENTS_URL: &str = "http://localhost:8087";

/// Default interval between automatic payment history refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub services: ServiceEndpoints,
    pub session: SessionConfig,
    pub refresh_interval: Duration,
    pub ca_cert: Option<PathBuf>,
}

/// Base URLs of the remote collaborators, without trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub orders_url: String,
    pub payments_url: String,
}

impl ServiceEndpoints {
    /// Points both services at the same base URL (e.g. a gateway or a test server).
    #[must_use]
    pub fn single(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            orders_url: base.clone(),
            payments_url: base,
        }
    }
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            orders_url: DEFAULT_ORDERS_URL.to_string(),
            payments_url: DEFAULT_PAYMENTS_URL.to_string(),
        }
    }
}

/// Session values supplied through the environment.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub token: Option<String>,
    pub user_id: Option<i64>,
}

/// Loads the application configuration from environment variables.
///
/// The session is optional (anonymous mode) but when the token is set the
/// user id must be present too, and vice versa.
///
/// # Errors
///
/// Returns [`StorefrontError::Config`](crate::StorefrontError::Config) if
/// only one half of the session is set, the user id is not an integer, or
/// the refresh interval is not a positive number of seconds.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let orders_url = non_empty_var("STOREFRONT_ORDERS_URL")
        .unwrap_or_else(|| DEFAULT_ORDERS_URL.to_string());
    let payments_url = non_empty_var("STOREFRONT_PAYMENTS_URL")
        .unwrap_or_else(|| DEFAULT_PAYMENTS_URL.to_string());

    let token = non_empty_var("STOREFRONT_TOKEN");
    let user_id = non_empty_var("STOREFRONT_USER_ID")
        .map(|raw| {
            raw.trim().parse::<i64>().map_err(|_| {
                crate::StorefrontError::Config(format!(
                    "STOREFRONT_USER_ID must be an integer, got {raw:?}"
                ))
            })
        })
        .transpose()?;

    match (&token, &user_id) {
        (Some(_), None) => {
            return Err(crate::StorefrontError::Config(
                "STOREFRONT_TOKEN is set but STOREFRONT_USER_ID is missing".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(crate::StorefrontError::Config(
                "STOREFRONT_USER_ID is set but STOREFRONT_TOKEN is missing".to_string(),
            ));
        }
        _ => {}
    }

    let refresh_interval = match non_empty_var("STOREFRONT_REFRESH_SECS") {
        None => DEFAULT_REFRESH_INTERVAL,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(crate::StorefrontError::Config(format!(
                    "STOREFRONT_REFRESH_SECS must be a positive integer, got {raw:?}"
                )));
            }
        },
    };

    Ok(AppConfig {
        services: ServiceEndpoints {
            orders_url: orders_url.trim_end_matches('/').to_string(),
            payments_url: payments_url.trim_end_matches('/').to_string(),
        },
        session: SessionConfig { token, user_id },
        refresh_interval,
        ca_cert: non_empty_var("STOREFRONT_CA_CERT").map(PathBuf::from),
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
