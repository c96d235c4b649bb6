//! TLS client configuration.
//!
//! By default the collaborators are trusted through the bundled webpki
//! roots. Deployments behind a private CA point `STOREFRONT_CA_CERT` at a
//! PEM file, and only the certificates in that file are trusted.

use std::path::Path;

use rustls::ClientConfig;

use crate::Result;

/// Builds a [`ClientConfig`] trusting the public webpki root set.
pub fn default_tls_config() -> ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

/// Builds a [`ClientConfig`] whose root store contains only the
/// certificates found in the PEM file at `ca_path`.
///
/// # Errors
///
/// Returns [`StorefrontError::Tls`](crate::StorefrontError::Tls) if the
/// file cannot be read, is not valid PEM, or contains no usable certificate.
pub fn build_tls_config(ca_path: &Path) -> Result<ClientConfig> {
    let pem = std::fs::read(ca_path).map_err(|e| {
        crate::StorefrontError::Tls(format!("failed to read {}: {e}", ca_path.display()))
    })?;

    let certs: Vec<_> = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| crate::StorefrontError::Tls(format!("failed to parse CA PEM: {e}")))?;

    let mut root_store = rustls::RootCertStore::empty();
    let (added, _ignored) = root_store.add_parsable_certificates(certs);
    if added == 0 {
        return Err(crate::StorefrontError::Tls(format!(
            "no usable certificate in {}",
            ca_path.display()
        )));
    }

    Ok(ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth())
}
