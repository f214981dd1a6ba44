//! TLS connector construction.

use std::sync::Arc;

use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;

use crate::config::TransportSecurity;
use crate::error::HttpError;

/// Use the process-wide rustls provider if one is installed, otherwise an
/// aws-lc-rs provider that is not installed globally.
#[must_use]
pub fn get_crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// Build an HTTPS connector backed by the bundled webpki roots.
///
/// Both HTTP/1.1 and HTTP/2 are offered through ALPN.
///
/// # Errors
///
/// Returns `HttpError::Tls` if the crypto provider rejects the default protocol versions.
pub fn build_https_connector(
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let builder = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(get_crypto_provider())
        .map_err(|e| HttpError::Tls(Box::new(e)))?;

    let connector = match transport {
        TransportSecurity::AllowInsecureHttp => {
            builder.https_or_http().enable_all_versions().build()
        }
        TransportSecurity::TlsOnly => builder.https_only().enable_all_versions().build(),
    };
    Ok(connector)
}
