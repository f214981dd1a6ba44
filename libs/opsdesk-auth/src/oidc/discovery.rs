use serde::Deserialize;
use url::Url;

use crate::error::SessionError;
use crate::http_error::format_http_error;

/// The parts of the discovery document the console uses. Other fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderMetadata {
    #[serde(default)]
    pub issuer: Option<String>,
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
    #[serde(default)]
    pub end_session_endpoint: Option<Url>,
}

/// Fetch `{authority}/.well-known/openid-configuration`.
///
/// # Errors
///
/// Returns [`SessionError::Http`] if the request fails or returns a non-success
/// status, and [`SessionError::InvalidResponse`] if required endpoints are
/// missing or malformed.
pub async fn discover(
    client: &opsdesk_http::HttpClient,
    authority: &Url,
) -> Result<ProviderMetadata, SessionError> {
    let base = authority.as_str().trim_end_matches('/');
    let url = format!("{base}/.well-known/openid-configuration");

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| SessionError::Http(format_http_error(&e, "OIDC discovery")))?
        .error_for_status()
        .map_err(|e| SessionError::Http(format_http_error(&e, "OIDC discovery")))?;

    let metadata: ProviderMetadata = response
        .json()
        .await
        .map_err(|e| SessionError::InvalidResponse(format_http_error(&e, "OIDC discovery")))?;

    tracing::debug!(
        authorization_endpoint = %metadata.authorization_endpoint,
        token_endpoint = %metadata.token_endpoint,
        "OIDC provider discovered"
    );
    Ok(metadata)
}
