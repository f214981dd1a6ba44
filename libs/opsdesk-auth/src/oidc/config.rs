use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SessionError;

/// Scopes requested when the configuration does not name any.
pub const DEFAULT_SCOPES: [&str; 4] = ["email", "openid", "phone", "profile"];

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| (*s).to_owned()).collect()
}

/// Static identity provider settings.
///
/// ```yaml
/// oidc:
///   authority: https://auth.example.com/realms/opsdesk
///   client_id: opsdesk-console
///   redirect_uri: http://localhost:5173/callback
///   post_logout_redirect_uri: http://localhost:5173/
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OidcConfig {
    /// Issuer base URL; discovery is fetched from
    /// `{authority}/.well-known/openid-configuration`.
    pub authority: Url,

    pub client_id: String,

    /// Where the provider sends the browser after sign-in.
    pub redirect_uri: Url,

    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Where to land after sign-out when the provider has no end-session
    /// endpoint, and the `post_logout_redirect_uri` sent to it when it does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_logout_redirect_uri: Option<Url>,
}

impl OidcConfig {
    #[must_use]
    pub fn new(authority: Url, client_id: impl Into<String>, redirect_uri: Url) -> Self {
        Self {
            authority,
            client_id: client_id.into(),
            redirect_uri,
            scopes: default_scopes(),
            post_logout_redirect_uri: None,
        }
    }

    /// Space-joined scope string for the authorization request.
    #[must_use]
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    /// # Errors
    /// Returns [`SessionError::Config`] for an empty client id, a scope list
    /// without `openid`, or a non-HTTP authority.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.client_id.trim().is_empty() {
            return Err(SessionError::Config("client_id must not be empty".into()));
        }
        if !self.scopes.iter().any(|s| s == "openid") {
            return Err(SessionError::Config("scopes must include 'openid'".into()));
        }
        if !matches!(self.authority.scheme(), "http" | "https") {
            return Err(SessionError::Config(format!(
                "authority must be an http(s) URL, got scheme '{}'",
                self.authority.scheme()
            )));
        }
        Ok(())
    }
}
