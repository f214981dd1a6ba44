use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::error::SessionError;
use crate::session::TokenSet;
use opsdesk_utils::SecretString;

/// Lifetime assumed when neither the id token nor the response say.
const DEFAULT_TOKEN_TTL: Duration = Duration::hours(1);

/// Token endpoint response.
///
/// Deserialize-only so tokens cannot be serialized back into logs.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// OAuth error body (RFC 6749 section 5.2).
#[derive(Debug, Deserialize)]
pub(crate) struct OAuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl OAuthErrorBody {
    pub(crate) fn into_session_error(self) -> SessionError {
        match self.error.as_str() {
            "invalid_grant" | "login_required" | "interaction_required" => {
                SessionError::LoginRequired
            }
            _ => SessionError::Provider {
                error: self.error,
                description: self.error_description,
            },
        }
    }
}

/// Unverified claims read from the id token payload.
///
/// The token arrives over TLS straight from the token endpoint; the console
/// only reads these for display and expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl IdTokenClaims {
    /// Decode the payload segment of a compact JWT.
    #[must_use]
    pub fn decode(token: &str) -> Option<Self> {
        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.exp?).ok()
    }
}

impl TokenResponse {
    /// Turn the response into a stored token set.
    ///
    /// `previous_refresh` is kept when the provider does not rotate refresh
    /// tokens.
    pub(crate) fn into_token_set(
        self,
        previous_refresh: Option<SecretString>,
        now: OffsetDateTime,
    ) -> Result<TokenSet, SessionError> {
        if let Some(tt) = &self.token_type
            && !tt.eq_ignore_ascii_case("bearer")
        {
            return Err(SessionError::InvalidResponse(format!(
                "unsupported token type: {tt}"
            )));
        }

        let id_token = self.id_token.ok_or_else(|| {
            SessionError::InvalidResponse("token response carried no id_token".into())
        })?;

        let from_response = self
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| now + Duration::seconds(secs));
        let expires_at = IdTokenClaims::decode(&id_token)
            .and_then(|c| c.expires_at())
            .or(from_response)
            .unwrap_or(now + DEFAULT_TOKEN_TTL);

        Ok(TokenSet {
            id_token: SecretString::new(id_token),
            access_token: SecretString::new(self.access_token),
            refresh_token: self.refresh_token.map(SecretString::new).or(previous_refresh),
            expires_at,
        })
    }
}
