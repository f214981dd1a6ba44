use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::SessionError;
use opsdesk_utils::SecretString;

/// Seconds before the recorded expiry at which a token is already treated as
/// expired, so it does not run out in flight.
pub const EXPIRY_LEEWAY: Duration = Duration::seconds(30);

/// Signed-in user's session as seen by the request gateway.
///
/// `is_authenticated` and `id_token` are cheap, synchronous reads of local
/// state. The three redirect/refresh operations may talk to the provider and
/// may navigate away from the console.
#[async_trait]
pub trait IdentitySession: Send + Sync {
    /// A session exists and can still produce a token, either directly or
    /// through a silent refresh.
    fn is_authenticated(&self) -> bool;

    /// Current identity token, `None` when missing or expired.
    fn id_token(&self) -> Option<SecretString>;

    /// Start interactive sign-in.
    ///
    /// # Errors
    /// Returns [`SessionError`] if the provider cannot be reached or the pending
    /// login cannot be stored.
    async fn signin_redirect(&self) -> Result<(), SessionError>;

    /// Obtain fresh tokens without user interaction.
    ///
    /// # Errors
    /// Returns [`SessionError::LoginRequired`] when interactive sign-in is
    /// needed, or another [`SessionError`] on provider failure.
    async fn signin_silent(&self) -> Result<(), SessionError>;

    /// Drop the session and navigate to the provider's sign-out page.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] if the stored session cannot be removed.
    async fn signout_redirect(&self) -> Result<(), SessionError>;
}

/// Tokens returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    #[serde(with = "secret")]
    pub id_token: SecretString,
    #[serde(with = "secret")]
    pub access_token: SecretString,
    #[serde(default, with = "secret_opt", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<SecretString>,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl TokenSet {
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now + EXPIRY_LEEWAY >= self.expires_at
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }
}

/// Authorization request that is waiting for its callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLogin {
    pub state: String,
    #[serde(with = "secret")]
    pub code_verifier: SecretString,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Everything persisted between console runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingLogin>,
}

mod secret {
    use opsdesk_utils::SecretString;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &SecretString, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.expose())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
        String::deserialize(d).map(SecretString::from)
    }
}

mod secret_opt {
    use opsdesk_utils::SecretString;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<SecretString>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_some(v.expose()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.map(SecretString::from))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn tokens(expires_at: OffsetDateTime) -> TokenSet {
        TokenSet {
            id_token: SecretString::new("id"),
            access_token: SecretString::new("access"),
            refresh_token: Some(SecretString::new("refresh")),
            expires_at,
        }
    }

    #[test]
    fn expiry_honours_leeway() {
        let now = OffsetDateTime::now_utc();
        assert!(!tokens(now + Duration::minutes(5)).is_expired_at(now));
        assert!(tokens(now + Duration::seconds(10)).is_expired_at(now));
        assert!(tokens(now - Duration::seconds(1)).is_expired_at(now));
    }

    #[test]
    fn record_serializes_secrets_but_debug_redacts_them() {
        let record = SessionRecord {
            tokens: Some(tokens(OffsetDateTime::UNIX_EPOCH)),
            pending: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""refresh_token":"refresh""#), "{json}");
        assert!(!json.contains("pending"));

        let dbg = format!("{record:?}");
        assert!(!dbg.contains("refresh\""), "{dbg}");

        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        let t = back.tokens.unwrap();
        assert_eq!(t.id_token.expose(), "id");
        assert_eq!(t.expires_at, OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn missing_refresh_token_decodes_as_none() {
        let json = r#"{"tokens":{"id_token":"i","access_token":"a","expires_at":"2030-01-01T00:00:00Z"}}"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert!(record.tokens.unwrap().refresh_token.is_none());
    }
}
