use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::{Mutex, OnceCell};
use url::Url;
use zeroize::Zeroizing;

use super::config::OidcConfig;
use super::discovery::{ProviderMetadata, discover};
use super::pkce::{PkceChallenge, random_state};
use super::token::{IdTokenClaims, OAuthErrorBody, TokenResponse};
use crate::error::SessionError;
use crate::http_error::format_http_error;
use crate::navigator::Navigator;
use crate::session::{IdentitySession, PendingLogin, SessionRecord, TokenSet};
use crate::store::SessionStore;
use opsdesk_utils::SecretString;

/// Identity session backed by an OIDC provider.
///
/// State lives in an `ArcSwap` so token reads never block; every change is
/// written through to the [`SessionStore`] first. Provider metadata is
/// discovered once, on first use.
pub struct OidcSession {
    config: OidcConfig,
    http: opsdesk_http::HttpClient,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    metadata: OnceCell<ProviderMetadata>,
    record: ArcSwap<SessionRecord>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for OidcSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcSession")
            .field("authority", &self.config.authority.as_str())
            .field("client_id", &self.config.client_id)
            .finish_non_exhaustive()
    }
}

impl OidcSession {
    /// Create a session and load any stored state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] for invalid settings, or
    /// [`SessionError::Storage`] if the stored session cannot be read.
    pub fn new(
        config: OidcConfig,
        http: opsdesk_http::HttpClient,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let record = store.load()?;
        Ok(Self {
            config,
            http,
            store,
            navigator,
            metadata: OnceCell::new(),
            record: ArcSwap::from_pointee(record),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Use already known endpoints instead of fetching the discovery document.
    #[must_use]
    pub fn with_metadata(self, metadata: ProviderMetadata) -> Self {
        Self {
            metadata: OnceCell::new_with(Some(metadata)),
            ..self
        }
    }

    #[must_use]
    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    /// Provider endpoints, discovered on first call.
    ///
    /// # Errors
    /// Returns [`SessionError`] if discovery fails.
    pub async fn metadata(&self) -> Result<&ProviderMetadata, SessionError> {
        self.metadata
            .get_or_try_init(|| discover(&self.http, &self.config.authority))
            .await
    }

    /// Claims of the current id token, expired or not.
    #[must_use]
    pub fn claims(&self) -> Option<IdTokenClaims> {
        let record = self.record.load();
        let tokens = record.tokens.as_ref()?;
        IdTokenClaims::decode(tokens.id_token.expose())
    }

    /// Expiry of the stored tokens.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.record.load().tokens.as_ref().map(|t| t.expires_at)
    }

    /// Build the authorization URL and remember the pending login.
    ///
    /// # Errors
    /// Returns [`SessionError`] if discovery fails or the pending login cannot be stored.
    pub async fn begin_signin(&self) -> Result<Url, SessionError> {
        let metadata = self.metadata().await?;
        let pkce = PkceChallenge::generate();
        let state = random_state();

        let mut url = metadata.authorization_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("scope", &self.config.scope())
            .append_pair("state", &state)
            .append_pair("code_challenge", &pkce.challenge)
            .append_pair("code_challenge_method", pkce.method());

        let mut record = SessionRecord::clone(&self.record.load());
        record.pending = Some(PendingLogin {
            state,
            code_verifier: pkce.verifier,
            created_at: OffsetDateTime::now_utc(),
        });
        self.commit(record)?;

        Ok(url)
    }

    /// Finish sign-in from the URL the provider redirected to.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidCallback`] for a malformed URL or missing `code`/`state`
    /// - [`SessionError::Provider`] when the callback carries an `error`
    /// - [`SessionError::NoPendingLogin`] / [`SessionError::StateMismatch`]
    /// - any token endpoint failure
    pub async fn complete_signin(&self, callback_url: &str) -> Result<(), SessionError> {
        let url = Url::parse(callback_url)
            .map_err(|e| SessionError::InvalidCallback(e.to_string()))?;

        let param = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };

        if let Some(error) = param("error") {
            return Err(SessionError::Provider {
                error,
                description: param("error_description"),
            });
        }
        let code = param("code")
            .ok_or_else(|| SessionError::InvalidCallback("missing 'code' parameter".into()))?;
        let state = param("state")
            .ok_or_else(|| SessionError::InvalidCallback("missing 'state' parameter".into()))?;

        let current = self.record.load_full();
        let pending = current.pending.as_ref().ok_or(SessionError::NoPendingLogin)?;
        if pending.state != state {
            return Err(SessionError::StateMismatch);
        }

        let redirect_uri = self.config.redirect_uri.as_str();
        let tokens = self
            .token_request(
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code.as_str()),
                    ("redirect_uri", redirect_uri),
                    ("client_id", self.config.client_id.as_str()),
                    ("code_verifier", pending.code_verifier.expose()),
                ],
                None,
            )
            .await?;

        self.commit(SessionRecord {
            tokens: Some(tokens),
            pending: None,
        })?;
        tracing::info!("sign-in completed");
        Ok(())
    }

    async fn token_request(
        &self,
        fields: &[(&str, &str)],
        previous_refresh: Option<SecretString>,
    ) -> Result<TokenSet, SessionError> {
        let metadata = self.metadata().await?;
        let response = self
            .http
            .post(metadata.token_endpoint.as_str())
            .form(fields)
            .map_err(|e| SessionError::Http(format_http_error(&e, "OIDC token")))?
            .send()
            .await
            .map_err(|e| SessionError::Http(format_http_error(&e, "OIDC token")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| SessionError::Http(format_http_error(&e, "OIDC token")))?;
            return Err(match serde_json::from_slice::<OAuthErrorBody>(&body) {
                Ok(oauth) => oauth.into_session_error(),
                Err(_) => SessionError::Http(format!("OIDC token HTTP {status}")),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SessionError::InvalidResponse(format_http_error(&e, "OIDC token")))?;
        body.into_token_set(previous_refresh, OffsetDateTime::now_utc())
    }

    fn commit(&self, record: SessionRecord) -> Result<(), SessionError> {
        self.store.save(&record)?;
        self.record.store(Arc::new(record));
        Ok(())
    }
}

#[async_trait]
impl IdentitySession for OidcSession {
    fn is_authenticated(&self) -> bool {
        self.record
            .load()
            .tokens
            .as_ref()
            .is_some_and(|t| !t.is_expired() || t.refresh_token.is_some())
    }

    fn id_token(&self) -> Option<SecretString> {
        let record = self.record.load();
        let tokens = record.tokens.as_ref()?;
        if tokens.is_expired() {
            return None;
        }
        Some(tokens.id_token.clone())
    }

    async fn signin_redirect(&self) -> Result<(), SessionError> {
        let url = self.begin_signin().await?;
        self.navigator.navigate(&url);
        Ok(())
    }

    async fn signin_silent(&self) -> Result<(), SessionError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.record.load_full();
        let refresh = current
            .tokens
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
            .ok_or(SessionError::LoginRequired)?;

        let scope = self.config.scope();
        let secret = Zeroizing::new(refresh.expose().to_owned());
        let tokens = self
            .token_request(
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", secret.as_str()),
                    ("client_id", self.config.client_id.as_str()),
                    ("scope", scope.as_str()),
                ],
                Some(refresh),
            )
            .await?;

        self.commit(SessionRecord {
            tokens: Some(tokens),
            pending: current.pending.clone(),
        })?;
        tracing::debug!("silent sign-in refreshed tokens");
        Ok(())
    }

    async fn signout_redirect(&self) -> Result<(), SessionError> {
        let previous = self.record.swap(Arc::new(SessionRecord::default()));
        self.store.clear()?;

        let end_session = match self.metadata().await {
            Ok(meta) => meta.end_session_endpoint.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "OIDC discovery failed during sign-out");
                None
            }
        };

        let target = match end_session {
            Some(mut url) => {
                {
                    let mut query = url.query_pairs_mut();
                    query.append_pair("client_id", &self.config.client_id);
                    if let Some(tokens) = &previous.tokens {
                        query.append_pair("id_token_hint", tokens.id_token.expose());
                    }
                    if let Some(post) = &self.config.post_logout_redirect_uri {
                        query.append_pair("post_logout_redirect_uri", post.as_str());
                    }
                }
                Some(url)
            }
            None => self.config.post_logout_redirect_uri.clone(),
        };

        tracing::info!("signed out");
        if let Some(url) = target {
            self.navigator.navigate(&url);
        }
        Ok(())
    }
}
