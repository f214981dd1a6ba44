//! Authenticated request gateway.
//!
//! Every backend call from the console goes through [`AuthGateway`]:
//!
//! 1. The session is asked for an identity token. If the user is not
//!    authenticated, or no token exists even after one silent refresh, the
//!    gateway signs the user out and returns [`GatewayError::SignedOut`]
//!    without sending anything.
//! 2. The request carries `Authorization: Bearer <id_token>` and
//!    `Content-Type: application/json`. Caller headers override both.
//! 3. A 401 on the first attempt triggers one silent refresh and one retry.
//!    A 401 on the last attempt is handed back as a normal response.
//!
//! Nothing else is retried, cached or deduplicated.

use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use serde::Serialize;
use zeroize::Zeroizing;

use crate::error::GatewayError;
use crate::session::IdentitySession;
use opsdesk_http::{HttpClient, HttpResponse};
use opsdesk_utils::SecretString;

/// Upper bound on attempts per request: the original one plus one retry after 401.
pub const MAX_ATTEMPTS: u32 = 2;

/// Sends backend requests on behalf of the signed-in user.
///
/// Cheap to clone; clones share the HTTP client and the session.
#[derive(Clone)]
pub struct AuthGateway {
    http: HttpClient,
    session: Arc<dyn IdentitySession>,
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway").finish_non_exhaustive()
    }
}

impl AuthGateway {
    #[must_use]
    pub fn new(http: HttpClient, session: Arc<dyn IdentitySession>) -> Self {
        Self { http, session }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<dyn IdentitySession> {
        &self.session
    }

    pub fn request(&self, method: Method, url: impl Into<String>) -> GatewayRequest {
        GatewayRequest {
            gateway: self.clone(),
            method,
            url: url.into(),
            body: Ok(None),
            headers: Vec::new(),
            allow_retry: true,
        }
    }

    pub fn get(&self, url: impl Into<String>) -> GatewayRequest {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: impl Into<String>) -> GatewayRequest {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: impl Into<String>) -> GatewayRequest {
        self.request(Method::PUT, url)
    }

    pub fn patch(&self, url: impl Into<String>) -> GatewayRequest {
        self.request(Method::PATCH, url)
    }

    pub fn delete(&self, url: impl Into<String>) -> GatewayRequest {
        self.request(Method::DELETE, url)
    }

    /// Current token, refreshing silently once if the session has none.
    async fn bearer_token(&self) -> Option<SecretString> {
        if !self.session.is_authenticated() {
            return None;
        }
        if let Some(token) = self.session.id_token() {
            return Some(token);
        }

        tracing::warn!("identity token expired or missing, attempting silent refresh");
        if let Err(e) = self.session.signin_silent().await {
            tracing::error!(error = %e, "silent token refresh failed");
            return None;
        }
        self.session.id_token()
    }

    async fn sign_out(&self) -> GatewayError {
        tracing::error!("no valid identity token available, signing out");
        if let Err(e) = self.session.signout_redirect().await {
            tracing::error!(error = %e, "sign-out redirect failed");
        }
        GatewayError::SignedOut
    }
}

/// One gateway request, built fluently and sent with [`send`](Self::send).
#[must_use = "GatewayRequest does nothing until .send() is called"]
pub struct GatewayRequest {
    gateway: AuthGateway,
    method: Method,
    url: String,
    body: Result<Option<Bytes>, serde_json::Error>,
    headers: Vec<(String, String)>,
    allow_retry: bool,
}

impl GatewayRequest {
    /// JSON body. A serialization failure is reported by `send()`.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.body = serde_json::to_vec(body).map(|v| Some(Bytes::from(v)));
        self
    }

    /// Extra header, merged over the defaults (case-insensitive).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Return a 401 as-is instead of refreshing and retrying.
    pub fn no_retry(mut self) -> Self {
        self.allow_retry = false;
        self
    }

    /// Send the request.
    ///
    /// Every HTTP status, 401 included, comes back as `Ok`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::SignedOut`] when no token could be obtained (nothing was sent)
    /// - [`GatewayError::Refresh`] when the silent refresh after a 401 failed
    /// - [`GatewayError::Transport`] when the request could not be sent
    /// - [`GatewayError::Encode`] when the JSON body could not be serialized
    pub async fn send(self) -> Result<HttpResponse, GatewayError> {
        let body = self.body.map_err(GatewayError::Encode)?;
        let gateway = &self.gateway;
        let attempts = if self.allow_retry { MAX_ATTEMPTS } else { 1 };

        let mut attempt = 1;
        loop {
            let Some(token) = gateway.bearer_token().await else {
                return Err(gateway.sign_out().await);
            };

            let response = send_once(
                &gateway.http,
                &self.method,
                &self.url,
                &token,
                &self.headers,
                body.clone(),
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    method = %self.method,
                    url = %self.url,
                    error = %e,
                    "API request failed"
                );
                GatewayError::Transport(e)
            })?;

            if response.status() != StatusCode::UNAUTHORIZED || attempt >= attempts {
                return Ok(response);
            }

            tracing::warn!(
                method = %self.method,
                url = %self.url,
                attempt,
                "unauthorized, retrying with refreshed token"
            );
            gateway.session.signin_silent().await.map_err(|e| {
                tracing::error!(error = %e, "silent token refresh after 401 failed");
                GatewayError::Refresh(e)
            })?;
            attempt += 1;
        }
    }
}

async fn send_once(
    http: &HttpClient,
    method: &Method,
    url: &str,
    token: &SecretString,
    extra: &[(String, String)],
    body: Option<Bytes>,
) -> Result<HttpResponse, opsdesk_http::HttpError> {
    let bearer = Zeroizing::new(format!("Bearer {}", token.expose()));
    let headers = merge_headers(
        &[
            ("authorization", bearer.as_str()),
            ("content-type", "application/json"),
        ],
        extra,
    );

    let mut request = http.request(method.clone(), url).headers(headers);
    if let Some(body) = body {
        request = request.body_bytes(body);
    }
    request.send().await
}

/// Defaults first, then caller headers; a caller header replaces a default
/// with the same name.
fn merge_headers<'a>(
    defaults: &[(&'a str, &'a str)],
    extra: &'a [(String, String)],
) -> Vec<(&'a str, &'a str)> {
    let mut merged: Vec<(&str, &str)> = defaults.to_vec();
    for (name, value) in extra {
        match merged.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(slot) => *slot = (name.as_str(), value.as_str()),
            None => merged.push((name.as_str(), value.as_str())),
        }
    }
    merged
}
