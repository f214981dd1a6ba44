#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Behaviour of the authenticated request gateway against a mock backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use httpmock::prelude::*;
use opsdesk_auth::{AuthGateway, GatewayError, IdentitySession, SecretString, SessionError};
use opsdesk_http::{HttpClient, HttpClientBuilder, HttpClientConfig, StatusCode};
use parking_lot::Mutex;
use serde_json::json;

/// Scriptable session: a current token, the token a silent refresh yields,
/// and counters for every side effect.
#[derive(Default)]
struct FakeSession {
    authenticated: AtomicBool,
    token: Mutex<Option<String>>,
    after_refresh: Option<String>,
    refresh_fails: bool,
    silent_calls: AtomicUsize,
    signouts: AtomicUsize,
}

impl FakeSession {
    fn signed_in(token: &str) -> Self {
        Self {
            authenticated: AtomicBool::new(true),
            token: Mutex::new(Some(token.to_owned())),
            ..Self::default()
        }
    }

    fn refreshing_to(mut self, token: &str) -> Self {
        self.after_refresh = Some(token.to_owned());
        self
    }

    fn failing_refresh(mut self) -> Self {
        self.refresh_fails = true;
        self
    }

    fn silent_calls(&self) -> usize {
        self.silent_calls.load(Ordering::SeqCst)
    }

    fn signouts(&self) -> usize {
        self.signouts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentitySession for FakeSession {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn id_token(&self) -> Option<SecretString> {
        self.token.lock().clone().map(SecretString::new)
    }

    async fn signin_redirect(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn signin_silent(&self) -> Result<(), SessionError> {
        self.silent_calls.fetch_add(1, Ordering::SeqCst);
        if self.refresh_fails {
            return Err(SessionError::LoginRequired);
        }
        if let Some(next) = &self.after_refresh {
            *self.token.lock() = Some(next.clone());
        }
        Ok(())
    }

    async fn signout_redirect(&self) -> Result<(), SessionError> {
        self.signouts.fetch_add(1, Ordering::SeqCst);
        self.authenticated.store(false, Ordering::SeqCst);
        *self.token.lock() = None;
        Ok(())
    }
}

fn http() -> HttpClient {
    HttpClientBuilder::with_config(HttpClientConfig::for_testing())
        .build()
        .unwrap()
}

fn gateway(session: &Arc<FakeSession>) -> AuthGateway {
    AuthGateway::new(http(), Arc::clone(session) as Arc<dyn IdentitySession>)
}

#[tokio::test]
async fn attaches_bearer_token_and_json_content_type() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/access")
            .header("authorization", "Bearer tok-1")
            .header("content-type", "application/json");
        then.status(200).json_body(json!([]));
    });

    let session = Arc::new(FakeSession::signed_in("tok-1"));
    let resp = gateway(&session)
        .get(server.url("/access"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    mock.assert();
    assert_eq!(session.silent_calls(), 0);
}

#[tokio::test]
async fn second_401_is_returned_after_exactly_one_refresh() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/company/c1/team");
        then.status(401);
    });

    let session = Arc::new(FakeSession::signed_in("tok-1"));
    let resp = gateway(&session)
        .get(server.url("/company/c1/team"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    mock.assert_calls(2);
    assert_eq!(session.silent_calls(), 1);
    assert_eq!(session.signouts(), 0);
}

#[tokio::test]
async fn retry_uses_the_refreshed_token() {
    let server = MockServer::start();
    let stale = server.mock(|when, then| {
        when.method(GET)
            .path("/access/level")
            .header("authorization", "Bearer tok-old");
        then.status(401);
    });
    let fresh = server.mock(|when, then| {
        when.method(GET)
            .path("/access/level")
            .header("authorization", "Bearer tok-new");
        then.status(200).json_body(json!(["owner", "admin"]));
    });

    let session = Arc::new(FakeSession::signed_in("tok-old").refreshing_to("tok-new"));
    let levels: Vec<String> = gateway(&session)
        .get(server.url("/access/level"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(levels, vec!["owner", "admin"]);
    stale.assert_calls(1);
    fresh.assert_calls(1);
    assert_eq!(session.silent_calls(), 1);
}

#[tokio::test]
async fn no_retry_returns_first_401() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/company/c1/team/m1");
        then.status(401);
    });

    let session = Arc::new(FakeSession::signed_in("tok-1"));
    let resp = gateway(&session)
        .delete(server.url("/company/c1/team/m1"))
        .no_retry()
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    mock.assert_calls(1);
    assert_eq!(session.silent_calls(), 0);
}

#[tokio::test]
async fn unauthenticated_session_signs_out_without_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });

    let session = Arc::new(FakeSession::default());
    let err = gateway(&session)
        .get(server.url("/access"))
        .send()
        .await
        .unwrap_err();

    assert!(err.is_signed_out());
    assert_eq!(session.signouts(), 1);
    assert_eq!(session.silent_calls(), 0);
    mock.assert_calls(0);
}

#[tokio::test]
async fn missing_token_is_refreshed_silently_before_sending() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/access")
            .header("authorization", "Bearer tok-2");
        then.status(200).json_body(json!([]));
    });

    let session = Arc::new(FakeSession {
        authenticated: AtomicBool::new(true),
        ..FakeSession::default()
    }
    .refreshing_to("tok-2"));

    let resp = gateway(&session)
        .get(server.url("/access"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(session.silent_calls(), 1);
    mock.assert();
}

#[tokio::test]
async fn no_token_after_refresh_signs_out_without_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });

    let session = Arc::new(FakeSession {
        authenticated: AtomicBool::new(true),
        ..FakeSession::default()
    });

    let result = gateway(&session).get(server.url("/access")).send().await;

    assert!(result.as_ref().is_err_and(GatewayError::is_signed_out));
    assert_eq!(session.silent_calls(), 1);
    assert_eq!(session.signouts(), 1);
    mock.assert_calls(0);
}

#[tokio::test]
async fn refresh_failure_before_sending_signs_out() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });

    let session = Arc::new(
        FakeSession {
            authenticated: AtomicBool::new(true),
            ..FakeSession::default()
        }
        .failing_refresh(),
    );

    let result = gateway(&session).get(server.url("/access")).send().await;

    assert!(result.ok().is_none());
    assert_eq!(session.signouts(), 1);
    mock.assert_calls(0);
}

#[tokio::test]
async fn refresh_failure_after_401_is_no_response_without_sign_out() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/access");
        then.status(401);
    });

    let session = Arc::new(FakeSession::signed_in("tok-1").failing_refresh());
    let err = gateway(&session)
        .get(server.url("/access"))
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Refresh(SessionError::LoginRequired)));
    assert_eq!(session.signouts(), 0);
    mock.assert_calls(1);
}

#[tokio::test]
async fn transport_failure_collapses_to_no_response() {
    let session = Arc::new(FakeSession::signed_in("tok-1"));
    let result = gateway(&session)
        .get("http://127.0.0.1:9/access")
        .send()
        .await;

    assert!(matches!(result, Err(GatewayError::Transport(_))));
    assert_eq!(session.signouts(), 0);
}

#[tokio::test]
async fn json_body_and_extra_headers_are_sent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path("/company/c1/team/m1")
            .header("authorization", "Bearer tok-1")
            .header("content-type", "application/merge-patch+json")
            .header("x-request-id", "req-7")
            .json_body(json!({"firstName": "Alice", "level": "admin"}));
        then.status(200).json_body(json!({"id": "m1"}));
    });

    let session = Arc::new(FakeSession::signed_in("tok-1"));
    let resp = gateway(&session)
        .patch(server.url("/company/c1/team/m1"))
        .json(&json!({"firstName": "Alice", "level": "admin"}))
        .header("Content-Type", "application/merge-patch+json")
        .header("x-request-id", "req-7")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    mock.assert();
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/access");
        then.status(200).json_body(json!([]));
    });

    let session = Arc::new(FakeSession::signed_in("tok-1"));
    let gw = gateway(&session);
    let url = server.url("/access");

    let (a, b) = tokio::join!(gw.get(url.clone()).send(), gw.get(url).send());
    assert_eq!(a.unwrap().status(), StatusCode::OK);
    assert_eq!(b.unwrap().status(), StatusCode::OK);
    mock.assert_calls(2);
}
