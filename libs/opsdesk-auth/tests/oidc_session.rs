#![allow(clippy::unwrap_used, clippy::expect_used)]

//! OIDC session flows against a mock identity provider.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use httpmock::prelude::*;
use opsdesk_auth::{
    IdentitySession, MemorySessionStore, OidcConfig, OidcSession, ProviderMetadata,
    RecordingNavigator, SecretString, SessionError, SessionRecord, SessionStore, TokenSet,
};
use opsdesk_http::{HttpClientBuilder, HttpClientConfig};
use serde_json::json;
use time::{Duration, OffsetDateTime};
use url::Url;

fn jwt(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
    format!("{header}.{body}.sig")
}

fn future_exp() -> i64 {
    (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp()
}

fn config(server: &MockServer) -> OidcConfig {
    let mut config = OidcConfig::new(
        Url::parse(&server.base_url()).unwrap(),
        "console",
        Url::parse("http://localhost:5173/callback").unwrap(),
    );
    config.post_logout_redirect_uri = Some(Url::parse("http://localhost:5173/").unwrap());
    config
}

fn metadata(server: &MockServer) -> ProviderMetadata {
    ProviderMetadata {
        issuer: Some(server.base_url()),
        authorization_endpoint: Url::parse(&server.url("/authorize")).unwrap(),
        token_endpoint: Url::parse(&server.url("/token")).unwrap(),
        end_session_endpoint: Some(Url::parse(&server.url("/logout")).unwrap()),
    }
}

fn tokens(id_token: &str, refresh: Option<&str>, expires_at: OffsetDateTime) -> TokenSet {
    TokenSet {
        id_token: SecretString::new(id_token),
        access_token: SecretString::new("access"),
        refresh_token: refresh.map(SecretString::new),
        expires_at,
    }
}

struct Harness {
    session: OidcSession,
    navigator: RecordingNavigator,
    store: Arc<MemorySessionStore>,
}

fn harness(server: &MockServer, record: SessionRecord) -> Harness {
    let http = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
        .build()
        .unwrap();
    let navigator = RecordingNavigator::new();
    let store = Arc::new(MemorySessionStore::with_record(record));
    let session = OidcSession::new(
        config(server),
        http,
        Arc::clone(&store) as Arc<dyn SessionStore>,
        Arc::new(navigator.clone()),
    )
    .unwrap()
    .with_metadata(metadata(server));
    Harness {
        session,
        navigator,
        store,
    }
}

fn query(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

#[tokio::test]
async fn signin_redirect_navigates_to_authorization_endpoint() {
    let server = MockServer::start();
    let h = harness(&server, SessionRecord::default());

    h.session.signin_redirect().await.unwrap();

    let target = h.navigator.last().unwrap();
    assert_eq!(target.path(), "/authorize");
    assert_eq!(query(&target, "response_type").as_deref(), Some("code"));
    assert_eq!(query(&target, "client_id").as_deref(), Some("console"));
    assert_eq!(
        query(&target, "redirect_uri").as_deref(),
        Some("http://localhost:5173/callback")
    );
    assert_eq!(
        query(&target, "scope").as_deref(),
        Some("email openid phone profile")
    );
    assert_eq!(query(&target, "code_challenge_method").as_deref(), Some("S256"));
    assert!(query(&target, "code_challenge").is_some());

    let stored = h.store.load().unwrap();
    let pending = stored.pending.unwrap();
    assert_eq!(Some(pending.state), query(&target, "state"));
    assert!(!h.session.is_authenticated());
}

#[tokio::test]
async fn complete_signin_exchanges_code_for_tokens() {
    let server = MockServer::start();
    let id_token = jwt(&json!({"sub": "u1", "email": "a@x.com", "exp": future_exp()}));
    let token_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/token")
            .header("content-type", "application/x-www-form-urlencoded")
            .body_includes("grant_type=authorization_code")
            .body_includes("code=abc123")
            .body_includes("code_verifier=");
        then.status(200).json_body(json!({
            "access_token": "access-1",
            "id_token": id_token,
            "refresh_token": "refresh-1",
            "token_type": "Bearer",
            "expires_in": 3600
        }));
    });

    let h = harness(&server, SessionRecord::default());
    let auth_url = h.session.begin_signin().await.unwrap();
    let state = query(&auth_url, "state").unwrap();

    h.session
        .complete_signin(&format!("http://localhost:5173/callback?code=abc123&state={state}"))
        .await
        .unwrap();

    token_mock.assert();
    assert!(h.session.is_authenticated());
    assert_eq!(h.session.id_token().unwrap().expose(), id_token);
    assert_eq!(h.session.claims().unwrap().email.as_deref(), Some("a@x.com"));

    let stored = h.store.load().unwrap();
    assert!(stored.pending.is_none());
    assert_eq!(
        stored.tokens.unwrap().refresh_token.unwrap().expose(),
        "refresh-1"
    );
}

#[tokio::test]
async fn callback_with_wrong_state_is_rejected() {
    let server = MockServer::start();
    let token_mock = server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(200);
    });

    let h = harness(&server, SessionRecord::default());
    h.session.begin_signin().await.unwrap();

    let err = h
        .session
        .complete_signin("http://localhost:5173/callback?code=abc&state=forged")
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::StateMismatch));
    token_mock.assert_calls(0);
}

#[tokio::test]
async fn callback_without_pending_login_is_rejected() {
    let server = MockServer::start();
    let h = harness(&server, SessionRecord::default());

    let err = h
        .session
        .complete_signin("http://localhost:5173/callback?code=abc&state=s1")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NoPendingLogin));
}

#[tokio::test]
async fn callback_error_is_reported_as_provider_error() {
    let server = MockServer::start();
    let h = harness(&server, SessionRecord::default());

    let err = h
        .session
        .complete_signin(
            "http://localhost:5173/callback?error=access_denied&error_description=denied+by+user",
        )
        .await
        .unwrap_err();

    match err {
        SessionError::Provider { error, description } => {
            assert_eq!(error, "access_denied");
            assert_eq!(description.as_deref(), Some("denied by user"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn expired_token_with_refresh_is_authenticated_but_has_no_id_token() {
    let server = MockServer::start();
    let expired = OffsetDateTime::now_utc() - Duration::minutes(5);
    let h = harness(
        &server,
        SessionRecord {
            tokens: Some(tokens("old-id", Some("r1"), expired)),
            pending: None,
        },
    );

    assert!(h.session.is_authenticated());
    assert!(h.session.id_token().is_none());
}

#[tokio::test]
async fn expired_token_without_refresh_is_not_authenticated() {
    let server = MockServer::start();
    let expired = OffsetDateTime::now_utc() - Duration::minutes(5);
    let h = harness(
        &server,
        SessionRecord {
            tokens: Some(tokens("old-id", None, expired)),
            pending: None,
        },
    );

    assert!(!h.session.is_authenticated());
    let err = h.session.signin_silent().await.unwrap_err();
    assert!(matches!(err, SessionError::LoginRequired));
}

#[tokio::test]
async fn signin_silent_uses_refresh_token() {
    let server = MockServer::start();
    let new_id = jwt(&json!({"sub": "u1", "exp": future_exp()}));
    let token_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/token")
            .body_includes("grant_type=refresh_token")
            .body_includes("refresh_token=r1")
            .body_includes("client_id=console");
        then.status(200).json_body(json!({
            "access_token": "access-2",
            "id_token": new_id,
            "token_type": "Bearer"
        }));
    });

    let expired = OffsetDateTime::now_utc() - Duration::minutes(5);
    let h = harness(
        &server,
        SessionRecord {
            tokens: Some(tokens("old-id", Some("r1"), expired)),
            pending: None,
        },
    );

    h.session.signin_silent().await.unwrap();

    token_mock.assert();
    assert_eq!(h.session.id_token().unwrap().expose(), new_id);
    let stored = h.store.load().unwrap().tokens.unwrap();
    assert_eq!(stored.refresh_token.unwrap().expose(), "r1");
}

#[tokio::test]
async fn rejected_refresh_token_means_login_required() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(400)
            .json_body(json!({"error": "invalid_grant", "error_description": "expired"}));
    });

    let expired = OffsetDateTime::now_utc() - Duration::minutes(5);
    let h = harness(
        &server,
        SessionRecord {
            tokens: Some(tokens("old-id", Some("r1"), expired)),
            pending: None,
        },
    );

    let err = h.session.signin_silent().await.unwrap_err();
    assert!(matches!(err, SessionError::LoginRequired));
}

#[tokio::test]
async fn signout_clears_session_and_navigates_to_end_session() {
    let server = MockServer::start();
    let valid = OffsetDateTime::now_utc() + Duration::hours(1);
    let h = harness(
        &server,
        SessionRecord {
            tokens: Some(tokens("id-1", Some("r1"), valid)),
            pending: None,
        },
    );
    assert!(h.session.is_authenticated());

    h.session.signout_redirect().await.unwrap();

    assert!(!h.session.is_authenticated());
    assert!(h.session.id_token().is_none());
    assert!(h.store.load().unwrap().tokens.is_none());

    let target = h.navigator.last().unwrap();
    assert_eq!(target.path(), "/logout");
    assert_eq!(query(&target, "id_token_hint").as_deref(), Some("id-1"));
    assert_eq!(
        query(&target, "post_logout_redirect_uri").as_deref(),
        Some("http://localhost:5173/")
    );
}

#[tokio::test]
async fn discovery_runs_once() {
    let server = MockServer::start();
    let discovery = server.mock(|when, then| {
        when.method(GET).path("/.well-known/openid-configuration");
        then.status(200).json_body(json!({
            "issuer": server.base_url(),
            "authorization_endpoint": server.url("/authorize"),
            "token_endpoint": server.url("/token")
        }));
    });

    let http = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
        .build()
        .unwrap();
    let session = OidcSession::new(
        config(&server),
        http,
        Arc::new(MemorySessionStore::new()),
        Arc::new(RecordingNavigator::new()),
    )
    .unwrap();

    session.begin_signin().await.unwrap();
    session.begin_signin().await.unwrap();
    assert_eq!(
        session.metadata().await.unwrap().token_endpoint.path(),
        "/token"
    );
    discovery.assert_calls(1);
}
