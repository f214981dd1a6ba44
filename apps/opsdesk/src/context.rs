//! Wiring from configuration to a signed-in console.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use url::Url;

use console::{CompanyProvider, RestConsoleClient};
use opsdesk_auth::{AuthGateway, FileSessionStore, Navigator, OidcSession};
use opsdesk_http::{HttpClientBuilder, HttpClientConfig, TransportSecurity};
use opsdesk_sdk::{Company, ConsoleApi};

use crate::config::AppConfig;

/// Prints redirect targets for the user to open in a browser.
struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn navigate(&self, target: &Url) {
        println!("Open this URL in your browser:\n\n  {target}\n");
    }
}

/// Identity session persisted under `session.path`.
///
/// # Errors
/// Fails without an `oidc` section, or if the stored session is unreadable.
pub fn open_session(config: &AppConfig) -> Result<Arc<OidcSession>> {
    let oidc = config.oidc()?.clone();
    let mut http_config = HttpClientConfig::identity_provider();
    if config.api.allow_insecure_http {
        http_config.transport = TransportSecurity::AllowInsecureHttp;
    }
    let http = HttpClientBuilder::with_config(http_config)
        .build()
        .context("failed to build identity provider HTTP client")?;

    let path = config.session.resolved_path();
    tracing::debug!(path = %path.display(), "using session store");
    let session = OidcSession::new(
        oidc,
        http,
        Arc::new(FileSessionStore::new(path)),
        Arc::new(StdoutNavigator),
    )?;
    Ok(Arc::new(session))
}

/// Backend client plus the company selection, for commands that fetch data.
pub struct Console {
    pub api: Arc<dyn ConsoleApi>,
    pub companies: CompanyProvider,
}

impl Console {
    /// # Errors
    /// Fails if the session or the HTTP client cannot be set up.
    pub fn connect(config: &AppConfig) -> Result<Self> {
        let session = open_session(config)?;
        let http = HttpClientBuilder::with_config(config.api.http_client_config())
            .build()
            .context("failed to build backend HTTP client")?;
        let gateway = AuthGateway::new(http, session);
        let api = RestConsoleClient::new(gateway, config.api.base_url.clone());
        Ok(Self {
            api: Arc::new(api),
            companies: CompanyProvider::new(),
        })
    }

    /// Load accessible companies and select `preferred`, or the first one.
    ///
    /// # Errors
    /// Fails if the companies cannot be fetched or the user has none.
    pub async fn select_company(&self, preferred: Option<&str>) -> Result<Arc<Company>> {
        let selected = self
            .companies
            .load(self.api.as_ref(), preferred)
            .await
            .context("failed to fetch companies")?
            .context("no company is accessible to this user")?;

        if let Some(wanted) = preferred
            && wanted != selected.id
        {
            anyhow::bail!("company '{wanted}' is not accessible to this user");
        }
        Ok(selected)
    }
}

/// Cancel `token` when the user hits Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            token.cancel();
        }
    });
}
