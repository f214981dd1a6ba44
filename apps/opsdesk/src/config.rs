//! Layered application configuration.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. the YAML file given with `--config`
//! 3. `OPSDESK__*` environment variables, `__` separating sections
//!    (`OPSDESK__API__BASE_URL=https://api.example.com`)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use console::ApiConfig;
use opsdesk_auth::OidcConfig;

pub const ENV_PREFIX: &str = "OPSDESK__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    /// Identity provider. Commands that talk to the backend need it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc: Option<OidcConfig>,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Where tokens are persisted. Defaults to `<config dir>/opsdesk/session.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl SessionConfig {
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("opsdesk")
                .join("session.json")
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "warn".to_owned()
}

impl AppConfig {
    /// Merge defaults, the optional YAML file and the environment.
    ///
    /// # Errors
    /// Fails if `path` does not exist or any source holds invalid values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::figment(path)?
            .extract()
            .context("invalid configuration")
    }

    fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Identity provider settings, or an error naming the missing section.
    ///
    /// # Errors
    /// Fails when no `oidc` section is configured.
    pub fn oidc(&self) -> Result<&OidcConfig> {
        self.oidc
            .as_ref()
            .context("no `oidc` section configured (set it in the config file or OPSDESK__OIDC__*)")
    }

    /// Semantic checks beyond what deserialization enforces.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        let scheme = self.api.base_url.scheme();
        if scheme != "https" && !(scheme == "http" && self.api.allow_insecure_http) {
            anyhow::bail!(
                "api.base_url must use https (or set api.allow_insecure_http), got '{}'",
                self.api.base_url
            );
        }
        if self.api.timeout.is_zero() {
            anyhow::bail!("api.timeout must be greater than zero");
        }
        if let Some(oidc) = &self.oidc {
            oidc.validate().context("invalid oidc section")?;
        }
        Ok(())
    }

    /// Render as YAML.
    ///
    /// # Errors
    /// Fails if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration as YAML")
    }
}
