//! Configuration file support for stargaze.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `STARGAZE_`)
//! 3. Config file (./stargaze.toml, then ~/.config/stargaze/config.toml)
//! 4. Built-in defaults
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `STARGAZE_FETCH__BATCH_SIZE=25`. The token is also read from the flat
//! `STARGAZE_GITHUB_TOKEN`.
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use STARGAZE_GITHUB_TOKEN env var
//! require_token = false
//!
//! [fetch]
//! batch_size = 50
//! inter_batch_delay_ms = 2000
//! max_retries = 3
//! retry_delay_ms = 2000
//! rate_limit_cooldown_secs = 60
//! requests_per_second = 0  # 0 disables proactive pacing
//! timeout_secs = 30
//!
//! [export]
//! output_dir = "."
//! xlsx = false
//! quote_csv = false
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use stargaze::enrich::{DEFAULT_BATCH_SIZE, DEFAULT_INTER_BATCH_DELAY_MS};
use stargaze::github::{DEFAULT_TIMEOUT_SECS, GITHUB_API_URL};
use stargaze::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RATE_LIMIT_COOLDOWN_SECS, DEFAULT_RETRY_DELAY_MS};
use stargaze::{ClientConfig, Credential, EnrichOptions, RetryPolicy};

const TOKEN_ENV: &str = "STARGAZE_GITHUB_TOKEN";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub fetch: FetchConfig,
    pub export: ExportConfig,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    /// Can also be set via STARGAZE_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
    /// Refuse to run without a token.
    pub require_token: bool,
    pub api_base: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            require_token: false,
            api_base: GITHUB_API_URL.to_string(),
        }
    }
}

/// Request pacing and retry options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Profiles resolved concurrently per batch.
    pub batch_size: usize,
    pub inter_batch_delay_ms: u64,
    /// Attempts per request for transient failures.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Cooldown after a 403 without a usable reset header.
    pub rate_limit_cooldown_secs: u64,
    /// Proactive pacing; 0 disables it.
    pub requests_per_second: u32,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay_ms: DEFAULT_INTER_BATCH_DELAY_MS,
            max_retries: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            rate_limit_cooldown_secs: DEFAULT_RATE_LIMIT_COOLDOWN_SECS,
            requests_per_second: 0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Default export options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the CSV/XLSX files are written to.
    pub output_dir: PathBuf,
    /// Also write an XLSX workbook.
    pub xlsx: bool,
    /// Quote CSV cells containing separators.
    pub quote_csv: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            xlsx: false,
            quote_csv: false,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/stargaze/config.toml)
    /// 3. Local config file (./stargaze.toml)
    /// 4. Environment variables with STARGAZE_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("stargaze.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./stargaze.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        match Self::build(builder, std::env::var(TOKEN_ENV).ok()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}", e);
                Config::default()
            }
        }
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        env_token: Option<String>,
    ) -> Result<Self, ConfigError> {
        // STARGAZE_FETCH__BATCH_SIZE -> fetch.batch_size
        let builder = builder
            .add_source(
                Environment::with_prefix("STARGAZE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("github.token", env_token)?;

        builder.build()?.try_deserialize()
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "stargaze").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The token to use: the flag wins over configuration.
    pub fn github_token(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string).or_else(|| self.github.token.clone())
    }

    /// Client configuration for this config plus an optional token override.
    pub fn client_config(&self, token: Option<&str>) -> ClientConfig {
        let fetch = &self.fetch;
        ClientConfig {
            api_base: self.github.api_base.clone(),
            credential: self.github_token(token).as_deref().and_then(Credential::new),
            retry: RetryPolicy::new(
                fetch.max_retries,
                Duration::from_millis(fetch.retry_delay_ms),
                Duration::from_secs(fetch.rate_limit_cooldown_secs),
            ),
            requests_per_second: (fetch.requests_per_second > 0)
                .then_some(fetch.requests_per_second),
            timeout: Duration::from_secs(fetch.timeout_secs),
        }
    }

    /// Enrichment options, with an optional batch size override.
    pub fn enrich_options(&self, batch_size: Option<usize>) -> EnrichOptions {
        EnrichOptions {
            batch_size: batch_size.unwrap_or(self.fetch.batch_size),
            inter_batch_delay: Duration::from_millis(self.fetch.inter_batch_delay_ms),
        }
    }
}
