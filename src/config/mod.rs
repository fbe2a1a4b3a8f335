//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments.

use reqwest::header::HeaderName;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::core::constants::{defaults, http, timeouts};
use crate::core::error::{Result, RouteProbeError};
use crate::discovery::handler::HandlerContext;
use crate::discovery::registry::RouteHandlerRegistry;
use crate::discovery::render::UrlRenderer;
use crate::discovery::source::ParameterCatalog;
use crate::validation::batch::BatchRunner;
use crate::validation::probe::TransportSettings;
use crate::validation::rate_limit::RateLimiter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL prepended to every generated path
    pub base_url: Option<String>,

    /// Route table file (TOML or JSON)
    pub routes_file: Option<String>,

    /// Timeout in seconds for HTTP requests
    pub timeout: Option<u64>,

    /// URLs per batch progress unit
    pub chunk_size: Option<usize>,

    /// Probes in flight within one chunk
    pub concurrency: Option<usize>,

    /// Minimum delay between request starts in milliseconds
    pub rate_limit_delay: Option<u64>,

    /// Custom User-Agent header
    pub user_agent: Option<String>,

    /// Response header carrying the cache status
    pub cache_header: Option<String>,

    /// Verify TLS certificates
    pub verify_ssl: Option<bool>,

    /// Follow HTTP redirects while probing
    pub follow_redirects: Option<bool>,

    /// Upper bound on candidate values per placeholder
    pub max_parameter_values: Option<usize>,

    /// Enable verbose logging
    pub verbose: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            routes_file: None,
            timeout: Some(timeouts::DEFAULT_TIMEOUT_SECONDS),
            chunk_size: Some(defaults::CHUNK_SIZE),
            concurrency: Some(defaults::CONCURRENCY),
            rate_limit_delay: Some(timeouts::DEFAULT_RATE_LIMIT_MS),
            user_agent: None,
            cache_header: Some(http::DEFAULT_CACHE_HEADER.to_string()),
            verify_ssl: Some(defaults::VERIFY_SSL),
            follow_redirects: Some(defaults::FOLLOW_REDIRECTS),
            max_parameter_values: Some(defaults::MAX_PARAMETER_VALUES),
            verbose: Some(false),
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RouteProbeError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            RouteProbeError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load the first config file found in the current directory or up to
    /// three parents. A file that exists but does not parse is an error.
    pub fn load_from_standard_locations() -> Result<Self> {
        for path in Self::standard_locations() {
            if path.is_file() {
                log::debug!("Using config file {}", path.display());
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    fn standard_locations() -> Vec<PathBuf> {
        (0..=3)
            .map(|depth| {
                PathBuf::from(format!(
                    "{}{}",
                    "../".repeat(depth),
                    defaults::CONFIG_FILE_NAME
                ))
            })
            .collect()
    }

    /// Resolve the configuration for a CLI invocation: `--config` wins over
    /// standard locations, `--no-config` skips files entirely.
    pub fn resolve(cli_config: &CliConfig) -> Result<Self> {
        let mut config = if cli_config.no_config {
            Self::default()
        } else if let Some(ref path) = cli_config.config_file {
            Self::load_from_file(path)?
        } else {
            Self::load_from_standard_locations()?
        };

        config.merge_with_cli(cli_config);
        config.validate()?;
        Ok(config)
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Sources
        if let Some(ref base_url) = cli_config.base_url {
            self.base_url = Some(base_url.clone());
        }
        if let Some(ref routes_file) = cli_config.routes_file {
            self.routes_file = Some(routes_file.clone());
        }

        // Batching
        if let Some(timeout) = cli_config.timeout {
            self.timeout = Some(timeout);
        }
        if let Some(chunk_size) = cli_config.chunk_size {
            self.chunk_size = Some(chunk_size);
        }
        if let Some(concurrency) = cli_config.concurrency {
            self.concurrency = Some(concurrency);
        }
        if let Some(rate_limit_delay) = cli_config.rate_limit_delay {
            self.rate_limit_delay = Some(rate_limit_delay);
        }

        // Network & security
        if let Some(ref user_agent) = cli_config.user_agent {
            self.user_agent = Some(user_agent.clone());
        }
        if let Some(verify_ssl) = cli_config.verify_ssl {
            self.verify_ssl = Some(verify_ssl);
        }
        if let Some(follow_redirects) = cli_config.follow_redirects {
            self.follow_redirects = Some(follow_redirects);
        }

        if cli_config.verbose {
            self.verbose = Some(true);
        }
    }

    /// Get timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(timeouts::DEFAULT_TIMEOUT_SECONDS))
    }

    /// Get rate limit delay as Duration
    pub fn rate_limit_delay_duration(&self) -> Duration {
        Duration::from_millis(
            self.rate_limit_delay
                .unwrap_or(timeouts::DEFAULT_RATE_LIMIT_MS),
        )
    }

    pub fn routes_path(&self) -> PathBuf {
        PathBuf::from(
            self.routes_file
                .as_deref()
                .unwrap_or(defaults::ROUTES_FILE_NAME),
        )
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl.unwrap_or(defaults::VERIFY_SSL)
    }

    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects.unwrap_or(defaults::FOLLOW_REDIRECTS)
    }

    pub fn transport_settings(&self) -> TransportSettings {
        let mut settings = TransportSettings {
            timeout: self.timeout_duration(),
            ..Default::default()
        };
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(ref cache_header) = self.cache_header {
            settings.cache_header = cache_header.clone();
        }
        settings
    }

    pub fn url_renderer(&self) -> Result<UrlRenderer> {
        UrlRenderer::new(self.base_url.as_deref())
    }

    /// Registry with the shipped handlers, bound to `catalog`.
    pub fn handler_registry(&self, catalog: ParameterCatalog) -> Result<RouteHandlerRegistry> {
        let context = HandlerContext::new(
            catalog,
            self.url_renderer()?,
            self.max_parameter_values
                .unwrap_or(defaults::MAX_PARAMETER_VALUES),
        )?;
        Ok(RouteHandlerRegistry::with_default_handlers(Arc::new(
            context,
        )))
    }

    pub fn batch_runner(&self) -> Result<BatchRunner> {
        let runner = BatchRunner::new(
            self.chunk_size.unwrap_or(defaults::CHUNK_SIZE),
            self.concurrency.unwrap_or(defaults::CONCURRENCY),
        )?;
        Ok(runner.with_rate_limiter(RateLimiter::new(self.rate_limit_delay_duration())))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err(RouteProbeError::Config(
                    "Timeout cannot be 0. Expected a positive integer representing seconds."
                        .to_string(),
                ));
            }
            if timeout > timeouts::MAX_TIMEOUT_SECONDS {
                return Err(RouteProbeError::Config(format!(
                    "Timeout of {timeout} seconds is extremely large (>24 hours). Consider using a smaller value."
                )));
            }
        }

        if let Some(0) = self.chunk_size {
            return Err(RouteProbeError::Config(
                "Chunk size cannot be 0. Expected a positive integer.".to_string(),
            ));
        }

        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err(RouteProbeError::Config(
                    "Concurrency cannot be 0. Expected a positive integer.".to_string(),
                ));
            }
            if concurrency > 1000 {
                return Err(RouteProbeError::Config(format!(
                    "Concurrency of {concurrency} is extremely high. Consider using a smaller value."
                )));
            }
        }

        if let Some(0) = self.max_parameter_values {
            return Err(RouteProbeError::Config(
                "max_parameter_values cannot be 0. Expected a positive integer.".to_string(),
            ));
        }

        if let Some(ref header) = self.cache_header
            && HeaderName::from_bytes(header.as_bytes()).is_err()
        {
            return Err(RouteProbeError::Config(format!(
                "'{header}' is not a valid HTTP header name."
            )));
        }

        // Rejects malformed base URLs before any route is rendered
        self.url_renderer()?;

        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Sources
    pub base_url: Option<String>,    // --base-url
    pub routes_file: Option<String>, // --routes

    // Batching
    pub timeout: Option<u64>,          // --timeout
    pub chunk_size: Option<usize>,     // --chunk-size
    pub concurrency: Option<usize>,    // --concurrency
    pub rate_limit_delay: Option<u64>, // --rate-limit

    // Output
    pub quiet: bool,       // --quiet
    pub verbose: bool,     // --verbose
    pub no_progress: bool, // --no-progress

    // Network & security
    pub user_agent: Option<String>,     // --user-agent
    pub verify_ssl: Option<bool>,       // route test --verify-ssl
    pub follow_redirects: Option<bool>, // route test --follow-redirects

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}
