use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use tokio::time::Instant;

use std::sync::Arc;
use std::time::Duration;

use crate::core::constants::{http, messages, timeouts};
use crate::core::error::Result;
use crate::core::types::{ConcreteUrl, ProbeConfig, ProbeResult};
use crate::reporting::sink::ReportSink;
use crate::validation::cookie::SessionCookie;

/// Transport settings shared by every probe in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header
    pub user_agent: String,
    /// Response header carrying the cache status
    pub cache_header: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(timeouts::DEFAULT_TIMEOUT_SECONDS),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
                .to_string(),
            cache_header: http::DEFAULT_CACHE_HEADER.to_string(),
        }
    }
}

/// What happened to a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Response passed the filters and a line was written
    Reported(ProbeResult),
    /// Response was filtered out, nothing written
    Suppressed(ProbeResult),
    /// No response at all; a failure line was written
    Failed { url: String, reason: String },
}

impl ProbeOutcome {
    pub fn result(&self) -> Option<&ProbeResult> {
        match self {
            ProbeOutcome::Reported(result) | ProbeOutcome::Suppressed(result) => Some(result),
            ProbeOutcome::Failed { .. } => None,
        }
    }
}

#[async_trait]
pub trait ProbeUrl: Send + Sync {
    /// Settings this prober applies to every URL.
    fn config(&self) -> &ProbeConfig;

    /// Request `url` and write at most one line to `sink`. Never fails;
    /// transport errors become `ProbeOutcome::Failed`.
    async fn probe(&self, url: &ConcreteUrl, sink: &dyn ReportSink) -> ProbeOutcome;
}

/// Issues GET requests with the configured cookie, TLS and redirect handling.
#[derive(Debug)]
pub struct Prober {
    config: ProbeConfig,
    settings: TransportSettings,
    cookie: Option<SessionCookie>,
    client: Client,
}

impl Prober {
    /// Fails on a malformed cookie or when the HTTP client cannot be built.
    pub fn new(config: ProbeConfig, settings: TransportSettings) -> Result<Self> {
        let cookie = config
            .cookie
            .as_deref()
            .map(SessionCookie::parse)
            .transpose()?;
        let client = build_client(&config, &settings, None)?;

        Ok(Self {
            config,
            settings,
            cookie,
            client,
        })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    async fn fetch(&self, url: &ConcreteUrl) -> std::result::Result<ProbeResult, String> {
        let target = Url::parse(url.as_str()).map_err(|e| format!("invalid URL ({e})"))?;

        // Cookies live in a store scoped to this request only.
        let client = match self.cookie {
            Some(ref cookie) => build_client(
                &self.config,
                &self.settings,
                Some(cookie.jar_for(&target)),
            )
            .map_err(|e| describe_error(&e))?,
            None => self.client.clone(),
        };

        let start = Instant::now();
        let response = client
            .get(target)
            .send()
            .await
            .map_err(|e| describe_error(&e))?;

        let status_code = response.status().as_u16();
        let effective_url = response.url().to_string();
        let cache = response
            .headers()
            .get(self.settings.cache_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        if let Err(e) = response.bytes().await {
            log::debug!("Could not read body of {effective_url}: {e}");
        }

        Ok(ProbeResult::new(
            status_code,
            start.elapsed(),
            effective_url,
            cache,
        ))
    }
}

#[async_trait]
impl ProbeUrl for Prober {
    fn config(&self) -> &ProbeConfig {
        &self.config
    }

    async fn probe(&self, url: &ConcreteUrl, sink: &dyn ReportSink) -> ProbeOutcome {
        log::debug!("HTTP Request: {url}.");

        match self.fetch(url).await {
            Ok(result) => {
                crate::reporting::logging::log_probe_result(&result);
                if result.passes_filters(&self.config) {
                    sink.line(&result.report_line(self.config.profile));
                    ProbeOutcome::Reported(result)
                } else {
                    ProbeOutcome::Suppressed(result)
                }
            }
            Err(reason) => {
                log::warn!("Request to {url} failed: {reason}");
                sink.line(&format!(
                    "{}, {url}, {reason}",
                    messages::PROBE_FAILURE_PREFIX
                ));
                ProbeOutcome::Failed {
                    url: url.to_string(),
                    reason,
                }
            }
        }
    }
}

fn build_client(
    config: &ProbeConfig,
    settings: &TransportSettings,
    cookies: Option<Arc<reqwest::cookie::Jar>>,
) -> reqwest::Result<Client> {
    let redirect_policy = if config.follow_redirects {
        Policy::limited(http::MAX_PROBE_REDIRECTS)
    } else {
        Policy::none()
    };

    let mut client_builder = Client::builder()
        .timeout(settings.timeout)
        .redirect(redirect_policy)
        .user_agent(settings.user_agent.as_str())
        .danger_accept_invalid_certs(!config.verify_ssl);

    if let Some(jar) = cookies {
        client_builder = client_builder.cookie_provider(jar);
    }

    client_builder.build()
}

fn describe_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return "operation timed out".to_string();
    }

    std::error::Error::source(err)
        .map(|e| e.to_string())
        .unwrap_or_else(|| err.to_string())
}
