use crate::config::Config;
use crate::core::constants::{defaults, timeouts};
use crate::core::types::ProbeResult;
use crate::validation::batch::BatchSummary;
use log::{debug, error, info, warn};
use std::io::Write;
use std::path::Path;

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    let initialized = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .try_init();

    if initialized.is_ok() {
        debug!("Logger initialized with level: {level:?}");
    }
}

/// Log configuration information
pub fn log_config_info(config: &Config) {
    let timeout = config
        .timeout
        .unwrap_or(timeouts::DEFAULT_TIMEOUT_SECONDS);
    let chunk_size = config.chunk_size.unwrap_or(defaults::CHUNK_SIZE);
    let concurrency = config.concurrency.unwrap_or(defaults::CONCURRENCY);
    let rate_limit_delay = config
        .rate_limit_delay
        .unwrap_or(timeouts::DEFAULT_RATE_LIMIT_MS);
    let verify_ssl = config.verify_ssl.unwrap_or(defaults::VERIFY_SSL);
    let follow_redirects = config.follow_redirects.unwrap_or(defaults::FOLLOW_REDIRECTS);

    info!(
        "Configuration: base_url={}, timeout={timeout}s",
        config.base_url.as_deref().unwrap_or("<none>")
    );
    info!("Batching: chunk_size={chunk_size}, concurrency={concurrency}, delay={rate_limit_delay}ms");
    info!("HTTP: verify_ssl={verify_ssl}, follow_redirects={follow_redirects}");
}

/// Log the loaded route table
pub fn log_route_table<P: AsRef<Path>>(path: P, route_count: usize) {
    info!(
        "Loaded {route_count} route(s) from {}",
        path.as_ref().display()
    );
}

pub fn log_run_start(url_count: usize, chunk_size: usize, concurrency: usize) {
    info!("Probing {url_count} URLs in chunks of {chunk_size} ({concurrency} concurrent)");
}

pub fn log_probe_result(result: &ProbeResult) {
    debug!(
        "{} -> {} in {:.3}s (cache: {})",
        result.effective_url,
        result.status_code,
        result.elapsed.as_secs_f64(),
        result.cache
    );
}

pub fn log_run_complete(summary: &BatchSummary) {
    if summary.cancelled {
        warn!(
            "Run cancelled after {}/{} URLs",
            summary.processed, summary.total
        );
    } else {
        info!(
            "Run complete: {} reported, {} filtered, {} failed in {} chunk(s)",
            summary.reported, summary.suppressed, summary.failed, summary.chunks
        );
    }
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

/// Log warning information
pub fn log_warning(message: &str) {
    warn!("{message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    #[test]
    fn test_logger_initialization_is_idempotent() {
        init_logger(true, false);
        init_logger(false, true);
        init_logger(false, false);
    }

    #[test]
    fn test_log_config_info_with_defaults() {
        log_config_info(&Config::default());

        let config = Config {
            base_url: Some("https://example.com".to_string()),
            timeout: Some(5),
            chunk_size: Some(50),
            follow_redirects: Some(true),
            ..Default::default()
        };
        log_config_info(&config);
    }

    #[test]
    fn test_log_route_table() {
        log_route_table("routes.toml", 0);
        log_route_table(std::path::PathBuf::from("nested/routes.json"), 42);
    }

    #[test]
    fn test_log_run_lifecycle() {
        log_run_start(25, 10, 1);
        log_probe_result(&ProbeResult::new(
            200,
            Duration::from_millis(1500),
            "https://example.com/node/1".to_string(),
            Some("HIT".to_string()),
        ));
        log_run_complete(&BatchSummary {
            total: 25,
            processed: 25,
            reported: 20,
            suppressed: 3,
            failed: 2,
            chunks: 3,
            cancelled: false,
        });
        log_run_complete(&BatchSummary {
            total: 25,
            processed: 12,
            cancelled: true,
            ..Default::default()
        });
    }

    #[test]
    fn test_log_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        log_error("Failed to read route table", Some(&io_error));
        log_error("Something went wrong", None);
    }

    #[test]
    fn test_log_warning() {
        log_warning("Route skipped");
        log_warning("");
    }
}
