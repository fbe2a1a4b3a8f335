use futures::{StreamExt, future, stream};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::core::constants::messages;
use crate::core::error::{Result, RouteProbeError};
use crate::core::types::{BatchProgress, ConcreteUrl, ProbeConfig};
use crate::reporting::sink::ReportSink;
use crate::ui::progress::ProgressReporter;
use crate::validation::probe::{ProbeOutcome, ProbeUrl};
use crate::validation::rate_limit::RateLimiter;

/// Shared cancellation signal. Once set, no new probes are scheduled.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub reported: usize,
    pub suppressed: usize,
    pub failed: usize,
    pub chunks: usize,
    pub cancelled: bool,
}

impl BatchSummary {
    fn record(&mut self, outcome: &ProbeOutcome) {
        self.processed += 1;
        match outcome {
            ProbeOutcome::Reported(_) => self.reported += 1,
            ProbeOutcome::Suppressed(_) => self.suppressed += 1,
            ProbeOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Every chunk was processed.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.processed == self.total
    }
}

/// Opening line of a run.
pub fn announcement(total: usize, config: &ProbeConfig) -> String {
    match config.response_code_filter {
        Some(code) => format!("Testing {total} routes for '{code}' HTTP response code."),
        None => format!("Testing all {total} routes."),
    }
}

/// Probes URLs in fixed-size chunks, reporting progress after each chunk.
#[derive(Debug)]
pub struct BatchRunner {
    chunk_size: usize,
    concurrency: usize,
    rate_limiter: Option<RateLimiter>,
    cancel: CancelFlag,
}

impl BatchRunner {
    /// `concurrency` is the number of probes in flight within a chunk.
    pub fn new(chunk_size: usize, concurrency: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RouteProbeError::Config(
                "Chunk size cannot be 0. Expected a positive integer.".to_string(),
            ));
        }
        if concurrency == 0 {
            return Err(RouteProbeError::Config(
                "Concurrency cannot be 0. Expected a positive integer.".to_string(),
            ));
        }

        Ok(Self {
            chunk_size,
            concurrency,
            rate_limiter: None,
            cancel: CancelFlag::new(),
        })
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Option<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Probe every URL. The sequence is collected up front so progress can
    /// be reported against the total.
    pub async fn run<P, I>(
        &self,
        prober: &P,
        urls: I,
        sink: &dyn ReportSink,
        mut progress: Option<&mut ProgressReporter>,
    ) -> BatchSummary
    where
        P: ProbeUrl + ?Sized,
        I: IntoIterator<Item = ConcreteUrl>,
    {
        let urls: Vec<ConcreteUrl> = urls.into_iter().collect();
        let total = urls.len();
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        sink.line(&announcement(total, prober.config()));
        crate::reporting::logging::log_run_start(total, self.chunk_size, self.concurrency);

        if let Some(ref mut prog) = progress {
            prog.start_probing(total);
        }
        let progress = progress.as_deref();
        let completed = AtomicUsize::new(0);
        let completed = &completed;

        for chunk in urls.chunks(self.chunk_size) {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let outcomes: Vec<ProbeOutcome> = stream::iter(chunk)
                .take_while(|_| future::ready(!self.cancel.is_cancelled()))
                .map(|url| async move {
                    if let Some(ref limiter) = self.rate_limiter {
                        limiter.acquire().await;
                    }

                    let outcome = prober.probe(url, sink).await;

                    let current = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(prog) = progress {
                        prog.update_probe_progress(current);
                    }

                    outcome
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            summary.chunks += 1;
            for outcome in &outcomes {
                summary.record(outcome);
            }

            sink.line(&BatchProgress::new(summary.processed, total).to_string());

            if outcomes.len() < chunk.len() {
                summary.cancelled = true;
                break;
            }
        }

        if summary.cancelled {
            sink.line(messages::RUN_CANCELLED);
        } else {
            sink.line(messages::ALL_ROUTES_TESTED);
        }

        if let Some(prog) = progress {
            prog.finish_probing(&summary);
        }
        crate::reporting::logging::log_run_complete(&summary);

        summary
    }
}
