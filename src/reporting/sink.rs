use indicatif::MultiProgress;

use std::sync::{Arc, Mutex};

/// Append-only destination for report lines.
pub trait ReportSink: Send + Sync {
    fn line(&self, line: &str);
}

/// Writes lines to stdout, pausing any progress bars while doing so.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSink {
    multi_progress: Option<Arc<MultiProgress>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(multi_progress: Arc<MultiProgress>) -> Self {
        Self {
            multi_progress: Some(multi_progress),
        }
    }
}

impl ReportSink for ConsoleSink {
    fn line(&self, line: &str) {
        match self.multi_progress {
            Some(ref multi_progress) => multi_progress.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ReportSink for MemorySink {
    fn line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line.to_string());
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Arc<S> {
    fn line(&self, line: &str) {
        (**self).line(line)
    }
}
