//! Reporting
//!
//! Report line sinks and structured logging.

pub mod logging;
pub mod sink;

// Re-export commonly used items
pub use sink::{ConsoleSink, MemorySink, ReportSink};
