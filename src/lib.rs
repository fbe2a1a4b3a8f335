//! routeprobe
//!
//! Expands a site's registered routes into concrete URLs and probes them
//! over HTTP, reporting status codes, cache status and timing.
//!
//! The pipeline is `RouteListBuilder` (lazy URL sequence) into
//! `BatchRunner` (chunked probing with progress) into `Prober` (one GET per
//! URL), with report lines written to a `ReportSink`.

pub mod config;
pub mod core;
pub mod discovery;
pub mod reporting;
pub mod ui;
pub mod validation;

// Re-export commonly used items
pub use crate::config::{CliConfig, Config};
pub use crate::core::{ConcreteUrl, ProbeConfig, ProbeResult, Result, Route, RouteProbeError};
pub use crate::discovery::{RouteListBuilder, RouteSource, RouteTable};
pub use crate::reporting::{ConsoleSink, MemorySink, ReportSink};
pub use crate::validation::{BatchRunner, BatchSummary, CancelFlag, Prober};
