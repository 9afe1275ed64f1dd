//! procgauge-core: host metrics sampling for the procgauge exporter.
//!
//! Provides:
//! - `collector`: `/proc` readers behind a mockable filesystem
//! - `config`: metric family enable flags (JSON)
//! - `gauges`: shared gauge registry with Prometheus text encoding
//! - `sampler`: periodic sampling loop
//! - `snapshot`: JSON view of the current gauge values

pub mod collector;
pub mod config;
pub mod gauges;
pub mod sampler;
pub mod snapshot;

pub use config::{ConfigError, MetricFamily, MetricsConfig};
pub use gauges::{ExportError, GaugeKey, GaugeRegistry};
pub use sampler::{CycleReport, Sampler};
pub use snapshot::MetricsSnapshot;

/// Crate version, shared by the daemon's `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
