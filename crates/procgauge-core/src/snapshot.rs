//! JSON view of the current gauge values.

use chrono::Utc;
use serde::Serialize;

use crate::config::MetricsConfig;
use crate::gauges::{GaugeKey, GaugeRegistry};

/// Current values of the enabled metric families.
///
/// Disabled families, unavailable gauges and gauges that were never sampled
/// are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Unix seconds at which the snapshot was taken.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_usage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_usage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_usage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_switches: Option<f64>,
}

impl MetricsSnapshot {
    /// Reads the gauges of every enabled family.
    pub fn capture(gauges: &GaugeRegistry, config: &MetricsConfig) -> Self {
        let read = |key: GaugeKey| {
            if config.is_enabled(key.family()) {
                gauges.sampled(key)
            } else {
                None
            }
        };

        Self {
            timestamp: Utc::now().timestamp(),
            cpu_usage: read(GaugeKey::CpuUsage),
            memory_usage: read(GaugeKey::MemoryUsage),
            disk_usage: read(GaugeKey::DiskUsage),
            network_usage: read(GaugeKey::NetworkUsage),
            process_count: read(GaugeKey::ProcessCount),
            context_switches: read(GaugeKey::ContextSwitches),
        }
    }
}
