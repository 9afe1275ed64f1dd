//! Named gauges shared between the sampler and the exporter.
//!
//! One mutex guards every gauge write and every read. It is held for a single
//! set or gather only, never across a kernel read or text encoding.

use std::collections::{BTreeMap, BTreeSet};
use std::string::FromUtf8Error;
use std::sync::{Mutex, MutexGuard, PoisonError};

use prometheus::{Encoder, Gauge, Registry, TextEncoder};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::MetricFamily;

/// Every gauge the exporter publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GaugeKey {
    CpuUsage,
    MemoryUsage,
    DiskUsage,
    NetworkUsage,
    NetworkReceive,
    NetworkTransmit,
    ProcessCount,
    ContextSwitches,
}

impl GaugeKey {
    pub const ALL: [GaugeKey; 8] = [
        GaugeKey::CpuUsage,
        GaugeKey::MemoryUsage,
        GaugeKey::DiskUsage,
        GaugeKey::NetworkUsage,
        GaugeKey::NetworkReceive,
        GaugeKey::NetworkTransmit,
        GaugeKey::ProcessCount,
        GaugeKey::ContextSwitches,
    ];

    /// Exposition name.
    pub fn name(self) -> &'static str {
        match self {
            GaugeKey::CpuUsage => "cpu_usage_percentage",
            GaugeKey::MemoryUsage => "memory_usage_percentage",
            GaugeKey::DiskUsage => "disk_usage",
            GaugeKey::NetworkUsage => "network_usage_metric",
            GaugeKey::NetworkReceive => "network_receive_bytes",
            GaugeKey::NetworkTransmit => "network_transmit_bytes",
            GaugeKey::ProcessCount => "procs_usage_count",
            GaugeKey::ContextSwitches => "ctxt_usage_count",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            GaugeKey::CpuUsage => "CPU usage percentage over the last sampling period",
            GaugeKey::MemoryUsage => "Memory usage percentage (total minus available)",
            GaugeKey::DiskUsage => "Completed reads plus completed writes of the disk device",
            GaugeKey::NetworkUsage => "Bytes received plus transmitted by the network interface",
            GaugeKey::NetworkReceive => "Bytes received by the network interface",
            GaugeKey::NetworkTransmit => "Bytes transmitted by the network interface",
            GaugeKey::ProcessCount => "Number of processes in runnable state",
            GaugeKey::ContextSwitches => "Context switches since boot",
        }
    }

    pub fn family(self) -> MetricFamily {
        match self {
            GaugeKey::CpuUsage => MetricFamily::Cpu,
            GaugeKey::MemoryUsage => MetricFamily::Memory,
            GaugeKey::DiskUsage => MetricFamily::Disk,
            GaugeKey::NetworkUsage | GaugeKey::NetworkReceive | GaugeKey::NetworkTransmit => {
                MetricFamily::Network
            }
            GaugeKey::ProcessCount => MetricFamily::Processes,
            GaugeKey::ContextSwitches => MetricFamily::ContextSwitches,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
    #[error("encoded metrics are not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

struct Inner {
    registry: Registry,
    gauges: BTreeMap<GaugeKey, Gauge>,
    // Keys set at least once since creation
    written: BTreeSet<GaugeKey>,
}

/// Registry of the published gauges.
///
/// Gauges that cannot be created or registered are logged and left out;
/// the remaining ones keep working.
pub struct GaugeRegistry {
    inner: Mutex<Inner>,
}

impl GaugeRegistry {
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Registers the gauges into an existing prometheus registry.
    pub fn with_registry(registry: Registry) -> Self {
        let mut gauges = BTreeMap::new();

        for key in GaugeKey::ALL {
            let gauge = match Gauge::new(key.name(), key.help()) {
                Ok(gauge) => gauge,
                Err(e) => {
                    error!(gauge = key.name(), error = %e, "failed to create gauge");
                    continue;
                }
            };
            if let Err(e) = registry.register(Box::new(gauge.clone())) {
                error!(gauge = key.name(), error = %e, "failed to register gauge");
                continue;
            }
            gauges.insert(key, gauge);
        }

        debug!(count = gauges.len(), "gauges registered");

        Self {
            inner: Mutex::new(Inner {
                registry,
                gauges,
                written: BTreeSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets a gauge. Returns `false` if that gauge is unavailable.
    pub fn set(&self, key: GaugeKey, value: f64) -> bool {
        let mut guard = self.lock();
        let inner = &mut *guard;
        match inner.gauges.get(&key) {
            Some(gauge) => {
                gauge.set(value);
                inner.written.insert(key);
                true
            }
            None => false,
        }
    }

    /// Current exported value, `0` until the first write.
    pub fn get(&self, key: GaugeKey) -> Option<f64> {
        self.lock().gauges.get(&key).map(Gauge::get)
    }

    /// Last written value. `None` if the gauge is unavailable or has never
    /// been set.
    pub fn sampled(&self, key: GaugeKey) -> Option<f64> {
        let inner = self.lock();
        if !inner.written.contains(&key) {
            return None;
        }
        inner.gauges.get(&key).map(Gauge::get)
    }

    /// Gauges that were successfully registered.
    pub fn available(&self) -> Vec<GaugeKey> {
        self.lock().gauges.keys().copied().collect()
    }

    /// Current value of every available gauge, keyed by exposition name.
    pub fn snapshot(&self) -> BTreeMap<&'static str, f64> {
        self.lock()
            .gauges
            .iter()
            .map(|(key, gauge)| (key.name(), gauge.get()))
            .collect()
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, ExportError> {
        let families = self.lock().registry.gather();

        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        encoder.encode(&families, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Content type matching [`encode_text`](Self::encode_text).
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}

impl Default for GaugeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
