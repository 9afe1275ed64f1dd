//! Which metric families are sampled.
//!
//! The configuration file is JSON:
//!
//! ```json
//! { "metrics": { "cpu": true, "memory": true, "disk": false,
//!                "network": true, "processes": true, "context_switches": true } }
//! ```
//!
//! A family is enabled only by a literal `true`; missing keys, `false`, and
//! values of any other type disable it.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// A group of related counters read from one kernel source.
///
/// Declaration order is the order in which the sampler visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricFamily {
    Cpu,
    Memory,
    Disk,
    Network,
    Processes,
    ContextSwitches,
}

impl MetricFamily {
    pub const ALL: [MetricFamily; 6] = [
        MetricFamily::Cpu,
        MetricFamily::Memory,
        MetricFamily::Disk,
        MetricFamily::Network,
        MetricFamily::Processes,
        MetricFamily::ContextSwitches,
    ];

    /// Key of the family in the configuration file.
    pub fn config_key(self) -> &'static str {
        match self {
            MetricFamily::Cpu => "cpu",
            MetricFamily::Memory => "memory",
            MetricFamily::Disk => "disk",
            MetricFamily::Network => "network",
            MetricFamily::Processes => "processes",
            MetricFamily::ContextSwitches => "context_switches",
        }
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Enable flag per metric family. `Default` disables everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsConfig {
    pub cpu: bool,
    pub memory: bool,
    pub disk: bool,
    pub network: bool,
    pub processes: bool,
    pub context_switches: bool,
}

impl MetricsConfig {
    pub fn all_enabled() -> Self {
        Self {
            cpu: true,
            memory: true,
            disk: true,
            network: true,
            processes: true,
            context_switches: true,
        }
    }

    pub fn is_enabled(&self, family: MetricFamily) -> bool {
        match family {
            MetricFamily::Cpu => self.cpu,
            MetricFamily::Memory => self.memory,
            MetricFamily::Disk => self.disk,
            MetricFamily::Network => self.network,
            MetricFamily::Processes => self.processes,
            MetricFamily::ContextSwitches => self.context_switches,
        }
    }

    /// Enabled families in sampling order.
    pub fn enabled(&self) -> impl Iterator<Item = MetricFamily> + '_ {
        MetricFamily::ALL
            .into_iter()
            .filter(|family| self.is_enabled(*family))
    }

    /// Parses the JSON configuration document.
    ///
    /// A document without a `metrics` object is valid and disables every
    /// family.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let doc: Value = serde_json::from_str(content)?;

        let Some(metrics) = doc.get("metrics").filter(|m| m.is_object()) else {
            warn!("config has no \"metrics\" object; all metric families disabled");
            return Ok(Self::default());
        };

        let flag = |family: MetricFamily| metrics.get(family.config_key()) == Some(&Value::Bool(true));

        Ok(Self {
            cpu: flag(MetricFamily::Cpu),
            memory: flag(MetricFamily::Memory),
            disk: flag(MetricFamily::Disk),
            network: flag(MetricFamily::Network),
            processes: flag(MetricFamily::Processes),
            context_switches: flag(MetricFamily::ContextSwitches),
        })
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }
}
