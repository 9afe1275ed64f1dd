//! Kernel stat readers: one method per metric family.
//!
//! Every call re-reads its source through the [`FileSystem`]; nothing is
//! cached between calls except the CPU tracker's previous sample.

use std::path::PathBuf;

use tracing::trace;

use super::cpu::CpuUsageTracker;
use super::error::ReadError;
use super::parser::{
    parse_aggregate_cpu, parse_diskstats, parse_global_stat, parse_meminfo, parse_net_dev,
};
use crate::collector::traits::FileSystem;

/// Disk device sampled when none is configured.
pub const DEFAULT_DISK_DEVICE: &str = "sda";
/// Network interface sampled when none is configured.
pub const DEFAULT_INTERFACE: &str = "lo";

/// Byte counters of one network interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetUsage {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    /// Whether the interface was present in `net/dev`. An absent interface
    /// reads as zero traffic rather than an error.
    pub found: bool,
}

impl NetUsage {
    pub fn total(&self) -> u64 {
        self.rx_bytes.saturating_add(self.tx_bytes)
    }
}

/// Reads host-level counters from a proc filesystem.
pub struct KernelStatReader<F: FileSystem> {
    fs: F,
    proc_path: String,
    disk_device: String,
    interface: String,
    cpu: CpuUsageTracker,
}

impl<F: FileSystem> KernelStatReader<F> {
    /// Creates a reader sampling [`DEFAULT_DISK_DEVICE`] and
    /// [`DEFAULT_INTERFACE`].
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            disk_device: DEFAULT_DISK_DEVICE.to_string(),
            interface: DEFAULT_INTERFACE.to_string(),
            cpu: CpuUsageTracker::new(),
        }
    }

    /// Sets the block device whose completed I/Os are reported.
    pub fn with_disk_device(mut self, device: impl Into<String>) -> Self {
        self.disk_device = device.into();
        self
    }

    /// Sets the network interface whose byte counters are reported.
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    pub fn disk_device(&self) -> &str {
        &self.disk_device
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Mutable access to the filesystem, for tests that rewrite sources
    /// between cycles.
    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    fn source(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("{}/{}", self.proc_path, name))
    }

    fn read(&self, name: &str) -> Result<(PathBuf, String), ReadError> {
        let path = self.source(name);
        match self.fs.read_to_string(&path) {
            Ok(content) => Ok((path, content)),
            Err(source) => Err(ReadError::SourceUnavailable { path, source }),
        }
    }

    /// Memory usage percentage from `meminfo`:
    /// `(MemTotal - MemAvailable) / MemTotal * 100`.
    pub fn memory_usage(&self) -> Result<f64, ReadError> {
        let (path, content) = self.read("meminfo")?;
        let info = parse_meminfo(&content);

        let total = match info.mem_total {
            Some(0) | None => return Err(ReadError::mismatch(path, "MemTotal missing or zero")),
            Some(v) => v,
        };
        let available = match info.mem_available {
            Some(0) | None => {
                return Err(ReadError::mismatch(path, "MemAvailable missing or zero"));
            }
            Some(v) => v,
        };

        let used = total.saturating_sub(available);
        Ok(used as f64 / total as f64 * 100.0)
    }

    /// CPU usage percentage over the window since the previous call.
    pub fn cpu_usage(&mut self) -> Result<f64, ReadError> {
        let (path, content) = self.read("stat")?;
        let current =
            parse_aggregate_cpu(&content).map_err(|e| ReadError::mismatch(path, e.message))?;
        trace!(?current, prev = ?self.cpu.previous(), "cpu sample");
        self.cpu.update(current)
    }

    /// Completed reads plus completed writes of the configured disk device.
    ///
    /// Only a device missing from `diskstats` is an error. A device that is
    /// present with zero completed reads and writes reports `0`.
    pub fn disk_usage(&self) -> Result<f64, ReadError> {
        let (path, content) = self.read("diskstats")?;

        parse_diskstats(&content)
            .into_iter()
            .find(|disk| disk.device == self.disk_device)
            .map(|disk| disk.reads.saturating_add(disk.writes) as f64)
            .ok_or_else(|| {
                ReadError::mismatch(path, format!("device {} not found", self.disk_device))
            })
    }

    /// Received and transmitted bytes of the configured interface.
    ///
    /// Interface names are compared exactly, so `eth0` never matches `eth01`.
    pub fn network_usage(&self) -> Result<NetUsage, ReadError> {
        let (_, content) = self.read("net/dev")?;

        Ok(parse_net_dev(&content)
            .into_iter()
            .find(|dev| dev.interface == self.interface)
            .map(|dev| NetUsage {
                rx_bytes: dev.rx_bytes,
                tx_bytes: dev.tx_bytes,
                found: true,
            })
            .unwrap_or_default())
    }

    /// Number of runnable processes (`procs_running`).
    pub fn process_count(&self) -> Result<f64, ReadError> {
        let (path, content) = self.read("stat")?;
        match parse_global_stat(&content).procs_running {
            Some(0) | None => Err(ReadError::mismatch(path, "procs_running missing or zero")),
            Some(n) => Ok(n as f64),
        }
    }

    /// Context switches since boot (`ctxt`).
    pub fn context_switches(&self) -> Result<f64, ReadError> {
        let (path, content) = self.read("stat")?;
        match parse_global_stat(&content).ctxt {
            Some(0) | None => Err(ReadError::mismatch(path, "ctxt missing or zero")),
            Some(n) => Ok(n as f64),
        }
    }
}
