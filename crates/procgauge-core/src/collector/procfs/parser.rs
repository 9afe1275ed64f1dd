//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions over file contents so they can be tested with
//! string inputs. Fields a parser cannot find are reported as `None` rather
//! than zero; deciding whether a missing field is fatal is the reader's job.

use thiserror::Error;

use super::cpu::CpuSnapshot;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

/// Parsed data from `/proc/meminfo`. Values are in kB.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemInfo {
    pub mem_total: Option<u64>,
    pub mem_available: Option<u64>,
}

/// Parses `/proc/meminfo` content.
pub fn parse_meminfo(content: &str) -> MemInfo {
    let mut info = MemInfo::default();

    let parse_kb =
        |line: &str| -> Option<u64> { line.split_whitespace().nth(1).and_then(|s| s.parse().ok()) };

    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            info.mem_total = parse_kb(line);
        } else if line.starts_with("MemAvailable:") {
            info.mem_available = parse_kb(line);
        }
    }

    info
}

/// Parses the aggregate `cpu` line of `/proc/stat`.
///
/// Format: `cpu  user nice system idle iowait irq softirq steal [guest guest_nice]`.
/// The first eight counters are required; per-CPU lines (`cpu0`, `cpu1`, ...)
/// are ignored.
pub fn parse_aggregate_cpu(content: &str) -> Result<CpuSnapshot, ParseError> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ParseError::new("missing aggregate cpu line"))?;

    let values: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map_while(|s| s.parse().ok())
        .collect();

    if values.len() < 8 {
        return Err(ParseError::new(format!(
            "not enough cpu counters: expected 8+, got {}",
            values.len()
        )));
    }

    Ok(CpuSnapshot {
        user: values[0],
        nice: values[1],
        system: values[2],
        idle: values[3],
        iowait: values[4],
        irq: values[5],
        softirq: values[6],
        steal: values[7],
    })
}

/// Scalar fields from `/proc/stat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalStat {
    /// Context switches since boot.
    pub ctxt: Option<u64>,
    /// Processes currently in a runnable state.
    pub procs_running: Option<u64>,
}

/// Parses the scalar `key value` lines of `/proc/stat`.
pub fn parse_global_stat(content: &str) -> GlobalStat {
    let mut stat = GlobalStat::default();

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };

        match key {
            "ctxt" => stat.ctxt = value.parse().ok(),
            "procs_running" => stat.procs_running = value.parse().ok(),
            _ => {}
        }
    }

    stat
}

/// One device line from `/proc/diskstats`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskStats {
    /// Device name (sda, nvme0n1, etc.)
    pub device: String,
    /// Number of reads completed
    pub reads: u64,
    /// Number of writes completed
    pub writes: u64,
}

/// Parses `/proc/diskstats` content.
///
/// Format: major minor name reads r_merged r_sectors r_time writes w_merged w_sectors w_time io_pending io_time w_io_time [discards ...]
pub fn parse_diskstats(content: &str) -> Vec<DiskStats> {
    let mut disks = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 {
            continue; // Skip malformed lines
        }

        let get_val =
            |idx: usize| -> u64 { parts.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        disks.push(DiskStats {
            device: parts[2].to_string(),
            reads: get_val(3),
            writes: get_val(7),
        });
    }

    disks
}

/// One interface line from `/proc/net/dev`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetDevStats {
    /// Interface name (eth0, lo, etc.)
    pub interface: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Parses `/proc/net/dev` content.
///
/// Format:
/// Inter-|   Receive                                                |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
///    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
///
/// The first two lines are always the header.
pub fn parse_net_dev(content: &str) -> Vec<NetDevStats> {
    let mut devices = Vec::new();

    for line in content.lines().skip(2) {
        let Some((name, counters)) = line.split_once(':') else {
            continue;
        };

        let values: Vec<&str> = counters.split_whitespace().collect();
        if values.len() < 9 {
            continue;
        }

        let get_val =
            |idx: usize| -> u64 { values.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        devices.push(NetDevStats {
            interface: name.trim().to_string(),
            rx_bytes: get_val(0),
            tx_bytes: get_val(8),
        });
    }

    devices
}
