//! Host metrics collection from the Linux `/proc` filesystem.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              KernelStatReader                │
//! │  - /proc/stat      (cpu, procs, ctxt)        │
//! │  - /proc/meminfo   (memory)                  │
//! │  - /proc/diskstats (disk)                    │
//! │  - /proc/net/dev   (network)                 │
//! │  - CpuUsageTracker (previous cpu sample)     │
//! └──────────────────────┬───────────────────────┘
//!                        │
//!                 ┌──────▼──────┐
//!                 │  FileSystem │ (trait)
//!                 └──────┬──────┘
//!              ┌─────────┴─────────┐
//!       ┌──────▼──────┐     ┌──────▼──────┐
//!       │   RealFs    │     │   MockFs    │
//!       │  (Linux)    │     │ (Scenarios) │
//!       └─────────────┘     └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use procgauge_core::collector::{KernelStatReader, MockFs};
//!
//! let reader = KernelStatReader::new(MockFs::typical_system(), "/proc");
//! let memory = reader.memory_usage().unwrap();
//! assert!(memory > 0.0 && memory < 100.0);
//! ```

pub mod mock;
pub mod procfs;
pub mod traits;

pub use mock::MockFs;
pub use procfs::{CpuSnapshot, CpuUsageTracker, KernelStatReader, NetUsage, ReadError};
pub use traits::{FileSystem, RealFs};
