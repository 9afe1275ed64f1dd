//! Readers for the Linux `/proc` filesystem.
//!
//! `parser` turns file contents into structured data; `readers` applies the
//! per-family validation and arithmetic on top.

pub mod cpu;
mod error;
pub mod parser;
pub mod readers;

pub use cpu::{CpuSnapshot, CpuUsageTracker};
pub use error::ReadError;
pub use readers::{DEFAULT_DISK_DEVICE, DEFAULT_INTERFACE, KernelStatReader, NetUsage};
