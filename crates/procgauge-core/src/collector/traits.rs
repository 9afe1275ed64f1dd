//! Filesystem seam between the kernel stat readers and `/proc`.
//!
//! Readers never touch `std::fs` directly. Production code plugs in [`RealFs`];
//! tests plug in [`MockFs`](crate::collector::MockFs) so every parser can be
//! exercised on any host.

use std::io;
use std::path::Path;

/// Read access to kernel text sources.
///
/// Implementations must not cache contents: every call is expected to observe
/// the source as it is at that moment, since the kernel rewrites these files
/// between reads.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    ///
    /// Returns an I/O error if the file cannot be opened or read.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
