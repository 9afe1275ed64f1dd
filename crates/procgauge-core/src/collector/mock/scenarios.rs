//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` states for the conditions the
//! sampler has to survive: a healthy host, the same host one tick later, and
//! sources that were truncated or rewritten mid-read.

use super::filesystem::MockFs;

const NET_DEV_HEADER: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
";

impl MockFs {
    /// Creates a typical healthy host.
    ///
    /// Expected readings (first CPU sample is the since-boot average):
    /// memory 26.7578125%, disk `sda` 19134, `lo` 24691356 bytes,
    /// 2 running processes, 500000 context switches.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
",
        );
        fs.add_file("/proc/stat", typical_stat("10000 500 3000 80000 1000 200 100 0 0 0"));
        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 12345 100 987654 5000 6789 50 456789 3000 0 4000 8000 0 0 0 0
   8       1 sda1 10000 80 800000 4000 5000 40 400000 2500 0 3500 6500 0 0 0 0
   8      16 sdb 300 0 2400 10 200 0 1600 20 0 30 30 0 0 0 0
 259       0 nvme0n1 50000 200 2000000 10000 30000 150 1500000 8000 5 15000 18000 0 0 0 0
",
        );
        fs.add_file(
            "/proc/net/dev",
            format!(
                "{NET_DEV_HEADER}\
    lo: 12345678     9876    0    0    0     0          0         0 12345678     9876    0    0    0     0       0          0
  eth0: 987654321   654321    5   10    0     0          0       100 123456789   456789    2    5    0     0       0          0
 eth01:     1000       10    0    0    0     0          0         0     2000       20    0    0    0     0       0          0
"
            ),
        );

        fs
    }

    /// The typical host one tick later.
    ///
    /// Only the CPU counters moved: +500 user, +250 system, +250 idle, so the
    /// usage over the tick is 75%.
    pub fn typical_system_next_tick() -> Self {
        let mut fs = Self::typical_system();
        fs.add_file("/proc/stat", typical_stat("10500 500 3250 80250 1000 200 100 0 0 0"));
        fs
    }

    /// Sources that exist but lack every field the readers need.
    pub fn truncated_sources() -> Self {
        let mut fs = Self::new();

        fs.add_file("/proc/meminfo", "MemTotal:       16384000 kB\nMemFree:         8192000 kB\n");
        fs.add_file("/proc/stat", "cpu  10000 500 3000 80000\nbtime 1700000000\n");
        fs.add_file(
            "/proc/diskstats",
            " 259       0 nvme0n1 50000 200 2000000 10000 30000 150 1500000 8000 5 15000 18000 0 0 0 0\n",
        );
        fs.add_file("/proc/net/dev", NET_DEV_HEADER);

        fs
    }
}

fn typical_stat(cpu_fields: &str) -> String {
    format!(
        "\
cpu  {cpu_fields}
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
"
    )
}
