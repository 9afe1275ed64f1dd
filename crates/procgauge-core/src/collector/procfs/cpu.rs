//! Delta-based CPU usage from cumulative `/proc/stat` counters.

use super::error::ReadError;

/// The eight cumulative time counters of the aggregate `cpu` line, in
/// USER_HZ ticks since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuSnapshot {
    pub fn idle_total(&self) -> u64 {
        self.idle + self.iowait
    }

    pub fn non_idle(&self) -> u64 {
        self.user + self.nice + self.system + self.irq + self.softirq + self.steal
    }

    pub fn total(&self) -> u64 {
        self.idle_total() + self.non_idle()
    }
}

/// Carries the previous CPU sample between sampling cycles.
///
/// Starts from a zeroed snapshot, so the first [`update`](Self::update)
/// yields the average usage since boot rather than over one period.
#[derive(Debug, Clone, Default)]
pub struct CpuUsageTracker {
    prev: CpuSnapshot,
}

impl CpuUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sample the next delta will be computed against.
    pub fn previous(&self) -> &CpuSnapshot {
        &self.prev
    }

    /// Computes usage percentage in `[0, 100]` over the window since the
    /// previous snapshot and stores `current` for the next call.
    ///
    /// A zero-length window leaves the stored snapshot untouched. A window
    /// where the counters went backwards re-bases onto `current`.
    pub fn update(&mut self, current: CpuSnapshot) -> Result<f64, ReadError> {
        let prev_total = self.prev.total();
        let total = current.total();

        let Some(total_delta) = total.checked_sub(prev_total) else {
            self.prev = current;
            return Err(ReadError::degenerate(format!(
                "cpu counters went backwards ({} -> {})",
                prev_total, total
            )));
        };

        if total_delta == 0 {
            return Err(ReadError::degenerate("no cpu time elapsed since last sample"));
        }

        let idle_delta = current
            .idle_total()
            .saturating_sub(self.prev.idle_total())
            .min(total_delta);

        self.prev = current;

        Ok((total_delta - idle_delta) as f64 / total_delta as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(user: u64, system: u64, idle: u64, iowait: u64) -> CpuSnapshot {
        CpuSnapshot {
            user,
            system,
            idle,
            iowait,
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_totals() {
        let s = CpuSnapshot {
            user: 1,
            nice: 2,
            system: 3,
            idle: 4,
            iowait: 5,
            irq: 6,
            softirq: 7,
            steal: 8,
        };
        assert_eq!(s.idle_total(), 9);
        assert_eq!(s.non_idle(), 27);
        assert_eq!(s.total(), 36);
    }

    #[test]
    fn test_first_sample_is_since_boot_average() {
        let mut tracker = CpuUsageTracker::new();
        let usage = tracker.update(snapshot(100, 100, 700, 50)).unwrap();

        // non_idle 200 of total 950
        assert!((usage - 200.0 / 950.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_new_time_non_idle_is_full_usage() {
        let mut tracker = CpuUsageTracker::new();
        tracker.update(snapshot(100, 100, 700, 50)).unwrap();

        let usage = tracker.update(snapshot(150, 150, 700, 50)).unwrap();
        assert!((usage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_new_time_idle_is_zero_usage() {
        let mut tracker = CpuUsageTracker::new();
        tracker.update(snapshot(100, 100, 700, 50)).unwrap();

        let usage = tracker.update(snapshot(100, 100, 760, 90)).unwrap();
        assert_eq!(usage, 0.0);
    }

    #[test]
    fn test_zero_window_is_degenerate_and_keeps_previous() {
        let mut tracker = CpuUsageTracker::new();
        let s = snapshot(100, 100, 700, 50);
        tracker.update(s).unwrap();

        let err = tracker.update(s).unwrap_err();
        assert!(matches!(err, ReadError::DegenerateComputation { .. }));
        assert_eq!(tracker.previous(), &s);
    }

    #[test]
    fn test_zero_window_on_fresh_tracker() {
        let mut tracker = CpuUsageTracker::new();
        assert!(tracker.update(CpuSnapshot::default()).is_err());
    }

    #[test]
    fn test_counter_regression_rebases() {
        let mut tracker = CpuUsageTracker::new();
        tracker.update(snapshot(1000, 1000, 7000, 0)).unwrap();

        let reset = snapshot(10, 10, 70, 0);
        assert!(tracker.update(reset).is_err());
        assert_eq!(tracker.previous(), &reset);

        let usage = tracker.update(snapshot(20, 20, 80, 0)).unwrap();
        assert!((usage - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_idle_regression_is_clamped() {
        // iowait can step backwards on some kernels while total still grows
        let mut tracker = CpuUsageTracker::new();
        tracker.update(snapshot(100, 100, 700, 50)).unwrap();

        let usage = tracker.update(snapshot(200, 100, 700, 40)).unwrap();
        assert!((0.0..=100.0).contains(&usage));
    }

    #[test]
    fn test_usage_bounded_over_monotonic_sequence() {
        let mut tracker = CpuUsageTracker::new();
        let mut s = CpuSnapshot::default();
        for step in 1..200u64 {
            s.user += step % 7;
            s.system += step % 3;
            s.idle += (step * 13) % 11;
            s.iowait += step % 2;
            s.steal += step % 5;
            if let Ok(usage) = tracker.update(s) {
                assert!((0.0..=100.0).contains(&usage), "usage {usage} out of range");
            }
        }
    }
}
