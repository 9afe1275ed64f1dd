//! Periodic sampling of kernel counters into the gauge registry.
//!
//! The loop alternates between two states: idle (waiting for the next tick)
//! and sampling (one pass over the enabled families in fixed order). A failed
//! family is logged and its gauge keeps its previous value until a later
//! cycle succeeds.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::collector::{FileSystem, KernelStatReader, ReadError};
use crate::config::{MetricFamily, MetricsConfig};
use crate::gauges::{GaugeKey, GaugeRegistry};

/// Sampling period used by the daemon unless overridden.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of one sampling pass.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Families whose gauges were written, in sampling order.
    pub updated: Vec<MetricFamily>,
    /// Families that produced no value this cycle.
    pub failed: Vec<(MetricFamily, ReadError)>,
}

impl CycleReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives a [`KernelStatReader`] and publishes its results.
pub struct Sampler<F: FileSystem> {
    reader: KernelStatReader<F>,
    config: MetricsConfig,
    gauges: Arc<GaugeRegistry>,
}

impl<F: FileSystem> Sampler<F> {
    pub fn new(reader: KernelStatReader<F>, config: MetricsConfig, gauges: Arc<GaugeRegistry>) -> Self {
        Self {
            reader,
            config,
            gauges,
        }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn gauges(&self) -> &Arc<GaugeRegistry> {
        &self.gauges
    }

    pub fn reader_mut(&mut self) -> &mut KernelStatReader<F> {
        &mut self.reader
    }

    /// Runs one sampling pass over the enabled families.
    pub fn sample_once(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        let enabled: Vec<MetricFamily> = self.config.enabled().collect();
        for family in enabled {
            match self.sample_family(family) {
                Ok(()) => report.updated.push(family),
                Err(e) => {
                    warn!(%family, kind = e.kind(), error = %e, "sample failed, keeping previous value");
                    report.failed.push((family, e));
                }
            }
        }

        report
    }

    fn sample_family(&mut self, family: MetricFamily) -> Result<(), ReadError> {
        // Readers run before any gauge lock is taken
        match family {
            MetricFamily::Cpu => {
                let usage = self.reader.cpu_usage()?;
                self.publish(GaugeKey::CpuUsage, usage);
            }
            MetricFamily::Memory => {
                let usage = self.reader.memory_usage()?;
                self.publish(GaugeKey::MemoryUsage, usage);
            }
            MetricFamily::Disk => {
                let usage = self.reader.disk_usage()?;
                self.publish(GaugeKey::DiskUsage, usage);
            }
            MetricFamily::Network => {
                let usage = self.reader.network_usage()?;
                if !usage.found {
                    warn!(
                        interface = self.reader.interface(),
                        "interface not found in net/dev, reporting zero traffic"
                    );
                }
                self.publish(GaugeKey::NetworkUsage, usage.total() as f64);
                self.publish(GaugeKey::NetworkReceive, usage.rx_bytes as f64);
                self.publish(GaugeKey::NetworkTransmit, usage.tx_bytes as f64);
            }
            MetricFamily::Processes => {
                let count = self.reader.process_count()?;
                self.publish(GaugeKey::ProcessCount, count);
            }
            MetricFamily::ContextSwitches => {
                let count = self.reader.context_switches()?;
                self.publish(GaugeKey::ContextSwitches, count);
            }
        }
        Ok(())
    }

    fn publish(&self, key: GaugeKey, value: f64) {
        if !self.gauges.set(key, value) {
            debug!(gauge = key.name(), "gauge unavailable, value dropped");
        }
    }
}

impl<F: FileSystem + 'static> Sampler<F> {
    /// Samples every `interval` until `shutdown` becomes `true` or its sender
    /// is dropped. Returns the number of completed cycles.
    ///
    /// The first cycle runs immediately. Each pass runs on the blocking pool
    /// since kernel reads are synchronous file I/O. A zero `interval` is
    /// rejected and no cycle runs.
    pub async fn run(self, interval: Duration, mut shutdown: watch::Receiver<bool>) -> u64 {
        if interval.is_zero() {
            error!("sampling interval must be non-zero, sampler not started");
            return 0;
        }

        let mut tick = tokio::time::interval(interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut sampler = self;
        let mut cycles: u64 = 0;

        info!(
            interval_ms = interval.as_millis() as u64,
            families = ?sampler.config.enabled().collect::<Vec<_>>(),
            "sampler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = tick.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        debug!("shutdown sender dropped");
                        break;
                    }
                    continue;
                }
            }

            let t0 = Instant::now();
            let result = tokio::task::spawn_blocking(move || {
                let report = sampler.sample_once();
                (sampler, report)
            })
            .await;
            let elapsed = t0.elapsed();

            let report = match result {
                Ok((returned, report)) => {
                    sampler = returned;
                    report
                }
                Err(e) => {
                    error!(error = %e, "sampling cycle panicked, sampler stopped");
                    return cycles;
                }
            };

            cycles += 1;
            debug!(
                cycle = cycles,
                duration_ms = elapsed.as_millis() as u64,
                updated = report.updated.len(),
                failed = report.failed.len(),
                "cycle completed"
            );

            if elapsed > interval / 2 {
                warn!(
                    duration_ms = elapsed.as_millis() as u64,
                    interval_ms = interval.as_millis() as u64,
                    "cycle exceeded 50% of interval"
                );
            }
        }

        info!(cycles, "sampler stopped");
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MockFs;

    fn sampler(fs: MockFs, config: MetricsConfig) -> Sampler<MockFs> {
        Sampler::new(
            KernelStatReader::new(fs, "/proc"),
            config,
            Arc::new(GaugeRegistry::new()),
        )
    }

    #[test]
    fn test_sample_once_updates_all_families() {
        let mut s = sampler(MockFs::typical_system(), MetricsConfig::all_enabled());

        let report = s.sample_once();

        assert!(report.is_clean());
        assert_eq!(report.updated, MetricFamily::ALL.to_vec());

        let g = s.gauges();
        assert!((g.get(GaugeKey::CpuUsage).unwrap() - 13800.0 / 94800.0 * 100.0).abs() < 1e-9);
        assert!((g.get(GaugeKey::MemoryUsage).unwrap() - 26.7578125).abs() < 1e-9);
        assert_eq!(g.get(GaugeKey::DiskUsage), Some(19134.0));
        assert_eq!(g.get(GaugeKey::NetworkUsage), Some(24691356.0));
        assert_eq!(g.get(GaugeKey::NetworkReceive), Some(12345678.0));
        assert_eq!(g.get(GaugeKey::NetworkTransmit), Some(12345678.0));
        assert_eq!(g.get(GaugeKey::ProcessCount), Some(2.0));
        assert_eq!(g.get(GaugeKey::ContextSwitches), Some(500000.0));
    }

    #[test]
    fn test_unchanged_sources_are_idempotent() {
        let mut s = sampler(MockFs::typical_system(), MetricsConfig::all_enabled());

        s.sample_once();
        let first = s.gauges().snapshot();

        let report = s.sample_once();
        let second = s.gauges().snapshot();

        // CPU has no elapsed time to measure and keeps its previous value
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, MetricFamily::Cpu);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cpu_follows_ticks() {
        let mut s = sampler(
            MockFs::typical_system(),
            MetricsConfig {
                cpu: true,
                ..Default::default()
            },
        );
        s.sample_once();

        *s.reader_mut().fs_mut() = MockFs::typical_system_next_tick();
        let report = s.sample_once();

        assert!(report.is_clean());
        assert!((s.gauges().get(GaugeKey::CpuUsage).unwrap() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_failures_keep_stale_values() {
        let mut s = sampler(MockFs::typical_system(), MetricsConfig::all_enabled());
        s.sample_once();

        *s.reader_mut().fs_mut() = MockFs::truncated_sources();
        let report = s.sample_once();

        let failed: Vec<MetricFamily> = report.failed.iter().map(|(f, _)| *f).collect();
        assert_eq!(
            failed,
            vec![
                MetricFamily::Cpu,
                MetricFamily::Memory,
                MetricFamily::Disk,
                MetricFamily::Processes,
                MetricFamily::ContextSwitches,
            ]
        );
        // Absent interface is not a failure
        assert_eq!(report.updated, vec![MetricFamily::Network]);

        let g = s.gauges();
        assert!((g.get(GaugeKey::MemoryUsage).unwrap() - 26.7578125).abs() < 1e-9);
        assert_eq!(g.get(GaugeKey::DiskUsage), Some(19134.0));
        assert_eq!(g.get(GaugeKey::ProcessCount), Some(2.0));
        assert_eq!(g.get(GaugeKey::ContextSwitches), Some(500000.0));
        assert_eq!(g.get(GaugeKey::NetworkUsage), Some(0.0));
    }

    #[test]
    fn test_vanished_sources_are_reported() {
        let mut s = sampler(MockFs::new(), MetricsConfig::all_enabled());
        let report = s.sample_once();

        assert!(report.updated.is_empty());
        assert_eq!(report.failed.len(), MetricFamily::ALL.len());
        assert!(
            report
                .failed
                .iter()
                .all(|(_, e)| matches!(e, ReadError::SourceUnavailable { .. }))
        );
    }

    #[test]
    fn test_disabled_families_are_skipped() {
        let mut s = sampler(
            MockFs::typical_system(),
            MetricsConfig {
                memory: true,
                ..Default::default()
            },
        );

        let report = s.sample_once();

        assert_eq!(report.updated, vec![MetricFamily::Memory]);
        assert_eq!(s.gauges().get(GaugeKey::CpuUsage), Some(0.0));
        assert_eq!(s.gauges().get(GaugeKey::DiskUsage), Some(0.0));
    }

    // Paused clock: sleeps advance time instantly and the ticker fires at
    // 0s, 1s, 2s, ... so cycle counts are exact.

    #[tokio::test(start_paused = true)]
    async fn test_run_until_cancelled() {
        let s = sampler(MockFs::typical_system(), MetricsConfig::all_enabled());
        let gauges = s.gauges().clone();
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(s.run(Duration::from_secs(1), rx));
        tokio::time::sleep(Duration::from_millis(3500)).await;
        tx.send(true).unwrap();

        assert_eq!(handle.await.unwrap(), 4);
        assert_eq!(gauges.get(GaugeKey::ProcessCount), Some(2.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_already_cancelled() {
        let s = sampler(MockFs::typical_system(), MetricsConfig::all_enabled());
        let gauges = s.gauges().clone();
        let (_tx, rx) = watch::channel(true);

        let cycles = s.run(Duration::from_secs(1), rx).await;

        assert_eq!(cycles, 0);
        assert_eq!(gauges.sampled(GaugeKey::ProcessCount), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_sender_dropped() {
        let s = sampler(MockFs::typical_system(), MetricsConfig::all_enabled());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(s.run(Duration::from_secs(1), rx));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        drop(tx);

        assert_eq!(handle.await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_rejects_zero_interval() {
        let s = sampler(MockFs::typical_system(), MetricsConfig::all_enabled());
        let gauges = s.gauges().clone();
        let (_tx, rx) = watch::channel(false);

        assert_eq!(s.run(Duration::ZERO, rx).await, 0);
        assert_eq!(gauges.sampled(GaugeKey::ProcessCount), None);
    }
}
