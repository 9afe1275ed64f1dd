//! procgauged - Prometheus exporter for host metrics.
//!
//! Samples CPU, memory, disk, network, process and context switch counters
//! from the /proc filesystem at a fixed interval and serves them over HTTP.

mod exporter;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use procgauge_core::collector::procfs::{DEFAULT_DISK_DEVICE, DEFAULT_INTERFACE};
use procgauge_core::collector::{KernelStatReader, RealFs};
use procgauge_core::{GaugeRegistry, MetricsConfig, Sampler};

use exporter::ExporterState;

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(name = "procgauged", about = "Host metrics Prometheus exporter", version = procgauge_core::VERSION)]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8000", env = "PROCGAUGE_LISTEN")]
    listen: SocketAddr,

    /// Sampling interval in seconds.
    #[arg(short, long, default_value = "1", env = "PROCGAUGE_INTERVAL",
          value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// JSON file selecting the metric families to sample.
    /// Without it every family is enabled.
    #[arg(short, long, env = "PROCGAUGE_CONFIG")]
    config: Option<PathBuf>,

    /// Block device reported by disk_usage.
    #[arg(long, default_value = DEFAULT_DISK_DEVICE)]
    disk_device: String,

    /// Network interface reported by the network gauges.
    #[arg(long, default_value = DEFAULT_INTERFACE)]
    interface: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("procgauged={level},procgauge_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(async_main(args)) {
        error!("{e}");
        process::exit(1);
    }
}

async fn async_main(args: Args) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => MetricsConfig::load(path).map_err(|e| e.to_string())?,
        None => MetricsConfig::all_enabled(),
    };

    info!(version = procgauge_core::VERSION, "procgauged starting");
    info!(
        "Config: interval={}s, proc={}, disk={}, interface={}",
        args.interval, args.proc_path, args.disk_device, args.interface
    );
    if config.enabled().next().is_none() {
        warn!("no metric families enabled, gauges will stay at zero");
    }

    let gauges = Arc::new(GaugeRegistry::new());

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .map_err(|e| format!("failed to bind {}: {}", args.listen, e))?;
    info!(addr = %args.listen, "listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let reader = KernelStatReader::new(RealFs::new(), args.proc_path)
        .with_disk_device(args.disk_device)
        .with_interface(args.interface);
    let sampler = Sampler::new(reader, config, Arc::clone(&gauges));
    let sampler_task = tokio::spawn(
        sampler.run(Duration::from_secs(args.interval), shutdown_rx.clone()),
    );

    let signal_task = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => warn!(error = %e, "failed to listen for Ctrl-C, shutting down"),
        }
        let _ = shutdown_tx.send(true);
    });

    let app = exporter::router(ExporterState { gauges, config });

    let mut server_shutdown = shutdown_rx;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = server_shutdown.wait_for(|stop| *stop).await;
        })
        .await;

    if let Err(e) = served {
        error!(error = %e, "server error");
    }

    // Dropping the sender also stops the sampler when the server exits on its own
    signal_task.abort();

    info!("Shutting down...");
    match sampler_task.await {
        Ok(cycles) => info!(cycles, "sampler finished"),
        Err(e) => error!(error = %e, "sampler task failed"),
    }

    Ok(())
}
