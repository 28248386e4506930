//! clash-autoswitch entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use clash_autoswitch::clash::ClashClient;
use clash_autoswitch::config::{load_config, MonitorConfig};
use clash_autoswitch::history::sink::NullProbeSink;
use clash_autoswitch::history::{DelayMonitor, JsonlProbeSink, ProbeSink};
use clash_autoswitch::lifecycle::{signals, Shutdown};
use clash_autoswitch::observability::{logging, metrics};
use clash_autoswitch::policy::MemoryPolicyStore;
use clash_autoswitch::switcher::AutoSwitcher;

#[derive(Parser, Debug)]
#[command(name = "clash-autoswitch", about = "Keep Clash proxy groups on healthy endpoints")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "autoswitch.toml")]
    config: PathBuf,

    /// Load and validate the configuration, then exit.
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;

    if cli.validate {
        println!("configuration ok: {}", cli.config.display());
        return Ok(());
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        config = %cli.config.display(),
        controller = %config.clash.base_url,
        groups = config.switcher.groups.len(),
        interval_ms = config.switcher.interval_ms,
        "clash-autoswitch starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    error = %e,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let client = ClashClient::new(&config.clash)?;

    // Connectivity check only; an unreachable controller at startup is not
    // fatal, the loop retries every tick.
    match client.version().await {
        Ok(version) => tracing::info!(version = %version, "Connected to Clash controller"),
        Err(e) => tracing::warn!(error = %e, "Clash controller not reachable at startup"),
    }

    let store = Arc::new(MemoryPolicyStore::new(
        config.switcher.groups.clone(),
        config.switcher.state_path.clone(),
    ));

    let shutdown = Shutdown::new();

    let switcher = AutoSwitcher::new(client.clone(), &config.switcher, store);
    let switcher_task = tokio::spawn(switcher.run(shutdown.subscribe()));

    let monitor_task = tokio::spawn(spawn_monitor(
        client,
        config.monitor.clone(),
        shutdown.subscribe(),
    ));

    signals::wait_for_signal(&shutdown).await;
    tracing::info!("Shutting down");

    let _ = switcher_task.await;
    let _ = monitor_task.await;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn spawn_monitor(
    client: ClashClient,
    config: MonitorConfig,
    shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    let sink: Arc<dyn ProbeSink> = if config.enabled {
        Arc::new(JsonlProbeSink::new(config.history_path.clone()))
    } else {
        Arc::new(NullProbeSink)
    };
    DelayMonitor::new(client, config, sink).run(shutdown).await;
}
