//! Standalone delay monitoring loop.
//!
//! # Responsibilities
//! - Periodically probe monitored groups on a slower interval than the
//!   switcher
//! - Record one history entry per member, unreachable members included
//! - Run retention pruning once a day
//!
//! Probing here never changes selections; it only feeds the history sink.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::clash::ClashClient;
use crate::config::{MonitorConfig, MonitorTarget};
use crate::history::sink::{ProbeRecord, ProbeSink};

const PRUNE_EVERY: Duration = Duration::from_secs(24 * 60 * 60);

pub struct DelayMonitor {
    client: ClashClient,
    config: MonitorConfig,
    sink: Arc<dyn ProbeSink>,
}

impl DelayMonitor {
    pub fn new(client: ClashClient, config: MonitorConfig, sink: Arc<dyn ProbeSink>) -> Self {
        Self {
            client,
            config,
            sink,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled || self.config.targets.is_empty() {
            tracing::info!("Delay monitor disabled");
            return;
        }

        tracing::info!(
            interval_ms = self.config.interval_ms,
            targets = self.config.targets.len(),
            "Delay monitor starting"
        );

        let mut ticker = time::interval(Duration::from_millis(self.config.interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_prune = Instant::now();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.record_all().await;
                    if last_prune.elapsed() >= PRUNE_EVERY {
                        self.sink.prune(self.config.retention_days);
                        last_prune = Instant::now();
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Delay monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn record_all(&self) {
        for target in self.config.targets.iter().filter(|t| t.enabled) {
            if let Err(e) = self.record_group(target).await {
                tracing::warn!(group = %target.group, error = %e, "Delay monitoring failed for group");
            }
        }
    }

    async fn record_group(&self, target: &MonitorTarget) -> Result<(), crate::clash::ClashError> {
        let info = self.client.group_info(&target.group).await?;
        let report = self
            .client
            .probe_group(&target.group, &target.test_url, target.probe_timeout_ms)
            .await?;

        if report.is_empty() {
            tracing::warn!(group = %target.group, "Probe round returned no results");
            return Ok(());
        }

        let records: Vec<ProbeRecord> = info
            .all
            .iter()
            .map(|member| ProbeRecord::new(&target.group, member, report.get(member).copied()))
            .collect();

        tracing::debug!(group = %target.group, members = records.len(), "Recorded probe round");
        self.sink.record_probes(&records);
        Ok(())
    }
}
