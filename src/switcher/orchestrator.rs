//! Tick orchestration for the auto-switch loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{self, MissedTickBehavior};

use crate::clash::{ClashClient, ClashResult};
use crate::config::SwitcherConfig;
use crate::engine::{decide, Action};
use crate::observability::metrics;
use crate::policy::{GroupPolicy, PolicyStore};

/// The auto-switch control loop.
pub struct AutoSwitcher {
    client: ClashClient,
    store: Arc<dyn PolicyStore>,
    interval: Duration,
    max_concurrent: usize,
}

impl AutoSwitcher {
    pub fn new(client: ClashClient, config: &SwitcherConfig, store: Arc<dyn PolicyStore>) -> Self {
        Self {
            client,
            store,
            interval: Duration::from_millis(config.interval_ms),
            max_concurrent: config.max_concurrent_groups.max(1),
        }
    }

    /// Run the tick loop until shutdown.
    ///
    /// A tick is awaited to completion before the next fires; a tick that
    /// overruns the interval delays the next one instead of overlapping it.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            max_concurrent_groups = self.max_concurrent,
            "Auto-switcher starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Auto-switcher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Process every enabled group once.
    pub async fn tick(&self) {
        let policies = self.store.list_enabled();
        if policies.is_empty() {
            return;
        }

        let limiter = Arc::new(Semaphore::new(self.max_concurrent));
        let mut workers = JoinSet::new();

        for policy in policies {
            let client = self.client.clone();
            let store = Arc::clone(&self.store);
            let limiter = Arc::clone(&limiter);

            workers.spawn(async move {
                // Semaphore is never closed while workers run.
                let Ok(_permit) = limiter.acquire().await else {
                    return;
                };
                let group = policy.group.clone();
                if let Err(e) = process_group(&client, store.as_ref(), policy).await {
                    metrics::record_probe_round(&group, false);
                    tracing::warn!(group = %group, error = %e, "Skipping group this tick");
                }
            });
        }

        while workers.join_next().await.is_some() {}
    }
}

/// One group's sub-tick: fetch, probe, decide, apply, persist.
///
/// Any controller error before the decision leaves the group's state
/// untouched; an apply error still persists the decided counter, since the
/// decision was sound and the next tick re-evaluates from fresh probes.
async fn process_group(
    client: &ClashClient,
    store: &dyn PolicyStore,
    mut policy: GroupPolicy,
) -> ClashResult<()> {
    let info = client.group_info(&policy.group).await?;
    let report = client
        .probe_group(&policy.group, &policy.test_url, policy.probe_timeout_ms)
        .await?;

    let decision = decide(&policy, &info.now, &report);

    metrics::record_probe_round(&policy.group, true);
    metrics::record_failure_count(&policy.group, decision.failure_count);
    let active_healthy = report
        .get(&info.now)
        .is_some_and(|d| *d <= policy.max_delay_ms);
    metrics::record_group_health(&policy.group, active_healthy);

    match &decision.action {
        Action::Stay => {
            if decision.failure_count > policy.failure_count {
                tracing::info!(
                    group = %policy.group,
                    active = %info.now,
                    failures = decision.failure_count,
                    threshold = policy.max_failures,
                    "Active endpoint unhealthy"
                );
            }
        }
        Action::SwitchTo(target) => {
            let delay = report.get(target).copied();
            match client.select_proxy(&policy.group, target).await {
                Ok(()) => {
                    metrics::record_switch(&policy.group);
                    tracing::info!(
                        group = %policy.group,
                        from = %info.now,
                        to = %target,
                        delay_ms = delay,
                        "Switched selection"
                    );
                }
                Err(e) => {
                    // The counter was already settled by the decision; the
                    // next tick retries from re-probed state.
                    tracing::warn!(
                        group = %policy.group,
                        to = %target,
                        error = %e,
                        "Failed to apply selection"
                    );
                }
            }
        }
    }

    if decision.failure_count != policy.failure_count {
        policy.failure_count = decision.failure_count;
        store.save(&policy);
    }

    Ok(())
}
