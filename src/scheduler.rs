use crate::configuration::SchedulerSettings;
use crate::data_models::{Match, Product};
use crate::db::{PreferenceStore, Preferences, SnapshotCache};
use crate::matcher::matching_products;
use crate::notifier::{Notifier, NotifyError};
use crate::parser::{CatalogSource, ParserError};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tokio::time::{timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Fetching,
    Matching,
    Dispatching,
    FetchFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub products: usize,
    pub matches: usize,
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    FetchFailed,
}

/// Every match of every user against the freshly fetched listing.
pub fn collect_matches(preferences: &Preferences, products: &[Product]) -> Vec<Match> {
    preferences
        .iter()
        .flat_map(|(user, keywords)| {
            matching_products(products, keywords)
                .into_iter()
                .map(move |product| Match {
                    user: user.clone(),
                    product,
                })
        })
        .collect()
}

/// Drives fetch → snapshot → match → notify on a fixed interval.
pub struct AlertScheduler {
    source: Arc<dyn CatalogSource>,
    notifier: Arc<dyn Notifier>,
    preferences: Arc<PreferenceStore>,
    snapshot: Arc<SnapshotCache>,
    settings: SchedulerSettings,
    state: Mutex<CycleState>,
    transitions: broadcast::Sender<CycleState>,
}

impl AlertScheduler {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        notifier: Arc<dyn Notifier>,
        preferences: Arc<PreferenceStore>,
        snapshot: Arc<SnapshotCache>,
        settings: SchedulerSettings,
    ) -> Self {
        let (transitions, _) = broadcast::channel(16);
        Self {
            source,
            notifier,
            preferences,
            snapshot,
            settings,
            state: Mutex::new(CycleState::Idle),
            transitions,
        }
    }

    pub fn state(&self) -> CycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every state the scheduler enters from now on, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<CycleState> {
        self.transitions.subscribe()
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            source = self.source.name(),
            interval = ?self.settings.poll_interval,
            "alert scheduler started"
        );
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                _ = shutdown.cancelled() => {
                    warn!(state = ?self.state(), "shutdown interrupted an alert cycle");
                    break;
                }
                _ = self.run_cycle() => {}
            }
        }
        self.transition(CycleState::Idle);
        info!("alert scheduler stopped");
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        self.transition(CycleState::Fetching);
        let products = match timeout(self.settings.fetch_timeout, self.source.fetch()).await {
            Ok(Ok(products)) => products,
            Ok(Err(err)) => return self.fetch_failed(err),
            Err(_) => return self.fetch_failed(ParserError::Timeout(self.settings.fetch_timeout)),
        };
        let mut products = products;
        products.truncate(self.snapshot.max_products());
        if let Err(err) = self.snapshot.replace(products.clone()) {
            warn!(error = %err, "failed to persist catalog snapshot");
        }

        self.transition(CycleState::Matching);
        let preferences = self.preferences.snapshot();
        let matches = collect_matches(&preferences, &products);

        self.transition(CycleState::Dispatching);
        let (sent, failed) = self.dispatch(&matches).await;

        self.transition(CycleState::Idle);
        let report = CycleReport {
            products: products.len(),
            matches: matches.len(),
            sent,
            failed,
        };
        info!(
            products = report.products,
            users = preferences.len(),
            matches = report.matches,
            sent = report.sent,
            failed = report.failed,
            "alert cycle finished"
        );
        CycleOutcome::Completed(report)
    }

    async fn dispatch(&self, matches: &[Match]) -> (usize, usize) {
        let (mut sent, mut failed) = (0, 0);
        for alert in matches {
            let text = alert.product.alert_text();
            let result = timeout(
                self.settings.send_timeout,
                self.notifier.send(&alert.user, &text),
            )
            .await
            .unwrap_or(Err(NotifyError::Timeout(self.settings.send_timeout)));
            match result {
                Ok(()) => sent += 1,
                Err(err) => {
                    failed += 1;
                    warn!(
                        user = %alert.user,
                        product = %alert.product.title,
                        error = %err,
                        "failed to send alert"
                    );
                }
            }
        }
        (sent, failed)
    }

    fn fetch_failed(&self, err: ParserError) -> CycleOutcome {
        self.transition(CycleState::FetchFailed);
        error!(source = self.source.name(), error = %err, "catalog fetch failed, skipping cycle");
        self.transition(CycleState::Idle);
        CycleOutcome::FetchFailed
    }

    fn transition(&self, state: CycleState) {
        debug!(state = ?state, "alert cycle state");
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        // no subscribers is fine
        let _ = self.transitions.send(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::UserId;

    #[test]
    fn collect_matches_pairs_users_with_products() {
        let mut preferences = Preferences::new();
        preferences.insert(UserId::new("1"), vec!["laptop".to_string()]);
        preferences.insert(UserId::new("2"), vec!["chair".to_string(), "desk".to_string()]);
        preferences.insert(UserId::new("3"), vec!["phone".to_string()]);
        let products = vec![
            Product::dummy("Gaming Laptop X1"),
            Product::dummy("Desk Chair"),
        ];

        let matches = collect_matches(&preferences, &products);
        assert_eq!(
            matches,
            vec![
                Match {
                    user: UserId::new("1"),
                    product: Product::dummy("Gaming Laptop X1"),
                },
                Match {
                    user: UserId::new("2"),
                    product: Product::dummy("Desk Chair"),
                },
            ]
        );
    }

    #[test]
    fn collect_matches_without_products_is_empty() {
        let mut preferences = Preferences::new();
        preferences.insert(UserId::new("1"), vec!["laptop".to_string()]);
        assert!(collect_matches(&preferences, &[]).is_empty());
    }
}
