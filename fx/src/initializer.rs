//! Startup data initialization.
//!
//! Runs both snapshot sources concurrently under one deadline and always
//! leaves the store ready, in degraded mode when data is missing.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::FetchError;
use crate::payload::{Payload, ResourceKey};
use crate::provider::SnapshotSource;
use crate::store::{LoadEpoch, SharedSnapshotStore};

/// Configuration for the initializer.
#[derive(Debug, Clone)]
pub struct InitializerConfig {
    /// Global deadline for both fetches, measured from launch.
    pub deadline: Duration,
}

impl Default for InitializerConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(30),
        }
    }
}

/// Result of one source's fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(Payload),
    Failure(FetchError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// Final state the initializer left the store in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Every source loaded.
    Loaded,
    /// Some sources failed; their resources are absent.
    Partial { missing: Vec<ResourceKey> },
    /// Every source failed; the store is ready and empty.
    Empty,
    /// Deadline elapsed; the store was wiped and marked ready.
    DeadlineExceeded,
    /// Initialization itself failed unexpectedly; the store was marked ready as is.
    Aborted,
}

impl Disposition {
    /// Whether the service starts without its full dataset.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Disposition::Loaded)
    }
}

/// Populates the snapshot store from the latest-rates and currencies sources.
pub struct DataInitializer {
    store: SharedSnapshotStore,
    rates_source: Arc<dyn SnapshotSource>,
    currencies_source: Arc<dyn SnapshotSource>,
    config: InitializerConfig,
}

impl DataInitializer {
    /// Create a new initializer.
    pub fn new(
        store: SharedSnapshotStore,
        rates_source: Arc<dyn SnapshotSource>,
        currencies_source: Arc<dyn SnapshotSource>,
        config: InitializerConfig,
    ) -> Self {
        Self {
            store,
            rates_source,
            currencies_source,
            config,
        }
    }

    /// Run one initialization attempt.
    ///
    /// Never fails: on return the store is always ready.
    pub async fn initialize(&self) -> Disposition {
        let attempt_id = Uuid::now_v7();

        match AssertUnwindSafe(self.run(attempt_id)).catch_unwind().await {
            Ok(disposition) => disposition,
            Err(panic) => {
                error!(
                    attempt_id = %attempt_id,
                    panic = %panic_message(panic.as_ref()),
                    "Critical error during data initialization"
                );
                self.store.mark_ready();
                warn!(
                    attempt_id = %attempt_id,
                    "Application will start in degraded mode due to initialization errors"
                );
                Disposition::Aborted
            }
        }
    }

    #[instrument(skip(self), fields(deadline_ms = self.config.deadline.as_millis() as u64))]
    async fn run(&self, attempt_id: Uuid) -> Disposition {
        info!("Starting data initialization");

        let rates_key = self.rates_source.resource();
        let currencies_key = self.currencies_source.resource();
        let epoch = self.store.epoch();

        let rates = self.spawn_fetch(self.rates_source.clone(), epoch);
        let currencies = self.spawn_fetch(self.currencies_source.clone(), epoch);
        let aborts = [rates.abort_handle(), currencies.abort_handle()];

        let joined = tokio::time::timeout(self.config.deadline, async {
            tokio::join!(rates, currencies)
        })
        .await;

        match joined {
            Ok((rates, currencies)) => self.dispose([
                (rates_key, settle(rates_key, rates)),
                (currencies_key, settle(currencies_key, currencies)),
            ]),
            Err(_) => {
                for handle in &aborts {
                    handle.abort();
                }
                error!("Data initialization failed: deadline exceeded");
                self.store.clear_and_mark_ready();
                warn!("Starting application in degraded mode due to initialization failure");
                Disposition::DeadlineExceeded
            }
        }
    }

    fn spawn_fetch(
        &self,
        source: Arc<dyn SnapshotSource>,
        epoch: LoadEpoch,
    ) -> JoinHandle<FetchOutcome> {
        let store = self.store.clone();

        tokio::spawn(async move {
            let expected = source.resource();

            let error = match source.fetch().await {
                Ok(payload) if payload.key() == expected => {
                    if store.upsert_in_epoch(epoch, payload.clone()) {
                        info!(source = source.name(), resource = %expected, "Loaded resource");
                        return FetchOutcome::Success(payload);
                    }
                    FetchError::Superseded(expected)
                }
                Ok(payload) => FetchError::UnexpectedPayload {
                    expected,
                    actual: payload.key(),
                },
                Err(e) => e,
            };

            warn!(
                source = source.name(),
                resource = %expected,
                error = %error,
                code = error.error_code(),
                "Failed to load resource, continuing without it"
            );
            FetchOutcome::Failure(error)
        })
    }

    fn dispose<const N: usize>(&self, outcomes: [(ResourceKey, FetchOutcome); N]) -> Disposition {
        let missing: Vec<ResourceKey> = outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_success())
            .map(|(key, _)| *key)
            .collect();

        self.store.mark_ready();

        if missing.is_empty() {
            info!("Data initialization completed successfully");
            Disposition::Loaded
        } else if missing.len() == N {
            warn!("No data could be loaded, but application will start in degraded mode");
            Disposition::Empty
        } else {
            warn!(missing = ?missing, "Data initialization completed with missing resources");
            Disposition::Partial { missing }
        }
    }
}

fn settle(resource: ResourceKey, joined: Result<FetchOutcome, JoinError>) -> FetchOutcome {
    match joined {
        Ok(outcome) => outcome,
        Err(e) => {
            let reason = if e.is_panic() {
                panic_message(e.into_panic().as_ref())
            } else {
                e.to_string()
            };
            error!(resource = %resource, reason = %reason, "Fetch task failed");
            FetchOutcome::Failure(FetchError::TaskFailed { resource, reason })
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::provider::MockSource;
    use crate::store::SnapshotStore;
    use chrono::NaiveDate;
    use idr_rates_common::{Currency, LatestRates, SupportedCurrencies};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn latest() -> LatestRates {
        LatestRates {
            base: Currency::idr(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            rates: BTreeMap::from([("USD".to_string(), dec!(0.000065))]),
            usd_buy_spread_idr: None,
        }
    }

    fn currencies() -> SupportedCurrencies {
        SupportedCurrencies::from_codes(["USD", "EUR", "IDR"])
    }

    fn setup(
        rates: MockSource,
        currencies: MockSource,
    ) -> (SharedSnapshotStore, DataInitializer, Arc<MockSource>, Arc<MockSource>) {
        let store = Arc::new(SnapshotStore::new());
        let rates = Arc::new(rates);
        let currencies = Arc::new(currencies);
        let initializer = DataInitializer::new(
            store.clone(),
            rates.clone(),
            currencies.clone(),
            InitializerConfig::default(),
        );
        (store, initializer, rates, currencies)
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_succeed() {
        let (store, initializer, rates_source, currencies_source) = setup(
            MockSource::succeeding(latest()).with_delay(Duration::from_secs(1)),
            MockSource::succeeding(currencies()).with_delay(Duration::from_secs(2)),
        );

        let disposition = initializer.initialize().await;

        assert_eq!(disposition, Disposition::Loaded);
        assert!(store.is_ready());
        assert_eq!(*store.latest_rates().unwrap(), latest());
        assert_eq!(*store.supported_currencies().unwrap(), currencies());
        assert_eq!(rates_source.calls(), 1);
        assert_eq!(currencies_source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_rates_succeed() {
        let (store, initializer, _, _) = setup(
            MockSource::succeeding(latest()),
            MockSource::failing(ResourceKey::SupportedCurrencies, "API Error"),
        );

        let disposition = initializer.initialize().await;

        assert_eq!(
            disposition,
            Disposition::Partial {
                missing: vec![ResourceKey::SupportedCurrencies]
            }
        );
        assert!(store.is_ready());
        assert_eq!(store.keys(), vec![ResourceKey::LatestIdrRates]);
        assert_eq!(
            store.supported_currencies(),
            Err(StoreError::NotFound(ResourceKey::SupportedCurrencies))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_currencies_succeed() {
        let (store, initializer, _, _) = setup(
            MockSource::failing(ResourceKey::LatestIdrRates, "API Error"),
            MockSource::succeeding(currencies()),
        );

        let disposition = initializer.initialize().await;

        assert!(disposition.is_degraded());
        assert_eq!(store.keys(), vec![ResourceKey::SupportedCurrencies]);
        assert_eq!(
            store.latest_rates(),
            Err(StoreError::NotFound(ResourceKey::LatestIdrRates))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_fail() {
        let (store, initializer, _, _) = setup(
            MockSource::failing(ResourceKey::LatestIdrRates, "API Error"),
            MockSource::failing(ResourceKey::SupportedCurrencies, "API Error"),
        );

        let disposition = initializer.initialize().await;

        assert_eq!(disposition, Disposition::Empty);
        assert!(store.is_ready());
        assert!(store.is_empty());
        assert_eq!(
            store.latest_rates(),
            Err(StoreError::NotFound(ResourceKey::LatestIdrRates))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_block_other_source() {
        let (store, initializer, _, _) = setup(
            MockSource::failing(ResourceKey::LatestIdrRates, "API Error"),
            MockSource::succeeding(currencies()).with_delay(Duration::from_secs(20)),
        );

        let started = tokio::time::Instant::now();
        let disposition = initializer.initialize().await;

        assert!(started.elapsed() >= Duration::from_secs(20));
        assert!(matches!(disposition, Disposition::Partial { .. }));
        assert_eq!(store.keys(), vec![ResourceKey::SupportedCurrencies]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_wipes_partial_data() {
        let (store, initializer, _, _) = setup(
            MockSource::succeeding(latest()).with_delay(Duration::from_secs(5)),
            MockSource::hanging(ResourceKey::SupportedCurrencies),
        );

        let started = tokio::time::Instant::now();
        let disposition = initializer.initialize().await;

        assert_eq!(disposition, Disposition::DeadlineExceeded);
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(31));
        assert!(store.is_ready());
        assert!(store.is_empty());
        assert_eq!(
            store.latest_rates(),
            Err(StoreError::NotFound(ResourceKey::LatestIdrRates))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_discarded() {
        let (store, initializer, _, _) = setup(
            MockSource::succeeding(latest()).with_delay(Duration::from_secs(40)),
            MockSource::succeeding(currencies()).with_delay(Duration::from_secs(45)),
        );

        let disposition = initializer.initialize().await;
        assert_eq!(disposition, Disposition::DeadlineExceeded);

        tokio::time::sleep(Duration::from_secs(60)).await;

        assert!(store.is_ready());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_source_isolated() {
        let (store, initializer, _, _) = setup(
            MockSource::panicking(ResourceKey::LatestIdrRates),
            MockSource::succeeding(currencies()),
        );

        let disposition = initializer.initialize().await;

        assert_eq!(
            disposition,
            Disposition::Partial {
                missing: vec![ResourceKey::LatestIdrRates]
            }
        );
        assert_eq!(store.keys(), vec![ResourceKey::SupportedCurrencies]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mislabeled_payload_rejected() {
        let (store, initializer, _, _) = setup(
            MockSource::mislabeled(ResourceKey::LatestIdrRates, currencies()),
            MockSource::failing(ResourceKey::SupportedCurrencies, "API Error"),
        );

        let disposition = initializer.initialize().await;

        assert_eq!(disposition, Disposition::Empty);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_panic_still_marks_ready() {
        let (store, initializer, _, _) = setup(
            MockSource::succeeding(latest()).with_resource_panic(),
            MockSource::succeeding(currencies()),
        );

        let disposition = initializer.initialize().await;

        assert_eq!(disposition, Disposition::Aborted);
        assert!(store.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_deadline() {
        let store = Arc::new(SnapshotStore::new());
        let initializer = DataInitializer::new(
            store.clone(),
            Arc::new(MockSource::succeeding(latest()).with_delay(Duration::from_secs(3))),
            Arc::new(MockSource::succeeding(currencies())),
            InitializerConfig {
                deadline: Duration::from_secs(2),
            },
        );

        let disposition = initializer.initialize().await;

        assert_eq!(disposition, Disposition::DeadlineExceeded);
        assert!(store.is_empty());
    }
}
