//! Snapshot source trait and test implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use idr_rates_common::{Currency, HistoricalRates};

use crate::error::FetchResult;
use crate::payload::{Payload, ResourceKey};

/// A capability that fetches one dataset from a remote provider.
///
/// Implementations are stateless and safe to call concurrently.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Resource this source produces.
    fn resource(&self) -> ResourceKey;

    /// Fetch a fresh snapshot.
    async fn fetch(&self) -> FetchResult<Payload>;
}

/// On-demand historical rate lookups.
#[async_trait]
pub trait HistoricalProvider: Send + Sync {
    /// Daily rates from `from` to `to` between two dates, inclusive.
    async fn historical(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        from: &Currency,
        to: &Currency,
    ) -> FetchResult<HistoricalRates>;
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockHistoricalProvider, MockResponse, MockSource};

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use idr_rates_common::{Currency, HistoricalRates};
    use parking_lot::Mutex;

    use super::{HistoricalProvider, SnapshotSource};
    use crate::error::{FetchError, FetchResult};
    use crate::payload::{Payload, ResourceKey};

    /// Scripted response of a [`MockSource`].
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        Payload(Payload),
        Fail(String),
        Panic,
        Hang,
    }

    /// Mock snapshot source for testing.
    pub struct MockSource {
        name: String,
        resource: ResourceKey,
        delay: Duration,
        response: MockResponse,
        panic_on_resource: bool,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn new(resource: ResourceKey, response: MockResponse) -> Self {
            Self {
                name: format!("mock-{}", resource),
                resource,
                delay: Duration::ZERO,
                response,
                panic_on_resource: false,
                calls: AtomicUsize::new(0),
            }
        }

        /// Source that returns the payload.
        pub fn succeeding(payload: impl Into<Payload>) -> Self {
            let payload = payload.into();
            Self::new(payload.key(), MockResponse::Payload(payload))
        }

        /// Source that fails with a provider error.
        pub fn failing(resource: ResourceKey, message: impl Into<String>) -> Self {
            Self::new(resource, MockResponse::Fail(message.into()))
        }

        /// Source that never completes.
        pub fn hanging(resource: ResourceKey) -> Self {
            Self::new(resource, MockResponse::Hang)
        }

        /// Source whose fetch panics.
        pub fn panicking(resource: ResourceKey) -> Self {
            Self::new(resource, MockResponse::Panic)
        }

        /// Source claiming one resource while returning another payload.
        pub fn mislabeled(resource: ResourceKey, payload: impl Into<Payload>) -> Self {
            Self::new(resource, MockResponse::Payload(payload.into()))
        }

        /// Delay the response.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        /// Panic when asked for the resource key.
        pub fn with_resource_panic(mut self) -> Self {
            self.panic_on_resource = true;
            self
        }

        /// Number of fetch calls so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SnapshotSource for MockSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn resource(&self) -> ResourceKey {
            if self.panic_on_resource {
                panic!("resource lookup failed for {}", self.name);
            }
            self.resource
        }

        async fn fetch(&self) -> FetchResult<Payload> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            match &self.response {
                MockResponse::Payload(payload) => Ok(payload.clone()),
                MockResponse::Fail(message) => Err(FetchError::Provider(message.clone())),
                MockResponse::Panic => panic!("mock source {} panicked", self.name),
                MockResponse::Hang => std::future::pending().await,
            }
        }
    }

    /// Historical provider returning a canned series.
    pub struct MockHistoricalProvider {
        response: Option<HistoricalRates>,
        requests: Mutex<Vec<(NaiveDate, NaiveDate, Currency, Currency)>>,
    }

    impl MockHistoricalProvider {
        pub fn returning(rates: HistoricalRates) -> Self {
            Self {
                response: Some(rates),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Provider that always fails.
        pub fn unavailable() -> Self {
            Self {
                response: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Requests received so far.
        pub fn requests(&self) -> Vec<(NaiveDate, NaiveDate, Currency, Currency)> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl HistoricalProvider for MockHistoricalProvider {
        async fn historical(
            &self,
            start: NaiveDate,
            end: NaiveDate,
            from: &Currency,
            to: &Currency,
        ) -> FetchResult<HistoricalRates> {
            self.requests
                .lock()
                .push((start, end, from.clone(), to.clone()));

            self.response
                .clone()
                .ok_or_else(|| FetchError::Provider("connection refused".to_string()))
        }
    }
}
