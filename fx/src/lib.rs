//! IDR Rates FX Data Layer
//!
//! Fetches exchange-rate snapshots from the rate provider at startup and
//! serves them to request handlers.
//!
//! # Features
//!
//! - Concurrent startup fetch of latest rates and supported currencies
//! - Single global deadline with fail-open degraded mode
//! - Snapshot store with linearizable readiness
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use idr_rates_fx::{DataInitializer, InitializerConfig, SnapshotStore};
//!
//! let store = Arc::new(SnapshotStore::new());
//! let initializer = DataInitializer::new(store.clone(), rates, currencies, InitializerConfig::default());
//!
//! initializer.initialize().await;
//! let rates = store.latest_rates()?;
//! ```

pub mod error;
pub mod frankfurter;
pub mod initializer;
pub mod payload;
pub mod provider;
pub mod store;

pub use error::{FetchError, FetchResult, StoreError, StoreResult};
pub use frankfurter::{
    FrankfurterClient, LatestRatesSource, ProviderConfig, SupportedCurrenciesSource,
};
pub use initializer::{DataInitializer, Disposition, FetchOutcome, InitializerConfig};
pub use payload::{Payload, Resource, ResourceKey, UnknownResource};
pub use provider::{HistoricalProvider, SnapshotSource};
pub use store::{LoadEpoch, SharedSnapshotStore, SnapshotStore};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::{MockHistoricalProvider, MockResponse, MockSource};
