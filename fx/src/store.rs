//! Snapshot store shared between the initializer and request handlers.
//!
//! Map, readiness flag and load epoch live under one lock, so a reader that
//! sees `ready` also sees every write made before the flag was set. The flag
//! is mirrored in an atomic for lock-free readiness polling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use idr_rates_common::{LatestRates, SupportedCurrencies};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::payload::{Payload, Resource, ResourceKey};

/// Identifies one populate cycle. Advanced by every clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadEpoch(u64);

#[derive(Debug, Default)]
struct Snapshot {
    entries: HashMap<ResourceKey, Payload>,
    ready: bool,
    epoch: u64,
}

impl Snapshot {
    fn reset(&mut self) {
        self.entries.clear();
        self.ready = false;
        self.epoch += 1;
    }
}

/// Concurrency-safe keyed snapshot container with a readiness flag.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    inner: RwLock<Snapshot>,
    ready: AtomicBool,
}

impl SnapshotStore {
    /// Create an empty, not-ready store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload under its key, replacing any previous value.
    pub fn upsert(&self, payload: impl Into<Payload>) {
        let payload = payload.into();
        let key = payload.key();
        self.inner.write().entries.insert(key, payload);
        debug!(resource = %key, "Stored resource");
    }

    /// Current load epoch.
    pub fn epoch(&self) -> LoadEpoch {
        LoadEpoch(self.inner.read().epoch)
    }

    /// Store a payload only while `epoch` is current and the store is not ready.
    ///
    /// Returns whether the write was applied.
    pub fn upsert_in_epoch(&self, epoch: LoadEpoch, payload: impl Into<Payload>) -> bool {
        let payload = payload.into();
        let key = payload.key();
        let mut inner = self.inner.write();

        if inner.ready || inner.epoch != epoch.0 {
            debug!(
                resource = %key,
                epoch = epoch.0,
                current_epoch = inner.epoch,
                "Rejected write from closed load"
            );
            return false;
        }

        inner.entries.insert(key, payload);
        true
    }

    /// Read a payload of type `T` stored under `key`.
    pub fn get<T: Resource>(&self, key: ResourceKey) -> StoreResult<Arc<T>> {
        let payload = self.get_payload(key)?;
        T::from_payload(&payload).ok_or(StoreError::TypeMismatch {
            key,
            expected: T::TYPE_NAME,
        })
    }

    /// Read whatever is stored under `key`.
    pub fn get_payload(&self, key: ResourceKey) -> StoreResult<Payload> {
        let inner = self.inner.read();
        if !inner.ready {
            return Err(StoreError::NotReady);
        }
        inner
            .entries
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound(key))
    }

    /// Latest IDR rates.
    pub fn latest_rates(&self) -> StoreResult<Arc<LatestRates>> {
        self.get(ResourceKey::LatestIdrRates)
    }

    /// Supported currency list.
    pub fn supported_currencies(&self) -> StoreResult<Arc<SupportedCurrencies>> {
        self.get(ResourceKey::SupportedCurrencies)
    }

    /// Mark the store ready. Idempotent.
    pub fn mark_ready(&self) {
        let mut inner = self.inner.write();
        inner.ready = true;
        self.ready.store(true, Ordering::Release);
        drop(inner);
        info!("Data store marked ready");
    }

    /// Drop every entry and reset to not ready.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.reset();
        self.ready.store(false, Ordering::Release);
        let epoch = inner.epoch;
        drop(inner);
        info!(epoch, "Data store cleared");
    }

    /// Drop every entry and mark ready in one step, with no not-ready window
    /// visible to readers.
    pub fn clear_and_mark_ready(&self) {
        let mut inner = self.inner.write();
        inner.reset();
        inner.ready = true;
        self.ready.store(true, Ordering::Release);
        let epoch = inner.epoch;
        drop(inner);
        info!(epoch, "Data store cleared and marked ready");
    }

    /// Whether the store has been marked ready. Lock-free.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Keys currently held, in stable order.
    pub fn keys(&self) -> Vec<ResourceKey> {
        let inner = self.inner.read();
        let mut keys: Vec<ResourceKey> = inner.entries.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ready but missing at least one known resource.
    pub fn is_degraded(&self) -> bool {
        let inner = self.inner.read();
        inner.ready && inner.entries.len() < ResourceKey::ALL.len()
    }
}

/// Shared snapshot store.
pub type SharedSnapshotStore = Arc<SnapshotStore>;
