//! Shared handler state and service status.

use std::sync::Arc;

use idr_rates_fx::{HistoricalProvider, SharedSnapshotStore};

/// Service readiness as reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    /// Startup data load still running.
    Initializing,
    /// Serving requests, possibly in degraded mode.
    Up,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Initializing => "INITIALIZING",
            ServiceStatus::Up => "UP",
        }
    }

    /// Check if the service accepts data requests.
    pub fn accepts_requests(&self) -> bool {
        matches!(self, ServiceStatus::Up)
    }
}

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Snapshot store populated at startup.
    pub store: SharedSnapshotStore,
    /// Provider for on-demand historical lookups.
    pub historical: Arc<dyn HistoricalProvider>,
}

impl AppState {
    pub fn new(store: SharedSnapshotStore, historical: Arc<dyn HistoricalProvider>) -> Self {
        Self { store, historical }
    }

    /// Current service status.
    pub fn status(&self) -> ServiceStatus {
        if self.store.is_ready() {
            ServiceStatus::Up
        } else {
            ServiceStatus::Initializing
        }
    }
}
