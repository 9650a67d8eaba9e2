//! IDR Rates Server
//!
//! HTTP surface over the startup snapshot store: health, latest IDR rates,
//! supported currencies and on-demand historical lookups.

pub mod api;
pub mod config;
pub mod state;

pub use api::{router, ApiError, BASE_PATH};
pub use config::ServiceConfig;
pub use state::{AppState, ServiceStatus};
