//! IDR Rates Common Types
//!
//! Shared types for the IDR rates service: currency codes and metadata,
//! rate payloads, the USD buy-spread calculation and validation errors.

pub mod currency;
pub mod rates;
pub mod spread;
pub mod error;
pub mod time;

pub use currency::*;
pub use rates::*;
pub use error::*;
pub use time::*;
