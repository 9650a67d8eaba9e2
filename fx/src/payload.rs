//! Resource keys and the payloads stored under them.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use idr_rates_common::{LatestRates, SupportedCurrencies};
use thiserror::Error;

/// Datasets the store can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKey {
    LatestIdrRates,
    SupportedCurrencies,
}

impl ResourceKey {
    /// Every key, in a stable order.
    pub const ALL: [ResourceKey; 2] = [ResourceKey::LatestIdrRates, ResourceKey::SupportedCurrencies];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKey::LatestIdrRates => "latest_idr_rates",
            ResourceKey::SupportedCurrencies => "supported_currencies",
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized resource name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown resource type: {0}")]
pub struct UnknownResource(pub String);

impl FromStr for ResourceKey {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

/// A dataset held by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    LatestRates(Arc<LatestRates>),
    SupportedCurrencies(Arc<SupportedCurrencies>),
}

impl Payload {
    /// Key this payload is stored under.
    pub fn key(&self) -> ResourceKey {
        match self {
            Payload::LatestRates(_) => ResourceKey::LatestIdrRates,
            Payload::SupportedCurrencies(_) => ResourceKey::SupportedCurrencies,
        }
    }
}

impl From<LatestRates> for Payload {
    fn from(rates: LatestRates) -> Self {
        Payload::LatestRates(Arc::new(rates))
    }
}

impl From<SupportedCurrencies> for Payload {
    fn from(currencies: SupportedCurrencies) -> Self {
        Payload::SupportedCurrencies(Arc::new(currencies))
    }
}

/// A payload type that can be read back out of the store.
pub trait Resource: Send + Sync + 'static {
    /// Name used in type-mismatch errors.
    const TYPE_NAME: &'static str;

    /// Borrow this type out of a payload, if it matches.
    fn from_payload(payload: &Payload) -> Option<Arc<Self>>;
}

impl Resource for LatestRates {
    const TYPE_NAME: &'static str = "LatestRates";

    fn from_payload(payload: &Payload) -> Option<Arc<Self>> {
        match payload {
            Payload::LatestRates(rates) => Some(rates.clone()),
            _ => None,
        }
    }
}

impl Resource for SupportedCurrencies {
    const TYPE_NAME: &'static str = "SupportedCurrencies";

    fn from_payload(payload: &Payload) -> Option<Arc<Self>> {
        match payload {
            Payload::SupportedCurrencies(currencies) => Some(currencies.clone()),
            _ => None,
        }
    }
}
