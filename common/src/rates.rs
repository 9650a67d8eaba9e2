//! Exchange-rate payloads served by the API.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::serde::arbitrary_precision;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::currency::{Currency, CurrencyInfo};

/// Version reported in enriched currency responses.
pub const CATALOG_VERSION: &str = "2.0.0";

/// Latest rates quoted against a base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestRates {
    /// Base currency of the quote.
    pub base: Currency,
    /// Business date the rates apply to.
    pub date: NaiveDate,
    /// Quote currency code to rate.
    #[serde(serialize_with = "serialize_rates")]
    pub rates: BTreeMap<String, Decimal>,
    /// IDR cost of buying one USD including the spread, when USD is quoted.
    #[serde(
        rename = "USD_BuySpread_IDR",
        default,
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub usd_buy_spread_idr: Option<Decimal>,
}

impl LatestRates {
    /// Rate for a quote currency, if present.
    pub fn rate(&self, quote: &str) -> Option<Decimal> {
        self.rates.get(quote).copied()
    }
}

/// Plain list of supported currency codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedCurrencies {
    pub currencies: Vec<String>,
}

impl SupportedCurrencies {
    /// Build from provider codes, sorted and deduplicated.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut currencies: Vec<String> = codes
            .into_iter()
            .map(|c| c.into().to_uppercase())
            .collect();
        currencies.sort();
        currencies.dedup();
        Self { currencies }
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    /// Enrich every code with display metadata, preserving order.
    pub fn enrich(&self) -> EnrichedCurrencies {
        EnrichedCurrencies::new(
            self.currencies
                .iter()
                .map(|c| CurrencyInfo::enrich(c))
                .collect(),
        )
    }
}

/// Summary block attached to enriched currency responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub total_currencies: usize,
    pub supported_pairs: usize,
    pub base_currencies: Vec<Currency>,
    pub last_updated: DateTime<Utc>,
    pub version: String,
}

/// Currency list enriched with metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedCurrencies {
    pub currencies: Vec<CurrencyInfo>,
    pub metadata: CatalogMetadata,
}

impl EnrichedCurrencies {
    pub fn new(currencies: Vec<CurrencyInfo>) -> Self {
        let total = currencies.len();
        Self {
            currencies,
            metadata: CatalogMetadata {
                total_currencies: total,
                supported_pairs: total * total,
                base_currencies: vec![Currency::idr()],
                last_updated: Utc::now(),
                version: CATALOG_VERSION.to_string(),
            },
        }
    }
}

/// Historical time series for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRates {
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub amount: Option<Decimal>,
    pub base: Currency,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Rates per date; serialized newest date first.
    #[serde(serialize_with = "serialize_newest_first")]
    pub rates: BTreeMap<NaiveDate, BTreeMap<String, Decimal>>,
}

fn serialize_newest_first<S>(
    rates: &BTreeMap<NaiveDate, BTreeMap<String, Decimal>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(rates.len()))?;
    for (date, day) in rates.iter().rev() {
        map.serialize_entry(date, &ExactRates(day))?;
    }
    map.end()
}

fn serialize_rates<S>(rates: &BTreeMap<String, Decimal>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ExactRates(rates).serialize(serializer)
}

/// Rate map written with bare JSON numbers.
struct ExactRates<'a>(&'a BTreeMap<String, Decimal>);

impl Serialize for ExactRates<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (code, rate) in self.0 {
            map.serialize_entry(code, &Exact(rate))?;
        }
        map.end()
    }
}

struct Exact<'a>(&'a Decimal);

impl Serialize for Exact<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        arbitrary_precision::serialize(self.0, serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_latest_rates_json_shape() {
        let rates = LatestRates {
            base: Currency::idr(),
            date: date("2024-01-15"),
            rates: BTreeMap::from([("USD".to_string(), dec!(0.000064))]),
            usd_buy_spread_idr: Some(dec!(15800)),
        };

        let json = serde_json::to_string(&rates).unwrap();
        assert!(json.contains("\"base\":\"IDR\""));
        assert!(json.contains("\"date\":\"2024-01-15\""));
        assert!(json.contains("\"USD\":0.000064"));
        assert!(json.contains("\"USD_BuySpread_IDR\":15800"));
    }

    #[test]
    fn test_supported_currencies_sorted() {
        let list = SupportedCurrencies::from_codes(["usd", "EUR", "IDR", "EUR"]);
        assert_eq!(list.currencies, vec!["EUR", "IDR", "USD"]);
    }

    #[test]
    fn test_enriched_metadata() {
        let list = SupportedCurrencies::from_codes(["USD", "EUR", "IDR"]);
        let enriched = list.enrich();

        assert_eq!(enriched.currencies.len(), 3);
        assert_eq!(enriched.currencies[0].code, "EUR");
        assert_eq!(enriched.metadata.total_currencies, 3);
        assert_eq!(enriched.metadata.supported_pairs, 9);
        assert_eq!(enriched.metadata.base_currencies, vec![Currency::idr()]);
        assert_eq!(enriched.metadata.version, "2.0.0");
    }

    #[test]
    fn test_historical_newest_first() {
        let body = r#"{
            "amount": 1.0,
            "base": "IDR",
            "start_date": "2024-12-27",
            "end_date": "2025-01-10",
            "rates": {
                "2024-12-27": {"USD": 0.000066},
                "2025-01-10": {"USD": 0.000064},
                "2025-01-09": {"USD": 0.000065}
            }
        }"#;

        let parsed: HistoricalRates = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.rates.len(), 3);
        assert_eq!(parsed.rates[&date("2025-01-09")]["USD"], dec!(0.000065));

        let json = serde_json::to_string(&parsed).unwrap();
        assert!(json.contains("\"amount\":1.0"));
        assert!(json.contains("\"2025-01-09\":{\"USD\":0.000065}"));
        assert!(!json.contains("\"0.000065\""));
        let newest = json.find("2025-01-10\":").unwrap();
        let middle = json.find("2025-01-09\":").unwrap();
        let oldest = json.find("2024-12-27\":").unwrap();
        assert!(newest < middle && middle < oldest);
    }

    #[test]
    fn test_latest_rates_exact_numbers() {
        let rates = LatestRates {
            base: Currency::idr(),
            date: date("2024-01-15"),
            rates: BTreeMap::from([
                ("EUR".to_string(), dec!(0.000059)),
                ("USD".to_string(), dec!(0.000064)),
            ]),
            usd_buy_spread_idr: Some(dec!(15669.3750)),
        };

        let json = serde_json::to_string(&rates).unwrap();
        assert_eq!(
            json,
            r#"{"base":"IDR","date":"2024-01-15","rates":{"EUR":0.000059,"USD":0.000064},"USD_BuySpread_IDR":15669.3750}"#
        );

        let parsed: LatestRates = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rates);
    }

    #[test]
    fn test_latest_rates_without_spread() {
        let body = r#"{"base":"IDR","date":"2024-01-15","rates":{"EUR":0.000059}}"#;
        let parsed: LatestRates = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.usd_buy_spread_idr, None);

        let json = serde_json::to_string(&parsed).unwrap();
        assert!(json.contains("\"USD_BuySpread_IDR\":null"));
    }
}
