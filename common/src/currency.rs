//! Currency codes and the static currency metadata table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code, normalizing to upper case.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Parse a strict ISO 4217 code: exactly three upper-case ASCII letters.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code.to_string()))
        } else {
            Err(ValidationError::InvalidCurrencyCode(code.to_string()))
        }
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Whether this currency is one of the service's base currencies.
    pub fn is_base(&self) -> bool {
        matches!(self.0.as_str(), "IDR" | "USD")
    }

    pub fn idr() -> Self {
        Self::new("IDR")
    }

    pub fn usd() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Static description of a known currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyMetadata {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub country: &'static str,
    pub country_code: &'static str,
    pub decimal_places: u32,
}

const fn meta(
    code: &'static str,
    name: &'static str,
    symbol: &'static str,
    country: &'static str,
    country_code: &'static str,
    decimal_places: u32,
) -> CurrencyMetadata {
    CurrencyMetadata {
        code,
        name,
        symbol,
        country,
        country_code,
        decimal_places,
    }
}

/// Known currencies, sorted by code.
static CURRENCY_TABLE: &[CurrencyMetadata] = &[
    meta("AUD", "Australian Dollar", "$", "Australia", "AU", 2),
    meta("BGN", "Bulgarian Lev", "лв", "Bulgaria", "BG", 2),
    meta("BRL", "Brazilian Real", "R$", "Brazil", "BR", 2),
    meta("CAD", "Canadian Dollar", "$", "Canada", "CA", 2),
    meta("CHF", "Swiss Franc", "CHF", "Switzerland", "CH", 2),
    meta("CNY", "Chinese Yuan", "¥", "China", "CN", 2),
    meta("CZK", "Czech Koruna", "Kč", "Czech Republic", "CZ", 2),
    meta("DKK", "Danish Krone", "kr", "Denmark", "DK", 2),
    meta("EUR", "Euro", "€", "European Union", "EU", 2),
    meta("GBP", "British Pound", "£", "United Kingdom", "GB", 2),
    meta("HKD", "Hong Kong Dollar", "$", "Hong Kong", "HK", 2),
    meta("HUF", "Hungarian Forint", "Ft", "Hungary", "HU", 2),
    meta("IDR", "Indonesian Rupiah", "Rp", "Indonesia", "ID", 0),
    meta("ILS", "Israeli New Shekel", "₪", "Israel", "IL", 2),
    meta("INR", "Indian Rupee", "₹", "India", "IN", 2),
    meta("ISK", "Icelandic Króna", "kr", "Iceland", "IS", 0),
    meta("JPY", "Japanese Yen", "¥", "Japan", "JP", 0),
    meta("KRW", "South Korean Won", "₩", "South Korea", "KR", 0),
    meta("MXN", "Mexican Peso", "$", "Mexico", "MX", 2),
    meta("MYR", "Malaysian Ringgit", "RM", "Malaysia", "MY", 2),
    meta("NOK", "Norwegian Krone", "kr", "Norway", "NO", 2),
    meta("NZD", "New Zealand Dollar", "$", "New Zealand", "NZ", 2),
    meta("PHP", "Philippine Peso", "₱", "Philippines", "PH", 2),
    meta("PLN", "Polish Złoty", "zł", "Poland", "PL", 2),
    meta("RON", "Romanian Leu", "lei", "Romania", "RO", 2),
    meta("SEK", "Swedish Krona", "kr", "Sweden", "SE", 2),
    meta("SGD", "Singapore Dollar", "$", "Singapore", "SG", 2),
    meta("THB", "Thai Baht", "฿", "Thailand", "TH", 2),
    meta("TRY", "Turkish Lira", "₺", "Turkey", "TR", 2),
    meta("USD", "United States Dollar", "$", "United States", "US", 2),
    meta("ZAR", "South African Rand", "R", "South Africa", "ZA", 2),
];

/// Look up metadata for a currency code (case-insensitive).
pub fn lookup(code: &str) -> Option<&'static CurrencyMetadata> {
    let code = code.to_uppercase();
    CURRENCY_TABLE
        .binary_search_by(|m| m.code.cmp(code.as_str()))
        .ok()
        .map(|idx| &CURRENCY_TABLE[idx])
}

/// Currency enriched with display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub country: String,
    pub country_code: String,
    pub is_base_currency: bool,
    pub decimal_places: u32,
    pub display_name: String,
}

impl CurrencyInfo {
    /// Enrich a currency code. Unknown codes get a placeholder entry.
    pub fn enrich(code: &str) -> Self {
        let currency = Currency::new(code);

        match lookup(currency.code()) {
            Some(m) => Self {
                code: currency.code().to_string(),
                name: m.name.to_string(),
                symbol: m.symbol.to_string(),
                country: m.country.to_string(),
                country_code: m.country_code.to_string(),
                is_base_currency: currency.is_base(),
                decimal_places: m.decimal_places,
                display_name: format!("{} ({}) - {}", m.name, m.code, m.symbol),
            },
            None => {
                let code = currency.code().to_string();
                Self {
                    display_name: format!("{} ({}) - ", code, code),
                    name: code.clone(),
                    code,
                    symbol: String::new(),
                    country: "Unknown".to_string(),
                    country_code: "XX".to_string(),
                    is_base_currency: false,
                    decimal_places: 2,
                }
            }
        }
    }
}
