//! Frankfurter API client and the two startup sources built on it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use idr_rates_common::spread::{spread_factor, usd_buy_spread_idr};
use idr_rates_common::{Currency, HistoricalRates, LatestRates, SupportedCurrencies, DATE_FORMAT};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{FetchError, FetchResult};
use crate::payload::{Payload, ResourceKey};
use crate::provider::{HistoricalProvider, SnapshotSource};

/// Configuration for the rate provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the Frankfurter API.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.frankfurter.app".to_string(),
            timeout: Duration::from_millis(5000),
            user_agent: concat!("idr-rates/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `/latest` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestQuote {
    pub base: Currency,
    pub date: NaiveDate,
    pub rates: BTreeMap<String, Decimal>,
}

/// HTTP client for the Frankfurter API.
pub struct FrankfurterClient {
    http: Client,
    base_url: String,
}

impl FrankfurterClient {
    /// Create a new client.
    pub fn new(config: &ProviderConfig) -> FetchResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> FetchResult<T> {
        let url = self.url(path);
        debug!(url = %url, "Calling rate provider");

        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Latest rates quoted against `base`.
    #[instrument(skip(self), fields(base = %base))]
    pub async fn latest(&self, base: &Currency) -> FetchResult<LatestQuote> {
        self.get_json("/latest", &[("base", base.code())]).await
    }

    /// Currency codes mapped to their names.
    #[instrument(skip(self))]
    pub async fn currencies(&self) -> FetchResult<BTreeMap<String, String>> {
        self.get_json("/currencies", &[]).await
    }
}

#[async_trait]
impl HistoricalProvider for FrankfurterClient {
    #[instrument(skip(self))]
    async fn historical(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        from: &Currency,
        to: &Currency,
    ) -> FetchResult<HistoricalRates> {
        let path = format!(
            "/{}..{}",
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT)
        );
        self.get_json(&path, &[("from", from.code()), ("to", to.code())])
            .await
    }
}

/// Source of the latest IDR rates with the USD buy spread applied.
pub struct LatestRatesSource {
    client: Arc<FrankfurterClient>,
    base: Currency,
    spread_factor: Decimal,
}

impl LatestRatesSource {
    /// Create a source quoting against IDR, with the spread derived from `username`.
    pub fn new(client: Arc<FrankfurterClient>, username: &str) -> Self {
        Self {
            client,
            base: Currency::idr(),
            spread_factor: spread_factor(username),
        }
    }

    fn transform(&self, quote: LatestQuote) -> LatestRates {
        let usd_buy_spread_idr = quote
            .rates
            .get(Currency::usd().code())
            .map(|rate| usd_buy_spread_idr(*rate, self.spread_factor));

        LatestRates {
            base: quote.base,
            date: quote.date,
            rates: quote.rates,
            usd_buy_spread_idr,
        }
    }
}

#[async_trait]
impl SnapshotSource for LatestRatesSource {
    fn name(&self) -> &str {
        "frankfurter-latest"
    }

    fn resource(&self) -> ResourceKey {
        ResourceKey::LatestIdrRates
    }

    async fn fetch(&self) -> FetchResult<Payload> {
        let quote = self.client.latest(&self.base).await?;
        Ok(self.transform(quote).into())
    }
}

/// Source of the provider's supported currency codes.
pub struct SupportedCurrenciesSource {
    client: Arc<FrankfurterClient>,
}

impl SupportedCurrenciesSource {
    pub fn new(client: Arc<FrankfurterClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SnapshotSource for SupportedCurrenciesSource {
    fn name(&self) -> &str {
        "frankfurter-currencies"
    }

    fn resource(&self) -> ResourceKey {
        ResourceKey::SupportedCurrencies
    }

    async fn fetch(&self) -> FetchResult<Payload> {
        let names = self.client.currencies().await?;
        Ok(SupportedCurrencies::from_codes(names.into_keys()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn client(base_url: &str) -> Arc<FrankfurterClient> {
        let config = ProviderConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        Arc::new(FrankfurterClient::new(&config).unwrap())
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = client("http://localhost:9/");
        assert_eq!(client.url("/latest"), "http://localhost:9/latest");
    }

    #[test]
    fn test_decode_latest_quote() {
        let body = r#"{"amount":1.0,"base":"IDR","date":"2024-01-15","rates":{"EUR":0.000059,"USD":0.000064}}"#;
        let quote: LatestQuote = serde_json::from_str(body).unwrap();

        assert_eq!(quote.base, Currency::idr());
        assert_eq!(quote.rates["USD"], dec!(0.000064));
        assert_eq!(quote.rates["EUR"], dec!(0.000059));
    }

    #[test]
    fn test_transform_applies_spread() {
        // "abc" -> factor 0.00294
        let source = LatestRatesSource::new(client("http://localhost:9"), "abc");
        let quote = LatestQuote {
            base: Currency::idr(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            rates: BTreeMap::from([("USD".to_string(), dec!(0.0001))]),
        };

        let rates = source.transform(quote);

        assert_eq!(rates.usd_buy_spread_idr, Some(dec!(10029.4)));
        assert_eq!(rates.rate("USD"), Some(dec!(0.0001)));
    }

    #[test]
    fn test_transform_without_usd() {
        let source = LatestRatesSource::new(client("http://localhost:9"), "abc");
        let quote = LatestQuote {
            base: Currency::idr(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            rates: BTreeMap::from([("EUR".to_string(), dec!(0.000059))]),
        };

        assert_eq!(source.transform(quote).usd_buy_spread_idr, None);
    }

    #[tokio::test]
    async fn test_unreachable_provider_fails() {
        // Bind then drop to get a local port with nothing listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let source = SupportedCurrenciesSource::new(client(&format!("http://127.0.0.1:{}", port)));

        let result = source.fetch().await;

        let err = result.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
        assert_eq!(err.error_code(), "HTTP_ERROR");
    }
}
