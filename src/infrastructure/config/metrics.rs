//! Per-metric provider, weight and scoring configuration.
//!
//! When a config file has no `[[metrics]]` entries the eight defaults below
//! are used, in this order.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::domain::{MetricKind, MetricSpec, Scorer, DEFAULT_TTL};
use crate::error::{ConfigError, Result};

/// One `[[metrics]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricConfig {
    pub id: MetricKind,
    /// Primary provider URL.
    pub primary: String,
    /// Backup provider URL. Must differ from `primary`.
    pub backup: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// How long a retrieved value stays fresh in the cache.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    pub scoring: Scorer,
}

fn default_weight() -> f64 {
    1.0
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

impl MetricConfig {
    #[must_use]
    pub fn new(id: MetricKind, primary: &str, backup: &str, scoring: Scorer) -> Self {
        Self {
            id,
            primary: primary.to_string(),
            backup: backup.to_string(),
            weight: default_weight(),
            ttl_secs: default_ttl_secs(),
            scoring,
        }
    }

    /// Scoring description used by the engine.
    #[must_use]
    pub fn spec(&self) -> MetricSpec {
        MetricSpec::new(self.id.id(), self.weight, self.scoring)
            .with_ttl(Duration::from_secs(self.ttl_secs))
    }

    /// Parsed provider URLs.
    #[allow(clippy::result_large_err)]
    pub fn urls(&self) -> Result<(Url, Url)> {
        let parse = |raw: &str| {
            Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
                field: "metrics.url",
                reason: format!("{}: {raw}: {e}", self.id),
            })
        };
        Ok((parse(&self.primary)?, parse(&self.backup)?))
    }
}

/// The eight default metrics with their reference providers and cutoffs.
#[must_use]
pub fn default_metrics() -> Vec<MetricConfig> {
    vec![
        MetricConfig::new(
            MetricKind::FearGreedIndex,
            "https://api.alternative.me/fng/",
            "https://pro-api.coinmarketcap.com/v3/fear-and-greed/latest",
            Scorer::threshold(70.0, 30.0, false),
        ),
        MetricConfig::new(
            MetricKind::HashRate,
            "https://api.blockchain.info/charts/hash-rate?timespan=7days&format=json",
            "https://mempool.space/api/v1/mining/hashrate/3d",
            Scorer::multiplier(7, 0.05, false),
        ),
        MetricConfig::new(
            MetricKind::ExchangeNetFlows,
            "https://api.cryptoquant.com/v1/btc/exchange-flows/netflow?exchange=all_exchange&window=day&limit=1",
            "https://api.glassnode.com/v1/metrics/transactions/transfers_volume_exchanges_net?a=BTC&i=24h",
            // Coins leaving exchanges read as accumulation.
            Scorer::multiplier(7, 0.05, true),
        ),
        MetricConfig::new(
            MetricKind::ActiveAddresses,
            "https://api.blockchain.info/charts/n-unique-addresses?timespan=7days&format=json",
            "https://community-api.coinmetrics.io/v4/timeseries/asset-metrics?assets=btc&metrics=AdrActCnt&page_size=1&paging_from=end",
            Scorer::multiplier(7, 0.05, false),
        ),
        MetricConfig::new(
            MetricKind::PerpetualFundingRates,
            "https://fapi.binance.com/fapi/v1/premiumIndex?symbol=BTCUSDT",
            "https://api.coingecko.com/api/v3/derivatives",
            Scorer::threshold(0.0001, -0.0001, false),
        ),
        MetricConfig::new(
            MetricKind::OpenInterest,
            "https://fapi.binance.com/fapi/v1/openInterest?symbol=BTCUSDT",
            "https://api.coingecko.com/api/v3/derivatives",
            Scorer::multiplier(7, 0.05, false),
        ),
        MetricConfig::new(
            MetricKind::MvrvRatio,
            "https://community-api.coinmetrics.io/v4/timeseries/asset-metrics?assets=btc&metrics=CapMVRVCur&page_size=1&paging_from=end",
            "https://api.blockchain.info/charts/mvrv?timespan=7days&format=json",
            Scorer::threshold(1.0, 3.0, true),
        ),
        MetricConfig::new(
            MetricKind::Rsi,
            "https://api.coingecko.com/api/v3/coins/bitcoin/market_chart?vs_currency=usd&days=30&interval=daily",
            "https://api.kraken.com/0/public/OHLC?pair=XBTUSD&interval=1440",
            Scorer::threshold(30.0, 70.0, true),
        ),
    ]
}
