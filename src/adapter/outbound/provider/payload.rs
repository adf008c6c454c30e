//! Payload parsers for each metric's primary and backup providers.
//!
//! Each parser turns a decoded JSON body into the metric value, converting
//! units where the backup provider reports on a different scale.

use serde_json::Value;

use super::extract::{array_at, as_number, column, last_field, number_at};
use crate::domain::indicator::rsi;
use crate::domain::MetricKind;
use crate::error::FetchError;

/// Turns a provider body into a metric value.
pub type Parser = fn(&Value) -> Result<f64, FetchError>;

/// RSI period used by both price-series providers.
pub const RSI_PERIOD: usize = 14;

/// Primary and backup parsers for `kind`.
#[must_use]
pub fn parsers(kind: MetricKind) -> (Parser, Parser) {
    match kind {
        MetricKind::FearGreedIndex => (fear_greed_primary, fear_greed_backup),
        MetricKind::HashRate => (chart_last_value, hash_rate_backup),
        MetricKind::ExchangeNetFlows => (net_flows_primary, net_flows_backup),
        MetricKind::ActiveAddresses => (chart_last_value, active_addresses_backup),
        MetricKind::PerpetualFundingRates => (funding_primary, funding_backup),
        MetricKind::OpenInterest => (open_interest_primary, open_interest_backup),
        MetricKind::MvrvRatio => (mvrv_primary, chart_last_value),
        MetricKind::Rsi => (rsi_primary, rsi_backup),
    }
}

/// alternative.me: `{"data": [{"value": "23"}]}`.
fn fear_greed_primary(body: &Value) -> Result<f64, FetchError> {
    number_at(body, "/data/0/value")
}

/// CoinMarketCap: `{"data": {"value": 23}}`.
fn fear_greed_backup(body: &Value) -> Result<f64, FetchError> {
    number_at(body, "/data/value")
}

/// blockchain.info charts: `{"values": [{"x": .., "y": ..}]}`.
fn chart_last_value(body: &Value) -> Result<f64, FetchError> {
    last_field(body, "/values", "y")
}

/// mempool.space reports H/s; blockchain.info charts use TH/s.
fn hash_rate_backup(body: &Value) -> Result<f64, FetchError> {
    Ok(number_at(body, "/currentHashrate")? / 1e12)
}

/// CryptoQuant: either a flat `{"netflow": ..}` or the
/// `{"result": {"data": [{"netflow_total": ..}]}}` envelope.
fn net_flows_primary(body: &Value) -> Result<f64, FetchError> {
    number_at(body, "/netflow").or_else(|_| number_at(body, "/result/data/0/netflow_total"))
}

/// Glassnode-style series: `[{"t": .., "v": ..}]`.
fn net_flows_backup(body: &Value) -> Result<f64, FetchError> {
    last_field(body, "", "v")
}

/// CoinMetrics: `{"data": [{"AdrActCnt": "912345"}]}`.
fn active_addresses_backup(body: &Value) -> Result<f64, FetchError> {
    last_field(body, "/data", "AdrActCnt")
}

/// Binance: premium index object, or a funding-rate history array.
fn funding_primary(body: &Value) -> Result<f64, FetchError> {
    if body.is_array() {
        return last_field(body, "", "fundingRate");
    }
    number_at(body, "/lastFundingRate")
}

fn is_btc_perpetual(item: &Value) -> bool {
    item.get("index_id").and_then(Value::as_str) == Some("BTC")
        && item
            .get("contract_type")
            .and_then(Value::as_str)
            .map_or(true, |t| t == "perpetual")
}

/// CoinGecko derivatives list reports funding in percent.
fn funding_backup(body: &Value) -> Result<f64, FetchError> {
    array_at(body, "")?
        .iter()
        .filter(|item| is_btc_perpetual(item))
        .find_map(|item| item.get("funding_rate").and_then(as_number))
        .map(|pct| pct / 100.0)
        .ok_or_else(|| FetchError::Parse("no BTC perpetual funding rate".into()))
}

/// Binance: `{"openInterest": "81234.5"}` in BTC.
fn open_interest_primary(body: &Value) -> Result<f64, FetchError> {
    number_at(body, "/openInterest")
}

/// CoinGecko derivatives: USD open interest divided by price gives BTC.
fn open_interest_backup(body: &Value) -> Result<f64, FetchError> {
    let (usd, price) = array_at(body, "")?
        .iter()
        .filter(|item| is_btc_perpetual(item))
        .filter_map(|item| {
            let usd = item.get("open_interest").and_then(as_number)?;
            let price = item.get("price").and_then(as_number)?;
            (price > 0.0).then_some((usd, price))
        })
        .fold((0.0, 0.0), |(usd, _), (u, p)| (usd + u, p));
    if price <= 0.0 {
        return Err(FetchError::Parse("no BTC open interest".into()));
    }
    Ok(usd / price)
}

/// CoinMetrics: `{"data": [{"CapMVRVCur": "2.13"}]}`.
fn mvrv_primary(body: &Value) -> Result<f64, FetchError> {
    last_field(body, "/data", "CapMVRVCur")
}

fn rsi_from(closes: &[f64]) -> Result<f64, FetchError> {
    rsi(closes, RSI_PERIOD).ok_or_else(|| {
        FetchError::Parse(format!(
            "need {} closes for RSI, got {}",
            RSI_PERIOD + 1,
            closes.len()
        ))
    })
}

/// CoinGecko market chart: `{"prices": [[ts, price], ..]}`.
fn rsi_primary(body: &Value) -> Result<f64, FetchError> {
    rsi_from(&column(array_at(body, "/prices")?, 1))
}

/// Kraken OHLC: `{"result": {"XXBTZUSD": [[time, o, h, l, c, ..]], "last": ..}}`.
fn rsi_backup(body: &Value) -> Result<f64, FetchError> {
    let result = body
        .get("result")
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::Parse("missing result".into()))?;
    let rows = result
        .iter()
        .filter(|(name, _)| name.as_str() != "last")
        .find_map(|(_, rows)| rows.as_array())
        .ok_or_else(|| FetchError::Parse("missing OHLC rows".into()))?;
    rsi_from(&column(rows, 4))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn primary(kind: MetricKind, body: Value) -> Result<f64, FetchError> {
        (parsers(kind).0)(&body)
    }

    fn backup(kind: MetricKind, body: Value) -> Result<f64, FetchError> {
        (parsers(kind).1)(&body)
    }

    #[test]
    fn fear_greed_both_tiers() {
        let p = primary(MetricKind::FearGreedIndex, json!({"data": [{"value": "23"}]}));
        let b = backup(MetricKind::FearGreedIndex, json!({"data": {"value": 25}}));
        assert_eq!(p.unwrap(), 23.0);
        assert_eq!(b.unwrap(), 25.0);
    }

    #[test]
    fn hash_rate_backup_is_converted_to_terahash() {
        let b = backup(MetricKind::HashRate, json!({"currentHashrate": 6.5e20})).unwrap();
        assert!((b - 6.5e8).abs() < 1.0);
    }

    #[test]
    fn net_flows_accepts_both_envelopes() {
        assert_eq!(
            primary(MetricKind::ExchangeNetFlows, json!({"netflow": -1200.0})).unwrap(),
            -1200.0
        );
        assert_eq!(
            primary(
                MetricKind::ExchangeNetFlows,
                json!({"result": {"data": [{"netflow_total": 300.0}]}})
            )
            .unwrap(),
            300.0
        );
        assert_eq!(
            backup(MetricKind::ExchangeNetFlows, json!([{"t": 1, "v": 5}, {"t": 2, "v": -7}]))
                .unwrap(),
            -7.0
        );
    }

    #[test]
    fn funding_backup_converts_percent() {
        let body = json!([
            {"index_id": "ETH", "contract_type": "perpetual", "funding_rate": 0.5},
            {"index_id": "BTC", "contract_type": "futures", "funding_rate": 9.0},
            {"index_id": "BTC", "contract_type": "perpetual", "funding_rate": 0.01}
        ]);
        let rate = backup(MetricKind::PerpetualFundingRates, body).unwrap();
        assert!((rate - 0.0001).abs() < 1e-12);
        assert_eq!(
            primary(MetricKind::PerpetualFundingRates, json!({"lastFundingRate": "0.00010000"}))
                .unwrap(),
            0.0001
        );
    }

    #[test]
    fn open_interest_backup_is_in_btc() {
        let body = json!([
            {"index_id": "BTC", "contract_type": "perpetual", "open_interest": 6.0e9, "price": "60000"},
            {"index_id": "BTC", "contract_type": "perpetual", "open_interest": 3.0e9, "price": "60000"}
        ]);
        assert_eq!(backup(MetricKind::OpenInterest, body).unwrap(), 150_000.0);
        assert!(backup(MetricKind::OpenInterest, json!([])).is_err());
    }

    #[test]
    fn mvrv_tiers() {
        assert_eq!(
            primary(MetricKind::MvrvRatio, json!({"data": [{"CapMVRVCur": "2.13"}]})).unwrap(),
            2.13
        );
        assert_eq!(
            backup(MetricKind::MvrvRatio, json!({"values": [{"y": 2.1}]})).unwrap(),
            2.1
        );
    }

    #[test]
    fn rsi_from_price_series() {
        let prices: Vec<Value> = (0..20).map(|i| json!([i, 100 + i])).collect();
        let value = primary(MetricKind::Rsi, json!({"prices": prices})).unwrap();
        assert_eq!(value, 100.0);
    }

    #[test]
    fn rsi_backup_reads_kraken_closes() {
        let rows: Vec<Value> = (0..20)
            .map(|i| json!([i, "0", "0", "0", format!("{}", 200 - i), "0", "0", 1]))
            .collect();
        let value = backup(MetricKind::Rsi, json!({"error": [], "result": {"XXBTZUSD": rows, "last": 19}}))
            .unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn short_price_series_is_a_parse_error() {
        let prices: Vec<Value> = (0..5).map(|i| json!([i, 100])).collect();
        assert!(matches!(
            primary(MetricKind::Rsi, json!({"prices": prices})),
            Err(FetchError::Parse(_))
        ));
    }
}
