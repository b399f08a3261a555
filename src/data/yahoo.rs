//! Yahoo Finance data fetcher
//!
//! Implements the collaborator traits over Yahoo Finance's unofficial API:
//! option expirations and chains from the v7 options endpoint, daily closes
//! from the v8 chart endpoint.
//!
//! Note: This is for educational/research purposes. Yahoo Finance
//! data is delayed ~15 minutes and intended for personal use.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Deserialize;

use super::provider::{
    nearest_expiry, HistoricalPriceProvider, ListedChain, ListedQuote, Lookback,
    MarketDataProvider, MaturityResolver,
};
use crate::core::{default_target_date, pct_returns, OptionType, PricerError, PricerResult};

const OPTIONS_URL: &str = "https://query1.finance.yahoo.com/v7/finance/options";
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// `num_days_from_ce` of 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Yahoo Finance API client
pub struct YahooClient {
    client: reqwest::blocking::Client,
    options_url: String,
    chart_url: String,
}

impl YahooClient {
    pub fn new() -> PricerResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| PricerError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            options_url: OPTIONS_URL.to_string(),
            chart_url: CHART_URL.to_string(),
        })
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> PricerResult<T> {
        tracing::debug!(url, "requesting");
        self.client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| PricerError::Network(e.to_string()))?
            .json()
            .map_err(|e| PricerError::Serialization(format!("failed to parse {}: {}", url, e)))
    }

    /// Get available option expiration dates
    pub fn get_expirations(&self, symbol: &str) -> PricerResult<Vec<NaiveDate>> {
        let url = format!("{}/{}", self.options_url, symbol);
        let response: YahooOptionsResponse = self.get_json(&url)?;

        let chain = response
            .option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| PricerError::data_unavailable(format!("no options data for {}", symbol)))?;

        Ok(chain
            .expiration_dates
            .iter()
            .filter_map(|&ts| DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()))
            .collect())
    }

    /// Get option chain for a specific expiration; `None` if nothing is listed
    pub fn get_option_chain(&self, symbol: &str, expiry: NaiveDate) -> PricerResult<Option<ListedChain>> {
        // Yahoo keys expirations by midnight UTC
        let expiry_ts = i64::from(expiry.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE) * 86_400;
        let url = format!("{}/{}?date={}", self.options_url, symbol, expiry_ts);
        let response: YahooOptionsResponse = self.get_json(&url)?;

        let options = response
            .option_chain
            .result
            .into_iter()
            .next()
            .and_then(|data| data.options.into_iter().next());

        let Some(options) = options else {
            return Ok(None);
        };

        let chain = ListedChain {
            calls: options.calls.iter().filter_map(YahooOptionData::listed).collect(),
            puts: options.puts.iter().filter_map(YahooOptionData::listed).collect(),
        };

        if chain.calls.is_empty() && chain.puts.is_empty() {
            return Ok(None);
        }
        Ok(Some(chain))
    }

    /// Daily closes between two instants, nulls dropped
    pub fn get_closes(&self, symbol: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> PricerResult<ChartSeries> {
        let url = format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            self.chart_url,
            symbol,
            from.timestamp(),
            to.timestamp()
        );
        let response: YahooChartResponse = self.get_json(&url)?;

        let result = response
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| PricerError::data_unavailable(format!("no price history for {}", symbol)))?;

        let closes: Vec<f64> = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close.into_iter().flatten().collect())
            .unwrap_or_default();

        Ok(ChartSeries {
            regular_market_price: result.meta.regular_market_price,
            closes,
        })
    }
}

/// Closes returned by the chart endpoint
#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub regular_market_price: Option<f64>,
    pub closes: Vec<f64>,
}

impl MarketDataProvider for YahooClient {
    fn get_quote(
        &self,
        ticker: &str,
        strike: f64,
        maturity: NaiveDate,
        option_type: OptionType,
    ) -> PricerResult<Option<f64>> {
        let quote = self
            .get_option_chain(ticker, maturity)?
            .and_then(|chain| chain.quote_near(strike, option_type));
        Ok(quote)
    }
}

impl HistoricalPriceProvider for YahooClient {
    fn get_current_price(&self, ticker: &str) -> PricerResult<f64> {
        let now = Utc::now();
        let series = self.get_closes(ticker, now - Duration::days(7), now)?;

        series
            .closes
            .last()
            .copied()
            .or(series.regular_market_price)
            .ok_or_else(|| PricerError::data_unavailable(format!("no recent close for {}", ticker)))
    }

    fn get_return_series(&self, ticker: &str, lookback: Lookback) -> PricerResult<Vec<f64>> {
        let now = Utc::now();
        let series = self.get_closes(ticker, now - Duration::days(i64::from(lookback.days)), now)?;
        if series.closes.len() < 3 {
            return Err(PricerError::data_unavailable(format!(
                "only {} closes for {} over {} days",
                series.closes.len(),
                ticker,
                lookback.days
            )));
        }
        Ok(pct_returns(&series.closes))
    }
}

impl MaturityResolver for YahooClient {
    fn resolve(&self, ticker: &str, target: Option<NaiveDate>) -> PricerResult<NaiveDate> {
        let target = target.unwrap_or_else(|| default_target_date(Utc::now().date_naive()));
        let expiries = self.get_expirations(ticker)?;
        nearest_expiry(&expiries, target)
            .ok_or_else(|| PricerError::data_unavailable(format!("no listed expirations for {}", ticker)))
    }
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct YahooOptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: YahooOptionChain,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChain {
    result: Vec<YahooOptionChainData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChainData {
    #[serde(rename = "expirationDates", default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<YahooOptions>,
}

#[derive(Debug, Deserialize)]
struct YahooOptions {
    #[serde(default)]
    calls: Vec<YahooOptionData>,
    #[serde(default)]
    puts: Vec<YahooOptionData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionData {
    strike: Option<f64>,
    #[serde(rename = "lastPrice")]
    last_price: Option<f64>,
}

impl YahooOptionData {
    fn listed(&self) -> Option<ListedQuote> {
        Some(ListedQuote {
            strike: self.strike?,
            last_price: self.last_price?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooChartData>>,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    meta: YahooChartMeta,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option_chain() {
        let json = r#"{
            "optionChain": {"result": [{
                "expirationDates": [1750377600, 1758240000],
                "options": [{
                    "calls": [{"strike": 180.0, "lastPrice": 8.4}, {"strike": 185.0}],
                    "puts": [{"strike": 180.0, "lastPrice": 5.6}]
                }]
            }]}
        }"#;
        let response: YahooOptionsResponse = serde_json::from_str(json).unwrap();
        let data = &response.option_chain.result[0];

        assert_eq!(data.expiration_dates.len(), 2);
        let calls: Vec<ListedQuote> = data.options[0].calls.iter().filter_map(YahooOptionData::listed).collect();
        assert_eq!(calls, vec![ListedQuote { strike: 180.0, last_price: 8.4 }]);
    }

    #[test]
    fn test_parse_chart() {
        let json = r#"{
            "chart": {"result": [{
                "meta": {"regularMarketPrice": 101.5},
                "indicators": {"quote": [{"close": [100.0, null, 101.0, 101.5]}]}
            }]}
        }"#;
        let response: YahooChartResponse = serde_json::from_str(json).unwrap();
        let result = response.chart.result.unwrap().into_iter().next().unwrap();
        let closes: Vec<f64> = result.indicators.quote[0].close.iter().flatten().copied().collect();

        assert_eq!(closes, vec![100.0, 101.0, 101.5]);
        assert_eq!(result.meta.regular_market_price, Some(101.5));
    }

    #[test]
    fn test_epoch_offset() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(epoch.num_days_from_ce(), UNIX_EPOCH_DAYS_FROM_CE);
    }

    #[test]
    #[ignore] // Requires network
    fn test_get_expirations() {
        let client = YahooClient::new().unwrap();
        let expiries = client.get_expirations("AAPL").unwrap();

        assert!(!expiries.is_empty());
        println!("AAPL expiries: {:?}", expiries);
    }

    #[test]
    #[ignore] // Requires network
    fn test_get_return_series() {
        let client = YahooClient::new().unwrap();
        let returns = client.get_return_series("AAPL", Lookback::one_year()).unwrap();

        assert!(returns.len() > 200);
    }
}
