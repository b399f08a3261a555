//! Market data collaborator contracts
//!
//! The pricing core never talks to a data vendor directly. It consumes these
//! traits, implemented over HTTP by [`super::YahooClient`] and in memory by
//! [`StaticMarketData`].

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{default_target_date, OptionType, PricerError, PricerResult, pct_returns};

/// Trailing window of daily history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookback {
    pub days: u32,
}

impl Lookback {
    pub fn days(days: u32) -> Self {
        Self { days }
    }

    pub fn one_year() -> Self {
        Self { days: 365 }
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self::one_year()
    }
}

/// Listed option quotes
pub trait MarketDataProvider {
    /// Last traded price of the listed contract whose strike is closest to
    /// `strike`. `Ok(None)` when no chain exists for the maturity.
    fn get_quote(
        &self,
        ticker: &str,
        strike: f64,
        maturity: NaiveDate,
        option_type: OptionType,
    ) -> PricerResult<Option<f64>>;
}

/// Historical prices of the underlying
pub trait HistoricalPriceProvider {
    fn get_current_price(&self, ticker: &str) -> PricerResult<f64>;

    /// Chronological daily returns over the lookback window
    fn get_return_series(&self, ticker: &str, lookback: Lookback) -> PricerResult<Vec<f64>>;
}

/// Listed expiration lookup
pub trait MaturityResolver {
    /// Listed expiration closest to `target` (default: 180 days from today)
    fn resolve(&self, ticker: &str, target: Option<NaiveDate>) -> PricerResult<NaiveDate>;
}

/// One listed strike
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListedQuote {
    pub strike: f64,
    pub last_price: f64,
}

/// Calls and puts listed for one expiration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListedChain {
    pub calls: Vec<ListedQuote>,
    pub puts: Vec<ListedQuote>,
}

impl ListedChain {
    pub fn side(&self, option_type: OptionType) -> &[ListedQuote] {
        match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        }
    }

    /// Price at the listed strike closest to `strike`
    pub fn quote_near(&self, strike: f64, option_type: OptionType) -> Option<f64> {
        nearest_strike(self.side(option_type), strike).map(|q| q.last_price)
    }
}

/// Listed quote whose strike is closest to `strike`; ties go to the lower strike
pub fn nearest_strike(quotes: &[ListedQuote], strike: f64) -> Option<&ListedQuote> {
    quotes
        .iter()
        .filter(|q| q.strike.is_finite() && q.last_price.is_finite())
        .min_by(|a, b| {
            let da = (a.strike - strike).abs();
            let db = (b.strike - strike).abs();
            da.total_cmp(&db).then(a.strike.total_cmp(&b.strike))
        })
}

/// Expiration closest to `target`; ties go to the earlier date
pub fn nearest_expiry(expiries: &[NaiveDate], target: NaiveDate) -> Option<NaiveDate> {
    expiries
        .iter()
        .copied()
        .min_by_key(|e| ((*e - target).num_days().abs(), *e))
}

/// In-memory market data, for offline runs and tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticMarketData {
    /// Chronological closes by ticker
    closes: HashMap<String, Vec<f64>>,
    /// Option chains by ticker and expiration
    chains: HashMap<String, Vec<(NaiveDate, ListedChain)>>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closes(mut self, ticker: impl Into<String>, closes: Vec<f64>) -> Self {
        self.closes.insert(ticker.into(), closes);
        self
    }

    pub fn with_chain(mut self, ticker: impl Into<String>, expiry: NaiveDate, chain: ListedChain) -> Self {
        let chains = self.chains.entry(ticker.into()).or_default();
        chains.retain(|(e, _)| *e != expiry);
        chains.push((expiry, chain));
        chains.sort_by_key(|(e, _)| *e);
        self
    }

    fn closes_for(&self, ticker: &str) -> PricerResult<&[f64]> {
        self.closes
            .get(ticker)
            .map(Vec::as_slice)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| PricerError::data_unavailable(format!("no price history for {}", ticker)))
    }

    fn expiries(&self, ticker: &str) -> Vec<NaiveDate> {
        self.chains
            .get(ticker)
            .map(|chains| chains.iter().map(|(e, _)| *e).collect())
            .unwrap_or_default()
    }
}

impl MarketDataProvider for StaticMarketData {
    fn get_quote(
        &self,
        ticker: &str,
        strike: f64,
        maturity: NaiveDate,
        option_type: OptionType,
    ) -> PricerResult<Option<f64>> {
        let quote = self
            .chains
            .get(ticker)
            .and_then(|chains| chains.iter().find(|(e, _)| *e == maturity))
            .and_then(|(_, chain)| chain.quote_near(strike, option_type));
        Ok(quote)
    }
}

impl HistoricalPriceProvider for StaticMarketData {
    fn get_current_price(&self, ticker: &str) -> PricerResult<f64> {
        let closes = self.closes_for(ticker)?;
        closes
            .last()
            .copied()
            .ok_or_else(|| PricerError::data_unavailable(format!("no price history for {}", ticker)))
    }

    fn get_return_series(&self, ticker: &str, lookback: Lookback) -> PricerResult<Vec<f64>> {
        // Closes are daily trading sessions; approximate the calendar window
        let sessions = (lookback.days as usize * 252).div_ceil(365) + 1;
        let closes = self.closes_for(ticker)?;
        let start = closes.len().saturating_sub(sessions);
        Ok(pct_returns(&closes[start..]))
    }
}

impl MaturityResolver for StaticMarketData {
    fn resolve(&self, ticker: &str, target: Option<NaiveDate>) -> PricerResult<NaiveDate> {
        let target = target.unwrap_or_else(|| default_target_date(Utc::now().date_naive()));
        nearest_expiry(&self.expiries(ticker), target)
            .ok_or_else(|| PricerError::data_unavailable(format!("no listed expirations for {}", ticker)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ListedChain {
        ListedChain {
            calls: vec![
                ListedQuote { strike: 170.0, last_price: 15.2 },
                ListedQuote { strike: 180.0, last_price: 8.4 },
                ListedQuote { strike: 190.0, last_price: 3.9 },
            ],
            puts: vec![
                ListedQuote { strike: 170.0, last_price: 2.1 },
                ListedQuote { strike: 180.0, last_price: 5.6 },
            ],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_nearest_strike() {
        let c = chain();
        assert_eq!(c.quote_near(180.0, OptionType::Call), Some(8.4));
        assert_eq!(c.quote_near(187.0, OptionType::Call), Some(3.9));
        // Equidistant: lower strike wins
        assert_eq!(c.quote_near(175.0, OptionType::Call), Some(15.2));
        assert_eq!(c.quote_near(400.0, OptionType::Put), Some(5.6));
        assert_eq!(ListedChain::default().quote_near(180.0, OptionType::Call), None);
    }

    #[test]
    fn test_nearest_expiry() {
        let expiries = [date(2025, 3, 21), date(2025, 6, 20), date(2025, 9, 19)];
        assert_eq!(nearest_expiry(&expiries, date(2025, 7, 1)), Some(date(2025, 6, 20)));
        assert_eq!(nearest_expiry(&expiries, date(2026, 1, 1)), Some(date(2025, 9, 19)));
        assert_eq!(nearest_expiry(&[], date(2025, 7, 1)), None);
    }

    #[test]
    fn test_static_quotes() {
        let expiry = date(2025, 6, 20);
        let data = StaticMarketData::new().with_chain("AAPL", expiry, chain());

        assert_eq!(data.get_quote("AAPL", 181.0, expiry, OptionType::Call).unwrap(), Some(8.4));
        // No chain for that maturity: absent, not an error
        assert_eq!(data.get_quote("AAPL", 180.0, date(2025, 7, 18), OptionType::Call).unwrap(), None);
        assert_eq!(data.get_quote("MSFT", 180.0, expiry, OptionType::Put).unwrap(), None);
    }

    #[test]
    fn test_static_resolver() {
        let data = StaticMarketData::new()
            .with_chain("AAPL", date(2025, 6, 20), chain())
            .with_chain("AAPL", date(2025, 9, 19), chain());

        assert_eq!(data.resolve("AAPL", Some(date(2025, 9, 1))).unwrap(), date(2025, 9, 19));
        assert!(matches!(
            data.resolve("MSFT", None),
            Err(PricerError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_static_history() {
        let closes: Vec<f64> = (0..400).map(|i| 100.0 + (i % 7) as f64).collect();
        let data = StaticMarketData::new().with_closes("AAPL", closes);

        assert_eq!(data.get_current_price("AAPL").unwrap(), 100.0 + (399 % 7) as f64);
        let returns = data.get_return_series("AAPL", Lookback::one_year()).unwrap();
        assert_eq!(returns.len(), 252);

        assert!(matches!(
            data.get_current_price("MSFT"),
            Err(PricerError::DataUnavailable(_))
        ));
    }
}
