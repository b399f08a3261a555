//! Underlying snapshot
//!
//! Spot price and historical volatility of the underlying, shared by reference
//! across every pricer so that all models value the same snapshot.

use serde::Serialize;
use statrs::statistics::Statistics;

use super::error::{PricerError, PricerResult};
use crate::data::{HistoricalPriceProvider, Lookback};

/// Trading days per year used to annualize daily volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Snapshot of the underlying asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockData {
    ticker: String,
    /// Latest close
    current_price: f64,
    /// Annualized volatility of daily returns
    volatility: f64,
}

impl StockData {
    pub fn new(ticker: impl Into<String>, current_price: f64, volatility: f64) -> PricerResult<Self> {
        if !(current_price > 0.0) || !current_price.is_finite() {
            return Err(PricerError::invalid_input(format!(
                "current price must be positive, got {}",
                current_price
            )));
        }
        if !(volatility >= 0.0) || !volatility.is_finite() {
            return Err(PricerError::invalid_input(format!(
                "volatility must be non-negative, got {}",
                volatility
            )));
        }

        Ok(Self {
            ticker: ticker.into(),
            current_price,
            volatility,
        })
    }

    /// Build from a chronological close series: spot is the last close and
    /// volatility is `sqrt(252) * stdev(daily percentage returns)`.
    pub fn from_closes(ticker: impl Into<String>, closes: &[f64]) -> PricerResult<Self> {
        let ticker = ticker.into();
        let current_price = *closes.last().ok_or_else(|| {
            PricerError::data_unavailable(format!("no closing prices for {}", ticker))
        })?;

        let returns = pct_returns(closes);
        let volatility = annualized_volatility(&returns)?;
        Self::new(ticker, current_price, volatility)
    }

    /// Fetch spot and the trailing return series from a price provider
    pub fn fetch<P: HistoricalPriceProvider + ?Sized>(
        provider: &P,
        ticker: &str,
        lookback: Lookback,
    ) -> PricerResult<Self> {
        let current_price = provider.get_current_price(ticker)?;
        let returns = provider.get_return_series(ticker, lookback)?;
        let volatility = annualized_volatility(&returns)?;

        tracing::info!(
            ticker,
            current_price,
            volatility,
            observations = returns.len(),
            "built underlying snapshot"
        );

        Self::new(ticker, current_price, volatility)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }
}

/// Simple daily returns `p[i] / p[i-1] - 1`
pub fn pct_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Annualized sample standard deviation of daily returns
pub fn annualized_volatility(returns: &[f64]) -> PricerResult<f64> {
    if returns.len() < 2 {
        return Err(PricerError::data_unavailable(format!(
            "need at least two returns to estimate volatility, got {}",
            returns.len()
        )));
    }

    let std_dev = returns.std_dev();
    if !std_dev.is_finite() {
        return Err(PricerError::numerical("return series produced a non-finite deviation"));
    }

    Ok(TRADING_DAYS_PER_YEAR.sqrt() * std_dev)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_returns() {
        let returns = pct_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-12);
        assert!((returns[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_annualized_volatility() {
        // Alternating +1% / -1%: sample stdev of [0.01, -0.01, 0.01, -0.01]
        let returns = [0.01, -0.01, 0.01, -0.01];
        let expected = (4.0 * 0.0001 / 3.0_f64).sqrt() * 252.0_f64.sqrt();
        let vol = annualized_volatility(&returns).unwrap();
        assert!((vol - expected).abs() < 1e-12);
    }

    #[test]
    fn test_from_closes() {
        let closes = [100.0, 101.0, 100.5, 102.0, 101.0];
        let stock = StockData::from_closes("AAPL", &closes).unwrap();

        assert_eq!(stock.current_price(), 101.0);
        assert!(stock.volatility() > 0.0);
        assert_eq!(stock.ticker(), "AAPL");
    }

    #[test]
    fn test_flat_series_has_zero_vol() {
        let stock = StockData::from_closes("FLAT", &[50.0, 50.0, 50.0]).unwrap();
        assert_eq!(stock.volatility(), 0.0);
    }

    #[test]
    fn test_short_series_unavailable() {
        assert!(matches!(
            StockData::from_closes("AAPL", &[]),
            Err(PricerError::DataUnavailable(_))
        ));
        assert!(matches!(
            StockData::from_closes("AAPL", &[100.0, 101.0]),
            Err(PricerError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_invalid_snapshot() {
        assert!(StockData::new("AAPL", 0.0, 0.2).is_err());
        assert!(StockData::new("AAPL", 100.0, -0.1).is_err());
        assert!(StockData::new("AAPL", 100.0, 0.0).is_ok());
    }
}
