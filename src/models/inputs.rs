//! Validated pricing inputs
//!
//! Every model reads the same five numbers from the contract and the
//! underlying snapshot. Preconditions are checked here once and surfaced as
//! `InvalidInput`; nothing is clamped.

use crate::core::{OptionContract, PricerError, PricerResult, StockData};

/// Spot, strike, rate, volatility and time to maturity of one valuation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketInputs {
    pub spot: f64,
    pub strike: f64,
    pub rate: f64,
    pub vol: f64,
    pub time: f64,
}

impl MarketInputs {
    /// Read the inputs without checking them
    pub fn from_snapshot(option: &OptionContract, stock: &StockData) -> Self {
        Self {
            spot: stock.current_price(),
            strike: option.strike_price(),
            rate: option.risk_free_rate(),
            vol: stock.volatility(),
            time: option.time_to_maturity(),
        }
    }

    /// Inputs for models that diffuse with the snapshot volatility
    pub fn with_volatility(option: &OptionContract, stock: &StockData) -> PricerResult<Self> {
        let inputs = Self::from_snapshot(option, stock);
        inputs.check_contract()?;
        positive("volatility", inputs.vol)?;
        Ok(inputs)
    }

    /// Inputs for models that bring their own variance process
    pub fn without_volatility(option: &OptionContract, stock: &StockData) -> PricerResult<Self> {
        let inputs = Self::from_snapshot(option, stock);
        inputs.check_contract()?;
        Ok(inputs)
    }

    fn check_contract(&self) -> PricerResult<()> {
        positive("spot price", self.spot)?;
        positive("strike price", self.strike)?;
        positive("time to maturity", self.time)?;
        if !self.rate.is_finite() {
            return Err(PricerError::invalid_input("risk-free rate must be finite"));
        }
        Ok(())
    }

    /// Discount factor e^(-rT)
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.time).exp()
    }

    /// σ√T
    pub fn vol_sqrt_time(&self) -> f64 {
        self.vol * self.time.sqrt()
    }
}

pub(crate) fn positive(name: &str, value: f64) -> PricerResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PricerError::invalid_input(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}
