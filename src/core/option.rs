//! Option contract definitions
//!
//! A European vanilla contract on a listed underlying. The contract carries the
//! strike, the resolved maturity, the discount rate and the time to maturity
//! measured at construction.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::error::{PricerError, PricerResult};
use crate::data::MaturityResolver;

/// Days in a year used to convert calendar time to years
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Default distance of the target maturity when the caller gives none
pub const DEFAULT_TARGET_DAYS: i64 = 180;

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff direction: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Intrinsic value at given spot
    #[inline]
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OptionType::Call => "Call",
            OptionType::Put => "Put",
        }
    }
}

/// Option contract terms
///
/// Immutable once built. `time_to_maturity` is strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionContract {
    /// Underlying symbol (e.g., "AAPL")
    ticker: String,
    /// Strike price
    strike_price: f64,
    /// Expiration date
    maturity_date: NaiveDate,
    /// Annualized, continuously compounded risk-free rate
    risk_free_rate: f64,
    /// Years from valuation to expiry
    time_to_maturity: f64,
}

impl OptionContract {
    /// Create a contract valued now
    pub fn new(
        ticker: impl Into<String>,
        strike_price: f64,
        maturity_date: NaiveDate,
        risk_free_rate: f64,
    ) -> PricerResult<Self> {
        Self::with_valuation_time(ticker, strike_price, maturity_date, risk_free_rate, Utc::now())
    }

    /// Create a contract valued at a fixed instant
    pub fn with_valuation_time(
        ticker: impl Into<String>,
        strike_price: f64,
        maturity_date: NaiveDate,
        risk_free_rate: f64,
        valuation_time: DateTime<Utc>,
    ) -> PricerResult<Self> {
        if !(strike_price > 0.0) || !strike_price.is_finite() {
            return Err(PricerError::invalid_input(format!(
                "strike price must be positive, got {}",
                strike_price
            )));
        }
        if !risk_free_rate.is_finite() {
            return Err(PricerError::invalid_input("risk-free rate must be finite"));
        }

        let time_to_maturity = year_fraction(valuation_time, maturity_date);
        if time_to_maturity <= 0.0 {
            return Err(PricerError::invalid_maturity(format!(
                "maturity date {} must be in the future (valuation at {})",
                maturity_date,
                valuation_time.format("%Y-%m-%d %H:%M:%S")
            )));
        }

        Ok(Self {
            ticker: ticker.into(),
            strike_price,
            maturity_date,
            risk_free_rate,
            time_to_maturity,
        })
    }

    /// Resolve the listed maturity closest to `target` and build the contract.
    ///
    /// With no target the resolver aims [`DEFAULT_TARGET_DAYS`] ahead.
    pub fn resolve<R: MaturityResolver + ?Sized>(
        resolver: &R,
        ticker: &str,
        strike_price: f64,
        target: Option<NaiveDate>,
        risk_free_rate: f64,
    ) -> PricerResult<Self> {
        let maturity = resolver.resolve(ticker, target)?;
        tracing::debug!(ticker, %maturity, "resolved listed maturity");
        Self::new(ticker, strike_price, maturity, risk_free_rate)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn strike_price(&self) -> f64 {
        self.strike_price
    }

    pub fn maturity_date(&self) -> NaiveDate {
        self.maturity_date
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn time_to_maturity(&self) -> f64 {
        self.time_to_maturity
    }

    /// Remaining calendar days, rounded
    pub fn days_to_maturity(&self) -> i64 {
        (self.time_to_maturity * DAYS_PER_YEAR).round() as i64
    }

    /// Discount factor e^(-rT) to expiry
    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_maturity).exp()
    }

    /// Contract with an explicit year fraction, unchecked
    #[cfg(test)]
    pub(crate) fn with_time(strike_price: f64, risk_free_rate: f64, time_to_maturity: f64) -> Self {
        Self {
            ticker: "TEST".to_string(),
            strike_price,
            maturity_date: NaiveDate::MAX,
            risk_free_rate,
            time_to_maturity,
        }
    }
}

/// Default target maturity: [`DEFAULT_TARGET_DAYS`] after `from`
pub fn default_target_date(from: NaiveDate) -> NaiveDate {
    from + Duration::days(DEFAULT_TARGET_DAYS)
}

/// Fraction of a year between `from` and midnight UTC of `maturity`
fn year_fraction(from: DateTime<Utc>, maturity: NaiveDate) -> f64 {
    let days = (maturity - from.date_naive()).num_days();
    let seconds = days * 86_400 - i64::from(from.num_seconds_from_midnight());
    seconds as f64 / 86_400.0 / DAYS_PER_YEAR
}
