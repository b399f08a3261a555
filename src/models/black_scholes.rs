//! Black-Scholes Model
//!
//! Provides:
//! - Closed-form European call/put pricing
//! - Implied volatility solver (Newton-Raphson with bisection fallback)
//!
//! The closed form is the reference the lattice and simulation models are
//! checked against, and the formula family the Greeks are derived from.

use std::f64::consts::{PI, SQRT_2};

use statrs::function::erf::erfc;

use super::inputs::MarketInputs;
use crate::core::{OptionContract, OptionType, PricerError, PricerResult, StockData};

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 parameter
pub fn d1(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

/// Black-Scholes d2 parameter
pub fn d2(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    d1(spot, strike, rate, vol, time) - vol * time.sqrt()
}

/// Black-Scholes European option price.
///
/// Raw formula: callers are responsible for `time > 0` and `vol > 0`.
pub fn price(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> f64 {
    let d1 = d1(spot, strike, rate, vol, time);
    let d2 = d1 - vol * time.sqrt();
    let df = (-rate * time).exp();

    match option_type {
        OptionType::Call => spot * norm_cdf(d1) - strike * df * norm_cdf(d2),
        OptionType::Put => strike * df * norm_cdf(-d2) - spot * norm_cdf(-d1),
    }
}

/// Closed-form pricer over one contract and one underlying snapshot
#[derive(Debug, Clone, Copy)]
pub struct BlackScholesPricer<'a> {
    option: &'a OptionContract,
    stock: &'a StockData,
}

impl<'a> BlackScholesPricer<'a> {
    pub fn new(option: &'a OptionContract, stock: &'a StockData) -> Self {
        Self { option, stock }
    }

    pub fn price(&self, option_type: OptionType) -> PricerResult<f64> {
        let m = MarketInputs::with_volatility(self.option, self.stock)?;
        Ok(price(m.spot, m.strike, m.rate, m.vol, m.time, option_type))
    }

    pub fn price_call(&self) -> PricerResult<f64> {
        self.price(OptionType::Call)
    }

    pub fn price_put(&self) -> PricerResult<f64> {
        self.price(OptionType::Put)
    }
}

/// Implied volatility solver using Newton-Raphson with bisection fallback
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
    option_type: OptionType,
) -> PricerResult<f64> {
    if !(market_price > 0.0) {
        return Err(PricerError::numerical("Non-positive option price"));
    }
    if !(time > 0.0) {
        return Err(PricerError::numerical("Non-positive time to expiry"));
    }
    if !(spot > 0.0) || !(strike > 0.0) {
        return Err(PricerError::numerical("Non-positive spot or strike"));
    }

    // No-arbitrage band of a European option
    let df = (-rate * time).exp();
    let (lower, upper) = match option_type {
        OptionType::Call => ((spot - strike * df).max(0.0), spot),
        OptionType::Put => ((strike * df - spot).max(0.0), strike * df),
    };
    if market_price <= lower || market_price >= upper {
        return Err(PricerError::numerical(format!(
            "price {:.4} outside no-arbitrage band ({:.4}, {:.4})",
            market_price, lower, upper
        )));
    }

    // Brenner-Subrahmanyam starting point
    let mut vol = (market_price / (0.4 * spot * time.sqrt())).clamp(0.01, 3.0);
    let tol = 1e-8;

    for _ in 0..100 {
        let diff = price(spot, strike, rate, vol, time, option_type) - market_price;
        if diff.abs() < tol {
            return Ok(vol);
        }

        let vega = spot * norm_pdf(d1(spot, strike, rate, vol, time)) * time.sqrt();
        if vega.abs() < 1e-12 {
            break;
        }

        let next = vol - diff / vega;
        if next <= 0.0 || next > 5.0 {
            break;
        }
        vol = next;
    }

    bisection_iv(market_price, spot, strike, rate, time, option_type)
}

/// Bisection method for IV (slower but more robust)
fn bisection_iv(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
    option_type: OptionType,
) -> PricerResult<f64> {
    let mut low = 1e-4;
    let mut high = 5.0;
    let tol = 1e-8;

    // Price is increasing in vol; the root must be bracketed
    let price_low = price(spot, strike, rate, low, time, option_type);
    let price_high = price(spot, strike, rate, high, time, option_type);
    if market_price < price_low || market_price > price_high {
        return Err(PricerError::numerical(format!(
            "price {:.4} implies a volatility outside [{}, {}]",
            market_price, low, high
        )));
    }

    for _ in 0..200 {
        let mid = 0.5 * (low + high);
        let diff = price(spot, strike, rate, mid, time, option_type) - market_price;

        if diff.abs() < tol || (high - low) < tol {
            return Ok(mid);
        }

        if diff > 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }

    Err(PricerError::numerical("IV solver did not converge"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> (OptionContract, StockData) {
        (
            OptionContract::with_time(strike, rate, time),
            StockData::new("TEST", spot, vol).unwrap(),
        )
    }

    #[test]
    fn test_norm_cdf() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
        assert!((norm_cdf(1.0) - 0.841_344_746_068_542_9).abs() < 1e-10);
        assert!((norm_cdf(1.96) - 0.975_002_104_851_779_5).abs() < 1e-10);
        assert!((norm_cdf(-3.0) - 0.001_349_898_031_630_094_6).abs() < 1e-10);
        assert!((norm_cdf(2.5) + norm_cdf(-2.5) - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_reference_prices() {
        let (option, stock) = snapshot(100.0, 100.0, 0.05, 0.20, 1.0);
        let pricer = BlackScholesPricer::new(&option, &stock);

        let call = pricer.price_call().unwrap();
        let put = pricer.price_put().unwrap();

        assert!((call - 10.4506).abs() < 1e-3, "call = {}", call);
        assert!((put - 5.5735).abs() < 1e-3, "put = {}", put);
    }

    #[test]
    fn test_put_call_parity() {
        for &(spot, strike, rate, vol, time) in &[
            (100.0, 100.0, 0.05, 0.2, 1.0),
            (80.0, 100.0, 0.01, 0.35, 0.25),
            (150.0, 120.0, 0.08, 0.15, 2.0),
            (100.0, 95.0, -0.01, 0.6, 0.05),
        ] {
            let call = price(spot, strike, rate, vol, time, OptionType::Call);
            let put = price(spot, strike, rate, vol, time, OptionType::Put);
            let parity = spot - strike * (-rate * time).exp();
            assert!((call - put - parity).abs() < 1e-6);
        }
    }

    #[test]
    fn test_no_arbitrage_bounds() {
        for spot in [50.0, 90.0, 100.0, 110.0, 200.0] {
            for vol in [0.05, 0.2, 0.8] {
                for time in [0.01, 0.5, 3.0] {
                    let (strike, rate): (f64, f64) = (100.0, 0.04);
                    let df = (-rate * time).exp();
                    let call = price(spot, strike, rate, vol, time, OptionType::Call);
                    let put = price(spot, strike, rate, vol, time, OptionType::Put);

                    assert!(call >= (spot - strike * df).max(0.0) - 1e-12);
                    assert!(call <= spot + 1e-12);
                    assert!(put >= (strike * df - spot).max(0.0) - 1e-12);
                    assert!(put <= strike * df + 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_short_maturity_tends_to_intrinsic() {
        let time = 1e-8;
        for spot in [90.0, 110.0] {
            let call = price(spot, 100.0, 0.05, 0.2, time, OptionType::Call);
            let put = price(spot, 100.0, 0.05, 0.2, time, OptionType::Put);
            assert!((call - OptionType::Call.intrinsic(spot, 100.0)).abs() < 1e-4);
            assert!((put - OptionType::Put.intrinsic(spot, 100.0)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_degenerate_inputs_rejected() {
        let (option, stock) = snapshot(100.0, 100.0, 0.05, 0.2, 0.0);
        assert!(matches!(
            BlackScholesPricer::new(&option, &stock).price_call(),
            Err(PricerError::InvalidInput(_))
        ));

        let (option, stock) = snapshot(100.0, 100.0, 0.05, 0.0, 1.0);
        assert!(matches!(
            BlackScholesPricer::new(&option, &stock).price_put(),
            Err(PricerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_implied_vol() {
        let (spot, strike, rate, time) = (100.0, 100.0, 0.05, 0.5);
        let market_price = price(spot, strike, rate, 0.25, time, OptionType::Call);
        let iv = implied_volatility(market_price, spot, strike, rate, time, OptionType::Call).unwrap();

        assert!((iv - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_iv_otm_put() {
        let (spot, strike, rate, time) = (100.0, 90.0, 0.05, 0.25);
        let market_price = price(spot, strike, rate, 0.30, time, OptionType::Put);
        let iv = implied_volatility(market_price, spot, strike, rate, time, OptionType::Put).unwrap();

        assert!((iv - 0.30).abs() < 1e-3);
    }

    #[test]
    fn test_iv_outside_band() {
        // A call cannot be worth more than the underlying
        assert!(implied_volatility(120.0, 100.0, 100.0, 0.05, 1.0, OptionType::Call).is_err());
        assert!(implied_volatility(0.0, 100.0, 100.0, 0.05, 1.0, OptionType::Call).is_err());
    }

    #[test]
    fn test_iv_above_search_range() {
        // Inside the no-arbitrage band but implies a 600% vol
        let market_price = price(100.0, 100.0, 0.05, 6.0, 1.0, OptionType::Call);
        assert!(market_price < 100.0);
        assert!(matches!(
            implied_volatility(market_price, 100.0, 100.0, 0.05, 1.0, OptionType::Call),
            Err(PricerError::Numerical(_))
        ));

        // Just inside the range still resolves
        let market_price = price(100.0, 100.0, 0.05, 4.5, 1.0, OptionType::Call);
        let iv = implied_volatility(market_price, 100.0, 100.0, 0.05, 1.0, OptionType::Call).unwrap();
        assert!((iv - 4.5).abs() < 1e-3, "iv = {}", iv);
    }
}
