//! Black-Scholes Greeks
//!
//! Analytic call-side sensitivities from the same d1/d2 as the closed-form price.

use super::black_scholes::{norm_cdf, norm_pdf};
use super::inputs::MarketInputs;
use crate::core::{Greeks, OptionContract, PricerResult, StockData};

/// Analytic call Greeks
pub fn call_greeks(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> Greeks {
    let sqrt_t = time.sqrt();
    let d1 = super::black_scholes::d1(spot, strike, rate, vol, time);
    let d2 = d1 - vol * sqrt_t;
    let df = (-rate * time).exp();
    let pdf_d1 = norm_pdf(d1);

    Greeks {
        delta: norm_cdf(d1),
        gamma: pdf_d1 / (spot * vol * sqrt_t),
        theta: -spot * pdf_d1 * vol / (2.0 * sqrt_t) - rate * strike * df * norm_cdf(d2),
        vega: spot * pdf_d1 * sqrt_t,
        rho: strike * time * df * norm_cdf(d2),
    }
}

/// Greeks over one contract and one underlying snapshot
#[derive(Debug, Clone, Copy)]
pub struct GreekCalculator<'a> {
    option: &'a OptionContract,
    stock: &'a StockData,
}

impl<'a> GreekCalculator<'a> {
    pub fn new(option: &'a OptionContract, stock: &'a StockData) -> Self {
        Self { option, stock }
    }

    pub fn calculate_greeks(&self) -> PricerResult<Greeks> {
        let m = MarketInputs::with_volatility(self.option, self.stock)?;
        Ok(call_greeks(m.spot, m.strike, m.rate, m.vol, m.time))
    }
}
