//! Binomial Tree Model
//!
//! Cox-Ross-Rubinstein recombining lattice for European options:
//!
//! dt = T / n,  u = exp(σ√dt),  d = 1/u,  p = (exp(r·dt) - d) / (u - d)
//!
//! Terminal node `i` (0 = all up moves) sits at S0·u^(n-i)·d^i. Values are
//! rolled back one step at a time with the discounted risk-neutral
//! expectation until the root remains. The price converges to Black-Scholes
//! as `n` grows.

use super::inputs::MarketInputs;
use crate::core::{OptionContract, OptionType, PricerError, PricerResult, StockData};

/// Default lattice depth
pub const DEFAULT_TREE_STEPS: usize = 100;

/// Risk-neutral lattice parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParameters {
    pub dt: f64,
    /// Up factor
    pub u: f64,
    /// Down factor
    pub d: f64,
    /// Risk-neutral probability of an up move
    pub p: f64,
}

impl TreeParameters {
    /// CRR parameters; `p` must fall strictly inside (0, 1)
    pub fn crr(rate: f64, vol: f64, time: f64, num_steps: usize) -> PricerResult<Self> {
        if num_steps == 0 {
            return Err(PricerError::invalid_input("binomial steps must be >= 1"));
        }

        let dt = time / num_steps as f64;
        let u = (vol * dt.sqrt()).exp();
        let d = 1.0 / u;
        let p = ((rate * dt).exp() - d) / (u - d);

        if !(p > 0.0 && p < 1.0) {
            return Err(PricerError::invalid_input(format!(
                "risk-neutral probability {} outside (0, 1): rate {} too large for volatility {} over {} steps",
                p, rate, vol, num_steps
            )));
        }

        Ok(Self { dt, u, d, p })
    }
}

/// Lattice pricer over one contract and one underlying snapshot
#[derive(Debug, Clone, Copy)]
pub struct BinomialTreePricer<'a> {
    option: &'a OptionContract,
    stock: &'a StockData,
    num_steps: usize,
}

impl<'a> BinomialTreePricer<'a> {
    pub fn new(option: &'a OptionContract, stock: &'a StockData) -> Self {
        Self::with_steps(option, stock, DEFAULT_TREE_STEPS)
    }

    pub fn with_steps(option: &'a OptionContract, stock: &'a StockData, num_steps: usize) -> Self {
        Self {
            option,
            stock,
            num_steps,
        }
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn tree_parameters(&self) -> PricerResult<TreeParameters> {
        let m = MarketInputs::with_volatility(self.option, self.stock)?;
        TreeParameters::crr(m.rate, m.vol, m.time, self.num_steps)
    }

    pub fn price(&self, option_type: OptionType) -> PricerResult<f64> {
        let m = MarketInputs::with_volatility(self.option, self.stock)?;
        let params = TreeParameters::crr(m.rate, m.vol, m.time, self.num_steps)?;
        tracing::debug!(steps = self.num_steps, u = params.u, p = params.p, "pricing on binomial lattice");

        Ok(backward_induction(
            m.spot,
            m.strike,
            m.rate,
            &params,
            self.num_steps,
            option_type,
        ))
    }

    pub fn price_call(&self) -> PricerResult<f64> {
        self.price(OptionType::Call)
    }

    pub fn price_put(&self) -> PricerResult<f64> {
        self.price(OptionType::Put)
    }
}

/// Terminal payoffs rolled back to the root
fn backward_induction(
    spot: f64,
    strike: f64,
    rate: f64,
    params: &TreeParameters,
    num_steps: usize,
    option_type: OptionType,
) -> f64 {
    let disc = (-rate * params.dt).exp();
    let disc_up = disc * params.p;
    let disc_down = disc * (1.0 - params.p);

    // Index 0 is the all-up node; each following node trades one u for one d
    let down_over_up = params.d / params.u;
    let mut node_spot = spot * params.u.powf(num_steps as f64);
    let mut values: Vec<f64> = (0..=num_steps)
        .map(|_| {
            let payoff = option_type.intrinsic(node_spot, strike);
            node_spot *= down_over_up;
            payoff
        })
        .collect();

    // After rolling back step `n`, nodes 0..n hold the values at time (n-1)·dt
    for step in (1..=num_steps).rev() {
        for i in 0..step {
            values[i] = disc_up * values[i] + disc_down * values[i + 1];
        }
    }

    values[0]
}
