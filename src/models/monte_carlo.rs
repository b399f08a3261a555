//! Monte Carlo Model (geometric Brownian motion)
//!
//! Simulates the risk-neutral GBM with daily granularity:
//!
//! S[t] = S[t-1] · exp((r - σ²/2)·dt + σ·√dt·Z[t]),  Z[t] ~ N(0, 1)
//!
//! with `round(T·252)` steps (at least one). Only the terminal price of each
//! path is kept. The price is the discounted mean payoff.

use super::inputs::MarketInputs;
use super::simulation::{self, McEstimate, SeedPolicy};
use crate::core::{OptionContract, OptionType, PricerError, PricerResult, StockData, TRADING_DAYS_PER_YEAR};

/// Default number of simulated paths
pub const DEFAULT_SIMULATIONS: usize = 10_000;

/// Path-simulation pricer over one contract and one underlying snapshot
#[derive(Debug, Clone, Copy)]
pub struct MonteCarloPricer<'a> {
    option: &'a OptionContract,
    stock: &'a StockData,
    num_simulations: usize,
    seed: SeedPolicy,
}

impl<'a> MonteCarloPricer<'a> {
    /// Unseeded pricer: every call draws a fresh batch of paths
    pub fn new(option: &'a OptionContract, stock: &'a StockData, num_simulations: usize) -> Self {
        Self {
            option,
            stock,
            num_simulations,
            seed: SeedPolicy::Entropy,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = SeedPolicy::Fixed(seed);
        self
    }

    pub fn with_seed_policy(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }

    pub fn num_simulations(&self) -> usize {
        self.num_simulations
    }

    /// Daily steps to maturity, at least one
    pub fn num_time_steps(&self) -> PricerResult<usize> {
        time_steps(self.option.time_to_maturity())
    }

    pub fn estimate(&self, option_type: OptionType) -> PricerResult<McEstimate> {
        let m = MarketInputs::with_volatility(self.option, self.stock)?;
        let num_steps = time_steps(m.time)?;

        let dt = m.time / num_steps as f64;
        let drift = (m.rate - 0.5 * m.vol * m.vol) * dt;
        let diffusion = m.vol * dt.sqrt();
        let base_seed = self.seed.base_seed();

        tracing::debug!(
            paths = self.num_simulations,
            steps = num_steps,
            ?option_type,
            "simulating GBM paths"
        );

        simulation::estimate(
            self.num_simulations,
            base_seed,
            m.discount_factor(),
            |terminal| option_type.intrinsic(terminal, m.strike),
            |rng| {
                let mut s = m.spot;
                for _ in 0..num_steps {
                    s *= (drift + diffusion * simulation::standard_normal(rng)).exp();
                }
                s
            },
        )
    }

    pub fn price(&self, option_type: OptionType) -> PricerResult<f64> {
        self.estimate(option_type).map(|e| e.price)
    }

    pub fn price_call(&self) -> PricerResult<f64> {
        self.price(OptionType::Call)
    }

    pub fn price_put(&self) -> PricerResult<f64> {
        self.price(OptionType::Put)
    }
}

fn time_steps(time: f64) -> PricerResult<usize> {
    if !(time > 0.0) || !time.is_finite() {
        return Err(PricerError::invalid_input(format!(
            "time to maturity must be positive, got {}",
            time
        )));
    }
    Ok(((time * TRADING_DAYS_PER_YEAR).round() as usize).max(1))
}
