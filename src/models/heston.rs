//! Heston Stochastic Volatility Model
//!
//! The Heston model assumes variance follows a mean-reverting square-root process:
//!
//! dS = r · S · dt + √v · S · dW_S
//! dv = κ(θ - v) · dt + ξ · √v · dW_v,   d⟨W_S, W_v⟩ = ρ dt
//!
//! where:
//! - κ: mean reversion speed
//! - θ: long-term variance
//! - ξ: volatility of volatility
//! - ρ: correlation between spot and variance Brownians
//! - v0: initial variance
//!
//! Paths are discretized with a full-truncation Euler scheme for the variance
//! (negative excursions are floored at zero before every square root) and a
//! log-Euler step for the spot. Parameters are taken as given, not fitted.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::inputs::MarketInputs;
use super::simulation::{self, McEstimate, SeedPolicy};
use crate::core::{OptionContract, OptionType, PricerError, PricerResult, StockData};

/// Heston model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HestonParams {
    /// Mean reversion speed (κ)
    pub kappa: f64,
    /// Long-term variance (θ)
    pub theta: f64,
    /// Volatility of volatility (ξ)
    pub xi: f64,
    /// Correlation between spot and variance (ρ)
    pub rho: f64,
    /// Initial variance (v0)
    pub v0: f64,
}

impl HestonParams {
    pub fn new(kappa: f64, theta: f64, xi: f64, rho: f64, v0: f64) -> Self {
        Self {
            kappa,
            theta,
            xi,
            rho,
            v0,
        }
    }

    /// Typical parameters for an equity index
    pub fn typical_equity() -> Self {
        Self {
            kappa: 2.0,  // Mean reversion
            theta: 0.04, // 20% long-term vol
            xi: 0.3,     // Vol-of-vol
            rho: -0.7,   // Leverage effect
            v0: 0.04,    // 20% initial vol
        }
    }

    /// Constant variance σ²: the model collapses to geometric Brownian motion
    pub fn flat(sigma: f64) -> Self {
        Self {
            kappa: 1.0,
            theta: sigma * sigma,
            xi: 0.0,
            rho: 0.0,
            v0: sigma * sigma,
        }
    }

    /// Check Feller condition: 2κθ > ξ² (variance stays away from zero)
    pub fn feller_condition(&self) -> bool {
        2.0 * self.kappa * self.theta > self.xi * self.xi
    }

    /// Validate parameters
    pub fn validate(&self) -> PricerResult<()> {
        if !(self.kappa > 0.0) || !self.kappa.is_finite() {
            return Err(PricerError::invalid_input("kappa must be positive"));
        }
        if !(self.theta >= 0.0) || !self.theta.is_finite() {
            return Err(PricerError::invalid_input("theta must be non-negative"));
        }
        if !(self.xi >= 0.0) || !self.xi.is_finite() {
            return Err(PricerError::invalid_input("xi must be non-negative"));
        }
        if !(-1.0..=1.0).contains(&self.rho) {
            return Err(PricerError::invalid_input("rho must be in [-1, 1]"));
        }
        if !(self.v0 >= 0.0) || !self.v0.is_finite() {
            return Err(PricerError::invalid_input("v0 must be non-negative"));
        }
        Ok(())
    }

    /// Long-term volatility
    pub fn long_term_vol(&self) -> f64 {
        self.theta.sqrt()
    }

    /// Initial volatility
    pub fn initial_vol(&self) -> f64 {
        self.v0.sqrt()
    }
}

impl Default for HestonParams {
    fn default() -> Self {
        Self::typical_equity()
    }
}

/// Simulated price and variance trajectories
///
/// Row `i` is path `i`; column `j` is time `j · dt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HestonPaths {
    pub times: Array1<f64>,
    pub prices: Array2<f64>,
    pub variances: Array2<f64>,
}

impl HestonPaths {
    pub fn num_paths(&self) -> usize {
        self.prices.nrows()
    }

    pub fn terminal_prices(&self) -> ArrayView1<'_, f64> {
        self.prices.index_axis(Axis(1), self.prices.ncols() - 1)
    }

    pub fn terminal_variances(&self) -> ArrayView1<'_, f64> {
        self.variances.index_axis(Axis(1), self.variances.ncols() - 1)
    }
}

/// One Euler step, constants precomputed per run
#[derive(Debug, Clone, Copy)]
struct HestonStepper {
    params: HestonParams,
    rate: f64,
    dt: f64,
    sqrt_dt: f64,
    rho_bar: f64,
}

impl HestonStepper {
    fn new(params: HestonParams, rate: f64, time: f64, num_steps: usize) -> Self {
        let dt = time / num_steps as f64;
        Self {
            params,
            rate,
            dt,
            sqrt_dt: dt.sqrt(),
            rho_bar: (1.0 - params.rho * params.rho).max(0.0).sqrt(),
        }
    }

    /// Advance `(s, v)` by one step; draws Z1 then Z2
    #[inline]
    fn step(&self, s: f64, v: f64, rng: &mut ChaCha8Rng) -> (f64, f64) {
        let p = &self.params;
        let z1 = simulation::standard_normal(rng);
        let z2 = simulation::standard_normal(rng);
        let z_v = p.rho * z1 + self.rho_bar * z2;

        let v_pos = v.max(0.0);
        let vol = v_pos.sqrt();

        let v_next = (v + p.kappa * (p.theta - v) * self.dt + p.xi * vol * self.sqrt_dt * z_v).max(0.0);
        let s_next = s * ((self.rate - 0.5 * v_pos) * self.dt + vol * self.sqrt_dt * z1).exp();

        (s_next, v_next)
    }
}

/// Stochastic-volatility pricer over one contract and one underlying snapshot
#[derive(Debug, Clone, Copy)]
pub struct HestonPricer<'a> {
    option: &'a OptionContract,
    stock: &'a StockData,
    params: HestonParams,
    seed: SeedPolicy,
}

impl<'a> HestonPricer<'a> {
    /// Unseeded pricer: every call draws a fresh batch of paths
    pub fn new(option: &'a OptionContract, stock: &'a StockData, params: HestonParams) -> Self {
        Self {
            option,
            stock,
            params,
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

    pub fn params(&self) -> &HestonParams {
        &self.params
    }

    fn prepare(&self, num_simulations: usize, num_steps: usize) -> PricerResult<(MarketInputs, HestonStepper)> {
        self.params.validate()?;
        if num_simulations == 0 {
            return Err(PricerError::invalid_input("number of simulations must be >= 1"));
        }
        if num_steps == 0 {
            return Err(PricerError::invalid_input("number of time steps must be >= 1"));
        }

        let m = MarketInputs::without_volatility(self.option, self.stock)?;
        if !self.params.feller_condition() {
            tracing::debug!(params = ?self.params, "Feller condition violated; variance will touch zero");
        }

        Ok((m, HestonStepper::new(self.params, m.rate, m.time, num_steps)))
    }

    /// Full price and variance trajectories, `num_steps + 1` points per path
    pub fn simulate_paths(&self, num_simulations: usize, num_steps: usize) -> PricerResult<HestonPaths> {
        let (m, stepper) = self.prepare(num_simulations, num_steps)?;
        let width = num_steps + 1;
        let base_seed = self.seed.base_seed();
        let v0 = self.params.v0;

        let chunks = simulation::map_chunks(num_simulations, base_seed, |rng, len| {
            let mut prices = Vec::with_capacity(len * width);
            let mut variances = Vec::with_capacity(len * width);
            for _ in 0..len {
                let (mut s, mut v) = (m.spot, v0);
                prices.push(s);
                variances.push(v);
                for _ in 0..num_steps {
                    (s, v) = stepper.step(s, v, rng);
                    prices.push(s);
                    variances.push(v);
                }
            }
            (prices, variances)
        });

        let mut prices = Vec::with_capacity(num_simulations * width);
        let mut variances = Vec::with_capacity(num_simulations * width);
        for (p, v) in chunks {
            prices.extend(p);
            variances.extend(v);
        }

        let shape = (num_simulations, width);
        Ok(HestonPaths {
            times: Array1::linspace(0.0, m.time, width),
            prices: Array2::from_shape_vec(shape, prices).map_err(|e| PricerError::numerical(e.to_string()))?,
            variances: Array2::from_shape_vec(shape, variances)
                .map_err(|e| PricerError::numerical(e.to_string()))?,
        })
    }

    pub fn estimate(
        &self,
        option_type: OptionType,
        num_simulations: usize,
        num_steps: usize,
    ) -> PricerResult<McEstimate> {
        let (m, stepper) = self.prepare(num_simulations, num_steps)?;
        let v0 = self.params.v0;

        tracing::debug!(
            paths = num_simulations,
            steps = num_steps,
            ?option_type,
            "simulating Heston paths"
        );

        simulation::estimate(
            num_simulations,
            self.seed.base_seed(),
            m.discount_factor(),
            |terminal| option_type.intrinsic(terminal, m.strike),
            |rng| {
                let (mut s, mut v) = (m.spot, v0);
                for _ in 0..num_steps {
                    (s, v) = stepper.step(s, v, rng);
                }
                s
            },
        )
    }

    pub fn price(&self, option_type: OptionType, num_simulations: usize, num_steps: usize) -> PricerResult<f64> {
        self.estimate(option_type, num_simulations, num_steps).map(|e| e.price)
    }

    pub fn price_call(&self, num_simulations: usize, num_steps: usize) -> PricerResult<f64> {
        self.price(OptionType::Call, num_simulations, num_steps)
    }

    pub fn price_put(&self, num_simulations: usize, num_steps: usize) -> PricerResult<f64> {
        self.price(OptionType::Put, num_simulations, num_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::black_scholes;

    fn snapshot(spot: f64, strike: f64, rate: f64, time: f64) -> (OptionContract, StockData) {
        (
            OptionContract::with_time(strike, rate, time),
            StockData::new("TEST", spot, 0.2).unwrap(),
        )
    }

    #[test]
    fn test_feller_condition() {
        let params = HestonParams::typical_equity();
        // 2 * 2.0 * 0.04 = 0.16 > 0.3² = 0.09
        assert!(params.feller_condition());

        let bad_params = HestonParams::new(1.0, 0.04, 0.5, -0.7, 0.04);
        // 2 * 1.0 * 0.04 = 0.08 < 0.5² = 0.25
        assert!(!bad_params.feller_condition());
    }

    #[test]
    fn test_validate() {
        assert!(HestonParams::typical_equity().validate().is_ok());
        assert!(HestonParams::flat(0.2).validate().is_ok());
        assert!(HestonParams::new(0.0, 0.04, 0.3, -0.7, 0.04).validate().is_err());
        assert!(HestonParams::new(2.0, -0.01, 0.3, -0.7, 0.04).validate().is_err());
        assert!(HestonParams::new(2.0, 0.04, -0.3, -0.7, 0.04).validate().is_err());
        assert!(HestonParams::new(2.0, 0.04, 0.3, -1.1, 0.04).validate().is_err());
        assert!(HestonParams::new(2.0, 0.04, 0.3, -0.7, -0.04).validate().is_err());
    }

    #[test]
    fn test_flat_variance_matches_black_scholes() {
        let (option, stock) = snapshot(100.0, 100.0, 0.05, 1.0);
        let pricer = HestonPricer::new(&option, &stock, HestonParams::flat(0.2)).with_seed(7);

        for option_type in [OptionType::Call, OptionType::Put] {
            let est = pricer.estimate(option_type, 50_000, 50).unwrap();
            let bs = black_scholes::price(100.0, 100.0, 0.05, 0.2, 1.0, option_type);
            assert!(
                (est.price - bs).abs() < 4.0 * est.std_error,
                "{:?}: heston {} vs bs {} (se {})",
                option_type,
                est.price,
                bs,
                est.std_error
            );
        }
    }

    #[test]
    fn test_path_shapes() {
        let (option, stock) = snapshot(100.0, 100.0, 0.05, 0.5);
        let pricer = HestonPricer::new(&option, &stock, HestonParams::typical_equity()).with_seed(3);
        let paths = pricer.simulate_paths(10, 20).unwrap();

        assert_eq!(paths.prices.dim(), (10, 21));
        assert_eq!(paths.variances.dim(), (10, 21));
        assert_eq!(paths.times.len(), 21);
        assert!((paths.times[20] - 0.5).abs() < 1e-12);
        assert!(paths.prices.column(0).iter().all(|&s| s == 100.0));
        assert!(paths.variances.column(0).iter().all(|&v| v == 0.04));
    }

    #[test]
    fn test_full_truncation_keeps_variance_non_negative() {
        let (option, stock) = snapshot(100.0, 100.0, 0.05, 1.0);
        // Violent vol-of-vol from a low start: variance repeatedly hits the floor
        let params = HestonParams::new(0.5, 0.02, 1.5, -0.9, 0.01);
        let pricer = HestonPricer::new(&option, &stock, params).with_seed(17);

        let paths = pricer.simulate_paths(500, 252).unwrap();
        assert!(paths.variances.iter().all(|&v| v >= 0.0));
        assert!(paths.variances.iter().any(|&v| v == 0.0));
        assert!(paths.prices.iter().all(|s| s.is_finite() && *s > 0.0));

        let call = pricer.price_call(5_000, 252).unwrap();
        assert!(call.is_finite() && call > 0.0);
    }

    #[test]
    fn test_paths_agree_with_pricing_run() {
        let (option, stock) = snapshot(100.0, 95.0, 0.03, 0.5);
        let pricer = HestonPricer::new(&option, &stock, HestonParams::typical_equity()).with_seed(21);

        let paths = pricer.simulate_paths(3_000, 30).unwrap();
        let payoffs = paths.terminal_prices().mapv(|s| OptionType::Call.intrinsic(s, 95.0));
        let from_paths = option.discount_factor() * payoffs.sum() / 3_000.0;

        let priced = pricer.price_call(3_000, 30).unwrap();
        assert!((priced - from_paths).abs() < 1e-9 * priced.max(1.0));
    }

    #[test]
    fn test_put_call_parity_on_common_paths() {
        let (option, stock) = snapshot(100.0, 100.0, 0.05, 1.0);
        let pricer = HestonPricer::new(&option, &stock, HestonParams::typical_equity()).with_seed(5);

        let call = pricer.price_call(20_000, 100).unwrap();
        let put = pricer.price_put(20_000, 100).unwrap();
        let parity = 100.0 - 100.0 * (-0.05_f64).exp();
        assert!((call - put - parity).abs() < 0.6);
    }

    #[test]
    fn test_invalid_configuration() {
        let (option, stock) = snapshot(100.0, 100.0, 0.05, 1.0);
        let pricer = HestonPricer::new(&option, &stock, HestonParams::typical_equity());
        assert!(matches!(pricer.price_call(0, 10), Err(PricerError::InvalidInput(_))));
        assert!(matches!(pricer.price_call(10, 0), Err(PricerError::InvalidInput(_))));

        let bad = HestonPricer::new(&option, &stock, HestonParams::new(2.0, 0.04, 0.3, 2.0, 0.04));
        assert!(matches!(bad.simulate_paths(10, 10), Err(PricerError::InvalidInput(_))));

        let (expired, stock) = snapshot(100.0, 100.0, 0.05, 0.0);
        let pricer = HestonPricer::new(&expired, &stock, HestonParams::typical_equity());
        assert!(matches!(pricer.price_put(10, 10), Err(PricerError::InvalidInput(_))));
    }
}
