//! Configuration for a pricing session

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{PricerError, PricerResult};
use crate::data::Lookback;
use crate::models::{HestonParams, SeedPolicy, DEFAULT_SIMULATIONS, DEFAULT_TREE_STEPS};

/// Contract, data window and model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Underlying symbol
    pub ticker: String,
    /// Strike price
    pub strike_price: f64,
    /// Annualized, continuously compounded risk-free rate
    pub risk_free_rate: f64,
    /// Desired maturity; the nearest listed expiration is used.
    /// Default: None (180 days ahead)
    pub target_maturity: Option<NaiveDate>,
    /// Calendar days of history for the volatility estimate
    /// Default: 365
    pub lookback_days: u32,
    /// Per-model settings
    pub models: ModelConfig,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            ticker: "AAPL".to_string(),
            strike_price: 180.0,
            risk_free_rate: 0.05,
            target_maturity: None,
            lookback_days: 365,
            models: ModelConfig::default(),
        }
    }
}

impl PricingConfig {
    /// Load from a JSON file; absent fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> PricerResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| PricerError::Serialization(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        tracing::info!(path = %path.display(), ticker = %config.ticker, "loaded pricing config");
        Ok(config)
    }

    pub fn lookback(&self) -> Lookback {
        Lookback::days(self.lookback_days)
    }

    pub fn validate(&self) -> PricerResult<()> {
        if self.ticker.trim().is_empty() {
            return Err(PricerError::config("ticker must not be empty"));
        }
        if !(self.strike_price > 0.0) || !self.strike_price.is_finite() {
            return Err(PricerError::config("strike_price must be positive"));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(PricerError::config("risk_free_rate must be finite"));
        }
        if self.lookback_days < 2 {
            return Err(PricerError::config("lookback_days must be at least 2"));
        }
        self.models.validate()
    }
}

/// Settings of every pricer the comparison runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub binomial: BinomialConfig,
    pub monte_carlo: MonteCarloConfig,
    pub heston: HestonConfig,
}

impl ModelConfig {
    pub fn validate(&self) -> PricerResult<()> {
        if self.binomial.num_steps == 0 {
            return Err(PricerError::config("binomial.num_steps must be >= 1"));
        }
        if self.monte_carlo.num_simulations == 0 {
            return Err(PricerError::config("monte_carlo.num_simulations must be >= 1"));
        }
        if self.heston.num_simulations == 0 || self.heston.num_steps == 0 {
            return Err(PricerError::config(
                "heston.num_simulations and heston.num_steps must be >= 1",
            ));
        }
        self.heston
            .params
            .validate()
            .map_err(|e| PricerError::config(format!("heston.params: {}", e)))
    }
}

/// Lattice depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinomialConfig {
    /// Default: 100
    pub num_steps: usize,
}

impl Default for BinomialConfig {
    fn default() -> Self {
        Self {
            num_steps: DEFAULT_TREE_STEPS,
        }
    }
}

/// GBM simulation size; time steps follow the 252-day calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Default: 10,000
    pub num_simulations: usize,
    /// Fixed seed for reproducible runs. Default: None (fresh entropy)
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            num_simulations: DEFAULT_SIMULATIONS,
            seed: None,
        }
    }
}

impl MonteCarloConfig {
    pub fn seed_policy(&self) -> SeedPolicy {
        SeedPolicy::from_seed(self.seed)
    }
}

/// Heston parameters and discretization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HestonConfig {
    pub params: HestonParams,
    /// Default: 10,000
    pub num_simulations: usize,
    /// Default: 252
    pub num_steps: usize,
    /// Fixed seed for reproducible runs. Default: None (fresh entropy)
    pub seed: Option<u64>,
}

impl Default for HestonConfig {
    fn default() -> Self {
        Self {
            params: HestonParams::typical_equity(),
            num_simulations: DEFAULT_SIMULATIONS,
            num_steps: 252,
            seed: None,
        }
    }
}

impl HestonConfig {
    pub fn seed_policy(&self) -> SeedPolicy {
        SeedPolicy::from_seed(self.seed)
    }

    /// Fast preset for interactive runs
    pub fn quick() -> Self {
        Self {
            num_simulations: 2_000,
            num_steps: 50,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PricingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.models.binomial.num_steps, 100);
        assert_eq!(config.models.monte_carlo.num_simulations, 10_000);
        assert_eq!(config.models.heston.num_steps, 252);
        assert_eq!(config.lookback(), Lookback::one_year());
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "ticker": "MSFT",
                "strike_price": 420.0,
                "target_maturity": "2025-12-19",
                "models": {{
                    "monte_carlo": {{ "seed": 42 }},
                    "heston": {{ "params": {{ "kappa": 1.5, "theta": 0.05, "xi": 0.4, "rho": -0.6, "v0": 0.05 }} }}
                }}
            }}"#
        )
        .unwrap();

        let config = PricingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.ticker, "MSFT");
        assert_eq!(config.risk_free_rate, 0.05);
        assert_eq!(config.target_maturity, NaiveDate::from_ymd_opt(2025, 12, 19));
        assert_eq!(config.models.monte_carlo.num_simulations, 10_000);
        assert_eq!(config.models.monte_carlo.seed_policy(), SeedPolicy::Fixed(42));
        assert_eq!(config.models.heston.params.kappa, 1.5);
        assert_eq!(config.models.heston.num_steps, 252);
        assert_eq!(config.models.binomial.num_steps, 100);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "models": {{ "binomial": {{ "num_steps": 0 }} }} }}"#).unwrap();
        assert!(matches!(
            PricingConfig::from_file(file.path()),
            Err(PricerError::Config(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            PricingConfig::from_file(file.path()),
            Err(PricerError::Serialization(_))
        ));

        assert!(matches!(
            PricingConfig::from_file("/nonexistent/pricing.json"),
            Err(PricerError::IO(_))
        ));
    }

    #[test]
    fn test_bad_heston_params() {
        let mut config = PricingConfig::default();
        config.models.heston.params.rho = 1.5;
        assert!(matches!(config.validate(), Err(PricerError::Config(_))));
    }
}
