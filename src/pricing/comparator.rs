//! PricingComparator - runs every model against one contract and snapshot
//!
//! Each pricer values the call and the put; the market collaborator supplies
//! the listed quotes. A missing or failed quote leaves the market side empty
//! and never aborts the comparison. Pricer failures do.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ModelConfig;
use crate::core::{Greeks, OptionContract, OptionType, PricerResult, StockData};
use crate::data::MarketDataProvider;
use crate::models::{
    implied_volatility, BinomialTreePricer, BlackScholesPricer, GreekCalculator, HestonPricer,
    McEstimate, MonteCarloPricer,
};

/// Pricing model identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingModel {
    BlackScholes,
    BinomialTree,
    MonteCarlo,
    Heston,
}

impl PricingModel {
    pub const ALL: [PricingModel; 4] = [
        PricingModel::BlackScholes,
        PricingModel::BinomialTree,
        PricingModel::MonteCarlo,
        PricingModel::Heston,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PricingModel::BlackScholes => "Black-Scholes",
            PricingModel::BinomialTree => "Binomial Tree",
            PricingModel::MonteCarlo => "Monte Carlo",
            PricingModel::Heston => "Heston",
        }
    }
}

/// One model's price for one side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub model: PricingModel,
    pub price: f64,
    /// e^(-rT) applied to the expected payoff
    pub discount_factor: f64,
    /// Standard error of simulation estimates; None for deterministic models
    pub std_error: Option<f64>,
}

impl PricingResult {
    fn exact(model: PricingModel, price: f64, discount_factor: f64) -> Self {
        Self {
            model,
            price,
            discount_factor,
            std_error: None,
        }
    }

    fn simulated(model: PricingModel, estimate: McEstimate, discount_factor: f64) -> Self {
        Self {
            model,
            price: estimate.price,
            discount_factor,
            std_error: Some(estimate.std_error),
        }
    }

    /// Model price minus market price
    pub fn deviation_from(&self, market_price: f64) -> f64 {
        self.price - market_price
    }
}

/// Model prices and market quote for calls or puts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideComparison {
    pub option_type: OptionType,
    /// Last price of the nearest listed strike, when available
    pub market_price: Option<f64>,
    /// Black-Scholes volatility implied by `market_price`
    pub market_implied_vol: Option<f64>,
    pub models: Vec<PricingResult>,
}

impl SideComparison {
    pub fn result_for(&self, model: PricingModel) -> Option<&PricingResult> {
        self.models.iter().find(|r| r.model == model)
    }

    /// `(model, model - market)` for every model; empty without a quote
    pub fn deviations(&self) -> Vec<(PricingModel, f64)> {
        match self.market_price {
            Some(market) => self
                .models
                .iter()
                .map(|r| (r.model, r.deviation_from(market)))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Structured result of one comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingComparison {
    pub ticker: String,
    pub strike: f64,
    pub spot: f64,
    pub volatility: f64,
    pub maturity: NaiveDate,
    pub time_to_maturity: f64,
    pub days_to_maturity: i64,
    pub calls: SideComparison,
    pub puts: SideComparison,
    /// Call-side Black-Scholes Greeks
    pub greeks: Greeks,
}

impl PricingComparison {
    pub fn side(&self, option_type: OptionType) -> &SideComparison {
        match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        }
    }
}

/// Fans one contract out to every pricer and the market collaborator
pub struct PricingComparator<'a, M: MarketDataProvider + ?Sized> {
    option: &'a OptionContract,
    stock: &'a StockData,
    market: &'a M,
    config: &'a ModelConfig,
}

impl<'a, M: MarketDataProvider + ?Sized> PricingComparator<'a, M> {
    pub fn new(option: &'a OptionContract, stock: &'a StockData, market: &'a M, config: &'a ModelConfig) -> Self {
        Self {
            option,
            stock,
            market,
            config,
        }
    }

    /// Price both sides with every model, fetch quotes and compute Greeks
    pub fn compare(&self) -> PricerResult<PricingComparison> {
        info!(
            ticker = self.option.ticker(),
            strike = self.option.strike_price(),
            maturity = %self.option.maturity_date(),
            spot = self.stock.current_price(),
            vol = self.stock.volatility(),
            "running pricing comparison"
        );

        let calls = self.compare_side(OptionType::Call)?;
        let puts = self.compare_side(OptionType::Put)?;
        let greeks = GreekCalculator::new(self.option, self.stock).calculate_greeks()?;

        info!(
            call_quote = calls.market_price.is_some(),
            put_quote = puts.market_price.is_some(),
            "pricing comparison complete"
        );

        Ok(PricingComparison {
            ticker: self.option.ticker().to_string(),
            strike: self.option.strike_price(),
            spot: self.stock.current_price(),
            volatility: self.stock.volatility(),
            maturity: self.option.maturity_date(),
            time_to_maturity: self.option.time_to_maturity(),
            days_to_maturity: self.option.days_to_maturity(),
            calls,
            puts,
            greeks,
        })
    }

    fn compare_side(&self, option_type: OptionType) -> PricerResult<SideComparison> {
        let models = self.price_models(option_type)?;
        let market_price = self.market_quote(option_type);
        let market_implied_vol = market_price.and_then(|p| self.implied_vol(p, option_type));

        Ok(SideComparison {
            option_type,
            market_price,
            market_implied_vol,
            models,
        })
    }

    fn price_models(&self, option_type: OptionType) -> PricerResult<Vec<PricingResult>> {
        let (option, stock, cfg) = (self.option, self.stock, self.config);
        let df = option.discount_factor();

        let bs = BlackScholesPricer::new(option, stock).price(option_type)?;
        let tree = BinomialTreePricer::with_steps(option, stock, cfg.binomial.num_steps).price(option_type)?;
        let mc = MonteCarloPricer::new(option, stock, cfg.monte_carlo.num_simulations)
            .with_seed_policy(cfg.monte_carlo.seed_policy())
            .estimate(option_type)?;
        let heston = HestonPricer::new(option, stock, cfg.heston.params)
            .with_seed_policy(cfg.heston.seed_policy())
            .estimate(option_type, cfg.heston.num_simulations, cfg.heston.num_steps)?;

        debug!(?option_type, bs, tree, mc = mc.price, heston = heston.price, "model prices");

        Ok(vec![
            PricingResult::exact(PricingModel::BlackScholes, bs, df),
            PricingResult::exact(PricingModel::BinomialTree, tree, df),
            PricingResult::simulated(PricingModel::MonteCarlo, mc, df),
            PricingResult::simulated(PricingModel::Heston, heston, df),
        ])
    }

    fn market_quote(&self, option_type: OptionType) -> Option<f64> {
        let quote = self.market.get_quote(
            self.option.ticker(),
            self.option.strike_price(),
            self.option.maturity_date(),
            option_type,
        );
        match quote {
            Ok(Some(price)) if price.is_finite() => Some(price),
            Ok(Some(price)) => {
                warn!(?option_type, price, "ignoring non-finite market quote");
                None
            }
            Ok(None) => {
                info!(?option_type, "no market quote for this maturity");
                None
            }
            Err(e) => {
                warn!(?option_type, error = %e, "market quote unavailable");
                None
            }
        }
    }

    fn implied_vol(&self, market_price: f64, option_type: OptionType) -> Option<f64> {
        let iv = implied_volatility(
            market_price,
            self.stock.current_price(),
            self.option.strike_price(),
            self.option.risk_free_rate(),
            self.option.time_to_maturity(),
            option_type,
        );
        match iv {
            Ok(iv) => Some(iv),
            Err(e) => {
                debug!(?option_type, market_price, error = %e, "could not invert market quote");
                None
            }
        }
    }
}
