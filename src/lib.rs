//! # Option Pricer - Multi-Model European Option Valuation
//!
//! Values European calls and puts on a listed equity with four models and
//! compares them against the market.
//!
//! ## Overview
//!
//! - **Black-Scholes**: Closed-form price, Greeks and implied volatility
//! - **Binomial Tree**: Cox-Ross-Rubinstein lattice
//! - **Monte Carlo**: Geometric Brownian motion with daily steps
//! - **Heston**: Stochastic variance simulated with full truncation
//!
//! Market data (spot history, listed expirations, option quotes) comes in
//! through collaborator traits. [`data::YahooClient`] implements them over
//! HTTP and [`data::StaticMarketData`] in memory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use option_pricer::prelude::*;
//!
//! let yahoo = YahooClient::new().unwrap();
//! let option = OptionContract::resolve(&yahoo, "AAPL", 180.0, None, 0.05).unwrap();
//! let stock = StockData::fetch(&yahoo, "AAPL", Lookback::one_year()).unwrap();
//!
//! let config = ModelConfig::default();
//! let comparison = PricingComparator::new(&option, &stock, &yahoo, &config)
//!     .compare()
//!     .unwrap();
//!
//! for result in &comparison.calls.models {
//!     println!("{:<15} {:>9.2}", result.model.name(), result.price);
//! }
//! ```
//!
//! ## What This Crate Does NOT Do
//!
//! - Price American or path-dependent payoffs
//! - Calibrate Heston parameters to the market
//! - Plot or persist results

pub mod config;
pub mod core;
pub mod data;
pub mod models;
pub mod pricing;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{Greeks, OptionContract, OptionType, PricerError, PricerResult, StockData};

    // Configuration
    pub use crate::config::{BinomialConfig, HestonConfig, ModelConfig, MonteCarloConfig, PricingConfig};

    // Market data
    pub use crate::data::{
        HistoricalPriceProvider, ListedChain, ListedQuote, Lookback, MarketDataProvider, MaturityResolver,
        StaticMarketData, YahooClient,
    };

    // Models
    pub use crate::models::{
        implied_volatility, norm_cdf, norm_pdf, price as bs_price, BinomialTreePricer, BlackScholesPricer,
        GreekCalculator, HestonParams, HestonPaths, HestonPricer, McEstimate, MonteCarloPricer, SeedPolicy,
    };

    // Comparison
    pub use crate::pricing::{PricingComparator, PricingComparison, PricingModel, PricingResult, SideComparison};
}

// Re-export main types at crate root
pub use crate::core::{PricerError, PricerResult};
pub use crate::pricing::PricingComparator;
