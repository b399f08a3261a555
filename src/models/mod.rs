//! Pricing Models
//!
//! Implements:
//! - Black-Scholes (closed form, implied volatility)
//! - Binomial tree (Cox-Ross-Rubinstein lattice)
//! - Monte Carlo under geometric Brownian motion
//! - Heston stochastic volatility (Monte Carlo)
//! - Analytic Greeks
//!
//! Every pricer borrows one `OptionContract` and one `StockData` and
//! recomputes from them on each call.

pub mod binomial;
pub mod black_scholes;
pub mod greeks;
pub mod heston;
pub mod inputs;
pub mod monte_carlo;
pub mod simulation;

pub use binomial::*;
pub use black_scholes::*;
pub use greeks::*;
pub use heston::*;
pub use inputs::MarketInputs;
pub use monte_carlo::*;
pub use simulation::{McEstimate, SeedPolicy, PATHS_PER_CHUNK};
