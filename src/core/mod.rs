//! Core data types for the option pricer
//!
//! Defines fundamental types:
//! - OptionContract: Strike, maturity, rate (call/put via OptionType)
//! - StockData: Spot price and historical volatility
//! - Greeks: Call sensitivities
//! - PricerError: Error taxonomy shared by every module

pub mod error;
pub mod greeks;
pub mod option;
pub mod stock;

pub use error::*;
pub use greeks::*;
pub use option::*;
pub use stock::*;
