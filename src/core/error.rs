//! Error types for the option pricer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid maturity: {0}")]
    InvalidMaturity(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type PricerResult<T> = Result<T, PricerError>;

impl PricerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_maturity(msg: impl Into<String>) -> Self {
        Self::InvalidMaturity(msg.into())
    }

    pub fn data_unavailable(msg: impl Into<String>) -> Self {
        Self::DataUnavailable(msg.into())
    }

    pub fn numerical(msg: impl Into<String>) -> Self {
        Self::Numerical(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
