//! Option Greeks
//!
//! First and second order sensitivities of a long European call.

use serde::{Deserialize, Serialize};

/// Option Greeks (sensitivities)
///
/// Raw model units: theta per year, vega per unit of volatility, rho per unit
/// of rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta: dV/dS (sensitivity to spot)
    pub delta: f64,
    /// Gamma: d²V/dS² (sensitivity of delta to spot)
    pub gamma: f64,
    /// Theta: dV/dt (time decay per year)
    pub theta: f64,
    /// Vega: dV/dσ (sensitivity to volatility)
    pub vega: f64,
    /// Rho: dV/dr (sensitivity to interest rate)
    pub rho: f64,
}

impl Greeks {
    pub fn new(delta: f64, gamma: f64, theta: f64, vega: f64, rho: f64) -> Self {
        Self {
            delta,
            gamma,
            theta,
            vega,
            rho,
        }
    }

    /// Theta per calendar day
    pub fn theta_per_day(&self) -> f64 {
        self.theta / 365.0
    }

    /// Vega per 1% volatility move
    pub fn vega_per_point(&self) -> f64 {
        self.vega / 100.0
    }

    /// Rho per 1% rate move
    pub fn rho_per_point(&self) -> f64 {
        self.rho / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_units() {
        let g = Greeks::new(0.6368, 0.0188, -6.414, 37.524, 53.232);
        assert!((g.theta_per_day() + 6.414 / 365.0).abs() < 1e-12);
        assert!((g.vega_per_point() - 0.37524).abs() < 1e-12);
        assert!((g.rho_per_point() - 0.53232).abs() < 1e-12);
    }
}
