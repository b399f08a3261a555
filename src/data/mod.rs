//! Market data collaborators
//!
//! Handles:
//! - Collaborator traits consumed by the pricing core
//! - Yahoo Finance implementation (free, delayed)
//! - In-memory implementation for offline runs

pub mod provider;
pub mod yahoo;

pub use provider::*;
pub use yahoo::*;
