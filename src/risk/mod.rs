//! Risk controls applied around spread computation.
//!
//! This module provides:
//! - The deviation-based volatility gate
//! - The fill-or-kill liquidity feasibility check

/// Volatility gate and liquidity check.
pub mod volatility_gate;

pub use volatility_gate::{GateDecision, VolatilityGate, check_liquidity};
