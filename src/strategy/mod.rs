//! Strategy module containing the pure pricing calculations.
//!
//! # Key Formulas
//!
//! ## Spread
//! ```text
//! spread = min(max(σ²_fast, σ²_slow) * k_vol + amount_in * k_impact / reserve_in, max_spread)
//! ```
//!
//! ## Executable price
//! ```text
//! buy  = P * (1 + spread)
//! sell = P * (1 - spread)
//! ```

/// Spread configuration.
pub mod config;

/// Quote types and directional output calculation.
pub mod quote;

/// Spread component and cap calculation.
pub mod spread;
