//! Oracle-Anchored Dynamic Spread Pricing
//!
//! A Rust library that prices trades for an automated market maker around an
//! external reference price. The executable price is the reference price moved
//! against the trader by a dynamic spread with two components:
//!
//! - a **volatility spread**, sized from a dual-speed EWMA variance estimate of
//!   the reference price, and
//! - an **impact spread**, proportional to trade size relative to the reserve
//!   of the asset the trader is selling.
//!
//! # Overview
//!
//! Every mutating quote runs the same pipeline:
//!
//! ```text
//! reference price -> variance tracker -> volatility gate -> spread engine
//!                 -> quote -> liquidity check -> fee sink (best effort)
//! ```
//!
//! The fast and slow averages diverge when the price regime changes; their
//! deviation in basis points acts as a circuit breaker. The larger of the two
//! variances sizes the volatility spread, and the total is capped.
//!
//! ## Fixed Point
//!
//! All pricing arithmetic uses [`types::fixed_point::Wad`], an unsigned 256-bit
//! integer scaled by `10^18`, with truncation toward zero on every
//! multiply-then-divide. No floating point is involved, so results are
//! deterministic across platforms.
//!
//! # Modules
//!
//! - [`market_state`]: Dual-speed variance tracker and volatility readings
//! - [`strategy`]: Spread configuration, spread engine and quote calculation
//! - [`risk`]: Volatility gate and liquidity feasibility check
//! - [`execution`]: Collaborator traits and mock implementations
//! - [`engine`]: Per-pair pricing engine and pair registry
//! - [`types`]: Fixed-point numbers, common types and error definitions
//!
//! # Example
//!
//! ```rust
//! use oracle_spread_rs::prelude::*;
//!
//! let engine = SpreadEngine::new(SpreadConfig::default());
//!
//! let mut tracker = VarianceTracker::default();
//! tracker.initialize(Wad::from_integer(2000), None, None).unwrap();
//! let reading = tracker.update(Wad::from_integer(2004)).unwrap();
//!
//! let request = QuoteRequest::buy(Wad::from_integer(1000)).unwrap();
//! let quote = engine
//!     .price(&request, Wad::from_integer(2004), Wad::from_integer(100_000), &reading)
//!     .unwrap();
//!
//! assert!(quote.effective_price > Wad::from_integer(2004));
//! assert!(quote.total_spread <= SpreadConfig::default().max_spread);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;

/// Per-pair pricing engine and pair registry.
pub mod engine;

/// Collaborator traits and mock implementations.
pub mod execution;

/// Variance tracking of the reference price.
pub mod market_state;

/// Convenient re-exports.
pub mod prelude;

/// Volatility gate and liquidity check.
pub mod risk;

/// Spread and quote calculations.
pub mod strategy;

/// Fixed-point numbers, common types and error definitions.
pub mod types;
