//! Common types and error definitions for the pricing engine.
//!
//! This module contains:
//! - Error types using `thiserror`
//! - The 18-decimal fixed-point number used on every pricing path
//! - Type aliases and identifiers for domain concepts

/// Error types for the pricing engine.
pub mod error;

/// 18-decimal fixed-point arithmetic.
pub mod fixed_point;

/// Common type aliases for prices, amounts and pairs.
pub mod primitives;
