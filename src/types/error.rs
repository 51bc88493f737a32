//! Error types for the pricing engine.

use thiserror::Error;

use super::fixed_point::Wad;

/// Errors produced by the tracker, the spread engine and the pricing engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MMError {
    /// The variance tracker has not been seeded with a first price.
    #[error("variance tracker is not initialized")]
    NotInitialized,

    /// `initialize` was called on a tracker that already holds history.
    ///
    /// Use `reinitialize` to discard history explicitly.
    #[error("variance tracker is already initialized")]
    AlreadyInitialized,

    /// A multiplier, threshold, decay or seed is outside its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The fast/slow deviation exceeded the configured threshold.
    #[error("volatility too high: deviation {deviation_bps} bps exceeds {threshold_bps} bps")]
    VolatilityTooHigh {
        /// Deviation between the fast and slow averages, in basis points.
        deviation_bps: u64,
        /// Configured gate threshold, in basis points.
        threshold_bps: u64,
    },

    /// The computed output exceeds the available reserve of the output asset.
    #[error("insufficient liquidity: need {required}, have {available}")]
    InsufficientLiquidity {
        /// Output amount the quote would pay.
        required: Wad,
        /// Reserve currently available.
        available: Wad,
    },

    /// The reference price source could not produce a price.
    #[error("reference price unavailable: {0}")]
    PriceUnavailable(String),

    /// The caller does not hold the configuration authority for this engine.
    #[error("caller is not the configuration authority")]
    Unauthorized,

    /// The quote request itself is malformed.
    #[error("invalid quote request: {0}")]
    InvalidQuoteRequest(String),

    /// A fixed-point operation overflowed 256 bits.
    #[error("arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    /// A fixed-point division had a zero divisor.
    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),

    /// Internal state is inconsistent (poisoned lock, negative fee, unknown pair).
    #[error("invalid market state: {0}")]
    InvalidMarketState(String),
}

impl MMError {
    /// Returns true when the host may retry the same request later.
    ///
    /// Gate trips and price outages are market conditions; everything else
    /// needs a different request or a fix.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MMError::VolatilityTooHigh { .. } | MMError::PriceUnavailable(_)
        )
    }
}

/// Result alias used throughout the crate.
pub type MMResult<T> = Result<T, MMError>;
