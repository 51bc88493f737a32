//! Collaborator traits at the boundary of the pricing core.
//!
//! This module defines the abstract interfaces the pricing engine depends on
//! but does not implement:
//!
//! - [`ReferencePriceSource`]: the external price signal (oracle or override)
//! - [`ReserveView`]: point-in-time reads of available liquidity
//! - [`FeeSink`]: optional, best-effort notification after a filled quote
//!
//! Implementations may block or perform I/O; the engine always awaits them
//! outside its state lock.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use oracle_spread_rs::execution::{FeeSink, NoopFeeSink};
//!
//! let sink: Arc<dyn FeeSink> = Arc::new(NoopFeeSink);
//! // In an async context: sink.notify(spread_fee, liquidity_value).await
//! # let _ = sink;
//! ```

use async_trait::async_trait;

use crate::types::error::MMResult;
use crate::types::primitives::{Amount, PairId, Price};

/// Source of the reference price a pair is quoted around.
///
/// Reads must have no side effect on the source; the engine calls this for
/// both mutating quotes and administrative seeding.
#[async_trait]
pub trait ReferencePriceSource: Send + Sync {
    /// Returns the current price of `pair`, quote asset per base asset.
    ///
    /// # Errors
    ///
    /// Returns `MMError::PriceUnavailable` if no price can be produced.
    async fn current_price(&self, pair: &PairId) -> MMResult<Price>;
}

/// Read-only view of the liquidity backing a pair.
#[async_trait]
pub trait ReserveView: Send + Sync {
    /// Returns the available balance of `asset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the balance cannot be read.
    async fn balance_of(&self, asset: &str) -> MMResult<Amount>;
}

/// Receiver of spread fee notifications.
///
/// Failures are logged and ignored by the engine; they never fail a quote.
#[async_trait]
pub trait FeeSink: Send + Sync {
    /// Called after a filled quote with the spread fee (output asset units)
    /// and the total liquidity value (quote asset units).
    ///
    /// # Errors
    ///
    /// Any error is treated as ignorable by the caller.
    async fn notify(&self, spread_fee: Amount, total_liquidity_value: Amount) -> MMResult<()>;
}

/// Fee sink that discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeeSink;

#[async_trait]
impl FeeSink for NoopFeeSink {
    async fn notify(&self, _spread_fee: Amount, _total_liquidity_value: Amount) -> MMResult<()> {
        Ok(())
    }
}
