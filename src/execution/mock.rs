//! Mock collaborators for testing.
//!
//! This module provides in-memory implementations of the collaborator traits
//! for unit tests, integration tests and demos.
//!
//! # Features
//!
//! - Settable reference price with outage injection
//! - Per-asset reserve balances
//! - Fee sink that records notifications and can be told to fail
//!
//! # Example
//!
//! ```rust
//! use oracle_spread_rs::execution::{MockPriceSource, MockReserves};
//! use oracle_spread_rs::types::fixed_point::Wad;
//!
//! let oracle = MockPriceSource::new(Wad::from_integer(2000));
//! let reserves = MockReserves::new()
//!     .with_balance("ETH", Wad::from_integer(50))
//!     .with_balance("USDC", Wad::from_integer(100_000));
//!
//! oracle.set_price(Wad::from_integer(2010));
//! // In an async context: oracle.current_price(&pair).await
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::types::error::{MMError, MMResult};
use crate::types::primitives::{Amount, PairId, Price};

use super::connector::{FeeSink, ReferencePriceSource, ReserveView};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reference price source returning a settable price.
///
/// # Thread Safety
///
/// This implementation is thread-safe and can be shared across async tasks.
#[derive(Debug)]
pub struct MockPriceSource {
    price: RwLock<Price>,
    unavailable: AtomicBool,
    reads: AtomicU64,
}

impl MockPriceSource {
    /// Creates a source returning `price`.
    #[must_use]
    pub fn new(price: Price) -> Self {
        Self {
            price: RwLock::new(price),
            unavailable: AtomicBool::new(false),
            reads: AtomicU64::new(0),
        }
    }

    /// Sets the price returned by subsequent reads.
    pub fn set_price(&self, price: Price) {
        let mut guard = self.price.write().unwrap_or_else(|e| e.into_inner());
        *guard = price;
    }

    /// Makes subsequent reads fail with `MMError::PriceUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful reads so far.
    #[must_use]
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReferencePriceSource for MockPriceSource {
    async fn current_price(&self, pair: &PairId) -> MMResult<Price> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MMError::PriceUnavailable(format!(
                "simulated oracle outage for {pair}"
            )));
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(*self.price.read().unwrap_or_else(|e| e.into_inner()))
    }
}

/// Reserve view backed by an in-memory balance map.
///
/// Unknown assets have a zero balance.
#[derive(Debug, Default)]
pub struct MockReserves {
    balances: RwLock<HashMap<String, Amount>>,
}

impl MockReserves {
    /// Creates an empty reserve view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an initial balance for an asset.
    #[must_use]
    pub fn with_balance(self, asset: impl Into<String>, balance: Amount) -> Self {
        self.set_balance(asset, balance);
        self
    }

    /// Sets the balance for an asset.
    pub fn set_balance(&self, asset: impl Into<String>, balance: Amount) {
        let mut balances = self.balances.write().unwrap_or_else(|e| e.into_inner());
        balances.insert(asset.into(), balance);
    }
}

#[async_trait]
impl ReserveView for MockReserves {
    async fn balance_of(&self, asset: &str) -> MMResult<Amount> {
        let balances = self.balances.read().unwrap_or_else(|e| e.into_inner());
        Ok(balances.get(asset).copied().unwrap_or_default())
    }
}

/// One recorded fee notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeeNotification {
    /// Spread fee, in output asset units.
    pub spread_fee: Amount,
    /// Total liquidity value, in quote asset units.
    pub total_liquidity_value: Amount,
}

/// Fee sink that records every notification.
#[derive(Debug, Default)]
pub struct RecordingFeeSink {
    notifications: Mutex<Vec<FeeNotification>>,
    failing: AtomicBool,
}

impl RecordingFeeSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent notifications fail after being recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns all notifications received so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<FeeNotification> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Yields to the runtime until at least `count` notifications have
    /// arrived, then returns them.
    ///
    /// Notifications are delivered from spawned tasks, so a caller that just
    /// got a quote back may not see its notification yet. Gives up after a
    /// bounded number of yields and returns whatever was recorded.
    pub async fn wait_for(&self, count: usize) -> Vec<FeeNotification> {
        for _ in 0..SETTLE_YIELDS {
            let notes = self.notifications();
            if notes.len() >= count {
                return notes;
            }
            tokio::task::yield_now().await;
        }
        self.notifications()
    }
}

const SETTLE_YIELDS: usize = 10_000;

#[async_trait]
impl FeeSink for RecordingFeeSink {
    async fn notify(&self, spread_fee: Amount, total_liquidity_value: Amount) -> MMResult<()> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(FeeNotification {
                spread_fee,
                total_liquidity_value,
            });

        if self.failing.load(Ordering::SeqCst) {
            return Err(MMError::InvalidMarketState(
                "simulated fee sink failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixed_point::Wad;

    #[tokio::test]
    async fn test_price_source() {
        let source = MockPriceSource::new(Wad::from_integer(2000));
        let pair = PairId::new("ETH-USDC");

        assert_eq!(
            source.current_price(&pair).await.unwrap(),
            Wad::from_integer(2000)
        );
        source.set_price(Wad::from_integer(2050));
        assert_eq!(
            source.current_price(&pair).await.unwrap(),
            Wad::from_integer(2050)
        );
        assert_eq!(source.read_count(), 2);
    }

    #[tokio::test]
    async fn test_price_source_outage() {
        let source = MockPriceSource::new(Wad::from_integer(2000));
        source.set_unavailable(true);

        let result = source.current_price(&PairId::new("ETH-USDC")).await;
        assert!(matches!(result, Err(MMError::PriceUnavailable(_))));
        assert_eq!(source.read_count(), 0);

        source.set_unavailable(false);
        assert!(source.current_price(&PairId::new("ETH-USDC")).await.is_ok());
    }

    #[tokio::test]
    async fn test_reserves() {
        let reserves = MockReserves::new().with_balance("USDC", Wad::from_integer(100_000));

        assert_eq!(
            reserves.balance_of("USDC").await.unwrap(),
            Wad::from_integer(100_000)
        );
        assert_eq!(reserves.balance_of("ETH").await.unwrap(), Wad::ZERO);

        reserves.set_balance("ETH", Wad::from_integer(3));
        assert_eq!(reserves.balance_of("ETH").await.unwrap(), Wad::from_integer(3));
    }

    #[tokio::test]
    async fn test_recording_fee_sink() {
        let sink = RecordingFeeSink::new();
        sink.notify(Wad::ONE, Wad::from_integer(10)).await.unwrap();

        sink.set_failing(true);
        assert!(sink.notify(Wad::ONE, Wad::from_integer(20)).await.is_err());

        let notes = sink.notifications();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].total_liquidity_value, Wad::from_integer(20));
    }

    #[tokio::test]
    async fn test_wait_for_spawned_notification() {
        let sink = std::sync::Arc::new(RecordingFeeSink::new());
        let task_sink = sink.clone();
        tokio::spawn(async move {
            task_sink.notify(Wad::ONE, Wad::from_integer(5)).await
        });

        let notes = sink.wait_for(1).await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].spread_fee, Wad::ONE);
    }
}
