//! Reference price source with a manual override.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::info;

use crate::types::error::{MMError, MMResult};
use crate::types::primitives::{PairId, Price};

use super::connector::ReferencePriceSource;

/// Wraps an oracle and lets an operator pin the price manually.
///
/// While an override is set, the oracle is not consulted.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use oracle_spread_rs::execution::{MockPriceSource, OverridablePriceSource};
/// use oracle_spread_rs::types::fixed_point::Wad;
///
/// let oracle = Arc::new(MockPriceSource::new(Wad::from_integer(2000)));
/// let source = OverridablePriceSource::new(oracle);
///
/// source.set_override(Wad::from_integer(1950)).unwrap();
/// assert_eq!(source.override_price().unwrap(), Some(Wad::from_integer(1950)));
///
/// source.clear_override().unwrap();
/// assert_eq!(source.override_price().unwrap(), None);
/// ```
pub struct OverridablePriceSource {
    oracle: Arc<dyn ReferencePriceSource>,
    manual: RwLock<Option<Price>>,
}

impl OverridablePriceSource {
    /// Creates a source that follows `oracle` until overridden.
    #[must_use]
    pub fn new(oracle: Arc<dyn ReferencePriceSource>) -> Self {
        Self {
            oracle,
            manual: RwLock::new(None),
        }
    }

    /// Pins the reference price.
    ///
    /// # Errors
    ///
    /// - `MMError::InvalidConfiguration` for a zero price
    /// - `MMError::InvalidMarketState` if the override lock is poisoned
    pub fn set_override(&self, price: Price) -> MMResult<()> {
        if price.is_zero() {
            return Err(MMError::InvalidConfiguration(
                "override price must be positive".to_string(),
            ));
        }
        *self.write_manual()? = Some(price);
        info!(%price, "manual reference price override set");
        Ok(())
    }

    /// Returns to following the oracle.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidMarketState` if the override lock is poisoned.
    pub fn clear_override(&self) -> MMResult<()> {
        *self.write_manual()? = None;
        info!("manual reference price override cleared");
        Ok(())
    }

    /// Returns the current override, if any.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidMarketState` if the override lock is poisoned.
    pub fn override_price(&self) -> MMResult<Option<Price>> {
        self.manual
            .read()
            .map(|guard| *guard)
            .map_err(|_| MMError::InvalidMarketState("override lock poisoned".to_string()))
    }

    fn write_manual(&self) -> MMResult<std::sync::RwLockWriteGuard<'_, Option<Price>>> {
        self.manual
            .write()
            .map_err(|_| MMError::InvalidMarketState("override lock poisoned".to_string()))
    }
}

#[async_trait]
impl ReferencePriceSource for OverridablePriceSource {
    async fn current_price(&self, pair: &PairId) -> MMResult<Price> {
        if let Some(price) = self.override_price()? {
            return Ok(price);
        }
        self.oracle.current_price(pair).await
    }
}
