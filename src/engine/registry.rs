//! Registry of pricing engines, one per traded pair.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::engine::pricing::PricingEngine;
use crate::types::error::{MMError, MMResult};
use crate::types::primitives::PairId;

/// Holds one [`PricingEngine`] per pair identifier.
#[derive(Debug, Default)]
pub struct PairRegistry {
    engines: HashMap<PairId, Arc<PricingEngine>>,
}

impl PairRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an engine under its pair identifier.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` if the pair is already registered.
    pub fn register(&mut self, engine: PricingEngine) -> MMResult<Arc<PricingEngine>> {
        let pair_id = engine.pair_id().clone();
        if self.engines.contains_key(&pair_id) {
            return Err(MMError::InvalidConfiguration(format!(
                "pair {pair_id} is already registered"
            )));
        }

        let engine = Arc::new(engine);
        self.engines.insert(pair_id.clone(), engine.clone());
        info!(pair = %pair_id, "pricing engine registered");
        Ok(engine)
    }

    /// Looks up the engine for `pair_id`.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidMarketState` for an unknown pair.
    pub fn get(&self, pair_id: &PairId) -> MMResult<Arc<PricingEngine>> {
        self.engines
            .get(pair_id)
            .cloned()
            .ok_or_else(|| MMError::InvalidMarketState(format!("unknown pair: {pair_id}")))
    }

    /// Removes and returns the engine for `pair_id`, if any.
    pub fn remove(&mut self, pair_id: &PairId) -> Option<Arc<PricingEngine>> {
        self.engines.remove(pair_id)
    }

    /// Registered pair identifiers, sorted.
    #[must_use]
    pub fn pair_ids(&self) -> Vec<PairId> {
        let mut ids: Vec<PairId> = self.engines.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Returns true if no pair is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
