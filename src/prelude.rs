//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types, traits, and functions
//! from the pricing library. Users can import everything they need with:
//!
//! ```rust
//! use oracle_spread_rs::prelude::*;
//! ```

// Re-export types module
pub use crate::types::error::{MMError, MMResult};
pub use crate::types::fixed_point::{BPS_SCALE, WAD_DECIMALS, WAD_SCALE, Wad};
pub use crate::types::primitives::{Amount, BasisPoints, PairId, Price, Spread, TradingPair};

// Re-export market state types
pub use crate::market_state::snapshot::VolatilityReading;
pub use crate::market_state::volatility::{TrackerConfig, VarianceTracker, VolatilityState};

// Re-export strategy types
pub use crate::strategy::config::SpreadConfig;
pub use crate::strategy::quote::{Quote, QuoteOutput, QuoteRequest, Side, quote_output};
pub use crate::strategy::spread::{SpreadComponents, SpreadEngine};

// Re-export risk types
pub use crate::risk::{GateDecision, VolatilityGate, check_liquidity};

// Re-export collaborator traits
pub use crate::execution::{FeeSink, NoopFeeSink, ReferencePriceSource, ReserveView};

// Re-export engine types
pub use crate::engine::{ConfigAuthority, PairRegistry, PricingEngine};

pub use crate::{Decimal, dec};
