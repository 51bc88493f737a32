//! Primitive type aliases and identifiers for the pricing domain.

use std::fmt;

use super::fixed_point::Wad;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Price of one unit of base asset, in quote asset units.
pub type Price = Wad;

/// Token amount, 18 fractional decimals.
pub type Amount = Wad;

/// Fractional spread (0.01 = 1%).
pub type Spread = Wad;

/// Basis points (1 bps = 0.01%).
pub type BasisPoints = u64;

/// Identifier of a traded pair, e.g. `"ETH-USDC"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairId(String);

impl PairId {
    /// Creates a new pair identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PairId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PairId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The two assets of a pair.
///
/// The reference price is always quoted as `quote` per one `base`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TradingPair {
    /// Asset being priced (e.g. `"ETH"`).
    pub base: String,
    /// Asset the price is denominated in (e.g. `"USDC"`).
    pub quote: String,
}

impl TradingPair {
    /// Creates a new trading pair.
    #[must_use]
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Default identifier, `"BASE-QUOTE"`.
    #[must_use]
    pub fn id(&self) -> PairId {
        PairId(format!("{}-{}", self.base, self.quote))
    }
}
