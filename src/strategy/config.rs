//! Spread configuration parameters.

use primitive_types::U256;

use crate::Decimal;
use crate::types::error::{MMError, MMResult};
use crate::types::fixed_point::Wad;
use crate::types::primitives::{BasisPoints, Spread};

#[cfg(feature = "serde")]
use pretty_simple_display::{DebugPretty, DisplaySimple};

/// Upper bound for the volatility multiplier (100%).
pub const MAX_VOLATILITY_MULTIPLIER: Wad = Wad::ONE;

/// Upper bound for the impact multiplier (10%).
pub const MAX_IMPACT_MULTIPLIER: Wad = Wad::from_raw(U256([100_000_000_000_000_000, 0, 0, 0]));

/// Default volatility multiplier (5%).
pub const DEFAULT_VOLATILITY_MULTIPLIER: Wad =
    Wad::from_raw(U256([50_000_000_000_000_000, 0, 0, 0]));

/// Default impact multiplier (1%).
pub const DEFAULT_IMPACT_MULTIPLIER: Wad = Wad::from_raw(U256([10_000_000_000_000_000, 0, 0, 0]));

/// Default deviation gate (500 bps = 5%).
pub const DEFAULT_VOLATILITY_THRESHOLD_BPS: BasisPoints = 500;

/// Default spread ceiling (50%).
pub const DEFAULT_MAX_SPREAD: Wad = Wad::from_raw(U256([500_000_000_000_000_000, 0, 0, 0]));

/// Configuration for dynamic spread calculation on one pair.
///
/// # Example
///
/// ```rust
/// use oracle_spread_rs::strategy::config::SpreadConfig;
/// use oracle_spread_rs::dec;
///
/// let config = SpreadConfig::from_decimals(
///     dec!(0.05),  // k_vol
///     dec!(0.01),  // k_impact
///     500,         // gate at 5% fast/slow deviation
///     dec!(0.5),   // spread ceiling
/// ).unwrap();
/// assert_eq!(config.volatility_threshold_bps, 500);
/// ```
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(not(feature = "serde"), derive(Debug))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize, DebugPretty, DisplaySimple))]
pub struct SpreadConfig {
    /// Scales the larger variance into a spread (`k_vol`), in `[0, 1]`.
    pub volatility_multiplier: Wad,

    /// Scales `amount_in / reserve_in` into a spread (`k_impact`), in `[0, 0.1]`.
    pub impact_multiplier: Wad,

    /// Fast/slow deviation above which mutating quotes are refused.
    pub volatility_threshold_bps: BasisPoints,

    /// Ceiling for the total spread, in `[0, 1)`.
    pub max_spread: Spread,
}

impl SpreadConfig {
    /// Creates a new spread configuration with validation.
    ///
    /// # Arguments
    ///
    /// * `volatility_multiplier` - `k_vol`, must be in `[0, 1]`
    /// * `impact_multiplier` - `k_impact`, must be in `[0, 0.1]`
    /// * `volatility_threshold_bps` - Deviation gate in basis points
    /// * `max_spread` - Spread ceiling, must be below 1
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` if any parameter is out of range.
    pub fn new(
        volatility_multiplier: Wad,
        impact_multiplier: Wad,
        volatility_threshold_bps: BasisPoints,
        max_spread: Spread,
    ) -> MMResult<Self> {
        let config = Self {
            volatility_multiplier,
            impact_multiplier,
            volatility_threshold_bps,
            max_spread,
        };
        config.validate()?;
        Ok(config)
    }

    /// Same as [`SpreadConfig::new`], taking decimals for the fractional fields.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` for negative or out-of-range values.
    pub fn from_decimals(
        volatility_multiplier: Decimal,
        impact_multiplier: Decimal,
        volatility_threshold_bps: BasisPoints,
        max_spread: Decimal,
    ) -> MMResult<Self> {
        Self::new(
            Wad::from_decimal(volatility_multiplier)?,
            Wad::from_decimal(impact_multiplier)?,
            volatility_threshold_bps,
            Wad::from_decimal(max_spread)?,
        )
    }

    /// Checks every bound.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` naming the first offending field.
    pub fn validate(&self) -> MMResult<()> {
        if self.volatility_multiplier > MAX_VOLATILITY_MULTIPLIER {
            return Err(MMError::InvalidConfiguration(format!(
                "volatility_multiplier must be between 0 and 1, got {}",
                self.volatility_multiplier
            )));
        }

        if self.impact_multiplier > MAX_IMPACT_MULTIPLIER {
            return Err(MMError::InvalidConfiguration(format!(
                "impact_multiplier must be between 0 and 0.1, got {}",
                self.impact_multiplier
            )));
        }

        if self.max_spread >= Wad::ONE {
            return Err(MMError::InvalidConfiguration(format!(
                "max_spread must be below 1, got {}",
                self.max_spread
            )));
        }

        Ok(())
    }

    /// Returns a copy with a new volatility multiplier.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` if the value is out of range.
    pub fn with_volatility_multiplier(mut self, value: Wad) -> MMResult<Self> {
        self.volatility_multiplier = value;
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy with a new impact multiplier.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` if the value is out of range.
    pub fn with_impact_multiplier(mut self, value: Wad) -> MMResult<Self> {
        self.impact_multiplier = value;
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy with a new deviation gate.
    #[must_use]
    pub fn with_volatility_threshold_bps(mut self, value: BasisPoints) -> Self {
        self.volatility_threshold_bps = value;
        self
    }

    /// Returns a copy with a new spread ceiling.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` if the value is not below 1.
    pub fn with_max_spread(mut self, value: Spread) -> MMResult<Self> {
        self.max_spread = value;
        self.validate()?;
        Ok(self)
    }
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            volatility_multiplier: DEFAULT_VOLATILITY_MULTIPLIER,
            impact_multiplier: DEFAULT_IMPACT_MULTIPLIER,
            volatility_threshold_bps: DEFAULT_VOLATILITY_THRESHOLD_BPS,
            max_spread: DEFAULT_MAX_SPREAD,
        }
    }
}
