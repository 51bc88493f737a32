//! Volatility gate and liquidity feasibility check.
//!
//! The gate sits between the variance tracker and the spread engine. It has
//! two entry points that must not be mixed up:
//!
//! - [`VolatilityGate::observe`] advances the tracker with a fresh price and
//!   then checks the new deviation. Used by mutating quotes.
//! - [`VolatilityGate::inspect`] only reads stored state. Used by previews;
//!   calling it any number of times leaves the tracker unchanged.
//!
//! A trip refuses the whole quote. The observation that caused it stays in
//! the tracker, so the signal keeps evolving with later prices.

use tracing::warn;

use crate::market_state::snapshot::VolatilityReading;
use crate::market_state::volatility::VarianceTracker;
use crate::types::error::{MMError, MMResult};
use crate::types::primitives::{Amount, BasisPoints, Price};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of checking a reading against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GateDecision {
    /// Deviation within threshold, trading allowed.
    Open,
    /// Deviation above threshold, trading refused.
    Tripped {
        /// Observed deviation in basis points.
        deviation_bps: BasisPoints,
        /// Threshold in force.
        threshold_bps: BasisPoints,
    },
}

impl GateDecision {
    /// Evaluates a reading against `threshold_bps`.
    #[must_use]
    pub fn evaluate(reading: &VolatilityReading, threshold_bps: BasisPoints) -> Self {
        if reading.exceeds(threshold_bps) {
            Self::Tripped {
                deviation_bps: reading.deviation_bps,
                threshold_bps,
            }
        } else {
            Self::Open
        }
    }

    /// Returns true if trading is allowed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if the gate tripped.
    #[must_use]
    pub fn is_tripped(&self) -> bool {
        matches!(self, Self::Tripped { .. })
    }

    /// Converts a trip into `MMError::VolatilityTooHigh`.
    ///
    /// # Errors
    ///
    /// Returns `MMError::VolatilityTooHigh` if the gate tripped.
    pub fn into_result(self) -> MMResult<()> {
        match self {
            Self::Open => Ok(()),
            Self::Tripped {
                deviation_bps,
                threshold_bps,
            } => Err(MMError::VolatilityTooHigh {
                deviation_bps,
                threshold_bps,
            }),
        }
    }
}

/// Deviation circuit breaker for one pair.
///
/// # Example
///
/// ```rust
/// use oracle_spread_rs::market_state::volatility::VarianceTracker;
/// use oracle_spread_rs::risk::VolatilityGate;
/// use oracle_spread_rs::types::error::MMError;
/// use oracle_spread_rs::types::fixed_point::Wad;
///
/// let mut tracker = VarianceTracker::default();
/// tracker.initialize(Wad::from_integer(2000), None, None).unwrap();
///
/// let gate = VolatilityGate::new(100);
/// assert!(gate.observe(&mut tracker, Wad::from_integer(2010)).is_ok());
///
/// let result = gate.observe(&mut tracker, Wad::from_integer(3000));
/// assert!(matches!(result, Err(MMError::VolatilityTooHigh { .. })));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolatilityGate {
    threshold_bps: BasisPoints,
}

impl VolatilityGate {
    /// Creates a gate with the given threshold.
    #[must_use]
    pub fn new(threshold_bps: BasisPoints) -> Self {
        Self { threshold_bps }
    }

    /// Returns the threshold in basis points.
    #[must_use]
    pub fn threshold_bps(&self) -> BasisPoints {
        self.threshold_bps
    }

    /// Mutating path: applies `price` to the tracker, then checks the fresh reading.
    ///
    /// # Errors
    ///
    /// - Any error from `VarianceTracker::update`
    /// - `MMError::VolatilityTooHigh` if the new deviation exceeds the threshold
    pub fn observe(
        &self,
        tracker: &mut VarianceTracker,
        price: Price,
    ) -> MMResult<VolatilityReading> {
        let reading = tracker.update(price)?;
        self.check(&reading)?;
        Ok(reading)
    }

    /// Preview path: checks stored state without touching the tracker.
    ///
    /// # Errors
    ///
    /// - `MMError::NotInitialized` before the tracker is seeded
    /// - `MMError::VolatilityTooHigh` if the stored deviation exceeds the threshold
    pub fn inspect(&self, tracker: &VarianceTracker) -> MMResult<VolatilityReading> {
        let reading = tracker.peek()?;
        if tracker.is_volatile(self.threshold_bps)? {
            return Err(MMError::VolatilityTooHigh {
                deviation_bps: reading.deviation_bps,
                threshold_bps: self.threshold_bps,
            });
        }
        Ok(reading)
    }

    fn check(&self, reading: &VolatilityReading) -> MMResult<()> {
        let decision = GateDecision::evaluate(reading, self.threshold_bps);
        if decision.is_tripped() {
            warn!(
                deviation_bps = reading.deviation_bps,
                threshold_bps = self.threshold_bps,
                "volatility gate tripped"
            );
        }
        decision.into_result()
    }
}

/// Fill-or-kill feasibility: the output must fit in the available reserve.
///
/// # Errors
///
/// Returns `MMError::InsufficientLiquidity` if `amount_out > available`.
pub fn check_liquidity(amount_out: Amount, available: Amount) -> MMResult<()> {
    if amount_out > available {
        return Err(MMError::InsufficientLiquidity {
            required: amount_out,
            available,
        });
    }
    Ok(())
}
