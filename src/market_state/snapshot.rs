//! Point-in-time volatility reading.

use crate::types::fixed_point::Wad;
use crate::types::primitives::{BasisPoints, Price};

#[cfg(feature = "serde")]
use pretty_simple_display::{DebugPretty, DisplaySimple};

/// Snapshot of the tracker after the latest observation.
///
/// Produced by `VarianceTracker::update` and reconstructed by
/// `VarianceTracker::peek`; both return identical readings for the same state.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(feature = "serde"), derive(Debug))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize, DebugPretty, DisplaySimple))]
pub struct VolatilityReading {
    /// Fast EWMA of the reference price.
    pub fast_average: Price,

    /// Slow EWMA of the reference price.
    pub slow_average: Price,

    /// EWMA variance around the fast average.
    pub fast_variance: Wad,

    /// EWMA variance around the slow average.
    pub slow_variance: Wad,

    /// `|fast - slow| * 10_000 / slow`, truncated.
    pub deviation_bps: BasisPoints,
}

impl VolatilityReading {
    /// Larger of the two variances.
    ///
    /// Spread sizing always uses the more alarming of the two signals.
    #[must_use]
    pub fn max_variance(&self) -> Wad {
        self.fast_variance.max(self.slow_variance)
    }

    /// Returns true if the deviation is strictly above `threshold_bps`.
    #[must_use]
    pub fn exceeds(&self, threshold_bps: BasisPoints) -> bool {
        self.deviation_bps > threshold_bps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dec;

    fn reading(fast_var: Wad, slow_var: Wad, deviation_bps: u64) -> VolatilityReading {
        VolatilityReading {
            fast_average: Wad::from_integer(2000),
            slow_average: Wad::from_integer(2000),
            fast_variance: fast_var,
            slow_variance: slow_var,
            deviation_bps,
        }
    }

    #[test]
    fn test_max_variance_picks_larger() {
        let fast = Wad::from_decimal(dec!(0.001)).unwrap();
        let slow = Wad::from_decimal(dec!(0.0005)).unwrap();
        assert_eq!(reading(fast, slow, 0).max_variance(), fast);
        assert_eq!(reading(slow, fast, 0).max_variance(), fast);
    }

    #[test]
    fn test_exceeds_is_strict() {
        let r = reading(Wad::ZERO, Wad::ZERO, 500);
        assert!(!r.exceeds(500));
        assert!(r.exceeds(499));
    }
}
