//! Two-speed EWMA price and variance tracking.
//!
//! The tracker keeps a fast and a slow exponentially weighted average of the
//! reference price, and an exponentially weighted variance around each. Their
//! divergence (in basis points) is the circuit-breaker signal; the larger
//! variance sizes the volatility spread.
//!
//! # Recurrence
//!
//! For each speed with decay `d`:
//!
//! ```text
//! avg' = d * p + (1 - d) * avg
//! var' = d * (p - avg)^2 + (1 - d) * var      // avg is the pre-update average
//! ```
//!
//! and then
//!
//! ```text
//! deviation_bps = |fast_avg' - slow_avg'| * 10_000 / slow_avg'
//! ```
//!
//! # Example
//!
//! ```rust
//! use oracle_spread_rs::market_state::volatility::VarianceTracker;
//! use oracle_spread_rs::types::fixed_point::Wad;
//!
//! let mut tracker = VarianceTracker::default();
//! tracker.initialize(Wad::from_integer(2000), None, None).unwrap();
//!
//! let reading = tracker.update(Wad::from_integer(2100)).unwrap();
//! assert_eq!(reading.fast_average, Wad::from_integer(2010));
//! assert_eq!(reading.slow_average, Wad::from_integer(2001));
//! assert_eq!(reading.deviation_bps, 44);
//! assert_eq!(tracker.peek().unwrap(), reading);
//! ```

use primitive_types::U256;
use tracing::{debug, info, warn};

use crate::market_state::snapshot::VolatilityReading;
use crate::types::error::{MMError, MMResult};
use crate::types::fixed_point::{BPS_SCALE, Wad};
use crate::types::primitives::{BasisPoints, Price};

#[cfg(feature = "serde")]
use pretty_simple_display::{DebugPretty, DisplaySimple};

/// Default fast decay (0.1): reacts within tens of observations.
pub const DEFAULT_FAST_DECAY: Wad = Wad::from_raw(U256([100_000_000_000_000_000, 0, 0, 0]));

/// Default slow decay (0.01): an order of magnitude less reactive.
pub const DEFAULT_SLOW_DECAY: Wad = Wad::from_raw(U256([10_000_000_000_000_000, 0, 0, 0]));

/// Smoothing weights for the two speeds.
#[derive(Clone, PartialEq)]
#[cfg_attr(not(feature = "serde"), derive(Debug))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize, DebugPretty, DisplaySimple))]
pub struct TrackerConfig {
    /// Weight given to a new observation by the fast average, in `(0, 1]`.
    pub fast_decay: Wad,

    /// Weight given to a new observation by the slow average, in `(0, 1]`.
    pub slow_decay: Wad,
}

impl TrackerConfig {
    /// Creates a validated tracker configuration.
    ///
    /// `fast_decay > slow_decay` is the convention but is not enforced; a
    /// reversed pair still produces a well-defined (if less useful) signal.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` if either decay is outside `(0, 1]`.
    pub fn new(fast_decay: Wad, slow_decay: Wad) -> MMResult<Self> {
        validate_decay("fast_decay", fast_decay)?;
        validate_decay("slow_decay", slow_decay)?;

        if fast_decay < slow_decay {
            warn!(
                %fast_decay,
                %slow_decay,
                "fast decay is below slow decay; fast average will lag the slow one"
            );
        }

        Ok(Self {
            fast_decay,
            slow_decay,
        })
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            fast_decay: DEFAULT_FAST_DECAY,
            slow_decay: DEFAULT_SLOW_DECAY,
        }
    }
}

fn validate_decay(name: &str, decay: Wad) -> MMResult<()> {
    if decay.is_zero() || decay > Wad::ONE {
        return Err(MMError::InvalidConfiguration(format!(
            "{name} must be in (0, 1], got {decay}"
        )));
    }
    Ok(())
}

/// Stored tracker state for one pair.
#[derive(Clone, PartialEq, Eq, Default)]
#[cfg_attr(not(feature = "serde"), derive(Debug))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize, DebugPretty, DisplaySimple))]
pub struct VolatilityState {
    /// Fast EWMA of price.
    pub fast_average: Price,
    /// Slow EWMA of price.
    pub slow_average: Price,
    /// Fast EWMA variance.
    pub fast_variance: Wad,
    /// Slow EWMA variance.
    pub slow_variance: Wad,
    /// Fast smoothing weight.
    pub fast_decay: Wad,
    /// Slow smoothing weight.
    pub slow_decay: Wad,
    /// Deviation computed by the last update.
    pub deviation_bps: BasisPoints,
    /// True once seeded.
    pub initialized: bool,
    /// Observations applied since the last (re)initialization.
    pub observations: u64,
}

impl VolatilityState {
    fn reading(&self) -> VolatilityReading {
        VolatilityReading {
            fast_average: self.fast_average,
            slow_average: self.slow_average,
            fast_variance: self.fast_variance,
            slow_variance: self.slow_variance,
            deviation_bps: self.deviation_bps,
        }
    }
}

/// Dual-speed EWMA variance tracker.
///
/// One tracker exists per traded pair and lives as long as the pricing engine.
/// Mutation requires `&mut self`; the engine serializes access with a lock.
#[derive(Debug, Clone, Default)]
pub struct VarianceTracker {
    state: VolatilityState,
    defaults: TrackerConfig,
}

impl VarianceTracker {
    /// Creates an unseeded tracker with the given default decays.
    #[must_use]
    pub fn new(defaults: TrackerConfig) -> Self {
        Self {
            state: VolatilityState::default(),
            defaults,
        }
    }

    /// Creates an unseeded tracker with explicit decays.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` if either decay is outside `(0, 1]`.
    pub fn with_decays(fast_decay: Wad, slow_decay: Wad) -> MMResult<Self> {
        Ok(Self::new(TrackerConfig::new(fast_decay, slow_decay)?))
    }

    /// Seeds both averages with `seed_price` and zeroes both variances.
    ///
    /// Decays not supplied fall back to the tracker's defaults.
    ///
    /// # Errors
    ///
    /// - `MMError::InvalidConfiguration` for a decay outside `(0, 1]` or a zero seed
    /// - `MMError::AlreadyInitialized` if the tracker already holds history
    pub fn initialize(
        &mut self,
        seed_price: Price,
        fast_decay: Option<Wad>,
        slow_decay: Option<Wad>,
    ) -> MMResult<VolatilityReading> {
        if self.state.initialized {
            return Err(MMError::AlreadyInitialized);
        }
        self.seed(seed_price, fast_decay, slow_decay)
    }

    /// Re-seeds the tracker, discarding all accumulated history.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` for a decay outside `(0, 1]`
    /// or a zero seed. On error the previous state is kept.
    pub fn reinitialize(
        &mut self,
        seed_price: Price,
        fast_decay: Option<Wad>,
        slow_decay: Option<Wad>,
    ) -> MMResult<VolatilityReading> {
        if self.state.initialized {
            info!(
                observations = self.state.observations,
                "discarding volatility history on reinitialization"
            );
        }
        self.seed(seed_price, fast_decay, slow_decay)
    }

    fn seed(
        &mut self,
        seed_price: Price,
        fast_decay: Option<Wad>,
        slow_decay: Option<Wad>,
    ) -> MMResult<VolatilityReading> {
        let config = TrackerConfig::new(
            fast_decay.unwrap_or(self.defaults.fast_decay),
            slow_decay.unwrap_or(self.defaults.slow_decay),
        )?;

        if seed_price.is_zero() {
            return Err(MMError::InvalidConfiguration(
                "seed_price must be positive".to_string(),
            ));
        }

        self.state = VolatilityState {
            fast_average: seed_price,
            slow_average: seed_price,
            fast_variance: Wad::ZERO,
            slow_variance: Wad::ZERO,
            fast_decay: config.fast_decay,
            slow_decay: config.slow_decay,
            deviation_bps: 0,
            initialized: true,
            observations: 0,
        };

        info!(
            %seed_price,
            fast_decay = %config.fast_decay,
            slow_decay = %config.slow_decay,
            "variance tracker seeded"
        );

        Ok(self.state.reading())
    }

    /// Applies one price observation and returns the fresh reading.
    ///
    /// The next state is computed in full before anything is written, so a
    /// failed update leaves the stored state untouched.
    ///
    /// # Errors
    ///
    /// - `MMError::NotInitialized` before the tracker is seeded
    /// - `MMError::ArithmeticOverflow` if a price is too large for 256-bit intermediates
    pub fn update(&mut self, observed_price: Price) -> MMResult<VolatilityReading> {
        if !self.state.initialized {
            return Err(MMError::NotInitialized);
        }

        let (fast_average, fast_variance) = ewma_step(
            self.state.fast_average,
            self.state.fast_variance,
            self.state.fast_decay,
            observed_price,
        )?;
        let (slow_average, slow_variance) = ewma_step(
            self.state.slow_average,
            self.state.slow_variance,
            self.state.slow_decay,
            observed_price,
        )?;
        let deviation_bps = deviation_bps(fast_average, slow_average);

        self.state.fast_average = fast_average;
        self.state.fast_variance = fast_variance;
        self.state.slow_average = slow_average;
        self.state.slow_variance = slow_variance;
        self.state.deviation_bps = deviation_bps;
        self.state.observations = self.state.observations.saturating_add(1);

        debug!(
            %observed_price,
            %fast_average,
            %slow_average,
            %fast_variance,
            %slow_variance,
            deviation_bps,
            "volatility updated"
        );

        Ok(self.state.reading())
    }

    /// Returns the stored reading without advancing the tracker.
    ///
    /// # Errors
    ///
    /// Returns `MMError::NotInitialized` before the tracker is seeded.
    pub fn peek(&self) -> MMResult<VolatilityReading> {
        if !self.state.initialized {
            return Err(MMError::NotInitialized);
        }
        Ok(self.state.reading())
    }

    /// Returns true if the stored deviation is above `threshold_bps`.
    ///
    /// # Errors
    ///
    /// Returns `MMError::NotInitialized` before the tracker is seeded.
    pub fn is_volatile(&self, threshold_bps: BasisPoints) -> MMResult<bool> {
        Ok(self.peek()?.exceeds(threshold_bps))
    }

    /// Larger of the stored fast and slow variances.
    ///
    /// # Errors
    ///
    /// Returns `MMError::NotInitialized` before the tracker is seeded.
    pub fn max_variance(&self) -> MMResult<Wad> {
        Ok(self.peek()?.max_variance())
    }

    /// Returns true once the tracker has been seeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    /// Number of observations since the last (re)initialization.
    #[must_use]
    pub fn observations(&self) -> u64 {
        self.state.observations
    }

    /// Returns the full stored state.
    #[must_use]
    pub fn state(&self) -> &VolatilityState {
        &self.state
    }

    /// Returns the default decays used when `initialize` gets `None`.
    #[must_use]
    pub fn defaults(&self) -> &TrackerConfig {
        &self.defaults
    }
}

/// One EWMA step for a single speed. The squared deviation is taken against
/// the pre-update average.
fn ewma_step(average: Wad, variance: Wad, decay: Wad, price: Wad) -> MMResult<(Wad, Wad)> {
    let retain = Wad::ONE.checked_sub(decay)?;

    let next_average = decay
        .mul_wad(price)?
        .checked_add(retain.mul_wad(average)?)?;

    let diff = price.abs_diff(average);
    let next_variance = decay
        .mul_wad(diff.mul_wad(diff)?)?
        .checked_add(retain.mul_wad(variance)?)?;

    Ok((next_average, next_variance))
}

/// `|fast - slow| * 10_000 / slow`, zero when `slow` is zero, saturating at `u64::MAX`.
fn deviation_bps(fast: Wad, slow: Wad) -> BasisPoints {
    if slow.is_zero() {
        return 0;
    }
    let diff = fast.abs_diff(slow).raw();
    match diff.checked_mul(U256::from(BPS_SCALE)) {
        Some(scaled) => {
            let bps = scaled / slow.raw();
            if bps.bits() > 64 {
                u64::MAX
            } else {
                bps.low_u64()
            }
        }
        None => u64::MAX,
    }
}
