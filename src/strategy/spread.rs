//! Dynamic spread calculation from volatility and trade size.
//!
//! # Formulas
//!
//! ```text
//! volatility_spread = max(fast_var, slow_var) * k_vol
//! impact_spread     = amount_in * k_impact / reserve_in      (0 when reserve_in == 0)
//! total_spread      = min(volatility_spread + impact_spread, max_spread)
//! ```
//!
//! A zero reserve yields zero impact rather than an error; the liquidity
//! check after quoting is what refuses an unfillable trade.

use crate::market_state::snapshot::VolatilityReading;
use crate::strategy::config::SpreadConfig;
use crate::strategy::quote::{Quote, QuoteRequest, quote_output};
use crate::types::error::MMResult;
use crate::types::fixed_point::Wad;
use crate::types::primitives::{Amount, Price, Spread};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The two uncapped spread components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpreadComponents {
    /// Spread driven by variance.
    pub volatility_spread: Spread,
    /// Spread driven by trade size relative to reserves.
    pub impact_spread: Spread,
}

/// Calculator turning volatility and trade size into a capped spread and quote.
///
/// # Example
///
/// ```rust
/// use oracle_spread_rs::strategy::config::SpreadConfig;
/// use oracle_spread_rs::strategy::spread::SpreadEngine;
/// use oracle_spread_rs::types::fixed_point::Wad;
/// use oracle_spread_rs::dec;
///
/// let engine = SpreadEngine::new(SpreadConfig::default());
/// let components = engine
///     .spread_components(
///         Wad::from_integer(1000),
///         Wad::from_integer(100_000),
///         Wad::from_decimal(dec!(0.001)).unwrap(),
///     )
///     .unwrap();
///
/// assert_eq!(components.volatility_spread, Wad::from_decimal(dec!(0.00005)).unwrap());
/// assert_eq!(components.impact_spread, Wad::from_decimal(dec!(0.0001)).unwrap());
/// assert_eq!(
///     engine.total_spread(&components),
///     Wad::from_decimal(dec!(0.00015)).unwrap()
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadEngine {
    config: SpreadConfig,
}

impl SpreadEngine {
    /// Creates a new `SpreadEngine`.
    #[must_use]
    pub fn new(config: SpreadConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &SpreadConfig {
        &self.config
    }

    /// Computes both uncapped components.
    ///
    /// # Arguments
    ///
    /// * `amount_in` - Trade size in input asset units
    /// * `reserve_in` - Available reserve of the input asset
    /// * `max_variance` - Larger of the fast and slow variances
    ///
    /// # Errors
    ///
    /// Returns `MMError::ArithmeticOverflow` for inputs beyond 256-bit range.
    pub fn spread_components(
        &self,
        amount_in: Amount,
        reserve_in: Amount,
        max_variance: Wad,
    ) -> MMResult<SpreadComponents> {
        let volatility_spread = max_variance.mul_wad(self.config.volatility_multiplier)?;

        let impact_spread = if reserve_in.is_zero() {
            Wad::ZERO
        } else {
            amount_in.mul_div(self.config.impact_multiplier, reserve_in)?
        };

        Ok(SpreadComponents {
            volatility_spread,
            impact_spread,
        })
    }

    /// Sums the components and clamps to `max_spread`.
    ///
    /// The sum saturates instead of wrapping, so an overflow lands on the cap.
    #[must_use]
    pub fn total_spread(&self, components: &SpreadComponents) -> Spread {
        components
            .volatility_spread
            .saturating_add(components.impact_spread)
            .min(self.config.max_spread)
    }

    /// Prices a request end to end from an already gated reading.
    ///
    /// # Arguments
    ///
    /// * `request` - Side and input amount
    /// * `reference_price` - Quote asset per base asset
    /// * `reserve_in` - Available reserve of the input asset
    /// * `reading` - Volatility reading to size the spread from
    ///
    /// # Errors
    ///
    /// Propagates errors from [`SpreadEngine::spread_components`] and
    /// [`quote_output`].
    pub fn price(
        &self,
        request: &QuoteRequest,
        reference_price: Price,
        reserve_in: Amount,
        reading: &VolatilityReading,
    ) -> MMResult<Quote> {
        let components =
            self.spread_components(request.amount_in, reserve_in, reading.max_variance())?;
        let total_spread = self.total_spread(&components);
        let output = quote_output(request.amount_in, reference_price, total_spread, request.side)?;

        Ok(Quote {
            side: request.side,
            amount_in: request.amount_in,
            reference_price,
            volatility_spread: components.volatility_spread,
            impact_spread: components.impact_spread,
            total_spread,
            effective_price: output.effective_price,
            amount_out: output.amount_out,
            spread_fee: output.spread_fee,
            deviation_bps: reading.deviation_bps,
        })
    }
}

impl Default for SpreadEngine {
    fn default() -> Self {
        Self::new(SpreadConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dec;
    use crate::strategy::quote::Side;

    fn wad(value: crate::Decimal) -> Wad {
        Wad::from_decimal(value).unwrap()
    }

    fn reading(fast_var: Wad, slow_var: Wad) -> VolatilityReading {
        VolatilityReading {
            fast_average: Wad::from_integer(2000),
            slow_average: Wad::from_integer(2000),
            fast_variance: fast_var,
            slow_variance: slow_var,
            deviation_bps: 0,
        }
    }

    fn engine() -> SpreadEngine {
        SpreadEngine::new(
            SpreadConfig::from_decimals(dec!(0.05), dec!(0.01), 500, dec!(0.5)).unwrap(),
        )
    }

    #[test]
    fn test_reference_scenario() {
        let engine = engine();
        let request = QuoteRequest::buy(Wad::from_integer(1000)).unwrap();
        let quote = engine
            .price(
                &request,
                Wad::from_integer(2000),
                Wad::from_integer(100_000),
                &reading(wad(dec!(0.001)), wad(dec!(0.0005))),
            )
            .unwrap();

        assert_eq!(quote.volatility_spread, wad(dec!(0.00005)));
        assert_eq!(quote.impact_spread, wad(dec!(0.0001)));
        assert_eq!(quote.total_spread, wad(dec!(0.00015)));
        assert_eq!(quote.effective_price, wad(dec!(2000.3)));
        assert!(quote.amount_out > wad(dec!(0.4999)));
        assert!(quote.amount_out < wad(dec!(0.5)));
    }

    #[test]
    fn test_zero_variance_spread_is_pure_impact() {
        let engine = engine();
        let components = engine
            .spread_components(Wad::from_integer(500), Wad::from_integer(100_000), Wad::ZERO)
            .unwrap();

        assert_eq!(components.volatility_spread, Wad::ZERO);
        assert_eq!(engine.total_spread(&components), components.impact_spread);
    }

    #[test]
    fn test_impact_is_linear_in_size() {
        let engine = engine();
        let reserve = Wad::from_integer(100_000);
        for size in [1u128, 7, 250, 1000, 33_333] {
            let single = engine
                .spread_components(Wad::from_integer(size), reserve, Wad::ZERO)
                .unwrap()
                .impact_spread;
            let double = engine
                .spread_components(Wad::from_integer(2 * size), reserve, Wad::ZERO)
                .unwrap()
                .impact_spread;

            let twice = single.checked_add(single).unwrap();
            // allow one raw unit of truncation
            assert!(double.abs_diff(twice) <= Wad::from_raw(1u64.into()));
        }
    }

    #[test]
    fn test_zero_reserve_gives_zero_impact() {
        let components = engine()
            .spread_components(Wad::from_integer(1000), Wad::ZERO, Wad::ZERO)
            .unwrap();
        assert_eq!(components.impact_spread, Wad::ZERO);
    }

    #[test]
    fn test_cap_saturation_scenario() {
        let engine = engine();
        let variance = Wad::from_integer(100);
        let components = engine
            .spread_components(Wad::from_integer(1000), Wad::from_integer(100_000), variance)
            .unwrap();

        assert_eq!(components.volatility_spread, Wad::from_integer(5));
        assert_eq!(engine.total_spread(&components), wad(dec!(0.5)));
    }

    #[test]
    fn test_cap_is_idempotent() {
        let engine = engine();
        let max = engine.config().max_spread;
        let mut components = SpreadComponents {
            volatility_spread: wad(dec!(0.4)),
            impact_spread: wad(dec!(0.2)),
        };
        assert_eq!(engine.total_spread(&components), max);

        components.volatility_spread = wad(dec!(0.9));
        assert_eq!(engine.total_spread(&components), max);

        components.impact_spread = Wad::MAX;
        assert_eq!(engine.total_spread(&components), max);
    }

    #[test]
    fn test_volatility_response_is_monotonic() {
        let engine = engine();
        let mut previous = Wad::ZERO;
        for step in 0..60u128 {
            let variance = Wad::from_integer(step).mul_wad(wad(dec!(0.25))).unwrap();
            let components = engine
                .spread_components(Wad::from_integer(10), Wad::from_integer(1000), variance)
                .unwrap();
            let total = engine.total_spread(&components);
            assert!(total >= previous);
            assert!(total <= engine.config().max_spread);
            previous = total;
        }
        assert_eq!(previous, engine.config().max_spread);
    }

    #[test]
    fn test_sell_quote_uses_discount() {
        let engine = engine();
        let request = QuoteRequest::sell(Wad::from_integer(1)).unwrap();
        let quote = engine
            .price(
                &request,
                Wad::from_integer(2000),
                Wad::from_integer(100),
                &reading(Wad::ZERO, Wad::ZERO),
            )
            .unwrap();

        // impact = 1 * 0.01 / 100 = 0.0001
        assert_eq!(quote.side, Side::Sell);
        assert_eq!(quote.total_spread, wad(dec!(0.0001)));
        assert_eq!(quote.effective_price, wad(dec!(1999.8)));
        assert_eq!(quote.amount_out, wad(dec!(1999.8)));
        assert_eq!(quote.spread_fee, wad(dec!(0.2)));
    }
}
