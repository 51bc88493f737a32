//! Quote types and the directional output calculation.
//!
//! The reference price `P` is quoted as quote asset per one base asset.
//!
//! ```text
//! Buy  (pay quote, receive base):  effective = P * (1 + s)   out = in / effective
//! Sell (pay base, receive quote):  effective = P * (1 - s)   out = in * effective
//! ```
//!
//! Both paths move the price against the trader. The spread fee is the
//! oracle-only output minus the actual output, in output asset units.

use crate::types::error::{MMError, MMResult};
use crate::types::fixed_point::Wad;
use crate::types::primitives::{Amount, BasisPoints, Price, Spread, TradingPair};

#[cfg(feature = "serde")]
use pretty_simple_display::{DebugPretty, DisplaySimple};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trade direction, from the trader's point of view on the base asset.
///
/// # Example
///
/// ```rust
/// use oracle_spread_rs::strategy::quote::Side;
///
/// let side = Side::Buy;
/// assert!(side.is_buy());
/// assert_eq!(side.opposite(), Side::Sell);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    /// Trader pays the quote asset and receives the base asset.
    Buy,
    /// Trader pays the base asset and receives the quote asset.
    Sell,
}

impl Side {
    /// Returns true if this is a buy.
    #[must_use]
    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }

    /// Returns true if this is a sell.
    #[must_use]
    pub fn is_sell(&self) -> bool {
        matches!(self, Side::Sell)
    }

    /// Returns the opposite side.
    #[must_use]
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Asset the trader pays in.
    #[must_use]
    pub fn input_asset<'a>(&self, pair: &'a TradingPair) -> &'a str {
        match self {
            Side::Buy => &pair.quote,
            Side::Sell => &pair.base,
        }
    }

    /// Asset the trader receives.
    #[must_use]
    pub fn output_asset<'a>(&self, pair: &'a TradingPair) -> &'a str {
        self.opposite().input_asset(pair)
    }
}

/// A request to price a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuoteRequest {
    /// Trade direction.
    pub side: Side,
    /// Amount of the input asset the trader pays.
    pub amount_in: Amount,
}

impl QuoteRequest {
    /// Creates a validated request.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidQuoteRequest` for a zero amount.
    pub fn new(side: Side, amount_in: Amount) -> MMResult<Self> {
        if amount_in.is_zero() {
            return Err(MMError::InvalidQuoteRequest(
                "amount_in must be positive".to_string(),
            ));
        }
        Ok(Self { side, amount_in })
    }

    /// Buy request paying `amount_in` of the quote asset.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidQuoteRequest` for a zero amount.
    pub fn buy(amount_in: Amount) -> MMResult<Self> {
        Self::new(Side::Buy, amount_in)
    }

    /// Sell request paying `amount_in` of the base asset.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidQuoteRequest` for a zero amount.
    pub fn sell(amount_in: Amount) -> MMResult<Self> {
        Self::new(Side::Sell, amount_in)
    }
}

/// Result of the directional output calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuoteOutput {
    /// Amount of the output asset paid to the trader.
    pub amount_out: Amount,
    /// Reference price adjusted by the spread.
    pub effective_price: Price,
    /// Oracle-only output minus `amount_out`, never negative.
    pub spread_fee: Amount,
}

/// A fully priced, ephemeral quote.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(not(feature = "serde"), derive(Debug))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize, DebugPretty, DisplaySimple))]
pub struct Quote {
    /// Trade direction.
    pub side: Side,
    /// Input amount.
    pub amount_in: Amount,
    /// Reference price used.
    pub reference_price: Price,
    /// Spread contributed by variance.
    pub volatility_spread: Spread,
    /// Spread contributed by trade size.
    pub impact_spread: Spread,
    /// Capped sum of both components.
    pub total_spread: Spread,
    /// Executable price.
    pub effective_price: Price,
    /// Output amount.
    pub amount_out: Amount,
    /// Value withheld by the spread, in output asset units.
    pub spread_fee: Amount,
    /// Fast/slow deviation of the reading the quote was priced from.
    pub deviation_bps: BasisPoints,
}

/// Computes output amount, effective price and spread fee.
///
/// # Arguments
///
/// * `amount_in` - Input amount (quote asset for buys, base asset for sells)
/// * `reference_price` - Quote asset per base asset
/// * `total_spread` - Capped spread, below 1
/// * `side` - Trade direction
///
/// # Errors
///
/// - `MMError::DivisionByZero` for a zero reference price
/// - `MMError::ArithmeticOverflow` for out-of-range inputs or a spread of 1 or more on a sell
/// - `MMError::InvalidMarketState` if the spread fee would be negative
///
/// # Example
///
/// ```rust
/// use oracle_spread_rs::strategy::quote::{quote_output, Side};
/// use oracle_spread_rs::types::fixed_point::Wad;
/// use oracle_spread_rs::dec;
///
/// let output = quote_output(
///     Wad::from_integer(1000),
///     Wad::from_integer(2000),
///     Wad::from_decimal(dec!(0.00015)).unwrap(),
///     Side::Buy,
/// ).unwrap();
///
/// assert_eq!(output.effective_price, Wad::from_decimal(dec!(2000.3)).unwrap());
/// assert!(output.amount_out < Wad::from_decimal(dec!(0.5)).unwrap());
/// ```
pub fn quote_output(
    amount_in: Amount,
    reference_price: Price,
    total_spread: Spread,
    side: Side,
) -> MMResult<QuoteOutput> {
    if reference_price.is_zero() {
        return Err(MMError::DivisionByZero("quote_output: reference price"));
    }

    let (effective_price, amount_out, oracle_out) = match side {
        Side::Buy => buy_output(amount_in, reference_price, total_spread)?,
        Side::Sell => sell_output(amount_in, reference_price, total_spread)?,
    };

    let spread_fee = oracle_out.checked_sub(amount_out).map_err(|_| {
        MMError::InvalidMarketState(format!(
            "negative spread fee: oracle output {oracle_out} below quoted output {amount_out}"
        ))
    })?;

    Ok(QuoteOutput {
        amount_out,
        effective_price,
        spread_fee,
    })
}

/// Returns `(effective_price, amount_out, oracle_only_out)` for a buy.
fn buy_output(amount_in: Amount, price: Price, spread: Spread) -> MMResult<(Price, Amount, Amount)> {
    let markup = Wad::ONE.checked_add(spread)?;
    let effective_price = price.mul_wad(markup)?;
    let amount_out = amount_in.div_wad(effective_price)?;
    let oracle_out = amount_in.div_wad(price)?;
    Ok((effective_price, amount_out, oracle_out))
}

/// Returns `(effective_price, amount_out, oracle_only_out)` for a sell.
fn sell_output(
    amount_in: Amount,
    price: Price,
    spread: Spread,
) -> MMResult<(Price, Amount, Amount)> {
    let discount = Wad::ONE.checked_sub(spread)?;
    let effective_price = price.mul_wad(discount)?;
    let amount_out = amount_in.mul_wad(effective_price)?;
    let oracle_out = amount_in.mul_wad(price)?;
    Ok((effective_price, amount_out, oracle_out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dec;

    fn wad(value: crate::Decimal) -> Wad {
        Wad::from_decimal(value).unwrap()
    }

    #[test]
    fn test_side_assets() {
        let pair = TradingPair::new("ETH", "USDC");
        assert_eq!(Side::Buy.input_asset(&pair), "USDC");
        assert_eq!(Side::Buy.output_asset(&pair), "ETH");
        assert_eq!(Side::Sell.input_asset(&pair), "ETH");
        assert_eq!(Side::Sell.output_asset(&pair), "USDC");
        assert!(Side::Sell.is_sell());
    }

    #[test]
    fn test_request_rejects_zero_amount() {
        assert!(matches!(
            QuoteRequest::buy(Wad::ZERO),
            Err(MMError::InvalidQuoteRequest(_))
        ));
        let request = QuoteRequest::sell(Wad::ONE).unwrap();
        assert_eq!(request.side, Side::Sell);
    }

    #[test]
    fn test_buy_reference_scenario() {
        let output = quote_output(
            Wad::from_integer(1000),
            Wad::from_integer(2000),
            wad(dec!(0.00015)),
            Side::Buy,
        )
        .unwrap();

        assert_eq!(output.effective_price, wad(dec!(2000.3)));
        // 1000 / 2000.3, truncated to 18 places
        assert_eq!(output.amount_out, wad(dec!(0.499925011248312753)));
        assert_eq!(
            output.spread_fee,
            wad(dec!(0.5)).checked_sub(output.amount_out).unwrap()
        );
    }

    #[test]
    fn test_sell_path() {
        let output = quote_output(
            Wad::from_integer(2),
            Wad::from_integer(2000),
            wad(dec!(0.01)),
            Side::Sell,
        )
        .unwrap();

        assert_eq!(output.effective_price, Wad::from_integer(1980));
        assert_eq!(output.amount_out, Wad::from_integer(3960));
        assert_eq!(output.spread_fee, Wad::from_integer(40));
    }

    #[test]
    fn test_spread_never_benefits_trader() {
        let price = Wad::from_integer(2000);
        let spread = wad(dec!(0.00015));

        let buy = quote_output(Wad::from_integer(1000), price, spread, Side::Buy).unwrap();
        let no_spread_buy = Wad::from_integer(1000).div_wad(price).unwrap();
        assert!(buy.amount_out < no_spread_buy);
        assert!(buy.effective_price > price);

        let sell = quote_output(Wad::from_integer(1000), price, spread, Side::Sell).unwrap();
        let no_spread_sell = Wad::from_integer(1000).mul_wad(price).unwrap();
        assert!(sell.amount_out < no_spread_sell);
        assert!(sell.effective_price < price);
    }

    #[test]
    fn test_zero_spread_has_zero_fee() {
        for side in [Side::Buy, Side::Sell] {
            let output =
                quote_output(Wad::from_integer(10), Wad::from_integer(4), Wad::ZERO, side).unwrap();
            assert_eq!(output.spread_fee, Wad::ZERO);
            assert_eq!(output.effective_price, Wad::from_integer(4));
        }
    }

    #[test]
    fn test_zero_reference_price_is_rejected() {
        for side in [Side::Buy, Side::Sell] {
            let result = quote_output(Wad::ONE, Wad::ZERO, Wad::ZERO, side);
            assert!(matches!(result, Err(MMError::DivisionByZero(_))));
        }
    }

    #[test]
    fn test_sell_with_full_spread_overflows() {
        let result = quote_output(
            Wad::ONE,
            Wad::from_integer(2000),
            Wad::from_integer(2),
            Side::Sell,
        );
        assert!(matches!(result, Err(MMError::ArithmeticOverflow(_))));
    }
}
