//! 18-decimal fixed-point numbers.
//!
//! Every price, amount, variance and spread in the pricing path is a [`Wad`]:
//! an unsigned 256-bit integer holding `value * 10^18`. All multiply-then-divide
//! steps truncate toward zero, which is what integer division does, so results
//! are bit-for-bit reproducible.
//!
//! # Example
//!
//! ```rust
//! use oracle_spread_rs::types::fixed_point::Wad;
//! use oracle_spread_rs::dec;
//!
//! let price = Wad::from_decimal(dec!(2000)).unwrap();
//! let spread = Wad::from_decimal(dec!(0.00015)).unwrap();
//! let effective = price.mul_wad(Wad::ONE.saturating_add(spread)).unwrap();
//! assert_eq!(effective, Wad::from_decimal(dec!(2000.3)).unwrap());
//! ```

use std::fmt;

use primitive_types::U256;

use crate::Decimal;
use crate::types::error::{MMError, MMResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of fractional decimal digits carried by a [`Wad`].
pub const WAD_DECIMALS: u32 = 18;

/// `10^18` as a plain integer.
pub const WAD_SCALE: u64 = 1_000_000_000_000_000_000;

/// Basis points in one whole unit.
pub const BPS_SCALE: u64 = 10_000;

const WAD_RAW: U256 = U256([WAD_SCALE, 0, 0, 0]);

/// Unsigned fixed-point number with 18 fractional decimals.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Wad(U256);

impl Wad {
    /// Zero.
    pub const ZERO: Wad = Wad(U256([0, 0, 0, 0]));

    /// One whole unit (`10^18` raw).
    pub const ONE: Wad = Wad(WAD_RAW);

    /// Largest representable value.
    pub const MAX: Wad = Wad(U256::MAX);

    /// Wraps a raw scaled integer.
    #[must_use]
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Returns the raw scaled integer.
    #[must_use]
    pub const fn raw(&self) -> U256 {
        self.0
    }

    /// Creates a whole-number value.
    #[must_use]
    pub fn from_integer(value: u128) -> Self {
        // u128 * 10^18 always fits in 256 bits
        Self(U256::from(value) * WAD_RAW)
    }

    /// Converts a decimal into fixed point, truncating digits beyond 18 places.
    ///
    /// # Errors
    ///
    /// Returns `MMError::InvalidConfiguration` for negative input.
    pub fn from_decimal(value: Decimal) -> MMResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MMError::InvalidConfiguration(format!(
                "fixed-point values must be non-negative, got {value}"
            )));
        }

        let mantissa = U256::from(value.mantissa().unsigned_abs());
        let scale = value.scale();
        let raw = if scale <= WAD_DECIMALS {
            mantissa
                .checked_mul(U256::exp10((WAD_DECIMALS - scale) as usize))
                .ok_or(MMError::ArithmeticOverflow("Wad::from_decimal"))?
        } else {
            mantissa / U256::exp10((scale - WAD_DECIMALS) as usize)
        };
        Ok(Self(raw))
    }

    /// Converts back into a normalized decimal.
    ///
    /// # Errors
    ///
    /// Returns `MMError::ArithmeticOverflow` if the value exceeds what
    /// `Decimal` can hold at 18 decimal places.
    pub fn to_decimal(&self) -> MMResult<Decimal> {
        if self.0.bits() > 127 {
            return Err(MMError::ArithmeticOverflow("Wad::to_decimal"));
        }
        let raw = self.0.low_u128() as i128;
        Decimal::try_from_i128_with_scale(raw, WAD_DECIMALS)
            .map(|d| d.normalize())
            .map_err(|_| MMError::ArithmeticOverflow("Wad::to_decimal"))
    }

    /// Returns true if the value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns `MMError::ArithmeticOverflow` on overflow.
    pub fn checked_add(self, other: Wad) -> MMResult<Wad> {
        self.0
            .checked_add(other.0)
            .map(Wad)
            .ok_or(MMError::ArithmeticOverflow("Wad::checked_add"))
    }

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns `MMError::ArithmeticOverflow` if `other > self`.
    pub fn checked_sub(self, other: Wad) -> MMResult<Wad> {
        self.0
            .checked_sub(other.0)
            .map(Wad)
            .ok_or(MMError::ArithmeticOverflow("Wad::checked_sub"))
    }

    /// Addition clamped to [`Wad::MAX`].
    #[must_use]
    pub fn saturating_add(self, other: Wad) -> Wad {
        Wad(self.0.saturating_add(other.0))
    }

    /// Subtraction floored at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Wad) -> Wad {
        Wad(self.0.saturating_sub(other.0))
    }

    /// Absolute difference.
    #[must_use]
    pub fn abs_diff(self, other: Wad) -> Wad {
        if self >= other {
            Wad(self.0 - other.0)
        } else {
            Wad(other.0 - self.0)
        }
    }

    /// Fixed-point multiply: `self * other / 10^18`, truncated.
    ///
    /// # Errors
    ///
    /// Returns `MMError::ArithmeticOverflow` if the intermediate product
    /// exceeds 256 bits.
    pub fn mul_wad(self, other: Wad) -> MMResult<Wad> {
        let product = self
            .0
            .checked_mul(other.0)
            .ok_or(MMError::ArithmeticOverflow("Wad::mul_wad"))?;
        Ok(Wad(product / WAD_RAW))
    }

    /// Fixed-point divide: `self * 10^18 / other`, truncated.
    ///
    /// # Errors
    ///
    /// Returns `MMError::DivisionByZero` for a zero divisor and
    /// `MMError::ArithmeticOverflow` if `self * 10^18` exceeds 256 bits.
    pub fn div_wad(self, other: Wad) -> MMResult<Wad> {
        if other.is_zero() {
            return Err(MMError::DivisionByZero("Wad::div_wad"));
        }
        let scaled = self
            .0
            .checked_mul(WAD_RAW)
            .ok_or(MMError::ArithmeticOverflow("Wad::div_wad"))?;
        Ok(Wad(scaled / other.0))
    }

    /// Raw `self * numerator / denominator`, truncated.
    ///
    /// The scale of the result is the scale of `self`, so this is the
    /// right shape for ratios such as `amount * k / reserve`.
    ///
    /// # Errors
    ///
    /// Returns `MMError::DivisionByZero` for a zero denominator and
    /// `MMError::ArithmeticOverflow` if the product exceeds 256 bits.
    pub fn mul_div(self, numerator: Wad, denominator: Wad) -> MMResult<Wad> {
        if denominator.is_zero() {
            return Err(MMError::DivisionByZero("Wad::mul_div"));
        }
        let product = self
            .0
            .checked_mul(numerator.0)
            .ok_or(MMError::ArithmeticOverflow("Wad::mul_div"))?;
        Ok(Wad(product / denominator.0))
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / WAD_RAW;
        let frac = (self.0 % WAD_RAW).low_u64();
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:018}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl fmt::Debug for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wad({self})")
    }
}

impl TryFrom<Decimal> for Wad {
    type Error = MMError;

    fn try_from(value: Decimal) -> MMResult<Self> {
        Wad::from_decimal(value)
    }
}
