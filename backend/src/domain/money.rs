//! Fixed-point currency amounts.
//!
//! Balances and transaction amounts are held as signed minor units (cents).
//! Decimal text is parsed into minor units when it enters the domain and only
//! rendered back to a decimal at the HTTP boundary.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Number of fractional digits carried by every amount.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Reasons a decimal amount is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// Not a JSON number or numeric string.
    #[error("Amount must be a number")]
    Malformed,
    /// Zero or negative.
    #[error("Amount must be positive")]
    NotPositive,
    /// More fractional digits than the minor unit allows.
    #[error("Amount must have at most 2 decimal places")]
    TooPrecise,
    /// Does not fit in `i64` minor units.
    #[error("Amount is too large")]
    OutOfRange,
}

/// Currency value in minor units.
///
/// # Examples
/// ```
/// use savings_backend::domain::Money;
///
/// let amount = Money::parse_amount("10.5").expect("valid amount");
/// assert_eq!(amount.minor_units(), 1050);
/// assert_eq!(amount.to_string(), "10.50");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// A zero balance.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw minor-unit value.
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Raw minor-unit value.
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Whether the value is strictly greater than zero.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Exact decimal rendering with two fractional digits.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    /// Sum, or `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Difference, or `None` on overflow.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Parse a client-supplied amount.
    ///
    /// Accepts plain or scientific decimal notation. The value must be
    /// positive and carry no more than two significant fractional digits;
    /// trailing zeros are ignored, so `"10.500"` is accepted.
    pub fn parse_amount(raw: &str) -> Result<Self, AmountError> {
        let raw = raw.trim();
        let decimal = Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map_err(|_| AmountError::Malformed)?;
        Self::try_from_decimal(decimal)
    }

    /// Convert an exact decimal into a positive amount.
    pub fn try_from_decimal(decimal: Decimal) -> Result<Self, AmountError> {
        let mut normalized = decimal.normalize();
        if normalized.scale() > MINOR_UNIT_SCALE {
            return Err(AmountError::TooPrecise);
        }
        if normalized <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }
        normalized.rescale(MINOR_UNIT_SCALE);
        i64::try_from(normalized.mantissa())
            .map(Self)
            .map_err(|_| AmountError::OutOfRange)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}
