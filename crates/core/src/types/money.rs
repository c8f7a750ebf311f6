//! Rupee amounts using decimal arithmetic.
//!
//! The shop sells in a single currency (INR), so `Money` carries no currency
//! code. Amounts are never negative: the constructor and the deserializer both
//! reject negative values. Amounts are kept to paise precision (two decimal
//! places, half away from zero), so stored carts reload to the same values.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing [`Money`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is below zero.
    #[error("amount cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative amount in Indian Rupees.
///
/// ## Examples
///
/// ```
/// use asthmi_core::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::from_rupees(10);
/// assert_eq!(price.times(3), Money::from_rupees(30));
/// assert_eq!(Money::from_paise(1250).to_string(), "₹12.5");
/// assert!(Money::try_new(Decimal::NEGATIVE_ONE).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount, rejecting negative values and rounding to paise.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if `amount` is below zero.
    pub fn try_new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        Ok(Self(to_paise(amount)))
    }

    /// Create an amount from whole rupees.
    #[must_use]
    pub fn from_rupees(rupees: u64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Create an amount from paise (1/100 rupee).
    #[must_use]
    pub fn from_paise(paise: u64) -> Self {
        Self(Decimal::from(paise) / Decimal::ONE_HUNDRED)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` for a zero amount.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply by a line quantity, saturating at the largest amount.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }
}

fn to_paise(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Saturates at the largest amount.
impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0.normalize())
    }
}

// Stored carts and catalog payloads carry plain JSON numbers, so whole amounts
// are written as integers and the rest as floats. An amount a float cannot
// carry back exactly is written as a numeric string.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let normalized = self.0.normalize();
        if normalized.scale() == 0
            && let Some(whole) = normalized.to_i64()
        {
            return serializer.serialize_i64(whole);
        }
        if let Some(value) = normalized.to_f64()
            && value.to_string().parse::<Decimal>().ok().map(to_paise) == Some(normalized)
        {
            return serializer.serialize_f64(value);
        }
        serializer.serialize_str(&normalized.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Decimal's own visitor accepts integers, floats and numeric strings.
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::try_new(amount).map_err(serde::de::Error::custom)
    }
}

/// Percentage saved between an MRP and a selling price, rounded to the nearest
/// whole percent.
///
/// Returns 0 when the MRP is zero (free or misconfigured items) and when the
/// selling price is above the MRP.
///
/// ```
/// use asthmi_core::{Money, discount_percent};
///
/// assert_eq!(discount_percent(Money::from_rupees(200), Money::from_rupees(150)), 25);
/// assert_eq!(discount_percent(Money::ZERO, Money::from_rupees(10)), 0);
/// ```
#[must_use]
pub fn discount_percent(mrp: Money, price: Money) -> u32 {
    if mrp.is_zero() || price >= mrp {
        return 0;
    }
    let saved = (mrp.0 - price.0) / mrp.0 * Decimal::ONE_HUNDRED;
    saved
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}
