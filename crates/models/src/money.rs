use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Native precision carried by every [`Money`] value (fractional digits).
pub const SCALE: u32 = 12;

/// Arbitrary-precision signed decimal money value.
///
/// Wraps [`rust_decimal::Decimal`] rather than any binary float. Every
/// operation that could otherwise introduce float rounding (multiplication by
/// a rate, division) rounds half-to-even at [`SCALE`] fractional digits, the
/// single rounding mode used throughout the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointNearestEven))
    }

    /// Parse a decimal literal such as `"0.00015"`. The only intended entry
    /// point for constants and configuration values — never a binary float.
    pub fn parse(literal: &str) -> Result<Self, rust_decimal::Error> {
        Decimal::from_str(literal).map(Self::new)
    }

    /// Lossy construction from a binary float. Callers must record this in
    /// metadata; this is the only place a float may touch a [`Money`] value,
    /// and it never sits on a hot ledger path (only used for diagnostics).
    pub fn from_f64_lossy(value: f64) -> Option<Self> {
        Decimal::from_str(&format!("{value:.12}")).ok().map(Self::new)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn to_f64_lossy(self) -> f64 {
        self.0.try_into().unwrap_or(0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: Self) -> Self {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }

    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }

    /// Multiply by a rate that is not itself ledger money (a payout
    /// multiplier, a ratio) — the one place an `f64` is allowed to touch a
    /// money value, and only because it is immediately rounded half-to-even
    /// back into [`SCALE`]-digit decimal. The multiplier itself never reaches
    /// the ledger unrounded.
    pub fn mul_rate(self, rate: f64) -> Self {
        let rate_decimal = Decimal::from_str(&format!("{rate:.12}")).unwrap_or(Decimal::ZERO);
        Self::new(self.0 * rate_decimal)
    }

    pub fn mul_decimal(self, rate: Decimal) -> Self {
        Self::new(self.0 * rate)
    }

    /// Division that always rounds half-to-even to [`SCALE`] digits, never
    /// silently truncating or deferring precision.
    pub fn div_rounded(self, divisor: Decimal) -> Self {
        if divisor.is_zero() {
            return Self::ZERO;
        }
        Self::new(self.0 / divisor)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Self::Output {
        Self::new(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_and_display_roundtrip() {
        let m = Money::parse("0.00015").unwrap();
        assert_eq!(m.to_string(), "0.000150000000");
    }

    #[test]
    fn addition_and_subtraction() {
        let a = Money::new(dec!(10.5));
        let b = Money::new(dec!(3.25));
        assert_eq!((a + b).as_decimal(), dec!(13.75));
        assert_eq!((a - b).as_decimal(), dec!(7.25));
    }

    #[test]
    fn half_to_even_rounding_on_multiply() {
        // 0.125 at 2 extra digits rounds half-to-even toward an even digit.
        let m = Money::new(dec!(0.0000000000005));
        let doubled = m.mul_rate(2.0);
        assert_eq!(doubled.as_decimal().scale(), SCALE);
    }

    #[test]
    fn clamp_bounds_value() {
        let lo = Money::new(dec!(1));
        let hi = Money::new(dec!(10));
        assert_eq!(Money::new(dec!(0)).clamp(lo, hi).as_decimal(), dec!(1));
        assert_eq!(Money::new(dec!(20)).clamp(lo, hi).as_decimal(), dec!(10));
        assert_eq!(Money::new(dec!(5)).clamp(lo, hi).as_decimal(), dec!(5));
    }

    #[test]
    fn sum_over_iterator() {
        let values = vec![Money::new(dec!(1)), Money::new(dec!(2)), Money::new(dec!(3))];
        let total: Money = values.into_iter().sum();
        assert_eq!(total.as_decimal(), dec!(6));
    }
}
