use std::fmt;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A rate expressed in percentage points (`23` means 23 %).
///
/// Rate tables, contribution rates and surtaxes are all configured in
/// percentage points, so the conversion to a fraction happens in exactly
/// one place: [`Percentage::of`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const ONE_HUNDRED: Self = Self(Decimal::ONE_HUNDRED);

    pub fn new(points: Decimal) -> Self {
        Self(points)
    }

    /// The raw value in percentage points.
    pub fn points(self) -> Decimal {
        self.0
    }

    /// The rate as a fraction of one (`23` → `0.23`).
    pub fn as_fraction(self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Applies the rate to `amount`.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use payroll_core::Percentage;
    ///
    /// assert_eq!(Percentage::new(dec!(23)).of(dec!(13359)), dec!(3072.57));
    /// ```
    pub fn of(
        self,
        amount: Decimal,
    ) -> Decimal {
        amount * self.as_fraction()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// True when the rate lies in `[0, 100]`.
    pub fn is_valid_rate(self) -> bool {
        !self.is_negative() && self <= Self::ONE_HUNDRED
    }
}

impl From<Decimal> for Percentage {
    fn from(points: Decimal) -> Self {
        Self(points)
    }
}

impl Add for Percentage {
    type Output = Self;

    fn add(
        self,
        rhs: Self,
    ) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for Percentage {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}
