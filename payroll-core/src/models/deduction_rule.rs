use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One band of an income-dependent deduction.
///
/// Inside `[min, max)` the deduction is `amount + slope * (income - min)`;
/// a flat tier has `slope == 0`, a fading tier a negative slope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionRule {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub amount: Decimal,
    pub slope: Decimal,
}

impl DeductionRule {
    pub fn flat(
        min: Decimal,
        max: Option<Decimal>,
        amount: Decimal,
    ) -> Self {
        Self {
            min,
            max,
            amount,
            slope: Decimal::ZERO,
        }
    }

    /// A tier that fades linearly from `amount` at `min` down to
    /// `amount - fade` at `max`. An empty band gets a zero slope and is
    /// rejected later by schedule validation.
    pub fn fading(
        min: Decimal,
        max: Decimal,
        amount: Decimal,
        fade: Decimal,
    ) -> Self {
        let width = max - min;
        let slope = if width > Decimal::ZERO {
            -fade / width
        } else {
            Decimal::ZERO
        };
        Self {
            min,
            max: Some(max),
            amount,
            slope,
        }
    }

    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income >= self.min && self.max.is_none_or(|max| income < max)
    }
}
