use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Percentage;

/// One slice of a progressive rate table. `max == None` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketRow {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Percentage,
}

impl BracketRow {
    pub fn new(
        min: Decimal,
        max: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            min,
            max,
            rate: Percentage::new(rate),
        }
    }

    /// Portion of `income` that falls inside `[min, max)`.
    pub fn slice_of(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= self.min {
            return Decimal::ZERO;
        }
        let upper = self.max.map_or(income, |max| max.min(income));
        upper - self.min
    }
}
