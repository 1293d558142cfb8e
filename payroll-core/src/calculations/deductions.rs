//! Income-dependent IRPEF deductions (detrazioni).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::DeductionRule;
use crate::calculations::common::non_negative;
use crate::calculations::validation::{ConfigurationError, check_contiguous};

/// Ordered, contiguous set of [`DeductionRule`]s.
///
/// Exactly one rule owns any income inside the schedule's range; outside
/// it the deduction is zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::DeductionSchedule;
/// use payroll_core::calculations::common::round_half_up;
///
/// let schedule = DeductionSchedule::italian_employee_2025();
///
/// assert_eq!(schedule.apply(dec!(10000)), dec!(1955));
/// assert_eq!(round_half_up(schedule.apply(dec!(39000))), dec!(955.00));
/// assert_eq!(schedule.apply(dec!(60000)), dec!(0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DeductionRule>", into = "Vec<DeductionRule>")]
pub struct DeductionSchedule {
    rules: Vec<DeductionRule>,
}

impl DeductionSchedule {
    /// Builds a schedule, rejecting rules that are unordered, overlapping or
    /// non-contiguous.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found.
    pub fn new(rules: Vec<DeductionRule>) -> Result<Self, ConfigurationError> {
        check_contiguous("deduction schedule", rules.iter().map(|r| (r.min, r.max)))?;
        Ok(Self { rules })
    }

    /// Employee deduction for 2025: a flat 1955 up to 15 000, 3100 fading to
    /// 1910 at 28 000, then 1910 fading to zero at 50 000.
    pub fn italian_employee_2025() -> Self {
        Self {
            rules: vec![
                DeductionRule::flat(dec!(0), Some(dec!(15000)), dec!(1955)),
                DeductionRule::fading(dec!(15000), dec!(28000), dec!(3100), dec!(1190)),
                DeductionRule::fading(dec!(28000), dec!(50000), dec!(1910), dec!(1910)),
            ],
        }
    }

    pub fn rules(&self) -> &[DeductionRule] {
        &self.rules
    }

    /// Deduction owed for `income`, never negative.
    pub fn apply(
        &self,
        income: Decimal,
    ) -> Decimal {
        let income = non_negative(income);
        self.rules
            .iter()
            .find(|rule| rule.contains(income))
            .map_or(Decimal::ZERO, |rule| {
                non_negative(rule.amount + rule.slope * (income - rule.min))
            })
    }
}

impl TryFrom<Vec<DeductionRule>> for DeductionSchedule {
    type Error = ConfigurationError;

    fn try_from(rules: Vec<DeductionRule>) -> Result<Self, Self::Error> {
        Self::new(rules)
    }
}

impl From<DeductionSchedule> for Vec<DeductionRule> {
    fn from(schedule: DeductionSchedule) -> Self {
        schedule.rules
    }
}
