//! Low-income tax-cut bonus, applied on top of the ordinary deduction.

use rust_decimal::Decimal;

use crate::calculations::common::non_negative;
use crate::{ExtraDeduction, Percentage, TaxCutBonus};

impl ExtraDeduction {
    /// Full amount up to `full_to`, linear fade to zero at `fade_to`.
    pub fn amount_for(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= self.full_to {
            self.full_amount
        } else if income < self.fade_to {
            let remaining = (self.fade_to - income) / (self.fade_to - self.full_to);
            self.full_amount * remaining
        } else {
            Decimal::ZERO
        }
    }
}

impl TaxCutBonus {
    /// Discount of the first band whose ceiling is at or above `income`.
    pub fn discount_for(
        &self,
        income: Decimal,
    ) -> Percentage {
        self.discount_bands()
            .iter()
            .find(|band| income <= band.max_income)
            .map_or(Percentage::ZERO, |band| band.discount)
    }

    pub fn extra_deduction_for(
        &self,
        income: Decimal,
    ) -> Decimal {
        self.extra_deduction()
            .map_or(Decimal::ZERO, |extra| extra.amount_for(income))
    }

    /// IRPEF left after the bonus, given post-deduction IRPEF and the
    /// taxable income the bonus bands are read against.
    pub fn apply(
        &self,
        irpef_after_deduction: Decimal,
        taxable_income: Decimal,
    ) -> Decimal {
        let discount = self.discount_for(taxable_income).of(irpef_after_deduction);
        non_negative(irpef_after_deduction - discount - self.extra_deduction_for(taxable_income))
    }
}
