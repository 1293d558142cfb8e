//! Final rounding of a [`Breakdown`] into a [`CalculationResult`].

use crate::CalculationResult;
use crate::calculations::Breakdown;
use crate::calculations::common::round_half_up;

/// Rounds every monetary figure to cents, half away from zero.
///
/// Each field is rounded from its own unrounded value, so rounded figures
/// need not add up to the rounded totals to the last cent.
pub struct ResultAssembler;

impl ResultAssembler {
    pub fn assemble(breakdown: &Breakdown) -> CalculationResult {
        CalculationResult {
            gross_salary: round_half_up(breakdown.gross_salary),
            net_salary: round_half_up(breakdown.net_salary),
            taxable_income: round_half_up(breakdown.taxable_income),
            irpef_gross: round_half_up(breakdown.irpef_gross),
            deduction_applied: round_half_up(breakdown.deduction_applied()),
            bonus_applied: round_half_up(breakdown.bonus_applied()),
            irpef: round_half_up(breakdown.irpef),
            regional_addition: round_half_up(breakdown.regional_addition),
            municipal_addition: round_half_up(breakdown.municipal_addition),
            worker_contributions: breakdown.worker_contributions.rounded(),
            employer_contributions: breakdown.employer_contributions.rounded(),
            company_cost: round_half_up(breakdown.company_cost),
        }
    }
}
