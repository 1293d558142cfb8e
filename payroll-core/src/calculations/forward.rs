//! Gross → net.
//!
//! # Pipeline
//!
//! | Step | Figure |
//! |------|--------|
//! | 1    | Worker contributions: gross × (INPS + FFC + solidarity) |
//! | 2    | Taxable income: gross − worker contributions, minimum 0 |
//! | 3    | IRPEF before deductions, from the progressive table |
//! | 4    | Deduction, from the deduction schedule |
//! | 5    | IRPEF after deduction, minimum 0 |
//! | 5b   | Tax-cut bonus, when configured |
//! | 6    | Regional addition on taxable income |
//! | 7    | Municipal addition on taxable income |
//! | 8    | Net: gross − contributions − IRPEF − additions |
//! | 9    | Employer contributions |
//! | 10   | Company cost: gross + employer contributions |
//!
//! Every figure keeps full precision; rounding to cents happens only in
//! [`ResultAssembler`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::{
//!     BracketTable, ContractType, ContributionRates, DeductionSchedule, Percentage,
//!     TaxYearConfig, net_from_gross,
//! };
//!
//! let contributions = ContributionRates {
//!     inps_worker: Percentage::new(dec!(9.19)),
//!     ..Default::default()
//! };
//! let config = TaxYearConfig::new(
//!     2025,
//!     ContractType::Professional,
//!     BracketTable::irpef_2025(),
//!     DeductionSchedule::default(),
//!     contributions,
//! )
//! .unwrap();
//!
//! let result = net_from_gross(dec!(30000), &config);
//!
//! assert_eq!(result.worker_contributions.total, dec!(2757.00));
//! assert_eq!(result.taxable_income, dec!(27243.00));
//! assert_eq!(result.irpef, dec!(6265.89));
//! assert_eq!(result.net_salary, dec!(20977.11));
//! ```

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::ResultAssembler;
use crate::calculations::common::non_negative;
use crate::{CalculationResult, EmployerContributions, TaxYearConfig, WorkerContributions};

/// Largest gross the calculators work with (10^15).
///
/// Larger inputs are clamped to it by [`ForwardCalculator::breakdown`], and
/// [`InverseSolver`](crate::calculations::InverseSolver) reports targets above
/// it as unsolvable.
pub const MAX_GROSS: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Unrounded figures of one gross → net evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakdown {
    pub gross_salary: Decimal,
    pub worker_contributions: WorkerContributions,
    pub taxable_income: Decimal,
    pub irpef_gross: Decimal,
    pub deduction: Decimal,
    pub irpef_after_deduction: Decimal,
    pub irpef: Decimal,
    pub regional_addition: Decimal,
    pub municipal_addition: Decimal,
    pub net_salary: Decimal,
    pub employer_contributions: EmployerContributions,
    pub company_cost: Decimal,
}

impl Breakdown {
    /// Part of the computed deduction actually absorbed by gross IRPEF.
    pub fn deduction_applied(&self) -> Decimal {
        self.irpef_gross - self.irpef_after_deduction
    }

    /// IRPEF removed by the tax-cut bonus.
    pub fn bonus_applied(&self) -> Decimal {
        self.irpef_after_deduction - self.irpef
    }
}

/// Deterministic gross → net calculator over a borrowed configuration.
#[derive(Debug, Clone, Copy)]
pub struct ForwardCalculator<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> ForwardCalculator<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a TaxYearConfig {
        self.config
    }

    /// Runs the full pipeline and rounds the result to cents.
    ///
    /// # Arguments
    ///
    /// * `gross` - Annual gross salary, clamped to `[0, MAX_GROSS]`
    ///
    /// # Returns
    ///
    /// The assembled [`CalculationResult`]. Its `gross_salary` is the clamped
    /// value.
    pub fn calculate(
        &self,
        gross: Decimal,
    ) -> CalculationResult {
        ResultAssembler::assemble(&self.breakdown(gross))
    }

    /// Runs the full pipeline without rounding.
    ///
    /// Negative gross is clamped to zero and gross above [`MAX_GROSS`] to
    /// [`MAX_GROSS`]; the function never fails.
    pub fn breakdown(
        &self,
        gross: Decimal,
    ) -> Breakdown {
        let gross = self.clamp_gross(gross);
        let config = self.config;

        // Steps 1-2
        let worker_contributions = config.contributions().worker_contributions(gross);
        let taxable_income = non_negative(gross - worker_contributions.total);

        // Steps 3-5
        let irpef_gross = config.irpef().apply(taxable_income);
        let deduction = config.deductions().apply(taxable_income);
        let irpef_after_deduction = non_negative(irpef_gross - deduction);
        let irpef = config.bonus().map_or(irpef_after_deduction, |bonus| {
            bonus.apply(irpef_after_deduction, taxable_income)
        });

        // Steps 6-7
        let regional_addition = config.regional().apply(taxable_income);
        let municipal_addition = config.municipal().apply(taxable_income);

        // Step 8
        let net_salary =
            gross - worker_contributions.total - irpef - regional_addition - municipal_addition;

        // Steps 9-10
        let employer_contributions = config
            .contributions()
            .employer_contributions(gross, config.contract_type());
        let company_cost = gross + employer_contributions.total;

        Breakdown {
            gross_salary: gross,
            worker_contributions,
            taxable_income,
            irpef_gross,
            deduction,
            irpef_after_deduction,
            irpef,
            regional_addition,
            municipal_addition,
            net_salary,
            employer_contributions,
            company_cost,
        }
    }

    /// Unrounded net salary for `gross`.
    pub fn net(
        &self,
        gross: Decimal,
    ) -> Decimal {
        self.breakdown(gross).net_salary
    }

    fn clamp_gross(
        &self,
        gross: Decimal,
    ) -> Decimal {
        if gross.is_sign_negative() && !gross.is_zero() {
            warn!(gross = %gross, "Negative gross salary; treating as zero");
            return Decimal::ZERO;
        }
        if gross > MAX_GROSS {
            warn!(gross = %gross, max = %MAX_GROSS, "Gross salary above supported maximum; clamping");
            return MAX_GROSS;
        }
        non_negative(gross)
    }
}
