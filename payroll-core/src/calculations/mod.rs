//! Payroll calculations.
//!
//! Rate tables ([`BracketTable`], [`DeductionSchedule`], [`AdditionalTaxRule`])
//! are validated when built. [`ForwardCalculator`] turns a gross salary into
//! a net one; [`InverseSolver`] goes the other way by bisection over the
//! forward pipeline. Rounding happens only in [`ResultAssembler`].

pub mod common;

mod additional;
mod assembler;
mod bonus;
mod brackets;
mod contributions;
mod deductions;
mod forward;
mod inverse;
mod validation;

pub use additional::AdditionalTaxRule;
pub use assembler::ResultAssembler;
pub use brackets::BracketTable;
pub use deductions::DeductionSchedule;
pub use forward::{Breakdown, ForwardCalculator, MAX_GROSS};
pub use inverse::{InverseSolver, Solution, SolverError, SolverSettings, StopReason};
pub use validation::ConfigurationError;

use rust_decimal::Decimal;

use crate::{CalculationResult, TaxYearConfig};

/// Net salary and every intermediate figure for `gross` under `config`.
///
/// Never fails. Negative gross is treated as zero, and gross above
/// [`MAX_GROSS`] (10^15) is clamped to it with a `warn!`; the result then
/// reports `gross_salary == MAX_GROSS`, not the amount passed in.
///
/// # Arguments
///
/// * `gross` - Annual gross salary
/// * `config` - Resolved rules for one year, contract type and location
///
/// # Returns
///
/// The [`CalculationResult`] with every monetary field rounded to cents.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::MAX_GROSS;
/// use payroll_core::{
///     BracketTable, ContractType, ContributionRates, DeductionSchedule, TaxYearConfig,
///     net_from_gross,
/// };
///
/// let config = TaxYearConfig::new(
///     2025,
///     ContractType::Professional,
///     BracketTable::irpef_2025(),
///     DeductionSchedule::default(),
///     ContributionRates::default(),
/// )
/// .unwrap();
///
/// assert_eq!(net_from_gross(dec!(10000), &config).net_salary, dec!(7700.00));
/// assert_eq!(net_from_gross(dec!(-5), &config).gross_salary, dec!(0));
/// assert_eq!(net_from_gross(MAX_GROSS * dec!(2), &config).gross_salary, MAX_GROSS);
/// ```
pub fn net_from_gross(
    gross: Decimal,
    config: &TaxYearConfig,
) -> CalculationResult {
    ForwardCalculator::new(config).calculate(gross)
}

/// Gross salary producing `net` under `config`, with default
/// [`SolverSettings`].
///
/// A negative `net` is treated as zero. Use [`InverseSolver`] directly for
/// custom settings or to see how the bisection stopped.
///
/// # Arguments
///
/// * `net` - Target annual net salary
/// * `config` - Resolved rules for one year, contract type and location
///
/// # Returns
///
/// The [`CalculationResult`] of the forward pipeline at the converged gross,
/// so every figure is consistent with that gross.
///
/// # Errors
///
/// Returns [`SolverError::Unsolvable`] when the target cannot be bracketed,
/// when it falls inside a jump of net over gross (a deduction or bonus
/// cliff), or when the iteration cap leaves the estimate off target.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::{
///     BracketTable, ContractType, ContributionRates, DeductionSchedule, SolverError,
///     TaxYearConfig, gross_from_net,
/// };
///
/// let config = TaxYearConfig::new(
///     2025,
///     ContractType::Professional,
///     BracketTable::irpef_2025(),
///     DeductionSchedule::italian_employee_2025(),
///     ContributionRates::default(),
/// )
/// .unwrap();
///
/// let result = gross_from_net(dec!(14650), &config).unwrap();
/// assert!((result.gross_salary - dec!(15000)).abs() <= dec!(0.01));
///
/// // Net jumps from 13 505 to 14 650 at gross 15 000.
/// assert!(matches!(
///     gross_from_net(dec!(14000), &config),
///     Err(SolverError::Unsolvable { .. })
/// ));
/// ```
pub fn gross_from_net(
    net: Decimal,
    config: &TaxYearConfig,
) -> Result<CalculationResult, SolverError> {
    InverseSolver::new(config)
        .solve(net)
        .map(|solution| solution.result)
}
