mod bracket_row;
mod calculation_result;
mod contract_type;
mod contribution_rates;
mod deduction_rule;
mod percentage;
mod tax_cut_bonus;
mod tax_year_config;

pub use bracket_row::BracketRow;
pub use calculation_result::{CalculationResult, EmployerContributions, WorkerContributions};
pub use contract_type::ContractType;
pub use contribution_rates::ContributionRates;
pub use deduction_rule::DeductionRule;
pub use percentage::Percentage;
pub use tax_cut_bonus::{DiscountBand, ExtraDeduction, TaxCutBonus};
pub use tax_year_config::TaxYearConfig;
