use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;

/// Social-security amounts withheld from the worker's gross.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerContributions {
    pub inps: Decimal,
    pub ffc: Decimal,
    pub solidarity: Decimal,
    pub total: Decimal,
}

impl WorkerContributions {
    pub fn rounded(&self) -> Self {
        Self {
            inps: round_half_up(self.inps),
            ffc: round_half_up(self.ffc),
            solidarity: round_half_up(self.solidarity),
            total: round_half_up(self.total),
        }
    }
}

/// Social-security amounts the employer pays on top of gross.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContributions {
    pub inps: Decimal,
    pub inail: Decimal,
    pub ffc: Decimal,
    pub solidarity: Decimal,
    pub total: Decimal,
}

impl EmployerContributions {
    pub fn rounded(&self) -> Self {
        Self {
            inps: round_half_up(self.inps),
            inail: round_half_up(self.inail),
            ffc: round_half_up(self.ffc),
            solidarity: round_half_up(self.solidarity),
            total: round_half_up(self.total),
        }
    }
}

/// Every figure of one salary calculation, rounded to cents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub gross_salary: Decimal,
    pub net_salary: Decimal,
    pub taxable_income: Decimal,

    /// IRPEF from the rate table, before any deduction.
    pub irpef_gross: Decimal,
    /// Portion of the deduction actually absorbed by `irpef_gross`.
    pub deduction_applied: Decimal,
    /// IRPEF reduction granted by the tax-cut bonus.
    pub bonus_applied: Decimal,
    /// IRPEF actually due.
    pub irpef: Decimal,

    pub regional_addition: Decimal,
    pub municipal_addition: Decimal,

    pub worker_contributions: WorkerContributions,
    pub employer_contributions: EmployerContributions,
    pub company_cost: Decimal,
}

impl CalculationResult {
    /// IRPEF plus both surtaxes.
    pub fn total_tax(&self) -> Decimal {
        self.irpef + self.regional_addition + self.municipal_addition
    }
}

impl fmt::Display for CalculationResult {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let rows = [
            ("Gross salary", self.gross_salary),
            ("Worker contributions", self.worker_contributions.total),
            ("  INPS", self.worker_contributions.inps),
            ("  FFC", self.worker_contributions.ffc),
            ("  Solidarity", self.worker_contributions.solidarity),
            ("Taxable income", self.taxable_income),
            ("IRPEF (gross)", self.irpef_gross),
            ("Deduction applied", self.deduction_applied),
            ("Bonus applied", self.bonus_applied),
            ("IRPEF due", self.irpef),
            ("Regional addition", self.regional_addition),
            ("Municipal addition", self.municipal_addition),
            ("Net salary", self.net_salary),
            ("Employer contributions", self.employer_contributions.total),
            ("  INPS", self.employer_contributions.inps),
            ("  INAIL", self.employer_contributions.inail),
            ("  FFC", self.employer_contributions.ffc),
            ("  Solidarity", self.employer_contributions.solidarity),
            ("Company cost", self.company_cost),
        ];
        for (label, value) in rows {
            writeln!(f, "{label:<24}{value:>16.2}")?;
        }
        Ok(())
    }
}
