use serde::Serialize;

use crate::calculations::{AdditionalTaxRule, BracketTable, ConfigurationError, DeductionSchedule};
use crate::{ContractType, ContributionRates, TaxCutBonus};

/// Every rule needed for one calculation, resolved for a single fiscal
/// year, region, municipality and contract type.
///
/// Built once by the caller and only ever borrowed by the calculators.
/// Components are validated as they are attached, so a `TaxYearConfig`
/// that exists is always internally consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxYearConfig {
    tax_year: i32,
    contract_type: ContractType,
    irpef: BracketTable,
    deductions: DeductionSchedule,
    regional: AdditionalTaxRule,
    municipal: AdditionalTaxRule,
    contributions: ContributionRates,
    bonus: Option<TaxCutBonus>,
}

impl TaxYearConfig {
    /// Creates a configuration with no surtaxes and no bonus.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigurationError`] raised by
    /// [`ContributionRates::validate`].
    pub fn new(
        tax_year: i32,
        contract_type: ContractType,
        irpef: BracketTable,
        deductions: DeductionSchedule,
        contributions: ContributionRates,
    ) -> Result<Self, ConfigurationError> {
        contributions.validate()?;
        Ok(Self {
            tax_year,
            contract_type,
            irpef,
            deductions,
            regional: AdditionalTaxRule::default(),
            municipal: AdditionalTaxRule::default(),
            contributions,
            bonus: None,
        })
    }

    /// Attaches the regional surtax.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::RateOutOfRange`] for a flat rate outside
    /// `[0, 100]`.
    pub fn with_regional(
        mut self,
        rule: AdditionalTaxRule,
    ) -> Result<Self, ConfigurationError> {
        rule.validate("regional addition")?;
        self.regional = rule;
        Ok(self)
    }

    /// Attaches the municipal surtax.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::RateOutOfRange`] for a flat rate outside
    /// `[0, 100]`.
    pub fn with_municipal(
        mut self,
        rule: AdditionalTaxRule,
    ) -> Result<Self, ConfigurationError> {
        rule.validate("municipal addition")?;
        self.municipal = rule;
        Ok(self)
    }

    pub fn with_bonus(
        mut self,
        bonus: TaxCutBonus,
    ) -> Self {
        self.bonus = Some(bonus);
        self
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn contract_type(&self) -> ContractType {
        self.contract_type
    }

    pub fn irpef(&self) -> &BracketTable {
        &self.irpef
    }

    pub fn deductions(&self) -> &DeductionSchedule {
        &self.deductions
    }

    pub fn regional(&self) -> &AdditionalTaxRule {
        &self.regional
    }

    pub fn municipal(&self) -> &AdditionalTaxRule {
        &self.municipal
    }

    pub fn contributions(&self) -> &ContributionRates {
        &self.contributions
    }

    pub fn bonus(&self) -> Option<&TaxCutBonus> {
        self.bonus.as_ref()
    }
}
