use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::{AdditionalTaxRule, BracketTable, ConfigurationError, DeductionSchedule};
use crate::{BracketRow, ContractType, ContributionRates, DeductionRule, TaxCutBonus, TaxYearConfig};

/// Region or municipality code used when no specific row exists.
pub const DEFAULT: &str = "DEFAULT";

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{component} not found for {key}")]
    NotFound {
        component: &'static str,
        key: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Identifies the configuration a calculation needs.
///
/// Region and municipality codes are compared case-insensitively; an empty
/// code means [`DEFAULT`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleKey {
    pub tax_year: i32,
    pub contract_type: ContractType,
    pub region: String,
    pub municipality: String,
}

impl RuleKey {
    pub fn new(
        tax_year: i32,
        contract_type: ContractType,
    ) -> Self {
        Self {
            tax_year,
            contract_type,
            region: DEFAULT.to_string(),
            municipality: DEFAULT.to_string(),
        }
    }

    pub fn in_region(
        mut self,
        region: &str,
    ) -> Self {
        self.region = normalize_code(region);
        self
    }

    pub fn in_municipality(
        mut self,
        municipality: &str,
    ) -> Self {
        self.municipality = normalize_code(municipality);
        self
    }
}

impl fmt::Display for RuleKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.tax_year, self.region, self.municipality, self.contract_type
        )
    }
}

/// Uppercases and trims a region or municipality code; empty becomes
/// [`DEFAULT`].
pub fn normalize_code(code: &str) -> String {
    let code = code.trim();
    if code.is_empty() {
        DEFAULT.to_string()
    } else {
        code.to_uppercase()
    }
}

/// Read access to rate tables.
///
/// Implementations apply their own fallback rules; rows come back
/// unvalidated and are checked by [`resolve_tax_year_config`].
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// IRPEF rows for a year.
    async fn irpef_rows(
        &self,
        tax_year: i32,
    ) -> Result<Vec<BracketRow>, StoreError>;

    /// Deduction rules for a year. A year with no rules deducts nothing.
    async fn deduction_rules(
        &self,
        tax_year: i32,
    ) -> Result<Vec<DeductionRule>, StoreError>;

    /// Regional surtax rows, or `None` when the region levies none.
    async fn regional_rows(
        &self,
        tax_year: i32,
        region: &str,
    ) -> Result<Option<Vec<BracketRow>>, StoreError>;

    /// Municipal surtax rows, or `None` when the municipality levies none.
    async fn municipal_rows(
        &self,
        tax_year: i32,
        region: &str,
        municipality: &str,
    ) -> Result<Option<Vec<BracketRow>>, StoreError>;

    async fn contribution_rates(
        &self,
        tax_year: i32,
        contract_type: ContractType,
    ) -> Result<ContributionRates, StoreError>;

    async fn tax_cut_bonus(
        &self,
        tax_year: i32,
    ) -> Result<Option<TaxCutBonus>, StoreError>;

    async fn list_tax_years(&self) -> Result<Vec<i32>, StoreError>;
}

/// Looks up every component for `key` and assembles a validated
/// [`TaxYearConfig`].
///
/// # Errors
///
/// * [`StoreError::NotFound`] when IRPEF rows or contribution rates are missing.
/// * [`StoreError::InvalidConfiguration`] when any table fails validation.
/// * Any backend error the store returns.
pub async fn resolve_tax_year_config<S>(
    store: &S,
    key: &RuleKey,
) -> Result<TaxYearConfig, StoreError>
where
    S: RuleStore + ?Sized,
{
    let irpef = BracketTable::with_name("irpef", store.irpef_rows(key.tax_year).await?)?;
    let deductions = DeductionSchedule::new(store.deduction_rules(key.tax_year).await?)?;
    let contributions = store
        .contribution_rates(key.tax_year, key.contract_type)
        .await?;

    let mut config = TaxYearConfig::new(
        key.tax_year,
        key.contract_type,
        irpef,
        deductions,
        contributions,
    )?;

    if let Some(rows) = store.regional_rows(key.tax_year, &key.region).await? {
        config = config.with_regional(AdditionalTaxRule::progressive(rows)?)?;
    }
    if let Some(rows) = store
        .municipal_rows(key.tax_year, &key.region, &key.municipality)
        .await?
    {
        config = config.with_municipal(AdditionalTaxRule::progressive(rows)?)?;
    }
    if let Some(bonus) = store.tax_cut_bonus(key.tax_year).await? {
        config = config.with_bonus(bonus);
    }

    debug!(key = %key, "Resolved tax year configuration");
    Ok(config)
}
