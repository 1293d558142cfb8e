use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use super::rule_store::{DEFAULT, RuleStore, StoreError, normalize_code};
use crate::{BracketRow, ContractType, ContributionRates, DeductionRule, TaxCutBonus};

/// [`RuleStore`] backed by in-process maps.
///
/// Inserting a key that is already present replaces its rows, so loading the
/// same data twice leaves the store unchanged.
///
/// | Component | Fallback |
/// |-----------|----------|
/// | IRPEF, contributions | none, [`StoreError::NotFound`] |
/// | deductions | empty schedule |
/// | regional | `(year, region)` → `(year, DEFAULT)` → no surtax |
/// | municipal | `(year, region, municipality)` → `(year, region, DEFAULT)` → `(year, DEFAULT, DEFAULT)` → no surtax |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryRuleStore {
    irpef: BTreeMap<i32, Vec<BracketRow>>,
    deductions: BTreeMap<i32, Vec<DeductionRule>>,
    regional: BTreeMap<(i32, String), Vec<BracketRow>>,
    municipal: BTreeMap<(i32, String, String), Vec<BracketRow>>,
    contributions: BTreeMap<(i32, ContractType), ContributionRates>,
    bonuses: BTreeMap<i32, TaxCutBonus>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_irpef_rows(
        &mut self,
        tax_year: i32,
        rows: Vec<BracketRow>,
    ) {
        self.irpef.insert(tax_year, rows);
    }

    pub fn insert_deduction_rules(
        &mut self,
        tax_year: i32,
        rules: Vec<DeductionRule>,
    ) {
        self.deductions.insert(tax_year, rules);
    }

    pub fn insert_regional_rows(
        &mut self,
        tax_year: i32,
        region: &str,
        rows: Vec<BracketRow>,
    ) {
        self.regional
            .insert((tax_year, normalize_code(region)), rows);
    }

    pub fn insert_municipal_rows(
        &mut self,
        tax_year: i32,
        region: &str,
        municipality: &str,
        rows: Vec<BracketRow>,
    ) {
        self.municipal.insert(
            (tax_year, normalize_code(region), normalize_code(municipality)),
            rows,
        );
    }

    pub fn insert_contribution_rates(
        &mut self,
        tax_year: i32,
        contract_type: ContractType,
        rates: ContributionRates,
    ) {
        self.contributions.insert((tax_year, contract_type), rates);
    }

    pub fn insert_tax_cut_bonus(
        &mut self,
        tax_year: i32,
        bonus: TaxCutBonus,
    ) {
        self.bonuses.insert(tax_year, bonus);
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn irpef_rows(
        &self,
        tax_year: i32,
    ) -> Result<Vec<BracketRow>, StoreError> {
        self.irpef
            .get(&tax_year)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                component: "IRPEF brackets",
                key: tax_year.to_string(),
            })
    }

    async fn deduction_rules(
        &self,
        tax_year: i32,
    ) -> Result<Vec<DeductionRule>, StoreError> {
        Ok(self.deductions.get(&tax_year).cloned().unwrap_or_default())
    }

    async fn regional_rows(
        &self,
        tax_year: i32,
        region: &str,
    ) -> Result<Option<Vec<BracketRow>>, StoreError> {
        let region = normalize_code(region);
        Ok(self
            .regional
            .get(&(tax_year, region))
            .or_else(|| self.regional.get(&(tax_year, DEFAULT.to_string())))
            .cloned())
    }

    async fn municipal_rows(
        &self,
        tax_year: i32,
        region: &str,
        municipality: &str,
    ) -> Result<Option<Vec<BracketRow>>, StoreError> {
        let region = normalize_code(region);
        let municipality = normalize_code(municipality);
        let candidates = [
            (tax_year, region.clone(), municipality),
            (tax_year, region, DEFAULT.to_string()),
            (tax_year, DEFAULT.to_string(), DEFAULT.to_string()),
        ];
        Ok(candidates
            .iter()
            .find_map(|key| self.municipal.get(key))
            .cloned())
    }

    async fn contribution_rates(
        &self,
        tax_year: i32,
        contract_type: ContractType,
    ) -> Result<ContributionRates, StoreError> {
        self.contributions
            .get(&(tax_year, contract_type))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                component: "contribution rates",
                key: format!("{tax_year} / {contract_type}"),
            })
    }

    async fn tax_cut_bonus(
        &self,
        tax_year: i32,
    ) -> Result<Option<TaxCutBonus>, StoreError> {
        Ok(self.bonuses.get(&tax_year).cloned())
    }

    async fn list_tax_years(&self) -> Result<Vec<i32>, StoreError> {
        let years: BTreeSet<i32> = self
            .irpef
            .keys()
            .copied()
            .chain(self.contributions.keys().map(|(year, _)| *year))
            .collect();
        Ok(years.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::{AdditionalTaxRule, ConfigurationError};
    use crate::store::{RuleKey, resolve_tax_year_config};
    use crate::{DiscountBand, Percentage, net_from_gross};

    fn flat(rate: rust_decimal::Decimal) -> Vec<BracketRow> {
        vec![BracketRow::new(dec!(0), None, rate)]
    }

    fn contributions() -> ContributionRates {
        ContributionRates {
            inps_worker: Percentage::new(dec!(9.19)),
            ffc_worker: Percentage::new(dec!(1.25)),
            solidarity_worker: Percentage::new(dec!(0.5)),
            inps_employer: Percentage::new(dec!(29.58)),
            inail_employer: Percentage::new(dec!(7.9)),
            ffc_employer: Percentage::new(dec!(6.25)),
            solidarity_employer: Percentage::ZERO,
        }
    }

    fn seeded_store() -> InMemoryRuleStore {
        let mut store = InMemoryRuleStore::new();
        store.insert_irpef_rows(
            2025,
            vec![
                BracketRow::new(dec!(0), Some(dec!(28000)), dec!(23)),
                BracketRow::new(dec!(28000), Some(dec!(50000)), dec!(35)),
                BracketRow::new(dec!(50000), None, dec!(43)),
            ],
        );
        store.insert_contribution_rates(2025, ContractType::Professional, contributions());
        store.insert_regional_rows(2025, DEFAULT, flat(dec!(1.23)));
        store.insert_regional_rows(
            2025,
            "lombardia",
            vec![
                BracketRow::new(dec!(0), Some(dec!(15000)), dec!(1.23)),
                BracketRow::new(dec!(15000), None, dec!(1.58)),
            ],
        );
        store.insert_municipal_rows(2025, "LOMBARDIA", "MILANO", flat(dec!(0.8)));
        store.insert_municipal_rows(2025, "LOMBARDIA", DEFAULT, flat(dec!(0.5)));
        store
    }

    // =========================================================================
    // lookups
    // =========================================================================

    #[tokio::test]
    async fn missing_irpef_is_not_found() {
        let store = InMemoryRuleStore::new();

        let result = store.irpef_rows(2030).await;

        assert_eq!(
            result,
            Err(StoreError::NotFound {
                component: "IRPEF brackets",
                key: "2030".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn missing_deductions_are_empty() {
        let store = seeded_store();

        assert_eq!(store.deduction_rules(2025).await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn region_lookup_is_case_insensitive() {
        let store = seeded_store();

        let rows = store.regional_rows(2025, " Lombardia ").await.unwrap();

        assert_eq!(rows.map(|rows| rows.len()), Some(2));
    }

    #[tokio::test]
    async fn unknown_region_falls_back_to_default() {
        let store = seeded_store();

        let rows = store.regional_rows(2025, "VENETO").await.unwrap();

        assert_eq!(rows, Some(flat(dec!(1.23))));
    }

    #[tokio::test]
    async fn region_without_default_has_no_surtax() {
        let store = seeded_store();

        assert_eq!(store.regional_rows(2024, "VENETO").await, Ok(None));
    }

    #[tokio::test]
    async fn municipal_lookup_walks_fallback_chain() {
        let store = seeded_store();

        let milano = store.municipal_rows(2025, "LOMBARDIA", "MILANO").await;
        let bergamo = store.municipal_rows(2025, "LOMBARDIA", "BERGAMO").await;
        let padova = store.municipal_rows(2025, "VENETO", "PADOVA").await;

        assert_eq!(milano, Ok(Some(flat(dec!(0.8)))));
        assert_eq!(bergamo, Ok(Some(flat(dec!(0.5)))));
        assert_eq!(padova, Ok(None));
    }

    #[tokio::test]
    async fn reinserting_replaces_rows() {
        let mut store = seeded_store();
        let before = store.clone();

        store.insert_municipal_rows(2025, "LOMBARDIA", "MILANO", flat(dec!(0.8)));

        assert_eq!(store, before);
    }

    #[tokio::test]
    async fn list_tax_years_is_sorted_and_unique() {
        let mut store = seeded_store();
        store.insert_irpef_rows(2024, flat(dec!(23)));
        store.insert_contribution_rates(2024, ContractType::Permanent, contributions());

        assert_eq!(store.list_tax_years().await, Ok(vec![2024, 2025]));
    }

    // =========================================================================
    // resolve_tax_year_config
    // =========================================================================

    #[tokio::test]
    async fn resolve_assembles_every_component() {
        let store = seeded_store();
        let key = RuleKey::new(2025, ContractType::Professional)
            .in_region("lombardia")
            .in_municipality("milano");

        let config = resolve_tax_year_config(&store, &key).await.unwrap();

        assert_eq!(config.tax_year(), 2025);
        assert!(matches!(config.regional(), AdditionalTaxRule::Progressive { .. }));
        assert_eq!(
            config.municipal(),
            &AdditionalTaxRule::Flat {
                rate: Percentage::new(dec!(0.8))
            }
        );
        assert!(config.deductions().rules().is_empty());
        assert!(config.bonus().is_none());
    }

    #[tokio::test]
    async fn resolve_without_region_uses_defaults() {
        let store = seeded_store();
        let key = RuleKey::new(2025, ContractType::Professional);

        let config = resolve_tax_year_config(&store, &key).await.unwrap();
        let result = net_from_gross(dec!(15000), &config);

        // 13359 × 1.23%
        assert_eq!(result.regional_addition, dec!(164.32));
        assert_eq!(result.municipal_addition, dec!(0));
    }

    #[tokio::test]
    async fn resolve_fails_without_contribution_rates() {
        let store = seeded_store();
        let key = RuleKey::new(2025, ContractType::Apprenticeship);

        let result = resolve_tax_year_config(&store, &key).await;

        assert!(matches!(
            result,
            Err(StoreError::NotFound {
                component: "contribution rates",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn resolve_rejects_invalid_rows() {
        let mut store = seeded_store();
        store.insert_irpef_rows(
            2025,
            vec![
                BracketRow::new(dec!(0), Some(dec!(15000)), dec!(23)),
                BracketRow::new(dec!(16000), None, dec!(35)),
            ],
        );
        let key = RuleKey::new(2025, ContractType::Professional);

        let result = resolve_tax_year_config(&store, &key).await;

        assert_eq!(
            result,
            Err(StoreError::InvalidConfiguration(ConfigurationError::Gap {
                table: "irpef",
                index: 1,
                expected: dec!(15000),
                found: dec!(16000),
            }))
        );
    }

    #[tokio::test]
    async fn resolve_attaches_bonus_for_the_year() {
        let mut store = seeded_store();
        let bonus = TaxCutBonus::new(
            vec![DiscountBand {
                max_income: dec!(20000),
                discount: Percentage::new(dec!(5.3)),
            }],
            None,
        )
        .unwrap();
        store.insert_tax_cut_bonus(2025, bonus.clone());
        let key = RuleKey::new(2025, ContractType::Professional);

        let config = resolve_tax_year_config(&store, &key).await.unwrap();

        assert_eq!(config.bonus(), Some(&bonus));
    }

    #[tokio::test]
    async fn resolve_works_through_trait_object() {
        let store: Box<dyn RuleStore> = Box::new(seeded_store());
        let key = RuleKey::new(2025, ContractType::Professional);

        let config = resolve_tax_year_config(store.as_ref(), &key).await;

        assert!(config.is_ok());
    }
}
