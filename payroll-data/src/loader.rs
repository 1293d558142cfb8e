//! CSV loaders for payroll rate tables.
//!
//! Up to four files describe one or more tax years. Rates are percentage points
//! (`23` means 23 %); an empty `max` means the band is unbounded.
//!
//! ## `brackets.csv`
//!
//! | Column | Notes |
//! |----------------|-------------------------------------------------|
//! | `tax_year` | e.g. `2025` |
//! | `scope` | `IRPEF`, `REGIONAL` or `MUNICIPAL` |
//! | `region` | Ignored for `IRPEF`; empty means `DEFAULT` |
//! | `municipality` | Only read for `MUNICIPAL`; empty means `DEFAULT` |
//! | `min`, `max` | Band bounds |
//! | `rate` | Percentage points |
//!
//! A regional or municipal group made of a single row from 0 with no upper
//! bound is a flat surtax.
//!
//! ## `deductions.csv`
//!
//! `tax_year,min,max,amount,slope`. The deduction inside a band is
//! `amount + slope × (income − min)`, floored at zero.
//!
//! ## `contributions.csv`
//!
//! `tax_year,contract_type,inps_worker,ffc_worker,solidarity_worker,inps_employer,inail_employer,ffc_employer,solidarity_employer`
//!
//! `contract_type` is one of the [`ContractType`] codes, e.g. `PROFESSIONAL`.
//!
//! ## `bonus.csv` (optional)
//!
//! | Column | Notes |
//! |--------------------------------|-----------------------------------------|
//! | `tax_year` | e.g. `2025` |
//! | `kind` | `DISCOUNT` or `EXTRA` |
//! | `max_income`, `discount` | `DISCOUNT` rows: percentage cut on IRPEF up to `max_income` |
//! | `full_amount`, `full_to`, `fade_to` | `EXTRA` row: flat deduction fading to zero |
//!
//! Columns not used by a row's kind are left empty. At most one `EXTRA` row
//! per year.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use payroll_core::store::rule_store::normalize_code;
use payroll_core::{
    AdditionalTaxRule, BracketRow, BracketTable, ConfigurationError, ContractType,
    ContributionRates, DeductionRule, DeductionSchedule, DiscountBand, ExtraDeduction,
    InMemoryRuleStore, Percentage, TaxCutBonus,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub const BRACKETS_FILE: &str = "brackets.csv";
pub const DEDUCTIONS_FILE: &str = "deductions.csv";
pub const CONTRIBUTIONS_FILE: &str = "contributions.csv";
pub const BONUS_FILE: &str = "bonus.csv";

/// Errors that can occur when loading rate tables.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unknown scope '{scope}' on row {row} (expected IRPEF, REGIONAL or MUNICIPAL)")]
    InvalidScope { scope: String, row: usize },

    #[error("Unknown contract type '{code}' on row {row}")]
    InvalidContractType { code: String, row: usize },

    #[error("Unknown bonus kind '{kind}' on row {row} (expected DISCOUNT or EXTRA)")]
    InvalidBonusKind { kind: String, row: usize },

    #[error("Missing {field} on row {row}")]
    MissingField { field: &'static str, row: usize },

    #[error("Second EXTRA bonus row for {tax_year} on row {row}")]
    DuplicateExtraDeduction { tax_year: i32, row: usize },

    #[error("Invalid {group}: {source}")]
    InvalidTable {
        group: String,
        #[source]
        source: ConfigurationError,
    },
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        LoaderError::CsvParse(err.to_string())
    }
}

/// Which table a bracket row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RateScope {
    Irpef,
    Regional,
    Municipal,
}

impl RateScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IRPEF" => Some(Self::Irpef),
            "REGIONAL" => Some(Self::Regional),
            "MUNICIPAL" => Some(Self::Municipal),
            _ => None,
        }
    }
}

/// Row kind in `bonus.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusKind {
    Discount,
    Extra,
}

impl BonusKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DISCOUNT" => Some(Self::Discount),
            "EXTRA" => Some(Self::Extra),
            _ => None,
        }
    }
}

/// A single record from `brackets.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub scope: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub municipality: String,
    pub min: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

/// A single record from `deductions.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeductionRecord {
    pub tax_year: i32,
    pub min: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max: Option<Decimal>,
    pub amount: Decimal,
    pub slope: Decimal,
}

/// A single record from `contributions.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContributionRecord {
    pub tax_year: i32,
    pub contract_type: String,
    pub inps_worker: Decimal,
    pub ffc_worker: Decimal,
    pub solidarity_worker: Decimal,
    pub inps_employer: Decimal,
    pub inail_employer: Decimal,
    pub ffc_employer: Decimal,
    pub solidarity_employer: Decimal,
}

/// A single record from `bonus.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BonusRecord {
    pub tax_year: i32,
    pub kind: String,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub discount: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub full_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub full_to: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub fade_to: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn parse_records<R, T>(reader: R) -> Result<Vec<T>, LoaderError>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let record: T = result?;
        records.push(record);
    }

    Ok(records)
}

fn open(path: &Path) -> Result<File, LoaderError> {
    File::open(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn required(
    value: Option<Decimal>,
    field: &'static str,
    row: usize,
) -> Result<Decimal, LoaderError> {
    value.ok_or(LoaderError::MissingField { field, row })
}

/// Key of one bracket table: year, scope, region, municipality.
type BracketGroup = (i32, RateScope, String, String);

/// Loader for payroll rate tables from CSV files.
///
/// Records are grouped into tables, sorted by `min`, validated, and inserted
/// into an [`InMemoryRuleStore`]. Inserting replaces any rows already stored
/// under the same key, so loading is idempotent.
pub struct RateTableLoader;

impl RateTableLoader {
    pub fn parse_brackets<R: Read>(reader: R) -> Result<Vec<BracketRecord>, LoaderError> {
        parse_records(reader)
    }

    pub fn parse_deductions<R: Read>(reader: R) -> Result<Vec<DeductionRecord>, LoaderError> {
        parse_records(reader)
    }

    pub fn parse_contributions<R: Read>(
        reader: R
    ) -> Result<Vec<ContributionRecord>, LoaderError> {
        parse_records(reader)
    }

    pub fn parse_bonuses<R: Read>(reader: R) -> Result<Vec<BonusRecord>, LoaderError> {
        parse_records(reader)
    }

    /// Load bracket records into `store`, returning the number of rows loaded.
    ///
    /// IRPEF groups are checked as a [`BracketTable`]; regional and municipal
    /// groups as an [`AdditionalTaxRule`].
    pub fn load_brackets(
        store: &mut InMemoryRuleStore,
        records: &[BracketRecord],
    ) -> Result<usize, LoaderError> {
        let mut groups: BTreeMap<BracketGroup, Vec<BracketRow>> = BTreeMap::new();

        for (index, record) in records.iter().enumerate() {
            let scope = RateScope::parse(&record.scope).ok_or_else(|| LoaderError::InvalidScope {
                scope: record.scope.clone(),
                row: index + 1,
            })?;
            let (region, municipality) = match scope {
                RateScope::Irpef => (String::new(), String::new()),
                RateScope::Regional => (normalize_code(&record.region), String::new()),
                RateScope::Municipal => (
                    normalize_code(&record.region),
                    normalize_code(&record.municipality),
                ),
            };

            groups
                .entry((record.tax_year, scope, region, municipality))
                .or_default()
                .push(BracketRow::new(record.min, record.max, record.rate));
        }

        let mut loaded = 0;
        for ((tax_year, scope, region, municipality), mut rows) in groups {
            rows.sort_by(|a, b| a.min.cmp(&b.min));
            let count = rows.len();

            match scope {
                RateScope::Irpef => {
                    BracketTable::with_name("irpef", rows.clone()).map_err(|source| {
                        LoaderError::InvalidTable {
                            group: format!("IRPEF table for {tax_year}"),
                            source,
                        }
                    })?;
                    store.insert_irpef_rows(tax_year, rows);
                }
                RateScope::Regional => {
                    AdditionalTaxRule::progressive(rows.clone()).map_err(|source| {
                        LoaderError::InvalidTable {
                            group: format!("regional table for {tax_year} / {region}"),
                            source,
                        }
                    })?;
                    store.insert_regional_rows(tax_year, &region, rows);
                }
                RateScope::Municipal => {
                    AdditionalTaxRule::progressive(rows.clone()).map_err(|source| {
                        LoaderError::InvalidTable {
                            group: format!(
                                "municipal table for {tax_year} / {region} / {municipality}"
                            ),
                            source,
                        }
                    })?;
                    store.insert_municipal_rows(tax_year, &region, &municipality, rows);
                }
            }

            debug!(tax_year, ?scope, %region, %municipality, rows = count, "Loaded bracket table");
            loaded += count;
        }

        Ok(loaded)
    }

    /// Load deduction records into `store`, returning the number of rows loaded.
    pub fn load_deductions(
        store: &mut InMemoryRuleStore,
        records: &[DeductionRecord],
    ) -> Result<usize, LoaderError> {
        let mut groups: BTreeMap<i32, Vec<DeductionRule>> = BTreeMap::new();

        for record in records {
            groups.entry(record.tax_year).or_default().push(DeductionRule {
                min: record.min,
                max: record.max,
                amount: record.amount,
                slope: record.slope,
            });
        }

        let mut loaded = 0;
        for (tax_year, mut rules) in groups {
            rules.sort_by(|a, b| a.min.cmp(&b.min));
            DeductionSchedule::new(rules.clone()).map_err(|source| LoaderError::InvalidTable {
                group: format!("deduction schedule for {tax_year}"),
                source,
            })?;

            loaded += rules.len();
            store.insert_deduction_rules(tax_year, rules);
        }

        Ok(loaded)
    }

    /// Load contribution records into `store`, returning the number of rows
    /// loaded. A later row for the same year and contract type replaces an
    /// earlier one.
    pub fn load_contributions(
        store: &mut InMemoryRuleStore,
        records: &[ContributionRecord],
    ) -> Result<usize, LoaderError> {
        for (index, record) in records.iter().enumerate() {
            let contract_type = ContractType::parse(&record.contract_type).ok_or_else(|| {
                LoaderError::InvalidContractType {
                    code: record.contract_type.clone(),
                    row: index + 1,
                }
            })?;

            let rates = ContributionRates {
                inps_worker: Percentage::new(record.inps_worker),
                ffc_worker: Percentage::new(record.ffc_worker),
                solidarity_worker: Percentage::new(record.solidarity_worker),
                inps_employer: Percentage::new(record.inps_employer),
                inail_employer: Percentage::new(record.inail_employer),
                ffc_employer: Percentage::new(record.ffc_employer),
                solidarity_employer: Percentage::new(record.solidarity_employer),
            };
            rates.validate().map_err(|source| LoaderError::InvalidTable {
                group: format!(
                    "contribution rates for {} / {contract_type}",
                    record.tax_year
                ),
                source,
            })?;

            store.insert_contribution_rates(record.tax_year, contract_type, rates);
        }

        Ok(records.len())
    }

    /// Load tax-cut bonus records into `store`, returning the number of rows
    /// loaded.
    ///
    /// Rows are grouped per year into one [`TaxCutBonus`]; discount bands are
    /// sorted by `max_income` before validation.
    pub fn load_bonuses(
        store: &mut InMemoryRuleStore,
        records: &[BonusRecord],
    ) -> Result<usize, LoaderError> {
        let mut groups: BTreeMap<i32, (Vec<DiscountBand>, Option<ExtraDeduction>)> =
            BTreeMap::new();

        for (index, record) in records.iter().enumerate() {
            let row = index + 1;
            let kind = BonusKind::parse(&record.kind).ok_or_else(|| LoaderError::InvalidBonusKind {
                kind: record.kind.clone(),
                row,
            })?;
            let (bands, extra) = groups.entry(record.tax_year).or_default();

            match kind {
                BonusKind::Discount => bands.push(DiscountBand {
                    max_income: required(record.max_income, "max_income", row)?,
                    discount: Percentage::new(required(record.discount, "discount", row)?),
                }),
                BonusKind::Extra => {
                    if extra.is_some() {
                        return Err(LoaderError::DuplicateExtraDeduction {
                            tax_year: record.tax_year,
                            row,
                        });
                    }
                    *extra = Some(ExtraDeduction {
                        full_amount: required(record.full_amount, "full_amount", row)?,
                        full_to: required(record.full_to, "full_to", row)?,
                        fade_to: required(record.fade_to, "fade_to", row)?,
                    });
                }
            }
        }

        for (tax_year, (mut bands, extra)) in groups {
            bands.sort_by(|a, b| a.max_income.cmp(&b.max_income));
            let bonus = TaxCutBonus::new(bands, extra).map_err(|source| {
                LoaderError::InvalidTable {
                    group: format!("tax-cut bonus for {tax_year}"),
                    source,
                }
            })?;
            debug!(
                tax_year,
                bands = bonus.discount_bands().len(),
                extra = bonus.extra_deduction().is_some(),
                "Loaded tax-cut bonus"
            );
            store.insert_tax_cut_bonus(tax_year, bonus);
        }

        Ok(records.len())
    }

    /// Build a store from the CSV files in `dir`.
    ///
    /// `brackets.csv` and `contributions.csv` are required; a missing
    /// `deductions.csv` means no deductions for any year, and a missing
    /// `bonus.csv` means no tax-cut bonus.
    pub fn load_dir(dir: &Path) -> Result<InMemoryRuleStore, LoaderError> {
        let mut store = InMemoryRuleStore::new();

        let brackets = Self::parse_brackets(open(&dir.join(BRACKETS_FILE))?)?;
        let bracket_rows = Self::load_brackets(&mut store, &brackets)?;

        let deductions_path = dir.join(DEDUCTIONS_FILE);
        let deduction_rows = if deductions_path.exists() {
            let deductions = Self::parse_deductions(open(&deductions_path)?)?;
            Self::load_deductions(&mut store, &deductions)?
        } else {
            debug!(path = %deductions_path.display(), "No deduction file; skipping");
            0
        };

        let contributions = Self::parse_contributions(open(&dir.join(CONTRIBUTIONS_FILE))?)?;
        let contribution_rows = Self::load_contributions(&mut store, &contributions)?;

        let bonus_path = dir.join(BONUS_FILE);
        let bonus_rows = if bonus_path.exists() {
            let bonuses = Self::parse_bonuses(open(&bonus_path)?)?;
            Self::load_bonuses(&mut store, &bonuses)?
        } else {
            debug!(path = %bonus_path.display(), "No bonus file; skipping");
            0
        };

        info!(
            dir = %dir.display(),
            bracket_rows,
            deduction_rows,
            contribution_rows,
            bonus_rows,
            "Loaded rate tables"
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use payroll_core::RuleStore;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const BRACKETS_CSV: &str = "tax_year,scope,region,municipality,min,max,rate
2025,IRPEF,,,28000,50000,35
2025,IRPEF,,,0,28000,23
2025,IRPEF,,,50000,,43
2025,REGIONAL,,,0,,1.23
2025,REGIONAL,Lombardia,,0,15000,1.23
2025,REGIONAL,Lombardia,,15000,,1.58
2025,MUNICIPAL,LOMBARDIA,MILANO,0,,0.8
";

    const CONTRIBUTIONS_CSV: &str = "tax_year,contract_type,inps_worker,ffc_worker,solidarity_worker,inps_employer,inail_employer,ffc_employer,solidarity_employer
2025,PROFESSIONAL,9.19,1.25,0.5,29.58,7.9,6.25,0
2025,apprenticeship,5.84,1.25,0.5,11.61,7.9,6.25,0
";

    const BONUS_CSV: &str = "tax_year,kind,max_income,discount,full_amount,full_to,fade_to
2025,DISCOUNT,15000,5.3,,,
2025,DISCOUNT,8500,7.1,,,
2025,DISCOUNT,20000,4.8,,,
2025,EXTRA,,,1000,32000,40000
";

    // =========================================================================
    // parse
    // =========================================================================

    #[test]
    fn test_parse_brackets_unbounded_max() {
        let records = RateTableLoader::parse_brackets(BRACKETS_CSV.as_bytes())
            .expect("Failed to parse CSV");

        assert_eq!(records.len(), 7);
        assert_eq!(
            records[2],
            BracketRecord {
                tax_year: 2025,
                scope: "IRPEF".to_string(),
                region: String::new(),
                municipality: String::new(),
                min: dec!(50000),
                max: None,
                rate: dec!(43),
            }
        );
    }

    #[test]
    fn test_parse_deductions() {
        let csv = "tax_year,min,max,amount,slope\n2025,0,15000,1955,0\n2025,15000,28000,3100,-0.0915";

        let records = RateTableLoader::parse_deductions(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].max, Some(dec!(28000)));
        assert_eq!(records[1].slope, dec!(-0.0915));
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "tax_year,scope,min\n2025,IRPEF,0";

        let err = RateTableLoader::parse_brackets(csv.as_bytes())
            .expect_err("Should fail for missing column");

        let LoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "tax_year,min,max,amount,slope\n2025,abc,15000,1955,0";

        let result = RateTableLoader::parse_deductions(csv.as_bytes());

        assert!(matches!(result, Err(LoaderError::CsvParse(_))));
    }

    #[test]
    fn test_parse_empty_csv() {
        let csv = "tax_year,min,max,amount,slope\n";

        let records = RateTableLoader::parse_deductions(csv.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }

    #[test]
    fn test_rate_scope_parse() {
        assert_eq!(RateScope::parse("irpef"), Some(RateScope::Irpef));
        assert_eq!(RateScope::parse(" REGIONAL "), Some(RateScope::Regional));
        assert_eq!(RateScope::parse("Municipal"), Some(RateScope::Municipal));
        assert_eq!(RateScope::parse("NATIONAL"), None);
    }

    #[test]
    fn test_bonus_kind_parse() {
        assert_eq!(BonusKind::parse("discount"), Some(BonusKind::Discount));
        assert_eq!(BonusKind::parse(" EXTRA "), Some(BonusKind::Extra));
        assert_eq!(BonusKind::parse("CREDIT"), None);
    }

    #[test]
    fn test_parse_bonuses_empty_columns() {
        let records = RateTableLoader::parse_bonuses(BONUS_CSV.as_bytes())
            .expect("Failed to parse CSV");

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].max_income, Some(dec!(15000)));
        assert_eq!(records[0].full_amount, None);
        assert_eq!(records[3].max_income, None);
        assert_eq!(records[3].fade_to, Some(dec!(40000)));
    }

    // =========================================================================
    // load
    // =========================================================================

    #[tokio::test]
    async fn test_load_bonuses_sorts_bands() {
        let mut store = InMemoryRuleStore::new();
        let records = RateTableLoader::parse_bonuses(BONUS_CSV.as_bytes())
            .expect("Failed to parse CSV");

        let loaded = RateTableLoader::load_bonuses(&mut store, &records).expect("Failed to load");

        assert_eq!(loaded, 4);
        let bonus = store
            .tax_cut_bonus(2025)
            .await
            .expect("lookup")
            .expect("bonus for 2025");
        let ceilings: Vec<_> = bonus.discount_bands().iter().map(|b| b.max_income).collect();
        assert_eq!(ceilings, vec![dec!(8500), dec!(15000), dec!(20000)]);
        assert_eq!(
            bonus.extra_deduction(),
            Some(&ExtraDeduction {
                full_amount: dec!(1000),
                full_to: dec!(32000),
                fade_to: dec!(40000),
            })
        );
    }

    #[test]
    fn test_load_bonuses_rejects_missing_field() {
        let csv = "tax_year,kind,max_income,discount,full_amount,full_to,fade_to\n2025,DISCOUNT,8500,,,,";
        let records = RateTableLoader::parse_bonuses(csv.as_bytes()).expect("Failed to parse CSV");

        let result = RateTableLoader::load_bonuses(&mut InMemoryRuleStore::new(), &records);

        match result {
            Err(LoaderError::MissingField { field, row }) => {
                assert_eq!(field, "discount");
                assert_eq!(row, 1);
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_load_bonuses_rejects_second_extra_row() {
        let csv = "tax_year,kind,max_income,discount,full_amount,full_to,fade_to
2025,EXTRA,,,1000,32000,40000
2025,EXTRA,,,500,20000,30000";
        let records = RateTableLoader::parse_bonuses(csv.as_bytes()).expect("Failed to parse CSV");

        let result = RateTableLoader::load_bonuses(&mut InMemoryRuleStore::new(), &records);

        assert!(matches!(
            result,
            Err(LoaderError::DuplicateExtraDeduction {
                tax_year: 2025,
                row: 2
            })
        ));
    }

    #[test]
    fn test_load_bonuses_rejects_bad_fade_window() {
        let csv = "tax_year,kind,max_income,discount,full_amount,full_to,fade_to
2025,EXTRA,,,1000,40000,32000";
        let records = RateTableLoader::parse_bonuses(csv.as_bytes()).expect("Failed to parse CSV");

        let result = RateTableLoader::load_bonuses(&mut InMemoryRuleStore::new(), &records);

        assert!(matches!(
            result,
            Err(LoaderError::InvalidTable {
                source: ConfigurationError::InvalidBonusBand { .. },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_load_brackets_sorts_and_groups_rows() {
        let mut store = InMemoryRuleStore::new();
        let records = RateTableLoader::parse_brackets(BRACKETS_CSV.as_bytes())
            .expect("Failed to parse CSV");

        let loaded = RateTableLoader::load_brackets(&mut store, &records).expect("Failed to load");

        assert_eq!(loaded, 7);
        let irpef = store.irpef_rows(2025).await.expect("IRPEF rows");
        let mins: Vec<_> = irpef.iter().map(|row| row.min).collect();
        assert_eq!(mins, vec![dec!(0), dec!(28000), dec!(50000)]);

        let default_region = store.regional_rows(2025, "SICILIA").await.expect("lookup");
        assert_eq!(
            default_region,
            Some(vec![BracketRow::new(dec!(0), None, dec!(1.23))])
        );

        let lombardia = store.regional_rows(2025, "lombardia").await.expect("lookup");
        assert_eq!(lombardia.map(|rows| rows.len()), Some(2));
    }

    #[test]
    fn test_load_brackets_rejects_unknown_scope() {
        let csv = "tax_year,scope,region,municipality,min,max,rate\n2025,IRPEF,,,0,,23\n2025,PROVINCIAL,,,0,,1";
        let records = RateTableLoader::parse_brackets(csv.as_bytes()).expect("Failed to parse CSV");

        let result = RateTableLoader::load_brackets(&mut InMemoryRuleStore::new(), &records);

        match result {
            Err(LoaderError::InvalidScope { scope, row }) => {
                assert_eq!(scope, "PROVINCIAL");
                assert_eq!(row, 2);
            }
            other => panic!("expected InvalidScope, got {other:?}"),
        }
    }

    #[test]
    fn test_load_brackets_rejects_gap() {
        let csv = "tax_year,scope,region,municipality,min,max,rate\n2025,IRPEF,,,0,28000,23\n2025,IRPEF,,,30000,,35";
        let records = RateTableLoader::parse_brackets(csv.as_bytes()).expect("Failed to parse CSV");

        let result = RateTableLoader::load_brackets(&mut InMemoryRuleStore::new(), &records);

        match result {
            Err(LoaderError::InvalidTable { group, source }) => {
                assert_eq!(group, "IRPEF table for 2025");
                assert!(matches!(source, ConfigurationError::Gap { .. }));
            }
            other => panic!("expected InvalidTable, got {other:?}"),
        }
    }

    #[test]
    fn test_load_deductions_rejects_overlap() {
        let csv = "tax_year,min,max,amount,slope\n2025,0,15000,1955,0\n2025,14000,,3100,0";
        let records = RateTableLoader::parse_deductions(csv.as_bytes()).expect("Failed to parse CSV");

        let result = RateTableLoader::load_deductions(&mut InMemoryRuleStore::new(), &records);

        assert!(matches!(
            result,
            Err(LoaderError::InvalidTable {
                source: ConfigurationError::Overlap { .. },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_load_contributions_parses_contract_codes() {
        let mut store = InMemoryRuleStore::new();
        let records = RateTableLoader::parse_contributions(CONTRIBUTIONS_CSV.as_bytes())
            .expect("Failed to parse CSV");

        let loaded =
            RateTableLoader::load_contributions(&mut store, &records).expect("Failed to load");

        assert_eq!(loaded, 2);
        let apprentice = store
            .contribution_rates(2025, ContractType::Apprenticeship)
            .await
            .expect("rates");
        assert_eq!(apprentice.inps_worker, Percentage::new(dec!(5.84)));
    }

    #[test]
    fn test_load_contributions_rejects_unknown_contract() {
        let csv = "tax_year,contract_type,inps_worker,ffc_worker,solidarity_worker,inps_employer,inail_employer,ffc_employer,solidarity_employer\n2025,FREELANCE,9.19,1.25,0.5,29.58,7.9,6.25,0";
        let records =
            RateTableLoader::parse_contributions(csv.as_bytes()).expect("Failed to parse CSV");

        let result = RateTableLoader::load_contributions(&mut InMemoryRuleStore::new(), &records);

        assert!(matches!(
            result,
            Err(LoaderError::InvalidContractType { ref code, row: 1 }) if code == "FREELANCE"
        ));
    }

    #[test]
    fn test_load_contributions_rejects_rates_above_gross() {
        let csv = "tax_year,contract_type,inps_worker,ffc_worker,solidarity_worker,inps_employer,inail_employer,ffc_employer,solidarity_employer\n2025,PROFESSIONAL,60,40,0,0,0,0,0";
        let records =
            RateTableLoader::parse_contributions(csv.as_bytes()).expect("Failed to parse CSV");

        let result = RateTableLoader::load_contributions(&mut InMemoryRuleStore::new(), &records);

        assert!(matches!(
            result,
            Err(LoaderError::InvalidTable {
                source: ConfigurationError::WorkerContributionsExceedGross(_),
                ..
            })
        ));
    }

    #[test]
    fn test_load_is_idempotent() {
        let records = RateTableLoader::parse_brackets(BRACKETS_CSV.as_bytes())
            .expect("Failed to parse CSV");
        let mut once = InMemoryRuleStore::new();
        let mut twice = InMemoryRuleStore::new();

        RateTableLoader::load_brackets(&mut once, &records).expect("Failed to load");
        RateTableLoader::load_brackets(&mut twice, &records).expect("Failed to load");
        RateTableLoader::load_brackets(&mut twice, &records).expect("Failed to load");

        assert_eq!(once, twice);
    }
}
