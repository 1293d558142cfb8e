//! Progressive rate tables.
//!
//! Each row taxes only the slice of income inside `[min, max)`, so a
//! higher band never reaches back into income already taxed by a lower
//! one.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::{BracketRow, BracketTable};
//!
//! let table = BracketTable::new(vec![
//!     BracketRow::new(dec!(0), Some(dec!(15000)), dec!(23)),
//!     BracketRow::new(dec!(15000), Some(dec!(28000)), dec!(25)),
//!     BracketRow::new(dec!(28000), None, dec!(35)),
//! ])
//! .unwrap();
//!
//! // 15000 × 23% + 5000 × 25%
//! assert_eq!(table.apply(dec!(20000)), dec!(4700));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::BracketRow;
use crate::calculations::common::non_negative;
use crate::calculations::validation::{ConfigurationError, check_contiguous};

/// Ordered, contiguous set of [`BracketRow`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BracketRow>", into = "Vec<BracketRow>")]
pub struct BracketTable {
    rows: Vec<BracketRow>,
}

impl BracketTable {
    /// Builds a table, rejecting rows that are unordered, overlapping,
    /// non-contiguous or carry a rate outside `[0, 100]`.
    ///
    /// An empty table is valid and taxes nothing.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found.
    pub fn new(rows: Vec<BracketRow>) -> Result<Self, ConfigurationError> {
        Self::with_name("bracket table", rows)
    }

    /// As [`BracketTable::new`], naming the table in error messages.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found.
    pub fn with_name(
        table: &'static str,
        rows: Vec<BracketRow>,
    ) -> Result<Self, ConfigurationError> {
        check_contiguous(table, rows.iter().map(|row| (row.min, row.max)))?;

        if let Some(row) = rows.iter().find(|row| !row.rate.is_valid_rate()) {
            return Err(ConfigurationError::RateOutOfRange {
                table,
                field: "rate",
                rate: row.rate.points(),
            });
        }

        Ok(Self { rows })
    }

    /// The 2025 IRPEF schedule: 23 % up to 28 000, 35 % up to 50 000,
    /// 43 % above.
    pub fn irpef_2025() -> Self {
        Self {
            rows: vec![
                BracketRow::new(dec!(0), Some(dec!(28000)), dec!(23)),
                BracketRow::new(dec!(28000), Some(dec!(50000)), dec!(35)),
                BracketRow::new(dec!(50000), None, dec!(43)),
            ],
        }
    }

    pub fn rows(&self) -> &[BracketRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Progressive tax on `income`. Negative income is treated as zero.
    ///
    /// # Arguments
    ///
    /// * `income` - Taxable income
    ///
    /// # Returns
    ///
    /// The sum over every band of the band's rate times the slice of
    /// `income` falling inside it, unrounded. Income above an open-ended
    /// last band is taxed at that band's rate; above a bounded last band it
    /// is untaxed.
    pub fn apply(
        &self,
        income: Decimal,
    ) -> Decimal {
        let income = non_negative(income);
        self.rows
            .iter()
            .take_while(|row| row.min < income)
            .map(|row| row.rate.of(row.slice_of(income)))
            .sum()
    }
}

impl TryFrom<Vec<BracketRow>> for BracketTable {
    type Error = ConfigurationError;

    fn try_from(rows: Vec<BracketRow>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<BracketTable> for Vec<BracketRow> {
    fn from(table: BracketTable) -> Self {
        table.rows
    }
}
