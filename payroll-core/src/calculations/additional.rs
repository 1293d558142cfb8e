//! Regional and municipal surtaxes (addizionali).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::non_negative;
use crate::calculations::{BracketTable, ConfigurationError};
use crate::{BracketRow, Percentage};

/// A surtax levied by a region or municipality on taxable income.
///
/// Which rule applies to a given `(year, region, municipality)` is decided
/// by the configuration store; the rule itself is already resolved.
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::{AdditionalTaxRule, BracketRow, Percentage};
///
/// let flat = AdditionalTaxRule::Flat { rate: Percentage::new(dec!(0.8)) };
/// assert_eq!(flat.apply(dec!(30000)), dec!(240));
///
/// let progressive = AdditionalTaxRule::progressive(vec![
///     BracketRow::new(dec!(0), Some(dec!(15000)), dec!(1.23)),
///     BracketRow::new(dec!(15000), None, dec!(1.58)),
/// ])
/// .unwrap();
/// assert_eq!(progressive.apply(dec!(30000)), dec!(421.50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdditionalTaxRule {
    Flat { rate: Percentage },
    Progressive { brackets: BracketTable },
}

impl AdditionalTaxRule {
    /// A rule that levies nothing.
    pub fn none() -> Self {
        Self::Flat {
            rate: Percentage::ZERO,
        }
    }

    /// Builds a progressive rule from rate rows.
    ///
    /// A single row starting at zero with no upper bound is the same thing
    /// as a flat rate and is stored as [`AdditionalTaxRule::Flat`].
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigurationError`] raised by [`BracketTable::with_name`].
    pub fn progressive(rows: Vec<BracketRow>) -> Result<Self, ConfigurationError> {
        let open_single_row =
            matches!(rows.as_slice(), [row] if row.min.is_zero() && row.max.is_none());
        if open_single_row {
            let rule = Self::Flat { rate: rows[0].rate };
            rule.validate("additional tax")?;
            return Ok(rule);
        }
        Ok(Self::Progressive {
            brackets: BracketTable::with_name("additional tax", rows)?,
        })
    }

    /// Checks a flat rate lies in `[0, 100]`. Progressive tables are
    /// validated when built.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::RateOutOfRange`] naming `table`.
    pub fn validate(
        &self,
        table: &'static str,
    ) -> Result<(), ConfigurationError> {
        match self {
            Self::Flat { rate } if !rate.is_valid_rate() => Err(ConfigurationError::RateOutOfRange {
                table,
                field: "flat rate",
                rate: rate.points(),
            }),
            _ => Ok(()),
        }
    }

    /// Surtax due on `base`. Negative bases are treated as zero.
    ///
    /// # Arguments
    ///
    /// * `base` - Taxable income the surtax is levied on
    ///
    /// # Returns
    ///
    /// `rate × base` for a flat rule, the progressive sum otherwise.
    pub fn apply(
        &self,
        base: Decimal,
    ) -> Decimal {
        match self {
            Self::Flat { rate } => rate.of(non_negative(base)),
            Self::Progressive { brackets } => brackets.apply(base),
        }
    }
}

impl Default for AdditionalTaxRule {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn none_levies_nothing() {
        assert_eq!(AdditionalTaxRule::none().apply(dec!(100000)), dec!(0));
    }

    #[test]
    fn flat_applies_rate_to_whole_base() {
        let rule = AdditionalTaxRule::Flat {
            rate: Percentage::new(dec!(1.73)),
        };

        assert_eq!(rule.apply(dec!(13359)), dec!(231.1107));
    }

    #[test]
    fn flat_clamps_negative_base() {
        let rule = AdditionalTaxRule::Flat {
            rate: Percentage::new(dec!(1.73)),
        };

        assert_eq!(rule.apply(dec!(-100)), dec!(0));
    }

    #[test]
    fn progressive_applies_each_band_to_its_slice() {
        let rule = AdditionalTaxRule::progressive(vec![
            BracketRow::new(dec!(0), Some(dec!(15000)), dec!(1.23)),
            BracketRow::new(dec!(15000), Some(dec!(28000)), dec!(1.58)),
            BracketRow::new(dec!(28000), None, dec!(1.73)),
        ])
        .unwrap();

        // 184.50 + 205.40 + 12000 × 1.73%
        assert_eq!(rule.apply(dec!(40000)), dec!(597.50));
    }

    #[test]
    fn progressive_with_single_open_row_becomes_flat() {
        let rule =
            AdditionalTaxRule::progressive(vec![BracketRow::new(dec!(0), None, dec!(0.8))]).unwrap();

        assert_eq!(
            rule,
            AdditionalTaxRule::Flat {
                rate: Percentage::new(dec!(0.8))
            }
        );
    }

    #[test]
    fn progressive_with_exemption_threshold_stays_progressive() {
        let rule =
            AdditionalTaxRule::progressive(vec![BracketRow::new(dec!(10000), None, dec!(0.8))])
                .unwrap();

        assert!(matches!(rule, AdditionalTaxRule::Progressive { .. }));
        assert_eq!(rule.apply(dec!(9000)), dec!(0));
    }

    #[test]
    fn progressive_rejects_gap() {
        let result = AdditionalTaxRule::progressive(vec![
            BracketRow::new(dec!(0), Some(dec!(15000)), dec!(1.23)),
            BracketRow::new(dec!(15500), None, dec!(1.58)),
        ]);

        assert!(matches!(result, Err(ConfigurationError::Gap { .. })));
    }

    #[test]
    fn validate_rejects_negative_flat_rate() {
        let rule = AdditionalTaxRule::Flat {
            rate: Percentage::new(dec!(-0.5)),
        };

        assert_eq!(
            rule.validate("regional addition"),
            Err(ConfigurationError::RateOutOfRange {
                table: "regional addition",
                field: "flat rate",
                rate: dec!(-0.5),
            })
        );
    }
}
