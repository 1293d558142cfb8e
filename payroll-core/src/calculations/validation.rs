//! Eager validation of rate tables.
//!
//! Tables are checked once, when they are constructed, so a calculation
//! never has to second-guess its inputs.

use rust_decimal::Decimal;
use thiserror::Error;

/// A configuration that cannot be calculated with.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The first band of a table starts below zero.
    #[error("{table}: band 0 starts at {min}, below zero")]
    NegativeLowerBound { table: &'static str, min: Decimal },

    /// A band's upper bound is not above its lower bound.
    #[error("{table}: band {index} is empty ([{min}, {max}))")]
    EmptyBand {
        table: &'static str,
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    /// An unbounded band is followed by further bands.
    #[error("{table}: band {index} is unbounded but not last")]
    UnboundedBeforeLast { table: &'static str, index: usize },

    /// Bands are not sorted by their lower bound.
    #[error("{table}: band {index} starts at {min}, before the previous band")]
    Unordered {
        table: &'static str,
        index: usize,
        min: Decimal,
    },

    /// A band starts after the previous one ends.
    #[error("{table}: gap before band {index}: expected start {expected}, found {found}")]
    Gap {
        table: &'static str,
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    /// A band starts before the previous one ends.
    #[error("{table}: band {index} overlaps the previous band: expected start {expected}, found {found}")]
    Overlap {
        table: &'static str,
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    /// A percentage lies outside `[0, 100]`.
    #[error("{table}: {field} rate {rate} must lie between 0 and 100")]
    RateOutOfRange {
        table: &'static str,
        field: &'static str,
        rate: Decimal,
    },

    /// Worker contributions would consume the whole gross.
    #[error("worker contribution rates sum to {0}%, must be below 100%")]
    WorkerContributionsExceedGross(Decimal),

    /// A tax-cut bonus band is malformed.
    #[error("tax-cut bonus band {index}: {reason}")]
    InvalidBonusBand { index: usize, reason: &'static str },

    /// An inverse-solver setting is out of range.
    #[error("solver setting {name} is invalid: {reason}")]
    InvalidSolverSetting {
        name: &'static str,
        reason: &'static str,
    },
}

/// Checks that `bands` (as `(min, max)` pairs) are ordered, non-empty and
/// contiguous, with only the last band allowed to be unbounded.
pub(crate) fn check_contiguous<I>(
    table: &'static str,
    bands: I,
) -> Result<(), ConfigurationError>
where
    I: IntoIterator<Item = (Decimal, Option<Decimal>)>,
{
    let mut previous: Option<(Decimal, Option<Decimal>)> = None;

    for (index, (min, max)) in bands.into_iter().enumerate() {
        match previous {
            None if min < Decimal::ZERO => {
                return Err(ConfigurationError::NegativeLowerBound { table, min });
            }
            None => {}
            Some((_, None)) => {
                return Err(ConfigurationError::UnboundedBeforeLast {
                    table,
                    index: index - 1,
                });
            }
            Some((prev_min, _)) if min < prev_min => {
                return Err(ConfigurationError::Unordered { table, index, min });
            }
            Some((_, Some(expected))) if min > expected => {
                return Err(ConfigurationError::Gap {
                    table,
                    index,
                    expected,
                    found: min,
                });
            }
            Some((_, Some(expected))) if min < expected => {
                return Err(ConfigurationError::Overlap {
                    table,
                    index,
                    expected,
                    found: min,
                });
            }
            Some(_) => {}
        }

        if let Some(max) = max.filter(|max| *max <= min) {
            return Err(ConfigurationError::EmptyBand {
                table,
                index,
                min,
                max,
            });
        }

        previous = Some((min, max));
    }

    Ok(())
}
