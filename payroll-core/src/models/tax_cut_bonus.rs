use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Percentage;
use crate::calculations::ConfigurationError;

/// Percentage cut on net IRPEF for incomes up to `max_income`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountBand {
    pub max_income: Decimal,
    pub discount: Percentage,
}

/// Additional deduction paid in full up to `full_to`, fading linearly to
/// zero at `fade_to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraDeduction {
    pub full_amount: Decimal,
    pub full_to: Decimal,
    pub fade_to: Decimal,
}

/// Low-income tax-cut bonus, applied to IRPEF after the ordinary deduction.
///
/// Independent of the ordinary [`DeductionSchedule`](crate::DeductionSchedule):
/// it has its own bands and its own fade-out, and never touches the
/// regional or municipal surtaxes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaxCutBonus {
    discount_bands: Vec<DiscountBand>,
    extra_deduction: Option<ExtraDeduction>,
}

impl TaxCutBonus {
    /// Builds a validated bonus.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidBonusBand`] when the discount bands
    /// are not strictly ascending by `max_income`, a discount is outside
    /// `[0, 100]`, or the extra deduction has a negative amount or a fade
    /// window that does not satisfy `0 <= full_to < fade_to`.
    pub fn new(
        discount_bands: Vec<DiscountBand>,
        extra_deduction: Option<ExtraDeduction>,
    ) -> Result<Self, ConfigurationError> {
        for (index, band) in discount_bands.iter().enumerate() {
            if !band.discount.is_valid_rate() {
                return Err(ConfigurationError::InvalidBonusBand {
                    index,
                    reason: "discount must lie between 0 and 100",
                });
            }
            if index > 0 && band.max_income <= discount_bands[index - 1].max_income {
                return Err(ConfigurationError::InvalidBonusBand {
                    index,
                    reason: "discount bands must be strictly ascending",
                });
            }
        }

        if let Some(extra) = &extra_deduction {
            let index = discount_bands.len();
            if extra.full_amount < Decimal::ZERO {
                return Err(ConfigurationError::InvalidBonusBand {
                    index,
                    reason: "extra deduction amount must be non-negative",
                });
            }
            if extra.full_to < Decimal::ZERO || extra.fade_to <= extra.full_to {
                return Err(ConfigurationError::InvalidBonusBand {
                    index,
                    reason: "extra deduction requires 0 <= full_to < fade_to",
                });
            }
        }

        Ok(Self {
            discount_bands,
            extra_deduction,
        })
    }

    pub fn discount_bands(&self) -> &[DiscountBand] {
        &self.discount_bands
    }

    pub fn extra_deduction(&self) -> Option<&ExtraDeduction> {
        self.extra_deduction.as_ref()
    }
}
