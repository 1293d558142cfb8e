use serde::{Deserialize, Serialize};

use crate::Percentage;
use crate::calculations::ConfigurationError;

/// Flat social-security rates for one `(year, contract type)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRates {
    // Worker side, withheld from gross
    pub inps_worker: Percentage,
    pub ffc_worker: Percentage,
    pub solidarity_worker: Percentage,

    // Employer side, added on top of gross
    pub inps_employer: Percentage,
    pub inail_employer: Percentage,
    pub ffc_employer: Percentage,
    pub solidarity_employer: Percentage,
}

impl ContributionRates {
    pub fn worker_total(&self) -> Percentage {
        self.inps_worker + self.ffc_worker + self.solidarity_worker
    }

    pub fn employer_total(&self) -> Percentage {
        self.inps_employer + self.inail_employer + self.ffc_employer + self.solidarity_employer
    }

    /// Checks every rate lies in `[0, 100]` and that worker contributions
    /// leave something of the gross to tax.
    ///
    /// # Errors
    ///
    /// * [`ConfigurationError::RateOutOfRange`] for the first offending rate.
    /// * [`ConfigurationError::WorkerContributionsExceedGross`] when the worker
    ///   rates sum to 100 % or more.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let fields = [
            ("inps_worker", self.inps_worker),
            ("ffc_worker", self.ffc_worker),
            ("solidarity_worker", self.solidarity_worker),
            ("inps_employer", self.inps_employer),
            ("inail_employer", self.inail_employer),
            ("ffc_employer", self.ffc_employer),
            ("solidarity_employer", self.solidarity_employer),
        ];
        if let Some(&(field, rate)) = fields.iter().find(|(_, rate)| !rate.is_valid_rate()) {
            return Err(ConfigurationError::RateOutOfRange {
                table: "contribution rates",
                field,
                rate: rate.points(),
            });
        }

        let worker_total = self.worker_total();
        if worker_total >= Percentage::ONE_HUNDRED {
            return Err(ConfigurationError::WorkerContributionsExceedGross(
                worker_total.points(),
            ));
        }
        Ok(())
    }
}
