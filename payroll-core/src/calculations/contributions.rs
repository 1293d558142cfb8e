//! Worker and employer social-security contributions.

use rust_decimal::Decimal;

use crate::{ContractType, ContributionRates, EmployerContributions, WorkerContributions};

impl ContributionRates {
    /// Contributions withheld from `gross`.
    pub fn worker_contributions(
        &self,
        gross: Decimal,
    ) -> WorkerContributions {
        WorkerContributions {
            inps: self.inps_worker.of(gross),
            ffc: self.ffc_worker.of(gross),
            solidarity: self.solidarity_worker.of(gross),
            total: self.worker_total().of(gross),
        }
    }

    /// Contributions the employer pays on `gross`. INAIL is zero for
    /// INAIL-exempt contracts whatever the configured rate.
    pub fn employer_contributions(
        &self,
        gross: Decimal,
        contract_type: ContractType,
    ) -> EmployerContributions {
        let inail = if contract_type.is_inail_exempt() {
            Decimal::ZERO
        } else {
            self.inail_employer.of(gross)
        };
        let inps = self.inps_employer.of(gross);
        let ffc = self.ffc_employer.of(gross);
        let solidarity = self.solidarity_employer.of(gross);

        EmployerContributions {
            inps,
            inail,
            ffc,
            solidarity,
            total: inps + inail + ffc + solidarity,
        }
    }
}
