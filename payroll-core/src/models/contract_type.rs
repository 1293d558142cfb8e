use std::fmt;

use serde::{Deserialize, Serialize};

/// Employment contract category. Contribution rates are configured per
/// `(year, contract type)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    Permanent,
    Loan,
    Trial,
    Youth,
    Professional,
    Amateur,
    Apprenticeship,
    TrainingAgreement,
}

impl ContractType {
    pub fn all() -> &'static [ContractType] {
        &[
            Self::Permanent,
            Self::Loan,
            Self::Trial,
            Self::Youth,
            Self::Professional,
            Self::Amateur,
            Self::Apprenticeship,
            Self::TrainingAgreement,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permanent => "PERMANENT",
            Self::Loan => "LOAN",
            Self::Trial => "TRIAL",
            Self::Youth => "YOUTH",
            Self::Professional => "PROFESSIONAL",
            Self::Amateur => "AMATEUR",
            Self::Apprenticeship => "APPRENTICESHIP",
            Self::TrainingAgreement => "TRAINING_AGREEMENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|ct| ct.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Apprenticeship contracts carry no employer INAIL contribution.
    pub fn is_inail_exempt(&self) -> bool {
        matches!(self, Self::Apprenticeship)
    }
}

impl fmt::Display for ContractType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
