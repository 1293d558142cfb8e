//! Rate-table ingestion for `payroll-core`.

pub mod loader;

pub use loader::{
    BONUS_FILE, BRACKETS_FILE, BonusKind, BonusRecord, BracketRecord, CONTRIBUTIONS_FILE,
    ContributionRecord, DEDUCTIONS_FILE, DeductionRecord, LoaderError, RateScope,
    RateTableLoader,
};
