pub mod calculations;
pub mod models;
pub mod store;

pub use calculations::{
    AdditionalTaxRule, BracketTable, ConfigurationError, DeductionSchedule, SolverError,
    SolverSettings, gross_from_net, net_from_gross,
};
pub use models::*;
pub use store::{InMemoryRuleStore, RuleKey, RuleStore, StoreError, resolve_tax_year_config};
