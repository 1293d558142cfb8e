//! Where configurations come from.
//!
//! The calculators never look anything up; they are handed a fully
//! resolved [`TaxYearConfig`](crate::TaxYearConfig). This module is the
//! seam between them and whatever holds the rate tables: a [`RuleStore`]
//! returns raw rows for a year, region, municipality and contract type,
//! and [`resolve_tax_year_config`] validates them into a configuration.

pub mod memory;
pub mod rule_store;

pub use memory::InMemoryRuleStore;
pub use rule_store::{DEFAULT, RuleKey, RuleStore, StoreError, resolve_tax_year_config};
