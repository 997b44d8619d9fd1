//! Tally Core Library
//!
//! Classification and reconciliation engine for the Tally personal finance
//! tool:
//! - Pattern matching for rules, merchants and budget items
//! - Categorization engine (merchant > rule > bank category)
//! - Bulk categorization suggestions for repeated descriptions
//! - Budget reconciliation against actual spending
//! - Recurring payment detection
//! - SQLite storage behind the `Store` trait
//! - TOML configuration

pub mod budget;
pub mod categorize;
pub mod config;
pub mod db;
pub mod error;
pub mod matcher;
pub mod models;
pub mod recurring;
pub mod store;
pub mod suggest;

#[cfg(test)]
mod test_utils;

pub use budget::{
    compute_status, BudgetGroupStatus, BudgetItemStatus, BudgetSummary, IncomeSourceStatus,
    ItemStatus,
};
pub use categorize::{
    apply_bulk_categorization, apply_rules_to_transactions, create_rule_from_correction,
    map_bank_category, ApplyResult, Categorization, CategorizationEngine, MatchedBy,
};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use matcher::{CompiledPattern, WildcardPattern};
pub use recurring::{
    create_recurring_payment, detect_recurring, upcoming_payments, DetectionResult,
    UpcomingPayment,
};
pub use store::{Store, TransactionQuery};
pub use suggest::{get_suggestions, Suggestion};
