//! Storage collaborator interface
//!
//! The engine never reaches for a global handle: every operation receives a
//! `&dyn Store` and loads what it needs for that call. [`crate::db::Database`]
//! is the SQLite implementation.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{
    Budget, Category, ImportRule, IncomeSource, Merchant, NewImportRule, NewRecurringPayment,
    RecurringPayment, Transaction,
};

/// Filter for loading transactions.
///
/// Results are always ordered newest first (date descending, then id
/// descending), which is the load order every engine operation relies on.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub account_id: Option<i64>,
    /// Inclusive date range
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Only transactions without a category
    pub uncategorized_only: bool,
    /// Only expense transactions
    pub expenses_only: bool,
    /// Only transactions with a merchant assigned
    pub with_merchant: bool,
    pub limit: Option<usize>,
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_id(mut self, id: Option<i64>) -> Self {
        self.account_id = id;
        self
    }

    pub fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_range = Some((from, to));
        self
    }

    pub fn uncategorized_only(mut self, value: bool) -> Self {
        self.uncategorized_only = value;
        self
    }

    pub fn expenses_only(mut self, value: bool) -> Self {
        self.expenses_only = value;
        self
    }

    pub fn with_merchant(mut self, value: bool) -> Self {
        self.with_merchant = value;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Record access required by the engine
pub trait Store {
    /// Active import rules of a workspace
    fn list_import_rules(&self, workspace_id: i64) -> Result<Vec<ImportRule>>;

    fn list_merchants(&self, workspace_id: i64) -> Result<Vec<Merchant>>;

    fn get_category(&self, id: i64) -> Result<Option<Category>>;

    fn get_merchant(&self, id: i64) -> Result<Option<Merchant>>;

    /// Category whose name equals `name` exactly (case-sensitive)
    fn find_category_by_name(&self, workspace_id: i64, name: &str) -> Result<Option<Category>>;

    fn list_transactions(
        &self,
        workspace_id: i64,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>>;

    fn get_transaction(&self, id: i64) -> Result<Option<Transaction>>;

    /// Persist a transaction's category and merchant assignment
    fn set_transaction_classification(
        &self,
        id: i64,
        category_id: Option<i64>,
        merchant_id: Option<i64>,
    ) -> Result<()>;

    fn insert_import_rule(&self, workspace_id: i64, rule: &NewImportRule) -> Result<i64>;

    /// Active income sources of a workspace
    fn list_income_sources(&self, workspace_id: i64) -> Result<Vec<IncomeSource>>;

    /// Recorded hours for an hourly income source, if any
    fn income_hours(&self, income_source_id: i64, year: i32, month: u32) -> Result<Option<f64>>;

    /// Active budgets ordered by sort order, each with its items in sort order
    fn list_budgets(&self, workspace_id: i64) -> Result<Vec<Budget>>;

    fn insert_recurring_payment(
        &self,
        workspace_id: i64,
        payment: &NewRecurringPayment,
    ) -> Result<i64>;

    /// Active recurring payments due on or before `cutoff`, soonest first
    fn list_due_recurring_payments(
        &self,
        workspace_id: i64,
        cutoff: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RecurringPayment>>;
}
