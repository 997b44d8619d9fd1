//! Test fixtures shared by the unit tests
//!
//! Provides a throwaway database with one workspace and account, plus terse
//! builders for the records tests need.

use chrono::NaiveDate;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{
    Budget, Category, ImportRule, IncomeSource, Merchant, NewImportRule, NewMerchant,
    NewRecurringPayment, NewTransaction, PatternType, RecurringPayment, Transaction,
};
use crate::store::{Store, TransactionQuery};

pub struct Fixture {
    pub db: Database,
    pub workspace_id: i64,
    pub account_id: i64,
}

impl Fixture {
    pub fn new() -> Self {
        let db = Database::in_memory().expect("Failed to create test database");
        let workspace_id = db.upsert_workspace("Test").unwrap();
        let account_id = db.upsert_account(workspace_id, "Checking").unwrap();
        Self {
            db,
            workspace_id,
            account_id,
        }
    }

    pub fn category(&self, name: &str) -> i64 {
        self.db
            .create_category(self.workspace_id, name, None)
            .unwrap()
    }

    pub fn merchant(&self, name: &str, patterns: &[&str], category_id: Option<i64>) -> i64 {
        self.db
            .create_merchant(
                self.workspace_id,
                &NewMerchant {
                    name: name.to_string(),
                    patterns: patterns.iter().map(|p| p.to_string()).collect(),
                    category_id,
                    ..Default::default()
                },
            )
            .unwrap()
    }

    pub fn rule(
        &self,
        pattern: &str,
        pattern_type: PatternType,
        priority: i32,
        category_id: Option<i64>,
        merchant_id: Option<i64>,
    ) -> i64 {
        self.db
            .insert_import_rule(
                self.workspace_id,
                &NewImportRule {
                    name: format!("rule {}", pattern),
                    pattern: pattern.to_string(),
                    pattern_type,
                    match_field: Default::default(),
                    category_id,
                    merchant_id,
                    priority,
                    active: true,
                },
            )
            .unwrap()
    }

    /// Insert an expense on the fixture account
    pub fn expense(&self, date: NaiveDate, description: &str, amount: f64) -> i64 {
        self.insert(NewTransaction {
            account_id: self.account_id,
            date,
            description: description.to_string(),
            amount,
            currency: "CZK".to_string(),
            is_expense: true,
            ..Default::default()
        })
    }

    pub fn insert(&self, tx: NewTransaction) -> i64 {
        self.db.insert_transaction(self.workspace_id, &tx).unwrap()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Store wrapper whose optional collections fail, and optionally its
/// transaction reads too
pub struct FlakyStore<'a> {
    pub inner: &'a Database,
    pub fail_transactions: bool,
}

fn unavailable<T>(what: &str) -> Result<T> {
    Err(Error::NotFound(format!("{} collection unavailable", what)))
}

impl Store for FlakyStore<'_> {
    fn list_import_rules(&self, _workspace_id: i64) -> Result<Vec<ImportRule>> {
        unavailable("import_rules")
    }

    fn list_merchants(&self, _workspace_id: i64) -> Result<Vec<Merchant>> {
        unavailable("merchants")
    }

    fn get_category(&self, id: i64) -> Result<Option<Category>> {
        self.inner.get_category(id)
    }

    fn get_merchant(&self, id: i64) -> Result<Option<Merchant>> {
        self.inner.get_merchant(id)
    }

    fn find_category_by_name(&self, _workspace_id: i64, _name: &str) -> Result<Option<Category>> {
        unavailable("categories")
    }

    fn list_transactions(
        &self,
        workspace_id: i64,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        if self.fail_transactions {
            return Err(Error::Io(std::io::Error::other("disk on fire")));
        }
        self.inner.list_transactions(workspace_id, query)
    }

    fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        self.inner.get_transaction(id)
    }

    fn set_transaction_classification(
        &self,
        id: i64,
        category_id: Option<i64>,
        merchant_id: Option<i64>,
    ) -> Result<()> {
        self.inner
            .set_transaction_classification(id, category_id, merchant_id)
    }

    fn insert_import_rule(&self, workspace_id: i64, rule: &NewImportRule) -> Result<i64> {
        self.inner.insert_import_rule(workspace_id, rule)
    }

    fn list_income_sources(&self, _workspace_id: i64) -> Result<Vec<IncomeSource>> {
        unavailable("income_sources")
    }

    fn income_hours(&self, _income_source_id: i64, _year: i32, _month: u32) -> Result<Option<f64>> {
        unavailable("income_hours")
    }

    fn list_budgets(&self, _workspace_id: i64) -> Result<Vec<Budget>> {
        unavailable("budgets")
    }

    fn insert_recurring_payment(
        &self,
        workspace_id: i64,
        payment: &NewRecurringPayment,
    ) -> Result<i64> {
        self.inner.insert_recurring_payment(workspace_id, payment)
    }

    fn list_due_recurring_payments(
        &self,
        workspace_id: i64,
        cutoff: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RecurringPayment>> {
        self.inner
            .list_due_recurring_payments(workspace_id, cutoff, limit)
    }
}
