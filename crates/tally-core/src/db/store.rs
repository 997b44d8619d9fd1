//! SQLite implementation of the engine's storage interface

use chrono::NaiveDate;

use super::Database;
use crate::error::Result;
use crate::models::{
    Budget, Category, ImportRule, IncomeSource, Merchant, NewImportRule, NewRecurringPayment,
    RecurringPayment, Transaction,
};
use crate::store::{Store, TransactionQuery};

impl Store for Database {
    fn list_import_rules(&self, workspace_id: i64) -> Result<Vec<ImportRule>> {
        Database::list_import_rules(self, workspace_id)
    }

    fn list_merchants(&self, workspace_id: i64) -> Result<Vec<Merchant>> {
        Database::list_merchants(self, workspace_id)
    }

    fn get_category(&self, id: i64) -> Result<Option<Category>> {
        Database::get_category(self, id)
    }

    fn get_merchant(&self, id: i64) -> Result<Option<Merchant>> {
        Database::get_merchant(self, id)
    }

    fn find_category_by_name(&self, workspace_id: i64, name: &str) -> Result<Option<Category>> {
        Database::find_category_by_name(self, workspace_id, name)
    }

    fn list_transactions(
        &self,
        workspace_id: i64,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        Database::list_transactions(self, workspace_id, query)
    }

    fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        Database::get_transaction(self, id)
    }

    fn set_transaction_classification(
        &self,
        id: i64,
        category_id: Option<i64>,
        merchant_id: Option<i64>,
    ) -> Result<()> {
        Database::set_transaction_classification(self, id, category_id, merchant_id)
    }

    fn insert_import_rule(&self, workspace_id: i64, rule: &NewImportRule) -> Result<i64> {
        Database::insert_import_rule(self, workspace_id, rule)
    }

    fn list_income_sources(&self, workspace_id: i64) -> Result<Vec<IncomeSource>> {
        Database::list_income_sources(self, workspace_id)
    }

    fn income_hours(&self, income_source_id: i64, year: i32, month: u32) -> Result<Option<f64>> {
        Database::income_hours(self, income_source_id, year, month)
    }

    fn list_budgets(&self, workspace_id: i64) -> Result<Vec<Budget>> {
        Database::list_budgets(self, workspace_id)
    }

    fn insert_recurring_payment(
        &self,
        workspace_id: i64,
        payment: &NewRecurringPayment,
    ) -> Result<i64> {
        Database::insert_recurring_payment(self, workspace_id, payment)
    }

    fn list_due_recurring_payments(
        &self,
        workspace_id: i64,
        cutoff: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RecurringPayment>> {
        Database::list_due_recurring_payments(self, workspace_id, cutoff, limit)
    }
}
