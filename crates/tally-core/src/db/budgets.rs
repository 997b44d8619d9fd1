//! Budget, budget item and income operations

use std::collections::HashMap;

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::{Budget, BudgetItem, IncomeSource, NewBudgetItem, NewIncomeSource};

impl Database {
    /// Create an active budget group
    pub fn create_budget(&self, workspace_id: i64, name: &str, sort_order: i32) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO budgets (workspace_id, name, sort_order) VALUES (?, ?, ?)",
            params![workspace_id, name, sort_order],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Activate or deactivate a budget group
    pub fn set_budget_active(&self, id: i64, active: bool) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE budgets SET is_active = ? WHERE id = ?",
            params![active as i32, id],
        )?;
        Ok(())
    }

    /// Add a line item to a budget
    pub fn create_budget_item(&self, budget_id: i64, item: &NewBudgetItem) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budget_items (budget_id, name, budgeted_amount, currency, frequency,
                                      match_pattern, match_pattern_type, match_field,
                                      match_category_id, match_merchant_id, match_account_id,
                                      sort_order, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                budget_id,
                item.name,
                item.budgeted_amount,
                item.currency,
                item.frequency.as_str(),
                item.match_pattern,
                item.match_pattern_type.as_str(),
                item.match_field.as_str(),
                item.match_category_id,
                item.match_merchant_id,
                item.match_account_id,
                item.sort_order,
                item.is_active as i32,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List active budgets with all their items, both in sort order
    pub fn list_budgets(&self, workspace_id: i64) -> Result<Vec<Budget>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, workspace_id, name, sort_order, is_active
            FROM budgets
            WHERE workspace_id = ? AND is_active = 1
            ORDER BY sort_order, id
            "#,
        )?;
        let mut budgets = stmt
            .query_map(params![workspace_id], |row| {
                let is_active: i64 = row.get(4)?;
                Ok(Budget {
                    id: row.get(0)?,
                    workspace_id: row.get(1)?,
                    name: row.get(2)?,
                    sort_order: row.get(3)?,
                    is_active: is_active != 0,
                    items: Vec::new(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT i.id, i.budget_id, i.name, i.budgeted_amount, i.currency, i.frequency,
                   i.match_pattern, i.match_pattern_type, i.match_field, i.match_category_id,
                   i.match_merchant_id, i.match_account_id, i.sort_order, i.is_active
            FROM budget_items i
            JOIN budgets b ON b.id = i.budget_id
            WHERE b.workspace_id = ? AND b.is_active = 1
            ORDER BY i.sort_order, i.id
            "#,
        )?;
        let items = stmt
            .query_map(params![workspace_id], |row| {
                let frequency: String = row.get(5)?;
                let pattern_type: String = row.get(7)?;
                let match_field: String = row.get(8)?;
                let is_active: i64 = row.get(13)?;
                Ok(BudgetItem {
                    id: row.get(0)?,
                    budget_id: row.get(1)?,
                    name: row.get(2)?,
                    budgeted_amount: row.get(3)?,
                    currency: row.get(4)?,
                    frequency: frequency.parse().unwrap_or_default(),
                    match_pattern: row.get(6)?,
                    match_pattern_type: pattern_type.parse().unwrap_or_default(),
                    match_field: match_field.parse().unwrap_or_default(),
                    match_category_id: row.get(9)?,
                    match_merchant_id: row.get(10)?,
                    match_account_id: row.get(11)?,
                    sort_order: row.get(12)?,
                    is_active: is_active != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut by_budget: HashMap<i64, Vec<BudgetItem>> = HashMap::new();
        for item in items {
            by_budget.entry(item.budget_id).or_default().push(item);
        }
        for budget in &mut budgets {
            budget.items = by_budget.remove(&budget.id).unwrap_or_default();
        }

        Ok(budgets)
    }

    /// Create an income source
    pub fn create_income_source(&self, workspace_id: i64, source: &NewIncomeSource) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO income_sources (workspace_id, name, income_type, amount, currency,
                                        default_hours, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                workspace_id,
                source.name,
                source.income_type.as_str(),
                source.amount,
                source.currency,
                source.default_hours,
                source.is_active as i32,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List active income sources by name
    pub fn list_income_sources(&self, workspace_id: i64) -> Result<Vec<IncomeSource>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, workspace_id, name, income_type, amount, currency, default_hours, is_active
            FROM income_sources
            WHERE workspace_id = ? AND is_active = 1
            ORDER BY name, id
            "#,
        )?;

        let sources = stmt
            .query_map(params![workspace_id], |row| {
                let income_type: String = row.get(3)?;
                let is_active: i64 = row.get(7)?;
                Ok(IncomeSource {
                    id: row.get(0)?,
                    workspace_id: row.get(1)?,
                    name: row.get(2)?,
                    income_type: income_type.parse().unwrap_or_default(),
                    amount: row.get(4)?,
                    currency: row.get(5)?,
                    default_hours: row.get(6)?,
                    is_active: is_active != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sources)
    }

    /// Record the hours worked for an hourly income source in a month
    pub fn set_income_hours(
        &self,
        income_source_id: i64,
        year: i32,
        month: u32,
        hours: f64,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO income_hours (income_source_id, year, month, hours)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(income_source_id, year, month) DO UPDATE SET hours = excluded.hours
            "#,
            params![income_source_id, year, month, hours],
        )?;
        Ok(())
    }

    /// Recorded hours for a month, if any
    pub fn income_hours(&self, income_source_id: i64, year: i32, month: u32) -> Result<Option<f64>> {
        let conn = self.conn()?;
        let hours = conn
            .query_row(
                "SELECT hours FROM income_hours WHERE income_source_id = ? AND year = ? AND month = ?",
                params![income_source_id, year, month],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hours)
    }
}
