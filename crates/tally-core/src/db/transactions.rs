//! Transaction operations

use rusqlite::{params, OptionalExtension};

use super::{format_date, parse_date, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction};
use crate::store::TransactionQuery;

const TRANSACTION_COLUMNS: &str = "id, workspace_id, account_id, date, description, raw_description,
     counterparty_account, bank_category, amount, currency, is_expense, category_id, merchant_id";

impl Database {
    /// Insert a transaction, returning its ID
    pub fn insert_transaction(&self, workspace_id: i64, tx: &NewTransaction) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (workspace_id, account_id, date, description, raw_description,
                                      counterparty_account, bank_category, amount, currency,
                                      is_expense, category_id, merchant_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                workspace_id,
                tx.account_id,
                format_date(tx.date),
                tx.description,
                tx.raw_description,
                tx.counterparty_account,
                tx.bank_category,
                tx.amount,
                tx.currency,
                tx.is_expense as i32,
                tx.category_id,
                tx.merchant_id,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List transactions matching a query, newest first
    pub fn list_transactions(
        &self,
        workspace_id: i64,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut conditions = vec!["workspace_id = ?".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(workspace_id)];

        if let Some(account_id) = query.account_id {
            conditions.push("account_id = ?".to_string());
            params_vec.push(Box::new(account_id));
        }
        if let Some((from, to)) = query.date_range {
            conditions.push("date >= ? AND date <= ?".to_string());
            params_vec.push(Box::new(format_date(from)));
            params_vec.push(Box::new(format_date(to)));
        }
        if query.uncategorized_only {
            conditions.push("category_id IS NULL".to_string());
        }
        if query.expenses_only {
            conditions.push("is_expense = 1".to_string());
        }
        if query.with_merchant {
            conditions.push("merchant_id IS NOT NULL".to_string());
        }

        let limit_clause = match query.limit {
            Some(limit) => {
                params_vec.push(Box::new(limit as i64));
                " LIMIT ?"
            }
            None => "",
        };

        let sql = format!(
            "SELECT {} FROM transactions WHERE {} ORDER BY date DESC, id DESC{}",
            TRANSACTION_COLUMNS,
            conditions.join(" AND "),
            limit_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let transactions = stmt
            .query_map(params_refs.as_slice(), |row| Self::row_to_transaction(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let transaction = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
                params![id],
                |row| Self::row_to_transaction(row),
            )
            .optional()?;

        Ok(transaction)
    }

    /// Store the category and merchant assigned to a transaction
    pub fn set_transaction_classification(
        &self,
        id: i64,
        category_id: Option<i64>,
        merchant_id: Option<i64>,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE transactions SET category_id = ?, merchant_id = ? WHERE id = ?",
            params![category_id, merchant_id, id],
        )?;
        Ok(())
    }

    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(3)?;
        let is_expense: i64 = row.get(10)?;
        Ok(Transaction {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            account_id: row.get(2)?,
            date: parse_date(&date_str).unwrap_or_default(),
            description: row.get(4)?,
            raw_description: row.get(5)?,
            counterparty_account: row.get(6)?,
            bank_category: row.get(7)?,
            amount: row.get(8)?,
            currency: row.get(9)?,
            is_expense: is_expense != 0,
            category_id: row.get(11)?,
            merchant_id: row.get(12)?,
        })
    }
}
