//! Recurring payment operations

use chrono::NaiveDate;
use rusqlite::params;

use super::{format_date, parse_date, Database};
use crate::error::Result;
use crate::models::{Frequency, NewRecurringPayment, RecurringPayment};

impl Database {
    /// Store a tracked recurring payment
    pub fn insert_recurring_payment(
        &self,
        workspace_id: i64,
        payment: &NewRecurringPayment,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO recurring_payments (workspace_id, merchant_id, account_id, expected_amount,
                                            frequency, frequency_days, next_due, last_paid, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                workspace_id,
                payment.merchant_id,
                payment.account_id,
                payment.expected_amount,
                payment.frequency.as_str(),
                payment.frequency_days,
                payment.next_due.map(format_date),
                payment.last_paid.map(format_date),
                payment.status.as_str(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List all tracked recurring payments of a workspace
    pub fn list_recurring_payments(&self, workspace_id: i64) -> Result<Vec<RecurringPayment>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, workspace_id, merchant_id, account_id, expected_amount, frequency,
                   frequency_days, next_due, last_paid, status
            FROM recurring_payments
            WHERE workspace_id = ?
            ORDER BY next_due IS NULL, next_due, id
            "#,
        )?;

        let payments = stmt
            .query_map(params![workspace_id], |row| Self::row_to_recurring(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(payments)
    }

    /// Active payments due on or before `cutoff`, soonest first
    pub fn list_due_recurring_payments(
        &self,
        workspace_id: i64,
        cutoff: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RecurringPayment>> {
        // Dates are compared as text, so years past 9999 must not reach the query
        let cutoff = NaiveDate::from_ymd_opt(9999, 12, 31).map_or(cutoff, |last| cutoff.min(last));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, workspace_id, merchant_id, account_id, expected_amount, frequency,
                   frequency_days, next_due, last_paid, status
            FROM recurring_payments
            WHERE workspace_id = ? AND status = 'active'
              AND next_due IS NOT NULL AND next_due <= ?
            ORDER BY next_due, id
            LIMIT ?
            "#,
        )?;

        let payments = stmt
            .query_map(
                params![workspace_id, format_date(cutoff), limit as i64],
                |row| Self::row_to_recurring(row),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(payments)
    }

    fn row_to_recurring(row: &rusqlite::Row) -> rusqlite::Result<RecurringPayment> {
        let frequency: String = row.get(5)?;
        let next_due: Option<String> = row.get(7)?;
        let last_paid: Option<String> = row.get(8)?;
        let status: String = row.get(9)?;
        Ok(RecurringPayment {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            merchant_id: row.get(2)?,
            account_id: row.get(3)?,
            expected_amount: row.get(4)?,
            frequency: frequency.parse().unwrap_or(Frequency::Custom),
            frequency_days: row.get(6)?,
            next_due: next_due.as_deref().and_then(parse_date),
            last_paid: last_paid.as_deref().and_then(parse_date),
            status: status.parse().unwrap_or_default(),
        })
    }
}
