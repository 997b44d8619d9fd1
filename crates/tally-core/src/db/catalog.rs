//! Category and merchant operations

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::{Category, Merchant, NewMerchant};

const MERCHANT_COLUMNS: &str =
    "id, workspace_id, name, display_name, patterns, category_id, is_subscription";

impl Database {
    /// Create a category
    pub fn create_category(
        &self,
        workspace_id: i64,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (workspace_id, name, parent_id) VALUES (?, ?, ?)",
            params![workspace_id, name, parent_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List categories of a workspace
    pub fn list_categories(&self, workspace_id: i64) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, name, parent_id FROM categories WHERE workspace_id = ? ORDER BY id",
        )?;

        let categories = stmt
            .query_map(params![workspace_id], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT id, workspace_id, name, parent_id FROM categories WHERE id = ?",
                params![id],
                Self::row_to_category,
            )
            .optional()?;

        Ok(category)
    }

    /// Find a category by exact (case-sensitive) name
    pub fn find_category_by_name(&self, workspace_id: i64, name: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                // SQLite `=` on TEXT is case-sensitive unless a NOCASE collation is set
                "SELECT id, workspace_id, name, parent_id FROM categories
                 WHERE workspace_id = ? AND name = ? ORDER BY id LIMIT 1",
                params![workspace_id, name],
                Self::row_to_category,
            )
            .optional()?;

        Ok(category)
    }

    fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            name: row.get(2)?,
            parent_id: row.get(3)?,
        })
    }

    /// Create a merchant
    pub fn create_merchant(&self, workspace_id: i64, merchant: &NewMerchant) -> Result<i64> {
        let conn = self.conn()?;
        let patterns = serde_json::to_string(&merchant.patterns)?;

        conn.execute(
            r#"
            INSERT INTO merchants (workspace_id, name, display_name, patterns, category_id, is_subscription)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                workspace_id,
                merchant.name,
                merchant.display_name,
                patterns,
                merchant.category_id,
                merchant.is_subscription as i32,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List merchants of a workspace in creation order
    pub fn list_merchants(&self, workspace_id: i64) -> Result<Vec<Merchant>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM merchants WHERE workspace_id = ? ORDER BY id",
            MERCHANT_COLUMNS
        ))?;

        let merchants = stmt
            .query_map(params![workspace_id], Self::row_to_merchant)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(merchants)
    }

    /// Get a merchant by ID
    pub fn get_merchant(&self, id: i64) -> Result<Option<Merchant>> {
        let conn = self.conn()?;
        let merchant = conn
            .query_row(
                &format!("SELECT {} FROM merchants WHERE id = ?", MERCHANT_COLUMNS),
                params![id],
                Self::row_to_merchant,
            )
            .optional()?;

        Ok(merchant)
    }

    fn row_to_merchant(row: &rusqlite::Row) -> rusqlite::Result<Merchant> {
        let patterns_json: String = row.get(4)?;
        let is_subscription: i64 = row.get(6)?;
        Ok(Merchant {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            patterns: serde_json::from_str(&patterns_json).unwrap_or_default(),
            category_id: row.get(5)?,
            is_subscription: is_subscription != 0,
        })
    }
}
