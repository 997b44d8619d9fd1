//! Import rule operations

use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::{ImportRule, NewImportRule};

impl Database {
    /// Create an import rule
    pub fn insert_import_rule(&self, workspace_id: i64, rule: &NewImportRule) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO import_rules (workspace_id, name, pattern, pattern_type, match_field,
                                      category_id, merchant_id, priority, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                workspace_id,
                rule.name,
                rule.pattern,
                rule.pattern_type.as_str(),
                rule.match_field.as_str(),
                rule.category_id,
                rule.merchant_id,
                rule.priority,
                rule.active as i32,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List active import rules, highest priority first
    pub fn list_import_rules(&self, workspace_id: i64) -> Result<Vec<ImportRule>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, workspace_id, name, pattern, pattern_type, match_field,
                   category_id, merchant_id, priority, active
            FROM import_rules
            WHERE workspace_id = ? AND active = 1
            ORDER BY priority DESC, id ASC
            "#,
        )?;

        let rules = stmt
            .query_map(params![workspace_id], |row| {
                let pattern_type: String = row.get(4)?;
                let match_field: String = row.get(5)?;
                let active: i64 = row.get(9)?;
                Ok(ImportRule {
                    id: row.get(0)?,
                    workspace_id: row.get(1)?,
                    name: row.get(2)?,
                    pattern: row.get(3)?,
                    pattern_type: pattern_type.parse().unwrap_or_default(),
                    match_field: match_field.parse().unwrap_or_default(),
                    category_id: row.get(6)?,
                    merchant_id: row.get(7)?,
                    priority: row.get(8)?,
                    active: active != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rules)
    }
}
