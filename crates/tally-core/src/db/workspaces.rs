//! Workspace and account operations

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::{Account, Workspace};

impl Database {
    /// Create a workspace, or return the existing one with the same name
    pub fn upsert_workspace(&self, name: &str) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM workspaces WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute("INSERT INTO workspaces (name) VALUES (?)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    /// List all workspaces
    pub fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM workspaces ORDER BY id")?;

        let workspaces = stmt
            .query_map([], |row| {
                Ok(Workspace {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(workspaces)
    }

    /// Create an account, or return the existing one with the same name
    pub fn upsert_account(&self, workspace_id: i64, name: &str) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM accounts WHERE workspace_id = ? AND name = ?",
                params![workspace_id, name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO accounts (workspace_id, name) VALUES (?, ?)",
            params![workspace_id, name],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List accounts of a workspace
    pub fn list_accounts(&self, workspace_id: i64) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, name FROM accounts WHERE workspace_id = ? ORDER BY name",
        )?;

        let accounts = stmt
            .query_map(params![workspace_id], |row| {
                Ok(Account {
                    id: row.get(0)?,
                    workspace_id: row.get(1)?,
                    name: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }
}
