//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::db::Database;
use tracing::debug;

/// Name of the workspace created by `tally init`
pub const DEFAULT_WORKSPACE: &str = "Default";

/// Open the database, creating its directory if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    debug!("Opening database at {}", path_str);
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let workspace_id = db
        .upsert_workspace(DEFAULT_WORKSPACE)
        .context("Failed to create default workspace")?;
    println!("   Workspace '{}' (ID: {})", DEFAULT_WORKSPACE, workspace_id);

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Categorize imported transactions: tally apply-rules");
    println!("  2. Review bulk suggestions: tally suggest");

    Ok(())
}
