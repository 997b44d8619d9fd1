//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Database setup (init) and shared utilities (open_db)
//! - `categorize` - Classification, rule application, suggestions, corrections
//! - `budget` - Budget status for a date range
//! - `recurring` - Recurring payment detection and upcoming payments

pub mod budget;
pub mod categorize;
pub mod core;
pub mod recurring;

// Re-export command functions for main.rs
pub use budget::*;
pub use categorize::*;
pub use core::*;
pub use recurring::*;

use anyhow::Result;
use serde::Serialize;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a value as pretty JSON (for `--json`)
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
