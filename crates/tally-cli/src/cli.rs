//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Tally - Categorize transactions, reconcile budgets, spot recurring payments
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal finance categorization and budget reconciliation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to the configured path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (defaults to ~/.local/share/tally/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace ID
    #[arg(short, long, default_value = "1", global = true)]
    pub workspace: i64,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and default workspace
    Init,

    /// Classify a single description with the current rules and merchants
    Categorize {
        /// Transaction description
        description: String,

        /// Category label provided by the bank
        #[arg(short, long)]
        bank_category: Option<String>,
    },

    /// Re-run rules and merchant patterns over stored transactions
    ApplyRules {
        /// Also re-classify transactions that already have a category
        #[arg(long)]
        override_existing: bool,
    },

    /// Suggest bulk categorizations for repeated uncategorized descriptions
    Suggest {
        /// Only consider transactions from this account
        #[arg(short, long)]
        account: Option<i64>,
    },

    /// Assign a category and/or merchant to several transactions
    BulkCategorize {
        /// Transaction IDs (comma-separated)
        #[arg(long, required = true, value_delimiter = ',')]
        ids: Vec<i64>,

        /// Category ID to assign
        #[arg(short, long)]
        category: Option<i64>,

        /// Merchant ID to assign
        #[arg(short, long)]
        merchant: Option<i64>,
    },

    /// Create a rule from a manual correction
    Learn {
        /// Text the description must contain
        pattern: String,

        /// Category ID the rule assigns
        #[arg(short, long)]
        category: Option<i64>,

        /// Merchant ID the rule assigns
        #[arg(short, long)]
        merchant: Option<i64>,
    },

    /// Resolve a bank category label to a category
    MapCategory {
        /// Label as exported by the bank
        name: String,
    },

    /// Show budget status for a date range
    Budget {
        /// Start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: NaiveDate,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: NaiveDate,
    },

    /// Detect recurring payments
    Recurring {
        /// Only consider transactions from this account
        #[arg(short, long)]
        account: Option<i64>,

        /// Minimum payments per merchant (defaults to config)
        #[arg(long)]
        min_occurrences: Option<usize>,

        /// Start tracking every detected payment
        #[arg(long)]
        save: bool,
    },

    /// List tracked payments due soon
    Upcoming {
        /// Days ahead to look (defaults to config)
        #[arg(short, long)]
        days: Option<i64>,
    },
}
