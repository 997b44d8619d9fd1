//! Tally CLI - Personal finance categorization and budgets
//!
//! Usage:
//!   tally init                              Initialize database
//!   tally apply-rules                       Categorize stored transactions
//!   tally suggest                           Propose bulk categorizations
//!   tally budget --from DATE --to DATE      Budget vs. actual spending
//!   tally recurring --save                  Detect and track recurring payments

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use tally_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path());
    let ws = cli.workspace;
    let json = cli.json;

    let db = || commands::open_db(&db_path);

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),
        Commands::Categorize {
            description,
            bank_category,
        } => commands::cmd_categorize(&db()?, ws, &description, bank_category.as_deref(), json),
        Commands::ApplyRules { override_existing } => {
            commands::cmd_apply_rules(&db()?, ws, override_existing, json)
        }
        Commands::Suggest { account } => commands::cmd_suggest(&db()?, ws, account, json),
        Commands::BulkCategorize {
            ids,
            category,
            merchant,
        } => commands::cmd_bulk_categorize(&db()?, &ids, category, merchant, json),
        Commands::Learn {
            pattern,
            category,
            merchant,
        } => commands::cmd_learn(&db()?, ws, &pattern, category, merchant, json),
        Commands::MapCategory { name } => {
            commands::cmd_map_category(&db()?, ws, &name, &config.bank_categories, json)
        }
        Commands::Budget { from, to } => commands::cmd_budget(&db()?, ws, from, to, json),
        Commands::Recurring {
            account,
            min_occurrences,
            save,
        } => commands::cmd_recurring(
            &db()?,
            ws,
            account,
            min_occurrences.unwrap_or(config.min_occurrences),
            save,
            json,
        ),
        Commands::Upcoming { days } => {
            let today = chrono::Local::now().date_naive();
            commands::cmd_upcoming(&db()?, ws, today, days.unwrap_or(config.upcoming_days), json)
        }
    }
}
