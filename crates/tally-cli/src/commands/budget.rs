//! Budget command implementation

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::budget::{compute_status, ItemStatus};
use tally_core::db::Database;

use super::{print_json, truncate};

pub fn cmd_budget(
    db: &Database,
    workspace_id: i64,
    from: NaiveDate,
    to: NaiveDate,
    json: bool,
) -> Result<()> {
    let summary =
        compute_status(db, workspace_id, from, to).context("Failed to compute budget status")?;

    if json {
        return print_json(&summary);
    }

    println!();
    println!(
        "📊 Budget {} → {} ({} month{})",
        from,
        to,
        summary.months,
        if summary.months == 1 { "" } else { "s" }
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for source in &summary.income_sources {
        let hours = source
            .hours
            .map(|h| format!(" ({:.1} h)", h))
            .unwrap_or_default();
        println!(
            "   💰 {:28} {:>12.2}{}",
            truncate(&source.source.name, 28),
            source.calculated_amount,
            hours
        );
    }

    for group in &summary.budgets {
        println!();
        println!(
            "   {} ({:.2} / {:.2})",
            group.name, group.total_actual, group.total_budgeted
        );
        for item in &group.items {
            let icon = match item.status {
                ItemStatus::Pending => "⏳",
                ItemStatus::Paid => "✅",
                ItemStatus::OverBudget => "🔴",
                ItemStatus::UnderBudget => "🟢",
            };
            println!(
                "   {} {:26} │ {:>10.2} / {:>10.2} │ {:>3} tx",
                icon,
                truncate(&item.item.name, 26),
                item.actual_amount,
                item.normalized_amount,
                item.matched_transactions.len()
            );
        }
    }

    println!();
    println!("   Income:    {:>12.2}", summary.total_income);
    println!("   Budgeted:  {:>12.2}", summary.total_budgeted);
    println!("   Spent:     {:>12.2}", summary.total_actual);
    println!("   Remaining: {:>12.2}", summary.remaining);

    if !summary.unmatched_expenses.is_empty() {
        println!();
        println!(
            "   ⚠️  {} expenses not covered by any budget item:",
            summary.unmatched_expenses.len()
        );
        for tx in summary.unmatched_expenses.iter().take(10) {
            println!(
                "      {} {:30} {:>10.2}",
                tx.date,
                truncate(&tx.description, 30),
                tx.amount
            );
        }
    }

    Ok(())
}
