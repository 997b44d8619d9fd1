//! Recurring payment command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::db::Database;
use tally_core::recurring::{create_recurring_payment, detect_recurring, upcoming_payments};

use super::{print_json, truncate};

pub fn cmd_recurring(
    db: &Database,
    workspace_id: i64,
    account_id: Option<i64>,
    min_occurrences: usize,
    save: bool,
    json: bool,
) -> Result<()> {
    let results = detect_recurring(db, workspace_id, account_id, min_occurrences)
        .context("Failed to detect recurring payments")?;

    let mut saved = 0;
    if save {
        for result in &results {
            create_recurring_payment(db, workspace_id, result, account_id)
                .with_context(|| format!("Failed to save {}", result.merchant_name))?;
            saved += 1;
        }
    }

    if json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No recurring payments detected.");
        return Ok(());
    }

    println!();
    println!("🔁 Recurring Payments");
    println!("   ─────────────────────────────────────────────────────────────");

    for r in &results {
        println!(
            "   {:22} │ {:>9.2} {:<9} │ {:>3.0}% │ next {}",
            truncate(&r.merchant_name, 22),
            r.average_amount,
            r.frequency.as_str(),
            r.confidence_score * 100.0,
            r.next_predicted
        );
    }

    if save {
        println!();
        println!("✅ Tracking {} recurring payments", saved);
    }

    Ok(())
}

pub fn cmd_upcoming(
    db: &Database,
    workspace_id: i64,
    today: NaiveDate,
    days_ahead: i64,
    json: bool,
) -> Result<()> {
    let upcoming = upcoming_payments(db, workspace_id, today, days_ahead)
        .context("Failed to load upcoming payments")?;

    if json {
        return print_json(&upcoming);
    }

    if upcoming.is_empty() {
        println!("Nothing due in the next {} days.", days_ahead);
        return Ok(());
    }

    println!();
    println!("📅 Due within {} days", days_ahead);
    println!("   ─────────────────────────────────────────────────────────────");

    for p in &upcoming {
        let when = match p.days_until {
            d if d < 0 => format!("{} days overdue", -d),
            0 => "today".to_string(),
            1 => "tomorrow".to_string(),
            d => format!("in {} days", d),
        };
        println!(
            "   {:22} │ {:>9.2} │ {} ({})",
            truncate(&p.merchant_name, 22),
            p.expected_amount,
            p.next_due,
            when
        );
    }

    Ok(())
}
