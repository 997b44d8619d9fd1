//! Categorization command implementations

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Serialize;
use tally_core::db::Database;
use tally_core::{
    apply_bulk_categorization, apply_rules_to_transactions, create_rule_from_correction,
    get_suggestions, map_bank_category, CategorizationEngine, MatchedBy,
};

use super::{print_json, truncate};

pub fn cmd_categorize(
    db: &Database,
    workspace_id: i64,
    description: &str,
    bank_category: Option<&str>,
    json: bool,
) -> Result<()> {
    let engine = CategorizationEngine::load(db, workspace_id);
    let result = engine.categorize(description, bank_category.unwrap_or(""));

    if json {
        return print_json(&result);
    }

    if result.matched_by == MatchedBy::None {
        println!("❓ No match for \"{}\"", description);
        return Ok(());
    }

    println!(
        "🏷️  {} (matched by {}, confidence {:.0}%)",
        result.category_name.as_deref().unwrap_or("-"),
        result.matched_by.as_str(),
        result.confidence * 100.0
    );
    if let Some(merchant) = &result.merchant_name {
        println!("   Merchant: {}", merchant);
    }

    Ok(())
}

pub fn cmd_apply_rules(
    db: &Database,
    workspace_id: i64,
    override_existing: bool,
    json: bool,
) -> Result<()> {
    let result = apply_rules_to_transactions(db, workspace_id, override_existing)
        .context("Failed to apply rules")?;

    if json {
        return print_json(&result);
    }

    println!(
        "✅ Checked {} transactions, updated {}",
        result.checked, result.updated
    );
    Ok(())
}

pub fn cmd_suggest(
    db: &Database,
    workspace_id: i64,
    account_id: Option<i64>,
    json: bool,
) -> Result<()> {
    let suggestions =
        get_suggestions(db, workspace_id, account_id).context("Failed to build suggestions")?;

    if json {
        return print_json(&suggestions);
    }

    if suggestions.is_empty() {
        println!("No repeated uncategorized transactions found.");
        return Ok(());
    }

    println!();
    println!("💡 Bulk Categorization Suggestions");
    println!("   ─────────────────────────────────────────────────────────────");

    for s in &suggestions {
        let hint = s
            .suggested_category_name
            .as_deref()
            .map(|name| format!(" → {}", name))
            .unwrap_or_default();
        println!(
            "   {:>4}× {:24} │ {}{}",
            s.count,
            truncate(&s.pattern, 24),
            truncate(&s.sample_description, 30),
            hint
        );
    }

    println!();
    println!("Apply one with: tally bulk-categorize --ids <IDS> --category <ID>");
    Ok(())
}

#[derive(Serialize)]
struct BulkResult {
    updated: usize,
}

pub fn cmd_bulk_categorize(
    db: &Database,
    ids: &[i64],
    category_id: Option<i64>,
    merchant_id: Option<i64>,
    json: bool,
) -> Result<()> {
    if category_id.is_none() && merchant_id.is_none() {
        anyhow::bail!("Specify --category and/or --merchant");
    }

    let updated = apply_bulk_categorization(db, ids, category_id, merchant_id)
        .context("Failed to update transactions")?;

    if json {
        return print_json(&BulkResult { updated });
    }

    println!("✅ Updated {} of {} transactions", updated, ids.len());
    Ok(())
}

#[derive(Serialize)]
struct LearnResult {
    rule_id: i64,
}

pub fn cmd_learn(
    db: &Database,
    workspace_id: i64,
    pattern: &str,
    category_id: Option<i64>,
    merchant_id: Option<i64>,
    json: bool,
) -> Result<()> {
    let rule_id = create_rule_from_correction(db, workspace_id, pattern, category_id, merchant_id)
        .context("Failed to create rule")?;

    if json {
        return print_json(&LearnResult { rule_id });
    }

    println!("✅ Created rule {} for \"{}\"", rule_id, pattern);
    Ok(())
}

#[derive(Serialize)]
struct MappedCategory {
    bank_category: String,
    category_id: Option<i64>,
}

pub fn cmd_map_category(
    db: &Database,
    workspace_id: i64,
    name: &str,
    mapping: &HashMap<String, String>,
    json: bool,
) -> Result<()> {
    let category_id = map_bank_category(db, workspace_id, name, mapping);

    if json {
        return print_json(&MappedCategory {
            bank_category: name.to_string(),
            category_id,
        });
    }

    if let Some(id) = category_id {
        println!("\"{}\" → category {}", name, id);
        return Ok(());
    }

    println!("\"{}\" does not map to any category", name);
    let categories = db
        .list_categories(workspace_id)
        .context("Failed to list categories")?;
    if !categories.is_empty() {
        println!();
        println!("Available categories:");
        for category in &categories {
            println!("   {:>4}  {}", category.id, category.name);
        }
    }
    Ok(())
}
