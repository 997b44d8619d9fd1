//! Bulk categorization suggestions
//!
//! Groups uncategorized transactions by a normalized description pattern and
//! proposes the repeated ones for a bulk rule. One-shot and stateless: every
//! call starts from scratch.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::categorize::{CategorizationEngine, MatchedBy};
use crate::error::Result;
use crate::store::{Store, TransactionQuery};

/// Most recent uncategorized transactions considered per run
pub const SCAN_LIMIT: usize = 500;
/// Maximum suggestions returned
pub const MAX_SUGGESTIONS: usize = 20;
/// Smallest group worth suggesting
pub const MIN_GROUP_SIZE: usize = 2;
/// Significant words kept in a pattern
const MAX_PATTERN_WORDS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "THE", "AND", "FOR", "FROM", "CZK", "EUR", "USD", "PLATBA", "ÚHRADA", "TRANSAKCE",
];

/// A group of uncategorized transactions sharing a description pattern
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub pattern: String,
    pub transaction_ids: Vec<i64>,
    pub count: usize,
    pub sample_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_merchant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_merchant_name: Option<String>,
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2}[./]\d{2}[./]\d{2,4}").expect("valid date regex"))
}

fn amount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+[.,]\d{2}").expect("valid amount regex"))
}

/// Normalize a description into a grouping pattern.
///
/// Uppercases, strips dates and amounts, then keeps the first three words of
/// at least three bytes that are not stop words. Returns an empty string when
/// nothing significant is left.
pub fn extract_pattern(description: &str) -> String {
    let desc = description.trim();
    if desc.is_empty() {
        return String::new();
    }

    let desc = desc.to_uppercase();
    let desc = date_regex().replace_all(&desc, "");
    let desc = amount_regex().replace_all(&desc, "");

    desc.split_whitespace()
        .filter(|word| word.len() >= 3 && !STOP_WORDS.contains(word))
        .take(MAX_PATTERN_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Propose bulk categorizations for repeated uncategorized patterns.
///
/// Groups are ordered by size, largest first; equal sizes keep the order in
/// which their pattern was first seen (newest transaction first).
pub fn get_suggestions(
    store: &dyn Store,
    workspace_id: i64,
    account_id: Option<i64>,
) -> Result<Vec<Suggestion>> {
    let query = TransactionQuery::new()
        .account_id(account_id)
        .uncategorized_only(true)
        .limit(SCAN_LIMIT);
    let transactions = store.list_transactions(workspace_id, &query)?;

    let mut groups: Vec<Suggestion> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tx in &transactions {
        let mut pattern = extract_pattern(&tx.description);
        if pattern.is_empty() {
            pattern = extract_pattern(&tx.raw_description);
        }
        if pattern.is_empty() {
            continue;
        }

        let slot = *index.entry(pattern.clone()).or_insert_with(|| {
            groups.push(Suggestion {
                pattern,
                transaction_ids: Vec::new(),
                count: 0,
                sample_description: tx.description.clone(),
                suggested_category_id: None,
                suggested_category_name: None,
                suggested_merchant_id: None,
                suggested_merchant_name: None,
            });
            groups.len() - 1
        });
        groups[slot].transaction_ids.push(tx.id);
        groups[slot].count += 1;
    }

    let mut suggestions: Vec<Suggestion> = groups
        .into_iter()
        .filter(|s| s.count >= MIN_GROUP_SIZE)
        .collect();
    suggestions.sort_by(|a, b| b.count.cmp(&a.count));
    suggestions.truncate(MAX_SUGGESTIONS);

    // Pre-fill from existing merchants/rules where they already recognize the sample
    let engine = CategorizationEngine::load(store, workspace_id);
    for suggestion in &mut suggestions {
        let result = engine.categorize(&suggestion.sample_description, "");
        if matches!(result.matched_by, MatchedBy::Merchant | MatchedBy::Rule) {
            suggestion.suggested_category_id = result.category_id;
            suggestion.suggested_category_name = result.category_name;
            suggestion.suggested_merchant_id = result.merchant_id;
            suggestion.suggested_merchant_name = result.merchant_name;
        }
    }

    info!(
        "Found {} suggestions from {} uncategorized transactions",
        suggestions.len(),
        transactions.len()
    );
    Ok(suggestions)
}
