//! Categorization engine
//!
//! Classifies a transaction's descriptive fields into a category and merchant.
//! Tiers are tried in order and the first hit wins:
//!
//! 1. Merchant wildcard patterns (confidence 0.9)
//! 2. Import rules, highest priority first (confidence 0.8)
//! 3. Bank-provided category label (confidence 0.6, name only)
//!
//! Rules and merchants are loaded fresh for every engine instance; nothing is
//! cached across runs.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::matcher::{CompiledPattern, WildcardPattern};
use crate::models::{ImportRule, MatchField, NewImportRule, PatternType, TransactionFields};
use crate::store::{Store, TransactionQuery};

pub const MERCHANT_CONFIDENCE: f64 = 0.9;
pub const RULE_CONFIDENCE: f64 = 0.8;
pub const BANK_CATEGORY_CONFIDENCE: f64 = 0.6;

/// Name given to rules learned from a manual correction
pub const CORRECTION_RULE_NAME: &str = "Auto-created from correction";
/// Priority given to rules learned from a manual correction
pub const CORRECTION_RULE_PRIORITY: i32 = 50;

/// Which tier produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedBy {
    Merchant,
    Rule,
    BankCategory,
    None,
}

impl MatchedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merchant => "merchant",
            Self::Rule => "rule",
            Self::BankCategory => "bank_category",
            Self::None => "none",
        }
    }
}

/// Result of classifying one transaction
#[derive(Debug, Clone, Serialize)]
pub struct Categorization {
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub merchant_id: Option<i64>,
    pub merchant_name: Option<String>,
    pub confidence: f64,
    pub matched_by: MatchedBy,
}

impl Categorization {
    fn none() -> Self {
        Self {
            category_id: None,
            category_name: None,
            merchant_id: None,
            merchant_name: None,
            confidence: 0.0,
            matched_by: MatchedBy::None,
        }
    }
}

/// Counts from a bulk rule application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyResult {
    pub checked: usize,
    pub updated: usize,
}

struct CompiledRule {
    rule: ImportRule,
    pattern: CompiledPattern,
}

struct MerchantMatcher {
    merchant_id: i64,
    merchant_name: String,
    category_id: Option<i64>,
    patterns: Vec<WildcardPattern>,
}

/// Rule and merchant matcher for one workspace
pub struct CategorizationEngine<'a> {
    store: &'a dyn Store,
    rules: Vec<CompiledRule>,
    merchants: Vec<MerchantMatcher>,
}

impl<'a> CategorizationEngine<'a> {
    /// Create an empty engine; call `load_rules` / `load_merchants` to populate it
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            rules: Vec::new(),
            merchants: Vec::new(),
        }
    }

    /// Create an engine with the workspace's rules and merchants loaded
    pub fn load(store: &'a dyn Store, workspace_id: i64) -> Self {
        let mut engine = Self::new(store);
        engine.load_rules(workspace_id);
        engine.load_merchants(workspace_id);
        engine
    }

    /// Load active import rules, returning how many were loaded.
    ///
    /// A storage failure leaves the rule list empty.
    pub fn load_rules(&mut self, workspace_id: i64) -> usize {
        let rules = match self.store.list_import_rules(workspace_id) {
            Ok(rules) => rules,
            Err(e) => {
                warn!("Could not load import rules for workspace {}: {}", workspace_id, e);
                Vec::new()
            }
        };

        self.rules = rules
            .into_iter()
            .filter(|rule| rule.active)
            .map(|rule| CompiledRule {
                pattern: CompiledPattern::new(&rule.pattern, rule.pattern_type),
                rule,
            })
            .collect();

        // Stable: equal priorities keep load order
        self.rules
            .sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));

        debug!("Loaded {} import rules", self.rules.len());
        self.rules.len()
    }

    /// Load merchants and compile their wildcard patterns, returning how many
    /// were loaded.
    ///
    /// A storage failure leaves the merchant list empty.
    pub fn load_merchants(&mut self, workspace_id: i64) -> usize {
        let merchants = match self.store.list_merchants(workspace_id) {
            Ok(merchants) => merchants,
            Err(e) => {
                warn!("Could not load merchants for workspace {}: {}", workspace_id, e);
                Vec::new()
            }
        };

        self.merchants = merchants
            .into_iter()
            .map(|merchant| MerchantMatcher {
                merchant_id: merchant.id,
                merchant_name: merchant.label().to_string(),
                category_id: merchant.category_id,
                patterns: merchant
                    .patterns
                    .iter()
                    .filter_map(|p| WildcardPattern::new(p))
                    .collect(),
            })
            .collect();

        debug!("Loaded {} merchants", self.merchants.len());
        self.merchants.len()
    }

    /// Classify a description and optional bank category
    pub fn categorize(&self, description: &str, bank_category: &str) -> Categorization {
        self.classify(&TransactionFields {
            description: description.to_string(),
            bank_category: bank_category.to_string(),
            ..Default::default()
        })
    }

    /// Classify a transaction's fields
    pub fn classify(&self, fields: &TransactionFields) -> Categorization {
        if let Some(result) = self.match_merchant(&fields.description) {
            return result;
        }

        if let Some(result) = self.match_rule(fields) {
            return result;
        }

        if !fields.bank_category.is_empty() {
            return Categorization {
                category_name: Some(fields.bank_category.clone()),
                confidence: BANK_CATEGORY_CONFIDENCE,
                matched_by: MatchedBy::BankCategory,
                ..Categorization::none()
            };
        }

        Categorization::none()
    }

    fn match_merchant(&self, description: &str) -> Option<Categorization> {
        let merchant = self
            .merchants
            .iter()
            .find(|m| m.patterns.iter().any(|p| p.is_match(description)))?;

        debug!("Matched merchant '{}'", merchant.merchant_name);
        Some(Categorization {
            category_id: merchant.category_id,
            category_name: merchant.category_id.and_then(|id| self.category_name(id)),
            merchant_id: Some(merchant.merchant_id),
            merchant_name: Some(merchant.merchant_name.clone()),
            confidence: MERCHANT_CONFIDENCE,
            matched_by: MatchedBy::Merchant,
        })
    }

    fn match_rule(&self, fields: &TransactionFields) -> Option<Categorization> {
        let compiled = self.rules.iter().find(|r| {
            let value = fields.get(r.rule.match_field);
            !value.is_empty() && r.pattern.is_match(value)
        })?;

        let rule = &compiled.rule;
        debug!("Matched rule '{}' (priority {})", rule.name, rule.priority);
        Some(Categorization {
            category_id: rule.category_id,
            category_name: rule.category_id.and_then(|id| self.category_name(id)),
            merchant_id: rule.merchant_id,
            merchant_name: rule.merchant_id.and_then(|id| self.merchant_name(id)),
            confidence: RULE_CONFIDENCE,
            matched_by: MatchedBy::Rule,
        })
    }

    fn category_name(&self, id: i64) -> Option<String> {
        match self.store.get_category(id) {
            Ok(category) => category.map(|c| c.name),
            Err(e) => {
                debug!("Category {} lookup failed: {}", id, e);
                None
            }
        }
    }

    fn merchant_name(&self, id: i64) -> Option<String> {
        match self.store.get_merchant(id) {
            Ok(merchant) => merchant.map(|m| m.label().to_string()),
            Err(e) => {
                debug!("Merchant {} lookup failed: {}", id, e);
                None
            }
        }
    }
}

/// Re-run merchant patterns and rules over stored transactions.
///
/// Only uncategorized transactions are considered unless `override_existing`
/// is set. The bank-category tier is never applied here. A transaction counts
/// as updated only when its stored category or merchant actually changes.
pub fn apply_rules_to_transactions(
    store: &dyn Store,
    workspace_id: i64,
    override_existing: bool,
) -> Result<ApplyResult> {
    let engine = CategorizationEngine::load(store, workspace_id);

    let query = TransactionQuery::new().uncategorized_only(!override_existing);
    let transactions = store.list_transactions(workspace_id, &query)?;

    let mut result = ApplyResult {
        checked: transactions.len(),
        updated: 0,
    };

    for tx in &transactions {
        let classification = engine.classify(&tx.fields());
        if !matches!(
            classification.matched_by,
            MatchedBy::Merchant | MatchedBy::Rule
        ) {
            continue;
        }

        let category_id = classification.category_id.or(tx.category_id);
        let merchant_id = classification.merchant_id.or(tx.merchant_id);
        if category_id == tx.category_id && merchant_id == tx.merchant_id {
            continue;
        }

        match store.set_transaction_classification(tx.id, category_id, merchant_id) {
            Ok(()) => result.updated += 1,
            Err(e) => warn!("Failed to update transaction {}: {}", tx.id, e),
        }
    }

    info!(
        "Applied rules: {} checked, {} updated",
        result.checked, result.updated
    );
    Ok(result)
}

/// Assign a category and/or merchant to a set of transactions.
///
/// Only the provided fields are written; unknown transaction IDs are skipped.
/// Returns the number of transactions written.
pub fn apply_bulk_categorization(
    store: &dyn Store,
    transaction_ids: &[i64],
    category_id: Option<i64>,
    merchant_id: Option<i64>,
) -> Result<usize> {
    if category_id.is_none() && merchant_id.is_none() {
        return Ok(0);
    }

    let mut updated = 0;
    for &id in transaction_ids {
        let Some(tx) = store.get_transaction(id)? else {
            debug!("Skipping unknown transaction {}", id);
            continue;
        };

        store.set_transaction_classification(
            tx.id,
            category_id.or(tx.category_id),
            merchant_id.or(tx.merchant_id),
        )?;
        updated += 1;
    }

    info!("Bulk categorized {} transactions", updated);
    Ok(updated)
}

/// Persist a `contains` rule learned from a user's manual correction
pub fn create_rule_from_correction(
    store: &dyn Store,
    workspace_id: i64,
    pattern: &str,
    category_id: Option<i64>,
    merchant_id: Option<i64>,
) -> Result<i64> {
    if pattern.trim().is_empty() {
        return Err(Error::InvalidData(
            "Rule pattern must not be empty".to_string(),
        ));
    }

    let rule = NewImportRule {
        name: CORRECTION_RULE_NAME.to_string(),
        pattern: pattern.to_string(),
        pattern_type: PatternType::Contains,
        match_field: MatchField::Description,
        category_id,
        merchant_id,
        priority: CORRECTION_RULE_PRIORITY,
        active: true,
    };

    let id = store.insert_import_rule(workspace_id, &rule)?;
    info!("Created rule {} from correction: '{}'", id, pattern);
    Ok(id)
}

/// Resolve a bank-provided category label to a category ID.
///
/// The label is first translated through `category_mapping` (passed through
/// unchanged when absent), then matched against category names exactly.
pub fn map_bank_category(
    store: &dyn Store,
    workspace_id: i64,
    bank_category: &str,
    category_mapping: &HashMap<String, String>,
) -> Option<i64> {
    if bank_category.is_empty() {
        return None;
    }

    let name = category_mapping
        .get(bank_category)
        .map(String::as_str)
        .unwrap_or(bank_category);

    match store.find_category_by_name(workspace_id, name) {
        Ok(category) => category.map(|c| c.id),
        Err(e) => {
            warn!("Category lookup for '{}' failed: {}", name, e);
            None
        }
    }
}
