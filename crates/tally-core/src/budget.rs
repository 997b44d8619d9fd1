//! Budget reconciliation
//!
//! Compares what was budgeted against what was actually spent over a date
//! range. Budgeted amounts are rescaled to the number of months in the range,
//! and each transaction is claimed by at most one budget item: the first item
//! (by budget order, then item order) whose criteria match wins.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::matcher::CompiledPattern;
use crate::models::{
    BudgetFrequency, BudgetItem, IncomeSource, IncomeType, Transaction,
};
use crate::store::{Store, TransactionQuery};

/// Actual spending within this fraction of the normalized amount counts as paid
const PAID_TOLERANCE: f64 = 0.05;

/// Reconciliation state of one budget item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Nothing spent yet
    Pending,
    /// Spent within 5% of the normalized amount
    Paid,
    OverBudget,
    UnderBudget,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::OverBudget => "over_budget",
            Self::UnderBudget => "under_budget",
        }
    }

    /// Classify actual spending against a normalized budget
    pub fn classify(actual: f64, normalized: f64) -> Self {
        if actual == 0.0 {
            Self::Pending
        } else if actual >= normalized * (1.0 - PAID_TOLERANCE)
            && actual <= normalized * (1.0 + PAID_TOLERANCE)
        {
            Self::Paid
        } else if actual > normalized {
            Self::OverBudget
        } else {
            Self::UnderBudget
        }
    }
}

/// Income computed for one source over the range
#[derive(Debug, Clone, Serialize)]
pub struct IncomeSourceStatus {
    #[serde(flatten)]
    pub source: IncomeSource,
    /// Total hours across the range (hourly sources only)
    pub hours: Option<f64>,
    pub calculated_amount: f64,
}

/// Reconciliation of one budget item
#[derive(Debug, Clone, Serialize)]
pub struct BudgetItemStatus {
    #[serde(flatten)]
    pub item: BudgetItem,
    /// Budgeted amount rescaled to the months in the range
    pub normalized_amount: f64,
    pub actual_amount: f64,
    /// `normalized_amount - actual_amount`
    pub difference: f64,
    pub status: ItemStatus,
    pub matched_transactions: Vec<Transaction>,
}

/// Reconciliation of one budget group
#[derive(Debug, Clone, Serialize)]
pub struct BudgetGroupStatus {
    pub budget_id: i64,
    pub name: String,
    pub sort_order: i32,
    pub items: Vec<BudgetItemStatus>,
    pub total_budgeted: f64,
    pub total_actual: f64,
}

/// Full budget picture for a workspace and date range
#[derive(Debug, Clone, Serialize)]
pub struct BudgetSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub months: u32,
    pub total_income: f64,
    pub income_sources: Vec<IncomeSourceStatus>,
    pub budgets: Vec<BudgetGroupStatus>,
    pub total_budgeted: f64,
    pub total_actual: f64,
    /// `total_income - total_actual`
    pub remaining: f64,
    /// Expenses no budget item claimed
    pub unmatched_expenses: Vec<Transaction>,
}

/// Calendar months spanned by a range, counted as a year/month delta and
/// floored at 1 (Jan 15 to Mar 2 is 2 months; any range within one month is 1)
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let months =
        (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    months.max(1) as u32
}

/// Budgeted amount rescaled to `months`
pub fn normalized_amount(item: &BudgetItem, months: u32) -> f64 {
    match item.frequency {
        BudgetFrequency::Monthly => item.budgeted_amount * months as f64,
        BudgetFrequency::Yearly => item.budgeted_amount / 12.0 * months as f64,
    }
}

/// A budget item with its pattern compiled once per run
pub struct ItemMatcher<'a> {
    item: &'a BudgetItem,
    pattern: Option<CompiledPattern>,
}

impl<'a> ItemMatcher<'a> {
    pub fn new(item: &'a BudgetItem) -> Self {
        let pattern = item
            .match_pattern
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| CompiledPattern::new(p, item.match_pattern_type));
        Self { item, pattern }
    }

    /// Whether a transaction satisfies this item's criteria.
    ///
    /// The account filter gates everything else. A category or merchant
    /// match is sufficient on its own unless a narrower criterion is also
    /// set. An item with no criteria never matches.
    pub fn matches(&self, tx: &Transaction) -> bool {
        let item = self.item;

        if let Some(account_id) = item.match_account_id {
            if tx.account_id != account_id {
                return false;
            }
        }

        if let Some(category_id) = item.match_category_id {
            if tx.category_id != Some(category_id) {
                return false;
            }
            if self.pattern.is_none() && item.match_merchant_id.is_none() {
                return true;
            }
        }

        if let Some(merchant_id) = item.match_merchant_id {
            if tx.merchant_id != Some(merchant_id) {
                return false;
            }
            if self.pattern.is_none() {
                return true;
            }
        }

        match &self.pattern {
            Some(pattern) => {
                let value = tx.field(item.match_field);
                !value.is_empty() && pattern.is_match(value)
            }
            None => false,
        }
    }
}

/// Compute the budget summary for `[start_date, end_date]`.
///
/// Missing income sources or budgets degrade to empty lists; failing to load
/// the transactions is an error.
pub fn compute_status(
    store: &dyn Store,
    workspace_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<BudgetSummary> {
    if start_date > end_date {
        return Err(Error::InvalidData(format!(
            "Start date {} is after end date {}",
            start_date, end_date
        )));
    }

    let months = months_between(start_date, end_date);

    let sources = store.list_income_sources(workspace_id).unwrap_or_else(|e| {
        warn!("Could not load income sources: {}", e);
        Vec::new()
    });
    let income_sources: Vec<IncomeSourceStatus> = sources
        .into_iter()
        .filter(|s| s.is_active)
        .map(|s| income_status(store, s, start_date, end_date, months))
        .collect();
    let total_income = income_sources.iter().map(|s| s.calculated_amount).sum();

    let mut budgets = store.list_budgets(workspace_id).unwrap_or_else(|e| {
        warn!("Could not load budgets: {}", e);
        Vec::new()
    });
    budgets.retain(|b| b.is_active);
    budgets.sort_by_key(|b| b.sort_order);

    let query = TransactionQuery::new().date_range(start_date, end_date);
    let transactions = store.list_transactions(workspace_id, &query)?;

    let mut claimed: HashSet<i64> = HashSet::new();
    let mut groups = Vec::with_capacity(budgets.len());

    for mut budget in budgets {
        budget.items.sort_by_key(|i| i.sort_order);

        let mut group = BudgetGroupStatus {
            budget_id: budget.id,
            name: budget.name.clone(),
            sort_order: budget.sort_order,
            items: Vec::new(),
            total_budgeted: 0.0,
            total_actual: 0.0,
        };

        for item in budget.items.iter().filter(|i| i.is_active) {
            let matcher = ItemMatcher::new(item);
            let normalized = normalized_amount(item, months);

            let mut matched = Vec::new();
            for tx in &transactions {
                if claimed.contains(&tx.id) || !matcher.matches(tx) {
                    continue;
                }
                claimed.insert(tx.id);
                matched.push(tx.clone());
            }

            let actual: f64 = matched.iter().map(|tx| tx.amount).sum();
            debug!(
                "Budget item '{}': {} transactions, {:.2} of {:.2}",
                item.name,
                matched.len(),
                actual,
                normalized
            );

            group.total_budgeted += normalized;
            group.total_actual += actual;
            group.items.push(BudgetItemStatus {
                item: item.clone(),
                normalized_amount: normalized,
                actual_amount: actual,
                difference: normalized - actual,
                status: ItemStatus::classify(actual, normalized),
                matched_transactions: matched,
            });
        }

        groups.push(group);
    }

    let total_budgeted = groups.iter().map(|g| g.total_budgeted).sum();
    let total_actual: f64 = groups.iter().map(|g| g.total_actual).sum();

    let unmatched_expenses: Vec<Transaction> = transactions
        .into_iter()
        .filter(|tx| tx.is_expense && !claimed.contains(&tx.id))
        .collect();

    info!(
        "Budget status {}..{}: {} transactions claimed, {} unmatched expenses",
        start_date,
        end_date,
        claimed.len(),
        unmatched_expenses.len()
    );

    Ok(BudgetSummary {
        start_date,
        end_date,
        months,
        total_income,
        income_sources,
        budgets: groups,
        total_budgeted,
        total_actual,
        remaining: total_income - total_actual,
        unmatched_expenses,
    })
}

fn income_status(
    store: &dyn Store,
    source: IncomeSource,
    start_date: NaiveDate,
    end_date: NaiveDate,
    months: u32,
) -> IncomeSourceStatus {
    match source.income_type {
        IncomeType::Fixed => IncomeSourceStatus {
            calculated_amount: source.amount * months as f64,
            hours: None,
            source,
        },
        IncomeType::Hourly => {
            let hours: f64 = months_in_range(start_date, end_date)
                .map(|(year, month)| hours_for_month(store, &source, year, month))
                .sum();
            IncomeSourceStatus {
                calculated_amount: source.amount * hours,
                hours: Some(hours),
                source,
            }
        }
    }
}

/// Recorded hours for a month, falling back to the default when none (or 0)
fn hours_for_month(store: &dyn Store, source: &IncomeSource, year: i32, month: u32) -> f64 {
    match store.income_hours(source.id, year, month) {
        Ok(Some(hours)) if hours != 0.0 => hours,
        Ok(_) => source.default_hours,
        Err(e) => {
            debug!("Hours lookup for {} {}-{} failed: {}", source.name, year, month, e);
            source.default_hours
        }
    }
}

/// Every (year, month) touched by the range, inclusive
fn months_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = (i32, u32)> {
    let first = start.year() * 12 + start.month0() as i32;
    let last = end.year() * 12 + end.month0() as i32;
    (first..=last).map(|m| (m.div_euclid(12), m.rem_euclid(12) as u32 + 1))
}
