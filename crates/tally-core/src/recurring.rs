//! Recurring payment detection
//!
//! Heuristic classifier over expense history: transactions are grouped by
//! merchant, the day gaps between consecutive payments are matched against
//! standard periods, and the result is scored from interval regularity,
//! amount stability and sample size.

use std::collections::HashMap;

use chrono::{Days, Months, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Frequency, NewRecurringPayment, RecurringStatus, Transaction};
use crate::store::{Store, TransactionQuery};

pub const DEFAULT_MIN_OCCURRENCES: usize = 3;
pub const DEFAULT_UPCOMING_DAYS: i64 = 14;
/// Most recent expense transactions considered per detection run
const CANDIDATE_LIMIT: usize = 1000;
const UPCOMING_LIMIT: usize = 50;
/// Results scoring below this are discarded
const MIN_CONFIDENCE: f64 = 0.5;
/// Share of intervals that must fall within a period's tolerance
const MIN_INTERVAL_CONSISTENCY: f64 = 0.6;
/// Custom periods need a standard deviation below this share of the mean
const CUSTOM_MAX_DEVIATION: f64 = 0.3;

/// Standard periods in the order they are tried: (frequency, days, tolerance)
const PERIODS: &[(Frequency, i64, i64)] = &[
    (Frequency::Weekly, 7, 2),
    (Frequency::Biweekly, 14, 3),
    (Frequency::Monthly, 30, 5),
    (Frequency::Yearly, 365, 30),
];

/// A merchant whose payments look recurring
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    pub merchant_id: i64,
    pub merchant_name: String,
    pub average_amount: f64,
    pub frequency: Frequency,
    /// Nominal period for standard frequencies, mean gap for custom ones
    pub frequency_days: i64,
    pub confidence_score: f64,
    pub last_occurrence: NaiveDate,
    pub next_predicted: NaiveDate,
    pub occurrences: usize,
    pub amount_variance: f64,
}

/// A tracked payment due soon
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingPayment {
    pub id: i64,
    pub merchant_name: String,
    pub expected_amount: f64,
    pub frequency: Frequency,
    pub next_due: NaiveDate,
    /// Negative when overdue
    pub days_until: i64,
}

/// Classified interval pattern
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyMatch {
    pub frequency: Frequency,
    pub days: i64,
    pub consistency: f64,
}

/// Find merchants with recurring expense patterns, most confident first.
///
/// `min_occurrences` below 2 is replaced by [`DEFAULT_MIN_OCCURRENCES`].
pub fn detect_recurring(
    store: &dyn Store,
    workspace_id: i64,
    account_id: Option<i64>,
    min_occurrences: usize,
) -> Result<Vec<DetectionResult>> {
    let min_occurrences = if min_occurrences < 2 {
        DEFAULT_MIN_OCCURRENCES
    } else {
        min_occurrences
    };

    let query = TransactionQuery::new()
        .account_id(account_id)
        .expenses_only(true)
        .with_merchant(true)
        .limit(CANDIDATE_LIMIT);
    let transactions = store.list_transactions(workspace_id, &query)?;

    let mut groups: Vec<(i64, Vec<&Transaction>)> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    for tx in &transactions {
        let Some(merchant_id) = tx.merchant_id else {
            continue;
        };
        let slot = *index.entry(merchant_id).or_insert_with(|| {
            groups.push((merchant_id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(tx);
    }

    let mut results = Vec::new();
    for (merchant_id, txs) in groups {
        if txs.len() < min_occurrences {
            continue;
        }
        if let Some(result) = analyze_group(store, merchant_id, txs) {
            if result.confidence_score >= MIN_CONFIDENCE {
                results.push(result);
            }
        }
    }

    results.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));

    info!(
        "Detected {} recurring payments from {} transactions",
        results.len(),
        transactions.len()
    );
    Ok(results)
}

fn analyze_group(
    store: &dyn Store,
    merchant_id: i64,
    mut txs: Vec<&Transaction>,
) -> Option<DetectionResult> {
    txs.sort_by_key(|tx| tx.date);

    let intervals: Vec<i64> = txs
        .windows(2)
        .map(|pair| (pair[1].date - pair[0].date).num_days())
        .filter(|days| *days > 0)
        .collect();

    let Some(matched) = detect_frequency(&intervals) else {
        debug!("Merchant {}: no regular interval in {:?}", merchant_id, intervals);
        return None;
    };

    let amounts: Vec<f64> = txs.iter().map(|tx| tx.amount).collect();
    let average = mean(&amounts);
    let amount_variance = variance(&amounts);
    let confidence = calculate_confidence(matched.consistency, amount_variance, average, txs.len());

    let last = txs.last()?.date;

    Some(DetectionResult {
        merchant_id,
        merchant_name: merchant_name(store, merchant_id),
        average_amount: round2(average),
        frequency: matched.frequency,
        frequency_days: matched.days,
        confidence_score: confidence,
        last_occurrence: last,
        next_predicted: predict_next_date(last, matched.frequency, matched.days),
        occurrences: txs.len(),
        amount_variance: round2(amount_variance),
    })
}

/// Classify day gaps into a frequency.
///
/// Standard periods are tried in order and the first with at least 60% of
/// gaps within tolerance wins. Otherwise the gaps qualify as a custom period
/// when their standard deviation is under 30% of the (truncated) mean gap.
pub fn detect_frequency(intervals: &[i64]) -> Option<FrequencyMatch> {
    if intervals.is_empty() {
        return None;
    }

    for &(frequency, days, tolerance) in PERIODS {
        let within = intervals
            .iter()
            .filter(|gap| (**gap - days).abs() <= tolerance)
            .count();
        let consistency = within as f64 / intervals.len() as f64;
        if consistency >= MIN_INTERVAL_CONSISTENCY {
            return Some(FrequencyMatch {
                frequency,
                days,
                consistency,
            });
        }
    }

    let gaps: Vec<f64> = intervals.iter().map(|gap| *gap as f64).collect();
    let average_days = mean(&gaps) as i64;
    if average_days <= 0 {
        return None;
    }

    let deviation = variance(&gaps).sqrt();
    let average = average_days as f64;
    if deviation < average * CUSTOM_MAX_DEVIATION {
        return Some(FrequencyMatch {
            frequency: Frequency::Custom,
            days: average_days,
            consistency: 1.0 - deviation / average,
        });
    }

    None
}

/// Weighted score: 50% interval consistency, 30% amount stability, 20%
/// sample size (saturating at ten occurrences). Capped at 1.
pub fn calculate_confidence(
    interval_consistency: f64,
    amount_variance: f64,
    average_amount: f64,
    count: usize,
) -> f64 {
    let mut confidence = interval_consistency * 0.5;

    if average_amount > 0.0 {
        let amount_consistency = 1.0 - (amount_variance / average_amount).min(1.0);
        confidence += amount_consistency * 0.3;
    }

    confidence += (count as f64 / 10.0).min(1.0) * 0.2;

    confidence.min(1.0)
}

/// Next expected payment date.
///
/// Month and year steps clamp to the last day of the target month.
pub fn predict_next_date(last: NaiveDate, frequency: Frequency, average_days: i64) -> NaiveDate {
    let next = match frequency {
        Frequency::Weekly => last.checked_add_days(Days::new(7)),
        Frequency::Biweekly => last.checked_add_days(Days::new(14)),
        Frequency::Monthly => last.checked_add_months(Months::new(1)),
        Frequency::Yearly => last.checked_add_months(Months::new(12)),
        Frequency::Custom => last.checked_add_days(Days::new(average_days.max(0) as u64)),
    };
    next.unwrap_or(last)
}

/// Start tracking a detected payment; returns the new payment id
pub fn create_recurring_payment(
    store: &dyn Store,
    workspace_id: i64,
    result: &DetectionResult,
    account_id: Option<i64>,
) -> Result<i64> {
    let id = store.insert_recurring_payment(
        workspace_id,
        &NewRecurringPayment {
            merchant_id: result.merchant_id,
            account_id,
            expected_amount: result.average_amount,
            frequency: result.frequency,
            frequency_days: result.frequency_days,
            next_due: Some(result.next_predicted),
            last_paid: Some(result.last_occurrence),
            status: RecurringStatus::Active,
        },
    )?;

    info!(
        "Tracking recurring payment {} for {} ({})",
        id,
        result.merchant_name,
        result.frequency.as_str()
    );
    Ok(id)
}

/// Active tracked payments due within `days_ahead` of `today`, soonest first
pub fn upcoming_payments(
    store: &dyn Store,
    workspace_id: i64,
    today: NaiveDate,
    days_ahead: i64,
) -> Result<Vec<UpcomingPayment>> {
    let cutoff = if days_ahead >= 0 {
        today
            .checked_add_days(Days::new(days_ahead as u64))
            .unwrap_or(NaiveDate::MAX)
    } else {
        today
            .checked_sub_days(Days::new(days_ahead.unsigned_abs()))
            .unwrap_or(NaiveDate::MIN)
    };

    let payments = store.list_due_recurring_payments(workspace_id, cutoff, UPCOMING_LIMIT)?;

    Ok(payments
        .into_iter()
        .filter_map(|p| {
            let next_due = p.next_due?;
            Some(UpcomingPayment {
                id: p.id,
                merchant_name: merchant_name(store, p.merchant_id),
                expected_amount: p.expected_amount,
                frequency: p.frequency,
                next_due,
                days_until: (next_due - today).num_days(),
            })
        })
        .collect())
}

/// Merchant label, or an empty string when the merchant cannot be loaded
fn merchant_name(store: &dyn Store, merchant_id: i64) -> String {
    match store.get_merchant(merchant_id) {
        Ok(Some(merchant)) => merchant.label().to_string(),
        _ => String::new(),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance; zero for fewer than two values
fn variance(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTransaction;
    use crate::test_utils::{date, Fixture};

    fn pay(f: &Fixture, merchant_id: i64, on: NaiveDate, amount: f64) -> i64 {
        f.insert(NewTransaction {
            account_id: f.account_id,
            date: on,
            description: "card payment".to_string(),
            amount,
            is_expense: true,
            merchant_id: Some(merchant_id),
            ..Default::default()
        })
    }

    #[test]
    fn test_detect_frequency_standard_periods() {
        let weekly = detect_frequency(&[7, 6, 8, 7]).unwrap();
        assert_eq!(weekly.frequency, Frequency::Weekly);
        assert_eq!(weekly.days, 7);
        assert_eq!(weekly.consistency, 1.0);

        let monthly = detect_frequency(&[30, 31, 28, 45]).unwrap();
        assert_eq!(monthly.frequency, Frequency::Monthly);
        assert_eq!(monthly.consistency, 0.75);

        let biweekly = detect_frequency(&[14, 12, 17]).unwrap();
        assert_eq!(biweekly.frequency, Frequency::Biweekly);

        let yearly = detect_frequency(&[360, 370]).unwrap();
        assert_eq!(yearly.frequency, Frequency::Yearly);
        assert_eq!(yearly.days, 365);
    }

    #[test]
    fn test_detect_frequency_custom_and_none() {
        let custom = detect_frequency(&[90, 92, 88]).unwrap();
        assert_eq!(custom.frequency, Frequency::Custom);
        assert_eq!(custom.days, 90);
        assert!(custom.consistency > 0.9 && custom.consistency < 1.0);

        assert!(detect_frequency(&[3, 100, 20]).is_none());
        assert!(detect_frequency(&[]).is_none());
    }

    #[test]
    fn test_calculate_confidence() {
        assert!((calculate_confidence(1.0, 0.0, 10.0, 3) - 0.86).abs() < 1e-9);
        assert_eq!(calculate_confidence(1.0, 0.0, 10.0, 20), 1.0);
        // Zero average amount contributes nothing for amount stability
        assert!((calculate_confidence(1.0, 0.0, 0.0, 10) - 0.7).abs() < 1e-9);
        // Variance larger than the mean zeroes the amount factor
        assert!((calculate_confidence(0.6, 50.0, 10.0, 5) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_predict_next_date_clamps_months() {
        assert_eq!(
            predict_next_date(date(2024, 1, 31), Frequency::Monthly, 30),
            date(2024, 2, 29)
        );
        assert_eq!(
            predict_next_date(date(2024, 2, 29), Frequency::Yearly, 365),
            date(2025, 2, 28)
        );
        assert_eq!(
            predict_next_date(date(2024, 3, 1), Frequency::Weekly, 7),
            date(2024, 3, 8)
        );
        assert_eq!(
            predict_next_date(date(2024, 3, 1), Frequency::Custom, 45),
            date(2024, 4, 15)
        );
    }

    #[test]
    fn test_detect_monthly_subscription() {
        let f = Fixture::new();
        let netflix = f.merchant("NETFLIX", &["NETFLIX*"], None);
        let start = date(2024, 1, 1);
        for offset in [0, 30, 61] {
            pay(&f, netflix, start + chrono::Duration::days(offset), 10.0);
        }

        let results = detect_recurring(&f.db, f.workspace_id, None, 3).unwrap();
        assert_eq!(results.len(), 1);

        let r = &results[0];
        assert_eq!(r.merchant_id, netflix);
        assert_eq!(r.merchant_name, "NETFLIX");
        assert_eq!(r.frequency, Frequency::Monthly);
        assert_eq!(r.frequency_days, 30);
        assert_eq!(r.occurrences, 3);
        assert_eq!(r.average_amount, 10.0);
        assert_eq!(r.amount_variance, 0.0);
        assert_eq!(r.last_occurrence, date(2024, 3, 2));
        assert_eq!(r.next_predicted, date(2024, 4, 2));
        assert!((r.confidence_score - 0.86).abs() < 1e-9);
    }

    #[test]
    fn test_two_occurrences_are_excluded() {
        let f = Fixture::new();
        let gym = f.merchant("GYM", &[], None);
        pay(&f, gym, date(2024, 1, 1), 30.0);
        pay(&f, gym, date(2024, 1, 31), 30.0);

        assert!(detect_recurring(&f.db, f.workspace_id, None, 3)
            .unwrap()
            .is_empty());
        // Below 2 falls back to the default of 3
        assert!(detect_recurring(&f.db, f.workspace_id, None, 1)
            .unwrap()
            .is_empty());
        assert_eq!(
            detect_recurring(&f.db, f.workspace_id, None, 2)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_same_day_duplicates_and_filters() {
        let f = Fixture::new();
        let savings = f.db.upsert_account(f.workspace_id, "Savings").unwrap();
        let spotify = f.merchant("SPOTIFY", &[], None);
        let gym = f.merchant("GYM", &[], None);

        for (y, m, d) in [(2024, 1, 5), (2024, 1, 5), (2024, 1, 12), (2024, 1, 19)] {
            pay(&f, spotify, date(y, m, d), 5.0);
        }
        // Income with a merchant is not an expense
        f.insert(NewTransaction {
            account_id: f.account_id,
            date: date(2024, 1, 26),
            description: "refund".to_string(),
            amount: 5.0,
            is_expense: false,
            merchant_id: Some(spotify),
            ..Default::default()
        });
        for day in [1, 8, 15] {
            f.insert(NewTransaction {
                account_id: savings,
                date: date(2024, 1, day),
                description: "gym".to_string(),
                amount: 20.0,
                is_expense: true,
                merchant_id: Some(gym),
                ..Default::default()
            });
        }

        let all = detect_recurring(&f.db, f.workspace_id, None, 3).unwrap();
        assert_eq!(all.len(), 2);

        let spotify_result = all.iter().find(|r| r.merchant_id == spotify).unwrap();
        assert_eq!(spotify_result.frequency, Frequency::Weekly);
        assert_eq!(spotify_result.occurrences, 4);
        assert_eq!(spotify_result.next_predicted, date(2024, 1, 26));

        let scoped = detect_recurring(&f.db, f.workspace_id, Some(savings), 3).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].merchant_id, gym);
    }

    #[test]
    fn test_results_sorted_by_confidence() {
        let f = Fixture::new();
        let steady = f.merchant("STEADY", &[], None);
        let noisy = f.merchant("NOISY", &[], None);
        for (i, day) in [1, 8, 15, 22, 29].iter().enumerate() {
            pay(&f, noisy, date(2024, 3, *day), 10.0 + i as f64 * 6.0);
            pay(&f, steady, date(2024, 3, *day), 10.0);
        }

        let results = detect_recurring(&f.db, f.workspace_id, None, 3).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].merchant_id, steady);
        assert!(results[0].confidence_score > results[1].confidence_score);
        assert_eq!(results[1].average_amount, 22.0);
        assert_eq!(results[1].amount_variance, 72.0);
    }

    #[test]
    fn test_create_and_list_upcoming() {
        let f = Fixture::new();
        let netflix = f.merchant("NETFLIX", &[], None);
        for day in [1, 8, 15] {
            pay(&f, netflix, date(2024, 5, day), 9.99);
        }
        let results = detect_recurring(&f.db, f.workspace_id, None, 3).unwrap();
        let id = create_recurring_payment(&f.db, f.workspace_id, &results[0], Some(f.account_id))
            .unwrap();

        let stored = f.db.list_recurring_payments(f.workspace_id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].status, RecurringStatus::Active);
        assert_eq!(stored[0].next_due, Some(date(2024, 5, 22)));
        assert_eq!(stored[0].last_paid, Some(date(2024, 5, 15)));
        assert_eq!(stored[0].account_id, Some(f.account_id));

        let upcoming = upcoming_payments(&f.db, f.workspace_id, date(2024, 5, 20), 14).unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].merchant_name, "NETFLIX");
        assert_eq!(upcoming[0].days_until, 2);
        assert_eq!(upcoming[0].expected_amount, 9.99);

        // Overdue payments are still listed
        let overdue = upcoming_payments(&f.db, f.workspace_id, date(2024, 6, 1), 14).unwrap();
        assert_eq!(overdue[0].days_until, -10);

        let too_early = upcoming_payments(&f.db, f.workspace_id, date(2024, 5, 1), 14).unwrap();
        assert!(too_early.is_empty());
    }

    #[test]
    fn test_upcoming_window_saturates() {
        let f = Fixture::new();
        let gym = f.merchant("GYM", &[], None);
        f.db.insert_recurring_payment(
            f.workspace_id,
            &NewRecurringPayment {
                merchant_id: gym,
                account_id: None,
                expected_amount: 800.0,
                frequency: Frequency::Yearly,
                frequency_days: 365,
                next_due: Some(date(2030, 1, 1)),
                last_paid: None,
                status: RecurringStatus::Active,
            },
        )
        .unwrap();

        let today = date(2024, 1, 1);
        let decade = upcoming_payments(&f.db, f.workspace_id, today, 36500).unwrap();
        assert_eq!(decade.len(), 1);
        let unbounded = upcoming_payments(&f.db, f.workspace_id, today, i64::MAX).unwrap();
        assert_eq!(unbounded.len(), 1);
        assert_eq!(unbounded[0].next_due, date(2030, 1, 1));

        assert!(upcoming_payments(&f.db, f.workspace_id, today, i64::MIN)
            .unwrap()
            .is_empty());
    }
}
