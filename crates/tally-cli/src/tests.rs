//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::collections::HashMap;

use chrono::NaiveDate;
use tally_core::db::Database;
use tally_core::models::{NewBudgetItem, NewMerchant, NewTransaction, PatternType};

use crate::commands::{self, truncate};

struct Setup {
    db: Database,
    ws: i64,
    account: i64,
}

fn setup_test_db() -> Setup {
    let db = Database::in_memory().unwrap();
    let ws = db.upsert_workspace(commands::DEFAULT_WORKSPACE).unwrap();
    let account = db.upsert_account(ws, "Checking").unwrap();
    Setup { db, ws, account }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn create_test_transaction(s: &Setup, on: NaiveDate, description: &str, amount: f64) -> i64 {
    s.db.insert_transaction(
        s.ws,
        &NewTransaction {
            account_id: s.account,
            date: on,
            description: description.to_string(),
            amount,
            is_expense: true,
            ..Default::default()
        },
    )
    .unwrap()
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a long description", 10), "a long ...");
    assert_eq!(truncate("Úhrada kartou", 8), "Úhrad...");
}

// ========== Init Tests ==========

#[test]
fn test_cmd_init_creates_database_and_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tally.db");

    commands::cmd_init(&path).unwrap();
    assert!(path.exists());

    let db = commands::open_db(&path).unwrap();
    let workspaces = db.list_workspaces().unwrap();
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0].id, 1);

    // Re-running init is harmless
    commands::cmd_init(&path).unwrap();
    assert_eq!(db.list_workspaces().unwrap().len(), 1);
}

// ========== Categorization Command Tests ==========

#[test]
fn test_cmd_categorize() {
    let s = setup_test_db();
    let cat = s.db.create_category(s.ws, "Groceries", None).unwrap();
    s.db.create_merchant(
        s.ws,
        &NewMerchant {
            name: "LIDL".to_string(),
            patterns: vec!["LIDL*".to_string()],
            category_id: Some(cat),
            ..Default::default()
        },
    )
    .unwrap();

    assert!(commands::cmd_categorize(&s.db, s.ws, "LIDL PRAHA", None, false).is_ok());
    assert!(commands::cmd_categorize(&s.db, s.ws, "LIDL PRAHA", None, true).is_ok());
    assert!(commands::cmd_categorize(&s.db, s.ws, "unknown", Some("Food"), false).is_ok());
    assert!(commands::cmd_categorize(&s.db, s.ws, "unknown", None, false).is_ok());
}

#[test]
fn test_cmd_learn_then_apply_rules() {
    let s = setup_test_db();
    let cat = s.db.create_category(s.ws, "Pets", None).unwrap();
    let tx = create_test_transaction(&s, date(2024, 1, 5), "ZOOPLUS ORDER 4411", 45.0);

    commands::cmd_learn(&s.db, s.ws, "zooplus", Some(cat), None, false).unwrap();
    let rules = s.db.list_import_rules(s.ws).unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].pattern_type, PatternType::Contains);

    commands::cmd_apply_rules(&s.db, s.ws, false, true).unwrap();
    assert_eq!(
        s.db.get_transaction(tx).unwrap().unwrap().category_id,
        Some(cat)
    );

    assert!(commands::cmd_learn(&s.db, s.ws, "", Some(cat), None, false).is_err());
}

#[test]
fn test_cmd_suggest_and_bulk_categorize() {
    let s = setup_test_db();
    let cat = s.db.create_category(s.ws, "Fuel", None).unwrap();
    let a = create_test_transaction(&s, date(2024, 2, 1), "SHELL 0042", 40.0);
    let b = create_test_transaction(&s, date(2024, 2, 9), "SHELL 0042", 35.0);

    assert!(commands::cmd_suggest(&s.db, s.ws, None, false).is_ok());
    assert!(commands::cmd_suggest(&s.db, s.ws, Some(s.account), true).is_ok());

    commands::cmd_bulk_categorize(&s.db, &[a, b], Some(cat), None, false).unwrap();
    assert_eq!(s.db.get_transaction(a).unwrap().unwrap().category_id, Some(cat));
    assert_eq!(s.db.get_transaction(b).unwrap().unwrap().category_id, Some(cat));

    // Nothing to assign
    assert!(commands::cmd_bulk_categorize(&s.db, &[a], None, None, false).is_err());
}

#[test]
fn test_cmd_map_category() {
    let s = setup_test_db();
    s.db.create_category(s.ws, "Dining", None).unwrap();
    let mapping = HashMap::from([("Restaurace".to_string(), "Dining".to_string())]);

    assert!(commands::cmd_map_category(&s.db, s.ws, "Restaurace", &mapping, false).is_ok());
    assert!(commands::cmd_map_category(&s.db, s.ws, "Unknown", &mapping, true).is_ok());
    assert!(commands::cmd_map_category(&s.db, s.ws, "Unknown", &mapping, false).is_ok());
}

// ========== Budget Command Tests ==========

#[test]
fn test_cmd_budget() {
    let s = setup_test_db();
    let budget = s.db.create_budget(s.ws, "Living", 0).unwrap();
    s.db.create_budget_item(
        budget,
        &NewBudgetItem {
            name: "Coffee".to_string(),
            budgeted_amount: 100.0,
            match_pattern: Some("COFFEE".to_string()),
            is_active: true,
            ..Default::default()
        },
    )
    .unwrap();
    create_test_transaction(&s, date(2024, 3, 2), "COFFEE CORNER", 98.0);
    create_test_transaction(&s, date(2024, 3, 4), "BOOKSHOP", 12.0);

    assert!(commands::cmd_budget(&s.db, s.ws, date(2024, 3, 1), date(2024, 3, 31), false).is_ok());
    assert!(commands::cmd_budget(&s.db, s.ws, date(2024, 3, 1), date(2024, 3, 31), true).is_ok());
    assert!(commands::cmd_budget(&s.db, s.ws, date(2024, 4, 1), date(2024, 3, 1), false).is_err());
}

// ========== Recurring Command Tests ==========

#[test]
fn test_cmd_recurring_save_and_upcoming() {
    let s = setup_test_db();
    let merchant = s
        .db
        .create_merchant(
            s.ws,
            &NewMerchant {
                name: "SPOTIFY".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
    for month in 1..=4 {
        let id = create_test_transaction(&s, date(2024, month, 10), "SPOTIFY P1", 5.99);
        s.db.set_transaction_classification(id, None, Some(merchant))
            .unwrap();
    }

    commands::cmd_recurring(&s.db, s.ws, None, 3, false, false).unwrap();
    assert!(s.db.list_recurring_payments(s.ws).unwrap().is_empty());

    commands::cmd_recurring(&s.db, s.ws, None, 3, true, true).unwrap();
    let tracked = s.db.list_recurring_payments(s.ws).unwrap();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].next_due, Some(date(2024, 5, 10)));

    assert!(commands::cmd_upcoming(&s.db, s.ws, date(2024, 5, 1), 14, false).is_ok());
    assert!(commands::cmd_upcoming(&s.db, s.ws, date(2024, 5, 1), 14, true).is_ok());
    assert!(commands::cmd_upcoming(&s.db, s.ws, date(2024, 1, 1), 14, false).is_ok());
}
