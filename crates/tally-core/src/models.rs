//! Domain models for Tally

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A workspace groups all records belonging to one household/user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
}

/// A bank account within a workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
}

/// A spending/income category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

/// A known merchant with wildcard patterns used for recognition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    /// Preferred label, falls back to `name` when unset
    pub display_name: Option<String>,
    /// Wildcard patterns (`*` matches anything), matched case-insensitively
    pub patterns: Vec<String>,
    /// Category assigned to transactions recognized as this merchant
    pub category_id: Option<i64>,
    pub is_subscription: bool,
}

impl Merchant {
    /// Human-facing name: display name if set, otherwise the raw name
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.name,
        }
    }
}

/// A merchant to be stored
#[derive(Debug, Clone, Default)]
pub struct NewMerchant {
    pub name: String,
    pub display_name: Option<String>,
    pub patterns: Vec<String>,
    pub category_id: Option<i64>,
    pub is_subscription: bool,
}

/// An imported bank transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub workspace_id: i64,
    pub account_id: i64,
    pub date: NaiveDate,
    /// Cleaned-up description shown to the user
    pub description: String,
    /// Description exactly as the bank exported it
    pub raw_description: String,
    /// Counterparty account number (empty when the bank does not provide one)
    pub counterparty_account: String,
    /// Category label provided by the bank, if any
    pub bank_category: String,
    /// Always non-negative; direction is carried by `is_expense`
    pub amount: f64,
    pub currency: String,
    pub is_expense: bool,
    pub category_id: Option<i64>,
    pub merchant_id: Option<i64>,
}

impl Transaction {
    /// The descriptive fields the categorization engine looks at
    pub fn fields(&self) -> TransactionFields {
        TransactionFields {
            description: self.description.clone(),
            raw_description: self.raw_description.clone(),
            counterparty_account: self.counterparty_account.clone(),
            bank_category: self.bank_category.clone(),
        }
    }

    /// Field value selected by a rule or budget item
    pub fn field(&self, field: MatchField) -> &str {
        match field {
            MatchField::Description => &self.description,
            MatchField::RawDescription => &self.raw_description,
            MatchField::CounterpartyAccount => &self.counterparty_account,
        }
    }
}

/// A new transaction to be stored (before DB insertion)
#[derive(Debug, Clone, Default)]
pub struct NewTransaction {
    pub account_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub raw_description: String,
    pub counterparty_account: String,
    pub bank_category: String,
    pub amount: f64,
    pub currency: String,
    pub is_expense: bool,
    pub category_id: Option<i64>,
    pub merchant_id: Option<i64>,
}

/// Matchable descriptive fields of a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFields {
    pub description: String,
    pub raw_description: String,
    pub counterparty_account: String,
    pub bank_category: String,
}

impl TransactionFields {
    /// Field value selected by a rule
    pub fn get(&self, field: MatchField) -> &str {
        match field {
            MatchField::Description => &self.description,
            MatchField::RawDescription => &self.raw_description,
            MatchField::CounterpartyAccount => &self.counterparty_account,
        }
    }
}

/// Pattern matching mode for rules and budget items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// Case-insensitive substring match
    #[default]
    Contains,
    /// Regular expression match
    Regex,
    /// Exact string match (case-insensitive)
    Exact,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Regex => "regex",
            Self::Exact => "exact",
        }
    }
}

impl std::str::FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contains" => Ok(Self::Contains),
            "regex" => Ok(Self::Regex),
            "exact" => Ok(Self::Exact),
            _ => Err(format!("Unknown pattern type: {}", s)),
        }
    }
}

/// Which transaction field a pattern is tested against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    #[default]
    Description,
    RawDescription,
    CounterpartyAccount,
}

impl MatchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::RawDescription => "raw_description",
            Self::CounterpartyAccount => "counterparty_account",
        }
    }
}

impl std::str::FromStr for MatchField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "description" => Ok(Self::Description),
            "raw_description" => Ok(Self::RawDescription),
            "counterparty_account" => Ok(Self::CounterpartyAccount),
            _ => Err(format!("Unknown match field: {}", s)),
        }
    }
}

/// A user-defined categorization rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRule {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    /// The pattern to match against the selected field
    pub pattern: String,
    pub pattern_type: PatternType,
    pub match_field: MatchField,
    pub category_id: Option<i64>,
    pub merchant_id: Option<i64>,
    /// Higher priority rules are checked first
    pub priority: i32,
    pub active: bool,
}

/// A rule to be stored
#[derive(Debug, Clone)]
pub struct NewImportRule {
    pub name: String,
    pub pattern: String,
    pub pattern_type: PatternType,
    pub match_field: MatchField,
    pub category_id: Option<i64>,
    pub merchant_id: Option<i64>,
    pub priority: i32,
    pub active: bool,
}

/// How often a budget item's amount is due
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetFrequency {
    #[default]
    Monthly,
    Yearly,
}

impl BudgetFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for BudgetFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown budget frequency: {}", s)),
        }
    }
}

/// A budget group (e.g. "Housing") with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub sort_order: i32,
    pub is_active: bool,
    /// Ordered by `sort_order`
    pub items: Vec<BudgetItem>,
}

/// A single budget line item with optional match criteria
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: i64,
    pub budget_id: i64,
    pub name: String,
    pub budgeted_amount: f64,
    pub currency: String,
    pub frequency: BudgetFrequency,
    pub match_pattern: Option<String>,
    pub match_pattern_type: PatternType,
    pub match_field: MatchField,
    pub match_category_id: Option<i64>,
    pub match_merchant_id: Option<i64>,
    /// Restricts matching to one account, combined with the other criteria
    pub match_account_id: Option<i64>,
    pub sort_order: i32,
    pub is_active: bool,
}

/// A budget item to be stored
#[derive(Debug, Clone, Default)]
pub struct NewBudgetItem {
    pub name: String,
    pub budgeted_amount: f64,
    pub currency: String,
    pub frequency: BudgetFrequency,
    pub match_pattern: Option<String>,
    pub match_pattern_type: PatternType,
    pub match_field: MatchField,
    pub match_category_id: Option<i64>,
    pub match_merchant_id: Option<i64>,
    pub match_account_id: Option<i64>,
    pub sort_order: i32,
    pub is_active: bool,
}

/// How an income source is paid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeType {
    #[default]
    Fixed,
    Hourly,
}

impl IncomeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Hourly => "hourly",
        }
    }
}

impl std::str::FromStr for IncomeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "hourly" => Ok(Self::Hourly),
            _ => Err(format!("Unknown income type: {}", s)),
        }
    }
}

/// A source of income (salary, contract work)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub income_type: IncomeType,
    /// Monthly amount for fixed income, hourly rate for hourly income
    pub amount: f64,
    pub currency: String,
    /// Hours per month used when no override is recorded
    pub default_hours: f64,
    pub is_active: bool,
}

/// An income source to be stored
#[derive(Debug, Clone, Default)]
pub struct NewIncomeSource {
    pub name: String,
    pub income_type: IncomeType,
    pub amount: f64,
    pub currency: String,
    pub default_hours: f64,
    pub is_active: bool,
}

/// Actual hours worked for an hourly income source in one month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeHours {
    pub income_source_id: i64,
    pub year: i32,
    pub month: u32,
    pub hours: f64,
}

/// Detected or declared payment frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
    /// Regular, but not one of the standard periods
    Custom,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Custom => "custom",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

/// Lifecycle status of a tracked recurring payment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringStatus {
    #[default]
    Active,
    Paused,
    Cancelled,
}

impl RecurringStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for RecurringStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown recurring status: {}", s)),
        }
    }
}

/// A tracked recurring payment (subscription, bill)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub id: i64,
    pub workspace_id: i64,
    pub merchant_id: i64,
    pub account_id: Option<i64>,
    pub expected_amount: f64,
    pub frequency: Frequency,
    pub frequency_days: i64,
    pub next_due: Option<NaiveDate>,
    pub last_paid: Option<NaiveDate>,
    pub status: RecurringStatus,
}

/// A recurring payment to be stored
#[derive(Debug, Clone)]
pub struct NewRecurringPayment {
    pub merchant_id: i64,
    pub account_id: Option<i64>,
    pub expected_amount: f64,
    pub frequency: Frequency,
    pub frequency_days: i64,
    pub next_due: Option<NaiveDate>,
    pub last_paid: Option<NaiveDate>,
    pub status: RecurringStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_label_fallback() {
        let mut merchant = Merchant {
            id: 1,
            workspace_id: 1,
            name: "NETFLIX".to_string(),
            display_name: None,
            patterns: vec![],
            category_id: None,
            is_subscription: true,
        };
        assert_eq!(merchant.label(), "NETFLIX");

        merchant.display_name = Some(String::new());
        assert_eq!(merchant.label(), "NETFLIX");

        merchant.display_name = Some("Netflix".to_string());
        assert_eq!(merchant.label(), "Netflix");
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("REGEX".parse::<PatternType>().unwrap(), PatternType::Regex);
        assert_eq!(
            "counterparty_account".parse::<MatchField>().unwrap(),
            MatchField::CounterpartyAccount
        );
        assert_eq!("biweekly".parse::<Frequency>().unwrap(), Frequency::Biweekly);
        assert!("fortnightly".parse::<Frequency>().is_err());
        assert_eq!(Frequency::Custom.as_str(), "custom");
    }
}
