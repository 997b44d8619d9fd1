//! Pattern matching shared by categorization rules, merchant recognition
//! and budget items.
//!
//! Two flavours:
//! - [`CompiledPattern`]: contains / exact / regex against a single field
//! - [`WildcardPattern`]: merchant patterns where `*` matches anything,
//!   evaluated as a case-insensitive substring search
//!
//! Regexes are compiled once. A pattern that fails to compile is kept but
//! never matches, so one bad rule cannot break a whole run.

use regex::Regex;
use tracing::warn;

use crate::models::PatternType;

/// A pattern prepared for repeated evaluation
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: String,
    pattern_type: PatternType,
    /// Only set for valid regex patterns
    regex: Option<Regex>,
}

impl CompiledPattern {
    pub fn new(pattern: &str, pattern_type: PatternType) -> Self {
        let regex = match pattern_type {
            PatternType::Regex => match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Ignoring invalid regex pattern '{}': {}", pattern, e);
                    None
                }
            },
            PatternType::Contains | PatternType::Exact => None,
        };

        Self {
            pattern: pattern.to_string(),
            pattern_type,
            regex,
        }
    }

    /// False only for regex patterns that failed to compile
    pub fn is_valid(&self) -> bool {
        self.pattern_type != PatternType::Regex || self.regex.is_some()
    }

    /// Test a field value against this pattern
    pub fn is_match(&self, field: &str) -> bool {
        match self.pattern_type {
            PatternType::Contains => field
                .trim()
                .to_uppercase()
                .contains(&self.pattern.trim().to_uppercase()),
            PatternType::Exact => field.to_lowercase() == self.pattern.to_lowercase(),
            PatternType::Regex => self.regex.as_ref().is_some_and(|re| re.is_match(field)),
        }
    }
}

/// One-shot form of [`CompiledPattern::is_match`]
pub fn matches(field: &str, pattern: &str, pattern_type: PatternType) -> bool {
    CompiledPattern::new(pattern, pattern_type).is_match(field)
}

/// Merchant wildcard pattern (`NETFLIX*`, `*SPOTIFY*`)
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    regex: Regex,
}

impl WildcardPattern {
    /// Compile a wildcard pattern; `None` if the expansion is not a valid regex
    pub fn new(pattern: &str) -> Option<Self> {
        let expanded = format!("(?i){}", pattern.replace('*', ".*"));
        match Regex::new(&expanded) {
            Ok(regex) => Some(Self { regex }),
            Err(e) => {
                warn!("Ignoring invalid merchant pattern '{}': {}", pattern, e);
                None
            }
        }
    }

    /// Substring search against the trimmed, uppercased value
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(&value.trim().to_uppercase())
    }
}
