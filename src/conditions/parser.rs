//! attribute payload decoding and linting
//!
//! decoding is tolerant: missing optional values deserialize to their
//! neutral defaults and unknown payload fields are preserved. linting
//! reports the things decoding deliberately tolerates, so editors can
//! find typos before a block silently stops matching.

use super::period::{PeriodMethod, PeriodSetting};
use super::types::{
    BlockAttributes, Condition, ConditionEntry, ConditionRule, CustomFieldRule, PagePredicate,
};

/// decode a marker payload into block attributes
pub fn parse_attributes(payload: &str) -> Result<BlockAttributes, serde_json::Error> {
    serde_json::from_str(payload)
}

/// lint a raw payload: decode errors plus everything `lint_attributes` finds
pub fn lint_payload(payload: &str) -> Vec<String> {
    match parse_attributes(payload) {
        Ok(attrs) => lint_attributes(&attrs),
        Err(e) => vec![format!("invalid JSON payload: {}", e)],
    }
}

/// report tolerated-but-suspicious condition parameters
pub fn lint_attributes(attrs: &BlockAttributes) -> Vec<String> {
    let mut warnings = Vec::new();

    for entry in &attrs.conditions {
        match entry {
            ConditionEntry::Single(c) => lint_condition(c, &mut warnings),
            ConditionEntry::Group(g) => {
                for c in &g.conditions {
                    lint_condition(c, &mut warnings);
                }
            }
        }
    }

    warnings
}

fn lint_condition(condition: &Condition, warnings: &mut Vec<String>) {
    match &condition.rule {
        ConditionRule::PageType {
            page_type: Some(name),
        } if !name.is_empty() && name != "none" && PagePredicate::parse(name).is_none() => {
            match PagePredicate::suggest(name) {
                Some(s) => warnings.push(format!(
                    "condition {}: unknown page type predicate '{}' (did you mean '{}'?)",
                    condition.id, name, s
                )),
                None => warnings.push(format!(
                    "condition {}: unknown page type predicate '{}'",
                    condition.id, name
                )),
            }
        }
        ConditionRule::CustomField {
            rule: Some(rule), ..
        } if CustomFieldRule::parse(rule).is_none() => {
            warnings.push(format!(
                "condition {}: unknown custom field rule '{}' (falls back to valueExists)",
                condition.id, rule
            ));
        }
        ConditionRule::Period {
            setting, method, ..
        } => {
            if let Some(s) = setting {
                if !s.is_empty() && PeriodSetting::parse(s).is_none() {
                    warnings.push(format!(
                        "condition {}: unknown period setting '{}'",
                        condition.id, s
                    ));
                }
            }
            if let Some(m) = method {
                if !m.is_empty() && PeriodMethod::parse(m).is_none() {
                    warnings.push(format!(
                        "condition {}: unknown period specification method '{}'",
                        condition.id, m
                    ));
                }
            }
        }
        _ => {}
    }
}
