//! legacy attribute migration
//!
//! the pre-conditions-array schema stored one flat field per restriction
//! (`ifPageType`, `userRole`, ...). migration rewrites each qualifying
//! marker payload into the `conditions` array exactly once: old keys are
//! removed only when something was actually ported, and payloads with
//! nothing to port are left byte-identical. running the migration twice
//! produces the same output as running it once.

use chrono::Utc;
use serde_json::{Map, Value};

use crate::conditions::{Condition, ConditionRule};

use super::marker::{self, Edit};

/// primary legacy fields, in migration emission order
const LEGACY_PRIMARY: [&str; 8] = [
    "ifPageType",
    "ifPostType",
    "ifLanguage",
    "userRole",
    "postAuthor",
    "customFieldName",
    "periodDisplaySetting",
    "showOnlyLoginUser",
];

/// companion fields that travel with (and are removed with) a primary
const LEGACY_COMPANIONS: [&str; 5] = [
    "customFieldRule",
    "customFieldValue",
    "periodSpecificationMethod",
    "periodDisplayValue",
    "periodReferCustomField",
];

/// rewrite every qualifying legacy marker in `content`
///
/// markers with malformed payloads or nothing to port are left untouched;
/// when no marker qualifies the returned text is byte-identical to the
/// input.
pub fn migrate_content(content: &str) -> String {
    migrate_content_at(content, Utc::now().timestamp())
}

/// like [`migrate_content`] with an explicit id timestamp
pub fn migrate_content_at(content: &str, timestamp: i64) -> String {
    let mut edits = Vec::new();

    for m in marker::scan(content) {
        // malformed JSON: skip this marker, keep going
        let payload = match serde_json::from_str::<Value>(m.payload) {
            Ok(Value::Object(map)) => map,
            _ => continue,
        };

        if let Some(migrated) = migrate_payload_at(&payload, timestamp) {
            edits.push(Edit {
                span: m.payload_span,
                replacement: Value::Object(migrated).to_string(),
            });
        }
    }

    marker::apply_edits(content, edits)
}

/// whether any marker in `content` still carries qualifying legacy fields
pub fn has_pending(content: &str) -> bool {
    marker::scan(content).iter().any(|m| {
        matches!(
            serde_json::from_str::<Value>(m.payload),
            Ok(Value::Object(ref map)) if payload_qualifies(map)
        )
    })
}

/// whether a single raw payload still carries qualifying legacy fields
pub fn payload_is_legacy(payload: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(payload),
        Ok(Value::Object(ref map)) if payload_qualifies(map)
    )
}

fn payload_qualifies(payload: &Map<String, Value>) -> bool {
    LEGACY_PRIMARY
        .iter()
        .any(|f| payload.get(*f).map(|v| qualifies(f, v)).unwrap_or(false))
}

/// port one decoded payload, or None when nothing qualifies
fn migrate_payload_at(payload: &Map<String, Value>, timestamp: i64) -> Option<Map<String, Value>> {
    let mut conditions = Vec::new();

    for field in LEGACY_PRIMARY {
        let value = match payload.get(field) {
            Some(v) if qualifies(field, v) => v,
            _ => continue,
        };
        if let Some(rule) = build_rule(field, value, payload) {
            let id = format!("migrated_{}_{}", rule.type_name(), timestamp);
            let cond = Condition::with_id(id, rule);
            match serde_json::to_value(&cond) {
                Ok(v) => conditions.push(v),
                Err(_) => continue,
            }
        }
    }

    if conditions.is_empty() {
        return None;
    }

    let mut out = payload.clone();
    for key in LEGACY_PRIMARY.iter().chain(LEGACY_COMPANIONS.iter()) {
        out.remove(*key);
    }

    // a payload carrying both schemas keeps its existing conditions first
    match out.get_mut("conditions") {
        Some(Value::Array(existing)) => existing.extend(conditions),
        _ => {
            out.insert("conditions".to_string(), Value::Array(conditions));
        }
    }

    Some(out)
}

/// the qualification test: present, non-empty, and not the "none" sentinel
/// (non-empty array for userRole, nonzero for postAuthor, true for
/// showOnlyLoginUser)
fn qualifies(field: &str, value: &Value) -> bool {
    match field {
        "userRole" => value.as_array().map(|a| !a.is_empty()).unwrap_or(false),
        "postAuthor" => author_id(value) != 0,
        "showOnlyLoginUser" => value.as_bool().unwrap_or(false),
        _ => value
            .as_str()
            .map(|s| !s.is_empty() && s != "none")
            .unwrap_or(false),
    }
}

fn author_id(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or(0)
}

fn str_field(payload: &Map<String, Value>, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn build_rule(field: &str, value: &Value, payload: &Map<String, Value>) -> Option<ConditionRule> {
    match field {
        "ifPageType" => Some(ConditionRule::PageType {
            page_type: value.as_str().map(str::to_string),
        }),
        "ifPostType" => Some(ConditionRule::PostType {
            post_type: value.as_str().map(str::to_string),
        }),
        "ifLanguage" => Some(ConditionRule::Language {
            language: value.as_str().map(str::to_string),
        }),
        "userRole" => Some(ConditionRule::UserRole {
            roles: value
                .as_array()
                .map(|a| {
                    a.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }),
        "postAuthor" => Some(ConditionRule::PostAuthor {
            author: author_id(value),
        }),
        "customFieldName" => Some(ConditionRule::CustomField {
            name: value.as_str().map(str::to_string),
            rule: str_field(payload, "customFieldRule"),
            value: str_field(payload, "customFieldValue"),
        }),
        "periodDisplaySetting" => Some(ConditionRule::Period {
            setting: value.as_str().map(str::to_string),
            method: str_field(payload, "periodSpecificationMethod"),
            value: str_field(payload, "periodDisplayValue"),
            refer_custom_field: str_field(payload, "periodReferCustomField"),
        }),
        "showOnlyLoginUser" => Some(ConditionRule::LoginUser {
            only_login_user: true,
        }),
        _ => None,
    }
}
