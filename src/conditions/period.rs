//! period window checks for the period condition
//!
//! a period condition names a display setting (deadline, startline, or
//! daysSincePublic) and a threshold. the threshold comes either from a
//! literal value or from a named custom field on the current entity.
//! timestamps are naive site-local values, the way editors enter them.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// window modes for the period condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSetting {
    /// no restriction
    None,
    /// show until the threshold: now <= threshold
    Deadline,
    /// show from the threshold on: now >= threshold
    Startline,
    /// show while (now - publish time) in days <= threshold
    DaysSincePublic,
}

impl PeriodSetting {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(PeriodSetting::None),
            "deadline" => Some(PeriodSetting::Deadline),
            "startline" => Some(PeriodSetting::Startline),
            "daysSincePublic" => Some(PeriodSetting::DaysSincePublic),
            _ => None,
        }
    }
}

/// where the period threshold comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodMethod {
    /// literal value on the condition itself
    #[default]
    Direct,
    /// value read from a named custom field
    ReferCustomField,
}

impl PeriodMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "direct" => Some(PeriodMethod::Direct),
            "referCustomField" => Some(PeriodMethod::ReferCustomField),
            _ => None,
        }
    }
}

/// parse a threshold timestamp
///
/// accepts "2026-01-31T18:30", "2026-01-31T18:30:00", the space-separated
/// equivalents, and a bare date (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// check whether `now` satisfies the configured window
///
/// a missing or `none` setting means no restriction. a configured window
/// whose threshold is missing or unparseable fails the check rather than
/// silently passing.
pub fn in_window(
    setting: Option<&str>,
    method: Option<&str>,
    value: Option<&str>,
    refer_field: Option<&str>,
    now: NaiveDateTime,
    published_at: Option<NaiveDateTime>,
    custom_fields: &HashMap<String, String>,
) -> bool {
    let setting = match setting {
        None | Some("") | Some("none") => return true,
        Some(s) => match PeriodSetting::parse(s) {
            Some(PeriodSetting::None) => return true,
            Some(setting) => setting,
            None => {
                eprintln!("warning: unknown period setting: {}", s);
                return false;
            }
        },
    };

    let method = method
        .and_then(PeriodMethod::parse)
        .unwrap_or(PeriodMethod::Direct);

    let raw = match method {
        PeriodMethod::Direct => value,
        PeriodMethod::ReferCustomField => refer_field
            .and_then(|f| custom_fields.get(f))
            .map(String::as_str),
    };

    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => return false,
    };

    match setting {
        PeriodSetting::None => true,
        PeriodSetting::Deadline => parse_timestamp(raw).map(|t| now <= t).unwrap_or(false),
        PeriodSetting::Startline => parse_timestamp(raw).map(|t| now >= t).unwrap_or(false),
        PeriodSetting::DaysSincePublic => {
            let days: i64 = match raw.trim().parse() {
                Ok(d) => d,
                Err(_) => return false,
            };
            published_at
                .map(|p| (now - p).num_days() <= days)
                .unwrap_or(false)
        }
    }
}
