//! Date/time formatting with operator-supplied strftime patterns.
//!
//! A bad pattern must never break a resolution pass, so formatting falls
//! back to the built-in pattern after a warning.

use crate::config::{DEFAULT_DATETIME_FORMAT, DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

fn pattern_ok(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

fn format_with_fallback(at: DateTime<Utc>, pattern: &str, fallback: &str) -> String {
    if pattern_ok(pattern) {
        at.format(pattern).to_string()
    } else {
        tracing::warn!(pattern, fallback, "invalid time format pattern");
        at.format(fallback).to_string()
    }
}

pub fn format_datetime(at: DateTime<Utc>, pattern: &str) -> String {
    format_with_fallback(at, pattern, DEFAULT_DATETIME_FORMAT)
}

pub fn format_date(at: DateTime<Utc>, pattern: &str) -> String {
    format_with_fallback(at, pattern, DEFAULT_DATE_FORMAT)
}

pub fn format_time(at: DateTime<Utc>, pattern: &str) -> String {
    format_with_fallback(at, pattern, DEFAULT_TIME_FORMAT)
}
