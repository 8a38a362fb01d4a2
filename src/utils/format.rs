//! Display formatting for dashboard figures.
//!
//! Every formatter accepts `Option<f64>` (or anything convertible into it) and
//! returns a fixed placeholder for missing, NaN or infinite input.

use chrono::{DateTime, Utc};

use super::time::parse_timestamp;

pub const CURRENCY_PLACEHOLDER: &str = "$0.00";
pub const PERCENT_PLACEHOLDER: &str = "0.00%";
pub const NUMBER_PLACEHOLDER: &str = "0.00";
pub const AMOUNT_PLACEHOLDER: &str = "0";
pub const DATE_PLACEHOLDER: &str = "N/A";

const THOUSAND: f64 = 1e3;
const MILLION: f64 = 1e6;
const BILLION: f64 = 1e9;

fn finite(value: impl Into<Option<f64>>) -> Option<f64> {
    value.into().filter(|v| v.is_finite())
}

/// Insert `,` every three digits of an unsigned integer string
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `1234.5` -> `$1,234.50`, `-3` -> `-$3.00`
pub fn format_currency(value: impl Into<Option<f64>>) -> String {
    let Some(value) = finite(value) else {
        return CURRENCY_PLACEHOLDER.to_string();
    };

    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };

    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

pub fn format_percentage(value: impl Into<Option<f64>>) -> String {
    match finite(value) {
        Some(v) => format!("{:.2}%", v),
        None => PERCENT_PLACEHOLDER.to_string(),
    }
}

/// Compact magnitude formatting: `1500` -> `1.50K`, `2.5e6` -> `2.50M`
pub fn format_number(value: impl Into<Option<f64>>) -> String {
    let Some(value) = finite(value) else {
        return NUMBER_PLACEHOLDER.to_string();
    };

    let magnitude = value.abs();
    if magnitude >= BILLION {
        format!("{:.2}B", value / BILLION)
    } else if magnitude >= MILLION {
        format!("{:.2}M", value / MILLION)
    } else if magnitude >= THOUSAND {
        format!("{:.2}K", value / THOUSAND)
    } else {
        format!("{:.2}", value)
    }
}

/// Asset quantity with up to six decimals, trailing zeros dropped
pub fn format_amount(value: impl Into<Option<f64>>) -> String {
    let Some(value) = finite(value) else {
        return AMOUNT_PLACEHOLDER.to_string();
    };

    let fixed = format!("{:.6}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => AMOUNT_PLACEHOLDER.to_string(),
        other => other.to_string(),
    }
}

/// `Jan 5, 2025 14:03` for any timestamp shape the backend sends
pub fn format_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(ts) => ts.format("%b %-d, %Y %H:%M").to_string(),
        None => DATE_PLACEHOLDER.to_string(),
    }
}

/// Human "time ago" bucket relative to `now`
pub fn format_relative_time(raw: &str, now: DateTime<Utc>) -> String {
    let Some(ts) = parse_timestamp(raw) else {
        return DATE_PLACEHOLDER.to_string();
    };

    let elapsed = now.signed_duration_since(ts);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        ts.format("%b %-d").to_string()
    }
}
