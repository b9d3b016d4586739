use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// `22.03.2011`, possibly followed by `17:00 Uhr` or similar.
const NUMERIC_PATTERN: &str = r"^(\d+)\.(\d+)\.(\d+)";
/// `22. März 2011`.
const TEXTUAL_PATTERN: &str = r"^(\d+)\. (\w+) (\d+)";

fn numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NUMERIC_PATTERN).unwrap_or_else(|_| unreachable!()))
}

fn textual_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TEXTUAL_PATTERN).unwrap_or_else(|_| unreachable!()))
}

pub fn german_month_to_number(month: &str) -> Option<u32> {
    match month.to_lowercase().as_str() {
        "januar" => Some(1),
        "februar" => Some(2),
        "märz" | "maerz" => Some(3),
        "april" => Some(4),
        "mai" => Some(5),
        "juni" => Some(6),
        "juli" => Some(7),
        "august" => Some(8),
        "september" => Some(9),
        "oktober" => Some(10),
        "november" => Some(11),
        "dezember" => Some(12),
        _ => None,
    }
}

/// Parse a date from page metadata.
///
/// The numeric form is tried first. Once a pattern matches, only the matched
/// prefix is parsed and no other pattern is tried; a match that does not form
/// a valid calendar date yields `None`.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    let parsed = if let Some(caps) = numeric_re().captures(trimmed) {
        let month = parse_component(&caps[2], 2);
        build_date(&caps[1], month, &caps[3])
    } else if let Some(caps) = textual_re().captures(trimmed) {
        let month = german_month_to_number(&caps[2]);
        build_date(&caps[1], month, &caps[3])
    } else {
        tracing::warn!(raw = %trimmed, "could not parse date");
        return None;
    };

    if parsed.is_none() {
        tracing::warn!(raw = %trimmed, "date matched a known format but is not a valid date");
    }
    parsed
}

fn build_date(day: &str, month: Option<u32>, year: &str) -> Option<NaiveDate> {
    let day = parse_component(day, 2)?;
    let month = month?;
    if year.len() != 4 {
        return None;
    }
    let year = year.parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_component(digits: &str, max_len: usize) -> Option<u32> {
    if digits.len() > max_len {
        return None;
    }
    digits.parse().ok()
}
