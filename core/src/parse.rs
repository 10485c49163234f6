//! Free-text answer parsers for the capacity interview.
//!
//! Users reply in everyday Indonesian ("500 ribu", "1,5 juta",
//! "setiap hari", "setengah"); each parser turns one reply into a
//! number or None. A None (or out-of-range) value is a retry at the
//! same interview step, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_CURRENCY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^rp\.?\s*").unwrap());
static RE_MILLIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:juta|jt)\b").unwrap());
static RE_THOUSANDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:ribu|rb)\b").unwrap());
static RE_DAYS_PER_WEEK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*hari\s*(?:seminggu|per\s*minggu)").unwrap());
static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Rupiah amounts: "Rp 500.000", "500 ribu", "500rb", "1,5 juta",
/// "2jt", "500000". A decimal comma in the multiplier forms is a
/// decimal point; dots and commas elsewhere are thousands separators.
pub fn parse_currency(text: &str) -> Option<f64> {
    let text = RE_CURRENCY_PREFIX.replace(text.trim(), "");

    if let Some(caps) = RE_MILLIONS.captures(&text) {
        let n: f64 = caps[1].replace(',', ".").parse().ok()?;
        return finite(n * 1_000_000.0);
    }
    if let Some(caps) = RE_THOUSANDS.captures(&text) {
        let n: f64 = caps[1].replace(',', ".").parse().ok()?;
        return finite(n * 1_000.0);
    }

    let stripped = text.replace(['.', ','], "");
    let digits = RE_DIGITS.find(&stripped)?;
    let n: f64 = digits.as_str().parse().ok()?;
    finite(n)
}

/// Active days per month: "25 hari", "25", "setiap hari" (30),
/// "6 hari seminggu" (weekly count scaled by 4.33 weeks/month).
pub fn parse_days(text: &str) -> Option<f64> {
    let text = text.trim().to_lowercase();

    if let Some(caps) = RE_DAYS_PER_WEEK.captures(&text) {
        let per_week: f64 = caps[1].parse().ok()?;
        return finite((per_week * 4.33).round());
    }

    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    if !has_digit && (text.contains("setiap hari") || text.contains("tiap hari")) {
        return Some(30.0);
    }

    let digits = RE_DIGITS.find(&text)?;
    digits.as_str().parse::<f64>().ok()
}

/// Percentages: "60%", "60", and the spoken fractions
/// setengah/separuh (50), sepertiga (33), seperempat (25).
pub fn parse_percentage(text: &str) -> Option<f64> {
    let text = text.trim().to_lowercase();

    if text.contains("setengah") || text.contains("separuh") {
        return Some(50.0);
    }
    if text.contains("sepertiga") {
        return Some(33.0);
    }
    if text.contains("seperempat") {
        return Some(25.0);
    }

    let digits = RE_DIGITS.find(&text)?;
    digits.as_str().parse::<f64>().ok()
}

fn finite(n: f64) -> Option<f64> {
    n.is_finite().then_some(n)
}
