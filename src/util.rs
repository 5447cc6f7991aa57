// Utility helpers for field normalisation, number parsing and formatting.
//
// Everything that deals with "dirty" CSV text lives here so the analysis
// code only ever sees `Option<f64>`.
use num_format::{Locale, ToFormattedString};

/// The token that marks an absent value, compared case-insensitively.
pub const MISSING_TOKEN: &str = "null";

/// Trim a raw field and map the missing forms (empty, `null`) to `None`.
pub fn normalize_field(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case(MISSING_TOKEN) {
        return None;
    }
    Some(s.to_string())
}

/// Coerce a raw year value to a number.
///
/// - Accepts `Option<&str>` so callers can pass through missing fields.
/// - Empty text and the `null` token are missing, never zero.
/// - Anything unparseable or non-finite (`NaN`, `inf`) is missing too.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case(MISSING_TOKEN) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Recognise a year column header: `year2017` or `year 2017`.
pub fn parse_year_header(name: &str) -> Option<i32> {
    let name = name.trim();
    let prefix = name.get(..4)?;
    if !prefix.eq_ignore_ascii_case("year") {
        return None;
    }
    let digits = name[4..].trim_start();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i32>().ok()
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn std_dev(v: &[f64]) -> f64 {
    // Population standard deviation.
    if v.is_empty() {
        return 0.0;
    }
    let mean = average(v);
    let var = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / v.len() as f64;
    var.sqrt()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators (`1,234.56`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// `format_number` for optional values; missing renders as `-`.
pub fn format_opt(n: Option<f64>, decimals: usize) -> String {
    n.map(|v| format_number(v, decimals))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
