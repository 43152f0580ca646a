// Utility helpers for parsing and presentation formatting.
//
// This module centralizes all the "dirty" CSV/number handling so the rest
// of the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64`.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Returns `None` for empty cells, text, and non-finite results such as
///   `NaN` or `inf`.
///
/// Thousands separators are not stripped: a cell like `12,5` is ambiguous
/// between a decimal comma and grouping, so it is treated as unparseable.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A period cell read as a number. Spreadsheet exports sometimes write
/// `2019.0`, which is accepted as long as there is no fractional part.
pub fn whole_year(v: f64) -> Option<i32> {
    if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}

/// A population cell read as a number: non-negative and whole.
pub fn head_count(v: f64) -> Option<u64> {
    if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
        Some(v as u64)
    } else {
        None
    }
}

/// Canonical form of an administrative name: trimmed, inner whitespace
/// collapsed to single spaces, upper case.
pub fn normalize_key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let neg = n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion. Past the
    // range of `i64` the digits are kept ungrouped.
    let mut res = match int_part.parse::<i64>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `1,874 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_rejects_text_and_non_finite() {
        assert_eq!(parse_f64_safe(Some(" 12.5 ")), Some(12.5));
        assert_eq!(parse_f64_safe(Some("1e3")), Some(1000.0));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n/d")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(Some("12,5")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn years_and_counts() {
        assert_eq!(whole_year(2019.0), Some(2019));
        assert_eq!(whole_year(2020.5), None);
        assert_eq!(head_count(15300.0), Some(15300));
        assert_eq!(head_count(-3.0), None);
        assert_eq!(head_count(12.25), None);
    }

    #[test]
    fn keys_are_trimmed_collapsed_and_upper_cased() {
        assert_eq!(normalize_key("  San   Isidro "), "SAN ISIDRO");
        assert_eq!(normalize_key("Breña"), "BREÑA");
    }

    #[test]
    fn numbers_are_grouped_with_fixed_decimals() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-50.0, 2), "-50.00");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(3.0, 0), "3");
        assert_eq!(format_int(9855usize), "9,855");
    }

    #[test]
    fn huge_values_keep_their_digits() {
        assert_eq!(format_number(1e20, 2), "100000000000000000000.00");
        assert_eq!(format_number(-1e20, 0), "-100000000000000000000");
        assert_eq!(format_number(9.0e18, 0), "9,000,000,000,000,000,000");
    }
}
