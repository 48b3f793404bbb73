// Utility helpers for parsing cell text and formatting weights.
//
// Cell values coming out of CSV exports and workbooks are loosely typed;
// everything that turns them into numbers, or numbers back into display
// text, lives here.
use num_format::{Locale, ToFormattedString};

/// Parse a weight cell while being forgiving about the usual export noise.
///
/// - Trims whitespace.
/// - Strips thousands separators like `","` before parsing.
/// - Accepts signs and exponents (`"-500"`, `"1.25E+03"`).
/// - Returns `None` for anything that cannot be parsed into a finite number
///   (`"N/A"`, `"nan"`, `"inf"`).
pub fn parse_weight(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `true` if `haystack` contains any of `needles`.
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places plus `,` thousands separators (e.g. `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
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

/// Report cell text: whole units with separators, blank for zero.
pub fn format_weight_cell(n: f64) -> String {
    if n == 0.0 {
        String::new()
    } else {
        format_number(n, 0)
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
