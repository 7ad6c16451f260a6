//! Price text normalization.
//!
//! Turns free-form price text such as `"€ 1,234.00"` or `"NZD 99,9"` into a number.
//! Separators are disambiguated with a fixed precedence:
//!
//! 1. both `,` and `.` present: `,` is a thousands separator, `.` the decimal point
//! 2. only `,`, followed by exactly three digits: thousands separator
//! 3. only `,`, followed by one or two digits: decimal separator
//! 4. anything else is parsed as is
//!
//! Rule 1 means `"1.234,56"` (dot thousands, comma decimal) normalizes to `1.23456`.
//! This is a known limitation kept for compatibility with previously collected data.

use regex::Regex;
use std::sync::LazyLock;

static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d.,]").expect("valid price regex"));

/// Normalizes price text to a number, or `None` when no price can be read.
///
/// Never fails: empty input, text without digits, or more than one decimal point after
/// separator resolution all yield `None`.
pub fn normalize_price(text: &str) -> Option<f64> {
    let cleaned = NON_NUMERIC.replace_all(text, "");
    let has_comma = cleaned.contains(',');
    let has_dot = cleaned.contains('.');

    let resolved = if has_comma && has_dot {
        cleaned.replace(',', "")
    } else if has_comma {
        let trailing = cleaned.rsplit(',').next().map(str::len).unwrap_or(0);
        match trailing {
            3 => cleaned.replace(',', ""),
            1 | 2 => cleaned.replace(',', "."),
            _ => cleaned.into_owned(),
        }
    } else {
        cleaned.into_owned()
    };

    resolved.parse::<f64>().ok().filter(|value| value.is_finite())
}
