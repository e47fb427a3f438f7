//! # Display Formatting
//!
//! Locale-aware rendering of numbers, currency, percentages and dates for the
//! `formatted` half of a [`CalculationResult`](crate::result::CalculationResult).
//!
//! ```rust
//! use calc_core::format::{format_currency, format_number, format_signed_percent, Locale};
//!
//! assert_eq!(format_number(1234567.891, 2, Locale::En), "1,234,567.89");
//! assert_eq!(format_number(1234567.891, 2, Locale::De), "1.234.567,89");
//! assert_eq!(format_currency(1806.11, "USD", Locale::En), "$1,806.11");
//! assert_eq!(format_currency(1806.11, "EUR", Locale::Es), "1.806,11 €");
//! assert_eq!(format_signed_percent(3.0, 2, Locale::En), "+3.00%");
//! ```

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::i18n::Translations;

/// Caller locale. Selects number separators (for output and for numbers typed
/// as text) and currency symbol placement; wording comes from the caller's
/// translation bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
    Pt,
    Fr,
    De,
}

impl Locale {
    pub const ALL: [Locale; 5] = [Locale::En, Locale::Es, Locale::Pt, Locale::Fr, Locale::De];

    /// Parse a language tag such as `"es"` or `"pt-BR"`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lang = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match lang.as_str() {
            "en" => Some(Locale::En),
            "es" => Some(Locale::Es),
            "pt" => Some(Locale::Pt),
            "fr" => Some(Locale::Fr),
            "de" => Some(Locale::De),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::Pt => "pt",
            Locale::Fr => "fr",
            Locale::De => "de",
        }
    }

    fn thousands_separator(&self) -> &'static str {
        match self {
            Locale::En => ",",
            Locale::Es | Locale::Pt | Locale::De => ".",
            Locale::Fr => "\u{a0}",
        }
    }

    fn decimal_separator(&self) -> &'static str {
        match self {
            Locale::En => ".",
            _ => ",",
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| format!("unsupported locale '{s}'"))
    }
}

/// Currency symbol for an ISO 4217 code. Unknown codes render as the code.
pub fn currency_symbol(code: &str) -> String {
    let symbol = match code.trim().to_ascii_uppercase().as_str() {
        "USD" | "MXN" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "BRL" => "R$",
        "CAD" => "CA$",
        "AUD" => "A$",
        "JPY" => "¥",
        "INR" => "₹",
        "CHF" => "CHF",
        "" => "$",
        other => return other.to_string(),
    };
    symbol.to_string()
}

/// Group the digits of a non-negative integer string.
fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// Format a number with thousands separators and a fixed number of decimals.
pub fn format_number(value: f64, decimals: usize, locale: Locale) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');

    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, locale.thousands_separator()));
    if let Some(frac) = frac_part {
        out.push_str(locale.decimal_separator());
        out.push_str(frac);
    }
    out
}

/// Parse a number typed in `locale`'s convention, the inverse of
/// [`format_number`].
///
/// English treats `,` as grouping. The other locales treat `,` as the decimal
/// mark and `.` as grouping, but a value with no `,` is read as-is, so
/// `"1.5"` from a numeric form widget still means one and a half.
pub fn parse_number(raw: &str, locale: Locale) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = match locale {
        Locale::En => compact.replace(',', ""),
        _ if compact.contains(',') => compact.replace('.', "").replace(',', "."),
        _ => compact,
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a whole-number count.
pub fn format_count(value: f64, locale: Locale) -> String {
    format_number(value.round(), 0, locale)
}

/// Format a currency amount with two decimals and the code's symbol.
pub fn format_currency(value: f64, currency_code: &str, locale: Locale) -> String {
    let symbol = currency_symbol(currency_code);
    let amount = format_number(value.abs(), 2, locale);
    let sign = if value < 0.0 && amount.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match locale {
        Locale::En => format!("{sign}{symbol}{amount}"),
        _ => format!("{sign}{amount} {symbol}"),
    }
}

/// Format a percentage (`value` already in percent units).
pub fn format_percent(value: f64, decimals: usize, locale: Locale) -> String {
    format!("{}%", format_number(value, decimals, locale))
}

/// Format a percentage with an explicit leading sign.
pub fn format_signed_percent(value: f64, decimals: usize, locale: Locale) -> String {
    let body = format_percent(value, decimals, locale);
    if body.starts_with('-') || !body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        body
    } else {
        format!("+{body}")
    }
}

/// Month abbreviation keys, January first.
const MONTH_KEYS: [(&str, &str); 12] = [
    ("months.jan", "Jan"),
    ("months.feb", "Feb"),
    ("months.mar", "Mar"),
    ("months.apr", "Apr"),
    ("months.may", "May"),
    ("months.jun", "Jun"),
    ("months.jul", "Jul"),
    ("months.aug", "Aug"),
    ("months.sep", "Sep"),
    ("months.oct", "Oct"),
    ("months.nov", "Nov"),
    ("months.dec", "Dec"),
];

/// Short date such as `Feb 1` (English) or `1 feb` when the locale puts the
/// day first.
pub fn short_date(date: &NaiveDateTime, translations: &Translations<'_>, locale: Locale) -> String {
    let (key, default) = MONTH_KEYS[date.month0() as usize];
    let month = translations.text(key, default);
    match locale {
        Locale::En => format!("{} {}", month, date.day()),
        _ => format!("{} {}", date.day(), month),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_date_time;
    use std::collections::BTreeMap;

    #[test]
    fn test_parse_number_follows_locale() {
        assert_eq!(parse_number("1,234.5", Locale::En), Some(1234.5));
        assert_eq!(parse_number("1,5", Locale::Es), Some(1.5));
        assert_eq!(parse_number("1.234,5", Locale::De), Some(1234.5));
        assert_eq!(parse_number("1\u{a0}234,5", Locale::Fr), Some(1234.5));
        assert_eq!(parse_number("1.5", Locale::Pt), Some(1.5));
        assert_eq!(parse_number(" 40 ", Locale::De), Some(40.0));
        assert_eq!(parse_number("abc", Locale::En), None);
        assert_eq!(parse_number("inf", Locale::En), None);
    }

    #[test]
    fn test_grouping() {
        assert_eq!(format_number(0.0, 2, Locale::En), "0.00");
        assert_eq!(format_number(999.0, 0, Locale::En), "999");
        assert_eq!(format_number(1000.0, 0, Locale::En), "1,000");
        assert_eq!(format_number(-1234.5, 1, Locale::En), "-1,234.5");
        assert_eq!(format_number(1234.5, 1, Locale::Fr), "1\u{a0}234,5");
    }

    #[test]
    fn test_negative_zero_is_unsigned() {
        assert_eq!(format_number(-0.001, 2, Locale::En), "0.00");
        assert_eq!(format_signed_percent(-0.001, 1, Locale::En), "0.0%");
    }

    #[test]
    fn test_signed_percent() {
        assert_eq!(format_signed_percent(144.8, 1, Locale::En), "+144.8%");
        assert_eq!(format_signed_percent(-12.346, 2, Locale::En), "-12.35%");
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(currency_symbol("usd"), "$");
        assert_eq!(currency_symbol("BRL"), "R$");
        assert_eq!(currency_symbol("XYZ"), "XYZ");
        assert_eq!(format_currency(-5.0, "GBP", Locale::En), "-£5.00");
        assert_eq!(format_currency(1234.5, "BRL", Locale::Pt), "1.234,50 R$");
    }

    #[test]
    fn test_short_date_uses_translations() {
        let date = parse_date_time("2026-02-01").unwrap();
        let empty = BTreeMap::new();
        assert_eq!(short_date(&date, &Translations::new(&empty), Locale::En), "Feb 1");

        let mut es = BTreeMap::new();
        es.insert("months.feb".to_string(), "feb".to_string());
        assert_eq!(short_date(&date, &Translations::new(&es), Locale::Es), "1 feb");
    }

    #[test]
    fn test_locale_tags() {
        assert_eq!(Locale::from_tag("pt-BR"), Some(Locale::Pt));
        assert_eq!("de".parse::<Locale>().unwrap(), Locale::De);
        assert!("xx".parse::<Locale>().is_err());
    }
}
