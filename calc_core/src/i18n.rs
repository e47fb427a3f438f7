//! # Translations
//!
//! Calculators never hard-code user-facing phrasing. Every label, unit word and
//! summary template is looked up in the caller's bundle by key, with an English
//! default when the bundle has no entry. Templates use `{name}` placeholders
//! filled from the result's `formatted` map.
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use calc_core::i18n::{fill_template, Translations};
//!
//! let mut bundle = BTreeMap::new();
//! bundle.insert("values.normal".to_string(), "Normal (es)".to_string());
//! let t = Translations::new(&bundle);
//! assert_eq!(t.text("values.normal", "Normal"), "Normal (es)");
//! assert_eq!(t.text("values.slow", "Slow"), "Slow");
//!
//! let mut formatted = BTreeMap::new();
//! formatted.insert("doublingTime".to_string(), "39.3 hours".to_string());
//! assert_eq!(
//!     fill_template("Doubling every {doublingTime}.", &formatted),
//!     "Doubling every 39.3 hours."
//! );
//! ```

use std::collections::BTreeMap;

/// Key of the one-sentence summary template every calculator reads.
pub const SUMMARY_KEY: &str = "formats.summary";

/// Borrowed view of a caller's translation bundle.
#[derive(Debug, Clone, Copy)]
pub struct Translations<'a> {
    bundle: &'a BTreeMap<String, String>,
}

impl<'a> Translations<'a> {
    pub fn new(bundle: &'a BTreeMap<String, String>) -> Self {
        Translations { bundle }
    }

    /// Translated text for `key`, or `default` when the bundle lacks it.
    pub fn text<'b>(&'b self, key: &str, default: &'b str) -> &'b str {
        match self.bundle.get(key) {
            Some(s) if !s.is_empty() => s.as_str(),
            _ => default,
        }
    }

    /// Translated template for `key` with placeholders filled from `formatted`.
    pub fn render(&self, key: &str, default: &str, formatted: &BTreeMap<String, String>) -> String {
        fill_template(self.text(key, default), formatted)
    }

    /// Fill the summary template.
    pub fn summary(&self, default: &str, formatted: &BTreeMap<String, String>) -> String {
        self.render(SUMMARY_KEY, default, formatted)
    }
}

/// Substitute `{name}` placeholders. Unknown placeholders and stray braces are
/// left verbatim.
pub fn fill_template(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['{', '}']) {
            Some(end) if after[end..].starts_with('}') => {
                let name = &after[..end];
                match values.get(name) {
                    Some(v) => out.push_str(v),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            // Stray `{`: keep it and rescan from the inner one.
            Some(inner) => {
                out.push('{');
                out.push_str(&after[..inner]);
                rest = &after[inner..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatted() -> BTreeMap<String, String> {
        let mut m = BTreeMap::new();
        m.insert("amount".to_string(), "$100.00".to_string());
        m.insert("adjustedValue".to_string(), "$244.84".to_string());
        m
    }

    #[test]
    fn test_fill_multiple_placeholders() {
        let out = fill_template("{amount} then is {adjustedValue} now", &formatted());
        assert_eq!(out, "$100.00 then is $244.84 now");
    }

    #[test]
    fn test_unknown_placeholder_left_verbatim() {
        let out = fill_template("{amount} and {missing}", &formatted());
        assert_eq!(out, "$100.00 and {missing}");
    }

    #[test]
    fn test_unbalanced_brace() {
        assert_eq!(fill_template("cost {amount", &formatted()), "cost {amount");
        assert_eq!(fill_template("} {amount}", &formatted()), "} $100.00");
    }

    #[test]
    fn test_stray_open_brace_before_placeholder() {
        assert_eq!(fill_template("{a{amount}", &formatted()), "{a$100.00");
        assert_eq!(fill_template("{{amount}}", &formatted()), "{$100.00}");
        assert_eq!(fill_template("{x {y {amount", &formatted()), "{x {y {amount");
    }

    #[test]
    fn test_empty_translation_falls_back() {
        let mut bundle = BTreeMap::new();
        bundle.insert(SUMMARY_KEY.to_string(), String::new());
        let t = Translations::new(&bundle);
        assert_eq!(t.summary("Total {amount}", &formatted()), "Total $100.00");
    }
}
