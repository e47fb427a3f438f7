//! # Calculation Input
//!
//! The caller-facing input record shared by every calculator:
//!
//! ```json
//! {
//!   "values": { "length": 40, "width": 25, "pitch": "6/12", "roofType": "gable" },
//!   "fieldUnits": { "length": "ft", "width": "m" },
//!   "translations": { "formats.summary": "Your roof needs {squares} squares." },
//!   "locale": "en"
//! }
//! ```
//!
//! Values arrive loosely typed from forms, so the readers here accept numbers
//! given as strings and treat empty strings and `null` as missing.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::format::{parse_number, Locale};
use crate::units::{normalize_length, LengthUnit};

/// One record of a repeating group (e.g. a single blood draw)
pub type InputRecord = BTreeMap<String, InputValue>;

/// A single input field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// Explicit `null` from the caller
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Repeating group of sub-records
    List(Vec<InputRecord>),
}

impl From<f64> for InputValue {
    fn from(v: f64) -> Self {
        InputValue::Number(v)
    }
}

impl From<i32> for InputValue {
    fn from(v: i32) -> Self {
        InputValue::Number(v as f64)
    }
}

impl From<bool> for InputValue {
    fn from(v: bool) -> Self {
        InputValue::Bool(v)
    }
}

impl From<&str> for InputValue {
    fn from(v: &str) -> Self {
        InputValue::Text(v.to_string())
    }
}

impl From<String> for InputValue {
    fn from(v: String) -> Self {
        InputValue::Text(v)
    }
}

impl From<Vec<InputRecord>> for InputValue {
    fn from(v: Vec<InputRecord>) -> Self {
        InputValue::List(v)
    }
}

/// Input record passed to every calculator's `evaluate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    /// Field identifier -> value
    #[serde(default)]
    pub values: BTreeMap<String, InputValue>,

    /// Optional per-field unit tag (e.g. `"ft"`, `"m"`)
    #[serde(default)]
    pub field_units: BTreeMap<String, String>,

    /// Caller-supplied translation bundle (`values.normal`, `formats.summary`, ...)
    #[serde(default)]
    pub translations: BTreeMap<String, String>,

    /// Locale used for number separators and currency placement
    #[serde(default)]
    pub locale: Locale,
}

impl CalculationInput {
    /// Create an empty input record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a field value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder: tag a field with a unit.
    pub fn with_unit(mut self, key: impl Into<String>, unit: impl Into<String>) -> Self {
        self.field_units.insert(key.into(), unit.into());
        self
    }

    /// Builder: add a translation string.
    pub fn with_translation(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.translations.insert(key.into(), text.into());
        self
    }

    /// Builder: set the output locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Reader over the top-level values.
    pub fn fields(&self) -> Fields<'_> {
        Fields::new(&self.values, self.locale)
    }

    /// Unit tag supplied for a field, if any.
    pub fn unit(&self, key: &str) -> Option<&str> {
        self.field_units.get(key).map(String::as_str)
    }

    /// Read a length and normalize it to `canonical` using the field's unit tag.
    pub fn length(&self, key: &str, canonical: LengthUnit) -> Option<f64> {
        self.fields()
            .number(key)
            .map(|v| normalize_length(v, self.unit(key), canonical))
    }

    /// Required positive length, normalized to `canonical`.
    pub fn positive_length(&self, key: &str, canonical: LengthUnit) -> CalcResult<f64> {
        let raw = self.fields().positive(key)?;
        Ok(normalize_length(raw, self.unit(key), canonical))
    }
}

/// Typed reader over a map of input values.
///
/// Used for both the top-level values and each record of a repeating group.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a BTreeMap<String, InputValue>,
    locale: Locale,
}

impl<'a> Fields<'a> {
    /// Reader whose text numbers are parsed in `locale`'s convention.
    pub fn new(map: &'a BTreeMap<String, InputValue>, locale: Locale) -> Self {
        Fields { map, locale }
    }

    /// Reader over one record of a repeating group, in the same locale.
    pub fn nested(&self, record: &'a InputRecord) -> Fields<'a> {
        Fields::new(record, self.locale)
    }

    /// Numeric value; strings are parsed in the input's locale, blanks and
    /// non-finite values are missing.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.map.get(key)? {
            InputValue::Number(n) => n.is_finite().then_some(*n),
            InputValue::Text(s) => parse_number(s, self.locale),
            _ => None,
        }
    }

    /// Required numeric value.
    pub fn require(&self, key: &str) -> CalcResult<f64> {
        self.number(key).ok_or_else(|| CalcError::missing_field(key))
    }

    /// Required value that must be strictly positive.
    pub fn positive(&self, key: &str) -> CalcResult<f64> {
        let value = self.require(key)?;
        if value <= 0.0 {
            return Err(CalcError::invalid_input(key, value.to_string(), "Must be greater than zero"));
        }
        Ok(value)
    }

    /// Optional value that, when present, must not be negative.
    pub fn non_negative(&self, key: &str) -> CalcResult<Option<f64>> {
        match self.number(key) {
            Some(v) if v < 0.0 => Err(CalcError::invalid_input(key, v.to_string(), "Cannot be negative")),
            other => Ok(other),
        }
    }

    /// Non-blank string value. Numbers are rendered back to text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.map.get(key)? {
            InputValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            InputValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Date or date-time value. Unparseable strings are treated as missing.
    pub fn date(&self, key: &str) -> Option<NaiveDateTime> {
        let raw = self.text(key)?;
        let parsed = parse_date_time(&raw);
        if parsed.is_none() {
            tracing::debug!(field = key, value = %raw, "ignoring unparseable date");
        }
        parsed
    }

    /// Records of a repeating group; empty when absent.
    pub fn list(&self, key: &str) -> &'a [InputRecord] {
        match self.map.get(key) {
            Some(InputValue::List(items)) => items.as_slice(),
            _ => &[],
        }
    }
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS` (a space may
/// replace the `T`). Date-only values are taken at midnight.
pub fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
