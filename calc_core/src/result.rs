//! # Calculation Result
//!
//! The uniform output record every calculator returns:
//!
//! ```json
//! {
//!   "values": { "squares": 14, "roofArea": 1267.81 },
//!   "formatted": { "squares": "14", "roofArea": "1,268 sq ft" },
//!   "summary": "Your roof needs 14 squares.",
//!   "isValid": true,
//!   "metadata": { "chartData": [ ... ], "tableData": [ ... ] }
//! }
//! ```
//!
//! An invalid result has `isValid = false`, empty maps and no metadata.
//! Callers check `is_valid` before reading anything else.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::i18n::Translations;

/// A raw result value: a number or a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Number(f64),
    Text(String),
}

impl ResultValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResultValue::Number(n) => Some(*n),
            ResultValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResultValue::Text(s) => Some(s),
            ResultValue::Number(_) => None,
        }
    }
}

impl From<f64> for ResultValue {
    fn from(v: f64) -> Self {
        ResultValue::Number(v)
    }
}

impl From<u32> for ResultValue {
    fn from(v: u32) -> Self {
        ResultValue::Number(v as f64)
    }
}

impl From<i32> for ResultValue {
    fn from(v: i32) -> Self {
        ResultValue::Number(v as f64)
    }
}

impl From<&str> for ResultValue {
    fn from(v: &str) -> Self {
        ResultValue::Text(v.to_string())
    }
}

impl From<String> for ResultValue {
    fn from(v: String) -> Self {
        ResultValue::Text(v)
    }
}

/// One labeled record (a chart point or a table row).
pub type Record = BTreeMap<String, ResultValue>;

/// Build a [`Record`] from `(key, value)` pairs.
pub fn record<K, V, I>(pairs: I) -> Record
where
    K: Into<String>,
    V: Into<ResultValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Presentation data attached to a valid result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Ordered chart series
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chart_data: Vec<Record>,

    /// Ordered detail-table rows
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub table_data: Vec<Record>,

    /// Static reference rows shown alongside the result
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_table: Vec<Record>,
}

impl ResultMetadata {
    pub fn is_empty(&self) -> bool {
        self.chart_data.is_empty() && self.table_data.is_empty() && self.reference_table.is_empty()
    }
}

/// Output record of every calculator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// Raw values for further formatting or testing
    pub values: BTreeMap<String, ResultValue>,

    /// The same values rendered for display
    pub formatted: BTreeMap<String, String>,

    /// One human-readable sentence
    pub summary: String,

    /// False when the input was insufficient; every other field is then empty
    pub is_valid: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResultMetadata>,
}

impl CalculationResult {
    /// The "enter valid input" result.
    pub fn invalid() -> Self {
        CalculationResult::default()
    }

    /// Raw numeric value for `key`.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(ResultValue::as_number)
    }

    /// Raw text value for `key`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(ResultValue::as_text)
    }

    /// Formatted display string for `key`.
    pub fn display(&self, key: &str) -> Option<&str> {
        self.formatted.get(key).map(String::as_str)
    }
}

/// Accumulates values, formatted strings and metadata for a valid result.
#[derive(Debug, Default)]
pub struct ResultBuilder {
    values: BTreeMap<String, ResultValue>,
    formatted: BTreeMap<String, String>,
    metadata: ResultMetadata,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw value and its display form.
    pub fn field(&mut self, key: &str, value: impl Into<ResultValue>, display: impl Into<String>) -> &mut Self {
        self.values.insert(key.to_string(), value.into());
        self.formatted.insert(key.to_string(), display.into());
        self
    }

    /// Record a label whose raw and display forms are the same text.
    pub fn label(&mut self, key: &str, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        self.values.insert(key.to_string(), ResultValue::Text(text.clone()));
        self.formatted.insert(key.to_string(), text);
        self
    }

    /// Add a display-only string (no raw counterpart).
    pub fn display(&mut self, key: &str, display: impl Into<String>) -> &mut Self {
        self.formatted.insert(key.to_string(), display.into());
        self
    }

    pub fn chart_point(&mut self, point: Record) -> &mut Self {
        self.metadata.chart_data.push(point);
        self
    }

    pub fn table_row(&mut self, row: Record) -> &mut Self {
        self.metadata.table_data.push(row);
        self
    }

    pub fn reference_row(&mut self, row: Record) -> &mut Self {
        self.metadata.reference_table.push(row);
        self
    }

    /// Formatted strings gathered so far (for templates built mid-way).
    pub fn formatted(&self) -> &BTreeMap<String, String> {
        &self.formatted
    }

    /// Finish with the summary template filled from the formatted map.
    pub fn finish(self, translations: &Translations<'_>, default_summary: &str) -> CalculationResult {
        let summary = translations.summary(default_summary, &self.formatted);
        let metadata = (!self.metadata.is_empty()).then_some(self.metadata);
        CalculationResult {
            values: self.values,
            formatted: self.formatted,
            summary,
            is_valid: true,
            metadata,
        }
    }
}
