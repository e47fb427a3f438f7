//! Assembling a `CalculationInput` from an input file and flags.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use calc_core::input::InputRecord;
use calc_core::{CalculationInput, InputValue, Locale};
use serde_json::Value;

use crate::args::RunArgs;
use crate::config::OutputConfig;

/// Field holding the hCG draw list.
const DRAWS_FIELD: &str = "draws";

/// Parse an input file.
///
/// Accepts a full record (`{"values": {...}, "fieldUnits": {...}}`) or a
/// bare map of values. The locale is returned separately when the file
/// names one, so flags and config can fill it otherwise.
pub fn parse_input_json(text: &str) -> Result<(CalculationInput, Option<Locale>)> {
    let json: Value = serde_json::from_str(text).context("input is not valid JSON")?;
    let Value::Object(map) = &json else {
        bail!("input must be a JSON object");
    };

    if map.contains_key("values") {
        let explicit_locale = map.contains_key("locale");
        let input: CalculationInput = serde_json::from_value(json).context("input record has the wrong shape")?;
        let locale = explicit_locale.then_some(input.locale);
        Ok((input, locale))
    } else {
        let values: BTreeMap<String, InputValue> =
            serde_json::from_value(json).context("input values have the wrong shape")?;
        Ok((CalculationInput { values, ..CalculationInput::default() }, None))
    }
}

/// Value from a `--set` flag: numbers and booleans keep their type.
pub fn flag_value(raw: &str) -> InputValue {
    match raw {
        "true" => InputValue::Bool(true),
        "false" => InputValue::Bool(false),
        "" | "null" => InputValue::Null,
        _ => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => InputValue::Number(n),
            _ => InputValue::Text(raw.to_string()),
        },
    }
}

/// Build the calculator input.
///
/// Precedence: flags over the input file, then the `[output]` config for
/// locale and currency.
pub fn build_input(args: &RunArgs, output: &OutputConfig) -> Result<CalculationInput> {
    let (mut input, file_locale) = match &args.input {
        Some(path) => read_input_file(path)?,
        None => (CalculationInput::new(), None),
    };

    for (key, raw) in &args.set {
        input.values.insert(key.clone(), flag_value(raw));
    }
    for (field, unit) in &args.unit {
        input.field_units.insert(field.clone(), unit.clone());
    }

    if !args.draw.is_empty() {
        let mut draws: Vec<InputRecord> = match input.values.remove(DRAWS_FIELD) {
            Some(InputValue::List(existing)) => existing,
            _ => Vec::new(),
        };
        for (date, level) in &args.draw {
            let mut draw = InputRecord::new();
            draw.insert("date".to_string(), InputValue::Text(date.clone()));
            draw.insert("hcgLevel".to_string(), flag_value(level));
            draws.push(draw);
        }
        input.values.insert(DRAWS_FIELD.to_string(), InputValue::List(draws));
    }

    if let Some(currency) = &output.currency {
        input
            .values
            .entry("currency".to_string())
            .or_insert_with(|| InputValue::Text(currency.clone()));
    }

    input.locale = args.locale.or(file_locale).unwrap_or(output.locale);
    Ok(input)
}

fn read_input_file(path: &Path) -> Result<(CalculationInput, Option<Locale>)> {
    let text = fs::read_to_string(path).with_context(|| format!("reading input file {}", path.display()))?;
    parse_input_json(&text).with_context(|| format!("parsing input file {}", path.display()))
}
