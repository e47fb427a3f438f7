//! Plain-text rendering for terminal output.

use std::fmt::Write;

use calc_core::calculations::hcg::HCG_REFERENCE_RANGES;
use calc_core::calculations::roofing::PITCH_MULTIPLIERS;
use calc_core::datasets::US_CPI;
use calc_core::format::{format_number, format_signed_percent};
use calc_core::result::{Record, ResultValue};
use calc_core::worksheet::Worksheet;
use calc_core::file_io::LockInfo;
use calc_core::{CalculationResult, CalculatorKind, Locale};

use crate::args::ReferenceTable;

/// Column keys in first-seen order across all rows.
fn columns(rows: &[Record]) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !keys.contains(&key.as_str()) {
                keys.push(key.as_str());
            }
        }
    }
    keys
}

fn cell(value: Option<&ResultValue>) -> String {
    match value {
        Some(ResultValue::Text(s)) => s.clone(),
        Some(ResultValue::Number(n)) if n.fract() == 0.0 => format!("{n:.0}"),
        Some(ResultValue::Number(n)) => format!("{n:.2}"),
        None => String::new(),
    }
}

/// Left-aligned text table with a header row.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = String::new();
    let mut line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}", w = *w))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };
    line(headers.to_vec());
    line(rule.iter().map(String::as_str).collect());
    for row in rows {
        line(row.iter().map(String::as_str).collect());
    }
    out
}

fn record_table(title: &str, rows: &[Record]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let headers = columns(rows);
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| headers.iter().map(|key| cell(row.get(*key))).collect())
        .collect();
    format!("\n{title}\n{}", table(&headers, &body))
}

/// Human-readable rendering of a valid result.
pub fn result(kind: CalculatorKind, result: &CalculationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", kind.display_name());
    let _ = writeln!(out, "{}\n", result.summary);

    let width = result.formatted.keys().map(|k| k.len()).max().unwrap_or(0);
    for (key, value) in &result.formatted {
        let _ = writeln!(out, "  {key:<width$}  {value}");
    }

    if let Some(metadata) = &result.metadata {
        out.push_str(&record_table("Details", &metadata.table_data));
        out.push_str(&record_table("Reference", &metadata.reference_table));
    }
    out
}

/// The calculator list.
pub fn calculator_list() -> String {
    let rows: Vec<Vec<String>> = CalculatorKind::ALL
        .iter()
        .map(|k| vec![k.slug().to_string(), k.display_name().to_string()])
        .collect();
    table(&["calculator", "name"], &rows)
}

/// A static reference table.
pub fn reference(which: ReferenceTable, locale: Locale) -> String {
    match which {
        ReferenceTable::Cpi => {
            let rows: Vec<Vec<String>> = US_CPI
                .rows()
                .map(|(year, index)| {
                    vec![
                        year.to_string(),
                        format_number(index, 1, locale),
                        US_CPI
                            .annual_rate(year)
                            .map(|r| format_signed_percent(r, 1, locale))
                            .unwrap_or_default(),
                    ]
                })
                .collect();
            format!("{} ({})\n{}", US_CPI.name, US_CPI.version, table(&["year", "index", "change"], &rows))
        }
        ReferenceTable::Hcg => {
            let rows: Vec<Vec<String>> = HCG_REFERENCE_RANGES
                .iter()
                .map(|r| {
                    vec![
                        r.weeks.to_string(),
                        format!("{} - {}", format_number(r.low, 0, locale), format_number(r.high, 0, locale)),
                        r.typical_doubling.to_string(),
                    ]
                })
                .collect();
            table(&["weeks", "hCG (mIU/mL)", "typical doubling"], &rows)
        }
        ReferenceTable::Pitch => {
            let rows: Vec<Vec<String>> = PITCH_MULTIPLIERS
                .iter()
                .map(|(rise, multiplier)| {
                    let decimals = if rise.fract() == 0.0 { 0 } else { 1 };
                    vec![
                        format!("{}/12", format_number(*rise, decimals, locale)),
                        format_number(*multiplier, 3, locale),
                    ]
                })
                .collect();
            table(&["pitch", "multiplier"], &rows)
        }
    }
}

/// Entries of a worksheet, oldest first.
pub fn worksheet(sheet: &Worksheet, holder: Option<&LockInfo>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} entries)", sheet.meta.title, sheet.entry_count());
    if let Some(info) = holder {
        let _ = writeln!(out, "Locked by {} since {}", info.holder(), info.locked_at.to_rfc3339());
    }

    let rows: Vec<Vec<String>> = sheet
        .entries_sorted()
        .into_iter()
        .map(|(id, entry)| {
            let summary = if entry.result.is_valid {
                entry.result.summary.clone()
            } else {
                "(invalid input)".to_string()
            };
            vec![
                id.to_string()[..8].to_string(),
                entry.saved_at.format("%Y-%m-%d %H:%M").to_string(),
                entry.calculator.slug().to_string(),
                entry.label.clone(),
                summary,
            ]
        })
        .collect();
    out.push('\n');
    out.push_str(&table(&["id", "saved", "calculator", "label", "summary"], &rows));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_core::{CalculationInput, CalculatorSettings};

    #[test]
    fn test_table_alignment() {
        let text = table(&["a", "bb"], &[vec!["long".to_string(), "x".to_string()]]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "a     bb");
        assert_eq!(lines[1], "----  --");
        assert_eq!(lines[2], "long  x");
    }

    #[test]
    fn test_result_lists_formatted_values() {
        let input = CalculationInput::new()
            .with_value("length", 10.0)
            .with_value("width", 8.0)
            .with_value("tileSize", "12x12");
        let outcome = CalculatorKind::Tile.evaluate(&input, &CalculatorSettings::default());
        let text = result(CalculatorKind::Tile, &outcome);
        assert!(text.starts_with("Tile, Grout & Mortar Calculator"));
        assert!(text.contains("boxesNeeded"));
        assert!(text.contains("Details"));
    }

    #[test]
    fn test_reference_tables() {
        let pitch = reference(ReferenceTable::Pitch, Locale::En);
        assert!(pitch.contains("6/12"));
        assert!(pitch.contains("1.118"));
        assert!(pitch.contains("0.5/12"));

        let cpi = reference(ReferenceTable::Cpi, Locale::En);
        assert!(cpi.starts_with("US CPI-U"));
        assert!(cpi.contains("1990"));
    }

    #[test]
    fn test_worksheet_listing() {
        let mut sheet = Worksheet::new("Garage");
        sheet.record(CalculatorKind::Hcg, "Empty", CalculationInput::new(), &CalculatorSettings::default());
        let text = worksheet(&sheet, None);
        assert!(text.starts_with("Garage (1 entries)"));
        assert!(text.contains("(invalid input)"));
    }
}
