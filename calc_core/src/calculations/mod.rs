//! # Calculators
//!
//! Every calculator follows the same pattern:
//!
//! - `*Input` - Typed input, read from the contract with `from_fields` and
//!   checked with `validate()`
//! - `calculate(&input, &settings) -> CalcResult<_>` - Pure calculation
//! - `evaluate(&CalculationInput, &CalculatorSettings) -> CalculationResult` -
//!   The uniform contract. It never fails: rejected input becomes
//!   [`CalculationResult::invalid`].
//!
//! ## Available Calculators
//!
//! - [`hcg`] - hCG doubling time and growth classification
//! - [`inflation`] - Historical CPI or custom-rate inflation
//! - [`roofing`] - Roof area, squares, bundles
//! - [`tile`] - Tiles, boxes, grout and thinset

pub mod hcg;
pub mod inflation;
pub mod roofing;
pub mod tile;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::input::CalculationInput;
use crate::result::CalculationResult;
use crate::settings::CalculatorSettings;

pub use hcg::{HcgAnalysis, HcgInput};
pub use inflation::{InflationInput, InflationProjection};
pub use roofing::{RoofEstimate, RoofingInput};
pub use tile::{TileEstimate, TileInput};

/// Largest material count a calculator will report.
pub const MAX_COUNT: u32 = 100_000_000;

/// Round a material quantity up to a whole count.
///
/// Quantities above [`MAX_COUNT`] are rejected as input errors instead of
/// saturating. A non-finite quantity means a formula went wrong.
pub(crate) fn whole_count(quantity: f64, what: &str) -> CalcResult<u32> {
    if !quantity.is_finite() {
        return Err(CalcError::internal(format!("{what} evaluated to {quantity}")));
    }
    let rounded = quantity.ceil().max(0.0);
    if rounded > f64::from(MAX_COUNT) {
        return Err(CalcError::invalid_input(
            what,
            format!("{rounded:.0}"),
            format!("Exceeds the largest supported count ({MAX_COUNT})"),
        ));
    }
    Ok(rounded as u32)
}

/// Sum two counts, rejecting a total above [`MAX_COUNT`].
pub(crate) fn add_counts(a: u32, b: u32, what: &str) -> CalcResult<u32> {
    match a.checked_add(b) {
        Some(total) if total <= MAX_COUNT => Ok(total),
        _ => Err(CalcError::invalid_input(
            what,
            format!("{a} + {b}"),
            format!("Exceeds the largest supported count ({MAX_COUNT})"),
        )),
    }
}

/// Collapse a typed outcome into the contract result.
///
/// Input errors are expected traffic and only logged at debug; anything else
/// points at a defect and is logged as a warning.
pub(crate) fn into_contract(calculator: &'static str, outcome: CalcResult<CalculationResult>) -> CalculationResult {
    match outcome {
        Ok(result) => result,
        Err(err) if err.is_input_error() => {
            tracing::debug!(calculator, code = err.error_code(), error = %err, "input rejected");
            CalculationResult::invalid()
        }
        Err(err) => {
            tracing::warn!(calculator, code = err.error_code(), error = %err, "calculation failed");
            CalculationResult::invalid()
        }
    }
}

/// The calculators behind the shared contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculatorKind {
    Hcg,
    Inflation,
    Roofing,
    Tile,
}

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 4] = [
        CalculatorKind::Hcg,
        CalculatorKind::Inflation,
        CalculatorKind::Roofing,
        CalculatorKind::Tile,
    ];

    /// Short identifier used on the command line and in worksheets.
    pub fn slug(&self) -> &'static str {
        match self {
            CalculatorKind::Hcg => "hcg",
            CalculatorKind::Inflation => "inflation",
            CalculatorKind::Roofing => "roofing",
            CalculatorKind::Tile => "tile",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CalculatorKind::Hcg => "hCG Doubling Time",
            CalculatorKind::Inflation => "Inflation Calculator",
            CalculatorKind::Roofing => "Roofing Calculator",
            CalculatorKind::Tile => "Tile, Grout & Mortar Calculator",
        }
    }

    /// Run this calculator.
    pub fn evaluate(&self, input: &CalculationInput, settings: &CalculatorSettings) -> CalculationResult {
        evaluate(*self, input, settings)
    }
}

impl fmt::Display for CalculatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for CalculatorKind {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hcg" => Ok(CalculatorKind::Hcg),
            "inflation" | "cpi" => Ok(CalculatorKind::Inflation),
            "roofing" | "roof" => Ok(CalculatorKind::Roofing),
            "tile" | "tiles" => Ok(CalculatorKind::Tile),
            other => Err(CalcError::invalid_input("calculator", other, "Unknown calculator")),
        }
    }
}

/// Run the calculator named by `kind` against the contract input.
pub fn evaluate(kind: CalculatorKind, input: &CalculationInput, settings: &CalculatorSettings) -> CalculationResult {
    let _span = tracing::debug_span!("evaluate", calculator = kind.slug()).entered();
    match kind {
        CalculatorKind::Hcg => hcg::evaluate(input, settings),
        CalculatorKind::Inflation => inflation::evaluate(input, settings),
        CalculatorKind::Roofing => roofing::evaluate(input, settings),
        CalculatorKind::Tile => tile::evaluate(input, settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_slug() {
        for kind in CalculatorKind::ALL {
            assert_eq!(kind.slug().parse::<CalculatorKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.slug());
        }
        assert_eq!("CPI".parse::<CalculatorKind>().unwrap(), CalculatorKind::Inflation);
        assert!("mortgage".parse::<CalculatorKind>().is_err());
    }

    #[test]
    fn test_empty_input_is_invalid_everywhere() {
        let input = CalculationInput::new();
        let settings = CalculatorSettings::default();
        for kind in CalculatorKind::ALL {
            let result = kind.evaluate(&input, &settings);
            assert!(!result.is_valid, "{kind}");
            assert!(result.values.is_empty());
            assert!(result.formatted.is_empty());
            assert!(result.summary.is_empty());
            assert!(result.metadata.is_none());
        }
    }

    #[test]
    fn test_dispatch_reaches_calculator() {
        let input = CalculationInput::new()
            .with_value("length", 10.0)
            .with_value("width", 8.0)
            .with_value("tileSize", "12x12");
        let result = evaluate(CalculatorKind::Tile, &input, &CalculatorSettings::default());
        assert!(result.is_valid);
        assert_eq!(result.number("boxesNeeded"), Some(9.0));
    }

    #[test]
    fn test_whole_count_bounds() {
        assert_eq!(whole_count(87.2, "tiles").unwrap(), 88);
        assert_eq!(whole_count(0.0, "tiles").unwrap(), 0);
        assert_eq!(whole_count(f64::from(MAX_COUNT), "tiles").unwrap(), MAX_COUNT);
        assert!(matches!(
            whole_count(f64::from(MAX_COUNT) + 1.0, "tiles"),
            Err(CalcError::InvalidInput { .. })
        ));
        assert!(matches!(whole_count(f64::NAN, "tiles"), Err(CalcError::Internal { .. })));
        assert!(matches!(whole_count(f64::INFINITY, "tiles"), Err(CalcError::Internal { .. })));
    }

    #[test]
    fn test_add_counts_rejects_overflow() {
        assert_eq!(add_counts(80, 8, "tiles").unwrap(), 88);
        assert!(add_counts(MAX_COUNT, 1, "tiles").is_err());
        assert!(add_counts(u32::MAX, u32::MAX, "tiles").is_err());
    }

    #[test]
    fn test_internal_errors_become_invalid_results() {
        let outcome = Err(CalcError::internal("area evaluated to NaN"));
        let result = into_contract("tile", outcome);
        assert!(!result.is_valid);
        assert!(result.values.is_empty());
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&CalculatorKind::Roofing).unwrap();
        assert_eq!(json, "\"roofing\"");
    }
}
