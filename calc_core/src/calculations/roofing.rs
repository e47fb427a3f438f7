//! # Roofing Material Estimate
//!
//! Converts a rectangular building footprint plus pitch, overhang and roof
//! type into true sloped roof area, then derives roofing squares, shingle
//! bundles, ridge and drip-edge lengths, underlayment and cost.
//!
//! ## Method
//!
//! ```text
//! roof_length = house_length + 2 * overhang
//! roof_width  = house_width  + 2 * overhang
//! roof_area   = roof_length * roof_width * pitch_multiplier  (* 1.10 for hip)
//! with_waste  = roof_area * (1 + waste / 100)
//! squares     = ceil(with_waste / 100)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::roofing::{calculate, RoofMaterial, RoofType, RoofingInput};
//! use calc_core::settings::RoofingSettings;
//!
//! let input = RoofingInput {
//!     house_length_ft: 40.0,
//!     house_width_ft: 25.0,
//!     overhang_ft: 1.0,
//!     pitch_rise: 6.0,
//!     roof_type: RoofType::Gable,
//!     material: RoofMaterial::ArchitecturalShingles,
//!     waste_pct: 10.0,
//!     cost_per_sqft: None,
//!     currency: "USD".to_string(),
//! };
//! let estimate = calculate(&input, &RoofingSettings::default()).unwrap();
//! assert_eq!(estimate.flat_area_sqft, 1134.0);
//! assert_eq!(estimate.squares, 14);
//! assert_eq!(estimate.bundles, 42);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::format::{format_count, format_currency, format_number, Locale};
use crate::i18n::Translations;
use crate::input::CalculationInput;
use crate::result::{record, CalculationResult, ResultBuilder, ResultValue};
use crate::settings::{CalculatorSettings, RoofingSettings};
use crate::units::{Feet, LengthUnit, SqFt, SqM};
use super::whole_count;

const DEFAULT_SUMMARY: &str =
    "Your {roofType} roof covers {roofArea} ({roofAreaMetric}). Order {squares} squares ({materialQuantity}) including {wastePercent} waste.";

// ============================================================================
// Pitch table
// ============================================================================

/// Pitch multipliers keyed by rise per 12 inches of run, rounded the way
/// printed roofing tables are: `sqrt(1 + (rise/12)^2)`.
pub const PITCH_MULTIPLIERS: [(f64, f64); 22] = [
    (0.0, 1.000),
    (0.5, 1.001),
    (1.0, 1.003),
    (1.5, 1.008),
    (2.0, 1.014),
    (3.0, 1.031),
    (4.0, 1.054),
    (5.0, 1.083),
    (6.0, 1.118),
    (7.0, 1.158),
    (8.0, 1.202),
    (9.0, 1.250),
    (10.0, 1.302),
    (11.0, 1.357),
    (12.0, 1.414),
    (13.0, 1.474),
    (14.0, 1.537),
    (15.0, 1.601),
    (16.0, 1.667),
    (17.0, 1.734),
    (18.0, 1.803),
    (24.0, 2.236),
];

/// Steepest pitch accepted, rise per 12.
pub const MAX_PITCH_RISE: f64 = 24.0;

/// Multiplier for a rise-per-12 value.
///
/// Table entries are used verbatim. Pitches between rows are interpolated
/// linearly so the multiplier never decreases as the pitch gets steeper;
/// anything past the last row falls back to the exact formula.
pub fn pitch_multiplier(rise: f64) -> f64 {
    let rise = rise.max(0.0);
    if let Some((_, m)) = PITCH_MULTIPLIERS.iter().find(|(r, _)| (*r - rise).abs() < 1e-9) {
        return *m;
    }
    PITCH_MULTIPLIERS
        .windows(2)
        .find(|pair| rise < pair[1].0)
        .map(|pair| {
            let ((r0, m0), (r1, m1)) = (pair[0], pair[1]);
            m0 + (m1 - m0) * (rise - r0) / (r1 - r0)
        })
        .unwrap_or_else(|| (1.0 + (rise / 12.0).powi(2)).sqrt())
}

/// Parse `"6/12"`, `"6:12"`, `"6"` or `"4/6"` (rescaled to a 12 run) into rise per 12.
pub fn parse_pitch(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    match raw.split_once(['/', ':']) {
        Some((rise, run)) => {
            let rise: f64 = rise.trim().parse().ok()?;
            let run: f64 = run.trim().parse().ok()?;
            (run > 0.0).then(|| rise * 12.0 / run)
        }
        None => raw.parse().ok(),
    }
}

// ============================================================================
// Input
// ============================================================================

/// Roof shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoofType {
    #[default]
    Gable,
    Hip,
    Shed,
    Flat,
}

impl RoofType {
    pub const ALL: [RoofType; 4] = [RoofType::Gable, RoofType::Hip, RoofType::Shed, RoofType::Flat];

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "gable" => Some(RoofType::Gable),
            "hip" => Some(RoofType::Hip),
            "shed" => Some(RoofType::Shed),
            "flat" => Some(RoofType::Flat),
            _ => None,
        }
    }

    pub fn translation_key(&self) -> &'static str {
        match self {
            RoofType::Gable => "values.gable",
            RoofType::Hip => "values.hip",
            RoofType::Shed => "values.shed",
            RoofType::Flat => "values.flat",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RoofType::Gable => "gable",
            RoofType::Hip => "hip",
            RoofType::Shed => "shed",
            RoofType::Flat => "flat",
        }
    }
}

/// Roof covering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RoofMaterial {
    #[default]
    ArchitecturalShingles,
    ThreeTabShingles,
    Metal,
    Tile,
    Slate,
    Membrane,
}

impl RoofMaterial {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "architectural-shingles" | "asphalt-shingles" | "shingles" => Some(RoofMaterial::ArchitecturalShingles),
            "three-tab-shingles" | "3-tab-shingles" | "3-tab" => Some(RoofMaterial::ThreeTabShingles),
            "metal" => Some(RoofMaterial::Metal),
            "tile" | "clay-tile" | "concrete-tile" => Some(RoofMaterial::Tile),
            "slate" => Some(RoofMaterial::Slate),
            "membrane" | "epdm" | "tpo" => Some(RoofMaterial::Membrane),
            _ => None,
        }
    }

    /// Shingles are sold in bundles; everything else by other units.
    pub fn is_shingle(&self) -> bool {
        matches!(self, RoofMaterial::ArchitecturalShingles | RoofMaterial::ThreeTabShingles)
    }

    /// Translation key and default for the ordering unit of non-shingle materials.
    pub fn unit_label(&self) -> (&'static str, &'static str) {
        match self {
            RoofMaterial::ArchitecturalShingles | RoofMaterial::ThreeTabShingles => ("units.bundles", "bundles"),
            RoofMaterial::Metal => ("units.metalSquares", "squares of metal panels"),
            RoofMaterial::Tile => ("units.tileSquares", "squares of roof tile"),
            RoofMaterial::Slate => ("units.slateSquares", "squares of slate"),
            RoofMaterial::Membrane => ("units.membraneSquares", "squares of membrane"),
        }
    }
}

/// Input parameters for a roofing estimate. Lengths in feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoofingInput {
    pub house_length_ft: f64,
    pub house_width_ft: f64,
    /// Eave/rake overhang applied on every side
    pub overhang_ft: f64,
    /// Rise per 12 inches of run
    pub pitch_rise: f64,
    pub roof_type: RoofType,
    pub material: RoofMaterial,
    pub waste_pct: f64,
    pub cost_per_sqft: Option<f64>,
    pub currency: String,
}

impl RoofingInput {
    /// Read the contract fields: `length`, `width`, `overhang` (unit-tagged,
    /// canonical feet), `pitch`, `roofType`, `material`, `wasteFactor`,
    /// `costPerSqFt`, `currency`.
    pub fn from_fields(input: &CalculationInput, settings: &RoofingSettings) -> CalcResult<Self> {
        let fields = input.fields();

        let roof_type = match fields.text("roofType") {
            Some(slug) => RoofType::from_slug(&slug)
                .ok_or_else(|| CalcError::invalid_input("roofType", slug.clone(), "Unknown roof type"))?,
            None => RoofType::default(),
        };
        let material = match fields.text("material") {
            Some(slug) => RoofMaterial::from_slug(&slug)
                .ok_or_else(|| CalcError::invalid_input("material", slug.clone(), "Unknown roofing material"))?,
            None => RoofMaterial::default(),
        };
        let pitch_rise = if roof_type == RoofType::Flat {
            0.0
        } else {
            let raw = fields.text("pitch").ok_or_else(|| CalcError::missing_field("pitch"))?;
            parse_pitch(&raw).ok_or_else(|| CalcError::invalid_input("pitch", raw.clone(), "Expected a pitch like 6/12"))?
        };

        Ok(RoofingInput {
            house_length_ft: input.positive_length("length", LengthUnit::Feet)?,
            house_width_ft: input.positive_length("width", LengthUnit::Feet)?,
            overhang_ft: match fields.non_negative("overhang")? {
                Some(_) => input.length("overhang", LengthUnit::Feet).unwrap_or(0.0),
                None => 0.0,
            },
            pitch_rise,
            roof_type,
            material,
            waste_pct: fields.non_negative("wasteFactor")?.unwrap_or(settings.default_waste_pct),
            cost_per_sqft: fields.non_negative("costPerSqFt")?,
            currency: fields
                .text("currency")
                .unwrap_or_else(|| settings.default_currency.clone()),
        })
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [("length", self.house_length_ft), ("width", self.house_width_ft)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be greater than zero"));
            }
        }
        if !(self.overhang_ft >= 0.0) {
            return Err(CalcError::invalid_input("overhang", self.overhang_ft.to_string(), "Cannot be negative"));
        }
        if !(0.0..=MAX_PITCH_RISE).contains(&self.pitch_rise) {
            return Err(CalcError::invalid_input(
                "pitch",
                self.pitch_rise.to_string(),
                format!("Pitch must be between 0/12 and {MAX_PITCH_RISE}/12"),
            ));
        }
        if !(self.waste_pct >= 0.0) {
            return Err(CalcError::invalid_input("wasteFactor", self.waste_pct.to_string(), "Cannot be negative"));
        }
        Ok(())
    }

    /// Rise used in the area formula; flat roofs ignore any pitch given.
    pub fn effective_rise(&self) -> f64 {
        if self.roof_type == RoofType::Flat {
            0.0
        } else {
            self.pitch_rise
        }
    }
}

// ============================================================================
// Estimate
// ============================================================================

/// Results from a roofing estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoofEstimate {
    pub roof_length_ft: f64,
    pub roof_width_ft: f64,
    /// Plan-view area including overhang
    pub flat_area_sqft: f64,
    pub pitch_multiplier: f64,
    /// True sloped area
    pub roof_area_sqft: f64,
    pub roof_area_sqm: f64,
    pub area_with_waste_sqft: f64,
    pub squares: u32,
    /// Shingle bundles; zero for materials sold by other units
    pub bundles: u32,
    pub ridge_length_ft: f64,
    pub drip_edge_ft: f64,
    pub underlayment_rolls: u32,
    pub ridge_cap_bundles: u32,
    pub cost: Option<f64>,
    pub roof_type: RoofType,
    pub material: RoofMaterial,
    pub waste_pct: f64,
}

/// Ridge length by roof type.
///
/// Hip ridges are approximated from the length difference plus four hip
/// runs; shed and flat roofs have no ridge.
pub fn ridge_length(roof_type: RoofType, roof_length_ft: f64, roof_width_ft: f64) -> f64 {
    match roof_type {
        RoofType::Gable => roof_length_ft,
        RoofType::Hip => roof_length_ft - roof_width_ft + 4.0 * (roof_width_ft / 2.0) * 1.05,
        RoofType::Shed | RoofType::Flat => 0.0,
    }
}

/// Estimate roofing materials.
///
/// # Returns
///
/// * `Ok(RoofEstimate)` - Areas and quantities
/// * `Err(CalcError)` - If a dimension is missing or not positive
pub fn calculate(input: &RoofingInput, settings: &RoofingSettings) -> CalcResult<RoofEstimate> {
    input.validate()?;

    let roof_length_ft = input.house_length_ft + 2.0 * input.overhang_ft;
    let roof_width_ft = input.house_width_ft + 2.0 * input.overhang_ft;
    let flat_area_sqft = (Feet(roof_length_ft) * Feet(roof_width_ft)).value();

    let multiplier = pitch_multiplier(input.effective_rise());
    let mut roof_area_sqft = flat_area_sqft * multiplier;
    if input.roof_type == RoofType::Hip {
        roof_area_sqft *= settings.hip_area_factor;
    }

    let area_with_waste_sqft = roof_area_sqft * (1.0 + input.waste_pct / 100.0);
    let squares = whole_count(area_with_waste_sqft / settings.square_sqft, "squares")?;
    let bundles = if input.material.is_shingle() {
        whole_count(f64::from(squares) * settings.bundles_per_square, "bundles")?
    } else {
        0
    };

    let ridge_length_ft = ridge_length(input.roof_type, roof_length_ft, roof_width_ft);
    let drip_edge_ft = 2.0 * (roof_length_ft + roof_width_ft);
    let underlayment_rolls = whole_count(area_with_waste_sqft / settings.underlayment_roll_sqft, "underlaymentRolls")?;
    let ridge_cap_bundles = if ridge_length_ft > 0.0 && input.material.is_shingle() {
        whole_count(ridge_length_ft / settings.ridge_cap_lf_per_bundle, "ridgeCapBundles")?
    } else {
        0
    };

    let roof_area_sqm = SqM::from(SqFt(roof_area_sqft)).value();
    let cost = input.cost_per_sqft.map(|c| area_with_waste_sqft * c);

    tracing::trace!(flat_area_sqft, multiplier, roof_area_sqft, squares, "roof estimate computed");

    Ok(RoofEstimate {
        roof_length_ft,
        roof_width_ft,
        flat_area_sqft,
        pitch_multiplier: multiplier,
        roof_area_sqft,
        roof_area_sqm,
        area_with_waste_sqft,
        squares,
        bundles,
        ridge_length_ft,
        drip_edge_ft,
        underlayment_rolls,
        ridge_cap_bundles,
        cost,
        roof_type: input.roof_type,
        material: input.material,
        waste_pct: input.waste_pct,
    })
}

// ============================================================================
// Contract
// ============================================================================

/// Evaluate the contract input. Never fails.
pub fn evaluate(input: &CalculationInput, settings: &CalculatorSettings) -> CalculationResult {
    let outcome = RoofingInput::from_fields(input, &settings.roofing).and_then(|typed| {
        calculate(&typed, &settings.roofing)
            .map(|e| present(&e, &typed.currency, &Translations::new(&input.translations), input.locale))
    });
    super::into_contract("roofing", outcome)
}

/// Render an estimate into the contract result.
pub fn present(e: &RoofEstimate, currency: &str, t: &Translations<'_>, locale: Locale) -> CalculationResult {
    let sqft = t.text("units.sqft", "sq ft");
    let sqm = t.text("units.sqm", "m²");
    let ft = t.text("units.ft", "ft");
    let area = |v: f64| format!("{} {}", format_number(v, 0, locale), sqft);
    let length = |v: f64| format!("{} {}", format_number(v, 1, locale), ft);

    let mut b = ResultBuilder::new();
    b.label("roofType", t.text(e.roof_type.translation_key(), e.roof_type.display_name()));
    b.field("flatArea", e.flat_area_sqft, area(e.flat_area_sqft));
    b.field("pitchMultiplier", e.pitch_multiplier, format_number(e.pitch_multiplier, 3, locale));
    b.field("roofArea", e.roof_area_sqft, area(e.roof_area_sqft));
    b.field(
        "roofAreaMetric",
        e.roof_area_sqm,
        format!("{} {}", format_number(e.roof_area_sqm, 1, locale), sqm),
    );
    b.field("areaWithWaste", e.area_with_waste_sqft, area(e.area_with_waste_sqft));
    b.field("wastePercent", e.waste_pct, format!("{}%", format_number(e.waste_pct, 0, locale)));
    b.field("squares", e.squares, format_count(e.squares as f64, locale));

    let (unit_key, unit_default) = e.material.unit_label();
    let quantity = if e.material.is_shingle() {
        format!("{} {}", format_count(e.bundles as f64, locale), t.text(unit_key, unit_default))
    } else {
        format!("{} {}", format_count(e.squares as f64, locale), t.text(unit_key, unit_default))
    };
    b.field("bundles", e.bundles, format_count(e.bundles as f64, locale));
    b.display("materialQuantity", quantity);

    b.field("ridgeLength", e.ridge_length_ft, length(e.ridge_length_ft));
    b.field("dripEdge", e.drip_edge_ft, length(e.drip_edge_ft));
    b.field(
        "underlaymentRolls",
        e.underlayment_rolls,
        format_count(e.underlayment_rolls as f64, locale),
    );
    b.field(
        "ridgeCapBundles",
        e.ridge_cap_bundles,
        format_count(e.ridge_cap_bundles as f64, locale),
    );
    if let Some(cost) = e.cost {
        b.field("totalCost", cost, format_currency(cost, currency, locale));
    }

    // Area breakdown: flat footprint, slope addition, hip addition, waste
    let sloped = e.flat_area_sqft * e.pitch_multiplier;
    let breakdown = [
        ("values.flatArea", "Flat area", e.flat_area_sqft),
        ("values.pitchAddition", "Pitch addition", sloped - e.flat_area_sqft),
        ("values.hipAddition", "Hip addition", e.roof_area_sqft - sloped),
        ("values.waste", "Waste", e.area_with_waste_sqft - e.roof_area_sqft),
    ];
    for (key, default, value) in breakdown {
        b.chart_point(record([
            ("label", ResultValue::from(t.text(key, default))),
            ("value", ResultValue::from(value)),
        ]));
    }

    b.finish(t, DEFAULT_SUMMARY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gable(pitch_rise: f64) -> RoofingInput {
        RoofingInput {
            house_length_ft: 40.0,
            house_width_ft: 25.0,
            overhang_ft: 1.0,
            pitch_rise,
            roof_type: RoofType::Gable,
            material: RoofMaterial::ArchitecturalShingles,
            waste_pct: 10.0,
            cost_per_sqft: None,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_reference_example() {
        let e = calculate(&gable(6.0), &RoofingSettings::default()).unwrap();
        assert_eq!(e.flat_area_sqft, 1134.0);
        assert!((e.roof_area_sqft - 1267.81).abs() < 0.01);
        assert!((e.area_with_waste_sqft - 1394.6).abs() < 0.1);
        assert_eq!(e.squares, 14);
        assert_eq!(e.bundles, 42);
        assert_eq!(e.ridge_length_ft, 42.0);
        assert_eq!(e.drip_edge_ft, 2.0 * (42.0 + 27.0));
    }

    #[test]
    fn test_pitch_table_matches_formula() {
        for (rise, multiplier) in PITCH_MULTIPLIERS {
            let exact = (1.0 + (rise / 12.0f64).powi(2)).sqrt();
            assert!((multiplier - exact).abs() < 0.0015, "rise {rise}");
        }
    }

    #[test]
    fn test_area_monotonic_in_pitch() {
        let settings = RoofingSettings::default();
        let mut previous = 0.0;
        for (rise, _) in PITCH_MULTIPLIERS {
            let e = calculate(&gable(rise), &settings).unwrap();
            assert!(e.roof_area_sqft > previous, "rise {rise}");
            previous = e.roof_area_sqft;
        }
    }

    #[test]
    fn test_area_monotonic_between_table_rows() {
        let settings = RoofingSettings::default();
        let mut previous = 0.0;
        let mut rise = 0.0;
        while rise <= MAX_PITCH_RISE {
            let e = calculate(&gable(rise), &settings).unwrap();
            assert!(e.roof_area_sqft >= previous, "rise {rise}");
            previous = e.roof_area_sqft;
            rise += 0.01;
        }

        for (lower, upper) in [(0.5, 0.51), (1.5, 1.51), (2.0, 2.01), (18.0, 18.01)] {
            let a = calculate(&gable(lower), &settings).unwrap().roof_area_sqft;
            let b = calculate(&gable(upper), &settings).unwrap().roof_area_sqft;
            assert!(b > a, "{upper} gave less area than {lower}");
        }
    }

    #[test]
    fn test_minimal_pitch_equals_flat_area() {
        let e = calculate(&gable(0.0), &RoofingSettings::default()).unwrap();
        assert_eq!(e.roof_area_sqft, e.flat_area_sqft);
    }

    #[test]
    fn test_hip_at_least_ten_percent_more() {
        let settings = RoofingSettings::default();
        for rise in [0.0, 4.0, 6.0, 12.0] {
            let g = calculate(&gable(rise), &settings).unwrap();
            let mut hip = gable(rise);
            hip.roof_type = RoofType::Hip;
            let h = calculate(&hip, &settings).unwrap();
            assert!(h.roof_area_sqft >= g.roof_area_sqft * 1.10 - 1e-9);
            assert!((h.ridge_length_ft - (42.0 - 27.0 + 4.0 * 13.5 * 1.05)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_non_shingle_has_no_bundles() {
        let mut input = gable(6.0);
        input.material = RoofMaterial::Metal;
        let e = calculate(&input, &RoofingSettings::default()).unwrap();
        assert_eq!(e.bundles, 0);
        assert_eq!(e.ridge_cap_bundles, 0);
        assert_eq!(e.squares, 14);
    }

    #[test]
    fn test_shed_and_flat_have_no_ridge() {
        let mut input = gable(3.0);
        input.roof_type = RoofType::Shed;
        assert_eq!(calculate(&input, &RoofingSettings::default()).unwrap().ridge_length_ft, 0.0);

        input.roof_type = RoofType::Flat;
        let e = calculate(&input, &RoofingSettings::default()).unwrap();
        assert_eq!(e.ridge_length_ft, 0.0);
        assert_eq!(e.pitch_multiplier, 1.0);
    }

    #[test]
    fn test_parse_pitch() {
        assert_eq!(parse_pitch("6/12"), Some(6.0));
        assert_eq!(parse_pitch("6:12"), Some(6.0));
        assert_eq!(parse_pitch(" 8 "), Some(8.0));
        assert_eq!(parse_pitch("4/6"), Some(8.0));
        assert_eq!(parse_pitch("6/0"), None);
        assert_eq!(parse_pitch("steep"), None);
    }

    #[test]
    fn test_off_table_pitch_interpolates() {
        assert!((pitch_multiplier(7.5) - 1.180).abs() < 1e-12);
        assert!((pitch_multiplier(21.0) - (1.803 + 2.236) / 2.0).abs() < 1e-12);
        assert_eq!(pitch_multiplier(6.0), 1.118);
        let exact = (1.0f64 + 0.625 * 0.625).sqrt();
        assert!((pitch_multiplier(7.5) - exact).abs() < 0.002);
    }

    #[test]
    fn test_evaluate_contract_with_units_and_cost() {
        let input = CalculationInput::new()
            .with_value("length", 40.0)
            .with_value("width", 25.0)
            .with_value("overhang", 12.0)
            .with_unit("overhang", "in")
            .with_value("pitch", "6/12")
            .with_value("roofType", "gable")
            .with_value("costPerSqFt", 4.5)
            .with_value("currency", "USD");
        let result = evaluate(&input, &CalculatorSettings::default());
        assert!(result.is_valid);
        assert_eq!(result.number("squares"), Some(14.0));
        assert_eq!(result.display("roofArea"), Some("1,268 sq ft"));
        assert_eq!(result.display("materialQuantity"), Some("42 bundles"));
        assert_eq!(result.display("totalCost"), Some("$6,275.67"));
        assert!(result.summary.contains("14 squares"));
        assert_eq!(result.metadata.unwrap().chart_data.len(), 4);
    }

    #[test]
    fn test_evaluate_metric_footprint() {
        let input = CalculationInput::new()
            .with_value("length", 10.0)
            .with_value("width", 10.0)
            .with_unit("length", "m")
            .with_unit("width", "m")
            .with_value("roofType", "flat")
            .with_value("wasteFactor", 0.0);
        let result = evaluate(&input, &CalculatorSettings::default());
        assert!(result.is_valid);
        let area = result.number("roofArea").unwrap();
        assert!((area - 32.8084f64.powi(2)).abs() < 1e-6);
        // 100 m² of flat roof
        assert!((result.number("roofAreaMetric").unwrap() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_evaluate_missing_dimension_is_invalid() {
        let input = CalculationInput::new().with_value("length", 40.0).with_value("pitch", "6/12");
        let result = evaluate(&input, &CalculatorSettings::default());
        assert!(!result.is_valid);
        assert!(result.values.is_empty());

        let negative = CalculationInput::new()
            .with_value("length", 40.0)
            .with_value("width", -5.0)
            .with_value("pitch", "6/12");
        assert!(!evaluate(&negative, &CalculatorSettings::default()).is_valid);
    }

    #[test]
    fn test_huge_footprint_is_rejected() {
        let mut input = gable(6.0);
        input.house_length_ft = 1e9;
        input.house_width_ft = 1e9;
        assert!(matches!(
            calculate(&input, &RoofingSettings::default()),
            Err(CalcError::InvalidInput { .. })
        ));
    }
}
