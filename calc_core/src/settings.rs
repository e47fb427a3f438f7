//! # Calculator Settings
//!
//! Domain rules of thumb used by the calculators ("3 bundles per square",
//! "25 lb grout bag", ...). They are named, serializable and overridable so a
//! deployment can tune them without touching the formulas, and tests can
//! assert on them directly.
//!
//! Every section and field has a serde default, so a partial TOML/JSON
//! document only overrides what it names:
//!
//! ```rust
//! use calc_core::settings::CalculatorSettings;
//!
//! let json = r#"{ "tile": { "grout_bag_price": 18.0 } }"#;
//! let settings: CalculatorSettings = serde_json::from_str(json).unwrap();
//! assert_eq!(settings.tile.grout_bag_price, 18.0);
//! assert_eq!(settings.tile.grout_bag_lb, 25.0);
//! assert_eq!(settings.roofing.bundles_per_square, 3.0);
//! ```

use serde::{Deserialize, Serialize};

/// All calculator settings, one section per calculator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    pub hcg: HcgSettings,
    pub inflation: InflationSettings,
    pub roofing: RoofingSettings,
    pub tile: TileSettings,
}

impl CalculatorSettings {
    /// Replace non-physical overrides (zero or negative sizes, prices) with
    /// the defaults, logging each replacement.
    pub fn sanitized(mut self) -> Self {
        let r = RoofingSettings::default();
        let t = TileSettings::default();
        let i = InflationSettings::default();

        fix_positive("roofing.square_sqft", &mut self.roofing.square_sqft, r.square_sqft);
        fix_non_negative("roofing.bundles_per_square", &mut self.roofing.bundles_per_square, r.bundles_per_square);
        fix_positive("roofing.hip_area_factor", &mut self.roofing.hip_area_factor, r.hip_area_factor);
        fix_non_negative("roofing.default_waste_pct", &mut self.roofing.default_waste_pct, r.default_waste_pct);
        fix_positive("roofing.underlayment_roll_sqft", &mut self.roofing.underlayment_roll_sqft, r.underlayment_roll_sqft);
        fix_positive("roofing.ridge_cap_lf_per_bundle", &mut self.roofing.ridge_cap_lf_per_bundle, r.ridge_cap_lf_per_bundle);

        fix_positive("tile.grout_density_lb_per_cuft", &mut self.tile.grout_density_lb_per_cuft, t.grout_density_lb_per_cuft);
        fix_positive("tile.grout_bag_lb", &mut self.tile.grout_bag_lb, t.grout_bag_lb);
        fix_non_negative("tile.grout_bag_price", &mut self.tile.grout_bag_price, t.grout_bag_price);
        fix_non_negative("tile.mortar_bag_price", &mut self.tile.mortar_bag_price, t.mortar_bag_price);
        fix_positive("tile.thinset_coverage_sqft", &mut self.tile.thinset_coverage_sqft, t.thinset_coverage_sqft);
        fix_positive("tile.default_thickness_in", &mut self.tile.default_thickness_in, t.default_thickness_in);
        fix_non_negative("tile.thinset_waste_weight", &mut self.tile.thinset_waste_weight, t.thinset_waste_weight);
        if self.tile.default_tiles_per_box == 0 {
            tracing::warn!(setting = "tile.default_tiles_per_box", "zero box size replaced with default");
            self.tile.default_tiles_per_box = t.default_tiles_per_box;
        }

        fix_positive("inflation.rule_of_72", &mut self.inflation.rule_of_72, i.rule_of_72);
        self
    }
}

fn fix_positive(name: &str, value: &mut f64, default: f64) {
    if !(value.is_finite() && *value > 0.0) {
        tracing::warn!(setting = name, value = *value, default, "non-positive setting replaced with default");
        *value = default;
    }
}

fn fix_non_negative(name: &str, value: &mut f64, default: f64) {
    if !(value.is_finite() && *value >= 0.0) {
        tracing::warn!(setting = name, value = *value, default, "negative setting replaced with default");
        *value = default;
    }
}

/// hCG growth classification thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HcgSettings {
    /// Upper bound (exclusive) of the low-level band, mIU/mL
    pub low_band_max: f64,
    /// Upper bound (exclusive) of the mid-level band, mIU/mL
    pub mid_band_max: f64,
    /// Low band: doubling slower than this many hours is "Slow"
    pub low_band_slow_hours: f64,
    /// Low band: doubling faster than this many hours is "Fast"
    pub low_band_fast_hours: f64,
    /// Mid band: doubling slower than this many hours is "Slow"
    pub mid_band_slow_hours: f64,
    /// Mid band: doubling faster than this many hours is "Fast"
    pub mid_band_fast_hours: f64,
    /// Latest level above which fast doubling suggests multiples
    pub multiples_min_level: f64,
    /// Doubling time (hours) under which multiples are suggested
    pub multiples_max_hours: f64,
    /// Latest level at or below which it is too early to tell
    pub too_early_max_level: f64,
    /// Maximum number of draws accepted
    pub max_draws: usize,
}

impl Default for HcgSettings {
    fn default() -> Self {
        HcgSettings {
            low_band_max: 1200.0,
            mid_band_max: 6000.0,
            low_band_slow_hours: 72.0,
            low_band_fast_hours: 31.0,
            mid_band_slow_hours: 96.0,
            mid_band_fast_hours: 48.0,
            multiples_min_level: 1000.0,
            multiples_max_hours: 31.0,
            too_early_max_level: 50.0,
            max_draws: 6,
        }
    }
}

/// Inflation projector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InflationSettings {
    /// Numerator of the doubling-time rule of thumb
    pub rule_of_72: f64,
    /// Currency used when the input names none
    pub default_currency: String,
}

impl Default for InflationSettings {
    fn default() -> Self {
        InflationSettings {
            rule_of_72: 72.0,
            default_currency: "USD".to_string(),
        }
    }
}

/// Roofing material estimator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoofingSettings {
    /// Square feet in one roofing square
    pub square_sqft: f64,
    /// Shingle bundles per roofing square
    pub bundles_per_square: f64,
    /// Extra surface of a hip roof relative to a gable of the same footprint
    pub hip_area_factor: f64,
    /// Waste percentage when the input gives none
    pub default_waste_pct: f64,
    /// Coverage of one underlayment roll, sq ft
    pub underlayment_roll_sqft: f64,
    /// Linear feet of ridge covered by one bundle of ridge cap
    pub ridge_cap_lf_per_bundle: f64,
    /// Currency used when the input names none
    pub default_currency: String,
}

impl Default for RoofingSettings {
    fn default() -> Self {
        RoofingSettings {
            square_sqft: 100.0,
            bundles_per_square: 3.0,
            hip_area_factor: 1.10,
            default_waste_pct: 10.0,
            underlayment_roll_sqft: 400.0,
            ridge_cap_lf_per_bundle: 33.0,
            default_currency: "USD".to_string(),
        }
    }
}

/// Tile, grout and mortar estimator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileSettings {
    /// Cured grout density, lb per cubic foot
    pub grout_density_lb_per_cuft: f64,
    /// Weight of one grout bag, lb
    pub grout_bag_lb: f64,
    /// Approximate price of one grout bag
    pub grout_bag_price: f64,
    /// Approximate price of one bag of thinset mortar
    pub mortar_bag_price: f64,
    /// Default coverage of one thinset bag, sq ft
    pub thinset_coverage_sqft: f64,
    /// Default tiles per box
    pub default_tiles_per_box: u32,
    /// Default tile thickness (grout joint depth), inches
    pub default_thickness_in: f64,
    /// Joints at least this wide (inches) take sanded grout
    pub sanded_grout_min_joint_in: f64,
    /// Thinset waste fraction per percent of tile waste
    pub thinset_waste_weight: f64,
    /// Currency used when the input names none
    pub default_currency: String,
}

impl Default for TileSettings {
    fn default() -> Self {
        TileSettings {
            grout_density_lb_per_cuft: 100.0,
            grout_bag_lb: 25.0,
            grout_bag_price: 15.0,
            mortar_bag_price: 25.0,
            thinset_coverage_sqft: 90.0,
            default_tiles_per_box: 10,
            default_thickness_in: 0.375,
            sanded_grout_min_joint_in: 0.125,
            thinset_waste_weight: 0.005,
            default_currency: "USD".to_string(),
        }
    }
}
