//! # Tile, Grout and Mortar Estimate
//!
//! Converts a rectangular surface and a tile size into tile and box counts,
//! grout bags (from the joint volume left between tiles) and thinset bags.
//!
//! ## Grout volume
//!
//! Each tile occupies `(L + j) x (W + j)` once its joint is included; the
//! joint share of the surface is one minus the tile coverage ratio:
//!
//! ```text
//! coverage  = (L * W) / ((L + j) * (W + j))
//! grout_ft3 = area * (1 - coverage) * thickness / 12
//! grout_lb  = grout_ft3 * density
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::tile::{calculate, LayoutPattern, TileInput};
//! use calc_core::settings::TileSettings;
//!
//! let settings = TileSettings::default();
//! let mut input = TileInput::new(10.0, 8.0, 12.0, 12.0, &settings);
//! input.layout = LayoutPattern::Grid;
//! let estimate = calculate(&input, &settings).unwrap();
//! assert_eq!(estimate.base_tiles, 80);
//! assert_eq!(estimate.total_tiles, 88);
//! assert_eq!(estimate.boxes, 9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::format::{format_count, format_currency, format_number, Locale};
use crate::i18n::Translations;
use crate::input::CalculationInput;
use crate::result::{record, CalculationResult, ResultBuilder, ResultValue};
use crate::settings::{CalculatorSettings, TileSettings};
use crate::units::{Feet, LengthUnit, SqFt, SqIn, SqM};
use super::{add_counts, whole_count};

const DEFAULT_SUMMARY: &str =
    "You need {totalTiles} tiles ({boxesNeeded} boxes) for {totalArea}, plus {groutBags} bags of {groutType} and {thinsetBags} bags of thinset.";

/// Default grout joint, inches.
pub const DEFAULT_JOINT_IN: f64 = 0.125;

/// Quick-pick sizes offered by the tile form, inches.
pub const QUICK_PICK_SIZES: [&str; 8] = ["4x4", "6x6", "12x12", "12x24", "18x18", "24x24", "3x6", "6x24"];

// ============================================================================
// Layout and trowel
// ============================================================================

/// Laying pattern. Each has a conventional waste allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutPattern {
    #[default]
    Grid,
    RunningBond,
    Diagonal,
    Herringbone,
}

impl LayoutPattern {
    pub const ALL: [LayoutPattern; 4] = [
        LayoutPattern::Grid,
        LayoutPattern::RunningBond,
        LayoutPattern::Diagonal,
        LayoutPattern::Herringbone,
    ];

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "grid" | "straight" | "stacked" => Some(LayoutPattern::Grid),
            "running-bond" | "running_bond" | "brick" | "offset" => Some(LayoutPattern::RunningBond),
            "diagonal" => Some(LayoutPattern::Diagonal),
            "herringbone" => Some(LayoutPattern::Herringbone),
            _ => None,
        }
    }

    /// Waste percentage used when the input does not override it.
    pub fn default_waste_pct(&self) -> f64 {
        match self {
            LayoutPattern::Grid => 10.0,
            LayoutPattern::RunningBond => 12.0,
            LayoutPattern::Diagonal => 15.0,
            LayoutPattern::Herringbone => 20.0,
        }
    }

    pub fn translation_key(&self) -> &'static str {
        match self {
            LayoutPattern::Grid => "values.grid",
            LayoutPattern::RunningBond => "values.runningBond",
            LayoutPattern::Diagonal => "values.diagonal",
            LayoutPattern::Herringbone => "values.herringbone",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LayoutPattern::Grid => "grid",
            LayoutPattern::RunningBond => "running bond",
            LayoutPattern::Diagonal => "diagonal",
            LayoutPattern::Herringbone => "herringbone",
        }
    }
}

/// Trowel notch recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrowelNotch {
    /// 3/16" V-notch
    Small,
    /// 1/4" x 3/8" square notch
    Medium,
    /// 1/2" x 1/2" square notch
    Large,
}

impl TrowelNotch {
    /// Step function of the larger tile side, inches.
    pub fn for_tile(largest_side_in: f64) -> Self {
        if largest_side_in < 8.0 {
            TrowelNotch::Small
        } else if largest_side_in <= 15.0 {
            TrowelNotch::Medium
        } else {
            TrowelNotch::Large
        }
    }

    pub fn translation_key(&self) -> &'static str {
        match self {
            TrowelNotch::Small => "values.trowelSmall",
            TrowelNotch::Medium => "values.trowelMedium",
            TrowelNotch::Large => "values.trowelLarge",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TrowelNotch::Small => "3/16\" V-notch",
            TrowelNotch::Medium => "1/4\" x 3/8\" square notch",
            TrowelNotch::Large => "1/2\" x 1/2\" square notch",
        }
    }
}

/// Parse a quick-pick size such as `"12x24"` into inches.
pub fn parse_tile_size(raw: &str) -> Option<(f64, f64)> {
    let lowered = raw.trim().to_ascii_lowercase().replace('×', "x");
    let (length, width) = lowered.split_once('x')?;
    let length: f64 = length.trim().trim_end_matches('"').parse().ok()?;
    let width: f64 = width.trim().trim_end_matches('"').parse().ok()?;
    (length > 0.0 && width > 0.0).then_some((length, width))
}

// ============================================================================
// Input
// ============================================================================

/// Tile price: per square foot of tile bought or per box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount")]
pub enum TilePrice {
    PerSqFt(f64),
    PerBox(f64),
}

/// Input parameters for a tile estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileInput {
    pub area_length_ft: f64,
    pub area_width_ft: f64,
    pub tile_length_in: f64,
    pub tile_width_in: f64,
    pub layout: LayoutPattern,
    /// Explicit waste; `None` uses the layout allowance
    pub waste_pct: Option<f64>,
    pub joint_in: f64,
    pub thickness_in: f64,
    pub tiles_per_box: u32,
    pub thinset_coverage_sqft: f64,
    pub price: Option<TilePrice>,
    pub currency: String,
}

impl TileInput {
    /// Input with defaults for everything but the surface and tile size.
    pub fn new(area_length_ft: f64, area_width_ft: f64, tile_length_in: f64, tile_width_in: f64, settings: &TileSettings) -> Self {
        TileInput {
            area_length_ft,
            area_width_ft,
            tile_length_in,
            tile_width_in,
            layout: LayoutPattern::default(),
            waste_pct: None,
            joint_in: DEFAULT_JOINT_IN,
            thickness_in: settings.default_thickness_in,
            tiles_per_box: settings.default_tiles_per_box,
            thinset_coverage_sqft: settings.thinset_coverage_sqft,
            price: None,
            currency: settings.default_currency.clone(),
        }
    }

    /// Read the contract fields: `length`, `width` (canonical feet),
    /// `tileSize` (`"LxW"` or `"custom"` with `tileLength`/`tileWidth`),
    /// `layout`, `wasteFactor`, `groutWidth`, `tileThickness`, `tilesPerBox`,
    /// `thinsetCoverage`, `pricePerSqFt`, `pricePerBox`, `currency`.
    pub fn from_fields(input: &CalculationInput, settings: &TileSettings) -> CalcResult<Self> {
        let fields = input.fields();

        let (tile_length_in, tile_width_in) = match fields.text("tileSize") {
            Some(size) if !size.eq_ignore_ascii_case("custom") => parse_tile_size(&size)
                .ok_or_else(|| CalcError::invalid_input("tileSize", size.clone(), "Expected a size like 12x24"))?,
            Some(_) => (
                input.positive_length("tileLength", LengthUnit::Inches)?,
                input.positive_length("tileWidth", LengthUnit::Inches)?,
            ),
            None if fields.number("tileLength").is_some() => (
                input.positive_length("tileLength", LengthUnit::Inches)?,
                input.positive_length("tileWidth", LengthUnit::Inches)?,
            ),
            None => return Err(CalcError::missing_field("tileSize")),
        };

        let layout = match fields.text("layout") {
            Some(slug) => LayoutPattern::from_slug(&slug)
                .ok_or_else(|| CalcError::invalid_input("layout", slug.clone(), "Unknown layout pattern"))?,
            None => LayoutPattern::default(),
        };

        let joint_in = match fields.non_negative("groutWidth")? {
            Some(_) => input.length("groutWidth", LengthUnit::Inches).unwrap_or(DEFAULT_JOINT_IN),
            None => DEFAULT_JOINT_IN,
        };
        let thickness_in = match fields.non_negative("tileThickness")? {
            Some(_) => input
                .length("tileThickness", LengthUnit::Inches)
                .unwrap_or(settings.default_thickness_in),
            None => settings.default_thickness_in,
        };

        let tiles_per_box = match fields.non_negative("tilesPerBox")? {
            Some(n) if n >= 1.0 && n.fract() == 0.0 => n as u32,
            Some(n) => {
                return Err(CalcError::invalid_input("tilesPerBox", n.to_string(), "Must be a whole number of at least 1"))
            }
            None => settings.default_tiles_per_box,
        };

        let price = match (fields.non_negative("pricePerSqFt")?, fields.non_negative("pricePerBox")?) {
            (Some(p), _) => Some(TilePrice::PerSqFt(p)),
            (None, Some(p)) => Some(TilePrice::PerBox(p)),
            (None, None) => None,
        };

        Ok(TileInput {
            area_length_ft: input.positive_length("length", LengthUnit::Feet)?,
            area_width_ft: input.positive_length("width", LengthUnit::Feet)?,
            tile_length_in,
            tile_width_in,
            layout,
            waste_pct: fields.non_negative("wasteFactor")?,
            joint_in,
            thickness_in,
            tiles_per_box,
            thinset_coverage_sqft: fields
                .non_negative("thinsetCoverage")?
                .unwrap_or(settings.thinset_coverage_sqft),
            price,
            currency: fields
                .text("currency")
                .unwrap_or_else(|| settings.default_currency.clone()),
        })
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("length", self.area_length_ft),
            ("width", self.area_width_ft),
            ("tileLength", self.tile_length_in),
            ("tileWidth", self.tile_width_in),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be greater than zero"));
            }
        }
        if !(self.joint_in >= 0.0) {
            return Err(CalcError::invalid_input("groutWidth", self.joint_in.to_string(), "Cannot be negative"));
        }
        if !(self.thickness_in >= 0.0) {
            return Err(CalcError::invalid_input("tileThickness", self.thickness_in.to_string(), "Cannot be negative"));
        }
        if let Some(waste) = self.waste_pct {
            if !(waste >= 0.0) {
                return Err(CalcError::invalid_input("wasteFactor", waste.to_string(), "Cannot be negative"));
            }
        }
        if self.tiles_per_box == 0 {
            return Err(CalcError::division_guard("boxes", "Tiles per box must be at least 1"));
        }
        if !(self.thinset_coverage_sqft > 0.0) {
            return Err(CalcError::division_guard("thinset", "Coverage per bag must be greater than zero"));
        }
        Ok(())
    }

    /// Waste in effect: the explicit override, else the layout allowance.
    pub fn effective_waste_pct(&self) -> f64 {
        self.waste_pct.unwrap_or_else(|| self.layout.default_waste_pct())
    }
}

// ============================================================================
// Estimate
// ============================================================================

/// Grout formulation for the joint width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroutType {
    Sanded,
    Unsanded,
}

impl GroutType {
    pub fn for_joint(joint_in: f64, settings: &TileSettings) -> Self {
        if joint_in >= settings.sanded_grout_min_joint_in {
            GroutType::Sanded
        } else {
            GroutType::Unsanded
        }
    }

    pub fn translation_key(&self) -> &'static str {
        match self {
            GroutType::Sanded => "values.sandedGrout",
            GroutType::Unsanded => "values.unsandedGrout",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GroutType::Sanded => "sanded grout",
            GroutType::Unsanded => "unsanded grout",
        }
    }
}

/// Itemized cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileCost {
    pub tiles: f64,
    pub grout: f64,
    pub thinset: f64,
    pub total: f64,
}

/// Results from a tile estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileEstimate {
    pub total_area_sqft: f64,
    pub total_area_sqm: f64,
    pub tile_area_sqft: f64,
    pub base_tiles: u32,
    pub waste_pct: f64,
    pub waste_tiles: u32,
    pub total_tiles: u32,
    pub boxes: u32,
    pub grout_area_sqft: f64,
    pub grout_volume_cuft: f64,
    pub grout_weight_lb: f64,
    pub grout_bags: u32,
    pub grout_type: GroutType,
    pub thinset_area_sqft: f64,
    pub thinset_bags: u32,
    pub trowel: TrowelNotch,
    pub cost: Option<TileCost>,
    pub layout: LayoutPattern,
}

/// Estimate tiles, grout and thinset.
///
/// # Returns
///
/// * `Ok(TileEstimate)` - Quantities and optional cost
/// * `Err(CalcError)` - If a dimension is missing or a divisor is zero
pub fn calculate(input: &TileInput, settings: &TileSettings) -> CalcResult<TileEstimate> {
    input.validate()?;

    let total_area_sqft = (Feet(input.area_length_ft) * Feet(input.area_width_ft)).value();
    let tile_area_sqft = SqFt::from(SqIn(input.tile_length_in * input.tile_width_in)).value();

    let base_tiles = whole_count(total_area_sqft / tile_area_sqft, "baseTiles")?;
    let waste_pct = input.effective_waste_pct();
    let waste_tiles = whole_count(f64::from(base_tiles) * waste_pct / 100.0, "wasteTiles")?;
    let total_tiles = add_counts(base_tiles, waste_tiles, "totalTiles")?;
    let boxes = total_tiles.div_ceil(input.tiles_per_box);

    let cell_area_sqft =
        SqFt::from(SqIn((input.tile_length_in + input.joint_in) * (input.tile_width_in + input.joint_in))).value();
    let coverage_ratio = tile_area_sqft / cell_area_sqft;
    let grout_area_sqft = total_area_sqft * (1.0 - coverage_ratio);
    let grout_volume_cuft = grout_area_sqft * (input.thickness_in / 12.0);
    let grout_weight_lb = grout_volume_cuft * settings.grout_density_lb_per_cuft;
    let grout_bags = if grout_weight_lb > 0.0 {
        whole_count(grout_weight_lb / settings.grout_bag_lb, "groutBags")?.max(1)
    } else {
        0
    };

    let thinset_area_sqft = total_area_sqft * (1.0 + waste_pct * settings.thinset_waste_weight);
    let thinset_bags = whole_count(thinset_area_sqft / input.thinset_coverage_sqft, "thinsetBags")?.max(1);

    let cost = input.price.map(|price| {
        let tiles = match price {
            TilePrice::PerSqFt(p) => total_tiles as f64 * tile_area_sqft * p,
            TilePrice::PerBox(p) => boxes as f64 * p,
        };
        let grout = grout_bags as f64 * settings.grout_bag_price;
        let thinset = thinset_bags as f64 * settings.mortar_bag_price;
        TileCost { tiles, grout, thinset, total: tiles + grout + thinset }
    });

    tracing::trace!(total_area_sqft, base_tiles, total_tiles, grout_weight_lb, "tile estimate computed");

    Ok(TileEstimate {
        total_area_sqft,
        total_area_sqm: SqM::from(SqFt(total_area_sqft)).value(),
        tile_area_sqft,
        base_tiles,
        waste_pct,
        waste_tiles,
        total_tiles,
        boxes,
        grout_area_sqft,
        grout_volume_cuft,
        grout_weight_lb,
        grout_bags,
        grout_type: GroutType::for_joint(input.joint_in, settings),
        thinset_area_sqft,
        thinset_bags,
        trowel: TrowelNotch::for_tile(input.tile_length_in.max(input.tile_width_in)),
        cost,
        layout: input.layout,
    })
}

// ============================================================================
// Contract
// ============================================================================

/// Evaluate the contract input. Never fails.
pub fn evaluate(input: &CalculationInput, settings: &CalculatorSettings) -> CalculationResult {
    let outcome = TileInput::from_fields(input, &settings.tile).and_then(|typed| {
        calculate(&typed, &settings.tile)
            .map(|e| present(&e, &typed.currency, &Translations::new(&input.translations), input.locale))
    });
    super::into_contract("tile", outcome)
}

/// Render an estimate into the contract result.
pub fn present(e: &TileEstimate, currency: &str, t: &Translations<'_>, locale: Locale) -> CalculationResult {
    let sqft = t.text("units.sqft", "sq ft");
    let sqm = t.text("units.sqm", "m²");
    let bags = t.text("units.bags", "bags");
    let count = |n: u32| format_count(n as f64, locale);

    let mut b = ResultBuilder::new();
    b.field(
        "totalArea",
        e.total_area_sqft,
        format!("{} {}", format_number(e.total_area_sqft, 1, locale), sqft),
    );
    b.field(
        "totalAreaMetric",
        e.total_area_sqm,
        format!("{} {}", format_number(e.total_area_sqm, 2, locale), sqm),
    );
    b.field("baseTiles", e.base_tiles, count(e.base_tiles));
    b.field("wastePercent", e.waste_pct, format!("{}%", format_number(e.waste_pct, 0, locale)));
    b.field(
        "totalTiles",
        e.total_tiles,
        format!("{} (+{}%)", count(e.total_tiles), format_number(e.waste_pct, 0, locale)),
    );
    b.field("boxesNeeded", e.boxes, count(e.boxes));
    b.field(
        "groutWeight",
        e.grout_weight_lb,
        format!("{} lb", format_number(e.grout_weight_lb, 1, locale)),
    );
    b.field("groutBags", e.grout_bags, count(e.grout_bags));
    b.label("groutType", t.text(e.grout_type.translation_key(), e.grout_type.display_name()));
    b.field("thinsetBags", e.thinset_bags, count(e.thinset_bags));
    b.label("trowelSize", t.text(e.trowel.translation_key(), e.trowel.display_name()));
    b.label("layout", t.text(e.layout.translation_key(), e.layout.display_name()));

    let money = |v: f64| format_currency(v, currency, locale);
    if let Some(cost) = e.cost {
        b.field("tileCost", cost.tiles, money(cost.tiles));
        b.field("groutCost", cost.grout, money(cost.grout));
        b.field("thinsetCost", cost.thinset, money(cost.thinset));
        b.field("totalCost", cost.total, money(cost.total));
    }

    let materials = [
        ("values.tiles", "Tiles", count(e.total_tiles), e.cost.map(|c| c.tiles)),
        (
            e.grout_type.translation_key(),
            e.grout_type.display_name(),
            format!("{} {}", count(e.grout_bags), bags),
            e.cost.map(|c| c.grout),
        ),
        (
            "values.thinset",
            "Thinset mortar",
            format!("{} {}", count(e.thinset_bags), bags),
            e.cost.map(|c| c.thinset),
        ),
    ];
    for (key, default, quantity, cost) in materials {
        let mut row = record([
            ("material", ResultValue::from(t.text(key, default))),
            ("quantity", ResultValue::from(quantity)),
        ]);
        if let Some(cost) = cost {
            row.insert("cost".to_string(), ResultValue::from(money(cost)));
        }
        b.table_row(row);
    }

    b.finish(t, DEFAULT_SUMMARY)
}
