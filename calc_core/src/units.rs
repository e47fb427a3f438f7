//! # Unit Types and Input Normalization
//!
//! Type-safe wrappers for the units the home-improvement calculators work in,
//! plus the normalizer that turns a raw value and a caller-supplied unit tag
//! into the formula's canonical unit.
//!
//! ## Canonical Units
//!
//! - Geometry is computed in feet (lengths) and square feet (areas).
//! - Tile dimensions, grout joints and thickness are computed in inches.
//! - Currency amounts are never converted, only symbol-formatted.
//!
//! ## Unit Tags
//!
//! A tag the normalizer does not recognize, or no tag at all, falls back to
//! the field's canonical unit without raising an error. Forms do not put a
//! unit selector on every field, so an absent tag is the normal case.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::units::{normalize_length, Feet, Inches, LengthUnit};
//!
//! let span = Feet(12.0);
//! let span_inches: Inches = span.into();
//! assert_eq!(span_inches.0, 144.0);
//!
//! let ft = normalize_length(10.0, Some("m"), LengthUnit::Feet);
//! assert!((ft - 32.8084).abs() < 1e-9);
//!
//! // Missing tag: value is taken as the canonical unit
//! assert_eq!(normalize_length(10.0, None, LengthUnit::Feet), 10.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Feet per meter
pub const FEET_PER_METER: f64 = 3.28084;

/// Square feet per square meter
pub const SQFT_PER_SQM: f64 = 10.7639;

// ============================================================================
// Length Units
// ============================================================================

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Feet> for Inches {
    fn from(ft: Feet) -> Self {
        Inches(ft.0 * 12.0)
    }
}

impl From<Inches> for Feet {
    fn from(inches: Inches) -> Self {
        Feet(inches.0 / 12.0)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqFt(pub f64);

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqM(pub f64);

/// Area in square inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqIn(pub f64);

impl From<SqFt> for SqM {
    fn from(sqft: SqFt) -> Self {
        SqM(sqft.0 / SQFT_PER_SQM)
    }
}

impl From<SqM> for SqFt {
    fn from(sqm: SqM) -> Self {
        SqFt(sqm.0 * SQFT_PER_SQM)
    }
}

impl From<SqIn> for SqFt {
    fn from(sqin: SqIn) -> Self {
        SqFt(sqin.0 / 144.0)
    }
}

impl From<SqFt> for SqIn {
    fn from(sqft: SqFt) -> Self {
        SqIn(sqft.0 * 144.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Feet);
impl_arithmetic!(Inches);
impl_arithmetic!(SqFt);
impl_arithmetic!(SqM);
impl_arithmetic!(SqIn);

impl Mul<Feet> for Feet {
    type Output = SqFt;
    fn mul(self, rhs: Feet) -> SqFt {
        SqFt(self.0 * rhs.0)
    }
}

// ============================================================================
// Normalizer
// ============================================================================

/// Length units a caller may tag a field with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Feet,
    Inches,
    Yards,
    Meters,
    Centimeters,
    Millimeters,
}

impl LengthUnit {
    /// Parse a unit tag such as `"ft"`, `"m"` or `"mm"`.
    ///
    /// Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "ft" | "feet" | "foot" => Some(LengthUnit::Feet),
            "in" | "inch" | "inches" => Some(LengthUnit::Inches),
            "yd" | "yard" | "yards" => Some(LengthUnit::Yards),
            "m" | "meter" | "meters" | "metre" | "metres" => Some(LengthUnit::Meters),
            "cm" | "centimeter" | "centimeters" => Some(LengthUnit::Centimeters),
            "mm" | "millimeter" | "millimeters" => Some(LengthUnit::Millimeters),
            _ => None,
        }
    }

    /// Short tag used in formatted output
    pub fn tag(&self) -> &'static str {
        match self {
            LengthUnit::Feet => "ft",
            LengthUnit::Inches => "in",
            LengthUnit::Yards => "yd",
            LengthUnit::Meters => "m",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Millimeters => "mm",
        }
    }

    /// Scale factor from this unit to feet
    pub fn feet_per_unit(&self) -> f64 {
        match self {
            LengthUnit::Feet => 1.0,
            LengthUnit::Inches => 1.0 / 12.0,
            LengthUnit::Yards => 3.0,
            LengthUnit::Meters => FEET_PER_METER,
            LengthUnit::Centimeters => FEET_PER_METER / 100.0,
            LengthUnit::Millimeters => FEET_PER_METER / 1000.0,
        }
    }

    /// Convert a value in this unit to `target`.
    ///
    /// Pure linear scale through feet.
    pub fn convert(&self, value: f64, target: LengthUnit) -> f64 {
        if *self == target {
            return value;
        }
        value * self.feet_per_unit() / target.feet_per_unit()
    }
}

/// Normalize a length to `canonical`.
///
/// `tag` is the caller's unit tag for the field. Missing or unrecognized tags
/// mean the value is already in the canonical unit.
pub fn normalize_length(value: f64, tag: Option<&str>, canonical: LengthUnit) -> f64 {
    match tag.and_then(LengthUnit::from_tag) {
        Some(unit) => unit.convert(value, canonical),
        None => {
            if let Some(t) = tag {
                tracing::trace!(tag = t, canonical = canonical.tag(), "unrecognized unit tag, using canonical unit");
            }
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feet_to_inches() {
        let ft = Feet(10.0);
        let inches: Inches = ft.into();
        assert_eq!(inches.0, 120.0);
    }

    #[test]
    fn test_sqft_to_sqm() {
        let sqm: SqM = SqFt(107.639).into();
        assert!((sqm.0 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_feet_product_is_area() {
        let area = Feet(8.0) * Feet(10.0);
        assert_eq!(area, SqFt(80.0));
    }

    #[test]
    fn test_arithmetic() {
        let a = Feet(10.0);
        let b = Feet(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_meters_to_feet_is_linear() {
        assert!((normalize_length(1.0, Some("m"), LengthUnit::Feet) - 3.28084).abs() < 1e-12);
        assert!((normalize_length(2.5, Some("m"), LengthUnit::Feet) - 8.2021).abs() < 1e-9);
    }

    #[test]
    fn test_millimeters_to_inches() {
        // 25.4 mm is one inch (within the 3.28084 ft/m rounding)
        let inches = normalize_length(25.4, Some("mm"), LengthUnit::Inches);
        assert!((inches - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_or_unknown_tag_defaults_to_canonical() {
        assert_eq!(normalize_length(7.0, None, LengthUnit::Inches), 7.0);
        assert_eq!(normalize_length(7.0, Some("furlongs"), LengthUnit::Feet), 7.0);
        assert_eq!(normalize_length(7.0, Some("FT"), LengthUnit::Feet), 7.0);
    }

    #[test]
    fn test_serialization() {
        let ft = Feet(12.5);
        let json = serde_json::to_string(&ft).unwrap();
        assert_eq!(json, "12.5");

        let roundtrip: Feet = serde_json::from_str(&json).unwrap();
        assert_eq!(ft, roundtrip);

        let unit: LengthUnit = serde_json::from_str("\"meters\"").unwrap();
        assert_eq!(unit, LengthUnit::Meters);
    }
}
