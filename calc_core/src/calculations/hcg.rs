//! # hCG Trend Analysis
//!
//! Computes the exponential doubling time and daily growth rate of serum hCG
//! from 2-6 timestamped blood draws, classifies the growth, estimates the
//! gestational week and flags possible multiples. The multiples flag is a
//! heuristic, not a diagnosis.
//!
//! ## Method
//!
//! The primary figures always come from the **two most recent** draws, even
//! when more are supplied; earlier draws only contribute to the per-interval
//! table and the first/last summary.
//!
//! ```text
//! DT   = hours * ln 2 / ln(latest / previous)
//! rate = (latest / previous)^(24 / hours) - 1
//! ```
//!
//! The slow/fast thresholds depend on the *previous* draw's level, since hCG
//! doubles more slowly as concentration rises.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::hcg::{calculate, BloodDraw, GrowthStatus, HcgInput};
//! use calc_core::settings::HcgSettings;
//!
//! let input = HcgInput {
//!     draws: vec![
//!         BloodDraw::parse("2026-02-01", 120.0).unwrap(),
//!         BloodDraw::parse("2026-02-03", 280.0).unwrap(),
//!     ],
//!     transfer_date: None,
//! };
//! let analysis = calculate(&input, &HcgSettings::default()).unwrap();
//! let dt = analysis.doubling_time_hours.unwrap();
//! assert!((dt - 39.27).abs() < 0.01);
//! assert_eq!(analysis.status, GrowthStatus::Normal);
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::format::{format_count, format_number, format_signed_percent, short_date, Locale};
use crate::i18n::Translations;
use crate::input::{parse_date_time, CalculationInput, Fields};
use crate::result::{record, CalculationResult, ResultBuilder, ResultValue};
use crate::settings::{CalculatorSettings, HcgSettings};

const DEFAULT_SUMMARY: &str =
    "hCG is doubling every {doublingTime} ({dailyGrowth} per day). Status: {status}. Estimated {estimatedWeek}.";

// ============================================================================
// Reference data
// ============================================================================

/// One step of the gestational-week estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekBin {
    /// Inclusive upper bound of the latest hCG level for this bin
    pub max_level: f64,
    pub key: &'static str,
    pub label: &'static str,
}

/// Latest-level -> estimated gestational week, ascending.
pub const WEEK_BINS: [WeekBin; 8] = [
    WeekBin { max_level: 50.0, key: "values.week3", label: "~3 weeks" },
    WeekBin { max_level: 426.0, key: "values.week4", label: "~4 weeks" },
    WeekBin { max_level: 7_340.0, key: "values.week5", label: "~5 weeks" },
    WeekBin { max_level: 56_500.0, key: "values.week6", label: "~6 weeks" },
    WeekBin { max_level: 120_000.0, key: "values.week7", label: "~7 weeks" },
    WeekBin { max_level: 229_000.0, key: "values.week8", label: "~8 weeks" },
    WeekBin { max_level: 288_000.0, key: "values.week9to12", label: "~9-12 weeks" },
    WeekBin { max_level: f64::INFINITY, key: "values.weekPeak", label: "9+ weeks near peak" },
];

/// Published hCG range for a span of gestational weeks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HcgRange {
    pub weeks: &'static str,
    pub low: f64,
    pub high: f64,
    pub typical_doubling: &'static str,
}

/// Reference ranges (mIU/mL) by weeks since last menstrual period.
pub const HCG_REFERENCE_RANGES: [HcgRange; 9] = [
    HcgRange { weeks: "3 weeks", low: 5.0, high: 50.0, typical_doubling: "31-72 hours" },
    HcgRange { weeks: "4 weeks", low: 5.0, high: 426.0, typical_doubling: "31-72 hours" },
    HcgRange { weeks: "5 weeks", low: 18.0, high: 7_340.0, typical_doubling: "31-72 hours" },
    HcgRange { weeks: "6 weeks", low: 1_080.0, high: 56_500.0, typical_doubling: "48-96 hours" },
    HcgRange { weeks: "7-8 weeks", low: 7_650.0, high: 229_000.0, typical_doubling: "96+ hours" },
    HcgRange { weeks: "9-12 weeks", low: 25_700.0, high: 288_000.0, typical_doubling: "Plateau, then decline" },
    HcgRange { weeks: "13-16 weeks", low: 13_300.0, high: 254_000.0, typical_doubling: "Declining" },
    HcgRange { weeks: "17-24 weeks", low: 4_060.0, high: 165_400.0, typical_doubling: "Declining" },
    HcgRange { weeks: "25-40 weeks", low: 3_640.0, high: 117_000.0, typical_doubling: "Stable" },
];

/// Estimated week bin for a latest hCG level.
pub fn estimate_week(level: f64) -> &'static WeekBin {
    WEEK_BINS
        .iter()
        .find(|bin| level <= bin.max_level)
        .unwrap_or(&WEEK_BINS[WEEK_BINS.len() - 1])
}

// ============================================================================
// Input
// ============================================================================

/// One lab draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodDraw {
    pub drawn_at: NaiveDateTime,
    /// Serum hCG, mIU/mL
    pub hcg_level: f64,
}

impl BloodDraw {
    /// Build a draw from an ISO date string; `None` if the date does not parse.
    pub fn parse(date: &str, hcg_level: f64) -> Option<Self> {
        parse_date_time(date).map(|drawn_at| BloodDraw { drawn_at, hcg_level })
    }

    fn from_record(fields: Fields<'_>) -> Option<Self> {
        let drawn_at = fields.date("date")?;
        let hcg_level = fields.number("hcgLevel")?;
        (hcg_level > 0.0).then_some(BloodDraw { drawn_at, hcg_level })
    }
}

/// Input parameters for the hCG analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HcgInput {
    /// Draws in any order; `calculate` sorts them
    pub draws: Vec<BloodDraw>,
    /// Embryo transfer date for fertility-treatment pregnancies
    pub transfer_date: Option<NaiveDateTime>,
}

impl HcgInput {
    /// Read draws from the `draws` repeating group (`date`, `hcgLevel`),
    /// dropping incomplete rows and rows with a non-positive level.
    pub fn from_fields(input: &CalculationInput) -> Self {
        let fields = input.fields();
        let draws = fields
            .list("draws")
            .iter()
            .filter_map(|row| BloodDraw::from_record(fields.nested(row)))
            .collect();
        HcgInput {
            draws,
            transfer_date: fields.date("transferDate"),
        }
    }

    /// Validate input parameters.
    pub fn validate(&self, settings: &HcgSettings) -> CalcResult<()> {
        if self.draws.len() < 2 {
            return Err(CalcError::invalid_input(
                "draws",
                self.draws.len().to_string(),
                "At least two draws with a date and a positive level are required",
            ));
        }
        if self.draws.len() > settings.max_draws {
            return Err(CalcError::invalid_input(
                "draws",
                self.draws.len().to_string(),
                format!("At most {} draws are supported", settings.max_draws),
            ));
        }
        if let Some(bad) = self.draws.iter().find(|d| !(d.hcg_level > 0.0 && d.hcg_level.is_finite())) {
            return Err(CalcError::invalid_input(
                "hcgLevel",
                bad.hcg_level.to_string(),
                "hCG level must be positive",
            ));
        }
        Ok(())
    }

    /// Draws sorted ascending by date.
    pub fn sorted_draws(&self) -> Vec<BloodDraw> {
        let mut draws = self.draws.clone();
        draws.sort_by_key(|d| d.drawn_at);
        draws
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Growth status of the latest interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthStatus {
    Normal,
    Slow,
    Fast,
    Declining,
    /// Latest two levels are identical
    Plateau,
}

impl GrowthStatus {
    pub fn translation_key(&self) -> &'static str {
        match self {
            GrowthStatus::Normal => "values.normal",
            GrowthStatus::Slow => "values.slow",
            GrowthStatus::Fast => "values.fast",
            GrowthStatus::Declining => "values.declining",
            GrowthStatus::Plateau => "values.plateau",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GrowthStatus::Normal => "Normal",
            GrowthStatus::Slow => "Slow",
            GrowthStatus::Fast => "Fast",
            GrowthStatus::Declining => "Declining",
            GrowthStatus::Plateau => "Plateau",
        }
    }
}

impl std::fmt::Display for GrowthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Heuristic multiples indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MultiplesIndicator {
    PossibleMultiples,
    TooEarly,
    SingletonLikely,
}

impl MultiplesIndicator {
    pub fn translation_key(&self) -> &'static str {
        match self {
            MultiplesIndicator::PossibleMultiples => "values.possibleMultiples",
            MultiplesIndicator::TooEarly => "values.tooEarly",
            MultiplesIndicator::SingletonLikely => "values.singletonLikely",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MultiplesIndicator::PossibleMultiples => "Possible multiples",
            MultiplesIndicator::TooEarly => "Too early to determine",
            MultiplesIndicator::SingletonLikely => "Singleton likely",
        }
    }
}

/// Classify the latest interval.
///
/// `previous_level` selects the threshold band; `doubling_time_hours` is
/// `None` for declining and plateaued levels.
pub fn classify(
    previous_level: f64,
    latest_level: f64,
    doubling_time_hours: Option<f64>,
    settings: &HcgSettings,
) -> GrowthStatus {
    if latest_level < previous_level {
        return GrowthStatus::Declining;
    }
    let Some(dt) = doubling_time_hours else {
        return GrowthStatus::Plateau;
    };
    let (slow, fast) = if previous_level < settings.low_band_max {
        (settings.low_band_slow_hours, settings.low_band_fast_hours)
    } else if previous_level < settings.mid_band_max {
        (settings.mid_band_slow_hours, settings.mid_band_fast_hours)
    } else {
        return GrowthStatus::Normal;
    };
    if dt > slow {
        GrowthStatus::Slow
    } else if dt < fast {
        GrowthStatus::Fast
    } else {
        GrowthStatus::Normal
    }
}

/// Multiples heuristic from the latest level and doubling time.
pub fn multiples_indicator(latest_level: f64, doubling_time_hours: Option<f64>, settings: &HcgSettings) -> MultiplesIndicator {
    let fast_doubling = doubling_time_hours
        .map(|dt| dt > 0.0 && dt < settings.multiples_max_hours)
        .unwrap_or(false);
    if latest_level > settings.multiples_min_level && fast_doubling {
        MultiplesIndicator::PossibleMultiples
    } else if latest_level <= settings.too_early_max_level {
        MultiplesIndicator::TooEarly
    } else {
        MultiplesIndicator::SingletonLikely
    }
}

/// Doubling time in hours, `None` unless the level rose.
pub fn doubling_time(hours: f64, from_level: f64, to_level: f64) -> Option<f64> {
    (hours > 0.0 && to_level > from_level)
        .then(|| hours * std::f64::consts::LN_2 / (to_level / from_level).ln())
}

/// Growth per 24 hours in percent.
pub fn daily_growth_pct(hours: f64, from_level: f64, to_level: f64) -> f64 {
    ((to_level / from_level).powf(24.0 / hours) - 1.0) * 100.0
}

// ============================================================================
// Analysis
// ============================================================================

/// Trend between two consecutive draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalTrend {
    pub from: BloodDraw,
    pub to: BloodDraw,
    pub hours: f64,
    pub percent_change: f64,
    pub doubling_time_hours: Option<f64>,
}

/// Results of the hCG analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HcgAnalysis {
    pub first: BloodDraw,
    pub previous: BloodDraw,
    pub latest: BloodDraw,
    /// Hours between the previous and latest draw
    pub elapsed_hours: f64,
    /// `None` when the level fell or held steady
    pub doubling_time_hours: Option<f64>,
    pub daily_growth_pct: f64,
    pub status: GrowthStatus,
    pub multiples: MultiplesIndicator,
    pub estimated_week: WeekBin,
    /// Calendar days between the first and latest draw
    pub days_between: i64,
    pub days_post_transfer: Option<i64>,
    pub intervals: Vec<IntervalTrend>,
    pub draws: Vec<BloodDraw>,
}

/// Analyze a set of draws.
///
/// # Returns
///
/// * `Ok(HcgAnalysis)` - Trend figures from the two most recent draws
/// * `Err(CalcError)` - Fewer than two usable draws, or zero time between the last two
pub fn calculate(input: &HcgInput, settings: &HcgSettings) -> CalcResult<HcgAnalysis> {
    input.validate(settings)?;
    let draws = input.sorted_draws();

    let first = draws[0];
    let previous = draws[draws.len() - 2];
    let latest = draws[draws.len() - 1];

    let elapsed_hours = hours_between(&previous, &latest);
    if elapsed_hours <= 0.0 {
        return Err(CalcError::division_guard(
            "hcg",
            "the two most recent draws share a timestamp",
        ));
    }

    let doubling_time_hours = doubling_time(elapsed_hours, previous.hcg_level, latest.hcg_level);
    let daily_growth_pct = daily_growth_pct(elapsed_hours, previous.hcg_level, latest.hcg_level);
    let status = classify(previous.hcg_level, latest.hcg_level, doubling_time_hours, settings);
    let multiples = multiples_indicator(latest.hcg_level, doubling_time_hours, settings);

    let intervals = draws
        .windows(2)
        .map(|pair| {
            let hours = hours_between(&pair[0], &pair[1]);
            IntervalTrend {
                from: pair[0],
                to: pair[1],
                hours,
                percent_change: (pair[1].hcg_level / pair[0].hcg_level - 1.0) * 100.0,
                doubling_time_hours: doubling_time(hours, pair[0].hcg_level, pair[1].hcg_level),
            }
        })
        .collect();

    let days_between = (latest.drawn_at.date() - first.drawn_at.date()).num_days();
    let days_post_transfer = input
        .transfer_date
        .map(|t| (latest.drawn_at.date() - t.date()).num_days());

    tracing::trace!(
        elapsed_hours,
        doubling_time = ?doubling_time_hours,
        daily_growth_pct,
        status = %status,
        "hcg trend computed"
    );

    Ok(HcgAnalysis {
        first,
        previous,
        latest,
        elapsed_hours,
        doubling_time_hours,
        daily_growth_pct,
        status,
        multiples,
        estimated_week: *estimate_week(latest.hcg_level),
        days_between,
        days_post_transfer,
        intervals,
        draws,
    })
}

fn hours_between(a: &BloodDraw, b: &BloodDraw) -> f64 {
    (b.drawn_at - a.drawn_at).num_seconds() as f64 / 3600.0
}

// ============================================================================
// Contract
// ============================================================================

/// Evaluate the contract input. Never fails; insufficient input yields an
/// invalid result.
pub fn evaluate(input: &CalculationInput, settings: &CalculatorSettings) -> CalculationResult {
    let outcome = calculate(&HcgInput::from_fields(input), &settings.hcg)
        .map(|analysis| present(&analysis, &Translations::new(&input.translations), input.locale));
    super::into_contract("hcg", outcome)
}

/// Render an analysis into the contract result.
pub fn present(analysis: &HcgAnalysis, t: &Translations<'_>, locale: Locale) -> CalculationResult {
    let unit = t.text("units.mIUml", "mIU/mL");
    let hours = t.text("units.hours", "hours");
    let days = t.text("units.days", "days");
    let level = |v: f64| format!("{} {}", format_number(v, 0, locale), unit);
    let draw_label = |d: &BloodDraw| format!("{} ({})", level(d.hcg_level), short_date(&d.drawn_at, t, locale));

    let mut b = ResultBuilder::new();

    match analysis.doubling_time_hours {
        Some(dt) => {
            b.field("doublingTime", dt, format!("{} {}", format_number(dt, 1, locale), hours));
        }
        None => {
            let na = if analysis.status == GrowthStatus::Declining {
                t.text("values.notApplicableDeclining", "N/A (Declining)")
            } else {
                t.text("values.notApplicable", "N/A")
            };
            b.label("doublingTime", na);
        }
    }

    b.field(
        "dailyGrowth",
        analysis.daily_growth_pct,
        format_signed_percent(analysis.daily_growth_pct, 1, locale),
    );
    b.label("status", t.text(analysis.status.translation_key(), analysis.status.display_name()));
    b.label(
        "multiples",
        t.text(analysis.multiples.translation_key(), analysis.multiples.display_name()),
    );
    b.label(
        "estimatedWeek",
        t.text(analysis.estimated_week.key, analysis.estimated_week.label),
    );

    let mut latest_display = level(analysis.latest.hcg_level);
    if let Some(dpt) = analysis.days_post_transfer {
        let mut vars = std::collections::BTreeMap::new();
        vars.insert("days".to_string(), format_count(dpt as f64, locale));
        let note = t.render("formats.daysPostTransfer", "{days} days post-transfer", &vars);
        latest_display = format!("{latest_display} ({note})");
        b.field("daysPostTransfer", dpt as f64, format_count(dpt as f64, locale));
    }
    b.field("latestLevel", analysis.latest.hcg_level, latest_display);
    b.field(
        "daysBetween",
        analysis.days_between as f64,
        format!("{} {}", format_count(analysis.days_between as f64, locale), days),
    );
    b.field("elapsedHours", analysis.elapsed_hours, format!("{} {}", format_number(analysis.elapsed_hours, 1, locale), hours));
    b.label("firstDraw", draw_label(&analysis.first));
    b.label("lastDraw", draw_label(&analysis.latest));
    b.field("drawCount", analysis.draws.len() as f64, format_count(analysis.draws.len() as f64, locale));

    for draw in &analysis.draws {
        b.chart_point(record([
            ("label", ResultValue::from(short_date(&draw.drawn_at, t, locale))),
            ("date", ResultValue::from(draw.drawn_at.format("%Y-%m-%d %H:%M").to_string())),
            ("hcgLevel", ResultValue::from(draw.hcg_level)),
        ]));
    }

    for interval in &analysis.intervals {
        let dt = match interval.doubling_time_hours {
            Some(dt) => ResultValue::from(dt),
            None => ResultValue::from(t.text("values.notApplicable", "N/A")),
        };
        b.table_row(record([
            ("from", ResultValue::from(short_date(&interval.from.drawn_at, t, locale))),
            ("to", ResultValue::from(short_date(&interval.to.drawn_at, t, locale))),
            ("hours", ResultValue::from(interval.hours)),
            ("percentChange", ResultValue::from(interval.percent_change)),
            ("doublingTime", dt),
        ]));
    }

    for range in &HCG_REFERENCE_RANGES {
        b.reference_row(record([
            ("weeks", ResultValue::from(range.weeks)),
            ("low", ResultValue::from(range.low)),
            ("high", ResultValue::from(range.high)),
            ("typicalDoubling", ResultValue::from(range.typical_doubling)),
        ]));
    }

    b.finish(t, DEFAULT_SUMMARY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputRecord, InputValue};

    fn draw(date: &str, level: f64) -> BloodDraw {
        BloodDraw::parse(date, level).unwrap()
    }

    fn pair(h1: f64, h2: f64) -> HcgInput {
        HcgInput {
            draws: vec![draw("2026-02-01", h1), draw("2026-02-03", h2)],
            transfer_date: None,
        }
    }

    fn draws_input(rows: &[(&str, f64)]) -> CalculationInput {
        let list: Vec<InputRecord> = rows
            .iter()
            .map(|(date, level)| {
                let mut r = InputRecord::new();
                r.insert("date".to_string(), InputValue::from(*date));
                r.insert("hcgLevel".to_string(), InputValue::from(*level));
                r
            })
            .collect();
        CalculationInput::new().with_value("draws", list)
    }

    #[test]
    fn test_reference_example() {
        let a = calculate(&pair(120.0, 280.0), &HcgSettings::default()).unwrap();
        assert!((a.elapsed_hours - 48.0).abs() < 1e-9);
        assert!((a.doubling_time_hours.unwrap() - 39.27).abs() < 0.01);
        assert_eq!(a.status, GrowthStatus::Normal);
        assert_eq!(a.days_between, 2);
    }

    #[test]
    fn test_doubling_round_trip() {
        for (h1, h2, hours) in [(50.0, 90.0, 48.0), (1500.0, 2100.0, 72.0), (8000.0, 8100.0, 24.0)] {
            let dt = doubling_time(hours, h1, h2).unwrap();
            let projected = h1 * 2f64.powf(hours / dt);
            assert!((projected - h2).abs() < 1e-6 * h2);
        }
    }

    #[test]
    fn test_declining_always_declining() {
        for (h1, h2) in [(500.0, 499.0), (50_000.0, 1_000.0), (10.0, 5.0)] {
            let a = calculate(&pair(h1, h2), &HcgSettings::default()).unwrap();
            assert_eq!(a.status, GrowthStatus::Declining);
            assert!(a.doubling_time_hours.is_none());
            assert!(a.daily_growth_pct < 0.0);
        }
    }

    #[test]
    fn test_equal_levels_plateau() {
        let a = calculate(&pair(300.0, 300.0), &HcgSettings::default()).unwrap();
        assert_eq!(a.status, GrowthStatus::Plateau);
        assert!(a.doubling_time_hours.is_none());
        assert!(a.daily_growth_pct.abs() < 1e-12);
    }

    #[test]
    fn test_band_thresholds() {
        let s = HcgSettings::default();
        assert_eq!(classify(100.0, 400.0, Some(80.0), &s), GrowthStatus::Slow);
        assert_eq!(classify(100.0, 400.0, Some(30.0), &s), GrowthStatus::Fast);
        assert_eq!(classify(2000.0, 4000.0, Some(80.0), &s), GrowthStatus::Normal);
        assert_eq!(classify(2000.0, 4000.0, Some(100.0), &s), GrowthStatus::Slow);
        assert_eq!(classify(2000.0, 4000.0, Some(40.0), &s), GrowthStatus::Fast);
        assert_eq!(classify(7000.0, 9000.0, Some(200.0), &s), GrowthStatus::Normal);
    }

    #[test]
    fn test_multiples_indicator() {
        let s = HcgSettings::default();
        assert_eq!(multiples_indicator(1500.0, Some(28.0), &s), MultiplesIndicator::PossibleMultiples);
        assert_eq!(multiples_indicator(40.0, Some(28.0), &s), MultiplesIndicator::TooEarly);
        assert_eq!(multiples_indicator(1500.0, Some(45.0), &s), MultiplesIndicator::SingletonLikely);
        assert_eq!(multiples_indicator(1500.0, None, &s), MultiplesIndicator::SingletonLikely);
    }

    #[test]
    fn test_week_bins() {
        assert_eq!(estimate_week(50.0).label, "~3 weeks");
        assert_eq!(estimate_week(51.0).label, "~4 weeks");
        assert_eq!(estimate_week(426.0).label, "~4 weeks");
        assert_eq!(estimate_week(300_000.0).label, "9+ weeks near peak");
    }

    #[test]
    fn test_uses_last_two_draws() {
        let input = HcgInput {
            draws: vec![
                draw("2026-02-05", 400.0),
                draw("2026-02-01", 50.0),
                draw("2026-02-03", 200.0),
            ],
            transfer_date: None,
        };
        let a = calculate(&input, &HcgSettings::default()).unwrap();
        assert_eq!(a.first.hcg_level, 50.0);
        assert_eq!(a.previous.hcg_level, 200.0);
        assert_eq!(a.latest.hcg_level, 400.0);
        // 200 -> 400 in 48 hours doubles in exactly 48 hours
        assert!((a.doubling_time_hours.unwrap() - 48.0).abs() < 1e-9);
        assert_eq!(a.intervals.len(), 2);
        assert_eq!(a.days_between, 4);
    }

    #[test]
    fn test_same_timestamp_is_guarded() {
        let input = HcgInput {
            draws: vec![draw("2026-02-01", 100.0), draw("2026-02-01", 150.0)],
            transfer_date: None,
        };
        let err = calculate(&input, &HcgSettings::default()).unwrap_err();
        assert_eq!(err.error_code(), "DIVISION_GUARD");
    }

    #[test]
    fn test_too_many_draws() {
        let draws = (1..=7).map(|d| draw(&format!("2026-02-{d:02}"), 100.0 * d as f64)).collect();
        let input = HcgInput { draws, transfer_date: None };
        assert!(calculate(&input, &HcgSettings::default()).is_err());
    }

    #[test]
    fn test_evaluate_contract() {
        let input = draws_input(&[("2026-02-01", 120.0), ("2026-02-03", 280.0)]);
        let result = evaluate(&input, &CalculatorSettings::default());
        assert!(result.is_valid);
        assert_eq!(result.display("doublingTime"), Some("39.3 hours"));
        assert_eq!(result.text("status"), Some("Normal"));
        assert_eq!(result.display("firstDraw"), Some("120 mIU/mL (Feb 1)"));
        assert!(result.summary.contains("39.3 hours"));
        let meta = result.metadata.unwrap();
        assert_eq!(meta.chart_data.len(), 2);
        assert_eq!(meta.table_data.len(), 1);
        assert_eq!(meta.reference_table.len(), 9);
    }

    #[test]
    fn test_evaluate_drops_incomplete_rows() {
        let mut input = draws_input(&[("2026-02-01", 120.0), ("2026-02-03", 280.0), ("not a date", 500.0)]);
        if let Some(InputValue::List(rows)) = input.values.get_mut("draws") {
            let mut missing_level = InputRecord::new();
            missing_level.insert("date".to_string(), InputValue::from("2026-02-05"));
            rows.push(missing_level);
        }
        let result = evaluate(&input, &CalculatorSettings::default());
        assert!(result.is_valid);
        assert_eq!(result.number("drawCount"), Some(2.0));
    }

    #[test]
    fn test_evaluate_declining_display() {
        let input = draws_input(&[("2026-02-01", 900.0), ("2026-02-03", 400.0)]);
        let result = evaluate(&input, &CalculatorSettings::default());
        assert_eq!(result.display("doublingTime"), Some("N/A (Declining)"));
        assert_eq!(result.text("status"), Some("Declining"));
    }

    #[test]
    fn test_transfer_date_appended() {
        let input = draws_input(&[("2026-02-01", 120.0), ("2026-02-03", 280.0)])
            .with_value("transferDate", "2026-01-22");
        let result = evaluate(&input, &CalculatorSettings::default());
        assert_eq!(result.number("daysPostTransfer"), Some(12.0));
        assert_eq!(result.display("latestLevel"), Some("280 mIU/mL (12 days post-transfer)"));
    }

    #[test]
    fn test_translated_labels_and_summary() {
        let input = draws_input(&[("2026-02-01", 120.0), ("2026-02-03", 280.0)])
            .with_translation("values.normal", "Normal (ES)")
            .with_translation("formats.summary", "Duplica cada {doublingTime}: {status}")
            .with_translation("units.hours", "horas")
            .with_locale(Locale::Es);
        let result = evaluate(&input, &CalculatorSettings::default());
        assert_eq!(result.summary, "Duplica cada 39,3 horas: Normal (ES)");
    }

    #[test]
    fn test_insufficient_input_is_invalid() {
        let settings = CalculatorSettings::default();
        assert!(!evaluate(&CalculationInput::new(), &settings).is_valid);
        let one = draws_input(&[("2026-02-01", 120.0)]);
        let result = evaluate(&one, &settings);
        assert!(!result.is_valid);
        assert!(result.values.is_empty());
        let zero = draws_input(&[("2026-02-01", 0.0), ("2026-02-03", 280.0)]);
        assert!(!evaluate(&zero, &settings).is_valid);
    }
}
