//! # Inflation Projection
//!
//! Converts an amount of money between two points in time, either through the
//! historical CPI table or by compounding a fixed custom rate, and emits a
//! year-by-year series.
//!
//! ## Modes
//!
//! - **Historical**: `ratio = CPI[to] / CPI[from]`. Both years must be in the
//!   dataset and must differ. `from > to` converts backwards in time.
//! - **Custom rate**: `multiplier = (1 + rate/100)^years`, `years >= 1`.
//!
//! In both modes `adjusted = amount * ratio` and `purchasing_power = amount / ratio`,
//! so `adjusted / purchasing_power == ratio^2`.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::inflation::{calculate, InflationInput, InflationMode};
//! use calc_core::settings::InflationSettings;
//!
//! let input = InflationInput {
//!     amount: 1000.0,
//!     mode: InflationMode::CustomRate { rate_pct: 3.0, years: 20, start_year: 2026 },
//!     salary: None,
//!     currency: "USD".to_string(),
//! };
//! let p = calculate(&input, &InflationSettings::default()).unwrap();
//! assert!((p.adjusted_value - 1806.11).abs() < 0.01);
//! ```

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::datasets::{price_examples_for_year, US_CPI};
use crate::errors::{CalcError, CalcResult};
use crate::format::{format_count, format_currency, format_number, format_signed_percent, Locale};
use crate::i18n::Translations;
use crate::input::CalculationInput;
use crate::result::{record, CalculationResult, ResultBuilder, ResultValue};
use crate::settings::{CalculatorSettings, InflationSettings};

const DEFAULT_SUMMARY: &str =
    "{amount} in {fromYear} has the same buying power as {adjustedValue} in {toYear}. Cumulative inflation: {cumulativeInflation}.";

/// How the price change is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InflationMode {
    /// Look both years up in the CPI table
    Historical { from_year: i32, to_year: i32 },
    /// Compound a fixed annual rate for `years`, labelling the series from `start_year`
    CustomRate { rate_pct: f64, years: u32, start_year: i32 },
}

/// Optional salary comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryInput {
    /// Current annual salary
    pub salary: f64,
    /// Expected annual raise, percent
    pub growth_rate_pct: f64,
}

/// Input parameters for an inflation projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationInput {
    pub amount: f64,
    pub mode: InflationMode,
    pub salary: Option<SalaryInput>,
    /// ISO currency code, for display only
    pub currency: String,
}

impl InflationInput {
    /// Read the contract fields.
    ///
    /// `calculationType` is `"historical"` (default) or `"custom"`. Historical
    /// mode reads `fromYear`/`toYear`; custom mode reads `inflationRate`,
    /// `years` and optionally `startYear` (defaults to the current year).
    pub fn from_fields(input: &CalculationInput, settings: &InflationSettings) -> CalcResult<Self> {
        let fields = input.fields();
        let amount = fields.positive("amount")?;

        let mode = match fields.text("calculationType").as_deref() {
            None | Some("historical") => InflationMode::Historical {
                from_year: whole_number(fields.require("fromYear")?, "fromYear")?,
                to_year: whole_number(fields.require("toYear")?, "toYear")?,
            },
            Some("custom") => {
                let years = whole_number(fields.require("years")?, "years")?;
                if years <= 0 {
                    return Err(CalcError::division_guard("inflation", "projection needs at least one year"));
                }
                let start_year = match fields.number("startYear") {
                    Some(y) => whole_number(y, "startYear")?,
                    None => chrono::Local::now().year(),
                };
                InflationMode::CustomRate {
                    rate_pct: fields.require("inflationRate")?,
                    years: years as u32,
                    start_year,
                }
            }
            Some(other) => {
                return Err(CalcError::invalid_input(
                    "calculationType",
                    other,
                    "Expected 'historical' or 'custom'",
                ))
            }
        };

        let salary = match fields.non_negative("salary")? {
            Some(salary) if salary > 0.0 => Some(SalaryInput {
                salary,
                growth_rate_pct: fields.number("salaryGrowth").unwrap_or(0.0),
            }),
            _ => None,
        };

        Ok(InflationInput {
            amount,
            mode,
            salary,
            currency: fields
                .text("currency")
                .unwrap_or_else(|| settings.default_currency.clone()),
        })
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if !(self.amount > 0.0 && self.amount.is_finite()) {
            return Err(CalcError::invalid_input("amount", self.amount.to_string(), "Amount must be positive"));
        }
        match self.mode {
            InflationMode::Historical { from_year, to_year } => {
                for (field, year) in [("fromYear", from_year), ("toYear", to_year)] {
                    if !US_CPI.contains(year) {
                        return Err(CalcError::out_of_range(US_CPI.name, format!("{field}={year}")));
                    }
                }
                if from_year == to_year {
                    return Err(CalcError::invalid_input(
                        "toYear",
                        to_year.to_string(),
                        "Start and end year must differ",
                    ));
                }
            }
            InflationMode::CustomRate { rate_pct, years, .. } => {
                if years == 0 {
                    return Err(CalcError::division_guard("inflation", "projection needs at least one year"));
                }
                if !(rate_pct > -100.0 && rate_pct.is_finite()) {
                    return Err(CalcError::invalid_input(
                        "inflationRate",
                        rate_pct.to_string(),
                        "Rate must be greater than -100%",
                    ));
                }
            }
        }
        if let Some(s) = &self.salary {
            if !(s.growth_rate_pct > -100.0 && s.growth_rate_pct.is_finite()) {
                return Err(CalcError::invalid_input(
                    "salaryGrowth",
                    s.growth_rate_pct.to_string(),
                    "Growth rate must be greater than -100%",
                ));
            }
        }
        Ok(())
    }

    /// Calendar years the projection spans.
    pub fn years_between(&self) -> u32 {
        match self.mode {
            InflationMode::Historical { from_year, to_year } => from_year.abs_diff(to_year),
            InflationMode::CustomRate { years, .. } => years,
        }
    }
}

fn whole_number(value: f64, field: &str) -> CalcResult<i32> {
    if value.fract() != 0.0 || value.abs() > 10_000.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Must be a whole number"));
    }
    Ok(value as i32)
}

/// One row of the year-by-year series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesRow {
    pub year: i32,
    /// Amount expressed in this year's money
    pub value: f64,
    /// Price change during this year; `None` for the base year
    pub annual_rate_pct: Option<f64>,
    /// Price change since the base year
    pub cumulative_pct: f64,
}

/// A single year's rate, for extremes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearRate {
    pub year: i32,
    pub rate_pct: f64,
}

/// Salary comparison results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalaryComparison {
    pub current_salary: f64,
    /// Salary needed just to keep pace with prices
    pub salary_needed: f64,
    /// Salary after compounding the expected raises
    pub future_salary: f64,
    /// Positive: real gain. Negative: purchasing power lost despite raises.
    pub real_change_pct: f64,
}

/// Results of an inflation projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InflationProjection {
    pub amount: f64,
    pub start_year: i32,
    pub end_year: i32,
    pub years_between: u32,
    /// Price ratio end/start (the custom multiplier in custom mode)
    pub ratio: f64,
    pub adjusted_value: f64,
    pub purchasing_power: f64,
    pub cumulative_inflation_pct: f64,
    /// Geometric mean annual rate
    pub avg_annual_rate_pct: f64,
    /// Rule-of-72 doubling estimate; `None` when prices are not rising
    pub years_to_double: Option<f64>,
    pub highest: Option<YearRate>,
    pub lowest: Option<YearRate>,
    pub deflation_years: u32,
    pub series: Vec<SeriesRow>,
    pub salary: Option<SalaryComparison>,
    pub historical: bool,
}

/// Run the projection.
///
/// # Returns
///
/// * `Ok(InflationProjection)` - Converted amounts and the yearly series
/// * `Err(CalcError)` - Non-positive amount, unknown or identical years, zero-year projection
pub fn calculate(input: &InflationInput, settings: &InflationSettings) -> CalcResult<InflationProjection> {
    input.validate()?;
    let years_between = input.years_between();

    let (start_year, end_year, ratio, avg_annual_rate_pct, series) = match input.mode {
        InflationMode::Historical { from_year, to_year } => {
            let cpi_from = lookup(from_year)?;
            let cpi_to = lookup(to_year)?;
            let ratio = cpi_to / cpi_from;

            // Average over the chronological span so a backwards conversion
            // still reports the inflation that happened in between.
            let (early, late) = (from_year.min(to_year), from_year.max(to_year));
            let chronological = lookup(late)? / lookup(early)?;
            let avg = (chronological.powf(1.0 / years_between as f64) - 1.0) * 100.0;

            let step: i32 = if to_year > from_year { 1 } else { -1 };
            let mut series = Vec::with_capacity(years_between as usize + 1);
            let mut year = from_year;
            loop {
                let cpi = lookup(year)?;
                series.push(SeriesRow {
                    year,
                    value: input.amount * cpi / cpi_from,
                    annual_rate_pct: if year > early { US_CPI.annual_rate(year) } else { None },
                    cumulative_pct: (cpi / cpi_from - 1.0) * 100.0,
                });
                if year == to_year {
                    break;
                }
                year += step;
            }
            (from_year, to_year, ratio, avg, series)
        }
        InflationMode::CustomRate { rate_pct, years, start_year } => {
            let growth = 1.0 + rate_pct / 100.0;
            let series = (0..=years)
                .map(|i| {
                    let factor = growth.powi(i as i32);
                    SeriesRow {
                        year: start_year + i as i32,
                        value: input.amount * factor,
                        annual_rate_pct: (i > 0).then_some(rate_pct),
                        cumulative_pct: (factor - 1.0) * 100.0,
                    }
                })
                .collect();
            (start_year, start_year + years as i32, growth.powi(years as i32), rate_pct, series)
        }
    };

    let rates: Vec<YearRate> = chronological_rates(&series);
    let highest = rates.iter().copied().max_by(|a, b| a.rate_pct.total_cmp(&b.rate_pct));
    let lowest = rates.iter().copied().min_by(|a, b| a.rate_pct.total_cmp(&b.rate_pct));
    let deflation_years = rates.iter().filter(|r| r.rate_pct < 0.0).count() as u32;

    let years_to_double = (avg_annual_rate_pct > 0.0).then(|| settings.rule_of_72 / avg_annual_rate_pct);

    let salary = input.salary.map(|s| {
        let salary_needed = s.salary * ratio;
        let future_salary = s.salary * (1.0 + s.growth_rate_pct / 100.0).powi(years_between as i32);
        SalaryComparison {
            current_salary: s.salary,
            salary_needed,
            future_salary,
            real_change_pct: (future_salary / salary_needed - 1.0) * 100.0,
        }
    });

    let projection = InflationProjection {
        amount: input.amount,
        start_year,
        end_year,
        years_between,
        ratio,
        adjusted_value: input.amount * ratio,
        purchasing_power: input.amount / ratio,
        cumulative_inflation_pct: (ratio - 1.0) * 100.0,
        avg_annual_rate_pct,
        years_to_double,
        highest,
        lowest,
        deflation_years,
        series,
        salary,
        historical: matches!(input.mode, InflationMode::Historical { .. }),
    };

    tracing::trace!(
        ratio = projection.ratio,
        adjusted = projection.adjusted_value,
        avg_rate = projection.avg_annual_rate_pct,
        "inflation projection computed"
    );
    Ok(projection)
}

fn lookup(year: i32) -> CalcResult<f64> {
    US_CPI
        .index(year)
        .ok_or_else(|| CalcError::out_of_range(US_CPI.name, year.to_string()))
}

fn chronological_rates(series: &[SeriesRow]) -> Vec<YearRate> {
    let mut rates: Vec<YearRate> = series
        .iter()
        .filter_map(|row| row.annual_rate_pct.map(|rate_pct| YearRate { year: row.year, rate_pct }))
        .collect();
    rates.sort_by_key(|r| r.year);
    rates
}

// ============================================================================
// Contract
// ============================================================================

/// Evaluate the contract input. Never fails.
pub fn evaluate(input: &CalculationInput, settings: &CalculatorSettings) -> CalculationResult {
    let outcome = InflationInput::from_fields(input, &settings.inflation).and_then(|typed| {
        calculate(&typed, &settings.inflation)
            .map(|p| present(&p, &typed.currency, &Translations::new(&input.translations), input.locale))
    });
    super::into_contract("inflation", outcome)
}

/// Render a projection into the contract result.
pub fn present(p: &InflationProjection, currency: &str, t: &Translations<'_>, locale: Locale) -> CalculationResult {
    let money = |v: f64| format_currency(v, currency, locale);
    let pct = |v: f64| format_signed_percent(v, 2, locale);
    let na = t.text("values.notApplicable", "N/A");
    let years_word = t.text("units.years", "years");
    let year_rate = |r: &YearRate| format!("{} ({})", r.year, pct(r.rate_pct));

    let mut b = ResultBuilder::new();
    b.field("amount", p.amount, money(p.amount));
    b.field("fromYear", p.start_year, p.start_year.to_string());
    b.field("toYear", p.end_year, p.end_year.to_string());
    b.field("yearsBetween", p.years_between, format_count(p.years_between as f64, locale));
    b.field("ratio", p.ratio, format_number(p.ratio, 4, locale));
    b.field("adjustedValue", p.adjusted_value, money(p.adjusted_value));
    b.field("purchasingPower", p.purchasing_power, money(p.purchasing_power));
    b.field("cumulativeInflation", p.cumulative_inflation_pct, pct(p.cumulative_inflation_pct));
    b.field("avgAnnualRate", p.avg_annual_rate_pct, pct(p.avg_annual_rate_pct));
    match p.years_to_double {
        Some(y) => b.field("yearsToDouble", y, format!("{} {}", format_number(y, 1, locale), years_word)),
        None => b.label("yearsToDouble", na),
    };
    match &p.highest {
        Some(r) => b.field("highestYear", r.year, year_rate(r)),
        None => b.label("highestYear", na),
    };
    match &p.lowest {
        Some(r) => b.field("lowestYear", r.year, year_rate(r)),
        None => b.label("lowestYear", na),
    };
    b.field("deflationYears", p.deflation_years, format_count(p.deflation_years as f64, locale));

    if let Some(s) = &p.salary {
        b.field("currentSalary", s.current_salary, money(s.current_salary));
        b.field("salaryNeeded", s.salary_needed, money(s.salary_needed));
        b.field("futureSalary", s.future_salary, money(s.future_salary));
        b.field("realSalaryChange", s.real_change_pct, pct(s.real_change_pct));
        let verdict = if s.real_change_pct >= 0.0 {
            t.text("values.realGain", "Real gain")
        } else {
            t.text("values.realLoss", "Real purchasing-power loss")
        };
        b.label("salaryVerdict", verdict);
    }

    if p.historical {
        b.label("dataRange", format!("{} {}-{}", US_CPI.name, US_CPI.first_year(), US_CPI.last_year()));
    }

    for row in &p.series {
        let rate = row.annual_rate_pct.map(ResultValue::from).unwrap_or_else(|| ResultValue::from(na));
        b.chart_point(record([
            ("year", ResultValue::from(row.year)),
            ("value", ResultValue::from(row.value)),
        ]));
        b.table_row(record([
            ("year", ResultValue::from(row.year)),
            ("value", ResultValue::from(row.value)),
            ("formattedValue", ResultValue::from(money(row.value))),
            ("annualRate", rate),
            ("cumulative", ResultValue::from(row.cumulative_pct)),
        ]));
    }

    for year in [p.start_year, p.end_year] {
        if let Some(prices) = price_examples_for_year(year) {
            b.reference_row(record([
                ("year", ResultValue::from(prices.year)),
                ("gallonOfGas", ResultValue::from(prices.gallon_of_gas)),
                ("loafOfBread", ResultValue::from(prices.loaf_of_bread)),
                ("movieTicket", ResultValue::from(prices.movie_ticket)),
                ("newCar", ResultValue::from(prices.new_car)),
                ("medianHome", ResultValue::from(prices.median_home)),
            ]));
        }
    }

    b.finish(t, DEFAULT_SUMMARY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn historical(amount: f64, from_year: i32, to_year: i32) -> InflationInput {
        InflationInput {
            amount,
            mode: InflationMode::Historical { from_year, to_year },
            salary: None,
            currency: "USD".to_string(),
        }
    }

    fn custom(amount: f64, rate_pct: f64, years: u32) -> InflationInput {
        InflationInput {
            amount,
            mode: InflationMode::CustomRate { rate_pct, years, start_year: 2026 },
            salary: None,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_historical_reference_example() {
        let p = calculate(&historical(100.0, 1990, 2025), &InflationSettings::default()).unwrap();
        assert!((p.ratio - 320.0 / 130.7).abs() < 1e-12);
        assert!((p.adjusted_value - 244.84).abs() < 0.01);
        assert!((p.cumulative_inflation_pct - 144.8).abs() < 0.1);
        assert_eq!(p.years_between, 35);
        assert_eq!(p.series.len(), 36);
        assert_eq!(p.series[0].year, 1990);
        assert_eq!(p.series[35].year, 2025);
        assert!(p.series[0].annual_rate_pct.is_none());
        // 2009 is the only deflation year in 1990-2025
        assert_eq!(p.deflation_years, 1);
        assert_eq!(p.lowest.unwrap().year, 2009);
        assert_eq!(p.highest.unwrap().year, 2022);
    }

    #[test]
    fn test_adjusted_and_purchasing_power_consistency() {
        for (from, to) in [(1913, 2025), (1950, 1975), (2025, 1980), (1929, 1933)] {
            let amount = 250.0;
            let p = calculate(&historical(amount, from, to), &InflationSettings::default()).unwrap();
            let ratio_sq = p.ratio * p.ratio;
            assert!((p.adjusted_value / p.purchasing_power - ratio_sq).abs() < 1e-9 * ratio_sq);
            assert!((p.purchasing_power - amount * amount / p.adjusted_value).abs() < 1e-9);
        }
    }

    #[test]
    fn test_geometric_average_rate() {
        let p = calculate(&historical(100.0, 1990, 2025), &InflationSettings::default()).unwrap();
        let expected = ((320.0f64 / 130.7).powf(1.0 / 35.0) - 1.0) * 100.0;
        assert!((p.avg_annual_rate_pct - expected).abs() < 1e-9);
        let ytd = p.years_to_double.unwrap();
        assert!((ytd - 72.0 / expected).abs() < 1e-9);
    }

    #[test]
    fn test_backwards_conversion() {
        let p = calculate(&historical(100.0, 2025, 1990), &InflationSettings::default()).unwrap();
        assert!(p.ratio < 1.0);
        assert!((p.adjusted_value - 40.84).abs() < 0.01);
        assert_eq!(p.series.first().unwrap().year, 2025);
        assert_eq!(p.series.last().unwrap().year, 1990);
        assert!(p.avg_annual_rate_pct > 0.0);
    }

    #[test]
    fn test_deflation_span() {
        let p = calculate(&historical(100.0, 1929, 1933), &InflationSettings::default()).unwrap();
        assert!(p.avg_annual_rate_pct < 0.0);
        assert!(p.years_to_double.is_none());
        assert!(p.deflation_years >= 3);
    }

    #[test]
    fn test_same_or_unknown_year_invalid() {
        let s = InflationSettings::default();
        assert!(calculate(&historical(100.0, 1990, 1990), &s).is_err());
        let err = calculate(&historical(100.0, 1900, 1990), &s).unwrap_err();
        assert_eq!(err.error_code(), "OUT_OF_RANGE");
        assert!(calculate(&historical(0.0, 1990, 2000), &s).is_err());
    }

    #[test]
    fn test_custom_rate_reference_example() {
        let p = calculate(&custom(1000.0, 3.0, 20), &InflationSettings::default()).unwrap();
        assert!((p.ratio - 1.8061).abs() < 1e-4);
        assert!((p.adjusted_value - 1806.11).abs() < 0.01);
        assert_eq!(p.avg_annual_rate_pct, 3.0);
        assert_eq!(p.series.len(), 21);
        assert_eq!(p.series[0].year, 2026);
        assert_eq!(p.series[20].year, 2046);
        assert!((p.series[20].value - p.adjusted_value).abs() < 1e-9);
    }

    #[test]
    fn test_custom_rate_exact_for_all_years() {
        for years in 1..=40 {
            let p = calculate(&custom(500.0, 2.5, years), &InflationSettings::default()).unwrap();
            let expected = 500.0 * 1.025f64.powi(years as i32);
            assert!((p.adjusted_value - expected).abs() < 1e-9 * expected);
        }
    }

    #[test]
    fn test_zero_years_rejected() {
        let err = calculate(&custom(1000.0, 3.0, 0), &InflationSettings::default()).unwrap_err();
        assert_eq!(err.error_code(), "DIVISION_GUARD");
    }

    #[test]
    fn test_salary_comparison() {
        let mut input = custom(1000.0, 3.0, 10);
        input.salary = Some(SalaryInput { salary: 50_000.0, growth_rate_pct: 2.0 });
        let p = calculate(&input, &InflationSettings::default()).unwrap();
        let s = p.salary.unwrap();
        assert!((s.salary_needed - 50_000.0 * 1.03f64.powi(10)).abs() < 1e-6);
        assert!((s.future_salary - 50_000.0 * 1.02f64.powi(10)).abs() < 1e-6);
        assert!(s.real_change_pct < 0.0);
    }

    #[test]
    fn test_evaluate_historical_contract() {
        let input = CalculationInput::new()
            .with_value("amount", 100.0)
            .with_value("fromYear", 1990)
            .with_value("toYear", "2025");
        let result = evaluate(&input, &CalculatorSettings::default());
        assert!(result.is_valid);
        assert_eq!(result.display("adjustedValue"), Some("$244.84"));
        assert_eq!(result.display("cumulativeInflation"), Some("+144.84%"));
        assert!(result.text("dataRange").is_some_and(|r| r.ends_with(&US_CPI.last_year().to_string())));
        assert_eq!(
            result.summary,
            "$100.00 in 1990 has the same buying power as $244.84 in 2025. Cumulative inflation: +144.84%."
        );
        let meta = result.metadata.unwrap();
        assert_eq!(meta.table_data.len(), 36);
        assert_eq!(meta.reference_table.len(), 2);
    }

    #[test]
    fn test_evaluate_custom_contract() {
        let input = CalculationInput::new()
            .with_value("calculationType", "custom")
            .with_value("amount", 1000.0)
            .with_value("inflationRate", 3.0)
            .with_value("years", 20)
            .with_value("startYear", 2026)
            .with_value("salary", 60_000.0)
            .with_value("salaryGrowth", 4.0)
            .with_value("currency", "EUR")
            .with_locale(Locale::De);
        let result = evaluate(&input, &CalculatorSettings::default());
        assert!(result.is_valid);
        assert_eq!(result.display("adjustedValue"), Some("1.806,11 €"));
        assert_eq!(result.display("avgAnnualRate"), Some("+3,00%"));
        assert_eq!(result.text("salaryVerdict"), Some("Real gain"));
    }

    #[test]
    fn test_evaluate_rejects_bad_input() {
        let settings = CalculatorSettings::default();
        let base = CalculationInput::new().with_value("amount", 100.0);
        assert!(!evaluate(&base, &settings).is_valid);
        let same = base.clone().with_value("fromYear", 2000).with_value("toYear", 2000);
        assert!(!evaluate(&same, &settings).is_valid);
        let zero_years = base
            .clone()
            .with_value("calculationType", "custom")
            .with_value("inflationRate", 3.0)
            .with_value("years", 0);
        let result = evaluate(&zero_years, &settings);
        assert!(!result.is_valid);
        assert!(result.formatted.is_empty());
    }
}
