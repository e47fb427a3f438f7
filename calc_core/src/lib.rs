//! # calc_core - Reckon Calculation Engine
//!
//! `calc_core` holds the calculators behind Reckon: hCG doubling time,
//! inflation, roofing and tile estimates. All inputs and outputs are
//! JSON-serializable and every calculator answers through the same contract.
//!
//! ## Design
//!
//! - **Stateless**: pure functions from input to result
//! - **One contract**: [`CalculationInput`] in, [`CalculationResult`] out
//! - **Typed core**: each calculator also exposes a typed `calculate` that
//!   returns a structured [`CalcError`]
//! - **Caller-owned text**: labels and the summary come from the caller's
//!   translation bundle, with English defaults
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::{evaluate, CalculationInput, CalculatorKind, CalculatorSettings};
//!
//! let input = CalculationInput::new()
//!     .with_value("amount", 100.0)
//!     .with_value("fromYear", 1990)
//!     .with_value("toYear", 2025);
//!
//! let result = evaluate(CalculatorKind::Inflation, &input, &CalculatorSettings::default());
//! assert!(result.is_valid);
//! assert_eq!(result.display("adjustedValue"), Some("$244.84"));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The four calculators and [`CalculatorKind`] dispatch
//! - [`input`] / [`result`] - The shared contract records
//! - [`units`] - Unit newtypes and the length normalizer
//! - [`format`] / [`i18n`] - Locale-aware formatting and summary templates
//! - [`datasets`] - CPI index and historical price examples
//! - [`settings`] - Overridable rules of thumb
//! - [`worksheet`] / [`file_io`] - Saved runs with atomic saves and locking

pub mod calculations;
pub mod datasets;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod format;
pub mod i18n;
pub mod input;
pub mod result;
pub mod settings;
pub mod units;
pub mod worksheet;

pub use calculations::{evaluate, CalculatorKind};
pub use errors::{CalcError, CalcResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_worksheet, save_worksheet, FileLock};
pub use format::Locale;
pub use input::{CalculationInput, InputValue};
pub use result::{CalculationResult, ResultValue};
pub use settings::CalculatorSettings;
pub use worksheet::{Worksheet, WorksheetEntry};
