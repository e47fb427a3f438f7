//! # Reference Datasets
//!
//! Fixed, versioned lookup tables read by the calculators. They are built once
//! on first use and never mutated, so concurrent calculations share them
//! without locking.
//!
//! - [`cpi`] - US CPI-U annual averages, 1913 onward
//! - [`prices`] - Real-world price examples by decade

pub mod cpi;
pub mod prices;

pub use cpi::{CpiDataset, US_CPI};
pub use prices::{price_examples_for_year, PriceExample};
