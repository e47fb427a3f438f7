//! Typical US retail prices by decade, shown next to an inflation result to
//! make the index ratio concrete. Nominal dollars.

use serde::Serialize;

/// Prices for one reference year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceExample {
    pub year: i32,
    pub gallon_of_gas: f64,
    pub loaf_of_bread: f64,
    pub movie_ticket: f64,
    pub new_car: f64,
    pub median_home: f64,
}

const PRICE_EXAMPLES: &[PriceExample] = &[
    PriceExample { year: 1920, gallon_of_gas: 0.30, loaf_of_bread: 0.12, movie_ticket: 0.15, new_car: 525.0, median_home: 6_300.0 },
    PriceExample { year: 1930, gallon_of_gas: 0.10, loaf_of_bread: 0.09, movie_ticket: 0.25, new_car: 640.0, median_home: 7_150.0 },
    PriceExample { year: 1940, gallon_of_gas: 0.11, loaf_of_bread: 0.08, movie_ticket: 0.24, new_car: 850.0, median_home: 2_938.0 },
    PriceExample { year: 1950, gallon_of_gas: 0.27, loaf_of_bread: 0.14, movie_ticket: 0.46, new_car: 1_510.0, median_home: 7_354.0 },
    PriceExample { year: 1960, gallon_of_gas: 0.31, loaf_of_bread: 0.20, movie_ticket: 0.69, new_car: 2_600.0, median_home: 11_900.0 },
    PriceExample { year: 1970, gallon_of_gas: 0.36, loaf_of_bread: 0.25, movie_ticket: 1.55, new_car: 3_450.0, median_home: 23_000.0 },
    PriceExample { year: 1980, gallon_of_gas: 1.19, loaf_of_bread: 0.50, movie_ticket: 2.69, new_car: 7_200.0, median_home: 64_600.0 },
    PriceExample { year: 1990, gallon_of_gas: 1.16, loaf_of_bread: 0.70, movie_ticket: 4.22, new_car: 16_000.0, median_home: 122_900.0 },
    PriceExample { year: 2000, gallon_of_gas: 1.51, loaf_of_bread: 0.99, movie_ticket: 5.39, new_car: 24_750.0, median_home: 169_000.0 },
    PriceExample { year: 2010, gallon_of_gas: 2.78, loaf_of_bread: 1.37, movie_ticket: 7.89, new_car: 29_217.0, median_home: 221_800.0 },
    PriceExample { year: 2020, gallon_of_gas: 2.17, loaf_of_bread: 1.54, movie_ticket: 9.16, new_car: 40_000.0, median_home: 336_900.0 },
];

/// The price row at or before `year`, or `None` for years before the table.
pub fn price_examples_for_year(year: i32) -> Option<&'static PriceExample> {
    PRICE_EXAMPLES.iter().rev().find(|p| p.year <= year)
}
