//! US Consumer Price Index for All Urban Consumers (CPI-U), annual averages,
//! 1982-84 = 100. Source: U.S. Bureau of Labor Statistics. The final year is
//! a provisional estimate.
//!
//! ```rust
//! use calc_core::datasets::US_CPI;
//!
//! assert_eq!(US_CPI.index(1990), Some(130.7));
//! assert_eq!(US_CPI.first_year(), 1913);
//! assert!(US_CPI.index(1850).is_none());
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::Serialize;

/// Dataset revision, bumped whenever the table changes.
pub const CPI_DATASET_VERSION: &str = "bls-cpi-u-2025.1";

const US_CPI_U: &[(i32, f64)] = &[
    (1913, 9.9), (1914, 10.0), (1915, 10.1), (1916, 10.9), (1917, 12.8),
    (1918, 15.1), (1919, 17.3), (1920, 20.0), (1921, 17.9), (1922, 16.8),
    (1923, 17.1), (1924, 17.1), (1925, 17.5), (1926, 17.7), (1927, 17.4),
    (1928, 17.1), (1929, 17.1), (1930, 16.7), (1931, 15.2), (1932, 13.7),
    (1933, 13.0), (1934, 13.4), (1935, 13.7), (1936, 13.9), (1937, 14.4),
    (1938, 14.1), (1939, 13.9), (1940, 14.0), (1941, 14.7), (1942, 16.3),
    (1943, 17.3), (1944, 17.6), (1945, 18.0), (1946, 19.5), (1947, 22.3),
    (1948, 24.1), (1949, 23.8), (1950, 24.1), (1951, 26.0), (1952, 26.5),
    (1953, 26.7), (1954, 26.9), (1955, 26.8), (1956, 27.2), (1957, 28.1),
    (1958, 28.9), (1959, 29.1), (1960, 29.6), (1961, 29.9), (1962, 30.2),
    (1963, 30.6), (1964, 31.0), (1965, 31.5), (1966, 32.4), (1967, 33.4),
    (1968, 34.8), (1969, 36.7), (1970, 38.8), (1971, 40.5), (1972, 41.8),
    (1973, 44.4), (1974, 49.3), (1975, 53.8), (1976, 56.9), (1977, 60.6),
    (1978, 65.2), (1979, 72.6), (1980, 82.4), (1981, 90.9), (1982, 96.5),
    (1983, 99.6), (1984, 103.9), (1985, 107.6), (1986, 109.6), (1987, 113.6),
    (1988, 118.3), (1989, 124.0), (1990, 130.7), (1991, 136.2), (1992, 140.3),
    (1993, 144.5), (1994, 148.2), (1995, 152.4), (1996, 156.9), (1997, 160.5),
    (1998, 163.0), (1999, 166.6), (2000, 172.2), (2001, 177.1), (2002, 179.9),
    (2003, 184.0), (2004, 188.9), (2005, 195.3), (2006, 201.6), (2007, 207.3),
    (2008, 215.3), (2009, 214.5), (2010, 218.1), (2011, 224.9), (2012, 229.6),
    (2013, 233.0), (2014, 236.7), (2015, 237.0), (2016, 240.0), (2017, 245.1),
    (2018, 251.1), (2019, 255.7), (2020, 258.8), (2021, 271.0), (2022, 292.7),
    (2023, 304.7), (2024, 313.7), (2025, 320.0),
];

/// Immutable year -> index table.
#[derive(Debug, Clone, Serialize)]
pub struct CpiDataset {
    pub name: &'static str,
    pub version: &'static str,
    values: BTreeMap<i32, f64>,
}

impl CpiDataset {
    fn from_rows(name: &'static str, version: &'static str, rows: &[(i32, f64)]) -> Self {
        CpiDataset {
            name,
            version,
            values: rows.iter().copied().collect(),
        }
    }

    /// Index value for a calendar year.
    pub fn index(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied()
    }

    pub fn contains(&self, year: i32) -> bool {
        self.values.contains_key(&year)
    }

    pub fn first_year(&self) -> i32 {
        self.values.keys().next().copied().unwrap_or_default()
    }

    pub fn last_year(&self) -> i32 {
        self.values.keys().next_back().copied().unwrap_or_default()
    }

    /// Year-over-year percentage change ending in `year`.
    ///
    /// `None` when either year is missing from the table.
    pub fn annual_rate(&self, year: i32) -> Option<f64> {
        let prev = self.index(year - 1)?;
        let cur = self.index(year)?;
        Some((cur - prev) / prev * 100.0)
    }

    /// All `(year, index)` rows in ascending year order.
    pub fn rows(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.values.iter().map(|(y, v)| (*y, *v))
    }
}

/// The US CPI-U dataset.
pub static US_CPI: Lazy<CpiDataset> =
    Lazy::new(|| CpiDataset::from_rows("US CPI-U", CPI_DATASET_VERSION, US_CPI_U));
