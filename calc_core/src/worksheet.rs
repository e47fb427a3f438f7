//! # Worksheets
//!
//! A `Worksheet` keeps calculator runs (input plus the result it produced)
//! so they can be reviewed or re-run later. Worksheets serialize to
//! `.rkn` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Worksheet
//! ├── meta: WorksheetMetadata (version, title, timestamps)
//! └── entries: HashMap<Uuid, WorksheetEntry> (saved runs)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::CalculatorKind;
//! use calc_core::input::CalculationInput;
//! use calc_core::settings::CalculatorSettings;
//! use calc_core::worksheet::Worksheet;
//!
//! let mut sheet = Worksheet::new("Bathroom remodel");
//! let input = CalculationInput::new()
//!     .with_value("length", 8.0)
//!     .with_value("width", 5.0)
//!     .with_value("tileSize", "12x24");
//! let id = sheet.record(CalculatorKind::Tile, "Floor", input, &CalculatorSettings::default());
//!
//! assert!(sheet.get_entry(&id).unwrap().result.is_valid);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::CalculatorKind;
use crate::input::CalculationInput;
use crate::result::CalculationResult;
use crate::settings::CalculatorSettings;

/// Current schema version for .rkn files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// File extension for saved worksheets
pub const WORKSHEET_EXTENSION: &str = "rkn";

/// Root worksheet container, serialized to `.rkn` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worksheet {
    pub meta: WorksheetMetadata,

    /// Saved runs, keyed by UUID
    pub entries: HashMap<Uuid, WorksheetEntry>,
}

impl Worksheet {
    /// Create an empty worksheet.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Worksheet {
            meta: WorksheetMetadata {
                version: SCHEMA_VERSION.to_string(),
                title: title.into(),
                created: now,
                modified: now,
            },
            entries: HashMap::new(),
        }
    }

    /// Add an entry. Returns the UUID assigned to it.
    pub fn add_entry(&mut self, entry: WorksheetEntry) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.insert(id, entry);
        self.touch();
        id
    }

    /// Run a calculator and save the run.
    pub fn record(
        &mut self,
        calculator: CalculatorKind,
        label: impl Into<String>,
        input: CalculationInput,
        settings: &CalculatorSettings,
    ) -> Uuid {
        let result = calculator.evaluate(&input, settings);
        self.add_entry(WorksheetEntry::new(calculator, label, input, result))
    }

    /// Remove an entry by UUID.
    pub fn remove_entry(&mut self, id: &Uuid) -> Option<WorksheetEntry> {
        let entry = self.entries.remove(id);
        if entry.is_some() {
            self.touch();
        }
        entry
    }

    pub fn get_entry(&self, id: &Uuid) -> Option<&WorksheetEntry> {
        self.entries.get(id)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Entries for one calculator, oldest first.
    pub fn entries_for(&self, calculator: CalculatorKind) -> Vec<(&Uuid, &WorksheetEntry)> {
        let mut found: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.calculator == calculator)
            .collect();
        found.sort_by_key(|(_, entry)| entry.saved_at);
        found
    }

    /// All entries, oldest first.
    pub fn entries_sorted(&self) -> Vec<(&Uuid, &WorksheetEntry)> {
        let mut all: Vec<_> = self.entries.iter().collect();
        all.sort_by_key(|(_, entry)| entry.saved_at);
        all
    }

    /// Recompute every entry from its saved input with `settings`.
    ///
    /// Returns how many entries changed validity.
    pub fn rerun_all(&mut self, settings: &CalculatorSettings) -> usize {
        let mut flipped = 0;
        for entry in self.entries.values_mut() {
            let result = entry.rerun(settings);
            if result.is_valid != entry.result.is_valid {
                flipped += 1;
            }
            entry.result = result;
        }
        self.touch();
        flipped
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

impl Default for Worksheet {
    fn default() -> Self {
        Worksheet::new("Untitled")
    }
}

/// Worksheet metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub title: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// One saved calculator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetEntry {
    pub calculator: CalculatorKind,
    pub label: String,
    pub input: CalculationInput,
    pub result: CalculationResult,
    pub saved_at: DateTime<Utc>,
}

impl WorksheetEntry {
    pub fn new(
        calculator: CalculatorKind,
        label: impl Into<String>,
        input: CalculationInput,
        result: CalculationResult,
    ) -> Self {
        WorksheetEntry {
            calculator,
            label: label.into(),
            input,
            result,
            saved_at: Utc::now(),
        }
    }

    /// Re-run the saved input, e.g. after settings changed.
    pub fn rerun(&self, settings: &CalculatorSettings) -> CalculationResult {
        self.calculator.evaluate(&self.input, settings)
    }
}
