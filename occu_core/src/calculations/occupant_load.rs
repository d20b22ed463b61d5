//! Occupant load calculation
//!
//! ```text
//! load = ceil(area / factor)
//! ```
//!
//! Partial occupants always round up. Malformed or non-positive areas give
//! zero occupants and unknown types resolve to the table's default type;
//! nothing in this module returns an error.
//!
//! # Example
//!
//! ```rust
//! use occu_core::calculations::occupant_load::{aggregate, compute_load, Row};
//! use occu_core::factors::{CodeSetId, FactorTable};
//!
//! let table = FactorTable::for_code_set(CodeSetId::Ibc2024);
//! assert_eq!(compute_load("6", "Retail", &table), 3);
//!
//! let rows = vec![
//!     Row::new(1, "101", "Shop", "6", "Retail"),
//!     Row::new(2, "102", "Cafe", "4.2", "Restaurant"),
//! ];
//! let result = aggregate(&rows, &table);
//! assert_eq!(result.totals.grand_total, 6);
//! assert_eq!(result.totals.get("Restaurant"), Some(3));
//! ```

use serde::{Deserialize, Serialize};

use crate::factors::FactorTable;

/// Relative tolerance for treating a quotient as an exact integer.
///
/// Decimal areas and factors are not exact in binary floating point:
/// 4.2 / 1.4 evaluates to 3.0000000000000004, which must count as 3.
const INTEGER_SNAP_TOLERANCE: f64 = 1e-9;

/// One space/room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Identifier, unique within a project
    pub id: u32,
    /// Room number as entered (e.g. "101", "B-2")
    pub number: String,
    /// Display name
    pub name: String,
    /// Area in m², kept as entered; may be blank or malformed
    pub area: String,
    /// Occupancy type label
    pub occupancy_type: String,
    /// Derived occupant count, refreshed by [`aggregate`]
    #[serde(default)]
    pub occupant_load: u64,
}

impl Row {
    /// Create a row with a zero load; call [`aggregate`] to fill it in.
    pub fn new(
        id: u32,
        number: impl Into<String>,
        name: impl Into<String>,
        area: impl Into<String>,
        occupancy_type: impl Into<String>,
    ) -> Self {
        Row {
            id,
            number: number.into(),
            name: name.into(),
            area: area.into(),
            occupancy_type: occupancy_type.into(),
            occupant_load: 0,
        }
    }

    /// Coerce the type against `table` and recompute the load in place.
    pub fn refresh(&mut self, table: &FactorTable) {
        self.occupancy_type = table.normalize_type(&self.occupancy_type);
        self.occupant_load = compute_load(&self.area, &self.occupancy_type, table);
    }
}

/// Occupant total for one occupancy type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotal {
    pub occupancy_type: String,
    pub occupant_load: u64,
}

/// Per-type totals (first-seen order) plus the grand total.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub by_type: Vec<TypeTotal>,
    pub grand_total: u64,
}

impl Totals {
    /// Total for one type, `None` if no row carries it
    pub fn get(&self, occupancy_type: &str) -> Option<u64> {
        self.by_type
            .iter()
            .find(|t| t.occupancy_type == occupancy_type)
            .map(|t| t.occupant_load)
    }

    fn add(&mut self, occupancy_type: &str, load: u64) {
        match self.by_type.iter_mut().find(|t| t.occupancy_type == occupancy_type) {
            Some(total) => total.occupant_load = total.occupant_load.saturating_add(load),
            None => self.by_type.push(TypeTotal {
                occupancy_type: occupancy_type.to_string(),
                occupant_load: load,
            }),
        }
        self.grand_total = self.grand_total.saturating_add(load);
    }
}

/// Output of [`aggregate`]: rows with coerced types and loads, and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub rows: Vec<Row>,
    pub totals: Totals,
}

/// Parse an area as entered. Blank text counts as zero; anything that does
/// not parse to a finite number is `None`.
pub fn parse_area(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Occupants for a numeric area and factor. Non-positive or non-finite
/// inputs give zero.
pub fn load_for_area(area_m2: f64, factor: f64) -> u64 {
    if !(area_m2.is_finite() && area_m2 > 0.0 && factor.is_finite() && factor > 0.0) {
        return 0;
    }
    let quotient = area_m2 / factor;
    let nearest = quotient.round();
    let occupants = if (quotient - nearest).abs() <= INTEGER_SNAP_TOLERANCE * nearest.max(1.0) {
        nearest
    } else {
        quotient.ceil()
    };
    occupants as u64
}

/// Occupant load for one space.
///
/// Unknown or blank `occupancy_type` resolves to the table's default type;
/// an empty table falls back to a factor of 1.
pub fn compute_load(area: &str, occupancy_type: &str, table: &FactorTable) -> u64 {
    let resolved = table.normalize_type(occupancy_type);
    let factor = table.factor_or_default(&resolved);
    match parse_area(area) {
        Some(area_m2) => load_for_area(area_m2, factor),
        None => 0,
    }
}

/// Recompute every row against `table` and total the loads by type.
///
/// Row order and ids are preserved; only `occupancy_type` (coercion) and
/// `occupant_load` change.
pub fn aggregate(rows: &[Row], table: &FactorTable) -> Aggregation {
    let mut totals = Totals::default();
    let rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.refresh(table);
            totals.add(&row.occupancy_type, row.occupant_load);
            row
        })
        .collect();

    tracing::debug!(
        rows = rows.len(),
        types = totals.by_type.len(),
        grand_total = totals.grand_total,
        "aggregated occupant loads"
    );

    Aggregation { rows, totals }
}
