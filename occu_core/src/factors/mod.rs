//! # Factor Tables
//!
//! A factor table maps occupancy-type labels to density factors (m² per
//! person). Tables are ordered: the first entry is the default type that
//! unknown or blank labels are coerced to.
//!
//! ## Structure
//!
//! ```text
//! CodeSetId ──base_factors()──┐
//!                             ├─> FactorOverrides::active_table() ─> FactorTable
//! FactorOverrides (persisted) ┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use occu_core::factors::{CodeSetId, FactorTable};
//!
//! let table = FactorTable::for_code_set(CodeSetId::Ibc2024);
//! assert_eq!(table.default_type(), "Retail");
//! assert_eq!(table.factor("Restaurant"), Some(1.4));
//! assert_eq!(table.normalize_type("  Mechanical "), "Mechanical");
//! assert_eq!(table.normalize_type("Ballroom"), "Retail");
//! ```

pub mod code_sets;
pub mod overrides;

use serde::{Deserialize, Serialize};

pub use code_sets::CodeSetId;
pub use overrides::FactorOverrides;

/// Label used when a table has no entries at all
pub const FALLBACK_TYPE: &str = "Retail";

/// Factor used when neither the requested nor the default type resolves
pub const FALLBACK_FACTOR: f64 = 1.0;

/// One occupancy type and its density factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorEntry {
    /// Occupancy type label (e.g. "Retail")
    pub occupancy_type: String,
    /// Area per occupant in m²
    pub factor: f64,
}

/// Ordered occupancy-type → factor mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorTable {
    entries: Vec<FactorEntry>,
}

impl FactorTable {
    /// Build a table from `(type, factor)` pairs. Later duplicates replace
    /// the factor of the earlier entry but keep its position.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = FactorTable::default();
        for (name, factor) in pairs {
            table.set(name, factor);
        }
        table
    }

    /// Base table of a built-in code set, without user overrides
    pub fn for_code_set(code: CodeSetId) -> Self {
        FactorTable::from_pairs(code.base_factors().iter().copied())
    }

    /// Insert or replace a factor. New types are appended.
    pub fn set(&mut self, occupancy_type: impl Into<String>, factor: f64) {
        let occupancy_type = occupancy_type.into();
        match self.entries.iter_mut().find(|e| e.occupancy_type == occupancy_type) {
            Some(entry) => entry.factor = factor,
            None => self.entries.push(FactorEntry {
                occupancy_type,
                factor,
            }),
        }
    }

    /// Factor for an exact type label
    pub fn factor(&self, occupancy_type: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.occupancy_type == occupancy_type)
            .map(|e| e.factor)
    }

    pub fn contains(&self, occupancy_type: &str) -> bool {
        self.factor(occupancy_type).is_some()
    }

    /// The designated default type: the first entry, or [`FALLBACK_TYPE`]
    /// for an empty table.
    pub fn default_type(&self) -> &str {
        self.entries
            .first()
            .map(|e| e.occupancy_type.as_str())
            .unwrap_or(FALLBACK_TYPE)
    }

    /// Resolve a raw label against this table, coercing blank or unknown
    /// labels to the default type.
    pub fn normalize_type(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if self.contains(trimmed) {
            trimmed.to_string()
        } else {
            self.default_type().to_string()
        }
    }

    /// Factor for `occupancy_type`, falling back to the default type's
    /// factor, then to [`FALLBACK_FACTOR`].
    pub fn factor_or_default(&self, occupancy_type: &str) -> f64 {
        self.factor(occupancy_type)
            .or_else(|| self.factor(self.default_type()))
            .unwrap_or(FALLBACK_FACTOR)
    }

    /// Type labels in table order
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.occupancy_type.as_str())
    }

    pub fn entries(&self) -> &[FactorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_table_order() {
        let table = FactorTable::for_code_set(CodeSetId::NbcCa2020);
        let types: Vec<_> = table.types().collect();
        assert_eq!(types, ["Retail", "Restaurant", "Administrative", "Mechanical"]);
        assert_eq!(table.factor("Mechanical"), Some(28.0));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut table = FactorTable::for_code_set(CodeSetId::Ibc2024);
        table.set("Restaurant", 1.5);
        table.set("Assembly", 0.65);
        let types: Vec<_> = table.types().collect();
        assert_eq!(types[1], "Restaurant");
        assert_eq!(types[4], "Assembly");
        assert_eq!(table.factor("Restaurant"), Some(1.5));
    }

    #[test]
    fn test_normalize_type_coerces_to_default() {
        let table = FactorTable::from_pairs([("Office", 9.3), ("Retail", 2.8)]);
        assert_eq!(table.normalize_type(""), "Office");
        assert_eq!(table.normalize_type("retail"), "Office");
        assert_eq!(table.normalize_type(" Retail\t"), "Retail");
    }

    #[test]
    fn test_empty_table_fallbacks() {
        let table = FactorTable::default();
        assert_eq!(table.default_type(), FALLBACK_TYPE);
        assert_eq!(table.factor_or_default("Anything"), FALLBACK_FACTOR);
        assert_eq!(table.normalize_type("Anything"), FALLBACK_TYPE);
    }

    #[test]
    fn test_factor_or_default_uses_first_entry() {
        let table = FactorTable::from_pairs([("Storage", 28.0), ("Retail", 2.8)]);
        assert_eq!(table.factor_or_default("Unknown"), 28.0);
    }
}
