//! User factor overrides, keyed by code-set id.
//!
//! Overrides can change a base factor, add a new occupancy type, or remove
//! a previously added type. Base types are never removed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CodeSetId, FactorTable};

/// Factor given to a newly added occupancy type until the user edits it
pub const NEW_TYPE_FACTOR: f64 = 10.0;

/// Per-code-set overrides: `{ code_set_id: { occupancy_type: factor } }`.
///
/// Keys are plain strings so that data written for an unknown code set
/// survives a load/save cycle untouched.
///
/// # Example
/// ```
/// use occu_core::factors::{CodeSetId, FactorOverrides};
///
/// let mut overrides = FactorOverrides::default();
/// assert!(overrides.add_type(CodeSetId::Ibc2024, "Assembly"));
/// assert!(overrides.set_factor(CodeSetId::Ibc2024, "Assembly", 0.65));
///
/// let table = overrides.active_table(CodeSetId::Ibc2024);
/// assert_eq!(table.factor("Assembly"), Some(0.65));
/// assert_eq!(table.default_type(), "Retail");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorOverrides {
    by_code: BTreeMap<String, BTreeMap<String, f64>>,
}

impl FactorOverrides {
    /// Base factors merged with this code set's overrides. Overridden base
    /// types keep their position; added types follow in name order.
    /// Non-finite or non-positive stored factors are skipped.
    pub fn active_table(&self, code: CodeSetId) -> FactorTable {
        let mut table = FactorTable::for_code_set(code);
        if let Some(custom) = self.by_code.get(code.id()) {
            for (name, factor) in custom {
                if is_valid_factor(*factor) {
                    table.set(name.clone(), *factor);
                } else {
                    debug!(code = code.id(), occupancy_type = %name, factor, "skipping invalid stored factor");
                }
            }
        }
        table
    }

    /// Set the factor for `occupancy_type`. Ignored unless finite and > 0.
    pub fn set_factor(&mut self, code: CodeSetId, occupancy_type: &str, factor: f64) -> bool {
        if !is_valid_factor(factor) {
            return false;
        }
        self.by_code
            .entry(code.id().to_string())
            .or_default()
            .insert(occupancy_type.to_string(), factor);
        true
    }

    /// Add a new occupancy type with [`NEW_TYPE_FACTOR`]. Ignored when the
    /// trimmed name is empty or already present in the active table.
    pub fn add_type(&mut self, code: CodeSetId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.active_table(code).contains(name) {
            return false;
        }
        self.set_factor(code, name, NEW_TYPE_FACTOR)
    }

    /// Remove a user-added type. Base types cannot be deleted.
    pub fn delete_type(&mut self, code: CodeSetId, occupancy_type: &str) -> bool {
        if code.is_base_type(occupancy_type) {
            return false;
        }
        let Some(custom) = self.by_code.get_mut(code.id()) else {
            return false;
        };
        let removed = custom.remove(occupancy_type).is_some();
        if custom.is_empty() {
            self.by_code.remove(code.id());
        }
        removed
    }

    /// Drop every override for `code`, returning it to its base table.
    pub fn reset(&mut self, code: CodeSetId) -> bool {
        self.by_code.remove(code.id()).is_some()
    }

    /// Whether `occupancy_type` was added by the user (not a base type)
    pub fn is_custom_type(&self, code: CodeSetId, occupancy_type: &str) -> bool {
        !code.is_base_type(occupancy_type)
            && self
                .by_code
                .get(code.id())
                .is_some_and(|custom| custom.contains_key(occupancy_type))
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

fn is_valid_factor(factor: f64) -> bool {
    factor.is_finite() && factor > 0.0
}
