//! # Calculations
//!
//! The occupant load engine. Everything here is a pure, synchronous pass
//! over in-memory data:
//!
//! - [`compute_load`] - occupants for one space
//! - [`aggregate`] - recompute a row set and total it by occupancy type
//!
//! ## Available Calculations
//!
//! - [`occupant_load`] - area / density factor, rounded up

pub mod occupant_load;

// Re-export commonly used types
pub use occupant_load::{
    aggregate, compute_load, load_for_area, parse_area, Aggregation, Row, Totals, TypeTotal,
};
