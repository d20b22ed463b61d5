//! Subcommand implementations

pub mod calc;
pub mod codes;
pub mod factors;
pub mod project;
