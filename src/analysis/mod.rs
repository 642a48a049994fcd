//! State-level opportunity scoring.
//!
//! Library survey totals are min-max normalized per state and combined into
//! a weighted score, optionally annotated with E-Rate activity and a poverty
//! indicator derived from school data.

pub mod opportunity;
pub mod states;
pub mod types;
pub mod utility;
