//! A Clarabel-backed engine for the SCS solver contract.
//!
//! The engine reads the raw SCS records, translates them into a Clarabel
//! problem, and writes the solution and info back in the caller's widths. It
//! lets the bridge run end to end without a native SCS build.

mod engine;
mod problem;

pub use engine::{ClarabelEngine, scs_status};
pub use problem::ReadError;
