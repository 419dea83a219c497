//! Binary contract of the SCS conic solver.
//!
//! This crate describes what the solver expects to receive and what it hands
//! back: the `#[repr(C)]` records, the index/float widths the library can be
//! compiled with, the exit codes, and the [`ConicSolver`] trait every engine
//! implements. With the `link` feature the native library is available as
//! [`LinkedScs`].

pub mod ffi;
pub mod solver;
mod status;
pub mod width;

pub use ffi::{
    SCS_STATUS_LEN, ScsCone, ScsData, ScsInfo, ScsMatrix, ScsSettings, ScsSolution, scs_float,
    scs_int,
};
#[cfg(feature = "link")]
pub use solver::LinkedScs;
pub use solver::ConicSolver;
pub use status::SolveStatus;
pub use width::{FloatWidth, IndexWidth};
