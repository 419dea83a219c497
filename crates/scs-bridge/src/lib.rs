//! Host-side marshalling for the SCS conic solver.
//!
//! A host hands over three structs (problem data, cone, settings) as a
//! [`HostValue`] tree. The bridge validates them, adapts every array to the
//! solver's index and float widths (aliasing host storage where the widths
//! agree, copying otherwise), calls the engine exactly once and returns the
//! solution vectors and info record as a [`SolveOutput`]. Every buffer the
//! bridge allocated is released before the call returns, on success and on
//! error alike.
//!
//! # Overview
//!
//! - [`Bridge`]: the entry point, generic over engine and widths
//! - [`HostValue`], [`HostStruct`], [`DenseArray`], [`SparseArray`]: host input
//! - [`SolveOutput`], [`InfoRecord`]: host output
//! - [`BridgeError`], [`Diagnostic`]: fatal errors and recoverable conditions
//! - [`ledger_snapshot`]: allocation counts for checking teardown

mod cone;
mod error;
mod gateway;
mod host;
mod invoke;
mod ownership;
mod problem;
mod result;
mod settings;
mod warm_start;
mod width;

pub use cone::{MarshalledCone, Resolved, parse_cone, resolve_zero_cone};
pub use error::{BridgeError, Diagnostic, Diagnostics, Result};
pub use gateway::{Bridge, INPUT_COUNT, MAX_OUTPUTS};
pub use host::{DenseArray, HostStruct, HostValue, SparseArray};
pub use ownership::{
    Buffer, BufferRecord, LedgerSnapshot, OwnedBuf, Ownership, TeardownReport, TrackedBuffers,
    ledger_snapshot,
};
pub use problem::{
    MarshalledMatrix, ProblemMatrices, ProblemVectors, ValidatedData, marshal_matrices,
    marshal_vectors, validate_data,
};
pub use result::{INFO_FIELDS, InfoRecord, InfoValue, SolveOutput, marshal_results};
pub use scs_abi::{ConicSolver, FloatWidth, IndexWidth, SolveStatus, scs_float, scs_int};
pub use settings::{MarshalledSettings, SETTINGS_FIELDS, apply_overrides};
pub use warm_start::{WarmStart, WarmVector, load_warm_start};
pub use width::{adapt_indices, adapt_values, restore_host};

/// Engine used when none is chosen explicitly: the native library with the
/// `link` feature, the Clarabel engine otherwise.
#[cfg(feature = "link")]
pub type DefaultEngine = scs_abi::LinkedScs;
/// Engine used when none is chosen explicitly: the native library with the
/// `link` feature, the Clarabel engine otherwise.
#[cfg(all(not(feature = "link"), feature = "clarabel"))]
pub type DefaultEngine = scs_clarabel::ClarabelEngine;

#[cfg(not(any(feature = "link", feature = "clarabel")))]
compile_error!("scs-bridge needs an engine: enable the `link` or `clarabel` feature");

/// Bridge in the build-configured widths over the default engine.
pub type ConfiguredBridge = Bridge<DefaultEngine>;

/// Builds a [`ConfiguredBridge`].
pub fn configured_bridge() -> ConfiguredBridge {
    Bridge::configured(DefaultEngine::default())
}

/// Engine identity and the widths this build marshals to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SolverInfo {
    pub engine: &'static str,
    pub version: Option<String>,
    pub index_width: &'static str,
    pub float_width: &'static str,
}

pub fn solver_info() -> SolverInfo {
    let engine = DefaultEngine::default();
    SolverInfo {
        engine: <DefaultEngine as ConicSolver<scs_int, scs_float>>::name(&engine),
        version: <DefaultEngine as ConicSolver<scs_int, scs_float>>::version(&engine),
        index_width: <scs_int as IndexWidth>::NAME,
        float_width: <scs_float as FloatWidth>::NAME,
    }
}
