//! The single solver call.
#![allow(unsafe_code)]

use std::ptr;
use std::time::Instant;

use scs_abi::{ConicSolver, FloatWidth, IndexWidth, ScsData, ScsInfo};
use tracing::debug;

use crate::cone::MarshalledCone;
use crate::problem::{ProblemMatrices, ProblemVectors};
use crate::settings::MarshalledSettings;
use crate::warm_start::WarmStart;

/// What the solver handed back, uninterpreted.
#[derive(Debug, Clone, Copy)]
pub struct SolveOutcome<I, F> {
    /// Return value of the entry point.
    pub exit_code: I,
    pub info: ScsInfo<I, F>,
}

/// Assembles the raw records from the marshalled components and calls the
/// solver once. Whatever status comes back is returned as is.
pub fn invoke<I, F, S>(
    solver: &mut S,
    vectors: &ProblemVectors<'_, F>,
    matrices: &ProblemMatrices<'_, I, F>,
    cone: &MarshalledCone<I, F>,
    settings: &MarshalledSettings<I, F>,
    warm: &mut WarmStart<F>,
) -> SolveOutcome<I, F>
where
    I: IndexWidth,
    F: FloatWidth,
    S: ConicSolver<I, F> + ?Sized,
{
    let a = matrices.a.to_raw();
    let p = matrices.p.as_ref().map(|p| p.to_raw());
    let data = ScsData {
        m: I::from_usize(vectors.m),
        n: I::from_usize(vectors.n),
        a: &raw const a,
        p: p.as_ref().map_or(ptr::null(), |p| p as *const _),
        b: vectors.b.as_ptr(),
        c: vectors.c.as_ptr(),
    };
    let raw_cone = cone.to_raw();
    let warm_start = warm.is_warm();
    let raw_settings = settings.to_raw(warm_start);
    let mut solution = warm.to_raw();
    let mut info = ScsInfo::zeroed();

    debug!(
        component = "bridge",
        operation = "solve",
        status = "start",
        engine = solver.name(),
        m = vectors.m,
        n = vectors.n,
        nnz_a = matrices.a.nnz(),
        warm_start,
        "Invoking solver"
    );
    let started = Instant::now();
    // SAFETY: every pointer in the raw records refers to a buffer owned by
    // `vectors`, `matrices`, `cone`, `settings` or `warm`, or to the host
    // storage they borrow, all of which outlive this call. Lengths follow the
    // validated dimensions: A is m x n with n + 1 column pointers, b and c
    // have m and n entries, the solution buffers n, m and m.
    let exit_code = unsafe {
        solver.solve(&data, &raw_cone, &raw_settings, &mut solution, &mut info)
    };
    debug!(
        component = "bridge",
        operation = "solve",
        status = "finish",
        exit_code = exit_code.to_i64(),
        status_val = info.status_val.to_i64(),
        iterations = info.iter.to_i64(),
        duration_ms = started.elapsed().as_secs_f64() * 1e3,
        "Solver returned"
    );

    SolveOutcome { exit_code, info }
}
