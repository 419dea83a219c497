#![allow(unsafe_code)]

use std::ptr;

use scs_abi::{
    ConicSolver, FloatWidth, IndexWidth, ScsCone, ScsData, ScsInfo, ScsMatrix, ScsSettings,
    ScsSolution, SolveStatus,
};
use scs_clarabel::ClarabelEngine;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

struct Lp<I, F> {
    colptr: Vec<I>,
    rowval: Vec<I>,
    nzval: Vec<F>,
    b: Vec<F>,
    c: Vec<F>,
}

impl<I: IndexWidth, F: FloatWidth> Lp<I, F> {
    /// Two variables, A = sign * I, one linear cone of size 2.
    fn diagonal(sign: f64, b: [f64; 2], c: [f64; 2]) -> Self {
        Self {
            colptr: vec![I::from_usize(0), I::from_usize(1), I::from_usize(2)],
            rowval: vec![I::from_usize(0), I::from_usize(1)],
            nzval: vec![F::from_f64(sign), F::from_f64(sign)],
            b: b.iter().map(|&v| F::from_f64(v)).collect(),
            c: c.iter().map(|&v| F::from_f64(v)).collect(),
        }
    }

    fn solve(&self, cone: ScsCone<I, F>) -> (SolveStatus, Vec<f64>, ScsInfo<I, F>) {
        let a = ScsMatrix {
            x: self.nzval.as_ptr(),
            i: self.rowval.as_ptr(),
            p: self.colptr.as_ptr(),
            m: I::from_usize(2),
            n: I::from_usize(2),
        };
        let data = ScsData {
            m: I::from_usize(2),
            n: I::from_usize(2),
            a: &a,
            p: ptr::null(),
            b: self.b.as_ptr(),
            c: self.c.as_ptr(),
        };
        let mut settings = ScsSettings::<I, F>::scs_defaults();
        settings.verbose = I::from_usize(0);
        let mut x = vec![F::default(); 2];
        let mut y = vec![F::default(); 2];
        let mut s = vec![F::default(); 2];
        let mut solution = ScsSolution {
            x: x.as_mut_ptr(),
            y: y.as_mut_ptr(),
            s: s.as_mut_ptr(),
        };
        let mut info = ScsInfo::zeroed();
        let mut engine = ClarabelEngine::new();
        let code = unsafe { engine.solve(&data, &cone, &settings, &mut solution, &mut info) };
        let status = SolveStatus::from_code(code.to_i64()).expect("known status code");
        (status, x.iter().map(|v| v.to_f64()).collect(), info)
    }
}

fn linear_cone<I: IndexWidth, F: FloatWidth>(l: usize) -> ScsCone<I, F> {
    let mut cone = ScsCone::empty();
    cone.l = I::from_usize(l);
    cone
}

#[test]
fn test_nonnegative_orthant_solved_double() {
    init_tracing();
    let lp = Lp::<i64, f64>::diagonal(-1.0, [0.0, 0.0], [1.0, 1.0]);
    let (status, x, info) = lp.solve(linear_cone(2));
    assert_eq!(status, SolveStatus::Solved);
    assert_eq!(info.status_text(), "solved");
    assert_eq!(info.status_val, 1);
    assert!(x.iter().all(|v| v.abs() < 1e-3), "x = {x:?}");
    assert!(info.pobj.abs() < 1e-3);
    assert!(info.iter > 0);
}

#[test]
fn test_nonnegative_orthant_solved_single() {
    init_tracing();
    let lp = Lp::<i32, f32>::diagonal(-1.0, [0.0, 0.0], [1.0, 1.0]);
    let (status, x, info) = lp.solve(linear_cone(2));
    assert!(status.is_solved());
    assert!(x.iter().all(|v| v.abs() < 1e-3), "x = {x:?}");
    assert_eq!(info.lin_sys_solver_text(), "clarabel-qdldl");
}

#[test]
fn test_upper_bounded_minimisation_is_unbounded() {
    init_tracing();
    // x + s = 1, s >= 0 leaves x free below.
    let lp = Lp::<i32, f64>::diagonal(1.0, [1.0, 1.0], [1.0, 1.0]);
    let (status, _, info) = lp.solve(linear_cone(2));
    assert!(status.is_unbounded(), "status = {status}");
    assert!(info.status_val < 0);
}

#[test]
fn test_cone_rows_mismatch_reports_failure() {
    init_tracing();
    let lp = Lp::<i32, f64>::diagonal(-1.0, [0.0, 0.0], [1.0, 1.0]);
    let (status, x, info) = lp.solve(linear_cone(3));
    assert_eq!(status, SolveStatus::Failed);
    assert_eq!(info.status_text(), "failure");
    assert_eq!(x, vec![0.0, 0.0]);
}
