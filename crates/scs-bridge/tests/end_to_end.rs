//! Full calls through the Clarabel engine in every width pair.

mod support;

use scs_bridge::{
    Bridge, ConicSolver, DenseArray, Diagnostic, FloatWidth, HostStruct, HostValue, IndexWidth,
    SolveOutput, SolveStatus, SparseArray, ledger_snapshot,
};
use scs_clarabel::ClarabelEngine;
use support::{Diagonal, init_tracing, scalar};

const TOL: f64 = 1e-3;

fn quiet() -> HostStruct<'static> {
    static ZERO: f64 = 0.0;
    HostStruct::new().with_field("verbose", scalar(&ZERO))
}

fn run<I, F>(data: HostStruct<'_>, cone: HostStruct<'_>) -> SolveOutput
where
    I: IndexWidth,
    F: FloatWidth,
    ClarabelEngine: ConicSolver<I, F>,
{
    let mut bridge = Bridge::<_, I, F>::with_widths(ClarabelEngine::new());
    let before = ledger_snapshot();
    let output = bridge
        .solve(&data.into(), &cone.into(), &quiet().into())
        .unwrap();
    assert_eq!(ledger_snapshot().since(&before).outstanding(), 0);
    output
}

fn assert_near(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < TOL, "{actual:?} vs {expected:?}");
    }
}

fn solved_lp<I, F>()
where
    I: IndexWidth,
    F: FloatWidth,
    ClarabelEngine: ConicSolver<I, F>,
{
    // minimize x1 + x2 subject to x >= 0
    let problem = Diagonal::new(2, -1.0, 0.0, 1.0);
    let l = 2.0;
    let output = run::<I, F>(problem.data(), HostStruct::new().with_field("l", scalar(&l)));
    let status = output.info.solve_status().unwrap();
    assert!(status.is_solved(), "{} / {}", I::NAME, F::NAME);
    assert_eq!(output.info.status, status.as_str());
    assert_eq!(output.exit_code, status.code());
    assert_near(&output.x, &[0.0, 0.0]);
    assert!(output.info.pobj.abs() < TOL);
    assert_eq!(output.y.len(), 2);
    assert_eq!(output.s.len(), 2);
}

#[test]
fn test_solved_lp_in_every_width_pair() {
    init_tracing();
    solved_lp::<i32, f32>();
    solved_lp::<i32, f64>();
    solved_lp::<i64, f32>();
    solved_lp::<i64, f64>();
}

#[test]
fn test_identity_lp_is_reported_unbounded() {
    // A = I, b = [1, 1], c = [1, 1], {l: 2}: x <= 1 with x free below.
    let problem = Diagonal::new(2, 1.0, 1.0, 1.0);
    let l = 2.0;
    let output = run::<i64, f64>(problem.data(), HostStruct::new().with_field("l", scalar(&l)));
    let status = SolveStatus::from_code(output.info.status_val).unwrap();
    assert!(status.is_unbounded(), "got {status}");
    assert_eq!(output.info.status, status.as_str());
}

#[test]
fn test_quadratic_objective() {
    // minimize x'x/2 - x1 - x2 subject to x >= 0, optimum x = [1, 1]
    let problem = Diagonal::new(2, -1.0, 0.0, -1.0);
    let identity = Diagonal::new(2, 1.0, 0.0, 0.0);
    let data = problem.data().with_field("P", identity.a());
    let l = 2.0;
    let output = run::<i32, f64>(data, HostStruct::new().with_field("l", scalar(&l)));
    assert!(output.info.solve_status().unwrap().is_solved());
    assert_near(&output.x, &[1.0, 1.0]);
    assert!((output.info.pobj + 1.0).abs() < TOL);
}

#[test]
fn test_legacy_zero_cone_is_honoured() {
    // x + s0 = 1 with s0 = 0, -x + s1 = 0 with s1 >= 0; minimize x.
    let col_ptrs = [0, 2];
    let rows = [0, 1];
    let values = [1.0, -1.0];
    let b = [1.0, 0.0];
    let c = [1.0];
    let data = HostStruct::new()
        .with_field(
            "A",
            SparseArray::new(2, 1, &col_ptrs, &rows, &values).unwrap().into(),
        )
        .with_field("b", DenseArray::column(&b).into())
        .with_field("c", DenseArray::column(&c).into());
    let one = 1.0;
    let cone = HostStruct::new()
        .with_field("f", scalar(&one))
        .with_field("l", scalar(&one));

    let output = run::<i64, f32>(data, cone);
    assert!(output.info.solve_status().unwrap().is_solved());
    assert_near(&output.x, &[1.0]);
    assert_eq!(output.diagnostics, vec![Diagnostic::LegacyZeroCone]);
}

#[test]
fn test_warm_start_is_accepted_by_engine() {
    let problem = Diagonal::new(2, -1.0, 0.0, 1.0);
    let guess = [0.5, 0.5];
    let data = problem
        .data()
        .with_field("x", DenseArray::column(&guess).into());
    let l = 2.0;
    let output = run::<i32, f64>(data, HostStruct::new().with_field("l", scalar(&l)));
    assert!(output.diagnostics.is_empty());
    assert!(output.info.solve_status().unwrap().is_solved());
    assert_near(&output.x, &[0.0, 0.0]);
}

#[test]
fn test_unsupported_cone_comes_back_as_failure() {
    // A PSD cone is not something the Clarabel engine accepts; that is an
    // engine outcome, not a bridge error.
    let problem = Diagonal::new(3, -1.0, 0.0, 1.0);
    let psd = [2.0];
    let cone = HostStruct::new().with_field("s", DenseArray::row(&psd).into());
    let output = run::<i32, f64>(problem.data(), cone);
    assert_eq!(output.info.solve_status(), Some(SolveStatus::Failed));
    assert_eq!(output.info.status, "failure");
}

#[test]
fn test_configured_bridge_solves_through_host_call() {
    let problem = Diagonal::new(2, -1.0, 0.0, 1.0);
    let l = 2.0;
    let mut bridge = scs_bridge::configured_bridge();
    let inputs: [HostValue<'_>; 3] = [
        problem.data().into(),
        HostStruct::new().with_field("l", scalar(&l)).into(),
        quiet().into(),
    ];
    let output = bridge.call(&inputs, 4).unwrap();
    assert!(output.info.solve_status().unwrap().is_solved());
    assert_eq!(output.info.fields().len(), 16);
}
