//! One host call: marshal, solve once, unmarshal, tear down.

use std::marker::PhantomData;

use scs_abi::{ConicSolver, FloatWidth, IndexWidth, scs_float, scs_int};
use tracing::{debug, info};

use crate::cone::{MarshalledCone, parse_cone};
use crate::error::{BridgeError, Diagnostics, Result};
use crate::host::{HostStruct, HostValue};
use crate::invoke::{SolveOutcome, invoke};
use crate::ownership::TeardownReport;
use crate::problem::{
    ProblemMatrices, ProblemVectors, marshal_matrices, marshal_vectors, validate_data,
};
use crate::result::{SolveOutput, marshal_results};
use crate::settings::{MarshalledSettings, apply_overrides};
use crate::warm_start::{WarmStart, load_warm_start};

/// Number of host inputs a call takes.
pub const INPUT_COUNT: usize = 3;
/// Most outputs a call can produce: x, y, s and info.
pub const MAX_OUTPUTS: usize = 4;

/// Components built so far in one call. Any of them may be missing when a
/// later step fails.
struct MarshalState<'a, I, F> {
    vectors: Option<ProblemVectors<'a, F>>,
    settings: Option<MarshalledSettings<I, F>>,
    cone: Option<MarshalledCone<I, F>>,
    matrices: Option<ProblemMatrices<'a, I, F>>,
}

impl<'a, I: IndexWidth, F: FloatWidth> MarshalState<'a, I, F> {
    fn new() -> Self {
        Self {
            vectors: None,
            settings: None,
            cone: None,
            matrices: None,
        }
    }

    fn teardown(self) -> TeardownReport {
        let mut report = TeardownReport::default();
        report.absorb(self.matrices);
        report.absorb(self.cone);
        report.absorb(self.settings);
        report.absorb(self.vectors);
        debug!(
            component = "bridge",
            operation = "teardown",
            released = report.released.len(),
            borrowed = report.borrowed.len(),
            "Marshalled buffers torn down"
        );
        report
    }
}

/// Marshalling front end bound to one engine and one pair of solver widths.
///
/// `I` and `F` default to the widths selected by the `dlong` and `sfloat`
/// features; [`Bridge::with_widths`] picks any other pair.
pub struct Bridge<S, I = scs_int, F = scs_float> {
    solver: S,
    last_teardown: Option<TeardownReport>,
    _widths: PhantomData<(I, F)>,
}

impl<S: ConicSolver<scs_int, scs_float>> Bridge<S> {
    /// Bridge in the build-configured widths.
    pub fn configured(solver: S) -> Self {
        Self::with_widths(solver)
    }
}

impl<S, I, F> Bridge<S, I, F>
where
    S: ConicSolver<I, F>,
    I: IndexWidth,
    F: FloatWidth,
{
    pub fn with_widths(solver: S) -> Self {
        Self {
            solver,
            last_teardown: None,
            _widths: PhantomData,
        }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    pub fn into_solver(self) -> S {
        self.solver
    }

    /// What the most recent call released and left alone.
    pub fn last_teardown(&self) -> Option<&TeardownReport> {
        self.last_teardown.as_ref()
    }

    /// Host-style entry point: checks the argument counts, then solves.
    pub fn call(&mut self, inputs: &[HostValue<'_>], outputs_requested: usize) -> Result<SolveOutput> {
        let [data, cone, settings] = inputs else {
            return Err(BridgeError::Usage(
                "Three arguments are required in this order: data struct, cone struct, settings struct"
                    .to_string(),
            ));
        };
        if outputs_requested > MAX_OUTPUTS {
            return Err(BridgeError::Usage(
                "scs returns up to 4 output arguments only.".to_string(),
            ));
        }
        self.solve(data, cone, settings)
    }

    /// Marshals the three host structs, runs the solver once and returns its
    /// output. Owned buffers are released on every path, including errors.
    pub fn solve(
        &mut self,
        data: &HostValue<'_>,
        cone: &HostValue<'_>,
        settings: &HostValue<'_>,
    ) -> Result<SolveOutput> {
        let data = data
            .as_struct()
            .ok_or(BridgeError::NotAStruct { argument: "data" })?;
        let cone = cone
            .as_struct()
            .ok_or(BridgeError::NotAStruct { argument: "cone" })?;
        let settings = settings
            .as_struct()
            .ok_or(BridgeError::NotAStruct { argument: "settings" })?;

        let mut diagnostics = Diagnostics::new();
        let mut state = MarshalState::new();
        let solved = self.marshal_and_solve(&mut state, data, cone, settings, &mut diagnostics);
        let output = solved.map(|(warm, outcome)| {
            marshal_results(warm, outcome.exit_code, &outcome.info, diagnostics.into_vec())
        });
        self.last_teardown = Some(state.teardown());

        match &output {
            Ok(output) => info!(
                component = "bridge",
                operation = "solve",
                status = output.info.status.as_str(),
                status_val = output.info.status_val,
                exit_code = output.exit_code,
                iterations = output.info.iter,
                diagnostics = output.diagnostics.len(),
                "Solve complete"
            ),
            Err(err) => debug!(
                component = "bridge",
                operation = "solve",
                status = "error",
                code = err.code(),
                error = %err,
                "Call abandoned before solving"
            ),
        }
        output
    }

    fn marshal_and_solve<'a>(
        &mut self,
        state: &mut MarshalState<'a, I, F>,
        data: &HostStruct<'a>,
        cone: &HostStruct<'_>,
        settings: &HostStruct<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<(WarmStart<F>, SolveOutcome<I, F>)> {
        let validated = validate_data(data)?;
        let vectors = state.vectors.insert(marshal_vectors(&validated));
        let settings = state.settings.insert(apply_overrides(
            self.solver.default_settings(),
            settings,
            diagnostics,
        )?);
        let cone = state.cone.insert(parse_cone(cone, diagnostics)?);
        let matrices = state.matrices.insert(marshal_matrices(&validated));
        let mut warm = load_warm_start(data, validated.m, validated.n, diagnostics);
        let outcome = invoke(&mut self.solver, vectors, matrices, cone, settings, &mut warm);
        Ok((warm, outcome))
    }
}
