//! Clarabel engine behind the SCS entry point signature.
#![allow(unsafe_code)]

use std::slice;
use std::time::Instant;

use clarabel::solver::{DefaultSettings, DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus};
use scs_abi::{
    ConicSolver, FloatWidth, IndexWidth, ScsCone, ScsData, ScsInfo, ScsSettings, ScsSolution,
    SolveStatus,
};
use tracing::{debug, warn};

use crate::problem::ConicProblem;

/// Interior-point engine answering SCS calls with Clarabel.
///
/// Supports zero, linear, second-order, exponential and primal power cones.
/// Anything else comes back as a `failure` status with the reason in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClarabelEngine;

impl ClarabelEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Maps Clarabel's verdict onto SCS exit codes.
pub fn scs_status(status: SolverStatus) -> SolveStatus {
    match status {
        SolverStatus::Solved => SolveStatus::Solved,
        SolverStatus::AlmostSolved => SolveStatus::SolvedInaccurate,
        SolverStatus::PrimalInfeasible => SolveStatus::Infeasible,
        SolverStatus::DualInfeasible => SolveStatus::Unbounded,
        SolverStatus::AlmostPrimalInfeasible => SolveStatus::InfeasibleInaccurate,
        SolverStatus::AlmostDualInfeasible => SolveStatus::UnboundedInaccurate,
        SolverStatus::MaxIterations | SolverStatus::MaxTime => SolveStatus::SolvedInaccurate,
        SolverStatus::Unsolved => SolveStatus::Unfinished,
        _ => SolveStatus::Failed,
    }
}

fn clarabel_settings<I: IndexWidth, F: FloatWidth>(
    settings: &ScsSettings<I, F>,
) -> Result<DefaultSettings<f64>, String> {
    let max_iter = settings
        .max_iters
        .to_usize()
        .map_or(0, |iters| u32::try_from(iters).unwrap_or(u32::MAX));
    let time_limit = settings.time_limit_secs.to_f64();
    let eps_abs = settings.eps_abs.to_f64();
    let eps_rel = settings.eps_rel.to_f64();
    let eps_infeas = settings.eps_infeas.to_f64();

    DefaultSettingsBuilder::default()
        .verbose(settings.verbose.to_i64() != 0)
        .max_iter(max_iter)
        .time_limit(if time_limit > 0.0 { time_limit } else { f64::INFINITY })
        .tol_gap_abs(eps_abs)
        .tol_gap_rel(eps_rel)
        .tol_feas(eps_rel)
        .tol_infeas_abs(eps_infeas)
        .tol_infeas_rel(eps_infeas)
        .equilibrate_enable(settings.normalize.to_i64() != 0)
        .build()
        .map_err(|err| err.to_string())
}

fn fail<I: IndexWidth, F: FloatWidth>(info: &mut ScsInfo<I, F>, reason: &str) -> I {
    warn!(
        component = "clarabel",
        operation = "solve",
        status = "error",
        reason,
        "Engine rejected problem"
    );
    let status = SolveStatus::Failed;
    info.status_val = I::from_i64(status.code());
    info.set_status_text(status.as_str());
    info.status_val
}

/// # Safety
///
/// `target` must be null or valid for writes of `values.len()` elements.
unsafe fn write_back<F: FloatWidth>(target: *mut F, values: &[f64]) {
    if values.is_empty() || target.is_null() {
        return;
    }
    // SAFETY: non-null and sized per the caller.
    let out = unsafe { slice::from_raw_parts_mut(target, values.len()) };
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = F::from_f64(*value);
    }
}

impl<I: IndexWidth, F: FloatWidth> ConicSolver<I, F> for ClarabelEngine {
    fn name(&self) -> &'static str {
        "Clarabel"
    }

    unsafe fn solve(
        &mut self,
        data: &ScsData<I, F>,
        cone: &ScsCone<I, F>,
        settings: &ScsSettings<I, F>,
        solution: &mut ScsSolution<F>,
        info: &mut ScsInfo<I, F>,
    ) -> I {
        info.set_lin_sys_solver_text("clarabel-qdldl");
        info.scale = settings.scale;

        let setup_start = Instant::now();
        // SAFETY: forwarded from the caller's contract.
        let problem = match unsafe { ConicProblem::read(data, cone) } {
            Ok(problem) => problem,
            Err(err) => return fail(info, &err.to_string()),
        };
        let clarabel_settings = match clarabel_settings(settings) {
            Ok(settings) => settings,
            Err(err) => return fail(info, &err),
        };
        if settings.warm_start.to_i64() != 0 {
            debug!(
                component = "clarabel",
                operation = "solve",
                "Interior point engine ignores the warm start"
            );
        }

        let mut solver = DefaultSolver::new(
            &problem.p,
            &problem.q,
            &problem.a,
            &problem.b,
            &problem.cones,
            clarabel_settings,
        );
        let setup_ms = setup_start.elapsed().as_secs_f64() * 1000.0;
        solver.solve();

        let status = scs_status(solver.solution.status);
        // SAFETY: the caller guarantees n, m and m writable elements.
        unsafe {
            write_back(solution.x, &solver.solution.x[..problem.n]);
            write_back(solution.y, &solver.solution.z[..problem.m]);
            write_back(solution.s, &solver.solution.s[..problem.m]);
        }

        let comp_slack: f64 = solver
            .solution
            .s
            .iter()
            .zip(&solver.solution.z)
            .map(|(s, z)| s * z)
            .sum();

        info.iter = I::from_usize(solver.info.iterations as usize);
        info.status_val = I::from_i64(status.code());
        info.set_status_text(status.as_str());
        info.pobj = F::from_f64(solver.info.cost_primal);
        info.dobj = F::from_f64(solver.info.cost_dual);
        info.res_pri = F::from_f64(solver.info.res_primal);
        info.res_dual = F::from_f64(solver.info.res_dual);
        info.gap = F::from_f64(solver.info.gap_abs);
        info.res_infeas = F::from_f64(solver.info.res_primal_inf);
        info.res_unbdd_a = F::from_f64(solver.info.res_dual_inf);
        info.res_unbdd_p = F::default();
        info.setup_time = F::from_f64(setup_ms);
        info.solve_time = F::from_f64(solver.solution.solve_time * 1000.0);
        info.comp_slack = F::from_f64(comp_slack.abs());

        debug!(
            component = "clarabel",
            operation = "solve",
            status = status.as_str(),
            iterations = solver.info.iterations,
            m = problem.m,
            n = problem.n,
            "Engine finished"
        );
        info.status_val
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(scs_status(SolverStatus::Solved), SolveStatus::Solved);
        assert_eq!(scs_status(SolverStatus::DualInfeasible), SolveStatus::Unbounded);
        assert_eq!(
            scs_status(SolverStatus::AlmostPrimalInfeasible),
            SolveStatus::InfeasibleInaccurate
        );
        assert_eq!(scs_status(SolverStatus::NumericalError), SolveStatus::Failed);
    }

    #[test]
    fn test_settings_translate() {
        let mut settings = ScsSettings::<i32, f64>::scs_defaults();
        settings.max_iters = 25;
        settings.time_limit_secs = 0.0;
        let translated = clarabel_settings(&settings).unwrap();
        assert_eq!(translated.max_iter, 25);
        assert!(translated.time_limit.is_infinite());
        assert_eq!(translated.tol_gap_abs, 1e-4);
        assert!(translated.verbose);
    }
}
