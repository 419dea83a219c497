//! Solver output in host form.

use scs_abi::{FloatWidth, IndexWidth, ScsInfo, SolveStatus};
use serde::Serialize;

use crate::error::Diagnostic;
use crate::warm_start::WarmStart;
use crate::width::restore_host;

/// Host-facing info field names, in the order hosts expect them.
pub const INFO_FIELDS: [&str; 16] = [
    "iter",
    "status",
    "pobj",
    "dobj",
    "res_pri",
    "res_dual",
    "res_infeas",
    "res_unbdd_a",
    "scale",
    "status_val",
    "res_unbdd_p",
    "gap",
    "setup_time",
    "solve_time",
    "scale_updates",
    "comp_slack",
];

/// One info value as the host sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Number(f64),
    Text(String),
}

/// Solve statistics, copied field by field from the solver's record.
///
/// `setup_time` and `solve_time` are in milliseconds, exactly as reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoRecord {
    pub iter: i64,
    pub status: String,
    pub pobj: f64,
    pub dobj: f64,
    pub res_pri: f64,
    pub res_dual: f64,
    pub res_infeas: f64,
    pub res_unbdd_a: f64,
    pub scale: f64,
    pub status_val: i64,
    pub res_unbdd_p: f64,
    pub gap: f64,
    pub setup_time: f64,
    pub solve_time: f64,
    pub scale_updates: i64,
    pub comp_slack: f64,
}

impl InfoRecord {
    pub fn from_raw<I: IndexWidth, F: FloatWidth>(info: &ScsInfo<I, F>) -> Self {
        Self {
            iter: info.iter.to_i64(),
            status: info.status_text(),
            pobj: info.pobj.to_f64(),
            dobj: info.dobj.to_f64(),
            res_pri: info.res_pri.to_f64(),
            res_dual: info.res_dual.to_f64(),
            res_infeas: info.res_infeas.to_f64(),
            res_unbdd_a: info.res_unbdd_a.to_f64(),
            scale: info.scale.to_f64(),
            status_val: info.status_val.to_i64(),
            res_unbdd_p: info.res_unbdd_p.to_f64(),
            gap: info.gap.to_f64(),
            setup_time: info.setup_time.to_f64(),
            solve_time: info.solve_time.to_f64(),
            scale_updates: info.scale_updates.to_i64(),
            comp_slack: info.comp_slack.to_f64(),
        }
    }

    /// Typed view of `status_val`, if the code is one SCS defines.
    pub fn solve_status(&self) -> Option<SolveStatus> {
        SolveStatus::from_code(self.status_val)
    }

    /// Name/value pairs in [`INFO_FIELDS`] order. Integer fields become
    /// numbers.
    pub fn fields(&self) -> Vec<(&'static str, InfoValue)> {
        let number = |value: f64| InfoValue::Number(value);
        let values = [
            number(self.iter as f64),
            InfoValue::Text(self.status.clone()),
            number(self.pobj),
            number(self.dobj),
            number(self.res_pri),
            number(self.res_dual),
            number(self.res_infeas),
            number(self.res_unbdd_a),
            number(self.scale),
            number(self.status_val as f64),
            number(self.res_unbdd_p),
            number(self.gap),
            number(self.setup_time),
            number(self.solve_time),
            number(self.scale_updates as f64),
            number(self.comp_slack),
        ];
        INFO_FIELDS.into_iter().zip(values).collect()
    }
}

/// Everything one call returns to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutput {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub s: Vec<f64>,
    /// Return value of the solver entry point, as returned. SCS returns the
    /// same code it writes to `info.status_val`.
    pub exit_code: i64,
    pub info: InfoRecord,
    /// Recoverable conditions met while marshalling, in order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Hands the solution buffers to the host and copies the info record.
pub fn marshal_results<I: IndexWidth, F: FloatWidth>(
    warm: WarmStart<F>,
    exit_code: I,
    info: &ScsInfo<I, F>,
    diagnostics: Vec<Diagnostic>,
) -> SolveOutput {
    let (x, y, s) = warm.into_buffers();
    SolveOutput {
        x: restore_host(x),
        y: restore_host(y),
        s: restore_host(s),
        exit_code: exit_code.to_i64(),
        info: InfoRecord::from_raw(info),
        diagnostics,
    }
}
