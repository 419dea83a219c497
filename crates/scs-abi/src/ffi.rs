//! `#[repr(C)]` mirrors of the SCS 3.x public records and the linked entry
//! points.
//!
//! The records are generic over the index and float widths so that every
//! build configuration of the library can be described from one definition.
//! `scs_int` and `scs_float` name the pair selected by this crate's features.
#![allow(unsafe_code)]

use std::ffi::c_char;
use std::ptr;

use crate::width::{FloatWidth, IndexWidth};

/// Index width selected at build time.
#[cfg(feature = "dlong")]
#[allow(non_camel_case_types)]
pub type scs_int = i64;
/// Index width selected at build time.
#[cfg(not(feature = "dlong"))]
#[allow(non_camel_case_types)]
pub type scs_int = i32;

/// Float width selected at build time.
#[cfg(feature = "sfloat")]
#[allow(non_camel_case_types)]
pub type scs_float = f32;
/// Float width selected at build time.
#[cfg(not(feature = "sfloat"))]
#[allow(non_camel_case_types)]
pub type scs_float = f64;

/// Length of the fixed status strings in [`ScsInfo`].
pub const SCS_STATUS_LEN: usize = 128;

/// Compressed sparse column matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ScsMatrix<I, F> {
    /// Nonzero values, length `p[n]`.
    pub x: *const F,
    /// Row indices, length `p[n]`.
    pub i: *const I,
    /// Column pointers, length `n + 1`.
    pub p: *const I,
    pub m: I,
    pub n: I,
}

/// Problem data: minimize `x'Px/2 + c'x` subject to `Ax + s = b`, `s` in K.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ScsData<I, F> {
    pub m: I,
    pub n: I,
    pub a: *const ScsMatrix<I, F>,
    /// Upper triangular quadratic term, null when absent.
    pub p: *const ScsMatrix<I, F>,
    pub b: *const F,
    pub c: *const F,
}

/// Cone decomposition, in the order the solver lays out rows of `A`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ScsCone<I, F> {
    pub z: I,
    pub l: I,
    pub bu: *const F,
    pub bl: *const F,
    /// Box cone dimension, including the `t` variable.
    pub bsize: I,
    pub q: *const I,
    pub qsize: I,
    pub s: *const I,
    pub ssize: I,
    pub ep: I,
    pub ed: I,
    pub p: *const F,
    pub psize: I,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ScsSettings<I, F> {
    pub normalize: I,
    pub scale: F,
    pub adaptive_scale: I,
    pub rho_x: F,
    pub max_iters: I,
    pub eps_abs: F,
    pub eps_rel: F,
    pub eps_infeas: F,
    pub alpha: F,
    pub time_limit_secs: F,
    pub verbose: I,
    pub warm_start: I,
    pub acceleration_lookback: I,
    pub acceleration_interval: I,
    pub write_data_filename: *const c_char,
    pub log_csv_filename: *const c_char,
}

/// Caller-allocated solution buffers. With `warm_start` set they also carry
/// the initial guess.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ScsSolution<F> {
    pub x: *mut F,
    pub y: *mut F,
    pub s: *mut F,
}

/// Solve statistics filled in by the solver.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ScsInfo<I, F> {
    pub iter: I,
    pub status: [c_char; SCS_STATUS_LEN],
    pub lin_sys_solver: [c_char; SCS_STATUS_LEN],
    pub status_val: I,
    pub scale_updates: I,
    pub pobj: F,
    pub dobj: F,
    pub res_pri: F,
    pub res_dual: F,
    pub gap: F,
    pub res_infeas: F,
    pub res_unbdd_a: F,
    pub res_unbdd_p: F,
    /// Milliseconds.
    pub setup_time: F,
    /// Milliseconds.
    pub solve_time: F,
    pub scale: F,
    pub comp_slack: F,
    pub rejected_accel_steps: I,
    pub accepted_accel_steps: I,
    pub lin_sys_time: F,
    pub cone_time: F,
    pub accel_time: F,
}

impl<I: IndexWidth, F: FloatWidth> ScsSettings<I, F> {
    /// Default settings of SCS 3.x (`scs_set_default_settings`).
    pub fn scs_defaults() -> Self {
        Self {
            normalize: I::from_usize(1),
            scale: F::from_f64(0.1),
            adaptive_scale: I::from_usize(1),
            rho_x: F::from_f64(1e-6),
            max_iters: I::from_usize(100_000),
            eps_abs: F::from_f64(1e-4),
            eps_rel: F::from_f64(1e-4),
            eps_infeas: F::from_f64(1e-7),
            alpha: F::from_f64(1.5),
            time_limit_secs: F::from_f64(0.0),
            verbose: I::from_usize(1),
            warm_start: I::from_usize(0),
            acceleration_lookback: I::from_usize(10),
            acceleration_interval: I::from_usize(10),
            write_data_filename: ptr::null(),
            log_csv_filename: ptr::null(),
        }
    }
}

impl<I: IndexWidth, F: FloatWidth> ScsCone<I, F> {
    /// Cone with every component empty.
    pub fn empty() -> Self {
        Self {
            z: I::default(),
            l: I::default(),
            bu: ptr::null(),
            bl: ptr::null(),
            bsize: I::default(),
            q: ptr::null(),
            qsize: I::default(),
            s: ptr::null(),
            ssize: I::default(),
            ep: I::default(),
            ed: I::default(),
            p: ptr::null(),
            psize: I::default(),
        }
    }
}

impl<I: IndexWidth, F: FloatWidth> ScsInfo<I, F> {
    /// All-zero record, as the solver expects to receive it.
    pub fn zeroed() -> Self {
        Self {
            iter: I::default(),
            status: [0; SCS_STATUS_LEN],
            lin_sys_solver: [0; SCS_STATUS_LEN],
            status_val: I::default(),
            scale_updates: I::default(),
            pobj: F::default(),
            dobj: F::default(),
            res_pri: F::default(),
            res_dual: F::default(),
            gap: F::default(),
            res_infeas: F::default(),
            res_unbdd_a: F::default(),
            res_unbdd_p: F::default(),
            setup_time: F::default(),
            solve_time: F::default(),
            scale: F::default(),
            comp_slack: F::default(),
            rejected_accel_steps: I::default(),
            accepted_accel_steps: I::default(),
            lin_sys_time: F::default(),
            cone_time: F::default(),
            accel_time: F::default(),
        }
    }

    /// Status text up to the first NUL.
    pub fn status_text(&self) -> String {
        fixed_to_string(&self.status)
    }

    pub fn lin_sys_solver_text(&self) -> String {
        fixed_to_string(&self.lin_sys_solver)
    }

    /// Writes `text` into the status field, truncated to leave room for the
    /// terminating NUL.
    pub fn set_status_text(&mut self, text: &str) {
        string_to_fixed(text, &mut self.status);
    }

    pub fn set_lin_sys_solver_text(&mut self, text: &str) {
        string_to_fixed(text, &mut self.lin_sys_solver);
    }
}

fn fixed_to_string(raw: &[c_char; SCS_STATUS_LEN]) -> String {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&ch| ch != 0)
        .map(|&ch| ch as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn string_to_fixed(text: &str, raw: &mut [c_char; SCS_STATUS_LEN]) {
    raw.fill(0);
    for (slot, byte) in raw
        .iter_mut()
        .zip(text.bytes().take(SCS_STATUS_LEN - 1))
    {
        *slot = byte as c_char;
    }
}

/// Problem data in the build-configured widths.
pub type RawData = ScsData<scs_int, scs_float>;
/// Cone in the build-configured widths.
pub type RawCone = ScsCone<scs_int, scs_float>;
/// Settings in the build-configured widths.
pub type RawSettings = ScsSettings<scs_int, scs_float>;
/// Solution in the build-configured widths.
pub type RawSolution = ScsSolution<scs_float>;
/// Info in the build-configured widths.
pub type RawInfo = ScsInfo<scs_int, scs_float>;

#[cfg(feature = "link")]
#[link(name = "scsdir")]
unsafe extern "C" {
    pub fn scs(
        d: *const RawData,
        k: *const RawCone,
        stgs: *const RawSettings,
        sol: *mut RawSolution,
        info: *mut RawInfo,
    ) -> scs_int;

    pub fn scs_set_default_settings(stgs: *mut RawSettings);

    pub fn scs_version() -> *const c_char;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_roundtrip_truncates() {
        let mut info = ScsInfo::<i32, f64>::zeroed();
        info.set_status_text("solved");
        assert_eq!(info.status_text(), "solved");

        let long = "x".repeat(300);
        info.set_status_text(&long);
        assert_eq!(info.status_text().len(), SCS_STATUS_LEN - 1);
        assert_eq!(info.status[SCS_STATUS_LEN - 1], 0);
    }

    #[test]
    fn test_defaults_match_library() {
        let stgs = ScsSettings::<i64, f32>::scs_defaults();
        assert_eq!(stgs.max_iters, 100_000);
        assert_eq!(stgs.eps_infeas, 1e-7f32);
        assert_eq!(stgs.alpha, 1.5);
        assert_eq!(stgs.acceleration_lookback, 10);
        assert_eq!(stgs.warm_start, 0);
        assert!(stgs.write_data_filename.is_null());
        assert!(stgs.log_csv_filename.is_null());
    }

    #[test]
    fn test_empty_cone_has_no_components() {
        let cone = ScsCone::<i32, f64>::empty();
        assert_eq!(cone.z + cone.l + cone.bsize + cone.qsize + cone.ssize, 0);
        assert!(cone.q.is_null() && cone.s.is_null() && cone.p.is_null());
    }
}
