//! The solver contract: one call, raw records in, status out.
#![allow(unsafe_code)]

use crate::ffi::{ScsCone, ScsData, ScsInfo, ScsSettings, ScsSolution};
use crate::width::{FloatWidth, IndexWidth};

/// An engine that can be called through the SCS entry point signature.
///
/// The bridge never looks inside an engine; everything it knows about the
/// outcome comes back through the status code and the info record.
pub trait ConicSolver<I: IndexWidth, F: FloatWidth> {
    /// Engine name reported to hosts.
    fn name(&self) -> &'static str;

    fn version(&self) -> Option<String> {
        None
    }

    /// Settings the engine starts from before host overrides are applied.
    fn default_settings(&self) -> ScsSettings<I, F> {
        ScsSettings::scs_defaults()
    }

    /// Runs the engine once.
    ///
    /// # Safety
    ///
    /// Every non-null pointer reachable from `data`, `cone` and `settings`
    /// must be valid for reads of the length implied by the record's sizes
    /// (`n + 1` column pointers, `p[n]` entries, `qsize`, `ssize`, `psize`,
    /// `bsize - 1`, NUL-terminated file names). The three solution pointers
    /// must be valid for reads and writes of `n`, `m` and `m` elements.
    unsafe fn solve(
        &mut self,
        data: &ScsData<I, F>,
        cone: &ScsCone<I, F>,
        settings: &ScsSettings<I, F>,
        solution: &mut ScsSolution<F>,
        info: &mut ScsInfo<I, F>,
    ) -> I;
}

#[cfg(feature = "link")]
pub use linked::LinkedScs;

#[cfg(feature = "link")]
mod linked {
    use std::ffi::CStr;

    use tracing::trace;

    use super::ConicSolver;
    use crate::ffi::{self, RawCone, RawData, RawInfo, RawSettings, RawSolution, scs_float, scs_int};

    /// The native SCS library linked as `libscsdir`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LinkedScs;

    impl ConicSolver<scs_int, scs_float> for LinkedScs {
        fn name(&self) -> &'static str {
            "SCS"
        }

        fn version(&self) -> Option<String> {
            // SAFETY: scs_version returns a pointer to a static string.
            unsafe {
                let ptr = ffi::scs_version();
                if ptr.is_null() {
                    None
                } else {
                    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
                }
            }
        }

        fn default_settings(&self) -> RawSettings {
            let mut settings = RawSettings::scs_defaults();
            // SAFETY: settings is a valid, exclusively borrowed record.
            unsafe { ffi::scs_set_default_settings(&raw mut settings) };
            settings
        }

        unsafe fn solve(
            &mut self,
            data: &RawData,
            cone: &RawCone,
            settings: &RawSettings,
            solution: &mut RawSolution,
            info: &mut RawInfo,
        ) -> scs_int {
            trace!(component = "scs", operation = "solve", "Calling native scs()");
            // SAFETY: forwarded from the caller's contract.
            unsafe { ffi::scs(data, cone, settings, solution, info) }
        }
    }
}
