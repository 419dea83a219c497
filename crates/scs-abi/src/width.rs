//! Index and float widths the SCS library can be compiled with.
//!
//! SCS is built with either 32- or 64-bit integers (`DLONG`) and either single
//! or double precision (`SFLOAT`). The host side always speaks `usize` indices
//! and `f64` values; these traits describe how each solver width relates to
//! the host width, including whether a host slice can be reinterpreted in
//! place.
#![allow(unsafe_code)]

use std::fmt;

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Integer type used by the solver for dimensions, counts and sparse indices.
pub trait IndexWidth:
    Copy + Default + PartialEq + PartialOrd + fmt::Debug + fmt::Display + Send + Sync + 'static + sealed::Sealed
{
    /// Name used in logs (`"i32"` or `"i64"`).
    const NAME: &'static str;

    /// Narrowing cast from a host index, matching a C `(scs_int)` cast.
    fn from_usize(value: usize) -> Self;

    /// Truncating cast from a host number, matching a C `(scs_int)` cast.
    fn from_f64(value: f64) -> Self;

    /// Cast from a status or count computed as `i64`.
    fn from_i64(value: i64) -> Self;

    /// Widening cast to `i64`.
    fn to_i64(self) -> i64;

    /// Converts to a host index, or `None` when negative.
    fn to_usize(self) -> Option<usize> {
        usize::try_from(self.to_i64()).ok()
    }

    /// Reinterprets host indices without copying when the representation
    /// matches this width on the current target.
    fn alias_host(values: &[usize]) -> Option<&[Self]>;
}

/// Floating point type used by the solver for all real data.
pub trait FloatWidth:
    Copy + Default + PartialEq + PartialOrd + fmt::Debug + fmt::Display + Send + Sync + 'static + sealed::Sealed
{
    /// Name used in logs (`"f32"` or `"f64"`).
    const NAME: &'static str;

    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;

    /// Returns the host slice unchanged when this width is `f64`.
    fn alias_host(values: &[f64]) -> Option<&[Self]>;

    /// Hands a solver-width vector to the host without copying when the
    /// widths agree. Gives the vector back otherwise.
    fn into_host(values: Vec<Self>) -> Result<Vec<f64>, Vec<Self>>;
}

impl IndexWidth for i32 {
    const NAME: &'static str = "i32";

    fn from_usize(value: usize) -> Self {
        value as i32
    }

    fn from_f64(value: f64) -> Self {
        value as i32
    }

    fn from_i64(value: i64) -> Self {
        value as i32
    }

    fn to_i64(self) -> i64 {
        i64::from(self)
    }

    fn alias_host(values: &[usize]) -> Option<&[Self]> {
        #[cfg(target_pointer_width = "32")]
        {
            // SAFETY: on 32-bit targets usize and i32 have identical size and
            // alignment, and host indices never exceed isize::MAX.
            Some(unsafe { std::slice::from_raw_parts(values.as_ptr().cast::<i32>(), values.len()) })
        }
        #[cfg(not(target_pointer_width = "32"))]
        {
            let _ = values;
            None
        }
    }
}

impl IndexWidth for i64 {
    const NAME: &'static str = "i64";

    fn from_usize(value: usize) -> Self {
        value as i64
    }

    fn from_f64(value: f64) -> Self {
        value as i64
    }

    fn from_i64(value: i64) -> Self {
        value
    }

    fn to_i64(self) -> i64 {
        self
    }

    fn alias_host(values: &[usize]) -> Option<&[Self]> {
        #[cfg(target_pointer_width = "64")]
        {
            // SAFETY: on 64-bit targets usize and i64 have identical size and
            // alignment, and host indices never exceed isize::MAX.
            Some(unsafe { std::slice::from_raw_parts(values.as_ptr().cast::<i64>(), values.len()) })
        }
        #[cfg(not(target_pointer_width = "64"))]
        {
            let _ = values;
            None
        }
    }
}

impl FloatWidth for f32 {
    const NAME: &'static str = "f32";

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn alias_host(_values: &[f64]) -> Option<&[Self]> {
        None
    }

    fn into_host(values: Vec<Self>) -> Result<Vec<f64>, Vec<Self>> {
        Err(values)
    }
}

impl FloatWidth for f64 {
    const NAME: &'static str = "f64";

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn alias_host(values: &[f64]) -> Option<&[Self]> {
        Some(values)
    }

    fn into_host(values: Vec<Self>) -> Result<Vec<f64>, Vec<Self>> {
        Ok(values)
    }
}
