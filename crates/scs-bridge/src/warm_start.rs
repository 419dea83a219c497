//! Solution buffers and optional warm-start preloading.

use scs_abi::{FloatWidth, ScsSolution};
use tracing::debug;

use crate::error::{Diagnostic, Diagnostics};
use crate::host::{HostStruct, HostValue};
use crate::ownership::{BufferRecord, OwnedBuf, TrackedBuffers};

/// The three solution vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmVector {
    X,
    Y,
    S,
}

impl WarmVector {
    pub const ALL: [WarmVector; 3] = [WarmVector::X, WarmVector::Y, WarmVector::S];

    /// Data struct field holding the guess.
    pub fn field(self) -> &'static str {
        match self {
            WarmVector::X => "x",
            WarmVector::Y => "y",
            WarmVector::S => "s",
        }
    }

    /// `n` for x, `m` for y and s.
    pub fn len(self, m: usize, n: usize) -> usize {
        match self {
            WarmVector::X => n,
            WarmVector::Y | WarmVector::S => m,
        }
    }
}

/// Zero-initialised solution buffers, some possibly preloaded from the host.
#[derive(Debug)]
pub struct WarmStart<F> {
    x: OwnedBuf<F>,
    y: OwnedBuf<F>,
    s: OwnedBuf<F>,
    loaded: [bool; 3],
}

impl<F: FloatWidth> WarmStart<F> {
    /// True when any of the three vectors was preloaded.
    pub fn is_warm(&self) -> bool {
        self.loaded.iter().any(|&loaded| loaded)
    }

    pub fn is_loaded(&self, vector: WarmVector) -> bool {
        self.loaded[vector as usize]
    }

    pub fn vector(&self, vector: WarmVector) -> &[F] {
        match vector {
            WarmVector::X => self.x.as_slice(),
            WarmVector::Y => self.y.as_slice(),
            WarmVector::S => self.s.as_slice(),
        }
    }

    /// Mutable raw view for the solver call.
    pub fn to_raw(&mut self) -> ScsSolution<F> {
        ScsSolution {
            x: self.x.as_mut_ptr(),
            y: self.y.as_mut_ptr(),
            s: self.s.as_mut_ptr(),
        }
    }

    pub fn into_buffers(self) -> (OwnedBuf<F>, OwnedBuf<F>, OwnedBuf<F>) {
        (self.x, self.y, self.s)
    }
}

impl<F> TrackedBuffers for WarmStart<F> {
    fn buffer_records(&self) -> Vec<BufferRecord> {
        vec![
            BufferRecord::owned("solution.x", &self.x),
            BufferRecord::owned("solution.y", &self.y),
            BufferRecord::owned("solution.s", &self.s),
        ]
    }
}

fn load_component<F: FloatWidth>(
    data: &HostStruct<'_>,
    vector: WarmVector,
    len: usize,
    diagnostics: &mut Diagnostics,
) -> (OwnedBuf<F>, bool) {
    let mut buffer = OwnedBuf::zeroed(len);
    let Some(value) = data.get(vector.field()) else {
        return (buffer, false);
    };
    match value {
        HostValue::Dense(array) if array.leading_len() == len => {
            for (slot, host) in buffer.as_mut_slice().iter_mut().zip(array.leading()) {
                *slot = F::from_f64(*host);
            }
            (buffer, true)
        }
        _ => {
            diagnostics.push(Diagnostic::WarmStartRejected {
                vector: vector.field(),
                expected: len,
            });
            (buffer, false)
        }
    }
}

/// Allocates `x` (`n`), `y` (`m`) and `s` (`m`) and copies any usable guess
/// from the data struct. A malformed guess only makes that vector start cold.
pub fn load_warm_start<F: FloatWidth>(
    data: &HostStruct<'_>,
    m: usize,
    n: usize,
    diagnostics: &mut Diagnostics,
) -> WarmStart<F> {
    let (x, x_loaded) = load_component(data, WarmVector::X, n, diagnostics);
    let (y, y_loaded) = load_component(data, WarmVector::Y, m, diagnostics);
    let (s, s_loaded) = load_component(data, WarmVector::S, m, diagnostics);
    let warm = WarmStart {
        x,
        y,
        s,
        loaded: [x_loaded, y_loaded, s_loaded],
    };
    debug!(
        component = "bridge",
        operation = "load_warm_start",
        x = x_loaded,
        y = y_loaded,
        s = s_loaded,
        warm_start = warm.is_warm(),
        "Solution buffers ready"
    );
    warm
}
