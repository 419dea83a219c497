//! Alias-or-copy conversion between host widths and solver widths.

use scs_abi::{FloatWidth, IndexWidth};
use tracing::trace;

use crate::ownership::{Buffer, OwnedBuf};

/// Host indices in the solver's index width. Aliases when the widths agree.
pub fn adapt_indices<I: IndexWidth>(host: &[usize]) -> Buffer<'_, I> {
    match I::alias_host(host) {
        Some(aliased) => Buffer::Borrowed(aliased),
        None => {
            trace!(component = "bridge", width = I::NAME, len = host.len(), "Casting index array");
            Buffer::Owned(OwnedBuf::from_vec(
                host.iter().map(|&value| I::from_usize(value)).collect(),
            ))
        }
    }
}

/// Host values in the solver's float width. Aliases when the widths agree.
pub fn adapt_values<F: FloatWidth>(host: &[f64]) -> Buffer<'_, F> {
    match F::alias_host(host) {
        Some(aliased) => Buffer::Borrowed(aliased),
        None => {
            trace!(component = "bridge", width = F::NAME, len = host.len(), "Casting value array");
            Buffer::Owned(OwnedBuf::from_vec(
                host.iter().map(|&value| F::from_f64(value)).collect(),
            ))
        }
    }
}

/// Owned copy of host numbers cast to the index width, as cone sizes are.
pub fn owned_indices<I: IndexWidth>(host: &[f64]) -> OwnedBuf<I> {
    OwnedBuf::from_vec(host.iter().map(|&value| I::from_f64(value)).collect())
}

/// Owned copy of host numbers cast to the float width.
pub fn owned_values<F: FloatWidth>(host: &[f64]) -> OwnedBuf<F> {
    OwnedBuf::from_vec(host.iter().map(|&value| F::from_f64(value)).collect())
}

/// Solver output back in host form. A double-precision buffer is handed over
/// as is; otherwise the values are cast into a fresh host vector and the
/// solver buffer is released.
pub fn restore_host<F: FloatWidth>(buffer: OwnedBuf<F>) -> Vec<f64> {
    match buffer.try_transfer(F::into_host) {
        Ok(host) => host,
        Err(buffer) => buffer.as_slice().iter().map(|value| value.to_f64()).collect(),
    }
}
