//! Cone specification parsing.
//!
//! Scalar counts (`z`, `l`, `ep`, `ed`) are read from the first element and
//! truncated to the index width. Sequences (`q`, `s`, `p`) may be given as
//! rows or columns. Every cone array is an owned copy, whatever the widths.
//! Absent or empty fields simply contribute an empty component.

use scs_abi::{FloatWidth, IndexWidth, ScsCone};
use tracing::debug;

use crate::error::{BridgeError, Diagnostic, Diagnostics, Result};
use crate::host::{DenseArray, HostStruct, HostValue};
use crate::ownership::{BufferRecord, OwnedBuf, TrackedBuffers};
use crate::width::{owned_indices, owned_values};

/// A value read through a field that has a deprecated alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    /// Set when the deprecated alias contributed to `value`.
    pub deprecation: Option<Diagnostic>,
}

/// Zero cone size: legacy `f` plus current `z`, each counting as zero when
/// absent or empty.
pub fn resolve_zero_cone<I: IndexWidth>(cone: &HostStruct<'_>) -> Result<Resolved<I>> {
    let legacy = count_field(cone, "f")?;
    let current = count_field(cone, "z")?;
    let value = I::from_i64(
        legacy
            .map_or(0, |f| I::from_f64(f).to_i64())
            .wrapping_add(current.map_or(0, |z| I::from_f64(z).to_i64())),
    );
    Ok(Resolved {
        value,
        deprecation: legacy.map(|_| Diagnostic::LegacyZeroCone),
    })
}

fn numeric<'h, 'a>(
    cone: &'h HostStruct<'a>,
    field: &'static str,
) -> Result<Option<&'h DenseArray<'a>>> {
    match cone.get_nonempty(field) {
        None => Ok(None),
        Some(HostValue::Dense(array)) => Ok(Some(array)),
        Some(_) => Err(BridgeError::NotDense { field }),
    }
}

fn count_field(cone: &HostStruct<'_>, field: &'static str) -> Result<Option<f64>> {
    Ok(numeric(cone, field)?.and_then(DenseArray::first))
}

fn count<I: IndexWidth>(cone: &HostStruct<'_>, field: &'static str) -> Result<I> {
    Ok(count_field(cone, field)?.map_or_else(I::default, I::from_f64))
}

fn sequence<'a>(cone: &HostStruct<'a>, field: &'static str) -> Result<&'a [f64]> {
    Ok(numeric(cone, field)?
        .map(DenseArray::sequence)
        .unwrap_or_default())
}

/// Cone record contents owned by the bridge.
#[derive(Debug)]
pub struct MarshalledCone<I, F> {
    pub z: I,
    pub l: I,
    pub ep: I,
    pub ed: I,
    box_lower: Option<OwnedBuf<F>>,
    box_upper: Option<OwnedBuf<F>>,
    q: Option<OwnedBuf<I>>,
    s: Option<OwnedBuf<I>>,
    p: Option<OwnedBuf<F>>,
}

impl<I: IndexWidth, F: FloatWidth> MarshalledCone<I, F> {
    /// Box cone dimension: bound length plus one, or zero without a box.
    pub fn bsize(&self) -> usize {
        self.box_lower.as_ref().map_or(0, |bl| bl.len() + 1)
    }

    pub fn box_lower(&self) -> &[F] {
        self.box_lower.as_ref().map(OwnedBuf::as_slice).unwrap_or_default()
    }

    pub fn box_upper(&self) -> &[F] {
        self.box_upper.as_ref().map(OwnedBuf::as_slice).unwrap_or_default()
    }

    pub fn q(&self) -> &[I] {
        self.q.as_ref().map(OwnedBuf::as_slice).unwrap_or_default()
    }

    pub fn s(&self) -> &[I] {
        self.s.as_ref().map(OwnedBuf::as_slice).unwrap_or_default()
    }

    pub fn p(&self) -> &[F] {
        self.p.as_ref().map(OwnedBuf::as_slice).unwrap_or_default()
    }

    /// Raw record pointing into this cone's buffers. Empty components get
    /// null pointers.
    pub fn to_raw(&self) -> ScsCone<I, F> {
        let mut raw = ScsCone::empty();
        raw.z = self.z;
        raw.l = self.l;
        raw.ep = self.ep;
        raw.ed = self.ed;
        if let (Some(bl), Some(bu)) = (&self.box_lower, &self.box_upper) {
            raw.bl = bl.as_ptr();
            raw.bu = bu.as_ptr();
            raw.bsize = I::from_usize(self.bsize());
        }
        if let Some(q) = &self.q {
            raw.q = q.as_ptr();
            raw.qsize = I::from_usize(q.len());
        }
        if let Some(s) = &self.s {
            raw.s = s.as_ptr();
            raw.ssize = I::from_usize(s.len());
        }
        if let Some(p) = &self.p {
            raw.p = p.as_ptr();
            raw.psize = I::from_usize(p.len());
        }
        raw
    }
}

impl<I, F> TrackedBuffers for MarshalledCone<I, F> {
    fn buffer_records(&self) -> Vec<BufferRecord> {
        let mut records = Vec::new();
        if let Some(bl) = &self.box_lower {
            records.push(BufferRecord::owned("cone.bl", bl));
        }
        if let Some(bu) = &self.box_upper {
            records.push(BufferRecord::owned("cone.bu", bu));
        }
        if let Some(q) = &self.q {
            records.push(BufferRecord::owned("cone.q", q));
        }
        if let Some(s) = &self.s {
            records.push(BufferRecord::owned("cone.s", s));
        }
        if let Some(p) = &self.p {
            records.push(BufferRecord::owned("cone.p", p));
        }
        records
    }
}

/// Box bounds after the shape check, before anything is copied.
fn box_bounds<'a>(
    cone: &HostStruct<'a>,
    diagnostics: &mut Diagnostics,
) -> Result<Option<(&'a [f64], &'a [f64])>> {
    let lower = numeric(cone, "bl")?;
    let upper = numeric(cone, "bu")?;
    match (lower, upper) {
        (Some(lower), Some(upper)) => {
            if lower.dims() != upper.dims() {
                return Err(BridgeError::ShapeMismatch {
                    lower: lower.dims().to_vec(),
                    upper: upper.dims().to_vec(),
                });
            }
            Ok(Some((lower.sequence(), upper.sequence())))
        }
        (Some(_), None) => {
            diagnostics.push(Diagnostic::PartialBoxCone { present: "bl" });
            Ok(None)
        }
        (None, Some(_)) => {
            diagnostics.push(Diagnostic::PartialBoxCone { present: "bu" });
            Ok(None)
        }
        (None, None) => Ok(None),
    }
}

/// Builds the cone from the host's cone struct. All checks run before the
/// first buffer is allocated.
pub fn parse_cone<I: IndexWidth, F: FloatWidth>(
    cone: &HostStruct<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<MarshalledCone<I, F>> {
    let zero = resolve_zero_cone::<I>(cone)?;
    let l = count::<I>(cone, "l")?;
    let ep = count::<I>(cone, "ep")?;
    let ed = count::<I>(cone, "ed")?;
    let bounds = box_bounds(cone, diagnostics)?;
    let q = sequence(cone, "q")?;
    let s = sequence(cone, "s")?;
    let p = sequence(cone, "p")?;

    if let Some(deprecation) = zero.deprecation {
        diagnostics.push(deprecation);
    }

    let marshalled = MarshalledCone {
        z: zero.value,
        l,
        ep,
        ed,
        box_lower: bounds.map(|(lower, _)| owned_values(lower)),
        box_upper: bounds.map(|(_, upper)| owned_values(upper)),
        q: (!q.is_empty()).then(|| owned_indices(q)),
        s: (!s.is_empty()).then(|| owned_indices(s)),
        p: (!p.is_empty()).then(|| owned_values(p)),
    };
    debug!(
        component = "bridge",
        operation = "parse_cone",
        z = %marshalled.z,
        l = %marshalled.l,
        bsize = marshalled.bsize(),
        qsize = q.len(),
        ssize = s.len(),
        ep = %marshalled.ep,
        ed = %marshalled.ed,
        psize = p.len(),
        "Cone parsed"
    );
    Ok(marshalled)
}
