//! Reading raw SCS records into an owned Clarabel problem.
#![allow(unsafe_code)]

use std::fmt;
use std::slice;

use clarabel::algebra::CscMatrix;
use clarabel::solver::SupportedConeT;
use scs_abi::{FloatWidth, IndexWidth, ScsCone, ScsData, ScsMatrix};

/// Why a set of raw records could not be handed to Clarabel.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadError {
    NegativeSize { field: &'static str },
    NullPointer { field: &'static str },
    MalformedMatrix { name: &'static str, reason: String },
    UnsupportedCone { kind: &'static str },
    ConeRows { cone_rows: usize, m: usize },
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::NegativeSize { field } => write!(f, "{field} is negative"),
            ReadError::NullPointer { field } => write!(f, "{field} is null"),
            ReadError::MalformedMatrix { name, reason } => {
                write!(f, "matrix {name} is malformed: {reason}")
            }
            ReadError::UnsupportedCone { kind } => {
                write!(f, "{kind} cones are not supported by this engine")
            }
            ReadError::ConeRows { cone_rows, m } => write!(
                f,
                "cone dimensions sum to {cone_rows} but A has {m} rows"
            ),
        }
    }
}

/// Problem data in the form `DefaultSolver::new` takes it.
pub(crate) struct ConicProblem {
    pub m: usize,
    pub n: usize,
    pub p: CscMatrix<f64>,
    pub q: Vec<f64>,
    pub a: CscMatrix<f64>,
    pub b: Vec<f64>,
    pub cones: Vec<SupportedConeT<f64>>,
}

impl ConicProblem {
    /// Copies the records into owned `f64` storage, checking everything
    /// Clarabel would otherwise assert on.
    ///
    /// # Safety
    ///
    /// Same pointer contract as `ConicSolver::solve`.
    pub(crate) unsafe fn read<I: IndexWidth, F: FloatWidth>(
        data: &ScsData<I, F>,
        cone: &ScsCone<I, F>,
    ) -> Result<Self, ReadError> {
        let m = size(data.m, "data.m")?;
        let n = size(data.n, "data.n")?;

        // SAFETY: forwarded from the caller.
        let a = unsafe { read_csc(data.a, m, n, "A", false)? };
        let p = if data.p.is_null() {
            CscMatrix::spalloc((n, n), 0)
        } else {
            // SAFETY: forwarded from the caller.
            unsafe { read_csc(data.p, n, n, "P", true)? }
        };
        // SAFETY: forwarded from the caller.
        let b = unsafe { read_floats(data.b, m, "data.b")? };
        // SAFETY: forwarded from the caller.
        let q = unsafe { read_floats(data.c, n, "data.c")? };
        // SAFETY: forwarded from the caller.
        let cones = unsafe { read_cones(cone, m)? };

        Ok(Self {
            m,
            n,
            p,
            q,
            a,
            b,
            cones,
        })
    }
}

fn size<I: IndexWidth>(value: I, field: &'static str) -> Result<usize, ReadError> {
    value.to_usize().ok_or(ReadError::NegativeSize { field })
}

/// # Safety
///
/// `ptr` must be null or valid for `len` reads.
unsafe fn read_slice<'a, T>(ptr: *const T, len: usize, field: &'static str) -> Result<&'a [T], ReadError> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(ReadError::NullPointer { field });
    }
    // SAFETY: non-null and valid for `len` reads per the caller.
    Ok(unsafe { slice::from_raw_parts(ptr, len) })
}

unsafe fn read_floats<F: FloatWidth>(
    ptr: *const F,
    len: usize,
    field: &'static str,
) -> Result<Vec<f64>, ReadError> {
    // SAFETY: forwarded from the caller.
    let values = unsafe { read_slice(ptr, len, field)? };
    Ok(values.iter().map(|value| value.to_f64()).collect())
}

unsafe fn read_indices<I: IndexWidth>(
    ptr: *const I,
    len: usize,
    field: &'static str,
) -> Result<Vec<usize>, ReadError> {
    // SAFETY: forwarded from the caller.
    let values = unsafe { read_slice(ptr, len, field)? };
    values
        .iter()
        .map(|value| size(*value, field))
        .collect()
}

/// Reads a CSC matrix. With `upper_only` entries below the diagonal are
/// dropped, since the quadratic term is given by its upper triangle.
unsafe fn read_csc<I: IndexWidth, F: FloatWidth>(
    matrix: *const ScsMatrix<I, F>,
    rows: usize,
    cols: usize,
    name: &'static str,
    upper_only: bool,
) -> Result<CscMatrix<f64>, ReadError> {
    // SAFETY: null or valid per the caller.
    let Some(matrix) = (unsafe { matrix.as_ref() }) else {
        return Err(ReadError::NullPointer { field: name });
    };
    let malformed = |reason: String| ReadError::MalformedMatrix { name, reason };

    if matrix.m.to_usize() != Some(rows) || matrix.n.to_usize() != Some(cols) {
        return Err(malformed(format!(
            "shape is {}x{}, expected {rows}x{cols}",
            matrix.m, matrix.n
        )));
    }

    // SAFETY: forwarded from the caller.
    let colptr = unsafe { read_indices(matrix.p, cols + 1, "matrix.p")? };
    if colptr[0] != 0 {
        return Err(malformed("column pointers must start at 0".to_string()));
    }
    if colptr.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(malformed("column pointers must be non-decreasing".to_string()));
    }
    let nnz = colptr[cols];
    // SAFETY: forwarded from the caller.
    let rowval = unsafe { read_indices(matrix.i, nnz, "matrix.i")? };
    // SAFETY: forwarded from the caller.
    let nzval = unsafe { read_floats(matrix.x, nnz, "matrix.x")? };
    if let Some(row) = rowval.iter().find(|&&row| row >= rows) {
        return Err(malformed(format!("row index {row} out of range for {rows} rows")));
    }

    if !upper_only {
        return Ok(CscMatrix::new(rows, cols, colptr, rowval, nzval));
    }

    let mut upper_colptr = Vec::with_capacity(cols + 1);
    let mut upper_rowval = Vec::with_capacity(nnz);
    let mut upper_nzval = Vec::with_capacity(nnz);
    upper_colptr.push(0);
    for col in 0..cols {
        for idx in colptr[col]..colptr[col + 1] {
            if rowval[idx] <= col {
                upper_rowval.push(rowval[idx]);
                upper_nzval.push(nzval[idx]);
            }
        }
        upper_colptr.push(upper_rowval.len());
    }
    Ok(CscMatrix::new(
        rows,
        cols,
        upper_colptr,
        upper_rowval,
        upper_nzval,
    ))
}

/// Translates the cone record into Clarabel cones in SCS row order.
unsafe fn read_cones<I: IndexWidth, F: FloatWidth>(
    cone: &ScsCone<I, F>,
    m: usize,
) -> Result<Vec<SupportedConeT<f64>>, ReadError> {
    let mut cones = Vec::new();
    let mut rows = 0usize;

    let zero = size(cone.z, "cone.z")?;
    if zero > 0 {
        cones.push(SupportedConeT::ZeroConeT(zero));
        rows += zero;
    }

    let linear = size(cone.l, "cone.l")?;
    if linear > 0 {
        cones.push(SupportedConeT::NonnegativeConeT(linear));
        rows += linear;
    }

    if size(cone.bsize, "cone.bsize")? > 0 {
        return Err(ReadError::UnsupportedCone { kind: "box" });
    }

    let qsize = size(cone.qsize, "cone.qsize")?;
    // SAFETY: forwarded from the caller.
    for dim in unsafe { read_indices(cone.q, qsize, "cone.q")? } {
        if dim > 0 {
            cones.push(SupportedConeT::SecondOrderConeT(dim));
            rows += dim;
        }
    }

    let ssize = size(cone.ssize, "cone.ssize")?;
    // SAFETY: forwarded from the caller.
    let psd = unsafe { read_indices(cone.s, ssize, "cone.s")? };
    if psd.iter().any(|&dim| dim > 0) {
        return Err(ReadError::UnsupportedCone {
            kind: "positive semidefinite",
        });
    }

    let exp_primal = size(cone.ep, "cone.ep")?;
    for _ in 0..exp_primal {
        cones.push(SupportedConeT::ExponentialConeT());
    }
    rows += 3 * exp_primal;

    if size(cone.ed, "cone.ed")? > 0 {
        return Err(ReadError::UnsupportedCone {
            kind: "dual exponential",
        });
    }

    let psize = size(cone.psize, "cone.psize")?;
    // SAFETY: forwarded from the caller.
    for alpha in unsafe { read_floats(cone.p, psize, "cone.p")? } {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ReadError::UnsupportedCone {
                kind: "dual or degenerate power",
            });
        }
        cones.push(SupportedConeT::PowerConeT(alpha));
        rows += 3;
    }

    if rows != m {
        return Err(ReadError::ConeRows { cone_rows: rows, m });
    }
    Ok(cones)
}
