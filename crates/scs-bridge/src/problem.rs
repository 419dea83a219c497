//! Problem data: validation of `A`, `P`, `b`, `c` and their solver-width
//! buffers.

use scs_abi::{FloatWidth, IndexWidth, ScsMatrix};
use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::host::{DenseArray, HostStruct, SparseArray};
use crate::ownership::{Buffer, BufferRecord, TrackedBuffers};
use crate::width::{adapt_indices, adapt_values};

/// Host problem fields that passed validation, with `m` and `n` fixed.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedData<'h, 'a> {
    pub m: usize,
    pub n: usize,
    pub a: &'h SparseArray<'a>,
    pub p: Option<&'h SparseArray<'a>>,
    pub b: &'h DenseArray<'a>,
    pub c: &'h DenseArray<'a>,
}

/// Checks the data struct before anything is allocated.
///
/// `n` is the leading dimension of `c` and `m` the leading dimension of `b`;
/// `A` must be `m x n` and `P`, when given, `n x n`.
pub fn validate_data<'h, 'a>(data: &'h HostStruct<'a>) -> Result<ValidatedData<'h, 'a>> {
    let a = data
        .get("A")
        .ok_or(BridgeError::MissingField { field: "A" })?
        .as_sparse()
        .ok_or(BridgeError::NotSparse { field: "A" })?;
    let p = match data.get("P") {
        Some(value) => Some(value.as_sparse().ok_or(BridgeError::NotSparse { field: "P" })?),
        None => None,
    };
    let b = data
        .get("b")
        .ok_or(BridgeError::MissingField { field: "b" })?
        .as_dense()
        .ok_or(BridgeError::NotDense { field: "b" })?;
    let c = data
        .get("c")
        .ok_or(BridgeError::MissingField { field: "c" })?
        .as_dense()
        .ok_or(BridgeError::NotDense { field: "c" })?;

    let m = b.leading_len();
    let n = c.leading_len();
    check_shape("A", a, (m, n))?;
    if let Some(p) = p {
        check_shape("P", p, (n, n))?;
    }

    Ok(ValidatedData { m, n, a, p, b, c })
}

fn check_shape(field: &'static str, matrix: &SparseArray<'_>, expected: (usize, usize)) -> Result<()> {
    let got = (matrix.nrows(), matrix.ncols());
    if got != expected {
        return Err(BridgeError::DimensionMismatch {
            field,
            expected,
            got,
        });
    }
    Ok(())
}

/// `b` and `c` in the solver's float width.
#[derive(Debug)]
pub struct ProblemVectors<'a, F> {
    pub m: usize,
    pub n: usize,
    pub b: Buffer<'a, F>,
    pub c: Buffer<'a, F>,
}

pub fn marshal_vectors<'a, F: FloatWidth>(data: &ValidatedData<'_, 'a>) -> ProblemVectors<'a, F> {
    ProblemVectors {
        m: data.m,
        n: data.n,
        b: adapt_values(data.b.leading()),
        c: adapt_values(data.c.leading()),
    }
}

impl<F> TrackedBuffers for ProblemVectors<'_, F> {
    fn buffer_records(&self) -> Vec<BufferRecord> {
        vec![
            BufferRecord::new("b", &self.b),
            BufferRecord::new("c", &self.c),
        ]
    }
}

/// One CSC matrix in solver widths. The envelope itself is always built
/// here; each of its three arrays is aliased or owned independently.
#[derive(Debug)]
pub struct MarshalledMatrix<'a, I, F> {
    /// Buffer names for teardown: pointers, indices, values.
    names: [&'static str; 3],
    rows: usize,
    cols: usize,
    col_ptrs: Buffer<'a, I>,
    row_indices: Buffer<'a, I>,
    values: Buffer<'a, F>,
}

impl<'a, I: IndexWidth, F: FloatWidth> MarshalledMatrix<'a, I, F> {
    fn from_host(names: [&'static str; 3], host: &SparseArray<'a>) -> Self {
        Self {
            names,
            rows: host.nrows(),
            cols: host.ncols(),
            col_ptrs: adapt_indices(host.col_ptrs()),
            row_indices: adapt_indices(host.row_indices()),
            values: adapt_values(host.values()),
        }
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn col_ptrs(&self) -> &Buffer<'a, I> {
        &self.col_ptrs
    }

    pub fn row_indices(&self) -> &Buffer<'a, I> {
        &self.row_indices
    }

    pub fn values(&self) -> &Buffer<'a, F> {
        &self.values
    }

    /// Raw record pointing into this matrix's buffers.
    pub fn to_raw(&self) -> ScsMatrix<I, F> {
        ScsMatrix {
            x: self.values.as_ptr(),
            i: self.row_indices.as_ptr(),
            p: self.col_ptrs.as_ptr(),
            m: I::from_usize(self.rows),
            n: I::from_usize(self.cols),
        }
    }

    fn records(&self, out: &mut Vec<BufferRecord>) {
        let [p, i, x] = self.names;
        out.push(BufferRecord::new(p, &self.col_ptrs));
        out.push(BufferRecord::new(i, &self.row_indices));
        out.push(BufferRecord::new(x, &self.values));
    }
}

/// `A` and the optional `P`.
#[derive(Debug)]
pub struct ProblemMatrices<'a, I, F> {
    pub a: MarshalledMatrix<'a, I, F>,
    pub p: Option<MarshalledMatrix<'a, I, F>>,
}

pub fn marshal_matrices<'a, I: IndexWidth, F: FloatWidth>(
    data: &ValidatedData<'_, 'a>,
) -> ProblemMatrices<'a, I, F> {
    let a = MarshalledMatrix::from_host(["A.p", "A.i", "A.x"], data.a);
    let p = data
        .p
        .map(|p| MarshalledMatrix::from_host(["P.p", "P.i", "P.x"], p));
    debug!(
        component = "bridge",
        operation = "marshal_matrices",
        m = data.m,
        n = data.n,
        nnz_a = a.nnz(),
        nnz_p = p.as_ref().map_or(0, MarshalledMatrix::nnz),
        index_width = I::NAME,
        float_width = F::NAME,
        "Matrices marshalled"
    );
    ProblemMatrices { a, p }
}

impl<I: IndexWidth, F: FloatWidth> TrackedBuffers for ProblemMatrices<'_, I, F> {
    fn buffer_records(&self) -> Vec<BufferRecord> {
        let mut records = Vec::with_capacity(6);
        self.a.records(&mut records);
        if let Some(p) = &self.p {
            p.records(&mut records);
        }
        records
    }
}
