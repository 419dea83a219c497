//! Borrowed view of the host's values.
//!
//! Hosts hand over column-major `f64` arrays with a dimension vector, CSC
//! sparse arrays with `usize` indices, text, and structs of named fields.
//! Nothing here copies host storage; the marshalling stages decide whether a
//! slice is aliased or cast into a bridge-owned buffer.

use crate::error::{BridgeError, Result};

/// Dense numeric array in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseArray<'a> {
    dims: Vec<usize>,
    data: &'a [f64],
}

impl<'a> DenseArray<'a> {
    /// Wraps `data` with the given dimensions. The element count must equal
    /// the product of the dimensions; a single dimension is read as a column.
    pub fn new(dims: Vec<usize>, data: &'a [f64]) -> Result<Self> {
        let mut dims = dims;
        if dims.is_empty() {
            return Err(BridgeError::malformed("dense array needs at least one dimension"));
        }
        if dims.len() == 1 {
            dims.push(1);
        }
        let count = dims
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| BridgeError::malformed("dense array dimensions overflow"))?;
        if count != data.len() {
            return Err(BridgeError::malformed(format!(
                "dense array has {} elements but dimensions {:?}",
                data.len(),
                dims
            )));
        }
        Ok(Self { dims, data })
    }

    /// `k x 1` array.
    pub fn column(data: &'a [f64]) -> Self {
        Self {
            dims: vec![data.len(), 1],
            data,
        }
    }

    /// `1 x k` array.
    pub fn row(data: &'a [f64]) -> Self {
        Self {
            dims: vec![1, data.len()],
            data,
        }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn data(&self) -> &'a [f64] {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Length of the first dimension.
    pub fn leading_len(&self) -> usize {
        if self.data.is_empty() { 0 } else { self.dims[0] }
    }

    /// The first `leading_len()` elements.
    pub fn leading(&self) -> &'a [f64] {
        &self.data[..self.leading_len()]
    }

    /// Length of a vector given either as a row or a column: the second
    /// dimension when the first is 1, the first dimension otherwise.
    pub fn sequence_len(&self) -> usize {
        if self.data.is_empty() {
            0
        } else if self.dims.len() > 1 && self.dims[0] == 1 {
            self.dims[1]
        } else {
            self.dims[0]
        }
    }

    /// The first `sequence_len()` elements.
    pub fn sequence(&self) -> &'a [f64] {
        &self.data[..self.sequence_len()]
    }

    pub fn first(&self) -> Option<f64> {
        self.data.first().copied()
    }
}

/// Sparse matrix in compressed sparse column form.
///
/// `row_indices` and `values` may be longer than the number of stored
/// entries; only the first `col_ptrs[ncols]` are part of the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseArray<'a> {
    nrows: usize,
    ncols: usize,
    col_ptrs: &'a [usize],
    row_indices: &'a [usize],
    values: &'a [f64],
}

impl<'a> SparseArray<'a> {
    pub fn new(
        nrows: usize,
        ncols: usize,
        col_ptrs: &'a [usize],
        row_indices: &'a [usize],
        values: &'a [f64],
    ) -> Result<Self> {
        if col_ptrs.len() != ncols + 1 {
            return Err(BridgeError::malformed(
                "col_ptrs length must be ncols + 1",
            ));
        }
        if col_ptrs[0] != 0 {
            return Err(BridgeError::malformed("col_ptrs must start at 0"));
        }
        if let Some(col) = col_ptrs.windows(2).position(|pair| pair[0] > pair[1]) {
            return Err(BridgeError::malformed(format!(
                "col_ptrs must be non-decreasing (col {col})"
            )));
        }
        let nnz = col_ptrs[ncols];
        if nnz > row_indices.len() || nnz > values.len() {
            return Err(BridgeError::malformed(
                "col_ptrs last entry exceeds row_indices or values length",
            ));
        }
        if let Some(position) = row_indices[..nnz].iter().position(|&row| row >= nrows) {
            return Err(BridgeError::malformed(format!(
                "row index out of bounds at position {position}"
            )));
        }
        Ok(Self {
            nrows,
            ncols,
            col_ptrs,
            row_indices,
            values,
        })
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.col_ptrs[self.ncols]
    }

    pub fn col_ptrs(&self) -> &'a [usize] {
        self.col_ptrs
    }

    /// Row indices of the stored entries.
    pub fn row_indices(&self) -> &'a [usize] {
        &self.row_indices[..self.nnz()]
    }

    /// Values of the stored entries.
    pub fn values(&self) -> &'a [f64] {
        &self.values[..self.nnz()]
    }
}

/// Struct of named fields. Lookup is by exact name; the first match wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostStruct<'a> {
    fields: Vec<(&'a str, HostValue<'a>)>,
}

impl<'a> HostStruct<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &'a str, value: HostValue<'a>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &'a str, value: HostValue<'a>) {
        self.fields.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&HostValue<'a>> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// The field, unless it is absent or empty.
    pub fn get_nonempty(&self, name: &str) -> Option<&HostValue<'a>> {
        self.get(name).filter(|value| !value.is_empty())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Any value a host can pass in.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue<'a> {
    Dense(DenseArray<'a>),
    Sparse(SparseArray<'a>),
    Text(&'a str),
    Struct(HostStruct<'a>),
}

impl<'a> HostValue<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Dense(_) => "dense",
            HostValue::Sparse(_) => "sparse",
            HostValue::Text(_) => "text",
            HostValue::Struct(_) => "struct",
        }
    }

    /// True for zero-element arrays, empty text and field-less structs.
    pub fn is_empty(&self) -> bool {
        match self {
            HostValue::Dense(array) => array.is_empty(),
            HostValue::Sparse(array) => array.nrows() == 0 || array.ncols() == 0,
            HostValue::Text(text) => text.is_empty(),
            HostValue::Struct(fields) => fields.is_empty(),
        }
    }

    pub fn as_dense(&self) -> Option<&DenseArray<'a>> {
        match self {
            HostValue::Dense(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_sparse(&self) -> Option<&SparseArray<'a>> {
        match self {
            HostValue::Sparse(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&HostStruct<'a>> {
        match self {
            HostValue::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            HostValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// First element of a dense numeric value.
    pub fn scalar(&self) -> Option<f64> {
        self.as_dense().and_then(DenseArray::first)
    }
}

impl<'a> From<DenseArray<'a>> for HostValue<'a> {
    fn from(array: DenseArray<'a>) -> Self {
        HostValue::Dense(array)
    }
}

impl<'a> From<SparseArray<'a>> for HostValue<'a> {
    fn from(array: SparseArray<'a>) -> Self {
        HostValue::Sparse(array)
    }
}

impl<'a> From<HostStruct<'a>> for HostValue<'a> {
    fn from(fields: HostStruct<'a>) -> Self {
        HostValue::Struct(fields)
    }
}
