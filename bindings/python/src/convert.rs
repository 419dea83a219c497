//! Python objects to host values and back.
//!
//! Python inputs are copied once into an owned tree; the bridge then works on
//! borrowed views of that tree, so its alias-or-copy decisions apply exactly
//! as they would for any other host.

use bridge::{BridgeError, DenseArray, HostStruct, HostValue, InfoValue, SolveOutput, SparseArray};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyString, PyTuple};

use crate::PyObject;
use crate::errors::InvalidInputError;

/// Owned copy of one Python input.
#[derive(Debug, Clone)]
pub enum OwnedValue {
    Dense {
        dims: Vec<usize>,
        data: Vec<f64>,
    },
    Sparse {
        nrows: usize,
        ncols: usize,
        col_ptrs: Vec<usize>,
        row_indices: Vec<usize>,
        values: Vec<f64>,
    },
    Text(String),
    Struct(Vec<(String, OwnedValue)>),
}

impl OwnedValue {
    /// Borrowed view for the bridge. Fails if an array breaks its own layout.
    pub fn as_host(&self) -> Result<HostValue<'_>, BridgeError> {
        let value = match self {
            OwnedValue::Dense { dims, data } => DenseArray::new(dims.clone(), data)?.into(),
            OwnedValue::Sparse {
                nrows,
                ncols,
                col_ptrs,
                row_indices,
                values,
            } => SparseArray::new(*nrows, *ncols, col_ptrs, row_indices, values)?.into(),
            OwnedValue::Text(text) => HostValue::Text(text),
            OwnedValue::Struct(fields) => {
                let mut host = HostStruct::new();
                for (name, value) in fields {
                    host.insert(name, value.as_host()?);
                }
                host.into()
            }
        };
        Ok(value)
    }
}

/// Index entries as `usize`; the first negative entry is the error.
fn checked_indices(raw: Vec<i64>) -> Result<Vec<usize>, i64> {
    raw.into_iter()
        .map(|value| usize::try_from(value).map_err(|_| value))
        .collect()
}

fn indices(array: &Bound<'_, PyAny>, what: &str) -> PyResult<Vec<usize>> {
    let raw: Vec<i64> = array
        .call_method1("astype", ("int64",))?
        .call_method0("tolist")?
        .extract()?;
    checked_indices(raw).map_err(|value| {
        InvalidInputError::new_err(format!("{what} contains negative entry {value}"))
    })
}

/// A 0-d array is a 1-element vector.
fn dense_value(mut dims: Vec<usize>, data: Vec<f64>) -> OwnedValue {
    if dims.is_empty() {
        dims.push(1);
    }
    OwnedValue::Dense { dims, data }
}

/// Top-level argument. `None` becomes an empty array so the bridge reports
/// it as "not a struct" rather than dropping it from the argument list.
pub fn argument(value: &Bound<'_, PyAny>) -> PyResult<OwnedValue> {
    Ok(from_py(value)?.unwrap_or_else(empty_array))
}

fn empty_array() -> OwnedValue {
    OwnedValue::Dense {
        dims: vec![0, 0],
        data: Vec::new(),
    }
}

fn sparse(matrix: &Bound<'_, PyAny>) -> PyResult<OwnedValue> {
    let csc = matrix.call_method0("tocsc")?;
    let (nrows, ncols): (usize, usize) = csc.getattr("shape")?.extract()?;
    let values: Vec<f64> = csc
        .getattr("data")?
        .call_method1("astype", ("float64",))?
        .call_method0("tolist")?
        .extract()?;
    Ok(OwnedValue::Sparse {
        nrows,
        ncols,
        col_ptrs: indices(&csc.getattr("indptr")?, "indptr")?,
        row_indices: indices(&csc.getattr("indices")?, "indices")?,
        values,
    })
}

fn dense(value: &Bound<'_, PyAny>) -> PyResult<OwnedValue> {
    let py = value.py();
    let np = py.import("numpy")?;
    let array = np
        .call_method1("asarray", (value, "float64"))
        .map_err(|err| InvalidInputError::new_err(format!("expected a numeric array: {err}")))?;
    let dims: Vec<usize> = array.getattr("shape")?.extract()?;
    let data: Vec<f64> = array
        .call_method1("ravel", ("F",))?
        .call_method0("tolist")?
        .extract()?;
    Ok(dense_value(dims, data))
}

/// Converts one Python value. `None` means the field is absent.
fn from_py(value: &Bound<'_, PyAny>) -> PyResult<Option<OwnedValue>> {
    if value.is_none() {
        return Ok(None);
    }
    if value.is_instance_of::<PyString>() {
        return Ok(Some(OwnedValue::Text(value.extract()?)));
    }
    if let Ok(dict) = value.cast::<PyDict>() {
        let mut fields = Vec::with_capacity(dict.len());
        for (key, item) in dict.iter() {
            let name: String = key.extract()?;
            if let Some(converted) = from_py(&item)? {
                fields.push((name, converted));
            }
        }
        return Ok(Some(OwnedValue::Struct(fields)));
    }
    if value.hasattr("tocsc")? {
        return sparse(value).map(Some);
    }
    dense(value).map(Some)
}

/// Builds the `(x, y, s, info)` tuple as numpy arrays and a dict.
pub fn output_to_py(py: Python<'_>, output: SolveOutput) -> PyResult<PyObject> {
    let np = py.import("numpy")?;
    let info = PyDict::new(py);
    for (name, value) in output.info.fields() {
        match value {
            InfoValue::Number(number) => info.set_item(name, number)?,
            InfoValue::Text(text) => info.set_item(name, text)?,
        }
    }
    let x = np.call_method1("array", (output.x,))?;
    let y = np.call_method1("array", (output.y,))?;
    let s = np.call_method1("array", (output.s,))?;
    let tuple = PyTuple::new(py, [x, y, s, info.into_any()])?;
    Ok(tuple.into_any().unbind())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(dims: Vec<usize>, data: Vec<f64>) -> OwnedValue {
        OwnedValue::Dense { dims, data }
    }

    #[test]
    fn test_nested_struct_keeps_field_order_and_kinds() {
        let value = OwnedValue::Struct(vec![
            ("b".to_string(), dense(vec![2, 1], vec![1.0, 2.0])),
            (
                "inner".to_string(),
                OwnedValue::Struct(vec![("name".to_string(), OwnedValue::Text("log.csv".into()))]),
            ),
        ]);
        let host = value.as_host().unwrap();
        let fields = host.as_struct().unwrap();
        assert_eq!(fields.field_names().collect::<Vec<_>>(), vec!["b", "inner"]);
        let b = fields.get("b").unwrap().as_dense().unwrap();
        assert_eq!(b.dims(), &[2, 1]);
        assert_eq!(b.data(), &[1.0, 2.0]);
        let inner = fields.get("inner").unwrap().as_struct().unwrap();
        assert_eq!(inner.get("name").unwrap().as_text(), Some("log.csv"));
    }

    #[test]
    fn test_text_is_borrowed_unchanged() {
        let value = OwnedValue::Text("out.dat".to_string());
        assert_eq!(value.as_host().unwrap().as_text(), Some("out.dat"));
    }

    #[test]
    fn test_dense_with_wrong_element_count_is_invalid_input() {
        let err = dense(vec![2, 2], vec![1.0, 2.0, 3.0]).as_host().unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn test_sparse_with_bad_column_pointers_is_invalid_input() {
        // Pointers must start at 0.
        let value = OwnedValue::Sparse {
            nrows: 2,
            ncols: 1,
            col_ptrs: vec![1, 2],
            row_indices: vec![0, 1],
            values: vec![1.0, 1.0],
        };
        assert_eq!(value.as_host().unwrap_err().code(), "INVALID_INPUT");

        // One pointer per column plus one.
        let value = OwnedValue::Sparse {
            nrows: 2,
            ncols: 2,
            col_ptrs: vec![0, 2],
            row_indices: vec![0, 1],
            values: vec![1.0, 1.0],
        };
        assert_eq!(value.as_host().unwrap_err().code(), "INVALID_INPUT");
    }

    #[test]
    fn test_error_inside_nested_struct_propagates() {
        let value = OwnedValue::Struct(vec![(
            "A".to_string(),
            dense(vec![3], vec![1.0]),
        )]);
        assert_eq!(value.as_host().unwrap_err().code(), "INVALID_INPUT");
    }

    #[test]
    fn test_zero_dimensional_array_is_one_element() {
        match dense_value(Vec::new(), vec![4.0]) {
            OwnedValue::Dense { dims, data } => {
                assert_eq!(dims, vec![1]);
                assert_eq!(data, vec![4.0]);
            }
            other => panic!("expected dense, got {other:?}"),
        }
        assert!(matches!(
            dense_value(vec![3, 1], vec![0.0; 3]),
            OwnedValue::Dense { dims, .. } if dims == vec![3, 1]
        ));
    }

    #[test]
    fn test_negative_index_is_reported() {
        assert_eq!(checked_indices(vec![0, 2, 5]), Ok(vec![0, 2, 5]));
        assert_eq!(checked_indices(vec![0, -1, -7]), Err(-1));
    }

    #[test]
    fn test_missing_argument_is_not_a_struct() {
        let placeholder = empty_array();
        let host = placeholder.as_host().unwrap();
        assert!(host.as_struct().is_none());
        assert!(host.is_empty());
    }
}
