//! Python bindings for the SCS host bridge using PyO3
//!
//! `solve(data, cone, settings)` takes dicts of numpy-compatible arrays and
//! scipy-style sparse matrices and returns `(x, y, s, info)`.

mod convert;
mod errors;
mod logging;

use pyo3::prelude::*;
use pyo3::types::PyTuple;

use bridge::{BridgeError, SolveOutput};
use convert::OwnedValue;
use errors::bridge_error_to_py;

pub(crate) type PyObject = Py<PyAny>;

/// Runs one bridge call over converted arguments. The argument count is
/// checked by the bridge, not here.
fn run(arguments: &[OwnedValue]) -> Result<SolveOutput, BridgeError> {
    let inputs = arguments
        .iter()
        .map(OwnedValue::as_host)
        .collect::<Result<Vec<_>, _>>()?;
    bridge::configured_bridge().call(&inputs, bridge::MAX_OUTPUTS)
}

/// Solve a conic problem.
///
/// Takes exactly three dicts: `data` holds `A` (sparse), optional `P`
/// (sparse), `b`, `c` and optional warm-start vectors `x`, `y`, `s`; `cone`
/// and `settings` hold the SCS cone and settings fields. Any other argument
/// count raises `UsageError`. Recoverable input problems are reported as
/// Python warnings.
#[pyfunction]
#[pyo3(signature = (*args), text_signature = "(data, cone, settings)")]
fn solve(py: Python<'_>, args: &Bound<'_, PyTuple>) -> PyResult<PyObject> {
    let arguments = args
        .iter()
        .map(|arg| convert::argument(&arg))
        .collect::<PyResult<Vec<_>>>()?;
    let output = run(&arguments).map_err(bridge_error_to_py)?;

    if !output.diagnostics.is_empty() {
        let warnings = py.import("warnings")?;
        for diagnostic in &output.diagnostics {
            warnings.call_method1("warn", (format!("[{}] {}", diagnostic.code(), diagnostic),))?;
        }
    }
    convert::output_to_py(py, output)
}

#[pymodule]
fn scs_bridge(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(pyo3::wrap_pyfunction!(solve, m)?)?;
    m.add("INFO_FIELDS", bridge::INFO_FIELDS.to_vec())?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    errors::register(m)?;
    logging::register(m)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_struct() -> OwnedValue {
        OwnedValue::Struct(Vec::new())
    }

    #[test]
    fn test_two_arguments_is_a_usage_error() {
        let err = run(&[empty_struct(), empty_struct()]).unwrap_err();
        assert_eq!(err.code(), "USAGE");
    }

    #[test]
    fn test_four_arguments_is_a_usage_error() {
        let arguments = vec![empty_struct(); 4];
        assert_eq!(run(&arguments).unwrap_err().code(), "USAGE");
    }

    #[test]
    fn test_three_arguments_reach_validation() {
        // Count is accepted; the empty data struct then fails on `A`.
        let err = run(&[empty_struct(), empty_struct(), empty_struct()]).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(matches!(err, BridgeError::MissingField { .. }));
    }

    #[test]
    fn test_malformed_array_fails_before_the_bridge_runs() {
        let bad = OwnedValue::Dense {
            dims: vec![2],
            data: vec![1.0],
        };
        let err = run(&[bad, empty_struct(), empty_struct()]).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedArray { .. }));
    }
}
