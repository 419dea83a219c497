//! Structured ScsBridgeError exception hierarchy.
//!
//! `ScsBridgeError` is the base class; each error code of the bridge has its
//! own subclass, registered on the module and as a class attribute on the
//! base (so `except ScsBridgeError.SHAPE_MISMATCH` works).

use bridge::BridgeError;
use pyo3::exceptions::PyException;
use pyo3::prelude::*;

pyo3::create_exception!(
    scs_bridge,
    ScsBridgeError,
    PyException,
    "Base exception for all bridge errors."
);

pyo3::create_exception!(
    scs_bridge,
    UsageError,
    ScsBridgeError,
    "Wrong number of inputs or outputs."
);
pyo3::create_exception!(
    scs_bridge,
    InvalidInputError,
    ScsBridgeError,
    "Problem data, cone or settings are malformed."
);
pyo3::create_exception!(
    scs_bridge,
    ShapeMismatchError,
    ScsBridgeError,
    "Box cone bounds bl and bu differ in shape."
);
pyo3::create_exception!(
    scs_bridge,
    StringConversionError,
    ScsBridgeError,
    "A settings string could not be converted."
);

/// Convert a `BridgeError` into the matching ScsBridgeError subclass.
pub fn bridge_error_to_py(e: BridgeError) -> PyErr {
    let msg = e.to_string();
    match e {
        BridgeError::Usage(_) => UsageError::new_err(msg),
        BridgeError::NotAStruct { .. }
        | BridgeError::MissingField { .. }
        | BridgeError::NotSparse { .. }
        | BridgeError::NotDense { .. }
        | BridgeError::DimensionMismatch { .. }
        | BridgeError::MalformedArray { .. } => InvalidInputError::new_err(msg),
        BridgeError::ShapeMismatch { .. } => ShapeMismatchError::new_err(msg),
        BridgeError::StringConversion { .. } => StringConversionError::new_err(msg),
    }
}

/// Register ScsBridgeError and its subclasses on the module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    let base = py.get_type::<ScsBridgeError>();
    m.add("ScsBridgeError", &base)?;

    let subclasses = [
        ("USAGE", "UsageError", py.get_type::<UsageError>()),
        (
            "INVALID_INPUT",
            "InvalidInputError",
            py.get_type::<InvalidInputError>(),
        ),
        (
            "SHAPE_MISMATCH",
            "ShapeMismatchError",
            py.get_type::<ShapeMismatchError>(),
        ),
        (
            "STRING_CONVERSION",
            "StringConversionError",
            py.get_type::<StringConversionError>(),
        ),
    ];
    for (code, name, class) in subclasses {
        m.add(name, &class)?;
        base.setattr(code, &class)?;
    }
    Ok(())
}
