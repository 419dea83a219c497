//! Logging and diagnostics functions.

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::env;
use std::fs::{File, OpenOptions};
use std::io;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::PyObject;

fn open_log_file(path: &str) -> PyResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| PyRuntimeError::new_err(format!("Failed to open log file: {err}")))
}

enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_env() -> PyResult<Self> {
        match env::var("SCS_BRIDGE_LOG_FORMAT") {
            Err(_) => Ok(LogFormat::Pretty),
            Ok(value) if value.eq_ignore_ascii_case("pretty") => Ok(LogFormat::Pretty),
            Ok(value) if value.eq_ignore_ascii_case("json") => Ok(LogFormat::Json),
            Ok(_) => Err(PyRuntimeError::new_err(
                "Invalid SCS_BRIDGE_LOG_FORMAT (expected 'json' or 'pretty')",
            )),
        }
    }
}

fn map_init_err<E: std::fmt::Display>(err: E) -> PyErr {
    PyRuntimeError::new_err(format!("Failed to initialize logging: {err}"))
}

/// Enable structured logging for the bridge.
///
/// When `level` is None, this reads `SCS_BRIDGE_TRACE` if set and defaults to
/// `off` otherwise. `SCS_BRIDGE_LOG_FORMAT` picks `pretty` or `json`, and
/// `SCS_BRIDGE_LOG_FILE` adds a file sink. Returns True when logging is
/// initialized, False if a subscriber is already configured.
#[pyfunction]
#[pyo3(signature = (*, level=None))]
pub fn enable_logging(level: Option<String>) -> PyResult<bool> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level_value = level
        .or_else(|| env::var("SCS_BRIDGE_TRACE").ok())
        .unwrap_or_else(|| "off".to_string());

    let filter = if level_value.eq_ignore_ascii_case("off") {
        EnvFilter::default().add_directive(LevelFilter::OFF.into())
    } else {
        EnvFilter::try_new(&level_value)
            .map_err(|err| PyRuntimeError::new_err(format!("Invalid log filter: {err}")))?
    };

    let format = LogFormat::from_env()?;
    let file = env::var("SCS_BRIDGE_LOG_FILE")
        .ok()
        .as_deref()
        .map(open_log_file)
        .transpose()?;
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().with_writer(io::stderr).json())
            .with(file.map(|file| fmt::layer().with_writer(file).with_ansi(false).json()))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(io::stderr).pretty())
            .with(file.map(|file| fmt::layer().with_writer(file).with_ansi(false).pretty()))
            .try_init(),
    }
    .map_err(map_init_err)?;

    Ok(true)
}

/// Return engine metadata and the solver widths of this build.
#[pyfunction]
pub fn solver_info(py: Python<'_>) -> PyResult<PyObject> {
    let info = bridge::solver_info();
    let dict = PyDict::new(py);
    dict.set_item("solver", info.engine)?;
    match info.version {
        Some(version) => dict.set_item("version", version)?,
        None => dict.set_item("version", py.None())?,
    }
    dict.set_item("index_width", info.index_width)?;
    dict.set_item("float_width", info.float_width)?;
    Ok(dict.unbind().into())
}

/// Register logging functions with the Python module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(pyo3::wrap_pyfunction!(enable_logging, m)?)?;
    m.add_function(pyo3::wrap_pyfunction!(solver_info, m)?)?;
    Ok(())
}
