//! Settings: engine defaults with host overrides on top.

use std::ffi::c_char;
use std::ptr;

use scs_abi::{FloatWidth, IndexWidth, ScsSettings};
use tracing::debug;

use crate::error::{BridgeError, Diagnostic, Diagnostics, Result};
use crate::host::{HostStruct, HostValue};
use crate::ownership::{BufferRecord, OwnedBuf, TrackedBuffers};

/// Settings the host may override. `warm_start` is not among them; it is
/// derived from the warm-start vectors.
pub const SETTINGS_FIELDS: [&str; 15] = [
    "alpha",
    "rho_x",
    "max_iters",
    "scale",
    "eps_abs",
    "eps_rel",
    "eps_infeas",
    "verbose",
    "normalize",
    "acceleration_lookback",
    "acceleration_interval",
    "adaptive_scale",
    "time_limit_secs",
    "write_data_filename",
    "log_csv_filename",
];

/// Settings record plus the file name buffers it points at.
#[derive(Debug)]
pub struct MarshalledSettings<I, F> {
    values: ScsSettings<I, F>,
    write_data_filename: Option<OwnedBuf<u8>>,
    log_csv_filename: Option<OwnedBuf<u8>>,
}

impl<I: IndexWidth, F: FloatWidth> MarshalledSettings<I, F> {
    /// Numeric settings. File name pointers are always null here; see
    /// [`MarshalledSettings::to_raw`].
    pub fn values(&self) -> &ScsSettings<I, F> {
        &self.values
    }

    pub fn write_data_filename(&self) -> Option<&str> {
        self.write_data_filename.as_ref().and_then(c_str)
    }

    pub fn log_csv_filename(&self) -> Option<&str> {
        self.log_csv_filename.as_ref().and_then(c_str)
    }

    /// Raw record for one solve, with the file names attached and the
    /// warm-start flag set.
    pub fn to_raw(&self, warm_start: bool) -> ScsSettings<I, F> {
        let mut raw = self.values;
        raw.warm_start = I::from_usize(usize::from(warm_start));
        raw.write_data_filename = c_ptr(self.write_data_filename.as_ref());
        raw.log_csv_filename = c_ptr(self.log_csv_filename.as_ref());
        raw
    }
}

impl<I, F> TrackedBuffers for MarshalledSettings<I, F> {
    fn buffer_records(&self) -> Vec<BufferRecord> {
        let mut records = Vec::new();
        if let Some(buf) = &self.write_data_filename {
            records.push(BufferRecord::owned("settings.write_data_filename", buf));
        }
        if let Some(buf) = &self.log_csv_filename {
            records.push(BufferRecord::owned("settings.log_csv_filename", buf));
        }
        records
    }
}

fn c_ptr(buf: Option<&OwnedBuf<u8>>) -> *const c_char {
    buf.map_or(ptr::null(), |buf| buf.as_ptr().cast::<c_char>())
}

fn c_str(buf: &OwnedBuf<u8>) -> Option<&str> {
    let bytes = buf.as_slice();
    std::str::from_utf8(&bytes[..bytes.len().saturating_sub(1)]).ok()
}

/// Copies host text into a zeroed buffer one byte longer than the text.
/// The buffer is reserved first and released again if the value cannot be
/// represented as a C string.
fn owned_c_string(value: &HostValue<'_>, field: &'static str) -> Result<OwnedBuf<u8>> {
    let len = match value {
        HostValue::Text(text) => text.len(),
        HostValue::Dense(array) => array.data().len(),
        _ => 0,
    };
    let mut buffer = OwnedBuf::<u8>::zeroed(len + 1);
    let Some(text) = value.as_text() else {
        return Err(BridgeError::StringConversion { field });
    };
    if text.bytes().any(|byte| byte == 0) {
        return Err(BridgeError::StringConversion { field });
    }
    buffer.as_mut_slice()[..len].copy_from_slice(text.as_bytes());
    Ok(buffer)
}

fn override_float<F: FloatWidth>(
    host: &HostStruct<'_>,
    field: &'static str,
    slot: &mut F,
    diagnostics: &mut Diagnostics,
) {
    let Some(value) = host.get(field) else {
        return;
    };
    match value.scalar() {
        Some(number) => *slot = F::from_f64(number),
        None => diagnostics.push(Diagnostic::SettingIgnored { field }),
    }
}

fn override_int<I: IndexWidth>(
    host: &HostStruct<'_>,
    field: &'static str,
    slot: &mut I,
    diagnostics: &mut Diagnostics,
) {
    let Some(value) = host.get(field) else {
        return;
    };
    match value.scalar() {
        Some(number) => *slot = I::from_f64(number),
        None => diagnostics.push(Diagnostic::SettingIgnored { field }),
    }
}

fn override_string(host: &HostStruct<'_>, field: &'static str) -> Result<Option<OwnedBuf<u8>>> {
    host.get(field)
        .map(|value| owned_c_string(value, field))
        .transpose()
}

/// Applies the host's overrides to `defaults`, field by field. Fields the
/// host does not supply keep their default.
pub fn apply_overrides<I: IndexWidth, F: FloatWidth>(
    defaults: ScsSettings<I, F>,
    host: &HostStruct<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<MarshalledSettings<I, F>> {
    let mut values = defaults;
    values.write_data_filename = ptr::null();
    values.log_csv_filename = ptr::null();

    override_float(host, "alpha", &mut values.alpha, diagnostics);
    override_float(host, "rho_x", &mut values.rho_x, diagnostics);
    override_int(host, "max_iters", &mut values.max_iters, diagnostics);
    override_float(host, "scale", &mut values.scale, diagnostics);
    override_float(host, "eps_abs", &mut values.eps_abs, diagnostics);
    override_float(host, "eps_rel", &mut values.eps_rel, diagnostics);
    override_float(host, "eps_infeas", &mut values.eps_infeas, diagnostics);
    override_int(host, "verbose", &mut values.verbose, diagnostics);
    override_int(host, "normalize", &mut values.normalize, diagnostics);
    override_int(
        host,
        "acceleration_lookback",
        &mut values.acceleration_lookback,
        diagnostics,
    );
    override_int(
        host,
        "acceleration_interval",
        &mut values.acceleration_interval,
        diagnostics,
    );
    override_int(host, "adaptive_scale", &mut values.adaptive_scale, diagnostics);
    override_float(host, "time_limit_secs", &mut values.time_limit_secs, diagnostics);

    let write_data_filename = override_string(host, "write_data_filename")?;
    let log_csv_filename = override_string(host, "log_csv_filename")?;

    for name in host.field_names() {
        if !SETTINGS_FIELDS.contains(&name) {
            debug!(
                component = "bridge",
                operation = "apply_settings",
                field = name,
                "Ignoring unrecognized settings field"
            );
        }
    }

    Ok(MarshalledSettings {
        values,
        write_data_filename,
        log_csv_filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DenseArray;
    use crate::ownership::ledger_snapshot;

    fn scalar(value: &f64) -> HostValue<'_> {
        DenseArray::column(std::slice::from_ref(value)).into()
    }

    #[test]
    fn test_absent_fields_keep_defaults() {
        let mut diagnostics = Diagnostics::new();
        let settings = apply_overrides(
            ScsSettings::<i32, f64>::scs_defaults(),
            &HostStruct::new(),
            &mut diagnostics,
        )
        .unwrap();
        let raw = settings.to_raw(false);
        assert_eq!(raw.max_iters, 100_000);
        assert_eq!(raw.eps_abs, 1e-4);
        assert_eq!(raw.warm_start, 0);
        assert!(raw.write_data_filename.is_null());
        assert!(settings.buffer_records().is_empty());
    }

    #[test]
    fn test_overrides_cast_to_target_width() {
        let max_iters = 250.7;
        let eps = 1e-9;
        let verbose = 0.0;
        let host = HostStruct::new()
            .with_field("max_iters", scalar(&max_iters))
            .with_field("eps_abs", scalar(&eps))
            .with_field("verbose", scalar(&verbose))
            .with_field("warm_start", scalar(&verbose));
        let mut diagnostics = Diagnostics::new();
        let settings = apply_overrides(
            ScsSettings::<i64, f32>::scs_defaults(),
            &host,
            &mut diagnostics,
        )
        .unwrap();
        let values = settings.values();
        assert_eq!(values.max_iters, 250);
        assert_eq!(values.eps_abs, 1e-9f32);
        assert_eq!(values.verbose, 0);
        assert_eq!(settings.to_raw(true).warm_start, 1);
    }

    #[test]
    fn test_file_names_are_nul_terminated_copies() {
        let host = HostStruct::new()
            .with_field("write_data_filename", HostValue::Text("dump.bin"))
            .with_field("log_csv_filename", HostValue::Text("log.csv"));
        let mut diagnostics = Diagnostics::new();
        let settings = apply_overrides(
            ScsSettings::<i32, f64>::scs_defaults(),
            &host,
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(settings.write_data_filename(), Some("dump.bin"));
        assert_eq!(settings.log_csv_filename(), Some("log.csv"));

        let raw = settings.to_raw(false);
        let owner = settings.write_data_filename.as_ref().unwrap();
        assert_eq!(raw.write_data_filename, owner.as_ptr().cast::<c_char>());
        assert_eq!(owner.as_slice(), b"dump.bin\0");
    }

    #[test]
    fn test_non_text_file_name_is_fatal_and_released() {
        let number = 3.0;
        let host = HostStruct::new().with_field("log_csv_filename", scalar(&number));
        let before = ledger_snapshot();
        let mut diagnostics = Diagnostics::new();
        let err = apply_overrides(
            ScsSettings::<i32, f64>::scs_defaults(),
            &host,
            &mut diagnostics,
        )
        .unwrap_err();
        assert_eq!(err, BridgeError::StringConversion { field: "log_csv_filename" });
        let delta = ledger_snapshot().since(&before);
        assert_eq!(delta.allocated, 1);
        assert_eq!(delta.outstanding(), 0);
    }

    #[test]
    fn test_interior_nul_is_fatal() {
        let host = HostStruct::new().with_field("write_data_filename", HostValue::Text("a\0b"));
        let mut diagnostics = Diagnostics::new();
        let err = apply_overrides(
            ScsSettings::<i32, f64>::scs_defaults(),
            &host,
            &mut diagnostics,
        )
        .unwrap_err();
        assert_eq!(err.code(), "STRING_CONVERSION");
    }

    #[test]
    fn test_empty_numeric_setting_is_ignored() {
        let host = HostStruct::new().with_field("alpha", DenseArray::column(&[]).into());
        let mut diagnostics = Diagnostics::new();
        let settings = apply_overrides(
            ScsSettings::<i32, f64>::scs_defaults(),
            &host,
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(settings.values().alpha, 1.5);
        assert_eq!(
            diagnostics.as_slice(),
            &[Diagnostic::SettingIgnored { field: "alpha" }]
        );
    }
}
