//! Fatal errors and recoverable diagnostics raised while marshalling.

use std::fmt;

use tracing::warn;

/// Fatal error: the call is abandoned before the solver runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// Wrong number of inputs or outputs.
    Usage(String),
    /// An argument that must be a struct is something else.
    NotAStruct { argument: &'static str },
    /// A required field is absent.
    MissingField { field: &'static str },
    /// A field that must be sparse is dense, text or a struct.
    NotSparse { field: &'static str },
    /// A field that must be a dense numeric array is something else.
    NotDense { field: &'static str },
    /// A matrix does not have the shape implied by `b` and `c`.
    DimensionMismatch {
        field: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// A host array violates its own layout invariants.
    MalformedArray { reason: String },
    /// Box cone bounds `bl` and `bu` differ in shape.
    ShapeMismatch { lower: Vec<usize>, upper: Vec<usize> },
    /// A settings string could not be converted to a C string.
    StringConversion { field: &'static str },
}

impl BridgeError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Usage(_) => "USAGE",
            BridgeError::NotAStruct { .. }
            | BridgeError::MissingField { .. }
            | BridgeError::NotSparse { .. }
            | BridgeError::NotDense { .. }
            | BridgeError::DimensionMismatch { .. }
            | BridgeError::MalformedArray { .. } => "INVALID_INPUT",
            BridgeError::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            BridgeError::StringConversion { .. } => "STRING_CONVERSION",
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        BridgeError::MalformedArray {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Usage(msg) => write!(f, "[{}] {}", self.code(), msg),
            BridgeError::NotAStruct { argument } => {
                write!(f, "[{}] {} argument must be a struct", self.code(), argument)
            }
            BridgeError::MissingField { field } => write!(
                f,
                "[{}] Data struct must contain a `{}` entry",
                self.code(),
                field
            ),
            BridgeError::NotSparse { field } => write!(
                f,
                "[{}] Input matrix {} must be in sparse format",
                self.code(),
                field
            ),
            BridgeError::NotDense { field } => {
                write!(f, "[{}] {} must be a dense numeric array", self.code(), field)
            }
            BridgeError::DimensionMismatch {
                field,
                expected,
                got,
            } => write!(
                f,
                "[{}] {} must be {}x{}, got {}x{}",
                self.code(),
                field,
                expected.0,
                expected.1,
                got.0,
                got.1
            ),
            BridgeError::MalformedArray { reason } => {
                write!(f, "[{}] Malformed host array: {}", self.code(), reason)
            }
            BridgeError::ShapeMismatch { lower, upper } => write!(
                f,
                "[{}] bl,bu cone entries not the same size ({:?} vs {:?})",
                self.code(),
                lower,
                upper
            ),
            BridgeError::StringConversion { field } => {
                write!(f, "[{}] error converting {} to string", self.code(), field)
            }
        }
    }
}

impl std::error::Error for BridgeError {}

/// Result type used throughout the bridge.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Recoverable condition. The call proceeds; the host is told what happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The legacy `f` cone field was used.
    LegacyZeroCone,
    /// A warm-start vector was present but unusable; that component starts cold.
    WarmStartRejected { vector: &'static str, expected: usize },
    /// Only one of `bl` and `bu` was supplied, so no box cone is formed.
    PartialBoxCone { present: &'static str },
    /// A numeric setting was empty or not numeric and kept its default.
    SettingIgnored { field: &'static str },
}

impl Diagnostic {
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::LegacyZeroCone => "DEPRECATED_FIELD",
            Diagnostic::WarmStartRejected { .. } => "WARM_START_REJECTED",
            Diagnostic::PartialBoxCone { .. } => "BOX_CONE_INCOMPLETE",
            Diagnostic::SettingIgnored { .. } => "SETTING_IGNORED",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::LegacyZeroCone => write!(
                f,
                "The `f` field of the cone is deprecated, use `z` instead"
            ),
            Diagnostic::WarmStartRejected { vector, expected } => write!(
                f,
                "warm start parsing error: {vector} must be a dense vector of length {expected}, \
                 running without full warm-start"
            ),
            Diagnostic::PartialBoxCone { present } => write!(
                f,
                "box cone needs both bl and bu, only {present} given; box cone ignored"
            ),
            Diagnostic::SettingIgnored { field } => {
                write!(f, "setting {field} is not a numeric scalar, keeping default")
            }
        }
    }
}

/// Collects diagnostics for the host and logs each one as it arrives.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!(
            component = "bridge",
            code = diagnostic.code(),
            "{}",
            diagnostic
        );
        self.items.push(diagnostic);
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(BridgeError::Usage("x".to_string()).code(), "USAGE");
        assert_eq!(BridgeError::NotSparse { field: "A" }.code(), "INVALID_INPUT");
        assert_eq!(
            BridgeError::ShapeMismatch {
                lower: vec![3, 1],
                upper: vec![2, 1]
            }
            .code(),
            "SHAPE_MISMATCH"
        );
        assert_eq!(
            BridgeError::StringConversion { field: "log_csv_filename" }.code(),
            "STRING_CONVERSION"
        );
    }

    #[test]
    fn test_error_display_carries_code() {
        let msg = BridgeError::MissingField { field: "A" }.to_string();
        assert!(msg.starts_with("[INVALID_INPUT]"));
        assert!(msg.contains("`A`"));

        let msg = BridgeError::ShapeMismatch {
            lower: vec![3, 1],
            upper: vec![2, 1],
        }
        .to_string();
        assert!(msg.contains("bl,bu cone entries not the same size"));

        let msg = BridgeError::StringConversion {
            field: "write_data_filename",
        }
        .to_string();
        assert!(msg.contains("error converting write_data_filename to string"));
    }

    #[test]
    fn test_diagnostics_keep_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::LegacyZeroCone);
        diagnostics.push(Diagnostic::WarmStartRejected {
            vector: "y",
            expected: 3,
        });
        let items = diagnostics.into_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].code(), "DEPRECATED_FIELD");
        assert!(items[1].to_string().contains("running without full warm-start"));
    }
}
