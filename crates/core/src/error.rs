//! Error types for the liquid-metal core.

use thiserror::Error;

/// Errors produced by scene construction and frame operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Lattice resolution was below 2 samples per axis, or the sample count overflowed.
    #[error("invalid dimensions: lattice resolution must be at least 2 and fit in memory")]
    InvalidDimensions,

    /// A configuration value was rejected before the frame loop started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A requested parameter name was not found in the params object.
    #[error("parameter not found: {0}")]
    ParamNotFound(String),

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// Two lattices had incompatible sample counts.
    #[error("dimension mismatch: resolution {lhs} vs {rhs}")]
    DimensionMismatch { lhs: usize, rhs: usize },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Writing a snapshot or export failed.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let err = EngineError::InvalidDimensions;
        let msg = format!("{err}");
        assert!(
            msg.contains("resolution"),
            "expected message mentioning resolution, got: {msg}"
        );
    }

    #[test]
    fn invalid_config_includes_reason() {
        let err = EngineError::InvalidConfig("strength must be positive".into());
        let msg = format!("{err}");
        assert!(msg.contains("strength"), "missing reason in: {msg}");
    }

    #[test]
    fn param_not_found_includes_name() {
        let err = EngineError::ParamNotFound("isolation".into());
        let msg = format!("{err}");
        assert!(
            msg.contains("isolation"),
            "expected message containing 'isolation', got: {msg}"
        );
    }

    #[test]
    fn param_type_mismatch_includes_all_fields() {
        let err = EngineError::ParamTypeMismatch {
            name: "resolution".into(),
            expected: "u64".into(),
            got: "string".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("resolution"), "missing param name in: {msg}");
        assert!(msg.contains("u64"), "missing expected type in: {msg}");
        assert!(msg.contains("string"), "missing got type in: {msg}");
    }

    #[test]
    fn dimension_mismatch_includes_both_resolutions() {
        let err = EngineError::DimensionMismatch { lhs: 32, rhs: 64 };
        let msg = format!("{err}");
        assert!(msg.contains("32"), "missing lhs in: {msg}");
        assert!(msg.contains("64"), "missing rhs in: {msg}");
    }

    #[test]
    fn invalid_color_includes_message() {
        let err = EngineError::InvalidColor("bad hex".into());
        let msg = format!("{err}");
        assert!(msg.contains("bad hex"), "missing message in: {msg}");
    }

    #[test]
    fn io_includes_message() {
        let err = EngineError::Io("disk full".into());
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
