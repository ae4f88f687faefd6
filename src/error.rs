use thiserror::Error;

/// Top-level error type for draftsnap.
///
/// The resolution pipeline itself never fails; these errors surface from
/// settings validation, shape validation and coordinate diagnostics.
#[derive(Debug, Error)]
pub enum DraftsnapError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors describing malformed shape geometry.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("non-finite value in field `{field}`")]
    NonFinite { field: &'static str },

    #[error("negative dimension `{field}` = {value}")]
    NegativeDimension { field: &'static str, value: f64 },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to the shape store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("shape not found")]
    ShapeNotFound,
}

/// Errors raised when validating snap or tracking settings.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("{name} must be a positive finite number, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("polar increment must divide 360 degrees evenly, got {0}")]
    UnevenIncrement(f64),

    #[error("zoom must be a positive finite number, got {0}")]
    InvalidZoom(f64),
}

/// Reasons a piece of coordinate text was not understood.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("input is empty")]
    Empty,

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("relative input requires a base point")]
    MissingBasePoint,

    #[error("unrecognized coordinate form `{0}`")]
    Unrecognized(String),
}

/// Checks that a settings value is positive and finite.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> std::result::Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::NotPositive { name, value })
    }
}

/// Convenience type alias for results using [`DraftsnapError`].
pub type Result<T> = std::result::Result<T, DraftsnapError>;
