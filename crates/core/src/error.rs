//! Error types for the puddle simulation core.

use thiserror::Error;

/// Errors produced by puddle operations.
///
/// Out-of-grid coordinates are not errors: the grid boundary is a
/// normal condition for pointer and ambient input and is handled as a no-op.
#[derive(Debug, Error)]
pub enum PuddleError {
    /// The bound surface could not report positive, finite dimensions.
    #[error("invalid surface: {width}x{height} must be positive and finite")]
    InvalidSurface { width: f64, height: f64 },

    /// Rows or cols were zero, or `rows * cols` overflowed.
    #[error("invalid dimensions: rows and cols must be non-zero")]
    InvalidDimensions,

    /// A configuration value was outside its accepted range.
    #[error("invalid config '{name}': {reason}")]
    InvalidConfig { name: String, reason: String },

    /// A glyph palette could not be constructed.
    #[error("invalid shade palette: {0}")]
    InvalidPalette(String),

    /// The preference store rejected a read or write.
    #[error("preference store error: {0}")]
    Preference(String),

    /// Filesystem failure.
    #[error("i/o error: {0}")]
    Io(String),
}

impl PuddleError {
    /// Shorthand for [`PuddleError::InvalidConfig`].
    pub fn config(name: &str, reason: impl Into<String>) -> Self {
        PuddleError::InvalidConfig {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
