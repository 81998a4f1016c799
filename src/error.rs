//! Error types for bitmap transformations.

use thiserror::Error;

/// Error type for filter construction and application.
///
/// Every other input is clamped or normalised, so the only failure is an
/// argument that cannot be mapped onto anything meaningful.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Enumerated value outside its defined set, unresolvable colour
    /// resource, or a buffer that is not RGBA.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl FilterError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type for bitmap transformations.
pub type FilterResult<T> = Result<T, FilterError>;
