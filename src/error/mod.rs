//! Errors of the binning pipeline.

/// An error raised by precondition validation, before any pass launches.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation Error: {0} should be {1}")]
    Validation(String, String),
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(
        item: impl Into<String>,
        expectation: impl Into<String>,
    ) -> Self {
        Self::Validation(item.into(), expectation.into())
    }
}
