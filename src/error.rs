//! The public error type returned by commands.
//!
//! Internally the crate passes around `anyhow::Error` with context attached. At the command
//! boundary those are converted, with `IntoResult::pub_result`, into an `Error` that also carries
//! an `ErrorType` so that callers can tell what kind of thing went wrong.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Internal result type.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// Public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of a failure.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The configuration or home directory is missing or invalid.
    Config,
    /// Reading from or writing to the key-value store failed.
    Storage,
    /// The OAuth flow could not be completed.
    Auth,
    /// An HTTP request (e.g. the profile lookup) failed.
    Request,
    /// User input was rejected.
    Validation,
    /// Something that should not happen.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The error returned from public functions.
pub struct Error {
    error_type: ErrorType,
    source: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, source: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            source: source.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.source)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The alternate format prints the whole context chain.
        write!(f, "{} error: {:#}", self.error_type, self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Converts an internal result into a public one.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_keeps_type_and_context() {
        let res: Res<()> = Err(anyhow::anyhow!("disk on fire")).context("Unable to save");
        let err = res.pub_result(ErrorType::Storage).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Storage);
        let message = err.to_string();
        assert!(message.starts_with("storage error"));
        assert!(message.contains("Unable to save"));
        assert!(message.contains("disk on fire"));
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Validation.to_string(), "validation");
    }
}
