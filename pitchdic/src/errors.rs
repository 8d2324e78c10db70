//! Definition of errors.

use std::error::Error;
use std::fmt;

/// A specialized Result type for pitchdic.
pub type Result<T, E = PitchdicError> = std::result::Result<T, E>;

/// The error type for pitchdic.
///
/// Lookups on [`LexicalStore`](crate::store::LexicalStore) never surface these;
/// they are returned only by the explicit build and load APIs.
#[derive(Debug, thiserror::Error)]
pub enum PitchdicError {
    /// The error variant for [`InvalidArgumentError`].
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// The error variant for [`InvalidFormatError`].
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// The error variant for [`InvalidStateError`].
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// The error variant for [`std::io::Error`].
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The error variant for [`serde_json::Error`].
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The error variant for [`roxmltree::Error`].
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),

    /// The error variant for [`rkyv::rancor::Error`].
    #[error(transparent)]
    Rkyv(#[from] rkyv::rancor::Error),

    /// The error variant for [`tempfile::PersistError`].
    #[error(transparent)]
    Persist(#[from] tempfile::PersistError),
}

impl PitchdicError {
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }
}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when the input format is invalid.
#[derive(Debug)]
pub struct InvalidFormatError {
    /// Name of the format.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// Error used when the state is invalid.
#[derive(Debug)]
pub struct InvalidStateError {
    /// Error message.
    pub(crate) msg: String,

    /// Underlying cause of the error.
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}
