//! Error type shared by every primitive in the crate.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TeeError>;

#[derive(Error, Debug)]
pub enum TeeError {
    /// The encoding name did not match any supported character set.
    #[error("unknown or unsupported encoding name: {name:?}")]
    Encoding { name: String },
    /// The content could not be produced.
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[source] io::Error),
    /// The destination could not be opened or written to.
    #[error("sink unavailable: {0}")]
    SinkUnavailable(#[source] io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TeeError {
    /// Unknown encoding name error
    pub fn encoding(name: impl Into<String>) -> Self {
        Self::Encoding { name: name.into() }
    }

    /// The I/O error kind this error maps to when it crosses a [`std::io::Read`] boundary.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::SourceUnavailable(e) | Self::SinkUnavailable(e) => e.kind(),
            Self::Encoding { .. } | Self::Config(_) => io::ErrorKind::InvalidInput,
        }
    }
}

impl From<TeeError> for io::Error {
    fn from(err: TeeError) -> Self {
        io::Error::new(err.kind(), err)
    }
}

/// Recovers a [`TeeError`] that was carried through an [`io::Error`].
///
/// Errors that did not originate in this crate are treated as a failure to
/// produce the content.
impl From<io::Error> for TeeError {
    fn from(err: io::Error) -> Self {
        match err.downcast::<TeeError>() {
            Ok(tee) => tee,
            Err(err) => Self::SourceUnavailable(err),
        }
    }
}

impl From<serde_json::Error> for TeeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
