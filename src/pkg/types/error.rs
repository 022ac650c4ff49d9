//! Custom error types for the vita-pkginfo crate.

use thiserror::Error;

/// The primary error type for the package decoders.
#[derive(Debug, Error)]
pub enum PkgError {
    /// A signature at offset 0 did not match.
    #[error("Bad {structure} magic: found {found:02x?}")]
    BadMagic {
        structure: &'static str,
        found: Vec<u8>,
    },

    /// A declared offset or size points past the end of the available bytes.
    ///
    /// Usually means the header fetch returned fewer bytes than the package
    /// layout needs.
    #[error("Truncated input while reading {context}: need {needed} bytes, have {available}")]
    TruncatedInput {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    /// The header carries a content type this crate does not classify.
    ///
    /// Unlike the structural variants the header itself was well formed, so
    /// callers may choose to skip the package instead of aborting.
    #[error("Unsupported content type: {code:#x}")]
    UnsupportedContentType { code: u32 },

    /// The file is structurally invalid in a way not covered above.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl PkgError {
    pub(crate) fn truncated(context: &'static str, needed: usize, available: usize) -> Self {
        Self::TruncatedInput { context, needed, available }
    }

    /// True for failures that leave the package structurally intact.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnsupportedContentType { .. })
    }
}

/// A single `param.sfo` field that could not be decoded.
///
/// Field errors never abort a parse. They are logged and collected in
/// [`PackageMetadata::issues`](super::models::PackageMetadata::issues).
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    /// The key or value bytes are not valid UTF-8.
    #[error("Field {key} is not valid UTF-8")]
    Decode { key: String },

    /// A version field does not hold a decimal number.
    #[error("Field {key} has non-numeric value {value:?}")]
    InvalidNumeric { key: String, value: String },
}

/// Errors raised while retrieving header bytes.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with an error status.
    #[error("HTTP {status}: {url}")]
    Http { status: u16, url: String },

    /// A non-transient network failure.
    #[error(transparent)]
    Network(#[from] Box<ureq::Error>),

    /// Every attempt failed with a transient error.
    #[error("Giving up on {url} after {attempts} attempts: {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<ureq::Error>,
    },

    /// An error originating from local I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` type alias using the crate's `PkgError` type.
pub type Result<T> = std::result::Result<T, PkgError>;
