use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Error type covering the different failure cases that can occur when the
/// tool ingests a snapshot, repairs it, or emits the OFX document.
///
/// Every variant is fatal: the pipeline never produces a partial document,
/// so callers can treat any error as "no output was written".
#[derive(Debug, Error)]
pub enum ExportError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the snapshot XML cannot be tokenized.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a snapshot record lacks a required element.
    #[error("missing element <{0}> in snapshot record")]
    MissingElement(String),

    /// Raised when an element's text cannot be parsed as the expected type.
    #[error("invalid value {value:?} for element <{element}>")]
    InvalidValue { element: String, value: String },

    /// Raised when an account record carries a kind outside the recognized set.
    #[error("unknown account kind {0:?}")]
    UnknownAccountKind(String),

    /// Raised when a transaction record carries a type outside the recognized set.
    #[error("unknown transaction type {0:?}")]
    UnknownTransactionType(String),

    /// Raised when a transaction names an account id absent from the snapshot.
    #[error("transaction references unknown account {0}")]
    UnknownAccount(i64),

    /// Raised when the same transaction guid is presented twice.
    #[error("duplicate transaction guid {0:?}")]
    DuplicateGuid(String),

    /// Raised when one or more transfer references never found their match.
    /// Carries the guids still waiting for a partner, sorted.
    #[error("unresolved transfer references: {}", .0.join(", "))]
    UnresolvedTransfers(Vec<String>),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
