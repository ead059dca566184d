//! Error types for HITRAN line extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for registry lookups, extraction and export.
#[derive(Debug, Error)]
pub enum HitranError {
    /// Requested molecule has no entry in the registry.
    #[error("Molecule '{0}' is not defined in the rule registry")]
    UnknownMolecule(String),

    /// Molecule exists but the requested band does not.
    #[error("Band '{band}' is not defined for molecule '{molecule}'")]
    UnknownBand { molecule: String, band: String },

    /// Error opening or reading a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error reading from an already-open line source.
    #[error("Read error at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// A line passed the band filter but could not be converted into a row.
    #[error("Malformed line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    /// A rule record is inconsistent on its own (bad span, zero width, ...).
    #[error("Invalid rule {molecule}/{band}: {reason}")]
    InvalidRule {
        molecule: String,
        band: String,
        reason: String,
    },

    /// Output file extension not recognised.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the CSV writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error building Arrow arrays or batches.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error writing Parquet output.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl HitranError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HitranError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        HitranError::MalformedLine {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type alias for HITRAN operations.
pub type Result<T> = std::result::Result<T, HitranError>;
