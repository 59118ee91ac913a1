//! Error types for reading and writing the location tables.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to access one of the backing tables.
///
/// The query path never surfaces this to its callers; [`crate::store::LocationService`]
/// logs it and answers with an empty result instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode table {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode table {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A coordinate list that is neither a point nor a segment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("expected 2 or 4 coordinate values, got {0}")]
    Arity(usize),

    #[error("coordinate value is not finite")]
    NonFinite,
}
