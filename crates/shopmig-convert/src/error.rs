use std::path::PathBuf;

use thiserror::Error;

/// Fatal pipeline failures. Anything recoverable is a
/// [`crate::report::ReferenceWarning`] instead.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{table}: invalid Shift_JIS byte sequence at line {line} (byte offset {byte_offset})")]
    Decode {
        table: String,
        line: usize,
        byte_offset: usize,
    },

    #[error("{table}: malformed table at row {row}: {reason}")]
    Schema {
        table: String,
        row: usize,
        reason: String,
    },

    #[error("{table}: CSV parse error: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("category {category_id} has a cyclic parent chain: {}", chain.join(" -> "))]
    Cycle {
        category_id: String,
        chain: Vec<String>,
    },

    #[error("category {category_id} references missing parent {parent_id}")]
    DanglingReference {
        category_id: String,
        parent_id: String,
    },

    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}
