//! I/O error types for canopy-io.

use std::path::PathBuf;

use canopy_tree::TreeError;

/// Errors from reading model dumps and writing export documents.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a JSON file does not match the expected shape.
    #[error("JSON parse error in {path}")]
    JsonParse {
        /// Path to the JSON file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a model dump holds neither `tree` nor a non-empty `trees`, or both.
    #[error("invalid model dump {path}: {reason}")]
    InvalidModel {
        /// Path to the model dump.
        path: PathBuf,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// Returned when an export document holds neither layout, or parts of both.
    #[error("invalid export document {path}: {reason}")]
    InvalidDocument {
        /// Path to the document.
        path: PathBuf,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a CSV header lacks a required column.
    #[error("missing column \"{column}\" in {path}")]
    MissingColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// Name of the expected column.
        column: &'static str,
    },

    /// Returned when a node table has no class-count columns.
    #[error("no class columns in {path}: expected feature,threshold,impurity,<class>...")]
    NoClassColumns {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a feature cell is not an integer.
    #[error("invalid feature index in {path}: row {row_index}, raw value \"{raw}\"")]
    InvalidFeatureIndex {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a cell value is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Zero-based column index.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a node table does not form a valid encoding.
    #[error("invalid tree encoding in {path}")]
    InvalidEncoding {
        /// Path to the CSV file.
        path: PathBuf,
        /// Underlying encoding error.
        source: TreeError,
    },

    /// Returned when an output file name is empty or contains path separators.
    #[error("invalid output file name \"{name}\": must be a plain file name")]
    InvalidFileName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an export document cannot be rendered as JSON.
    #[error("cannot serialize document for {path}")]
    Serialize {
        /// Destination path of the document.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
