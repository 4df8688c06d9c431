// In: src/error.rs

//! This module defines the single, unified error type for the entire schemaferry library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

use crate::validation::Diagnostic;

#[derive(Error, Debug)]
pub enum FerryError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    /// Caller-supplied features do not match the dataset schema. Carries every
    /// diagnostic, never just the first one.
    #[error("Invalid feature selection: {}", crate::validation::join_diagnostics(.diagnostics))]
    Argument { diagnostics: Vec<Diagnostic> },

    #[error("Schema side-file is corrupt: {0}")]
    SchemaCorruption(String),

    #[error("Column count mismatch: schema side-file lists {expected} columns, data artifact has {found}")]
    ColumnCountMismatch { expected: usize, found: usize },

    #[error("Write conflict: {0}")]
    WriteConflict(String),

    #[error("Column names collide on '{name}' after sanitization: {columns:?}")]
    NameCollision { name: String, columns: Vec<String> },

    #[error("Invalid numeric vector: {0}")]
    InvalidVector(String),

    #[error("Column name '{name}' is not legal in {format}")]
    InvalidColumnName { format: &'static str, name: String },

    #[error("Invalid write option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    #[error("Unsupported data type for this operation: {0}")]
    UnsupportedType(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error originating from the Parquet reader or writer.
    #[error("Parquet operation failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// An error originating from the underlying I/O subsystem (e.g., file not found, permissions).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while writing the schema side-file.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
