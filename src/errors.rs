//! Error Types
//!
//! This module defines the error types used throughout the exporter.
//!
//! # Overview
//!
//! The main error type [`ExportError`] follows the failure taxonomy of the
//! export pipeline:
//! - Unsupported input: one attachment on one node cannot be exported
//! - Precondition violations: global settings make the whole export meaningless
//! - Encoding failures: a component field has no portable representation
//! - Finalize failures: one resource kind could not be written
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, ExportError>`.
//!
//! ```rust,ignore
//! use thirdroom_export::errors::{ExportError, Result};
//!
//! fn export_something() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the exporter.
#[derive(Error, Debug)]
pub enum ExportError {
    // ========================================================================
    // Per-node Errors
    // ========================================================================
    /// An attachment variant the exporter does not know how to write.
    #[error("Unsupported input on node '{node}': {what}")]
    UnsupportedInput {
        /// Name of the offending host node
        node: String,
        /// What could not be exported
        what: String,
    },

    /// A host node key that does not exist in the host scene.
    #[error("Unknown host node: {0}")]
    UnknownNode(String),

    // ========================================================================
    // Global Errors
    // ========================================================================
    /// Required global settings are absent or inconsistent.
    #[error("Export precondition failed: {0}")]
    Precondition(String),

    /// A session operation was called out of phase order.
    #[error("Invalid export session state: {0}")]
    SessionState(String),

    // ========================================================================
    // Encoding Errors
    // ========================================================================
    /// A component field type is absent from the portable type table.
    #[error("Unsupported field type `{type_name}` for field `{field}` of component `{component}`")]
    UnsupportedFieldType {
        component: String,
        field: String,
        type_name: String,
    },

    /// A component field value could not be encoded.
    #[error("Failed to encode field `{field}` of component `{component}`: {reason}")]
    Encoding {
        component: String,
        field: String,
        reason: String,
    },

    // ========================================================================
    // Finalize Errors
    // ========================================================================
    /// One extension failed while writing its finalized arrays.
    #[error("Extension {extension} failed to finalize: {source}")]
    Finalize {
        extension: &'static str,
        #[source]
        source: Box<ExportError>,
    },

    /// At least one extension failed to finalize; the document is incomplete.
    #[error("Export finished with {} failed extension(s)", .0.len())]
    FinalizeFailed(Vec<ExportError>),

    // ========================================================================
    // Document Errors
    // ========================================================================
    /// An extension target does not exist in the document.
    #[error("Invalid extension target: {0}")]
    InvalidTarget(String),

    /// Image encoding error.
    #[error("Image encode error: {0}")]
    ImageEncodeError(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization or parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        ExportError::ImageEncodeError(err.to_string())
    }
}

impl ExportError {
    pub(crate) fn unsupported(node: &str, what: impl Into<String>) -> Self {
        ExportError::UnsupportedInput {
            node: node.to_string(),
            what: what.into(),
        }
    }
}

/// Alias for `Result<T, ExportError>`.
pub type Result<T> = std::result::Result<T, ExportError>;
