//! Error types for Patchbay operations.
//!
//! This module provides the main error type [`PatchbayError`] which wraps
//! the error conditions that can occur while loading, rendering and
//! exporting diagrams. User-input edge cases in the editor never produce
//! errors; they are ignored or gated by confirmation.

use std::io;

use thiserror::Error;

use patchbay_core::schema::SchemaError;

/// The main error type for Patchbay operations.
///
/// Asset failures are not represented here: a symbol image that cannot be
/// loaded is logged and left out of rendering.
///
/// # Diagnostic Variants
///
/// The `Schema` variant keeps the document text next to the error so JSON
/// syntax errors can be reported with a source snippet.
#[derive(Debug, Error)]
pub enum PatchbayError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Schema { err: SchemaError, src: String },

    #[error("Export error: {0}")]
    Export(#[from] crate::export::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PatchbayError {
    /// Create a new `Schema` error with the associated document text.
    pub fn new_schema_error(err: SchemaError, src: impl Into<String>) -> Self {
        Self::Schema {
            err,
            src: src.into(),
        }
    }
}
