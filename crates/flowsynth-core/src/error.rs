//! Core error types for flowsynth-core.
//!
//! Graph analysis never fails (it reports problems instead), so these errors
//! only cover building the model: loading it from JSON and declaring types.

use thiserror::Error;

/// Core errors produced by the flowsynth-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A graph, catalog or type declaration could not be parsed.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A coercion or top type was declared with an empty type name.
    #[error("invalid type name: '{name}'")]
    InvalidTypeName { name: String },
}
