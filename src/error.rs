//! Error taxonomy for the code-generator back-ends.
//!
//! Structural problems uncovered during generation return early from the
//! top-level entry; nothing is written for the failing file. Internal
//! consistency violations (missing printer variable, unbalanced annotation
//! markers, empty SCC) are logic bugs and panic instead of surfacing here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// A structural problem in the schema that only shows up at generation
    /// time, e.g. a nested type colliding with the derived outer class name.
    /// The message names the schema file and the offending symbol.
    #[error("{file}: {message}")]
    SchemaValidation { file: String, message: String },

    /// Incompatible combination of generator options, detected before any
    /// output is produced.
    #[error("conflicting options: {0}")]
    OptionConflict(String),

    /// A type reference in a descriptor could not be resolved against the
    /// pool, or a descriptor violated a pool invariant.
    #[error("descriptor pool: {0}")]
    PoolLink(String),

    /// Passed through unchanged from the driver's sink.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GenerateError {
    pub fn schema(file: impl Into<String>, message: impl Into<String>) -> Self {
        GenerateError::SchemaValidation {
            file: file.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
