//! Error types for the WASM runtime.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the WASM runtime.
#[derive(Debug, Error)]
pub enum WasmError {
    /// Failed to create the WASM engine.
    #[error("failed to create WASM engine: {0}")]
    EngineCreation(String),

    /// Failed to read an entry file.
    #[error("failed to read entry file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The entry file is neither a valid module nor a valid component.
    #[error("failed to compile {path}: {reason}")]
    Compile { path: PathBuf, reason: String },
}

/// Result type for WASM runtime operations.
pub type WasmResult<T> = Result<T, WasmError>;
