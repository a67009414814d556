//! WASM host runtime for npmplug.
//!
//! Installed npm packages are loaded by compiling their entry file with
//! wasmtime. A package may ship either a core module (binary or text format)
//! or a Component Model component.

pub mod engine;
pub mod error;
pub mod plugin;

pub use engine::WasmEngine;
pub use error::{WasmError, WasmResult};
pub use plugin::{PluginKind, WasmPlugin};
