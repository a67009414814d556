//! WASM engine setup and entry file compilation.

use std::path::Path;

use wasmtime::{Config, Engine, Module, component::Component};

use crate::{PluginKind, WasmError, WasmPlugin, WasmResult};

/// WASM engine for compiling plugin entry files.
#[derive(Clone)]
pub struct WasmEngine {
    inner: Engine,
}

impl WasmEngine {
    /// Creates a new WASM engine with Component Model support.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be created.
    pub fn new() -> WasmResult<Self> {
        let mut config = Config::new();
        config.wasm_component_model(true);

        let inner = Engine::new(&config).map_err(|e| WasmError::EngineCreation(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Returns a reference to the inner wasmtime engine.
    #[must_use]
    pub fn inner(&self) -> &Engine {
        &self.inner
    }

    /// Reads and compiles an entry file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or compiled.
    pub fn load_file(&self, path: &Path) -> WasmResult<WasmPlugin> {
        let bytes = std::fs::read(path).map_err(|source| WasmError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        self.load_bytes(path, &bytes)
    }

    /// Compiles entry bytes, trying a core module first and a component second.
    ///
    /// Both the binary and the text format are accepted. `path` is only used
    /// to label the resulting plugin and errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are neither a module nor a component.
    pub fn load_bytes(&self, path: &Path, bytes: &[u8]) -> WasmResult<WasmPlugin> {
        let module_error = match Module::new(&self.inner, bytes) {
            Ok(module) => {
                let exports = module.exports().map(|e| e.name().to_string()).collect();
                tracing::debug!("Compiled core module {}", path.display());
                return Ok(WasmPlugin::new(path, PluginKind::Module(module), exports));
            }
            Err(e) => e,
        };

        match Component::new(&self.inner, bytes) {
            Ok(component) => {
                let exports = component
                    .component_type()
                    .exports(&self.inner)
                    .map(|(name, _)| name.to_string())
                    .collect();
                tracing::debug!("Compiled component {}", path.display());
                Ok(WasmPlugin::new(
                    path,
                    PluginKind::Component(component),
                    exports,
                ))
            }
            Err(_) => Err(WasmError::Compile {
                path: path.to_path_buf(),
                reason: module_error.to_string(),
            }),
        }
    }
}
