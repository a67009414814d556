//! Compiled plugin handle.

use std::fmt;
use std::path::{Path, PathBuf};

use wasmtime::Module;
use wasmtime::component::Component;

/// The compiled artifact behind a plugin.
#[derive(Clone)]
pub enum PluginKind {
    /// A core WebAssembly module.
    Module(Module),
    /// A Component Model component.
    Component(Component),
}

/// A plugin entry file compiled by the [`WasmEngine`](crate::WasmEngine).
///
/// Cloning is cheap: wasmtime artifacts are reference counted. The handle is
/// opaque to the plugin manager; instantiation is left to the host.
#[derive(Clone)]
pub struct WasmPlugin {
    path: PathBuf,
    kind: PluginKind,
    exports: Vec<String>,
}

impl WasmPlugin {
    pub(crate) fn new(path: &Path, kind: PluginKind, exports: Vec<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
            exports,
        }
    }

    /// Returns the entry file this plugin was compiled from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the compiled artifact.
    #[must_use]
    pub fn kind(&self) -> &PluginKind {
        &self.kind
    }

    /// Returns the names of the top-level exports.
    #[must_use]
    pub fn exports(&self) -> &[String] {
        &self.exports
    }

    /// Returns `true` if the entry is a core module.
    #[must_use]
    pub fn is_module(&self) -> bool {
        matches!(self.kind, PluginKind::Module(_))
    }

    /// Returns `true` if the entry is a component.
    #[must_use]
    pub fn is_component(&self) -> bool {
        matches!(self.kind, PluginKind::Component(_))
    }
}

impl fmt::Debug for WasmPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PluginKind::Module(_) => "module",
            PluginKind::Component(_) => "component",
        };
        f.debug_struct("WasmPlugin")
            .field("path", &self.path)
            .field("kind", &kind)
            .field("exports", &self.exports)
            .finish()
    }
}
