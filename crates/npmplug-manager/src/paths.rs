//! Plugin id validation and path resolution.
//!
//! Packages are installed under the plugin root with the usual npm layout:
//! ```text
//! ~/.my-app/
//! ├── node_modules/
//! │   ├── some-plugin/
//! │   │   ├── package.json
//! │   │   └── plugin.wasm
//! │   └── @scope/
//! │       └── other-plugin/
//! ├── package.json
//! └── plugins.json
//! ```

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::options::PluginDirSource;
use crate::{PluginManagerError, PluginManagerResult};

/// Directory holding installed packages inside the plugin root.
pub const NODE_MODULES_DIR: &str = "node_modules";

/// Manifest file name of an npm package.
pub const MANIFEST_FILE_NAME: &str = "package.json";

static PLUGIN_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("invalid regex"));

static RELATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\.?(?:$|/)").expect("invalid regex"));

static WINDOWS_ABSOLUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]:[\\/]").expect("invalid regex"));

/// Returns `true` if `id` is a valid plugin id.
///
/// A valid id starts with a lowercase letter, continues with lowercase
/// letters, digits or dashes, and is at least 3 characters long.
pub fn validate_plugin_id(id: &str) -> bool {
    id.len() >= 3 && PLUGIN_ID_RE.is_match(id)
}

/// Resolves the plugin root directory for `id`.
///
/// An explicit path or producer wins; otherwise the root is `~/.{id}`.
///
/// # Errors
///
/// Returns an error if the default is needed and the home directory is unknown.
pub fn plugin_dir(id: &str, source: &PluginDirSource) -> PluginManagerResult<PathBuf> {
    match source {
        PluginDirSource::Path(path) => Ok(path.clone()),
        PluginDirSource::Producer(produce) => Ok(produce()),
        PluginDirSource::Default => dirs::home_dir()
            .map(|home| home.join(format!(".{id}")))
            .ok_or_else(|| PluginManagerError::HomeDirUnavailable { id: id.to_string() }),
    }
}

/// Returns `true` if `spec` names a local directory rather than a registry package.
///
/// Local specs use the `file:` protocol, are absolute (POSIX or Windows
/// drive paths), or start with `./`, `../`, or are exactly `.`/`..`.
pub fn is_local_path(spec: &str) -> bool {
    spec.starts_with("file:")
        || spec.starts_with('/')
        || Path::new(spec).is_absolute()
        || WINDOWS_ABSOLUTE_RE.is_match(spec)
        || RELATIVE_RE.is_match(spec)
}

/// Resolves a local spec to an absolute path against `cwd`.
///
/// The `file:` prefix is stripped first. Absolute input ignores `cwd`.
pub fn resolve_local_path(spec: &str, cwd: &Path) -> PathBuf {
    let path = spec.strip_prefix("file:").unwrap_or(spec);
    normalize(&cwd.join(path))
}

/// Returns `true` if `path` contains a `package.json`.
pub async fn validate_local_path(path: &Path) -> bool {
    tokio::fs::try_exists(path.join(MANIFEST_FILE_NAME))
        .await
        .unwrap_or(false)
}

/// Returns the install directory of `package` under the plugin root.
#[must_use]
pub fn package_dir(root: &Path, package: &str) -> PathBuf {
    root.join(NODE_MODULES_DIR).join(package)
}

/// Returns the manifest path of `package` under the plugin root.
#[must_use]
pub fn manifest_path(root: &Path, package: &str) -> PathBuf {
    package_dir(root, package).join(MANIFEST_FILE_NAME)
}

/// Lexically removes `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_validate_plugin_id_accepts() {
        for id in ["myapp", "my-app", "image-processor", "data-transformer", "a1-"] {
            assert!(validate_plugin_id(id), "{id} should be valid");
        }
    }

    #[test]
    fn test_validate_plugin_id_rejects() {
        for id in ["My-App", "123-app", "my_app", "ab", "", "-app", "my app"] {
            assert!(!validate_plugin_id(id), "{id} should be invalid");
        }
    }

    #[test]
    fn test_plugin_dir_explicit_path() {
        let source = PluginDirSource::Path(PathBuf::from("/custom/path"));
        assert_eq!(
            plugin_dir("my-app", &source).unwrap(),
            PathBuf::from("/custom/path")
        );
    }

    #[test]
    fn test_plugin_dir_producer() {
        let source = PluginDirSource::Producer(Arc::new(|| PathBuf::from("/produced")));
        assert_eq!(
            plugin_dir("my-app", &source).unwrap(),
            PathBuf::from("/produced")
        );
    }

    #[test]
    fn test_plugin_dir_default_is_dot_id_in_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let dir = plugin_dir("my-app", &PluginDirSource::Default).unwrap();
        assert_eq!(dir, home.join(".my-app"));
    }

    #[test]
    fn test_is_local_path_file_protocol() {
        assert!(is_local_path("file:./my-plugin"));
        assert!(is_local_path("file:/absolute/path"));
        assert!(is_local_path("file:C:\\Windows\\path"));
    }

    #[test]
    fn test_is_local_path_relative() {
        assert!(is_local_path("."));
        assert!(is_local_path(".."));
        assert!(is_local_path("./my-plugin"));
        assert!(is_local_path("../my-plugin"));
    }

    #[test]
    fn test_is_local_path_absolute() {
        assert!(is_local_path("/usr/local/plugin"));
        assert!(is_local_path("C:\\Projects\\plugin"));
        assert!(is_local_path("D:/dev/plugin"));
    }

    #[test]
    fn test_is_local_path_registry_names() {
        assert!(!is_local_path("lodash"));
        assert!(!is_local_path("@types/node"));
        assert!(!is_local_path("my-awesome-plugin"));
        assert!(!is_local_path(".hidden-name"));
    }

    #[test]
    fn test_resolve_file_protocol() {
        assert_eq!(
            resolve_local_path("file:./plugin", Path::new("/base")),
            PathBuf::from("/base/plugin")
        );
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve_local_path("./plugin", Path::new("/base")),
            PathBuf::from("/base/plugin")
        );
        assert_eq!(
            resolve_local_path("../plugin", Path::new("/base/sub")),
            PathBuf::from("/base/plugin")
        );
    }

    #[test]
    fn test_resolve_absolute_ignores_cwd() {
        assert_eq!(
            resolve_local_path("/absolute/path", Path::new("/elsewhere")),
            PathBuf::from("/absolute/path")
        );
        assert_eq!(
            resolve_local_path("file:/absolute/path", Path::new("/elsewhere")),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_package_paths() {
        let root = Path::new("/home/user/.my-app");
        assert_eq!(
            package_dir(root, "@scope/name"),
            PathBuf::from("/home/user/.my-app/node_modules/@scope/name")
        );
        assert_eq!(
            manifest_path(root, "demo"),
            PathBuf::from("/home/user/.my-app/node_modules/demo/package.json")
        );
    }

    #[tokio::test]
    async fn test_validate_local_path() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!validate_local_path(temp_dir.path()).await);

        std::fs::write(temp_dir.path().join("package.json"), "{}").unwrap();
        assert!(validate_local_path(temp_dir.path()).await);

        assert!(!validate_local_path(&temp_dir.path().join("missing")).await);
    }
}
