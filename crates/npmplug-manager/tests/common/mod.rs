//! Shared test support: an in-memory stand-in for the npm executable.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use npmplug_manager::{CommandOutput, CommandRunner};

/// Scripted reaction to one npm subcommand.
#[derive(Debug, Clone)]
pub enum Reaction {
    /// Return this output without touching the filesystem.
    Output(CommandOutput),
    /// Fail to spawn as if the executable were missing.
    NotFound,
    /// Never finish.
    Hang,
}

/// Fake npm that records invocations and mimics `--prefix` installs on disk.
#[derive(Default)]
pub struct FakeNpm {
    calls: Mutex<Vec<Vec<String>>>,
    published: Mutex<HashMap<String, (String, String)>>,
    reactions: Mutex<HashMap<String, Reaction>>,
}

impl FakeNpm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `name` installable from the fake registry.
    pub fn publish(&self, name: &str, version: &str, description: &str) {
        self.published.lock().unwrap().insert(
            name.to_string(),
            (version.to_string(), description.to_string()),
        );
    }

    /// Overrides the behavior of a subcommand (`install`, `list`, ...).
    pub fn react(&self, subcommand: &str, reaction: Reaction) {
        self.reactions
            .lock()
            .unwrap()
            .insert(subcommand.to_string(), reaction);
    }

    /// Returns every recorded argument vector.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns how many times `subcommand` ran.
    pub fn count(&self, subcommand: &str) -> usize {
        self.calls()
            .iter()
            .filter(|args| args.first().map(String::as_str) == Some(subcommand))
            .count()
    }

    fn simulate(&self, args: &[String]) -> CommandOutput {
        let prefix = flag_value(args, "--prefix").map(PathBuf::from);
        match (args[0].as_str(), prefix) {
            ("install", Some(root)) => self.simulate_install(&args[1], &root),
            ("uninstall", Some(root)) => {
                let _ = fs::remove_dir_all(root.join("node_modules").join(&args[1]));
                CommandOutput::success("")
            }
            ("list", Some(root)) => CommandOutput::success(list_json(&root)),
            ("search", _) => {
                let published = self.published.lock().unwrap();
                let mut names: Vec<_> = published
                    .keys()
                    .filter(|name| name.contains(args[1].as_str()))
                    .collect();
                names.sort();
                let results: Vec<_> = names
                    .into_iter()
                    .map(|name| {
                        let (version, description) = &published[name];
                        serde_json::json!({
                            "name": name,
                            "version": version,
                            "description": description,
                        })
                    })
                    .collect();
                CommandOutput::success(serde_json::Value::Array(results).to_string())
            }
            _ => CommandOutput::failure(1, format!("npm ERR! unsupported: {}", args.join(" "))),
        }
    }

    fn simulate_install(&self, spec: &str, root: &Path) -> CommandOutput {
        if Path::new(spec).is_absolute() {
            let manifest = fs::read_to_string(Path::new(spec).join("package.json")).unwrap();
            let value: serde_json::Value = serde_json::from_str(&manifest).unwrap();
            let name = value["name"].as_str().unwrap();
            write_package(root, name, &manifest);
            return CommandOutput::success("");
        }

        let (name, requested) = split_spec(spec);
        let published = self.published.lock().unwrap();
        let Some((latest, description)) = published.get(name) else {
            return CommandOutput::failure(1, format!("npm ERR! 404 Not Found - {name}"));
        };
        let version = requested.unwrap_or(latest);
        let manifest = serde_json::json!({
            "name": name,
            "version": version,
            "description": description,
        });
        write_package(root, name, &manifest.to_string());
        CommandOutput::success("")
    }
}

#[async_trait]
impl CommandRunner for FakeNpm {
    async fn run(&self, _program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(args.to_vec());

        let reaction = self.reactions.lock().unwrap().get(&args[0]).cloned();
        match reaction {
            Some(Reaction::Output(output)) => Ok(output),
            Some(Reaction::NotFound) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No such file or directory",
            )),
            Some(Reaction::Hang) => std::future::pending().await,
            None => Ok(self.simulate(args)),
        }
    }
}

/// Writes `node_modules/{name}/package.json` under `root`.
pub fn write_package(root: &Path, name: &str, manifest: &str) {
    let dir = root.join("node_modules").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("package.json"), manifest).unwrap();
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Splits `name@version`, keeping the leading `@` of scoped names.
fn split_spec(spec: &str) -> (&str, Option<&str>) {
    match spec.rfind('@') {
        Some(i) if i > 0 => (&spec[..i], Some(&spec[i + 1..])),
        _ => (spec, None),
    }
}

fn list_json(root: &Path) -> String {
    let mut dependencies = serde_json::Map::new();
    let node_modules = root.join("node_modules");
    let mut manifests = Vec::new();
    if let Ok(entries) = fs::read_dir(&node_modules) {
        for entry in entries.flatten() {
            let path = entry.path();
            if entry.file_name().to_string_lossy().starts_with('@') {
                for scoped in fs::read_dir(&path).unwrap().flatten() {
                    manifests.push(scoped.path().join("package.json"));
                }
            } else {
                manifests.push(path.join("package.json"));
            }
        }
    }
    for manifest in manifests {
        let Ok(content) = fs::read_to_string(&manifest) else {
            continue;
        };
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        dependencies.insert(
            value["name"].as_str().unwrap().to_string(),
            serde_json::json!({ "version": value["version"], "overridden": false }),
        );
    }
    serde_json::json!({ "name": "plugins", "dependencies": dependencies }).to_string()
}
