//! Host implementations backed by a packages directory on disk.
//!
//! The directory layout mirrors the editor's: one sub-directory per package,
//! `User/` holding the user's own files. Resource `Packages/<pkg>/<file>`
//! maps to `<packages_path>/<pkg>/<file>`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use skins_types::config::SETTINGS_EXT;
use skins_types::error::{Result, SkinsError};

use crate::decode::{decode_value, encode_value};
use crate::{ResourceAccess, Settings, SettingsStore, matches_pattern};

const RESOURCE_ROOT: &str = "Packages";

/// Resources read from (and written to) a packages directory.
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem location of a `Packages/...` resource path.
    fn locate(&self, path: &str) -> Result<PathBuf> {
        let rel = path
            .strip_prefix(RESOURCE_ROOT)
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| SkinsError::Resource(format!("not a package resource: {path}")))?;
        if rel.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return Err(SkinsError::Resource(format!("invalid resource path: {path}")));
        }
        Ok(self.root.join(rel))
    }

    fn walk(&self, dir: &Path, prefix: &str, pattern: &str, found: &mut Vec<String>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Skipping {}: {e}", dir.display());
                return;
            },
        };
        let mut children: Vec<_> = entries.filter_map(|e| e.ok()).collect();
        children.sort_by_key(|e| e.file_name());
        for entry in children {
            let name = entry.file_name().to_string_lossy().into_owned();
            let resource = format!("{prefix}/{name}");
            match entry.file_type() {
                Ok(t) if t.is_dir() => self.walk(&entry.path(), &resource, pattern, found),
                Ok(t) if t.is_file() && matches_pattern(pattern, &resource) => {
                    found.push(resource);
                },
                _ => {},
            }
        }
    }
}

impl ResourceAccess for DirectoryResources {
    fn find_resources(&self, pattern: &str) -> Vec<String> {
        let mut found = Vec::new();
        self.walk(&self.root, RESOURCE_ROOT, pattern, &mut found);
        found
    }

    fn load_resource(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.locate(path)?)?)
    }

    fn write_resource(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let target = self.locate(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, data)?;
        log::debug!("Wrote {}", target.display());
        Ok(())
    }

    fn packages_path(&self) -> &Path {
        &self.root
    }
}

/// Settings stored as `<packages_path>/User/<namespace>.sublime-settings`.
///
/// Namespaces are read on first use and cached; only `save_settings` writes.
#[derive(Debug)]
pub struct FileSettings {
    user_dir: PathBuf,
    cache: HashMap<String, Settings>,
}

impl FileSettings {
    pub fn new(packages_path: impl AsRef<Path>) -> Self {
        Self {
            user_dir: packages_path.as_ref().join("User"),
            cache: HashMap::new(),
        }
    }

    fn file_of(&self, namespace: &str) -> PathBuf {
        self.user_dir.join(format!("{namespace}{SETTINGS_EXT}"))
    }

    fn read(&self, namespace: &str) -> Result<Settings> {
        let path = self.file_of(namespace);
        if !path.is_file() {
            return Ok(Settings::new());
        }
        let bytes = fs::read(&path)?;
        match decode_value(&bytes) {
            Ok(Value::Object(map)) => Ok(Settings::from_map(map)),
            Ok(Value::Null) => Ok(Settings::new()),
            Ok(_) => Err(SkinsError::settings(namespace, "settings file is not an object")),
            Err(e) => Err(SkinsError::settings(namespace, e.to_string())),
        }
    }
}

impl SettingsStore for FileSettings {
    fn load_settings(&mut self, namespace: &str) -> Result<&mut Settings> {
        if !self.cache.contains_key(namespace) {
            let settings = self.read(namespace)?;
            self.cache.insert(namespace.to_string(), settings);
        }
        self.cache
            .get_mut(namespace)
            .ok_or_else(|| SkinsError::settings(namespace, "not loaded"))
    }

    fn save_settings(&mut self, namespace: &str) -> Result<()> {
        let settings = self
            .cache
            .get(namespace)
            .ok_or_else(|| SkinsError::settings(namespace, "not loaded"))?;
        let text = encode_value(&Value::Object(settings.as_map().clone()), true)?;
        fs::create_dir_all(&self.user_dir)?;
        fs::write(self.file_of(namespace), text)?;
        log::debug!("Saved settings {namespace}");
        Ok(())
    }
}
