//! In-memory host implementations.
//!
//! Useful for unit tests and for embedding the controller somewhere that has
//! no editor behind it. Resources live in a `BTreeMap` keyed by resource
//! path, so enumeration order is deterministic.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use skins_types::error::{Result, SkinsError};

use crate::{QuickPanelItem, ResourceAccess, Settings, SettingsStore, Window, matches_pattern};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A fully in-memory resource index.
#[derive(Debug)]
pub struct MemoryResources {
    files: BTreeMap<String, Vec<u8>>,
    packages_path: PathBuf,
    writes: usize,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
            packages_path: PathBuf::from("/packages"),
            writes: 0,
        }
    }

    /// Add or replace a resource without counting it as a write.
    pub fn insert(&mut self, path: &str, contents: impl AsRef<[u8]>) {
        self.files.insert(path.to_string(), contents.as_ref().to_vec());
    }

    /// Resource contents as text, if present and UTF-8.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.files
            .get(path)
            .and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Number of `write_resource` calls made so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl Default for MemoryResources {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceAccess for MemoryResources {
    fn find_resources(&self, pattern: &str) -> Vec<String> {
        self.files
            .keys()
            .filter(|path| matches_pattern(pattern, path))
            .cloned()
            .collect()
    }

    fn load_resource(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SkinsError::Resource(format!("no such resource: {path}")))
    }

    fn write_resource(&mut self, path: &str, data: &[u8]) -> Result<()> {
        if !path.starts_with("Packages/") {
            return Err(SkinsError::Resource(format!(
                "not inside the packages folder: {path}"
            )));
        }
        self.writes += 1;
        self.files.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn packages_path(&self) -> &Path {
        &self.packages_path
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// In-memory settings store that remembers what was last saved.
#[derive(Debug, Default)]
pub struct MemorySettings {
    live: HashMap<String, Settings>,
    saved: HashMap<String, Settings>,
    save_counts: HashMap<String, usize>,
    broken: BTreeSet<String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every load and save of `namespace` fail.
    pub fn break_namespace(&mut self, namespace: &str) {
        self.broken.insert(namespace.to_string());
    }

    /// Live (possibly unsaved) state of a namespace.
    pub fn live(&self, namespace: &str) -> Option<&Settings> {
        self.live.get(namespace)
    }

    /// State of a namespace as of its last save.
    pub fn saved(&self, namespace: &str) -> Option<&Settings> {
        self.saved.get(namespace)
    }

    pub fn save_count(&self, namespace: &str) -> usize {
        self.save_counts.get(namespace).copied().unwrap_or(0)
    }
}

impl SettingsStore for MemorySettings {
    fn load_settings(&mut self, namespace: &str) -> Result<&mut Settings> {
        if self.broken.contains(namespace) {
            return Err(SkinsError::settings(namespace, "namespace unavailable"));
        }
        Ok(self.live.entry(namespace.to_string()).or_default())
    }

    fn save_settings(&mut self, namespace: &str) -> Result<()> {
        if self.broken.contains(namespace) {
            return Err(SkinsError::settings(namespace, "namespace unavailable"));
        }
        let current = self.live.get(namespace).cloned().unwrap_or_default();
        self.saved.insert(namespace.to_string(), current);
        *self.save_counts.entry(namespace.to_string()).or_insert(0) += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// A picker shown through [`RecordingWindow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownPanel {
    pub items: Vec<QuickPanelItem>,
    pub selected_index: Option<usize>,
}

/// Window that records everything it is asked to display.
#[derive(Debug, Default)]
pub struct RecordingWindow {
    pub panels: Vec<ShownPanel>,
    pub inputs: Vec<(String, String)>,
    pub statuses: Vec<String>,
}

impl RecordingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_panel(&self) -> Option<&ShownPanel> {
        self.panels.last()
    }

    pub fn last_status(&self) -> Option<&str> {
        self.statuses.last().map(String::as_str)
    }
}

impl Window for RecordingWindow {
    fn show_quick_panel(&mut self, items: Vec<QuickPanelItem>, selected_index: Option<usize>) {
        self.panels.push(ShownPanel {
            items,
            selected_index,
        });
    }

    fn show_input_panel(&mut self, caption: &str, initial_text: &str) {
        self.inputs
            .push((caption.to_string(), initial_text.to_string()));
    }

    fn status_message(&mut self, text: &str) {
        log::info!("{text}");
        self.statuses.push(text.to_string());
    }
}
