//! Host editor collaborators.
//!
//! The skins manager never talks to an editor directly. Everything it needs
//! from the host (resource lookup, settings storage, pickers, status line)
//! goes through the traits defined here. Two implementations ship with the
//! crate: [`memory`] for tests and [`directory`] for a packages folder on
//! disk.

pub mod decode;
pub mod directory;
pub mod memory;

use std::path::Path;

use serde_json::{Map, Value};
use skins_types::error::Result;

pub use decode::{decode_resource, decode_value, encode_value};
pub use directory::{DirectoryResources, FileSettings};
pub use memory::{MemoryResources, MemorySettings, RecordingWindow};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Read/write access to package resources.
///
/// Resource paths are `/`-separated and rooted at `Packages/`, e.g.
/// `Packages/Theme - Default/Default.sublime-theme`.
pub trait ResourceAccess {
    /// All resource paths whose file name matches the glob `pattern`.
    fn find_resources(&self, pattern: &str) -> Vec<String>;

    /// Raw bytes of a resource.
    fn load_resource(&self, path: &str) -> Result<Vec<u8>>;

    /// Overwrite (or create) a resource inside the packages folder.
    fn write_resource(&mut self, path: &str, data: &[u8]) -> Result<()>;

    /// Absolute location of the writable packages folder.
    fn packages_path(&self) -> &Path;
}

/// Whether the file name of `path` matches the glob `pattern`.
///
/// A pattern that fails to compile is compared literally.
pub fn matches_pattern(pattern: &str, path: &str) -> bool {
    let name = skins_types::value::basename(path);
    match glob::Pattern::new(pattern) {
        Ok(p) => p.matches(name),
        Err(_) => pattern == name,
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// One settings namespace: a flat mapping of keys to JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: Map<String, Value>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Remove a key, returning its previous value.
    pub fn erase(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// Per-namespace settings storage with explicit persistence.
pub trait SettingsStore {
    /// Load (or fetch the cached) settings of `namespace`.
    fn load_settings(&mut self, namespace: &str) -> Result<&mut Settings>;

    /// Persist the current state of `namespace`.
    fn save_settings(&mut self, namespace: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// A row in a quick panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickPanelItem {
    /// Main line, matched against the user's filter text.
    pub trigger: String,
    /// Secondary line shown under the trigger.
    pub details: String,
}

impl QuickPanelItem {
    pub fn new(trigger: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            details: details.into(),
        }
    }
}

/// User-facing surface of the host window.
///
/// Pickers and input panels are fire-and-forget here: the host reports the
/// user's answers back as controller events (highlight, select, input done).
pub trait Window {
    /// Show a picker, optionally pre-selecting a row.
    fn show_quick_panel(&mut self, items: Vec<QuickPanelItem>, selected_index: Option<usize>);

    /// Ask the user for a line of text.
    fn show_input_panel(&mut self, caption: &str, initial_text: &str);

    /// Transient notice in the status bar.
    fn status_message(&mut self, text: &str);
}
