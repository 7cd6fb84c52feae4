//! Skin data model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Section every skin must carry; it maps onto the editor preferences.
pub const PREFERENCES: &str = "Preferences";

/// The settings of one skin: section name to a mapping of key to value.
///
/// Serializes as the bare JSON object found in `*.skins` files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkinData(Map<String, Value>);

impl SkinData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a decoded value, which must be a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn preferences(&self) -> Option<&Map<String, Value>> {
        self.section(PREFERENCES)
    }

    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0.get(name).and_then(Value::as_object)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// String value of a `Preferences` key.
    pub fn preference_str(&self, key: &str) -> Option<&str> {
        self.preferences()?.get(key)?.as_str()
    }

    /// Overwrite a `Preferences` key, creating the section if needed.
    pub fn set_preference(&mut self, key: &str, value: Value) {
        let section = self
            .0
            .entry(PREFERENCES.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !section.is_object() {
            *section = Value::Object(Map::new());
        }
        if let Value::Object(prefs) = section {
            prefs.insert(key.to_string(), value);
        }
    }

    pub fn insert_section(&mut self, name: &str, entries: Value) {
        self.0.insert(name.to_string(), entries);
    }

    /// All sections whose value is a mapping, in document order.
    ///
    /// Anything else in the document (comments turned keys, stray scalars)
    /// is not a settings namespace and is skipped.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.0
            .iter()
            .filter_map(|(name, value)| value.as_object().map(|entries| (name.as_str(), entries)))
    }
}

/// A skin found in some package.
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    /// Package providing the skin (`User` for saved skins).
    pub package: String,
    /// Name of the skin inside its `*.skins` document.
    pub name: String,
    pub data: SkinData,
}

impl Skin {
    /// The `package/name` identifier stored as the active skin.
    pub fn id(&self) -> String {
        format!("{}/{}", self.package, self.name)
    }
}

/// Skins keyed by name.
pub type SkinCollection = BTreeMap<String, SkinData>;
