//! Stylesheet filter.
//!
//! A stylesheet mirrors the shape of a settings document and names the parts
//! of it that belong in a skin:
//!
//! ```json
//! {
//!     "Preferences": ["color_scheme", "theme", "font_size"],
//!     "Widget": { "ui": "theme" }
//! }
//! ```
//!
//! A mapping descends into the data, a list copies the named leaf keys, and
//! a single string is shorthand for a one-element list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use skins_types::error::Result;
use skins_types::value::is_truthy;

/// One node of a stylesheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stylesheet {
    /// Descend into each named child.
    Nested(BTreeMap<String, Stylesheet>),
    /// Copy these leaf keys verbatim.
    Keys(Vec<String>),
    /// Copy this single leaf key.
    Key(String),
}

impl Stylesheet {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Nested(children) => children.is_empty(),
            Self::Keys(keys) => keys.is_empty(),
            Self::Key(key) => key.is_empty(),
        }
    }
}

/// Skin-assembly template: settings namespace to the stylesheet applied to
/// that namespace's user settings.
pub type Template = BTreeMap<String, Stylesheet>;

/// Parse a template from its JSON form.
pub fn parse_template(value: Value) -> Result<Template> {
    Ok(serde_json::from_value(value)?)
}

/// Filter `data` down to the parts named by `stylesheet`.
///
/// Returns `None` when nothing is selected: either input empty, no named
/// key present, or every nested branch empty. A key named by a mapping node
/// but missing from the data drops that branch only.
pub fn transform(data: &Value, stylesheet: &Stylesheet) -> Option<Value> {
    if !is_truthy(data) || stylesheet.is_empty() {
        return None;
    }
    let data = data.as_object()?;

    let node: Map<String, Value> = match stylesheet {
        Stylesheet::Nested(children) => children
            .iter()
            .filter_map(|(key, style)| {
                let Some(child) = data.get(key) else {
                    log::debug!("Skins: '{key}' not in settings -- branch skipped");
                    return None;
                };
                transform(child, style).map(|value| (key.clone(), value))
            })
            .collect(),
        Stylesheet::Keys(keys) => keys
            .iter()
            .filter_map(|key| data.get(key).map(|value| (key.clone(), value.clone())))
            .collect(),
        Stylesheet::Key(key) => data
            .get(key)
            .map(|value| (key.clone(), value.clone()))
            .into_iter()
            .collect(),
    };

    (!node.is_empty()).then_some(Value::Object(node))
}
