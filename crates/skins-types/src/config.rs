//! Runtime configuration.
//!
//! Every field has a default matching the editor's stock layout, so an empty
//! (or missing) `skins.toml` yields a usable configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{Result, SkinsError};

/// Extension of editor settings documents.
pub const SETTINGS_EXT: &str = ".sublime-settings";

/// Configuration shared by the repository, the controller, and the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkinsConfig {
    /// Directory holding one sub-directory per package.
    pub packages_path: PathBuf,
    /// Resource path of the user's personal skin collection.
    pub user_skins: String,
    /// Glob matched against resource file names to find skin files.
    pub skins_pattern: String,
    /// Settings namespace holding the editor preferences.
    pub preferences: String,
    /// Settings namespace holding this tool's own settings.
    pub skins_settings: String,
    /// Key of the skin-assembly template inside `skins_settings`.
    pub template_key: String,
    /// Preference key recording the active `package/name` identifier.
    pub active_skin_key: String,
    /// Delay the host should wait before running a deferred preview.
    pub preview_delay_ms: u64,
}

impl Default for SkinsConfig {
    fn default() -> Self {
        Self {
            packages_path: PathBuf::from("Packages"),
            user_skins: "Packages/User/Saved Skins.skins".to_string(),
            skins_pattern: "*.skins".to_string(),
            preferences: "Preferences".to_string(),
            skins_settings: "Skins".to_string(),
            template_key: "skin-template".to_string(),
            active_skin_key: "skin".to_string(),
            preview_delay_ms: 250,
        }
    }
}

impl SkinsConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Read a configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            log::debug!("No config at {} -- using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn check(&self) -> Result<()> {
        if !self.user_skins.starts_with("Packages/User/") {
            return Err(SkinsError::Config(format!(
                "user_skins must live in Packages/User: {}",
                self.user_skins
            )));
        }
        if self.preferences.is_empty() || self.active_skin_key.is_empty() {
            return Err(SkinsError::Config(
                "preferences and active_skin_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Template used to assemble a new skin when the user has not configured one.
pub fn default_template() -> Value {
    json!({
        "Preferences": [
            "color_scheme",
            "theme",
            "font_face",
            "font_size",
            "font_options",
            "line_padding_top",
            "line_padding_bottom",
            "caret_style",
            "highlight_line",
            "draw_white_space",
            "gutter",
            "line_numbers",
            "margin"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = SkinsConfig::default();
        assert_eq!(c.user_skins, "Packages/User/Saved Skins.skins");
        assert_eq!(c.active_skin_key, "skin");
        assert_eq!(c.preview_delay_ms, 250);
    }

    #[test]
    fn empty_toml_is_default() {
        let c = SkinsConfig::from_toml_str("").unwrap();
        assert_eq!(c.preferences, "Preferences");
        assert_eq!(c.skins_pattern, "*.skins");
    }

    #[test]
    fn partial_override() {
        let c = SkinsConfig::from_toml_str("packages_path = \"/opt/st/Packages\"\npreview_delay_ms = 0\n")
            .unwrap();
        assert_eq!(c.packages_path, PathBuf::from("/opt/st/Packages"));
        assert_eq!(c.preview_delay_ms, 0);
        assert_eq!(c.template_key, "skin-template");
    }

    #[test]
    fn user_skins_outside_user_package_rejected() {
        let err = SkinsConfig::from_toml_str("user_skins = \"Packages/Theme/x.skins\"").unwrap_err();
        assert!(matches!(err, SkinsError::Config(_)));
    }

    #[test]
    fn bad_toml_rejected() {
        assert!(matches!(
            SkinsConfig::from_toml_str("preview_delay_ms = \"soon\""),
            Err(SkinsError::TomlParse(_))
        ));
    }

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let c = SkinsConfig::load(&dir.path().join("skins.toml")).unwrap();
        assert_eq!(c.skins_settings, "Skins");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skins.toml");
        std::fs::write(&path, "active_skin_key = \"current_skin\"\n").unwrap();
        let c = SkinsConfig::load(&path).unwrap();
        assert_eq!(c.active_skin_key, "current_skin");
    }

    #[test]
    fn default_template_names_required_keys() {
        let t = default_template();
        let keys = t["Preferences"].as_array().unwrap();
        assert!(keys.contains(&json!("color_scheme")));
        assert!(keys.contains(&json!("theme")));
    }
}
