//! Error types for the skins manager.

use std::io;

/// Errors produced while loading, validating, saving, or applying skins.
#[derive(Debug, thiserror::Error)]
pub enum SkinsError {
    #[error("resource error: {0}")]
    Resource(String),

    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("skin not found: {0}")]
    SkinNotFound(String),

    #[error("invalid skin: {0}")]
    SkinInvalid(String),

    #[error("settings error in {namespace}: {reason}")]
    Settings { namespace: String, reason: String },

    #[error("no user skins")]
    EmptyCollection,

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SkinsError {
    /// Shorthand for a [`SkinsError::Settings`] failure.
    pub fn settings(namespace: &str, reason: impl Into<String>) -> Self {
        Self::Settings {
            namespace: namespace.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SkinsError>;
