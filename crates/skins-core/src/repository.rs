//! Skin discovery and the user's saved skins.

use serde_json::Value;
use skins_host::{ResourceAccess, decode_resource, encode_value};
use skins_types::config::SkinsConfig;
use skins_types::error::{Result, SkinsError};

use crate::skin::{Skin, SkinCollection, SkinData};
use crate::validator::resolve;

/// Finds skins in package resources and persists the user collection.
#[derive(Debug, Clone)]
pub struct SkinRepository {
    skins_pattern: String,
    user_skins: String,
}

impl SkinRepository {
    pub fn new(config: &SkinsConfig) -> Self {
        Self {
            skins_pattern: config.skins_pattern.clone(),
            user_skins: config.user_skins.clone(),
        }
    }

    /// Every valid skin of every package.
    ///
    /// Lazy: each `*.skins` resource is decoded only when the iterator gets
    /// to it. Calling again re-scans the resources.
    pub fn enumerate_all<'r>(
        &self,
        resources: &'r dyn ResourceAccess,
    ) -> impl Iterator<Item = Skin> + 'r {
        resources
            .find_resources(&self.skins_pattern)
            .into_iter()
            .flat_map(move |path| {
                let package = package_of(&path).to_string();
                decode_resource(resources, &path)
                    .into_iter()
                    .filter_map(move |(name, value)| {
                        let data = accept(value, resources)?;
                        Some(Skin {
                            package: package.clone(),
                            name,
                            data,
                        })
                    })
            })
    }

    /// Look up one skin by package and name.
    ///
    /// Only `*.skins` resources whose path contains `package` are searched;
    /// the first valid entry called `name` wins.
    pub fn load_one(
        &self,
        resources: &dyn ResourceAccess,
        package: &str,
        name: &str,
    ) -> Result<Skin> {
        let mut seen_invalid = false;
        for path in resources.find_resources(&self.skins_pattern) {
            if !path.contains(package) {
                continue;
            }
            let Some(value) = decode_resource(resources, &path).remove(name) else {
                continue;
            };
            match accept(value, resources) {
                Some(data) => {
                    return Ok(Skin {
                        package: package.to_string(),
                        name: name.to_string(),
                        data,
                    });
                },
                None => {
                    log::warn!("Skins: {package}/{name} in {path} is invalid");
                    seen_invalid = true;
                },
            }
        }
        let id = format!("{package}/{name}");
        if seen_invalid {
            Err(SkinsError::SkinInvalid(id))
        } else {
            Err(SkinsError::SkinNotFound(id))
        }
    }

    /// The user's saved skins. Invalid entries are dropped, not repaired.
    pub fn load_user_collection(&self, resources: &dyn ResourceAccess) -> SkinCollection {
        decode_resource(resources, &self.user_skins)
            .into_iter()
            .filter_map(|(name, value)| accept(value, resources).map(|data| (name, data)))
            .collect()
    }

    /// Replace the user's saved skins with `collection`.
    pub fn save_user_collection(
        &self,
        resources: &mut dyn ResourceAccess,
        collection: &SkinCollection,
    ) -> Result<()> {
        let text = encode_value(&serde_json::to_value(collection)?, true)?;
        resources.write_resource(&self.user_skins, text.as_bytes())?;
        log::info!("Saved {} user skin(s) to {}", collection.len(), self.user_skins);
        Ok(())
    }

    /// Whether the user has at least one valid saved skin.
    pub fn has_user_skins(&self, resources: &dyn ResourceAccess) -> bool {
        decode_resource(resources, &self.user_skins)
            .into_iter()
            .any(|(_, value)| accept(value, resources).is_some())
    }
}

/// Package owning a resource: the segment after `Packages/`.
fn package_of(path: &str) -> &str {
    path.split('/').nth(1).unwrap_or_default()
}

/// Validate a decoded entry and point it at its resolved color scheme.
fn accept(value: Value, resources: &dyn ResourceAccess) -> Option<SkinData> {
    let mut data = SkinData::from_value(value)?;
    let resolved = resolve(&data, resources)?;
    if data.preference_str("color_scheme") != Some(resolved.color_scheme.as_str()) {
        log::debug!("Skins: color scheme resolved to {}", resolved.color_scheme);
        data.set_preference("color_scheme", Value::String(resolved.color_scheme));
    }
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skins_host::MemoryResources;

    const SCHEME: &str = "Packages/Color Scheme - Default/Monokai.sublime-color-scheme";
    const THEME: &str = "Packages/Theme - Default/Default.sublime-theme";

    fn skin_json(scheme: &str) -> Value {
        json!({"Preferences": {"color_scheme": scheme, "theme": THEME}})
    }

    fn resources() -> MemoryResources {
        let mut res = MemoryResources::new();
        res.insert(SCHEME, "{}");
        res.insert(THEME, "[]");
        res.insert(
            "Packages/Theme - Spacegray/Spacegray.skins",
            json!({
                "Dark": skin_json(SCHEME),
                "Broken": skin_json("Missing.sublime-color-scheme"),
                "Light": skin_json(SCHEME),
            })
            .to_string(),
        );
        res.insert(
            "Packages/Another/Another.skins",
            json!({"Only": skin_json(SCHEME)}).to_string(),
        );
        res.insert("Packages/Garbage/Garbage.skins", "{ not json");
        res
    }

    fn repo() -> SkinRepository {
        SkinRepository::new(&SkinsConfig::default())
    }

    #[test]
    fn enumerate_yields_valid_skins_in_order() {
        let res = resources();
        let ids: Vec<String> = repo().enumerate_all(&res).map(|s| s.id()).collect();
        assert_eq!(
            ids,
            vec!["Another/Only", "Theme - Spacegray/Dark", "Theme - Spacegray/Light"]
        );
    }

    #[test]
    fn enumerate_rescans() {
        let mut res = resources();
        let r = repo();
        assert_eq!(r.enumerate_all(&res).count(), 3);
        res.insert("Packages/New/New.skins", json!({"N": skin_json(SCHEME)}).to_string());
        assert_eq!(r.enumerate_all(&res).count(), 4);
    }

    #[test]
    fn enumerate_rewrites_moved_scheme() {
        let mut res = resources();
        res.insert(
            "Packages/Old/Old.skins",
            json!({"Moved": skin_json("Packages/Gone/Monokai.sublime-color-scheme")}).to_string(),
        );
        let moved = repo().enumerate_all(&res).find(|s| s.name == "Moved").unwrap();
        assert_eq!(moved.data.preference_str("color_scheme"), Some(SCHEME));
    }

    #[test]
    fn load_one_found() {
        let res = resources();
        let skin = repo().load_one(&res, "Spacegray", "Light").unwrap();
        assert_eq!(skin.id(), "Spacegray/Light");
        assert!(skin.data.preferences().is_some());
    }

    #[test]
    fn load_one_not_found_and_invalid() {
        let res = resources();
        assert!(matches!(
            repo().load_one(&res, "Spacegray", "Nope"),
            Err(SkinsError::SkinNotFound(_))
        ));
        assert!(matches!(
            repo().load_one(&res, "Another", "Dark"),
            Err(SkinsError::SkinNotFound(_))
        ));
        assert!(matches!(
            repo().load_one(&res, "Spacegray", "Broken"),
            Err(SkinsError::SkinInvalid(_))
        ));
    }

    #[test]
    fn user_collection_drops_invalid() {
        let mut res = resources();
        res.insert(
            "Packages/User/Saved Skins.skins",
            json!({
                "Good": skin_json(SCHEME),
                "Bad": skin_json("Missing.sublime-color-scheme"),
                "Weird": 42
            })
            .to_string(),
        );
        let r = repo();
        let skins = r.load_user_collection(&res);
        assert_eq!(skins.keys().collect::<Vec<_>>(), vec!["Good"]);
        assert!(r.has_user_skins(&res));
    }

    #[test]
    fn no_user_file_is_empty() {
        let res = resources();
        let r = repo();
        assert!(r.load_user_collection(&res).is_empty());
        assert!(!r.has_user_skins(&res));
    }

    #[test]
    fn save_then_load_keeps_valid_entries() {
        let mut res = resources();
        let r = repo();
        let mut collection = SkinCollection::new();
        collection.insert("A".into(), SkinData::from_value(skin_json(SCHEME)).unwrap());
        collection.insert(
            "B".into(),
            SkinData::from_value(skin_json("Missing.sublime-color-scheme")).unwrap(),
        );
        r.save_user_collection(&mut res, &collection).unwrap();
        assert_eq!(res.write_count(), 1);

        let loaded = r.load_user_collection(&res);
        let expected: SkinCollection = collection
            .into_iter()
            .filter(|(_, d)| crate::validator::is_valid(d, &res))
            .collect();
        assert_eq!(loaded, expected);
        assert!(res.text("Packages/User/Saved Skins.skins").unwrap().contains('\n'));
    }

    #[test]
    fn user_skins_enumerate_as_user_package() {
        let mut res = resources();
        res.insert(
            "Packages/User/Saved Skins.skins",
            json!({"Preset 1": skin_json(SCHEME)}).to_string(),
        );
        assert!(repo().enumerate_all(&res).any(|s| s.id() == "User/Preset 1"));
    }

    #[test]
    fn package_of_paths() {
        assert_eq!(package_of("Packages/User/Saved Skins.skins"), "User");
        assert_eq!(package_of("Packages"), "");
    }
}
