//! Skin validation.
//!
//! A skin is only usable if the editor can find both its color scheme and
//! its theme. Lookup is by file name, since skins often record a path from
//! another machine or an older package layout.

use skins_host::ResourceAccess;
use skins_types::value::basename;

use crate::skin::SkinData;

/// Suffix a linter adds to the color schemes it patches. The patched copy is
/// regenerated on demand, so skins must point at the original.
const PATCHED_MARK: &str = " (SL)";

/// Resource paths a valid skin resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Color scheme to apply. Equal to the stored path when that exists,
    /// otherwise the first resource with the same file name.
    pub color_scheme: String,
    /// First resource matching the theme's file name.
    pub theme: String,
}

/// Resolve the color scheme and theme of a skin, or `None` if it is invalid.
///
/// Malformed data (no `Preferences`, missing or non-string keys) is invalid,
/// never a panic. No side effects.
pub fn resolve(data: &SkinData, resources: &dyn ResourceAccess) -> Option<Resolved> {
    let theme_path = data.preference_str("theme")?;
    let scheme_path = data.preference_str("color_scheme")?;

    let theme = find_by_name(resources, basename(theme_path)).into_iter().next()?;

    let (dir, tail) = match scheme_path.rfind('/') {
        Some(i) => (&scheme_path[..i], &scheme_path[i + 1..]),
        None => ("", scheme_path),
    };
    let name = tail.replace(PATCHED_MARK, "");
    let schemes = find_by_name(resources, &name);
    let exact = format!("{dir}/{name}");
    let color_scheme = schemes
        .iter()
        .find(|found| **found == exact)
        .or_else(|| schemes.first())?
        .clone();

    Some(Resolved {
        color_scheme,
        theme,
    })
}

/// Whether both the color scheme and the theme of a skin can be found.
pub fn is_valid(data: &SkinData, resources: &dyn ResourceAccess) -> bool {
    resolve(data, resources).is_some()
}

fn find_by_name(resources: &dyn ResourceAccess, name: &str) -> Vec<String> {
    if name.is_empty() {
        return Vec::new();
    }
    resources.find_resources(&glob::Pattern::escape(name))
}
