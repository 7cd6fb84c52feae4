//! Helpers for loosely typed JSON documents.
//!
//! Skins and settings are plain JSON. These helpers encode the few rules the
//! rest of the workspace relies on: what counts as "empty", and how a mapping
//! value is merged into an existing one.

use serde_json::{Map, Value};

/// Whether a value carries anything worth writing.
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` are all empty. Writing an empty
/// value to a preference means erasing the key instead.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Shallow-merge `update` into `base`.
///
/// Keys of `base` missing from `update` survive; keys of `update` overwrite
/// or extend. A non-object `base` is replaced by `update` wholesale.
pub fn merge_into(base: Option<Value>, update: &Map<String, Value>) -> Value {
    match base {
        Some(Value::Object(mut existing)) => {
            for (key, value) in update {
                existing.insert(key.clone(), value.clone());
            }
            Value::Object(existing)
        },
        _ => Value::Object(update.clone()),
    }
}

/// Final path segment of a `/`-separated resource path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
    }

    #[test]
    fn truthy_values() {
        for v in [json!(true), json!(1), json!(-2.5), json!("x"), json!([0]), json!({"a": null})] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn merge_preserves_existing_keys() {
        let base = json!({"a": 1, "b": 2});
        let update = json!({"b": 3, "c": 4});
        let merged = merge_into(Some(base), update.as_object().unwrap());
        assert_eq!(merged, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn merge_into_missing_base() {
        let update = json!({"c": 4});
        assert_eq!(merge_into(None, update.as_object().unwrap()), json!({"c": 4}));
    }

    #[test]
    fn merge_replaces_scalar_base() {
        let update = json!({"c": 4});
        assert_eq!(
            merge_into(Some(json!("old")), update.as_object().unwrap()),
            json!({"c": 4})
        );
    }

    #[test]
    fn basename_of_paths() {
        assert_eq!(basename("Packages/Theme - Default/Default.sublime-theme"), "Default.sublime-theme");
        assert_eq!(basename("Monokai.sublime-color-scheme"), "Monokai.sublime-color-scheme");
        assert_eq!(basename("Packages/A/"), "");
    }
}
