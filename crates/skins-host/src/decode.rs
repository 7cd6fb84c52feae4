//! Relaxed JSON decoding for editor resources.
//!
//! Settings and skin files are JSON with two common liberties: `//` and
//! `/* */` comments, and trailing commas before `}` or `]`. Both are stripped
//! before the text is handed to `serde_json`.

use serde_json::{Map, Value};
use skins_types::error::{Result, SkinsError};

use crate::ResourceAccess;

/// Decode relaxed JSON bytes into a value.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| SkinsError::Resource(format!("not UTF-8: {e}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let cleaned = strip_trailing_commas(&strip_comments(text));
    Ok(serde_json::from_str(&cleaned)?)
}

/// Encode a value as JSON, human readable when `pretty` is set.
pub fn encode_value(value: &Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

/// Load and decode a resource that should hold a JSON object.
///
/// Never fails: a missing, malformed, or non-object resource is logged and
/// treated as an empty mapping.
pub fn decode_resource(resources: &dyn ResourceAccess, path: &str) -> Map<String, Value> {
    let decoded = resources.load_resource(path).and_then(|bytes| {
        decode_value(&bytes).map_err(|e| SkinsError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    });
    match decoded {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) => Map::new(),
        Ok(other) => {
            log::warn!("Skins: {path} is not an object (found {other}) -- ignored");
            Map::new()
        },
        Err(e) => {
            log::warn!("Skins: loading {path} failed with {e}");
            Map::new()
        },
    }
}

/// Remove `//` line comments and `/* */` block comments outside strings.
fn strip_comments(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            output.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    output.push(escaped);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                output.push(c);
            },
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        output.push('\n');
                        break;
                    }
                }
            },
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    if skipped == '\n' {
                        output.push('\n');
                    }
                    prev = skipped;
                }
            },
            _ => output.push(c),
        }
    }
    output
}

/// Remove commas directly followed (modulo whitespace) by `}` or `]`.
fn strip_trailing_commas(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let chars: Vec<char> = input.chars().collect();
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            output.push(c);
            if c == '\\' && i + 1 < chars.len() {
                output.push(chars[i + 1]);
                i += 1;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            output.push(c);
        } else if c == ',' {
            let next = chars[i + 1..].iter().copied().find(|ch| !ch.is_whitespace());
            if !matches!(next, Some('}') | Some(']')) {
                output.push(c);
            }
        } else {
            output.push(c);
        }
        i += 1;
    }
    output
}
