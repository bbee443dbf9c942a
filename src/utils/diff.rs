//! Field-level diff between two versions of a serializable record.

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Compares the top-level fields of two JSON objects.
///
/// Returns `{field: {"old": .., "new": ..}}` for every field whose value
/// differs, or `None` when nothing changed. Fields listed in `ignored` are
/// skipped. A field present on only one side is reported against `null`.
/// Non-object inputs are compared as a whole under the key `"value"`.
pub fn structural_diff(old: &Value, new: &Value, ignored: &[&str]) -> Option<Value> {
    let mut changes = Map::new();

    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            let keys = old_map
                .keys()
                .chain(new_map.keys().filter(|k| !old_map.contains_key(*k)));
            for key in keys {
                if ignored.contains(&key.as_str()) {
                    continue;
                }
                let before = old_map.get(key).unwrap_or(&Value::Null);
                let after = new_map.get(key).unwrap_or(&Value::Null);
                if before != after {
                    changes.insert(key.clone(), json!({ "old": before, "new": after }));
                }
            }
        }
        _ if old != new => {
            changes.insert("value".to_string(), json!({ "old": old, "new": new }));
        }
        _ => {}
    }

    if changes.is_empty() {
        None
    } else {
        Some(Value::Object(changes))
    }
}

/// [`structural_diff`] over any pair of `Serialize` records.
pub fn diff_records<T: Serialize>(
    old: &T,
    new: &T,
    ignored: &[&str],
) -> Result<Option<Value>, serde_json::Error> {
    let old = serde_json::to_value(old)?;
    let new = serde_json::to_value(new)?;
    Ok(structural_diff(&old, &new, ignored))
}
