//! JSON tree helpers shared by the store backends.

use serde_json::{Map, Value};

use super::is_server_timestamp;

/// Value stored under `segments`, treating an empty root as absent.
pub(crate) fn value_at<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    match current {
        Value::Object(map) if map.is_empty() => None,
        Value::Null => None,
        other => Some(other),
    }
}

/// Drop nulls and empty objects the way the realtime store does.
pub(crate) fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, child)| normalize(child).map(|child| (key, child)))
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                Some(Value::Object(cleaned))
            }
        }
        other => Some(other),
    }
}

/// Replace every server timestamp placeholder with `now_ms`.
pub(crate) fn resolve_server_values(value: Value, now_ms: i64) -> Value {
    if is_server_timestamp(&value) {
        return Value::from(now_ms);
    }
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| (key, resolve_server_values(child, now_ms)))
                .collect(),
        ),
        other => other,
    }
}

/// Write (or delete, when `value` is `None`) the node under `segments`,
/// pruning parents left empty.
pub(crate) fn write_at(root: &mut Value, segments: &[String], value: Option<Value>) {
    let Some((head, rest)) = segments.split_first() else {
        *root = value.unwrap_or_else(|| Value::Object(Map::new()));
        return;
    };

    if !root.is_object() {
        if value.is_none() {
            return;
        }
        *root = Value::Object(Map::new());
    }
    let Value::Object(map) = root else {
        return;
    };

    if rest.is_empty() {
        match value {
            Some(value) => {
                map.insert(head.clone(), value);
            }
            None => {
                map.remove(head);
            }
        }
        return;
    }

    if value.is_none() && !map.contains_key(head) {
        return;
    }
    let child = map
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    write_at(child, rest, value);
    let emptied = match child {
        Value::Object(children) => children.is_empty(),
        _ => false,
    };
    if emptied {
        map.remove(head);
    }
}
