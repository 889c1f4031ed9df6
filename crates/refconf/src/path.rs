//! dotted key paths over a document tree
//!
//! A key such as `level_1.items.0.name` is split on `.`. Each segment either names a key of an object or, when the
//! current node is an array and the segment is all digits, an index into that array.
//!
//! Arrays are read-only for [set]: it auto-vivifies missing objects on the way down but refuses to traverse or
//! write into arrays.
use crate::error::{Error, Result};
use crate::value::{Map, Value};

fn segments(key: &str) -> Result<Vec<&str>> {
    if key.is_empty() {
        return Err(Error::invalid_key("Cannot access an empty key"));
    }

    Ok(key.split('.').collect())
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Step from `current` into `segment`
///
/// `Ok(None)` means the segment does not exist, scalars can not be stepped into at all.
fn step<'a>(current: &'a Value, segment: &str) -> Result<Option<&'a Value>> {
    match current {
        Value::Array(array) => {
            if !is_index(segment) {
                return Ok(None);
            }
            Ok(segment.parse::<usize>().ok().and_then(|i| array.get(i)))
        }
        Value::Object(object) => Ok(object.get(segment)),
        other => Err(Error::invalid_key(format!(
            "Cannot access '{segment}' in {}",
            other.kind()
        ))),
    }
}

/// Look up `key` in `root`
///
/// Missing keys, out of range indices and `null` values all yield `Ok(None)`.
pub fn get<'a>(root: &'a Map, key: &str) -> Result<Option<&'a Value>> {
    let segments = segments(key)?;
    let Some((first, rest)) = segments.split_first() else {
        return Ok(None);
    };

    let Some(mut current) = root.get(*first) else {
        return Ok(None);
    };

    for segment in rest {
        match step(current, segment)? {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }

    tracing::trace!(key, kind = current.kind(), "get");
    Ok((!current.is_null()).then_some(current))
}

/// Look up `key` in `root` and fall back to `default` when it is missing
pub fn get_or(root: &Map, key: &str, default: impl Into<Value>) -> Result<Value> {
    Ok(get(root, key)?.cloned().unwrap_or_else(|| default.into()))
}

/// Test if `key` addresses an existing node
///
/// Never fails: any step that can not be taken makes the key absent.
pub fn exists(root: &Map, key: &str) -> bool {
    let Ok(segments) = segments(key) else {
        return false;
    };
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };

    let Some(mut current) = root.get(*first) else {
        return false;
    };

    for segment in rest {
        match step(current, segment) {
            Ok(Some(next)) => current = next,
            _ => return false,
        }
    }

    true
}

/// Store `value` at `key`, creating intermediate objects as needed
pub fn set(root: &mut Map, key: &str, value: impl Into<Value>) -> Result<()> {
    let segments = segments(key)?;
    let Some((last, intermediate)) = segments.split_last() else {
        return Err(Error::invalid_key("Cannot set an empty key"));
    };

    let mut current = root;
    for (depth, segment) in intermediate.iter().enumerate() {
        let next = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if next.is_null() {
            *next = Value::Object(Map::new());
        }

        current = match next {
            Value::Object(object) => object,
            other => {
                let path = segments[..=depth].join(".");
                let is_last = depth + 1 == intermediate.len();
                return Err(refuse(other, segments[depth + 1], is_last, &path));
            }
        };
    }

    tracing::trace!(key, "set");
    current.insert(last.to_string(), value.into());
    Ok(())
}

fn refuse(container: &Value, segment: &str, is_last: bool, path: &str) -> Error {
    let kind = container.kind();
    if is_last {
        return Error::invalid_key(format!(
            "Cannot set '{segment}' in {kind} at path '{path}'"
        ));
    }

    if matches!(container, Value::Array(_)) && is_index(segment) {
        return Error::invalid_key(format!(
            "Cannot set value in array at index '{segment}' in path '{path}'"
        ));
    }

    Error::invalid_key(format!(
        "Cannot access '{segment}' in {kind} at path '{path}'"
    ))
}
