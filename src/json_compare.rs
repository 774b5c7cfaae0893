//! Structural comparison of JSON values.
//!
//! Object key order is irrelevant, but both objects must carry exactly the
//! same keys. Array order is significant. Primitives must be exactly equal, so
//! `1` and `1.0` are different values.
//!
//! A mismatch is reported as a value, never as a panic, so callers can assert
//! on it or print it.

use serde_json::Value;
use std::fmt;

/// The first point at which two JSON values diverge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub left_name: String,
    pub right_name: String,
    /// Path of the diverging element, e.g. `$.keys[0].deviceId`.
    pub path: String,
    pub detail: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} and {} differ at {}: {}",
            self.left_name, self.right_name, self.path, self.detail
        )
    }
}

/// Compare `left` against `right`.
pub fn compare(left: &Value, left_name: &str, right: &Value, right_name: &str) -> Result<(), Mismatch> {
    let mut path = String::from("$");
    compare_at(left, right, &mut path).map_err(|(path, detail)| Mismatch {
        left_name: left_name.to_owned(),
        right_name: right_name.to_owned(),
        path,
        detail,
    })
}

/// Compare in both directions and check the two verdicts agree.
///
/// The relation is symmetric by construction, so a disagreement here means the
/// comparator itself is broken. It's reported as a mismatch rather than hidden.
pub fn compare_both_ways(
    left: &Value,
    left_name: &str,
    right: &Value,
    right_name: &str,
) -> Result<(), Mismatch> {
    let forward = compare(left, left_name, right, right_name);
    let backward = compare(right, right_name, left, left_name);

    match (forward, backward) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(mismatch), Err(_)) => Err(mismatch),
        (Ok(()), Err(reverse)) | (Err(reverse), Ok(())) => Err(Mismatch {
            detail: format!("comparison is not symmetric ({})", reverse.detail),
            ..reverse
        }),
    }
}

/// Parse both strings and compare them structurally.
///
/// Text that isn't JSON on either side falls back to exact string equality,
/// which is how plain text columns are checked next to JSON ones.
pub fn compare_text(left: &str, left_name: &str, right: &str, right_name: &str) -> Result<(), Mismatch> {
    match (
        serde_json::from_str::<Value>(left),
        serde_json::from_str::<Value>(right),
    ) {
        (Ok(l), Ok(r)) => compare_both_ways(&l, left_name, &r, right_name),
        _ if left == right => Ok(()),
        _ => Err(Mismatch {
            left_name: left_name.to_owned(),
            right_name: right_name.to_owned(),
            path: "$".to_owned(),
            detail: format!("'{}' != '{}'", left, right),
        }),
    }
}

fn compare_at(left: &Value, right: &Value, path: &mut String) -> Result<(), (String, String)> {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            let mut keys: Vec<&String> = l.keys().collect();
            keys.sort();

            if let Some(missing) = keys.iter().find(|k| !r.contains_key(k.as_str())) {
                return Err((path.clone(), format!("key '{}' missing on the right", missing)));
            }
            let mut extra: Vec<&String> = r.keys().filter(|k| !l.contains_key(k.as_str())).collect();
            extra.sort();
            if let Some(extra) = extra.first() {
                return Err((path.clone(), format!("unexpected key '{}' on the right", extra)));
            }

            for key in keys {
                let len = path.len();
                path.push('.');
                path.push_str(key);
                compare_at(&l[key.as_str()], &r[key.as_str()], path)?;
                path.truncate(len);
            }
            Ok(())
        }
        (Value::Array(l), Value::Array(r)) => {
            if l.len() != r.len() {
                return Err((
                    path.clone(),
                    format!("array length {} != {}", l.len(), r.len()),
                ));
            }
            for (index, (l, r)) in l.iter().zip(r).enumerate() {
                let len = path.len();
                path.push_str(&format!("[{}]", index));
                compare_at(l, r, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        (l, r) if l == r => Ok(()),
        (l, r) => Err((path.clone(), format!("{} != {}", l, r))),
    }
}
