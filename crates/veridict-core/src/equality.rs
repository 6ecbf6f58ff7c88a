//! Floating-point-tolerant deep equality.
//!
//! This is the cache-invalidation contract: a model rerun that reproduces the
//! same results up to `tolerance` in every score must not be treated as a
//! change. Comparison is structural over JSON-like values so nested payloads
//! (faces, frames) participate.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::types::CachedResult;

/// Recursive structural equality with a numeric tolerance.
///
/// Numbers are equal when their absolute difference is at most `tolerance`.
/// Objects are compared over the union of their keys, with an absent key
/// equal to `null` — an object carrying extra null-valued keys is still equal
/// to one without them. Arrays must match in length and element-wise.
pub fn tolerant_eq(a: &Value, b: &Value, tolerance: f64) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => (x - y).abs() <= tolerance,
            _ => x == y,
        },
        (Value::Object(x), Value::Object(y)) => {
            x.keys().chain(y.keys()).all(|key| {
                let xv = x.get(key).unwrap_or(&Value::Null);
                let yv = y.get(key).unwrap_or(&Value::Null);
                tolerant_eq(xv, yv, tolerance)
            })
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|(xv, yv)| tolerant_eq(xv, yv, tolerance))
        }
        _ => a == b,
    }
}

/// Tolerant equality over two cached-result maps.
///
/// A model id present on one side only is a real difference; a score drifting
/// by at most `tolerance` is not.
pub fn results_equal(
    a: &FxHashMap<String, CachedResult>,
    b: &FxHashMap<String, CachedResult>,
    tolerance: f64,
) -> bool {
    a.keys().chain(b.keys()).all(|key| {
        let av = a
            .get(key)
            .and_then(|r| serde_json::to_value(r).ok())
            .unwrap_or(Value::Null);
        let bv = b
            .get(key)
            .and_then(|r| serde_json::to_value(r).ok())
            .unwrap_or(Value::Null);
        tolerant_eq(&av, &bv, tolerance)
    })
}
