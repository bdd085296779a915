/*
 * ==========================================================================
 * MINIPAR - Parallel blocks & network channels
 * ==========================================================================
 *
 * License:
 * This file is part of the MINIPAR programming language project.
 *
 * MINIPAR is dual-licensed under the terms of:
 *   - The MIT license
 *   - The Apache License, Version 2.0
 *
 * You may choose either license to govern your use of this software.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * ==========================================================================
 */


use crate::error::{MiniparError, Result};
use crate::value::{lock, Value};

/// Determines whether a runtime `Value` is considered **truthy** in minipar.
///
/// This function defines the **boolean coercion rules** used by:
/// - Logical operators (`&&`, `||`, `!`)
/// - Conditional statements (`if`, `while`)
/// - `to_bool()`
///
/// # Truthiness Rules
/// The following values are considered **false**:
/// - `false`
/// - `void`
/// - `0` and `0.0`
/// - `""` (empty string)
/// - empty lists and dicts
///
/// All other values, channels included, are **true**.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Void => false,
        Value::Int(n) => *n != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::List(values) => !lock(values).is_empty(),
        Value::Dict(entries) => !lock(entries).is_empty(),
        Value::Client(_) | Value::Server(_) => true,
    }
}

/// Elements visited by `for` and comprehensions.
///
/// Lists yield a snapshot of their elements, dicts their keys, strings
/// their characters.
pub fn iterate(value: &Value) -> Result<Vec<Value>> {
    match value {
        Value::List(values) => Ok(lock(values).clone()),
        Value::Dict(entries) => Ok(lock(entries).keys().cloned().map(Value::String).collect()),
        Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string())).collect()),
        other => Err(MiniparError::runtime(format!(
            "cannot iterate over a {}",
            other.type_name()
        ))),
    }
}

/// Reads an integral number. Floats are accepted when they have no
/// fractional part.
pub fn as_int(value: &Value, what: &str) -> Result<i64> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(*f as i64),
        other => Err(MiniparError::runtime(format!(
            "{what} must be an integer, found {}",
            other.type_name()
        ))),
    }
}

/// Reads a string value.
pub fn as_str<'a>(value: &'a Value, what: &str) -> Result<&'a str> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(MiniparError::runtime(format!(
            "{what} must be a STRING, found {}",
            other.type_name()
        ))),
    }
}

/// Resolves a possibly negative index against a length.
///
/// # Returns
/// `None` when the index falls outside `0..len`.
pub fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let resolved = if index < 0 { index + len } else { index };
    if (0..len).contains(&resolved) {
        Some(resolved as usize)
    } else {
        None
    }
}

/// Resolves optional slice bounds against a length, clamping like Python.
/// An empty range comes back as `(start, start)`.
pub fn slice_bounds(start: Option<i64>, end: Option<i64>, len: usize) -> (usize, usize) {
    let len_i = len as i64;
    let clamp = |bound: i64| -> usize {
        let bound = if bound < 0 { bound + len_i } else { bound };
        bound.clamp(0, len_i) as usize
    };

    let start = start.map(clamp).unwrap_or(0);
    let end = end.map(clamp).unwrap_or(len);
    (start, end.max(start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_truthiness() {
        assert!(!is_truthy(&Value::Int(0)));
        assert!(!is_truthy(&Value::String(String::new())));
        assert!(!is_truthy(&Value::list(Vec::new())));
        assert!(is_truthy(&Value::list(vec![Value::Int(0)])));
        assert!(is_truthy(&Value::Float(0.1)));
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(3, 3), None);
        assert_eq!(resolve_index(-4, 3), None);
    }

    #[test]
    fn slice_bounds_clamp() {
        assert_eq!(slice_bounds(Some(1), Some(3), 5), (1, 3));
        assert_eq!(slice_bounds(None, Some(-1), 5), (0, 4));
        assert_eq!(slice_bounds(Some(4), Some(2), 5), (4, 4));
        assert_eq!(slice_bounds(Some(-10), None, 5), (0, 5));
    }
}
