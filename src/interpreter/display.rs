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


use crate::value::{lock, Value};

/// Nesting beyond which collections are elided. Guards against lists that
/// contain themselves.
const MAX_RENDER_DEPTH: usize = 64;

/// ============================================================================
/// value_to_string
/// ============================================================================
/// Converts a minipar runtime `Value` into a **human-readable string**.
/// This is used by:
///   - `print()` and `to_string()`
///   - string concatenation of channel replies
///
/// Examples:
///   - Int(3)            → "3"
///   - Float(2.0)        → "2.0"
///   - String("cat")     → "cat"
///   - List([1, "a"])    → "[1, \"a\"]"
///   - Dict({"k": true}) → "{\"k\": true}"
/// ============================================================================
pub fn value_to_string(val: &Value) -> String {
    render(val, false, 0)
}

fn render(val: &Value, quoted: bool, depth: usize) -> String {
    match val {
        // ------------------------
        // Primitive Types
        // ------------------------
        Value::Int(n) => n.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Bool(b) => b.to_string(),
        Value::Void => "void".to_string(),
        Value::String(s) if quoted => format!("\"{s}\""),
        Value::String(s) => s.clone(),

        // ------------------------
        // Collections: elements are snapshotted so no lock is held while
        // nested values render
        // ------------------------
        Value::List(values) => {
            if depth >= MAX_RENDER_DEPTH {
                return "[...]".to_string();
            }
            let items = lock(values).clone();
            let parts: Vec<String> = items.iter().map(|v| render(v, true, depth + 1)).collect();
            format!("[{}]", parts.join(", "))
        }

        Value::Dict(entries) => {
            if depth >= MAX_RENDER_DEPTH {
                return "{...}".to_string();
            }
            let entries = lock(entries).clone();
            let parts: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("\"{k}\": {}", render(v, true, depth + 1)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }

        // ------------------------
        // Channels
        // ------------------------
        Value::Client(channel) => format!("<c_channel {}:{}>", channel.host, channel.port),
        Value::Server(channel) => format!("<s_channel {} {}:{}>", channel.description, channel.host, channel.port),
    }
}

/// Floats always show a fractional part so they read differently from ints.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{sign}inf")
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

/// ============================================================================
/// value_to_json
/// ============================================================================
/// Converts a runtime value into a `serde_json::Value` for `debug()`.
/// Channels become descriptive strings; `void` becomes `null`.
/// ============================================================================
pub fn value_to_json(val: &Value) -> serde_json::Value {
    json_at(val, 0)
}

fn json_at(val: &Value, depth: usize) -> serde_json::Value {
    match val {
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Void => serde_json::Value::Null,

        Value::List(_) | Value::Dict(_) if depth >= MAX_RENDER_DEPTH => {
            serde_json::Value::String("...".to_string())
        }

        Value::List(values) => {
            let items = lock(values).clone();
            serde_json::Value::Array(items.iter().map(|v| json_at(v, depth + 1)).collect())
        }

        Value::Dict(entries) => {
            let entries = lock(entries).clone();
            let map = entries
                .iter()
                .map(|(k, v)| (k.clone(), json_at(v, depth + 1)))
                .collect();
            serde_json::Value::Object(map)
        }

        Value::Client(_) | Value::Server(_) => serde_json::Value::String(value_to_string(val)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn scalars_render_plainly() {
        assert_eq!(value_to_string(&Value::Int(7)), "7");
        assert_eq!(value_to_string(&Value::Float(3.5)), "3.5");
        assert_eq!(value_to_string(&Value::Float(2.0)), "2.0");
        assert_eq!(value_to_string(&Value::Bool(true)), "true");
        assert_eq!(value_to_string(&Value::String("hi".into())), "hi");
    }

    #[test]
    fn collections_quote_their_strings() {
        let list = Value::list(vec![Value::Int(1), Value::String("a".into())]);
        assert_eq!(value_to_string(&list), "[1, \"a\"]");

        let mut entries = BTreeMap::new();
        entries.insert("k".to_string(), Value::Bool(false));
        assert_eq!(value_to_string(&Value::dict(entries)), "{\"k\": false}");
    }

    #[test]
    fn self_containing_list_terminates() {
        let list = Value::list(vec![Value::Int(1)]);
        if let Value::List(items) = &list {
            lock(items).push(list.clone());
        }
        assert!(value_to_string(&list).contains("[...]"));
    }

    #[test]
    fn json_view() {
        let list = Value::list(vec![Value::Int(1), Value::Void, Value::Float(0.5)]);
        assert_eq!(value_to_json(&list).to_string(), "[1,null,0.5]");
    }
}
