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


use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ast::Type;
use crate::error::{MiniparError, Result};
use crate::interpreter::channels::{ClientChannel, ServerChannel};

/// Minipar runtime value representation.
///
/// This is the core type that flows through the runner. Every expression
/// ultimately evaluates to one of these. Collections are shared handles:
/// cloning a list or dict value aliases the same container, which is how
/// `append` and index assignment are seen through every name bound to it.
#[derive(Clone)]
pub enum Value {
    // Primitive scalars
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),

    /// Result of calls that produce nothing.
    Void,

    // Shared, thread-safe containers
    List(Arc<Mutex<Vec<Value>>>),
    Dict(Arc<Mutex<BTreeMap<String, Value>>>),

    // Network endpoints bound by `c_channel` / `s_channel`
    Client(Arc<ClientChannel>),
    Server(Arc<ServerChannel>),
}

/// Locks a runtime mutex, recovering the data if a worker panicked while
/// holding it.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Value {
    pub fn list(values: Vec<Value>) -> Value {
        Value::List(Arc::new(Mutex::new(values)))
    }

    pub fn dict(entries: BTreeMap<String, Value>) -> Value {
        Value::Dict(Arc::new(Mutex::new(entries)))
    }

    /// The value an uninitialised declaration of type `ty` starts with.
    pub fn zero(ty: Type) -> Value {
        match ty {
            Type::Number => Value::Int(0),
            Type::String => Value::String(String::new()),
            Type::Bool => Value::Bool(false),
            Type::List => Value::list(Vec::new()),
            Type::Dict => Value::dict(BTreeMap::new()),
            Type::Func | Type::Void | Type::ClientChannel | Type::ServerChannel => Value::Void,
        }
    }

    /// The static tag a value of this shape would carry, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::Float(_) => "NUMBER",
            Value::String(_) => "STRING",
            Value::Bool(_) => "BOOL",
            Value::Void => "VOID",
            Value::List(_) => "LIST",
            Value::Dict(_) => "DICT",
            Value::Client(_) => "C_CHANNEL",
            Value::Server(_) => "S_CHANNEL",
        }
    }

    /// Numeric view of a value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }
}

/// Nesting beyond which two collections are no longer compared. Lists
/// that contain themselves would otherwise recurse forever.
pub const MAX_COMPARE_DEPTH: usize = 64;

impl Value {
    /// Structural equality that reports collections nested too deeply to
    /// compare instead of recursing without bound.
    ///
    /// # Errors
    /// A runtime error once both sides are still collections after
    /// [`MAX_COMPARE_DEPTH`] levels.
    pub fn equals(&self, other: &Value) -> Result<bool> {
        self.equals_at(other, 0)
    }

    fn equals_at(&self, other: &Value, depth: usize) -> Result<bool> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a == b),
            (a, b) if a.is_number() && b.is_number() => Ok(a.as_f64() == b.as_f64()),
            (Value::String(a), Value::String(b)) => Ok(a == b),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Void, Value::Void) => Ok(true),

            // Elements are snapshotted so no lock is held while nested
            // values compare.
            (Value::List(a), Value::List(b)) => {
                if Arc::ptr_eq(a, b) {
                    return Ok(true);
                }
                if depth >= MAX_COMPARE_DEPTH {
                    return Err(too_deep());
                }
                let a = lock(a).clone();
                let b = lock(b).clone();
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(&b) {
                    if !x.equals_at(y, depth + 1)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            (Value::Dict(a), Value::Dict(b)) => {
                if Arc::ptr_eq(a, b) {
                    return Ok(true);
                }
                if depth >= MAX_COMPARE_DEPTH {
                    return Err(too_deep());
                }
                let a = lock(a).clone();
                let b = lock(b).clone();
                if a.len() != b.len() {
                    return Ok(false);
                }
                for ((ka, va), (kb, vb)) in a.iter().zip(&b) {
                    if ka != kb || !va.equals_at(vb, depth + 1)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            (Value::Client(a), Value::Client(b)) => Ok(Arc::ptr_eq(a, b)),
            (Value::Server(a), Value::Server(b)) => Ok(Arc::ptr_eq(a, b)),
            _ => Ok(false),
        }
    }
}

fn too_deep() -> MiniparError {
    MiniparError::runtime(format!(
        "collections nested more than {MAX_COMPARE_DEPTH} levels deep cannot be compared"
    ))
}

/// Structural equality: numbers compare by value across int/float,
/// collections element-wise, channels by identity. Collections too deep to
/// compare are unequal.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.equals(other).unwrap_or(false)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Void => write!(f, "Void"),
            Value::List(values) => write!(f, "[List len={}]", lock(values).len()),
            Value::Dict(entries) => write!(f, "[Dict len={}]", lock(entries).len()),
            Value::Client(channel) => write!(f, "[ClientChannel {}:{}]", channel.host, channel.port),
            Value::Server(channel) => write!(f, "[ServerChannel {}:{}]", channel.host, channel.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_compare_across_representations() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_ne!(Value::Int(2), Value::String("2".into()));
    }

    #[test]
    fn lists_compare_by_content_and_share_on_clone() {
        let a = Value::list(vec![Value::Int(1), Value::String("x".into())]);
        let b = Value::list(vec![Value::Int(1), Value::String("x".into())]);
        assert_eq!(a, b);

        let alias = a.clone();
        if let Value::List(items) = &alias {
            lock(items).push(Value::Bool(true));
        }
        assert_ne!(a, b);
        assert_eq!(a, alias);
    }

    #[test]
    fn zero_values_follow_declared_type() {
        assert_eq!(Value::zero(Type::Number), Value::Int(0));
        assert_eq!(Value::zero(Type::String), Value::String(String::new()));
        assert_eq!(Value::zero(Type::List), Value::list(Vec::new()));
    }

    #[test]
    fn self_containing_lists_do_not_recurse_forever() {
        let a = Value::list(Vec::new());
        let b = Value::list(Vec::new());
        for list in [&a, &b] {
            if let Value::List(items) = list {
                let alias = list.clone();
                lock(items).push(alias);
            }
        }

        assert!(a.equals(&b).is_err());
        assert_ne!(a, b);
        assert_eq!(a.equals(&a.clone()).ok(), Some(true));
    }
}
