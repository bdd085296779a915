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


use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use crate::ast::FuncDef;
use crate::value::{lock, Value};

/// Deepest scope chain a run may build before calls are refused.
pub const MAX_SCOPE_DEPTH: usize = 1024;

/// One frame of the runtime scope chain.
///
/// Frames are reference counted so that `par` workers and server threads
/// can hang their own frames off a shared parent. Each frame locks only its
/// own bindings, one frame at a time during lookup.
#[derive(Debug)]
pub struct VarTable {
    values: Mutex<HashMap<String, Value>>,
    parent: Option<Arc<VarTable>>,
    depth: usize,
}

impl VarTable {
    /// The global frame.
    pub fn root() -> Arc<VarTable> {
        Arc::new(Self {
            values: Mutex::new(HashMap::new()),
            parent: None,
            depth: 0,
        })
    }

    /// A fresh frame whose lookups fall through to `parent`.
    pub fn child(parent: &Arc<VarTable>) -> Arc<VarTable> {
        Arc::new(Self {
            values: Mutex::new(HashMap::new()),
            parent: Some(Arc::clone(parent)),
            depth: parent.depth + 1,
        })
    }

    /// Number of frames above this one.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Binds `name` in this frame, replacing any previous binding here.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        lock(&self.values).insert(name.into(), value);
    }

    /// Resolves a name, innermost frame first.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = lock(&self.values).get(name) {
            return Some(value.clone());
        }

        match &self.parent {
            Some(parent) => parent.get(name),
            None => None,
        }
    }

    /// Rebinds the nearest existing `name`.
    ///
    /// # Returns
    /// `false` when no frame in the chain binds the name.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        {
            let mut values = lock(&self.values);
            if let Some(slot) = values.get_mut(name) {
                *slot = value;
                return true;
            }
        }

        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }

    /// Copies the bindings of every frame, innermost first.
    pub fn frames(&self) -> Vec<BTreeMap<String, Value>> {
        let mut frames = Vec::new();
        let mut frame = Some(self);
        while let Some(current) = frame {
            let bindings = lock(&current.values)
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();
            frames.push(bindings);
            frame = current.parent.as_deref();
        }
        frames
    }
}

/// The flat, run-wide table of user functions.
#[derive(Debug, Default)]
pub struct FuncTable {
    functions: RwLock<HashMap<String, Arc<FuncDef>>>,
}

impl FuncTable {
    pub fn define(&self, func: Arc<FuncDef>) {
        let mut functions = self
            .functions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        functions.insert(func.name.clone(), func);
    }

    pub fn get(&self, name: &str) -> Option<Arc<FuncDef>> {
        let functions = self
            .functions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        functions.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let globals = VarTable::root();
        globals.define("x", Value::Int(1));
        let inner = VarTable::child(&globals);
        inner.define("y", Value::Int(2));

        assert_eq!(inner.get("x"), Some(Value::Int(1)));
        assert_eq!(inner.get("y"), Some(Value::Int(2)));
        assert_eq!(globals.get("y"), None);
        assert_eq!(inner.depth(), 1);
    }

    #[test]
    fn assignment_updates_the_defining_frame() {
        let globals = VarTable::root();
        globals.define("x", Value::Int(1));
        let inner = VarTable::child(&globals);

        assert!(inner.assign("x", Value::Int(5)));
        assert_eq!(globals.get("x"), Some(Value::Int(5)));
        assert!(!inner.assign("missing", Value::Void));
    }

    #[test]
    fn shadowing_leaves_outer_binding() {
        let globals = VarTable::root();
        globals.define("x", Value::Int(1));
        let inner = VarTable::child(&globals);
        inner.define("x", Value::String("inner".into()));
        inner.assign("x", Value::String("changed".into()));

        assert_eq!(globals.get("x"), Some(Value::Int(1)));
        assert_eq!(inner.frames().len(), 2);
    }
}
