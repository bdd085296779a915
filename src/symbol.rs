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


use std::collections::HashMap;

use crate::ast::Type;

/// Result types of every built-in function, shared by the parser (which
/// seeds the root scope with these names) and the checker (which types
/// built-in calls from this table).
pub const BUILTIN_SIGNATURES: &[(&str, Type)] = &[
    ("print", Type::Void),
    ("input", Type::String),
    ("sleep", Type::Void),
    ("to_number", Type::Number),
    ("to_string", Type::String),
    ("to_bool", Type::Bool),
    ("send", Type::String),
    ("close", Type::Void),
    ("listen", Type::Void),
    ("len", Type::Number),
    ("isalpha", Type::Bool),
    ("isnum", Type::Bool),
    ("sum", Type::Number),
    ("pow", Type::Number),
    ("sqrt", Type::Number),
    ("exp", Type::Number),
    ("range", Type::List),
    ("random", Type::Number),
    ("intersection", Type::List),
    ("contains", Type::Bool),
    ("isEmpty", Type::Bool),
    ("append", Type::Void),
    ("sort", Type::Void),
    ("strip", Type::String),
    ("lower", Type::String),
    ("keys", Type::List),
    ("split", Type::List),
    ("debug", Type::Void),
];

/// Looks up the result type of a built-in by name.
pub fn builtin_type(name: &str) -> Option<Type> {
    BUILTIN_SIGNATURES
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, ty)| *ty)
}

/// A compile-time binding: a declared name and its static type.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Compile-time scope chain used by the parser.
///
/// The innermost scope owns its enclosing scope through `prev`; entering a
/// block moves the current table into a fresh one and leaving it moves the
/// parent back. Lookup walks outward and fails once the chain is exhausted.
#[derive(Debug, Default)]
pub struct SymTable {
    table: HashMap<String, Symbol>,
    prev: Option<Box<SymTable>>,
}

impl SymTable {
    /// The root scope, pre-populated with every built-in as `FUNC`.
    pub fn with_builtins() -> Self {
        let mut root = SymTable::default();
        for (name, _) in BUILTIN_SIGNATURES {
            root.insert(Symbol::new(*name, Type::Func));
        }
        root
    }

    /// Declares a symbol in the innermost scope.
    ///
    /// # Returns
    /// - `true` if the name was new in this scope
    /// - `false` if it was already declared here (nothing is overwritten)
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        if self.table.contains_key(&symbol.name) {
            return false;
        }
        self.table.insert(symbol.name.clone(), symbol);
        true
    }

    /// Resolves a name, innermost scope first.
    pub fn find(&self, name: &str) -> Option<&Symbol> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(symbol) = current.table.get(name) {
                return Some(symbol);
            }
            scope = current.prev.as_deref();
        }
        None
    }

    /// Opens a nested scope.
    pub fn push(&mut self) {
        let outer = std::mem::take(self);
        self.prev = Some(Box::new(outer));
    }

    /// Closes the innermost scope, discarding its bindings. Popping the root
    /// scope is a no-op.
    pub fn pop(&mut self) {
        if let Some(outer) = self.prev.take() {
            *self = *outer;
        }
    }

    /// Number of scopes in the chain, the root included.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut scope = self.prev.as_deref();
        while let Some(current) = scope {
            depth += 1;
            scope = current.prev.as_deref();
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_seeded_as_functions() {
        let root = SymTable::with_builtins();
        assert_eq!(root.find("print").map(|s| s.ty), Some(Type::Func));
        assert_eq!(builtin_type("len"), Some(Type::Number));
        assert_eq!(builtin_type("nope"), None);
    }

    #[test]
    fn duplicate_in_same_scope_is_rejected() {
        let mut scope = SymTable::default();
        assert!(scope.insert(Symbol::new("x", Type::Number)));
        assert!(!scope.insert(Symbol::new("x", Type::String)));
        assert_eq!(scope.find("x").map(|s| s.ty), Some(Type::Number));
    }

    #[test]
    fn nested_scopes_shadow_and_vanish() {
        let mut scope = SymTable::default();
        scope.insert(Symbol::new("x", Type::Number));
        scope.push();
        assert_eq!(scope.depth(), 2);
        assert!(scope.insert(Symbol::new("x", Type::String)));
        scope.insert(Symbol::new("inner", Type::Bool));
        assert_eq!(scope.find("x").map(|s| s.ty), Some(Type::String));
        scope.pop();
        assert_eq!(scope.find("x").map(|s| s.ty), Some(Type::Number));
        assert!(scope.find("inner").is_none());
        assert_eq!(scope.depth(), 1);
    }
}
