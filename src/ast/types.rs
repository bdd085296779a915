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


use std::fmt;

use serde::Serialize;

/// Static type tags attached to symbols and expressions.
///
/// The checker compares these tags; the runner never looks at them except
/// to pick the zero value of an uninitialised declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Type {
    Number,
    String,
    Bool,
    List,
    Dict,
    Func,
    Void,
    /// Names introduced by a `c_channel` statement.
    ClientChannel,
    /// Names introduced by an `s_channel` statement.
    ServerChannel,
}

impl Type {
    /// Resolves a type keyword (`number`, `bool`, ...) as written in source.
    pub fn from_keyword(word: &str) -> Option<Type> {
        match word {
            "number" => Some(Type::Number),
            "string" => Some(Type::String),
            "bool" => Some(Type::Bool),
            "list" => Some(Type::List),
            "dict" => Some(Type::Dict),
            "void" => Some(Type::Void),
            _ => None,
        }
    }

    /// The upper-case tag used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Type::Number => "NUMBER",
            Type::String => "STRING",
            Type::Bool => "BOOL",
            Type::List => "LIST",
            Type::Dict => "DICT",
            Type::Func => "FUNC",
            Type::Void => "VOID",
            Type::ClientChannel => "C_CHANNEL",
            Type::ServerChannel => "S_CHANNEL",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
