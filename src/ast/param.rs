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


use crate::ast::Expr;
use crate::ast::Type;

/// Represents **one declared parameter** of a user function.
///
/// ```text
/// func greet(name: string, times: number = 1) -> void { ... }
///            ^^^^^^^^^^^^  ^^^^^^^^^^^^^^^^^
/// ```
#[derive(Debug, Clone)]
pub struct Param {
    /// Parameter name (identifier)
    pub name: String,

    /// Declared static type.
    pub ty: Type,

    /// Optional default value, evaluated in the callee's fresh scope before
    /// the positional arguments overwrite it.
    pub default: Option<Expr>,
}

impl Param {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}
