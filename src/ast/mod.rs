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


//! Tagged-variant syntax tree shared by the parser, checker and runner.
//!
//! Every expression carries its static type tag and the token that anchors
//! it in the source; statements that can fail at run time keep their line.

pub mod types;
pub mod expr;
pub mod param;
pub mod stmt;

pub use expr::{Expr, ExprKind};
pub use param::Param;
pub use stmt::{Declaration, FuncDef, Program, Stmt};
pub use types::Type;
