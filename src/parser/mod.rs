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


/// Core parser orchestration:
/// - Owns the `Parser` struct
/// - Exposes the main `parse(source)` entry point
pub mod parser;

/// Statement-level parsing:
/// - declarations, if / while / for, func, return / break / continue
/// - par / seq blocks
/// - c_channel / s_channel
pub mod statements;

/// Expression-level parsing:
/// - assignment → logic_or → logic_and → equality → comparison → sum → term → unary → primary
/// - literals, comprehensions, indexing, slicing, calls
pub mod expressions;

/// Shared parser helpers:
/// - lookahead checks and token matching
/// - scope-chain declaration and resolution
pub mod helpers;

/// Re-export the public parse entry point so callers can use:
/// `crate::parser::parse(...)`
pub use parser::{parse, Parser, MAX_NESTING};
