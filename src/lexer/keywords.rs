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

use crate::lexer::token::TokenKind;

/// Classifies a scanned name as a **reserved keyword** or a plain identifier.
///
/// Used only by the lexer. Case-sensitive: `Var` is an identifier.
///
/// # Examples
/// ```text
/// number    -> Type
/// c_channel -> CChannel
/// total     -> Id
/// ```
pub fn keyword_kind(word: &str) -> TokenKind {
    match word {
        "number" | "bool" | "string" | "void" | "list" | "dict" => TokenKind::Type,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "func" => TokenKind::Func,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "return" => TokenKind::Return,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "par" => TokenKind::Par,
        "seq" => TokenKind::Seq,
        "c_channel" => TokenKind::CChannel,
        "s_channel" => TokenKind::SChannel,
        "var" => TokenKind::Var,
        _ => TokenKind::Id,
    }
}
