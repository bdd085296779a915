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

/// Represents the **category of a lexical token** in minipar.
///
/// Keywords get their own kinds so that the parser can dispatch on the
/// lookahead with a plain `match`. The type keywords (`number`, `string`,
/// ...) all share [`TokenKind::Type`]; the lexeme tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A user-defined name.
    Id,

    /// Integer or decimal literal: `42`, `3.14`, `.5`
    Number,

    /// Double-quoted literal, quotes already stripped.
    String,

    /// `number`, `bool`, `string`, `void`, `list`, `dict`
    Type,

    // Keywords
    True,
    False,
    Func,
    While,
    For,
    In,
    If,
    Else,
    Return,
    Break,
    Continue,
    Par,
    Seq,
    CChannel,
    SChannel,
    Var,

    // Two-character operators
    Arrow,
    Or,
    And,
    EqualEqual,
    NotEqual,
    LessEqual,
    GreaterEqual,

    // Single-character operators and punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Equal,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Less,
    Greater,

    /// Any other single character. The lexer never rejects input.
    Other,

    /// Synthetic marker produced once the token stream is exhausted.
    Eof,
}

impl TokenKind {
    /// Maps a single punctuation character to its kind.
    pub fn from_symbol(ch: char) -> TokenKind {
        match ch {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '=' => TokenKind::Equal,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '!' => TokenKind::Bang,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            _ => TokenKind::Other,
        }
    }
}

/// A **single lexical token** produced by the minipar lexer.
///
/// # Example Tokens
/// ```text
/// var      →  { kind: Var,    lexeme: "var",    line: 1 }
/// total    →  { kind: Id,     lexeme: "total",  line: 1 }
/// 42       →  { kind: Number, lexeme: "42",     line: 1 }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The classified category of the token.
    pub kind: TokenKind,

    /// The source text that produced this token (string quotes stripped).
    pub lexeme: String,

    /// The 1-based line number where this token was matched.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// The end-of-input marker the parser substitutes once the stream runs dry.
    pub fn eof(line: usize) -> Self {
        Self::new(TokenKind::Eof, "EOF", line)
    }
}

impl fmt::Display for Token {
    /// Formats a token for **user-facing output**: only the lexeme, which is
    /// what the user wrote.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}
