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

use crate::lexer::keywords::keyword_kind;
use crate::lexer::token::{Token, TokenKind};

/// Forward-only scanner over minipar source text.
///
/// The lexer is an [`Iterator`] of [`Token`]s: the parser pulls one token at a
/// time and never rewinds. Whitespace and comments are skipped while the
/// line counter keeps advancing.
pub struct Lexer {
    chars: Vec<char>,
    current: usize,
    line: usize,
}

impl Lexer {
    /// Creates a new minipar lexer instance from raw source code.
    ///
    /// # Parameters
    /// - `source`: A UTF-8 encoded minipar source string.
    ///
    /// # Returns
    /// A `Lexer` with the cursor at position `0` and the line counter at `1`.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            current: 0,
            line: 1,
        }
    }

    /// The line the cursor is currently on.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Scans the next significant token, skipping trivia.
    ///
    /// # Behavior
    /// - Skips whitespace, `#` line comments and `/* */` block comments
    /// - Recognises the two-character operators before single characters
    /// - Never fails: unknown characters become [`TokenKind::Other`]
    ///
    /// # Returns
    /// `None` once the input is exhausted.
    fn scan_token(&mut self) -> Option<Token> {
        loop {
            if self.is_at_end() {
                return None;
            }

            let ch = self.advance();

            match ch {
                // Whitespace
                ' ' | '\r' | '\t' => {}
                '\n' => self.line += 1,

                // Line comment
                '#' => {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                }

                // Block comment, or a lone slash when it never closes
                '/' => {
                    if self.peek() == '*' && self.block_comment() {
                        continue;
                    }
                    return Some(self.make(TokenKind::Slash, "/"));
                }

                '-' => {
                    if self.match_char('>') {
                        return Some(self.make(TokenKind::Arrow, "->"));
                    }
                    return Some(self.make(TokenKind::Minus, "-"));
                }

                '|' if self.match_char('|') => return Some(self.make(TokenKind::Or, "||")),
                '&' if self.match_char('&') => return Some(self.make(TokenKind::And, "&&")),
                '=' if self.match_char('=') => {
                    return Some(self.make(TokenKind::EqualEqual, "=="))
                }
                '!' if self.match_char('=') => return Some(self.make(TokenKind::NotEqual, "!=")),
                '<' if self.match_char('=') => {
                    return Some(self.make(TokenKind::LessEqual, "<="))
                }
                '>' if self.match_char('=') => {
                    return Some(self.make(TokenKind::GreaterEqual, ">="))
                }

                '"' => return Some(self.string()),

                '0'..='9' => return Some(self.number()),
                '.' if self.peek().is_ascii_digit() => return Some(self.number()),

                'a'..='z' | 'A'..='Z' | '_' => return Some(self.identifier()),

                // Single-character operators, punctuation and the fallback
                _ => return Some(self.make(TokenKind::from_symbol(ch), ch.to_string())),
            }
        }
    }

    /// Scans a double-quoted string literal. The opening quote is consumed.
    ///
    /// # Behavior
    /// - No escape sequences; the literal ends at the next `"`
    /// - May span lines; the token carries the line of its closing quote
    /// - Unterminated: the lone `"` is emitted as [`TokenKind::Other`] and
    ///   scanning resumes right after it
    fn string(&mut self) -> Token {
        let start = self.current;
        let mut end = start;
        let mut newlines = 0;

        while end < self.chars.len() && self.chars[end] != '"' {
            if self.chars[end] == '\n' {
                newlines += 1;
            }
            end += 1;
        }

        if end >= self.chars.len() {
            return self.make(TokenKind::Other, "\"");
        }

        let value: String = self.chars[start..end].iter().collect();
        self.current = end + 1;
        self.line += newlines;

        self.make(TokenKind::String, value)
    }

    /// Scans an identifier and classifies it through the keyword table.
    fn identifier(&mut self) -> Token {
        let start = self.current - 1;

        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text: String = self.chars[start..self.current].iter().collect();
        self.make(keyword_kind(&text), text)
    }

    /// Scans a numeric literal: `42`, `3.14` or `.5`. No exponent form.
    fn number(&mut self) -> Token {
        let start = self.current - 1;
        let leading_dot = self.chars[start] == '.';

        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if !leading_dot && self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume '.'
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let value: String = self.chars[start..self.current].iter().collect();
        self.make(TokenKind::Number, value)
    }

    /// Skips a block comment delimited by `/* ... */`. The cursor sits on the
    /// `*` after the opening slash.
    ///
    /// # Returns
    /// - `true` if the comment was closed and skipped
    /// - `false` if it never closes; nothing is consumed in that case
    fn block_comment(&mut self) -> bool {
        let mut idx = self.current + 1;
        let mut newlines = 0;

        while idx + 1 < self.chars.len() {
            if self.chars[idx] == '*' && self.chars[idx + 1] == '/' {
                self.current = idx + 2;
                self.line += newlines;
                return true;
            }
            if self.chars[idx] == '\n' {
                newlines += 1;
            }
            idx += 1;
        }

        false
    }

    fn make(&self, kind: TokenKind, lexeme: impl Into<String>) -> Token {
        Token::new(kind, lexeme, self.line)
    }

    /// Conditionally consumes the next character.
    ///
    /// # Returns
    /// - `true` if the next character matched and was consumed
    /// - `false` otherwise
    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.current];
        self.current += 1;
        ch
    }

    /// Returns the current character without consuming it, `'\0'` at the end.
    fn peek(&self) -> char {
        self.chars.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.chars.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.scan_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).map(|t| t.kind).collect()
    }

    fn lexemes(source: &str) -> Vec<String> {
        Lexer::new(source).map(|t| t.lexeme).collect()
    }

    #[test]
    fn declaration_tokens() {
        assert_eq!(
            kinds("var x: number = 1"),
            vec![
                TokenKind::Var,
                TokenKind::Id,
                TokenKind::Colon,
                TokenKind::Type,
                TokenKind::Equal,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn numbers_in_all_forms() {
        assert_eq!(lexemes("42 3.14 .5"), vec!["42", "3.14", ".5"]);
        assert_eq!(kinds("1."), vec![TokenKind::Number, TokenKind::Dot]);
    }

    #[test]
    fn two_char_operators_win() {
        assert_eq!(
            kinds("|| && == != <= >= -> < = !"),
            vec![
                TokenKind::Or,
                TokenKind::And,
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Arrow,
                TokenKind::Less,
                TokenKind::Equal,
                TokenKind::Bang,
            ]
        );
    }

    #[test]
    fn comments_are_skipped_and_lines_counted() {
        let tokens: Vec<Token> = Lexer::new("a # note\n/* one\ntwo */ b\n\"x\ny\" c").collect();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lexemes("a # note\n/* one\ntwo */ b"), vec!["a", "b"]);
        assert_eq!(lines, vec![1, 3, 5, 5]);
        assert_eq!(tokens[2].lexeme, "x\ny");
    }

    #[test]
    fn keywords_and_names() {
        assert_eq!(
            kinds("c_channel s_channel par seq func foo _bar"),
            vec![
                TokenKind::CChannel,
                TokenKind::SChannel,
                TokenKind::Par,
                TokenKind::Seq,
                TokenKind::Func,
                TokenKind::Id,
                TokenKind::Id,
            ]
        );
    }

    #[test]
    fn lexing_is_total() {
        assert_eq!(kinds("@ $"), vec![TokenKind::Other, TokenKind::Other]);
        assert_eq!(lexemes("\"abc"), vec!["\"", "abc"]);
        assert_eq!(kinds("/* open"), vec![TokenKind::Slash, TokenKind::Star, TokenKind::Id]);
    }

    /// Drops `#` and `/* */` comments and all whitespace. Only valid for
    /// sources whose strings hold no spaces or comment markers.
    fn strip_trivia(source: &str) -> String {
        let mut out = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '#' => {
                    while chars.next_if(|&n| n != '\n').is_some() {}
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    let mut prev = ' ';
                    for n in chars.by_ref() {
                        if prev == '*' && n == '/' {
                            break;
                        }
                        prev = n;
                    }
                }
                c if c.is_whitespace() => {}
                c => out.push(c),
            }
        }
        out
    }

    #[test]
    fn lexemes_cover_every_non_trivia_character() {
        let source = "var x: number = 10 # count\n\
                      /* block\n   comment */ if (x >= 2.5 && !false) {\n\
                      \tprint(\"hi\", x[1:2], x.len()) } @ $\n\
                      func f(a: list) -> void { return }\n";

        let joined: String = Lexer::new(source)
            .map(|t| match t.kind {
                TokenKind::String => format!("\"{}\"", t.lexeme),
                _ => t.lexeme,
            })
            .collect();

        assert_eq!(joined, strip_trivia(source));
    }

    #[test]
    fn strings_strip_quotes() {
        let tokens: Vec<Token> = Lexer::new("print(\"hi there\")").collect();
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].lexeme, "hi there");
    }
}
