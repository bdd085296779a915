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


use crate::ast::Type;
use crate::error::{MiniparError, Result};
use crate::lexer::token::{Token, TokenKind};
use crate::parser::parser::{Parser, MAX_NESTING};
use crate::symbol::Symbol;

impl Parser {
    /// Consumes the lookahead and pulls the next token from the lexer.
    ///
    /// # Returns
    /// The token that was the lookahead before the call. Once the lexer is
    /// exhausted the lookahead stays on a synthetic `Eof` token.
    pub fn advance(&mut self) -> Token {
        let next = self
            .lexer
            .next()
            .unwrap_or_else(|| Token::eof(self.lexer.line()));
        std::mem::replace(&mut self.lookahead, next)
    }

    /// Checks the lookahead kind without consuming it.
    pub fn check(&self, kind: TokenKind) -> bool {
        self.lookahead.kind == kind
    }

    /// Consumes the lookahead if it has the given kind.
    ///
    /// # Returns
    /// - `true` if the token matched and was consumed
    /// - `false` otherwise (the lookahead is left untouched)
    pub fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a required token or raises a syntax error.
    ///
    /// # Parameters
    /// - `kind`: The token kind the grammar requires here
    /// - `what`: How the token is named in the error message
    pub fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    /// Consumes a type keyword and resolves it to a [`Type`].
    pub fn expect_type(&mut self) -> Result<Type> {
        let token = self.expect(TokenKind::Type, "a type")?;
        Type::from_keyword(&token.lexeme)
            .ok_or_else(|| MiniparError::syntax(format!("unknown type `{token}`"), token.line))
    }

    /// Builds the syntax error for an unexpected lookahead.
    pub fn unexpected(&self, what: &str) -> MiniparError {
        MiniparError::syntax(
            format!("expected {what}, found `{}`", self.lookahead),
            self.lookahead.line,
        )
    }

    /// Runs `parse` one nesting level deeper.
    ///
    /// # Errors
    /// A syntax error once [`MAX_NESTING`] levels are open.
    pub fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return Err(MiniparError::syntax(
                format!("nesting deeper than {MAX_NESTING} levels"),
                self.lookahead.line,
            )
            .with_help("move inner parts into variables or functions"));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Returns true if the parser is at EOF.
    pub fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Declares `token` in the innermost compile-time scope.
    ///
    /// # Errors
    /// A declaration error when the name already exists in this scope.
    pub fn declare(&mut self, token: &Token, ty: Type) -> Result<()> {
        if self.symtable.insert(Symbol::new(token.lexeme.clone(), ty)) {
            Ok(())
        } else {
            Err(MiniparError::declaration(
                format!("`{token}` is already declared in this scope"),
                token.line,
            ))
        }
    }

    /// Resolves a referenced name against the scope chain.
    ///
    /// # Errors
    /// A declaration error when no enclosing scope declares the name.
    pub fn resolve(&self, token: &Token) -> Result<Type> {
        self.symtable
            .find(&token.lexeme)
            .map(|symbol| symbol.ty)
            .ok_or_else(|| {
                MiniparError::declaration(format!("`{token}` is not declared"), token.line)
            })
    }
}
