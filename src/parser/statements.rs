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


use std::sync::Arc;

use crate::ast::{Declaration, Expr, FuncDef, Param, Stmt, Type};
use crate::error::{MiniparError, Result};
use crate::lexer::token::TokenKind;
use crate::parser::parser::Parser;
use crate::symbol::Symbol;

impl Parser {
    /// Whether the lookahead can begin a statement.
    fn starts_statement(&self) -> bool {
        matches!(
            self.lookahead.kind,
            TokenKind::Id
                | TokenKind::Var
                | TokenKind::Func
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Seq
                | TokenKind::Par
                | TokenKind::CChannel
                | TokenKind::SChannel
                | TokenKind::Semicolon
        )
    }

    /// Parses statements until one can no longer start.
    ///
    /// # Behavior
    /// Stops on `}` or end of input. Any other lookahead that cannot begin a
    /// statement is a syntax error.
    pub fn statements(&mut self) -> Result<Vec<Stmt>> {
        let mut body = Vec::new();

        while self.starts_statement() {
            if self.match_kind(TokenKind::Semicolon) {
                continue;
            }
            body.push(self.statement()?);
            self.match_kind(TokenKind::Semicolon);
        }

        if !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            return Err(MiniparError::syntax(
                format!("`{}` does not start a valid statement", self.lookahead),
                self.lookahead.line,
            ));
        }

        Ok(body)
    }

    /// Parses a single minipar statement.
    ///
    /// This is the **main dispatcher** for all statement grammar forms.
    /// It inspects the lookahead and routes to the appropriate parser;
    /// anything without a keyword is an expression or assignment statement.
    pub fn statement(&mut self) -> Result<Stmt> {
        match self.lookahead.kind {
            // ------------------------------------------------------------
            // VARIABLES
            // ------------------------------------------------------------
            TokenKind::Var => Ok(Stmt::Declaration(self.declaration(true)?)),

            // ------------------------------------------------------------
            // CONTROL FLOW
            // ------------------------------------------------------------
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),

            TokenKind::Break => {
                let token = self.advance();
                Ok(Stmt::Break { line: token.line })
            }

            TokenKind::Continue => {
                let token = self.advance();
                Ok(Stmt::Continue { line: token.line })
            }

            // ------------------------------------------------------------
            // FUNCTIONS
            // ------------------------------------------------------------
            TokenKind::Func => self.func_def(),

            TokenKind::Return => {
                let token = self.advance();
                let bare = self.check(TokenKind::RightBrace)
                    || self.check(TokenKind::Semicolon)
                    || self.is_at_end();
                let value = if bare { None } else { Some(self.logic_or()?) };
                Ok(Stmt::Return {
                    value,
                    line: token.line,
                })
            }

            // ------------------------------------------------------------
            // CONCURRENCY
            // ------------------------------------------------------------
            TokenKind::Seq => {
                self.advance();
                Ok(Stmt::Seq {
                    body: self.block(&[])?,
                })
            }

            TokenKind::Par => {
                let token = self.advance();
                Ok(Stmt::Par {
                    body: self.block(&[])?,
                    line: token.line,
                })
            }

            // ------------------------------------------------------------
            // CHANNELS
            // ------------------------------------------------------------
            TokenKind::CChannel => self.c_channel(),
            TokenKind::SChannel => self.s_channel(),

            // ------------------------------------------------------------
            // EXPRESSION / ASSIGNMENT
            // ------------------------------------------------------------
            _ => self.expression_statement(),
        }
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        Ok(Stmt::Expression(self.assignment()?))
    }

    /// Parses `var? NAME : TYPE ( '=' logic_or )?`.
    ///
    /// # Parameters
    /// - `register`: declare the name in the current scope. Loop iterators
    ///   pass `false` and are seeded into the body scope instead.
    ///
    /// # Errors
    /// Declaration error on redeclaration within the same scope.
    pub fn declaration(&mut self, register: bool) -> Result<Declaration> {
        self.match_kind(TokenKind::Var);
        let token = self.expect(TokenKind::Id, "a name")?;
        self.expect(TokenKind::Colon, "`:`")?;
        let ty = self.expect_type()?;

        let value = if self.match_kind(TokenKind::Equal) {
            Some(self.logic_or()?)
        } else {
            None
        };

        if register {
            self.declare(&token, ty)?;
        }

        Ok(Declaration {
            name: token.lexeme.clone(),
            ty,
            token,
            value,
        })
    }

    /// `if ( cond ) block ( else block )?`
    fn if_statement(&mut self) -> Result<Stmt> {
        self.advance();
        let condition = self.parenthesized()?;
        let then_branch = self.block(&[])?;

        let else_branch = if self.match_kind(TokenKind::Else) {
            Some(self.block(&[])?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `while ( cond ) block`
    fn while_statement(&mut self) -> Result<Stmt> {
        self.advance();
        let condition = self.parenthesized()?;
        let body = self.block(&[])?;
        Ok(Stmt::While { condition, body })
    }

    /// `for ( var? NAME : TYPE in expr ) block`
    ///
    /// The iterator lives in the body scope only.
    fn for_statement(&mut self) -> Result<Stmt> {
        self.advance();
        self.expect(TokenKind::LeftParen, "`(`")?;
        let iterator = self.declaration(false)?;
        self.expect(TokenKind::In, "`in`")?;
        let iterable = self.assignment()?;
        self.expect(TokenKind::RightParen, "`)`")?;

        let body = self.block(&[Symbol::new(iterator.name.clone(), iterator.ty)])?;

        Ok(Stmt::For {
            iterator,
            iterable,
            body,
        })
    }

    /// `func NAME ( params ) -> TYPE block`
    ///
    /// The name is declared in the enclosing scope before the body is parsed
    /// so the body may call itself.
    fn func_def(&mut self) -> Result<Stmt> {
        let func = self.advance();
        let name = self.expect(TokenKind::Id, "a function name")?;
        self.declare(&name, Type::Func)?;

        self.expect(TokenKind::LeftParen, "`(`")?;
        let params = self.params()?;
        self.expect(TokenKind::RightParen, "`)`")?;
        self.expect(TokenKind::Arrow, "`->`")?;
        let return_type = self.expect_type()?;

        let seeded: Vec<Symbol> = params
            .iter()
            .map(|p| Symbol::new(p.name.clone(), p.ty))
            .collect();
        let body = self.block(&seeded)?;

        Ok(Stmt::FuncDef(Arc::new(FuncDef {
            name: name.lexeme,
            return_type,
            params,
            body,
            line: func.line,
        })))
    }

    /// `( NAME : TYPE ( '=' expr )? ),*`
    fn params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();

        while self.check(TokenKind::Id) {
            let name = self.advance();
            self.expect(TokenKind::Colon, "`:`")?;
            let ty = self.expect_type()?;

            let default = if self.match_kind(TokenKind::Equal) {
                Some(self.assignment()?)
            } else {
                None
            };

            if params.iter().any(|p: &Param| p.name == name.lexeme) {
                return Err(MiniparError::declaration(
                    format!("parameter `{name}` is declared twice"),
                    name.line,
                ));
            }

            params.push(Param {
                name: name.lexeme,
                ty,
                default,
            });

            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    /// `c_channel NAME { host , port }`
    fn c_channel(&mut self) -> Result<Stmt> {
        let keyword = self.advance();
        let name = self.expect(TokenKind::Id, "a channel name")?;
        self.declare(&name, Type::ClientChannel)?;

        self.expect(TokenKind::LeftBrace, "`{`")?;
        let host = self.sum()?;
        self.expect(TokenKind::Comma, "`,`")?;
        let port = self.sum()?;
        self.expect(TokenKind::RightBrace, "`}`")?;

        Ok(Stmt::CChannel {
            name: name.lexeme,
            host,
            port,
            line: keyword.line,
        })
    }

    /// `s_channel NAME { funcRef , description , host , port }`
    ///
    /// `funcRef` must already be declared.
    fn s_channel(&mut self) -> Result<Stmt> {
        let keyword = self.advance();
        let name = self.expect(TokenKind::Id, "a channel name")?;
        self.declare(&name, Type::ServerChannel)?;

        self.expect(TokenKind::LeftBrace, "`{`")?;
        let handler = self.expect(TokenKind::Id, "a function name")?;
        self.resolve(&handler)?;
        self.expect(TokenKind::Comma, "`,`")?;
        let description = self.sum()?;
        self.expect(TokenKind::Comma, "`,`")?;
        let host = self.sum()?;
        self.expect(TokenKind::Comma, "`,`")?;
        let port = self.sum()?;
        self.expect(TokenKind::RightBrace, "`}`")?;

        Ok(Stmt::SChannel {
            name: name.lexeme,
            handler,
            description,
            host,
            port,
            line: keyword.line,
        })
    }

    /// `{ statements }` in a fresh compile-time scope.
    ///
    /// # Parameters
    /// - `seed`: names pre-declared in the new scope (parameters, iterators)
    pub fn block(&mut self, seed: &[Symbol]) -> Result<Vec<Stmt>> {
        self.expect(TokenKind::LeftBrace, "`{`")?;

        self.symtable.push();
        for symbol in seed {
            self.symtable.insert(symbol.clone());
        }

        let body = self.nested(|parser| parser.statements());
        self.symtable.pop();
        let body = body?;

        self.expect(TokenKind::RightBrace, "`}`")?;
        Ok(body)
    }

    /// `( assignment )`
    fn parenthesized(&mut self) -> Result<Expr> {
        self.expect(TokenKind::LeftParen, "`(`")?;
        let condition = self.assignment()?;
        self.expect(TokenKind::RightParen, "`)`")?;
        Ok(condition)
    }
}
