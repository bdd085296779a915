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


use crate::ast::{Declaration, Expr, ExprKind, Type};
use crate::error::{MiniparError, Result};
use crate::lexer::token::{Token, TokenKind};
use crate::parser::parser::Parser;
use crate::symbol::builtin_type;

impl Parser {
    /// Entry point for expression parsing.
    ///
    /// Precedence, lowest first:
    /// ```text
    /// assignment → logic_or → logic_and → equality → comparison → sum → term → unary → primary
    /// ```
    ///
    /// `a = b = 1` groups as `a = (b = 1)`. Only an `Id` or an `Access` may
    /// stand on the left of `=`.
    pub fn assignment(&mut self) -> Result<Expr> {
        let target = self.logic_or()?;

        if !self.check(TokenKind::Equal) {
            return Ok(target);
        }

        let equal = self.advance();
        if !target.is_assignable() {
            return Err(MiniparError::syntax(
                format!("`{}` cannot be assigned to", target.token),
                equal.line,
            ));
        }

        let value = self.nested(|parser| parser.assignment())?;
        let ty = target.ty;
        Ok(Expr::new(
            ExprKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            ty,
            equal,
        ))
    }

    /// `logic_and ( '||' logic_and )*`, the initializer of declarations and
    /// the operand of `return`.
    pub fn logic_or(&mut self) -> Result<Expr> {
        let mut expr = self.logic_and()?;

        while self.check(TokenKind::Or) {
            let operator = self.advance();
            let right = self.logic_and()?;
            expr = binary(ExprKind::Logical { left: Box::new(expr), right: Box::new(right) }, Type::Bool, operator);
        }

        Ok(expr)
    }

    fn logic_and(&mut self) -> Result<Expr> {
        let mut expr = self.equality()?;

        while self.check(TokenKind::And) {
            let operator = self.advance();
            let right = self.equality()?;
            expr = binary(ExprKind::Logical { left: Box::new(expr), right: Box::new(right) }, Type::Bool, operator);
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;

        while self.check(TokenKind::EqualEqual) || self.check(TokenKind::NotEqual) {
            let operator = self.advance();
            let right = self.comparison()?;
            expr = binary(ExprKind::Relational { left: Box::new(expr), right: Box::new(right) }, Type::Bool, operator);
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.sum()?;

        while matches!(
            self.lookahead.kind,
            TokenKind::Less | TokenKind::LessEqual | TokenKind::Greater | TokenKind::GreaterEqual
        ) {
            let operator = self.advance();
            let right = self.sum()?;
            expr = binary(ExprKind::Relational { left: Box::new(expr), right: Box::new(right) }, Type::Bool, operator);
        }

        Ok(expr)
    }

    /// `term ( ('+'|'-') term )*`. The node takes the type of its left operand.
    pub fn sum(&mut self) -> Result<Expr> {
        let mut expr = self.term()?;

        while self.check(TokenKind::Plus) || self.check(TokenKind::Minus) {
            let operator = self.advance();
            let right = self.term()?;
            let ty = expr.ty;
            expr = binary(ExprKind::Arithmetic { left: Box::new(expr), right: Box::new(right) }, ty, operator);
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;

        while matches!(
            self.lookahead.kind,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent
        ) {
            let operator = self.advance();
            let right = self.unary()?;
            let ty = expr.ty;
            expr = binary(ExprKind::Arithmetic { left: Box::new(expr), right: Box::new(right) }, ty, operator);
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        self.nested(|parser| {
            if parser.check(TokenKind::Bang) || parser.check(TokenKind::Minus) {
                let operator = parser.advance();
                let operand = parser.unary()?;
                let ty = if operator.kind == TokenKind::Bang { Type::Bool } else { operand.ty };
                return Ok(Expr::new(ExprKind::Unary { operand: Box::new(operand) }, ty, operator));
            }

            parser.primary()
        })
    }

    /// Parses literals, names, groupings and collection literals.
    fn primary(&mut self) -> Result<Expr> {
        match self.lookahead.kind {
            TokenKind::Id => self.call(),

            TokenKind::Number => Ok(Expr::new(ExprKind::Constant, Type::Number, self.advance())),
            TokenKind::String => Ok(Expr::new(ExprKind::Constant, Type::String, self.advance())),
            TokenKind::True | TokenKind::False => {
                Ok(Expr::new(ExprKind::Constant, Type::Bool, self.advance()))
            }

            // ------------------------------------------------------------
            // GROUPING
            // ------------------------------------------------------------
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.assignment()?;
                self.expect(TokenKind::RightParen, "`)`")?;
                Ok(expr)
            }

            // ------------------------------------------------------------
            // LIST LITERAL / COMPREHENSION
            // ------------------------------------------------------------
            TokenKind::LeftBracket => {
                let bracket = self.advance();
                if self.check(TokenKind::For) {
                    return self.comprehension(bracket);
                }

                let mut values = Vec::new();
                while !self.check(TokenKind::RightBracket) {
                    values.push(self.assignment()?);
                    if !self.match_kind(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RightBracket, "`]`")?;

                Ok(Expr::new(ExprKind::ArrayLiteral(values), Type::List, bracket))
            }

            // ------------------------------------------------------------
            // DICT LITERAL: keys are string literals
            // ------------------------------------------------------------
            TokenKind::LeftBrace => {
                let brace = self.advance();

                let mut entries = Vec::new();
                while !self.check(TokenKind::RightBrace) {
                    let key = self.expect(TokenKind::String, "a string key")?;
                    self.expect(TokenKind::Colon, "`:`")?;
                    let value = self.assignment()?;
                    entries.push((key.lexeme, value));
                    if !self.match_kind(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RightBrace, "`}`")?;

                Ok(Expr::new(ExprKind::DictLiteral(entries), Type::Dict, brace))
            }

            _ => Err(self.unexpected("an expression")),
        }
    }

    /// A resolved name followed by any chain of suffixes:
    /// `[index]`, `[start:end]`, `(args)` and `.oper(args)`.
    fn call(&mut self) -> Result<Expr> {
        let name = self.advance();
        let ty = self.resolve(&name)?;
        let mut expr = Expr::new(ExprKind::Id, ty, name);

        loop {
            match self.lookahead.kind {
                TokenKind::LeftBracket => expr = self.index(expr)?,

                TokenKind::Dot => {
                    self.advance();
                    let oper = self.expect(TokenKind::Id, "an operation name")?;
                    self.expect(TokenKind::LeftParen, "`(`")?;
                    let args = self.args()?;

                    let ty = builtin_type(&oper.lexeme).unwrap_or(Type::Func);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            oper: Some(oper.lexeme.clone()),
                            args,
                        },
                        ty,
                        oper,
                    );
                }

                TokenKind::LeftParen => {
                    if !matches!(expr.kind, ExprKind::Id) {
                        return Err(MiniparError::syntax(
                            format!("`{}` cannot be called", expr.token),
                            self.lookahead.line,
                        ));
                    }
                    self.advance();
                    let args = self.args()?;

                    let token = expr.token.clone();
                    let ty = builtin_type(&token.lexeme).unwrap_or(Type::Func);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            oper: None,
                            args,
                        },
                        ty,
                        token,
                    );
                }

                _ => break,
            }
        }

        Ok(expr)
    }

    /// Arguments after the opening parenthesis, up to and including `)`.
    fn args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();

        while !self.check(TokenKind::RightParen) {
            args.push(self.assignment()?);
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen, "`)`")?;

        Ok(args)
    }

    /// `[index]` or `[start:end]` with either slice bound optional.
    /// Both forms take the type of their receiver.
    fn index(&mut self, target: Expr) -> Result<Expr> {
        self.expect(TokenKind::LeftBracket, "`[`")?;
        let ty = target.ty;
        let token = target.token.clone();

        let start = if self.check(TokenKind::Colon) {
            None
        } else {
            Some(self.sum()?)
        };

        if self.match_kind(TokenKind::Colon) {
            let end = if self.check(TokenKind::RightBracket) {
                None
            } else {
                Some(Box::new(self.sum()?))
            };
            self.expect(TokenKind::RightBracket, "`]`")?;

            return Ok(Expr::new(
                ExprKind::Slice {
                    target: Box::new(target),
                    start: start.map(Box::new),
                    end,
                },
                ty,
                token,
            ));
        }

        self.expect(TokenKind::RightBracket, "`]`")?;
        let index = match start {
            Some(index) => index,
            None => return Err(self.unexpected("an index")),
        };

        Ok(Expr::new(
            ExprKind::Access {
                target: Box::new(target),
                index: Box::new(index),
            },
            ty,
            token,
        ))
    }

    /// `[ for ( decl in expr ) -> expr ]`, the opening bracket already
    /// consumed. The iterator is declared in its own scope.
    fn comprehension(&mut self, bracket: Token) -> Result<Expr> {
        self.advance(); // for
        self.expect(TokenKind::LeftParen, "`(`")?;

        self.symtable.push();
        let parts = self.comprehension_parts();
        self.symtable.pop();
        let (iterator, iterable, projection) = parts?;

        self.expect(TokenKind::RightBracket, "`]`")?;

        Ok(Expr::new(
            ExprKind::Comprehension {
                iterator: Box::new(iterator),
                iterable: Box::new(iterable),
                projection: Box::new(projection),
            },
            Type::List,
            bracket,
        ))
    }

    fn comprehension_parts(&mut self) -> Result<(Declaration, Expr, Expr)> {
        let iterator = self.declaration(true)?;
        self.expect(TokenKind::In, "`in`")?;
        let iterable = self.assignment()?;
        self.expect(TokenKind::RightParen, "`)`")?;
        self.expect(TokenKind::Arrow, "`->`")?;
        let projection = self.assignment()?;
        Ok((iterator, iterable, projection))
    }
}

fn binary(kind: ExprKind, ty: Type, operator: Token) -> Expr {
    Expr::new(kind, ty, operator)
}
