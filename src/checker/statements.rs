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

use crate::ast::{Declaration, Expr, ExprKind, FuncDef, Stmt, Type};
use crate::checker::{Checker, Frame};
use crate::error::{MiniparError, Result};

impl Checker {
    /// Checks every statement of a block in order.
    pub fn check_block(&mut self, body: &[Stmt]) -> Result<()> {
        for stmt in body {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    /// Checks a single statement.
    ///
    /// # Behavior
    /// - Derives the type of every expression the statement holds
    /// - Validates `return`, `break`, `continue` and `func` placement
    ///   against the enclosing frames
    /// - Validates condition, iterable and channel operand types
    pub fn check_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            // ------------------------------------------------------------
            // EXPRESSION STATEMENT
            // ------------------------------------------------------------
            Stmt::Expression(expr) => {
                self.expr_type(expr)?;
                Ok(())
            }

            // ------------------------------------------------------------
            // DECLARATIONS
            // ------------------------------------------------------------
            Stmt::Declaration(decl) => self.check_declaration(decl),

            // ------------------------------------------------------------
            // FUNCTIONS
            // ------------------------------------------------------------
            Stmt::FuncDef(func) => self.check_func_def(func),

            Stmt::Return { value, line } => {
                let expected = self
                    .enclosing()
                    .find_map(|frame| match frame {
                        Frame::Function(ty) => Some(*ty),
                        _ => None,
                    })
                    .ok_or_else(|| MiniparError::type_error("`return` outside of a function", *line))?;

                let (found, relaxed) = match value {
                    Some(expr) => (self.expr_type(expr)?, expr.is_type_erased()),
                    None => (Type::Void, false),
                };

                if !relaxed && found != expected {
                    return Err(MiniparError::type_error(
                        format!("function returns {expected}, found {found}"),
                        *line,
                    ));
                }
                Ok(())
            }

            // ------------------------------------------------------------
            // LOOP CONTROL
            // ------------------------------------------------------------
            Stmt::Break { line } => self.require_loop("break", *line),
            Stmt::Continue { line } => self.require_loop("continue", *line),

            // ------------------------------------------------------------
            // CONTROL FLOW
            // ------------------------------------------------------------
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expect_condition(condition, &[Type::Bool, Type::List, Type::Dict], "if")?;
                self.within(Frame::If, |c| c.check_block(then_branch))?;
                if let Some(else_branch) = else_branch {
                    self.within(Frame::If, |c| c.check_block(else_branch))?;
                }
                Ok(())
            }

            Stmt::While { condition, body } => {
                self.expect_condition(condition, &[Type::Bool], "while")?;
                self.within(Frame::While, |c| c.check_block(body))
            }

            Stmt::For {
                iterator,
                iterable,
                body,
            } => {
                self.check_iterable(iterator, iterable)?;
                self.within(Frame::For, |c| c.check_block(body))
            }

            // ------------------------------------------------------------
            // CONCURRENCY
            // ------------------------------------------------------------
            Stmt::Par { body, line } => {
                for stmt in body {
                    let is_call = matches!(
                        stmt,
                        Stmt::Expression(Expr {
                            kind: ExprKind::Call { .. },
                            ..
                        })
                    );
                    if !is_call {
                        return Err(MiniparError::type_error(
                            "only function calls may appear in a `par` block",
                            *line,
                        ));
                    }
                }
                self.within(Frame::Par, |c| c.check_block(body))
            }

            Stmt::Seq { body } => self.check_block(body),

            // ------------------------------------------------------------
            // CHANNELS
            // ------------------------------------------------------------
            Stmt::CChannel { host, port, .. } => {
                self.expect_type(host, Type::String, "channel host")?;
                self.expect_type(port, Type::Number, "channel port")
            }

            Stmt::SChannel {
                handler,
                description,
                host,
                port,
                ..
            } => {
                match self.functions.get(&handler.lexeme) {
                    Some(func) if func.return_type == Type::String => {}
                    Some(func) => {
                        return Err(MiniparError::type_error(
                            format!(
                                "server handler `{handler}` must return STRING, not {}",
                                func.return_type
                            ),
                            handler.line,
                        ))
                    }
                    None => {
                        return Err(MiniparError::type_error(
                            format!("server handler `{handler}` is not a user function"),
                            handler.line,
                        ))
                    }
                }

                self.expect_type(description, Type::String, "channel description")?;
                self.expect_type(host, Type::String, "channel host")?;
                self.expect_type(port, Type::Number, "channel port")
            }
        }
    }

    fn check_declaration(&mut self, decl: &Declaration) -> Result<()> {
        let Some(value) = &decl.value else {
            return Ok(());
        };

        let found = self.expr_type(value)?;
        if !value.is_type_erased() && found != decl.ty {
            return Err(MiniparError::type_error(
                format!("cannot initialise `{}` of type {} with {found}", decl.name, decl.ty),
                decl.line(),
            ));
        }
        Ok(())
    }

    /// Registers the function before its body is checked so recursive
    /// calls resolve.
    fn check_func_def(&mut self, func: &Arc<FuncDef>) -> Result<()> {
        let nested_in = self.enclosing().find_map(|frame| match frame {
            Frame::If => Some("if"),
            Frame::While => Some("while"),
            Frame::Par => Some("par"),
            _ => None,
        });
        if let Some(construct) = nested_in {
            return Err(MiniparError::type_error(
                format!("function `{}` cannot be defined inside `{construct}`", func.name),
                func.line,
            ));
        }

        for param in &func.params {
            if let Some(default) = &param.default {
                let found = self.expr_type(default)?;
                if !default.is_type_erased() && found != param.ty {
                    return Err(MiniparError::type_error(
                        format!(
                            "default for parameter `{}` must be {}, found {found}",
                            param.name, param.ty
                        ),
                        default.line(),
                    ));
                }
            }
        }

        self.functions.insert(func.name.clone(), Arc::clone(func));
        self.within(Frame::Function(func.return_type), |c| c.check_block(&func.body))
    }

    fn require_loop(&self, keyword: &str, line: usize) -> Result<()> {
        let in_loop = self
            .enclosing()
            .any(|frame| matches!(frame, Frame::While | Frame::For));

        if in_loop {
            Ok(())
        } else {
            Err(MiniparError::type_error(format!("`{keyword}` outside of a loop"), line))
        }
    }

    /// `for` and comprehension iterables must be a LIST or DICT.
    pub(crate) fn check_iterable(&mut self, iterator: &Declaration, iterable: &Expr) -> Result<()> {
        self.check_declaration(iterator)?;
        self.expect_condition(iterable, &[Type::List, Type::Dict], "for")
    }

    /// Checks a condition or iterable against the accepted types. Element
    /// accesses have no static element type and are accepted.
    fn expect_condition(&mut self, expr: &Expr, accepted: &[Type], construct: &str) -> Result<()> {
        let found = self.expr_type(expr)?;
        if is_element(expr) || accepted.contains(&found) {
            return Ok(());
        }

        let names: Vec<&str> = accepted.iter().map(|ty| ty.name()).collect();
        Err(MiniparError::type_error(
            format!("`{construct}` expects {}, found {found}", names.join(" or ")),
            expr.line(),
        ))
    }

    /// Checks an operand against a single expected type, with the usual
    /// relaxation for type-erased expressions.
    pub(crate) fn expect_type(&mut self, expr: &Expr, expected: Type, what: &str) -> Result<()> {
        let found = self.expr_type(expr)?;
        if expr.is_type_erased() || found == expected {
            return Ok(());
        }

        Err(MiniparError::type_error(
            format!("{what} must be {expected}, found {found}"),
            expr.line(),
        ))
    }
}

/// Element accesses carry their receiver's type, not the element's.
pub(crate) fn is_element(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Access { .. } | ExprKind::Slice { .. })
}
