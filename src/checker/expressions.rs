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


use crate::ast::{Expr, ExprKind, Type};
use crate::checker::statements::is_element;
use crate::checker::Checker;
use crate::error::{MiniparError, Result};
use crate::lexer::token::TokenKind;
use crate::symbol::builtin_type;

impl Checker {
    /// Derives the static type of an expression, bottom-up.
    ///
    /// # Returns
    /// The expression's type, or the first type error found in it.
    pub fn expr_type(&mut self, expr: &Expr) -> Result<Type> {
        match &expr.kind {
            ExprKind::Constant | ExprKind::Id => Ok(expr.ty),

            // ------------------------------------------------------------
            // INDEXING
            // ------------------------------------------------------------
            ExprKind::Access { target, index } => {
                let receiver = self.expr_type(target)?;
                let index_ty = self.expr_type(index)?;

                let accepted: &[Type] = if is_element(target) {
                    &[Type::Number, Type::String]
                } else {
                    match receiver {
                        Type::List | Type::String => &[Type::Number],
                        Type::Dict => &[Type::String],
                        other => {
                            return Err(MiniparError::type_error(
                                format!("`{}` of type {other} cannot be indexed", target.token),
                                expr.line(),
                            ))
                        }
                    }
                };

                if !index.is_type_erased() && !accepted.contains(&index_ty) {
                    return Err(MiniparError::type_error(
                        format!("cannot index {receiver} with {index_ty}"),
                        expr.line(),
                    ));
                }
                Ok(receiver)
            }

            ExprKind::Slice { target, start, end } => {
                let receiver = self.expr_type(target)?;
                if !is_element(target) && !matches!(receiver, Type::List | Type::String) {
                    return Err(MiniparError::type_error(
                        format!("`{}` of type {receiver} cannot be sliced", target.token),
                        expr.line(),
                    ));
                }

                for bound in [start, end].into_iter().flatten() {
                    self.expect_type(bound, Type::Number, "slice bound")?;
                }
                Ok(receiver)
            }

            // ------------------------------------------------------------
            // OPERATORS
            // ------------------------------------------------------------
            ExprKind::Logical { left, right } => {
                for operand in [left, right] {
                    let ty = self.expr_type(operand)?;
                    if !is_element(operand) && ty != Type::Bool {
                        return Err(MiniparError::type_error(
                            format!("`{}` expects BOOL operands, found {ty}", expr.token),
                            expr.line(),
                        ));
                    }
                }
                Ok(Type::Bool)
            }

            ExprKind::Relational { left, right } => {
                let l = self.expr_type(left)?;
                let r = self.expr_type(right)?;
                if !is_element(left) && !is_element(right) && l != r {
                    return Err(MiniparError::type_error(
                        format!("cannot compare {l} with {r} using `{}`", expr.token),
                        expr.line(),
                    ));
                }
                Ok(Type::Bool)
            }

            ExprKind::Arithmetic { left, right } => self.arithmetic_type(expr, left, right),

            ExprKind::Unary { operand } => {
                let ty = self.expr_type(operand)?;
                let (accepted, result): (&[Type], Type) = match expr.operator() {
                    TokenKind::Minus => (&[Type::Number], Type::Number),
                    _ => (&[Type::Bool, Type::List, Type::Dict], Type::Bool),
                };

                if !is_element(operand) && !accepted.contains(&ty) {
                    return Err(MiniparError::type_error(
                        format!("invalid operand {ty} for unary `{}`", expr.token),
                        expr.line(),
                    ));
                }
                Ok(result)
            }

            // ------------------------------------------------------------
            // ASSIGNMENT: a store into a container slot is unchecked
            // ------------------------------------------------------------
            ExprKind::Assign { target, value } => {
                let target_ty = self.expr_type(target)?;
                let value_ty = self.expr_type(value)?;
                let relaxed = matches!(target.kind, ExprKind::Access { .. }) || value.is_type_erased();

                if !relaxed && target_ty != value_ty {
                    return Err(MiniparError::type_error(
                        format!("cannot assign {value_ty} to `{}` of type {target_ty}", target.token),
                        value.line(),
                    ));
                }
                Ok(target_ty)
            }

            // ------------------------------------------------------------
            // CALLS
            // ------------------------------------------------------------
            ExprKind::Call { callee, oper, args } => self.call_type(expr, callee, oper.is_some(), args),

            // ------------------------------------------------------------
            // COLLECTIONS
            // ------------------------------------------------------------
            ExprKind::ArrayLiteral(values) => {
                for value in values {
                    self.expr_type(value)?;
                }
                Ok(Type::List)
            }

            ExprKind::DictLiteral(entries) => {
                for (_, value) in entries {
                    self.expr_type(value)?;
                }
                Ok(Type::Dict)
            }

            ExprKind::Comprehension {
                iterator,
                iterable,
                projection,
            } => {
                self.check_iterable(iterator, iterable)?;
                self.expr_type(projection)?;
                Ok(Type::List)
            }
        }
    }

    /// `+` wants equal operand types (it also concatenates strings and
    /// lists); `*` additionally repeats a STRING or LIST by a NUMBER; every
    /// other operator wants NUMBERs. Accesses and array literals relax both
    /// rules, and the result takes the type of the side that is not relaxed.
    fn arithmetic_type(&mut self, expr: &Expr, left: &Expr, right: &Expr) -> Result<Type> {
        let l = self.expr_type(left)?;
        let r = self.expr_type(right)?;

        let relaxed = |e: &Expr| matches!(e.kind, ExprKind::Access { .. } | ExprKind::ArrayLiteral(_));
        let (left_relaxed, right_relaxed) = (relaxed(left), relaxed(right));
        let result = if left_relaxed { r } else { l };

        if left_relaxed || right_relaxed {
            return Ok(result);
        }

        let ok = match expr.operator() {
            TokenKind::Plus => l == r,
            TokenKind::Star => {
                (l == Type::Number && r == Type::Number)
                    || (matches!(l, Type::String | Type::List) && r == Type::Number)
                    || (l == Type::Number && matches!(r, Type::String | Type::List))
            }
            _ => l == Type::Number && r == Type::Number,
        };

        if !ok {
            return Err(MiniparError::type_error(
                format!("invalid operands {l} and {r} for `{}`", expr.token),
                expr.line(),
            ));
        }

        if expr.operator() == TokenKind::Star && l == Type::Number {
            return Ok(r);
        }
        Ok(l)
    }

    /// Types a call from the built-in signature table or a user function
    /// seen earlier in walk order.
    fn call_type(&mut self, expr: &Expr, callee: &Expr, dotted: bool, args: &[Expr]) -> Result<Type> {
        let name = expr.call_name().unwrap_or_default().to_string();

        let mut arg_types = Vec::with_capacity(args.len() + 1);
        let mut arg_exprs: Vec<&Expr> = Vec::with_capacity(args.len() + 1);
        if dotted {
            arg_types.push(self.expr_type(callee)?);
            arg_exprs.push(callee);
        }
        for arg in args {
            arg_types.push(self.expr_type(arg)?);
            arg_exprs.push(arg);
        }

        if let Some(result) = builtin_type(&name) {
            let channel = match name.as_str() {
                "send" | "close" => Some(Type::ClientChannel),
                "listen" => Some(Type::ServerChannel),
                _ => None,
            };

            if let Some(expected) = channel {
                match (arg_exprs.first(), arg_types.first()) {
                    (Some(receiver), Some(found)) => {
                        if !receiver.is_type_erased() && *found != expected {
                            return Err(MiniparError::type_error(
                                format!("`{name}` expects a {expected}, found {found}"),
                                expr.line(),
                            ));
                        }
                    }
                    _ => {
                        return Err(MiniparError::type_error(
                            format!("`{name}` needs a {expected} argument"),
                            expr.line(),
                        ))
                    }
                }
            }
            return Ok(result);
        }

        let Some(func) = self.functions.get(&name) else {
            let message = if !dotted && callee.ty != Type::Func {
                format!("`{name}` of type {} is not a function", callee.ty)
            } else {
                format!("unknown function `{name}`")
            };
            return Err(MiniparError::type_error(message, expr.line()));
        };

        let required = func.required_params();
        if arg_types.len() < required {
            return Err(MiniparError::type_error(
                format!(
                    "`{name}` takes at least {required} argument(s), {} given",
                    arg_types.len()
                ),
                expr.line(),
            ));
        }

        Ok(func.return_type)
    }
}
