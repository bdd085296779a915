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


use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ast::{Expr, ExprKind, Type};
use crate::error::{MiniparError, Result};
use crate::interpreter::environment::VarTable;
use crate::interpreter::helpers::{as_int, as_str, is_truthy, iterate, resolve_index, slice_bounds};
use crate::interpreter::Runner;
use crate::lexer::token::TokenKind;
use crate::value::{lock, Value};

impl Runner {
    /// Evaluates an expression to a value.
    ///
    /// Runtime failures carry the line of the expression that raised them.
    pub fn eval_expr(&self, expr: &Expr, env: &Arc<VarTable>) -> Result<Value> {
        self.eval_kind(expr, env).map_err(|e| e.or_line(expr.line()))
    }

    fn eval_kind(&self, expr: &Expr, env: &Arc<VarTable>) -> Result<Value> {
        match &expr.kind {
            // ------------------------------------------------------------
            // LITERALS & NAMES
            // ------------------------------------------------------------
            ExprKind::Constant => constant(expr),

            ExprKind::Id => env.get(&expr.token.lexeme).ok_or_else(|| {
                MiniparError::runtime(format!("undefined variable `{}`", expr.token))
            }),

            // ------------------------------------------------------------
            // INDEXING
            // ------------------------------------------------------------
            ExprKind::Access { target, index } => {
                let container = self.eval_expr(target, env)?;
                let index = self.eval_expr(index, env)?;
                index_value(&container, &index)
            }

            ExprKind::Slice { target, start, end } => {
                let container = self.eval_expr(target, env)?;
                let start = match start {
                    Some(bound) => Some(as_int(&self.eval_expr(bound, env)?, "slice start")?),
                    None => None,
                };
                let end = match end {
                    Some(bound) => Some(as_int(&self.eval_expr(bound, env)?, "slice end")?),
                    None => None,
                };
                slice_value(&container, start, end)
            }

            // ------------------------------------------------------------
            // ASSIGNMENT: yields the stored value
            // ------------------------------------------------------------
            ExprKind::Assign { target, value } => {
                let value = self.eval_expr(value, env)?;
                self.assign(target, value.clone(), env)?;
                Ok(value)
            }

            // ------------------------------------------------------------
            // OPERATORS
            // ------------------------------------------------------------
            ExprKind::Logical { left, right } => {
                let left = self.eval_expr(left, env)?;
                match expr.operator() {
                    // Short-circuits: a falsy left side is the result.
                    TokenKind::And => {
                        if !is_truthy(&left) {
                            return Ok(left);
                        }
                        self.eval_expr(right, env)
                    }
                    _ => {
                        let right = self.eval_expr(right, env)?;
                        Ok(Value::Bool(is_truthy(&left) || is_truthy(&right)))
                    }
                }
            }

            ExprKind::Relational { left, right } => {
                let left = self.eval_expr(left, env)?;
                let right = self.eval_expr(right, env)?;
                relational(expr.operator(), &left, &right)
            }

            ExprKind::Arithmetic { left, right } => {
                let left = self.eval_expr(left, env)?;
                let right = self.eval_expr(right, env)?;
                arithmetic(expr.operator(), &left, &right)
            }

            ExprKind::Unary { operand } => {
                let value = self.eval_expr(operand, env)?;
                match expr.operator() {
                    TokenKind::Bang => Ok(Value::Bool(!is_truthy(&value))),
                    _ => match value {
                        Value::Int(n) => n
                            .checked_neg()
                            .map(Value::Int)
                            .ok_or_else(|| MiniparError::runtime("integer overflow")),
                        Value::Float(f) => Ok(Value::Float(-f)),
                        other => Err(MiniparError::runtime(format!(
                            "cannot negate a {}",
                            other.type_name()
                        ))),
                    },
                }
            }

            // ------------------------------------------------------------
            // CALLS
            // ------------------------------------------------------------
            ExprKind::Call { callee, oper, args } => {
                self.eval_call(expr, callee, oper.is_some(), args, env)
            }

            // ------------------------------------------------------------
            // COLLECTIONS
            // ------------------------------------------------------------
            ExprKind::ArrayLiteral(values) => {
                let values = values
                    .iter()
                    .map(|value| self.eval_expr(value, env))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::list(values))
            }

            ExprKind::DictLiteral(entries) => {
                let mut map = BTreeMap::new();
                for (key, value) in entries {
                    map.insert(key.clone(), self.eval_expr(value, env)?);
                }
                Ok(Value::dict(map))
            }

            ExprKind::Comprehension {
                iterator,
                iterable,
                projection,
            } => {
                let items = iterate(&self.eval_expr(iterable, env)?)?;

                let mut results = Vec::with_capacity(items.len());
                for item in items {
                    let scope = VarTable::child(env);
                    scope.define(iterator.name.clone(), item);
                    results.push(self.eval_expr(projection, &scope)?);
                }
                Ok(Value::list(results))
            }
        }
    }
}

/// Literal values: numbers parse as integers first, then as floats.
fn constant(expr: &Expr) -> Result<Value> {
    let lexeme = &expr.token.lexeme;
    match expr.ty {
        Type::Number => lexeme
            .parse::<i64>()
            .map(Value::Int)
            .or_else(|_| lexeme.parse::<f64>().map(Value::Float))
            .map_err(|_| MiniparError::runtime(format!("invalid number literal `{lexeme}`"))),
        Type::Bool => Ok(Value::Bool(lexeme == "true")),
        _ => Ok(Value::String(lexeme.clone())),
    }
}

/// `container[index]` for strings, lists and dicts.
pub fn index_value(container: &Value, index: &Value) -> Result<Value> {
    match container {
        Value::List(values) => {
            let values = lock(values);
            let position = as_int(index, "list index")?;
            resolve_index(position, values.len())
                .map(|slot| values[slot].clone())
                .ok_or_else(|| {
                    MiniparError::runtime(format!(
                        "list index {position} out of range for length {}",
                        values.len()
                    ))
                })
        }

        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let position = as_int(index, "string index")?;
            resolve_index(position, chars.len())
                .map(|slot| Value::String(chars[slot].to_string()))
                .ok_or_else(|| {
                    MiniparError::runtime(format!(
                        "string index {position} out of range for length {}",
                        chars.len()
                    ))
                })
        }

        Value::Dict(entries) => {
            let key = as_str(index, "dict key")?;
            lock(entries)
                .get(key)
                .cloned()
                .ok_or_else(|| MiniparError::runtime(format!("key \"{key}\" not found")))
        }

        other => Err(MiniparError::runtime(format!(
            "a {} cannot be indexed",
            other.type_name()
        ))),
    }
}

/// `container[start:end]` for strings and lists.
pub fn slice_value(container: &Value, start: Option<i64>, end: Option<i64>) -> Result<Value> {
    match container {
        Value::List(values) => {
            let values = lock(values);
            let (from, to) = slice_bounds(start, end, values.len());
            Ok(Value::list(values[from..to].to_vec()))
        }

        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (from, to) = slice_bounds(start, end, chars.len());
            Ok(Value::String(chars[from..to].iter().collect()))
        }

        other => Err(MiniparError::runtime(format!(
            "a {} cannot be sliced",
            other.type_name()
        ))),
    }
}

/// `== != < <= > >=`. Equality works on any pair of values; ordering on
/// numbers and on strings.
pub fn relational(op: TokenKind, left: &Value, right: &Value) -> Result<Value> {
    let ordering = || -> Result<Ordering> {
        match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
            (a, b) if a.is_number() && b.is_number() => {
                let (a, b) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
                a.partial_cmp(&b)
                    .ok_or_else(|| MiniparError::runtime("cannot order NaN"))
            }
            (a, b) => Err(MiniparError::runtime(format!(
                "cannot order {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    };

    let result = match op {
        TokenKind::EqualEqual => left.equals(right)?,
        TokenKind::NotEqual => !left.equals(right)?,
        TokenKind::Less => ordering()? == Ordering::Less,
        TokenKind::LessEqual => ordering()? != Ordering::Greater,
        TokenKind::Greater => ordering()? == Ordering::Greater,
        TokenKind::GreaterEqual => ordering()? != Ordering::Less,
        other => {
            return Err(MiniparError::runtime(format!(
                "unknown relational operator {other:?}"
            )))
        }
    };

    Ok(Value::Bool(result))
}

/// `+ - * / %` with minipar's numeric rules.
///
/// - `int op int` stays an integer for `+ - * %`; overflow is an error
/// - `/` always produces a float
/// - `%` takes the sign of the divisor
/// - `+` concatenates strings and lists, `*` repeats them
pub fn arithmetic(op: TokenKind, left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_arithmetic(op, *a, *b),

        (a, b) if a.is_number() && b.is_number() => {
            let (a, b) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
            float_arithmetic(op, a, b)
        }

        (Value::String(a), Value::String(b)) if op == TokenKind::Plus => {
            Ok(Value::String(format!("{a}{b}")))
        }

        (Value::List(a), Value::List(b)) if op == TokenKind::Plus => {
            let mut joined = lock(a).clone();
            joined.extend(lock(b).iter().cloned());
            Ok(Value::list(joined))
        }

        (Value::String(_) | Value::List(_), Value::Int(times)) if op == TokenKind::Star => {
            repeat(left, *times)
        }

        (Value::Int(times), Value::String(_) | Value::List(_)) if op == TokenKind::Star => {
            repeat(right, *times)
        }

        (a, b) => Err(MiniparError::runtime(format!(
            "unsupported operands {} and {} for `{}`",
            a.type_name(),
            b.type_name(),
            operator_symbol(op)
        ))),
    }
}

fn int_arithmetic(op: TokenKind, a: i64, b: i64) -> Result<Value> {
    let overflow = || MiniparError::runtime("integer overflow");

    match op {
        TokenKind::Plus => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
        TokenKind::Minus => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
        TokenKind::Star => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
        TokenKind::Slash => {
            if b == 0 {
                return Err(MiniparError::runtime("division by zero"));
            }
            Ok(Value::Float(a as f64 / b as f64))
        }
        TokenKind::Percent => {
            if b == 0 {
                return Err(MiniparError::runtime("modulo by zero"));
            }
            let rem = a.checked_rem(b).ok_or_else(overflow)?;
            if rem != 0 && (rem < 0) != (b < 0) {
                Ok(Value::Int(rem + b))
            } else {
                Ok(Value::Int(rem))
            }
        }
        other => Err(MiniparError::runtime(format!(
            "unknown arithmetic operator {other:?}"
        ))),
    }
}

fn float_arithmetic(op: TokenKind, a: f64, b: f64) -> Result<Value> {
    match op {
        TokenKind::Plus => Ok(Value::Float(a + b)),
        TokenKind::Minus => Ok(Value::Float(a - b)),
        TokenKind::Star => Ok(Value::Float(a * b)),
        TokenKind::Slash => {
            if b == 0.0 {
                return Err(MiniparError::runtime("division by zero"));
            }
            Ok(Value::Float(a / b))
        }
        TokenKind::Percent => {
            if b == 0.0 {
                return Err(MiniparError::runtime("modulo by zero"));
            }
            let rem = a % b;
            if rem != 0.0 && (rem < 0.0) != (b < 0.0) {
                Ok(Value::Float(rem + b))
            } else {
                Ok(Value::Float(rem))
            }
        }
        other => Err(MiniparError::runtime(format!(
            "unknown arithmetic operator {other:?}"
        ))),
    }
}

/// `"ab" * 3`, `[0] * 4`. Non-positive counts give an empty sequence.
fn repeat(sequence: &Value, times: i64) -> Result<Value> {
    let times = usize::try_from(times.max(0))
        .map_err(|_| MiniparError::runtime("repeat count out of range"))?;

    match sequence {
        Value::String(s) => Ok(Value::String(s.repeat(times))),
        Value::List(values) => {
            let values = lock(values).clone();
            let mut repeated = Vec::with_capacity(values.len().saturating_mul(times));
            for _ in 0..times {
                repeated.extend(values.iter().cloned());
            }
            Ok(Value::list(repeated))
        }
        other => Err(MiniparError::runtime(format!(
            "cannot repeat a {}",
            other.type_name()
        ))),
    }
}

fn operator_symbol(op: TokenKind) -> &'static str {
    match op {
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Percent => "%",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(arithmetic(TokenKind::Plus, &int(3), &int(4)).ok(), Some(int(7)));
        assert_eq!(arithmetic(TokenKind::Star, &int(3), &int(4)).ok(), Some(int(12)));
        assert!(matches!(
            arithmetic(TokenKind::Slash, &int(7), &int(2)),
            Ok(Value::Float(f)) if f == 3.5
        ));
    }

    #[test]
    fn modulo_takes_the_divisor_sign() {
        assert_eq!(arithmetic(TokenKind::Percent, &int(-7), &int(3)).ok(), Some(int(2)));
        assert_eq!(arithmetic(TokenKind::Percent, &int(7), &int(-3)).ok(), Some(int(-2)));
    }

    #[test]
    fn overflow_and_zero_division_are_errors() {
        assert!(arithmetic(TokenKind::Plus, &int(i64::MAX), &int(1)).is_err());
        assert!(arithmetic(TokenKind::Slash, &int(1), &int(0)).is_err());
        assert!(arithmetic(TokenKind::Percent, &int(1), &int(0)).is_err());
    }

    #[test]
    fn sequences_concatenate_and_repeat() {
        let ab = arithmetic(TokenKind::Plus, &Value::String("a".into()), &Value::String("b".into()));
        assert_eq!(ab.ok(), Some(Value::String("ab".into())));

        let repeated = arithmetic(TokenKind::Star, &int(2), &Value::String("xy".into()));
        assert_eq!(repeated.ok(), Some(Value::String("xyxy".into())));

        let list = arithmetic(TokenKind::Star, &Value::list(vec![int(0)]), &int(3));
        assert_eq!(list.ok(), Some(Value::list(vec![int(0), int(0), int(0)])));
    }

    #[test]
    fn ordering_rules() {
        assert_eq!(relational(TokenKind::Less, &int(3), &int(4)).ok(), Some(Value::Bool(true)));
        assert_eq!(
            relational(TokenKind::GreaterEqual, &Value::Float(2.5), &int(2)).ok(),
            Some(Value::Bool(true))
        );
        assert!(relational(TokenKind::Less, &int(1), &Value::String("a".into())).is_err());
        assert_eq!(
            relational(TokenKind::EqualEqual, &int(1), &Value::String("a".into())).ok(),
            Some(Value::Bool(false))
        );
    }

    #[test]
    fn indexing_and_slicing() {
        let list = Value::list(vec![int(1), int(2), int(3)]);
        assert_eq!(index_value(&list, &int(-1)).ok(), Some(int(3)));
        assert!(index_value(&list, &int(3)).is_err());
        assert_eq!(
            slice_value(&Value::String("hello".into()), Some(1), Some(3)).ok(),
            Some(Value::String("el".into()))
        );
    }
}
