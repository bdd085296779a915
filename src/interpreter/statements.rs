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
use std::thread;

use tracing::{debug, info_span};

use crate::ast::{Expr, ExprKind, Stmt};
use crate::error::{MiniparError, Result};
use crate::interpreter::channels::{ClientChannel, ServerChannel};
use crate::interpreter::environment::VarTable;
use crate::interpreter::helpers::{as_int, as_str, is_truthy, iterate, resolve_index};
use crate::interpreter::Runner;
use crate::value::{lock, Value};

/* ============================================================================
 * Execution Control Signals
 * ============================================================================
 */

/// How a statement finished. Non-local transfers travel as values, never
/// as errors.
#[derive(Debug)]
pub enum ExecSignal {
    /// Normal fall-through execution.
    Normal,

    /// Early return from a function.
    Return(Value),

    /// Leave the innermost loop.
    Break,

    /// Skip to the next iteration of the innermost loop.
    Continue,
}

impl Runner {
    /// Executes statements in order in `env`, stopping at the first
    /// non-normal signal.
    pub fn exec_block(&self, body: &[Stmt], env: &Arc<VarTable>) -> Result<ExecSignal> {
        for stmt in body {
            match self.exec_stmt(stmt, env)? {
                ExecSignal::Normal => {}
                signal => return Ok(signal),
            }
        }
        Ok(ExecSignal::Normal)
    }

    /// Executes `body` in a fresh child scope of `env`. The scope is dropped
    /// on every exit path with the last reference to it.
    pub fn exec_scoped(&self, body: &[Stmt], env: &Arc<VarTable>) -> Result<ExecSignal> {
        let scope = VarTable::child(env);
        self.exec_block(body, &scope)
    }

    /* ============================================================================
     * Statement Execution Entry Point
     * ============================================================================
     */

    /// Executes a single minipar statement inside the given scope.
    ///
    /// This is the **core dispatch function for all statement execution**.
    pub fn exec_stmt(&self, stmt: &Stmt, env: &Arc<VarTable>) -> Result<ExecSignal> {
        match stmt {
            /* ------------------------------------------------------------------
             * Expression Statement
             * ---------------------------------------------------------------- */
            Stmt::Expression(expr) => {
                self.eval_expr(expr, env)?;
                Ok(ExecSignal::Normal)
            }

            /* ------------------------------------------------------------------
             * Variables
             * ---------------------------------------------------------------- */
            Stmt::Declaration(decl) => {
                let value = match &decl.value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::zero(decl.ty),
                };
                env.define(decl.name.clone(), value);
                Ok(ExecSignal::Normal)
            }

            /* ------------------------------------------------------------------
             * Functions
             * ---------------------------------------------------------------- */
            Stmt::FuncDef(func) => {
                self.functions.define(Arc::clone(func));
                Ok(ExecSignal::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Void,
                };
                Ok(ExecSignal::Return(value))
            }

            /* ------------------------------------------------------------------
             * Control Flow
             * ---------------------------------------------------------------- */
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.eval_expr(condition, env)?) {
                    self.exec_scoped(then_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.exec_scoped(else_branch, env)
                } else {
                    Ok(ExecSignal::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.eval_expr(condition, env)?) {
                    match self.exec_scoped(body, env)? {
                        ExecSignal::Normal | ExecSignal::Continue => {}
                        ExecSignal::Break => break,
                        ret @ ExecSignal::Return(_) => return Ok(ret),
                    }
                }
                Ok(ExecSignal::Normal)
            }

            Stmt::For {
                iterator,
                iterable,
                body,
            } => {
                let items = iterate(&self.eval_expr(iterable, env)?)
                    .map_err(|e| e.or_line(iterator.line()))?;

                for item in items {
                    let scope = VarTable::child(env);
                    scope.define(iterator.name.clone(), item);
                    match self.exec_block(body, &scope)? {
                        ExecSignal::Normal | ExecSignal::Continue => {}
                        ExecSignal::Break => break,
                        ret @ ExecSignal::Return(_) => return Ok(ret),
                    }
                }
                Ok(ExecSignal::Normal)
            }

            Stmt::Break { .. } => Ok(ExecSignal::Break),
            Stmt::Continue { .. } => Ok(ExecSignal::Continue),

            /* ------------------------------------------------------------------
             * Concurrency
             * ---------------------------------------------------------------- */
            Stmt::Seq { body } => self.exec_scoped(body, env),

            Stmt::Par { body, line } => {
                self.exec_par(body, env).map_err(|e| e.or_line(*line))?;
                Ok(ExecSignal::Normal)
            }

            /* ------------------------------------------------------------------
             * Channels
             * ---------------------------------------------------------------- */
            Stmt::CChannel {
                name,
                host,
                port,
                line,
            } => {
                let (host, port) = self.endpoint(host, port, env).map_err(|e| e.or_line(*line))?;
                let channel = ClientChannel::new(host, port, self.options.buffer_size);
                env.define(name.clone(), Value::Client(Arc::new(channel)));
                Ok(ExecSignal::Normal)
            }

            Stmt::SChannel {
                name,
                handler,
                description,
                host,
                port,
                line,
            } => {
                let func = self.functions.get(&handler.lexeme).ok_or_else(|| {
                    MiniparError::runtime_at(format!("undefined function `{handler}`"), *line)
                })?;
                let description = self.eval_expr(description, env)?;
                let description = as_str(&description, "channel description")
                    .map_err(|e| e.or_line(*line))?
                    .to_string();
                let (host, port) = self.endpoint(host, port, env).map_err(|e| e.or_line(*line))?;

                let channel = ServerChannel::new(host, port, description, func);
                env.define(name.clone(), Value::Server(Arc::new(channel)));
                Ok(ExecSignal::Normal)
            }
        }
    }

    /// Stores `value` into a name or a container slot.
    pub(crate) fn assign(&self, target: &Expr, value: Value, env: &Arc<VarTable>) -> Result<()> {
        match &target.kind {
            ExprKind::Id => {
                if env.assign(&target.token.lexeme, value) {
                    Ok(())
                } else {
                    Err(MiniparError::runtime_at(
                        format!("undefined variable `{}`", target.token),
                        target.line(),
                    ))
                }
            }

            ExprKind::Access { target: container, index } => {
                let container = self.eval_expr(container, env)?;
                let index = self.eval_expr(index, env)?;

                match &container {
                    Value::List(values) => {
                        let position = as_int(&index, "list index").map_err(|e| e.or_line(target.line()))?;
                        let mut values = lock(values);
                        let len = values.len();
                        let slot = resolve_index(position, len).ok_or_else(|| {
                            MiniparError::runtime_at(
                                format!("list index {position} out of range for length {len}"),
                                target.line(),
                            )
                        })?;
                        values[slot] = value;
                        Ok(())
                    }
                    Value::Dict(entries) => {
                        let key = as_str(&index, "dict key").map_err(|e| e.or_line(target.line()))?;
                        lock(entries).insert(key.to_string(), value);
                        Ok(())
                    }
                    other => Err(MiniparError::runtime_at(
                        format!("cannot assign into a {}", other.type_name()),
                        target.line(),
                    )),
                }
            }

            _ => Err(MiniparError::runtime_at(
                format!("`{}` cannot be assigned to", target.token),
                target.line(),
            )),
        }
    }

    /// Evaluates a channel's host and port operands.
    fn endpoint(&self, host: &Expr, port: &Expr, env: &Arc<VarTable>) -> Result<(String, u16)> {
        let host = self.eval_expr(host, env)?;
        let host = as_str(&host, "channel host")?.to_string();

        let port = as_int(&self.eval_expr(port, env)?, "channel port")?;
        let port = u16::try_from(port)
            .map_err(|_| MiniparError::runtime(format!("port {port} is out of range")))?;

        Ok((host, port))
    }

    /// Runs every call of a `par` block on its own worker thread and waits
    /// for all of them. Returned values are discarded; the first failure in
    /// source order is reported once every worker has finished.
    fn exec_par(&self, body: &[Stmt], env: &Arc<VarTable>) -> Result<()> {
        let calls: Vec<&Expr> = body
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Expression(expr) => Some(expr),
                _ => None,
            })
            .collect();

        if !self.options.parallel {
            for call in calls {
                self.eval_expr(call, env)?;
            }
            return Ok(());
        }

        let span = info_span!("par", workers = calls.len());
        let _enter = span.enter();

        let results: Vec<Result<Value>> = thread::scope(|scope| {
            let workers: Vec<_> = calls
                .iter()
                .enumerate()
                .map(|(i, call)| {
                    thread::Builder::new()
                        .name(format!("minipar-par-{i}"))
                        .stack_size(self.options.stack_size)
                        .spawn_scoped(scope, move || self.eval_expr(call, env))
                })
                .collect();

            workers
                .into_iter()
                .map(|worker| match worker {
                    Ok(handle) => handle
                        .join()
                        .unwrap_or_else(|_| Err(MiniparError::runtime("`par` worker panicked"))),
                    Err(e) => Err(MiniparError::runtime(format!("cannot start `par` worker: {e}"))),
                })
                .collect()
        });

        debug!(workers = results.len(), "par joined");
        results.into_iter().try_for_each(|result| result.map(|_| ()))
    }
}
