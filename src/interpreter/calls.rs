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

use tracing::trace;

use crate::ast::{Expr, FuncDef};
use crate::error::{MiniparError, Result};
use crate::interpreter::builtins;
use crate::interpreter::environment::{VarTable, MAX_SCOPE_DEPTH};
use crate::interpreter::{ExecSignal, Runner};
use crate::value::Value;

impl Runner {
    /// Evaluates a call expression.
    ///
    /// # Parameters
    /// - `call`: The whole call node, used for the dispatch name and line
    /// - `callee`: The receiver for dotted calls, the called name otherwise
    /// - `dotted`: Whether the call was written `receiver.oper(args)`
    /// - `args`: Argument expressions, evaluated left to right in `env`
    ///
    /// # Behavior
    /// - A dotted call passes its receiver as the first argument
    /// - Built-ins are looked up first, then the function table
    /// - Unknown names fail with a runtime error
    pub fn eval_call(
        &self,
        call: &Expr,
        callee: &Expr,
        dotted: bool,
        args: &[Expr],
        env: &Arc<VarTable>,
    ) -> Result<Value> {
        let name = call.call_name().unwrap_or(callee.token.lexeme.as_str());

        let mut values = Vec::with_capacity(args.len() + 1);
        if dotted {
            values.push(self.eval_expr(callee, env)?);
        }
        for arg in args {
            values.push(self.eval_expr(arg, env)?);
        }

        if let Some(builtin) = builtins::lookup(name) {
            return builtin(self, env, values);
        }

        match self.functions.get(name) {
            Some(func) => self.call_user_function(&func, values, env),
            None => Err(MiniparError::runtime(format!("undefined function `{name}`"))),
        }
    }

    /// Invokes a user function with already evaluated arguments.
    ///
    /// # Behavior
    /// 1. Pushes a new scope chained to `caller`
    /// 2. Evaluates every default in that scope
    /// 3. Binds the arguments positionally over the defaults; extra
    ///    arguments are ignored
    /// 4. Runs the body; `return v` yields `v`, falling off the end yields
    ///    `void`
    pub fn call_user_function(
        &self,
        func: &FuncDef,
        args: Vec<Value>,
        caller: &Arc<VarTable>,
    ) -> Result<Value> {
        let scope = VarTable::child(caller);
        if scope.depth() > MAX_SCOPE_DEPTH {
            return Err(MiniparError::runtime_at("maximum recursion depth exceeded", func.line)
                .with_help(format!("calls may nest at most {MAX_SCOPE_DEPTH} scopes deep")));
        }

        trace!(function = %func.name, args = args.len(), "call");

        for param in &func.params {
            if let Some(default) = &param.default {
                let value = self.eval_expr(default, &scope)?;
                scope.define(param.name.clone(), value);
            }
        }

        let supplied = args.len();
        for (param, value) in func.params.iter().zip(args) {
            scope.define(param.name.clone(), value);
        }

        if let Some(missing) = func.params.iter().skip(supplied).find(|p| p.is_required()) {
            return Err(MiniparError::runtime(format!(
                "missing argument `{}` for `{}`",
                missing.name, func.name
            )));
        }

        match self.exec_block(&func.body, &scope)? {
            ExecSignal::Return(value) => Ok(value),
            _ => Ok(Value::Void),
        }
    }
}
