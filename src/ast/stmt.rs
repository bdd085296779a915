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

use crate::ast::{Expr, Param, Type};
use crate::lexer::token::Token;

/// The parsed root: top-level statements in source order.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// `var name: type = value`, also used for `for` and comprehension
/// iterators (which never carry a value).
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub ty: Type,
    pub token: Token,
    pub value: Option<Expr>,
}

impl Declaration {
    pub fn line(&self) -> usize {
        self.token.line
    }
}

/// A user function definition.
///
/// Shared by `Arc` so that the function table, `par` workers and server
/// threads can all hold it without copying the body.
#[derive(Debug)]
pub struct FuncDef {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

impl FuncDef {
    /// Parameters that must be supplied by the caller.
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| p.is_required()).count()
    }
}

/// All executable minipar statements.
#[derive(Debug, Clone)]
pub enum Stmt {
    /* ----------------------------- */
    /* EXPRESSIONS & VARIABLES       */
    /* ----------------------------- */

    Expression(Expr),

    Declaration(Declaration),

    /* ----------------------------- */
    /* FUNCTIONS                     */
    /* ----------------------------- */

    FuncDef(Arc<FuncDef>),

    Return {
        value: Option<Expr>,
        line: usize,
    },

    /* ----------------------------- */
    /* CONTROL FLOW                  */
    /* ----------------------------- */

    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },

    While {
        condition: Expr,
        body: Vec<Stmt>,
    },

    For {
        iterator: Declaration,
        iterable: Expr,
        body: Vec<Stmt>,
    },

    Break {
        line: usize,
    },

    Continue {
        line: usize,
    },

    /* ----------------------------- */
    /* CONCURRENCY                   */
    /* ----------------------------- */

    /// Every statement runs on its own worker; joined before moving on.
    Par {
        body: Vec<Stmt>,
        line: usize,
    },

    Seq {
        body: Vec<Stmt>,
    },

    /* ----------------------------- */
    /* CHANNELS                      */
    /* ----------------------------- */

    /// `c_channel name { host, port }`
    CChannel {
        name: String,
        host: Expr,
        port: Expr,
        line: usize,
    },

    /// `s_channel name { handler, description, host, port }`
    SChannel {
        name: String,
        handler: Token,
        description: Expr,
        host: Expr,
        port: Expr,
        line: usize,
    },
}
