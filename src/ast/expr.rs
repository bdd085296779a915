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


use crate::ast::{Declaration, Type};
use crate::lexer::token::{Token, TokenKind};

/// A typed expression node.
///
/// `token` anchors the node in the source: the literal for constants, the
/// name for identifiers and calls, the operator for binary and unary nodes,
/// and the opening bracket for collection literals.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub token: Token,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Number, string or boolean literal. The value is the token lexeme.
    Constant,

    /// A resolved name. The name is the token lexeme.
    Id,

    /// `target[index]`
    Access {
        target: Box<Expr>,
        index: Box<Expr>,
    },

    /// `target[start:end]`, either bound optional.
    Slice {
        target: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },

    /// `&&` / `||`
    Logical {
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `== != < <= > >=`
    Relational {
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `+ - * / %`
    Arithmetic {
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `!e` / `-e`
    Unary {
        operand: Box<Expr>,
    },

    /// `name(args)` or `receiver.oper(args)`.
    ///
    /// With an `oper`, `callee` is the receiver and is passed as the implicit
    /// first argument; without one, `callee` is the `Id` being called.
    Call {
        callee: Box<Expr>,
        oper: Option<String>,
        args: Vec<Expr>,
    },

    /// `[a, b, c]`
    ArrayLiteral(Vec<Expr>),

    /// `{"k": v, ...}`, keys in source order.
    DictLiteral(Vec<(String, Expr)>),

    /// `target = value`, target is an `Id` or an `Access`. Right
    /// associative and evaluates to the stored value.
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },

    /// `[for (v: number in xs) -> v * 2]`
    Comprehension {
        iterator: Box<Declaration>,
        iterable: Box<Expr>,
        projection: Box<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type, token: Token) -> Self {
        Self { kind, ty, token }
    }

    pub fn line(&self) -> usize {
        self.token.line
    }

    /// The operator that built a binary or unary node.
    pub fn operator(&self) -> TokenKind {
        self.token.kind
    }

    /// Name under which a call is dispatched: the dotted operator when
    /// present, otherwise the called identifier.
    pub fn call_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Call { callee, oper, .. } => {
                Some(oper.as_deref().unwrap_or(callee.token.lexeme.as_str()))
            }
            _ => None,
        }
    }

    /// Whether the node may appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        matches!(self.kind, ExprKind::Id | ExprKind::Access { .. })
    }

    /// Nodes whose element type is unknown statically. The checker skips
    /// strict type equality when one of these is involved.
    pub fn is_type_erased(&self) -> bool {
        match &self.kind {
            ExprKind::ArrayLiteral(_)
            | ExprKind::Comprehension { .. }
            | ExprKind::Access { .. }
            | ExprKind::Slice { .. }
            | ExprKind::Arithmetic { .. } => true,
            ExprKind::Assign { target, .. } => target.is_type_erased(),
            _ => false,
        }
    }
}
