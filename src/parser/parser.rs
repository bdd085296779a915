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


use tracing::debug;

use crate::ast::{Program, Stmt};
use crate::error::Result;
use crate::lexer::{Lexer, Token};
use crate::symbol::SymTable;

/// The core minipar recursive-descent parser.
///
/// This structure maintains:
/// - The token iterator produced by the lexer (pulled lazily, never rewound)
/// - Exactly one lookahead token
/// - The compile-time scope chain used to resolve names while parsing
///
/// The actual grammar logic is implemented through extension modules
/// (`statements`, `expressions`, `helpers`) via additional `impl Parser` blocks.
pub struct Parser {
    /// Remaining tokens.
    pub(crate) lexer: Lexer,

    /// The single token of lookahead. Becomes `Eof` once the lexer runs dry.
    pub(crate) lookahead: Token,

    /// Compile-time scopes, innermost first. Discarded after parsing.
    pub(crate) symtable: SymTable,

    /// Expressions and blocks currently open, bounded by [`MAX_NESTING`].
    pub(crate) depth: usize,
}

/// Deepest nesting of expressions and blocks the parser accepts. Later
/// phases walk the tree recursively, so this also bounds their recursion.
pub const MAX_NESTING: usize = 128;

/// Public entry point for the minipar parsing phase.
///
/// # Parameters
/// - `source`: Raw program text
///
/// # Returns
/// The program AST, or the first syntax / declaration error.
///
/// # Pipeline
/// ```text
/// Source → Lexer → Parser → AST → Checker → Runner
/// ```
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(Lexer::new(source)).parse()
}

impl Parser {
    /// Creates a parser positioned on the first token, with the root scope
    /// already holding every built-in name.
    pub fn new(mut lexer: Lexer) -> Self {
        let lookahead = lexer.next().unwrap_or_else(|| Token::eof(lexer.line()));
        Self {
            lexer,
            lookahead,
            symtable: SymTable::with_builtins(),
            depth: 0,
        }
    }

    /// Parses the whole input into a [`Program`].
    ///
    /// # Behavior
    /// - Statements are parsed in strict left-to-right order
    /// - Parsing stops at the first error
    /// - Anything left over once no statement can start is a syntax error
    pub fn parse(&mut self) -> Result<Program> {
        let statements: Vec<Stmt> = self.statements()?;

        if !self.is_at_end() {
            return Err(self.unexpected("end of input"));
        }

        debug!(statements = statements.len(), "parsed program");
        Ok(Program { statements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, Type};
    use crate::error::ErrorKind;

    fn parse_ok(source: &str) -> Program {
        match parse(source) {
            Ok(program) => program,
            Err(err) => panic!("unexpected parse error: {err}"),
        }
    }

    fn parse_err(source: &str) -> ErrorKind {
        match parse(source) {
            Ok(_) => panic!("expected a parse error for {source:?}"),
            Err(err) => err.kind,
        }
    }

    #[test]
    fn declaration_with_initializer() {
        let program = parse_ok("var x: number = 1");
        match &program.statements[0] {
            Stmt::Declaration(decl) => {
                assert_eq!(decl.name, "x");
                assert_eq!(decl.ty, Type::Number);
                assert!(decl.value.is_some());
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn precedence_climbs() {
        let program = parse_ok("var a: number = 1 + 2 * 3");
        let Stmt::Declaration(decl) = &program.statements[0] else {
            panic!("expected a declaration");
        };
        let Some(value) = &decl.value else {
            panic!("expected an initializer");
        };
        match &value.kind {
            ExprKind::Arithmetic { right, .. } => {
                assert_eq!(value.token.lexeme, "+");
                assert!(matches!(right.kind, ExprKind::Arithmetic { .. }));
                assert_eq!(right.token.lexeme, "*");
            }
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn duplicate_declaration_in_one_block() {
        assert_eq!(
            parse_err("var x: number = 1\nvar x: number = 2"),
            ErrorKind::Declaration
        );
    }

    #[test]
    fn nested_names_vanish_after_block() {
        parse_ok("var x: number = 1\nif (true) { var y: number = x }");
        assert_eq!(
            parse_err("if (true) { var y: number = 1 }\nprint(y)"),
            ErrorKind::Declaration
        );
    }

    #[test]
    fn shadowing_in_nested_block_is_allowed() {
        parse_ok("var x: number = 1\nwhile (false) { var x: string = \"a\" }");
    }

    #[test]
    fn recursion_sees_own_name() {
        parse_ok("func f(n: number) -> number { if (n < 1) { return 0 } return f(n - 1) }");
    }

    #[test]
    fn comprehension_iterator_is_scoped() {
        parse_ok("var l: list = [for (v: number in [1, 2, 3]) -> v * 2]");
        assert_eq!(
            parse_err("var l: list = [for (v: number in [1]) -> v]\nprint(v)"),
            ErrorKind::Declaration
        );
    }

    #[test]
    fn dotted_calls_record_the_operator() {
        let program = parse_ok("var l: list = []\nl.append(1)");
        let Stmt::Expression(call) = &program.statements[1] else {
            panic!("expected an expression statement");
        };
        match &call.kind {
            ExprKind::Call { callee, oper, args } => {
                assert_eq!(oper.as_deref(), Some("append"));
                assert_eq!(callee.token.lexeme, "l");
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn slices_and_access() {
        parse_ok("var s: string = \"hello\"\nprint(s[1:3], s[:2], s[2:], s[0])");
    }

    #[test]
    fn only_names_and_accesses_are_assignable() {
        parse_ok("var l: list = [1]\nl[0] = 2");
        assert_eq!(parse_err("var a: number = 1\na + 1 = 2"), ErrorKind::Syntax);
    }

    #[test]
    fn assignment_is_a_right_associative_expression() {
        let program = parse_ok("var a: number = 0\nvar b: number = 0\na = b = 1");
        let Stmt::Expression(outer) = &program.statements[2] else {
            panic!("expected an expression statement");
        };
        match &outer.kind {
            ExprKind::Assign { target, value } => {
                assert_eq!(target.token.lexeme, "a");
                assert!(matches!(value.kind, ExprKind::Assign { .. }));
            }
            other => panic!("unexpected expression {other:?}"),
        }

        parse_ok("var a: number = 0\nprint((a = 2), [a = 3])\nwhile ((a = a - 1) > 0) { print(a) }");
        assert_eq!(parse_err("var a: number = 0\nprint((a + 1 = 2))"), ErrorKind::Syntax);
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let depth = MAX_NESTING * 4;
        let source = format!("print({}1{})", "(".repeat(depth), ")".repeat(depth));
        let err = match parse(&source) {
            Err(err) => err,
            Ok(_) => panic!("expected a syntax error"),
        };
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert!(err.help.is_some());

        let shallow = format!("print({}1{})", "(".repeat(32), ")".repeat(32));
        parse_ok(&shallow);
        parse_ok(&format!("print({}true)", "!".repeat(32)));
    }

    #[test]
    fn channels_register_their_names() {
        parse_ok(
            "func h(s: string) -> string { return s }\n\
             s_channel srv { h, \"echo\", \"localhost\", 9000 }\n\
             c_channel cli { \"localhost\", 9000 }\n\
             listen(srv)",
        );
        assert_eq!(
            parse_err("s_channel srv { missing, \"d\", \"localhost\", 1 }"),
            ErrorKind::Declaration
        );
    }

    #[test]
    fn statements_must_start_with_a_name_or_keyword() {
        assert_eq!(parse_err("1 + 2"), ErrorKind::Syntax);
        assert_eq!(parse_err("var x: number = (1"), ErrorKind::Syntax);
        assert_eq!(parse_err("if (true) { print(1)"), ErrorKind::Syntax);
    }

    #[test]
    fn semicolons_are_optional() {
        let program = parse_ok("var a: number = 1; var b: number = 2;; print(a + b)");
        assert_eq!(program.statements.len(), 3);
    }

    #[test]
    fn syntax_errors_name_the_offending_lexeme() {
        let err = match parse("var x number") {
            Err(err) => err,
            Ok(_) => panic!("expected a syntax error"),
        };
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert!(err.message.contains("number"), "{}", err.message);
        assert_eq!(err.line, Some(1));
    }
}
