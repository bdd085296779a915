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


/// Statement visitor: control-flow legality, declarations, channels.
pub mod statements;

/// Expression visitor: bottom-up type derivation.
pub mod expressions;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::ast::{FuncDef, Program, Type};
use crate::error::Result;

/// The syntactic construct a statement is nested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Frame {
    /// A function body, with its declared return type.
    Function(Type),
    If,
    While,
    For,
    Par,
}

/// Second pass over the AST: re-derives expression types and rejects
/// programs whose statements are used outside their legal context.
///
/// Scoping was already resolved by the parser, so identifiers carry their
/// declared type; the checker only has to keep track of user functions (for
/// call result types) and of the enclosing constructs.
#[derive(Debug, Default)]
pub struct Checker {
    /// Enclosing constructs, innermost last.
    pub(crate) frames: Vec<Frame>,

    /// User functions seen so far in walk order.
    pub(crate) functions: HashMap<String, Arc<FuncDef>>,
}

/// Validates a parsed program.
///
/// # Returns
/// `Ok(())` when the program is well typed, otherwise the first type error.
pub fn check_program(program: &Program) -> Result<()> {
    let mut checker = Checker::default();
    checker.check_block(&program.statements)?;
    debug!(functions = checker.functions.len(), "checked program");
    Ok(())
}

impl Checker {
    /// Runs `body` with `frame` pushed on the context stack.
    pub(crate) fn within<T>(
        &mut self,
        frame: Frame,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.frames.push(frame);
        let result = body(self);
        self.frames.pop();
        result
    }

    /// Frames up to (and including) the innermost function.
    pub(crate) fn enclosing(&self) -> impl Iterator<Item = &Frame> {
        let mut done = false;
        self.frames.iter().rev().take_while(move |frame| {
            if done {
                return false;
            }
            done = matches!(frame, Frame::Function(_));
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::parse;

    fn check(source: &str) -> Result<()> {
        let program = match parse(source) {
            Ok(program) => program,
            Err(err) => panic!("unexpected parse error: {err}"),
        };
        check_program(&program)
    }

    fn type_error(source: &str) -> String {
        match check(source) {
            Ok(()) => panic!("expected a type error for {source:?}"),
            Err(err) => {
                assert_eq!(err.kind, ErrorKind::Type, "{err}");
                err.message
            }
        }
    }

    #[test]
    fn declaration_types_must_agree() {
        type_error("var x: number = \"a\"");
        assert!(check("var x: number = 1\nx = 2").is_ok());
        type_error("var x: number = 1\nx = \"two\"");
    }

    #[test]
    fn collection_initialisers_are_relaxed() {
        assert!(check("var l: list = [1, 2]\nvar n: number = l[0]").is_ok());
        assert!(check("var t: string = \"abc\"\nvar s: string = t[0:2]").is_ok());
        assert!(check("var n: number = 1 + 2").is_ok());
    }

    #[test]
    fn return_only_inside_functions() {
        let message = type_error("return 5");
        assert!(message.contains("return"), "{message}");
        assert!(check("func f() -> number { return 5 }").is_ok());
    }

    #[test]
    fn return_type_must_match() {
        type_error("func f() -> number { return \"x\" }");
        assert!(check("func f() -> void { return }").is_ok());
    }

    #[test]
    fn break_and_continue_only_inside_loops() {
        type_error("break");
        type_error("if (true) { continue }");
        assert!(check("while (true) { break }").is_ok());
        assert!(check("for (i: number in [1, 2]) { if (i == 1) { continue } }").is_ok());
    }

    #[test]
    fn break_does_not_escape_a_function() {
        type_error("func f() -> void { break }");
    }

    #[test]
    fn functions_cannot_nest_in_conditionals() {
        type_error("if (true) { func f() -> void { print(1) } }");
        type_error("while (false) { func g() -> void { print(1) } }");
        assert!(check("seq { func h() -> void { print(1) } }").is_ok());
    }

    #[test]
    fn par_accepts_only_calls() {
        assert!(check("func f() -> void { print(1) }\nfunc g() -> void { print(2) }\npar { f() g() }").is_ok());
        type_error("var x: number = 0\npar { x = 1 }");
        type_error("par { var y: number = 1 }");
    }

    #[test]
    fn conditions_are_typed() {
        type_error("while (1) { break }");
        assert!(check("var l: list = []\nif (l) { print(1) }").is_ok());
        type_error("if (\"s\") { print(1) }");
        type_error("for (x: number in 5) { print(x) }");
    }

    #[test]
    fn operands_are_typed() {
        type_error("var b: bool = true && 1");
        type_error("print(1 < \"a\")");
        type_error("print(\"a\" - 1)");
        type_error("print(-\"a\")");
        assert!(check("print(\"ab\" * 2)").is_ok());
        assert!(check("print(\"a\" + \"b\")").is_ok());
        type_error("print(\"a\" + 1)");
    }

    #[test]
    fn argument_count_respects_defaults() {
        assert!(check("func f(x: number = 10) -> number { return x }\nprint(f())").is_ok());
        type_error("func f(x: number, y: number = 1) -> number { return x }\nprint(f())");
    }

    #[test]
    fn call_result_types_flow() {
        type_error("func f() -> string { return \"a\" }\nvar n: number = f()");
        assert!(check("var n: number = len(\"abc\")").is_ok());
        type_error("var n: number = to_string(1)");
    }

    #[test]
    fn channel_contracts() {
        let ok = "func h(s: string) -> string { return s }\n\
                  s_channel srv { h, \"echo\", \"localhost\", 9000 }\n\
                  c_channel cli { \"localhost\", 9000 }\n\
                  listen(srv)\n\
                  print(send(cli, \"hi\"))\n\
                  cli.close()";
        assert!(check(ok).is_ok());

        type_error("c_channel cli { 1, 9000 }");
        type_error("c_channel cli { \"localhost\", \"9000\" }");
        type_error("func h(s: string) -> number { return 1 }\ns_channel srv { h, \"d\", \"localhost\", 1 }");
        type_error("func h(s: string) -> string { return s }\ns_channel srv { h, \"d\", \"localhost\", 1 }\nsend(srv, \"x\")");
        type_error("c_channel cli { \"localhost\", 1 }\nlisten(cli)");
    }

    #[test]
    fn assignments_are_typed_as_their_target() {
        assert!(check("var a: number = 0\nvar b: number = 0\na = b = 1").is_ok());
        assert!(check("var a: number = 0\nvar n: number = (a = 2) + 1").is_ok());
        type_error("var a: number = 0\nvar s: string = \"x\"\ns = a = 1");
        type_error("var a: number = 0\nvar s: string = (a = 1)");
        assert!(check("var l: list = [0]\nvar s: string = \"x\"\nl[0] = s").is_ok());
    }

    #[test]
    fn indexing_is_typed() {
        type_error("var l: list = [1]\nprint(l[\"a\"])");
        type_error("var d: dict = {\"a\": 1}\nprint(d[0])");
        type_error("var n: number = 1\nprint(n[0])");
        assert!(check("var d: dict = {\"a\": [1]}\nprint(d[\"a\"][0])").is_ok());
    }
}
