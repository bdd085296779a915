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


//! # minipar
//!
//! An interpreter for minipar, a small typed imperative language with
//! `par`/`seq` blocks and TCP client/server channels.
//!
//! Source text goes through four stages, each stopping at its first error:
//!
//! ```text
//! lexer → parser (scope-aware) → checker → runner
//! ```
//!
//! ```
//! let output = minipar::interpret("var x: number = 1\nprint(x + 2)", "");
//! assert_eq!(output, "3\n");
//! ```

pub mod ast;
pub mod checker;
pub mod diagnostics;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod symbol;
pub mod value;

use std::thread;

use tracing::{debug, info_span, Level};

pub use crate::ast::Program;
pub use crate::error::{ErrorKind, MiniparError, Result};
pub use crate::interpreter::console::Console;
pub use crate::interpreter::Runner;
pub use crate::options::{ConsoleMode, RunOptions};
pub use crate::value::Value;

/// Runs `source` with captured console output, feeding `input` to
/// `input()` one line at a time.
///
/// Never fails: a stage error is appended to the output as one diagnostic
/// line.
pub fn interpret(source: &str, input: &str) -> String {
    Interpreter::default().run(source, input)
}

/// Front door of the pipeline. Stateless between runs.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    options: RunOptions,
}

impl Interpreter {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Lexes, parses and checks `source` without running it.
    pub fn compile(&self, source: &str) -> Result<Program> {
        {
            let span = info_span!("pipeline.lex", bytes = source.len());
            let _enter = span.enter();
            if tracing::enabled!(Level::DEBUG) {
                let tokens = lexer::Lexer::new(source).count();
                debug!(tokens, "lexed");
            }
        }

        let program = {
            let span = info_span!("pipeline.parse");
            let _enter = span.enter();
            let program = parser::parse(source)?;
            debug!(statements = program.statements.len(), "parsed");
            program
        };

        {
            let span = info_span!("pipeline.check");
            let _enter = span.enter();
            checker::check_program(&program)?;
            debug!("checked");
        }

        Ok(program)
    }

    /// A fresh runner whose console follows the configured mode; `input`
    /// feeds a captured console.
    pub fn runner(&self, input: &str) -> Runner {
        Runner::new(Console::new(&self.options.console, input), self.options.clone())
    }

    /// Compiles `source` and runs it on `runner`.
    ///
    /// Every stage runs on its own thread with the configured stack size.
    /// Servers started by `listen` keep running after this returns; see
    /// [`Runner::join_servers`].
    pub fn execute(&self, source: &str, runner: &Runner) -> Result<()> {
        let interpreter = self.clone();
        let source = source.to_string();
        let worker = runner.clone();
        let span = info_span!("pipeline", bytes = source.len());

        let handle = thread::Builder::new()
            .name("minipar-run".to_string())
            .stack_size(self.options.stack_size)
            .spawn(move || {
                let _enter = span.enter();
                let program = interpreter.compile(&source)?;
                let _run = info_span!("pipeline.run").entered();
                worker.run(&program)
            })
            .map_err(|e| MiniparError::runtime(format!("cannot start run thread: {e}")))?;

        handle
            .join()
            .unwrap_or_else(|_| Err(MiniparError::runtime("run thread panicked")))
    }

    /// Runs `source` and returns everything it printed, followed by a
    /// diagnostic line if a stage failed.
    pub fn run(&self, source: &str, input: &str) -> String {
        let runner = self.runner(input);
        let result = self.execute(source, &runner);

        let mut output = runner.console().output();
        if let Err(error) = result {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&format!("{error}\n"));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_captured() {
        assert_eq!(interpret("print(\"hi\")", ""), "hi\n");
    }

    #[test]
    fn failures_become_one_line() {
        let output = interpret("print(1)\nvar x: number = \"a\"", "");
        assert_eq!(output.lines().count(), 1);
        assert!(output.starts_with("error[E_TYPE] line 2"));
    }

    #[test]
    fn deeply_nested_source_is_rejected_without_crashing() {
        let depth = 20_000;
        let source = format!("print({}1{})", "(".repeat(depth), ")".repeat(depth));
        let output = interpret(&source, "");
        assert!(output.starts_with("error[E_SYNTAX] line 1"), "{output}");
    }

    #[test]
    fn long_operator_chains_compile_on_the_run_thread() {
        let terms = vec!["1"; 5_000].join(" + ");
        assert_eq!(interpret(&format!("print({terms})"), ""), "5000\n");
    }

    #[test]
    fn configured_stack_size_carries_the_run() {
        let interpreter = Interpreter::new(RunOptions::default().with_stack_size(2 * 1024 * 1024));
        let output = interpreter.run(
            "func f(n: number) -> number { if (n < 1) { return 0 } return 1 + f(n - 1) }\n\
             func g() -> void { print(f(10)) }\n\
             par { g() g() }",
            "",
        );
        assert_eq!(output, "10\n10\n");
    }

    #[test]
    fn output_before_a_runtime_error_is_kept() {
        let output = interpret("print(\"a\")\nprint(1 / 0)", "");
        assert_eq!(output, "a\nerror[E_RUNTIME] line 2: division by zero\n");
    }
}
