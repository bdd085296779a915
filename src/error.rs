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

/// The stage-level category of a [`MiniparError`].
///
/// There is no lexical category: the lexer never fails, any character it
/// does not recognise becomes a one-character token instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unexpected token where the grammar required something specific.
    Syntax,

    /// Duplicate declaration in one scope, or use of an undeclared name.
    Declaration,

    /// Static type violation found by the semantic checker.
    Type,

    /// Failure while executing the program.
    Runtime,
}

impl ErrorKind {
    /// Stable error code shown in diagnostics.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "E_SYNTAX",
            ErrorKind::Declaration => "E_DECLARATION",
            ErrorKind::Type => "E_TYPE",
            ErrorKind::Runtime => "E_RUNTIME",
        }
    }
}

/// Every failure raised by the lexer → parser → checker → runner pipeline.
///
/// Stages stop at the first violation; `Interpreter::run` is the only place
/// that catches these and turns them into a diagnostic line.
#[derive(thiserror::Error, Debug, Clone)]
#[error("error[{code}]{location}: {message}", code = .kind.code(), location = render_line(.line))]
pub struct MiniparError {
    /// Which stage rejected the program.
    pub kind: ErrorKind,

    /// Human-readable error message.
    pub message: String,

    /// 1-based source line, when the failing construct has one.
    pub line: Option<usize>,

    /// Optional note / help text.
    pub help: Option<String>,
}

fn render_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" line {line}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, MiniparError>;

impl MiniparError {
    /// Generic constructor
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            help: None,
        }
    }

    /// Syntax error: the parser expected something else at `line`.
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Syntax, message, Some(line))
    }

    /// Declaration error (redeclared or undeclared name)
    pub fn declaration(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Declaration, message, Some(line))
    }

    /// Type error (invalid operand / declaration / return / channel types)
    pub fn type_error(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Type, message, Some(line))
    }

    /// Runtime error (during evaluation)
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message, None)
    }

    /// Runtime error anchored at a source line.
    pub fn runtime_at(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Runtime, message, Some(line))
    }

    /// Attaches a line when the error does not carry one yet.
    pub fn or_line(mut self, line: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    /// Attach a help message to the error (builder-style).
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_line() {
        let err = MiniparError::type_error("expected NUMBER, found STRING", 3);
        assert_eq!(err.to_string(), "error[E_TYPE] line 3: expected NUMBER, found STRING");
    }

    #[test]
    fn runtime_error_without_line() {
        let err = MiniparError::runtime("division by zero");
        assert_eq!(err.to_string(), "error[E_RUNTIME]: division by zero");
        assert_eq!(err.or_line(7).line, Some(7));
    }
}
