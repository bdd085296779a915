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


use crate::error::MiniparError;

/// Renders pipeline errors as compiler-style diagnostics with source
/// context.
///
/// This is used by the command-line host only; library callers get the
/// single-line form from `MiniparError`'s `Display`.
///
/// # Output Example
/// ```text
/// error[E_TYPE]: expected NUMBER, found STRING
///   --> main.minipar:3
///    |
///  3 | var x: number = "a"
///    | ^^^^^^^^^^^^^^^^^^^
/// ```
pub struct DiagnosticPrinter {
    /// Full source text of the program.
    source: String,

    /// Display name of the program (a path, or `<eval>`).
    file_name: String,
}

impl DiagnosticPrinter {
    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            source: source.into(),
        }
    }

    /// Builds the diagnostic text for `error`.
    ///
    /// # Behavior
    /// - Errors without a line render as the header alone
    /// - The underline spans the trimmed source line, since errors carry
    ///   no column
    /// - `help` is appended when present
    pub fn render(&self, error: &MiniparError) -> String {
        let mut out = format!("error[{}]: {}\n", error.kind.code(), error.message);

        if let Some(line) = error.line {
            let src_line = self
                .source
                .lines()
                .nth(line.saturating_sub(1))
                .unwrap_or("");

            let indent = src_line.len() - src_line.trim_start().len();
            let width = src_line.trim().chars().count().max(1);

            out.push_str(&format!("  --> {}:{}\n", self.file_name, line));
            out.push_str("   |\n");
            out.push_str(&format!("{line:>3} | {src_line}\n"));
            out.push_str(&format!(
                "   | {}{}\n",
                &src_line[..indent],
                "^".repeat(width)
            ));
        }

        if let Some(help) = &error.help {
            out.push_str(&format!("\nhelp: {help}\n"));
        }

        out
    }

    /// Prints the diagnostic to stderr.
    pub fn print(&self, error: &MiniparError) {
        eprint!("{}", self.render(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_source_line_with_underline() {
        let printer = DiagnosticPrinter::new("main.minipar", "var a: number = 1\n  a = \"x\"\n");
        let error = MiniparError::type_error("expected NUMBER, found STRING", 2);

        let rendered = printer.render(&error);
        assert!(rendered.starts_with("error[E_TYPE]: expected NUMBER, found STRING\n"));
        assert!(rendered.contains("  --> main.minipar:2\n"));
        assert!(rendered.contains("  2 |   a = \"x\"\n"));
        assert!(rendered.contains("   |   ^^^^^^^\n"));
    }

    #[test]
    fn lineless_errors_render_header_and_help() {
        let printer = DiagnosticPrinter::new("<eval>", "");
        let error = MiniparError::runtime("boom").with_help("try again");
        assert_eq!(printer.render(&error), "error[E_RUNTIME]: boom\n\nhelp: try again\n");
    }
}
