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


/// Where `print`, `input` and `debug` talk to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConsoleMode {
    /// Output is buffered and returned by the host; input comes from the
    /// text handed to the run.
    #[default]
    Captured,

    /// Output streams to the process stdout; input reads the process stdin.
    Stdio,
}

/// Knobs carried by an `Interpreter` into the runner.
///
/// ```text
/// RunOptions::default()
///     .with_console(ConsoleMode::Stdio)
///     .with_parallel(false)
/// ```
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub console: ConsoleMode,

    /// Run `par` siblings on worker threads. When off they run one after
    /// another in source order.
    pub parallel: bool,

    /// Bytes read per channel request or response.
    pub buffer_size: usize,

    /// Stack reserved for the run thread and every worker it spawns.
    pub stack_size: usize,
}

pub const DEFAULT_BUFFER_SIZE: usize = 4096;
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024 * 1024;

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            console: ConsoleMode::Captured,
            parallel: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RunOptions {
    pub fn with_console(mut self, console: ConsoleMode) -> Self {
        self.console = console;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let options = RunOptions::default()
            .with_console(ConsoleMode::Stdio)
            .with_parallel(false)
            .with_buffer_size(0)
            .with_stack_size(8 * 1024 * 1024);

        assert_eq!(options.console, ConsoleMode::Stdio);
        assert!(!options.parallel);
        assert_eq!(options.buffer_size, 1);
        assert_eq!(options.stack_size, 8 * 1024 * 1024);
    }
}
