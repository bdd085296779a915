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


use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use crate::error::{MiniparError, Result};
use crate::options::ConsoleMode;
use crate::value::lock;

enum ConsoleState {
    Captured {
        output: String,
        input: VecDeque<String>,
    },
    Stdio,
}

/// The program's standard streams.
///
/// Cloned into every worker and server thread; writes from concurrent
/// threads are serialised by the inner mutex, one call at a time.
#[derive(Clone)]
pub struct Console {
    inner: Arc<Mutex<ConsoleState>>,
}

impl Console {
    pub fn new(mode: &ConsoleMode, input: &str) -> Self {
        match mode {
            ConsoleMode::Captured => Self::captured(input),
            ConsoleMode::Stdio => Self::stdio(),
        }
    }

    /// Buffers output; `input` is consumed one line per `input()` call.
    pub fn captured(input: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ConsoleState::Captured {
                output: String::new(),
                input: input.lines().map(str::to_string).collect(),
            })),
        }
    }

    pub fn stdio() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ConsoleState::Stdio)),
        }
    }

    /// Writes `text` verbatim.
    pub fn write(&self, text: &str) -> Result<()> {
        let mut state = lock(&self.inner);
        match &mut *state {
            ConsoleState::Captured { output, .. } => {
                output.push_str(text);
                Ok(())
            }
            ConsoleState::Stdio => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(text.as_bytes())
                    .and_then(|_| stdout.flush())
                    .map_err(|e| MiniparError::runtime(format!("cannot write output: {e}")))
            }
        }
    }

    /// Reads one line without its terminator.
    ///
    /// # Returns
    /// `None` once the input is exhausted.
    pub fn read_line(&self) -> Result<Option<String>> {
        let mut state = lock(&self.inner);
        match &mut *state {
            ConsoleState::Captured { input, .. } => Ok(input.pop_front()),
            ConsoleState::Stdio => {
                let mut line = String::new();
                let read = io::stdin()
                    .lock()
                    .read_line(&mut line)
                    .map_err(|e| MiniparError::runtime(format!("cannot read input: {e}")))?;
                if read == 0 {
                    return Ok(None);
                }
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Ok(Some(line))
            }
        }
    }

    /// Everything written so far in captured mode (empty for stdio).
    pub fn output(&self) -> String {
        match &*lock(&self.inner) {
            ConsoleState::Captured { output, .. } => output.clone(),
            ConsoleState::Stdio => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_console_buffers_and_feeds_lines() -> Result<()> {
        let console = Console::captured("first\nsecond\n");
        console.write("a")?;
        console.write("b\n")?;
        assert_eq!(console.read_line()?, Some("first".to_string()));
        assert_eq!(console.read_line()?, Some("second".to_string()));
        assert_eq!(console.read_line()?, None);
        assert_eq!(console.output(), "ab\n");
        Ok(())
    }
}
