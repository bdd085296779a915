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


pub mod builtins;
pub mod calls;
pub mod channels;
pub mod console;
pub mod display;
pub mod environment;
pub mod expressions;
pub mod helpers;
pub mod statements;

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::ast::Program;
use crate::error::{MiniparError, Result};
use crate::options::RunOptions;
use crate::value::lock;

use console::Console;
use environment::{FuncTable, VarTable};
pub use statements::ExecSignal;

/// Tree-walking evaluator for a checked program.
///
/// Every field is a shared handle, so cloning a `Runner` is cheap and the
/// clone sees the same globals, functions, console and servers. `par`
/// workers and server threads each run against such a clone.
#[derive(Clone)]
pub struct Runner {
    /// The global runtime scope.
    pub(crate) globals: Arc<VarTable>,

    /// Flat run-wide table of user functions.
    pub(crate) functions: Arc<FuncTable>,

    pub(crate) console: Console,

    /// Accept loops started by `listen`.
    pub(crate) servers: Arc<Mutex<Vec<JoinHandle<()>>>>,

    pub(crate) options: RunOptions,
}

impl Runner {
    pub fn new(console: Console, options: RunOptions) -> Self {
        Self {
            globals: VarTable::root(),
            functions: Arc::new(FuncTable::default()),
            console,
            servers: Arc::new(Mutex::new(Vec::new())),
            options,
        }
    }

    /// Executes the top-level statements in order, in the global scope.
    ///
    /// # Errors
    /// The first runtime error, or a `return`/`break`/`continue` that
    /// escaped to the top level.
    pub fn run(&self, program: &Program) -> Result<()> {
        let globals = Arc::clone(&self.globals);

        for stmt in &program.statements {
            match self.exec_stmt(stmt, &globals)? {
                ExecSignal::Normal => {}
                ExecSignal::Return(_) => return Err(MiniparError::runtime("`return` outside of a function")),
                ExecSignal::Break => return Err(MiniparError::runtime("`break` outside of a loop")),
                ExecSignal::Continue => return Err(MiniparError::runtime("`continue` outside of a loop")),
            }
        }

        debug!("program finished");
        Ok(())
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Number of servers started by `listen` that have not been joined.
    pub fn listening_servers(&self) -> usize {
        lock(&self.servers).len()
    }

    /// Blocks until every listening server's accept loop ends.
    pub fn join_servers(&self) {
        let handles: Vec<JoinHandle<()>> = lock(&self.servers).drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                warn!("server thread panicked");
            }
        }
    }
}
