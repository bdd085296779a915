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


use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use minipar::diagnostics::DiagnosticPrinter;
use minipar::options::{DEFAULT_BUFFER_SIZE, DEFAULT_STACK_SIZE};
use minipar::{ConsoleMode, Interpreter, RunOptions};

/// minipar runs programs with parallel blocks and network channels.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Program file to run.
    path: Option<PathBuf>,

    /// Run this source text instead of a file.
    #[arg(short, long, conflicts_with = "path")]
    eval: Option<String>,

    /// Read all of stdin up front and print the captured output at the end.
    #[arg(long)]
    capture: bool,

    /// Run `par` blocks one call after another instead of on threads.
    #[arg(long)]
    sequential: bool,

    /// Bytes read per channel request or response.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Stack size of the run thread and of every `par` worker.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_STACK_SIZE)]
    stack_size: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("minipar: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let (name, source) = match (&args.eval, &args.path) {
        (Some(source), _) => ("<eval>".to_string(), source.clone()),
        (None, Some(path)) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            (path.display().to_string(), source)
        }
        (None, None) => bail!("expected a program file or --eval SOURCE"),
    };

    let (console, input) = if args.capture {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        (ConsoleMode::Captured, input)
    } else {
        (ConsoleMode::Stdio, String::new())
    };

    let options = RunOptions::default()
        .with_console(console)
        .with_parallel(!args.sequential)
        .with_buffer_size(args.buffer_size)
        .with_stack_size(args.stack_size);
    let interpreter = Interpreter::new(options);

    let runner = interpreter.runner(&input);
    let result = interpreter.execute(&source, &runner);

    if args.capture {
        print!("{}", runner.console().output());
    }

    if let Err(error) = result {
        DiagnosticPrinter::new(name, source).print(&error);
        return Ok(ExitCode::FAILURE);
    }

    runner.join_servers();
    Ok(ExitCode::SUCCESS)
}
