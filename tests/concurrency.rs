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


use std::time::{Duration, Instant};

use minipar::{interpret, Interpreter, RunOptions};

const WORKERS: &str = "var results: list = []\n\
                       func work(n: number) -> void { append(results, n * 2) }\n";

#[test]
fn par_joins_every_call() {
    let source = format!("{WORKERS}par {{ work(1) work(2) work(3) }}\nsort(results)\nprint(results)");
    assert_eq!(interpret(&source, ""), "[2, 4, 6]\n");
}

#[test]
fn sequential_option_keeps_source_order() {
    let source = "func a() -> void { print(\"a\") }\n\
                  func b() -> void { print(\"b\") }\n\
                  par { a() b() a() }";
    let interpreter = Interpreter::new(RunOptions::default().with_parallel(false));
    assert_eq!(interpreter.run(source, ""), "a\nb\na\n");
}

#[test]
fn par_workers_overlap() {
    let source = "func nap() -> void { sleep(0.5) }\npar { nap() nap() nap() }";

    let started = Instant::now();
    let output = interpret(source, "");
    let elapsed = started.elapsed();

    assert_eq!(output, "");
    assert!(elapsed < Duration::from_millis(1200), "took {elapsed:?}");
}

#[test]
fn worker_failure_is_reported_after_the_join() {
    let source = "func bad() -> number { return 1 / 0 }\n\
                  func fine() -> void { print(\"fine\") }\n\
                  par { fine() bad() }\n\
                  print(\"unreachable\")";
    let output = interpret(source, "");
    assert!(output.contains("fine\n"), "{output}");
    assert!(output.contains("division by zero"), "{output}");
    assert!(!output.contains("unreachable"), "{output}");
}

#[test]
fn par_rejects_non_call_statements() {
    let output = interpret("var x: number = 0\npar { x = 1 }", "");
    assert!(output.starts_with("error[E_TYPE]"), "{output}");
}

#[test]
fn workers_see_globals_declared_before_the_block() {
    let source = "var greeting: string = \"hello\"\n\
                  func greet(name: string) -> void { print(greeting + \" \" + name) }\n\
                  par { greet(\"ada\") }";
    assert_eq!(interpret(source, ""), "hello ada\n");
}
