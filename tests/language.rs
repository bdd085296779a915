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


use minipar::interpret;

fn run(src: &str) -> String {
    interpret(src, "")
}

fn assert_output(src: &str, expected: &str) {
    let output = run(src);
    assert_eq!(output, expected, "program:\n{src}");
}

fn assert_success(src: &str) {
    let output = run(src);
    if output.contains("error[") {
        panic!("Script failed:\n{src}\n{output}");
    }
}

fn assert_failure(src: &str, code: &str) {
    let output = run(src);
    let expected = format!("error[{code}]");
    if !output.contains(&expected) {
        panic!("Script was expected to fail with {code}:\n{src}\ngot: {output:?}");
    }
}

#[test]
fn sum_of_two_variables() {
    assert_output("var x: number = 1\n var y: number = 2\n print(x + y)", "3\n");
}

#[test]
fn arithmetic_and_comparisons() {
    let prelude = "var a: number = 3\nvar b: number = 4\n";
    assert_output(&format!("{prelude}print(a + b)"), "7\n");
    assert_output(&format!("{prelude}print(a < b)"), "true\n");
    assert_output(&format!("{prelude}print(!(a < b))"), "false\n");
}

#[test]
fn numeric_rules() {
    assert_output("print(7 / 2)", "3.5\n");
    assert_output("print(4 / 2)", "2.0\n");
    assert_output("print(-7 % 3)", "2\n");
    assert_output("print(2 * 3 + 1)", "7\n");
    assert_output("print(1 / 0)", "error[E_RUNTIME] line 1: division by zero\n");
}

#[test]
fn strings_index_and_slice() {
    let prelude = "var s: string = \"hello\"\n";
    assert_output(&format!("{prelude}print(s[1:3])"), "el\n");
    assert_output(&format!("{prelude}print(s[-1])"), "o\n");
    assert_output("print(\"ab\" * 2)", "abab\n");
    assert_output("print(\"a\" + \"b\")", "ab\n");
}

#[test]
fn default_parameters() {
    assert_output(
        "func f(x: number = 10) -> number { return x }\nprint(f())\nprint(f(5))",
        "10\n5\n",
    );
}

#[test]
fn recursion() {
    assert_output(
        "func fact(n: number) -> number {\n\
           if (n <= 1) { return 1 }\n\
           return n * fact(n - 1)\n\
         }\n\
         print(fact(10))",
        "3628800\n",
    );
}

#[test]
fn runaway_recursion_is_a_runtime_error() {
    let output = run("func f(n: number) -> number { return f(n + 1) }\nprint(f(0))");
    assert!(output.contains("maximum recursion depth exceeded"), "{output}");
}

#[test]
fn comprehension_scope() {
    assert_output(
        "var l: list = [for (v: number in [1, 2, 3]) -> v * 2]\nprint(l)",
        "[2, 4, 6]\n",
    );
    assert_failure(
        "var l: list = [for (v: number in [1, 2, 3]) -> v * 2]\nprint(v)",
        "E_DECLARATION",
    );
}

#[test]
fn block_scoping() {
    assert_failure("var a: number = 1\nvar a: number = 2", "E_DECLARATION");
    assert_failure("if (true) { var z: number = 1 }\nprint(z)", "E_DECLARATION");
    assert_output("var a: number = 1\nif (true) { if (true) { print(a) } }", "1\n");
}

#[test]
fn static_type_errors() {
    assert_failure("var x: number = \"a\"", "E_TYPE");
    assert_success("var x: number = 1\nx = 2");
    assert_failure("return 5", "E_TYPE");
    assert_failure("break", "E_TYPE");
}

#[test]
fn syntax_errors() {
    assert_failure("var x number = 1", "E_SYNTAX");
    assert_failure("}", "E_SYNTAX");
}

#[test]
fn loops_with_break_and_continue() {
    assert_output(
        "var i: number = 0\n\
         var total: number = 0\n\
         while (i < 10) {\n\
           i = i + 1\n\
           if (i % 2 == 0) { continue }\n\
           if (i > 7) { break }\n\
           total = total + i\n\
         }\n\
         print(total)",
        "16\n",
    );
}

#[test]
fn for_loops_honor_break_and_continue() {
    assert_output(
        "var total: number = 0\n\
         for (n: number in [1, 2, 3, 4, 5, 6]) {\n\
           if (n == 2) { continue }\n\
           if (n == 5) { break }\n\
           total = total + n\n\
         }\n\
         print(total)",
        "8\n",
    );
}

#[test]
fn loop_iterators_are_gone_after_the_loop() {
    assert_failure("for (i: number in [1, 2]) { print(i) }\nprint(i)", "E_DECLARATION");
    assert_output(
        "for (i: number in [1, 2]) { print(i) }\ndebug()",
        "1\n2\n[{\"depth\":0,\"bindings\":{}}]\n",
    );
    assert_output(
        "var n: number = 0\nfor (n: number in [1, 2]) { print(n) }\nprint(n)",
        "1\n2\n0\n",
    );
}

#[test]
fn assignment_is_an_expression() {
    assert_output(
        "var a: number = 0\nvar b: number = 0\na = b = 1\nprint(a, b)",
        "1 1\n",
    );
    assert_output("var a: number = 0\nprint((a = 2))\nprint(a)", "2\n2\n");
    assert_output(
        "var l: list = [0, 0]\nvar x: number = 0\nl[0] = x = 5\nprint(l, x)",
        "[5, 0] 5\n",
    );
    assert_failure("var a: number = 0\nvar s: string = \"x\"\ns = a = 1", "E_TYPE");
}

#[test]
fn self_containing_lists_compare_without_crashing() {
    let output = run(
        "var a: list = []\nvar b: list = []\nappend(a, a)\nappend(b, b)\nprint(a == a)\nprint(a == b)",
    );
    assert!(output.starts_with("true\nerror[E_RUNTIME] line 6"), "{output}");
    assert_output("var l: list = [[1]]\nprint(contains(l, l))", "false\n");
}

#[test]
fn dicts_iterate_keys_in_order() {
    assert_output(
        "var d: dict = {\"b\": 2, \"a\": 1}\nfor (k: string in d) { print(k, d[k]) }",
        "a 1\nb 2\n",
    );
    assert_output("var d: dict = {\"k\": \"v\"}\nprint(d)", "{\"k\": \"v\"}\n");
}

#[test]
fn containers_are_shared() {
    assert_output(
        "var l: list = [1, 2]\nvar m: list = l\nm[0] = 9\nappend(l, 3)\nprint(l)",
        "[9, 2, 3]\n",
    );
    assert_output("var l: list = [3, 1, 2]\nl.sort()\nprint(l)", "[1, 2, 3]\n");
}

#[test]
fn zero_values() {
    assert_output("var n: number\nprint(n)", "0\n");
    assert_output("var s: string\nprint(len(s))", "0\n");
}

#[test]
fn input_reads_lines() {
    let output = interpret(
        "var name: string = input(\"name? \")\nprint(\"hi \" + name)",
        "bob\n",
    );
    assert_eq!(output, "name? hi bob\n");

    let output = interpret("var name: string = input()", "");
    assert!(output.contains("error[E_RUNTIME]"), "{output}");
}

#[test]
fn conversions() {
    assert_output("print(to_number(\"12\") + 1)", "13\n");
    assert_output("print(to_string(3) + \"!\")", "3!\n");
}

#[test]
fn seq_runs_in_order() {
    assert_output("seq { print(1) print(2) print(3) }", "1\n2\n3\n");
}
