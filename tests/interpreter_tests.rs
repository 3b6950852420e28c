use std::io::Cursor;

use mathseq::interpreter::{Execution, Interpreter};
use mathseq::lexer;
use mathseq::parser::Parser;

fn run(source: &str) -> Execution {
    let tokens = lexer::lex(source).unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    Interpreter::new(&program).run()
}

fn run_with_input(source: &str, input: &str) -> Execution {
    let tokens = lexer::lex(source).unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    Interpreter::new(&program)
        .with_input(Box::new(Cursor::new(input.to_string())))
        .run()
}

fn run_ok(source: &str) -> (Vec<String>, i32) {
    let execution = run(source);
    let code = execution.result.unwrap();
    (execution.output, code)
}

#[test]
fn arithmetic_end_to_end() {
    let (output, code) = run_ok(
        "func main() -> int {\n  let x: int = 2 + 3 * 4;\n  print x;\n  return x;\n}",
    );
    assert_eq!(output, vec!["14"]);
    assert_eq!(code, 14);
}

#[test]
fn while_loop_counts_down() {
    let (output, code) = run_ok(
        "func main() -> int {\n  let i: int = 3;\n  while i > 0 {\n    print i;\n    i = i - 1;\n  }\n  return i;\n}",
    );
    assert_eq!(output, vec!["3", "2", "1"]);
    assert_eq!(code, 0);
}

#[test]
fn user_function_calls() {
    let (output, code) = run_ok(
        "func double(n: int) -> int {\n  return n * 2;\n}\nfunc main() -> int {\n  print double(21);\n  return double(3);\n}",
    );
    assert_eq!(output, vec!["42"]);
    assert_eq!(code, 6);
}

#[test]
fn missing_trailing_arguments_bind_void() {
    let (_, code) = run_ok(
        "func first(a: int, b: int) -> int {\n  return a;\n}\nfunc main() -> int {\n  return first(5);\n}",
    );
    assert_eq!(code, 5);
}

#[test]
fn print_joins_arguments_with_spaces() {
    let (output, _) = run_ok(
        "func main() -> int {\n  print \"x =\" 7 true;\n  return 0;\n}",
    );
    assert_eq!(output, vec!["x = 7 true"]);
}

#[test]
fn main_without_return_exits_zero() {
    let (_, code) = run_ok("func main() -> int {\n  print 1;\n}");
    assert_eq!(code, 0);
}

#[test]
fn bool_exit_code_coerces() {
    let (_, code) = run_ok("func main() -> bool {\n  return true;\n}");
    assert_eq!(code, 1);
}

#[test]
fn mixed_arithmetic_widens_to_float() {
    let (output, _) = run_ok(
        "func main() -> int {\n  print (1 + 0.5);\n  print (7 / 2);\n  return 0;\n}",
    );
    assert_eq!(output, vec!["1.5", "3"]);
}

#[test]
fn equality_compares_printed_forms() {
    let (output, _) = run_ok(
        "func main() -> int {\n  print (1 == 1.0);\n  print ([1, 2] == [1, 2]);\n  print (\"3\" == 3);\n  return 0;\n}",
    );
    assert_eq!(output, vec!["true", "true", "true"]);
}

#[test]
fn logic_does_not_short_circuit() {
    let (output, _) = run_ok(
        "func noisy() -> bool {\n  print \"called\";\n  return false;\n}\nfunc main() -> int {\n  if true or noisy() {\n    print \"taken\";\n  }\n  return 0;\n}",
    );
    assert_eq!(output, vec!["called", "taken"]);
}

#[test]
fn sequences_concatenate_and_index() {
    let (output, _) = run_ok(
        "func main() -> int {\n  let a: sequence = [1, 2] + [3];\n  print a;\n  print length(a);\n  print a[2];\n  return 0;\n}",
    );
    assert_eq!(output, vec!["[1, 2, 3]", "3", "3"]);
}

#[test]
fn length_of_declared_sequence() {
    let (output, code) = run_ok(
        "func main() -> int {\n  let s: sequence = [1, 2, 3];\n  print length(s);\n  return 0;\n}",
    );
    assert_eq!(output, vec!["3"]);
    assert_eq!(code, 0);
}

#[test]
fn get_out_of_range_fails_before_printing() {
    let execution = run(
        "func main() -> int {\n  let s: sequence = [1, 2];\n  print get(s, 5);\n  return 0;\n}",
    );
    assert!(execution.output.is_empty());
    let error = execution.result.unwrap_err();
    assert_eq!(error.message, "sequence index out of range");
}

#[test]
fn index_out_of_range_preserves_output() {
    let execution = run(
        "func main() -> int {\n  let a: sequence = [1];\n  print \"before\";\n  return a[5];\n}",
    );
    assert_eq!(execution.output, vec!["before"]);
    let error = execution.result.unwrap_err();
    assert_eq!(error.to_string(), "Runtime error: sequence index out of range");
}

#[test]
fn map_and_filter_take_function_names() {
    let (output, _) = run_ok(
        "func double(n: int) -> int {\n  return n * 2;\n}\nfunc odd(n: int) -> bool {\n  return n % 2 == 1;\n}\nfunc main() -> int {\n  print map([1, 2, 3], double);\n  print filter([1, 2, 3, 4], odd);\n  return 0;\n}",
    );
    assert_eq!(output, vec!["[2, 4, 6]", "[1, 3]"]);
}

#[test]
fn map_rejects_non_identifier_callback() {
    let execution = run("func main() -> int {\n  let a: sequence = map([1], 2);\n  return 0;\n}");
    let error = execution.result.unwrap_err();
    assert_eq!(error.message, "expected function identifier");
}

#[test]
fn generate_returns_an_empty_sequence() {
    let (output, _) = run_ok(
        "func main() -> int {\n  print generate(\"primes\", 5);\n  return 0;\n}",
    );
    assert_eq!(output, vec!["[]"]);
}

#[test]
fn input_parses_integers_floats_and_garbage() {
    let source = "func main() -> int {\n  let a: int = input()\n  let b: int = input()\n  let c: int = input()\n  print a b c;\n  return 0;\n}";
    let execution = run_with_input(source, "42\n3.9\nnope\n");
    assert_eq!(execution.output, vec!["42 3 0"]);
}

#[test]
fn input_with_prompt_still_reads() {
    let execution = run_with_input(
        "func main() -> int {\n  return input(\"n?\");\n}",
        "7\n",
    );
    assert_eq!(execution.result.unwrap(), 7);
}

#[test]
fn division_and_modulo_by_zero() {
    let error = run("func main() -> int {\n  return 1 / 0;\n}").result.unwrap_err();
    assert_eq!(error.message, "division by zero");

    let error = run("func main() -> int {\n  return 1 % 0;\n}").result.unwrap_err();
    assert_eq!(error.message, "division by zero");
}

#[test]
fn missing_main_is_reported() {
    let error = run("func start() -> int {\n  return 0;\n}").result.unwrap_err();
    assert_eq!(error.message, "No 'main' function found");
}

#[test]
fn undefined_variable_at_runtime() {
    let error = run("func main() -> int {\n  return ghost;\n}").result.unwrap_err();
    assert_eq!(error.message, "Undefined variable 'ghost'");
}

#[test]
fn block_scope_shadows_and_restores() {
    let (output, _) = run_ok(
        "func main() -> int {\n  let x: int = 1;\n  {\n    let x: int = 2;\n    print x;\n  }\n  print x;\n  return 0;\n}",
    );
    assert_eq!(output, vec!["2", "1"]);
}

#[test]
fn assignment_writes_through_inner_scopes() {
    let (output, _) = run_ok(
        "func main() -> int {\n  let x: int = 1;\n  if true {\n    x = 9;\n  }\n  print x;\n  return 0;\n}",
    );
    assert_eq!(output, vec!["9"]);
}

#[test]
fn negating_a_string_is_a_runtime_error() {
    let error = run("func main() -> int {\n  let x: int = -\"a\";\n  return 0;\n}")
        .result
        .unwrap_err();
    assert_eq!(error.message, "operator '-' requires numeric operands");
}

#[test]
fn recursion_works() {
    let (_, code) = run_ok(
        "func fact(n: int) -> int {\n  if n <= 1 {\n    return 1;\n  }\n  return n * fact(n - 1);\n}\nfunc main() -> int {\n  return fact(5);\n}",
    );
    assert_eq!(code, 120);
}
