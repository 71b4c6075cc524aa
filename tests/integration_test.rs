// ABOUTME: End-to-end tests driving the public library API: lex, parse, evaluate

use zoe::env::Environment;
use zoe::error::{format_diagnostic, EvalError};
use zoe::eval::eval_program;
use zoe::lexer::lex;
use zoe::parser::parse;
use zoe::value::Value;

fn run(source: &str) -> Result<Value, EvalError> {
    let (tokens, lex_errors) = lex(source);
    assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);
    let (stmts, parse_errors) = parse(tokens);
    assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);
    let env = Environment::new();
    zoe::builtins::register_builtins(&env);
    eval_program(&stmts, &env)
}

#[test]
fn arithmetic_respects_precedence_and_parens() {
    assert_eq!(run("1 + 2 * 3;").unwrap().to_string(), "7");
    assert_eq!(run("(1 + 2) * 3;").unwrap().to_string(), "9");
    assert_eq!(run("10 - 4 - 3;").unwrap().to_string(), "3");
}

#[test]
fn closures_capture_and_mutate_their_defining_scope() {
    let result = run(
        "var make_counter = fn () {
             var count = 0;
             return fn () { count = count + 1; return count; };
         };
         var counter = make_counter();
         counter(); counter(); counter();",
    )
    .unwrap();
    assert_eq!(result.to_string(), "3");
}

#[test]
fn objects_alias_by_reference_not_by_value() {
    let result = run(
        "var original = { count: 1 };
         var alias = original;
         alias.count = 99;
         original.count;",
    )
    .unwrap();
    assert_eq!(result.to_string(), "99");
}

#[test]
fn strings_support_byte_level_indexing() {
    assert_eq!(
        run("var greeting = \"hello\"; greeting[0];").unwrap().to_string(),
        "104"
    );
    let result = run("var s = \"abc\"; s[1] = 90; s;").unwrap();
    assert_eq!(result.to_string(), "aZc");
}

#[test]
fn return_unwinds_through_nested_blocks() {
    let result = run(
        "var classify = fn (n) {
             if n < 0 {
                 return \"negative\";
             } elif n == 0 {
                 return \"zero\";
             } else {
                 return \"positive\";
             }
         };
         classify(-5);",
    )
    .unwrap();
    assert_eq!(result.to_string(), "negative");
}

#[test]
fn type_errors_produce_a_single_line_diagnostic() {
    let err = run("1 + true;").unwrap_err();
    assert_eq!(
        format_diagnostic(&err),
        "error: `+`: expected two integers, two floats, or two strings, got boolean"
    );
}

#[test]
fn division_and_modulo_by_zero_are_runtime_errors() {
    assert!(matches!(run("1 / 0;"), Err(EvalError::DivisionByZero)));
    assert!(matches!(run("1 % 0;"), Err(EvalError::DivisionByZero)));
}

#[test]
fn undefined_variable_is_reported_by_name() {
    let err = run("missing_name;").unwrap_err();
    match err {
        EvalError::UndefinedVariable(name) => assert_eq!(name, "missing_name"),
        other => panic!("expected UndefinedVariable, got {:?}", other),
    }
}

#[test]
fn recursive_function_calls_work_within_the_depth_limit() {
    let result = run(
        "var fact = fn (n) {
             if n == 0 {
                 return 1;
             }
             return n * fact(n - 1);
         };
         fact(10);",
    )
    .unwrap();
    assert_eq!(result.to_string(), "3628800");
}

#[test]
fn unbounded_recursion_surfaces_as_stack_overflow_not_a_host_crash() {
    let err = run(
        "var loop_forever = fn (n) { return loop_forever(n + 1); };
         loop_forever(0);",
    )
    .unwrap_err();
    assert!(matches!(err, EvalError::StackOverflow(_)));
}

#[test]
fn builtin_print_accepts_any_single_value_and_returns_nil() {
    let result = run("print(\"hello\");").unwrap();
    assert_eq!(result.to_string(), "nil");
}

#[test]
fn builtin_strings_len_reports_byte_length() {
    assert_eq!(run("strings.len(\"hello\");").unwrap().to_string(), "5");
}

#[test]
fn builtin_panic_raises_a_fatal_diagnostic_carrying_the_argument() {
    let err = run("panic(\"boom\");").unwrap_err();
    match err {
        EvalError::Panic(msg) => assert_eq!(msg, "boom"),
        other => panic!("expected Panic, got {:?}", other),
    }
}

#[test]
fn logical_operators_require_boolean_operands_and_do_not_short_circuit() {
    // `false and panic(...)` still evaluates its right operand: both sides
    // must be booleans, there is no short-circuit skip.
    let err = run("false and panic(\"should still run\");").unwrap_err();
    assert!(matches!(err, EvalError::Panic(_)));
}
