// ABOUTME: Focused tests for string concatenation, byte indexing, and the `strings` builtin

use zoe::env::Environment;
use zoe::error::EvalError;
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
fn concatenation_allocates_a_fresh_buffer() {
    let result = run("var a = \"foo\"; var b = \"bar\"; var c = a + b; a[0] = 90; c;").unwrap();
    // mutating `a` after concatenation must not retroactively change `c`
    assert_eq!(result.to_string(), "foobar");
}

#[test]
fn escape_sequences_decode_to_their_byte_values() {
    let result = run("\"a\\tb\\nc\";").unwrap();
    assert_eq!(result.to_string(), "a\tb\nc");
}

#[test]
fn subscript_read_out_of_range_is_a_runtime_error() {
    let err = run("var s = \"hi\"; s[5];").unwrap_err();
    assert!(matches!(err, EvalError::IndexOutOfRange { .. }));
}

#[test]
fn subscript_write_rejects_negative_index() {
    let err = run("var s = \"hi\"; s[-1] = 65;").unwrap_err();
    assert!(matches!(err, EvalError::IndexOutOfRange { .. }));
}

#[test]
fn subscript_write_rejects_byte_value_out_of_range() {
    let err = run("var s = \"hi\"; s[0] = 999;").unwrap_err();
    assert!(matches!(err, EvalError::ByteOutOfRange(_)));
}

#[test]
fn strings_len_counts_bytes_not_characters() {
    // "café" has 4 Unicode scalars but 5 UTF-8 bytes (é encodes as two).
    let result = run("strings.len(\"café\");").unwrap();
    assert_eq!(result.to_string(), "5");
}

#[test]
fn strings_len_rejects_non_string_arguments() {
    let err = run("strings.len(5);").unwrap_err();
    assert!(matches!(err, EvalError::TypeMismatch { .. }));
}

#[test]
fn two_aliases_of_the_same_string_see_each_others_writes() {
    let result = run("var a = \"hi\"; var b = a; b[0] = 72; a;").unwrap();
    assert_eq!(result.to_string(), "Hi");
}
