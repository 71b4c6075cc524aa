// ABOUTME: Tree-walking evaluator: statement/expression dispatch and the return control-flow

use crate::ast::{AssignTarget, BinaryOp, Expr, Stmt, UnaryOp};
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{Lambda, Value};
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::Zero;
use std::cell::Cell;
use std::rc::Rc;

const MAX_CALL_DEPTH: usize = 1024;

thread_local! {
    static CALL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// What a statement evaluation produced: either a plain value (fall
/// through to the next statement) or a `return` unwinding toward the
/// nearest enclosing Call boundary.
pub enum Flow {
    Value(Value),
    Return(Value),
}

impl Flow {
    fn into_value(self) -> Value {
        match self {
            Flow::Value(v) => v,
            Flow::Return(v) => v,
        }
    }
}

/// Evaluates a whole program (a statement list) against a scope, returning
/// the last produced value. A `return` that escapes every enclosing call is
/// an error — `return` is only meaningful inside a function body.
pub fn eval_program(stmts: &[Stmt], env: &Rc<Environment>) -> Result<Value, EvalError> {
    match eval_block_in(stmts, env)? {
        Flow::Value(v) => Ok(v),
        Flow::Return(_) => Err(EvalError::ReturnOutsideFunction),
    }
}

/// Evaluates a statement list in place, without opening a new child scope.
/// Used both for whole-program evaluation and for a function body (whose
/// own parameter scope was already created by the caller).
fn eval_block_in(stmts: &[Stmt], env: &Rc<Environment>) -> Result<Flow, EvalError> {
    let mut last = Value::Null;
    for stmt in stmts {
        match eval_stmt(stmt, env)? {
            Flow::Value(v) => last = v,
            Flow::Return(v) => return Ok(Flow::Return(v)),
        }
    }
    Ok(Flow::Value(last))
}

fn eval_stmt(stmt: &Stmt, env: &Rc<Environment>) -> Result<Flow, EvalError> {
    match stmt {
        Stmt::Expr(expr) => Ok(Flow::Value(eval_expr(expr, env)?)),
        Stmt::VarDecl { name, value } => {
            let v = eval_expr(value, env)?;
            env.declare(name.clone(), v)?;
            Ok(Flow::Value(Value::Null))
        }
        Stmt::Block(stmts) => {
            let child = Environment::with_parent(env.clone());
            let flow = eval_block_in(stmts, &child)?;
            match flow {
                Flow::Return(v) => Ok(Flow::Return(v)),
                Flow::Value(_) => Ok(Flow::Value(Value::Null)),
            }
        }
        Stmt::If { branches, else_branch } => {
            for (cond, body) in branches {
                let cond_value = eval_expr(cond, env)?;
                let truthy = cond_value
                    .is_truthy_boolean()
                    .ok_or_else(|| EvalError::type_error("if condition", "boolean", &cond_value))?;
                if truthy {
                    let child = Environment::with_parent(env.clone());
                    return match eval_block_in(body, &child)? {
                        Flow::Return(v) => Ok(Flow::Return(v)),
                        Flow::Value(_) => Ok(Flow::Value(Value::Null)),
                    };
                }
            }
            if let Some(body) = else_branch {
                let child = Environment::with_parent(env.clone());
                return match eval_block_in(body, &child)? {
                    Flow::Return(v) => Ok(Flow::Return(v)),
                    Flow::Value(_) => Ok(Flow::Value(Value::Null)),
                };
            }
            Ok(Flow::Value(Value::Null))
        }
        Stmt::Return(expr) => {
            let v = match expr {
                Some(expr) => eval_expr(expr, env)?,
                None => Value::Null,
            };
            Ok(Flow::Return(v))
        }
    }
}

fn eval_expr(expr: &Expr, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match expr {
        Expr::Null => Ok(Value::Null),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),
        Expr::Integer(n) => Ok(Value::Integer(n.clone())),
        Expr::Float(n) => Ok(Value::Float(*n)),
        Expr::Str(bytes) => Ok(Value::new_string(bytes.clone())),
        Expr::Identifier(name) => env
            .get(name)
            .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),
        Expr::Unary { op, operand } => eval_unary(op, operand, env),
        Expr::Binary { op, left, right } => eval_binary(op, left, right, env),
        Expr::Call { callee, args } => eval_call(callee, args, env),
        Expr::Member { object, field } => eval_member(object, field, env),
        Expr::Subscript { object, index } => eval_subscript(object, index, env),
        Expr::ObjectLiteral { entries } => eval_object_literal(entries, env),
        Expr::FunctionLiteral { params, body } => Ok(Value::Function(Rc::new(Lambda {
            params: params.clone(),
            body: body.clone(),
            env: env.clone(),
        }))),
        Expr::Assign { target, value } => eval_assign(target, value, env),
    }
}

fn eval_unary(op: &UnaryOp, operand: &Expr, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let v = eval_expr(operand, env)?;
    match op {
        UnaryOp::Not => {
            let b = v
                .is_truthy_boolean()
                .ok_or_else(|| EvalError::type_error("`!`", "boolean", &v))?;
            Ok(Value::Boolean(!b))
        }
        UnaryOp::Negate => match v {
            Value::Integer(n) => Ok(Value::Integer(-n)),
            Value::Float(n) => Ok(Value::Float(-n)),
            other => Err(EvalError::type_error("unary `-`", "integer or float", &other)),
        },
    }
}

fn eval_binary(op: &BinaryOp, left: &Expr, right: &Expr, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let l = eval_expr(left, env)?;
    let r = eval_expr(right, env)?;

    match op {
        BinaryOp::And => {
            let lb = l
                .is_truthy_boolean()
                .ok_or_else(|| EvalError::type_error("`and`", "boolean", &l))?;
            let rb = r
                .is_truthy_boolean()
                .ok_or_else(|| EvalError::type_error("`and`", "boolean", &r))?;
            Ok(Value::Boolean(lb && rb))
        }
        BinaryOp::Or => {
            let lb = l
                .is_truthy_boolean()
                .ok_or_else(|| EvalError::type_error("`or`", "boolean", &l))?;
            let rb = r
                .is_truthy_boolean()
                .ok_or_else(|| EvalError::type_error("`or`", "boolean", &r))?;
            Ok(Value::Boolean(lb || rb))
        }
        BinaryOp::Equal => Ok(Value::Boolean(l.identity_eq(&r))),
        BinaryOp::NotEqual => Ok(Value::Boolean(!l.identity_eq(&r))),
        BinaryOp::Less => compare(&l, &r, "`<`", |o| o == std::cmp::Ordering::Less),
        BinaryOp::Greater => compare(&l, &r, "`>`", |o| o == std::cmp::Ordering::Greater),
        BinaryOp::Add => add(l, r),
        BinaryOp::Subtract => arithmetic(l, r, "`-`", |a, b| a - b, |a, b| a - b),
        BinaryOp::Multiply => arithmetic(l, r, "`*`", |a, b| a * b, |a, b| a * b),
        BinaryOp::Modulo => modulo(l, r),
        BinaryOp::Divide => divide(l, r),
    }
}

fn compare(l: &Value, r: &Value, op: &str, matches: impl Fn(std::cmp::Ordering) -> bool) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Boolean(matches(a.cmp(b)))),
        (Value::Float(a), Value::Float(b)) => match a.partial_cmp(b) {
            Some(ordering) => Ok(Value::Boolean(matches(ordering))),
            None => Ok(Value::Boolean(false)),
        },
        _ => Err(EvalError::type_error(op, "two integers or two floats", l)),
    }
}

fn add(l: Value, r: Value) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a + b)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
        (Value::String(a), Value::String(b)) => {
            let mut bytes = a.borrow().clone();
            bytes.extend_from_slice(&b.borrow());
            Ok(Value::new_string(bytes))
        }
        (l, _) => Err(EvalError::type_error(
            "`+`",
            "two integers, two floats, or two strings",
            &l,
        )),
    }
}

fn arithmetic(
    l: Value,
    r: Value,
    op: &str,
    int_op: impl Fn(BigInt, BigInt) -> BigInt,
    float_op: impl Fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(int_op(a, b))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(a, b))),
        (l, _) => Err(EvalError::type_error(op, "two integers or two floats", &l)),
    }
}

fn divide(l: Value, r: Value) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::Integer(_), Value::Integer(b)) if b.is_zero() => Err(EvalError::DivisionByZero),
        (Value::Integer(a), Value::Integer(b)) => {
            // Truncation toward zero, matching the language's spec rather
            // than Rust's default (which already truncates toward zero for
            // signed integer division, so this is a direct pass-through).
            Ok(Value::Integer(a / b))
        }
        (Value::Float(_), Value::Float(b)) if b == 0.0 => Err(EvalError::DivisionByZero),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a / b)),
        (l, _) => Err(EvalError::type_error("`/`", "two integers or two floats", &l)),
    }
}

fn modulo(l: Value, r: Value) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::Integer(_), Value::Integer(b)) if b.is_zero() => Err(EvalError::DivisionByZero),
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a % b)),
        (Value::Float(_), Value::Float(b)) if b == 0.0 => Err(EvalError::DivisionByZero),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a % b)),
        (l, _) => Err(EvalError::type_error("`%`", "two integers or two floats", &l)),
    }
}

fn eval_call(callee: &Expr, arg_exprs: &[Expr], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let callee_value = eval_expr(callee, env)?;
    let mut args = Vec::with_capacity(arg_exprs.len());
    for arg in arg_exprs {
        args.push(eval_expr(arg, env)?);
    }

    match callee_value {
        Value::HostFunction(f) => f(&args),
        Value::Function(lambda) => call_lambda(&lambda, args),
        _ => Err(EvalError::NotCallable),
    }
}

fn call_lambda(lambda: &Lambda, args: Vec<Value>) -> Result<Value, EvalError> {
    if lambda.params.len() != args.len() {
        return Err(EvalError::arity_error(
            "function",
            lambda.params.len().to_string(),
            args.len(),
        ));
    }

    let depth = CALL_DEPTH.with(|d| {
        let next = d.get() + 1;
        d.set(next);
        next
    });
    let result = (|| {
        if depth > MAX_CALL_DEPTH {
            return Err(EvalError::StackOverflow(MAX_CALL_DEPTH));
        }
        let call_env = Environment::with_parent(lambda.env.clone());
        for (param, arg) in lambda.params.iter().zip(args.into_iter()) {
            call_env.define(param.clone(), arg);
        }
        Ok(eval_block_in(&lambda.body, &call_env)?.into_value())
    })();
    CALL_DEPTH.with(|d| d.set(depth - 1));
    result
}

fn eval_member(object: &Expr, field: &str, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let object_value = eval_expr(object, env)?;
    match object_value {
        Value::Object(map) => map
            .borrow()
            .get(field)
            .cloned()
            .ok_or_else(|| EvalError::FieldNotPresent(field.to_string())),
        other => Err(EvalError::type_error("member access", "object", &other)),
    }
}

fn eval_subscript(object: &Expr, index: &Expr, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let object_value = eval_expr(object, env)?;
    let index_value = eval_expr(index, env)?;
    let s = match &object_value {
        Value::String(s) => s,
        other => return Err(EvalError::type_error("subscript", "string", other)),
    };
    let i = match &index_value {
        Value::Integer(n) => n,
        other => return Err(EvalError::type_error("subscript index", "integer", other)),
    };
    let bytes = s.borrow();
    let index = usize_index(i, bytes.len())?;
    Ok(Value::Integer(BigInt::from(bytes[index])))
}

fn usize_index(i: &BigInt, length: usize) -> Result<usize, EvalError> {
    let index: usize = i
        .try_into()
        .map_err(|_| EvalError::IndexOutOfRange {
            index: i.to_string(),
            length,
        })?;
    if index >= length {
        return Err(EvalError::IndexOutOfRange {
            index: i.to_string(),
            length,
        });
    }
    Ok(index)
}

fn eval_object_literal(entries: &[(String, Expr)], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut map = IndexMap::new();
    for (name, value_expr) in entries {
        let value = eval_expr(value_expr, env)?;
        map.insert(name.clone(), value);
    }
    Ok(Value::new_object(map))
}

fn eval_assign(target: &AssignTarget, value: &Expr, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match target {
        AssignTarget::Identifier(name) => {
            let v = eval_expr(value, env)?;
            env.assign(name, v.clone())?;
            Ok(v)
        }
        AssignTarget::Member { object, field } => {
            let object_value = eval_expr(object, env)?;
            let v = eval_expr(value, env)?;
            match object_value {
                Value::Object(map) => {
                    map.borrow_mut().insert(field.clone(), v.clone());
                    Ok(v)
                }
                other => Err(EvalError::type_error("member assignment", "object", &other)),
            }
        }
        AssignTarget::Subscript { object, index } => {
            let object_value = eval_expr(object, env)?;
            let index_value = eval_expr(index, env)?;
            let v = eval_expr(value, env)?;
            let s = match &object_value {
                Value::String(s) => s,
                other => return Err(EvalError::type_error("subscript assignment", "string", other)),
            };
            let i = match &index_value {
                Value::Integer(n) => n,
                other => return Err(EvalError::type_error("subscript index", "integer", other)),
            };
            let byte_value = match &v {
                Value::Integer(n) => n,
                other => return Err(EvalError::type_error("subscript assignment value", "integer", other)),
            };
            let byte: u8 = byte_value
                .try_into()
                .map_err(|_| EvalError::ByteOutOfRange(byte_value.to_string()))?;
            let mut bytes = s.borrow_mut();
            let idx = usize_index(i, bytes.len())?;
            bytes[idx] = byte;
            drop(bytes);
            Ok(v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn run(source: &str) -> Result<Value, EvalError> {
        let (tokens, lex_errors) = lex(source);
        assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);
        let (stmts, parse_errors) = parse(tokens);
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);
        let env = Environment::new();
        eval_program(&stmts, &env)
    }

    #[test]
    fn arithmetic_precedence() {
        let result = run("1 + 2 * 3;").unwrap();
        assert_eq!(result.to_string(), "7");
    }

    #[test]
    fn var_decl_and_lookup() {
        let result = run("var x = 5; x;").unwrap();
        assert_eq!(result.to_string(), "5");
    }

    #[test]
    fn closure_captures_lexical_scope() {
        let result = run(
            "var make = fn (n) { return fn () { n = n + 1; return n; }; };
             var c = make(10);
             c(); c(); c();",
        )
        .unwrap();
        assert_eq!(result.to_string(), "13");
    }

    #[test]
    fn object_mutation_through_alias() {
        let result = run("var a = { x: 1 }; var b = a; b.x = 42; a.x;").unwrap();
        assert_eq!(result.to_string(), "42");
    }

    #[test]
    fn string_subscript_read_and_write() {
        let result = run("var s = \"hi\"; s[0] = 72; s;").unwrap();
        assert_eq!(result.to_string(), "Hi");
    }

    #[test]
    fn non_local_return_through_if() {
        let result = run(
            "var f = fn (n) { if n < 0 { return 0; } return n * 2; };
             f(-1);",
        )
        .unwrap();
        assert_eq!(result.to_string(), "0");

        let result = run(
            "var f = fn (n) { if n < 0 { return 0; } return n * 2; };
             f(5);",
        )
        .unwrap();
        assert_eq!(result.to_string(), "10");
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let err = run("1 + \"x\";").unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { .. }));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(matches!(run("1 / 0;").unwrap_err(), EvalError::DivisionByZero));
        assert!(matches!(run("1 % 0;").unwrap_err(), EvalError::DivisionByZero));
    }

    #[test]
    fn undefined_variable_is_an_error() {
        assert!(matches!(
            run("x;").unwrap_err(),
            EvalError::UndefinedVariable(name) if name == "x"
        ));
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let err = run("var f = fn (a, b) { return a; }; f(1);").unwrap_err();
        assert!(matches!(err, EvalError::ArityMismatch { .. }));
    }

    #[test]
    fn calling_a_non_function_is_an_error() {
        let err = run("var x = 1; x();").unwrap_err();
        assert!(matches!(err, EvalError::NotCallable));
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let err = run("return 1;").unwrap_err();
        assert!(matches!(err, EvalError::ReturnOutsideFunction));
    }

    #[test]
    fn lambda_uses_closure_scope_not_caller_scope() {
        let result = run(
            "var n = 1;
             var f = fn () { return n; };
             var g = fn () { var n = 2; return f(); };
             g();",
        )
        .unwrap();
        assert_eq!(result.to_string(), "1");
    }

    #[test]
    fn if_elif_else_chain() {
        let result = run(
            "var f = fn (n) {
                if n < 0 { return -1; }
                elif n == 0 { return 0; }
                else { return 1; }
             };
             f(0);",
        )
        .unwrap();
        assert_eq!(result.to_string(), "0");
    }

    #[test]
    fn field_not_present_is_an_error() {
        let err = run("var a = {}; a.missing;").unwrap_err();
        assert!(matches!(err, EvalError::FieldNotPresent(name) if name == "missing"));
    }

    #[test]
    fn subscript_out_of_range_is_an_error() {
        let err = run("var s = \"hi\"; s[9];").unwrap_err();
        assert!(matches!(err, EvalError::IndexOutOfRange { .. }));
    }

    #[test]
    fn string_concatenation_yields_fresh_buffer() {
        let result = run("var a = \"hi\"; var b = a + \"!\"; b;").unwrap();
        assert_eq!(result.to_string(), "hi!");
    }

    #[test]
    fn and_or_do_not_short_circuit_but_still_require_booleans() {
        let result = run("true or false;").unwrap();
        assert_eq!(result.to_string(), "true");
        let result = run("false and true;").unwrap();
        assert_eq!(result.to_string(), "false");
    }
}
