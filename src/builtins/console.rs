// ABOUTME: The `print` builtin: stringify one value, write it with a trailing newline

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

fn builtin_print(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("print", crate::error::ARITY_ONE, args.len()));
    }
    println!("{}", args[0]);
    Ok(Value::Null)
}

pub fn register(env: &Rc<Environment>) {
    env.define("print".to_string(), Value::HostFunction(builtin_print));
}
