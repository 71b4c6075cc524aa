// ABOUTME: The `panic` builtin: stringify one value, raise it as a fatal diagnostic

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

fn builtin_panic(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("panic", crate::error::ARITY_ONE, args.len()));
    }
    Err(EvalError::Panic(args[0].to_string()))
}

pub fn register(env: &Rc<Environment>) {
    env.define("panic".to_string(), Value::HostFunction(builtin_panic));
}
