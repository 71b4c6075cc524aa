// ABOUTME: The `strings` object builtin, a namespace whose `len` field is a HostFunction

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use indexmap::IndexMap;
use num_bigint::BigInt;
use std::rc::Rc;

fn builtin_len(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error(
            "strings.len",
            crate::error::ARITY_ONE,
            args.len(),
        ));
    }
    match &args[0] {
        Value::String(s) => Ok(Value::Integer(BigInt::from(s.borrow().len()))),
        other => Err(EvalError::type_error("strings.len", "string", other)),
    }
}

/// Preloads a `strings` Object with a `len` field bound to the HostFunction
/// above. There is no dotted-identifier token — `strings.len(s)` parses as
/// an ordinary Member expression over the identifier `strings`.
pub fn register(env: &Rc<Environment>) {
    let mut entries = IndexMap::new();
    entries.insert("len".to_string(), Value::HostFunction(builtin_len));
    env.define("strings".to_string(), Value::new_object(entries));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_returns_byte_length() {
        let result = builtin_len(&[Value::new_string(b"hi".to_vec())]).unwrap();
        assert_eq!(result.to_string(), "2");
    }

    #[test]
    fn len_rejects_non_string_argument() {
        let err = builtin_len(&[Value::Null]).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { .. }));
    }

    #[test]
    fn registers_as_member_accessible_object() {
        let env = Environment::new();
        register(&env);
        match env.get("strings") {
            Some(Value::Object(map)) => assert!(map.borrow().contains_key("len")),
            other => panic!("expected strings object, got {:?}", other),
        }
    }
}
