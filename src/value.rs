// ABOUTME: Runtime value types for the Zoe interpreter

use crate::ast::Stmt;
use crate::env::Environment;
use crate::error::EvalError;
use indexmap::IndexMap;
use num_bigint::BigInt;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A mutable byte buffer shared by reference between every binding that
/// aliases it. Subscript writes through any alias are visible through all.
pub type StringRef = Rc<RefCell<Vec<u8>>>;

/// A mutable, insertion-ordered key/value map shared by reference, with the
/// same aliasing semantics as `StringRef`.
pub type ObjectRef = Rc<RefCell<IndexMap<String, Value>>>;

/// A closure: parameter names, body block, and the scope captured at the
/// point the `fn` literal was evaluated. Wrapped in `Rc` so cloning a
/// Function value is cheap and so `==` can compare closures by identity.
#[derive(Debug)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub env: Rc<Environment>,
}

/// An opaque host-provided callable. The only way host-side behavior (I/O,
/// introspection) enters the value model.
pub type HostFn = fn(&[Value]) -> Result<Value, EvalError>;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(BigInt),
    Float(f64),
    String(StringRef),
    Object(ObjectRef),
    Function(Rc<Lambda>),
    HostFunction(HostFn),
}

impl Value {
    pub fn new_string(bytes: Vec<u8>) -> Value {
        Value::String(Rc::new(RefCell::new(bytes)))
    }

    pub fn new_object(entries: IndexMap<String, Value>) -> Value {
        Value::Object(Rc::new(RefCell::new(entries)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::HostFunction(_) => "host function",
        }
    }

    pub fn is_truthy_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// `==`/`!=` semantics: value equality for primitives, reference
    /// identity for the shared-by-reference variants (String, Object,
    /// Function, HostFunction).
    pub fn identity_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::HostFunction(a), Value::HostFunction(b)) => {
                *a as usize == *b as usize
            }
            _ => false,
        }
    }
}

thread_local! {
    /// Guards recursive `print`/Display of Object values against cycles.
    /// A cyclic object (`a.x = a;`) would otherwise overflow the host
    /// stack instead of surfacing as a language-level condition.
    static PRINT_DEPTH: Cell<usize> = const { Cell::new(0) };
}

const MAX_PRINT_DEPTH: usize = 256;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => {
                write!(f, "{}", String::from_utf8_lossy(&s.borrow()))
            }
            Value::Object(o) => {
                let depth = PRINT_DEPTH.with(|d| d.get());
                if depth >= MAX_PRINT_DEPTH {
                    return write!(f, "{{...}}");
                }
                PRINT_DEPTH.with(|d| d.set(depth + 1));
                let result = (|| {
                    let map = o.borrow();
                    if map.is_empty() {
                        return write!(f, "{{}}");
                    }
                    write!(f, "{{ ")?;
                    for (i, (key, value)) in map.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}: {}", key, value)?;
                    }
                    write!(f, " }}")
                })();
                PRINT_DEPTH.with(|d| d.set(depth));
                result
            }
            Value::Function(_) => write!(f, "[Zoe Function]"),
            Value::HostFunction(_) => write!(f, "[JavaScript Function]"),
        }
    }
}
