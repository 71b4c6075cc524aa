// ABOUTME: Lexical scope chains: declaration, lookup, assignment, child frames

use crate::error::EvalError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new root environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Inserts into THIS frame unconditionally, overwriting any existing
    /// binding. Used to bind call parameters and to install host builtins
    /// at startup, neither of which is a `var` declaration in the
    /// language sense.
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Inserts into THIS frame; fails if `name` is already bound here.
    /// This is the operation `var` statements use — redeclaring a name in
    /// the same frame is a runtime error (shadowing a parent frame's
    /// binding from a child frame is fine and goes through this path too).
    pub fn declare(&self, name: String, value: Value) -> Result<(), EvalError> {
        if self.bindings.borrow().contains_key(&name) {
            return Err(EvalError::Redeclaration(name));
        }
        self.bindings.borrow_mut().insert(name, value);
        Ok(())
    }

    /// Looks up a binding in this frame and its ancestors.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.get(name),
            None => None,
        }
    }

    /// Overwrites the nearest existing binding in this frame or an
    /// ancestor. Never creates a new binding.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), EvalError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(EvalError::UndefinedVariable(name.to_string())),
        }
    }
}
