//! Host-provided builtins preloaded into the root scope: `print`, `panic`,
//! and the `strings` object (currently just `strings.len`).

use crate::env::Environment;
use std::rc::Rc;

pub mod console;
pub mod errors;
pub mod strings;

/// Installs every builtin into `env` as an ordinary binding. `env` must be
/// the root scope — builtins are not re-registered per call frame.
pub fn register_builtins(env: &Rc<Environment>) {
    console::register(env);
    errors::register(env);
    strings::register(env);
}
