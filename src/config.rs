// ABOUTME: Version info, welcome messages, and tunable interpreter limits

pub const VERSION: &str = "0.1.0";
pub const WELCOME_MESSAGE: &str = "Zoe";
pub const WELCOME_SUBTITLE: &str = "A small dynamically-typed scripting language";

/// File the REPL persists its line-editing history to, relative to the
/// current working directory.
pub const HISTORY_FILE: &str = ".zoe_history";
