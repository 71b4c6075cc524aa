mod ast;
mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod highlighter;
mod lexer;
mod parser;
mod token;
mod value;

use clap::Parser;
use config::{HISTORY_FILE, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use env::Environment;
use error::format_diagnostic;
use highlighter::ZoeHelper;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

/// A tree-walking interpreter for Zoe, a small dynamically-typed scripting language
#[derive(Parser, Debug)]
#[command(name = "zoe")]
#[command(version = VERSION)]
#[command(about = "A tree-walking interpreter for Zoe")]
struct CliArgs {
    /// Script file to execute (omit to start the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let env = Environment::new();
    builtins::register_builtins(&env);

    match args.script {
        Some(path) => run_file(&path, &env),
        None => {
            run_repl(&env);
            ExitCode::SUCCESS
        }
    }
}

/// Lexes, parses, and evaluates a whole source string against `env`,
/// printing any diagnostics produced along the way. Returns whether
/// anything went wrong, so callers can decide an overall exit status.
fn interpret(source: &str, env: &Rc<Environment>) -> bool {
    let mut had_error = false;

    let (tokens, lex_errors) = lexer::lex(source);
    for err in &lex_errors {
        eprintln!("{}", format_diagnostic(err));
        had_error = true;
    }

    let (stmts, parse_errors) = parser::parse(tokens);
    for err in &parse_errors {
        eprintln!("{}", format_diagnostic(err));
        had_error = true;
    }

    if had_error {
        return had_error;
    }

    match eval::eval_program(&stmts, env) {
        Ok(_) => {}
        Err(err) => {
            eprintln!("{}", format_diagnostic(err));
            had_error = true;
        }
    }

    had_error
}

fn run_file(path: &PathBuf, env: &Rc<Environment>) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read {}: {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    };

    if interpret(&source, env) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_repl(env: &Rc<Environment>) {
    println!("{} {}", WELCOME_MESSAGE, VERSION);
    println!("{}", WELCOME_SUBTITLE);

    let config = Config::builder().auto_add_history(true).build();
    let mut rl = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("error: failed to initialize line editor: {}", err);
            return;
        }
    };
    rl.set_helper(Some(ZoeHelper::new()));
    let _ = rl.load_history(HISTORY_FILE);

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                interpret(&line, env);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpret_reports_lex_errors_and_short_circuits() {
        let env = Environment::new();
        let had_error = interpret("1 + `", &env);
        assert!(had_error);
    }

    #[test]
    fn interpret_reports_eval_errors() {
        let env = Environment::new();
        let had_error = interpret("1 + true;", &env);
        assert!(had_error);
    }

    #[test]
    fn interpret_succeeds_on_valid_program() {
        let env = Environment::new();
        let had_error = interpret("var x = 1 + 2;", &env);
        assert!(!had_error);
    }
}
