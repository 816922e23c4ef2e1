#![allow(clippy::needless_return)]

//! Rocks is a small, dynamically typed tree-walking interpreter.
//!
//! Rocks deliberately does *not* close over its defining scope: a function
//! body is evaluated against the environment active at the call site, not
//! the one where the function was declared. There is no `this`, no
//! inheritance, and the only looping construct is `for` — these are
//! scope decisions, not missing features. See `class` and `function` for
//! where that shows up in the implementation.
//!
//! ## Pipeline
//! Source text flows through three independent stages before producing
//! output:
//!
//! 1. [`scanner`] turns characters into [`token::Token`]s, collecting
//!    [`error::ScanError`]s rather than stopping at the first one.
//! 2. [`parser`] turns tokens into a [`stmt::Stmt`] tree via recursive
//!    descent, collecting [`error::ParseError`]s the same way.
//! 3. [`interpreter`] walks that tree, producing [`value::Value`]s and
//!    side effects (`print`, native calls), and stops at the first
//!    [`error::RuntimeError`] — runtime errors are sticky, unlike scan and
//!    parse errors.
//!
//! There is no separate resolver pass: without closures, `this`, or
//! `break` to disambiguate, variable lookup is a plain walk up the
//! [`environment::Environment`] chain at evaluation time.

use std::io::Write;
use std::{fs, process};

use log::error;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use error::Reportable;
use interpreter::Interpreter;
use parser::Parser;
use scanner::Scanner;

/// Exit code for a lexing or parsing failure, matching the historical
/// `sysexits.h` convention (`EX_DATAERR`).
pub const EXIT_DATA_ERROR: i32 = 65;
/// Exit code for a runtime failure once execution has started.
pub const EXIT_SOFTWARE_ERROR: i32 = 70;
/// Exit code for invalid command-line usage (`EX_USAGE`).
pub const EXIT_USAGE: i32 = 64;

/// Top-level driver tying the scanner, parser and interpreter together.
///
/// Takes its output writer by reference rather than printing directly, so
/// a caller (the CLI, or a test) controls where `print` statements go.
pub struct Rocks<'out> {
    interpreter: Interpreter<'out>,
}

impl<'out> Rocks<'out> {
    pub fn new(output: &'out mut dyn Write) -> Self {
        Rocks { interpreter: Interpreter::new(output) }
    }

    /// Reads and runs a source file. Exits the process with 65 on a scan
    /// or parse error, 70 on a runtime error — the caller never needs to
    /// check a return value.
    pub fn run_file(&mut self, path: &str) {
        let source = fs::read_to_string(path).unwrap_or_else(|err| {
            eprintln!("could not read '{path}': {err}");
            process::exit(EXIT_DATA_ERROR);
        });

        match self.run(&source) {
            Ok(()) => {}
            Err(RunError::SyntaxErrors) => process::exit(EXIT_DATA_ERROR),
            Err(RunError::Runtime(_)) => process::exit(EXIT_SOFTWARE_ERROR),
        }
    }

    /// Runs one chunk of source (a REPL line or a whole file), reporting
    /// any errors to stderr. Syntax errors do not stop the REPL; a runtime
    /// error only stops the current chunk, not the session.
    pub fn run(&mut self, source: &str) -> Result<(), RunError> {
        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        if !scan_errors.is_empty() {
            for error in &scan_errors {
                eprintln!("{}", error.report());
            }
            return Err(RunError::SyntaxErrors);
        }

        let (statements, parse_errors) = Parser::new(tokens).parse();
        if !parse_errors.is_empty() {
            for error in &parse_errors {
                eprintln!("{}", error.report());
            }
            return Err(RunError::SyntaxErrors);
        }

        self.interpreter.interpret(&statements).map_err(|runtime_error| {
            eprintln!("{}", runtime_error.report());
            error!("runtime error: {runtime_error}");
            RunError::Runtime(runtime_error)
        })
    }
}

/// Why a chunk of source failed to run to completion.
#[derive(Debug)]
pub enum RunError {
    /// The scanner or parser reported one or more errors; already
    /// printed to stderr by [`Rocks::run`].
    SyntaxErrors,
    Runtime(error::RuntimeError),
}
