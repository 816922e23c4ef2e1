//! Error types produced by every stage of the pipeline.
//!
//! Lexical, parse and runtime errors all carry a source [`Location`] and a
//! message; they implement [`std::error::Error`] via `thiserror` so they
//! compose with `?` in the hosting binary. Return-statement propagation is
//! modeled as a fourth, non-user-facing signal (`Unwind::Return`) rather
//! than as a flag riding along on every `Value`.

use thiserror::Error;

use crate::token::{Location, Token, Type};
use crate::value::Value;

/// Anything that can be reported to the user as a single diagnostic line.
pub trait Reportable {
    fn report(&self) -> String;
}

/// A lexical error: an unterminated string or an unrecognized character.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("scan error at {location}: {message}")]
pub struct ScanError {
    pub location: Location,
    pub message: String,
}

impl Reportable for ScanError {
    fn report(&self) -> String {
        format!(
            "[line {}:{}] Error: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

/// A syntax error raised while parsing; the parser collects these rather
/// than stopping at the first one (see `parser::Parser::synchronize`).
///
/// No `PartialEq`: `token` carries a `Token`, which in turn carries a
/// `Value` literal that has no equality of its own.
#[derive(Debug, Error, Clone)]
#[error("parse error at {}: {message}", token.location)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Reportable for ParseError {
    fn report(&self) -> String {
        if self.token.r#type == Type::EOF {
            format!(
                "[line {}:{}] Error at end: {}",
                self.token.location.line, self.token.location.column, self.message
            )
        } else {
            format!(
                "[line {}:{}] Error at '{}': {}",
                self.token.location.line, self.token.location.column, self.token.lexeme, self.message
            )
        }
    }
}

/// A runtime error: type mismatch, undefined name, non-callable value, etc.
///
/// No `PartialEq`, for the same reason as `ParseError`.
#[derive(Debug, Error, Clone)]
#[error("runtime error at {}: {message}", token.location)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Reportable for RuntimeError {
    fn report(&self) -> String {
        format!(
            "[line {}:{}] Error at '{}': {}",
            self.token.location.line, self.token.location.column, self.token.lexeme, self.message
        )
    }
}

/// The signal threaded through expression/statement evaluation via `?`.
///
/// `Unwind::Error` halts the program: once one of these surfaces, nothing
/// else runs. `Unwind::Return` is not a user-facing error at all — it is
/// the internal control-flow vehicle for a `return` statement, caught at
/// the nearest enclosing function call (see `function::Function::call`). A
/// single signal type threaded everywhere the evaluator recurses is
/// simpler than a boolean flag riding on every value, and the two are
/// observably equivalent to a caller — both halt the program the same way
/// on an actual error.
#[derive(Debug, Clone)]
pub enum Unwind {
    Error(RuntimeError),
    Return(Value),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

pub type EvalResult<T> = Result<T, Unwind>;
