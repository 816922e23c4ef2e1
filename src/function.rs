//! Callable values: user-defined functions and natives implemented in Rust.

use std::cell::RefCell;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{RuntimeError, Unwind};
use crate::interpreter::Interpreter;
use crate::stmt::Stmt;
use crate::token::Token;
use crate::value::{Callable, Value};

/// A user-defined function.
///
/// Deliberately holds no captured environment: this language does not
/// close over its defining scope. `call` parents the new call frame on
/// the *caller's* current environment, so the same `Function` can see
/// different variables depending on where it's invoked.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Box<Stmt>,
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let mut environment = Environment::new(Some(Rc::clone(&interpreter.environment)));

        for (param, argument) in self.params.iter().zip(arguments.into_iter()) {
            environment.define(&param.lexeme, argument);
        }

        let statements = match self.body.as_ref() {
            Stmt::Block(block) => &block.statements,
            other => unreachable!("function body is always a block, got {other:?}"),
        };

        match interpreter.execute_block(statements, Rc::new(RefCell::new(environment))) {
            Ok(()) => Ok(Value::Nil),
            Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Error(error)) => Err(error),
        }
    }

    fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name.lexeme)
    }
}

/// A native function implemented in Rust and installed into the global
/// scope under a fixed name (`now`, `sleep`).
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub function: for<'a, 'out> fn(&'a mut Interpreter<'out>, Vec<Value>) -> Result<Value, RuntimeError>,
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl NativeFunction {
    /// The natives installed into every fresh global scope.
    pub fn globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: "now",
                arity: 0,
                function: |_, _| {
                    let millis = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .expect("system clock is before the Unix epoch")
                        .as_millis();
                    Ok(Value::Int(millis as i64))
                },
            },
            NativeFunction {
                name: "sleep",
                arity: 1,
                function: |_, arguments| {
                    let seconds = match &arguments[0] {
                        Value::Int(i) => *i as f64,
                        Value::Float(f) => *f,
                        other => {
                            return Err(RuntimeError {
                                token: Token::from("sleep"),
                                message: format!(
                                    "sleep expects a number of seconds, got {}",
                                    other.type_str()
                                ),
                            })
                        }
                    };
                    std::thread::sleep(std::time::Duration::from_secs_f64(seconds.max(0.0)));
                    Ok(Value::Nil)
                },
            },
        ]
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}
