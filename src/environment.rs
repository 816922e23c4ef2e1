//! Lexically chained variable scopes.
//!
//! There is no resolver pass in this language (no closures to resolve
//! scope distances for), so lookups walk the `enclosing` chain directly
//! from the innermost scope outward instead of jumping straight to a
//! pre-computed ancestor.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;

#[derive(Debug)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    pub variables: HashMap<String, Value>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment { enclosing, variables: HashMap::new() }
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            self.variables.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("undefined variable '{}'", name.lexeme),
        })
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.variables.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("undefined variable '{}'", name.lexeme),
        })
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::{Location, Type};

    fn name(n: &str) -> Token {
        Token::new(Type::Identifier, n.to_string(), None, Location::new(1, 1))
    }

    #[test]
    fn define_then_get() {
        let mut env = Environment::default();
        env.define("x", Value::Int(1));
        assert!(matches!(env.get(&name("x")), Ok(Value::Int(1))));
    }

    #[test]
    fn get_falls_through_to_enclosing() {
        let outer = Rc::new(RefCell::new(Environment::default()));
        outer.borrow_mut().define("x", Value::Int(1));
        let inner = Environment::new(Some(Rc::clone(&outer)));
        assert!(matches!(inner.get(&name("x")), Ok(Value::Int(1))));
    }

    #[test]
    fn assign_undefined_is_an_error() {
        let mut env = Environment::default();
        assert!(env.assign(&name("x"), Value::Int(1)).is_err());
    }

    #[test]
    fn assign_writes_through_to_enclosing() {
        let outer = Rc::new(RefCell::new(Environment::default()));
        outer.borrow_mut().define("x", Value::Int(1));
        let inner = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&outer)))));
        inner.borrow_mut().assign(&name("x"), Value::Int(2)).unwrap();
        assert!(matches!(outer.borrow().get(&name("x")), Ok(Value::Int(2))));
    }

    #[test]
    fn get_undefined_is_an_error() {
        let env = Environment::default();
        assert!(env.get(&name("missing")).is_err());
    }
}
