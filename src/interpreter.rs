//! Walks the AST and produces side effects and [`Value`]s.
//!
//! Control flow that isn't a plain expression result — a runtime error or
//! a `return` — is threaded through `Result<_, Unwind>` (see
//! `error::Unwind`) instead of a side flag, so every statement/expression
//! evaluator just uses `?` like ordinary fallible code.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use log::{debug, trace};

use crate::class::{Class, Instance};
use crate::environment::Environment;
use crate::error::{EvalResult, RuntimeError, Unwind};
use crate::expr::{self, Expr};
use crate::function::{Function, NativeFunction};
use crate::stmt::{self, Stmt};
use crate::token::Type;
use crate::value::{Callable, Value};

pub struct Interpreter<'out> {
    pub environment: Rc<RefCell<Environment>>,
    pub globals: Rc<RefCell<Environment>>,
    output: &'out mut dyn Write,
}

impl<'out> Interpreter<'out> {
    pub fn new(output: &'out mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::globals() {
            globals.borrow_mut().define(native.name, Value::NativeFunction(Rc::new(native)));
        }

        Interpreter { environment: Rc::clone(&globals), globals, output }
    }

    /// Runs a program top to bottom. Stops at the first runtime error:
    /// once it surfaces, nothing further executes.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}
                Err(Unwind::Error(error)) => return Err(error),
                Err(Unwind::Return(_)) => {
                    unreachable!("return outside a function is rejected by the parser")
                }
            }
        }

        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> EvalResult<()> {
        trace!("executing {stmt:?}");

        match stmt {
            Stmt::Expression(data) => {
                self.evaluate(&data.expr)?;
                Ok(())
            }
            Stmt::Print(data) => {
                let value = self.evaluate(&data.expr)?;
                writeln!(self.output, "{value}").expect("write to interpreter output");
                Ok(())
            }
            Stmt::Var(data) => {
                let value = match &data.initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(&data.name.lexeme, value);
                Ok(())
            }
            Stmt::Block(data) => {
                let enclosing = Environment::new(Some(Rc::clone(&self.environment)));
                self.execute_block(&data.statements, Rc::new(RefCell::new(enclosing)))
            }
            Stmt::If(data) => {
                if self.evaluate(&data.condition)?.is_truthy() {
                    self.execute(&data.then_branch)
                } else if let Some(else_branch) = &data.else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::For(data) => self.execute_for(data),
            Stmt::Function(data) => {
                let function = Function {
                    name: data.name.clone(),
                    params: data.params.clone(),
                    body: data.body.clone(),
                };
                self.environment
                    .borrow_mut()
                    .define(&data.name.lexeme, Value::Function(Rc::new(function)));
                Ok(())
            }
            Stmt::Return(data) => {
                let value = match &data.value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Err(Unwind::Return(value))
            }
            Stmt::Class(data) => self.execute_class(data),
        }
    }

    /// Runs `statements` with `environment` as the active scope, restoring
    /// the previous scope afterward even if execution unwinds early.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> EvalResult<()> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = (|| {
            for statement in statements {
                self.execute(statement)?;
            }
            Ok(())
        })();

        self.environment = previous;
        result
    }

    fn execute_for(&mut self, data: &stmt::ForData) -> EvalResult<()> {
        let loop_scope = Environment::new(Some(Rc::clone(&self.environment)));
        let previous = std::mem::replace(&mut self.environment, Rc::new(RefCell::new(loop_scope)));

        let result = (|| {
            if let Some(initializer) = &data.initializer {
                self.execute(initializer)?;
            }

            loop {
                let should_continue = match &data.condition {
                    Some(condition) => self.evaluate(condition)?.is_truthy(),
                    None => true,
                };
                if !should_continue {
                    break;
                }

                self.execute(&data.body)?;

                if let Some(step) = &data.step {
                    self.evaluate(step)?;
                }
            }

            Ok(())
        })();

        self.environment = previous;
        result
    }

    fn execute_class(&mut self, data: &stmt::ClassData) -> EvalResult<()> {
        let mut methods = HashMap::new();
        for method in &data.methods {
            let Stmt::Function(method) = method else {
                unreachable!("class bodies only ever contain Stmt::Function nodes")
            };
            let function = Function {
                name: method.name.clone(),
                params: method.params.clone(),
                body: method.body.clone(),
            };
            methods.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class = Class::new(data.name.lexeme.clone(), methods);
        self.environment.borrow_mut().define(&data.name.lexeme, Value::Class(Rc::new(class)));
        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(data) => self.evaluate(&data.expr),
            Expr::Unary(data) => self.evaluate_unary(data),
            Expr::Binary(data) => self.evaluate_binary(data),
            Expr::Logical(data) => self.evaluate_logical(data),
            Expr::Variable(data) => Ok(self.environment.borrow().get(&data.name)?),
            Expr::Assign(data) => {
                let value = self.evaluate(&data.value)?;
                self.environment.borrow_mut().assign(&data.name, value.clone())?;
                Ok(value)
            }
            Expr::Call(data) => self.evaluate_call(data),
            Expr::Get(data) => self.evaluate_get(data),
            Expr::Set(data) => self.evaluate_set(data),
        }
    }

    fn evaluate_unary(&mut self, data: &expr::UnaryData) -> EvalResult<Value> {
        let value = self.evaluate(&data.expr)?;

        Ok(match data.operator.r#type {
            Type::Minus => crate::value::negate(value, &data.operator)?,
            Type::Bang => crate::value::not(&value),
            Type::Tilde => crate::value::bitwise_not(value, &data.operator)?,
            other => unreachable!("{other:?} is not a unary operator"),
        })
    }

    fn evaluate_binary(&mut self, data: &expr::BinaryData) -> EvalResult<Value> {
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;
        let operator = &data.operator;

        use crate::value::*;

        Ok(match operator.r#type {
            Type::Plus => add(left, right, operator)?,
            Type::Minus => sub(left, right, operator)?,
            Type::Star => mul(left, right, operator)?,
            Type::Slash => div(left, right, operator)?,
            Type::Ampersand => bitwise_and(left, right, operator)?,
            Type::Pipe => bitwise_or(left, right, operator)?,
            Type::Caret => bitwise_xor(left, right, operator)?,
            Type::Less => less(&left, &right, operator)?,
            Type::LessEqual => less_equal(&left, &right, operator)?,
            Type::Greater => greater(&left, &right, operator)?,
            Type::GreaterEqual => greater_equal(&left, &right, operator)?,
            Type::EqualEqual => equal(&left, &right),
            Type::BangEqual => not_equal(&left, &right),
            other => unreachable!("{other:?} is not a binary operator"),
        })
    }

    fn evaluate_logical(&mut self, data: &expr::LogicalData) -> EvalResult<Value> {
        let left = self.evaluate(&data.left)?;

        match data.operator.r#type {
            Type::Or if left.is_truthy() => Ok(left),
            Type::Or => self.evaluate(&data.right),
            Type::And if !left.is_truthy() => Ok(left),
            Type::And => self.evaluate(&data.right),
            other => unreachable!("{other:?} is not a logical operator"),
        }
    }

    fn evaluate_call(&mut self, data: &expr::CallData) -> EvalResult<Value> {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        // A class constructor call has no arity of its own: arguments are
        // evaluated (for side effects / to surface errors in them) and
        // then discarded, since there is no initializer to receive them.
        if let Value::Class(class) = callee {
            debug!("constructing {class:?} with {} argument(s) discarded", arguments.len());
            return Ok(class.call(self, arguments)?);
        }

        let callable: Rc<dyn Callable> = match callee {
            Value::Function(function) => function,
            Value::NativeFunction(function) => function,
            other => {
                return Err(Unwind::Error(RuntimeError {
                    token: data.paren.clone(),
                    message: format!("can only call functions and classes, got {}", other.type_str()),
                }))
            }
        };

        if arguments.len() != callable.arity() {
            return Err(Unwind::Error(RuntimeError {
                token: data.paren.clone(),
                message: format!("expected {} arguments but got {}", callable.arity(), arguments.len()),
            }));
        }

        debug!("calling {callable:?} with {} argument(s)", arguments.len());
        Ok(callable.call(self, arguments)?)
    }

    fn evaluate_get(&mut self, data: &expr::GetData) -> EvalResult<Value> {
        match self.evaluate(&data.object)? {
            Value::Instance(instance) => Ok(instance.borrow().get(&data.name)?),
            other => Err(Unwind::Error(RuntimeError {
                token: data.name.clone(),
                message: format!("only instances have properties, got {}", other.type_str()),
            })),
        }
    }

    fn evaluate_set(&mut self, data: &expr::SetData) -> EvalResult<Value> {
        match self.evaluate(&data.object)? {
            Value::Instance(instance) => {
                let value = self.evaluate(&data.value)?;
                instance.borrow_mut().set(&data.name, value.clone());
                Ok(value)
            }
            other => Err(Unwind::Error(RuntimeError {
                token: data.name.clone(),
                message: format!("only instances have fields, got {}", other.type_str()),
            })),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn run(source: &str) -> String {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        assert!(scan_errors.is_empty(), "{scan_errors:?}");

        let (statements, parse_errors) = Parser::new(tokens).parse();
        assert!(parse_errors.is_empty(), "{parse_errors:?}");

        interpreter.interpret(&statements).expect("program to run without a runtime error");
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn prints_int_as_decimal() {
        assert_eq!(run("print 1 + 2;"), "3\n");
    }

    #[test]
    fn int_plus_float_is_float() {
        assert_eq!(run("print 1 + 2.0;"), format!("{:.10e}\n", 3.0f64));
    }

    #[test]
    fn for_loop_is_the_only_loop_construct() {
        assert_eq!(run("for (var i = 0; i < 3; i = i + 1) { print i; }"), "0\n1\n2\n");
    }

    #[test]
    fn functions_see_the_call_site_environment_not_the_definition_site() {
        let source = r#"
            fun show() { print x; }
            fun wrapper() {
                var x = "inner";
                show();
            }
            var x = "outer";
            wrapper();
        "#;
        assert_eq!(run(source), "outer\n");
    }

    #[test]
    fn return_propagates_through_nested_blocks() {
        let source = r#"
            fun f() {
                {
                    return 42;
                }
                print "unreachable";
            }
            print f();
        "#;
        assert_eq!(run(source), "42\n");
    }

    #[test]
    fn function_with_no_return_yields_nil() {
        assert_eq!(run("fun f() { print 1; } print f();"), "1\nnil\n");
    }

    #[test]
    fn class_instances_have_unbound_methods() {
        let source = r#"
            class Greeter {
                greet() { print "hi"; }
            }
            var g = Greeter();
            var m = g.greet;
            m();
        "#;
        assert_eq!(run(source), "hi\n");
    }

    #[test]
    fn bitwise_and_or_xor() {
        assert_eq!(run("print 6 & 3; print 6 | 1; print 6 ^ 3;"), "2\n7\n5\n");
    }

    #[test]
    fn class_call_ignores_argument_count() {
        let source = r#"
            class Point {
                describe() { print "point"; }
            }
            var p = Point(1, 2, 3);
            p.describe();
        "#;
        assert_eq!(run(source), "point\n");
    }

    #[test]
    fn bare_for_with_no_parens_loops_until_a_return() {
        let source = r#"
            fun find() {
                var i = 0;
                for {
                    if (i == 3) { return i; }
                    i = i + 1;
                }
            }
            print find();
        "#;
        assert_eq!(run(source), "3\n");
    }

    #[test]
    fn for_with_only_a_condition_has_no_step() {
        let source = r#"
            var i = 0;
            for (i < 3) { print i; i = i + 1; }
        "#;
        assert_eq!(run(source), "0\n1\n2\n");
    }

    #[test]
    fn block_comments_are_skipped() {
        assert_eq!(run("/* a comment\nspanning lines */ print 1;"), "1\n");
    }

    #[test]
    fn int_division_truncates_toward_zero() {
        assert_eq!(run("print 7 / 2; print -7 / 2;"), "3\n-3\n");
    }

    #[test]
    fn type_mismatch_in_addition_is_a_runtime_error() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let (tokens, _) = Scanner::new("print 1 + \"x\";").scan_tokens();
        let (statements, _) = Parser::new(tokens).parse();
        assert!(interpreter.interpret(&statements).is_err());
    }
}
