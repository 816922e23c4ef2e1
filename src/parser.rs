//! Recursive-descent parser, one method per precedence level.
//!
//! Syntax errors are collected rather than raised immediately: a failed
//! declaration is reported and the parser re-synchronizes at the next
//! statement boundary (`synchronize`) so the rest of the file still gets
//! checked, instead of stopping at the very first mistake.
//!
//! - Program     -> Declaration* EOF ;
//! - Block       -> "{" Declaration* "}" ;
//! - Declaration -> ClassDecl | FunDecl | VarDecl | Statement ;
//! - ClassDecl   -> "class" IDENTIFIER "{" Function* "}" ;
//! - FunDecl     -> "fun" Function ;
//! - VarDecl     -> "var" IDENTIFIER ( "=" Expression )? ";" ;
//! - Function    -> IDENTIFIER "(" Parameters? ")" Block ;
//! - Parameters  -> IDENTIFIER ( "," IDENTIFIER )* ;
//! - Statement   -> ExprStmt | ForStmt | IfStmt | PrintStmt | ReturnStmt | Block ;
//! - ExprStmt    -> Expression ";" ;
//! - ForStmt     -> "for" Block
//! -             |  "for" "(" ( VarDecl | ExprStmt | Expression ")" ) ( Expression? ";" Expression? ")" )? Block ;
//! - IfStmt      -> "if" "(" Expression ")" Block ( "else" (IfStmt | Block) )? ;
//! - PrintStmt   -> "print" Expression ";" ;
//! - ReturnStmt  -> "return" Expression? ";" ;
//! - Expression  -> Assignment ;
//! - Assignment  -> ( Call "." )? IDENTIFIER "=" Assignment | LogicOr ;
//! - LogicOr     -> LogicAnd ( "or" LogicAnd )* ;
//! - LogicAnd    -> Equality ( "and" Equality )* ;
//! - Equality    -> Comparison ( ( "!=" | "==" ) Comparison )* ;
//! - Comparison  -> Term ( ( ">" | ">=" | "<" | "<=" ) Term )* ;
//! - Term        -> Factor ( ( "+" | "-" | "&" | "|" ) Factor )* ;
//! - Factor      -> Unary ( ( "*" | "/" | "^" ) Unary )* ;
//! - Unary       -> ( "!" | "-" | "~" ) Unary | Call ;
//! - Arguments   -> Expression ( "," Expression )* ;
//! - Call        -> Primary ( "(" Arguments? ")" | "." IDENTIFIER )* ;
//! - Primary     -> NUMBER | STRING | "false" | "true" | "nil" | "(" Expression ")" | IDENTIFIER ;

use crate::error::ParseError;
use crate::expr::*;
use crate::stmt::*;
use crate::token::{Token, Type};

type ParseResult<T> = Result<T, ParseError>;

/// Returns if the next token is any of the given types.
macro_rules! matches {
    ( $self:ident, $( $type:expr ),+ ) => {
        {
            if $( $self.check($type) ) ||* {
                $self.advance();
                true
            } else {
                false
            }
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseError>,
    inside_function: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0, errors: Vec::new(), inside_function: false }
    }

    /// Parses the whole token stream, returning every statement parsed
    /// alongside every syntax error encountered.
    pub fn parse(mut self) -> (Vec<Stmt>, Vec<ParseError>) {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        (statements, self.errors)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().r#type == Type::EOF
    }

    fn check(&self, r#type: Type) -> bool {
        !self.is_at_end() && self.peek().r#type == r#type
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn consume(&mut self, r#type: Type, message: &str) -> ParseResult<&Token> {
        if self.check(r#type) {
            return Ok(self.advance());
        }

        Err(ParseError { token: self.peek().clone(), message: message.to_string() })
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let statement = if matches!(self, Type::Class) {
            self.class_declaration()
        } else if matches!(self, Type::Fun) {
            self.function("function")
        } else if matches!(self, Type::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match statement {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "expect class name")?.clone();
        self.consume(Type::LeftBrace, "expect '{' before class body")?;

        let mut methods = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(Type::RightBrace, "expect '}' after class body")?;

        Ok(Stmt::Class(ClassData { name, methods }))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "expect variable name")?.clone();

        let initializer = if matches!(self, Type::Equal) { Some(self.expression()?) } else { None };

        self.consume(Type::Semicolon, "expect ';' after variable declaration")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if matches!(self, Type::For) {
            return self.for_statement();
        }

        if matches!(self, Type::If) {
            return self.if_statement();
        }

        if matches!(self, Type::Print) {
            return self.print_statement();
        }

        if matches!(self, Type::Return) {
            return self.return_statement();
        }

        if matches!(self, Type::LeftBrace) {
            return Ok(Stmt::Block(BlockData { statements: self.block()? }));
        }

        self.expression_statement()
    }

    /// Kept as its own AST node rather than desugared into a loop built
    /// from a `while`, because this language has no `while` statement to
    /// desugar into.
    ///
    /// Three head shapes: a bare `for { ... }` with no parens at all is an
    /// infinite loop; `for (expr) { ... }` with no `;` before the closing
    /// paren treats `expr` as a condition-only head (no initializer, no
    /// step); otherwise it's the classic C-style `for (init; cond; step)
    /// { ... }`.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        if self.check(Type::LeftBrace) {
            let body = Box::new(self.block_statement()?);
            return Ok(Stmt::For(ForData { initializer: None, condition: None, step: None, body }));
        }

        self.consume(Type::LeftParen, "expect '(' after for")?;

        let initializer = if matches!(self, Type::Semicolon) {
            None
        } else if matches!(self, Type::Var) {
            Some(Box::new(self.var_declaration()?))
        } else {
            let expr = self.expression()?;
            if matches!(self, Type::RightParen) {
                let body = Box::new(self.block_statement()?);
                return Ok(Stmt::For(ForData { initializer: None, condition: Some(expr), step: None, body }));
            }
            self.consume(Type::Semicolon, "expect ';' after loop initializer")?;
            Some(Box::new(Stmt::Expression(ExpressionData { expr })))
        };

        let condition = if !self.check(Type::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Type::Semicolon, "expect ';' after loop condition")?;

        let step = if !self.check(Type::RightParen) { Some(self.expression()?) } else { None };
        self.consume(Type::RightParen, "expect ')' after loop clauses")?;

        let body = Box::new(self.block_statement()?);

        Ok(Stmt::For(ForData { initializer, condition, step, body }))
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "expect '(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "expect ')' after if condition")?;

        let then_branch = Box::new(self.block_statement()?);
        let else_branch = if matches!(self, Type::Else) {
            if matches!(self, Type::If) {
                Some(Box::new(self.if_statement()?))
            } else {
                Some(Box::new(self.block_statement()?))
            }
        } else {
            None
        };

        Ok(Stmt::If(IfData { condition, then_branch, else_branch }))
    }

    /// `if`/`for`/`fun` bodies are always a brace-delimited block, never
    /// a bare statement.
    fn block_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftBrace, "expect '{' before block")?;
        Ok(Stmt::Block(BlockData { statements: self.block()? }))
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "expect ';' after value")?;
        Ok(Stmt::Print(PrintData { expr }))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().to_owned();

        if !self.inside_function {
            return Err(ParseError { token: keyword, message: "cannot return from top-level code".to_string() });
        }

        let value = if self.check(Type::Semicolon) { None } else { Some(self.expression()?) };

        self.consume(Type::Semicolon, "expect ';' after return value")?;
        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "expect ';' after expression")?;
        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    fn function(&mut self, kind: &str) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, &format!("expect {kind} name"))?.to_owned();

        self.consume(Type::LeftParen, &format!("expect '(' after {kind} name"))?;

        let mut params = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= 255 {
                    return Err(ParseError {
                        token: self.peek().to_owned(),
                        message: "cannot have more than 255 parameters".to_string(),
                    });
                }

                params.push(self.consume(Type::Identifier, "expect parameter name")?.to_owned());

                if !matches!(self, Type::Comma) {
                    break;
                }
            }
        }

        self.consume(Type::RightParen, "expect ')' after parameters")?;
        self.consume(Type::LeftBrace, &format!("expect '{{' before {kind} body"))?;

        let was_inside_function = self.inside_function;
        self.inside_function = true;
        let statements = self.block()?;
        self.inside_function = was_inside_function;

        let body = Box::new(Stmt::Block(BlockData { statements }));

        Ok(Stmt::Function(FunctionData { name, params, body }))
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(Type::RightBrace, "expect '}' after block")?;

        Ok(statements)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if matches!(self, Type::Equal) {
            let equals = self.previous().to_owned();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(data) => Ok(Expr::Assign(AssignData { name: data.name, value: Box::new(value) })),
                Expr::Get(data) => Ok(Expr::Set(SetData { object: data.object, name: data.name, value: Box::new(value) })),
                _ => {
                    self.errors.push(ParseError { token: equals, message: "invalid assignment target".to_string() });
                    Ok(expr)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while matches!(self, Type::Or) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while matches!(self, Type::And) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while matches!(self, Type::BangEqual, Type::EqualEqual) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while matches!(self, Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    /// `+`, `-`, and the bitwise `&`/`|` operators share this precedence
    /// level.
    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while matches!(self, Type::Minus, Type::Plus, Type::Ampersand, Type::Pipe) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    /// `*`, `/`, and the bitwise `^` operator share this precedence level.
    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while matches!(self, Type::Slash, Type::Star, Type::Caret) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Type::Bang, Type::Minus, Type::Tilde) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary(UnaryData { operator, expr: Box::new(right) }));
        }

        self.call()
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    self.errors.push(ParseError {
                        token: self.peek().to_owned(),
                        message: "cannot have more than 255 arguments".to_string(),
                    });
                }

                arguments.push(self.expression()?);

                if !matches!(self, Type::Comma) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "expect ')' after arguments")?.to_owned();

        Ok(Expr::Call(CallData { callee: Box::new(callee), paren, arguments }))
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if matches!(self, Type::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if matches!(self, Type::Dot) {
                let name = self.consume(Type::Identifier, "expected property name after '.'")?.clone();
                expr = Expr::Get(GetData { object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Type::False) {
            return Ok(Expr::Literal(crate::value::Value::Bool(false)));
        }

        if matches!(self, Type::True) {
            return Ok(Expr::Literal(crate::value::Value::Bool(true)));
        }

        if matches!(self, Type::Nil) {
            return Ok(Expr::Literal(crate::value::Value::Nil));
        }

        if matches!(self, Type::Number, Type::String) {
            return Ok(Expr::Literal(
                self.previous().clone().literal.expect("number or string token to carry a literal value"),
            ));
        }

        if matches!(self, Type::Identifier) {
            return Ok(Expr::Variable(VariableData { name: self.previous().clone() }));
        }

        if matches!(self, Type::LeftParen) {
            let expr = self.expression()?;
            self.consume(Type::RightParen, "expected ')' after expression")?;
            return Ok(Expr::Grouping(GroupingData { expr: Box::new(expr) }));
        }

        Err(ParseError { token: self.peek().clone(), message: "expected expression".to_string() })
    }

    /// Discards tokens until the start of the next statement, so the
    /// parser can keep looking for further errors instead of bailing out
    /// entirely on the first one.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().r#type == Type::Semicolon {
                return;
            }

            match self.peek().r#type {
                Type::Class
                | Type::Fun
                | Type::Var
                | Type::For
                | Type::If
                | Type::While
                | Type::Print
                | Type::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> (Vec<Stmt>, Vec<ParseError>) {
        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        assert!(scan_errors.is_empty());
        Parser::new(tokens).parse()
    }

    #[test]
    fn return_outside_function_is_a_parse_error() {
        let (_, errors) = parse("return 1;");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn return_inside_function_is_fine() {
        let (_, errors) = parse("fun f() { return 1; }");
        assert!(errors.is_empty());
    }

    #[test]
    fn for_is_its_own_node_not_desugared() {
        let (statements, errors) = parse("for (var i = 0; i < 1; i = i + 1) { print i; }");
        assert!(errors.is_empty());
        assert!(matches!(statements[0], Stmt::For(_)));
    }

    #[test]
    fn for_body_must_be_a_block() {
        let (_, errors) = parse("for (var i = 0; i < 1; i = i + 1) print i;");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn for_with_neither_paren_nor_brace_reports_expected_paren() {
        let (_, errors) = parse("for ;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "expect '(' after for");
    }

    #[test]
    fn bare_for_with_no_parens_is_an_infinite_loop_head() {
        let (statements, errors) = parse("for { print 1; }");
        assert!(errors.is_empty());
        let Stmt::For(data) = &statements[0] else { panic!("expected a for statement") };
        assert!(data.initializer.is_none());
        assert!(data.condition.is_none());
        assert!(data.step.is_none());
    }

    #[test]
    fn for_with_only_a_condition_has_no_initializer_or_step() {
        let (statements, errors) = parse("for (true) { print 1; }");
        assert!(errors.is_empty());
        let Stmt::For(data) = &statements[0] else { panic!("expected a for statement") };
        assert!(data.initializer.is_none());
        assert!(data.condition.is_some());
        assert!(data.step.is_none());
    }

    #[test]
    fn if_branches_must_be_blocks() {
        let (_, errors) = parse("if (true) print 1;");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn else_if_chains_without_requiring_a_block_around_the_chained_if() {
        let (statements, errors) = parse("if (false) { print 1; } else if (true) { print 2; }");
        assert!(errors.is_empty());
        assert!(matches!(statements[0], Stmt::If(_)));
    }

    #[test]
    fn invalid_assignment_target_is_a_parse_error() {
        let (_, errors) = parse("1 = 2;");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn multiple_errors_are_collected_not_stopped_at_first() {
        let (_, errors) = parse("var ; var ;");
        assert_eq!(errors.len(), 2);
    }
}
