//! A debug pretty-printer for the AST, in the style of `craftinginterpreters`'
//! parenthesized-prefix dump. Not used by the interpreter itself — handy
//! when working on the parser.

use crate::expr::Expr;
use crate::stmt::Stmt;

macro_rules! parenthesize {
    ( $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &print_expr($x);
            )*
            string += ")";
            string
        }
    };
}

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(value) => value.to_string(),
        Expr::Unary(data) => parenthesize!(&data.operator.lexeme, &data.expr),
        Expr::Binary(data) => parenthesize!(&data.operator.lexeme, &data.left, &data.right),
        Expr::Logical(data) => parenthesize!(&data.operator.lexeme, &data.left, &data.right),
        Expr::Grouping(data) => parenthesize!("group", &data.expr),
        Expr::Variable(data) => data.name.lexeme.clone(),
        Expr::Assign(data) => parenthesize!(&format!("= {}", data.name.lexeme), &data.value),
        Expr::Get(data) => parenthesize!(&format!(". {}", data.name.lexeme), &data.object),
        Expr::Set(data) => {
            format!("(= (. {} {}) {})", print_expr(&data.object), data.name.lexeme, print_expr(&data.value))
        }
        Expr::Call(data) => {
            let mut string = print_expr(&data.callee);
            string += "(";
            string += &data.arguments.iter().map(print_expr).collect::<Vec<_>>().join(" ");
            string += ")";
            string
        }
    }
}

pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expression(data) => parenthesize!("expr", &data.expr),
        Stmt::Print(data) => parenthesize!("print", &data.expr),
        Stmt::Var(data) => match &data.initializer {
            Some(initializer) => format!("(var {} = {})", data.name.lexeme, print_expr(initializer)),
            None => format!("(var {})", data.name.lexeme),
        },
        Stmt::Block(data) => {
            let mut string = String::from("{");
            for stmt in &data.statements {
                string += " ";
                string += &print_stmt(stmt);
            }
            string += " }";
            string
        }
        Stmt::If(data) => {
            let mut string = format!("(if {} {}", print_expr(&data.condition), print_stmt(&data.then_branch));
            if let Some(else_branch) = &data.else_branch {
                string += &format!(" else {}", print_stmt(else_branch));
            }
            string += ")";
            string
        }
        Stmt::For(data) => {
            let init = data.initializer.as_deref().map(print_stmt).unwrap_or_default();
            let cond = data.condition.as_ref().map(print_expr).unwrap_or_default();
            let step = data.step.as_ref().map(print_expr).unwrap_or_default();
            format!("(for ({init} {cond} {step}) {})", print_stmt(&data.body))
        }
        Stmt::Function(data) => {
            let params = data.params.iter().map(|p| p.lexeme.clone()).collect::<Vec<_>>().join(" ");
            format!("(fun {}({params}) {})", data.name.lexeme, print_stmt(&data.body))
        }
        Stmt::Return(data) => match &data.value {
            Some(value) => parenthesize!("return", value),
            None => "(return)".to_string(),
        },
        Stmt::Class(data) => {
            let methods = data.methods.iter().map(print_stmt).collect::<Vec<_>>().join(" ");
            format!("(class {} {methods})", data.name.lexeme)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    #[test]
    fn prints_a_binary_expression() {
        let (tokens, _) = Scanner::new("1 + 2;").scan_tokens();
        let (statements, _) = Parser::new(tokens).parse();
        assert_eq!(print_stmt(&statements[0]), "(expr (+ 1 2))");
    }
}
