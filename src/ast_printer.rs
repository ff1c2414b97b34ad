use crate::expr::{Expr, FunctionDecl, LiteralValue};
use crate::stmt::Stmt;

/// Renders syntax trees in parenthesised prefix form, e.g. `(+ 1.0 (group 2.0))`.
///
/// Used by the `parse` command and by tests that check precedence and
/// desugaring.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            Expr::Literal(lit) => Self::literal(lit),

            Expr::Grouping(inner) => Self::parenthesize("group", &[&**inner]),

            Expr::Unary { operator, right } => Self::parenthesize(&operator.lexeme, &[&**right]),

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => Self::parenthesize(&operator.lexeme, &[&**left, &**right]),

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => Self::parenthesize("?:", &[&**condition, &**then_branch, &**else_branch]),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::Get { object, name } => format!("(. {} {})", Self::print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(= (. {} {}) {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),

            Expr::This { .. } => "this".into(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),

            Expr::Function { decl } => Self::function("fun", decl),
        }
    }

    /// Statements get the same treatment; blocks and bodies print their
    /// children separated by spaces.
    pub fn print_stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", Self::print(expr)),

            Stmt::Print(expr) => format!("(print {})", Self::print(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("(var {} {})", name.lexeme, Self::print(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => format!("(block{})", Self::stmts(statements)),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch),
                    Self::print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch)
                ),
            },

            Stmt::While {
                condition,
                body,
                increment,
            } => match increment {
                Some(increment) => format!(
                    "(while {} {} {})",
                    Self::print(condition),
                    Self::print_stmt(body),
                    Self::print(increment)
                ),
                None => format!(
                    "(while {} {})",
                    Self::print(condition),
                    Self::print_stmt(body)
                ),
            },

            Stmt::Break(_) => "(break)".into(),

            Stmt::Continue(_) => "(continue)".into(),

            Stmt::Function { decl, .. } => Self::function("fun", decl),

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("(return {})", Self::print(value)),
                None => "(return)".into(),
            },

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let mut s = format!("(class {}", name.lexeme);
                if let Some(superclass) = superclass {
                    s.push_str(" < ");
                    s.push_str(&Self::print(superclass));
                }
                for method in methods {
                    s.push(' ');
                    s.push_str(&Self::function("method", method));
                }
                s.push(')');
                s
            }
        }
    }

    fn literal(lit: &LiteralValue) -> String {
        match lit {
            LiteralValue::True => "true".into(),

            LiteralValue::False => "false".into(),

            LiteralValue::Nil => "nil".into(),

            LiteralValue::Str(s) => s.clone(),

            // 3.0 → "3.0", 3.25 → "3.25"
            LiteralValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{:.1}", n)
                } else {
                    n.to_string()
                }
            }
        }
    }

    fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
        let mut s = format!("({}", name);
        for expr in exprs {
            s.push(' ');
            s.push_str(&Self::print(expr));
        }
        s.push(')');
        s
    }

    fn function(kind: &str, decl: &FunctionDecl) -> String {
        let params: Vec<&str> = decl.params.iter().map(|p| p.lexeme.as_str()).collect();

        format!(
            "({} {}({}){})",
            kind,
            decl.name().unwrap_or(""),
            params.join(" "),
            Self::stmts(&decl.body)
        )
    }

    fn stmts(statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|s| format!(" {}", Self::print_stmt(s)))
            .collect()
    }
}
