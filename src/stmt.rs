use std::rc::Rc;

use crate::expr::{Expr, FunctionDecl};
use crate::token::Token;

/// **Abstract‑Syntax‑Tree node** for *statements*.  A program is a sequence
/// of these nodes returned by `Parser::parse`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// `"var" IDENT ("=" initializer)? ";"`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop.  `increment` is only set for desugared `for` loops and
    /// runs after each pass through the body, including passes cut short by
    /// `continue`.
    While {
        condition: Expr,
        body: Box<Stmt>,
        increment: Option<Expr>,
    },

    Break(Token),

    Continue(Token),

    /// Named function declaration.
    Function {
        name: Token,
        decl: Rc<FunctionDecl>,
    },

    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    Class {
        name: Token,
        /// Always an `Expr::Variable` when present.
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
