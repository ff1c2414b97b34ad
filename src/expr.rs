use std::rc::Rc;

use crate::stmt::Stmt;
use crate::token::Token;

/// Identity of an expression node that the resolver annotates.
///
/// Ids are handed out by the parser and keep counting across parser
/// instances of one session, so resolved distances recorded for an earlier
/// line can never be confused with a node parsed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub usize);

/// A **literal constant** that appears directly in the source code.
///
/// The parser copies the value out of the token so the AST does not depend
/// on the token buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// Parameters and body shared by function declarations, methods and
/// function expressions.  Runtime functions hold it through an `Rc`, so
/// creating a closure never copies the body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// `None` for anonymous function expressions.
    pub name: Option<Token>,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

impl FunctionDecl {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(|t| t.lexeme.as_str())
    }
}

/// **Abstract‑Syntax‑Tree node** representing every kind of *expression*.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix unary operator expression (`!ready`, `-42`).
    Unary { operator: Token, right: Box<Expr> },

    /// Infix binary operator expression, including the `,` sequencing operator.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// `condition ? then_branch : else_branch`
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Assignment to a variable: `name = value`.
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// Function‑ or method‑call expression.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// object.property
    Get { object: Box<Expr>, name: Token },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `this` keyword inside a method.
    This { id: ExprId, keyword: Token },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },

    /// `fun (params) { body }` used as a value.
    Function { decl: Rc<FunctionDecl> },
}
