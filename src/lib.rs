pub mod ast_printer;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use std::io::Write;

use log::{debug, info};

use error::{Diagnostics, Status};
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use value::Value;

/// One interpreter session: a file run or a whole prompt conversation.
///
/// Globals and resolved bindings persist between calls to [`Lox::run`], and
/// expression ids keep counting so every parsed node stays distinct.
pub struct Lox {
    interpreter: Interpreter,
    next_expr_id: usize,
    repl: bool,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    pub fn new() -> Self {
        Self::with_output(Box::new(std::io::stdout()))
    }

    /// A session whose `print` output goes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
            next_expr_id: 0,
            repl: false,
        }
    }

    /// Prompt mode: a final expression without `;` is printed.
    pub fn repl(mut self, enabled: bool) -> Self {
        self.repl = enabled;
        self
    }

    /// Scan, parse, resolve and execute `source`.  Each phase runs only if
    /// the ones before it reported no error.
    pub fn run(&mut self, source: &str, diagnostics: &mut Diagnostics) -> Status {
        info!("Running {} bytes of source", source.len());

        let tokens = scanner::scan_tokens(source, diagnostics);

        let mut parser = Parser::new(tokens)
            .with_first_id(self.next_expr_id)
            .repl(self.repl);
        let statements = parser.parse(diagnostics);
        self.next_expr_id = parser.next_expr_id();

        if diagnostics.had_error() {
            debug!("Static errors after parsing; not executing");
            return diagnostics.status();
        }

        Resolver::new(&mut self.interpreter).resolve(&statements, diagnostics);

        if diagnostics.had_error() {
            debug!("Static errors after resolving; not executing");
            return diagnostics.status();
        }

        self.interpreter.interpret(&statements, diagnostics);

        diagnostics.status()
    }

    /// Treat `source` as one expression and return its value.  `None` means
    /// an error was reported into `diagnostics`.
    pub fn evaluate(&mut self, source: &str, diagnostics: &mut Diagnostics) -> Option<Value> {
        let tokens = scanner::scan_tokens(source, diagnostics);

        let mut parser = Parser::new(tokens).with_first_id(self.next_expr_id);
        let expr = parser.parse_expression(diagnostics);
        self.next_expr_id = parser.next_expr_id();

        let expr = expr.filter(|_| !diagnostics.had_error())?;

        Resolver::new(&mut self.interpreter).resolve_expression(&expr, diagnostics);

        if diagnostics.had_error() {
            return None;
        }

        match self.interpreter.evaluate(&expr) {
            Ok(value) => Some(value),
            Err(e) => {
                diagnostics.report(e);
                None
            }
        }
    }
}
