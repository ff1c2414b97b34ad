//! Centralised error hierarchy for the **Rox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! failure modes into one of the [`LoxError`] variants defined here. Static
//! errors (lexical, syntax, resolution) are *accumulated* in a
//! [`Diagnostics`] collector that is passed explicitly through every phase;
//! runtime errors travel as `Err` values up to `Interpreter::interpret`,
//! which reports the first one and stops.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::{debug, info};

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        line: usize,
        location: String,
    },

    /// Static‑analysis failure found by the resolver.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        location: String,
    },

    /// Runtime evaluation error, attributed to the offending token.
    #[error("[line {line}] Error{location}: {message}")]
    Runtime {
        message: String,
        line: usize,
        location: String,
    },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Render the `<location>` part of a diagnostic for `token`.
fn location(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            line: token.line,
            location: location(token),
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            line: token.line,
            location: location(token),
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
            location: location(token),
        }
    }

    /// The bare message, without the `[line N] Error…` decoration.
    pub fn message(&self) -> String {
        match self {
            LoxError::Lex { message, .. }
            | LoxError::Parse { message, .. }
            | LoxError::Resolve { message, .. }
            | LoxError::Runtime { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Is this an error raised while *executing* the program?
    pub fn is_runtime(&self) -> bool {
        matches!(self, LoxError::Runtime { .. } | LoxError::Io(_))
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

/// Outcome of one run of the pipeline over a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Everything scanned, parsed, resolved and executed.
    Clean,

    /// A lexical, syntax or resolution error stopped the run before execution.
    StaticError,

    /// Execution started and was aborted by a runtime error.
    RuntimeError,
}

/// Explicit collector for everything the pipeline wants to tell the user.
///
/// Replaces process‑wide "had error" flags: each phase receives
/// `&mut Diagnostics`, pushes what it finds and carries on.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<LoxError>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `error` and update the matching flag.
    pub fn report(&mut self, error: LoxError) {
        debug!("Diagnostic reported: {}", error);

        if error.is_runtime() {
            self.had_runtime_error = true;
        } else {
            self.had_error = true;
        }

        self.errors.push(error);
    }

    /// Did any lexical, syntax or resolution error occur?
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn errors(&self) -> &[LoxError] {
        &self.errors
    }

    /// Move the accumulated errors out, keeping the flags.
    pub fn take(&mut self) -> Vec<LoxError> {
        std::mem::take(&mut self.errors)
    }

    pub fn status(&self) -> Status {
        if self.had_error {
            Status::StaticError
        } else if self.had_runtime_error {
            Status::RuntimeError
        } else {
            Status::Clean
        }
    }

    /// Forget everything; used by the interactive prompt between lines.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.had_error = false;
        self.had_runtime_error = false;
    }
}
