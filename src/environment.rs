use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;

use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Scope frames are shared: every closure created in a scope keeps it alive
/// and observes the same mutations.
pub type SharedEnv = Rc<RefCell<Environment>>;

/// One frame of the lexical scope chain.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<SharedEnv>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: SharedEnv) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap in the shared handle used everywhere at runtime.
    pub fn into_shared(self) -> SharedEnv {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name` in this frame, replacing any previous binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup walking outwards; used for globals.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Dynamic assignment walking outwards; the name must already exist.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Walk exactly `distance` enclosing links from `env`.
    pub fn ancestor(env: &SharedEnv, distance: usize) -> Option<SharedEnv> {
        let mut current: SharedEnv = Rc::clone(env);

        for _ in 0..distance {
            let next = current.borrow().enclosing.clone()?;
            current = next;
        }

        Some(current)
    }

    /// Read a resolved local.  A missing frame or a missing name in the
    /// target frame means resolver and interpreter disagree about scope
    /// nesting; that is reported instead of reading some other slot.
    pub fn get_at(env: &SharedEnv, distance: usize, name: &Token) -> Result<Value> {
        let frame = Self::ancestor(env, distance).ok_or_else(|| unresolved(name, distance))?;
        let value = frame.borrow().values.get(&name.lexeme).cloned();

        value.ok_or_else(|| unresolved(name, distance))
    }

    pub fn assign_at(env: &SharedEnv, distance: usize, name: &Token, value: Value) -> Result<()> {
        let frame = Self::ancestor(env, distance).ok_or_else(|| unresolved(name, distance))?;
        let mut frame = frame.borrow_mut();

        match frame.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(unresolved(name, distance)),
        }
    }
}

fn unresolved(name: &Token, distance: usize) -> LoxError {
    debug!(
        "Scope mismatch: '{}' not found {} frame(s) out",
        name.lexeme, distance
    );

    LoxError::runtime(
        name,
        format!(
            "Unresolved binding for '{}' at scope distance {}.",
            name.lexeme, distance
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, 1)
    }

    #[test]
    fn get_walks_enclosing_frames() {
        let globals = Environment::new().into_shared();
        globals.borrow_mut().define("a", Value::Number(1.0));

        let inner = Environment::with_enclosing(globals.clone()).into_shared();

        let value = inner.borrow().get(&ident("a")).unwrap();
        assert_eq!(value, Value::Number(1.0));
    }

    #[test]
    fn assign_updates_the_defining_frame() {
        let globals = Environment::new().into_shared();
        globals.borrow_mut().define("a", Value::Nil);

        let inner = Environment::with_enclosing(globals.clone()).into_shared();
        inner
            .borrow_mut()
            .assign(&ident("a"), Value::Bool(true))
            .unwrap();

        assert_eq!(globals.borrow().get(&ident("a")).unwrap(), Value::Bool(true));
    }

    #[test]
    fn assign_to_undefined_is_an_error() {
        let globals = Environment::new().into_shared();
        let err = globals
            .borrow_mut()
            .assign(&ident("nope"), Value::Nil)
            .unwrap_err();

        assert_eq!(err.message(), "Undefined variable 'nope'.");
    }

    #[test]
    fn get_at_reads_exact_frame_only() {
        let outer = Environment::new().into_shared();
        outer.borrow_mut().define("x", Value::Number(1.0));
        let inner = Environment::with_enclosing(outer.clone()).into_shared();
        inner.borrow_mut().define("x", Value::Number(2.0));

        assert_eq!(
            Environment::get_at(&inner, 0, &ident("x")).unwrap(),
            Value::Number(2.0)
        );
        assert_eq!(
            Environment::get_at(&inner, 1, &ident("x")).unwrap(),
            Value::Number(1.0)
        );
    }

    #[test]
    fn get_at_fails_loudly_on_scope_mismatch() {
        let outer = Environment::new().into_shared();
        outer.borrow_mut().define("x", Value::Number(1.0));
        let inner = Environment::with_enclosing(outer).into_shared();

        // Name lives one frame out, not zero.
        assert!(Environment::get_at(&inner, 0, &ident("x")).is_err());
        // Chain is only two frames deep.
        assert!(Environment::get_at(&inner, 5, &ident("x")).is_err());
    }
}
