//! Everything that can appear in callee position: native functions, user
//! functions (closures and bound methods) and classes.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::class::{Class, Instance};
use crate::environment::{Environment, SharedEnv};
use crate::error::{LoxError, Result};
use crate::expr::FunctionDecl;
use crate::interpreter::{Flow, Interpreter};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Closed set of callable runtime objects.
#[derive(Clone)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Function(Rc<Function>),
    Class(Rc<Class>),
}

impl Callable {
    /// Number of arguments a call must supply.
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.arity(),
            Callable::Class(class) => class.arity(),
        }
    }

    /// Invoke with already‑evaluated, arity‑checked arguments.
    /// `paren` is the call site's closing parenthesis, for error attribution.
    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        match self {
            Callable::Native(native) => {
                debug!("Calling native function '{}'", native.name);

                let result =
                    (native.func)(&arguments).map_err(|msg| LoxError::runtime(paren, msg))?;

                info!("Native function '{}' returned: {}", native.name, result);
                Ok(result)
            }

            Callable::Function(function) => function.call(interpreter, arguments),

            Callable::Class(class) => Class::instantiate(class, interpreter, arguments),
        }
    }

    /// Identity comparison used by `==`.
    pub fn same_as(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Class(a), Callable::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(_) => write!(f, "<native fn>"),
            Callable::Function(function) => write!(f, "{}", function),
            Callable::Class(class) => write!(f, "{}", class.name()),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({})", self)
    }
}

/// A function implemented in Rust.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value]) -> std::result::Result<Value, String>,
}

/// A user function together with the scope it closes over.
pub struct Function {
    decl: Rc<FunctionDecl>,
    closure: SharedEnv,
    is_initializer: bool,
}

impl Function {
    pub fn new(decl: Rc<FunctionDecl>, closure: SharedEnv, is_initializer: bool) -> Self {
        Self {
            decl,
            closure,
            is_initializer,
        }
    }

    pub fn arity(&self) -> usize {
        self.decl.arity()
    }

    /// A copy of this method whose closure has one extra frame binding
    /// `this` to `instance`.  The original is left untouched.
    pub fn bind(&self, instance: Rc<RefCell<Instance>>) -> Function {
        debug!("Binding '{}' to an instance", self);

        let env = Environment::with_enclosing(Rc::clone(&self.closure)).into_shared();
        env.borrow_mut().define("this", Value::Instance(instance));

        Function {
            decl: Rc::clone(&self.decl),
            closure: env,
            is_initializer: self.is_initializer,
        }
    }

    /// One fresh frame on top of the closure, parameters bound positionally,
    /// body run as a block.
    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        debug!("Calling user-defined function {}", self);

        let env = Environment::with_enclosing(Rc::clone(&self.closure)).into_shared();

        {
            let mut frame = env.borrow_mut();

            for (param, arg) in self.decl.params.iter().zip(arguments) {
                frame.define(&param.lexeme, arg);
            }
        }

        let flow: Flow = interpreter.execute_block(&self.decl.body, env)?;

        if self.is_initializer {
            // `init` always yields the instance, whatever it returned.
            let line = self.decl.name.as_ref().map(|t| t.line).unwrap_or(0);
            let this = Token::synthetic(TokenType::THIS, "this", line);

            return Environment::get_at(&self.closure, 0, &this);
        }

        let result = match flow {
            Flow::Return(value) => value,
            _ => Value::Nil,
        };

        info!("Function {} returned: {}", self, result);

        Ok(result)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decl.name() {
            Some(name) => write!(f, "<fn {}>", name),
            None => write!(f, "<fn>"),
        }
    }
}
