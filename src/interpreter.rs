//! Tree‑walking evaluator.
//!
//! Statement execution returns a [`Flow`] describing how the statement
//! completed; `return`, `break` and `continue` travel outwards as values
//! until the call boundary or loop that consumes them. Runtime errors
//! travel as `Err(LoxError::Runtime { .. })` up to [`Interpreter::interpret`].

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::callable::{Callable, Function, NativeFunction};
use crate::class::{Class, Instance};
use crate::environment::{Environment, SharedEnv};
use crate::error::{Diagnostics, LoxError, Result};
use crate::expr::{Expr, ExprId, FunctionDecl, LiteralValue};
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Deepest chain of nested Lox calls before the run is aborted with
/// "Stack overflow.".
pub const MAX_CALL_DEPTH: usize = 4096;

/// If less than this much native stack is left when a call starts, a new
/// segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each extra stack segment.
const STACK_SEGMENT: usize = 1024 * 1024;

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Fell off the end; continue with the next statement.
    Normal,

    /// A `return` is unwinding to the nearest call boundary.
    Return(Value),

    /// A `break` is unwinding to the nearest loop.
    Break,

    /// A `continue` is unwinding to the nearest loop.
    Continue,
}

pub struct Interpreter {
    globals: SharedEnv,
    environment: SharedEnv,
    locals: HashMap<ExprId, usize>,
    /// Lox calls currently in progress.
    call_depth: usize,
    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates a new Interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Creates a new Interpreter whose `print` statements write to `out`.
    /// Native functions such as `clock` are defined in the globals.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals: SharedEnv = Environment::new().into_shared();

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::Callable(Callable::Native(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: |_args: &[Value]| {
                    let micros = chrono::Utc::now().timestamp_micros();
                    Ok(Value::Number(micros as f64 / 1_000_000.0))
                },
            }))),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            call_depth: 0,
            out,
        }
    }

    /// Record that the node `id` refers to a binding `depth` frames out.
    /// Called by the resolver.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        debug!("Noting local {:?} at depth {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Executes a program.  The first runtime error is reported into
    /// `diagnostics` and stops the remaining top‑level statements.
    pub fn interpret(&mut self, statements: &[Stmt], diagnostics: &mut Diagnostics) {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}

                Ok(flow) => {
                    // The resolver rejects these; nothing above top level can consume them.
                    debug!("Ignoring stray {:?} at top level", flow);
                }

                Err(e) => {
                    debug!("Runtime error, aborting: {}", e);

                    diagnostics.report(e);
                    return;
                }
            }
        }

        if let Err(e) = self.out.flush() {
            diagnostics.report(e.into());
            return;
        }

        info!("Interpretation completed successfully");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let env = Environment::with_enclosing(Rc::clone(&self.environment)).into_shared();
                self.execute_block(statements, env)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While {
                condition,
                body,
                increment,
            } => {
                debug!("Entering while loop");

                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }

                    if let Some(increment) = increment {
                        self.evaluate(increment)?;
                    }
                }

                debug!("Exited while loop");
                Ok(Flow::Normal)
            }

            Stmt::Break(_) => Ok(Flow::Break),

            Stmt::Continue(_) => Ok(Flow::Continue),

            Stmt::Function { name, decl } => {
                debug!("Defining function '{}'", name.lexeme);

                let function = Function::new(Rc::clone(decl), Rc::clone(&self.environment), false);

                self.environment.borrow_mut().define(
                    &name.lexeme,
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                self.execute_class(name, superclass.as_ref(), methods)?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Run `statements` with `env` as the current scope, restoring the
    /// previous scope however the block completes.
    pub fn execute_block(&mut self, statements: &[Stmt], env: SharedEnv) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.environment, env);

        let result = self.execute_all(statements);

        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }

        Ok(Flow::Normal)
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<()> {
        debug!("Defining class '{}'", name.lexeme);

        let superclass: Option<Rc<Class>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Callable(Callable::Class(class)) => Some(class),
                _ => {
                    let token = match expr {
                        Expr::Variable { name, .. } => name,
                        _ => name,
                    };
                    return Err(LoxError::runtime(token, "Superclass must be a class."));
                }
            },
            None => None,
        };

        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        // Methods of a subclass close over one extra frame holding `super`.
        let method_env: SharedEnv = match &superclass {
            Some(superclass) => {
                let env = Environment::with_enclosing(Rc::clone(&self.environment)).into_shared();
                env.borrow_mut().define(
                    "super",
                    Value::Callable(Callable::Class(Rc::clone(superclass))),
                );
                env
            }
            None => Rc::clone(&self.environment),
        };

        let table: HashMap<String, Rc<Function>> = methods
            .iter()
            .filter_map(|decl| {
                let method_name = decl.name()?.to_string();
                let is_initializer = method_name == "init";
                let function = Function::new(Rc::clone(decl), Rc::clone(&method_env), is_initializer);
                Some((method_name, Rc::new(function)))
            })
            .collect();

        let class = Class::new(name.lexeme.clone(), superclass, table);

        self.environment
            .borrow_mut()
            .assign(name, Value::Callable(Callable::Class(Rc::new(class))))?;

        info!("Class '{}' defined", name.lexeme);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_val = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left_val.is_truthy()
                } else {
                    !left_val.is_truthy()
                };

                if short_circuit {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_val = self.evaluate(callee)?;

                let mut arg_values: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    arg_values.push(self.evaluate(arg)?);
                }

                let callable = match callee_val {
                    Value::Callable(callable) => callable,
                    other => {
                        debug!("Attempted to call a {}", other.type_name());
                        return Err(LoxError::runtime(
                            paren,
                            "Can only call functions and classes.",
                        ));
                    }
                };

                if arg_values.len() != callable.arity() {
                    return Err(LoxError::runtime(
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            callable.arity(),
                            arg_values.len()
                        ),
                    ));
                }

                if self.call_depth >= MAX_CALL_DEPTH {
                    debug!("Call depth limit {} reached", MAX_CALL_DEPTH);
                    return Err(LoxError::runtime(paren, "Stack overflow."));
                }

                self.call_depth += 1;
                let result = stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || {
                    callable.call(self, arg_values, paren)
                });
                self.call_depth -= 1;

                result
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => Instance::get(&instance, name),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name, "Only instances have fields."));
                };

                let value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),

            Expr::Function { decl } => {
                let function = match &decl.name {
                    // A named function expression sees itself through a
                    // private frame.
                    Some(name) => {
                        let env =
                            Environment::with_enclosing(Rc::clone(&self.environment)).into_shared();
                        let function =
                            Rc::new(Function::new(Rc::clone(decl), Rc::clone(&env), false));

                        env.borrow_mut().define(
                            &name.lexeme,
                            Value::Callable(Callable::Function(Rc::clone(&function))),
                        );
                        function
                    }
                    None => Rc::new(Function::new(
                        Rc::clone(decl),
                        Rc::clone(&self.environment),
                        false,
                    )),
                };

                Ok(Value::Callable(Callable::Function(function)))
            }
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right_val = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right_val {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
            },

            TokenType::BANG => Ok(Value::Bool(!right_val.is_truthy())),

            _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;

        debug!(
            "Binary {}: {} {}",
            operator.lexeme, left_val, right_val
        );

        match operator.token_type {
            TokenType::COMMA => Ok(right_val),

            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), b) => Ok(Value::String(format!("{}{}", a, b))),
                (a, Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
                _ => Err(LoxError::runtime(
                    operator,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::SLASH => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;

                if b == 0.0 {
                    return Err(LoxError::runtime(operator, "Attempted to divide by zero."));
                }

                Ok(Value::Number(a / b))
            }

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Number(a * b))
            }

            TokenType::GREATER => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, &left_val, &right_val)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
        }
    }

    /// `super.method`: find `method` above the class that defined the
    /// running method and bind it to the current `this`.
    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value> {
        let distance = *self.locals.get(&id).ok_or_else(|| {
            LoxError::runtime(keyword, "Unresolved 'super' expression.")
        })?;

        let superclass = match Environment::get_at(&self.environment, distance, keyword)? {
            Value::Callable(Callable::Class(class)) => class,
            _ => return Err(LoxError::runtime(keyword, "Superclass must be a class.")),
        };

        // `this` always sits one frame inside the `super` frame.
        let this_token = Token::synthetic(TokenType::THIS, "this", keyword.line);
        let instance = match Environment::get_at(&self.environment, distance.saturating_sub(1), &this_token)? {
            Value::Instance(instance) => instance,
            _ => return Err(LoxError::runtime(keyword, "'super' used without an instance.")),
        };

        let found = superclass.find_method(&method.lexeme).ok_or_else(|| {
            LoxError::runtime(method, format!("Undefined property '{}'.", method.lexeme))
        })?;

        Ok(Value::Callable(Callable::Function(Rc::new(
            found.bind(instance),
        ))))
    }

    /// Locals are read at their resolved distance; anything the resolver
    /// left unbound is a global, looked up by name at the time of use.
    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
    }
}
