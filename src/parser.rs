/*!
Recursive‑descent parser for Rox.

### Error recovery

Fatal syntax errors unwind (via `?`) to [`Parser::declaration`], which
records them and calls `synchronize()` so later statements are still
parsed. A few errors are *non‑fatal* (invalid assignment target, more
than 255 parameters/arguments): they are recorded and parsing carries on
in place.

### Grammar

```text
program        → declaration* EOF ;
declaration    → classDecl | funDecl | varDecl | statement ;
classDecl      → "class" IDENT ( "<" IDENT )? "{" function* "}" ;
funDecl        → "fun" function ;
function       → IDENT "(" parameters? ")" block ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → exprStmt | printStmt | whileStmt | forStmt | ifStmt
               | block | returnStmt | breakStmt | continueStmt ;
exprStmt       → comma ";" ;
returnStmt     → "return" comma? ";" ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" )
                 expression? ";" expression? ")" statement ;
block          → "{" declaration* "}" ;
comma          → expression ( "," expression )* ;
expression     → assignment ;
assignment     → ( call "." )? IDENT "=" assignment | ternary ;
ternary        → logic_or ( "?" expression ":" ternary )? ;
logic_or       → logic_and ( "or" logic_and )* ;
logic_and      → equality  ( "and" equality )* ;
equality       → comparison ( ( "!=" | "==" ) comparison )* ;
comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → unary ( ( "/" | "*" ) unary )* ;
unary          → ( "!" | "-" ) unary | call ;
call           → primary ( "(" arguments? ")" | "." IDENT )* ;
primary        → NUMBER | STRING | "true" | "false" | "nil" | "this"
               | IDENT | "(" expression ")" | "super" "." IDENT
               | "fun" IDENT? "(" parameters? ")" block ;
```
*/

use std::rc::Rc;

use crate::error::{Diagnostics, LoxError, Result};
use crate::expr::{Expr, ExprId, FunctionDecl, LiteralValue};
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};

use log::{debug, info};

/// Upper bound on declared parameters and call arguments.
pub const MAX_ARITY: usize = 255;

/// Top‑level parser over a scanned token vector.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: usize,
    repl: bool,
    errors: Vec<LoxError>,
}

impl Parser {
    /// Construct a new parser.  A missing trailing `EOF` is supplied.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        if tokens.last().map(|t| t.token_type != TokenType::EOF).unwrap_or(true) {
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token::new(TokenType::EOF, "", line));
        }

        Self {
            tokens,
            current: 0,
            next_id: 0,
            repl: false,
            errors: Vec::new(),
        }
    }

    /// Start numbering expression ids at `first` (continuing a session).
    pub fn with_first_id(mut self, first: usize) -> Self {
        self.next_id = first;
        self
    }

    /// In REPL mode a trailing expression without `;` is printed.
    pub fn repl(mut self, enabled: bool) -> Self {
        self.repl = enabled;
        self
    }

    /// The id the next parsed node would receive.
    pub fn next_expr_id(&self) -> usize {
        self.next_id
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program and return its statement list.
    ///
    /// Syntax errors are reported into `diagnostics`; statements that
    /// failed to parse are left out of the result.
    pub fn parse(&mut self, diagnostics: &mut Diagnostics) -> Vec<Stmt> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.flush_errors(diagnostics);

        info!("Parsed {} statements", statements.len());

        statements
    }

    /// Parse the whole input as a single expression.
    pub fn parse_expression(&mut self, diagnostics: &mut Diagnostics) -> Option<Expr> {
        info!("Parsing a single expression");

        let result = self.comma().and_then(|expr| {
            if self.is_at_end() {
                Ok(expr)
            } else {
                Err(LoxError::parse(self.peek(), "Expected end of expression"))
            }
        });

        let expr = match result {
            Ok(expr) => Some(expr),
            Err(e) => {
                self.errors.push(e);
                None
            }
        };

        self.flush_errors(diagnostics);

        expr
    }

    fn flush_errors(&mut self, diagnostics: &mut Diagnostics) {
        for e in self.errors.drain(..) {
            diagnostics.report(e);
        }
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> Option<Stmt> {
        debug!("Entering declaration");

        let result = if self.matches(TokenType::CLASS) {
            self.class_declaration()
        } else if self.check(TokenType::FUN) && self.check_next(TokenType::IDENTIFIER) {
            self.advance();
            self.function("function")
                .map(|(name, decl)| Stmt::Function { name, decl })
        } else if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                debug!("Parse error, synchronizing: {}", e);
                self.errors.push(e);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expected class name")?;

        let superclass: Option<Expr> = if self.matches(TokenType::LESS) {
            let super_name = self.consume(TokenType::IDENTIFIER, "Expected superclass name")?;

            Some(Expr::Variable {
                id: self.fresh_id(),
                name: super_name,
            })
        } else {
            None
        };

        self.consume(TokenType::LEFT_BRACE, "Expected '{' before class body")?;

        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            let (_, decl) = self.function("method")?;
            methods.push(decl);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after class body")?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
        })
    }

    /// `IDENT "(" parameters? ")" block`; the `fun` keyword is already consumed
    /// (or absent, for methods).
    fn function(&mut self, kind: &str) -> Result<(Token, Rc<FunctionDecl>)> {
        let name: Token = self.consume(TokenType::IDENTIFIER, &format!("Expected {} name", kind))?;

        self.consume(
            TokenType::LEFT_PAREN,
            &format!("Expected '(' after {} name", kind),
        )?;

        let params: Vec<Token> = self.parameters()?;

        self.consume(
            TokenType::LEFT_BRACE,
            &format!("Expected '{{' before {} body", kind),
        )?;
        let body: Vec<Stmt> = self.block()?;

        let decl = Rc::new(FunctionDecl {
            name: Some(name.clone()),
            params,
            body,
        });

        Ok((name, decl))
    }

    /// Parameter list up to and including the closing `)`.
    fn parameters(&mut self) -> Result<Vec<Token>> {
        let mut params: Vec<Token> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARITY {
                    let err = LoxError::parse(self.peek(), "Can't have more than 255 parameters");
                    self.errors.push(err);
                }

                params.push(self.consume(TokenType::IDENTIFIER, "Expected parameter name")?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after parameters")?;

        Ok(params)
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expected variable name")?;

        let initializer: Option<Expr> = if self.matches(TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expected ';' after variable declaration",
        )?;
        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt> {
        debug!("Entering statement at {:?}", self.peek().token_type);

        if self.matches(TokenType::BREAK) {
            let keyword = self.previous().clone();
            self.consume(TokenType::SEMICOLON, "Expected ';' after 'break'")?;
            Ok(Stmt::Break(keyword))
        } else if self.matches(TokenType::CONTINUE) {
            let keyword = self.previous().clone();
            self.consume(TokenType::SEMICOLON, "Expected ';' after 'continue'")?;
            Ok(Stmt::Continue(keyword))
        } else if self.matches(TokenType::FOR) {
            self.for_statement()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::PRINT) {
            self.print_statement()
        } else if self.matches(TokenType::RETURN) {
            self.return_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::LEFT_BRACE) {
            Ok(Stmt::Block(self.block()?))
        } else {
            self.expression_statement()
        }
    }

    /// `for (init; cond; incr) body` becomes
    /// `{ init; while (cond) body /* then incr */ }`.
    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'for'")?;

        let initializer: Option<Stmt> = if self.matches(TokenType::SEMICOLON) {
            None
        } else if self.matches(TokenType::VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition: Expr = if !self.check(TokenType::SEMICOLON) {
            self.expression()?
        } else {
            Expr::Literal(LiteralValue::True)
        };
        self.consume(TokenType::SEMICOLON, "Expected ';' after loop condition")?;

        let increment: Option<Expr> = if !self.check(TokenType::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after for clauses")?;

        let body: Box<Stmt> = Box::new(self.statement()?);

        let looped = Stmt::While {
            condition,
            body,
            increment,
        };

        Ok(match initializer {
            Some(init) => Stmt::Block(vec![init, looped]),
            None => looped,
        })
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'if'")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after if condition")?;

        let then_branch: Box<Stmt> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let value: Expr = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expected ';' after value")?;

        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword: Token = self.previous().clone();
        let value: Option<Expr> = if !self.check(TokenType::SEMICOLON) {
            Some(self.comma()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after return value")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'while'")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition")?;
        let body: Box<Stmt> = Box::new(self.statement()?);

        Ok(Stmt::While {
            condition,
            body,
            increment: None,
        })
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr: Expr = self.comma()?;

        if self.repl && self.is_at_end() {
            debug!("REPL mode: echoing trailing expression");
            return Ok(Stmt::Print(expr));
        }

        self.consume(TokenType::SEMICOLON, "Expected ';' after expression")?;
        Ok(Stmt::Expression(expr))
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after block")?;
        Ok(statements)
    }

    // ─────────────────────── expression rules ─────────────

    fn comma(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.expression()?;

        while self.matches(TokenType::COMMA) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.expression()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr: Expr = self.ternary()?;

        if self.matches(TokenType::EQUAL) {
            let equals: Token = self.previous().clone();
            let value: Expr = self.assignment()?;

            return Ok(match expr {
                Expr::Variable { id, name } => Expr::Assign {
                    id,
                    name,
                    value: Box::new(value),
                },

                Expr::Get { object, name } => Expr::Set {
                    object,
                    name,
                    value: Box::new(value),
                },

                other => {
                    // Non‑fatal: report and keep the left‑hand side.
                    self.errors
                        .push(LoxError::parse(&equals, "Invalid assignment target"));
                    other
                }
            });
        }

        Ok(expr)
    }

    fn ternary(&mut self) -> Result<Expr> {
        let expr: Expr = self.logical_or()?;

        if self.matches(TokenType::QUESTION) {
            let then_branch: Expr = self.expression()?;

            self.consume(
                TokenType::COLON,
                "Expected ':' after then branch of conditional expression",
            )?;

            let else_branch: Expr = self.ternary()?;

            return Ok(Expr::Ternary {
                condition: Box::new(expr),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> Result<Expr> {
        self.left_assoc(&[TokenType::OR], Self::logical_and, true)
    }

    fn logical_and(&mut self) -> Result<Expr> {
        self.left_assoc(&[TokenType::AND], Self::equality, true)
    }

    fn equality(&mut self) -> Result<Expr> {
        self.left_assoc(
            &[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL],
            Self::comparison,
            false,
        )
    }

    fn comparison(&mut self) -> Result<Expr> {
        self.left_assoc(
            &[
                TokenType::GREATER,
                TokenType::GREATER_EQUAL,
                TokenType::LESS,
                TokenType::LESS_EQUAL,
            ],
            Self::term,
            false,
        )
    }

    fn term(&mut self) -> Result<Expr> {
        self.left_assoc(&[TokenType::MINUS, TokenType::PLUS], Self::factor, false)
    }

    fn factor(&mut self) -> Result<Expr> {
        self.left_assoc(&[TokenType::STAR, TokenType::SLASH], Self::unary, false)
    }

    /// `operand ( op operand )*` folded to the left.  `logical` selects
    /// `Expr::Logical` (short-circuiting) over `Expr::Binary`.
    fn left_assoc(
        &mut self,
        operators: &[TokenType],
        operand: fn(&mut Self) -> Result<Expr>,
        logical: bool,
    ) -> Result<Expr> {
        let mut expr: Expr = operand(self)?;

        while operators.iter().any(|op| self.check(op.clone())) {
            let operator: Token = self.advance().clone();
            let left = Box::new(expr);
            let right = Box::new(operand(self)?);

            expr = if logical {
                Expr::Logical {
                    left,
                    operator,
                    right,
                }
            } else {
                Expr::Binary {
                    left,
                    operator,
                    right,
                }
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.matches(TokenType::BANG) || self.matches(TokenType::MINUS) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    fn call(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.primary()?;

        loop {
            if self.matches(TokenType::LEFT_PAREN) {
                expr = self.finish_call(expr)?;
            } else if self.matches(TokenType::DOT) {
                let name: Token =
                    self.consume(TokenType::IDENTIFIER, "Expected property name after '.'")?;

                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    let err = LoxError::parse(self.peek(), "Can't have more than 255 arguments");
                    self.errors.push(err);
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren: Token = self.consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        let literal: Option<LiteralValue> = match &self.peek().token_type {
            TokenType::FALSE => Some(LiteralValue::False),
            TokenType::TRUE => Some(LiteralValue::True),
            TokenType::NIL => Some(LiteralValue::Nil),
            TokenType::NUMBER(n) => Some(LiteralValue::Number(*n)),
            TokenType::STRING(s) => Some(LiteralValue::Str(s.clone())),
            _ => None,
        };

        if let Some(literal) = literal {
            self.advance();
            return Ok(Expr::Literal(literal));
        }

        if self.matches(TokenType::THIS) {
            return Ok(Expr::This {
                id: self.fresh_id(),
                keyword: self.previous().clone(),
            });
        }

        if self.matches(TokenType::SUPER) {
            let keyword: Token = self.previous().clone();
            self.consume(TokenType::DOT, "Expected '.' after 'super'")?;
            let method: Token =
                self.consume(TokenType::IDENTIFIER, "Expected superclass method name")?;

            return Ok(Expr::Super {
                id: self.fresh_id(),
                keyword,
                method,
            });
        }

        if self.matches(TokenType::IDENTIFIER) {
            return Ok(Expr::Variable {
                id: self.fresh_id(),
                name: self.previous().clone(),
            });
        }

        if self.matches(TokenType::FUN) {
            return self.function_expression();
        }

        if self.matches(TokenType::LEFT_PAREN) {
            let expr: Expr = self.expression()?;

            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression")?;

            return Ok(Expr::Grouping(Box::new(expr)));
        }

        debug!("No expression at {:?}", self.peek().token_type);

        Err(LoxError::parse(self.peek(), "Expected expression"))
    }

    /// `"fun" IDENT? "(" parameters? ")" block`; `fun` already consumed.
    fn function_expression(&mut self) -> Result<Expr> {
        let name: Option<Token> = if self.check(TokenType::IDENTIFIER) {
            Some(self.advance().clone())
        } else {
            None
        };

        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'fun'")?;
        let params: Vec<Token> = self.parameters()?;

        self.consume(TokenType::LEFT_BRACE, "Expected '{' before function body")?;
        let body: Vec<Stmt> = self.block()?;

        Ok(Expr::Function {
            decl: Rc::new(FunctionDecl { name, params, body }),
        })
    }

    // ────────────────────── utility helpers ───────────────────────

    fn fresh_id(&mut self) -> ExprId {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        id
    }

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<Token> {
        if self.check(ttype) {
            return Ok(self.advance().clone());
        }

        debug!("consume failed at {:?}: {}", self.peek().token_type, message);

        Err(LoxError::parse(self.peek(), message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    /// Look one token past the current one.
    fn check_next(&self, ttype: TokenType) -> bool {
        self.tokens
            .get(self.current + 1)
            .map(|t| t.token_type == ttype)
            .unwrap_or(false)
    }

    #[inline(always)]
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Discards tokens until it thinks it is at a statement boundary.
    fn synchronize(&mut self) {
        self.advance(); // skip the token that caused the error

        while !self.is_at_end() {
            if matches!(self.previous().token_type, TokenType::SEMICOLON) {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN => return,
                _ => {}
            }

            self.advance();
        }
    }
}
