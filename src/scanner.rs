//! Streaming lexer.
//!
//! [`Scanner`] walks the source byte by byte and yields one
//! `Result<Token>` per lexeme, finishing with a single `EOF` token.  A bad
//! character or an unterminated string produces an `Err` item and scanning
//! carries on, so one pass surfaces every lexical error in the input.
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! for result in Scanner::new("print 123; // example") {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use crate::error::{Diagnostics, LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

/// Reserved words, looked up once an identifier has been consumed.
static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"      => TokenType::AND,
    b"break"    => TokenType::BREAK,
    b"class"    => TokenType::CLASS,
    b"continue" => TokenType::CONTINUE,
    b"else"     => TokenType::ELSE,
    b"false"    => TokenType::FALSE,
    b"for"      => TokenType::FOR,
    b"fun"      => TokenType::FUN,
    b"if"       => TokenType::IF,
    b"nil"      => TokenType::NIL,
    b"or"       => TokenType::OR,
    b"print"    => TokenType::PRINT,
    b"return"   => TokenType::RETURN,
    b"super"    => TokenType::SUPER,
    b"this"     => TokenType::THIS,
    b"true"     => TokenType::TRUE,
    b"var"      => TokenType::VAR,
    b"while"    => TokenType::WHILE,
};

pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// Next byte to look at.
    pos: usize,
    line: usize,
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            pos: 0,
            line: 1,
            done: false,
        }
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Current byte, or `0` past the end.
    #[inline]
    fn current(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    #[inline]
    fn lookahead(&self) -> u8 {
        self.bytes.get(self.pos + 1).copied().unwrap_or(0)
    }

    #[inline]
    fn bump(&mut self) -> u8 {
        let b = self.current();
        self.pos += 1;
        b
    }

    /// Pick `long` if the next byte is `second` (consuming it), else `short`.
    #[inline]
    fn pair(&mut self, second: u8, long: TokenType, short: TokenType) -> TokenType {
        if !self.at_end() && self.current() == second {
            self.pos += 1;
            long
        } else {
            short
        }
    }

    /// Consume one lexeme starting at `self.start`.  `Ok(None)` means it was
    /// whitespace or a comment and produced no token.
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let kind = match self.bump() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,
            b'?' => TokenType::QUESTION,
            b':' => TokenType::COLON,

            b'!' => self.pair(b'=', TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.pair(b'=', TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.pair(b'=', TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.pair(b'=', TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'/' if self.current() == b'/' => {
                // Leave the newline itself for the line counter.
                self.pos = match memchr(b'\n', &self.bytes[self.pos..]) {
                    Some(offset) => self.pos + offset,
                    None => self.bytes.len(),
                };
                return Ok(None);
            }
            b'/' => TokenType::SLASH,

            b' ' | b'\r' | b'\t' => return Ok(None),

            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                // Step over the whole code point, not just its first byte.
                let ch = self.src[self.start..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                self.pos = self.start + ch.len_utf8();

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", ch),
                ));
            }
        };

        Ok(Some(kind))
    }

    /// Body of a string literal; the opening quote is already consumed.
    /// Strings may span lines.
    fn string(&mut self) -> Result<TokenType> {
        while !self.at_end() && self.current() != b'"' {
            if self.bump() == b'\n' {
                self.line += 1;
            }
        }

        if self.at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.pos += 1;

        let contents = &self.src[self.start + 1..self.pos - 1];
        Ok(TokenType::STRING(contents.to_owned()))
    }

    fn number(&mut self) -> TokenType {
        while self.current().is_ascii_digit() {
            self.pos += 1;
        }

        // `1.` leaves the dot for the next token.
        if self.current() == b'.' && self.lookahead().is_ascii_digit() {
            self.pos += 1;
            while self.current().is_ascii_digit() {
                self.pos += 1;
            }
        }

        let text = &self.src[self.start..self.pos];
        TokenType::NUMBER(text.parse().unwrap_or(0.0))
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.current(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.pos += 1;
        }

        KEYWORDS
            .get(&self.bytes[self.start..self.pos])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while !self.at_end() {
            self.start = self.pos;

            match self.scan_token() {
                Ok(Some(kind)) => {
                    let lexeme = &self.src[self.start..self.pos];
                    debug!("Scanned {:?} on line {}", kind, self.line);

                    return Some(Ok(Token::new(kind, lexeme, self.line)));
                }
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }

        self.done = true;
        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl FusedIterator for Scanner<'_> {}

/// Scan all of `src`, reporting lexical errors into `diagnostics`.
///
/// The returned vector always ends with an `EOF` token, even when errors
/// were found, so the parser can still run and surface syntax errors.
pub fn scan_tokens(src: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for result in Scanner::new(src) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => diagnostics.report(e),
        }
    }

    info!("Scanned {} tokens", tokens.len());

    tokens
}
