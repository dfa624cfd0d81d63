//! Reusable value fixtures.
//!
//! - [`Duck`]: a named counter that is mutated through shared handles.
//! - [`Token`], [`Lexer`], [`LexerQueue`]: a tiny word lexer that
//!   allocates one handle per token from the current provider.

use std::cell::Cell;

use allot_ref::{current, Ref};
use smallvec::SmallVec;

/// A duck that counts its quacks.
///
/// State lives in `Cell`s so that every handle to the same duck, shared or
/// weak, can make it quack.
#[derive(Clone, Debug)]
pub struct Duck {
    name: Cell<&'static str>,
    count: Cell<i32>,
}

impl Duck {
    /// Quack count of a freshly hatched duck.
    pub const FIRST_QUACK: i32 = 42;

    pub fn new(name: &'static str) -> Self {
        Self {
            name: Cell::new(name),
            count: Cell::new(Self::FIRST_QUACK),
        }
    }

    /// `"<name> says Quack <n>!"`, then bump the count.
    pub fn quack(&self) -> String {
        let line = format!("{} says Quack {}!", self.name.get(), self.count.get());
        self.count.set(self.count.get() + 1);
        line
    }

    pub fn change_name(&self, name: &'static str) {
        self.name.set(name);
    }

    pub fn name(&self) -> &'static str {
        self.name.get()
    }

    pub fn count(&self) -> i32 {
        self.count.get()
    }
}

/// Token categories produced by [`Lexer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    EndOfFile,
    Identifier,
}

/// A token borrowing its text from the lexer input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    /// Whitespace consumed before the token.
    pub ws: &'s str,
    pub lexeme: &'s str,
}

/// Splits ASCII words separated by spaces.
///
/// Any other character ends the input: it yields an end-of-file token
/// without being consumed.
pub struct Lexer<'s> {
    data: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(data: &'s str) -> Self {
        Self { data, pos: 0 }
    }

    /// Lex the next token into the current provider.
    pub fn next_token(&mut self) -> Ref<'static, Token<'s>> {
        current::make(self.scan())
    }

    fn scan(&mut self) -> Token<'s> {
        let bytes = self.data.as_bytes();
        let ws = self.pos;
        while self.pos < bytes.len() && bytes[self.pos] == b' ' {
            self.pos += 1;
        }
        let start = self.pos;
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_alphabetic() {
            self.pos += 1;
        }
        if self.pos > start {
            Token {
                kind: TokenKind::Identifier,
                ws: &self.data[ws..start],
                lexeme: &self.data[start..self.pos],
            }
        } else {
            Token {
                kind: TokenKind::EndOfFile,
                ws: &self.data[ws..start],
                lexeme: "",
            }
        }
    }
}

/// One-token lookahead over a [`Lexer`].
pub struct LexerQueue<'s> {
    current: Ref<'static, Token<'s>>,
    lex: Lexer<'s>,
    completed: bool,
}

impl<'s> LexerQueue<'s> {
    /// Create a queue positioned on the first token.
    pub fn new(input: &'s str) -> Self {
        let mut queue = Self {
            current: Ref::uninit(),
            lex: Lexer::new(input),
            completed: false,
        };
        queue.advance();
        queue
    }

    pub fn peek(&self) -> &Ref<'static, Token<'s>> {
        &self.current
    }

    /// Move to the next token; a no-op once end-of-file was reached.
    pub fn advance(&mut self) {
        if self.completed {
            return;
        }
        // Release before lexing so a bump arena sees LIFO traffic.
        self.current.reset();
        self.current = self.lex.next_token();
        self.completed = self.current.kind == TokenKind::EndOfFile;
    }
}

/// Lex `input` to the end, returning every token's kind and lexeme,
/// the closing end-of-file token included.
///
/// Each token is read through a weak view of the queue's current handle,
/// so the sequence is the same whether or not the provider shares.
pub fn lex_tokens(input: &str) -> SmallVec<[(TokenKind, &str); 16]> {
    let mut queue = LexerQueue::new(input);
    let mut tokens = SmallVec::new();
    loop {
        let (kind, lexeme) = {
            let token = queue.peek().weak();
            (token.kind, token.lexeme)
        };
        tokens.push((kind, lexeme));
        if kind == TokenKind::EndOfFile {
            return tokens;
        }
        queue.advance();
    }
}
