//! Statement tokenizer for the Zeal runtime evaluation core.
//!
//! The evaluator works on flat token streams representing one statement;
//! this crate produces them. It recognizes exactly what the call resolver
//! and the expression engine need: identifiers (including `@`-prefixed
//! system names), integer and float literals, string literals in three
//! quote styles (`'`, `"`, `` ` ``), parentheses, brackets, commas, the
//! assignment operator and its compound forms, and multi-character
//! operator glyphs.
//!
//! The cursor is a hand-rolled byte walker; quoted spans are scanned with
//! `memchr`. Token text always carries the raw source slice, so a stream
//! can be reassembled into text the expression engine re-lexes.

mod cursor;

use std::fmt;

pub use cursor::next_token;

/// Error produced when the source cannot be tokenized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated string literal starting at byte {pos}")]
    UnterminatedString { pos: usize },
    #[error("unrecognized byte {byte:#04x} at position {pos}")]
    UnknownByte { byte: u8, pos: usize },
}

/// Compound assignment flavors (`+=`, `-=`, `*=`, `/=`, `%=`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompoundOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl CompoundOp {
    /// The plain operator glyph the compound form expands to.
    pub fn glyph(self) -> &'static str {
        match self {
            CompoundOp::Add => "+",
            CompoundOp::Sub => "-",
            CompoundOp::Mul => "*",
            CompoundOp::Div => "/",
            CompoundOp::Rem => "%",
        }
    }
}

/// Lexical category of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    IntLit,
    FloatLit,
    /// A quoted literal; `text` keeps the quotes, [`Token::unquoted`]
    /// strips them.
    StrLit,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    /// Bare `=`. Two-character operators starting with `=` lex as [`TokenKind::Op`].
    Assign,
    /// Compound assignment (`+=` and friends).
    Compound(CompoundOp),
    /// Any other operator glyph (`+`, `==`, `&&`, `.`, ...).
    Op,
    Eof,
}

/// One lexical unit: its category and the raw source slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }

    /// String literal content without the surrounding quotes.
    ///
    /// Escapes inside `'` and `"` literals are cooked; backtick literals
    /// are raw.
    pub fn unquoted(&self) -> String {
        if self.kind != TokenKind::StrLit || self.text.len() < 2 {
            return self.text.clone();
        }
        let inner = &self.text[1..self.text.len() - 1];
        if self.text.starts_with('`') {
            return inner.to_string();
        }
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => out.push('\\'),
                }
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Tokenize a whole statement. The trailing `Eof` token is not included.
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    let mut toks = Vec::new();
    let mut pos = 0;
    loop {
        let (tok, next) = next_token(src, pos)?;
        pos = next;
        if tok.kind == TokenKind::Eof {
            break;
        }
        toks.push(tok);
    }
    Ok(toks)
}
