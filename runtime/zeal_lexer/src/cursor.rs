//! Byte-walking tokenizer cursor.

use crate::{CompoundOp, LexError, Token, TokenKind};

#[inline]
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'@'
}

#[inline]
fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Scan one token starting at `pos`, returning it together with the
/// position of the byte after it. At end of input an `Eof` token is
/// returned with `pos` unchanged.
pub fn next_token(src: &str, pos: usize) -> Result<(Token, usize), LexError> {
    let bytes = src.as_bytes();
    let mut i = pos;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    if i >= bytes.len() {
        return Ok((Token::new(TokenKind::Eof, ""), i));
    }

    let b = bytes[i];
    match b {
        b'(' => Ok((Token::new(TokenKind::LParen, "("), i + 1)),
        b')' => Ok((Token::new(TokenKind::RParen, ")"), i + 1)),
        b'[' => Ok((Token::new(TokenKind::LBracket, "["), i + 1)),
        b']' => Ok((Token::new(TokenKind::RBracket, "]"), i + 1)),
        b',' => Ok((Token::new(TokenKind::Comma, ","), i + 1)),
        b'\'' | b'"' | b'`' => scan_string(src, i),
        _ if b.is_ascii_digit() => Ok(scan_number(src, i)),
        _ if is_ident_start(b) => Ok(scan_ident(src, i)),
        _ => scan_operator(src, i),
    }
}

/// Quoted literal. `'` and `"` honor backslash escapes; backticks are raw.
/// The returned token text keeps the quotes.
fn scan_string(src: &str, start: usize) -> Result<(Token, usize), LexError> {
    let bytes = src.as_bytes();
    let quote = bytes[start];
    let mut i = start + 1;
    loop {
        let Some(offset) = memchr::memchr2(quote, b'\\', &bytes[i..]) else {
            return Err(LexError::UnterminatedString { pos: start });
        };
        let at = i + offset;
        if bytes[at] == b'\\' && quote != b'`' {
            // Skip the escaped byte; a trailing backslash is unterminated.
            if at + 1 >= bytes.len() {
                return Err(LexError::UnterminatedString { pos: start });
            }
            i = at + 2;
        } else {
            let end = at + 1;
            return Ok((Token::new(TokenKind::StrLit, &src[start..end]), end));
        }
    }
}

/// Integer or float literal: digits, optional fraction, optional exponent.
fn scan_number(src: &str, start: usize) -> (Token, usize) {
    let bytes = src.as_bytes();
    let mut i = start;
    let mut kind = TokenKind::IntLit;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        kind = TokenKind::FloatLit;
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            kind = TokenKind::FloatLit;
            i = j;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    (Token::new(kind, &src[start..i]), i)
}

fn scan_ident(src: &str, start: usize) -> (Token, usize) {
    let bytes = src.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() && is_ident_continue(bytes[i]) {
        i += 1;
    }
    (Token::new(TokenKind::Ident, &src[start..i]), i)
}

/// Operator glyphs. Two-character forms win over their one-character
/// prefixes, so `==` never lexes as `Assign` followed by `Assign`.
fn scan_operator(src: &str, start: usize) -> Result<(Token, usize), LexError> {
    let bytes = src.as_bytes();
    let b = bytes[start];
    let next = bytes.get(start + 1).copied();

    if next == Some(b'=') {
        let compound = match b {
            b'+' => Some(CompoundOp::Add),
            b'-' => Some(CompoundOp::Sub),
            b'*' => Some(CompoundOp::Mul),
            b'/' => Some(CompoundOp::Div),
            b'%' => Some(CompoundOp::Rem),
            _ => None,
        };
        if let Some(op) = compound {
            return Ok((
                Token::new(TokenKind::Compound(op), &src[start..start + 2]),
                start + 2,
            ));
        }
        if matches!(b, b'=' | b'!' | b'<' | b'>') {
            return Ok((Token::new(TokenKind::Op, &src[start..start + 2]), start + 2));
        }
    }
    if (b == b'&' && next == Some(b'&')) || (b == b'|' && next == Some(b'|')) {
        return Ok((Token::new(TokenKind::Op, &src[start..start + 2]), start + 2));
    }

    match b {
        b'=' => Ok((Token::new(TokenKind::Assign, "="), start + 1)),
        // Braces reach the lexer when a statement still carries
        // unresolved interpolation placeholders; they pass through as
        // plain operator glyphs.
        b'+' | b'-' | b'*' | b'/' | b'%' | b'<' | b'>' | b'!' | b'.' | b'{' | b'}' => Ok((
            Token::new(TokenKind::Op, &src[start..start + 1]),
            start + 1,
        )),
        _ => Err(LexError::UnknownByte { byte: b, pos: start }),
    }
}
