//! Reference grammar engine for flat, call-free Zeal expression text.
//!
//! A precedence-climbing parser that evaluates as it goes: no AST, one
//! pass over the token stream. It covers arithmetic with checked integer
//! operations, boolean connectives, comparisons, string concatenation,
//! grouping, element access (`xs[i]`, `m["k"]`) and record field reads
//! (`rec.field`). Variables resolve against the scope store read-only;
//! this engine never writes variable state.
//!
//! User-defined calls never reach this crate: the evaluation core
//! resolves them to literal values before handing the flat remainder
//! over.

use std::cmp::Ordering;

use zeal_eval::{EngineError, ExprEngine};
use zeal_lexer::{Token, TokenKind};
use zeal_store::{ScopeId, ScopeStore};
use zeal_value::Value;

/// The reference [`ExprEngine`] implementation.
pub struct Engine;

impl ExprEngine for Engine {
    fn eval(
        &self,
        store: &ScopeStore,
        fs: ScopeId,
        text: &str,
    ) -> Result<Option<Value>, EngineError> {
        let toks = zeal_lexer::tokenize(text).map_err(|e| EngineError::Parse(e.to_string()))?;
        if toks.is_empty() {
            return Ok(None);
        }
        let mut parser = Parser {
            toks: &toks,
            pos: 0,
            store,
            fs,
        };
        let value = parser.expr(0)?;
        if let Some(tok) = parser.peek() {
            return Err(EngineError::Parse(format!(
                "unexpected trailing `{}`",
                tok.text
            )));
        }
        Ok(Some(value))
    }
}

struct Parser<'a> {
    toks: &'a [Token],
    pos: usize,
    store: &'a ScopeStore,
    fs: ScopeId,
}

/// Binding strength of a binary operator glyph, loosest first.
fn precedence(op: &str) -> Option<u8> {
    Some(match op {
        "||" => 1,
        "&&" => 2,
        "==" | "!=" => 3,
        "<" | "<=" | ">" | ">=" => 4,
        "+" | "-" => 5,
        "*" | "/" | "%" => 6,
        _ => return None,
    })
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.toks.get(self.pos)
    }

    fn expr(&mut self, min: u8) -> Result<Value, EngineError> {
        let mut lhs = self.unary()?;
        while let Some(tok) = self.peek() {
            if tok.kind != TokenKind::Op {
                break;
            }
            let Some(prec) = precedence(&tok.text) else {
                break;
            };
            if prec < min {
                break;
            }
            let op = tok.text.clone();
            self.pos += 1;
            // Left associativity: the recursive call binds one level tighter.
            let rhs = self.expr(prec + 1)?;
            lhs = binary(&op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Value, EngineError> {
        if let Some(tok) = self.peek() {
            if tok.kind == TokenKind::Op && (tok.text == "-" || tok.text == "!") {
                let negate = tok.text == "-";
                self.pos += 1;
                let v = self.unary()?;
                return if negate { neg(v) } else { not(v) };
            }
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Value, EngineError> {
        let mut value = self.primary()?;
        loop {
            match self.peek() {
                Some(tok) if tok.kind == TokenKind::LBracket => {
                    self.pos += 1;
                    let key = self.expr(0)?;
                    self.expect(TokenKind::RBracket, "]")?;
                    value = element(value, &key)?;
                }
                Some(tok) if tok.kind == TokenKind::Op && tok.text == "." => {
                    self.pos += 1;
                    let field = match self.peek() {
                        Some(t) if t.kind == TokenKind::Ident => t.text.clone(),
                        _ => {
                            return Err(EngineError::Parse(
                                "expected a field name after `.`".to_string(),
                            ));
                        }
                    };
                    self.pos += 1;
                    value = element(value, &Value::Str(field))?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn primary(&mut self) -> Result<Value, EngineError> {
        let Some(tok) = self.peek() else {
            return Err(EngineError::Parse("unexpected end of expression".to_string()));
        };
        let value = match tok.kind {
            TokenKind::IntLit => match tok.text.parse::<i64>() {
                Ok(n) => Value::Int(n),
                // Magnitudes past i64 still fit the unsigned variant.
                Err(_) => tok
                    .text
                    .parse::<u64>()
                    .map(Value::Uint)
                    .map_err(|_| EngineError::Parse(format!("bad integer literal `{}`", tok.text)))?,
            },
            TokenKind::FloatLit => tok
                .text
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| EngineError::Parse(format!("bad float literal `{}`", tok.text)))?,
            TokenKind::StrLit => Value::Str(tok.unquoted()),
            TokenKind::Ident => match tok.text.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                name => self
                    .store
                    .get(self.fs, name)
                    .ok_or_else(|| EngineError::UnknownIdent(name.to_string()))?,
            },
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.expr(0)?;
                self.expect(TokenKind::RParen, ")")?;
                return Ok(inner);
            }
            _ => {
                return Err(EngineError::Parse(format!("unexpected `{}`", tok.text)));
            }
        };
        self.pos += 1;
        Ok(value)
    }

    fn expect(&mut self, kind: TokenKind, glyph: &str) -> Result<(), EngineError> {
        match self.peek() {
            Some(tok) if tok.kind == kind => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(EngineError::Parse(format!("expected `{glyph}`"))),
        }
    }
}

#[derive(Clone, Copy)]
enum Num {
    I(i64),
    F(f64),
}

fn num(v: &Value) -> Option<Num> {
    match v {
        Value::Int(n) => Some(Num::I(*n)),
        Value::Byte(b) => Some(Num::I(i64::from(*b))),
        Value::Uint(n) => match i64::try_from(*n) {
            Ok(n) => Some(Num::I(n)),
            Err(_) => Some(Num::F(*n as f64)),
        },
        Value::Float(x) => Some(Num::F(*x)),
        _ => None,
    }
}

fn as_f(n: Num) -> f64 {
    match n {
        Num::I(i) => i as f64,
        Num::F(f) => f,
    }
}

fn binary(op: &str, l: Value, r: Value) -> Result<Value, EngineError> {
    match op {
        "&&" | "||" => logic(op, l, r),
        "==" => Ok(Value::Bool(equals(&l, &r))),
        "!=" => Ok(Value::Bool(!equals(&l, &r))),
        "<" | "<=" | ">" | ">=" => compare(op, l, r),
        _ => arith(op, l, r),
    }
}

fn logic(op: &str, l: Value, r: Value) -> Result<Value, EngineError> {
    match (&l, &r) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == "&&" {
            *a && *b
        } else {
            *a || *b
        })),
        _ => Err(EngineError::KindMismatch {
            op: op.to_string(),
            left: l.kind(),
            right: r.kind(),
        }),
    }
}

/// Numeric operands compare by value across integer/float variants;
/// everything else falls back to structural equality.
fn equals(l: &Value, r: &Value) -> bool {
    match (num(l), num(r)) {
        (Some(Num::I(a)), Some(Num::I(b))) => a == b,
        (Some(a), Some(b)) => as_f(a) == as_f(b),
        _ => l == r,
    }
}

fn compare(op: &str, l: Value, r: Value) -> Result<Value, EngineError> {
    let ord = match (num(&l), num(&r)) {
        (Some(Num::I(a)), Some(Num::I(b))) => a.cmp(&b),
        (Some(a), Some(b)) => match as_f(a).partial_cmp(&as_f(b)) {
            Some(ord) => ord,
            // NaN compares false against everything.
            None => return Ok(Value::Bool(false)),
        },
        _ => match (&l, &r) {
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => {
                return Err(EngineError::KindMismatch {
                    op: op.to_string(),
                    left: l.kind(),
                    right: r.kind(),
                });
            }
        },
    };
    Ok(Value::Bool(match op {
        "<" => ord == Ordering::Less,
        "<=" => ord != Ordering::Greater,
        ">" => ord == Ordering::Greater,
        _ => ord != Ordering::Less,
    }))
}

fn arith(op: &str, l: Value, r: Value) -> Result<Value, EngineError> {
    if op == "+" {
        if let (Value::Str(a), Value::Str(b)) = (&l, &r) {
            return Ok(Value::Str(format!("{a}{b}")));
        }
    }
    let (Some(a), Some(b)) = (num(&l), num(&r)) else {
        return Err(EngineError::KindMismatch {
            op: op.to_string(),
            left: l.kind(),
            right: r.kind(),
        });
    };
    match (a, b) {
        (Num::I(a), Num::I(b)) => int_arith(op, a, b),
        (a, b) => float_arith(op, as_f(a), as_f(b)),
    }
}

fn int_arith(op: &str, a: i64, b: i64) -> Result<Value, EngineError> {
    if (op == "/" || op == "%") && b == 0 {
        return Err(EngineError::DivisionByZero);
    }
    let (result, name): (Option<i64>, &'static str) = match op {
        "+" => (a.checked_add(b), "+"),
        "-" => (a.checked_sub(b), "-"),
        "*" => (a.checked_mul(b), "*"),
        "/" => (a.checked_div(b), "/"),
        "%" => (a.checked_rem(b), "%"),
        _ => return Err(EngineError::Parse(format!("unknown operator `{op}`"))),
    };
    result.map(Value::Int).ok_or(EngineError::Overflow(name))
}

fn float_arith(op: &str, a: f64, b: f64) -> Result<Value, EngineError> {
    if (op == "/" || op == "%") && b == 0.0 {
        return Err(EngineError::DivisionByZero);
    }
    let x = match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" => a / b,
        "%" => a % b,
        _ => return Err(EngineError::Parse(format!("unknown operator `{op}`"))),
    };
    Ok(Value::Float(x))
}

fn neg(v: Value) -> Result<Value, EngineError> {
    match v {
        Value::Int(n) => n.checked_neg().map(Value::Int).ok_or(EngineError::Overflow("-")),
        Value::Byte(b) => Ok(Value::Int(-i64::from(b))),
        Value::Uint(n) => match i64::try_from(n) {
            Ok(n) => Ok(Value::Int(-n)),
            Err(_) => Err(EngineError::Overflow("-")),
        },
        Value::Float(x) => Ok(Value::Float(-x)),
        other => Err(EngineError::Parse(format!("cannot negate a {} value", other.kind()))),
    }
}

fn not(v: Value) -> Result<Value, EngineError> {
    match v {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(EngineError::Parse(format!("cannot invert a {} value", other.kind()))),
    }
}

/// Element read on an already-evaluated value. Integer keys index lists,
/// strings, and record fields by position; string keys address maps and
/// record fields by name.
fn element(value: Value, key: &Value) -> Result<Value, EngineError> {
    let kind = value.kind();
    let miss = || EngineError::NoElement {
        key: key.to_string(),
        kind,
    };
    let idx = || -> Result<usize, EngineError> {
        key.as_int()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(miss)
    };
    match value {
        Value::Map(m) => m.get(&key.to_string()).cloned().ok_or_else(miss),
        Value::IntList(v) => v.get(idx()?).map(|n| Value::Int(*n)).ok_or_else(miss),
        Value::UintList(v) => v.get(idx()?).map(|n| Value::Uint(*n)).ok_or_else(miss),
        Value::FloatList(v) => v.get(idx()?).map(|x| Value::Float(*x)).ok_or_else(miss),
        Value::BoolList(v) => v.get(idx()?).map(|b| Value::Bool(*b)).ok_or_else(miss),
        Value::StrList(v) => v.get(idx()?).map(Value::string).ok_or_else(miss),
        Value::ByteList(v) => v.get(idx()?).map(|b| Value::Byte(*b)).ok_or_else(miss),
        Value::List(v) => v.get(idx()?).cloned().ok_or_else(miss),
        Value::Str(s) => s
            .chars()
            .nth(idx()?)
            .map(|c| Value::string(c.to_string()))
            .ok_or_else(miss),
        Value::Record(r) => match r.field(&key.to_string()) {
            Some(v) => Ok(v.clone()),
            None => r.field_at(idx()?).cloned().ok_or_else(miss),
        },
        _ => Err(miss()),
    }
}

#[cfg(test)]
mod tests;
