//! Assignment resolution: plain names, indexed elements, record fields.

use zeal_lexer::{CompoundOp, TokenKind};
use zeal_store::ScopeId;
use zeal_value::Value;

use crate::errors::EvalError;
use crate::evaluator::Evaluator;

/// Outcome of a statement run through [`Evaluator::wrapped_eval`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExprResult {
    /// The evaluated right-hand side (or the whole expression for a
    /// call-only statement).
    pub value: Option<Value>,
    /// Whether an assignment was performed.
    pub assigned: bool,
}

impl Evaluator<'_> {
    /// Evaluate one statement: split on the first assignment operator,
    /// evaluate the right-hand side in `fs`, and write the result to the
    /// target in `lfs`. Compound operators (`+=` and friends) rewrite to
    /// `lhs op rhs` before the final evaluation, which runs in `lfs`.
    ///
    /// A statement without an assignment operator is a call-only
    /// statement and just evaluates.
    pub fn wrapped_eval(
        &self,
        lfs: ScopeId,
        fs: ScopeId,
        statement: &str,
    ) -> Result<ExprResult, EvalError> {
        let Some(split) = find_split(statement)? else {
            let value = self.evaluate(fs, statement, true, true)?;
            return Ok(ExprResult {
                value,
                assigned: false,
            });
        };

        let lhs_text = statement[..split.at].trim();
        let rhs_text = statement[split.after..].trim();
        if rhs_text.is_empty() {
            return Err(EvalError::syntax("assignment without a right-hand side"));
        }

        let rhs = self
            .evaluate(fs, rhs_text, true, true)?
            .ok_or_else(|| EvalError::Eval {
                expr: rhs_text.to_string(),
            })?;

        let value = match split.compound {
            Some(op) => {
                let combined = format!(
                    "{lhs_text} {} {}",
                    op.glyph(),
                    crate::calls::flatten(&[crate::calls::ResolvedTok::Value(rhs)])?
                );
                self.evaluate(lfs, &combined, true, true)?
                    .ok_or(EvalError::Eval { expr: combined })?
            }
            None => rhs,
        };

        self.resolve_assignment(lfs, lhs_text, value.clone())?;
        Ok(ExprResult {
            value: Some(value),
            assigned: true,
        })
    }

    /// Write an already-evaluated value to the target the left-hand-side
    /// text names: an indexed element, a record field, or a plain
    /// (possibly computed) variable name.
    pub fn resolve_assignment(
        &self,
        fs: ScopeId,
        target: &str,
        value: Value,
    ) -> Result<(), EvalError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(EvalError::syntax("empty assignment target"));
        }

        if let Some((open, close)) = find_index_brackets(target)? {
            if close != target.len() - 1 {
                return Err(EvalError::syntax(format!(
                    "trailing characters after `]` in `{target}`"
                )));
            }
            let name = target[..open].trim();
            if name.is_empty() {
                return Err(EvalError::syntax(format!(
                    "missing variable name in `{target}`"
                )));
            }
            let key_src = &target[open + 1..close];
            let key = self
                .evaluate(fs, key_src, true, true)?
                .ok_or(EvalError::Eval {
                    expr: key_src.to_string(),
                })?;
            let key = match key {
                Value::Str(s) => s,
                Value::Int(n) if n < 0 => {
                    return Err(EvalError::NegativeIndex { index: n });
                }
                other => other.to_string(),
            };
            self.store.set_element(fs, name, &key, value)?;
            return Ok(());
        }

        if let Some(dot) = target.find('.') {
            let (base, field) = (&target[..dot], &target[dot + 1..]);
            if base.is_empty() || field.is_empty() {
                return Err(EvalError::syntax(format!(
                    "malformed field target `{target}`"
                )));
            }
            let Some(Value::Record(record)) = self.store.get(fs, base) else {
                return Err(EvalError::NotRecord {
                    name: base.to_string(),
                });
            };
            // Copy, mutate the copy, store it back whole.
            let updated = record.with_field(field, value)?;
            self.store.set(fs, base, Value::Record(updated));
            return Ok(());
        }

        // One more interpolation pass supports computed variable names.
        let (name, _) = self.interpolate(fs, target);
        let name = name.trim();
        if name.is_empty() {
            return Err(EvalError::syntax("empty assignment target"));
        }
        self.store.set(fs, name, value);
        Ok(())
    }
}

/// Byte span of the assignment operator within a statement, plus the
/// compound flavor when the operator is not a bare `=`.
struct Split {
    at: usize,
    after: usize,
    compound: Option<CompoundOp>,
}

/// Scan the statement for its assignment operator. Token-level scanning
/// keeps operators inside string literals from splitting the statement,
/// and two-character glyphs (`==`, `<=`, ...) never count. `None` means
/// a call-only statement.
fn find_split(statement: &str) -> Result<Option<Split>, EvalError> {
    let mut split: Option<Split> = None;
    let mut first = true;
    let mut pos = 0;
    loop {
        let (tok, next) = zeal_lexer::next_token(statement, pos)?;
        match tok.kind {
            TokenKind::Eof => return Ok(split),
            TokenKind::Assign | TokenKind::Compound(_) => {
                if first {
                    return Err(EvalError::syntax(
                        "statement begins with an assignment operator",
                    ));
                }
                if split.is_some() {
                    return Err(EvalError::syntax("multiple assignment operators"));
                }
                let compound = match tok.kind {
                    TokenKind::Compound(op) => Some(op),
                    _ => None,
                };
                split = Some(Split {
                    at: next - tok.text.len(),
                    after: next,
                    compound,
                });
            }
            TokenKind::Ident if first => {}
            // A leading `{` is an interpolation placeholder: the target
            // name is computed, which is still a valid target.
            TokenKind::Op if first && tok.text == "{" => {}
            _ if first => {
                // A statement that goes on to assign must target a name.
                // Peek ahead for an operator before rejecting, so plain
                // expressions like `1 + 2` still evaluate.
                let mut scan = next;
                loop {
                    let (t, n) = zeal_lexer::next_token(statement, scan)?;
                    match t.kind {
                        TokenKind::Eof => return Ok(None),
                        TokenKind::Assign | TokenKind::Compound(_) => {
                            return Err(EvalError::syntax(
                                "assignment target must begin with an identifier",
                            ));
                        }
                        _ => scan = n,
                    }
                }
            }
            _ => {}
        }
        first = false;
        pos = next;
    }
}

/// Locate the outermost index brackets of an assignment target, honoring
/// nested brackets and all three quote styles so a key containing `]` or
/// quotes parses correctly. Unmatched brackets are fatal.
fn find_index_brackets(target: &str) -> Result<Option<(usize, usize)>, EvalError> {
    let bytes = target.as_bytes();
    let mut open = None;
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_quoted(target, i)?;
                continue;
            }
            b'[' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            b']' => {
                if depth == 0 {
                    return Err(EvalError::syntax(format!(
                        "unmatched `]` in `{target}`"
                    )));
                }
                depth -= 1;
                if depth == 0 {
                    if let Some(o) = open {
                        return Ok(Some((o, i)));
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    if depth > 0 {
        return Err(EvalError::syntax(format!("unmatched `[` in `{target}`")));
    }
    Ok(None)
}

/// Advance past a quoted span starting at `start`. Backslash escapes
/// apply inside `'` and `"`, backticks are raw.
fn skip_quoted(s: &str, start: usize) -> Result<usize, EvalError> {
    let bytes = s.as_bytes();
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'\\' && quote != b'`' {
            i += 2;
            continue;
        }
        if bytes[i] == quote {
            return Ok(i + 1);
        }
        i += 1;
    }
    Err(EvalError::syntax(format!(
        "unterminated quote in assignment target `{s}`"
    )))
}
