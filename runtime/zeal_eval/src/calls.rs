//! User-defined call resolution inside expression token streams.
//!
//! The stream is parsed into a small call tree first, then resolved with
//! a post-order walk so inner calls always complete before the outer
//! call that consumes them. Each resolved call collapses to a single
//! value token (or to nothing, for a side-effect-only call), spliced
//! back into the surrounding stream.

use zeal_lexer::{Token, TokenKind};
use zeal_store::ScopeId;
use zeal_value::Value;

use crate::errors::EvalError;
use crate::evaluator::Evaluator;
use crate::traits::{CallRecord, RETURN_SLOT};

/// A token stream element after call resolution: either an untouched
/// lexical token or a call result carried by value.
#[derive(Clone, Debug)]
pub(crate) enum ResolvedTok {
    Lex(Token),
    Value(Value),
}

/// One node of the parsed statement: a plain token, or a call to a
/// registered user-defined function with comma-separated argument terms.
enum CallNode {
    Leaf(Token),
    Call {
        name: String,
        args: Vec<Vec<CallNode>>,
    },
}

fn has_calls(nodes: &[CallNode]) -> bool {
    nodes.iter().any(|n| match n {
        CallNode::Leaf(_) => false,
        CallNode::Call { .. } => true,
    })
}

impl Evaluator<'_> {
    /// Reduce every user-defined call in `toks` to its result. Streams
    /// without any call site pass through untouched.
    pub(crate) fn resolve_calls(
        &self,
        fs: ScopeId,
        toks: &[Token],
    ) -> Result<Vec<ResolvedTok>, EvalError> {
        let nodes = self.parse_nodes(toks)?;
        if !has_calls(&nodes) {
            return Ok(toks.iter().cloned().map(ResolvedTok::Lex).collect());
        }
        let mut out = Vec::new();
        for node in &nodes {
            self.resolve_node(fs, node, &mut out)?;
        }
        Ok(out)
    }

    fn parse_nodes(&self, toks: &[Token]) -> Result<Vec<CallNode>, EvalError> {
        let mut nodes = Vec::new();
        let mut i = 0;
        while i < toks.len() {
            let t = &toks[i];
            let callee = t.kind == TokenKind::Ident
                && toks.get(i + 1).map(|n| n.kind) == Some(TokenKind::LParen)
                && self.registry.lookup(&t.text).is_some();
            if callee {
                let (args, after) = self.parse_args(&t.text, toks, i + 1)?;
                nodes.push(CallNode::Call {
                    name: t.text.clone(),
                    args,
                });
                i = after;
            } else {
                nodes.push(CallNode::Leaf(t.clone()));
                i += 1;
            }
        }
        Ok(nodes)
    }

    /// Parse the balanced argument list opening at `toks[open]`.
    /// Returns the parsed terms and the index past the closing paren.
    ///
    /// Commas strictly alternate with non-empty terms, and the argument
    /// count must not exceed the callee's declared parameter count.
    /// Running out of tokens before the parens balance is fatal.
    fn parse_args(
        &self,
        name: &str,
        toks: &[Token],
        open: usize,
    ) -> Result<(Vec<Vec<CallNode>>, usize), EvalError> {
        let mut depth = 1usize;
        let mut terms: Vec<Vec<Token>> = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        let mut after_comma = false;
        let mut i = open + 1;
        while i < toks.len() {
            let t = &toks[i];
            match t.kind {
                TokenKind::LParen => {
                    depth += 1;
                    current.push(t.clone());
                }
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        if current.is_empty() {
                            if after_comma {
                                return Err(EvalError::syntax(format!(
                                    "empty term in call to `{name}`"
                                )));
                            }
                        } else {
                            terms.push(std::mem::take(&mut current));
                        }
                        return self.finish_args(name, terms, i + 1);
                    }
                    current.push(t.clone());
                }
                TokenKind::Comma if depth == 1 => {
                    if current.is_empty() {
                        return Err(EvalError::syntax(format!(
                            "empty term in call to `{name}`"
                        )));
                    }
                    terms.push(std::mem::take(&mut current));
                    after_comma = true;
                }
                _ => current.push(t.clone()),
            }
            i += 1;
        }
        Err(EvalError::syntax(format!(
            "unterminated parameter list in call to `{name}`"
        )))
    }

    fn finish_args(
        &self,
        name: &str,
        terms: Vec<Vec<Token>>,
        after: usize,
    ) -> Result<(Vec<Vec<CallNode>>, usize), EvalError> {
        if let Some(id) = self.registry.lookup(name) {
            let max = self.registry.param_count(id);
            if terms.len() > max {
                return Err(EvalError::ArgCount {
                    name: name.to_string(),
                    max,
                    got: terms.len(),
                });
            }
        }
        let mut args = Vec::with_capacity(terms.len());
        for term in &terms {
            args.push(self.parse_nodes(term)?);
        }
        Ok((args, after))
    }

    /// Post-order resolution: arguments (and any calls inside them)
    /// first, then the call itself.
    fn resolve_node(
        &self,
        fs: ScopeId,
        node: &CallNode,
        out: &mut Vec<ResolvedTok>,
    ) -> Result<(), EvalError> {
        match node {
            CallNode::Leaf(t) => out.push(ResolvedTok::Lex(t.clone())),
            CallNode::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for term in args {
                    let mut resolved = Vec::new();
                    for child in term {
                        self.resolve_node(fs, child, &mut resolved)?;
                    }
                    values.push(self.reduce_term(fs, name, resolved)?);
                }

                let Some(func) = self.registry.lookup(name) else {
                    return Err(EvalError::syntax(format!("unknown function `{name}`")));
                };
                let call_fs = self.dispatcher.next_call_frame();
                let record = CallRecord {
                    func,
                    call_fs,
                    caller_fs: fs,
                    return_slot: RETURN_SLOT,
                };
                tracing::debug!(name = %name, call_fs, caller_fs = fs, "dispatching user-defined call");
                self.dispatcher.invoke(&record, values)?;

                match self.store.get(fs, RETURN_SLOT) {
                    Some(v) => {
                        // Clear the slot so a later side-effect-only call
                        // cannot observe a stale result.
                        self.store.unset(fs, RETURN_SLOT);
                        out.push(ResolvedTok::Value(v));
                    }
                    None => {
                        tracing::debug!(name = %name, "side-effecting call, no return value spliced");
                    }
                }
            }
        }
        Ok(())
    }

    /// Evaluate one already-resolved argument term to a value.
    fn reduce_term(
        &self,
        fs: ScopeId,
        name: &str,
        resolved: Vec<ResolvedTok>,
    ) -> Result<Value, EvalError> {
        if resolved.is_empty() {
            return Err(EvalError::syntax(format!(
                "argument to `{name}` produced no value"
            )));
        }
        if let [ResolvedTok::Value(v)] = resolved.as_slice() {
            return Ok(v.clone());
        }
        let flat = flatten(&resolved)?;
        match self.evaluate(fs, &flat, false, true)? {
            Some(v) => Ok(v),
            None => Err(EvalError::Eval { expr: flat }),
        }
    }
}

/// Reassemble a resolved stream into flat text the engine re-lexes.
pub(crate) fn flatten(resolved: &[ResolvedTok]) -> Result<String, EvalError> {
    let mut parts = Vec::with_capacity(resolved.len());
    for rt in resolved {
        match rt {
            ResolvedTok::Lex(t) => parts.push(t.text.clone()),
            ResolvedTok::Value(v) => parts.push(render_literal(v)?),
        }
    }
    Ok(parts.join(" "))
}

/// Render a call result as literal expression text. Booleans render as
/// bare identifiers: script literals `true`/`false` lex as identifiers.
fn render_literal(v: &Value) -> Result<String, EvalError> {
    match v {
        Value::Int(n) => Ok(n.to_string()),
        Value::Uint(n) => Ok(n.to_string()),
        Value::Byte(b) => Ok(b.to_string()),
        // Debug form keeps a decimal point, so the text re-lexes as a
        // float. `NaN` and `inf` would re-lex as identifiers instead.
        Value::Float(x) if x.is_finite() => Ok(format!("{x:?}")),
        Value::Float(x) => Err(EvalError::NonFinite { value: *x }),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Str(s) => Ok(quote(s)),
        other => Err(EvalError::Embed { kind: other.kind() }),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests;
