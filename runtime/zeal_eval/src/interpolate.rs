//! `{name}` interpolation with re-entrant sub-expression evaluation.

use zeal_store::ScopeId;

use crate::evaluator::Evaluator;

/// Cap on fixed-point sweeps. A variable whose rendering reintroduces
/// its own placeholder would otherwise never stabilize.
const MAX_SWEEPS: usize = 32;

impl Evaluator<'_> {
    /// Replace `{name}` placeholders with live variable renderings, then
    /// evaluate any remaining brace spans as sub-expressions.
    ///
    /// Pass 1 runs variable substitution to a fixed point against one
    /// consistent snapshot of the scope (a single read-lock batch).
    /// Pass 2 walks remaining `{...}` spans innermost-first, evaluating
    /// each via [`Evaluator::evaluate`] (non-erroring) and splicing the
    /// rendering back in; this supports indirection like `{a{b}}`. Spans
    /// that resolve to nothing stay intact.
    ///
    /// The `bool` reports whether the text changed at all.
    pub fn interpolate(&self, fs: ScopeId, text: &str) -> (String, bool) {
        if !self.config.interpolation || !text.contains('{') {
            return (text.to_string(), false);
        }

        let mut s = text.to_string();
        let snapshot = self.store.snapshot(fs);

        for _ in 0..MAX_SWEEPS {
            let before = s.clone();
            for (name, value) in &snapshot {
                let needle = format!("{{{name}}}");
                if s.contains(&needle) {
                    s = s.replace(&needle, &value.to_string());
                }
            }
            if s == before {
                break;
            }
        }

        for _ in 0..MAX_SWEEPS {
            let mut reduced = false;
            let mut from = 0;
            while let Some((open, close)) = innermost_span(&s, from) {
                let inner = &s[open + 1..close];
                match self.evaluate(fs, inner, false, false) {
                    Ok(Some(v)) => {
                        s.replace_range(open..=close, &v.to_string());
                        reduced = true;
                        // The string shifted; rescan from the top.
                        break;
                    }
                    _ => from = close + 1,
                }
            }
            if !reduced {
                break;
            }
        }

        let changed = s != text;
        (s, changed)
    }
}

/// First brace span containing no nested `{`, at or after `from`.
fn innermost_span(s: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut open = None;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match b {
            b'{' => open = Some(i),
            b'}' => {
                if let Some(o) = open {
                    return Some((o, i));
                }
            }
            _ => {}
        }
    }
    None
}
