//! Structural scanning over raw source bytes.
//!
//! This layer knows about delimiters, comments and environments but nothing
//! about what a declaration means. All delimiters it looks for are ASCII, so
//! every offset it returns is a valid `str` boundary.

use log::trace;

use crate::{
    error::{Diagnostic, DiagnosticCode, DiagnosticCollector},
    span::Span,
};

/// Returns true when the byte at `idx` is preceded by an odd number of
/// backslashes.
pub(crate) fn is_escaped(bytes: &[u8], idx: usize) -> bool {
    let backslashes = bytes[..idx]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    backslashes % 2 == 1
}

/// Byte ranges covered by `%` comments.
#[derive(Debug, Default)]
pub(crate) struct Comments {
    ranges: Vec<Span>,
}

impl Comments {
    /// Finds every unescaped `%` and records the range up to the end of its line.
    pub(crate) fn scan(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut ranges = Vec::new();
        let mut idx = 0;
        while idx < bytes.len() {
            if bytes[idx] == b'%' && !is_escaped(bytes, idx) {
                let end = line_end(source, idx);
                ranges.push(Span::new(idx..end));
                idx = end;
            } else {
                idx += 1;
            }
        }
        Self { ranges }
    }

    /// True when `offset` lies inside a comment.
    pub(crate) fn contains(&self, offset: usize) -> bool {
        // Ranges are sorted and disjoint.
        let idx = self.ranges.partition_point(|r| r.end() <= offset);
        self.ranges
            .get(idx)
            .is_some_and(|r| r.start() <= offset && offset < r.end())
    }
}

/// Offset of the end of the line containing `offset` (the `\n` itself, or the
/// end of the source).
pub(crate) fn line_end(source: &str, offset: usize) -> usize {
    source[offset..]
        .find('\n')
        .map_or(source.len(), |rel| offset + rel)
}

/// Finds the delimiter closing the one at `open_idx`.
///
/// Nested pairs of the same kind are counted; escaped delimiters (`\{`) are
/// not. Returns the offset of the closing delimiter.
///
/// # Examples
///
/// ```text
/// {\textbf{AWS}\\ EC2}   -> offset of the last `}`
/// {unbalanced \{        -> None
/// ```
pub(crate) fn matching_close(source: &str, open_idx: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = source.as_bytes();
    if bytes.get(open_idx) != Some(&open) {
        return None;
    }
    let mut depth = 0usize;
    for (idx, &b) in bytes.iter().enumerate().skip(open_idx) {
        if b != open && b != close {
            continue;
        }
        if is_escaped(bytes, idx) {
            continue;
        }
        if b == open {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}

/// Finds the next occurrence of `byte` at or after `from`, skipping escaped
/// occurrences.
pub(crate) fn find_unescaped(source: &str, from: usize, byte: u8) -> Option<usize> {
    let bytes = source.as_bytes();
    (from..bytes.len()).find(|&idx| bytes[idx] == byte && !is_escaped(bytes, idx))
}

/// Skips ASCII whitespace starting at `from`.
pub(crate) fn skip_whitespace(source: &str, from: usize) -> usize {
    let bytes = source.as_bytes();
    let mut idx = from;
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    idx
}

/// Offsets of every control word `marker` (e.g. `\node`) outside comments.
///
/// A marker only matches as a whole control word: `\nodes` does not match
/// `\node`.
pub(crate) fn find_markers(source: &str, marker: &str, comments: &Comments) -> Vec<usize> {
    let bytes = source.as_bytes();
    source
        .match_indices(marker)
        .map(|(idx, _)| idx)
        .filter(|&idx| {
            let after = idx + marker.len();
            let whole_word = bytes.get(after).is_none_or(|b| !b.is_ascii_alphabetic());
            whole_word && !comments.contains(idx) && !is_escaped(bytes, idx)
        })
        .collect()
}

/// A `scope`-like environment and whether it draws on the background layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Scope {
    pub span: Span,
    pub background: bool,
}

const BEGIN_SCOPE: &str = "\\begin{scope}";
const END_SCOPE: &str = "\\end{scope}";
const BEGIN_LAYER: &str = "\\begin{pgfonlayer}";
const END_LAYER: &str = "\\end{pgfonlayer}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvKind {
    Scope,
    Layer,
}

/// Matches `scope` and `pgfonlayer` environments.
///
/// A scope is a background scope when its option list mentions
/// `on background layer`; a layer is one when it is named `background`.
/// Unterminated environments extend to the end of the source.
pub(crate) fn scopes(
    source: &str,
    comments: &Comments,
    collector: &mut DiagnosticCollector,
) -> Vec<Scope> {
    let mut events: Vec<(usize, EnvKind, bool)> = Vec::new();
    for (marker, kind, begin) in [
        (BEGIN_SCOPE, EnvKind::Scope, true),
        (END_SCOPE, EnvKind::Scope, false),
        (BEGIN_LAYER, EnvKind::Layer, true),
        (END_LAYER, EnvKind::Layer, false),
    ] {
        events.extend(
            find_markers(source, marker, comments)
                .into_iter()
                .map(|idx| (idx, kind, begin)),
        );
    }
    events.sort_by_key(|&(idx, _, _)| idx);

    let mut open: Vec<(usize, EnvKind, bool)> = Vec::new();
    let mut scopes = Vec::new();
    for (idx, kind, begin) in events {
        if begin {
            let background = match kind {
                EnvKind::Scope => scope_options(source, idx + BEGIN_SCOPE.len())
                    .is_some_and(|options| options.contains("on background layer")),
                EnvKind::Layer => layer_name(source, idx + BEGIN_LAYER.len()) == Some("background"),
            };
            open.push((idx, kind, background));
            continue;
        }
        // Close the innermost environment of this kind.
        if let Some(pos) = open.iter().rposition(|&(_, k, _)| k == kind) {
            let (start, _, background) = open.remove(pos);
            let end_marker = match kind {
                EnvKind::Scope => END_SCOPE,
                EnvKind::Layer => END_LAYER,
            };
            scopes.push(Scope {
                span: Span::new(start..idx + end_marker.len()),
                background,
            });
        }
    }

    for (start, _, background) in open {
        collector.emit(
            Diagnostic::warning("environment is never closed")
                .with_code(DiagnosticCode::W007)
                .with_label(Span::new(start..line_end(source, start)), "opened here")
                .with_help("add the matching `\\end{...}`"),
        );
        scopes.push(Scope {
            span: Span::new(start..source.len()),
            background,
        });
    }

    trace!(count = scopes.len(); "Matched scopes");
    scopes
}

/// The `[...]` option list directly following `\begin{scope}`, if any.
fn scope_options(source: &str, from: usize) -> Option<&str> {
    let open = skip_whitespace(source, from);
    let close = matching_close(source, open, b'[', b']')?;
    Some(&source[open + 1..close])
}

/// The `{name}` argument directly following `\begin{pgfonlayer}`, if any.
fn layer_name(source: &str, from: usize) -> Option<&str> {
    let open = skip_whitespace(source, from);
    let close = matching_close(source, open, b'{', b'}')?;
    Some(source[open + 1..close].trim())
}

/// True when `offset` lies inside any background scope.
pub(crate) fn in_background(scopes: &[Scope], offset: usize) -> bool {
    scopes
        .iter()
        .any(|scope| scope.background && scope.span.start() <= offset && offset < scope.span.end())
}
