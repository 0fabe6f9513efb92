//! `\node` declarations.
//!
//! Extraction happens in two steps: [`extract`] finds the clause boundaries
//! with explicit depth counting, then [`build_node`] / [`build_group`] give
//! the clauses meaning.

use log::debug;

use tikzedit_core::{
    identifier::Id,
    model::{LooseReference, PositionSpec, RelativePlacement, ShapeKind},
};

use crate::{
    error::{Diagnostic, DiagnosticCode, DiagnosticCollector},
    options::{OptionKind, OptionList},
    position::{
        AtClause, Axis, at_clause, find_loose_relative, fit_option, inner_sep_option,
        parse_complete, parse_prefix, relative_option, shift_option,
    },
    records::{GroupRecord, NodeRecord, NodeSpans, PositionItem, UnparsedNode},
    scan::{find_unescaped, line_end, matching_close, skip_whitespace},
    span::Span,
    text::clean_label,
};

pub(crate) const NODE_MARKER: &str = "\\node";

/// Result of reading the clause boundaries of one declaration.
#[derive(Debug)]
pub(crate) enum Extracted {
    Complete(NodeSpans),
    /// Name readable, rest is not
    Unparsed(UnparsedNode),
    /// Nothing usable
    Skipped,
}

/// Reads the clause boundaries of the declaration whose marker starts at
/// `start`.
pub(crate) fn extract(source: &str, start: usize, collector: &mut DiagnosticCollector) -> Extracted {
    let bytes = source.as_bytes();
    let marker_line = Span::new(start..line_end(source, start));
    let mut idx = skip_whitespace(source, start + NODE_MARKER.len());

    let mut style = None;
    if bytes.get(idx) == Some(&b'[') {
        let Some(close) = matching_close(source, idx, b'[', b']') else {
            collector.emit(
                Diagnostic::warning("node style clause is never closed")
                    .with_code(DiagnosticCode::W001)
                    .with_label(marker_line, "`[` opened here")
                    .with_help("add the closing `]`"),
            );
            return Extracted::Skipped;
        };
        style = Some(Span::new(idx + 1..close));
        idx = skip_whitespace(source, close + 1);
    }

    let name_close = (bytes.get(idx) == Some(&b'('))
        .then(|| find_unescaped(source, idx, b')'))
        .flatten();
    let Some(name_close) = name_close else {
        collector.emit(
            Diagnostic::warning("node declaration has no name")
                .with_code(DiagnosticCode::W002)
                .with_label(marker_line, "expected `(name)` here")
                .with_help("give the node a name so it can be positioned and edited"),
        );
        return Extracted::Skipped;
    };
    let raw_name = &source[idx + 1..name_close];
    let lead = raw_name.len() - raw_name.trim_start().len();
    let name = Span::new(idx + 1 + lead..idx + 1 + lead + raw_name.trim().len());
    if name.is_empty() {
        collector.emit(
            Diagnostic::warning("node declaration has an empty name")
                .with_code(DiagnosticCode::W002)
                .with_label(marker_line, "empty `()`"),
        );
        return Extracted::Skipped;
    }
    let name_end = name_close + 1;

    let unparsed = |span_end: usize| UnparsedNode {
        name: name.slice(source).to_string(),
        span: Span::new(start..span_end),
        style: style.map(|inner| OptionList::scan(source, inner)),
        name_end,
        tail_items: scan_position_items(source, Span::new(name_end..span_end)),
    };

    let Some(label_open) = label_start(source, name_end) else {
        collector.emit(
            Diagnostic::warning(format!(
                "node `{}` has no label",
                name.slice(source)
            ))
            .with_code(DiagnosticCode::W003)
            .with_label(marker_line, "expected `{...}` after the position")
            .with_help("every node needs a label, even an empty `{}`"),
        );
        return Extracted::Unparsed(unparsed(line_end(source, name_end)));
    };

    let Some(label_close) = matching_close(source, label_open, b'{', b'}') else {
        collector.emit(
            Diagnostic::warning(format!(
                "label of node `{}` is never closed",
                name.slice(source)
            ))
            .with_code(DiagnosticCode::W004)
            .with_label(Span::new(label_open..line_end(source, label_open)), "label starts here")
            .with_help("balance the braces of the label"),
        );
        return Extracted::Unparsed(unparsed(line_end(source, name_end)));
    };

    let after_label = skip_whitespace(source, label_close + 1);
    let terminator = (bytes.get(after_label) == Some(&b';'))
        .then(|| Span::new(after_label..after_label + 1));
    let end = terminator.map_or(label_close + 1, |t| t.end());

    Extracted::Complete(NodeSpans {
        declaration: Span::new(start..end),
        style: style.map(|inner| OptionList::scan(source, inner)),
        name,
        name_end,
        position: Span::new(name_end..label_open),
        position_items: Vec::new(),
        label: Span::new(label_open + 1..label_close),
        terminator,
    })
}

/// Finds the label's opening brace after the name.
///
/// Gives up at a `;` or at the next command, which would mean the label is
/// missing and the brace belongs to something else.
fn label_start(source: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut idx = from;
    while idx < bytes.len() {
        match bytes[idx] {
            b'{' => return Some(idx),
            b';' | b'\\' => return None,
            b'[' => idx = matching_close(source, idx, b'[', b']')? + 1,
            _ => idx += 1,
        }
    }
    None
}

/// Position clause items found between name and label.
fn scan_position_items(source: &str, clause: Span) -> Vec<PositionItem> {
    let text = clause.slice(source);
    let mut items = Vec::new();
    let mut idx = 0;
    while idx < text.len() {
        let rest = &text[idx..];
        let Some(c) = rest.chars().next() else { break };
        let at_boundary = text[..idx]
            .chars()
            .next_back()
            .is_none_or(|prev| !prev.is_alphanumeric());

        if c == '[' {
            let abs = clause.start() + idx;
            if let Some(close) = matching_close(source, abs, b'[', b']') {
                items.push(PositionItem::Options(OptionList::scan(
                    source,
                    Span::new(abs + 1..close),
                )));
                idx = close + 1 - clause.start();
                continue;
            }
        }

        if let Some((len, make)) = at_boundary.then(|| position_token(rest)).flatten() {
            let token = rest[..len].trim_end();
            let start = clause.start() + idx;
            items.push(make(Span::new(start..start + token.len())));
            idx += len;
            continue;
        }

        idx += c.len_utf8();
    }
    items
}

/// Recognizes a position token at the start of `rest` and returns its length
/// with the matching item constructor.
fn position_token(rest: &str) -> Option<(usize, fn(Span) -> PositionItem)> {
    if let Some((_, len)) = parse_prefix(rest, at_clause) {
        return Some((len, PositionItem::At));
    }
    if let Some((_, len)) = parse_prefix(rest, relative_option) {
        return Some((len, PositionItem::Relative));
    }
    if let Some((_, len)) = parse_prefix(rest, shift_option) {
        return Some((len, PositionItem::Shift));
    }
    if let Some((_, len)) = parse_prefix(rest, fit_option) {
        return Some((len, PositionItem::Fit));
    }
    if let Some((_, len)) = parse_prefix(rest, inner_sep_option) {
        return Some((len, PositionItem::InnerSep));
    }
    None
}

/// Position-related text fragments of a declaration, in reading order.
enum Fragment {
    Relative(Span),
    Shift(Span),
    At(Span),
}

fn fragments(spans: &NodeSpans) -> Vec<Fragment> {
    fn from_list(list: &OptionList, out: &mut Vec<Fragment>) {
        for entry in &list.entries {
            match entry.kind {
                OptionKind::Relative => out.push(Fragment::Relative(entry.span)),
                OptionKind::Shift => out.push(Fragment::Shift(entry.span)),
                _ => {}
            }
        }
    }

    let mut out = Vec::new();
    if let Some(style) = &spans.style {
        from_list(style, &mut out);
    }
    for item in &spans.position_items {
        match item {
            PositionItem::At(span) => out.push(Fragment::At(*span)),
            PositionItem::Relative(span) => out.push(Fragment::Relative(*span)),
            PositionItem::Shift(span) => out.push(Fragment::Shift(*span)),
            PositionItem::Options(list) => from_list(list, &mut out),
            PositionItem::Fit(_) | PositionItem::InnerSep(_) => {}
        }
    }
    out
}

/// Interprets every position fragment; later fragments override earlier ones.
fn position_spec(source: &str, spans: &NodeSpans, collector: &mut DiagnosticCollector) -> PositionSpec {
    let mut spec = PositionSpec::default();
    let node = spans.name.slice(source);

    for fragment in fragments(spans) {
        match fragment {
            Fragment::At(span) => match parse_complete(span.slice(source), at_clause) {
                Some(AtClause::Point(point)) => spec.at = Some(point),
                _ => collector.emit(
                    Diagnostic::warning(format!("cannot read the coordinate of node `{node}`"))
                        .with_code(DiagnosticCode::W101)
                        .with_label(span, "unsupported coordinate")
                        .with_help("use a plain `at (x,y)` with lengths in cm, mm, pt or in"),
                ),
            },
            Fragment::Relative(span) => {
                if let Some(option) = parse_complete(span.slice(source), relative_option) {
                    spec.relative = Some(RelativePlacement::new(
                        option.direction,
                        Id::new(option.reference),
                        option.distance,
                    ));
                }
            }
            Fragment::Shift(span) => match parse_complete(span.slice(source), shift_option) {
                Some(shift) if shift.value.is_some() => match shift.axis {
                    Axis::X => spec.xshift = shift.value,
                    Axis::Y => spec.yshift = shift.value,
                },
                _ => collector.emit(
                    Diagnostic::warning(format!("cannot read a shift of node `{node}`"))
                        .with_code(DiagnosticCode::W102)
                        .with_label(span, "unsupported shift value")
                        .with_help("use a length such as `xshift=1.5cm`"),
                ),
            },
        }
    }

    if spec.relative.is_none() {
        let style = spans.style.as_ref().map_or("", |list| list.span.slice(source));
        let haystack = format!("{style} {}", spans.position.slice(source));
        spec.loose = find_loose_relative(&haystack)
            .map(|(direction, name)| LooseReference { direction, name });
    }

    spec
}

/// True when the declaration carries a `fit=` entry anywhere.
pub(crate) fn has_fit(spans: &NodeSpans) -> bool {
    fit_span(spans).is_some()
}

fn fit_span(spans: &NodeSpans) -> Option<Span> {
    let in_list = |list: &OptionList| list.of_kind(OptionKind::Fit).next().map(|e| e.span);
    spans.style.as_ref().and_then(in_list).or_else(|| {
        spans.position_items.iter().find_map(|item| match item {
            PositionItem::Fit(span) => Some(*span),
            PositionItem::Options(list) => in_list(list),
            _ => None,
        })
    })
}

fn inner_sep(source: &str, spans: &NodeSpans) -> Option<f32> {
    let in_list = |list: &OptionList| {
        list.of_kind(OptionKind::InnerSep)
            .find_map(|entry| parse_complete(entry.span.slice(source), inner_sep_option))
    };
    spans.style.as_ref().and_then(in_list).or_else(|| {
        spans.position_items.iter().find_map(|item| match item {
            PositionItem::InnerSep(span) => parse_complete(span.slice(source), inner_sep_option),
            PositionItem::Options(list) => in_list(list),
            _ => None,
        })
    })
}

/// Finishes clause scanning for a complete declaration.
pub(crate) fn scan_clauses(source: &str, mut spans: NodeSpans) -> NodeSpans {
    spans.position_items = scan_position_items(source, spans.position);
    spans
}

/// Builds a node record from a complete declaration.
pub(crate) fn build_node(source: &str, spans: NodeSpans, collector: &mut DiagnosticCollector) -> NodeRecord {
    let style = spans
        .style
        .as_ref()
        .map_or(String::new(), |list| list.span.slice(source).to_string());
    let shape = ShapeKind::from_style(&style);
    let raw_label = spans.label.slice(source).to_string();
    let text = clean_label(&raw_label);
    let size = shape.label_size(&text);
    let position = position_spec(source, &spans, collector);
    let name = Id::new(spans.name.slice(source));

    debug!(
        node = spans.name.slice(source),
        absolute = position.is_absolute(),
        relative = position.relative.is_some();
        "Read node declaration"
    );

    NodeRecord {
        name,
        style,
        shape,
        position,
        text,
        raw_label,
        size,
        spans,
    }
}

/// Builds a group record from a complete declaration carrying `fit=`.
pub(crate) fn build_group(source: &str, spans: &NodeSpans) -> Option<GroupRecord> {
    let membership = fit_span(spans)?;
    let members = parse_complete(membership.slice(source), fit_option)?
        .iter()
        .map(|name| Id::new(name.split('.').next().unwrap_or(name)))
        .collect();
    let hints = spans
        .style
        .as_ref()
        .map(|list| list.group_style(source))
        .unwrap_or_default();

    Some(GroupRecord {
        name: Id::new(spans.name.slice(source)),
        style: spans
            .style
            .as_ref()
            .map_or(String::new(), |list| list.span.slice(source).to_string()),
        hints,
        members,
        padding: inner_sep(source, spans),
        text: clean_label(spans.label.slice(source)),
        membership,
        declaration: spans.declaration,
    })
}

#[cfg(test)]
mod tests {
    use tikzedit_core::model::Direction;

    use super::*;

    fn complete(source: &str) -> NodeSpans {
        let mut collector = DiagnosticCollector::new();
        match extract(source, 0, &mut collector) {
            Extracted::Complete(spans) => scan_clauses(source, spans),
            other => panic!("expected a complete declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_clause_spans() {
        let source = r"\node[cloud] (aws) at (-6,3) {\textbf{AWS}\\small EC2 GPU};";
        let spans = complete(source);
        assert_eq!(spans.name.slice(source), "aws");
        assert_eq!(spans.position.slice(source), " at (-6,3) ");
        assert_eq!(spans.label.slice(source), r"\textbf{AWS}\\small EC2 GPU");
        assert_eq!(spans.terminator, Some(Span::new(source.len() - 1..source.len())));
        assert_eq!(spans.declaration, Span::new(0..source.len()));
        assert_eq!(spans.position_items, vec![PositionItem::At(Span::new(19..28))]);
    }

    #[test]
    fn test_extract_without_style_or_terminator() {
        let source = "\\node (db) {Orders}\n";
        let spans = complete(source);
        assert!(spans.style.is_none());
        assert!(spans.terminator.is_none());
        assert_eq!(spans.declaration.slice(source), "\\node (db) {Orders}");
    }

    #[test]
    fn test_extract_missing_label_is_unparsed() {
        let source = "\\node[api] (gw) at (0,0);\n\\node[db] (x) {X};";
        let mut collector = DiagnosticCollector::new();
        match extract(source, 0, &mut collector) {
            Extracted::Unparsed(site) => {
                assert_eq!(site.name, "gw");
                assert_eq!(site.span.slice(source), "\\node[api] (gw) at (0,0);");
                assert_eq!(site.tail().slice(source), " at (0,0);");
                assert!(matches!(site.tail_items[..], [PositionItem::At(_)]));
                assert_eq!(site.style.map(|list| list.entries.len()), Some(1));
            }
            other => panic!("expected unparsed, got {other:?}"),
        }
        let diagnostics = collector.finish();
        assert_eq!(diagnostics[0].code(), Some(DiagnosticCode::W003));
    }

    #[test]
    fn test_extract_missing_name_is_skipped() {
        let source = "\\node[api] at (0,0) {X};";
        let mut collector = DiagnosticCollector::new();
        assert!(matches!(extract(source, 0, &mut collector), Extracted::Skipped));
        assert_eq!(collector.finish()[0].code(), Some(DiagnosticCode::W002));
    }

    #[test]
    fn test_relative_in_style_clause() {
        let source = r"\node[service, below=of k8s, xshift=-2.5cm] (llama) {Llama};";
        let mut collector = DiagnosticCollector::new();
        let node = build_node(source, complete(source), &mut collector);
        let relative = node.position.relative.expect("relative placement");
        assert_eq!(relative.direction(), Direction::Below);
        assert_eq!(relative.reference(), "k8s");
        assert_eq!(node.position.xshift, Some(-2.5));
        assert_eq!(node.position.yshift, None);
        assert!(node.position.at.is_none());
        assert!(collector.is_empty());
    }

    #[test]
    fn test_relative_in_position_clause() {
        let source = r"\node[service] (b) right=of a {B};";
        let mut collector = DiagnosticCollector::new();
        let node = build_node(source, complete(source), &mut collector);
        let relative = node.position.relative.expect("relative placement");
        assert_eq!(relative.direction(), Direction::Right);
        assert_eq!(relative.reference(), "a");
    }

    #[test]
    fn test_loose_reference_when_strict_fails() {
        let source = r"\node[service, Below = of K8S] (x) {X};";
        let mut collector = DiagnosticCollector::new();
        let node = build_node(source, complete(source), &mut collector);
        assert!(node.position.relative.is_none());
        assert_eq!(
            node.position.loose,
            Some(LooseReference {
                direction: Direction::Below,
                name: "K8S".to_string(),
            })
        );
    }

    #[test]
    fn test_unreadable_coordinate_warns() {
        let source = r"\node (p) at (30:2cm) {P};";
        let mut collector = DiagnosticCollector::new();
        let node = build_node(source, complete(source), &mut collector);
        assert!(node.position.at.is_none());
        assert_eq!(collector.finish()[0].code(), Some(DiagnosticCode::W101));
    }

    #[test]
    fn test_second_option_list_after_name() {
        let source = r"\node (b) [above=of a, draw] {B};";
        let mut collector = DiagnosticCollector::new();
        let node = build_node(source, complete(source), &mut collector);
        assert!(node.position.relative.is_some());
        assert!(matches!(node.spans.position_items[0], PositionItem::Options(_)));
    }

    #[test]
    fn test_group_from_style_fit() {
        let source = r"\node[fill=blue!10, fit=(api) (db.south), inner sep=0.5cm] (backend) {Backend};";
        let group = build_group(source, &complete(source)).expect("group");
        assert_eq!(group.name, "backend");
        assert_eq!(group.members, vec![Id::new("api"), Id::new("db")]);
        assert_eq!(group.padding, Some(0.5));
        assert_eq!(group.hints.fill.as_deref(), Some("blue!10"));
        assert_eq!(group.membership.slice(source), "fit=(api) (db.south)");
        assert_eq!(group.text, "Backend");
    }

    #[test]
    fn test_group_from_position_fit() {
        let source = r"\node[draw] (g) fit=(a) (b) {};";
        let spans = complete(source);
        assert!(has_fit(&spans));
        let group = build_group(source, &spans).expect("group");
        assert_eq!(group.members, vec![Id::new("a"), Id::new("b")]);
        assert_eq!(group.padding, None);
        assert_eq!(group.membership.slice(source), "fit=(a) (b)");
    }

    #[test]
    fn test_label_start_skips_option_lists() {
        let source = "(x) [label={t}] {real}";
        assert_eq!(label_start(source, 3), Some(16));
    }
}
