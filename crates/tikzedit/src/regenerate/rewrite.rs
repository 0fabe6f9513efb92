//! Round-trip rewriting of the original source.
//!
//! Only position-bearing fragments are touched. Every edit replaces one byte
//! range of the source; everything outside those ranges is copied verbatim.

use indexmap::IndexMap;
use log::{debug, trace};

use tikzedit_core::{geometry::Point, identifier::Id};
use tikzedit_parser::{NodeRecord, OptionKind, OptionList, PositionItem, Span, UnparsedNode};

use crate::model::Model;

use super::Format;

/// One replacement of a source range.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    span: Span,
    text: String,
}

/// Collected edits for one source text.
#[derive(Debug, Default)]
struct Edits {
    edits: Vec<Edit>,
}

impl Edits {
    fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.edits.push(Edit {
            span,
            text: text.into(),
        });
    }

    /// Applies every edit in source order. An edit overlapping an earlier
    /// one is dropped.
    fn apply(mut self, source: &str) -> String {
        self.edits.sort_by_key(|edit| edit.span.start());

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for edit in self.edits {
            if edit.span.start() < cursor {
                trace!(span:% = edit.span; "Dropped overlapping edit");
                continue;
            }
            out.push_str(&source[cursor..edit.span.start()]);
            out.push_str(&edit.text);
            cursor = edit.span.end();
        }
        out.push_str(&source[cursor..]);
        out
    }
}

/// Rewrites `model.source()` with the positions in `positions` (document
/// space).
pub(crate) fn rewrite(model: &Model, positions: &IndexMap<Id, Point>, format: Format) -> String {
    let source = model.source();
    let document = model.document();
    let mut edits = Edits::default();

    let declarations = document.nodes.values().chain(&document.shadowed);
    for record in declarations {
        if let Some(position) = positions.get(&record.name) {
            rewrite_node(source, record, format.at(*position), &mut edits);
        }
    }

    let starts = declaration_starts(model);
    for site in &document.unparsed {
        let position = fuzzy_position(&site.name, positions)
            .unwrap_or_else(|| model.config().export().default_coordinate());
        rewrite_unparsed(source, site, &starts, format.at(position), &mut edits);
    }

    for group in model.groups().values() {
        let Some(record) = document.groups.get(&group.name()) else {
            continue;
        };
        if group.members().is_empty() || group.members() == record.members.as_slice() {
            continue;
        }
        let members: Vec<String> = group.members().iter().map(|m| format!("({m})")).collect();
        debug!(group:% = group.name(), members = members.len(); "Rewrote group membership");
        edits.replace(record.membership, format!("fit={}", members.join(" ")));
    }

    edits.apply(source)
}

fn is_position_entry(kind: OptionKind) -> bool {
    matches!(kind, OptionKind::Relative | OptionKind::Shift)
}

/// `list` without relative and shift entries, brackets included; empty when
/// nothing is left.
fn clean_list(source: &str, list: &OptionList) -> String {
    let kept = list.rebuild(source, |entry| !is_position_entry(entry.kind));
    if kept.is_empty() {
        String::new()
    } else {
        format!("[{kept}]")
    }
}

/// The text of `clause` with every position item removed, as trimmed
/// pieces joined by single spaces.
fn remainder(source: &str, clause: Span, items: &[PositionItem]) -> String {
    let mut pieces: Vec<String> = Vec::new();
    let mut push = |text: &str| {
        let text = text.trim();
        if !text.is_empty() {
            pieces.push(text.to_string());
        }
    };

    let mut cursor = clause.start();
    for item in items {
        let span = item.span();
        if span.start() < cursor || span.end() > clause.end() {
            continue;
        }
        push(&source[cursor..span.start()]);
        match item {
            PositionItem::At(_) | PositionItem::Relative(_) | PositionItem::Shift(_) => {}
            PositionItem::Fit(_) | PositionItem::InnerSep(_) => push(span.slice(source)),
            PositionItem::Options(list) => push(&clean_list(source, list)),
        }
        cursor = span.end();
    }
    push(&source[cursor..clause.end()]);
    pieces.join(" ")
}

fn rewrite_node(source: &str, record: &NodeRecord, at: String, edits: &mut Edits) {
    let spans = &record.spans;

    if let Some(style) = spans
        .style
        .as_ref()
        .filter(|list| list.entries.iter().any(|entry| is_position_entry(entry.kind)))
    {
        let kept = style.rebuild(source, |entry| !is_position_entry(entry.kind));
        if kept.is_empty() {
            // Brackets go too.
            edits.replace(Span::new(style.span.start() - 1..style.span.end() + 1), "");
        } else {
            edits.replace(style.span, kept);
        }
    }

    let rest = remainder(source, spans.position, &spans.position_items);
    let text = if rest.is_empty() {
        format!(" {at} ")
    } else {
        format!(" {at} {rest} ")
    };
    edits.replace(spans.position, text);
}

/// Start offsets of every node declaration and unparsed site, sorted.
fn declaration_starts(model: &Model) -> Vec<usize> {
    let document = model.document();
    let mut starts: Vec<usize> = document
        .nodes
        .values()
        .chain(&document.shadowed)
        .map(|record| record.spans.declaration.start())
        .chain(document.unparsed.iter().map(|site| site.span.start()))
        .chain(document.groups.values().map(|group| group.declaration.start()))
        .collect();
    starts.sort_unstable();
    starts
}

fn rewrite_unparsed(source: &str, site: &UnparsedNode, starts: &[usize], at: String, edits: &mut Edits) {
    // The site runs to the end of its line; stop at the next declaration on
    // that line.
    let end = starts
        .iter()
        .copied()
        .find(|&start| start > site.span.start() && start < site.span.end())
        .unwrap_or(site.span.end());
    let tail = Span::new(site.name_end.min(end)..end);
    trace!(node = site.name.as_str(), tail:% = tail; "Rewriting unparsed site");

    let style = site
        .style
        .as_ref()
        .map(|list| clean_list(source, list))
        .unwrap_or_default();
    let rest = remainder(source, tail, &site.tail_items);

    let mut text = format!("\\node{style} ({}) {at}", site.name);
    if !rest.is_empty() {
        if !rest.starts_with(';') {
            text.push(' ');
        }
        text.push_str(&rest);
    }
    if !text.trim_end().ends_with(';') {
        text.push(';');
    }
    // Keep the separator to the next declaration on the same line.
    if end < site.span.end() {
        text.push(' ');
    }
    edits.replace(Span::new(site.span.start()..end), text);
}

/// Position of the node that best matches an unparsed site's name: equal
/// ignoring case first, then one name containing the other.
fn fuzzy_position(name: &str, positions: &IndexMap<Id, Point>) -> Option<Point> {
    let wanted = name.to_lowercase();
    let lowered: Vec<(String, Point)> = positions
        .iter()
        .map(|(id, point)| (id.to_string().to_lowercase(), *point))
        .collect();

    lowered
        .iter()
        .find(|(candidate, _)| *candidate == wanted)
        .or_else(|| {
            lowered
                .iter()
                .find(|(candidate, _)| candidate.contains(&wanted) || wanted.contains(candidate.as_str()))
        })
        .map(|(_, point)| *point)
}
