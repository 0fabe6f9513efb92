//! Option lists: the comma separated `[...]` clauses of a declaration.

use tikzedit_core::model::GroupStyle;

use crate::{
    position::{fit_option, inner_sep_option, parse_complete, relative_option, shift_option},
    span::Span,
};

/// What an option entry means for positioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// `above=of x` and friends
    Relative,
    /// `xshift=` / `yshift=`
    Shift,
    /// `fit=...`
    Fit,
    /// `inner sep=`
    InnerSep,
    /// Anything else; always preserved on export.
    Other,
}

/// One entry of an option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionEntry {
    /// Trimmed entry text, in absolute source offsets
    pub span: Span,
    pub kind: OptionKind,
}

/// A bracketed option list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionList {
    /// Text between the brackets, in absolute source offsets
    pub span: Span,
    pub entries: Vec<OptionEntry>,
}

impl OptionList {
    /// Splits the bracket content `inner` at top-level commas and classifies
    /// every entry.
    ///
    /// Commas nested in `()`, `{}` or `[]` do not split, so
    /// `fit=(a, b)` and `fill={rgb,255:red,1}` stay single entries.
    pub(crate) fn scan(source: &str, inner: Span) -> Self {
        let text = inner.slice(source);
        let mut entries = Vec::new();
        let mut depth = 0i32;
        let mut entry_start = 0;
        for (idx, c) in text.char_indices() {
            match c {
                '(' | '{' | '[' => depth += 1,
                ')' | '}' | ']' => depth -= 1,
                ',' if depth <= 0 => {
                    push_entry(text, entry_start..idx, inner.start(), &mut entries);
                    entry_start = idx + 1;
                }
                _ => {}
            }
        }
        push_entry(text, entry_start..text.len(), inner.start(), &mut entries);
        Self {
            span: inner,
            entries,
        }
    }

    /// Entries of the given kind.
    pub fn of_kind(&self, kind: OptionKind) -> impl Iterator<Item = &OptionEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    /// Rebuilds the list text keeping only entries accepted by `keep`.
    ///
    /// Entries are joined with `", "`.
    pub fn rebuild(&self, source: &str, mut keep: impl FnMut(&OptionEntry) -> bool) -> String {
        self.entries
            .iter()
            .filter(|entry| keep(entry))
            .map(|entry| entry.span.slice(source))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Reads group presentation hints from the entries.
    pub fn group_style(&self, source: &str) -> GroupStyle {
        let mut style = GroupStyle::default();
        for entry in self.of_kind(OptionKind::Other) {
            let text = entry.span.slice(source);
            let (key, value) = match text.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (text.trim(), None),
            };
            match (key, value) {
                ("fill", Some(value)) => style.fill = Some(value.to_string()),
                ("draw", value) => style.draw = Some(value.unwrap_or_default().to_string()),
                ("rounded corners", _) => style.rounded_corners = true,
                ("dashed", None) => style.dashed = true,
                _ => {}
            }
        }
        style
    }
}

fn push_entry(text: &str, range: std::ops::Range<usize>, base: usize, entries: &mut Vec<OptionEntry>) {
    let raw = &text[range.clone()];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = raw.len() - raw.trim_start().len();
    let start = base + range.start + lead;
    entries.push(OptionEntry {
        span: Span::new(start..start + trimmed.len()),
        kind: classify(trimmed),
    });
}

fn classify(entry: &str) -> OptionKind {
    if parse_complete(entry, relative_option).is_some() {
        OptionKind::Relative
    } else if parse_complete(entry, shift_option).is_some() {
        OptionKind::Shift
    } else if parse_complete(entry, fit_option).is_some() {
        OptionKind::Fit
    } else if parse_complete(entry, inner_sep_option).is_some() {
        OptionKind::InnerSep
    } else {
        OptionKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(source: &str) -> OptionList {
        OptionList::scan(source, Span::new(0..source.len()))
    }

    fn texts<'a>(source: &'a str, list: &OptionList) -> Vec<&'a str> {
        list.entries.iter().map(|e| e.span.slice(source)).collect()
    }

    #[test]
    fn test_split_respects_nesting() {
        let source = "cloud, fit=(a, b), fill={rgb,255:red,1} , below=of k8s";
        let list = scan_all(source);
        assert_eq!(
            texts(source, &list),
            ["cloud", "fit=(a, b)", "fill={rgb,255:red,1}", "below=of k8s"]
        );
    }

    #[test]
    fn test_classification() {
        let source = "service, below=of k8s, xshift=-2.5cm, inner sep=0.5cm, fit=(x)";
        let list = scan_all(source);
        let kinds: Vec<_> = list.entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [
                OptionKind::Other,
                OptionKind::Relative,
                OptionKind::Shift,
                OptionKind::InnerSep,
                OptionKind::Fit,
            ]
        );
    }

    #[test]
    fn test_empty_entries_skipped() {
        let source = " , cloud,, ";
        let list = scan_all(source);
        assert_eq!(texts(source, &list), ["cloud"]);
    }

    #[test]
    fn test_spans_are_absolute() {
        let source = "\\node[cloud, above=of gcp] (x) {};";
        let list = OptionList::scan(source, Span::new(6..25));
        assert_eq!(texts(source, &list), ["cloud", "above=of gcp"]);
    }

    #[test]
    fn test_rebuild_drops_positioning() {
        let source = "cloud, above=of gcp, yshift=0.5cm, drop shadow";
        let list = scan_all(source);
        let rebuilt = list.rebuild(source, |e| e.kind == OptionKind::Other);
        assert_eq!(rebuilt, "cloud, drop shadow");
    }

    #[test]
    fn test_group_style_hints() {
        let source = "fill=blue!10, draw=blue!50, rounded corners, dashed, inner sep=0.4cm";
        let style = scan_all(source).group_style(source);
        assert_eq!(style.fill.as_deref(), Some("blue!10"));
        assert_eq!(style.draw.as_deref(), Some("blue!50"));
        assert!(style.rounded_corners);
        assert!(style.dashed);
    }
}
