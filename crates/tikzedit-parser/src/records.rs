//! Records produced by the parser.
//!
//! Every record keeps the spans of its clauses so the regenerator can rewrite
//! a declaration in place without re-reading the source.

use indexmap::IndexMap;

use tikzedit_core::{
    geometry::Size,
    identifier::Id,
    model::{ConnectorStyle, GroupStyle, PositionSpec, ShapeKind},
};

use crate::{error::Diagnostic, options::OptionList, span::Span};

/// A position-related item found between a node's name and its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionItem {
    /// `at (x,y)`
    At(Span),
    /// `above=of x` written outside brackets
    Relative(Span),
    /// `xshift=` / `yshift=` written outside brackets
    Shift(Span),
    /// `fit=...` written outside brackets
    Fit(Span),
    /// `inner sep=` written outside brackets
    InnerSep(Span),
    /// A second `[...]` option list after the name
    Options(OptionList),
}

impl PositionItem {
    /// Source range of the whole item (brackets included for option lists).
    pub fn span(&self) -> Span {
        match self {
            Self::At(span)
            | Self::Relative(span)
            | Self::Shift(span)
            | Self::Fit(span)
            | Self::InnerSep(span) => *span,
            Self::Options(list) => Span::new(list.span.start() - 1..list.span.end() + 1),
        }
    }
}

/// Source layout of a node declaration.
///
/// ```text
/// \node[cloud, above=of gcp] (openai) at (0,1) {OpenAI\\GPT-4};
/// ^---- declaration ---------------------------------------------^
///       ^-- style ---------^  ^name^ ^position^ ^-- label ----^ ^ terminator
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpans {
    pub declaration: Span,
    /// The `[...]` list right after the marker, if present
    pub style: Option<OptionList>,
    /// Name text without the parentheses
    pub name: Span,
    /// Offset just past the name's closing parenthesis
    pub name_end: usize,
    /// Everything between the name and the label's opening brace
    pub position: Span,
    pub position_items: Vec<PositionItem>,
    /// Label text without the braces
    pub label: Span,
    pub terminator: Option<Span>,
}

/// A `\node` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub name: Id,
    /// Raw style clause text (empty when there is none)
    pub style: String,
    pub shape: ShapeKind,
    pub position: PositionSpec,
    /// Display text after label cleaning
    pub text: String,
    /// The label as written
    pub raw_label: String,
    pub size: Size,
    pub spans: NodeSpans,
}

/// A `\node` marker whose declaration could not be read completely but whose
/// name is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsedNode {
    pub name: String,
    /// The marker through the end of its line
    pub span: Span,
    /// The `[...]` list right after the marker, if it was readable
    pub style: Option<OptionList>,
    /// Offset just past the name's closing parenthesis
    pub name_end: usize,
    /// Position items between the name and the end of [`Self::span`]
    pub tail_items: Vec<PositionItem>,
}

impl UnparsedNode {
    /// Everything after the name, through the end of [`Self::span`].
    pub fn tail(&self) -> Span {
        Span::new(self.name_end..self.span.end())
    }
}

/// One segment of a `\draw` path between two named nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorRecord {
    pub source: Id,
    pub target: Id,
    pub style: ConnectorStyle,
    pub raw_style: String,
    /// The whole `\draw` statement
    pub span: Span,
}

/// A fit node on the background layer.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRecord {
    pub name: Id,
    pub style: String,
    pub hints: GroupStyle,
    pub members: Vec<Id>,
    /// `inner sep=` in centimetres, if written
    pub padding: Option<f32>,
    pub text: String,
    /// The `fit=...` entry
    pub membership: Span,
    pub declaration: Span,
}

/// Everything read from a source document.
///
/// `nodes` and `groups` are keyed by name in declaration order; the first
/// declaration of a name wins and later ones land in `shadowed`.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub nodes: IndexMap<Id, NodeRecord>,
    pub shadowed: Vec<NodeRecord>,
    pub unparsed: Vec<UnparsedNode>,
    pub connectors: Vec<ConnectorRecord>,
    pub groups: IndexMap<Id, GroupRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedDocument {
    /// Looks up a node by name.
    pub fn node(&self, name: &str) -> Option<&NodeRecord> {
        Id::lookup(name).and_then(|id| self.nodes.get(&id))
    }

    /// Looks up a group by name.
    pub fn group(&self, name: &str) -> Option<&GroupRecord> {
        Id::lookup(name).and_then(|id| self.groups.get(&id))
    }
}
