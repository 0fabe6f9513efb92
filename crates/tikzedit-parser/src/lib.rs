//! # tikzedit parser
//!
//! Tolerant reader for the subset of TikZ that tikzedit understands: `\node`
//! declarations with styles, positions and labels, `\draw` connectors between
//! named nodes, and `fit=` groups on the background layer.
//!
//! Parsing never fails. Declarations that cannot be read are skipped (or kept
//! as unparsed sites when their name is known) and reported as warning
//! diagnostics on the returned document.
//!
//! ## Usage
//!
//! ```
//! # use tikzedit_parser::parse;
//! let source = r"
//!     \node[service] (a) at (0,0) {A};
//!     \node[service, right=of a] (b) {B};
//!     \draw[arrow] (a) -- (b);
//! ";
//!
//! let document = parse(source);
//! assert_eq!(document.nodes.len(), 2);
//! assert_eq!(document.connectors.len(), 1);
//! assert!(document.diagnostics.is_empty());
//! ```

mod connector;
pub mod error;
mod node;
pub mod options;
mod position;
pub mod records;
mod scan;
mod span;
mod text;

pub use options::{OptionEntry, OptionKind, OptionList};
pub use records::{
    ConnectorRecord, GroupRecord, NodeRecord, NodeSpans, ParsedDocument, PositionItem,
    UnparsedNode,
};
pub use span::Span;
pub use text::clean_label;

use indexmap::map::Entry;
use log::{debug, info};

use error::{Diagnostic, DiagnosticCode, DiagnosticCollector};
use node::{Extracted, NODE_MARKER};
use scan::{Comments, find_markers, in_background};

/// Reads a whole document.
///
/// The pipeline runs in three steps:
///
/// 1. **Scan** - locate comments and background scopes
/// 2. **Declarations** - read every `\node` outside a comment; fit nodes on the
///    background layer become groups, everything else becomes a node record
/// 3. **Connectors** - read every `\draw` outside a comment
///
/// Records keep declaration order. The first declaration of a name is the one
/// the model uses; later ones are kept in [`ParsedDocument::shadowed`].
pub fn parse(source: &str) -> ParsedDocument {
    let mut collector = DiagnosticCollector::new();
    let mut document = ParsedDocument::default();

    // Step 1: Scan
    let comments = Comments::scan(source);
    let scopes = scan::scopes(source, &comments, &mut collector);

    // Step 2: Declarations
    for start in find_markers(source, NODE_MARKER, &comments) {
        let spans = match node::extract(source, start, &mut collector) {
            Extracted::Complete(spans) => node::scan_clauses(source, spans),
            Extracted::Unparsed(site) => {
                debug!(node = site.name.as_str(); "Kept unparsed node site");
                document.unparsed.push(site);
                continue;
            }
            Extracted::Skipped => continue,
        };

        if node::has_fit(&spans) {
            if !in_background(&scopes, start) {
                collector.emit(
                    Diagnostic::warning(format!(
                        "fit node `{}` is not on the background layer",
                        spans.name.slice(source)
                    ))
                    .with_code(DiagnosticCode::W006)
                    .with_label(spans.declaration, "ignored")
                    .with_help("move it into a `\\begin{scope}[on background layer]`"),
                );
                continue;
            }
            if let Some(group) = node::build_group(source, &spans) {
                debug!(group:% = group.name, members = group.members.len(); "Read group");
                document.groups.entry(group.name).or_insert(group);
            }
            continue;
        }

        let record = node::build_node(source, spans, &mut collector);
        match document.nodes.entry(record.name) {
            Entry::Occupied(first) => {
                collector.emit(
                    Diagnostic::note(format!("node `{}` is declared more than once", record.name))
                        .with_code(DiagnosticCode::W005)
                        .with_label(record.spans.declaration, "this declaration is ignored")
                        .with_secondary_label(first.get().spans.declaration, "first declared here")
                        .with_help("it is still rewritten on export"),
                );
                document.shadowed.push(record);
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }

    // Step 3: Connectors
    for start in find_markers(source, connector::DRAW_MARKER, &comments) {
        document
            .connectors
            .extend(connector::extract(source, start));
    }

    document.diagnostics = collector.finish();
    info!(
        nodes = document.nodes.len(),
        shadowed = document.shadowed.len(),
        unparsed = document.unparsed.len(),
        connectors = document.connectors.len(),
        groups = document.groups.len(),
        diagnostics = document.diagnostics.len();
        "Parsed document"
    );
    document
}
