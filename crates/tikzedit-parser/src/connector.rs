//! `\draw` statements between named nodes.

use log::trace;

use tikzedit_core::{identifier::Id, model::ConnectorStyle};

use crate::{
    records::ConnectorRecord,
    scan::{find_unescaped, matching_close, skip_whitespace},
    span::Span,
};

pub(crate) const DRAW_MARKER: &str = "\\draw";

/// Path operators that connect two endpoints.
const PATH_OPERATORS: [&str; 3] = ["--", "-|", "|-"];

/// Strips an anchor suffix: `k8s.north east` -> `k8s`.
pub(crate) fn strip_anchor(endpoint: &str) -> &str {
    endpoint
        .split_once('.')
        .map_or(endpoint, |(name, _)| name)
        .trim()
}

/// An endpoint names a node unless it is a literal coordinate.
fn endpoint_name(raw: &str) -> Option<&str> {
    let name = strip_anchor(raw);
    let literal = name.is_empty() || raw.contains(',') || raw.contains(':') || raw.contains('$');
    (!literal).then_some(name)
}

/// Reads the `\draw` statement starting at `start`.
///
/// Every `(a) -- (b)` segment between two named endpoints becomes one
/// connector; a literal coordinate endpoint breaks the chain.
pub(crate) fn extract(source: &str, start: usize) -> Vec<ConnectorRecord> {
    let bytes = source.as_bytes();
    let mut idx = skip_whitespace(source, start + DRAW_MARKER.len());

    let mut raw_style = "";
    if bytes.get(idx) == Some(&b'[') {
        let Some(close) = matching_close(source, idx, b'[', b']') else {
            return Vec::new();
        };
        raw_style = source[idx + 1..close].trim();
        idx = skip_whitespace(source, close + 1);
    }
    let style = ConnectorStyle::from_style(raw_style);

    let mut endpoints: Vec<Option<Id>> = Vec::new();
    loop {
        if bytes.get(idx) != Some(&b'(') {
            break;
        }
        let Some(close) = find_unescaped(source, idx, b')') else {
            break;
        };
        endpoints.push(endpoint_name(&source[idx + 1..close]).map(Id::new));
        idx = skip_whitespace(source, close + 1);

        let Some(op) = PATH_OPERATORS
            .iter()
            .find(|op| source[idx..].starts_with(*op))
        else {
            break;
        };
        idx = skip_whitespace(source, idx + op.len());
    }

    let end = find_unescaped(source, idx, b';').map_or(idx, |semi| semi + 1);
    let span = Span::new(start..end);

    let connectors: Vec<_> = endpoints
        .windows(2)
        .filter_map(|pair| match pair {
            [Some(source_id), Some(target_id)] => Some(ConnectorRecord {
                source: *source_id,
                target: *target_id,
                style,
                raw_style: raw_style.to_string(),
                span,
            }),
            _ => None,
        })
        .collect();
    trace!(count = connectors.len(), span:% = span; "Read draw statement");
    connectors
}
