//! Group bounding boxes.
//!
//! A group's box and its member list can each be derived from the other.
//! Moving a node recomputes the box from the members ([`fit_bounds`]);
//! resizing or moving a group recomputes the members from the box
//! ([`members_within`]). No edit triggers both.

use indexmap::IndexMap;

use tikzedit_core::{
    geometry::{Bounds, Insets},
    identifier::Id,
};
use tikzedit_parser::{
    GroupRecord,
    error::{Diagnostic, DiagnosticCode},
};

use crate::model::Node;

/// Smallest box containing every placed member's box, expanded by
/// `padding` (canvas units) on all sides.
///
/// Members that name no placed node are skipped; `None` when no member is
/// placed.
pub fn fit_bounds(members: &[Id], nodes: &IndexMap<Id, Node>, padding: f32) -> Option<Bounds> {
    members
        .iter()
        .filter_map(|member| nodes.get(member))
        .map(Node::bounds)
        .reduce(|acc, bounds| acc.merge(&bounds))
        .map(|bounds| bounds.add_padding(Insets::uniform(padding)))
}

/// Nodes whose center lies inside `bounds`, edges included, in model order.
pub fn members_within(bounds: Bounds, nodes: &IndexMap<Id, Node>) -> Vec<Id> {
    nodes
        .values()
        .filter(|node| bounds.contains_point(node.position()))
        .map(Node::name)
        .collect()
}

/// Warnings for members of a freshly parsed group that name no placed node.
pub(crate) fn membership_diagnostics(
    record: &GroupRecord,
    nodes: &IndexMap<Id, Node>,
) -> Vec<Diagnostic> {
    let unknown: Vec<Id> = record
        .members
        .iter()
        .copied()
        .filter(|member| !nodes.contains_key(member))
        .collect();

    if unknown.len() == record.members.len() {
        return vec![
            Diagnostic::warning(format!("group `{}` has no placed member", record.name))
                .with_code(DiagnosticCode::W301)
                .with_label(record.membership, "no member names a node")
                .with_help("the group has no box until a node is added to it"),
        ];
    }

    unknown
        .into_iter()
        .map(|member| {
            Diagnostic::warning(format!(
                "member `{member}` of group `{}` is not a node",
                record.name
            ))
            .with_code(DiagnosticCode::W302)
            .with_label(record.membership, "listed here")
        })
        .collect()
}
