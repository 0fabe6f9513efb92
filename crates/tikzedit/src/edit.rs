//! Edit commands.
//!
//! Every command is synchronous and touches exactly one recompute
//! direction: moving a node refits the groups it belongs to, while
//! resizing or moving a group recomputes that group's members.

use log::debug;

use tikzedit_core::{
    geometry::{Bounds, Point, Size, round_to},
    identifier::Id,
};

use crate::{TikzEditError, alignment::Aligner, model::Model};

fn node_id(model: &Model, name: &str) -> Result<Id, TikzEditError> {
    Id::lookup(name)
        .filter(|id| model.nodes().contains_key(id))
        .ok_or_else(|| TikzEditError::UnknownNode(name.to_string()))
}

fn group_id(model: &Model, name: &str) -> Result<Id, TikzEditError> {
    Id::lookup(name)
        .filter(|id| model.groups().contains_key(id))
        .ok_or_else(|| TikzEditError::UnknownGroup(name.to_string()))
}

/// Moves a node's center to `target` (canvas space).
///
/// In grid-snap mode the target is snapped against every other node first.
/// Groups listing the node are refitted.
pub(crate) fn move_node(model: &mut Model, name: &str, target: Point) -> Result<(), TikzEditError> {
    let id = node_id(model, name)?;

    let position = if model.snap_to_grid() {
        let others: Vec<(Id, Point)> = model
            .nodes()
            .values()
            .map(|node| (node.name(), node.position()))
            .collect();
        Aligner::new(model.config().alignment()).snap(target, others, Some(id))
    } else {
        target
    };

    if let Some(node) = model.nodes_mut().get_mut(&id) {
        node.move_to(position);
    }

    let (nodes, groups) = model.parts_mut();
    let mut refitted = 0;
    for group in groups.values_mut().filter(|g| g.members().contains(&id)) {
        group.fit_to_members(nodes);
        refitted += 1;
    }
    debug!(node = name, position:?, refitted; "Moved node");
    Ok(())
}

/// Replaces a group's box and recomputes its members from it.
///
/// The box keeps at least the configured minimum extent. In grid-snap mode
/// its center and dimensions are rounded to the grid.
pub(crate) fn resize_group(model: &mut Model, name: &str, bounds: Bounds) -> Result<(), TikzEditError> {
    let id = group_id(model, name)?;
    let bounds = normalize(model, bounds);

    let (nodes, groups) = model.parts_mut();
    if let Some(group) = groups.get_mut(&id) {
        group.set_bounds(bounds, nodes);
        debug!(group = name, members = group.members().len(); "Resized group");
    }
    Ok(())
}

/// Translates a group's box by `offset` and recomputes its members. Member
/// nodes stay where they are.
///
/// A group without a box is left unchanged.
pub(crate) fn move_group(model: &mut Model, name: &str, offset: Point) -> Result<(), TikzEditError> {
    let id = group_id(model, name)?;
    let Some(current) = model.groups().get(&id).and_then(|group| group.bounds()) else {
        debug!(group = name; "Group has no box to move");
        return Ok(());
    };
    let bounds = normalize(model, current.translate(offset));

    let (nodes, groups) = model.parts_mut();
    if let Some(group) = groups.get_mut(&id) {
        group.set_bounds(bounds, nodes);
        debug!(group = name, members = group.members().len(); "Moved group");
    }
    Ok(())
}

fn normalize(model: &Model, bounds: Bounds) -> Bounds {
    let min_extent = model.config().groups().min_extent();
    let mut center = bounds.center();
    let mut size = bounds.to_size();
    if model.snap_to_grid() {
        let grid = model.config().alignment().grid_size();
        center = center.round_to(grid);
        size = Size::new(round_to(size.width(), grid), round_to(size.height(), grid));
    }
    Bounds::new_from_center(center, size.at_least(min_extent))
}
