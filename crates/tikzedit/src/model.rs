//! The editable document model.
//!
//! A [`Model`] owns one document: the source text it was read from, the
//! parsed records, and the resolved geometry (canvas space) that edits
//! mutate. It holds no viewport state.

use indexmap::IndexMap;
use log::{debug, info};

use tikzedit_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
    model::{ConnectorStyle, GroupStyle, ShapeKind},
};
use tikzedit_parser::{ParsedDocument, error::Diagnostic};

use crate::{config::AppConfig, group, resolve::Resolver};

/// How a node got its current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Written as `at (x,y)`
    Absolute,
    /// Offset from a placed reference node
    Relative,
    /// Offset from a reference found by tolerant matching
    LooseMatch,
    /// Next to the source of a connector pointing at it
    Connector,
    /// On the fallback grid
    Grid,
    /// Moved by an edit command
    Edited,
}

impl Placement {
    /// True for placements made by a fallback tier.
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::LooseMatch | Self::Connector | Self::Grid)
    }
}

/// A placed node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: Id,
    shape: ShapeKind,
    size: Size,
    position: Point,
    placement: Placement,
    text: String,
}

impl Node {
    pub(crate) fn new(
        name: Id,
        shape: ShapeKind,
        size: Size,
        position: Point,
        placement: Placement,
        text: String,
    ) -> Self {
        Self {
            name,
            shape,
            size,
            position,
            placement,
            text,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Center of the node in canvas space.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Cleaned display text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The node's box in canvas space.
    pub fn bounds(&self) -> Bounds {
        self.position.to_bounds(self.size)
    }

    pub(crate) fn move_to(&mut self, position: Point) {
        self.position = position;
        self.placement = Placement::Edited;
    }
}

/// A background group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    name: Id,
    members: Vec<Id>,
    /// Padding in canvas units
    padding: f32,
    bounds: Option<Bounds>,
    hints: GroupStyle,
    text: String,
}

impl Group {
    pub fn name(&self) -> Id {
        self.name
    }

    /// Current members in order.
    pub fn members(&self) -> &[Id] {
        &self.members
    }

    /// Padding around the members' boxes, in canvas units.
    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// The group's box; `None` until some member is placed.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn hints(&self) -> &GroupStyle {
        &self.hints
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Recomputes the box from the current members.
    pub(crate) fn fit_to_members(&mut self, nodes: &IndexMap<Id, Node>) {
        self.bounds = group::fit_bounds(&self.members, nodes, self.padding);
    }

    /// Sets the box and recomputes the members from it.
    pub(crate) fn set_bounds(&mut self, bounds: Bounds, nodes: &IndexMap<Id, Node>) {
        self.bounds = Some(bounds);
        self.members = group::members_within(bounds, nodes);
    }
}

/// A connector between two placed nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub source: Id,
    pub target: Id,
    pub style: ConnectorStyle,
}

/// One open document.
#[derive(Debug, Clone)]
pub struct Model {
    config: AppConfig,
    source: String,
    document: ParsedDocument,
    nodes: IndexMap<Id, Node>,
    groups: IndexMap<Id, Group>,
    connectors: Vec<Connector>,
    diagnostics: Vec<Diagnostic>,
    snap_to_grid: bool,
}

impl Model {
    /// Parses and resolves `source`.
    pub(crate) fn build(source: &str, config: AppConfig) -> Self {
        let document = tikzedit_parser::parse(source);
        let resolution = Resolver::new(&config).resolve(&document.nodes, &document.connectors);

        let nodes: IndexMap<Id, Node> = document
            .nodes
            .values()
            .filter_map(|record| {
                let (position, placement) = resolution.placement(record.name)?;
                Some((
                    record.name,
                    Node::new(
                        record.name,
                        record.shape,
                        record.size,
                        position,
                        placement,
                        record.text.clone(),
                    ),
                ))
            })
            .collect();

        let mut diagnostics = document.diagnostics.clone();
        diagnostics.extend(resolution.diagnostics);

        let connectors = document
            .connectors
            .iter()
            .filter(|c| nodes.contains_key(&c.source) && nodes.contains_key(&c.target))
            .map(|c| Connector {
                source: c.source,
                target: c.target,
                style: c.style,
            })
            .collect();

        let default_padding = config.groups().default_padding();
        let groups = document
            .groups
            .values()
            .map(|record| {
                let padding_cm = record.padding.unwrap_or(default_padding);
                let mut group = Group {
                    name: record.name,
                    members: record.members.clone(),
                    padding: config.units().length_to_canvas(padding_cm),
                    bounds: None,
                    hints: record.hints.clone(),
                    text: record.text.clone(),
                };
                group.fit_to_members(&nodes);
                diagnostics.extend(group::membership_diagnostics(record, &nodes));
                (record.name, group)
            })
            .collect();

        info!(
            nodes = nodes.len(),
            groups = document.groups.len(),
            diagnostics = diagnostics.len();
            "Built document model"
        );

        Self {
            config,
            source: source.to_string(),
            document,
            nodes,
            groups,
            connectors,
            diagnostics,
            snap_to_grid: false,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The text the model was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Everything the parser read from [`Self::source`].
    pub fn document(&self) -> &ParsedDocument {
        &self.document
    }

    /// Placed nodes in declaration order.
    pub fn nodes(&self) -> &IndexMap<Id, Node> {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        Id::lookup(name).and_then(|id| self.nodes.get(&id))
    }

    pub fn groups(&self) -> &IndexMap<Id, Group> {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        Id::lookup(name).and_then(|id| self.groups.get(&id))
    }

    /// Connectors whose endpoints are both placed.
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Every anomaly absorbed while parsing and resolving.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn snap_to_grid(&self) -> bool {
        self.snap_to_grid
    }

    /// Turns grid-snap editing on or off.
    ///
    /// In grid-snap mode moved nodes and resized groups are snapped, and
    /// export writes grid-aligned coordinates with reduced precision.
    pub fn set_snap_to_grid(&mut self, snap: bool) {
        debug!(snap; "Grid snap mode changed");
        self.snap_to_grid = snap;
    }

    /// Drops the source text, so the next regeneration synthesizes a fresh
    /// document from the geometry alone.
    pub fn without_source(mut self) -> Self {
        self.source.clear();
        self
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut IndexMap<Id, Node> {
        &mut self.nodes
    }

    /// Node and group maps borrowed together, for edits that touch both.
    pub(crate) fn parts_mut(&mut self) -> (&IndexMap<Id, Node>, &mut IndexMap<Id, Group>) {
        (&self.nodes, &mut self.groups)
    }
}
