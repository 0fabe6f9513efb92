//! Position resolution.
//!
//! Turns the position constraints of every node record into a canvas
//! coordinate. Resolution always places every node:
//!
//! 1. **Seed** - nodes with only an `at (x,y)` are converted directly.
//! 2. **Fixed point** - relative nodes whose reference is placed follow it.
//!    Each pass reads the placements as they were when the pass started, so
//!    the outcome does not depend on declaration order.
//! 3. **Loose matching** - the reference is looked up ignoring case and
//!    anchors; the result is snapped.
//! 4. **Connector inference** - a node is put next to the source of a
//!    connector pointing at it; the result is snapped.
//! 5. **Grid** - whatever is left goes onto a fixed grid in declaration
//!    order.
//!
//! Steps 3 and 4 alternate with step 2 for a bounded number of rounds.

use indexmap::IndexMap;
use log::{debug, info, trace};

use tikzedit_core::{
    geometry::Point,
    identifier::Id,
    model::{Direction, DirectionalDefaults},
    units::DocumentUnits,
};
use tikzedit_parser::{
    ConnectorRecord, NodeRecord,
    error::{Diagnostic, DiagnosticCode},
};

use crate::{
    alignment::Aligner,
    config::{AppConfig, LayoutConfig},
    model::Placement,
};

/// Outcome of [`Resolver::resolve`].
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Canvas position of every record, in declaration order.
    pub placements: IndexMap<Id, (Point, Placement)>,
    /// Fallback placements and dangling connectors.
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    pub fn placement(&self, name: Id) -> Option<(Point, Placement)> {
        self.placements.get(&name).copied()
    }

    pub fn position(&self, name: Id) -> Option<Point> {
        self.placement(name).map(|(position, _)| position)
    }
}

/// Places node records according to an [`AppConfig`].
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    units: &'a DocumentUnits,
    layout: &'a LayoutConfig,
    defaults: DirectionalDefaults,
    aligner: Aligner,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self {
            units: config.units(),
            layout: config.layout(),
            defaults: config.layout().directional_defaults(),
            aligner: Aligner::new(config.alignment()),
        }
    }

    /// Places every record.
    ///
    /// Never fails; every record in `records` has a placement in the
    /// result.
    pub fn resolve(
        &self,
        records: &IndexMap<Id, NodeRecord>,
        connectors: &[ConnectorRecord],
    ) -> Resolution {
        let mut resolution = Resolution::default();
        let placed = &mut resolution.placements;

        // Seed
        for record in records.values().filter(|r| r.position.is_absolute()) {
            if let Some(at) = record.position.at {
                placed.insert(record.name, (self.units.to_canvas(at), Placement::Absolute));
            }
        }
        debug!(seeded = placed.len(); "Seeded absolute nodes");

        self.fixed_point(records, placed);

        for round in 0..self.layout.fallback_passes() {
            if placed.len() == records.len() {
                break;
            }
            let before = placed.len();
            self.place_loose(records, placed, &mut resolution.diagnostics);
            self.place_from_connectors(records, connectors, placed, &mut resolution.diagnostics);
            if placed.len() == before {
                break;
            }
            trace!(round, placed = placed.len(); "Fallback round made progress");
            self.fixed_point(records, placed);
        }

        self.place_on_grid(records, placed, &mut resolution.diagnostics);

        // Keep declaration order regardless of placement order.
        placed.sort_by_cached_key(|name, _| records.get_index_of(name));

        for connector in connectors {
            let missing = [connector.source, connector.target]
                .into_iter()
                .find(|end| !records.contains_key(end));
            if let Some(missing) = missing {
                resolution.diagnostics.push(
                    Diagnostic::warning(format!("connector endpoint `{missing}` is not a node"))
                        .with_code(DiagnosticCode::W204)
                        .with_label(connector.span, "connector dropped")
                        .with_help("declare the node or fix the name"),
                );
            }
        }

        info!(
            nodes = resolution.placements.len(),
            fallbacks = resolution
                .placements
                .values()
                .filter(|(_, placement)| placement.is_fallback())
                .count();
            "Resolved positions"
        );
        resolution
    }

    /// Offset of a relative node from its reference, in canvas units.
    fn offset(&self, record: &NodeRecord, direction: Direction, distance: Option<f32>) -> Point {
        let doc_offset = record.position.offset(direction, distance, &self.defaults);
        self.units.offset_to_canvas(doc_offset)
    }

    /// Places relative nodes whose reference is placed, until a pass makes
    /// no progress or the pass limit is reached.
    fn fixed_point(
        &self,
        records: &IndexMap<Id, NodeRecord>,
        placed: &mut IndexMap<Id, (Point, Placement)>,
    ) {
        for pass in 0..self.layout.max_passes() {
            let newly = self.relative_pass(records, placed);
            if newly.is_empty() {
                return;
            }
            debug!(pass, count = newly.len(); "Placed relative nodes");
            placed.extend(newly);
        }
    }

    /// One pure pass over the unplaced nodes.
    fn relative_pass(
        &self,
        records: &IndexMap<Id, NodeRecord>,
        placed: &IndexMap<Id, (Point, Placement)>,
    ) -> Vec<(Id, (Point, Placement))> {
        records
            .values()
            .filter(|record| !placed.contains_key(&record.name))
            .filter_map(|record| {
                let relative = record.position.relative?;
                let (reference, _) = placed.get(&relative.reference())?;
                let offset = self.offset(record, relative.direction(), relative.distance());
                Some((record.name, (reference.add_point(offset), Placement::Relative)))
            })
            .collect()
    }

    fn place_loose(
        &self,
        records: &IndexMap<Id, NodeRecord>,
        placed: &mut IndexMap<Id, (Point, Placement)>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for record in records.values() {
            if placed.contains_key(&record.name) {
                continue;
            }
            let (direction, distance, wanted) = match (&record.position.relative, &record.position.loose) {
                (Some(relative), _) => (
                    relative.direction(),
                    relative.distance(),
                    relative.reference().to_string(),
                ),
                (None, Some(loose)) => (loose.direction, None, loose.name.clone()),
                (None, None) => continue,
            };
            let Some(reference) = lookup_loose(&wanted, placed) else {
                continue;
            };
            let (anchor, _) = placed[&reference];
            let target = anchor.add_point(self.offset(record, direction, distance));
            let position = self.aligner.snap(target, positions(placed), None);

            debug!(node:% = record.name, reference:% = reference; "Placed by loose match");
            diagnostics.push(
                Diagnostic::warning(format!(
                    "node `{}` was placed {direction} of `{reference}` by a loose match of `{wanted}`",
                    record.name
                ))
                .with_code(DiagnosticCode::W201)
                .with_label(record.spans.position, "reference read from here")
                .with_help(format!("write `{direction}=of {reference}`")),
            );
            placed.insert(record.name, (position, Placement::LooseMatch));
        }
    }

    fn place_from_connectors(
        &self,
        records: &IndexMap<Id, NodeRecord>,
        connectors: &[ConnectorRecord],
        placed: &mut IndexMap<Id, (Point, Placement)>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for record in records.values() {
            if placed.contains_key(&record.name) {
                continue;
            }
            let source = connectors
                .iter()
                .filter(|c| c.target == record.name)
                .find_map(|c| placed.get(&c.source).map(|(point, _)| (c.source, *point)));
            let Some((source, anchor)) = source else {
                continue;
            };
            let target = anchor.add_point(self.layout.connector_offset());
            let position = self.aligner.snap(target, positions(placed), None);

            debug!(node:% = record.name, source:% = source; "Placed from connector");
            diagnostics.push(
                Diagnostic::warning(format!(
                    "position of node `{}` was inferred from a connector from `{source}`",
                    record.name
                ))
                .with_code(DiagnosticCode::W202)
                .with_label(record.spans.declaration, "no usable position")
                .with_help("give the node an `at (x,y)` or a relative position"),
            );
            placed.insert(record.name, (position, Placement::Connector));
        }
    }

    fn place_on_grid(
        &self,
        records: &IndexMap<Id, NodeRecord>,
        placed: &mut IndexMap<Id, (Point, Placement)>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let unplaced: Vec<&NodeRecord> = records
            .values()
            .filter(|record| !placed.contains_key(&record.name))
            .collect();

        for (cell, record) in unplaced.into_iter().enumerate() {
            let target = self.grid_cell(cell);
            let position = self.aligner.snap(target, positions(placed), None);

            debug!(node:% = record.name, cell; "Placed on fallback grid");
            diagnostics.push(
                Diagnostic::warning(format!("node `{}` has no resolvable position", record.name))
                    .with_code(DiagnosticCode::W203)
                    .with_label(record.spans.declaration, "placed on the fallback grid")
                    .with_help("give the node an `at (x,y)` or a relative position"),
            );
            placed.insert(record.name, (position, Placement::Grid));
        }
    }

    /// Center of the `cell`-th fallback grid cell, filled row by row.
    fn grid_cell(&self, cell: usize) -> Point {
        let columns = self.layout.grid_columns();
        let column = (cell % columns) as f32 - (columns / 2) as f32;
        let row = (cell / columns) as f32;
        let spacing = self.layout.grid_spacing();
        self.layout
            .grid_origin()
            .add_point(Point::new(column * spacing.x(), row * spacing.y()))
    }
}

fn positions(placed: &IndexMap<Id, (Point, Placement)>) -> Vec<(Id, Point)> {
    placed
        .iter()
        .map(|(name, (point, _))| (*name, *point))
        .collect()
}

/// Finds a placed node for a reference written with the wrong case or an
/// anchor suffix.
fn lookup_loose(wanted: &str, placed: &IndexMap<Id, (Point, Placement)>) -> Option<Id> {
    let wanted = wanted.trim();
    let stripped = wanted.split('.').next().unwrap_or(wanted).trim();
    let exact = |name: &str| Id::lookup(name).filter(|id| placed.contains_key(id));
    let ignoring_case = |name: &str| placed.keys().copied().find(|id| id.eq_ignore_case(name));

    exact(wanted)
        .or_else(|| ignoring_case(wanted))
        .or_else(|| exact(stripped))
        .or_else(|| ignoring_case(stripped))
}
