//! Text regeneration.
//!
//! Turns a [`Model`] back into TikZ source. When the model's source text
//! can be trusted, only position-bearing fragments of it are rewritten and
//! everything else is kept byte for byte. Otherwise a minimal document is
//! synthesized from the geometry alone.

mod cluster;
mod rewrite;
mod synthesize;

use log::{info, warn};

use tikzedit_core::geometry::Point;

use crate::model::Model;

use cluster::Clustering;

/// Number formatting for one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Format {
    precision: usize,
}

impl Format {
    fn for_model(model: &Model) -> Self {
        Self {
            precision: model.config().export().precision(model.snap_to_grid()),
        }
    }

    /// A length in centimetres, e.g. `0.40cm`.
    pub(crate) fn length(self, cm: f32) -> String {
        // Adding zero turns -0.0 into 0.0.
        format!("{:.*}cm", self.precision, cm + 0.0)
    }

    /// An absolute position clause, e.g. `at (1.00cm,-2.00cm)`.
    pub(crate) fn at(self, point: Point) -> String {
        format!("at ({},{})", self.length(point.x()), self.length(point.y()))
    }
}

/// True when every placed node's name appears in a non-empty source.
///
/// Anything else means the source does not describe the model, and
/// rewriting it in place would drop nodes.
pub fn is_round_trip_safe(model: &Model) -> bool {
    let source = model.source();
    !source.trim().is_empty()
        && model
            .nodes()
            .keys()
            .all(|name| name.with_str(|name| source.contains(name)))
}

/// Produces source text for the current state of `model`.
///
/// # Examples
///
/// ```
/// # use tikzedit::{parse, regenerate};
/// let model = parse(r"\node[service] (a) at (0,0) {A}; % keep me");
/// assert_eq!(
///     regenerate(&model),
///     r"\node[service] (a) at (0.00cm,0.00cm) {A}; % keep me"
/// );
/// ```
pub fn regenerate(model: &Model) -> String {
    let clustering = Clustering::for_model(model);
    let positions = clustering.positions(model);
    let format = Format::for_model(model);

    if is_round_trip_safe(model) {
        let out = rewrite::rewrite(model, &positions, format);
        info!(
            nodes = positions.len(),
            bytes = out.len(),
            snap = model.snap_to_grid();
            "Regenerated source in place"
        );
        out
    } else {
        warn!(
            nodes = model.nodes().len(),
            source_bytes = model.source().len();
            "Source does not describe the model; synthesizing a fresh document"
        );
        synthesize::synthesize(model, &positions, format)
    }
}

#[cfg(test)]
mod tests {
    use tikzedit_core::geometry::Size;

    use super::*;
    use crate::{move_node, parse, resize_group};

    const CLOUD_STACK: &str = include_str!("../../../../demos/cloud_stack.tex");
    const BACKEND_GROUPS: &str = include_str!("../../../../demos/backend_groups.tex");
    const DEGRADED: &str = include_str!("../../../../demos/degraded.tex");

    #[test]
    fn test_format() {
        let free = Format { precision: 2 };
        assert_eq!(free.at(Point::new(-0.0, 1.5)), "at (0.00cm,1.50cm)");
        let snapped = Format { precision: 1 };
        assert_eq!(snapped.length(-2.4), "-2.4cm");
    }

    #[test]
    fn test_relative_node_becomes_absolute() {
        let source = "\\node[service] (a) at (0,0) {A};\n\\node[service, right=of a] (b) {B};\n";
        let out = regenerate(&parse(source));
        assert_eq!(
            out,
            "\\node[service] (a) at (0.00cm,0.00cm) {A};\n\\node[service] (b) at (2.00cm,0.00cm) {B};\n"
        );
    }

    #[test]
    fn test_relative_list_after_name_is_dropped() {
        let source = r"\node (c) [below=of a, xshift=1cm] {C}; \node (a) at (0,0) {A};";
        let out = regenerate(&parse(source));
        assert_eq!(
            out,
            r"\node (c) at (1.00cm,-2.00cm) {C}; \node (a) at (0.00cm,0.00cm) {A};"
        );
    }

    #[test]
    fn test_style_emptied_by_removal_loses_brackets() {
        let source = r"\node (a) at (0,0) {A}; \node[above=of a] (b) {B};";
        let out = regenerate(&parse(source));
        assert_eq!(
            out,
            r"\node (a) at (0.00cm,0.00cm) {A}; \node (b) at (0.00cm,1.50cm) {B};"
        );
    }

    #[test]
    fn test_passes_through_everything_else() {
        let out = regenerate(&parse(CLOUD_STACK));
        for line in CLOUD_STACK.lines() {
            let trimmed = line.trim_start();
            if !trimmed.starts_with("\\node") {
                assert!(out.contains(line), "line not preserved: {line}");
            }
        }
        assert_eq!(out.matches("\\node").count(), CLOUD_STACK.matches("\\node").count());
        assert!(!out.contains("=of"));
    }

    #[test]
    fn test_shadowed_and_unparsed_declarations_are_rewritten() {
        let out = regenerate(&parse(DEGRADED));
        // The duplicate follows the first `web`.
        assert!(out.contains(r"\node[service] (web) at (0.00cm,0.00cm) {Duplicate web};"));
        // No node matches `broken`; it gets the default coordinate.
        assert!(out.contains(r"\node[api] (broken) at (0.00cm,0.00cm);"));
        assert_eq!(out.matches("\\node").count(), DEGRADED.matches("\\node").count());
    }

    #[test]
    fn test_unparsed_site_on_shared_line() {
        let source = r"\node (a) at (0,0) {A}; \node[api] (gw) at (1,1); \node (b) at (2,0) {B};";
        let out = regenerate(&parse(source));
        assert_eq!(
            out,
            r"\node (a) at (0.00cm,0.00cm) {A}; \node[api] (gw) at (0.00cm,0.00cm); \node (b) at (2.00cm,0.00cm) {B};"
        );
    }

    #[test]
    fn test_group_membership_rewritten_after_resize() {
        let model = parse(BACKEND_GROUPS);
        let group = model.group("order_domain").expect("group exists");
        let bounds = group.bounds().expect("group has a box");
        let billing = model.node("billing").expect("billing exists").position();

        // Stretching the box right to `billing` also takes in `ledger`
        // below it.
        let grown = bounds.merge(&billing.to_bounds(Size::new(2.0, 2.0)));
        let model = resize_group(model, "order_domain", grown);
        let out = regenerate(&model);
        assert!(out.contains("fit=(orders) (billing) (orders_db) (ledger), inner sep=0.4cm"));
        assert!(out.contains("fit=(billing) (ledger)"));
    }

    #[test]
    fn test_unchanged_group_keeps_membership_text() {
        let out = regenerate(&parse(BACKEND_GROUPS));
        assert!(out.contains("fit=(orders) (orders_db)"));
    }

    #[test]
    fn test_missing_name_falls_back_to_synthesis() {
        let model = parse("\\node[db] (store) at (1,2) {Store};\n\\draw[dashed] (store) -- (store);").without_source();
        let out = regenerate(&model);
        assert_eq!(
            out,
            "\\begin{tikzpicture}\n    \\node[db] (store) at (1.00cm,2.00cm) {Store};\n    \\draw[dashed] (store) -- (store);\n\\end{tikzpicture}\n"
        );
    }

    #[test]
    fn test_snap_mode_uses_short_precision() {
        let mut model = parse(r"\node (a) at (0.43,1.18) {A};");
        model.set_snap_to_grid(true);
        assert_eq!(regenerate(&model), r"\node (a) at (0.4cm,1.2cm) {A};");
    }

    #[test]
    fn test_moved_node_is_written_at_new_position() {
        let model = parse(r"\node (a) at (0,0) {A};");
        let model = move_node(model, "a", 500.0, 250.0);
        assert_eq!(regenerate(&model), r"\node (a) at (2.00cm,1.00cm) {A};");
    }
}
