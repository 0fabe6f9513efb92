//! Alignment engine.
//!
//! Classifies placed nodes that line up with a point (same row, same column,
//! or one of the two diagonals through it) and snaps the point onto the
//! closest such line and then onto the grid. The same procedure serves
//! interactive dragging and fallback placement during resolution.
//!
//! Everything here works in canvas space.

use log::trace;

use tikzedit_core::{geometry::Point, identifier::Id};

use crate::config::AlignmentConfig;

/// The line through the point that a candidate lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentKind {
    /// Same Y
    Row,
    /// Same X
    Column,
    /// The 45° line `y = x + c`
    DiagonalA,
    /// The 135° line `y = -x + c`
    DiagonalB,
}

impl AlignmentKind {
    /// Tie-break order of [`Aligner::snap`].
    pub const PRIORITY: [AlignmentKind; 4] = [
        AlignmentKind::Row,
        AlignmentKind::Column,
        AlignmentKind::DiagonalA,
        AlignmentKind::DiagonalB,
    ];

    /// Projects `point` onto the line of this kind through `anchor`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tikzedit::alignment::AlignmentKind;
    /// # use tikzedit_core::geometry::Point;
    /// let anchor = Point::new(100.0, 100.0);
    /// let point = Point::new(140.0, 144.0);
    /// assert_eq!(AlignmentKind::Row.project(point, anchor), Point::new(140.0, 100.0));
    /// assert_eq!(AlignmentKind::DiagonalA.project(point, anchor), Point::new(142.0, 142.0));
    /// ```
    pub fn project(self, point: Point, anchor: Point) -> Point {
        match self {
            Self::Row => point.with_y(anchor.y()),
            Self::Column => point.with_x(anchor.x()),
            Self::DiagonalA => {
                let c = anchor.y() - anchor.x();
                let x = (point.x() + point.y() - c) / 2.0;
                Point::new(x, x + c)
            }
            Self::DiagonalB => {
                let c = anchor.y() + anchor.x();
                let x = (point.x() - point.y() + c) / 2.0;
                Point::new(x, -x + c)
            }
        }
    }

    /// Distance from `point` to the line of this kind through `anchor`.
    pub fn distance(self, point: Point, anchor: Point) -> f32 {
        match self {
            Self::Row => (point.y() - anchor.y()).abs(),
            Self::Column => (point.x() - anchor.x()).abs(),
            Self::DiagonalA | Self::DiagonalB => point.distance(self.project(point, anchor)),
        }
    }

    /// True when `anchor` lies within `threshold` of this kind's line
    /// through `point`, measured along the Y axis.
    fn matches(self, point: Point, anchor: Point, threshold: f32) -> bool {
        let dx = anchor.x() - point.x();
        let delta = match self {
            Self::Row => anchor.y() - point.y(),
            Self::Column => dx,
            Self::DiagonalA => anchor.y() - (point.y() + dx),
            Self::DiagonalB => anchor.y() - (point.y() - dx),
        };
        delta.abs() < threshold
    }
}

/// A node that lines up with the point under consideration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub node: Id,
    pub anchor: Point,
}

/// Alignment candidates by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidates {
    pub row: Vec<Candidate>,
    pub column: Vec<Candidate>,
    pub diagonal_a: Vec<Candidate>,
    pub diagonal_b: Vec<Candidate>,
}

impl Candidates {
    /// Candidates of one kind.
    pub fn of_kind(&self, kind: AlignmentKind) -> &[Candidate] {
        match kind {
            AlignmentKind::Row => &self.row,
            AlignmentKind::Column => &self.column,
            AlignmentKind::DiagonalA => &self.diagonal_a,
            AlignmentKind::DiagonalB => &self.diagonal_b,
        }
    }

    fn of_kind_mut(&mut self, kind: AlignmentKind) -> &mut Vec<Candidate> {
        match kind {
            AlignmentKind::Row => &mut self.row,
            AlignmentKind::Column => &mut self.column,
            AlignmentKind::DiagonalA => &mut self.diagonal_a,
            AlignmentKind::DiagonalB => &mut self.diagonal_b,
        }
    }

    pub fn is_empty(&self) -> bool {
        AlignmentKind::PRIORITY
            .iter()
            .all(|&kind| self.of_kind(kind).is_empty())
    }
}

/// Classifies every node in `nodes` (except `exclude`) by the lines through
/// `point` it lies on. A node may appear under several kinds.
pub fn find_candidates(
    point: Point,
    nodes: impl IntoIterator<Item = (Id, Point)>,
    exclude: Option<Id>,
    threshold: f32,
) -> Candidates {
    let mut candidates = Candidates::default();
    for (node, anchor) in nodes {
        if exclude == Some(node) {
            continue;
        }
        for kind in AlignmentKind::PRIORITY {
            if kind.matches(point, anchor, threshold) {
                candidates
                    .of_kind_mut(kind)
                    .push(Candidate { node, anchor });
            }
        }
    }
    candidates
}

/// Snapping with a fixed grid quantum and threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aligner {
    grid_size: f32,
    threshold: f32,
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(&AlignmentConfig::default())
    }
}

impl Aligner {
    pub fn new(config: &AlignmentConfig) -> Self {
        Self {
            grid_size: config.grid_size(),
            threshold: config.threshold(),
        }
    }

    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    /// [`find_candidates`] with this aligner's threshold.
    pub fn find_candidates(
        &self,
        point: Point,
        nodes: impl IntoIterator<Item = (Id, Point)>,
        exclude: Option<Id>,
    ) -> Candidates {
        find_candidates(point, nodes, exclude, self.threshold)
    }

    /// Snaps `point` onto the closest alignment line, then onto the grid.
    ///
    /// The closest candidate over all kinds wins; on equal distance the
    /// earlier kind of [`AlignmentKind::PRIORITY`] wins. Without a candidate
    /// within the threshold the point is only rounded to the grid.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tikzedit::alignment::Aligner;
    /// # use tikzedit_core::{geometry::Point, identifier::Id};
    /// let aligner = Aligner::default();
    /// let nodes = [(Id::new("a"), Point::new(400.0, 300.0))];
    ///
    /// // 7 units below `a`'s row: pulled onto it.
    /// let snapped = aligner.snap(Point::new(533.0, 307.0), nodes, None);
    /// assert_eq!(snapped, Point::new(540.0, 300.0));
    /// ```
    pub fn snap(
        &self,
        point: Point,
        nodes: impl IntoIterator<Item = (Id, Point)>,
        exclude: Option<Id>,
    ) -> Point {
        let candidates = self.find_candidates(point, nodes, exclude);

        let mut best: Option<(AlignmentKind, Point, f32)> = None;
        for kind in AlignmentKind::PRIORITY {
            for candidate in candidates.of_kind(kind) {
                let distance = kind.distance(point, candidate.anchor);
                if best.is_none_or(|(_, _, best_distance)| distance < best_distance) {
                    best = Some((kind, kind.project(point, candidate.anchor), distance));
                }
            }
        }

        match best {
            Some((kind, projected, distance)) if distance < self.threshold => {
                trace!(kind:?, distance; "Snapped onto alignment line");
                projected.round_to(self.grid_size)
            }
            _ => point.round_to(self.grid_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn nodes(points: &[(&str, f32, f32)]) -> Vec<(Id, Point)> {
        points
            .iter()
            .map(|&(name, x, y)| (Id::new(name), Point::new(x, y)))
            .collect()
    }

    #[test]
    fn test_find_candidates_classifies_every_kind() {
        let placed = nodes(&[
            ("row", 700.0, 305.0),
            ("column", 396.0, 100.0),
            ("diag_a", 500.0, 402.0),
            ("diag_b", 300.0, 398.0),
            ("far", 900.0, 900.0),
        ]);
        let found = find_candidates(Point::new(400.0, 300.0), placed, None, 10.0);
        assert_eq!(found.row.len(), 1);
        assert_eq!(found.row[0].node, "row");
        assert_eq!(found.column[0].node, "column");
        assert_eq!(found.diagonal_a[0].node, "diag_a");
        assert_eq!(found.diagonal_b[0].node, "diag_b");
    }

    #[test]
    fn test_find_candidates_excludes_node() {
        let placed = nodes(&[("self", 400.0, 300.0)]);
        let found = find_candidates(Point::new(400.0, 300.0), placed, Some(Id::new("self")), 10.0);
        assert!(found.is_empty());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let placed = nodes(&[("a", 0.0, 10.0)]);
        let found = find_candidates(Point::new(500.0, 0.0), placed, None, 10.0);
        assert!(found.row.is_empty());
    }

    #[test]
    fn test_snap_without_candidates_rounds_to_grid() {
        let aligner = Aligner::default();
        let snapped = aligner.snap(Point::new(409.0, 311.0), Vec::new(), None);
        assert_eq!(snapped, Point::new(400.0, 320.0));
    }

    #[test]
    fn test_snap_prefers_closest_candidate() {
        let aligner = Aligner::default();
        // Row is 9 away, column is 3 away.
        let placed = nodes(&[("row", 900.0, 209.0), ("column", 111.0, 600.0)]);
        let snapped = aligner.snap(Point::new(108.0, 200.0), placed, None);
        assert_eq!(snapped, Point::new(120.0, 200.0));
    }

    #[test]
    fn test_snap_tie_prefers_row() {
        let aligner = Aligner::default();
        // Both 5 away. Row gives (108, 196), column would give (113, 191).
        let placed = nodes(&[("row", 900.0, 196.0), ("column", 113.0, 700.0)]);
        let snapped = aligner.snap(Point::new(108.0, 191.0), placed, None);
        assert_eq!(snapped, Point::new(100.0, 200.0));
    }

    #[test]
    fn test_diagonal_projection() {
        let anchor = Point::new(0.0, 0.0);
        let projected = AlignmentKind::DiagonalB.project(Point::new(10.0, -6.0), anchor);
        assert_approx_eq!(f32, projected.x(), 8.0);
        assert_approx_eq!(f32, projected.y(), -8.0);
        assert_approx_eq!(
            f32,
            AlignmentKind::DiagonalB.distance(Point::new(10.0, -6.0), anchor),
            8.0_f32.sqrt()
        );
    }

    proptest! {
        #[test]
        fn prop_snap_is_idempotent(
            x in -2000.0f32..2000.0,
            y in -2000.0f32..2000.0,
            grid_nodes in prop::collection::vec((-50i32..50, -50i32..50), 0..8),
        ) {
            let aligner = Aligner::default();
            // Nodes on grid points, as every resolved or snapped node is.
            let placed: Vec<_> = grid_nodes
                .iter()
                .enumerate()
                .map(|(i, &(gx, gy))| {
                    (Id::new(&format!("n{i}")), Point::new(gx as f32 * 20.0, gy as f32 * 20.0))
                })
                .collect();
            let once = aligner.snap(Point::new(x, y), placed.clone(), None);
            let twice = aligner.snap(once, placed, None);
            prop_assert_eq!(once, twice);
        }
    }
}
