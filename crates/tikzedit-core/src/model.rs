//! Domain types shared by the parser and the editing engine.
//!
//! These types describe *what* a declaration means (its shape, its position
//! constraints, its connector style) independently of where it was found in
//! the source text.

use std::fmt;

use crate::{geometry::Point, geometry::Size, identifier::Id};

/// Visual category of a node, derived from its style clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeKind {
    Ellipse,
    Cylinder,
    DashedRectangle,
    HighlightedRectangle,
    #[default]
    Rectangle,
}

impl ShapeKind {
    /// Derives the shape from a raw style clause by substring matching.
    ///
    /// The first matching rule wins: `cloud`/`ellipse`, then
    /// `cylinder`/`db`, then `k8s`, then `api`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tikzedit_core::model::ShapeKind;
    /// assert_eq!(ShapeKind::from_style("cloud, above=of x"), ShapeKind::Ellipse);
    /// assert_eq!(ShapeKind::from_style("db"), ShapeKind::Cylinder);
    /// assert_eq!(ShapeKind::from_style("service"), ShapeKind::Rectangle);
    /// ```
    pub fn from_style(style: &str) -> Self {
        if style.contains("cloud") || style.contains("ellipse") {
            Self::Ellipse
        } else if style.contains("cylinder") || style.contains("db") {
            Self::Cylinder
        } else if style.contains("k8s") {
            Self::DashedRectangle
        } else if style.contains("api") {
            Self::HighlightedRectangle
        } else {
            Self::Rectangle
        }
    }

    /// Style keyword emitted for this shape when a document is synthesized
    /// from scratch.
    pub fn style_keyword(self) -> &'static str {
        match self {
            Self::Ellipse => "cloud",
            Self::Cylinder => "db",
            Self::DashedRectangle => "k8s",
            Self::HighlightedRectangle => "api",
            Self::Rectangle => "service",
        }
    }

    /// Size of a node with this shape displaying `text`.
    ///
    /// The width follows the longest line (8 units per character, clamped to
    /// `120..=250`); the height grows by 20 per non-empty line with a floor of
    /// 50. Ellipses are 40% wider, truncated to a whole unit.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tikzedit_core::{geometry::Size, model::ShapeKind};
    /// assert_eq!(ShapeKind::Rectangle.label_size("API"), Size::new(120.0, 50.0));
    /// assert_eq!(ShapeKind::Ellipse.label_size("API"), Size::new(168.0, 50.0));
    /// ```
    pub fn label_size(self, text: &str) -> Size {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let longest = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(10);

        let width = (longest as f32 * 8.0).clamp(120.0, 250.0);
        let height = (lines.len() as f32 * 20.0 + 20.0).max(50.0);
        let width = match self {
            Self::Ellipse => (width * 1.4).trunc(),
            _ => width,
        };
        Size::new(width, height)
    }
}

/// Direction of a relative placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Above,
    Below,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Above, Self::Below, Self::Left, Self::Right];

    /// Parses a direction keyword, ignoring ASCII case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.keyword().eq_ignore_ascii_case(keyword))
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Unit vector of this direction in document space (Y up).
    pub fn unit(self) -> Point {
        match self {
            Self::Above => Point::new(0.0, 1.0),
            Self::Below => Point::new(0.0, -1.0),
            Self::Left => Point::new(-1.0, 0.0),
            Self::Right => Point::new(1.0, 0.0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Default distances (cm) of relative placements, one per direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalDefaults {
    pub above: f32,
    pub below: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for DirectionalDefaults {
    fn default() -> Self {
        Self {
            above: 1.5,
            below: 2.0,
            left: 2.0,
            right: 2.0,
        }
    }
}

impl DirectionalDefaults {
    pub fn distance(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Above => self.above,
            Direction::Below => self.below,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

/// A strict `direction=[distance] of reference` constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativePlacement {
    direction: Direction,
    reference: Id,
    distance: Option<f32>,
}

impl RelativePlacement {
    pub fn new(direction: Direction, reference: Id, distance: Option<f32>) -> Self {
        Self {
            direction,
            reference,
            distance,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn reference(&self) -> Id {
        self.reference
    }

    /// Explicit distance in centimetres, if one was written
    pub fn distance(&self) -> Option<f32> {
        self.distance
    }
}

/// A best-effort reference extracted by tolerant scanning.
///
/// Used only when the strict grammar found nothing usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseReference {
    pub direction: Direction,
    pub name: String,
}

/// Everything a declaration says about its position.
///
/// All lengths are in document centimetres.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionSpec {
    pub at: Option<Point>,
    pub relative: Option<RelativePlacement>,
    pub loose: Option<LooseReference>,
    pub xshift: Option<f32>,
    pub yshift: Option<f32>,
}

impl PositionSpec {
    /// True when the node can be placed without looking at any other node.
    pub fn is_absolute(&self) -> bool {
        self.at.is_some() && self.relative.is_none()
    }

    /// Offset from the reference node in document space.
    ///
    /// The direction contributes its magnitude on one axis; an explicit shift
    /// replaces the value on its axis instead of adding to it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tikzedit_core::model::{DirectionalDefaults, Direction, PositionSpec};
    /// # use tikzedit_core::geometry::Point;
    /// let spec = PositionSpec { xshift: Some(1.0), ..Default::default() };
    /// let offset = spec.offset(Direction::Below, None, &DirectionalDefaults::default());
    /// assert_eq!(offset, Point::new(1.0, -2.0));
    /// ```
    pub fn offset(
        &self,
        direction: Direction,
        distance: Option<f32>,
        defaults: &DirectionalDefaults,
    ) -> Point {
        let magnitude = distance.unwrap_or_else(|| defaults.distance(direction));
        let base = direction.unit();
        let base = Point::new(base.x() * magnitude, base.y() * magnitude);
        Point::new(
            self.xshift.unwrap_or(base.x()),
            self.yshift.unwrap_or(base.y()),
        )
    }
}

/// Line style of a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectorStyle {
    #[default]
    Plain,
    Dashed,
}

impl ConnectorStyle {
    pub fn from_style(style: &str) -> Self {
        if style.contains("dashed") {
            Self::Dashed
        } else {
            Self::Plain
        }
    }
}

/// Presentation hints recognized in a group's style clause.
///
/// These are informational; the raw style is what gets written back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupStyle {
    pub fill: Option<String>,
    pub draw: Option<String>,
    pub rounded_corners: bool,
    pub dashed: bool,
}
