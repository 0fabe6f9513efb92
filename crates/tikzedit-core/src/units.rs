//! Length units and the document/canvas coordinate mapping.
//!
//! Source documents express positions in centimetres with the Y axis pointing
//! up. Editing happens in canvas space (see [`crate::geometry`]), which is
//! scaled and has its Y axis flipped.

use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::Point;

/// Error returned when a length carries a unit suffix that is not supported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported length unit `{0}`")]
pub struct UnknownUnit(pub String);

/// A unit suffix accepted on lengths.
///
/// A length written without a suffix is in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    #[default]
    Centimeter,
    Millimeter,
    Point,
    Inch,
}

impl LengthUnit {
    /// Converts `value` expressed in this unit into centimetres.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tikzedit_core::units::LengthUnit;
    /// assert_eq!(LengthUnit::Millimeter.to_cm(15.0), 1.5);
    /// assert_eq!(LengthUnit::Inch.to_cm(1.0), 2.54);
    /// ```
    pub fn to_cm(self, value: f32) -> f32 {
        match self {
            Self::Centimeter => value,
            Self::Millimeter => value / 10.0,
            // TeX points: 72.27 per inch.
            Self::Point => value * 2.54 / 72.27,
            Self::Inch => value * 2.54,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "cm" => Ok(Self::Centimeter),
            "mm" => Ok(Self::Millimeter),
            "pt" => Ok(Self::Point),
            "in" => Ok(Self::Inch),
            other => Err(UnknownUnit(other.to_string())),
        }
    }
}

/// Mapping between document space (centimetres, Y up) and canvas space.
///
/// ```text
/// canvas.x =  doc.x * scale + origin_x
/// canvas.y = -doc.y * scale + origin_y
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentUnits {
    scale: f32,
    origin_x: f32,
    origin_y: f32,
}

impl Default for DocumentUnits {
    fn default() -> Self {
        Self {
            scale: 50.0,
            origin_x: 400.0,
            origin_y: 300.0,
        }
    }
}

impl DocumentUnits {
    pub fn new(scale: f32, origin: Point) -> Self {
        Self {
            scale,
            origin_x: origin.x(),
            origin_y: origin.y(),
        }
    }

    /// Canvas units per centimetre
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Canvas position of the document origin
    pub fn origin(&self) -> Point {
        Point::new(self.origin_x, self.origin_y)
    }

    /// Converts a document position (cm) into canvas space.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tikzedit_core::{geometry::Point, units::DocumentUnits};
    /// let units = DocumentUnits::default();
    /// assert_eq!(units.to_canvas(Point::new(2.0, 1.0)), Point::new(500.0, 250.0));
    /// ```
    pub fn to_canvas(&self, doc: Point) -> Point {
        Point::new(
            doc.x() * self.scale + self.origin_x,
            -doc.y() * self.scale + self.origin_y,
        )
    }

    /// Converts a canvas position back into document space (cm).
    pub fn to_document(&self, canvas: Point) -> Point {
        Point::new(
            (canvas.x() - self.origin_x) / self.scale,
            -(canvas.y() - self.origin_y) / self.scale,
        )
    }

    /// Converts a displacement in document space into a canvas displacement.
    ///
    /// Unlike [`Self::to_canvas`] the origin is not applied.
    pub fn offset_to_canvas(&self, doc_offset: Point) -> Point {
        Point::new(doc_offset.x() * self.scale, -doc_offset.y() * self.scale)
    }

    /// Converts a length in centimetres into canvas units.
    pub fn length_to_canvas(&self, cm: f32) -> f32 {
        cm * self.scale
    }

    /// Returns an error message if the mapping cannot be inverted.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(format!("units.scale must be positive, got {}", self.scale));
        }
        if !(self.origin_x.is_finite() && self.origin_y.is_finite()) {
            return Err("units origin must be finite".to_string());
        }
        Ok(())
    }
}
