//! Configuration types for tikzedit.
//!
//! Every heuristic constant of the editing pipeline lives here as a named,
//! overridable value. All types implement [`serde::Deserialize`] and default
//! every field, so a configuration file only needs to mention what it
//! changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`LayoutConfig`] - Relative offsets, pass limits and fallback placement.
//! - [`AlignmentConfig`] - Grid quantum and snapping threshold.
//! - [`GroupConfig`] - Group padding and resize limits.
//! - [`ExportConfig`] - Export clustering and number formatting.
//!
//! Document/canvas unit mapping is [`DocumentUnits`] from `tikzedit-core`.
//!
//! # Example
//!
//! ```
//! # use tikzedit::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.alignment().grid_size(), 20.0);
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

use tikzedit_core::{geometry::Point, model::DirectionalDefaults, units::DocumentUnits};

use crate::TikzEditError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Document to canvas mapping.
    #[serde(default)]
    units: DocumentUnits,

    /// Position resolution section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Alignment snapping section.
    #[serde(default)]
    alignment: AlignmentConfig,

    /// Group section.
    #[serde(default)]
    groups: GroupConfig,

    /// Export section.
    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        units: DocumentUnits,
        layout: LayoutConfig,
        alignment: AlignmentConfig,
        groups: GroupConfig,
        export: ExportConfig,
    ) -> Self {
        Self {
            units,
            layout,
            alignment,
            groups,
            export,
        }
    }

    /// Returns the unit mapping.
    pub fn units(&self) -> &DocumentUnits {
        &self.units
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the alignment configuration.
    pub fn alignment(&self) -> &AlignmentConfig {
        &self.alignment
    }

    /// Returns the group configuration.
    pub fn groups(&self) -> &GroupConfig {
        &self.groups
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    /// Grid quantum in document centimetres, used for snapped export.
    pub fn document_grid(&self) -> f32 {
        self.alignment.grid_size / self.units.scale()
    }

    /// Checks every value the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`TikzEditError::Config`] naming the first invalid value.
    pub fn validate(&self) -> Result<(), TikzEditError> {
        self.units.validate().map_err(TikzEditError::Config)?;
        self.layout.validate().map_err(TikzEditError::Config)?;
        self.alignment.validate().map_err(TikzEditError::Config)?;
        self.groups.validate().map_err(TikzEditError::Config)?;
        self.export.validate().map_err(TikzEditError::Config)
    }
}

fn check_non_negative(name: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{name} must be a non-negative number, got {value}"))
    }
}

fn check_positive(name: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{name} must be positive, got {value}"))
    }
}

/// Position resolution settings.
///
/// Distances are in document centimetres; offsets, origins and spacings of
/// the fallback tiers are in canvas units.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Default distance of `above=of`.
    above: f32,
    /// Default distance of `below=of`.
    below: f32,
    /// Default distance of `left=of`.
    left: f32,
    /// Default distance of `right=of`.
    right: f32,
    /// Upper bound on fixed-point passes.
    max_passes: usize,
    /// Upper bound on alternating loose/connector rounds.
    fallback_passes: usize,
    /// Offset of a connector-inferred node from the connector's source.
    connector_offset: [f32; 2],
    /// Columns of the fallback grid.
    grid_columns: usize,
    /// Center of the fallback grid's first row.
    grid_origin: [f32; 2],
    /// Horizontal and vertical spacing of the fallback grid.
    grid_spacing: [f32; 2],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let directions = DirectionalDefaults::default();
        Self {
            above: directions.above,
            below: directions.below,
            left: directions.left,
            right: directions.right,
            max_passes: 20,
            fallback_passes: 10,
            connector_offset: [150.0, 100.0],
            grid_columns: 4,
            grid_origin: [400.0, 500.0],
            grid_spacing: [150.0, 100.0],
        }
    }
}

impl LayoutConfig {
    /// Returns the per-direction default distances.
    pub fn directional_defaults(&self) -> DirectionalDefaults {
        DirectionalDefaults {
            above: self.above,
            below: self.below,
            left: self.left,
            right: self.right,
        }
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    pub fn fallback_passes(&self) -> usize {
        self.fallback_passes
    }

    pub fn connector_offset(&self) -> Point {
        Point::new(self.connector_offset[0], self.connector_offset[1])
    }

    pub fn grid_columns(&self) -> usize {
        self.grid_columns
    }

    pub fn grid_origin(&self) -> Point {
        Point::new(self.grid_origin[0], self.grid_origin[1])
    }

    pub fn grid_spacing(&self) -> Point {
        Point::new(self.grid_spacing[0], self.grid_spacing[1])
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("layout.above", self.above)?;
        check_non_negative("layout.below", self.below)?;
        check_non_negative("layout.left", self.left)?;
        check_non_negative("layout.right", self.right)?;
        if self.max_passes == 0 {
            return Err("layout.max_passes must be at least 1".to_string());
        }
        if self.grid_columns == 0 {
            return Err("layout.grid_columns must be at least 1".to_string());
        }
        check_positive("layout.grid_spacing[0]", self.grid_spacing[0])?;
        check_positive("layout.grid_spacing[1]", self.grid_spacing[1])
    }
}

/// Alignment snapping settings, in canvas units.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlignmentConfig {
    grid_size: f32,
    threshold: f32,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            threshold: 10.0,
        }
    }
}

impl AlignmentConfig {
    pub fn new(grid_size: f32, threshold: f32) -> Self {
        Self {
            grid_size,
            threshold,
        }
    }

    /// Base grid quantum every snapped point is rounded to.
    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    /// Maximum distance at which another node counts as aligned.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn validate(&self) -> Result<(), String> {
        check_positive("alignment.grid_size", self.grid_size)?;
        check_non_negative("alignment.threshold", self.threshold)
    }
}

/// Group settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupConfig {
    /// Padding in centimetres when a group has no `inner sep=`.
    default_padding: f32,
    /// Smallest width or height of a resized group, in canvas units.
    min_extent: f32,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            default_padding: 0.3,
            min_extent: 20.0,
        }
    }
}

impl GroupConfig {
    pub fn default_padding(&self) -> f32 {
        self.default_padding
    }

    pub fn min_extent(&self) -> f32 {
        self.min_extent
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("groups.default_padding", self.default_padding)?;
        check_non_negative("groups.min_extent", self.min_extent)
    }
}

/// Export settings. Lengths are in document centimetres.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Coordinates closer than this fall into one cluster.
    cluster_tolerance: f32,
    /// Quantum of cluster keys and means outside grid-snap mode.
    cluster_quantum: f32,
    /// Decimal places written in grid-snap mode.
    snapped_precision: usize,
    /// Decimal places written otherwise.
    free_precision: usize,
    /// Position of unparsed declarations with no matching node.
    default_coordinate: [f32; 2],
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            cluster_tolerance: 0.5,
            cluster_quantum: 0.5,
            snapped_precision: 1,
            free_precision: 2,
            default_coordinate: [0.0, 0.0],
        }
    }
}

impl ExportConfig {
    pub fn cluster_tolerance(&self) -> f32 {
        self.cluster_tolerance
    }

    pub fn cluster_quantum(&self) -> f32 {
        self.cluster_quantum
    }

    /// Decimal places for the given editing mode.
    pub fn precision(&self, snapped: bool) -> usize {
        if snapped {
            self.snapped_precision
        } else {
            self.free_precision
        }
    }

    pub fn default_coordinate(&self) -> Point {
        Point::new(self.default_coordinate[0], self.default_coordinate[1])
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("export.cluster_tolerance", self.cluster_tolerance)?;
        check_positive("export.cluster_quantum", self.cluster_quantum)?;
        if self.snapped_precision > 6 || self.free_precision > 6 {
            return Err("export precisions must be at most 6 decimal places".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.units().scale(), 50.0);
        assert_eq!(config.layout().max_passes(), 20);
        assert_eq!(config.layout().fallback_passes(), 10);
        assert_eq!(config.layout().connector_offset(), Point::new(150.0, 100.0));
        assert_eq!(config.layout().directional_defaults().above, 1.5);
        assert_eq!(config.groups().default_padding(), 0.3);
        assert_eq!(config.export().precision(true), 1);
        assert_eq!(config.export().precision(false), 2);
        assert_approx_eq!(f32, config.document_grid(), 0.4);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [layout]
            below = 2.5
            grid_columns = 3

            [alignment]
            threshold = 4
            "#,
        )
        .expect("valid config");
        assert_eq!(config.layout().directional_defaults().below, 2.5);
        assert_eq!(config.layout().directional_defaults().above, 1.5);
        assert_eq!(config.layout().grid_columns(), 3);
        assert_eq!(config.alignment().threshold(), 4.0);
        assert_eq!(config.alignment().grid_size(), 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[layout]\nabov = 1.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let config: AppConfig = toml::from_str("[units]\nscale = 0\n").expect("parses");
        assert!(matches!(config.validate(), Err(TikzEditError::Config(_))));

        let config: AppConfig = toml::from_str("[layout]\nmax_passes = 0\n").expect("parses");
        assert!(config.validate().is_err());

        let config: AppConfig =
            toml::from_str("[export]\ncluster_quantum = -1\n").expect("parses");
        assert!(config.validate().is_err());
    }
}
