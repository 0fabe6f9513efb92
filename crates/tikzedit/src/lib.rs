//! tikzedit - round-trip editing of TikZ node diagrams.
//!
//! Reads a hand-written TikZ document into an editable geometric model,
//! applies edits (node moves, group resizes), and writes the document back
//! while leaving everything that was not edited untouched.
//!
//! The pipeline is `parse -> resolve -> (edit) -> regenerate`. No stage
//! fails: malformed input degrades to fallback placements and warning
//! diagnostics on the [`Model`].

pub mod alignment;
pub mod config;

mod edit;
mod error;
pub mod group;
mod model;
mod regenerate;
pub mod resolve;

pub use tikzedit_core::{geometry, identifier, units};
pub use tikzedit_parser::error::{Diagnostic, DiagnosticCode, Severity};

pub use error::TikzEditError;
pub use model::{Connector, Group, Model, Node, Placement};
pub use regenerate::{is_round_trip_safe, regenerate};

use log::{debug, info, warn};

use geometry::{Bounds, Point};

use config::AppConfig;

/// Parses and resolves a document with the default configuration.
///
/// # Examples
///
/// ```
/// # use tikzedit::parse;
/// let model = parse(
///     r"\node[service] (a) at (0,0) {A};
///       \node[service, right=of a] (b) {B};
///       \draw[arrow] (a) -- (b);",
/// );
/// assert_eq!(model.nodes().len(), 2);
/// assert_eq!(model.connectors().len(), 1);
/// ```
pub fn parse(source: &str) -> Model {
    Editor::default().parse(source)
}

/// Moves node `name` to `(x, y)` in canvas space.
///
/// An unknown name leaves the model unchanged.
pub fn move_node(mut model: Model, name: &str, x: f32, y: f32) -> Model {
    if let Err(err) = edit::move_node(&mut model, name, Point::new(x, y)) {
        debug!(err:%; "Ignored move");
    }
    model
}

/// Gives group `name` a new box (canvas space) and recomputes its members.
///
/// An unknown name leaves the model unchanged.
pub fn resize_group(mut model: Model, name: &str, bounds: Bounds) -> Model {
    if let Err(err) = edit::resize_group(&mut model, name, bounds) {
        debug!(err:%; "Ignored resize");
    }
    model
}

/// Entry point for parsing and editing with a specific configuration.
///
/// The free functions [`parse`], [`move_node`] and [`resize_group`] use the
/// default configuration and ignore unknown names; the `try_*` methods here
/// report them instead.
///
/// # Examples
///
/// ```
/// use tikzedit::{Editor, config::AppConfig, geometry::Point};
///
/// let editor = Editor::new(AppConfig::default());
/// let mut model = editor.parse(r"\node (a) at (0,0) {A};");
///
/// editor.try_move_node(&mut model, "a", Point::new(450.0, 300.0))
///     .expect("node exists");
/// assert!(editor.try_move_node(&mut model, "b", Point::default()).is_err());
///
/// assert_eq!(editor.regenerate(&model), r"\node (a) at (1.00cm,0.00cm) {A};");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Editor {
    config: AppConfig,
}

impl Editor {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parses and resolves `source`.
    ///
    /// Never fails. Everything that could not be read or placed normally is
    /// reported in [`Model::diagnostics`].
    pub fn parse(&self, source: &str) -> Model {
        info!(bytes = source.len(); "Parsing document");
        let model = Model::build(source, self.config.clone());
        let fallbacks = model
            .nodes()
            .values()
            .filter(|node| node.placement().is_fallback())
            .count();
        if fallbacks > 0 {
            warn!(fallbacks; "Some nodes were placed by fallback rules");
        }
        model
    }

    /// Replaces `model` with a fresh parse of `source`, keeping its editing
    /// mode.
    pub fn reparse(&self, model: Model, source: &str) -> Model {
        let snap = model.snap_to_grid();
        let mut model = self.parse(source);
        model.set_snap_to_grid(snap);
        model
    }

    /// Moves a node's center to `target` (canvas space).
    ///
    /// # Errors
    ///
    /// Returns [`TikzEditError::UnknownNode`] if no node is named `name`.
    pub fn try_move_node(&self, model: &mut Model, name: &str, target: Point) -> Result<(), TikzEditError> {
        edit::move_node(model, name, target)
    }

    /// Gives a group a new box (canvas space) and recomputes its members.
    ///
    /// # Errors
    ///
    /// Returns [`TikzEditError::UnknownGroup`] if no group is named `name`.
    pub fn try_resize_group(&self, model: &mut Model, name: &str, bounds: Bounds) -> Result<(), TikzEditError> {
        edit::resize_group(model, name, bounds)
    }

    /// Translates a group's box by `offset` (canvas units) and recomputes
    /// its members.
    ///
    /// # Errors
    ///
    /// Returns [`TikzEditError::UnknownGroup`] if no group is named `name`.
    pub fn try_move_group(&self, model: &mut Model, name: &str, offset: Point) -> Result<(), TikzEditError> {
        edit::move_group(model, name, offset)
    }

    /// Produces source text for the current state of `model`.
    pub fn regenerate(&self, model: &Model) -> String {
        regenerate::regenerate(model)
    }
}
