//! CLI logic for the tikzedit tool.
//!
//! Reads a TikZ document, reports what could not be understood, applies the
//! edit commands given on the command line and writes the regenerated
//! document.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, MoveCommand, ResizeCommand};

use std::fs;

use log::{info, warn};

use tikzedit::{
    Editor, Model, TikzEditError,
    geometry::{Bounds, Point, Size},
};

use error_adapter::{diagnostic_adapters, render};

/// Run the tikzedit CLI application
///
/// This function reads the input file, applies every `--move` and then every
/// `--resize`, and writes the regenerated document to the output file.
/// Diagnostics found while reading are logged as warnings and do not stop
/// the run.
///
/// # Errors
///
/// Returns `TikzEditError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Edit commands naming an unknown node or group
pub fn run(args: &Args) -> Result<(), TikzEditError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing document"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let editor = Editor::new(app_config);
    let mut model = editor.parse(&source);
    model.set_snap_to_grid(args.snap);

    for adapter in diagnostic_adapters(&model) {
        warn!("{}", render(&adapter));
    }

    apply_edits(&editor, &mut model, args)?;

    let output = editor.regenerate(&model);
    fs::write(&args.output, output)?;

    info!(output_file = args.output; "Document regenerated successfully");

    Ok(())
}

/// Applies the command-line edits, converting document units to canvas
/// space with the editor's configured units.
fn apply_edits(editor: &Editor, model: &mut Model, args: &Args) -> Result<(), TikzEditError> {
    let units = *editor.config().units();

    for MoveCommand { name, x, y } in &args.moves {
        let target = units.to_canvas(Point::new(*x, *y));
        editor.try_move_node(model, name, target)?;
        info!(node = name, x, y; "Moved node");
    }

    for ResizeCommand {
        name,
        x,
        y,
        width,
        height,
    } in &args.resizes
    {
        let bounds = Bounds::new_from_center(
            units.to_canvas(Point::new(*x, *y)),
            Size::new(units.length_to_canvas(*width), units.length_to_canvas(*height)),
        );
        editor.try_resize_group(model, name, bounds)?;
        info!(group = name, width, height; "Resized group");
    }

    Ok(())
}
