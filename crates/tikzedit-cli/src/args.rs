//! Command-line argument definitions for the tikzedit CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Besides input/output paths, configuration and logging,
//! arguments carry the edit commands to apply before the document is
//! written back. Edit coordinates are in document units (centimetres, Y up).

use std::str::FromStr;

use clap::Parser;

/// Command-line arguments for the tikzedit tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input TikZ file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the regenerated TikZ file
    #[arg(short, long, default_value = "out.tex")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Snap edits to the alignment grid and export with short precision
    #[arg(long)]
    pub snap: bool,

    /// Move a node's center: NAME=X,Y
    #[arg(long = "move", value_name = "NAME=X,Y")]
    pub moves: Vec<MoveCommand>,

    /// Give a group a new box centered at X,Y: NAME=X,Y,W,H
    #[arg(long = "resize", value_name = "NAME=X,Y,W,H")]
    pub resizes: Vec<ResizeCommand>,
}

/// A `--move` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCommand {
    pub name: String,
    pub x: f32,
    pub y: f32,
}

impl FromStr for MoveCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, values) = split_command(s)?;
        match values[..] {
            [x, y] => Ok(Self { name, x, y }),
            _ => Err(format!("expected NAME=X,Y, got `{s}`")),
        }
    }
}

/// A `--resize` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeCommand {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FromStr for ResizeCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, values) = split_command(s)?;
        match values[..] {
            [x, y, width, height] if width >= 0.0 && height >= 0.0 => Ok(Self {
                name,
                x,
                y,
                width,
                height,
            }),
            _ => Err(format!(
                "expected NAME=X,Y,W,H with non-negative W and H, got `{s}`"
            )),
        }
    }
}

fn split_command(s: &str) -> Result<(String, Vec<f32>), String> {
    let (name, values) = s
        .split_once('=')
        .ok_or_else(|| format!("missing `=` in `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in `{s}`"));
    }
    let values = values
        .split(',')
        .map(|value| {
            value
                .trim()
                .parse::<f32>()
                .map_err(|err| format!("invalid number `{}`: {err}", value.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((name.to_string(), values))
}
