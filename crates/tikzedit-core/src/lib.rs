//! tikzedit Core Types and Definitions
//!
//! This crate provides the foundational types shared by the tikzedit parser
//! and editing engine. It includes:
//!
//! - **Identifiers**: String-interned node and group names ([`identifier::Id`])
//! - **Geometry**: Points, sizes and bounding boxes in canvas space ([`geometry`] module)
//! - **Units**: Length units and the document/canvas mapping ([`units`] module)
//! - **Model**: Shapes, relative placements and connector styles ([`model`] module)

pub mod geometry;
pub mod identifier;
pub mod model;
pub mod units;
