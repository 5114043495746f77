//! Patchbay Core Types and Definitions
//!
//! This crate provides the foundational types for Patchbay synthesizer patch
//! diagrams. It has no I/O and no async; everything here is pure data and math.
//!
//! - **Geometry**: Points, sizes and bounds ([`geometry`] module)
//! - **Colors**: CSS color parsing and `#RRGGBB` formatting ([`color::Color`])
//! - **Draw**: Strokes and z-ordered SVG layers ([`draw`] module)
//! - **Registry**: The symbol catalog ([`registry::SymbolRegistry`])
//! - **Schema**: The serializable diagram document ([`schema::SchemaData`])
//! - **Viewport**: Logical canvas ↔ display pixel mapping ([`viewport::Viewport`])

pub mod color;
pub mod draw;
pub mod geometry;
pub mod registry;
pub mod schema;
pub mod viewport;
