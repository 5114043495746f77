//! Drawing primitives shared by the editor and viewer renderers.
//!
//! Anything that renders to SVG implements [`Drawable`] and pushes its nodes
//! into a [`LayeredOutput`]; the output sorts nodes into [`RenderLayer`]s so
//! z-order is fixed no matter the traversal order.
mod layer;
mod stroke;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use stroke::{StrokeCap, StrokeDefinition, StrokeStyle};

/// Trait for elements that can be rendered to SVG layers.
pub trait Drawable: std::fmt::Debug {
    /// Renders this drawable to one or more layers.
    fn render_to_layers(&self) -> LayeredOutput;
}
