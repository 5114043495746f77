//! Stroke definitions for cables, grid lines, and selection outlines.
//!
//! # Overview
//!
//! - [`StrokeDefinition`]: color, width, dash style, and cap of a stroke
//! - [`StrokeStyle`]: solid or dashed patterns
//! - [`StrokeCap`]: how segment end points are rendered
//! - [`apply_stroke!`](crate::apply_stroke!): applies a stroke to an SVG element
//!
//! # SVG Attribute Mapping
//!
//! | Rust Property | SVG Attribute | Example Values |
//! |--------------|---------------|----------------|
//! | `color` | `stroke`, `stroke-opacity` | `"#FFD700"`, `0.5` |
//! | `width` | `stroke-width` | `3.0` |
//! | `style` | `stroke-dasharray` | `"8,6"` |
//! | `cap` | `stroke-linecap` | `"butt"`, `"round"`, `"square"` |
//!
//! # Example
//!
//! ```
//! use patchbay_core::color::Color;
//! use patchbay_core::draw::StrokeDefinition;
//! use svg::node::element as svg_element;
//!
//! let stroke = StrokeDefinition::cable(Color::new("#FFD700").unwrap(), 3.0);
//! let line = svg_element::Line::new()
//!     .set("x1", 100)
//!     .set("y1", 100)
//!     .set("x2", 400)
//!     .set("y2", 300);
//!
//! let line = patchbay_core::apply_stroke!(line, &stroke);
//! ```

use crate::color::Color;

/// Visual pattern of a stroke.
///
/// - `Solid`: no dasharray attribute
/// - `Dashed`: "8,6", used for the cable draft preview
/// - `Custom(pattern)`: the provided dasharray string
#[derive(Debug, Default, Clone, PartialEq)]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Custom(String),
}

impl StrokeStyle {
    /// Returns the SVG dasharray value for this style, or None for solid lines
    pub fn to_svg_value(&self) -> Option<String> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("8,6".to_string()),
            Self::Custom(pattern) => Some(pattern.clone()),
        }
    }
}

/// Defines how segment end points are rendered.
///
/// Maps directly to SVG `stroke-linecap` attribute values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCap {
    /// Flat cap at the exact endpoint (SVG default)
    #[default]
    Butt,
    /// Rounded cap extending beyond the endpoint by half the stroke width
    Round,
    /// Square cap extending beyond the endpoint by half the stroke width
    Square,
}

impl StrokeCap {
    /// Returns the SVG stroke-linecap value
    pub fn to_svg_value(&self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// A stroke definition for rendering cables and outlines.
#[derive(Debug, Clone)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    style: StrokeStyle,
    cap: StrokeCap,
}

impl StrokeDefinition {
    /// Creates a new solid stroke with butt caps.
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            ..Self::default()
        }
    }

    /// Stroke used for committed cables: solid with round caps.
    pub fn cable(color: Color, width: f32) -> Self {
        let mut stroke = Self::new(color, width);
        stroke.set_cap(StrokeCap::Round);
        stroke
    }

    /// Stroke used for the in-progress cable preview: dashed with round caps.
    pub fn preview(color: Color, width: f32) -> Self {
        let mut stroke = Self::cable(color, width);
        stroke.set_style(StrokeStyle::Dashed);
        stroke
    }

    /// Returns the stroke color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the stroke width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Returns the stroke style.
    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Returns the stroke cap style.
    pub fn cap(&self) -> StrokeCap {
        self.cap
    }

    /// Sets the stroke style.
    pub fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    /// Sets the stroke cap style.
    pub fn set_cap(&mut self, cap: StrokeCap) {
        self.cap = cap;
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self {
            color: Color::default(),
            width: 1.0,
            style: StrokeStyle::default(),
            cap: StrokeCap::default(),
        }
    }
}

/// Apply all stroke attributes to an SVG element.
///
/// Sets color, opacity, width, line cap, and the dash pattern when the
/// style is not solid.
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        let mut elem = $element
            .set("stroke", $stroke.color().to_hex())
            .set("stroke-opacity", $stroke.color().alpha())
            .set("stroke-width", $stroke.width())
            .set("stroke-linecap", $stroke.cap().to_svg_value());

        if let Some(dasharray) = $stroke.style().to_svg_value() {
            elem = elem.set("stroke-dasharray", dasharray);
        }

        elem
    }};
}

#[cfg(test)]
mod tests {
    use svg::node::element::Line;

    use super::*;

    #[test]
    fn test_stroke_default() {
        let stroke = StrokeDefinition::default();
        assert_eq!(stroke.width(), 1.0);
        assert_eq!(stroke.color().to_hex(), "#000000");
        assert_eq!(*stroke.style(), StrokeStyle::Solid);
        assert_eq!(stroke.cap(), StrokeCap::Butt);
    }

    #[test]
    fn test_cable_and_preview_strokes() {
        let gold = Color::new("#FFD700").unwrap();

        let cable = StrokeDefinition::cable(gold, 3.0);
        assert_eq!(cable.width(), 3.0);
        assert_eq!(cable.cap(), StrokeCap::Round);
        assert_eq!(*cable.style(), StrokeStyle::Solid);

        let preview = StrokeDefinition::preview(gold, 3.0);
        assert_eq!(preview.cap(), StrokeCap::Round);
        assert_eq!(*preview.style(), StrokeStyle::Dashed);
    }

    #[test]
    fn test_stroke_style_dasharray() {
        assert_eq!(StrokeStyle::Solid.to_svg_value(), None);
        assert_eq!(StrokeStyle::Dashed.to_svg_value(), Some("8,6".to_string()));
        let custom = StrokeStyle::Custom("15,3".to_string());
        assert_eq!(custom.to_svg_value(), Some("15,3".to_string()));
    }

    #[test]
    fn test_apply_stroke_sets_attributes() {
        let stroke = StrokeDefinition::preview(Color::new("#FF4500").unwrap(), 3.0);
        let line = crate::apply_stroke!(Line::new(), &stroke);
        let rendered = line.to_string();

        assert!(rendered.contains("stroke=\"#FF4500\""));
        assert!(rendered.contains("stroke-width=\"3\""));
        assert!(rendered.contains("stroke-linecap=\"round\""));
        assert!(rendered.contains("stroke-dasharray=\"8,6\""));
    }
}
