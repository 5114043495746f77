//! SVG rendering of a [`Scene`].
//!
//! Each element of a frame is a small [`Drawable`] that pushes nodes into a
//! [`LayeredOutput`]. The layers fix the stacking order:
//! background → grid → cables → symbols → selection → preview.
//!
//! The document uses the logical canvas as its `viewBox` and the display
//! size as `width`/`height`, so the viewer's scale is applied by the SVG
//! renderer itself and coordinates in the markup stay logical.

use svg::node::element as svg_element;

use patchbay_core::{
    apply_stroke,
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer, StrokeDefinition, StrokeStyle},
    geometry::{Bounds, Point, Size},
    schema::CABLE_STROKE_WIDTH,
};

use crate::scene::{DraftLine, Highlight, Scene};

/// Canvas background fill.
#[derive(Debug)]
struct Background {
    size: Size,
    color: Color,
}

impl Drawable for Background {
    fn render_to_layers(&self) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let rect = svg_element::Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", self.size.width())
            .set("height", self.size.height())
            .set("fill", self.color)
            .set("fill-opacity", self.color.alpha());
        output.add_to_layer(RenderLayer::Background, Box::new(rect));
        output
    }
}

/// Evenly spaced grid lines across the whole canvas.
#[derive(Debug)]
struct GridLines {
    size: Size,
    spacing: f32,
    color: Color,
}

impl Drawable for GridLines {
    fn render_to_layers(&self) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        if !self.spacing.is_finite() || self.spacing < 1.0 {
            return output;
        }

        let stroke = StrokeDefinition::new(self.color, 1.0);
        let mut x = self.spacing;
        while x < self.size.width() {
            let line = svg_element::Line::new()
                .set("x1", x)
                .set("y1", 0)
                .set("x2", x)
                .set("y2", self.size.height());
            output.add_to_layer(RenderLayer::Grid, Box::new(apply_stroke!(line, &stroke)));
            x += self.spacing;
        }

        let mut y = self.spacing;
        while y < self.size.height() {
            let line = svg_element::Line::new()
                .set("x1", 0)
                .set("y1", y)
                .set("x2", self.size.width())
                .set("y2", y);
            output.add_to_layer(RenderLayer::Grid, Box::new(apply_stroke!(line, &stroke)));
            y += self.spacing;
        }

        output
    }
}

/// A polyline through `vertices` on the given layer.
#[derive(Debug)]
struct CablePath {
    id: Option<String>,
    vertices: Vec<Point>,
    stroke: StrokeDefinition,
    layer: RenderLayer,
}

impl Drawable for CablePath {
    fn render_to_layers(&self) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let points = self
            .vertices
            .iter()
            .map(|p| format!("{},{}", p.x(), p.y()))
            .collect::<Vec<_>>()
            .join(" ");

        let mut polyline = svg_element::Polyline::new()
            .set("points", points)
            .set("fill", "none");
        if let Some(id) = &self.id {
            polyline = polyline.set("data-id", id.as_str());
        }
        output.add_to_layer(self.layer, Box::new(apply_stroke!(polyline, &self.stroke)));
        output
    }
}

/// A symbol image centered on its position.
#[derive(Debug)]
struct SymbolImageNode {
    id: String,
    href: String,
    center: Point,
    size: Size,
    rotation: f32,
}

impl Drawable for SymbolImageNode {
    fn render_to_layers(&self) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let bounds = Bounds::new_from_center(self.center, self.size);
        let mut image = svg_element::Image::new()
            .set("data-id", self.id.as_str())
            .set("href", self.href.as_str())
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", self.size.width())
            .set("height", self.size.height())
            .set("preserveAspectRatio", "xMidYMid meet");
        if self.rotation != 0.0 {
            image = image.set("transform", rotate_about(self.rotation, self.center));
        }
        output.add_to_layer(RenderLayer::Symbol, Box::new(image));
        output
    }
}

/// Dashed outline around a selected symbol.
#[derive(Debug)]
struct SelectionBox {
    bounds: Bounds,
    rotation: f32,
    stroke: StrokeDefinition,
}

impl Drawable for SelectionBox {
    fn render_to_layers(&self) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let pad = 4.0;
        let mut rect = svg_element::Rectangle::new()
            .set("x", self.bounds.min_x() - pad)
            .set("y", self.bounds.min_y() - pad)
            .set("width", self.bounds.width() + 2.0 * pad)
            .set("height", self.bounds.height() + 2.0 * pad)
            .set("fill", "none");
        if self.rotation != 0.0 {
            rect = rect.set("transform", rotate_about(self.rotation, self.bounds.center()));
        }
        output.add_to_layer(RenderLayer::Selection, Box::new(apply_stroke!(rect, &self.stroke)));
        output
    }
}

fn rotate_about(degrees: f32, center: Point) -> String {
    format!("rotate({} {} {})", degrees, center.x(), center.y())
}

/// Renders `scene` into an SVG document displayed at `scale`.
pub(crate) fn render_document(scene: &Scene<'_>, scale: f32) -> svg::Document {
    let base = scene.canvas.base();
    let display = base.scale(scale);
    let style = scene.style;

    let mut drawables: Vec<Box<dyn Drawable>> = vec![
        Box::new(Background {
            size: base,
            color: style.background,
        }),
        Box::new(GridLines {
            size: base,
            spacing: style.grid_spacing,
            color: style.grid,
        }),
    ];

    for (cable, color, vertices) in scene.drawable_cables() {
        drawables.push(Box::new(CablePath {
            id: Some(cable.id().to_string()),
            vertices,
            stroke: StrokeDefinition::cable(color, cable.stroke_width() as f32),
            layer: RenderLayer::Cable,
        }));
    }

    for placed in scene.placed_images() {
        let href = if style.embed_images {
            placed.image.data_uri()
        } else {
            placed.image.url().to_string()
        };
        drawables.push(Box::new(SymbolImageNode {
            id: placed.symbol.id().to_string(),
            href,
            center: placed.center(),
            size: placed.size,
            rotation: placed.rotation(),
        }));
    }

    match &scene.highlight {
        Some(Highlight::Symbol { bounds, rotation }) => {
            let mut stroke = StrokeDefinition::new(style.selection, 2.0);
            stroke.set_style(StrokeStyle::Custom("6,4".to_string()));
            drawables.push(Box::new(SelectionBox {
                bounds: *bounds,
                rotation: *rotation,
                stroke,
            }));
        }
        Some(Highlight::Cable { vertices, width }) => {
            drawables.push(Box::new(CablePath {
                id: None,
                vertices: vertices.clone(),
                stroke: StrokeDefinition::cable(style.selection.with_alpha(0.5), width + 4.0),
                layer: RenderLayer::Selection,
            }));
        }
        None => {}
    }

    if let Some(DraftLine { start, end, color }) = scene.draft {
        drawables.push(Box::new(CablePath {
            id: None,
            vertices: vec![start, end],
            stroke: StrokeDefinition::preview(color, CABLE_STROKE_WIDTH as f32),
            layer: RenderLayer::Preview,
        }));
    }

    let mut output = LayeredOutput::new();
    for drawable in &drawables {
        output.merge(drawable.render_to_layers());
    }

    let doc = svg::Document::new()
        .set(
            "viewBox",
            format!("0 0 {} {}", base.width(), base.height()),
        )
        .set("width", display.width())
        .set("height", display.height());

    output
        .render()
        .into_iter()
        .fold(doc, |doc, node| doc.add(node))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use patchbay_core::{
        schema::{CableType, SchemaCable, SchemaSymbol},
        viewport::CanvasSpec,
    };

    use super::*;
    use crate::{
        assets::{ImageMap, SymbolImage, test_support::png},
        config::AppConfig,
        scene::RenderStyle,
    };

    fn style() -> RenderStyle {
        RenderStyle::from_config(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_layers_in_fixed_order() {
        let image = SymbolImage::decode("vca", "/symbols/vca.png", png(4, 4, [0, 0, 0, 255]))
            .unwrap();
        let images = ImageMap::from([("vca".to_string(), Arc::new(image))]);
        let symbols = vec![SchemaSymbol::new("symbol-1", "vca", Point::new(600.0, 400.0))];
        let cables = vec![SchemaCable::segment(
            "cable-1",
            Point::new(100.0, 100.0),
            Point::new(400.0, 300.0),
            CableType::Audio,
        )];
        let style = style();
        let scene = Scene::new(
            CanvasSpec::default(),
            &style,
            &symbols,
            &cables,
            Some(&images),
        );

        let rendered = render_document(&scene, 0.5).to_string();

        let grid = rendered.find("data-layer=\"grid\"").unwrap();
        let cable = rendered.find("data-layer=\"cable\"").unwrap();
        let symbol = rendered.find("data-layer=\"symbol\"").unwrap();
        assert!(grid < cable && cable < symbol);
        assert!(rendered.contains("viewBox=\"0 0 1200 800\""));
        assert!(rendered.contains("width=\"600\""));
        assert!(rendered.contains("points=\"100,100 400,300\""));
        assert!(rendered.contains("stroke=\"#FFD700\""));
        assert!(rendered.contains("href=\"/symbols/vca.png\""));
    }

    #[test]
    fn test_missing_images_are_skipped() {
        let symbols = vec![SchemaSymbol::new("symbol-1", "vca", Point::new(600.0, 400.0))];
        let images = ImageMap::new();
        let style = style();
        let scene = Scene::new(CanvasSpec::default(), &style, &symbols, &[], Some(&images));

        let rendered = render_document(&scene, 1.0).to_string();
        assert!(!rendered.contains("data-layer=\"symbol\""));
    }

    #[test]
    fn test_selection_and_preview_on_top() {
        let style = style();
        let mut scene = Scene::new(CanvasSpec::default(), &style, &[], &[], None);
        scene.highlight = Some(Highlight::Cable {
            vertices: vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
            width: 3.0,
        });
        scene.draft = Some(DraftLine {
            start: Point::new(5.0, 5.0),
            end: Point::new(50.0, 5.0),
            color: CableType::Gate.color(),
        });

        let rendered = render_document(&scene, 1.0).to_string();
        let selection = rendered.find("data-layer=\"selection\"").unwrap();
        let preview = rendered.find("data-layer=\"preview\"").unwrap();
        assert!(selection < preview);
        assert!(rendered.contains("stroke-dasharray=\"8,6\""));
        assert!(rendered.contains("stroke=\"#FF4500\""));
    }
}
