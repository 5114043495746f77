//! What a frame shows, independent of the output backend.
//!
//! Editors and viewers describe a frame as a [`Scene`]; the SVG and raster
//! backends in [`crate::export`] turn it into output.

use log::debug;

use patchbay_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    schema::{SchemaCable, SchemaSymbol},
    viewport::CanvasSpec,
};

use crate::{
    PatchbayError,
    assets::{ImageMap, SymbolImage},
    config::AppConfig,
};

/// Resolved colors and sizes used by every renderer.
#[derive(Debug, Clone)]
pub(crate) struct RenderStyle {
    pub background: Color,
    pub grid: Color,
    pub selection: Color,
    pub grid_spacing: f32,
    pub fallback_footprint: Size,
    pub embed_images: bool,
}

impl RenderStyle {
    /// Parses the style section of `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, PatchbayError> {
        let style = config.style();
        Ok(Self {
            background: style.background_color().map_err(PatchbayError::Config)?,
            grid: style.grid_color().map_err(PatchbayError::Config)?,
            selection: style.selection_color().map_err(PatchbayError::Config)?,
            grid_spacing: config.canvas().grid(),
            fallback_footprint: config.editor().fallback_footprint(),
            embed_images: config.assets().embed_images(),
        })
    }
}

/// Emphasis drawn around the selected element.
#[derive(Debug, Clone)]
pub(crate) enum Highlight {
    Symbol { bounds: Bounds, rotation: f32 },
    Cable { vertices: Vec<Point>, width: f32 },
}

/// The in-progress cable shown while drawing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DraftLine {
    pub start: Point,
    pub end: Point,
    pub color: Color,
}

/// A placed symbol paired with its loaded image.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlacedImage<'a> {
    pub symbol: &'a SchemaSymbol,
    pub image: &'a SymbolImage,
    pub size: Size,
}

impl PlacedImage<'_> {
    pub fn center(&self) -> Point {
        self.symbol.position()
    }

    pub fn rotation(&self) -> f32 {
        self.symbol.rotation() as f32
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_center(self.center(), self.size)
    }
}

/// Everything needed to draw one frame.
#[derive(Debug)]
pub(crate) struct Scene<'a> {
    pub canvas: CanvasSpec,
    pub style: &'a RenderStyle,
    pub symbols: &'a [SchemaSymbol],
    pub cables: &'a [SchemaCable],
    pub images: Option<&'a ImageMap>,
    pub highlight: Option<Highlight>,
    pub draft: Option<DraftLine>,
}

impl<'a> Scene<'a> {
    pub fn new(
        canvas: CanvasSpec,
        style: &'a RenderStyle,
        symbols: &'a [SchemaSymbol],
        cables: &'a [SchemaCable],
        images: Option<&'a ImageMap>,
    ) -> Self {
        Self {
            canvas,
            style,
            symbols,
            cables,
            images,
            highlight: None,
            draft: None,
        }
    }

    /// Symbols that have a loaded image, in document order.
    ///
    /// A symbol whose image is missing is not drawn.
    pub fn placed_images(&self) -> Vec<PlacedImage<'a>> {
        let Some(images) = self.images else {
            return Vec::new();
        };

        self.symbols
            .iter()
            .filter_map(|symbol| match images.get(symbol.symbol_id()) {
                Some(image) => Some(PlacedImage {
                    symbol,
                    image: image.as_ref(),
                    size: footprint(symbol, image, self.style.fallback_footprint),
                }),
                None => {
                    debug!(id = symbol.id(), symbol_id = symbol.symbol_id(); "Skipping symbol without image");
                    None
                }
            })
            .collect()
    }

    /// Cables whose stored color parses, with their vertices.
    pub fn drawable_cables(&self) -> Vec<(&'a SchemaCable, Color, Vec<Point>)> {
        self.cables
            .iter()
            .filter_map(|cable| match Color::new(cable.color()) {
                Ok(color) => Some((cable, color, cable.vertices())),
                Err(err) => {
                    debug!(id = cable.id(), err = err.as_str(); "Skipping cable with invalid color");
                    None
                }
            })
            .collect()
    }
}

/// Logical size a symbol occupies: image size, or the fallback for images
/// without an intrinsic size, times the symbol's scale.
pub(crate) fn footprint(symbol: &SchemaSymbol, image: &SymbolImage, fallback: Size) -> Size {
    image
        .size()
        .unwrap_or(fallback)
        .scale(symbol.scale().abs() as f32)
}
