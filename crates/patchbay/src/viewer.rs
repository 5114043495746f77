//! Read-only rendering of a saved patch.
//!
//! A [`Viewer`] holds no document state. Each call to [`Viewer::render`]
//! is a pure function of the document, the container size and whatever the
//! shared [`ImageAssetCache`] has finished loading for that document.

use log::{debug, info};

use patchbay_core::{
    geometry::Size,
    schema::SchemaData,
    viewport::{CanvasSpec, MIN_FIT_SCALE},
};

use crate::{
    PatchbayError,
    assets::{ImageAssetCache, PreloadHandle},
    config::AppConfig,
    export::svg,
    scene::{RenderStyle, Scene},
};

/// One rendered state of a viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerFrame {
    /// The document's images are still loading.
    Loading,
    /// The document has no symbols and no cables.
    Empty,
    /// The SVG markup and the scale it was drawn at.
    Rendered { svg: String, scale: f32, size: Size },
}

/// Renders documents at a responsive scale.
#[derive(Debug, Clone)]
pub struct Viewer {
    cache: ImageAssetCache,
    canvas: CanvasSpec,
    style: RenderStyle,
}

impl Viewer {
    /// # Errors
    ///
    /// Returns [`PatchbayError::Config`] when a configured style color does
    /// not parse.
    pub fn new(cache: ImageAssetCache, config: &AppConfig) -> Result<Self, PatchbayError> {
        Ok(Self {
            cache,
            canvas: config.canvas().spec(),
            style: RenderStyle::from_config(config)?,
        })
    }

    /// Preloads only the symbols `schema` refers to.
    pub fn load(&self, schema: &SchemaData) -> PreloadHandle {
        let ids = schema.referenced_symbol_ids();
        debug!(symbols = ids.len(); "Viewer preload");
        self.cache.preload(ids)
    }

    /// Display scale for a container: its width over the canvas width,
    /// never above 1.
    pub fn scale_for(&self, container: Size) -> f32 {
        let base = self.canvas.base().width();
        let width = container.width();
        if !width.is_finite() || width <= 0.0 || base <= 0.0 {
            return MIN_FIT_SCALE;
        }
        (width / base).min(1.0)
    }

    /// Renders `schema` for a container of the given size.
    ///
    /// Returns [`ViewerFrame::Loading`] until a [`Viewer::load`] of the same
    /// document has completed.
    pub fn render(&self, schema: &SchemaData, container: Size) -> ViewerFrame {
        if schema.is_empty() {
            return ViewerFrame::Empty;
        }

        let Some(images) = self.cache.completed(schema.referenced_symbol_ids()) else {
            return ViewerFrame::Loading;
        };

        let scale = self.scale_for(container);
        let scene = Scene::new(
            self.canvas,
            &self.style,
            schema.symbols(),
            schema.cables(),
            Some(images.as_ref()),
        );
        let svg = svg::render_document(&scene, scale).to_string();
        let size = self.canvas.base().scale(scale);

        info!(
            symbols = schema.symbols().len(),
            cables = schema.cables().len(),
            scale = scale;
            "Patch rendered"
        );
        ViewerFrame::Rendered { svg, scale, size }
    }
}
