//! The interactive patch editor.
//!
//! [`Editor`] owns a mutable copy of the document and a small state machine
//! driven by pointer and keyboard input. It never touches a rendering
//! surface: hosts forward pointer events in display pixels (or logical
//! units through the `pointer_*` variants) and ask for an SVG frame or a
//! PNG export when they need one.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use futures::executor::block_on;
//! use patchbay::{
//!     Editor, Tool,
//!     assets::{ImageAssetCache, MemoryAssetSource},
//!     config::AppConfig,
//!     geometry::Point,
//!     registry::SymbolRegistry,
//! };
//!
//! let cache = ImageAssetCache::new(
//!     Arc::new(SymbolRegistry::builtin()),
//!     Arc::new(MemoryAssetSource::new()),
//! );
//! let mut editor = Editor::new(cache, &AppConfig::default()).unwrap();
//! assert!(block_on(editor.load_assets()));
//!
//! editor.set_tool(Tool::CableDraw);
//! editor.pointer_down(Point::new(100.0, 100.0));
//! editor.pointer_move(Point::new(400.0, 300.0));
//! editor.pointer_up(Point::new(400.0, 300.0));
//!
//! let schema = editor.save();
//! assert_eq!(schema.cables()[0].points(), &[100.0, 100.0, 400.0, 300.0]);
//! ```

use std::{
    fmt,
    future::Future,
    sync::{Arc, OnceLock},
};

use log::{debug, info, trace, warn};

use patchbay_core::{
    geometry::{Point, Size},
    schema::{CableType, SchemaCable, SchemaData, SchemaSymbol},
    viewport::{Viewport, ViewTransform},
};

use crate::{
    PatchbayError,
    assets::{ImageAssetCache, ImageMap},
    config::AppConfig,
    export::{raster, svg},
    hit,
    scene::{DraftLine, Highlight, RenderStyle, Scene},
};

/// File name offered for exported images.
pub const EXPORT_FILE_NAME: &str = "patch-schema.png";

/// Prompt passed to [`Confirm`] before clearing the document.
pub const CLEAR_ALL_PROMPT: &str = "Remove every symbol and cable from this patch?";

/// Active editing tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Select,
    CableDraw,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => f.write_str("select"),
            Self::CableDraw => f.write_str("cable-draw"),
        }
    }
}

/// The selected element, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    Symbol(String),
    Cable(String),
}

impl Selection {
    pub fn id(&self) -> &str {
        match self {
            Self::Symbol(id) | Self::Cable(id) => id,
        }
    }
}

/// A cable being drawn. Never part of the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CableDraft {
    start: Point,
    end: Point,
}

impl CableDraft {
    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// True once the end point has moved away from the start.
    pub fn has_length(&self) -> bool {
        self.start != self.end
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Delete,
    Backspace,
    Escape,
}

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// A PNG rendering of the document.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportedImage {
    file_name: &'static str,
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl ExportedImage {
    pub fn file_name(&self) -> &str {
        self.file_name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }
}

impl fmt::Debug for ExportedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedImage")
            .field("file_name", &self.file_name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_len", &self.png.len())
            .finish()
    }
}

/// What the pointer is currently doing.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Moving a symbol; `offset` is symbol center minus the press point.
    Dragging { id: String, offset: Point },
    Drawing(CableDraft),
}

/// Interactive editor over one patch document.
#[derive(Debug)]
pub struct Editor {
    cache: ImageAssetCache,
    viewport: Viewport,
    style: RenderStyle,
    default_scale: f64,
    zoom_step: f32,
    hit_slop: f32,
    pixel_ratio: f32,

    symbols: Vec<SchemaSymbol>,
    cables: Vec<SchemaCable>,

    tool: Tool,
    cable_type: CableType,
    selection: Option<Selection>,
    gesture: Gesture,

    images: Arc<OnceLock<Arc<ImageMap>>>,
    next_id: u64,
}

impl Editor {
    /// Creates an editor over an empty document.
    ///
    /// # Errors
    ///
    /// Returns [`PatchbayError::Config`] when a configured style color does
    /// not parse.
    pub fn new(cache: ImageAssetCache, config: &AppConfig) -> Result<Self, PatchbayError> {
        Self::with_seed(cache, config, SchemaData::default())
    }

    /// Creates an editor over a previously saved document.
    ///
    /// Invalid entries in `seed` are dropped and logged so the document
    /// invariants hold from the start.
    pub fn with_seed(
        cache: ImageAssetCache,
        config: &AppConfig,
        seed: SchemaData,
    ) -> Result<Self, PatchbayError> {
        let style = RenderStyle::from_config(config)?;
        let editor_config = config.editor();
        let canvas = config.canvas().spec();

        let (seed, issues) = seed.sanitized();
        for issue in &issues {
            warn!(issue:% = issue; "Dropped invalid entry from seed document");
        }
        let (symbols, cables) = seed.into_parts();
        debug!(symbols = symbols.len(), cables = cables.len(); "Editor seeded");

        Ok(Self {
            cache,
            viewport: Viewport::new(canvas, editor_config.zoom_limits(), canvas.base()),
            style,
            default_scale: editor_config.default_symbol_scale(),
            zoom_step: editor_config.zoom_step(),
            hit_slop: editor_config.hit_slop(),
            pixel_ratio: editor_config.export_pixel_ratio(),
            symbols,
            cables,
            tool: Tool::default(),
            cable_type: CableType::default(),
            selection: None,
            gesture: Gesture::Idle,
            images: Arc::new(OnceLock::new()),
            next_id: 0,
        })
    }

    /// Preloads every registry symbol and makes the editor interactive.
    ///
    /// The returned future does not borrow the editor. It resolves to
    /// `false` when the editor was dropped before the images arrived; the
    /// result is then discarded.
    pub fn load_assets(&self) -> impl Future<Output = bool> + use<> {
        let handle = self.cache.preload(self.cache.registry().ids());
        let slot = Arc::downgrade(&self.images);

        async move {
            let images = handle.await;
            let Some(slot) = slot.upgrade() else {
                debug!("Editor dropped before its assets loaded");
                return false;
            };
            if slot.set(images).is_err() {
                trace!("Editor assets already loaded");
            }
            true
        }
    }

    /// Asset load progress, 0 to 100.
    pub fn load_progress(&self) -> u8 {
        self.cache.progress()
    }

    /// True once [`Editor::load_assets`] has completed.
    pub fn is_ready(&self) -> bool {
        self.images.get().is_some()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switches tool. Any gesture in progress is abandoned.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            debug!(tool:% = tool; "Tool changed");
        }
        self.tool = tool;
        self.gesture = Gesture::Idle;
    }

    pub fn cable_type(&self) -> CableType {
        self.cable_type
    }

    /// Sets the signal type used for the next committed cable.
    pub fn set_cable_type(&mut self, cable_type: CableType) {
        self.cable_type = cable_type;
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn symbols(&self) -> &[SchemaSymbol] {
        &self.symbols
    }

    pub fn cables(&self) -> &[SchemaCable] {
        &self.cables
    }

    /// The cable currently being drawn, if any.
    pub fn draft(&self) -> Option<CableDraft> {
        match self.gesture {
            Gesture::Drawing(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Pointer press at a display-pixel position.
    pub fn on_pointer_down(&mut self, display: Point) {
        let point = self.viewport.to_logical(display);
        self.pointer_down(point);
    }

    /// Pointer motion at a display-pixel position.
    pub fn on_pointer_move(&mut self, display: Point) {
        let point = self.viewport.to_logical(display);
        self.pointer_move(point);
    }

    /// Pointer release at a display-pixel position.
    pub fn on_pointer_up(&mut self, display: Point) {
        let point = self.viewport.to_logical(display);
        self.pointer_up(point);
    }

    /// Pointer press in logical canvas units.
    pub fn pointer_down(&mut self, point: Point) {
        if !self.is_ready() || !point.is_finite() {
            trace!(point:? = point; "Ignoring pointer down");
            return;
        }

        match self.tool {
            Tool::Select => {
                let hit = self.hit_test(point);
                debug!(hit:? = hit; "Select");
                self.gesture = match &hit {
                    Some(Selection::Symbol(id)) => match self.symbol(id) {
                        Some(symbol) => Gesture::Dragging {
                            id: id.clone(),
                            offset: symbol.position().sub_point(point),
                        },
                        None => Gesture::Idle,
                    },
                    _ => Gesture::Idle,
                };
                self.selection = hit;
            }
            Tool::CableDraw => {
                self.gesture = Gesture::Drawing(CableDraft {
                    start: point,
                    end: point,
                });
            }
        }
    }

    /// Pointer motion in logical canvas units.
    pub fn pointer_move(&mut self, point: Point) {
        if !point.is_finite() {
            return;
        }

        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Dragging { id, offset } => {
                let target = self.viewport.clamp_to_canvas(point.add_point(*offset));
                if let Some(symbol) = self.symbols.iter_mut().find(|s| s.id() == id.as_str()) {
                    trace!(id = id.as_str(), target:? = target; "Drag");
                    symbol.set_position(target);
                }
            }
            Gesture::Drawing(draft) => {
                trace!(end:? = point; "Draft");
                draft.end = point;
            }
        }
    }

    /// Pointer release in logical canvas units.
    pub fn pointer_up(&mut self, point: Point) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Dragging { id, .. } => {
                debug!(id = id.as_str(); "Drag finished");
            }
            Gesture::Drawing(mut draft) => {
                if point.is_finite() {
                    draft.end = point;
                }
                if draft.has_length() {
                    self.commit_cable(draft);
                } else {
                    debug!("Discarded cable draft without movement");
                }
            }
        }
    }

    /// Keyboard shortcut handling.
    pub fn on_key(&mut self, key: EditorKey) {
        match key {
            EditorKey::Delete | EditorKey::Backspace => {
                self.delete();
            }
            EditorKey::Escape => {
                if matches!(self.gesture, Gesture::Drawing(_)) {
                    self.gesture = Gesture::Idle;
                } else {
                    self.selection = None;
                }
            }
        }
    }

    /// Appends a new symbol at the canvas center and returns its id.
    pub fn add_symbol(&mut self, symbol_id: &str) -> String {
        let id = self.fresh_id("symbol");
        let symbol = SchemaSymbol::new(id.clone(), symbol_id, self.viewport.canvas().center())
            .with_scale(self.default_scale);
        info!(id = id.as_str(), symbol_id = symbol_id; "Symbol added");
        self.symbols.push(symbol);
        id
    }

    /// Removes the selected element. Returns `false` when nothing was selected.
    pub fn delete(&mut self) -> bool {
        let Some(selection) = self.selection.take() else {
            return false;
        };

        match &selection {
            Selection::Symbol(id) => self.symbols.retain(|s| s.id() != id),
            Selection::Cable(id) => self.cables.retain(|c| c.id() != id),
        }
        if let Gesture::Dragging { id, .. } = &self.gesture {
            if id == selection.id() {
                self.gesture = Gesture::Idle;
            }
        }
        info!(selection:? = selection; "Deleted");
        true
    }

    /// Empties the document once `confirmation` approves.
    pub fn clear_all(&mut self, confirmation: &dyn Confirm) -> bool {
        if !confirmation.confirm(CLEAR_ALL_PROMPT) {
            debug!("Clear all declined");
            return false;
        }

        info!(symbols = self.symbols.len(), cables = self.cables.len(); "Clearing patch");
        self.symbols.clear();
        self.cables.clear();
        self.selection = None;
        self.gesture = Gesture::Idle;
        true
    }

    /// Snapshot of the current document for the host to persist.
    pub fn save(&self) -> SchemaData {
        info!(symbols = self.symbols.len(), cables = self.cables.len(); "Saving patch");
        SchemaData::new(self.symbols.clone(), self.cables.clone())
    }

    /// Resizes the display container.
    pub fn set_container(&mut self, container: Size) {
        self.viewport.set_container(container);
    }

    /// Sets the zoom factor and returns the applied value.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        self.viewport.set_zoom(zoom)
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_zoom(self.viewport.zoom() + self.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_zoom(self.viewport.zoom() - self.zoom_step)
    }

    /// Pans by a display-pixel delta.
    pub fn pan_by(&mut self, delta: Point) {
        self.viewport.pan_by(delta);
    }

    /// Applies a saved zoom and pan.
    pub fn set_view(&mut self, view: ViewTransform) {
        self.viewport.set_view(view);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset_view();
    }

    /// Renders the current frame, including selection and draft, as SVG at
    /// the effective display scale.
    pub fn render_svg(&self) -> String {
        let mut scene = self.scene();
        scene.highlight = self.highlight(&scene);
        scene.draft = self.draft().map(|draft| DraftLine {
            start: draft.start,
            end: draft.end,
            color: self.cable_type.color(),
        });

        svg::render_document(&scene, self.viewport.effective_scale()).to_string()
    }

    /// Rasterizes the document at 100% zoom with no pan, times the configured
    /// pixel ratio. Selection and drafts are not part of the image.
    ///
    /// # Errors
    ///
    /// Returns [`PatchbayError::Export`] when rasterization or encoding fails.
    pub fn export_image(&self) -> Result<ExportedImage, PatchbayError> {
        let scene = self.scene();
        let pixels = raster::rasterize(&scene, self.pixel_ratio)?;
        let png = raster::encode_png(&pixels)?;

        info!(
            width = pixels.width(),
            height = pixels.height(),
            bytes = png.len();
            "Patch exported"
        );
        Ok(ExportedImage {
            file_name: EXPORT_FILE_NAME,
            width: pixels.width(),
            height: pixels.height(),
            png,
        })
    }

    fn scene(&self) -> Scene<'_> {
        Scene::new(
            self.viewport.canvas(),
            &self.style,
            &self.symbols,
            &self.cables,
            self.images.get().map(Arc::as_ref),
        )
    }

    fn highlight(&self, scene: &Scene<'_>) -> Option<Highlight> {
        match self.selection.as_ref()? {
            Selection::Symbol(id) => scene
                .placed_images()
                .into_iter()
                .find(|placed| placed.symbol.id() == id)
                .map(|placed| Highlight::Symbol {
                    bounds: placed.bounds(),
                    rotation: placed.rotation(),
                }),
            Selection::Cable(id) => self.cable(id).map(|cable| Highlight::Cable {
                vertices: cable.vertices(),
                width: cable.stroke_width() as f32,
            }),
        }
    }

    fn hit_test(&self, point: Point) -> Option<Selection> {
        hit::hit_test(&self.scene(), point, self.hit_slop)
    }

    fn commit_cable(&mut self, draft: CableDraft) {
        let id = self.fresh_id("cable");
        let cable = SchemaCable::segment(id.clone(), draft.start, draft.end, self.cable_type);
        info!(id = id.as_str(), cable_type:% = self.cable_type; "Cable added");
        self.cables.push(cable);
    }

    fn symbol(&self, id: &str) -> Option<&SchemaSymbol> {
        self.symbols.iter().find(|s| s.id() == id)
    }

    fn cable(&self, id: &str) -> Option<&SchemaCable> {
        self.cables.iter().find(|c| c.id() == id)
    }

    /// Next `<prefix>-<n>` id not already used by a symbol or cable.
    fn fresh_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{prefix}-{}", self.next_id);
            if self.symbol(&id).is_none() && self.cable(&id).is_none() {
                return id;
            }
        }
    }
}
