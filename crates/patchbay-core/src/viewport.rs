//! Mapping between logical canvas units and display pixels.
//!
//! The canvas has a fixed logical size (see [`CanvasSpec`]). To show it in a
//! container of arbitrary size the [`Viewport`] computes a *fit scale* that
//! never exceeds 1, optionally multiplied by an interactive zoom factor on
//! compact (narrow) containers:
//!
//! ```text
//! fit_scale       = min(container_w / base_w, container_h / base_h, 1)
//! effective_scale = fit_scale * zoom              zoom ∈ [zoom_min, zoom_max]
//! logical         = (display - pan) / effective_scale
//! display         = logical * effective_scale + pan
//! ```
//!
//! Pointer coordinates coming from a rendering surface are display pixels and
//! must go through [`Viewport::to_logical`] before they touch the document.
//!
//! # Example
//!
//! ```
//! use patchbay_core::geometry::{Point, Size};
//! use patchbay_core::viewport::{CanvasSpec, Viewport, ZoomLimits};
//!
//! let viewport = Viewport::new(
//!     CanvasSpec::default(),
//!     ZoomLimits::default(),
//!     Size::new(600.0, 400.0),
//! );
//! assert_eq!(viewport.fit_scale(), 0.5);
//! assert_eq!(viewport.to_logical(Point::new(50.0, 50.0)), Point::new(100.0, 100.0));
//! ```

use crate::geometry::{Bounds, Insets, Point, Size};

/// Fit scale used when the container has no usable size.
pub const MIN_FIT_SCALE: f32 = 0.05;

/// Logical canvas dimensions and the margin enforced while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSpec {
    base: Size,
    margin: f32,
}

impl CanvasSpec {
    pub fn new(base: Size, margin: f32) -> Self {
        Self { base, margin }
    }

    /// Logical canvas size
    pub fn base(&self) -> Size {
        self.base
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    /// Center of the canvas, where new symbols are placed
    pub fn center(&self) -> Point {
        self.base.center()
    }

    /// The whole canvas as bounds
    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(Point::default(), self.base)
    }

    /// The area a dragged symbol's position is clamped to.
    ///
    /// A margin larger than half the canvas collapses the area to the center
    /// line instead of inverting it.
    pub fn drag_area(&self) -> Bounds {
        let margin_x = self.margin.min(self.base.width() / 2.0);
        let margin_y = self.margin.min(self.base.height() / 2.0);
        self.bounds()
            .shrink(Insets::new(margin_y, margin_x, margin_y, margin_x))
    }
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self::new(Size::new(1200.0, 800.0), 50.0)
    }
}

/// Bounds and activation threshold for interactive zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    min: f32,
    max: f32,
    compact_breakpoint: f32,
}

impl ZoomLimits {
    /// Creates zoom limits; `max` is raised to `min` if given lower.
    pub fn new(min: f32, max: f32, compact_breakpoint: f32) -> Self {
        Self {
            min,
            max: max.max(min),
            compact_breakpoint,
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Containers narrower than this (display px) are considered compact
    pub fn compact_breakpoint(&self) -> f32 {
        self.compact_breakpoint
    }

    fn clamp(&self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            zoom.clamp(self.min, self.max)
        } else {
            self.min
        }
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self::new(1.0, 3.0, 768.0)
    }
}

/// Interactive part of the transform: zoom factor and pan offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f32,
    pub pan: Point,
}

impl ViewTransform {
    pub fn identity() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Computes the fit-to-container scale for `base` inside `container`.
///
/// Never exceeds 1. A degenerate container yields [`MIN_FIT_SCALE`].
pub fn fit_scale(base: Size, container: Size) -> f32 {
    if !container.is_positive() || !base.is_positive() {
        return MIN_FIT_SCALE;
    }

    let scale = (container.width() / base.width())
        .min(container.height() / base.height())
        .min(1.0);
    if scale > 0.0 { scale } else { MIN_FIT_SCALE }
}

/// Display transform for one canvas inside one container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    canvas: CanvasSpec,
    limits: ZoomLimits,
    container: Size,
    view: ViewTransform,
}

impl Viewport {
    pub fn new(canvas: CanvasSpec, limits: ZoomLimits, container: Size) -> Self {
        Self {
            canvas,
            limits,
            container,
            view: ViewTransform {
                zoom: limits.min,
                pan: Point::default(),
            },
        }
    }

    /// A viewport showing the canvas at 100% with no zoom or pan.
    pub fn identity(canvas: CanvasSpec) -> Self {
        Self {
            canvas,
            limits: ZoomLimits::default(),
            container: canvas.base,
            view: ViewTransform::identity(),
        }
    }

    pub fn canvas(&self) -> CanvasSpec {
        self.canvas
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    pub fn container(&self) -> Size {
        self.container
    }

    /// Fit-to-container scale, never above 1
    pub fn fit_scale(&self) -> f32 {
        fit_scale(self.canvas.base, self.container)
    }

    /// True when the container is narrow enough for interactive zoom
    pub fn is_compact(&self) -> bool {
        self.container.width() < self.limits.compact_breakpoint
    }

    pub fn zoom(&self) -> f32 {
        self.view.zoom
    }

    pub fn pan(&self) -> Point {
        self.view.pan
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    /// Fit scale multiplied by zoom
    pub fn effective_scale(&self) -> f32 {
        self.fit_scale() * self.view.zoom
    }

    /// On-screen size of the whole canvas
    pub fn display_size(&self) -> Size {
        self.canvas.base.scale(self.effective_scale())
    }

    /// Updates the container size; zoom and pan are re-validated against it.
    pub fn set_container(&mut self, container: Size) {
        self.container = container;
        let view = self.view;
        self.set_view(view);
    }

    /// Sets the zoom factor and returns the value actually applied.
    ///
    /// Outside compact mode zoom stays at the lower bound.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        let pan = self.view.pan;
        self.set_view(ViewTransform { zoom, pan });
        self.view.zoom
    }

    /// Moves the view by a display-pixel delta. Ignored while not zoomed in.
    pub fn pan_by(&mut self, delta: Point) {
        let view = ViewTransform {
            zoom: self.view.zoom,
            pan: self.view.pan.add_point(delta),
        };
        self.set_view(view);
    }

    /// Applies a zoom/pan pair, clamping both.
    pub fn set_view(&mut self, view: ViewTransform) {
        let zoom = if self.is_compact() {
            self.limits.clamp(view.zoom)
        } else {
            self.limits.min
        };
        self.view.zoom = zoom;
        self.view.pan = self.clamp_pan(view.pan);
    }

    /// Drops any zoom and pan.
    pub fn reset_view(&mut self) {
        self.view = ViewTransform {
            zoom: self.limits.min,
            pan: Point::default(),
        };
    }

    /// Converts a display-pixel point into logical canvas units.
    pub fn to_logical(&self, display: Point) -> Point {
        display
            .sub_point(self.view.pan)
            .scale(1.0 / self.effective_scale())
    }

    /// Converts a logical canvas point into display pixels.
    pub fn to_display(&self, logical: Point) -> Point {
        logical
            .scale(self.effective_scale())
            .add_point(self.view.pan)
    }

    /// Clamps a logical position into the margin-bounded drag area.
    pub fn clamp_to_canvas(&self, logical: Point) -> Point {
        logical.clamp_within(self.canvas.drag_area())
    }

    /// Keeps the zoomed stage covering the container: pan lies in
    /// `[container - stage, 0]` per axis, and is zero when the stage fits.
    fn clamp_pan(&self, pan: Point) -> Point {
        if !pan.is_finite() {
            return Point::default();
        }

        let stage = self.display_size();
        let min_x = (self.container.width() - stage.width()).min(0.0);
        let min_y = (self.container.height() - stage.height()).min(0.0);
        pan.clamp_within(Bounds::new(min_x, min_y, 0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(width: f32, height: f32) -> Viewport {
        Viewport::new(
            CanvasSpec::default(),
            ZoomLimits::default(),
            Size::new(width, height),
        )
    }

    #[test]
    fn test_fit_scale_never_upscales() {
        assert_eq!(viewport(2400.0, 1600.0).fit_scale(), 1.0);
        assert_eq!(viewport(1200.0, 800.0).fit_scale(), 1.0);
    }

    #[test]
    fn test_fit_scale_uses_tighter_axis() {
        assert_eq!(viewport(600.0, 800.0).fit_scale(), 0.5);
        assert_eq!(viewport(1200.0, 200.0).fit_scale(), 0.25);
    }

    #[test]
    fn test_fit_scale_degenerate_container() {
        assert_eq!(viewport(0.0, 800.0).fit_scale(), MIN_FIT_SCALE);
        assert_eq!(viewport(-5.0, 800.0).fit_scale(), MIN_FIT_SCALE);
        assert_eq!(viewport(f32::NAN, 800.0).fit_scale(), MIN_FIT_SCALE);
    }

    #[test]
    fn test_fit_scale_small_container_is_not_floored() {
        let vp = viewport(24.0, 16.0);
        assert_eq!(vp.fit_scale(), 0.02);

        let corner = vp.to_logical(Point::new(24.0, 16.0));
        assert!((corner.x() - 1200.0).abs() < 0.01, "x = {}", corner.x());
        assert!((corner.y() - 800.0).abs() < 0.01, "y = {}", corner.y());

        let size = vp.display_size();
        assert!(size.width() <= 24.0 + 1e-4 && size.height() <= 16.0 + 1e-4);
    }

    #[test]
    fn test_to_logical_divides_by_effective_scale() {
        let vp = viewport(600.0, 400.0);
        assert_eq!(vp.effective_scale(), 0.5);
        assert_eq!(
            vp.to_logical(Point::new(300.0, 200.0)),
            Point::new(600.0, 400.0)
        );
        assert_eq!(
            vp.to_display(Point::new(600.0, 400.0)),
            Point::new(300.0, 200.0)
        );
    }

    #[test]
    fn test_zoom_only_in_compact_mode() {
        let mut wide = viewport(1000.0, 700.0);
        assert!(!wide.is_compact());
        assert_eq!(wide.set_zoom(2.0), 1.0);

        let mut narrow = viewport(600.0, 400.0);
        assert!(narrow.is_compact());
        assert_eq!(narrow.set_zoom(2.0), 2.0);
        assert_eq!(narrow.effective_scale(), 1.0);
    }

    #[test]
    fn test_zoom_is_bounded() {
        let mut vp = viewport(600.0, 400.0);
        assert_eq!(vp.set_zoom(10.0), 3.0);
        assert_eq!(vp.set_zoom(0.1), 1.0);
        assert_eq!(vp.set_zoom(f32::NAN), 1.0);
    }

    #[test]
    fn test_leaving_compact_mode_drops_zoom() {
        let mut vp = viewport(600.0, 400.0);
        vp.set_zoom(2.5);
        vp.pan_by(Point::new(-100.0, -50.0));

        vp.set_container(Size::new(1400.0, 900.0));

        assert_eq!(vp.zoom(), 1.0);
        assert_eq!(vp.pan(), Point::default());
    }

    #[test]
    fn test_pan_is_clamped_to_stage() {
        let mut vp = viewport(600.0, 400.0);
        // Not zoomed: the stage fits, so pan stays at zero
        vp.pan_by(Point::new(-40.0, -40.0));
        assert_eq!(vp.pan(), Point::default());

        // Zoomed 2x: stage is 1200x800 inside 600x400
        vp.set_zoom(2.0);
        vp.pan_by(Point::new(-1000.0, 50.0));
        assert_eq!(vp.pan(), Point::new(-600.0, 0.0));
    }

    #[test]
    fn test_pan_participates_in_mapping() {
        let mut vp = viewport(600.0, 400.0);
        vp.set_zoom(2.0);
        vp.pan_by(Point::new(-100.0, -100.0));

        let logical = vp.to_logical(Point::new(0.0, 0.0));
        assert_eq!(logical, Point::new(100.0, 100.0));
        assert_eq!(vp.to_display(logical), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_reset_view() {
        let mut vp = viewport(600.0, 400.0);
        vp.set_zoom(3.0);
        vp.pan_by(Point::new(-10.0, -10.0));
        vp.reset_view();
        assert_eq!(vp.view(), ViewTransform::identity());
    }

    #[test]
    fn test_identity_viewport() {
        let vp = Viewport::identity(CanvasSpec::default());
        assert_eq!(vp.effective_scale(), 1.0);
        assert_eq!(vp.display_size(), Size::new(1200.0, 800.0));
    }

    #[test]
    fn test_clamp_to_canvas_margin() {
        let vp = viewport(1200.0, 800.0);
        assert_eq!(
            vp.clamp_to_canvas(Point::new(5.0, 5.0)),
            Point::new(50.0, 50.0)
        );
        assert_eq!(
            vp.clamp_to_canvas(Point::new(1199.0, 799.0)),
            Point::new(1150.0, 750.0)
        );
    }

    #[test]
    fn test_drag_area_with_oversized_margin() {
        let canvas = CanvasSpec::new(Size::new(100.0, 60.0), 80.0);
        let area = canvas.drag_area();
        assert_eq!(area.min_x(), 50.0);
        assert_eq!(area.max_x(), 50.0);
        assert_eq!(area.min_y(), 30.0);
        assert_eq!(area.max_y(), 30.0);
    }
}
