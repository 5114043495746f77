//! Software rasterization of a [`Scene`] to RGBA pixels.
//!
//! Only the document is drawn: background, grid, cables and symbols.
//! Selection highlights and cable drafts are interaction state and never
//! reach an exported image. SVG symbol assets have no pixels and are
//! skipped.

use std::io::Cursor;

use image::{ImageFormat, Pixel, Rgba, RgbaImage};
use log::debug;

use patchbay_core::{color::Color, geometry::Point};

use super::Error;
use crate::scene::{PlacedImage, Scene};

/// Largest accepted output side, in pixels.
const MAX_DIMENSION: u32 = 16_384;

/// Draws `scene` at `pixel_ratio` output pixels per logical unit.
///
/// # Errors
///
/// Returns [`Error::Render`] when the ratio is not positive or the output
/// would exceed [`MAX_DIMENSION`] on either side.
pub(crate) fn rasterize(scene: &Scene<'_>, pixel_ratio: f32) -> Result<RgbaImage, Error> {
    if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
        return Err(Error::Render(format!("invalid pixel ratio {pixel_ratio}")));
    }

    let size = scene.canvas.base().scale(pixel_ratio);
    let width = size.width().ceil();
    let height = size.height().ceil();
    if !(1.0..=MAX_DIMENSION as f32).contains(&width) || !(1.0..=MAX_DIMENSION as f32).contains(&height)
    {
        return Err(Error::Render(format!(
            "output size {width}x{height} is outside 1..={MAX_DIMENSION}"
        )));
    }

    let style = scene.style;
    let mut canvas = RgbaImage::from_pixel(width as u32, height as u32, Rgba([0, 0, 0, 0]));
    fill_rect(&mut canvas, Point::default(), Point::new(width, height), style.background);

    let spacing = style.grid_spacing;
    if spacing.is_finite() && spacing >= 1.0 {
        let half = pixel_ratio / 2.0;
        let mut x = spacing;
        while x < scene.canvas.base().width() {
            let px = x * pixel_ratio;
            fill_rect(&mut canvas, Point::new(px - half, 0.0), Point::new(px + half, height), style.grid);
            x += spacing;
        }
        let mut y = spacing;
        while y < scene.canvas.base().height() {
            let py = y * pixel_ratio;
            fill_rect(&mut canvas, Point::new(0.0, py - half), Point::new(width, py + half), style.grid);
            y += spacing;
        }
    }

    for (cable, color, vertices) in scene.drawable_cables() {
        let thickness = cable.stroke_width() as f32 * pixel_ratio;
        for pair in vertices.windows(2) {
            stroke_segment(
                &mut canvas,
                pair[0].scale(pixel_ratio),
                pair[1].scale(pixel_ratio),
                thickness,
                color,
            );
        }
    }

    for placed in scene.placed_images() {
        draw_symbol(&mut canvas, &placed, pixel_ratio);
    }

    debug!(width = canvas.width(), height = canvas.height(); "Scene rasterized");
    Ok(canvas)
}

/// Encodes pixels as PNG.
pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Pixel index range covering `[min, max)` clamped to `limit`.
fn pixel_span(min: f32, max: f32, limit: u32) -> std::ops::Range<u32> {
    let start = min.floor().max(0.0).min(limit as f32) as u32;
    let end = max.ceil().max(0.0).min(limit as f32) as u32;
    start..end
}

fn blend(canvas: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    canvas.get_pixel_mut(x, y).blend(&color);
}

/// Fills the axis-aligned rectangle between `min` and `max`, pixel centers inclusive.
fn fill_rect(canvas: &mut RgbaImage, min: Point, max: Point, color: Color) {
    let color = Rgba(color.rgba8());
    for y in pixel_span(min.y(), max.y(), canvas.height()) {
        let cy = y as f32 + 0.5;
        if cy < min.y() || cy > max.y() {
            continue;
        }
        for x in pixel_span(min.x(), max.x(), canvas.width()) {
            let cx = x as f32 + 0.5;
            if cx >= min.x() && cx <= max.x() {
                blend(canvas, x, y, color);
            }
        }
    }
}

/// Strokes `a`-`b` with round caps: every pixel whose center lies within
/// half the thickness of the segment is painted.
fn stroke_segment(canvas: &mut RgbaImage, a: Point, b: Point, thickness: f32, color: Color) {
    let reach = thickness / 2.0;
    let color = Rgba(color.rgba8());
    let rows = pixel_span(a.y().min(b.y()) - reach, a.y().max(b.y()) + reach, canvas.height());
    let cols = pixel_span(a.x().min(b.x()) - reach, a.x().max(b.x()) + reach, canvas.width());

    for y in rows {
        for x in cols.clone() {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if center.distance_to_segment(a, b) <= reach {
                blend(canvas, x, y, color);
            }
        }
    }
}

/// Composites a symbol's pixels, scaled to its footprint and rotated about
/// its center, with nearest-neighbour sampling.
fn draw_symbol(canvas: &mut RgbaImage, placed: &PlacedImage<'_>, pixel_ratio: f32) {
    let Some(pixels) = placed.image.pixels() else {
        debug!(id = placed.symbol.id(); "Skipping SVG symbol in raster export");
        return;
    };

    let size = placed.size.scale(pixel_ratio);
    if !size.is_positive() || pixels.width() == 0 || pixels.height() == 0 {
        return;
    }

    let center = placed.center().scale(pixel_ratio);
    let radius = size.width().hypot(size.height()) / 2.0;
    let rows = pixel_span(center.y() - radius, center.y() + radius, canvas.height());
    let cols = pixel_span(center.x() - radius, center.x() + radius, canvas.width());
    let (src_w, src_h) = (pixels.width() as f32, pixels.height() as f32);

    for y in rows {
        for x in cols.clone() {
            let offset = Point::new(x as f32 + 0.5, y as f32 + 0.5).sub_point(center);
            let local = offset.rotate(-placed.rotation());
            let u = (local.x() / size.width() + 0.5) * src_w;
            let v = (local.y() / size.height() + 0.5) * src_h;
            if u < 0.0 || v < 0.0 || u >= src_w || v >= src_h {
                continue;
            }
            let sample = *pixels.get_pixel(u as u32, v as u32);
            blend(canvas, x, y, sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use patchbay_core::{
        geometry::Size,
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
        let mut style = RenderStyle::from_config(&AppConfig::default()).unwrap();
        style.grid_spacing = 0.0;
        style
    }

    fn small_canvas() -> CanvasSpec {
        CanvasSpec::new(Size::new(100.0, 50.0), 10.0)
    }

    #[test]
    fn test_output_size_follows_pixel_ratio() {
        let style = style();
        let scene = Scene::new(small_canvas(), &style, &[], &[], None);

        let image = rasterize(&scene, 2.0).unwrap();
        assert_eq!(image.dimensions(), (200, 100));
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_invalid_ratio_is_an_error() {
        let style = style();
        let scene = Scene::new(small_canvas(), &style, &[], &[], None);

        assert!(matches!(rasterize(&scene, 0.0), Err(Error::Render(_))));
        assert!(matches!(rasterize(&scene, 1000.0), Err(Error::Render(_))));
    }

    #[test]
    fn test_cables_and_symbols_are_painted() {
        let style = style();
        let cables = vec![SchemaCable::segment(
            "cable-1",
            Point::new(10.0, 10.0),
            Point::new(90.0, 10.0),
            CableType::Pitch,
        )];
        let symbols = vec![SchemaSymbol::new("symbol-1", "vco", Point::new(50.0, 35.0))];
        let image = SymbolImage::decode("vco", "/vco.png", png(10, 10, [255, 0, 0, 255])).unwrap();
        let images = ImageMap::from([("vco".to_string(), Arc::new(image))]);
        let scene = Scene::new(small_canvas(), &style, &symbols, &cables, Some(&images));

        let raster = rasterize(&scene, 1.0).unwrap();

        assert_eq!(raster.get_pixel(50, 10).0, [0x41, 0x69, 0xE1, 255]);
        assert_eq!(raster.get_pixel(50, 35).0, [255, 0, 0, 255]);
        assert_eq!(raster.get_pixel(50, 20).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_png_encoding() {
        let style = style();
        let scene = Scene::new(small_canvas(), &style, &[], &[], None);
        let bytes = encode_png(&rasterize(&scene, 1.0).unwrap()).unwrap();

        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 50));
    }
}
