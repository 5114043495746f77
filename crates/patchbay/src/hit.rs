//! Picking the element under a logical point.
//!
//! Priority order: Symbol > Cable > None. Among symbols the topmost one (the
//! last in document order) wins; among cables likewise.

use log::trace;

use patchbay_core::geometry::Point;

use crate::{
    editor::Selection,
    scene::{PlacedImage, Scene},
};

/// Returns what lies under `point`, if anything.
///
/// Symbols are tested against their rotated footprint. Cables are hit when
/// the point is within half the stroke width plus `slop` of any segment.
pub(crate) fn hit_test(scene: &Scene<'_>, point: Point, slop: f32) -> Option<Selection> {
    let symbol = scene
        .placed_images()
        .into_iter()
        .rev()
        .find(|placed| symbol_contains(placed, point));
    if let Some(placed) = symbol {
        trace!(id = placed.symbol.id(); "Hit symbol");
        return Some(Selection::Symbol(placed.symbol.id().to_string()));
    }

    let cable = scene.cables.iter().rev().find(|cable| {
        let reach = cable.stroke_width() as f32 / 2.0 + slop;
        cable
            .segments()
            .into_iter()
            .any(|(a, b)| point.distance_to_segment(a, b) <= reach)
    });
    if let Some(cable) = cable {
        trace!(id = cable.id(); "Hit cable");
        return Some(Selection::Cable(cable.id().to_string()));
    }

    None
}

fn symbol_contains(placed: &PlacedImage<'_>, point: Point) -> bool {
    let local = point
        .sub_point(placed.center())
        .rotate(-placed.rotation());
    local.x().abs() <= placed.size.width() / 2.0 && local.y().abs() <= placed.size.height() / 2.0
}
