//! Configuration types for Patchbay editors and viewers.
//!
//! This module provides configuration structures that control the canvas
//! geometry, editor interaction, and rendering style. All types implement
//! [`serde::Deserialize`] for loading from external sources; every field has
//! a default so partial files are valid.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`CanvasConfig`] - Logical canvas size, drag margin and grid spacing.
//! - [`EditorConfig`] - Zoom limits, hit slop, symbol defaults and export ratio.
//! - [`StyleConfig`] - Background, grid and selection colors.
//! - [`AssetsConfig`] - Where symbol images are read from and whether to inline them.
//!
//! # Example
//!
//! ```
//! # use patchbay::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.canvas().width(), 1200.0);
//! assert!(config.style().background_color().is_ok());
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use patchbay_core::{
    color::Color,
    geometry::Size,
    viewport::{CanvasSpec, ZoomLimits},
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Canvas configuration section.
    #[serde(default)]
    canvas: CanvasConfig,

    /// Editor configuration section.
    #[serde(default)]
    editor: EditorConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Asset configuration section.
    #[serde(default)]
    assets: AssetsConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        canvas: CanvasConfig,
        editor: EditorConfig,
        style: StyleConfig,
        assets: AssetsConfig,
    ) -> Self {
        Self {
            canvas,
            editor,
            style,
            assets,
        }
    }

    /// Returns the canvas configuration.
    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    /// Returns the editor configuration.
    pub fn editor(&self) -> &EditorConfig {
        &self.editor
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the asset configuration.
    pub fn assets(&self) -> &AssetsConfig {
        &self.assets
    }

    /// Overrides the asset root directory.
    pub fn set_asset_root(&mut self, root: impl Into<PathBuf>) {
        self.assets.root = Some(root.into());
    }

    /// Inlines image bytes into SVG output instead of linking asset URLs.
    pub fn set_embed_images(&mut self, embed: bool) {
        self.assets.embed_images = embed;
    }
}

/// Logical canvas geometry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    width: f32,
    height: f32,
    margin: f32,
    /// Grid spacing in logical units; zero disables the grid.
    grid: f32,
}

impl CanvasConfig {
    pub fn new(width: f32, height: f32, margin: f32, grid: f32) -> Self {
        Self {
            width,
            height,
            margin,
            grid,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn grid(&self) -> f32 {
        self.grid
    }

    /// The canvas as a [`CanvasSpec`].
    pub fn spec(&self) -> CanvasSpec {
        CanvasSpec::new(Size::new(self.width, self.height), self.margin)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        let spec = CanvasSpec::default();
        Self {
            width: spec.base().width(),
            height: spec.base().height(),
            margin: spec.margin(),
            grid: 20.0,
        }
    }
}

/// Editor interaction settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    default_symbol_scale: f64,
    zoom_min: f32,
    zoom_max: f32,
    zoom_step: f32,
    compact_breakpoint: f32,
    hit_slop: f32,
    fallback_footprint: f32,
    export_pixel_ratio: f32,
}

impl EditorConfig {
    /// Scale given to newly added symbols.
    pub fn default_symbol_scale(&self) -> f64 {
        self.default_symbol_scale
    }

    /// Zoom bounds and the compact-mode breakpoint as [`ZoomLimits`].
    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits::new(self.zoom_min, self.zoom_max, self.compact_breakpoint)
    }

    /// Increment used by zoom in/out buttons.
    pub fn zoom_step(&self) -> f32 {
        self.zoom_step
    }

    /// Extra tolerance, in logical units, when picking a cable.
    pub fn hit_slop(&self) -> f32 {
        self.hit_slop
    }

    /// Side length used for symbols whose image has no intrinsic size.
    pub fn fallback_footprint(&self) -> Size {
        Size::new(self.fallback_footprint, self.fallback_footprint)
    }

    /// Output pixels per logical unit for raster export.
    pub fn export_pixel_ratio(&self) -> f32 {
        self.export_pixel_ratio
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        let limits = ZoomLimits::default();
        Self {
            default_symbol_scale: 0.5,
            zoom_min: limits.min(),
            zoom_max: limits.max(),
            zoom_step: 0.25,
            compact_breakpoint: limits.compact_breakpoint(),
            hit_slop: 6.0,
            fallback_footprint: 120.0,
            export_pixel_ratio: 2.0,
        }
    }
}

/// Visual styling configuration.
///
/// Colors are stored as strings and parsed on access; unset fields fall
/// back to the built-in palette.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    background_color: Option<String>,

    #[serde(default)]
    grid_color: Option<String>,

    #[serde(default)]
    selection_color: Option<String>,
}

impl StyleConfig {
    /// Returns the canvas background [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Color, String> {
        parse_color("background", self.background_color.as_deref(), "#FFFFFF")
    }

    /// Returns the grid line [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn grid_color(&self) -> Result<Color, String> {
        parse_color("grid", self.grid_color.as_deref(), "#E5E7EB")
    }

    /// Returns the selection highlight [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn selection_color(&self) -> Result<Color, String> {
        parse_color("selection", self.selection_color.as_deref(), "#3B82F6")
    }
}

fn parse_color(name: &str, configured: Option<&str>, default: &str) -> Result<Color, String> {
    Color::new(configured.unwrap_or(default))
        .map_err(|err| format!("Invalid {name} color in config: {err}"))
}

/// Symbol asset settings.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AssetsConfig {
    /// Directory that asset URLs are resolved against.
    #[serde(default)]
    root: Option<PathBuf>,

    /// Inline image bytes as data URIs in SVG output.
    #[serde(default)]
    embed_images: bool,
}

impl AssetsConfig {
    /// Asset root directory, the working directory when unset.
    pub fn root(&self) -> &Path {
        self.root.as_deref().unwrap_or(Path::new("."))
    }

    pub fn embed_images(&self) -> bool {
        self.embed_images
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.canvas().spec(), CanvasSpec::default());
        assert_eq!(config.editor().default_symbol_scale(), 0.5);
        assert_eq!(config.editor().zoom_limits(), ZoomLimits::default());
        assert_eq!(config.editor().export_pixel_ratio(), 2.0);
        assert_eq!(config.assets().root(), Path::new("."));
        assert!(!config.assets().embed_images());
    }

    #[test]
    fn test_style_colors_default_and_override() {
        let style = StyleConfig::default();
        assert_eq!(style.background_color().unwrap().to_hex(), "#FFFFFF");

        let style = StyleConfig {
            grid_color: Some("black".to_string()),
            selection_color: Some("nope".to_string()),
            ..StyleConfig::default()
        };
        assert_eq!(style.grid_color().unwrap().to_hex(), "#000000");
        let err = style.selection_color().unwrap_err();
        assert!(err.starts_with("Invalid selection color in config"));
    }

    #[test]
    fn test_set_asset_root() {
        let mut config = AppConfig::default();
        config.set_asset_root("/srv/assets");
        assert_eq!(config.assets().root(), Path::new("/srv/assets"));
    }
}
