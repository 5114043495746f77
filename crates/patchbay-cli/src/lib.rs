//! CLI logic for the Patchbay patch diagram tool.
//!
//! Each subcommand loads the configuration, reads a patch document and drives
//! the library's [`Viewer`] or [`Editor`] headlessly, resolving symbol images
//! from the asset directory.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::{fs, sync::Arc};

use futures::executor::block_on;
use log::{info, warn};

use patchbay::{
    Editor, PatchbayError, Viewer, ViewerFrame,
    assets::{FsAssetSource, ImageAssetCache},
    config::AppConfig,
    geometry::Size,
    registry::SymbolRegistry,
    schema::SchemaData,
};

/// Run the Patchbay CLI application
///
/// # Errors
///
/// Returns `PatchbayError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed or invalid patch documents
/// - Export errors
pub fn run(args: &Args) -> Result<(), PatchbayError> {
    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(root) = &args.assets {
        app_config.set_asset_root(root);
    }

    match &args.command {
        Command::Render {
            input,
            output,
            width,
            height,
            embed_images,
        } => {
            if *embed_images {
                app_config.set_embed_images(true);
            }
            render(&app_config, input, output, *width, *height)
        }
        Command::Export { input, output } => export(&app_config, input, output),
        Command::Validate { input } => validate(input),
        Command::Symbols { category } => {
            list_symbols(*category);
            Ok(())
        }
    }
}

fn render(
    app_config: &AppConfig,
    input: &str,
    output: &str,
    width: f32,
    height: Option<f32>,
) -> Result<(), PatchbayError> {
    info!(input_path = input, output_path = output; "Rendering patch");
    let schema = read_schema(input)?;

    let viewer = Viewer::new(asset_cache(app_config), app_config)?;
    block_on(viewer.load(&schema));

    let canvas = app_config.canvas();
    let height = height.unwrap_or(width * canvas.height() / canvas.width());
    match viewer.render(&schema, Size::new(width, height)) {
        ViewerFrame::Rendered { svg, scale, .. } => {
            fs::write(output, svg)?;
            info!(output_file = output, scale = scale; "SVG exported successfully");
        }
        ViewerFrame::Empty => warn!(input_path = input; "Patch is empty, nothing rendered"),
        ViewerFrame::Loading => warn!(input_path = input; "Symbol images did not load"),
    }
    Ok(())
}

fn export(app_config: &AppConfig, input: &str, output: &str) -> Result<(), PatchbayError> {
    info!(input_path = input, output_path = output; "Exporting patch");
    let schema = read_schema(input)?;

    let editor = Editor::with_seed(asset_cache(app_config), app_config, schema)?;
    block_on(editor.load_assets());
    let image = editor.export_image()?;
    fs::write(output, image.png())?;

    info!(output_file = output; "PNG exported successfully");
    Ok(())
}

fn validate(input: &str) -> Result<(), PatchbayError> {
    let src = fs::read_to_string(input)?;
    let schema = match SchemaData::from_json_strict(&src) {
        Ok(schema) => schema,
        Err(err) => return Err(PatchbayError::new_schema_error(err, src)),
    };

    let registry = SymbolRegistry::builtin();
    for id in schema.referenced_symbol_ids() {
        if !registry.contains(&id) {
            warn!(symbol_id = id.as_str(); "Symbol is not in the catalog and will not be drawn");
        }
    }

    info!(
        input_path = input,
        symbols = schema.symbols().len(),
        cables = schema.cables().len();
        "Patch is valid"
    );
    Ok(())
}

fn list_symbols(category: Option<patchbay::registry::SymbolCategory>) {
    let registry = SymbolRegistry::builtin();
    for current in registry.categories() {
        if category.is_some_and(|wanted| wanted != current) {
            continue;
        }
        println!("{}", current.label());
        for definition in registry.list_by_category(current) {
            println!("  {:<16} {}", definition.id(), definition.name());
        }
    }
}

fn read_schema(path: &str) -> Result<SchemaData, PatchbayError> {
    let src = fs::read_to_string(path)?;
    match SchemaData::from_json(&src) {
        Ok(schema) => Ok(schema),
        Err(err) => Err(PatchbayError::new_schema_error(err, src)),
    }
}

fn asset_cache(app_config: &AppConfig) -> ImageAssetCache {
    ImageAssetCache::new(
        Arc::new(SymbolRegistry::builtin()),
        Arc::new(FsAssetSource::new(app_config.assets().root())),
    )
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_read_schema_returns_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patch.json");
        fs::write(&path, r#"{ "symbols": [], "cables": [] }"#).unwrap();

        let schema = read_schema(&path.to_string_lossy()).unwrap();

        assert!(schema.is_empty());
        assert_eq!(schema.version(), "1.0");
    }

    #[test]
    fn test_read_schema_keeps_source_on_syntax_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patch.json");
        fs::write(&path, "{ \"symbols\": [,] }").unwrap();

        let err = read_schema(&path.to_string_lossy()).unwrap_err();

        assert!(matches!(err, PatchbayError::Schema { ref src, .. } if src.contains("symbols")));
    }
}
