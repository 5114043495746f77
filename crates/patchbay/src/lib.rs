//! Patchbay - an editor and viewer for synthesizer patch diagrams.
//!
//! A patch is a [`SchemaData`](schema::SchemaData) document of placed
//! symbols joined by colored cables. This crate provides:
//!
//! - [`Editor`]: the interactive, stateful editor (tools, selection, drag,
//!   cable drawing, save and PNG export)
//! - [`Viewer`]: a read-only renderer producing SVG at a responsive scale
//! - [`ImageAssetCache`](assets::ImageAssetCache): the shared, deduplicating
//!   symbol image loader both of them draw from
//!
//! Pure data types (geometry, colors, registry, schema, viewport) live in
//! `patchbay-core` and are re-exported here.

pub mod assets;
pub mod config;
pub mod editor;
pub mod export;
pub mod viewer;

mod error;
mod hit;
mod scene;

pub use patchbay_core::{color, draw, geometry, registry, schema, viewport};

pub use editor::{
    CableDraft, Confirm, EXPORT_FILE_NAME, Editor, EditorKey, ExportedImage, Selection, Tool,
};
pub use error::PatchbayError;
pub use viewer::{Viewer, ViewerFrame};
