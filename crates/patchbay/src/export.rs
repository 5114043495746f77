//! Output backends for diagrams.
//!
//! Both editors and viewers describe a frame as a [`Scene`] and hand it to
//! one of the backends here:
//!
//! - [`svg`] — SVG documents built from z-ordered drawables
//! - [`raster`] — RGBA rasterization and PNG encoding
//!
//! # Error Handling
//!
//! Export operations return [`Error`], which converts into
//! [`PatchbayError::Export`] at the crate boundary.
//!
//! [`Scene`]: crate::scene::Scene
//! [`PatchbayError::Export`]: crate::PatchbayError::Export

pub(crate) mod raster;
pub(crate) mod svg;

use thiserror::Error;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum Error {
    /// A rendering failure described by `message`.
    #[error("Render error: {0}")]
    Render(String),

    /// Image encoding failed.
    #[error("Encode error: {0}")]
    Encode(#[from] image::ImageError),
}
