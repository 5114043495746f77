//! Command-line argument definitions for the Patchbay CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand picks the operation; the global flags control
//! configuration file selection, the asset directory and logging verbosity.

use clap::{Parser, Subcommand};

use patchbay::registry::SymbolCategory;

/// Command-line arguments for the Patchbay patch diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Directory symbol asset URLs are resolved against
    #[arg(long, global = true)]
    pub assets: Option<String>,
}

/// Operations on patch documents.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a patch to SVG as the read-only viewer shows it
    Render {
        /// Path to the patch JSON document
        input: String,

        /// Path to the output SVG file
        #[arg(short, long, default_value = "out.svg")]
        output: String,

        /// Container width in pixels
        #[arg(long, default_value_t = 1200.0)]
        width: f32,

        /// Container height in pixels, follows the aspect ratio when omitted
        #[arg(long)]
        height: Option<f32>,

        /// Inline symbol images as data URIs
        #[arg(long)]
        embed_images: bool,
    },

    /// Export a patch to PNG
    Export {
        /// Path to the patch JSON document
        input: String,

        /// Path to the output PNG file
        #[arg(short, long, default_value = patchbay::EXPORT_FILE_NAME)]
        output: String,
    },

    /// Check a patch document for invalid entries
    Validate {
        /// Path to the patch JSON document
        input: String,
    },

    /// List the symbol catalog
    Symbols {
        /// Only list one category
        #[arg(long)]
        category: Option<SymbolCategory>,
    },
}
