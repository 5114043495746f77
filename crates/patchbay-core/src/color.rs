//! Color handling for Patchbay diagrams
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Cable colors travel over the wire as `#RRGGBB` strings,
//! so the wrapper also knows how to produce that canonical hex form.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::{DynamicColor, Srgb};

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rgba8().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a CSS color string such as "#ffd700",
    /// "rgb(255, 0, 0)" or "gold".
    ///
    /// # Examples
    ///
    /// ```
    /// use patchbay_core::color::Color;
    ///
    /// let gold = Color::new("#FFD700").unwrap();
    /// assert_eq!(gold.to_hex(), "#FFD700");
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Returns the color as 8-bit sRGB components `[r, g, b, a]`.
    pub fn rgba8(self) -> [u8; 4] {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        [rgba.r, rgba.g, rgba.b, rgba.a]
    }

    /// Returns the uppercase `#RRGGBB` form used by the schema wire format.
    ///
    /// Alpha is dropped; use [`Color::alpha`] alongside it when opacity matters.
    ///
    /// # Examples
    ///
    /// ```
    /// use patchbay_core::color::Color;
    ///
    /// assert_eq!(Color::new("red").unwrap().to_hex(), "#FF0000");
    /// ```
    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.rgba8();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// Creates a new color with the specified alpha (transparency) value.
    ///
    /// # Arguments
    ///
    /// * `alpha` - The alpha value to set, between 0.0 (fully transparent)
    ///   and 1.0 (fully opaque)
    pub fn with_alpha(self, alpha: f32) -> Self {
        Color {
            color: self.color.with_alpha(alpha),
        }
    }

    /// Returns the alpha component of this color, between 0.0 and 1.0.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<&Color> for svg::node::Value {
    fn from(color: &Color) -> Self {
        Self::from(color.to_hex())
    }
}

impl From<Color> for svg::node::Value {
    fn from(color: Color) -> Self {
        Self::from(color.to_hex())
    }
}
