//! The serializable diagram document.
//!
//! [`SchemaData`] is the only artifact that crosses the boundary to the host:
//! an ordered list of placed symbols, an ordered list of cables, and a format
//! version tag. The JSON shape is fixed:
//!
//! ```json
//! {
//!   "symbols": [{ "id": "symbol-1", "symbolId": "vco-sine", "x": 600, "y": 400, "rotation": 0, "scale": 0.5 }],
//!   "cables": [{ "id": "cable-1", "points": [100, 100, 400, 300], "color": "#FFD700", "type": "audio", "strokeWidth": 3 }],
//!   "version": "1.0"
//! }
//! ```
//!
//! Cable colors are baked in when a cable is created. Nothing in this module
//! recomputes a color from [`CableType`] for an existing cable.

use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{color::Color, geometry::Point};

/// Version tag written into every saved document.
pub const SCHEMA_VERSION: &str = "1.0";

/// Stroke width of every cable created by the editor.
pub const CABLE_STROKE_WIDTH: f64 = 3.0;

/// Minimum length of a cable point array (one segment).
pub const MIN_CABLE_POINTS: usize = 4;

/// Errors produced while reading a document.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema has {} issue(s), first: {}", .0.len(), .0[0])]
    Invalid(Vec<SchemaIssue>),
}

/// A single invariant violation found by [`SchemaData::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaIssue {
    #[error("duplicate symbol id `{0}`")]
    DuplicateSymbolId(String),

    #[error("duplicate cable id `{0}`")]
    DuplicateCableId(String),

    #[error("symbol `{0}` has an empty symbolId")]
    EmptySymbolRef(String),

    #[error("symbol `{0}` has a non-finite coordinate, rotation or scale")]
    NonFiniteSymbol(String),

    #[error("cable `{id}` has {len} point values, expected an even count of at least 4")]
    InvalidPoints { id: String, len: usize },

    #[error("cable `{0}` has a non-finite point value or stroke width")]
    NonFiniteCable(String),

    #[error("cable `{id}` has invalid color `{color}`")]
    InvalidColor { id: String, color: String },
}

/// Signal kind carried by a cable; selects the color at creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CableType {
    #[default]
    Audio,
    Pitch,
    Cv,
    Gate,
    Clock,
}

impl CableType {
    /// All cable types in palette order.
    pub const ALL: [CableType; 5] = [
        Self::Audio,
        Self::Pitch,
        Self::Cv,
        Self::Gate,
        Self::Clock,
    ];

    /// The `#RRGGBB` color a new cable of this type is created with.
    pub fn palette_hex(self) -> &'static str {
        match self {
            Self::Audio => "#FFD700",
            Self::Pitch => "#4169E1",
            Self::Cv => "#32CD32",
            Self::Gate => "#FF4500",
            Self::Clock => "#BA55D3",
        }
    }

    /// Parsed palette color.
    pub fn color(self) -> Color {
        Color::new(self.palette_hex()).expect("palette colors are valid hex")
    }

    /// Human-readable label for toolbars.
    pub fn label(self) -> &'static str {
        match self {
            Self::Audio => "Audio",
            Self::Pitch => "Pitch (1V/oct)",
            Self::Cv => "CV",
            Self::Gate => "Gate / Trigger",
            Self::Clock => "Clock",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Pitch => "pitch",
            Self::Cv => "cv",
            Self::Gate => "gate",
            Self::Clock => "clock",
        }
    }
}

impl fmt::Display for CableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!("invalid cable type `{s}`, valid values: audio, pitch, cv, gate, clock")
            })
    }
}

/// A placed symbol.
///
/// `x`/`y` are logical canvas units and locate the center of the symbol.
/// `rotation` (degrees) and `scale` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSymbol {
    id: String,
    symbol_id: String,
    x: f64,
    y: f64,
    #[serde(default)]
    rotation: f64,
    #[serde(default = "default_scale")]
    scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl SchemaSymbol {
    pub fn new(id: impl Into<String>, symbol_id: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            symbol_id: symbol_id.into(),
            x: f64::from(position.x()),
            y: f64::from(position.y()),
            rotation: 0.0,
            scale: 1.0,
        }
    }

    /// Sets the scale multiplier, builder style.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the rotation in degrees, builder style.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Registry id of the symbol definition this placement refers to
    pub fn symbol_id(&self) -> &str {
        &self.symbol_id
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Center position as a geometry point.
    pub fn position(&self) -> Point {
        Point::new(self.x as f32, self.y as f32)
    }

    /// Moves the symbol. No bounds are applied here.
    pub fn set_position(&mut self, position: Point) {
        self.x = f64::from(position.x());
        self.y = f64::from(position.y());
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.rotation.is_finite()
            && self.scale.is_finite()
    }
}

/// A colored straight connection between two free-floating points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaCable {
    id: String,
    points: Vec<f64>,
    color: String,
    #[serde(rename = "type")]
    cable_type: CableType,
    #[serde(default = "default_stroke_width")]
    stroke_width: f64,
}

fn default_stroke_width() -> f64 {
    CABLE_STROKE_WIDTH
}

impl SchemaCable {
    /// Creates a single-segment cable with the palette color of `cable_type`.
    pub fn segment(id: impl Into<String>, start: Point, end: Point, cable_type: CableType) -> Self {
        Self {
            id: id.into(),
            points: vec![
                f64::from(start.x()),
                f64::from(start.y()),
                f64::from(end.x()),
                f64::from(end.y()),
            ],
            color: cable_type.palette_hex().to_string(),
            cable_type,
            stroke_width: CABLE_STROKE_WIDTH,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Flat `[x0, y0, x1, y1, ...]` point array
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// The color stored on the cable, as saved
    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn cable_type(&self) -> CableType {
        self.cable_type
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// Point pairs as geometry points; a trailing odd value is ignored.
    pub fn vertices(&self) -> Vec<Point> {
        self.points
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0] as f32, pair[1] as f32))
            .collect()
    }

    /// Consecutive vertex pairs.
    pub fn segments(&self) -> Vec<(Point, Point)> {
        self.vertices()
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    }

    fn has_valid_points(&self) -> bool {
        self.points.len() >= MIN_CABLE_POINTS && self.points.len() % 2 == 0
    }

    fn is_finite(&self) -> bool {
        self.points.iter().all(|v| v.is_finite()) && self.stroke_width.is_finite()
    }
}

/// The diagram document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaData {
    #[serde(default)]
    symbols: Vec<SchemaSymbol>,
    #[serde(default)]
    cables: Vec<SchemaCable>,
    #[serde(default = "default_version")]
    version: String,
}

fn default_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl Default for SchemaData {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl SchemaData {
    /// Packages symbols and cables under the current version tag.
    pub fn new(symbols: Vec<SchemaSymbol>, cables: Vec<SchemaCable>) -> Self {
        Self {
            symbols,
            cables,
            version: default_version(),
        }
    }

    /// Parses a document from JSON. Invariants are not checked; see [`Self::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] if the text is not a well-formed document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses and validates a document in one step.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] for malformed input and
    /// [`SchemaError::Invalid`] when any invariant is violated.
    pub fn from_json_strict(json: &str) -> Result<Self, SchemaError> {
        let data = Self::from_json(json)?;
        data.validate().map_err(SchemaError::Invalid)?;
        Ok(data)
    }

    /// Serializes the document as compact JSON.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the document as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn symbols(&self) -> &[SchemaSymbol] {
        &self.symbols
    }

    pub fn cables(&self) -> &[SchemaCable] {
        &self.cables
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// True when there are no symbols and no cables.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.cables.is_empty()
    }

    /// Distinct registry ids referenced by placed symbols, in first-appearance order.
    pub fn referenced_symbol_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.symbols
            .iter()
            .filter(|symbol| seen.insert(symbol.symbol_id.as_str()))
            .map(|symbol| symbol.symbol_id.clone())
            .collect()
    }

    /// Checks every document invariant, collecting all violations.
    pub fn validate(&self) -> Result<(), Vec<SchemaIssue>> {
        let mut issues = Vec::new();

        let mut symbol_ids = HashSet::new();
        for symbol in &self.symbols {
            issues.extend(symbol_issue(symbol, &mut symbol_ids));
        }

        let mut cable_ids = HashSet::new();
        for cable in &self.cables {
            issues.extend(cable_issue(cable, &mut cable_ids));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Returns a copy with every invalid entry dropped, plus what was dropped.
    ///
    /// The first occurrence of a duplicated id is kept.
    pub fn sanitized(&self) -> (SchemaData, Vec<SchemaIssue>) {
        let mut issues = Vec::new();

        let mut symbol_ids = HashSet::new();
        let symbols = self
            .symbols
            .iter()
            .filter(|symbol| match symbol_issue(*symbol, &mut symbol_ids) {
                Some(issue) => {
                    issues.push(issue);
                    false
                }
                None => true,
            })
            .cloned()
            .collect();

        let mut cable_ids = HashSet::new();
        let cables = self
            .cables
            .iter()
            .filter(|cable| match cable_issue(*cable, &mut cable_ids) {
                Some(issue) => {
                    issues.push(issue);
                    false
                }
                None => true,
            })
            .cloned()
            .collect();

        let data = SchemaData {
            symbols,
            cables,
            version: self.version.clone(),
        };
        (data, issues)
    }

    /// Splits the document into its parts.
    pub fn into_parts(self) -> (Vec<SchemaSymbol>, Vec<SchemaCable>) {
        (self.symbols, self.cables)
    }
}

fn symbol_issue<'a>(symbol: &'a SchemaSymbol, seen: &mut HashSet<&'a str>) -> Option<SchemaIssue> {
    if symbol.symbol_id.trim().is_empty() {
        return Some(SchemaIssue::EmptySymbolRef(symbol.id.clone()));
    }
    if !symbol.is_finite() {
        return Some(SchemaIssue::NonFiniteSymbol(symbol.id.clone()));
    }
    if !seen.insert(symbol.id.as_str()) {
        return Some(SchemaIssue::DuplicateSymbolId(symbol.id.clone()));
    }
    None
}

fn cable_issue<'a>(cable: &'a SchemaCable, seen: &mut HashSet<&'a str>) -> Option<SchemaIssue> {
    if !cable.has_valid_points() {
        return Some(SchemaIssue::InvalidPoints {
            id: cable.id.clone(),
            len: cable.points.len(),
        });
    }
    if !cable.is_finite() {
        return Some(SchemaIssue::NonFiniteCable(cable.id.clone()));
    }
    if Color::new(&cable.color).is_err() {
        return Some(SchemaIssue::InvalidColor {
            id: cable.id.clone(),
            color: cable.color.clone(),
        });
    }
    if !seen.insert(cable.id.as_str()) {
        return Some(SchemaIssue::DuplicateCableId(cable.id.clone()));
    }
    None
}
