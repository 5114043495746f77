//! The symbol catalog.
//!
//! A [`SymbolRegistry`] is an immutable, insertion-ordered lookup table of
//! [`SymbolDefinition`]s. Placed symbols in a diagram reference a definition
//! by id; many placements may share one definition.
//!
//! # Example
//!
//! ```
//! use patchbay_core::registry::{SymbolCategory, SymbolRegistry};
//!
//! let registry = SymbolRegistry::builtin();
//! let vco = registry.get("vco-sine").unwrap();
//! assert_eq!(vco.name(), "VCO Sine");
//! assert_eq!(vco.category(), SymbolCategory::Oscillator);
//!
//! let oscillators = registry.list_by_category(SymbolCategory::Oscillator);
//! assert_eq!(oscillators[0].id(), "vco-sine");
//! ```

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate symbol id `{0}`")]
    DuplicateId(String),

    #[error("symbol id must not be empty")]
    EmptyId,
}

/// The fixed set of symbol categories, in palette order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolCategory {
    Oscillator,
    Filter,
    Envelope,
    Modulator,
    Amplifier,
    Utility,
}

impl SymbolCategory {
    /// All categories in palette order.
    pub const ALL: [SymbolCategory; 6] = [
        Self::Oscillator,
        Self::Filter,
        Self::Envelope,
        Self::Modulator,
        Self::Amplifier,
        Self::Utility,
    ];

    /// Returns the palette heading for this category.
    pub fn label(self) -> &'static str {
        match self {
            Self::Oscillator => "Oscillators",
            Self::Filter => "Filters",
            Self::Envelope => "Envelopes",
            Self::Modulator => "Modulators",
            Self::Amplifier => "Amplifiers",
            Self::Utility => "Utilities",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Oscillator => "oscillator",
            Self::Filter => "filter",
            Self::Envelope => "envelope",
            Self::Modulator => "modulator",
            Self::Amplifier => "amplifier",
            Self::Utility => "utility",
        }
    }
}

impl fmt::Display for SymbolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymbolCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| {
                format!(
                    "invalid symbol category `{s}`, valid values: {}",
                    Self::ALL.map(Self::as_str).join(", ")
                )
            })
    }
}

/// A catalog entry: what a symbol is called and where its image lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDefinition {
    id: String,
    name: String,
    category: SymbolCategory,
    asset_url: String,
}

impl SymbolDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: SymbolCategory,
        asset_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            asset_url: asset_url.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name shown in the palette
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> SymbolCategory {
        self.category
    }

    /// Asset URL, usually relative to the host's static asset root
    pub fn asset_url(&self) -> &str {
        &self.asset_url
    }
}

/// Insertion-ordered catalog of symbol definitions.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    symbols: IndexMap<String, SymbolDefinition>,
}

impl SymbolRegistry {
    /// Builds a registry from definitions, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] when two definitions share an id,
    /// and [`RegistryError::EmptyId`] for a blank id.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = SymbolDefinition>,
    ) -> Result<Self, RegistryError> {
        let mut symbols = IndexMap::new();
        for definition in definitions {
            if definition.id.trim().is_empty() {
                return Err(RegistryError::EmptyId);
            }
            if symbols.contains_key(&definition.id) {
                return Err(RegistryError::DuplicateId(definition.id));
            }
            symbols.insert(definition.id.clone(), definition);
        }
        Ok(Self { symbols })
    }

    /// The shipped catalog of synthesizer module symbols.
    pub fn builtin() -> Self {
        use SymbolCategory::*;

        const CATALOG: &[(&str, &str, SymbolCategory)] = &[
            ("vco-sine", "VCO Sine", Oscillator),
            ("vco-saw", "VCO Saw", Oscillator),
            ("vco-square", "VCO Square", Oscillator),
            ("vco-triangle", "VCO Triangle", Oscillator),
            ("noise", "Noise Source", Oscillator),
            ("vcf-lowpass", "VCF Low-pass", Filter),
            ("vcf-highpass", "VCF High-pass", Filter),
            ("vcf-bandpass", "VCF Band-pass", Filter),
            ("env-adsr", "ADSR Envelope", Envelope),
            ("env-ad", "AD Envelope", Envelope),
            ("lfo", "LFO", Modulator),
            ("sample-hold", "Sample & Hold", Modulator),
            ("ring-mod", "Ring Modulator", Modulator),
            ("vca", "VCA", Amplifier),
            ("mixer", "Mixer", Amplifier),
            ("mult", "Multiple", Utility),
            ("attenuator", "Attenuator", Utility),
            ("clock-divider", "Clock Divider", Utility),
            ("sequencer", "Sequencer", Utility),
            ("output", "Output", Utility),
        ];

        let symbols = CATALOG
            .iter()
            .map(|(id, name, category)| {
                let definition =
                    SymbolDefinition::new(*id, *name, *category, format!("/symbols/{id}.png"));
                (id.to_string(), definition)
            })
            .collect();

        Self { symbols }
    }

    /// Looks up a definition by id.
    pub fn get(&self, id: &str) -> Option<&SymbolDefinition> {
        self.symbols.get(id)
    }

    /// Returns true if the id is part of the catalog.
    pub fn contains(&self, id: &str) -> bool {
        self.symbols.contains_key(id)
    }

    /// Definitions of one category, in insertion order.
    pub fn list_by_category(&self, category: SymbolCategory) -> Vec<&SymbolDefinition> {
        self.symbols
            .values()
            .filter(|definition| definition.category == category)
            .collect()
    }

    /// Categories that have at least one definition, in palette order.
    pub fn categories(&self) -> Vec<SymbolCategory> {
        SymbolCategory::ALL
            .into_iter()
            .filter(|category| self.symbols.values().any(|d| d.category == *category))
            .collect()
    }

    /// Iterates over all definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolDefinition> {
        self.symbols.values()
    }

    /// All ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.symbols.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = SymbolRegistry::builtin();
        let vco = registry.get("vco-sine").unwrap();

        assert_eq!(vco.name(), "VCO Sine");
        assert_eq!(vco.category(), SymbolCategory::Oscillator);
        assert_eq!(vco.asset_url(), "/symbols/vco-sine.png");
        assert!(registry.get("theremin").is_none());
    }

    #[test]
    fn test_list_by_category_keeps_insertion_order() {
        let registry = SymbolRegistry::builtin();
        let filters: Vec<&str> = registry
            .list_by_category(SymbolCategory::Filter)
            .iter()
            .map(|d| d.id())
            .collect();

        assert_eq!(filters, vec!["vcf-lowpass", "vcf-highpass", "vcf-bandpass"]);
    }

    #[test]
    fn test_list_by_category_is_stable() {
        let registry = SymbolRegistry::builtin();
        let first = registry.list_by_category(SymbolCategory::Utility);
        let second = registry.list_by_category(SymbolCategory::Utility);
        assert_eq!(first, second);
    }

    #[test]
    fn test_builtin_covers_every_category() {
        let registry = SymbolRegistry::builtin();
        assert_eq!(registry.categories(), SymbolCategory::ALL.to_vec());
        assert_eq!(registry.ids().len(), registry.len());
    }

    #[test]
    fn test_categories_skips_empty() {
        let registry = SymbolRegistry::from_definitions([SymbolDefinition::new(
            "vca",
            "VCA",
            SymbolCategory::Amplifier,
            "/symbols/vca.png",
        )])
        .unwrap();

        assert_eq!(registry.categories(), vec![SymbolCategory::Amplifier]);
        assert!(registry.list_by_category(SymbolCategory::Filter).is_empty());
    }

    #[test]
    fn test_from_definitions_rejects_duplicates() {
        let result = SymbolRegistry::from_definitions([
            SymbolDefinition::new("lfo", "LFO", SymbolCategory::Modulator, "a.png"),
            SymbolDefinition::new("lfo", "LFO 2", SymbolCategory::Modulator, "b.png"),
        ]);

        assert_eq!(result.unwrap_err(), RegistryError::DuplicateId("lfo".into()));
    }

    #[test]
    fn test_from_definitions_rejects_empty_id() {
        let result = SymbolRegistry::from_definitions([SymbolDefinition::new(
            " ",
            "Blank",
            SymbolCategory::Utility,
            "blank.png",
        )]);

        assert_eq!(result.unwrap_err(), RegistryError::EmptyId);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "Filter".parse::<SymbolCategory>().unwrap(),
            SymbolCategory::Filter
        );
        let err = "drums".parse::<SymbolCategory>().unwrap_err();
        assert!(err.contains("valid values: oscillator"));
    }
}
