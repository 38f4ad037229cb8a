//! Style registry: an immutable name-to-spec table.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StyleError;
use crate::transform::{is_valid_quality, DEFAULT_QUALITY};

use super::catalog::builtin_styles;

// =============================================================================
// Style Spec
// =============================================================================

/// Output specification for a named style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleSpec {
    /// Symbolic style name (lookup key)
    pub name: String,

    /// Target width in pixels
    pub width: u32,

    /// Target height in pixels
    pub height: u32,

    /// Encoding quality (1-100)
    pub quality: u8,

    /// Crop policy declared by the style; `None` means the default (crop)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<bool>,

    /// Whether consumers should load this image eagerly
    pub priority: bool,
}

impl StyleSpec {
    /// Create a fixed-crop style with the default quality.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            quality: DEFAULT_QUALITY,
            crop: None,
            priority: false,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Declare the crop policy explicitly.
    pub fn with_crop(mut self, crop: bool) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    /// Effective crop policy (`true` unless the style opts out).
    pub fn crop(&self) -> bool {
        self.crop.unwrap_or(true)
    }

    fn validate(&self) -> Result<(), StyleError> {
        if self.name.is_empty() {
            return Err(StyleError::EmptyName);
        }
        if self.width == 0 || self.height == 0 {
            return Err(StyleError::InvalidDimensions {
                name: self.name.clone(),
                width: self.width,
                height: self.height,
            });
        }
        if !is_valid_quality(self.quality) {
            return Err(StyleError::InvalidQuality {
                name: self.name.clone(),
                quality: self.quality,
            });
        }
        Ok(())
    }
}

/// On-disk shape of a catalog entry; the name is the JSON object key.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StyleEntry {
    width: u32,
    height: u32,
    #[serde(default)]
    quality: Option<u8>,
    #[serde(default)]
    crop: Option<bool>,
    #[serde(default)]
    priority: bool,
}

// =============================================================================
// Style Registry
// =============================================================================

/// Read-only catalog of styles keyed by name.
///
/// Build it once at startup and share it behind an `Arc`. There are no
/// mutation methods; tests that need a different catalog build their own
/// registry with [`StyleRegistry::from_specs`].
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    styles: HashMap<String, StyleSpec>,
}

impl StyleRegistry {
    /// Build a registry, validating every style.
    ///
    /// # Errors
    ///
    /// Fails on an empty name, zero width or height, quality outside 1-100,
    /// or a name registered twice.
    pub fn from_specs(specs: impl IntoIterator<Item = StyleSpec>) -> Result<Self, StyleError> {
        let mut styles = HashMap::new();
        for spec in specs {
            spec.validate()?;
            if styles.contains_key(&spec.name) {
                return Err(StyleError::Duplicate(spec.name));
            }
            styles.insert(spec.name.clone(), spec);
        }
        Ok(Self { styles })
    }

    /// The compiled-in catalog.
    pub fn builtin() -> Self {
        let styles = builtin_styles()
            .into_iter()
            .map(|spec| (spec.name.clone(), spec))
            .collect();
        Self { styles }
    }

    /// Parse a catalog from a JSON object of the form
    /// `{ "name": { "width": 800, "height": 600, "quality": 85, "crop": false } }`.
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        let entries: BTreeMap<String, StyleEntry> =
            serde_json::from_str(json).map_err(|e| StyleError::Parse(e.to_string()))?;

        Self::from_specs(entries.into_iter().map(|(name, entry)| StyleSpec {
            name,
            width: entry.width,
            height: entry.height,
            quality: entry.quality.unwrap_or(DEFAULT_QUALITY),
            crop: entry.crop,
            priority: entry.priority,
        }))
    }

    /// Load a catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, StyleError> {
        let json = std::fs::read_to_string(path).map_err(|e| StyleError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Look up a style by name. Unknown names yield `None`.
    pub fn lookup(&self, name: &str) -> Option<&StyleSpec> {
        self.styles.get(name)
    }

    /// Crop policy a style declares explicitly, if the style exists and sets one.
    pub fn declared_crop(&self, name: &str) -> Option<bool> {
        self.lookup(name).and_then(|style| style.crop)
    }

    /// All styles, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &StyleSpec> {
        let mut styles: Vec<_> = self.styles.values().collect();
        styles.sort_by(|a, b| a.name.cmp(&b.name));
        styles.into_iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
