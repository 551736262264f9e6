//! Localization adapters for titles, group labels, and published strings.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Translates user-facing text.
pub trait Localizer {
    fn translate(&self, text: &str) -> String;
}

impl<T: Localizer + ?Sized> Localizer for &T {
    fn translate(&self, text: &str) -> String {
        (**self).translate(text)
    }
}

/// Returns text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLocalizer;

impl Localizer for IdentityLocalizer {
    fn translate(&self, text: &str) -> String {
        text.to_owned()
    }
}

/// Lookup table of translations; unknown text passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogLocalizer {
    entries: HashMap<String, String>,
}

impl CatalogLocalizer {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(source, target)| (source.into(), target.into()))
                .collect(),
        }
    }

    /// Load a flat JSON object mapping source strings to translations.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read translation catalog: {}", path.display()))?;
        let entries: HashMap<String, String> = serde_json::from_str(&data)
            .with_context(|| format!("invalid translation catalog in {}", path.display()))?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "loaded catalog");
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Localizer for CatalogLocalizer {
    fn translate(&self, text: &str) -> String {
        match self.entries.get(text) {
            Some(translated) => translated.clone(),
            None => {
                tracing::trace!(text, "no translation");
                text.to_owned()
            }
        }
    }
}
