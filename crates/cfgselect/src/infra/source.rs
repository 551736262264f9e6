//! Config sources resolving dotted keys into config structures.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::app::extract::resolve_value;

/// Resolves a dotted config key (`"catalog.statuses"`) into its value.
pub trait ConfigSource {
    fn resolve(&self, key: &str) -> Option<Value>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn resolve(&self, key: &str) -> Option<Value> {
        (**self).resolve(key)
    }
}

/// In-memory config document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSource {
    root: Value,
}

impl DocumentSource {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Load a `.json`, `.toml`, `.yaml` or `.yml` document.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config document: {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let root: Value = match extension.as_str() {
            "json" => serde_json::from_str(&data)
                .with_context(|| format!("failed to parse JSON document {}", path.display()))?,
            "toml" => toml::from_str(&data)
                .with_context(|| format!("failed to parse TOML document {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&data)
                .with_context(|| format!("failed to parse YAML document {}", path.display()))?,
            other => bail!(
                "unsupported config document format '{}' for {}",
                other,
                path.display()
            ),
        };

        tracing::debug!(path = %path.display(), "loaded config document");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }
}

impl ConfigSource for DocumentSource {
    fn resolve(&self, key: &str) -> Option<Value> {
        if key.is_empty() {
            return Some(self.root.clone());
        }
        resolve_value(&self.root, key).cloned()
    }
}
