//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::model::Mapping;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".cfgselect/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub mapping: Mapping,
    #[serde(default)]
    pub i18n: I18n,
}

/// Translation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct I18n {
    /// JSON catalog mapping source strings to translations.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

/// Environment overrides for the default mapping.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    value: Option<String>,
    title: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            value: env::var("CFGSELECT_MAPPING_VALUE").ok(),
            title: env::var("CFGSELECT_MAPPING_TITLE").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(value: &str, title: &str) -> Self {
        Self {
            value: Some(value.to_owned()),
            title: Some(title.to_owned()),
        }
    }
}

/// A single parsed config file. Unset mapping roles defer to lower layers.
#[derive(Debug, Clone, Default, Deserialize)]
struct Layer {
    #[serde(default)]
    mapping: Option<Mapping>,
    #[serde(default)]
    i18n: I18n,
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    pub(crate) fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Layer> = Vec::new();

        layers.push(Self::layer_from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::layer_from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::layer_from_file(&workspace_path)?);
        }

        let merged = layers
            .into_iter()
            .fold(Config::empty(), |config, layer| config.merge(layer));
        Ok(apply_env_overrides(merged, env_overrides))
    }

    /// Parse a single TOML document on top of the built-in defaults.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let defaults = Self::layer_from_str(&DEFAULT_CONFIG)?;
        let layer = Self::layer_from_str(contents)?;
        Ok(Config::empty().merge(defaults).merge(layer))
    }

    fn empty() -> Self {
        Self {
            mapping: Mapping {
                value: None,
                title: None,
                optgroup: None,
                attributes: None,
                is_actual: None,
            },
            i18n: I18n::default(),
        }
    }

    fn layer_from_file(path: &Path) -> Result<Layer> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::layer_from_str(&data)
    }

    fn layer_from_str(contents: &str) -> Result<Layer> {
        let layer: Layer =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(layer)
    }

    fn merge(self, layer: Layer) -> Self {
        Self {
            mapping: match layer.mapping {
                Some(overlay) => self.mapping.merge(overlay),
                None => self.mapping,
            },
            i18n: I18n {
                catalog: layer.i18n.catalog.or(self.i18n.catalog),
            },
        }
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("cfgselect/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(value) = env.value {
        config.mapping.value = Some(value);
    }
    if let Some(title) = env.title {
        config.mapping.title = Some(title);
    }
    config
}
