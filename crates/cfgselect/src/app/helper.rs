//! Facade tying the engine to a config source and a localizer.

use std::borrow::Cow;

use serde_json::Value;

use crate::app::collection::OptionCollection;
use crate::app::condition::ConditionSpec;
use crate::app::keys;
use crate::app::options::{BuildOptions, OptionListBuilder};
use crate::app::publish::Publisher;
use crate::domain::errors::SelectError;
use crate::domain::model::{Entries, Mapping};
use crate::infra::config::Config;
use crate::infra::i18n::Localizer;
use crate::infra::source::ConfigSource;

/// Where the engine reads its entries from.
#[derive(Debug, Clone, Copy)]
pub enum Data<'a> {
    /// A dotted config key resolved through the [`ConfigSource`].
    Key(&'a str),
    Value(&'a Value),
    Entries(&'a Entries),
}

impl<'a> From<&'a str> for Data<'a> {
    fn from(key: &'a str) -> Self {
        Data::Key(key)
    }
}

impl<'a> From<&'a Value> for Data<'a> {
    fn from(value: &'a Value) -> Self {
        Data::Value(value)
    }
}

impl<'a> From<&'a Entries> for Data<'a> {
    fn from(entries: &'a Entries) -> Self {
        Data::Entries(entries)
    }
}

/// Entry point for building option lists and querying config keys.
#[derive(Debug, Clone)]
pub struct ConfigHelper<S, L> {
    source: S,
    localizer: L,
    mapping: Mapping,
}

impl<S: ConfigSource, L: Localizer> ConfigHelper<S, L> {
    pub fn new(source: S, localizer: L, config: &Config) -> Self {
        Self {
            source,
            localizer,
            mapping: config.mapping.clone(),
        }
    }

    /// The default mapping applied by [`ConfigHelper::build_options`].
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Fresh per-call options carrying the default mapping.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::default().with_mapping(self.mapping.clone())
    }

    /// Build a selectable option list.
    pub fn to_select<'d>(
        &self,
        data: impl Into<Data<'d>>,
        options: &BuildOptions,
    ) -> Result<OptionCollection, SelectError> {
        let entries = self.entries(data.into())?;
        OptionListBuilder::new(&self.localizer).build(&entries, options)
    }

    pub fn keys<'d>(
        &self,
        data: impl Into<Data<'d>>,
        condition: &ConditionSpec,
    ) -> Result<Vec<String>, SelectError> {
        let entries = self.entries(data.into())?;
        Ok(keys::keys(&entries, condition))
    }

    pub fn key<'d>(
        &self,
        data: impl Into<Data<'d>>,
        condition: &ConditionSpec,
        strict: bool,
    ) -> Result<Option<String>, SelectError> {
        let entries = self.entries(data.into())?;
        keys::key(&entries, condition, strict)
    }

    pub fn first_key<'d>(
        &self,
        data: impl Into<Data<'d>>,
        condition: &ConditionSpec,
    ) -> Result<String, SelectError> {
        let entries = self.entries(data.into())?;
        keys::first_key(&entries, condition)
    }

    pub fn random_key<'d>(
        &self,
        data: impl Into<Data<'d>>,
        condition: &ConditionSpec,
    ) -> Result<String, SelectError> {
        let entries = self.entries(data.into())?;
        keys::random_key(&entries, condition)
    }

    /// Read `config_key.<matched key>[.sub_path]` for the singleton key matching `condition`.
    ///
    /// Returns `None` only when `strict` is off and nothing matched, or the sub path is absent.
    pub fn value(
        &self,
        config_key: &str,
        condition: &ConditionSpec,
        sub_path: Option<&str>,
        strict: bool,
    ) -> Result<Option<Value>, SelectError> {
        let Some(matched) = self.key(config_key, condition, strict)? else {
            return Ok(None);
        };

        let mut path = format!("{config_key}.{matched}");
        if let Some(sub_path) = sub_path.filter(|sub_path| !sub_path.is_empty()) {
            path.push('.');
            path.push_str(sub_path);
        }
        tracing::debug!(%path, "resolving matched config value");
        Ok(self.source.resolve(&path))
    }

    /// Prune `data` to `visible_keys` and localize string values under `trans_keys`.
    pub fn publish<'d>(
        &self,
        data: impl Into<Data<'d>>,
        visible_keys: &[String],
        trans_keys: &[String],
        condition: &ConditionSpec,
    ) -> Result<Value, SelectError> {
        let config = match data.into() {
            Data::Key(key) => Cow::Owned(self.resolve(key)?),
            Data::Value(value) => Cow::Borrowed(value),
            Data::Entries(entries) => Cow::Owned(Value::Object(
                entries
                    .iter()
                    .map(|(key, entry)| (key.to_owned(), entry.to_value()))
                    .collect(),
            )),
        };
        Ok(Publisher::new(&self.localizer, visible_keys, trans_keys).publish(&config, condition))
    }

    fn entries<'d>(&self, data: Data<'d>) -> Result<Cow<'d, Entries>, SelectError> {
        match data {
            Data::Key(key) => Ok(Cow::Owned(Entries::from_value(&self.resolve(key)?))),
            Data::Value(value) => Ok(Cow::Owned(Entries::from_value(value))),
            Data::Entries(entries) => Ok(Cow::Borrowed(entries)),
        }
    }

    fn resolve(&self, key: &str) -> Result<Value, SelectError> {
        self.source
            .resolve(key)
            .ok_or_else(|| SelectError::UnresolvedConfig {
                key: key.to_owned(),
            })
    }
}
