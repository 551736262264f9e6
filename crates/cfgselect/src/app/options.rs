//! Building option lists from config entries.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde_json::Value;

use crate::app::collection::{OptionCollection, OptionRow};
use crate::app::condition::ConditionSpec;
use crate::app::extract::{extract_lenient, extract_strict};
use crate::domain::errors::SelectError;
use crate::domain::model::{
    Entries, Entry, Mapping, OptionItem, OptionValue, is_truthy, value_to_text,
};
use crate::infra::i18n::Localizer;

/// Per-call inputs for building an option list.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Values (stringified) that are always included and rendered as selected.
    pub selected: Vec<String>,
    pub condition: ConditionSpec,
    /// Entries placed before the data, built with [`Mapping::bare`].
    pub prepends: Entries,
    pub mapping: Mapping,
}

impl BuildOptions {
    pub fn with_selected<I, S>(mut self, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.selected = selected
            .into_iter()
            .map(|value| value.to_string())
            .collect();
        self
    }

    pub fn with_condition(mut self, condition: ConditionSpec) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Prepend a scalar entry whose key becomes the value and whose text the title.
    pub fn with_prepend(mut self, key: impl Into<String>, title: impl Into<String>) -> Self {
        let entry = Entry::Scalar(Value::String(title.into()));
        self.prepends.push(key, entry);
        self
    }
}

/// Turns config entries into an [`OptionCollection`].
pub struct OptionListBuilder<'a, L: Localizer + ?Sized> {
    localizer: &'a L,
}

impl<'a, L: Localizer + ?Sized> OptionListBuilder<'a, L> {
    pub fn new(localizer: &'a L) -> Self {
        Self { localizer }
    }

    pub fn build(
        &self,
        data: &Entries,
        options: &BuildOptions,
    ) -> Result<OptionCollection, SelectError> {
        let rows = self.rows(data, options)?;
        Ok(OptionCollection::from_rows(rows, options.selected.clone()))
    }

    /// Build the ordered rows: prepends first, then the data entries that pass.
    pub fn rows(
        &self,
        data: &Entries,
        options: &BuildOptions,
    ) -> Result<Vec<OptionRow>, SelectError> {
        let selected: BTreeSet<&str> = options.selected.iter().map(String::as_str).collect();
        let bare = Mapping::bare();
        let unconditional = ConditionSpec::new();

        let mut rows = Vec::with_capacity(options.prepends.len() + data.len());
        for (key, entry) in options.prepends.iter() {
            rows.extend(self.row(key, entry, &selected, &unconditional, &bare)?);
        }

        let (condition, mapping) = (&options.condition, &options.mapping);
        for (key, entry) in data.iter() {
            rows.extend(self.row(key, entry, &selected, condition, mapping)?);
        }
        Ok(rows)
    }

    fn row(
        &self,
        key: &str,
        entry: &Entry,
        selected: &BTreeSet<&str>,
        condition: &ConditionSpec,
        mapping: &Mapping,
    ) -> Result<Option<OptionRow>, SelectError> {
        let value = derive_value(key, entry, mapping)?;

        if !selected.contains(value.to_string().as_str()) {
            if !condition.passes(entry, &value.to_value()) {
                tracing::trace!(%value, "excluded by condition");
                return Ok(None);
            }

            if is_stale(entry, mapping) {
                tracing::trace!(%value, "excluded as no longer actual");
                return Ok(None);
            }
        }

        let title = match entry {
            Entry::Scalar(scalar) => value_to_text(scalar),
            _ => {
                let path = mapping
                    .title()
                    .ok_or_else(|| SelectError::missing_field(""))?;
                value_to_text(extract_strict(entry, path)?)
            }
        };

        let attributes = mapping
            .attributes()
            .and_then(|path| extract_lenient(entry, path))
            .map(to_attributes)
            .unwrap_or_default();

        let optgroup = mapping
            .optgroup()
            .and_then(|path| extract_lenient(entry, path))
            .filter(|group| is_truthy(group))
            .map(|group| self.localizer.translate(&value_to_text(group)));

        Ok(Some(OptionRow {
            group: optgroup.clone(),
            item: OptionItem {
                value,
                title: self.localizer.translate(&title),
                attributes,
                optgroup,
            },
        }))
    }
}

fn derive_value(key: &str, entry: &Entry, mapping: &Mapping) -> Result<OptionValue, SelectError> {
    if let Some(path) = mapping.value() {
        return extract_strict(entry, path).map(OptionValue::from_value);
    }

    match entry {
        Entry::Identified(object) => object
            .primary_key()
            .map(OptionValue::from_value)
            .ok_or_else(|| SelectError::missing_field(object.key_name.clone())),
        _ => Ok(OptionValue::from_key(key)),
    }
}

/// An entry is stale when its actuality field is present and falsy.
fn is_stale(entry: &Entry, mapping: &Mapping) -> bool {
    mapping
        .is_actual()
        .and_then(|path| extract_lenient(entry, path))
        .is_some_and(|actual| !is_truthy(actual))
}

fn to_attributes(value: &Value) -> IndexMap<String, String> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name.clone(), value_to_text(value)))
            .collect(),
        _ => IndexMap::new(),
    }
}
