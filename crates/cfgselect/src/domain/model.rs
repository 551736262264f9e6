//! Domain models for config entries, field mappings, and options.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Object exposing a named primary key alongside its fields, such as a database row.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifiedObject {
    pub key_name: String,
    pub fields: Map<String, Value>,
}

impl IdentifiedObject {
    pub fn new(key_name: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            key_name: key_name.into(),
            fields,
        }
    }

    /// Value stored under the primary key field, if present.
    pub fn primary_key(&self) -> Option<&Value> {
        self.fields.get(&self.key_name)
    }
}

/// One element of a config collection, classified once on construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Scalar(Value),
    Record(Map<String, Value>),
    Identified(IdentifiedObject),
}

impl Entry {
    /// Classify a raw value. Arrays become records keyed by their index.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Entry::Record(map),
            Value::Array(items) => Entry::Record(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), item))
                    .collect(),
            ),
            scalar => Entry::Scalar(scalar),
        }
    }

    /// Record-like view of the entry; scalars have no fields.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        match self {
            Entry::Scalar(_) => None,
            Entry::Record(map) => Some(map),
            Entry::Identified(object) => Some(&object.fields),
        }
    }

    /// Convert the entry back into a plain value, dropping the primary key marker.
    pub fn to_value(&self) -> Value {
        match self {
            Entry::Scalar(value) => value.clone(),
            Entry::Record(map) => Value::Object(map.clone()),
            Entry::Identified(object) => Value::Object(object.fields.clone()),
        }
    }
}

/// Ordered `(key, entry)` pairs taken from a config structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entries {
    items: Vec<(String, Entry)>,
}

impl Entries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a config value into entries. Scalars carry no entries.
    pub fn from_value(value: &Value) -> Self {
        let items = match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, item)| (key.clone(), Entry::from_value(item.clone())))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), Entry::from_value(item.clone())))
                .collect(),
            _ => Vec::new(),
        };
        Self { items }
    }

    pub fn push(&mut self, key: impl Into<String>, entry: Entry) {
        self.items.push((key.into(), entry));
    }

    /// Builder-style variant of [`Entries::push`].
    pub fn with(mut self, key: impl Into<String>, entry: Entry) -> Self {
        self.push(key, entry);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.items.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}

impl<K: Into<String>> FromIterator<(K, Entry)> for Entries {
    fn from_iter<T: IntoIterator<Item = (K, Entry)>>(iter: T) -> Self {
        Self {
            items: iter
                .into_iter()
                .map(|(key, entry)| (key.into(), entry))
                .collect(),
        }
    }
}

/// The value an option submits: either text or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Text(String),
    Number(Number),
}

impl OptionValue {
    /// Canonical decimal integer keys (`"7"`, not `"07"`) are numeric.
    pub fn from_key(key: &str) -> Self {
        match key.parse::<i64>() {
            Ok(number) if number.to_string() == key => OptionValue::Number(number.into()),
            _ => OptionValue::Text(key.to_owned()),
        }
    }

    /// Coerce a field value. `true` becomes `1`, `false` and `null` the empty string, and
    /// compound values their JSON text.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => OptionValue::Text(text.clone()),
            Value::Number(number) => OptionValue::Number(number.clone()),
            Value::Bool(true) => OptionValue::from(1),
            Value::Bool(false) | Value::Null => OptionValue::Text(String::new()),
            compound => OptionValue::Text(compound.to_string()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            OptionValue::Text(text) => Value::String(text.clone()),
            OptionValue::Number(number) => Value::Number(number.clone()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Text(text) => f.write_str(text),
            OptionValue::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_owned())
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Number(value.into())
    }
}

/// A single presentation-ready option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionItem {
    pub value: OptionValue,
    pub title: String,
    pub attributes: IndexMap<String, String>,
    pub optgroup: Option<String>,
}

/// Field paths selecting which parts of an entry become the option's value, title, and
/// metadata. Empty or absent paths disable the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub optgroup: Option<String>,
    #[serde(default)]
    pub attributes: Option<String>,
    #[serde(default)]
    pub is_actual: Option<String>,
}

impl Default for Mapping {
    fn default() -> Self {
        Self {
            value: None,
            title: Some("title".into()),
            optgroup: Some("optgroup".into()),
            attributes: Some("attributes".into()),
            is_actual: Some("is_actual".into()),
        }
    }
}

impl Mapping {
    /// Mapping with every optional role disabled, used for prepended entries.
    pub fn bare() -> Self {
        Self {
            value: None,
            title: Some("title".into()),
            optgroup: None,
            attributes: None,
            is_actual: None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        role(&self.value)
    }

    pub fn title(&self) -> Option<&str> {
        role(&self.title)
    }

    pub fn optgroup(&self) -> Option<&str> {
        role(&self.optgroup)
    }

    pub fn attributes(&self) -> Option<&str> {
        role(&self.attributes)
    }

    pub fn is_actual(&self) -> Option<&str> {
        role(&self.is_actual)
    }

    pub fn with_value(mut self, path: impl Into<String>) -> Self {
        self.value = Some(path.into());
        self
    }

    pub fn with_title(mut self, path: impl Into<String>) -> Self {
        self.title = Some(path.into());
        self
    }

    pub fn with_optgroup(mut self, path: impl Into<String>) -> Self {
        self.optgroup = Some(path.into());
        self
    }

    pub fn without_optgroup(mut self) -> Self {
        self.optgroup = None;
        self
    }

    pub fn with_attributes(mut self, path: impl Into<String>) -> Self {
        self.attributes = Some(path.into());
        self
    }

    pub fn with_is_actual(mut self, path: impl Into<String>) -> Self {
        self.is_actual = Some(path.into());
        self
    }

    /// Overlay the roles set in `other` on top of `self`.
    pub fn merge(self, other: Self) -> Self {
        Self {
            value: other.value.or(self.value),
            title: other.title.or(self.title),
            optgroup: other.optgroup.or(self.optgroup),
            attributes: other.attributes.or(self.attributes),
            is_actual: other.is_actual.or(self.is_actual),
        }
    }
}

fn role(path: &Option<String>) -> Option<&str> {
    path.as_deref().filter(|path| !path.is_empty())
}

/// Loose truthiness: `null`, `false`, zero, `""`, `"0"` and empty collections are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty() && text != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Text form of a value for titles, labels, and attributes.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        compound => compound.to_string(),
    }
}
