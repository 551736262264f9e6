//! Declarative inclusion conditions evaluated per entry.
//!
//! A declarative spec is a conjunction of clauses. Each clause names a field path (or the
//! entry's derived key) and an expectation:
//!
//! * `true`: the field must be truthy.
//! * `false`: the field must be `false`, missing, or an empty collection.
//! * `null`: the field must be unset.
//! * anything else: the field, taken as a list, must share a value with the expected list,
//!   or (for record fields) one of its keys must appear in it.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::app::extract::extract_lenient;
use crate::domain::errors::SelectError;
use crate::domain::model::{Entry, OptionValue, is_truthy};

/// Arbitrary inclusion test receiving the entry and its derived key.
pub type Predicate = Arc<dyn Fn(&Entry, &Value) -> bool + Send + Sync>;

/// What a clause inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionField {
    /// The entry's derived key or value.
    Key,
    /// A dotted path into the entry.
    Path(String),
}

impl ConditionField {
    /// Pure non-negative integers are positional markers for the derived key.
    pub fn parse(field: &str) -> Self {
        if !field.is_empty() && field.bytes().all(|byte| byte.is_ascii_digit()) {
            ConditionField::Key
        } else {
            ConditionField::Path(field.to_owned())
        }
    }
}

/// Expectation a clause places on its field.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    Truthy,
    Falsy,
    Unset,
    AnyOf(Vec<Value>),
}

impl From<Value> for Expected {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(true) => Expected::Truthy,
            Value::Bool(false) => Expected::Falsy,
            Value::Null => Expected::Unset,
            other => Expected::AnyOf(as_list(&other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub field: ConditionField,
    pub expected: Expected,
}

impl Clause {
    fn passes(&self, entry: &Entry, derived_key: &Value) -> bool {
        let current = match &self.field {
            ConditionField::Key => Some(derived_key),
            ConditionField::Path(path) => extract_lenient(entry, path),
        };

        match &self.expected {
            Expected::Truthy => current.is_some_and(is_truthy),
            Expected::Falsy => current.is_none_or(is_empty_or_false),
            Expected::Unset => current.is_none(),
            Expected::AnyOf(allowed) => current.is_some_and(|value| intersects(value, allowed)),
        }
    }
}

/// Inclusion filter: declarative clauses or an injected predicate.
#[derive(Clone)]
pub enum ConditionSpec {
    Declarative(Vec<Clause>),
    Predicate(Predicate),
}

impl Default for ConditionSpec {
    fn default() -> Self {
        ConditionSpec::Declarative(Vec::new())
    }
}

impl fmt::Debug for ConditionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionSpec::Declarative(clauses) => {
                f.debug_tuple("Declarative").field(clauses).finish()
            }
            ConditionSpec::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl ConditionSpec {
    /// The empty spec; every entry passes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Entry, &Value) -> bool + Send + Sync + 'static,
    {
        ConditionSpec::Predicate(Arc::new(predicate))
    }

    /// Add a clause on a field path. Numeric field names address the derived key.
    ///
    /// Adding a clause to a predicate spec replaces the predicate.
    pub fn with(self, field: &str, expected: impl Into<Value>) -> Self {
        let expected: Value = expected.into();
        self.push(Clause {
            field: ConditionField::parse(field),
            expected: Expected::from(expected),
        })
    }

    /// Add a clause on the derived key.
    pub fn with_key(self, expected: impl Into<Value>) -> Self {
        let expected: Value = expected.into();
        self.push(Clause {
            field: ConditionField::Key,
            expected: Expected::from(expected),
        })
    }

    fn push(self, clause: Clause) -> Self {
        let mut clauses = match self {
            ConditionSpec::Declarative(clauses) => clauses,
            ConditionSpec::Predicate(_) => Vec::new(),
        };
        clauses.push(clause);
        ConditionSpec::Declarative(clauses)
    }

    /// Parse a condition document.
    ///
    /// Objects map fields to expectations, arrays and scalars produce derived-key clauses,
    /// `null` is the empty spec.
    pub fn from_value(value: &Value) -> Result<Self, SelectError> {
        let clauses = match value {
            Value::Null => Vec::new(),
            Value::Object(map) => map
                .iter()
                .map(|(field, expected)| Clause {
                    field: ConditionField::parse(field),
                    expected: Expected::from(expected.clone()),
                })
                .collect(),
            Value::Array(items) => items
                .iter()
                .map(|expected| Clause {
                    field: ConditionField::Key,
                    expected: Expected::from(expected.clone()),
                })
                .collect(),
            Value::String(_) | Value::Number(_) => vec![Clause {
                field: ConditionField::Key,
                expected: Expected::from(value.clone()),
            }],
            Value::Bool(_) => {
                return Err(SelectError::InvalidCondition(
                    "a bare boolean is not a condition".into(),
                ));
            }
        };
        Ok(ConditionSpec::Declarative(clauses))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ConditionSpec::Declarative(clauses) if clauses.is_empty())
    }

    /// Evaluate the spec against one entry.
    pub fn passes(&self, entry: &Entry, derived_key: &Value) -> bool {
        match self {
            ConditionSpec::Predicate(predicate) => predicate(entry, derived_key),
            ConditionSpec::Declarative(clauses) => clauses
                .iter()
                .all(|clause| clause.passes(entry, derived_key)),
        }
    }
}

fn is_empty_or_false(value: &Value) -> bool {
    match value {
        Value::Bool(false) | Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn as_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        Value::Object(map) => map.values().cloned().collect(),
        scalar => vec![scalar.clone()],
    }
}

fn intersects(current: &Value, allowed: &[Value]) -> bool {
    if as_list(current).iter().any(|item| allowed.contains(item)) {
        return true;
    }

    match current {
        Value::Object(map) => map.keys().any(|key| {
            allowed.contains(&Value::String(key.clone()))
                || allowed.contains(&OptionValue::from_key(key).to_value())
        }),
        _ => false,
    }
}
