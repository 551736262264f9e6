//! Pruning and localizing nested config structures for publication.

use serde_json::{Map, Value};

use crate::app::condition::ConditionSpec;
use crate::domain::model::{Entry, OptionValue};
use crate::infra::i18n::Localizer;

/// Produces a copy of a config structure reduced to visible keys with localized strings.
pub struct Publisher<'a, L: Localizer + ?Sized> {
    localizer: &'a L,
    visible_keys: Vec<String>,
    trans_keys: Vec<String>,
}

impl<'a, L: Localizer + ?Sized> Publisher<'a, L> {
    /// Translated keys are always kept visible when an allowlist is given.
    pub fn new(localizer: &'a L, visible_keys: &[String], trans_keys: &[String]) -> Self {
        let mut visible: Vec<String> = visible_keys.to_vec();
        if !visible.is_empty() {
            for key in trans_keys {
                if !visible.contains(key) {
                    visible.push(key.clone());
                }
            }
        }

        Self {
            localizer,
            visible_keys: visible,
            trans_keys: trans_keys.to_vec(),
        }
    }

    /// Filter top-level entries by `condition`, then prune and localize what remains.
    ///
    /// Pruning reaches one level per branch at most: the top level when it holds a visible
    /// key, otherwise each entry below it that holds one. Deeper levels are only localized.
    pub fn publish(&self, config: &Value, condition: &ConditionSpec) -> Value {
        match config {
            Value::Object(map) => {
                let kept: Map<String, Value> = map
                    .iter()
                    .filter(|(key, item)| passes(condition, key, item))
                    .map(|(key, item)| (key.clone(), item.clone()))
                    .collect();
                self.walk_map(&kept, Pruning::Top)
            }
            Value::Array(items) => {
                let kept: Vec<Value> = items
                    .iter()
                    .enumerate()
                    .filter(|(index, item)| passes(condition, &index.to_string(), item))
                    .map(|(_, item)| item.clone())
                    .collect();
                self.walk(&Value::Array(kept), Pruning::Top)
            }
            scalar => scalar.clone(),
        }
    }

    fn walk(&self, value: &Value, pruning: Pruning) -> Value {
        match value {
            Value::Object(map) => self.walk_map(map, pruning),
            Value::Array(items) => {
                let below = pruning.below(false);
                Value::Array(items.iter().map(|item| self.walk(item, below)).collect())
            }
            other => other.clone(),
        }
    }

    fn walk_map(&self, map: &Map<String, Value>, pruning: Pruning) -> Value {
        let prune_here = pruning != Pruning::Off
            && !self.visible_keys.is_empty()
            && map.keys().any(|key| self.visible_keys.contains(key));
        if prune_here {
            tracing::trace!(keys = map.len(), ?pruning, "pruning level to visible keys");
        }

        let below = pruning.below(prune_here);
        let mut published = Map::with_capacity(map.len());
        for (key, item) in map {
            if prune_here && !self.visible_keys.contains(key) {
                continue;
            }

            let value = match item {
                Value::String(text) if self.trans_keys.contains(key) => {
                    Value::String(self.localizer.translate(text))
                }
                nested => self.walk(nested, below),
            };
            published.insert(key.clone(), value);
        }
        Value::Object(published)
    }
}

/// How far pruning still reaches while walking down a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pruning {
    /// The published structure itself.
    Top,
    /// An entry directly below an unpruned top level.
    Entry,
    Off,
}

impl Pruning {
    fn below(self, pruned_here: bool) -> Self {
        match self {
            Pruning::Top if !pruned_here => Pruning::Entry,
            _ => Pruning::Off,
        }
    }
}

fn passes(condition: &ConditionSpec, key: &str, item: &Value) -> bool {
    condition.passes(
        &Entry::from_value(item.clone()),
        &OptionValue::from_key(key).to_value(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::i18n::{CatalogLocalizer, IdentityLocalizer};
    use serde_json::json;

    fn strings(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|key| key.to_string()).collect()
    }

    #[test]
    fn prunes_top_level_to_visible_keys() {
        let publisher = Publisher::new(&IdentityLocalizer, &strings(&["x", "y"]), &[]);
        let config = json!({"x": 1, "y": 2, "z": 3});
        let published = publisher.publish(&config, &ConditionSpec::new());
        assert_eq!(published, json!({"x": 1, "y": 2}));
    }

    #[test]
    fn keeps_levels_without_visible_keys() {
        let publisher = Publisher::new(&IdentityLocalizer, &strings(&["title"]), &[]);
        let config = json!({
            "a": {"title": "A", "secret": 1},
            "b": {"title": "B", "nested": {"title": "deep", "other": true}},
        });
        let published = publisher.publish(&config, &ConditionSpec::new());
        assert_eq!(
            published,
            json!({
                "a": {"title": "A"},
                "b": {"title": "B"},
            })
        );
    }

    #[test]
    fn levels_below_a_pruned_level_are_not_pruned() {
        let publisher = Publisher::new(&IdentityLocalizer, &strings(&["meta"]), &[]);
        let config = json!({"a": {"meta": {"meta": 1, "other": 2}, "drop": 3}});
        let published = publisher.publish(&config, &ConditionSpec::new());
        assert_eq!(published, json!({"a": {"meta": {"meta": 1, "other": 2}}}));
    }

    #[test]
    fn records_below_the_entry_level_stay_whole() {
        let publisher = Publisher::new(&IdentityLocalizer, &strings(&["title"]), &[]);
        let config = json!({
            "a": {"secret": {"title": "t", "x": 1}},
            "b": {"l2": {"l3": {"title": "deep", "y": 2}}},
        });
        let published = publisher.publish(&config, &ConditionSpec::new());
        assert_eq!(published, config);
    }

    #[test]
    fn pruned_top_level_leaves_entries_whole() {
        let publisher = Publisher::new(&IdentityLocalizer, &strings(&["x"]), &[]);
        let config = json!({"x": {"x": 1, "y": 2}, "z": 3});
        let published = publisher.publish(&config, &ConditionSpec::new());
        assert_eq!(published, json!({"x": {"x": 1, "y": 2}}));
    }

    #[test]
    fn list_items_are_entries() {
        let publisher = Publisher::new(&IdentityLocalizer, &strings(&["id"]), &[]);
        let config = json!([
            {"id": 1, "note": "a", "tags": {"id": 9, "extra": true}},
            {"id": 2, "note": "b"},
        ]);
        let published = publisher.publish(&config, &ConditionSpec::new());
        assert_eq!(published, json!([{"id": 1}, {"id": 2}]));

        let config = json!({"rows": [{"id": 1, "note": "a"}]});
        assert_eq!(publisher.publish(&config, &ConditionSpec::new()), config);
    }

    #[test]
    fn empty_allowlist_keeps_everything() {
        let publisher = Publisher::new(&IdentityLocalizer, &[], &[]);
        let config = json!({"a": {"b": 1}, "c": [1, 2]});
        assert_eq!(publisher.publish(&config, &ConditionSpec::new()), config);
    }

    #[test]
    fn localizes_only_translatable_string_keys() {
        let localizer = CatalogLocalizer::from_pairs([("Apple", "Apfel"), ("Fruit", "Obst")]);
        let publisher = Publisher::new(&localizer, &[], &strings(&["title"]));
        let config = json!({
            "apple": {"title": "Apple", "kind": "Fruit", "group": {"title": "Fruit"}},
            "count": {"title": 3},
        });
        let published = publisher.publish(&config, &ConditionSpec::new());
        assert_eq!(
            published,
            json!({
                "apple": {"title": "Apfel", "kind": "Fruit", "group": {"title": "Obst"}},
                "count": {"title": 3},
            })
        );
    }

    #[test]
    fn translated_keys_stay_visible() {
        let visible = strings(&["id"]);
        let publisher = Publisher::new(&IdentityLocalizer, &visible, &strings(&["title"]));
        let config = json!({"a": {"id": 1, "title": "A", "extra": true}});
        let published = publisher.publish(&config, &ConditionSpec::new());
        assert_eq!(published, json!({"a": {"id": 1, "title": "A"}}));
    }

    #[test]
    fn condition_filters_top_level_entries() {
        let publisher = Publisher::new(&IdentityLocalizer, &[], &[]);
        let config = json!({"a": {"on": true}, "b": {"on": false}});
        let condition = ConditionSpec::new().with("on", true);
        let published = publisher.publish(&config, &condition);
        assert_eq!(published, json!({"a": {"on": true}}));
    }

    #[test]
    fn scalars_pass_through() {
        let publisher = Publisher::new(&IdentityLocalizer, &strings(&["x"]), &[]);
        let config = json!("text");
        assert_eq!(publisher.publish(&config, &ConditionSpec::new()), config);
    }
}
