//! Selecting config keys by condition.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::app::condition::ConditionSpec;
use crate::domain::errors::SelectError;
use crate::domain::model::{Entries, OptionValue};

/// Keys whose entries pass `condition`, in config order.
pub fn keys(entries: &Entries, condition: &ConditionSpec) -> Vec<String> {
    entries
        .iter()
        .filter(|(key, entry)| condition.passes(entry, &OptionValue::from_key(key).to_value()))
        .map(|(key, _)| key.to_owned())
        .collect()
}

/// The single matching key.
///
/// In strict mode anything but exactly one match is a [`SelectError::NotSingleton`];
/// otherwise the first match (if any) is returned.
pub fn key(
    entries: &Entries,
    condition: &ConditionSpec,
    strict: bool,
) -> Result<Option<String>, SelectError> {
    let matched = keys(entries, condition);
    if strict && matched.len() != 1 {
        return Err(SelectError::NotSingleton {
            count: matched.len(),
        });
    }
    Ok(matched.into_iter().next())
}

/// First matching key; no match is a [`SelectError::EmptySet`].
pub fn first_key(entries: &Entries, condition: &ConditionSpec) -> Result<String, SelectError> {
    key(entries, condition, false)?.ok_or(SelectError::EmptySet)
}

/// A uniformly chosen matching key.
pub fn random_key(entries: &Entries, condition: &ConditionSpec) -> Result<String, SelectError> {
    random_key_with(entries, condition, &mut rand::thread_rng())
}

/// [`random_key`] with a caller-supplied random source.
pub fn random_key_with<R: Rng + ?Sized>(
    entries: &Entries,
    condition: &ConditionSpec,
    rng: &mut R,
) -> Result<String, SelectError> {
    keys(entries, condition)
        .choose(rng)
        .cloned()
        .ok_or(SelectError::EmptySet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn statuses() -> Entries {
        Entries::from_value(&json!({
            "draft": {"title": "Draft", "is_default": true, "final": false},
            "review": {"title": "Review", "final": false},
            "done": {"title": "Done", "final": true},
            "archived": {"title": "Archived", "final": true, "hidden": true},
        }))
    }

    #[test]
    fn keys_keep_config_order() {
        let spec = ConditionSpec::new().with("final", true);
        assert_eq!(keys(&statuses(), &spec), ["done", "archived"]);
        assert_eq!(keys(&statuses(), &ConditionSpec::new()).len(), 4);
    }

    #[test]
    fn strict_key_requires_exactly_one_match() {
        let entries = statuses();
        let single = ConditionSpec::new().with("is_default", true);
        assert_eq!(key(&entries, &single, true).unwrap(), Some("draft".into()));

        let many = ConditionSpec::new().with("final", true);
        assert_eq!(
            key(&entries, &many, true),
            Err(SelectError::NotSingleton { count: 2 })
        );

        let none = ConditionSpec::new().with("missing", true);
        assert_eq!(
            key(&entries, &none, true),
            Err(SelectError::NotSingleton { count: 0 })
        );
        assert_eq!(key(&entries, &none, false).unwrap(), None);
    }

    #[test]
    fn first_key_reports_empty_set() {
        let entries = statuses();
        let spec = ConditionSpec::new().with("final", true);
        assert_eq!(first_key(&entries, &spec).unwrap(), "done");

        let none = ConditionSpec::new().with("missing", true);
        assert_eq!(first_key(&entries, &none), Err(SelectError::EmptySet));
    }

    #[test]
    fn random_key_picks_a_match() {
        let entries = statuses();
        let spec = ConditionSpec::new().with("hidden", false);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = random_key_with(&entries, &spec, &mut rng).unwrap();
            assert!(["draft", "review", "done"].contains(&picked.as_str()));
        }
    }

    #[test]
    fn random_key_reports_empty_set() {
        let spec = ConditionSpec::new().with("missing", true);
        assert_eq!(random_key(&statuses(), &spec), Err(SelectError::EmptySet));
    }

    #[test]
    fn positional_condition_matches_numeric_keys() {
        let entries = Entries::from_value(&json!({"1": "one", "2": "two", "x": "ex"}));
        let spec = ConditionSpec::new().with_key(json!([2, "x"]));
        assert_eq!(keys(&entries, &spec), ["2", "x"]);
    }
}
