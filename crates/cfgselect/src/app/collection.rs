//! Ordered, optionally grouped option collections.

use std::collections::BTreeSet;

use anyhow::Result;

use crate::app::render::default_renderer;
use crate::domain::model::{OptionItem, OptionValue};

/// A top-level element: a lone option or a labelled group of options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionNode {
    Single(OptionItem),
    Group {
        label: String,
        options: Vec<OptionItem>,
    },
}

/// One built option tagged with the group it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRow {
    pub group: Option<String>,
    pub item: OptionItem,
}

/// Options in insertion order, plus the stringified values to mark as selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionCollection {
    nodes: Vec<OptionNode>,
    selected: BTreeSet<String>,
}

impl OptionCollection {
    /// Assemble rows into nodes.
    ///
    /// A group sits at the position of its first member; later members join it. An option
    /// whose value repeats within the same scope replaces the earlier one in place.
    pub fn from_rows(
        rows: impl IntoIterator<Item = OptionRow>,
        selected: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut nodes: Vec<OptionNode> = Vec::new();

        for OptionRow { group, item } in rows {
            match group {
                None => upsert_single(&mut nodes, item),
                Some(label) => match group_options(&mut nodes, &label) {
                    Some(options) => upsert(options, item),
                    None => nodes.push(OptionNode::Group {
                        label,
                        options: vec![item],
                    }),
                },
            }
        }

        Self {
            nodes,
            selected: selected.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OptionNode> {
        self.nodes.iter()
    }

    /// Every option, with group members flattened in place.
    pub fn options(&self) -> impl Iterator<Item = &OptionItem> {
        self.nodes.iter().flat_map(|node| match node {
            OptionNode::Single(item) => std::slice::from_ref(item).iter(),
            OptionNode::Group { options, .. } => options.iter(),
        })
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, value: &OptionValue) -> bool {
        self.selected.contains(&value.to_string())
    }

    /// Render as `<option>`/`<optgroup>` markup with HTML escaping.
    pub fn to_markup(&self) -> Result<String> {
        default_renderer()?.render(self)
    }
}

impl<'a> IntoIterator for &'a OptionCollection {
    type Item = &'a OptionNode;
    type IntoIter = std::slice::Iter<'a, OptionNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

fn upsert_single(nodes: &mut Vec<OptionNode>, item: OptionItem) {
    let existing = nodes.iter_mut().find_map(|node| match node {
        OptionNode::Single(current) if current.value == item.value => Some(current),
        _ => None,
    });
    match existing {
        Some(current) => *current = item,
        None => nodes.push(OptionNode::Single(item)),
    }
}

fn group_options<'a>(
    nodes: &'a mut [OptionNode],
    group_label: &str,
) -> Option<&'a mut Vec<OptionItem>> {
    nodes.iter_mut().find_map(|node| match node {
        OptionNode::Group { label, options } if *label == group_label => Some(options),
        _ => None,
    })
}

fn upsert(options: &mut Vec<OptionItem>, item: OptionItem) {
    let existing = options.iter_mut().find(|held| held.value == item.value);
    match existing {
        Some(current) => *current = item,
        None => options.push(item),
    }
}
