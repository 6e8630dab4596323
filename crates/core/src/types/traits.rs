//! Personality traits and label-keyed trait selections.

use serde::{Deserialize, Serialize};

/// Category a trait belongs to. Closed set; unknown values fail to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitCategory {
    Creativity,
    Interests,
    Sports,
    Personality,
}

/// A selectable trait badge.
///
/// The `label` is the identity of a trait inside a [`TraitSelection`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trait {
    pub emoji: String,
    pub label: String,
    pub category: TraitCategory,
}

impl Trait {
    #[must_use]
    pub fn new(emoji: impl Into<String>, label: impl Into<String>, category: TraitCategory) -> Self {
        Self {
            emoji: emoji.into(),
            label: label.into(),
            category,
        }
    }
}

/// An ordered set of traits, deduplicated by label.
///
/// Order is insertion order and is shown to the user as-is, so it is never
/// re-sorted. Deserializing a list with repeated labels keeps the first
/// occurrence of each.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Trait>", into = "Vec<Trait>")]
pub struct TraitSelection(Vec<Trait>);

impl TraitSelection {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Whether a trait with this label is selected.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|t| t.label == label)
    }

    /// Remove the trait if a trait with the same label is present, else append it.
    ///
    /// Returns `true` if the trait is selected afterwards.
    pub fn toggle(&mut self, item: Trait) -> bool {
        if self.remove(&item.label) {
            false
        } else {
            self.0.push(item);
            true
        }
    }

    /// Append the trait unless its label is already present.
    ///
    /// Returns `true` if it was added.
    pub fn insert(&mut self, item: Trait) -> bool {
        if self.contains(&item.label) {
            return false;
        }
        self.0.push(item);
        true
    }

    /// Remove the trait with this label. Returns `true` if one was removed.
    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t.label != label);
        self.0.len() != before
    }

    /// Labels in display order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|t| t.label.as_str())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Trait] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Trait>> for TraitSelection {
    fn from(items: Vec<Trait>) -> Self {
        let mut selection = Self::new();
        for item in items {
            selection.insert(item);
        }
        selection
    }
}

impl From<TraitSelection> for Vec<Trait> {
    fn from(selection: TraitSelection) -> Self {
        selection.0
    }
}

impl FromIterator<Trait> for TraitSelection {
    fn from_iter<I: IntoIterator<Item = Trait>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
