//! Epigenetic traits: catalog, inheritance, discovery, and gameplay effects.
pub mod catalog;
pub mod discovery;
pub mod effects;
pub mod inheritance;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use catalog::{TraitCategory, TraitDefinition};
pub use discovery::{DiscoveryContext, DiscoveryOutcome};
pub use effects::{EffectValue, TraitEffect, TraitEffectRegistry};
pub use inheritance::{InheritanceRequest, TraitInheritanceEngine};

/// Ordered list of trait identifiers; most horses carry only a handful.
pub type TraitList = SmallVec<[String; 4]>;

/// Which list a trait lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitSlot {
    Positive,
    Negative,
    Hidden,
}

impl From<TraitCategory> for TraitSlot {
    fn from(category: TraitCategory) -> Self {
        match category {
            TraitCategory::Positive => Self::Positive,
            TraitCategory::Negative => Self::Negative,
        }
    }
}

/// A horse's traits. No identifier appears twice across the three lists and a
/// trait never sits next to its opposite; [`TraitSet::try_insert`] enforces both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitSet {
    #[serde(default)]
    pub positive: TraitList,
    #[serde(default)]
    pub negative: TraitList,
    #[serde(default)]
    pub hidden: TraitList,
}

impl TraitSet {
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|existing| existing == name)
    }

    /// All identifiers: positive, then negative, then hidden.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.positive
            .iter()
            .chain(self.negative.iter())
            .chain(self.hidden.iter())
            .map(String::as_str)
    }

    /// Only the expressed (positive and negative) traits.
    pub fn visible(&self) -> impl Iterator<Item = &str> {
        self.positive
            .iter()
            .chain(self.negative.iter())
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len() + self.hidden.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selected trait that blocks `name`, if any.
    #[must_use]
    pub fn conflict_with(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|existing| catalog::are_opposites(existing, name))
    }

    /// Add a trait unless it is already present or its opposite is.
    /// Returns whether the trait was added.
    pub fn try_insert(&mut self, name: &str, slot: TraitSlot) -> bool {
        if self.contains(name) || self.conflict_with(name).is_some() {
            return false;
        }
        self.list_mut(slot).push(name.to_string());
        true
    }

    pub(crate) fn list_mut(&mut self, slot: TraitSlot) -> &mut TraitList {
        match slot {
            TraitSlot::Positive => &mut self.positive,
            TraitSlot::Negative => &mut self.negative,
            TraitSlot::Hidden => &mut self.hidden,
        }
    }
}
