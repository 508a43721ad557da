//! Revealing latent traits as a horse bonds with its handler and matures.
use log::debug;
use serde::{Deserialize, Serialize};

use super::catalog;
use super::inheritance::TraitInheritanceEngine;
use super::{TraitSet, TraitSlot};
use crate::error::{EquineError, Result};
use crate::random::RandomSource;

const BASE_REVEAL_CHANCE: f64 = 0.10;
const MATURITY_BONUS: f64 = 0.10;
const MATURITY_AGE_YEARS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryContext {
    pub bond_score: f64,
    pub age_years: f64,
}

impl DiscoveryContext {
    #[must_use]
    pub fn reveal_chance(&self) -> f64 {
        let maturity = if self.age_years >= MATURITY_AGE_YEARS {
            MATURITY_BONUS
        } else {
            0.0
        };
        (BASE_REVEAL_CHANCE + self.bond_score / 200.0 + maturity).min(1.0)
    }

    fn validate(&self) -> Result<()> {
        if !self.bond_score.is_finite() || !(0.0..=100.0).contains(&self.bond_score) {
            return Err(EquineError::OutOfRange {
                field: "bondScore",
                min: 0.0,
                max: 100.0,
                value: self.bond_score,
            });
        }
        if !self.age_years.is_finite() || self.age_years < 0.0 {
            return Err(EquineError::InvalidAge(self.age_years));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryOutcome {
    pub traits: TraitSet,
    pub revealed: Vec<String>,
}

impl TraitInheritanceEngine {
    /// Roll each hidden trait once; revealed traits move to their category list.
    ///
    /// # Errors
    ///
    /// Validation errors for an out-of-range bond score or a bad age.
    pub fn discover<R>(
        traits: &TraitSet,
        context: DiscoveryContext,
        rng: &mut R,
    ) -> Result<DiscoveryOutcome>
    where
        R: RandomSource + ?Sized,
    {
        context.validate()?;
        let chance = context.reveal_chance();
        let mut next = TraitSet {
            positive: traits.positive.clone(),
            negative: traits.negative.clone(),
            hidden: Default::default(),
        };
        let mut revealed = Vec::new();

        for name in &traits.hidden {
            let category = catalog::category_of(name);
            let reveal = rng.chance(chance);
            if let Some(category) = category
                && reveal
                && next.try_insert(name, TraitSlot::from(category))
            {
                revealed.push(name.clone());
                continue;
            }
            // Duplicates are dropped; a trait blocked by its opposite stays latent.
            if next.contains(name) {
                debug!("dropping duplicate hidden trait {name}");
            } else {
                next.hidden.push(name.clone());
            }
        }

        if !revealed.is_empty() {
            debug!("revealed hidden traits {revealed:?}");
        }
        Ok(DiscoveryOutcome {
            traits: next,
            revealed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedSource;

    fn hidden(names: &[&str]) -> TraitSet {
        let mut set = TraitSet::default();
        for name in names {
            set.try_insert(name, TraitSlot::Hidden);
        }
        set
    }

    #[test]
    fn reveal_chance_grows_with_bond_and_age() {
        let foal = DiscoveryContext {
            bond_score: 0.0,
            age_years: 0.5,
        };
        assert!((foal.reveal_chance() - 0.10).abs() < 1e-12);
        let adult = DiscoveryContext {
            bond_score: 100.0,
            age_years: 3.0,
        };
        assert!((adult.reveal_chance() - 0.70).abs() < 1e-12);
    }

    #[test]
    fn reveal_never_duplicates_or_pairs_opposites() {
        let traits = TraitSet {
            positive: ["calm"].iter().map(|n| (*n).to_string()).collect(),
            negative: Default::default(),
            hidden: ["nervous", "calm", "lazy"]
                .iter()
                .map(|n| (*n).to_string())
                .collect(),
        };
        let context = DiscoveryContext {
            bond_score: 100.0,
            age_years: 5.0,
        };
        let mut rng = ScriptedSource::constant(0.0);
        let outcome = TraitInheritanceEngine::discover(&traits, context, &mut rng).unwrap();
        assert_eq!(outcome.traits.positive.as_slice(), ["calm"]);
        assert_eq!(outcome.traits.negative.as_slice(), ["lazy"]);
        assert_eq!(outcome.traits.hidden.as_slice(), ["nervous"]);
        assert_eq!(outcome.revealed, ["lazy"]);
    }

    #[test]
    fn revealed_traits_move_to_their_category() {
        let traits = hidden(&["legendary_bloodline", "burnout", "lazy"]);
        let context = DiscoveryContext {
            bond_score: 80.0,
            age_years: 2.0,
        };
        // chance is 0.6: reveal, keep hidden, reveal.
        let mut rng = ScriptedSource::new([0.1, 0.9, 0.2]);
        let outcome = TraitInheritanceEngine::discover(&traits, context, &mut rng).unwrap();
        assert_eq!(outcome.revealed, ["legendary_bloodline", "lazy"]);
        assert_eq!(outcome.traits.positive.as_slice(), ["legendary_bloodline"]);
        assert_eq!(outcome.traits.negative.as_slice(), ["lazy"]);
        assert_eq!(outcome.traits.hidden.as_slice(), ["burnout"]);
    }

    #[test]
    fn bad_context_is_rejected() {
        let traits = hidden(&["lazy"]);
        let context = DiscoveryContext {
            bond_score: 120.0,
            age_years: 1.0,
        };
        let err = TraitInheritanceEngine::discover(&traits, context, &mut ScriptedSource::constant(0.0))
            .unwrap_err();
        assert!(err.is_validation());
    }
}
