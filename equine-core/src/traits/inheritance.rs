//! Offspring trait inheritance shaped by the dam's bond and stress.
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::{self, ENVIRONMENT_TRAITS, RARE_TRAITS, TraitCategory};
use super::{TraitSet, TraitSlot};
use crate::error::{EquineError, Result};
use crate::random::{RandomSource, RollSource, SeedStreams, StreamDomain};

const BASE_INHERITANCE_CHANCE: f64 = 0.50;
const BOND_SHIFT: f64 = 0.30;
const STRESS_SHIFT: f64 = 0.30;
const STRESS_SUSCEPTIBILITY: f64 = 0.45;
const MIN_INHERITANCE_CHANCE: f64 = 0.05;
const MAX_INHERITANCE_CHANCE: f64 = 0.95;
const LATENT_CHANCE: f64 = 0.15;
const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

/// Inputs for one breeding event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct InheritanceRequest {
    pub dam_traits: Vec<String>,
    pub sire_traits: Vec<String>,
    pub dam_bond_score: f64,
    pub dam_stress_level: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl TryFrom<Value> for InheritanceRequest {
    type Error = EquineError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_json(&value)
    }
}

impl InheritanceRequest {
    #[must_use]
    pub const fn new(
        dam_traits: Vec<String>,
        sire_traits: Vec<String>,
        dam_bond_score: f64,
        dam_stress_level: f64,
    ) -> Self {
        Self {
            dam_traits,
            sire_traits,
            dam_bond_score,
            dam_stress_level,
            seed: None,
        }
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build a request from loosely-typed input, checking presence and type
    /// before range.
    ///
    /// # Errors
    ///
    /// Validation errors naming the offending field.
    pub fn from_json(value: &Value) -> Result<Self> {
        let request = Self {
            dam_traits: trait_list(value, "damTraits")?,
            sire_traits: trait_list(value, "sireTraits")?,
            dam_bond_score: score(value, "damBondScore")?,
            dam_stress_level: score(value, "damStressLevel")?,
            seed: seed(value)?,
        };
        request.validate()?;
        Ok(request)
    }

    /// # Errors
    ///
    /// Returns [`EquineError::OutOfRange`] for scores outside `[0, 100]`.
    pub fn validate(&self) -> Result<()> {
        check_range("damBondScore", self.dam_bond_score)?;
        check_range("damStressLevel", self.dam_stress_level)
    }
}

fn trait_list(value: &Value, field: &'static str) -> Result<Vec<String>> {
    match value.get(field) {
        None | Some(Value::Null) => Err(EquineError::MissingField(field)),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or(EquineError::NotAList { field })
            })
            .collect(),
        Some(_) => Err(EquineError::NotAList { field }),
    }
}

fn score(value: &Value, field: &'static str) -> Result<f64> {
    match value.get(field) {
        None | Some(Value::Null) => Err(EquineError::MissingField(field)),
        Some(number @ Value::Number(_)) => {
            number.as_f64().ok_or_else(|| EquineError::NotANumber {
                field,
                value: number.to_string(),
            })
        }
        Some(other) => Err(EquineError::NotANumber {
            field,
            value: other.to_string(),
        }),
    }
}

fn seed(value: &Value) -> Result<Option<u64>> {
    match value.get("seed") {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => raw.as_u64().map(Some).ok_or_else(|| EquineError::NotANumber {
            field: "seed",
            value: raw.to_string(),
        }),
    }
}

fn check_range(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && (SCORE_MIN..=SCORE_MAX).contains(&value) {
        Ok(())
    } else {
        Err(EquineError::OutOfRange {
            field,
            min: SCORE_MIN,
            max: SCORE_MAX,
            value,
        })
    }
}

/// Chance that a parent's trait passes to the foal.
#[must_use]
pub fn parent_trait_chance(category: TraitCategory, bond: f64, stress: f64) -> f64 {
    let mut chance = BASE_INHERITANCE_CHANCE + BOND_SHIFT * (bond - 50.0) / 100.0
        - STRESS_SHIFT * (stress - 50.0) / 100.0;
    if category == TraitCategory::Negative {
        chance += STRESS_SUSCEPTIBILITY * stress / 100.0;
    }
    chance.clamp(MIN_INHERITANCE_CHANCE, MAX_INHERITANCE_CHANCE)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TraitInheritanceEngine;

impl TraitInheritanceEngine {
    /// Validate the request and roll the foal's traits.
    ///
    /// A seeded request draws from its own stream derived from the seed, so
    /// repeated calls produce identical lists regardless of other activity.
    ///
    /// # Errors
    ///
    /// Validation errors for out-of-range scores.
    pub fn calculate(request: &InheritanceRequest) -> Result<TraitSet> {
        request.validate()?;
        match request.seed {
            Some(seed) => {
                let streams = SeedStreams::from_user_seed(seed);
                let mut rng = streams.stream(StreamDomain::Inheritance);
                Self::calculate_with(request, &mut rng)
            }
            None => Self::calculate_with(request, &mut RollSource::from_entropy()),
        }
    }

    /// Same as [`Self::calculate`] with a caller-supplied source; `seed` is ignored.
    ///
    /// # Errors
    ///
    /// Validation errors for out-of-range scores.
    pub fn calculate_with<R>(request: &InheritanceRequest, rng: &mut R) -> Result<TraitSet>
    where
        R: RandomSource + ?Sized,
    {
        request.validate()?;
        let bond = request.dam_bond_score;
        let stress = request.dam_stress_level;
        let mut traits = TraitSet::default();

        for name in request.dam_traits.iter().chain(&request.sire_traits) {
            let Some(category) = catalog::category_of(name) else {
                debug!("skipping unknown parent trait {name:?}");
                continue;
            };
            if traits.contains(name) {
                continue;
            }
            if !rng.chance(parent_trait_chance(category, bond, stress)) {
                continue;
            }
            let slot = if rng.chance(LATENT_CHANCE) {
                TraitSlot::Hidden
            } else {
                TraitSlot::from(category)
            };
            place(&mut traits, name, slot);
        }

        for environment in ENVIRONMENT_TRAITS {
            if rng.chance((environment.chance)(bond, stress)) {
                place(&mut traits, environment.id, environment.category.into());
            }
        }

        for rare in RARE_TRAITS {
            if rng.chance(rare.chance(bond, stress)) {
                place(&mut traits, rare.id, TraitSlot::Hidden);
            }
        }

        debug!(
            "inherited traits (bond {bond}, stress {stress}): +{:?} -{:?} ?{:?}",
            traits.positive, traits.negative, traits.hidden
        );
        Ok(traits)
    }
}

fn place(traits: &mut TraitSet, name: &str, slot: TraitSlot) {
    if let Some(blocker) = traits.conflict_with(name) {
        debug!("dropping {name}: conflicts with {blocker}");
        return;
    }
    traits.try_insert(name, slot);
}
