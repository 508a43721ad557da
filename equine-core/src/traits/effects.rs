//! Trait to gameplay-modifier catalog.
use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::{EquineError, Result};

const DEFAULT_EFFECT_DATA: &str = include_str!("../../assets/data/trait_effects.json");

pub const TRAINING_XP_MODIFIER: &str = "trainingXpModifier";
pub const COMPETITION_SCORE_MODIFIER: &str = "competitionScoreModifier";
pub const BONDING_MODIFIER: &str = "bondingModifier";
pub const STRESS_RESISTANCE: &str = "stressResistance";
pub const DISCIPLINE_MODIFIERS: &str = "disciplineModifiers";
pub const BASE_STAT_BOOST: &str = "baseStatBoost";
pub const SUPPRESS_TRAINING_STRESS: &str = "suppressTrainingStress";
pub const INJURY_RESISTANT: &str = "injuryResistant";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectValue {
    Flag(bool),
    Number(f64),
    Table(BTreeMap<String, f64>),
}

impl EffectValue {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Flag(_) => "flag",
            Self::Number(_) => "number",
            Self::Table(_) => "table",
        }
    }

    /// Merge `other` into `self`. Returns false when the kinds differ.
    fn merge(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::Flag(a), Self::Flag(b)) => *a |= *b,
            (Self::Number(a), Self::Number(b)) => *a += *b,
            (Self::Table(a), Self::Table(b)) => {
                for (key, value) in b {
                    *a.entry(key.clone()).or_insert(0.0) += *value;
                }
            }
            _ => return false,
        }
        true
    }
}

/// Modifier name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitEffect(BTreeMap<String, EffectValue>);

impl TraitEffect {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: EffectValue) -> Option<EffectValue> {
        self.0.insert(name.into(), value)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EffectValue> {
        self.0.get(name)
    }

    /// Numeric modifier, zero when absent or of another kind.
    #[must_use]
    pub fn number(&self, name: &str) -> f64 {
        match self.0.get(name) {
            Some(EffectValue::Number(value)) => *value,
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(EffectValue::Flag(true)))
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&BTreeMap<String, f64>> {
        match self.0.get(name) {
            Some(EffectValue::Table(table)) => Some(table),
            _ => None,
        }
    }

    /// Entry of a table modifier, zero when absent.
    #[must_use]
    pub fn table_value(&self, name: &str, key: &str) -> f64 {
        self.table(name)
            .and_then(|table| table.get(key))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EffectValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn absorb(&mut self, trait_name: &str, other: &Self) {
        for (name, value) in &other.0 {
            match self.0.get_mut(name) {
                Some(existing) => {
                    if !existing.merge(value) {
                        warn!(
                            "{trait_name}: {name} is a {} here but a {} elsewhere; ignoring",
                            value.kind(),
                            existing.kind()
                        );
                    }
                }
                None => {
                    self.0.insert(name.clone(), value.clone());
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRegistry {
    #[serde(default)]
    traits: BTreeMap<String, TraitEffect>,
}

/// Static trait-effect catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitEffectRegistry {
    effects: BTreeMap<String, TraitEffect>,
}

impl TraitEffectRegistry {
    /// Parse a `{"traits": {name: {modifier: value}}}` document.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or when a modifier name is used with two kinds.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawRegistry =
            serde_json::from_str(json).map_err(|err| EquineError::CatalogParse {
                catalog: "trait_effects",
                message: err.to_string(),
            })?;
        let registry = Self {
            effects: raw.traits,
        };
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> Result<()> {
        let mut kinds: BTreeMap<&str, (&str, &'static str)> = BTreeMap::new();
        for (trait_name, effect) in &self.effects {
            for (modifier, value) in effect.iter() {
                if let EffectValue::Number(number) = value
                    && !number.is_finite()
                {
                    return Err(parse_error(format!("{trait_name}.{modifier} is not finite")));
                }
                match kinds.get(modifier) {
                    Some((first, kind)) if *kind != value.kind() => {
                        return Err(parse_error(format!(
                            "{modifier} is a {kind} for {first} but a {} for {trait_name}",
                            value.kind()
                        )));
                    }
                    Some(_) => {}
                    None => {
                        kinds.insert(modifier, (trait_name.as_str(), value.kind()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Bundled catalog.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled asset is broken.
    pub fn load_from_static() -> Result<Self> {
        Self::from_json(DEFAULT_EFFECT_DATA)
    }

    #[must_use]
    pub fn default_registry() -> &'static Self {
        static REGISTRY: OnceLock<TraitEffectRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            Self::load_from_static().unwrap_or_else(|err| {
                error!("bundled trait effects are invalid: {err}");
                Self::default()
            })
        })
    }

    #[must_use]
    pub fn effects_of(&self, name: &str) -> Option<&TraitEffect> {
        self.effects.get(name)
    }

    /// Merge the effects of every known trait: flags OR, numbers sum, tables sum
    /// per key over the union of keys. Unknown names are skipped.
    pub fn combine<I, S>(&self, names: I) -> TraitEffect
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut combined = TraitEffect::new();
        for name in names {
            let name = name.as_ref();
            if let Some(effect) = self.effects_of(name) {
                combined.absorb(name, effect);
            }
        }
        combined
    }

    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.effects.keys().map(String::as_str)
    }
}

fn parse_error(message: String) -> EquineError {
    EquineError::CatalogParse {
        catalog: "trait_effects",
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "traits": {
            "bold": {
                "competitionScoreModifier": 0.05,
                "disciplineModifiers": {"show_jumping": 0.1},
                "injuryResistant": false
            },
            "athletic": {
                "competitionScoreModifier": 0.03,
                "disciplineModifiers": {"show_jumping": 0.05, "racing": 0.02},
                "baseStatBoost": {"speed": 2},
                "injuryResistant": true
            }
        }
    }"#;

    #[test]
    fn combine_sums_numbers_ors_flags_and_unions_tables() {
        let registry = TraitEffectRegistry::from_json(SAMPLE).unwrap();
        let combined = registry.combine(["bold", "ghost", "athletic"]);
        assert!((combined.number(COMPETITION_SCORE_MODIFIER) - 0.08).abs() < 1e-12);
        assert!(combined.flag(INJURY_RESISTANT));
        assert!((combined.table_value(DISCIPLINE_MODIFIERS, "show_jumping") - 0.15).abs() < 1e-12);
        assert!((combined.table_value(DISCIPLINE_MODIFIERS, "racing") - 0.02).abs() < 1e-12);
        assert!((combined.table_value(BASE_STAT_BOOST, "speed") - 2.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_traits_are_absent_and_ignored() {
        let registry = TraitEffectRegistry::from_json(SAMPLE).unwrap();
        assert!(registry.effects_of("ghost").is_none());
        assert!(registry.combine(["ghost", "phantom"]).is_empty());
    }

    #[test]
    fn mixed_kinds_are_rejected_at_load() {
        let json = r#"{"traits": {
            "a": {"bondingModifier": 0.1},
            "b": {"bondingModifier": true}
        }}"#;
        assert!(matches!(
            TraitEffectRegistry::from_json(json),
            Err(EquineError::CatalogParse { .. })
        ));
    }

    #[test]
    fn bundled_registry_loads() {
        let registry = TraitEffectRegistry::load_from_static().unwrap();
        assert!(registry.effects_of("calm").is_some());
        for name in registry.trait_names() {
            assert!(
                crate::traits::catalog::category_of(name).is_some(),
                "{name} has effects but no catalog entry"
            );
        }
    }
}
