//! Breed genetic profiles and the bundled breed catalog.
//!
//! Profiles arrive as loosely-typed JSON and are validated once here, so the
//! resolvers can assume every table they read is well formed.
use log::{error, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::{EquineError, Result};
use crate::locus::{Allele, Locus};
use crate::phenotype::UNMARKED;
use crate::ratings::{ALL_STATS, RatingProfile, Stat};

const DEFAULT_BREED_DATA: &str = include_str!("../assets/data/breeds.json");

/// Ordered `name -> relative weight` table.
pub type WeightTable = BTreeMap<String, f64>;

/// Allele weights for one locus, in dominance order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlleleTable {
    entries: Vec<(Allele, f64)>,
}

impl AlleleTable {
    pub fn iter(&self) -> impl Iterator<Item = (Allele, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Weight for an allele symbol; undefined alleles weigh zero.
    #[must_use]
    pub fn weight(&self, symbol: &str) -> f64 {
        self.entries
            .iter()
            .find(|(allele, _)| allele.symbol() == symbol)
            .map_or(0.0, |(_, weight)| *weight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedMarkingsBias {
    #[serde(default = "unit_multiplier")]
    pub mottling_multiplier: f64,
    #[serde(default = "unit_multiplier")]
    pub striping_multiplier: f64,
}

impl Default for AdvancedMarkingsBias {
    fn default() -> Self {
        Self {
            mottling_multiplier: 1.0,
            striping_multiplier: 1.0,
        }
    }
}

const fn unit_multiplier() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkingBias {
    #[serde(default)]
    pub face: WeightTable,
    pub legs_general_probability: f64,
    pub max_legs_marked: u8,
    #[serde(default)]
    pub leg_specific_probabilities: WeightTable,
    #[serde(default)]
    pub advanced_markings_bias: Option<AdvancedMarkingsBias>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBreedProfile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    allele_weights: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    shade_bias: BTreeMap<String, WeightTable>,
    #[serde(default)]
    default_shade_bias: Option<WeightTable>,
    marking_bias: MarkingBias,
    #[serde(default)]
    temperament_weights: WeightTable,
    #[serde(default)]
    rating_profiles: BTreeMap<String, RatingProfile>,
}

/// Validated per-breed configuration consumed by every resolver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawBreedProfile")]
pub struct BreedGeneticProfile {
    id: String,
    name: String,
    allele_weights: BTreeMap<Locus, AlleleTable>,
    shade_bias: BTreeMap<String, WeightTable>,
    default_shade_bias: Option<WeightTable>,
    marking_bias: MarkingBias,
    temperament_weights: WeightTable,
    rating_profiles: BTreeMap<Stat, RatingProfile>,
}

impl BreedGeneticProfile {
    /// Parse and validate a single profile.
    ///
    /// # Errors
    ///
    /// Returns [`EquineError::CatalogParse`] for malformed JSON and a
    /// configuration or invariant error for incomplete tables.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawBreedProfile =
            serde_json::from_str(json).map_err(|err| EquineError::CatalogParse {
                catalog: "breed profile",
                message: err.to_string(),
            })?;
        Self::try_from(raw)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn allele_weights(&self) -> &BTreeMap<Locus, AlleleTable> {
        &self.allele_weights
    }

    /// Shade table for a color, falling back to the profile default bucket.
    #[must_use]
    pub fn shade_table(&self, color: &str) -> Option<&WeightTable> {
        self.shade_bias
            .get(color)
            .or(self.default_shade_bias.as_ref())
    }

    #[must_use]
    pub const fn has_default_shade(&self) -> bool {
        self.default_shade_bias.is_some()
    }

    #[must_use]
    pub const fn marking_bias(&self) -> &MarkingBias {
        &self.marking_bias
    }

    #[must_use]
    pub const fn temperament_weights(&self) -> &WeightTable {
        &self.temperament_weights
    }

    #[must_use]
    pub fn rating_profile(&self, stat: Stat) -> Option<RatingProfile> {
        self.rating_profiles.get(&stat).copied()
    }
}

impl TryFrom<RawBreedProfile> for BreedGeneticProfile {
    type Error = EquineError;

    fn try_from(raw: RawBreedProfile) -> Result<Self> {
        let breed = raw.id.trim().to_string();
        if breed.is_empty() {
            return Err(invalid(&breed, "id must not be empty"));
        }

        let mut allele_weights = BTreeMap::new();
        for (locus_id, weights) in &raw.allele_weights {
            let locus: Locus = locus_id.parse()?;
            let mut entries = Vec::with_capacity(weights.len());
            for (symbol, weight) in weights {
                let allele = locus.allele(symbol)?;
                check_weight(&format!("{breed}.alleleWeights.{locus}"), symbol, *weight)?;
                entries.push((allele, *weight));
            }
            entries.sort_by_key(|(allele, _)| allele.rank());
            if entries.iter().all(|(_, weight)| *weight <= 0.0) {
                return Err(EquineError::EmptyWeightTable {
                    table: format!("{breed}.alleleWeights.{locus}"),
                });
            }
            allele_weights.insert(locus, AlleleTable { entries });
        }
        if !allele_weights.contains_key(&Locus::Extension) {
            warn!("{breed}: no extension weights; generated horses cannot be colored");
        }

        for (color, table) in &raw.shade_bias {
            require_selectable(&breed, &format!("shadeBias.{color}"), table)?;
        }
        if let Some(table) = &raw.default_shade_bias {
            require_selectable(&breed, "defaultShadeBias", table)?;
        }

        validate_markings(&breed, &raw.marking_bias)?;

        if !has_selectable(&raw.temperament_weights) {
            return Err(EquineError::MissingTemperamentTable { breed });
        }
        check_table(&breed, "temperamentWeights", &raw.temperament_weights)?;

        let mut rating_profiles = BTreeMap::new();
        for (stat_id, rating) in &raw.rating_profiles {
            let stat: Stat = stat_id
                .parse()
                .map_err(|reason: String| invalid(&breed, &reason))?;
            if !rating.mean.is_finite() || !rating.std_dev.is_finite() || rating.std_dev < 0.0 {
                return Err(invalid(
                    &breed,
                    &format!("ratingProfiles.{stat} needs a finite mean and non-negative stdDev"),
                ));
            }
            rating_profiles.insert(stat, *rating);
        }
        if let Some(stat) = ALL_STATS
            .iter()
            .find(|stat| !rating_profiles.contains_key(stat))
        {
            return Err(EquineError::MissingRatingProfile {
                breed,
                stat: stat.id(),
            });
        }

        let name = if raw.name.trim().is_empty() {
            breed.clone()
        } else {
            raw.name
        };

        Ok(Self {
            id: breed,
            name,
            allele_weights,
            shade_bias: raw.shade_bias,
            default_shade_bias: raw.default_shade_bias,
            marking_bias: raw.marking_bias,
            temperament_weights: raw.temperament_weights,
            rating_profiles,
        })
    }
}

fn validate_markings(breed: &str, bias: &MarkingBias) -> Result<()> {
    require_selectable(breed, "markingBias.face", &bias.face)?;
    if !(0.0..=1.0).contains(&bias.legs_general_probability) {
        return Err(invalid(
            breed,
            "markingBias.legsGeneralProbability must be within [0, 1]",
        ));
    }
    if bias.max_legs_marked > 4 {
        return Err(invalid(breed, "markingBias.maxLegsMarked cannot exceed 4"));
    }
    if bias.leg_specific_probabilities.contains_key(UNMARKED) {
        return Err(invalid(
            breed,
            "markingBias.legSpecificProbabilities cannot use the reserved marking none",
        ));
    }
    if bias.legs_general_probability > 0.0 && bias.max_legs_marked > 0 {
        require_selectable(
            breed,
            "markingBias.legSpecificProbabilities",
            &bias.leg_specific_probabilities,
        )?;
    }
    if let Some(advanced) = bias.advanced_markings_bias {
        let valid = |m: f64| m.is_finite() && m >= 0.0;
        if !valid(advanced.mottling_multiplier) || !valid(advanced.striping_multiplier) {
            return Err(invalid(
                breed,
                "markingBias.advancedMarkingsBias multipliers must be non-negative",
            ));
        }
    }
    Ok(())
}

fn check_weight(table: &str, entry: &str, weight: f64) -> Result<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(EquineError::InvalidWeight {
            table: table.to_string(),
            entry: entry.to_string(),
            weight,
        })
    }
}

fn check_table(breed: &str, label: &str, table: &WeightTable) -> Result<()> {
    let qualified = format!("{breed}.{label}");
    table
        .iter()
        .try_for_each(|(entry, weight)| check_weight(&qualified, entry, *weight))
}

fn has_selectable(table: &WeightTable) -> bool {
    table.values().any(|weight| *weight > 0.0)
}

fn require_selectable(breed: &str, label: &str, table: &WeightTable) -> Result<()> {
    check_table(breed, label, table)?;
    if has_selectable(table) {
        Ok(())
    } else {
        Err(invalid(breed, &format!("{label} has no selectable entries")))
    }
}

fn invalid(breed: &str, reason: &str) -> EquineError {
    EquineError::InvalidProfile {
        breed: breed.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct RawBreedCatalog {
    #[serde(default)]
    breeds: Vec<RawBreedProfile>,
}

/// All validated breed profiles, in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BreedCatalog {
    breeds: Vec<BreedGeneticProfile>,
}

impl BreedCatalog {
    #[must_use]
    pub const fn empty() -> Self {
        Self { breeds: Vec::new() }
    }

    /// Parse and validate every profile in a `{"breeds": [...]}` document.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, duplicate ids, or the first invalid profile.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawBreedCatalog =
            serde_json::from_str(json).map_err(|err| EquineError::CatalogParse {
                catalog: "breeds",
                message: err.to_string(),
            })?;
        let mut breeds: Vec<BreedGeneticProfile> = Vec::with_capacity(raw.breeds.len());
        for entry in raw.breeds {
            let profile = BreedGeneticProfile::try_from(entry)?;
            if breeds.iter().any(|existing| existing.id == profile.id) {
                return Err(invalid(&profile.id, "duplicate breed id"));
            }
            breeds.push(profile);
        }
        Ok(Self { breeds })
    }

    /// Bundled breed data.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled asset itself is broken.
    pub fn load_from_static() -> Result<Self> {
        Self::from_json(DEFAULT_BREED_DATA)
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<BreedCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            Self::load_from_static().unwrap_or_else(|err| {
                error!("bundled breed catalog is invalid: {err}");
                Self::empty()
            })
        })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BreedGeneticProfile> {
        self.breeds.iter().find(|profile| profile.id == id)
    }

    /// # Errors
    ///
    /// Returns [`EquineError::UnknownBreed`] when no profile has this id.
    pub fn require(&self, id: &str) -> Result<&BreedGeneticProfile> {
        self.get(id)
            .ok_or_else(|| EquineError::UnknownBreed(id.to_string()))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BreedGeneticProfile> {
        self.breeds.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.breeds.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.breeds.is_empty()
    }
}

impl<'a> IntoIterator for &'a BreedCatalog {
    type Item = &'a BreedGeneticProfile;
    type IntoIter = std::slice::Iter<'a, BreedGeneticProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
