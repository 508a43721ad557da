//! Equine Core
//!
//! Procedural-generation core for a horse-breeding simulation: coat genetics,
//! epigenetic trait inheritance, trait effects, and show scoring. Everything is
//! pure and synchronous; randomness is always passed in.

pub mod breed;
pub mod competition;
pub mod error;
pub mod genotype;
pub mod locus;
pub mod numbers;
pub mod phenotype;
pub mod random;
pub mod ratings;
pub mod temperament;
pub mod traits;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use breed::{AdvancedMarkingsBias, BreedCatalog, BreedGeneticProfile, MarkingBias, WeightTable};
pub use competition::{
    ALL_DISCIPLINES, CompetitionEntry, CompetitionScorer, Discipline, HealthRating, Placement,
};
pub use error::{EquineError, ErrorKind};
pub use genotype::{Genotype, GenotypeResolver};
pub use locus::{ALL_LOCI, Allele, AllelePair, Locus};
pub use phenotype::{LegMarkings, Markings, Phenotype, PhenotypeEngine};
pub use random::{
    RandomSource, RollSource, ScriptedSource, SeedStreams, StreamDomain, derive_stream_seed,
    seed_from_label, weighted_pick,
};
pub use ratings::{ALL_STATS, RatingGenerator, RatingProfile, Stat, StatBlock};
pub use temperament::TemperamentResolver;
pub use traits::{
    DiscoveryContext, DiscoveryOutcome, EffectValue, InheritanceRequest, TraitEffect,
    TraitEffectRegistry, TraitInheritanceEngine, TraitList, TraitSet,
};

/// Source of breed profiles.
/// Hosts backed by a database or remote config provide their own implementation.
pub trait ProfileLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a validated profile by breed id.
    ///
    /// # Errors
    ///
    /// Returns an error if the breed is unknown or its profile cannot be loaded.
    fn load_profile(&self, breed: &str) -> Result<BreedGeneticProfile, Self::Error>;
}

impl ProfileLoader for BreedCatalog {
    type Error = EquineError;

    fn load_profile(&self, breed: &str) -> Result<BreedGeneticProfile, Self::Error> {
        self.require(breed).cloned()
    }
}

impl<T: ProfileLoader + ?Sized> ProfileLoader for &T {
    type Error = T::Error;

    fn load_profile(&self, breed: &str) -> Result<BreedGeneticProfile, Self::Error> {
        (**self).load_profile(breed)
    }
}

/// A freshly generated horse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedHorse {
    pub breed: String,
    pub seed: u64,
    pub age_years: f64,
    pub genotype: Genotype,
    pub phenotype: Phenotype,
    pub temperament: String,
    pub stats: StatBlock,
}

/// What a parent contributes to a foal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentRecord {
    pub genotype: Genotype,
    #[serde(default)]
    pub traits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoalRequest {
    pub breed: String,
    pub dam: ParentRecord,
    pub sire: ParentRecord,
    pub dam_bond_score: f64,
    pub dam_stress_level: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Foal {
    pub breed: String,
    pub seed: u64,
    pub genotype: Genotype,
    pub phenotype: Phenotype,
    pub traits: TraitSet,
    /// Combined effects of the expressed traits.
    pub effects: TraitEffect,
    pub temperament: String,
    pub stats: StatBlock,
}

/// Facade that turns a seed into complete horses and foals.
pub struct StudBook<L>
where
    L: ProfileLoader,
{
    loader: L,
}

impl<L> StudBook<L>
where
    L: ProfileLoader,
{
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    pub const fn loader(&self) -> &L {
        &self.loader
    }

    fn profile(&self, breed: &str) -> anyhow::Result<BreedGeneticProfile> {
        self.loader
            .load_profile(breed)
            .map_err(anyhow::Error::new)
            .with_context(|| format!("loading breed profile {breed}"))
    }

    /// Generate a horse of `breed`. Each stage draws from its own stream of `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be loaded or any stage fails.
    pub fn generate_horse(
        &self,
        breed: &str,
        age_years: f64,
        seed: u64,
    ) -> anyhow::Result<GeneratedHorse> {
        let profile = self.profile(breed)?;
        let streams = SeedStreams::from_user_seed(seed);

        let genotype =
            GenotypeResolver::resolve(&profile, &mut streams.stream(StreamDomain::Genotype))
                .context("resolving genotype")?;
        let phenotype = PhenotypeEngine::resolve(
            &genotype,
            &profile,
            age_years,
            &mut streams.stream(StreamDomain::Phenotype),
        )
        .context("resolving phenotype")?;
        let temperament =
            TemperamentResolver::resolve(&profile, &mut streams.stream(StreamDomain::Temperament))
                .context("drawing temperament")?;
        let stats = RatingGenerator::generate(&profile, &mut streams.stream(StreamDomain::Ratings))
            .context("drawing stats")?;

        Ok(GeneratedHorse {
            breed: profile.id().to_string(),
            seed,
            age_years,
            genotype,
            phenotype,
            temperament,
            stats,
        })
    }

    /// Breed a foal: Mendelian genotype, newborn phenotype, inherited traits.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown breeds, invalid bond/stress, or any failing stage.
    pub fn breed_foal(&self, request: &FoalRequest) -> anyhow::Result<Foal> {
        let profile = self.profile(&request.breed)?;
        let streams = SeedStreams::from_user_seed(request.seed);

        let inheritance = InheritanceRequest::new(
            request.dam.traits.clone(),
            request.sire.traits.clone(),
            request.dam_bond_score,
            request.dam_stress_level,
        )
        .with_seed(request.seed);
        let traits =
            TraitInheritanceEngine::calculate(&inheritance).context("inheriting traits")?;

        let genotype = GenotypeResolver::cross(
            &request.dam.genotype,
            &request.sire.genotype,
            &profile,
            &mut streams.stream(StreamDomain::Genotype),
        )
        .context("crossing parent genotypes")?;
        let phenotype = PhenotypeEngine::resolve(
            &genotype,
            &profile,
            0.0,
            &mut streams.stream(StreamDomain::Phenotype),
        )
        .context("resolving foal phenotype")?;
        let temperament =
            TemperamentResolver::resolve(&profile, &mut streams.stream(StreamDomain::Temperament))
                .context("drawing temperament")?;
        let stats = RatingGenerator::generate(&profile, &mut streams.stream(StreamDomain::Ratings))
            .context("drawing stats")?;
        let effects = TraitEffectRegistry::default_registry().combine(traits.visible());

        Ok(Foal {
            breed: profile.id().to_string(),
            seed: request.seed,
            genotype,
            phenotype,
            traits,
            effects,
            temperament,
            stats,
        })
    }
}

impl Default for StudBook<&'static BreedCatalog> {
    fn default() -> Self {
        Self::new(BreedCatalog::default_catalog())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_horses_replay_by_seed() {
        let studbook = StudBook::new(BreedCatalog::default_catalog());
        let first = studbook.generate_horse("quarter_horse", 4.0, 77).unwrap();
        let second = studbook.generate_horse("quarter_horse", 4.0, 77).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.breed, "quarter_horse");
        assert!(first.genotype.contains(Locus::Extension));
    }

    #[test]
    fn unknown_breed_surfaces_configuration_error() {
        let studbook = StudBook::new(BreedCatalog::default_catalog());
        let err = studbook.generate_horse("unicorn", 1.0, 1).unwrap_err();
        let root = err.downcast_ref::<EquineError>().unwrap();
        assert!(root.is_configuration());
    }

    #[test]
    fn foal_inherits_from_parents() {
        let studbook = StudBook::new(BreedCatalog::load_from_static().unwrap());
        let request = FoalRequest {
            breed: "thoroughbred".into(),
            dam: ParentRecord {
                genotype: Genotype::from_notation([("extension", "e/e"), ("agouti", "A/A")])
                    .unwrap(),
                traits: vec!["calm".into()],
            },
            sire: ParentRecord {
                genotype: Genotype::from_notation([("extension", "e/e"), ("agouti", "a/a")])
                    .unwrap(),
                traits: vec!["nervous".into()],
            },
            dam_bond_score: 70.0,
            dam_stress_level: 20.0,
            seed: 2024,
        };
        let foal = studbook.breed_foal(&request).unwrap();
        assert_eq!(foal.phenotype.final_display_color, "Chestnut");
        assert_eq!(foal.genotype.get(Locus::Agouti).unwrap().to_string(), "A/a");
        assert!(!(foal.traits.contains("calm") && foal.traits.contains("nervous")));
        assert_eq!(studbook.breed_foal(&request).unwrap(), foal);
    }

    #[test]
    fn foal_rejects_bad_bond_score() {
        let studbook = StudBook::new(BreedCatalog::default_catalog());
        let request = FoalRequest {
            breed: "arabian".into(),
            dam: ParentRecord::default(),
            sire: ParentRecord::default(),
            dam_bond_score: 150.0,
            dam_stress_level: 10.0,
            seed: 1,
        };
        let err = studbook.breed_foal(&request).unwrap_err();
        assert!(err.downcast_ref::<EquineError>().unwrap().is_validation());
    }
}
