//! Temperament drawn from a breed's weighted temperament table.
use log::debug;

use crate::breed::BreedGeneticProfile;
use crate::error::{EquineError, Result};
use crate::random::{RandomSource, weighted_pick};

/// Draws a temperament label from the breed's temperament weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemperamentResolver;

impl TemperamentResolver {
    /// # Errors
    ///
    /// Returns [`EquineError::MissingTemperamentTable`] when no temperament is selectable.
    pub fn resolve<R>(profile: &BreedGeneticProfile, rng: &mut R) -> Result<String>
    where
        R: RandomSource + ?Sized,
    {
        let table = profile.temperament_weights();
        let label = format!("{}.temperamentWeights", profile.id());
        let temperament = weighted_pick(
            &label,
            table.iter().map(|(name, weight)| (name.as_str(), *weight)),
            rng,
        )
        .map_err(|err| match err {
            EquineError::EmptyWeightTable { .. } => EquineError::MissingTemperamentTable {
                breed: profile.id().to_string(),
            },
            other => other,
        })?;
        debug!("{}: temperament {temperament}", profile.id());
        Ok(temperament.to_string())
    }
}
