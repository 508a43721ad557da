//! Genotype to visible coat: color rule table, shade, and markings.
pub mod color;
pub mod markings;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::breed::BreedGeneticProfile;
use crate::error::{EquineError, Result};
use crate::genotype::Genotype;
use crate::random::{RandomSource, weighted_pick};

pub use color::{BaseColor, COLOR_RULES, ColorRule};
pub use markings::{LEGS, Leg, LegMarkings, Markings, UNMARKED};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phenotype {
    pub final_display_color: String,
    pub shade: String,
    pub markings: Markings,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PhenotypeEngine;

impl PhenotypeEngine {
    /// Resolve the full phenotype.
    ///
    /// Draw order is fixed: shade, face, legs, then leopard-complex extras.
    ///
    /// # Errors
    ///
    /// Configuration errors for uncolorable genotypes or missing shade tables,
    /// validation errors for bad ages, and invariant errors for broken weight tables.
    pub fn resolve<R>(
        genotype: &Genotype,
        profile: &BreedGeneticProfile,
        age_years: f64,
        rng: &mut R,
    ) -> Result<Phenotype>
    where
        R: RandomSource + ?Sized,
    {
        let final_display_color = Self::display_color(genotype, age_years)?;

        let Some(shades) = profile.shade_table(&final_display_color) else {
            return Err(EquineError::MissingShadeBias {
                breed: profile.id().to_string(),
                color: final_display_color,
            });
        };
        let label = format!("{}.shadeBias.{final_display_color}", profile.id());
        let shade = weighted_pick(
            &label,
            shades.iter().map(|(name, weight)| (name.as_str(), *weight)),
            rng,
        )?
        .to_string();

        let markings =
            markings::resolve_markings(profile.id(), genotype, profile.marking_bias(), rng)?;

        debug!(
            "{}: phenotype {final_display_color} ({shade}), face {}",
            profile.id(),
            markings.face
        );
        Ok(Phenotype {
            final_display_color,
            shade,
            markings,
        })
    }

    /// Color name only; consumes no randomness.
    ///
    /// # Errors
    ///
    /// Rejects negative or non-finite ages and genotypes without extension.
    pub fn display_color(genotype: &Genotype, age_years: f64) -> Result<String> {
        color::resolve_color(genotype, age_years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breed::BreedCatalog;
    use crate::random::{RollSource, ScriptedSource};

    fn profile_json(shade_bias: &str, default_shade: &str) -> String {
        format!(
            r#"{{
                "id": "shady",
                "alleleWeights": {{"extension": {{"E": 1, "e": 1}}}},
                "shadeBias": {shade_bias},
                {default_shade}
                "markingBias": {{
                    "face": {{"none": 1}},
                    "legsGeneralProbability": 0.0,
                    "maxLegsMarked": 0
                }},
                "temperamentWeights": {{"calm": 1}},
                "ratingProfiles": {ratings}
            }}"#,
            ratings = crate::breed::tests::uniform_ratings_json()
        )
    }

    #[test]
    fn negative_or_nan_age_is_rejected() {
        let genotype = Genotype::from_notation([("extension", "E/e")]).unwrap();
        for age in [-1.0, f64::NAN, f64::INFINITY] {
            let err = PhenotypeEngine::display_color(&genotype, age).unwrap_err();
            assert!(err.is_validation(), "{age}: {err}");
        }
    }

    #[test]
    fn shade_prefers_color_table_then_default() {
        let profile = BreedGeneticProfile::from_json(&profile_json(
            r#"{"Chestnut": {"copper": 1}}"#,
            r#""defaultShadeBias": {"plain": 1},"#,
        ))
        .unwrap();
        let chestnut = Genotype::from_notation([("extension", "e/e")]).unwrap();
        let black = Genotype::from_notation([("extension", "E/E")]).unwrap();
        let mut rng = ScriptedSource::constant(0.5);
        let phenotype = PhenotypeEngine::resolve(&chestnut, &profile, 4.0, &mut rng).unwrap();
        assert_eq!(phenotype.shade, "copper");
        let phenotype = PhenotypeEngine::resolve(&black, &profile, 4.0, &mut rng).unwrap();
        assert_eq!(phenotype.shade, "plain");
    }

    #[test]
    fn missing_shade_tables_are_configuration_errors() {
        let profile =
            BreedGeneticProfile::from_json(&profile_json(r#"{"Chestnut": {"copper": 1}}"#, ""))
                .unwrap();
        let black = Genotype::from_notation([("extension", "E/E")]).unwrap();
        let err = PhenotypeEngine::resolve(&black, &profile, 4.0, &mut ScriptedSource::constant(0.5))
            .unwrap_err();
        assert_eq!(
            err,
            EquineError::MissingShadeBias {
                breed: "shady".into(),
                color: "Black".into()
            }
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn seeded_resolution_is_repeatable() {
        let profile = BreedCatalog::default_catalog().get("appaloosa").unwrap();
        let genotype = Genotype::from_notation([
            ("extension", "E/e"),
            ("agouti", "A/a"),
            ("leopard", "LP/lp"),
            ("pattern1", "PATN1/n"),
        ])
        .unwrap();
        let first =
            PhenotypeEngine::resolve(&genotype, profile, 6.0, &mut RollSource::seeded(21)).unwrap();
        let second =
            PhenotypeEngine::resolve(&genotype, profile, 6.0, &mut RollSource::seeded(21)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.final_display_color, "Bay Leopard");
        assert!(first.markings.mottling.is_some());
    }

    #[test]
    fn phenotype_json_uses_camel_case() {
        let profile = BreedCatalog::default_catalog().get("friesian").unwrap();
        let genotype = Genotype::from_notation([("extension", "E/E"), ("agouti", "a/a")]).unwrap();
        let phenotype =
            PhenotypeEngine::resolve(&genotype, profile, 3.0, &mut RollSource::seeded(1)).unwrap();
        let json = serde_json::to_value(&phenotype).unwrap();
        assert_eq!(json["finalDisplayColor"], "Black");
        assert!(json["markings"]["legs"].get("LF").is_some());
    }
}
