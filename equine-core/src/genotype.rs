//! Genotypes and the resolver that draws them from breed allele weights.
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::breed::{AlleleTable, BreedGeneticProfile};
use crate::error::{EquineError, Result};
use crate::locus::{Allele, AllelePair, Locus};
use crate::random::{RandomSource, weighted_pick};

/// Allele pairs keyed by locus. Loci absent from the map are "not applicable".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct Genotype {
    pairs: BTreeMap<Locus, AllelePair>,
}

impl Genotype {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pairs: BTreeMap::new(),
        }
    }

    /// Build a genotype from `("extension", "E/e")` style entries.
    ///
    /// # Errors
    ///
    /// Rejects unknown loci, unknown alleles, and malformed pairs.
    pub fn from_notation<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut genotype = Self::new();
        for (locus, pair) in entries {
            let locus: Locus = locus.parse()?;
            genotype.insert(AllelePair::parse(locus, pair)?);
        }
        Ok(genotype)
    }

    /// Insert or replace the pair for its locus.
    pub fn insert(&mut self, pair: AllelePair) -> Option<AllelePair> {
        self.pairs.insert(pair.locus(), pair)
    }

    #[must_use]
    pub fn get(&self, locus: Locus) -> Option<&AllelePair> {
        self.pairs.get(&locus)
    }

    #[must_use]
    pub fn contains(&self, locus: Locus) -> bool {
        self.pairs.contains_key(&locus)
    }

    /// Copies of `symbol` at `locus`; a missing locus carries nothing.
    #[must_use]
    pub fn dosage(&self, locus: Locus, symbol: &str) -> u8 {
        self.pairs.get(&locus).map_or(0, |pair| pair.dosage(symbol))
    }

    #[must_use]
    pub fn carries(&self, locus: Locus, symbol: &str) -> bool {
        self.dosage(locus, symbol) > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Locus, &AllelePair)> {
        self.pairs.iter().map(|(locus, pair)| (*locus, pair))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (locus, pair) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{locus}:{pair}")?;
        }
        Ok(())
    }
}

impl FromIterator<AllelePair> for Genotype {
    fn from_iter<T: IntoIterator<Item = AllelePair>>(iter: T) -> Self {
        let mut genotype = Self::new();
        for pair in iter {
            genotype.insert(pair);
        }
        genotype
    }
}

impl TryFrom<BTreeMap<String, String>> for Genotype {
    type Error = EquineError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self> {
        Self::from_notation(raw.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

impl From<Genotype> for BTreeMap<String, String> {
    fn from(genotype: Genotype) -> Self {
        genotype
            .pairs
            .into_iter()
            .map(|(locus, pair)| (locus.id().to_string(), pair.to_string()))
            .collect()
    }
}

/// Draws genotypes from breed allele weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenotypeResolver;

impl GenotypeResolver {
    /// Two independent weighted draws per locus defined by the profile.
    ///
    /// # Errors
    ///
    /// Fails when a locus table is empty or entirely zero-weighted.
    pub fn resolve<R>(profile: &BreedGeneticProfile, rng: &mut R) -> Result<Genotype>
    where
        R: RandomSource + ?Sized,
    {
        let mut genotype = Genotype::new();
        for (locus, table) in profile.allele_weights() {
            let a = draw_allele(profile, *locus, table, rng)?;
            let b = draw_allele(profile, *locus, table, rng)?;
            let pair = AllelePair::new(a, b)?;
            trace!("{}: {locus} resolved to {pair}", profile.id());
            genotype.insert(pair);
        }
        debug!("{}: resolved genotype {genotype}", profile.id());
        Ok(genotype)
    }

    /// Mendelian cross: each parent passes one of its two alleles per locus.
    ///
    /// A parent lacking a locus contributes a copy drawn from the breed weights
    /// instead; when neither parent nor the breed defines the locus it is omitted.
    ///
    /// # Errors
    ///
    /// Propagates weight-table failures from the breed fallback draw.
    pub fn cross<R>(
        dam: &Genotype,
        sire: &Genotype,
        profile: &BreedGeneticProfile,
        rng: &mut R,
    ) -> Result<Genotype>
    where
        R: RandomSource + ?Sized,
    {
        let mut loci: Vec<Locus> = dam.pairs.keys().chain(sire.pairs.keys()).copied().collect();
        loci.sort_unstable();
        loci.dedup();

        let mut foal = Genotype::new();
        for locus in loci {
            let Some(from_dam) = gamete(dam, locus, profile, rng)? else {
                continue;
            };
            let Some(from_sire) = gamete(sire, locus, profile, rng)? else {
                continue;
            };
            foal.insert(AllelePair::new(from_dam, from_sire)?);
        }
        debug!("{}: crossed foal genotype {foal}", profile.id());
        Ok(foal)
    }
}

fn draw_allele<R>(
    profile: &BreedGeneticProfile,
    locus: Locus,
    table: &AlleleTable,
    rng: &mut R,
) -> Result<Allele>
where
    R: RandomSource + ?Sized,
{
    let label = format!("{}.alleleWeights.{locus}", profile.id());
    weighted_pick(&label, table.iter(), rng)
}

fn gamete<R>(
    parent: &Genotype,
    locus: Locus,
    profile: &BreedGeneticProfile,
    rng: &mut R,
) -> Result<Option<Allele>>
where
    R: RandomSource + ?Sized,
{
    if let Some(pair) = parent.get(locus) {
        let [first, second] = pair.alleles();
        return Ok(Some(if rng.chance(0.5) { first } else { second }));
    }
    match profile.allele_weights().get(&locus) {
        Some(table) => draw_allele(profile, locus, table, rng).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breed::BreedCatalog;
    use crate::random::{RollSource, ScriptedSource};

    fn profile_with_weights(weights: &str) -> BreedGeneticProfile {
        let json = format!(
            r#"{{
                "id": "test",
                "name": "Test",
                "alleleWeights": {weights},
                "defaultShadeBias": {{"standard": 1}},
                "markingBias": {{
                    "face": {{"none": 1}},
                    "legsGeneralProbability": 0.2,
                    "maxLegsMarked": 2,
                    "legSpecificProbabilities": {{"sock": 1}}
                }},
                "temperamentWeights": {{"calm": 1}},
                "ratingProfiles": {ratings}
            }}"#,
            ratings = crate::breed::tests::uniform_ratings_json()
        );
        BreedGeneticProfile::from_json(&json).unwrap()
    }

    #[test]
    fn zero_weight_allele_is_never_drawn() {
        let profile = profile_with_weights(r#"{"agouti": {"A": 1, "a": 0}}"#);
        let mut rng = RollSource::seeded(99);
        for _ in 0..1000 {
            let genotype = GenotypeResolver::resolve(&profile, &mut rng).unwrap();
            let pair = genotype.get(Locus::Agouti).unwrap();
            assert!(!pair.carries("a"), "drew zero-weight allele: {pair}");
        }
    }

    #[test]
    fn absent_loci_are_omitted() {
        let profile = profile_with_weights(r#"{"extension": {"E": 1, "e": 1}}"#);
        let genotype =
            GenotypeResolver::resolve(&profile, &mut ScriptedSource::new([0.1, 0.9])).unwrap();
        assert_eq!(genotype.len(), 1);
        assert_eq!(genotype.get(Locus::Extension).unwrap().to_string(), "E/e");
        assert!(!genotype.contains(Locus::Cream));
    }

    #[test]
    fn genotype_serializes_as_notation_map() {
        let genotype =
            Genotype::from_notation([("extension", "e/E"), ("cream", "n/Cr")]).unwrap();
        let json = serde_json::to_string(&genotype).unwrap();
        assert_eq!(json, r#"{"cream":"Cr/n","extension":"E/e"}"#);
        let parsed: Genotype = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, genotype);
        assert!(serde_json::from_str::<Genotype>(r#"{"extension":"E/Z"}"#).is_err());
    }

    #[test]
    fn cross_only_passes_parental_alleles() {
        let catalog = BreedCatalog::default_catalog();
        let profile = catalog.get("thoroughbred").unwrap();
        let dam = Genotype::from_notation([("extension", "E/E"), ("gray", "g/g")]).unwrap();
        let sire = Genotype::from_notation([("extension", "e/e"), ("gray", "G/G")]).unwrap();
        let mut rng = RollSource::seeded(5);
        for _ in 0..50 {
            let foal = GenotypeResolver::cross(&dam, &sire, profile, &mut rng).unwrap();
            assert_eq!(foal.get(Locus::Extension).unwrap().to_string(), "E/e");
            assert_eq!(foal.get(Locus::Gray).unwrap().to_string(), "G/g");
        }
    }

    #[test]
    fn cross_fills_missing_parent_locus_from_breed() {
        let profile = profile_with_weights(r#"{"cream": {"Cr": 0, "n": 1}}"#);
        let dam = Genotype::from_notation([("cream", "Cr/Cr")]).unwrap();
        let sire = Genotype::new();
        let foal =
            GenotypeResolver::cross(&dam, &sire, &profile, &mut ScriptedSource::constant(0.3))
                .unwrap();
        assert_eq!(foal.get(Locus::Cream).unwrap().to_string(), "Cr/n");
    }

    #[test]
    fn cross_omits_loci_nobody_defines() {
        let profile = profile_with_weights(r#"{"cream": {"Cr": 1, "n": 1}}"#);
        let dam = Genotype::from_notation([("roan", "Rn/rn")]).unwrap();
        let foal = GenotypeResolver::cross(
            &dam,
            &Genotype::new(),
            &profile,
            &mut ScriptedSource::constant(0.1),
        )
        .unwrap();
        assert!(foal.is_empty());
    }
}
