use equine_core::{
    BreedCatalog, CompetitionEntry, CompetitionScorer, Discipline, GenotypeResolver, Locus,
    PhenotypeEngine, RatingGenerator, RollSource, Stat, StatBlock, TemperamentResolver,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::convert::TryFrom;

const SAMPLE_SIZE: usize = 5000;
const TOLERANCE: f64 = 0.025;

fn rate(count: usize, total: usize) -> f64 {
    let count = f64::from(u32::try_from(count).expect("count fits"));
    let total = f64::from(u32::try_from(total).expect("total fits"));
    count / total
}

#[test]
fn allele_frequency_tracks_breed_weights() {
    let profile = BreedCatalog::default_catalog().get("arabian").unwrap();
    let mut rng = RollSource::new(SmallRng::seed_from_u64(0xACED));
    let mut gray_alleles = 0usize;
    for _ in 0..SAMPLE_SIZE {
        let genotype = GenotypeResolver::resolve(profile, &mut rng).unwrap();
        gray_alleles += usize::from(genotype.dosage(Locus::Gray, "G"));
    }
    let observed = rate(gray_alleles, SAMPLE_SIZE * 2);
    assert!(
        (observed - 0.35).abs() <= TOLERANCE,
        "gray allele frequency drifted: observed {observed:.4}"
    );
}

#[test]
fn temperament_distribution_matches_weights() {
    let profile = BreedCatalog::default_catalog().get("quarter_horse").unwrap();
    let mut rng = RollSource::new(SmallRng::seed_from_u64(0xBEEF));
    let mut calm = 0usize;
    for _ in 0..SAMPLE_SIZE {
        if TemperamentResolver::resolve(profile, &mut rng).unwrap() == "calm" {
            calm += 1;
        }
    }
    let observed = rate(calm, SAMPLE_SIZE);
    assert!((observed - 0.40).abs() <= TOLERANCE, "calm rate {observed:.4}");
}

#[test]
fn ratings_center_on_profile_mean() {
    let profile = BreedCatalog::default_catalog().get("thoroughbred").unwrap();
    let mean = profile.rating_profile(Stat::Speed).unwrap().mean;
    let mut rng = RollSource::new(SmallRng::seed_from_u64(0x5EED));
    let mut total = 0usize;
    for _ in 0..SAMPLE_SIZE {
        total += usize::from(RatingGenerator::generate(profile, &mut rng).unwrap().speed);
    }
    let observed = rate(total, SAMPLE_SIZE);
    assert!((observed - mean).abs() <= 1.0, "speed mean {observed:.2} vs {mean}");
}

#[test]
fn first_leg_marking_rate_tracks_general_probability() {
    let profile = BreedCatalog::default_catalog().get("thoroughbred").unwrap();
    let expected = profile.marking_bias().legs_general_probability;
    let genotype = equine_core::Genotype::from_notation([("extension", "E/e")]).unwrap();
    let mut rng = RollSource::new(SmallRng::seed_from_u64(0xF00D));
    let mut marked = 0usize;
    for _ in 0..SAMPLE_SIZE {
        let phenotype = PhenotypeEngine::resolve(&genotype, profile, 4.0, &mut rng).unwrap();
        if phenotype.markings.legs.left_fore != "none" {
            marked += 1;
        }
    }
    let observed = rate(marked, SAMPLE_SIZE);
    assert!((observed - expected).abs() <= TOLERANCE, "LF rate {observed:.4}");
}

#[test]
fn luck_is_centered() {
    let entry = CompetitionEntry {
        stats: StatBlock::uniform(60),
        ..CompetitionEntry::default()
    };
    let expected = CompetitionScorer::expected_score(&entry, Discipline::Endurance);
    let mut rng = RollSource::new(SmallRng::seed_from_u64(0x1CE));
    let mut total = 0i64;
    for _ in 0..SAMPLE_SIZE {
        total += i64::from(CompetitionScorer::score(&entry, Discipline::Endurance, &mut rng));
    }
    let samples = f64::from(u32::try_from(SAMPLE_SIZE).expect("sample size fits"));
    let observed = f64::from(i32::try_from(total).expect("total fits")) / samples;
    assert!((observed - expected).abs() <= 0.5, "mean score {observed:.2} vs {expected:.2}");
}
