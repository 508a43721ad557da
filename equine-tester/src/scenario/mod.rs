//! Property scenarios run by the tester.
//!
//! Each scenario is a pure check that takes a seed and either passes or
//! reports what went wrong. Scenarios never share RNG state.

use anyhow::{Context, Result, ensure};
use equine_core::traits::catalog::are_opposites;
use equine_core::{
    ALL_DISCIPLINES, ALL_STATS, BreedCatalog, BreedGeneticProfile, CompetitionEntry,
    CompetitionScorer, DiscoveryContext, FoalRequest, Genotype, GenotypeResolver,
    InheritanceRequest, Locus, ParentRecord, PhenotypeEngine, RollSource, SeedStreams, StatBlock,
    StreamDomain, StudBook, TraitInheritanceEngine, TraitSet,
};
use serde_json::{Map, Value, json};

/// Sub-seeds sampled per iteration by the statistical scenarios.
const TRIALS: u64 = 100;

/// Shared, read-only state handed to every scenario check.
pub struct ScenarioCtx {
    pub studbook: StudBook<&'static BreedCatalog>,
    pub verbose: bool,
}

impl ScenarioCtx {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            studbook: StudBook::new(BreedCatalog::default_catalog()),
            verbose,
        }
    }

    fn catalog(&self) -> &'static BreedCatalog {
        *self.studbook.loader()
    }
}

pub type ScenarioCheck = fn(&ScenarioCtx, u64) -> Result<()>;

pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub check: ScenarioCheck,
}

const SCENARIOS: &[TestScenario] = &[
    TestScenario {
        key: "smoke",
        name: "Smoke",
        description: "Generate one horse of every bundled breed",
        check: smoke,
    },
    TestScenario {
        key: "deterministic-generation",
        name: "Deterministic Generation",
        description: "Same seed replays horses and trait sets exactly",
        check: deterministic_generation,
    },
    TestScenario {
        key: "trait-exclusion",
        name: "Trait Exclusion",
        description: "Inherited traits are unique and never beside their opposite",
        check: trait_exclusion,
    },
    TestScenario {
        key: "bond-stress-response",
        name: "Bond and Stress Response",
        description: "Higher bond favours positive traits, higher stress negative ones",
        check: bond_stress_response,
    },
    TestScenario {
        key: "coat-genetics",
        name: "Coat Genetics",
        description: "Dominance, cream dosage, and silver on chestnut",
        check: coat_genetics,
    },
    TestScenario {
        key: "gray-progression",
        name: "Gray Progression",
        description: "Gray stage follows age, dominant white overrides gray",
        check: gray_progression,
    },
    TestScenario {
        key: "zero-weight-allele",
        name: "Zero Weight Allele",
        description: "An allele weighted zero is never resolved",
        check: zero_weight_allele,
    },
    TestScenario {
        key: "foal-crossing",
        name: "Foal Crossing",
        description: "Foals only carry parental alleles and replay by seed",
        check: foal_crossing,
    },
    TestScenario {
        key: "trait-discovery",
        name: "Trait Discovery",
        description: "Discovery moves hidden traits without losing any",
        check: trait_discovery,
    },
    TestScenario {
        key: "show-scoring",
        name: "Show Scoring",
        description: "Luck stays within its spread and rankings are ordered",
        check: show_scoring,
    },
];

#[must_use]
pub fn get_scenario(name: &str) -> Option<&'static TestScenario> {
    let key = name.to_lowercase();
    SCENARIOS.iter().find(|scenario| scenario.key == key)
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

#[must_use]
pub fn scenario_keys() -> Vec<&'static str> {
    SCENARIOS.iter().map(|scenario| scenario.key).collect()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| (*name).to_string()).collect()
}

fn genotype(entries: &[(&str, &str)]) -> Result<Genotype> {
    Genotype::from_notation(entries.iter().copied()).context("building fixture genotype")
}

fn smoke(ctx: &ScenarioCtx, seed: u64) -> Result<()> {
    ensure!(!ctx.catalog().is_empty(), "bundled breed catalog is empty");
    for profile in ctx.catalog() {
        let horse = ctx
            .studbook
            .generate_horse(profile.id(), 4.0, seed)
            .with_context(|| format!("generating {}", profile.id()))?;
        ensure!(
            !horse.phenotype.final_display_color.is_empty(),
            "{} has no display color",
            profile.id()
        );
        ensure!(!horse.phenotype.shade.is_empty(), "{} has no shade", profile.id());
        let marked = horse.phenotype.markings.legs.marked_count();
        let cap = usize::from(profile.marking_bias().max_legs_marked);
        ensure!(
            marked <= cap,
            "{} marked {marked} legs, cap is {cap}",
            profile.id()
        );
        if ctx.verbose {
            log::info!(
                "{} seed {seed}: {} / {}",
                profile.id(),
                horse.phenotype.final_display_color,
                horse.temperament
            );
        }
    }
    Ok(())
}

fn deterministic_generation(ctx: &ScenarioCtx, seed: u64) -> Result<()> {
    for profile in ctx.catalog() {
        let first = ctx.studbook.generate_horse(profile.id(), 6.0, seed)?;
        let second = ctx.studbook.generate_horse(profile.id(), 6.0, seed)?;
        ensure!(first == second, "{} did not replay for seed {seed}", profile.id());
    }

    let request = InheritanceRequest::new(
        names(&["calm", "bold", "eager_learner"]),
        names(&["nervous", "resilient", "stubborn"]),
        60.0,
        40.0,
    )
    .with_seed(seed);
    let first = serde_json::to_string(&TraitInheritanceEngine::calculate(&request)?)?;
    let unseeded = InheritanceRequest::new(
        request.dam_traits.clone(),
        request.sire_traits.clone(),
        60.0,
        40.0,
    );
    TraitInheritanceEngine::calculate(&unseeded)?;
    let second = serde_json::to_string(&TraitInheritanceEngine::calculate(&request)?)?;
    ensure!(first == second, "seeded trait output changed: {first} vs {second}");
    Ok(())
}

fn check_trait_set(traits: &TraitSet) -> Result<()> {
    let all: Vec<&str> = traits.iter().collect();
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            ensure!(a != b, "{a} selected twice");
            ensure!(!are_opposites(a, b), "{a} and {b} both selected");
        }
    }
    Ok(())
}

fn trait_exclusion(_ctx: &ScenarioCtx, seed: u64) -> Result<()> {
    let dam = names(&["calm", "bold", "confident", "trusting", "people_trusting"]);
    let sire = names(&["nervous", "fearful", "insecure", "anxious", "aggressive"]);
    for offset in 0..TRIALS {
        let request = InheritanceRequest::new(dam.clone(), sire.clone(), 50.0, 60.0)
            .with_seed(seed.wrapping_add(offset));
        let traits = TraitInheritanceEngine::calculate(&request)?;
        check_trait_set(&traits)?;
    }
    Ok(())
}

fn bond_stress_response(_ctx: &ScenarioCtx, seed: u64) -> Result<()> {
    let positive_parents = (names(&["calm", "bold", "confident"]), names(&["resilient"]));
    let negative_parents = (names(&["nervous", "lazy", "stubborn"]), names(&["fragile"]));

    let tally = |parents: &(Vec<String>, Vec<String>),
                 bond: f64,
                 stress: f64,
                 positive: bool|
     -> Result<usize> {
        let mut total = 0;
        for offset in 0..TRIALS {
            let request =
                InheritanceRequest::new(parents.0.clone(), parents.1.clone(), bond, stress)
                    .with_seed(seed.wrapping_add(offset));
            let traits = TraitInheritanceEngine::calculate(&request)?;
            total += if positive {
                traits.positive.len()
            } else {
                traits.negative.len()
            };
        }
        Ok(total)
    };

    let high_bond = tally(&positive_parents, 95.0, 50.0, true)?;
    let low_bond = tally(&positive_parents, 15.0, 50.0, true)?;
    ensure!(
        high_bond >= low_bond,
        "bond 95 gave {high_bond} positive traits, bond 15 gave {low_bond}"
    );

    let high_stress = tally(&negative_parents, 50.0, 90.0, false)?;
    let low_stress = tally(&negative_parents, 50.0, 10.0, false)?;
    ensure!(
        high_stress >= low_stress,
        "stress 90 gave {high_stress} negative traits, stress 10 gave {low_stress}"
    );
    Ok(())
}

fn coat_genetics(_ctx: &ScenarioCtx, _seed: u64) -> Result<()> {
    let cases: &[(&[(&str, &str)], &str)] = &[
        (&[("extension", "e/e"), ("agouti", "a/a")], "Chestnut"),
        (&[("extension", "E/e"), ("agouti", "A/a")], "Bay"),
        (&[("extension", "E/E"), ("agouti", "a/a")], "Black"),
        (&[("extension", "e/e"), ("cream", "Cr/n")], "Palomino"),
        (&[("extension", "e/e"), ("cream", "Cr/Cr")], "Cremello"),
        (&[("extension", "e/e"), ("silver", "Z/Z")], "Chestnut"),
    ];
    for (entries, expected) in cases {
        let color = PhenotypeEngine::display_color(&genotype(entries)?, 4.0)?;
        ensure!(color == *expected, "{entries:?} resolved to {color}, expected {expected}");
    }
    Ok(())
}

fn gray_progression(_ctx: &ScenarioCtx, _seed: u64) -> Result<()> {
    let gray_bay = genotype(&[("extension", "E/e"), ("agouti", "A/a"), ("gray", "G/g")])?;
    let young = PhenotypeEngine::display_color(&gray_bay, 3.0)?;
    let older = PhenotypeEngine::display_color(&gray_bay, 8.0)?;
    ensure!(young != older, "gray stage did not advance: {young}");
    ensure!(
        young.contains("Bay") && older.contains("Bay"),
        "gray lost its base color: {young} / {older}"
    );

    let white_gray = genotype(&[
        ("extension", "E/e"),
        ("dominant_white", "W/n"),
        ("gray", "G/g"),
    ])?;
    for age in [1.0, 3.0, 15.0] {
        let color = PhenotypeEngine::display_color(&white_gray, age)?;
        ensure!(color == "White", "dominant white at age {age} showed {color}");
    }
    Ok(())
}

fn agouti_only_profile() -> Result<BreedGeneticProfile> {
    let ratings: Map<String, Value> = ALL_STATS
        .iter()
        .map(|stat| (stat.id().to_string(), json!({"mean": 50, "stdDev": 10})))
        .collect();
    let profile = json!({
        "id": "fixture",
        "alleleWeights": {
            "extension": {"E": 1, "e": 1},
            "agouti": {"A": 1, "a": 0}
        },
        "defaultShadeBias": {"standard": 1},
        "markingBias": {"face": {"none": 1}, "legsGeneralProbability": 0, "maxLegsMarked": 0},
        "temperamentWeights": {"calm": 1},
        "ratingProfiles": ratings
    });
    BreedGeneticProfile::from_json(&profile.to_string()).context("parsing fixture profile")
}

fn zero_weight_allele(_ctx: &ScenarioCtx, seed: u64) -> Result<()> {
    let profile = agouti_only_profile()?;
    let mut rng = RollSource::seeded(seed);
    for _ in 0..TRIALS {
        let resolved = GenotypeResolver::resolve(&profile, &mut rng)?;
        ensure!(
            !resolved.carries(Locus::Agouti, "a"),
            "zero-weight allele resolved: {resolved:?}"
        );
    }
    Ok(())
}

fn foal_crossing(ctx: &ScenarioCtx, seed: u64) -> Result<()> {
    for profile in ctx.catalog() {
        let dam = ctx.studbook.generate_horse(profile.id(), 8.0, seed)?;
        let sire = ctx
            .studbook
            .generate_horse(profile.id(), 9.0, seed.wrapping_add(1))?;
        let request = FoalRequest {
            breed: profile.id().to_string(),
            dam: ParentRecord {
                genotype: dam.genotype.clone(),
                traits: names(&["calm", "athletic"]),
            },
            sire: ParentRecord {
                genotype: sire.genotype.clone(),
                traits: names(&["nervous", "stubborn"]),
            },
            dam_bond_score: 70.0,
            dam_stress_level: 30.0,
            seed,
        };
        let foal = ctx.studbook.breed_foal(&request)?;
        for (locus, pair) in foal.genotype.iter() {
            for allele in pair.alleles() {
                let symbol = allele.symbol();
                ensure!(
                    dam.genotype.carries(locus, symbol) || sire.genotype.carries(locus, symbol),
                    "{}: foal {locus} allele {symbol} came from neither parent",
                    profile.id()
                );
            }
        }
        check_trait_set(&foal.traits)?;
        let replay = ctx.studbook.breed_foal(&request)?;
        ensure!(replay == foal, "{} foal did not replay", profile.id());
    }
    Ok(())
}

fn trait_discovery(_ctx: &ScenarioCtx, seed: u64) -> Result<()> {
    let request = InheritanceRequest::new(
        names(&["calm", "athletic", "intelligent"]),
        names(&["bold", "lazy"]),
        80.0,
        20.0,
    )
    .with_seed(seed);
    let traits = TraitInheritanceEngine::calculate(&request)?;
    let mut rng = SeedStreams::from_user_seed(seed).stream(StreamDomain::Discovery);
    let outcome = TraitInheritanceEngine::discover(
        &traits,
        DiscoveryContext {
            bond_score: 90.0,
            age_years: 3.0,
        },
        &mut rng,
    )?;
    ensure!(
        outcome.traits.len() == traits.len(),
        "discovery changed trait count from {} to {}",
        traits.len(),
        outcome.traits.len()
    );
    for name in &outcome.revealed {
        ensure!(traits.hidden.contains(name), "{name} was revealed but never hidden");
        ensure!(!outcome.traits.hidden.contains(name), "{name} is still hidden");
    }
    Ok(())
}

fn show_scoring(_ctx: &ScenarioCtx, seed: u64) -> Result<()> {
    let mut rng = SeedStreams::from_user_seed(seed).stream(StreamDomain::Competition);
    let entries: Vec<CompetitionEntry> = [40u8, 60, 80]
        .into_iter()
        .map(|level| CompetitionEntry {
            name: format!("entry-{level}"),
            stats: StatBlock::uniform(level),
            ..CompetitionEntry::default()
        })
        .collect();

    for discipline in ALL_DISCIPLINES {
        for entry in &entries {
            let expected = CompetitionScorer::expected_score(entry, discipline);
            let score = f64::from(CompetitionScorer::score(entry, discipline, &mut rng));
            let spread = expected * 0.09 + 0.5;
            ensure!(
                (score - expected).abs() <= spread,
                "{discipline}: {} scored {score}, expected {expected:.2} +/- {spread:.2}",
                entry.name
            );
        }
        let placements = CompetitionScorer::rank_entries(&entries, discipline, &mut rng);
        ensure!(placements.len() == entries.len(), "{discipline}: entries lost in ranking");
        for pair in placements.windows(2) {
            ensure!(
                pair[0].score >= pair[1].score,
                "{discipline}: ranking out of order"
            );
        }
    }
    Ok(())
}
