use std::hash::Hasher;

use equine_core::{
    BreedCatalog, CompetitionEntry, FoalRequest, Genotype, InheritanceRequest, StudBook,
    TraitEffectRegistry, TraitInheritanceEngine, TraitSet,
};
use serde_json::{Value, json};
use twox_hash::XxHash64;

fn digest(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

#[test]
fn generated_horse_json_shape() {
    let studbook = StudBook::new(BreedCatalog::default_catalog());
    let horse = studbook.generate_horse("appaloosa", 5.0, 0xC0FFEE).unwrap();
    let value = serde_json::to_value(&horse).unwrap();

    for key in ["breed", "seed", "ageYears", "genotype", "phenotype", "temperament", "stats"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    let phenotype = &value["phenotype"];
    assert!(phenotype["finalDisplayColor"].is_string());
    assert!(phenotype["shade"].is_string());
    for leg in ["LF", "RF", "LH", "RH"] {
        assert!(phenotype["markings"]["legs"][leg].is_string(), "leg {leg}");
    }
    let genotype = value["genotype"].as_object().unwrap();
    for pair in genotype.values() {
        assert!(pair.as_str().unwrap().contains('/'));
    }
    assert!(value["stats"]["speed"].is_u64());
}

#[test]
fn generated_horse_round_trips_through_json() {
    let studbook = StudBook::new(BreedCatalog::default_catalog());
    let horse = studbook.generate_horse("quarter_horse", 2.5, 4).unwrap();
    let text = serde_json::to_string(&horse).unwrap();
    let parsed: equine_core::GeneratedHorse = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, horse);
}

#[test]
fn seeded_trait_output_is_byte_identical() {
    let request = InheritanceRequest::new(
        vec!["calm".into(), "eager_learner".into()],
        vec!["bold".into(), "stubborn".into()],
        72.0,
        28.0,
    )
    .with_seed(0xFACE_B00C);
    let first = serde_json::to_string(&TraitInheritanceEngine::calculate(&request).unwrap())
        .unwrap();
    let second = serde_json::to_string(&TraitInheritanceEngine::calculate(&request).unwrap())
        .unwrap();
    assert_eq!(digest(first.as_bytes()), digest(second.as_bytes()));
}

#[test]
fn foal_request_parses_from_camel_case() {
    let value = json!({
        "breed": "friesian",
        "dam": {"genotype": {"extension": "E/E", "agouti": "a/a"}, "traits": ["calm"]},
        "sire": {"genotype": {"extension": "E/e", "agouti": "a/a"}},
        "damBondScore": 80,
        "damStressLevel": 15,
        "seed": 9
    });
    let request: FoalRequest = serde_json::from_value(value).unwrap();
    assert!(request.sire.traits.is_empty());
    let foal = StudBook::new(BreedCatalog::default_catalog())
        .breed_foal(&request)
        .unwrap();
    // The dam is E/E, so the foal always carries black pigment.
    assert_eq!(foal.phenotype.final_display_color, "Black");
    let shape = serde_json::to_value(&foal).unwrap();
    assert!(shape["traits"]["hidden"].is_array());
}

#[test]
fn invalid_genotype_json_is_rejected() {
    for bad in [
        json!({"extension": "E/X"}),
        json!({"spots": "S/s"}),
        json!({"cream": "Cr"}),
    ] {
        assert!(serde_json::from_value::<Genotype>(bad.clone()).is_err(), "{bad}");
    }
}

#[test]
fn competition_entry_defaults_missing_fields() {
    let entry: CompetitionEntry = serde_json::from_value(json!({
        "name": "Comet",
        "stats": {
            "speed": 70, "stamina": 60, "agility": 55, "balance": 50, "precision": 45,
            "intelligence": 65, "boldness": 60, "flexibility": 40, "obedience": 50, "focus": 55
        }
    }))
    .unwrap();
    assert!(entry.trait_effects.is_none());
    assert!(entry.traits.is_empty());
}

#[test]
fn trait_set_shape_is_three_arrays() {
    let value: Value = serde_json::to_value(TraitSet::default()).unwrap();
    assert_eq!(value, json!({"positive": [], "negative": [], "hidden": []}));
}

#[test]
fn bundled_effects_cover_every_environment_and_rare_trait() {
    let registry = TraitEffectRegistry::default_registry();
    for environment in equine_core::traits::catalog::ENVIRONMENT_TRAITS {
        assert!(registry.effects_of(environment.id).is_some(), "{}", environment.id);
    }
    for rare in equine_core::traits::catalog::RARE_TRAITS {
        assert!(registry.effects_of(rare.id).is_some(), "{}", rare.id);
    }
}
