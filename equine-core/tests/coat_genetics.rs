use equine_core::{
    BreedCatalog, BreedGeneticProfile, EquineError, Genotype, GenotypeResolver, Locus,
    PhenotypeEngine, RollSource,
};

fn genotype(entries: &[(&str, &str)]) -> Genotype {
    Genotype::from_notation(entries.iter().copied()).unwrap()
}

fn color(entries: &[(&str, &str)], age: f64) -> String {
    PhenotypeEngine::display_color(&genotype(entries), age).unwrap()
}

#[test]
fn base_color_dominance() {
    assert_eq!(color(&[("extension", "e/e"), ("agouti", "a/a")], 4.0), "Chestnut");
    assert_eq!(color(&[("extension", "E/e"), ("agouti", "A/a")], 4.0), "Bay");
    assert_eq!(color(&[("extension", "E/E"), ("agouti", "a/a")], 4.0), "Black");
}

#[test]
fn cream_dosage() {
    assert_eq!(color(&[("extension", "e/e"), ("cream", "Cr/n")], 4.0), "Palomino");
    assert_eq!(color(&[("extension", "e/e"), ("cream", "Cr/Cr")], 4.0), "Cremello");
}

#[test]
fn gray_stage_changes_with_age_but_keeps_base() {
    let gray_bay = [("extension", "E/e"), ("agouti", "A/a"), ("gray", "G/g")];
    let young = color(&gray_bay, 3.0);
    let older = color(&gray_bay, 8.0);
    assert_ne!(young, older);
    assert!(young.contains("Bay"), "{young}");
    assert!(older.contains("Bay"), "{older}");
}

#[test]
fn dominant_white_overrides_gray() {
    let white_gray = [("extension", "E/e"), ("dominant_white", "W/n"), ("gray", "G/g")];
    assert_eq!(color(&white_gray, 3.0), "White");
    assert_eq!(color(&white_gray, 15.0), "White");
}

#[test]
fn silver_is_invisible_on_chestnut() {
    assert_eq!(color(&[("extension", "e/e"), ("silver", "Z/Z")], 4.0), "Chestnut");
}

#[test]
fn zero_weight_allele_is_never_resolved() {
    let mut json: serde_json::Value = serde_json::from_str(include_str!(
        "../assets/data/breeds.json"
    ))
    .unwrap();
    let mut profile_json = json["breeds"][0].take();
    profile_json["alleleWeights"]["agouti"] = serde_json::json!({"A": 1, "a": 0});
    let profile = BreedGeneticProfile::from_json(&profile_json.to_string()).unwrap();

    let mut rng = RollSource::seeded(0xA11E1E);
    for _ in 0..1000 {
        let resolved = GenotypeResolver::resolve(&profile, &mut rng).unwrap();
        assert!(!resolved.carries(Locus::Agouti, "a"));
    }
}

#[test]
fn every_bundled_breed_generates_colorable_horses() {
    let catalog = BreedCatalog::default_catalog();
    let mut rng = RollSource::seeded(31);
    for profile in catalog {
        for age in [0.0, 3.0, 7.0, 12.0] {
            let resolved = GenotypeResolver::resolve(profile, &mut rng).unwrap();
            let phenotype = PhenotypeEngine::resolve(&resolved, profile, age, &mut rng).unwrap();
            assert!(!phenotype.final_display_color.is_empty());
            assert!(!phenotype.shade.is_empty());
            assert!(
                phenotype.markings.legs.marked_count()
                    <= usize::from(profile.marking_bias().max_legs_marked)
            );
        }
    }
}

#[test]
fn uncolorable_genotype_is_a_configuration_error() {
    let profile = BreedCatalog::default_catalog().get("arabian").unwrap();
    let err = PhenotypeEngine::resolve(
        &genotype(&[("gray", "G/g")]),
        profile,
        2.0,
        &mut RollSource::seeded(1),
    )
    .unwrap_err();
    assert_eq!(err, EquineError::MissingLocus(Locus::Extension));
    assert!(err.is_configuration());
}

#[test]
fn cross_never_invents_alleles() {
    let profile = BreedCatalog::default_catalog().get("quarter_horse").unwrap();
    let dam = genotype(&[("extension", "E/e"), ("cream", "Cr/n"), ("dun", "D/nd2")]);
    let sire = genotype(&[("extension", "e/e"), ("cream", "n/n"), ("dun", "nd1/nd1")]);
    let mut rng = RollSource::seeded(12);
    for _ in 0..500 {
        let foal = GenotypeResolver::cross(&dam, &sire, profile, &mut rng).unwrap();
        for (locus, pair) in foal.iter() {
            for allele in pair.alleles() {
                let symbol = allele.symbol();
                assert!(
                    dam.carries(locus, symbol) || sire.carries(locus, symbol),
                    "{locus}: {symbol} came from nowhere"
                );
            }
        }
        assert!(foal.carries(Locus::Extension, "e"));
    }
}
