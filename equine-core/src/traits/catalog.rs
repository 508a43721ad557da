//! Fixed trait catalogs: definitions, opposing pairs, environment-driven
//! traits, and the rare catalog.
use crate::competition::Discipline;
use crate::numbers::unit_clamp;

pub const DISCIPLINE_AFFINITY_PREFIX: &str = "discipline_affinity_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitCategory {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraitDefinition {
    pub id: &'static str,
    pub category: TraitCategory,
}

const fn positive(id: &'static str) -> TraitDefinition {
    TraitDefinition {
        id,
        category: TraitCategory::Positive,
    }
}

const fn negative(id: &'static str) -> TraitDefinition {
    TraitDefinition {
        id,
        category: TraitCategory::Negative,
    }
}

pub const TRAIT_DEFINITIONS: &[TraitDefinition] = &[
    positive("calm"),
    positive("bold"),
    positive("confident"),
    positive("trusting"),
    positive("resilient"),
    positive("eager_learner"),
    positive("people_trusting"),
    positive("athletic"),
    positive("intelligent"),
    positive("legendary_bloodline"),
    positive("extreme_resilience"),
    negative("nervous"),
    negative("fearful"),
    negative("insecure"),
    negative("anxious"),
    negative("fragile"),
    negative("lazy"),
    negative("aggressive"),
    negative("stubborn"),
    negative("burnout"),
];

pub const OPPOSITE_PAIRS: &[(&str, &str)] = &[
    ("calm", "nervous"),
    ("bold", "nervous"),
    ("bold", "fearful"),
    ("confident", "insecure"),
    ("trusting", "anxious"),
    ("resilient", "fragile"),
    ("eager_learner", "lazy"),
    ("calm", "aggressive"),
    ("people_trusting", "fearful"),
    ("extreme_resilience", "burnout"),
];

/// Category of a known trait. `discipline_affinity_<id>` is positive for every
/// known discipline; anything else outside the catalog is unknown.
#[must_use]
pub fn category_of(name: &str) -> Option<TraitCategory> {
    if let Some(discipline) = name.strip_prefix(DISCIPLINE_AFFINITY_PREFIX) {
        return discipline
            .parse::<Discipline>()
            .ok()
            .map(|_| TraitCategory::Positive);
    }
    TRAIT_DEFINITIONS
        .iter()
        .find(|definition| definition.id == name)
        .map(|definition| definition.category)
}

#[must_use]
pub fn are_opposites(a: &str, b: &str) -> bool {
    OPPOSITE_PAIRS
        .iter()
        .any(|(left, right)| (*left == a && *right == b) || (*left == b && *right == a))
}

pub fn opposites_of(name: &str) -> impl Iterator<Item = &'static str> + '_ {
    OPPOSITE_PAIRS.iter().filter_map(move |(left, right)| {
        if *left == name {
            Some(*right)
        } else if *right == name {
            Some(*left)
        } else {
            None
        }
    })
}

/// Trait that depends only on the dam's bond and stress, never on the parents.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentTrait {
    pub id: &'static str,
    pub category: TraitCategory,
    pub chance: fn(f64, f64) -> f64,
}

pub const ENVIRONMENT_TRAITS: &[EnvironmentTrait] = &[
    EnvironmentTrait {
        id: "trusting",
        category: TraitCategory::Positive,
        chance: |bond, _| 0.25 * unit_clamp((bond - 50.0) / 50.0),
    },
    EnvironmentTrait {
        id: "confident",
        category: TraitCategory::Positive,
        chance: |bond, stress| 0.15 * unit_clamp((bond - 40.0) / 60.0) * (1.0 - stress / 100.0),
    },
    EnvironmentTrait {
        id: "anxious",
        category: TraitCategory::Negative,
        chance: |_, stress| 0.25 * unit_clamp((stress - 50.0) / 50.0),
    },
    EnvironmentTrait {
        id: "insecure",
        category: TraitCategory::Negative,
        chance: |bond, stress| 0.20 * unit_clamp((stress - 40.0) / 60.0) * (1.0 - bond / 100.0),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RareKind {
    Favorable,
    Adverse,
}

#[derive(Debug, Clone, Copy)]
pub struct RareTrait {
    pub id: &'static str,
    pub kind: RareKind,
}

pub const RARE_TRAITS: &[RareTrait] = &[
    RareTrait {
        id: "legendary_bloodline",
        kind: RareKind::Favorable,
    },
    RareTrait {
        id: "extreme_resilience",
        kind: RareKind::Favorable,
    },
    RareTrait {
        id: "burnout",
        kind: RareKind::Adverse,
    },
];

pub const RARE_BASE_CHANCE: f64 = 0.02;
const IDEAL_BOND: f64 = 80.0;
const IDEAL_STRESS: f64 = 20.0;
const IDEAL_MULTIPLIER: f64 = 2.5;

impl RareTrait {
    #[must_use]
    pub fn chance(&self, bond: f64, stress: f64) -> f64 {
        match self.kind {
            RareKind::Favorable if bond >= IDEAL_BOND && stress <= IDEAL_STRESS => {
                RARE_BASE_CHANCE * IDEAL_MULTIPLIER
            }
            RareKind::Favorable => RARE_BASE_CHANCE,
            RareKind::Adverse => RARE_BASE_CHANCE * (1.0 + stress / 50.0),
        }
    }
}
