//! Show scoring and placement.
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::numbers::round_f64_to_i32;
use crate::random::RandomSource;
use crate::ratings::{Stat, StatBlock};
use crate::traits::catalog::DISCIPLINE_AFFINITY_PREFIX;
use crate::traits::effects::{BASE_STAT_BOOST, COMPETITION_SCORE_MODIFIER, DISCIPLINE_MODIFIERS};
use crate::traits::TraitEffect;

const PRIMARY_WEIGHT: f64 = 0.5;
const SECONDARY_WEIGHT: f64 = 0.3;
const TERTIARY_WEIGHT: f64 = 0.2;
pub const AFFINITY_BONUS: f64 = 5.0;
pub const LUCK_SPREAD: f64 = 0.09;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Racing,
    Dressage,
    ShowJumping,
    CrossCountry,
    Endurance,
    BarrelRacing,
    Reining,
    WesternPleasure,
    Hunter,
    Trail,
    Vaulting,
    Polo,
}

pub const ALL_DISCIPLINES: [Discipline; 12] = [
    Discipline::Racing,
    Discipline::Dressage,
    Discipline::ShowJumping,
    Discipline::CrossCountry,
    Discipline::Endurance,
    Discipline::BarrelRacing,
    Discipline::Reining,
    Discipline::WesternPleasure,
    Discipline::Hunter,
    Discipline::Trail,
    Discipline::Vaulting,
    Discipline::Polo,
];

impl Discipline {
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Racing => "racing",
            Self::Dressage => "dressage",
            Self::ShowJumping => "show_jumping",
            Self::CrossCountry => "cross_country",
            Self::Endurance => "endurance",
            Self::BarrelRacing => "barrel_racing",
            Self::Reining => "reining",
            Self::WesternPleasure => "western_pleasure",
            Self::Hunter => "hunter",
            Self::Trail => "trail",
            Self::Vaulting => "vaulting",
            Self::Polo => "polo",
        }
    }

    /// Weighted stats, most important first.
    #[must_use]
    pub const fn stats(self) -> [Stat; 3] {
        match self {
            Self::Racing => [Stat::Speed, Stat::Stamina, Stat::Intelligence],
            Self::Dressage => [Stat::Precision, Stat::Focus, Stat::Obedience],
            Self::ShowJumping => [Stat::Balance, Stat::Agility, Stat::Boldness],
            Self::CrossCountry => [Stat::Stamina, Stat::Agility, Stat::Boldness],
            Self::Endurance => [Stat::Stamina, Stat::Speed, Stat::Focus],
            Self::BarrelRacing => [Stat::Speed, Stat::Agility, Stat::Balance],
            Self::Reining => [Stat::Agility, Stat::Focus, Stat::Balance],
            Self::WesternPleasure => [Stat::Obedience, Stat::Focus, Stat::Flexibility],
            Self::Hunter => [Stat::Balance, Stat::Precision, Stat::Intelligence],
            Self::Trail => [Stat::Stamina, Stat::Intelligence, Stat::Boldness],
            Self::Vaulting => [Stat::Balance, Stat::Flexibility, Stat::Obedience],
            Self::Polo => [Stat::Speed, Stat::Agility, Stat::Intelligence],
        }
    }

    #[must_use]
    pub fn affinity_trait(self) -> String {
        format!("{DISCIPLINE_AFFINITY_PREFIX}{}", self.id())
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Discipline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ALL_DISCIPLINES
            .iter()
            .copied()
            .find(|discipline| discipline.id() == needle)
            .ok_or_else(|| format!("unknown discipline {needle:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HealthRating {
    Excellent,
    #[default]
    Good,
    Fair,
    Bad,
    Injured,
}

impl HealthRating {
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Excellent => 1.05,
            Self::Good => 1.00,
            Self::Fair => 0.95,
            Self::Bad => 0.90,
            Self::Injured => 0.80,
        }
    }
}

/// One horse entered in a show.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionEntry {
    #[serde(default)]
    pub name: String,
    pub stats: StatBlock,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub trait_effects: Option<TraitEffect>,
    #[serde(default)]
    pub training_score: f64,
    #[serde(default)]
    pub saddle_bonus: f64,
    #[serde(default)]
    pub bridle_bonus: f64,
    /// Fraction, e.g. `0.1` for +10%.
    #[serde(default)]
    pub rider_bonus: f64,
    #[serde(default)]
    pub rider_penalty: f64,
    #[serde(default)]
    pub health: HealthRating,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub place: usize,
    pub entry: usize,
    pub name: String,
    pub score: i32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompetitionScorer;

impl CompetitionScorer {
    /// Score before luck and rounding.
    #[must_use]
    pub fn expected_score(entry: &CompetitionEntry, discipline: Discipline) -> f64 {
        let empty = TraitEffect::new();
        let effects = entry.trait_effects.as_ref().unwrap_or(&empty);

        let stat = |stat: Stat| {
            let boost = effects.table_value(BASE_STAT_BOOST, stat.id());
            (f64::from(entry.stats.get(stat)) + boost).max(0.0)
        };
        let [primary, secondary, tertiary] = discipline.stats();
        let mut score = PRIMARY_WEIGHT * stat(primary)
            + SECONDARY_WEIGHT * stat(secondary)
            + TERTIARY_WEIGHT * stat(tertiary);

        score *= 1.0
            + effects.number(COMPETITION_SCORE_MODIFIER)
            + effects.table_value(DISCIPLINE_MODIFIERS, discipline.id());

        let affinity = discipline.affinity_trait();
        if entry.traits.iter().any(|name| *name == affinity) {
            score += AFFINITY_BONUS;
        }

        score += entry.training_score + entry.saddle_bonus + entry.bridle_bonus;
        score *= 1.0 + entry.rider_bonus - entry.rider_penalty;
        score * entry.health.factor()
    }

    /// Final integer score with a uniform luck factor in `[-9%, +9%]`.
    pub fn score<R>(entry: &CompetitionEntry, discipline: Discipline, rng: &mut R) -> i32
    where
        R: RandomSource + ?Sized,
    {
        let expected = Self::expected_score(entry, discipline);
        let luck = (rng.next_f64() * 2.0 - 1.0) * LUCK_SPREAD;
        let score = round_f64_to_i32(expected * (1.0 + luck)).max(0);
        debug!("{discipline}: {} scored {score} (luck {luck:+.3})", entry.name);
        score
    }

    /// Score every entry and order by score, ties keeping entry order.
    pub fn rank_entries<R>(
        entries: &[CompetitionEntry],
        discipline: Discipline,
        rng: &mut R,
    ) -> Vec<Placement>
    where
        R: RandomSource + ?Sized,
    {
        let mut scored: Vec<(usize, i32)> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index, Self::score(entry, discipline, rng)))
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored
            .into_iter()
            .enumerate()
            .map(|(rank, (index, score))| Placement {
                place: rank + 1,
                entry: index,
                name: entries[index].name.clone(),
                score,
            })
            .collect()
    }
}
