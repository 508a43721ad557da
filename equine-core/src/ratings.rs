//! Base stat ratings drawn from a breed's mean/stddev profile.
use log::debug;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use crate::breed::BreedGeneticProfile;
use crate::error::{EquineError, Result};
use crate::numbers::round_f64_to_rating;
use crate::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Speed,
    Stamina,
    Agility,
    Balance,
    Precision,
    Intelligence,
    Boldness,
    Flexibility,
    Obedience,
    Focus,
}

pub const ALL_STATS: [Stat; 10] = [
    Stat::Speed,
    Stat::Stamina,
    Stat::Agility,
    Stat::Balance,
    Stat::Precision,
    Stat::Intelligence,
    Stat::Boldness,
    Stat::Flexibility,
    Stat::Obedience,
    Stat::Focus,
];

impl Stat {
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Stamina => "stamina",
            Self::Agility => "agility",
            Self::Balance => "balance",
            Self::Precision => "precision",
            Self::Intelligence => "intelligence",
            Self::Boldness => "boldness",
            Self::Flexibility => "flexibility",
            Self::Obedience => "obedience",
            Self::Focus => "focus",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Stat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim();
        ALL_STATS
            .iter()
            .copied()
            .find(|stat| stat.id() == needle)
            .ok_or_else(|| format!("unknown stat {needle:?}"))
    }
}

/// Normal distribution parameters for one stat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingProfile {
    pub mean: f64,
    pub std_dev: f64,
}

/// Concrete 0-100 ratings for every stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatBlock {
    pub speed: u8,
    pub stamina: u8,
    pub agility: u8,
    pub balance: u8,
    pub precision: u8,
    pub intelligence: u8,
    pub boldness: u8,
    pub flexibility: u8,
    pub obedience: u8,
    pub focus: u8,
}

impl StatBlock {
    #[must_use]
    pub const fn get(&self, stat: Stat) -> u8 {
        match stat {
            Stat::Speed => self.speed,
            Stat::Stamina => self.stamina,
            Stat::Agility => self.agility,
            Stat::Balance => self.balance,
            Stat::Precision => self.precision,
            Stat::Intelligence => self.intelligence,
            Stat::Boldness => self.boldness,
            Stat::Flexibility => self.flexibility,
            Stat::Obedience => self.obedience,
            Stat::Focus => self.focus,
        }
    }

    pub const fn set(&mut self, stat: Stat, value: u8) {
        let slot = match stat {
            Stat::Speed => &mut self.speed,
            Stat::Stamina => &mut self.stamina,
            Stat::Agility => &mut self.agility,
            Stat::Balance => &mut self.balance,
            Stat::Precision => &mut self.precision,
            Stat::Intelligence => &mut self.intelligence,
            Stat::Boldness => &mut self.boldness,
            Stat::Flexibility => &mut self.flexibility,
            Stat::Obedience => &mut self.obedience,
            Stat::Focus => &mut self.focus,
        };
        *slot = value;
    }

    /// Every stat set to the same rating.
    #[must_use]
    pub const fn uniform(value: u8) -> Self {
        Self {
            speed: value,
            stamina: value,
            agility: value,
            balance: value,
            precision: value,
            intelligence: value,
            boldness: value,
            flexibility: value,
            obedience: value,
            focus: value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RatingGenerator;

impl RatingGenerator {
    /// Draw every stat from the breed's rating profile.
    ///
    /// # Errors
    ///
    /// Returns [`EquineError::MissingRatingProfile`] when a stat has no profile.
    pub fn generate<R>(profile: &BreedGeneticProfile, rng: &mut R) -> Result<StatBlock>
    where
        R: RandomSource + ?Sized,
    {
        let mut block = StatBlock::default();
        for stat in ALL_STATS {
            let rating = profile.rating_profile(stat).ok_or_else(|| {
                EquineError::MissingRatingProfile {
                    breed: profile.id().to_string(),
                    stat: stat.id(),
                }
            })?;
            let z = standard_normal(rng);
            block.set(stat, round_f64_to_rating(rating.mean + z * rating.std_dev));
        }
        debug!("{}: generated stats {block:?}", profile.id());
        Ok(block)
    }
}

/// Box-Muller transform over two uniform draws.
fn standard_normal<R>(rng: &mut R) -> f64
where
    R: RandomSource + ?Sized,
{
    let u1 = rng.next_f64().max(f64::MIN_POSITIVE);
    let u2 = rng.next_f64();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breed::BreedCatalog;
    use crate::random::{RollSource, ScriptedSource};

    #[test]
    fn stat_ids_parse() {
        for stat in ALL_STATS {
            assert_eq!(stat.id().parse::<Stat>().unwrap(), stat);
        }
        assert!("charisma".parse::<Stat>().is_err());
    }

    #[test]
    fn median_draw_lands_on_mean() {
        let catalog = BreedCatalog::default_catalog();
        let profile = catalog.get("thoroughbred").unwrap();
        // u2 = 0.25 puts cos(TAU * u2) at zero, so every stat lands on its mean.
        let mut rng = ScriptedSource::new([0.5, 0.25]);
        let block = RatingGenerator::generate(profile, &mut rng).unwrap();
        let speed = profile.rating_profile(Stat::Speed).unwrap();
        assert_eq!(block.speed, round_f64_to_rating(speed.mean));
    }

    #[test]
    fn generated_ratings_stay_in_range() {
        let catalog = BreedCatalog::default_catalog();
        let mut rng = RollSource::seeded(17);
        for profile in catalog.iter() {
            for _ in 0..200 {
                let block = RatingGenerator::generate(profile, &mut rng).unwrap();
                for stat in ALL_STATS {
                    assert!(block.get(stat) <= 100);
                }
            }
        }
    }

    #[test]
    fn set_and_get_agree() {
        let mut block = StatBlock::uniform(10);
        block.set(Stat::Focus, 77);
        assert_eq!(block.get(Stat::Focus), 77);
        assert_eq!(block.get(Stat::Speed), 10);
    }
}
