//! Face and leg markings drawn from a breed's marking bias.
use log::trace;
use serde::{Deserialize, Serialize};

use crate::breed::{MarkingBias, WeightTable};
use crate::error::Result;
use crate::genotype::Genotype;
use crate::locus::Locus;
use crate::random::{RandomSource, weighted_pick};

pub const UNMARKED: &str = "none";
const BASE_MOTTLING_CHANCE: f64 = 0.5;
const BASE_STRIPING_CHANCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    LeftFore,
    RightFore,
    LeftHind,
    RightHind,
}

/// Evaluation order for leg markings.
pub const LEGS: [Leg; 4] = [Leg::LeftFore, Leg::RightFore, Leg::LeftHind, Leg::RightHind];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegMarkings {
    #[serde(rename = "LF")]
    pub left_fore: String,
    #[serde(rename = "RF")]
    pub right_fore: String,
    #[serde(rename = "LH")]
    pub left_hind: String,
    #[serde(rename = "RH")]
    pub right_hind: String,
}

impl Default for LegMarkings {
    fn default() -> Self {
        Self {
            left_fore: UNMARKED.to_string(),
            right_fore: UNMARKED.to_string(),
            left_hind: UNMARKED.to_string(),
            right_hind: UNMARKED.to_string(),
        }
    }
}

impl LegMarkings {
    #[must_use]
    pub fn get(&self, leg: Leg) -> &str {
        match leg {
            Leg::LeftFore => &self.left_fore,
            Leg::RightFore => &self.right_fore,
            Leg::LeftHind => &self.left_hind,
            Leg::RightHind => &self.right_hind,
        }
    }

    fn slot(&mut self, leg: Leg) -> &mut String {
        match leg {
            Leg::LeftFore => &mut self.left_fore,
            Leg::RightFore => &mut self.right_fore,
            Leg::LeftHind => &mut self.left_hind,
            Leg::RightHind => &mut self.right_hind,
        }
    }

    /// Number of legs carrying any marking.
    #[must_use]
    pub fn marked_count(&self) -> usize {
        LEGS.iter().filter(|leg| self.get(**leg) != UNMARKED).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markings {
    pub face: String,
    pub legs: LegMarkings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mottling: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub striping: Option<bool>,
}

pub(crate) fn resolve_markings<R>(
    breed: &str,
    genotype: &Genotype,
    bias: &MarkingBias,
    rng: &mut R,
) -> Result<Markings>
where
    R: RandomSource + ?Sized,
{
    let face = pick(&format!("{breed}.markingBias.face"), &bias.face, rng)?;

    let mut legs = LegMarkings::default();
    let mut marked = 0_u8;
    for leg in LEGS {
        if marked >= bias.max_legs_marked {
            break;
        }
        if rng.chance(bias.legs_general_probability) {
            let kind = pick(
                &format!("{breed}.markingBias.legSpecificProbabilities"),
                &bias.leg_specific_probabilities,
                rng,
            )?;
            trace!("{breed}: {leg:?} marked {kind}");
            *legs.slot(leg) = kind;
            marked += 1;
        }
    }

    let (mottling, striping) = if genotype.carries(Locus::Leopard, "LP") {
        let advanced = bias.advanced_markings_bias.unwrap_or_default();
        let mottling = rng.chance((BASE_MOTTLING_CHANCE * advanced.mottling_multiplier).min(1.0));
        let striping = rng.chance((BASE_STRIPING_CHANCE * advanced.striping_multiplier).min(1.0));
        (Some(mottling), Some(striping))
    } else {
        (None, None)
    };

    Ok(Markings {
        face,
        legs,
        mottling,
        striping,
    })
}

fn pick<R>(label: &str, table: &WeightTable, rng: &mut R) -> Result<String>
where
    R: RandomSource + ?Sized,
{
    weighted_pick(
        label,
        table.iter().map(|(name, weight)| (name.as_str(), *weight)),
        rng,
    )
    .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breed::AdvancedMarkingsBias;
    use crate::random::{RollSource, ScriptedSource};
    use std::collections::BTreeMap;

    fn bias(probability: f64, max_legs: u8) -> MarkingBias {
        MarkingBias {
            face: BTreeMap::from([("blaze".to_string(), 1.0), ("none".to_string(), 1.0)]),
            legs_general_probability: probability,
            max_legs_marked: max_legs,
            leg_specific_probabilities: BTreeMap::from([("sock".to_string(), 1.0)]),
            advanced_markings_bias: None,
        }
    }

    fn plain() -> Genotype {
        Genotype::from_notation([("extension", "E/e")]).unwrap()
    }

    #[test]
    fn leg_cap_is_respected() {
        let mut rng = RollSource::seeded(11);
        for _ in 0..500 {
            let markings = resolve_markings("t", &plain(), &bias(0.9, 2), &mut rng).unwrap();
            assert!(markings.legs.marked_count() <= 2);
        }
    }

    #[test]
    fn legs_fill_in_order_until_capped() {
        // Every Bernoulli succeeds, so the first two legs take the marks.
        let markings =
            resolve_markings("t", &plain(), &bias(1.0, 2), &mut ScriptedSource::constant(0.0))
                .unwrap();
        assert_eq!(markings.legs.left_fore, "sock");
        assert_eq!(markings.legs.right_fore, "sock");
        assert_eq!(markings.legs.left_hind, UNMARKED);
        assert_eq!(markings.legs.right_hind, UNMARKED);
        assert_eq!(markings.face, "blaze");
    }

    #[test]
    fn advanced_markings_only_for_leopard_complex() {
        let markings =
            resolve_markings("t", &plain(), &bias(0.0, 0), &mut ScriptedSource::constant(0.1))
                .unwrap();
        assert_eq!(markings.mottling, None);
        let json = serde_json::to_value(&markings).unwrap();
        assert!(json.get("mottling").is_none());

        let leopard = Genotype::from_notation([("extension", "E/e"), ("leopard", "LP/lp")]).unwrap();
        // 0.4 < 0.5 mottles, 0.4 >= 0.3 does not stripe.
        let markings =
            resolve_markings("t", &leopard, &bias(0.0, 0), &mut ScriptedSource::constant(0.4))
                .unwrap();
        assert_eq!(markings.mottling, Some(true));
        assert_eq!(markings.striping, Some(false));
    }

    #[test]
    fn multipliers_scale_and_saturate() {
        let leopard = Genotype::from_notation([("extension", "E/e"), ("leopard", "LP/LP")]).unwrap();
        let mut boosted = bias(0.0, 0);
        boosted.advanced_markings_bias = Some(AdvancedMarkingsBias {
            mottling_multiplier: 0.0,
            striping_multiplier: 10.0,
        });
        let markings =
            resolve_markings("t", &leopard, &boosted, &mut ScriptedSource::constant(0.99))
                .unwrap();
        assert_eq!(markings.mottling, Some(false));
        assert_eq!(markings.striping, Some(true));
    }

    #[test]
    fn legs_serialize_with_short_keys() {
        let json = serde_json::to_value(LegMarkings::default()).unwrap();
        for key in ["LF", "RF", "LH", "RH"] {
            assert_eq!(json[key], "none");
        }
    }
}
