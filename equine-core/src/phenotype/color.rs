//! Ordered color rule table.
//!
//! Each rule is `(id, predicate, transform, terminal)`. Rules run in table
//! order against a shared [`ColorState`]; a terminal rule that fires stops
//! evaluation, which is how dominant white masks every later pattern and gray.
use log::trace;

use crate::error::{EquineError, Result};
use crate::genotype::Genotype;
use crate::locus::Locus;

/// Base pigment after extension/agouti epistasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseColor {
    Chestnut,
    Bay,
    SealBrown,
    Black,
}

impl BaseColor {
    /// # Errors
    ///
    /// A genotype without an extension locus cannot be colored.
    pub fn from_genotype(genotype: &Genotype) -> Result<Self> {
        let extension = genotype
            .get(Locus::Extension)
            .ok_or(EquineError::MissingLocus(Locus::Extension))?;
        if extension.is_homozygous("e") {
            return Ok(Self::Chestnut);
        }
        // A missing agouti locus reads as a/a.
        Ok(match genotype.get(Locus::Agouti).map(|pair| pair.dominant().symbol()) {
            Some("A") => Self::Bay,
            Some("At") => Self::SealBrown,
            _ => Self::Black,
        })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Chestnut => "Chestnut",
            Self::Bay => "Bay",
            Self::SealBrown => "Seal Brown",
            Self::Black => "Black",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorState {
    pub base: BaseColor,
    pub name: String,
}

impl ColorState {
    fn append(&mut self, suffix: &str) {
        self.name.push(' ');
        self.name.push_str(suffix);
    }

    fn prefix(&mut self, prefix: &str) {
        self.name = format!("{prefix} {}", self.name);
    }
}

/// Inputs every rule may read.
#[derive(Debug, Clone, Copy)]
pub struct ColorContext<'a> {
    pub genotype: &'a Genotype,
    pub age_years: f64,
}

impl ColorContext<'_> {
    fn dosage(&self, locus: Locus, symbol: &str) -> u8 {
        self.genotype.dosage(locus, symbol)
    }

    fn carries(&self, locus: Locus, symbol: &str) -> bool {
        self.genotype.carries(locus, symbol)
    }

    fn cream(&self) -> u8 {
        self.dosage(Locus::Cream, "Cr")
    }
}

pub struct ColorRule {
    pub id: &'static str,
    pub predicate: fn(&ColorContext<'_>, &ColorState) -> bool,
    pub transform: fn(&ColorContext<'_>, &mut ColorState),
    pub terminal: bool,
}

pub const COLOR_RULES: &[ColorRule] = &[
    ColorRule {
        id: "cream",
        predicate: |ctx, _| ctx.cream() > 0,
        transform: apply_cream,
        terminal: false,
    },
    ColorRule {
        id: "dun",
        predicate: |ctx, _| ctx.carries(Locus::Dun, "D") && ctx.cream() < 2,
        transform: apply_dun,
        terminal: false,
    },
    ColorRule {
        id: "champagne",
        predicate: |ctx, _| ctx.carries(Locus::Champagne, "Ch"),
        transform: apply_champagne,
        terminal: false,
    },
    ColorRule {
        id: "silver",
        predicate: |ctx, state| {
            ctx.carries(Locus::Silver, "Z") && state.base != BaseColor::Chestnut
        },
        transform: |_, state| {
            if state.name == "Black" {
                state.name = "Silver Dapple".to_string();
            } else {
                state.prefix("Silver");
            }
        },
        terminal: false,
    },
    ColorRule {
        id: "pearl",
        predicate: |ctx, _| {
            let pearl = ctx.dosage(Locus::Pearl, "prl");
            match ctx.cream() {
                0 => pearl == 2,
                1 => pearl >= 1,
                _ => false,
            }
        },
        transform: |_, state| state.append("Pearl"),
        terminal: false,
    },
    ColorRule {
        id: "mushroom",
        predicate: |ctx, state| {
            ctx.dosage(Locus::Mushroom, "mu") == 2 && state.base == BaseColor::Chestnut
        },
        transform: |_, state| {
            if state.name == "Chestnut" {
                state.name = "Mushroom".to_string();
            } else {
                state.prefix("Mushroom");
            }
        },
        terminal: false,
    },
    ColorRule {
        id: "dominant_white",
        predicate: |ctx, _| ctx.carries(Locus::DominantWhite, "W"),
        transform: |_, state| state.name = "White".to_string(),
        terminal: true,
    },
    ColorRule {
        id: "white_spotting",
        predicate: |ctx, _| white_spotting(ctx).is_some(),
        transform: |ctx, state| {
            if let Some(pattern) = white_spotting(ctx) {
                state.append(pattern);
            }
        },
        terminal: false,
    },
    ColorRule {
        id: "roan",
        predicate: |ctx, _| ctx.carries(Locus::Roan, "Rn"),
        transform: |_, state| {
            state.name = match state.name.as_str() {
                "Chestnut" => "Strawberry Roan".to_string(),
                "Bay" => "Bay Roan".to_string(),
                "Black" => "Blue Roan".to_string(),
                other => format!("{other} Roan"),
            };
        },
        terminal: false,
    },
    ColorRule {
        id: "leopard",
        predicate: |ctx, _| ctx.carries(Locus::Leopard, "LP"),
        transform: |ctx, state| {
            let homozygous = ctx.dosage(Locus::Leopard, "LP") == 2;
            let pattern = match (ctx.carries(Locus::Pattern1, "PATN1"), homozygous) {
                (true, true) => "Fewspot",
                (true, false) => "Leopard",
                (false, true) => "Snowcap",
                (false, false) => "Blanket",
            };
            state.append(pattern);
        },
        terminal: false,
    },
    ColorRule {
        id: "gray",
        predicate: |ctx, _| ctx.carries(Locus::Gray, "G"),
        transform: |ctx, state| {
            let underlying = &state.name;
            state.name = if ctx.age_years < 2.0 {
                format!("Graying {underlying}")
            } else if ctx.age_years < 5.0 {
                format!("Dapple Gray ({underlying})")
            } else if ctx.age_years < 10.0 {
                format!("Light Gray ({underlying})")
            } else {
                "Fleabitten Gray".to_string()
            };
        },
        terminal: false,
    },
];

fn apply_cream(ctx: &ColorContext<'_>, state: &mut ColorState) {
    let name = match (state.base, ctx.cream()) {
        (BaseColor::Chestnut, 1) => "Palomino",
        (BaseColor::Bay, 1) => "Buckskin",
        (BaseColor::Black, 1) => "Smoky Black",
        (BaseColor::SealBrown, 1) => "Brown Buckskin",
        (BaseColor::Chestnut, _) => "Cremello",
        (BaseColor::Bay | BaseColor::SealBrown, _) => "Perlino",
        (BaseColor::Black, _) => "Smoky Cream",
    };
    state.name = name.to_string();
}

fn apply_dun(ctx: &ColorContext<'_>, state: &mut ColorState) {
    let name = match (state.base, ctx.cream()) {
        (BaseColor::Chestnut, 0) => "Red Dun",
        (BaseColor::Bay, 0) => "Bay Dun",
        (BaseColor::Black, 0) => "Grullo",
        (BaseColor::SealBrown, 0) => "Brown Dun",
        (BaseColor::Chestnut, _) => "Dunalino",
        (BaseColor::Bay, _) => "Dunskin",
        (BaseColor::Black, _) => "Smoky Grullo",
        (BaseColor::SealBrown, _) => "Brown Dunskin",
    };
    state.name = name.to_string();
}

fn apply_champagne(ctx: &ColorContext<'_>, state: &mut ColorState) {
    let tone = match state.base {
        BaseColor::Chestnut => "Gold",
        BaseColor::Bay => "Amber",
        BaseColor::Black => "Classic",
        BaseColor::SealBrown => "Sable",
    };
    let cream = ctx.cream();
    let mut name = match cream {
        0 => format!("{tone} Champagne"),
        1 => format!("{tone} Cream Champagne"),
        _ => "Ivory Champagne".to_string(),
    };
    if cream < 2 && ctx.carries(Locus::Dun, "D") {
        name.push_str(" Dun");
    }
    state.name = name;
}

fn white_spotting(ctx: &ColorContext<'_>) -> Option<&'static str> {
    let tobiano = ctx.carries(Locus::Tobiano, "TO");
    let frame = ctx.carries(Locus::Frame, "O");
    let splash = ctx.carries(Locus::Splash, "SW1");
    let sabino = ctx.dosage(Locus::Sabino, "SB1");
    if tobiano && (frame || splash) {
        Some("Tovero")
    } else if tobiano {
        Some("Tobiano")
    } else if frame {
        Some("Frame Overo")
    } else if splash {
        Some("Splashed White")
    } else if sabino == 2 {
        Some("Max Sabino")
    } else if sabino == 1 {
        Some("Sabino")
    } else if ctx.carries(Locus::DominantWhite, "W20") {
        Some("White Spotted")
    } else {
        None
    }
}

/// Run the rule table and return the final display color.
///
/// # Errors
///
/// Fails with [`EquineError::InvalidAge`] for a negative or non-finite age
/// and [`EquineError::MissingLocus`] when extension is absent.
pub fn resolve_color(genotype: &Genotype, age_years: f64) -> Result<String> {
    if !age_years.is_finite() || age_years < 0.0 {
        return Err(EquineError::InvalidAge(age_years));
    }
    let base = BaseColor::from_genotype(genotype)?;
    let ctx = ColorContext {
        genotype,
        age_years,
    };
    let mut state = ColorState {
        base,
        name: base.name().to_string(),
    };
    for rule in COLOR_RULES {
        if !(rule.predicate)(&ctx, &state) {
            continue;
        }
        (rule.transform)(&ctx, &mut state);
        trace!("color rule {} -> {}", rule.id, state.name);
        if rule.terminal {
            break;
        }
    }
    Ok(state.name)
}
