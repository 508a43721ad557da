//! Genetic loci and their fixed allele alphabets.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EquineError;

/// A named genetic position with a small fixed allele alphabet.
///
/// Variant order is the canonical iteration order of a genotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locus {
    Extension,
    Agouti,
    Cream,
    Dun,
    Gray,
    Roan,
    Tobiano,
    Frame,
    Sabino,
    Splash,
    DominantWhite,
    Leopard,
    Pattern1,
    Silver,
    Champagne,
    Pearl,
    Mushroom,
}

pub const ALL_LOCI: [Locus; 17] = [
    Locus::Extension,
    Locus::Agouti,
    Locus::Cream,
    Locus::Dun,
    Locus::Gray,
    Locus::Roan,
    Locus::Tobiano,
    Locus::Frame,
    Locus::Sabino,
    Locus::Splash,
    Locus::DominantWhite,
    Locus::Leopard,
    Locus::Pattern1,
    Locus::Silver,
    Locus::Champagne,
    Locus::Pearl,
    Locus::Mushroom,
];

impl Locus {
    /// Identifier used in genotype maps and breed profiles.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Extension => "extension",
            Self::Agouti => "agouti",
            Self::Cream => "cream",
            Self::Dun => "dun",
            Self::Gray => "gray",
            Self::Roan => "roan",
            Self::Tobiano => "tobiano",
            Self::Frame => "frame",
            Self::Sabino => "sabino",
            Self::Splash => "splash",
            Self::DominantWhite => "dominant_white",
            Self::Leopard => "leopard",
            Self::Pattern1 => "pattern1",
            Self::Silver => "silver",
            Self::Champagne => "champagne",
            Self::Pearl => "pearl",
            Self::Mushroom => "mushroom",
        }
    }

    /// Allele symbols, most dominant first.
    #[must_use]
    pub const fn alleles(self) -> &'static [&'static str] {
        match self {
            Self::Extension => &["E", "e"],
            Self::Agouti => &["A", "At", "a"],
            Self::Cream => &["Cr", "n"],
            Self::Dun => &["D", "nd1", "nd2"],
            Self::Gray => &["G", "g"],
            Self::Roan => &["Rn", "rn"],
            Self::Tobiano => &["TO", "to"],
            Self::Frame => &["O", "n"],
            Self::Sabino => &["SB1", "n"],
            Self::Splash => &["SW1", "n"],
            Self::DominantWhite => &["W", "W20", "n"],
            Self::Leopard => &["LP", "lp"],
            Self::Pattern1 => &["PATN1", "n"],
            Self::Silver => &["Z", "n"],
            Self::Champagne => &["Ch", "n"],
            // Recessive loci list the wild type first.
            Self::Pearl => &["n", "prl"],
            Self::Mushroom => &["n", "mu"],
        }
    }

    /// Look up an allele by its symbol.
    ///
    /// # Errors
    ///
    /// Returns [`EquineError::UnknownAllele`] when the symbol is outside the alphabet.
    pub fn allele(self, symbol: &str) -> Result<Allele, EquineError> {
        let symbol = symbol.trim();
        self.alleles()
            .iter()
            .position(|candidate| *candidate == symbol)
            .and_then(|rank| u8::try_from(rank).ok())
            .map(|rank| Allele { locus: self, rank })
            .ok_or_else(|| EquineError::UnknownAllele {
                locus: self,
                allele: symbol.to_string(),
            })
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Locus {
    type Err = EquineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ALL_LOCI
            .iter()
            .copied()
            .find(|locus| locus.id() == needle)
            .ok_or_else(|| EquineError::UnknownLocus(needle.to_string()))
    }
}

/// One allele of a locus, ordered by dominance (lower rank is more dominant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Allele {
    locus: Locus,
    rank: u8,
}

impl Allele {
    #[must_use]
    pub const fn locus(self) -> Locus {
        self.locus
    }

    #[must_use]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        self.locus
            .alleles()
            .get(usize::from(self.rank))
            .copied()
            .unwrap_or("?")
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unordered allele pair stored with the more dominant allele first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllelePair {
    first: Allele,
    second: Allele,
}

impl AllelePair {
    /// Combine two alleles of the same locus; argument order is irrelevant.
    ///
    /// # Errors
    ///
    /// Returns [`EquineError::UnknownAllele`] when the alleles belong to different loci.
    pub fn new(a: Allele, b: Allele) -> Result<Self, EquineError> {
        if a.locus != b.locus {
            return Err(EquineError::UnknownAllele {
                locus: a.locus,
                allele: b.symbol().to_string(),
            });
        }
        let (first, second) = if a.rank <= b.rank { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    /// Parse `"E/e"` style notation for a locus.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed text or alleles outside the locus alphabet.
    pub fn parse(locus: Locus, text: &str) -> Result<Self, EquineError> {
        let mut parts = text.split('/');
        let (Some(a), Some(b), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(EquineError::MalformedAllelePair(text.to_string()));
        };
        if a.trim().is_empty() || b.trim().is_empty() {
            return Err(EquineError::MalformedAllelePair(text.to_string()));
        }
        Self::new(locus.allele(a)?, locus.allele(b)?)
    }

    #[must_use]
    pub const fn locus(&self) -> Locus {
        self.first.locus
    }

    #[must_use]
    pub const fn alleles(&self) -> [Allele; 2] {
        [self.first, self.second]
    }

    /// Number of copies of the symbol (0, 1, or 2).
    #[must_use]
    pub fn dosage(&self, symbol: &str) -> u8 {
        u8::from(self.first.symbol() == symbol) + u8::from(self.second.symbol() == symbol)
    }

    #[must_use]
    pub fn carries(&self, symbol: &str) -> bool {
        self.dosage(symbol) > 0
    }

    #[must_use]
    pub fn is_homozygous(&self, symbol: &str) -> bool {
        self.dosage(symbol) == 2
    }

    /// The expressed (most dominant) allele.
    #[must_use]
    pub const fn dominant(&self) -> Allele {
        self.first
    }
}

impl fmt::Display for AllelePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}
