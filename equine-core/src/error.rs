//! Error taxonomy shared by every resolver in the crate.
use thiserror::Error;

use crate::locus::Locus;

/// Coarse classification callers use to map failures to server or client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Breed or catalog data cannot resolve a value the genotype can legitimately produce.
    Configuration,
    /// Caller-supplied input is missing, wrong-typed, or out of range.
    Validation,
    /// A weight table or similar structure broke a hard invariant.
    Invariant,
}

#[derive(Debug, Error, PartialEq)]
pub enum EquineError {
    #[error("breed {breed} has no shade bias for color {color:?} and no default shade bucket")]
    MissingShadeBias { breed: String, color: String },
    #[error("breed {breed} has no rating profile for stat {stat}")]
    MissingRatingProfile { breed: String, stat: &'static str },
    #[error("breed {breed} has an empty temperament table")]
    MissingTemperamentTable { breed: String },
    #[error("genotype is missing required locus {0}")]
    MissingLocus(Locus),
    #[error("breed profile {breed} is invalid: {reason}")]
    InvalidProfile { breed: String, reason: String },
    #[error("unknown breed {0:?}")]
    UnknownBreed(String),
    #[error("catalog {catalog} failed to parse: {message}")]
    CatalogParse {
        catalog: &'static str,
        message: String,
    },
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be a number (got {value})")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be a list of trait names")]
    NotAList { field: &'static str },
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("age must be a finite, non-negative number of years (got {0})")]
    InvalidAge(f64),
    #[error("unknown locus {0:?}")]
    UnknownLocus(String),
    #[error("allele {allele:?} is not defined for locus {locus}")]
    UnknownAllele { locus: Locus, allele: String },
    #[error("malformed allele pair {0:?} (expected \"X/Y\")")]
    MalformedAllelePair(String),
    #[error("weight table {table} has no selectable entries")]
    EmptyWeightTable { table: String },
    #[error("weight table {table} has invalid weight {weight} for {entry:?}")]
    InvalidWeight {
        table: String,
        entry: String,
        weight: f64,
    },
}

impl EquineError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingShadeBias { .. }
            | Self::MissingRatingProfile { .. }
            | Self::MissingTemperamentTable { .. }
            | Self::MissingLocus(_)
            | Self::InvalidProfile { .. }
            | Self::UnknownBreed(_)
            | Self::CatalogParse { .. } => ErrorKind::Configuration,
            Self::MissingField(_)
            | Self::NotANumber { .. }
            | Self::NotAList { .. }
            | Self::OutOfRange { .. }
            | Self::InvalidAge(_)
            | Self::UnknownLocus(_)
            | Self::UnknownAllele { .. }
            | Self::MalformedAllelePair(_) => ErrorKind::Validation,
            Self::EmptyWeightTable { .. } | Self::InvalidWeight { .. } => ErrorKind::Invariant,
        }
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration)
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation)
    }
}

pub type Result<T> = std::result::Result<T, EquineError>;
