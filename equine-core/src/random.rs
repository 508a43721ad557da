//! Random-source capability threaded through every resolver.
//!
//! Nothing in this crate touches an ambient generator: each resolver receives a
//! [`RandomSource`] so seeded calls stay hermetic even when unseeded calls run
//! concurrently elsewhere.
use hmac::{Hmac, Mac};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use smallvec::SmallVec;
use std::fmt;
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::error::{EquineError, Result};

/// Uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Bernoulli trial; probabilities outside `[0, 1]` saturate.
    fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Counting wrapper around a `rand` generator.
#[derive(Debug, Clone)]
pub struct RollSource<R> {
    rng: R,
    draws: u64,
}

impl<R: RngCore> RollSource<R> {
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Number of draws taken from this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RollSource<ChaCha20Rng> {
    /// Portable seeded stream; identical seeds replay identical draws on every platform.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha20Rng::seed_from_u64(seed))
    }

    /// Entropy-backed stream for production calls without a seed.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(ChaCha20Rng::from_entropy())
    }
}

impl<R: RngCore> RandomSource for RollSource<R> {
    fn next_f64(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.r#gen::<f64>()
    }
}

/// Replays a fixed sequence of draws, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// Values are clamped into `[0, 1)`; an empty script always yields `0.0`.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| if v.is_finite() { v.clamp(0.0, 0.999_999) } else { 0.0 })
            .collect();
        Self { values, cursor: 0 }
    }

    /// A source that always returns the same value.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new([value])
    }

    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.saturating_add(1);
        value
    }
}

/// Independent simulation domains fed from one user seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamDomain {
    Genotype,
    Phenotype,
    Inheritance,
    Discovery,
    Temperament,
    Ratings,
    Competition,
}

impl StreamDomain {
    const fn tag(self) -> &'static [u8] {
        match self {
            Self::Genotype => b"genotype",
            Self::Phenotype => b"phenotype",
            Self::Inheritance => b"inheritance",
            Self::Discovery => b"discovery",
            Self::Temperament => b"temperament",
            Self::Ratings => b"ratings",
            Self::Competition => b"competition",
        }
    }
}

/// Deterministic bundle of per-domain seeds derived from a user-visible seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedStreams {
    user_seed: u64,
}

impl SeedStreams {
    #[must_use]
    pub const fn from_user_seed(user_seed: u64) -> Self {
        Self { user_seed }
    }

    #[must_use]
    pub const fn user_seed(&self) -> u64 {
        self.user_seed
    }

    #[must_use]
    pub fn seed_for(&self, domain: StreamDomain) -> u64 {
        derive_stream_seed(self.user_seed, domain.tag())
    }

    /// Fresh stream for a domain; two calls return identical sequences.
    #[must_use]
    pub fn stream(&self, domain: StreamDomain) -> RollSource<ChaCha20Rng> {
        RollSource::seeded(self.seed_for(domain))
    }
}

/// Domain-separate a user seed with HMAC-SHA256 keyed by the seed bytes.
#[must_use]
pub fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        // HMAC accepts keys of any length.
        return user_seed ^ 0x9E37_79B9_7F4A_7C15;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Stable numeric seed for a textual label such as `mare-42`.
#[must_use]
pub fn seed_from_label(label: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(label.trim().as_bytes());
    hasher.finish()
}

/// Cumulative weighted draw.
///
/// Zero weights are never selectable. An empty or all-zero table, or any
/// negative / non-finite weight, fails instead of returning an arbitrary key.
///
/// # Errors
///
/// Returns [`EquineError::EmptyWeightTable`] or [`EquineError::InvalidWeight`].
pub fn weighted_pick<K, I, R>(table: &str, entries: I, rng: &mut R) -> Result<K>
where
    K: Clone + fmt::Debug,
    I: IntoIterator<Item = (K, f64)>,
    R: RandomSource + ?Sized,
{
    let mut candidates: SmallVec<[(K, f64); 8]> = SmallVec::new();
    let mut total = 0.0_f64;
    for (key, weight) in entries {
        if !weight.is_finite() || weight < 0.0 {
            return Err(EquineError::InvalidWeight {
                table: table.to_string(),
                entry: format!("{key:?}"),
                weight,
            });
        }
        if weight > 0.0 {
            total += weight;
            candidates.push((key, weight));
        }
    }
    let Some((last_key, _)) = candidates.last() else {
        return Err(EquineError::EmptyWeightTable {
            table: table.to_string(),
        });
    };
    let fallback = last_key.clone();

    let point = rng.next_f64() * total;
    let mut cumulative = 0.0_f64;
    for (key, weight) in candidates {
        cumulative += weight;
        if point < cumulative {
            return Ok(key);
        }
    }
    Ok(fallback)
}
