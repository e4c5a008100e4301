//! Bit Sources — Fixed and random message generation
//!
//! A bit source produces the logical message fed into the transmission
//! chain: either a fixed `0`/`1` string, or a random sequence of a given
//! length. A random source owns its generator, seeded explicitly for
//! reproducible runs or from entropy otherwise, so concurrent simulations
//! never share random state.
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::source::{BitSource, FixedSource, RandomSource};
//!
//! let mut fixed = FixedSource::new("0111000111001").unwrap();
//! assert_eq!(fixed.generate().len(), 13);
//!
//! let mut random = RandomSource::new(100, Some(42));
//! assert_eq!(random.generate().len(), 100);
//! ```

use crate::error::ChainError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the logical message of one pipeline run.
///
/// Each call builds a fresh sequence; the caller owns the result outright.
pub trait BitSource {
    /// Produce the message bits.
    fn generate(&mut self) -> Vec<bool>;
}

impl BitSource for Box<dyn BitSource> {
    fn generate(&mut self) -> Vec<bool> {
        (**self).generate()
    }
}

/// Source replaying a fixed message.
#[derive(Debug, Clone)]
pub struct FixedSource {
    bits: Vec<bool>,
}

impl FixedSource {
    /// Parse a message of `0` and `1` characters.
    ///
    /// Fails with [`ChainError::InvalidSignal`] on an empty message or any
    /// other character.
    pub fn new(message: &str) -> Result<Self, ChainError> {
        if message.is_empty() {
            return Err(ChainError::InvalidSignal(
                "fixed message is empty".to_string(),
            ));
        }
        let bits = message
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(ChainError::InvalidSignal(format!(
                    "fixed message must contain only 0 and 1, found {other:?}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { bits })
    }

    /// Message length in bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the message is empty (never true for a constructed source).
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

impl BitSource for FixedSource {
    fn generate(&mut self) -> Vec<bool> {
        self.bits.clone()
    }
}

/// Source drawing uniformly random bits from an instance-owned generator.
pub struct RandomSource {
    length: usize,
    rng: StdRng,
}

impl RandomSource {
    /// Create a source of `length` random bits. A `Some` seed gives a
    /// reproducible message; `None` seeds from entropy.
    pub fn new(length: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { length, rng }
    }
}

impl BitSource for RandomSource {
    fn generate(&mut self) -> Vec<bool> {
        (0..self.length).map(|_| self.rng.gen()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_source_parses_message() {
        let mut source = FixedSource::new("10110").unwrap();
        assert_eq!(
            source.generate(),
            vec![true, false, true, true, false]
        );
    }

    #[test]
    fn test_fixed_source_rejects_empty() {
        assert!(FixedSource::new("").is_err());
    }

    #[test]
    fn test_fixed_source_rejects_other_characters() {
        let err = FixedSource::new("0121").unwrap_err();
        assert!(matches!(err, ChainError::InvalidSignal(_)));
    }

    #[test]
    fn test_fixed_source_replays_same_message() {
        let mut source = FixedSource::new("101").unwrap();
        assert_eq!(source.generate(), source.generate());
    }

    #[test]
    fn test_random_source_length() {
        let mut source = RandomSource::new(257, Some(1));
        assert_eq!(source.generate().len(), 257);
    }

    #[test]
    fn test_random_source_seed_reproducible() {
        let mut a = RandomSource::new(100, Some(42));
        let mut b = RandomSource::new(100, Some(42));
        assert_eq!(a.generate(), b.generate());
    }

    #[test]
    fn test_random_source_different_seeds_differ() {
        let mut a = RandomSource::new(100, Some(1));
        let mut b = RandomSource::new(100, Some(2));
        assert_ne!(a.generate(), b.generate());
    }

    #[test]
    fn test_random_source_mixes_both_values() {
        let mut source = RandomSource::new(200, Some(7));
        let bits = source.generate();
        assert!(bits.iter().any(|&b| b));
        assert!(bits.iter().any(|&b| !b));
    }
}
