//! Repetition Codec — Rate-1/3 forward error correction
//!
//! Encodes each bit as a fixed 3-bit codeword (1 → `101`, 0 → `010`) and
//! decodes each consecutive 3-bit window back to one bit with an explicit
//! decision automaton realizing majority vote: the decoded bit is 1 iff at
//! least two of the three window bits are 1. The automaton is total over all
//! eight windows, so decoding is deterministic and never produces partial
//! output.
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::repetition::RepetitionCodec;
//!
//! let codec = RepetitionCodec::new();
//! let coded = codec.encode(&[true, false]).unwrap();
//! assert_eq!(coded, vec![true, false, true, false, true, false]);
//! assert_eq!(codec.decode(&coded).unwrap(), vec![true, false]);
//!
//! // A flipped middle bit in each window is absorbed by the majority vote.
//! let garbled = vec![true, true, true, false, false, false];
//! assert_eq!(codec.decode(&garbled).unwrap(), vec![true, false]);
//! ```

use crate::error::ChainError;
use crate::pipeline::Transform;

/// Codeword length; the decoder input must be a multiple of this.
pub const CODEWORD_LEN: usize = 3;

/// States of the decoding automaton. `Q0` branches on the first window bit,
/// `Q1`/`Q4` on the second, `Q2`/`Q3`/`Q5`/`Q6` on the third, and the two
/// terminal states carry the decided bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Q0,
    Q1,
    Q2,
    Q3,
    Q4,
    Q5,
    Q6,
    Final0,
    Final1,
}

impl State {
    /// One automaton transition. Terminal states absorb further input.
    fn step(self, bit: bool) -> State {
        match (self, bit) {
            (State::Q0, false) => State::Q1,
            (State::Q0, true) => State::Q4,
            // Second bit.
            (State::Q1, false) => State::Q2,
            (State::Q1, true) => State::Q3,
            (State::Q4, false) => State::Q5,
            (State::Q4, true) => State::Q6,
            // Third bit. Two zeros already seen can never reach a majority
            // of ones; two ones already seen always have one.
            (State::Q2, _) => State::Final0,
            (State::Q3, false) => State::Final0,
            (State::Q3, true) => State::Final1,
            (State::Q5, false) => State::Final0,
            (State::Q5, true) => State::Final1,
            (State::Q6, _) => State::Final1,
            (s @ (State::Final0 | State::Final1), _) => s,
        }
    }
}

/// Fixed-codeword repetition encoder/decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepetitionCodec;

impl RepetitionCodec {
    /// Create the codec.
    pub fn new() -> Self {
        Self
    }

    /// Code rate, 1/3.
    pub fn code_rate(&self) -> f64 {
        1.0 / CODEWORD_LEN as f64
    }

    /// Encode each bit as its 3-bit codeword.
    ///
    /// Output length is 3x the input length. Fails with
    /// [`ChainError::InvalidSignal`] on an empty input.
    pub fn encode(&self, bits: &[bool]) -> Result<Vec<bool>, ChainError> {
        if bits.is_empty() {
            return Err(ChainError::InvalidSignal(
                "cannot encode an empty bit sequence".to_string(),
            ));
        }
        let mut coded = Vec::with_capacity(bits.len() * CODEWORD_LEN);
        for &bit in bits {
            if bit {
                coded.extend_from_slice(&[true, false, true]);
            } else {
                coded.extend_from_slice(&[false, true, false]);
            }
        }
        Ok(coded)
    }

    /// Decode consecutive non-overlapping 3-bit windows by majority vote.
    ///
    /// Fails with [`ChainError::InvalidSignal`] on an empty input and with
    /// [`ChainError::IndivisibleCodeword`] when the length is not a multiple
    /// of 3.
    pub fn decode(&self, bits: &[bool]) -> Result<Vec<bool>, ChainError> {
        if bits.is_empty() {
            return Err(ChainError::InvalidSignal(
                "cannot decode an empty bit sequence".to_string(),
            ));
        }
        if bits.len() % CODEWORD_LEN != 0 {
            return Err(ChainError::IndivisibleCodeword(bits.len()));
        }
        let decoded = bits
            .chunks_exact(CODEWORD_LEN)
            .map(|window| {
                let state = window.iter().fold(State::Q0, |s, &b| s.step(b));
                state == State::Final1
            })
            .collect();
        Ok(decoded)
    }
}

/// Encoding half of the codec as a pipeline stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepetitionEncoder(pub RepetitionCodec);

impl Transform for RepetitionEncoder {
    type In = bool;
    type Out = bool;

    fn apply(&mut self, input: &[bool]) -> Result<Vec<bool>, ChainError> {
        self.0.encode(input)
    }
}

/// Decoding half of the codec as a pipeline stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepetitionDecoder(pub RepetitionCodec);

impl Transform for RepetitionDecoder {
    type In = bool;
    type Out = bool;

    fn apply(&mut self, input: &[bool]) -> Result<Vec<bool>, ChainError> {
        self.0.decode(input)
    }
}
