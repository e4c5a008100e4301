//! Chain Errors — Validation failures of the transmission chain
//!
//! Every operation in the chain either fully succeeds or aborts with one of
//! these errors; there is no partial output and no retry. The orchestration
//! layer decides whether a failure ends the run or is logged and skipped.

use thiserror::Error;

/// Errors raised by the transmission chain components.
///
/// All variants are local, non-retryable validation failures detected either
/// at construction time (fail fast) or at the start of an operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    /// A sequence was empty (or otherwise unusable) where data is required.
    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    /// An unrecognized modulation scheme identifier was requested.
    #[error("unknown modulation scheme: {0}")]
    UnknownModulation(String),

    /// A multipath profile was constructed with an out-of-range parameter.
    #[error("invalid multipath parameter: {0}")]
    InvalidMultipathParameter(String),

    /// Amplitude range with amax <= amin.
    #[error("invalid amplitude range: amax ({amax}) must be strictly greater than amin ({amin})")]
    InvalidAmplitudeRange { amin: f64, amax: f64 },

    /// Repetition decoder input length not divisible by the codeword size.
    #[error("codeword stream length {0} is not divisible by 3")]
    IndivisibleCodeword(usize),
}
