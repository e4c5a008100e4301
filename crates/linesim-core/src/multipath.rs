//! Multipath Channel — Delayed, attenuated echoes of the direct path
//!
//! Models a channel where the receiver sees the direct waveform plus up to
//! five indirect paths, each a copy delayed by a whole number of samples and
//! scaled by an attenuation in [0, 1]. Echoes are purely additive with no
//! energy normalization, so a profile with several strong paths can push the
//! received waveform beyond the transmitted amplitude range; that is the
//! modeling choice, not a bug. Before a path's delay has elapsed the echo
//! simply contributes nothing (no wraparound, no zero padding).
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::channel::ChannelModel;
//! use linesim_core::multipath::{EchoPath, MultipathChannel, MultipathProfile};
//!
//! let profile = MultipathProfile::new(vec![
//!     EchoPath::new(3, 0.5).unwrap(),
//!     EchoPath::new(5, 0.2).unwrap(),
//! ])
//! .unwrap();
//! let mut ch = MultipathChannel::new(profile);
//! let received = ch.transmit(&[1.0, 0.5, 0.0, 1.0, 0.5, 0.0]).unwrap();
//! assert_eq!(received, vec![1.0, 0.5, 0.0, 1.5, 0.75, 0.2]);
//! ```

use crate::channel::{check_signal, ChannelModel};
use crate::error::ChainError;
use crate::pipeline::Transform;
use serde::{Deserialize, Serialize};

/// Maximum number of indirect paths in a profile.
pub const MAX_PATHS: usize = 5;

/// One indirect path: a delay in whole samples and an attenuation in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EchoPath {
    delay_samples: usize,
    attenuation: f64,
}

impl EchoPath {
    /// Create a path, validating the attenuation range.
    ///
    /// The delay is a `usize`, so a negative delay is unrepresentable by
    /// construction. Fails with [`ChainError::InvalidMultipathParameter`]
    /// when the attenuation leaves [0, 1].
    pub fn new(delay_samples: usize, attenuation: f64) -> Result<Self, ChainError> {
        if !(0.0..=1.0).contains(&attenuation) {
            return Err(ChainError::InvalidMultipathParameter(format!(
                "attenuation {attenuation} is outside [0.0, 1.0]"
            )));
        }
        Ok(Self {
            delay_samples,
            attenuation,
        })
    }

    /// Delay of this path in samples.
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Attenuation coefficient of this path.
    pub fn attenuation(&self) -> f64 {
        self.attenuation
    }
}

/// An ordered set of at most [`MAX_PATHS`] indirect paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipathProfile {
    paths: Vec<EchoPath>,
}

impl MultipathProfile {
    /// Create a profile, failing fast on more than [`MAX_PATHS`] paths or an
    /// out-of-range attenuation.
    pub fn new(paths: Vec<EchoPath>) -> Result<Self, ChainError> {
        if paths.len() > MAX_PATHS {
            return Err(ChainError::InvalidMultipathParameter(format!(
                "{} indirect paths exceed the maximum of {MAX_PATHS}",
                paths.len()
            )));
        }
        // Paths built by literal or deserialization are re-validated here.
        for path in &paths {
            EchoPath::new(path.delay_samples, path.attenuation)?;
        }
        Ok(Self { paths })
    }

    /// Convenience constructor from `(delay, attenuation)` pairs.
    pub fn from_pairs(pairs: &[(usize, f64)]) -> Result<Self, ChainError> {
        let paths = pairs
            .iter()
            .map(|&(delay, att)| EchoPath::new(delay, att))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(paths)
    }

    /// The indirect paths, in insertion order.
    pub fn paths(&self) -> &[EchoPath] {
        &self.paths
    }
}

/// Channel applying a [`MultipathProfile`] to a waveform.
#[derive(Debug, Clone)]
pub struct MultipathChannel {
    profile: MultipathProfile,
}

impl MultipathChannel {
    /// Create a channel for the given profile.
    pub fn new(profile: MultipathProfile) -> Self {
        Self { profile }
    }

    /// The profile this channel applies.
    pub fn profile(&self) -> &MultipathProfile {
        &self.profile
    }
}

impl ChannelModel for MultipathChannel {
    fn transmit(&mut self, samples: &[f64]) -> Result<Vec<f64>, ChainError> {
        check_signal(samples)?;
        let mut received = Vec::with_capacity(samples.len());
        for i in 0..samples.len() {
            let mut value = samples[i];
            for path in self.profile.paths() {
                if i >= path.delay_samples() {
                    value += path.attenuation() * samples[i - path.delay_samples()];
                }
            }
            received.push(value);
        }
        Ok(received)
    }
}

impl Transform for MultipathChannel {
    type In = f64;
    type Out = f64;

    fn apply(&mut self, input: &[f64]) -> Result<Vec<f64>, ChainError> {
        self.transmit(input)
    }
}
