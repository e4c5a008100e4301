//! Channel Models — Composable waveform impairments
//!
//! A channel model transforms a transmitted waveform into the waveform seen
//! by the receiver. Models compose by feeding one's output into the next;
//! the core imposes no canonical order, callers choose (a typical chain is
//! multipath then additive noise).
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::channel::{ChannelChain, ChannelModel, IdentityChannel};
//! use linesim_core::multipath::{EchoPath, MultipathChannel, MultipathProfile};
//!
//! let profile = MultipathProfile::new(vec![EchoPath::new(2, 0.5).unwrap()]).unwrap();
//! let mut chain = ChannelChain::new();
//! chain.push(Box::new(MultipathChannel::new(profile)));
//! chain.push(Box::new(IdentityChannel));
//!
//! let received = chain.transmit(&[1.0, 0.0, 0.0, 0.0]).unwrap();
//! assert_eq!(received, vec![1.0, 0.0, 0.5, 0.0]);
//! ```

use crate::error::ChainError;
use crate::pipeline::Transform;

/// A waveform impairment model.
///
/// `transmit` takes `&mut self` because noisy channels advance their own
/// random source; every call still produces a freshly allocated output.
pub trait ChannelModel: Send {
    /// Transform a waveform into the received waveform.
    ///
    /// Fails with [`ChainError::InvalidSignal`] on an empty input.
    fn transmit(&mut self, samples: &[f64]) -> Result<Vec<f64>, ChainError>;
}

/// Reject empty sample sequences. Shared by every channel model.
pub(crate) fn check_signal(samples: &[f64]) -> Result<(), ChainError> {
    if samples.is_empty() {
        return Err(ChainError::InvalidSignal(
            "cannot transmit an empty sample sequence".to_string(),
        ));
    }
    Ok(())
}

/// Perfect channel: the received waveform is the transmitted waveform.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityChannel;

impl ChannelModel for IdentityChannel {
    fn transmit(&mut self, samples: &[f64]) -> Result<Vec<f64>, ChainError> {
        check_signal(samples)?;
        Ok(samples.to_vec())
    }
}

/// An ordered composition of channel models.
///
/// An empty chain behaves like [`IdentityChannel`].
#[derive(Default)]
pub struct ChannelChain {
    stages: Vec<Box<dyn ChannelModel>>,
}

impl ChannelChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a model; it runs after everything already in the chain.
    pub fn push(&mut self, model: Box<dyn ChannelModel>) {
        self.stages.push(model);
    }

    /// Number of composed models.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain holds no model.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl ChannelModel for ChannelChain {
    fn transmit(&mut self, samples: &[f64]) -> Result<Vec<f64>, ChainError> {
        check_signal(samples)?;
        let mut current = samples.to_vec();
        for stage in &mut self.stages {
            current = stage.transmit(&current)?;
        }
        Ok(current)
    }
}

/// Any channel model as a pipeline stage.
pub struct ChannelStage<C: ChannelModel>(pub C);

impl<C: ChannelModel> Transform for ChannelStage<C> {
    type In = f64;
    type Out = f64;

    fn apply(&mut self, input: &[f64]) -> Result<Vec<f64>, ChainError> {
        self.0.transmit(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_passthrough() {
        let mut ch = IdentityChannel;
        let wave = vec![1.0, -0.5, 0.25];
        assert_eq!(ch.transmit(&wave).unwrap(), wave);
    }

    #[test]
    fn test_identity_rejects_empty() {
        let err = IdentityChannel.transmit(&[]).unwrap_err();
        assert!(matches!(err, ChainError::InvalidSignal(_)));
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let mut chain = ChannelChain::new();
        assert!(chain.is_empty());
        let wave = vec![0.5, 0.5];
        assert_eq!(chain.transmit(&wave).unwrap(), wave);
    }

    #[test]
    fn test_chain_applies_in_order() {
        struct Scale(f64);
        impl ChannelModel for Scale {
            fn transmit(&mut self, samples: &[f64]) -> Result<Vec<f64>, ChainError> {
                check_signal(samples)?;
                Ok(samples.iter().map(|s| s * self.0).collect())
            }
        }
        struct Offset(f64);
        impl ChannelModel for Offset {
            fn transmit(&mut self, samples: &[f64]) -> Result<Vec<f64>, ChainError> {
                check_signal(samples)?;
                Ok(samples.iter().map(|s| s + self.0).collect())
            }
        }

        let mut chain = ChannelChain::new();
        chain.push(Box::new(Scale(2.0)));
        chain.push(Box::new(Offset(1.0)));
        assert_eq!(chain.len(), 2);
        // (x * 2) + 1, not (x + 1) * 2.
        assert_eq!(chain.transmit(&[1.0, 2.0]).unwrap(), vec![3.0, 5.0]);
    }

    #[test]
    fn test_chain_rejects_empty() {
        let mut chain = ChannelChain::new();
        chain.push(Box::new(IdentityChannel));
        assert!(chain.transmit(&[]).is_err());
    }
}
