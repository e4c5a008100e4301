//! AWGN Channel — Additive white Gaussian noise calibrated to a target SNR
//!
//! Measures the mean square power of the incoming waveform, derives the
//! noise power from the target signal-to-noise ratio and draws one
//! independent zero-mean Gaussian sample per input sample. Each instance
//! owns its random source: construct with a seed for a reproducible run, or
//! without one for a stochastic run, and concurrent instances can never
//! interfere with each other's draws.
//!
//! After every transmission the channel keeps a [`NoiseReport`] with the
//! realized powers and ratios, useful for verifying the calibration.
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::awgn::AwgnChannel;
//! use linesim_core::channel::ChannelModel;
//!
//! let mut ch = AwgnChannel::new(10.0, 30, Some(42));
//! let noisy = ch.transmit(&[1.0; 300]).unwrap();
//! assert_eq!(noisy.len(), 300);
//!
//! let report = ch.last_report().unwrap();
//! // Realized SNR lands near the 10 dB target.
//! assert!((report.snr_db - 10.0).abs() < 2.0);
//! ```

use crate::channel::{check_signal, ChannelModel};
use crate::error::ChainError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Realized noise figures of one transmission, for verification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseReport {
    /// Mean square power of the clean input waveform.
    pub signal_power: f64,
    /// Mean square power of the noise actually added.
    pub noise_power: f64,
    /// Realized signal-to-noise ratio in dB.
    pub snr_db: f64,
    /// Energy-per-bit to noise-density ratio in dB,
    /// SNR + 10 log10(samples_per_bit / 2).
    pub eb_n0_db: f64,
}

/// Additive white Gaussian noise channel.
pub struct AwgnChannel {
    snr_db: f64,
    samples_per_bit: usize,
    rng: StdRng,
    last_report: Option<NoiseReport>,
}

impl AwgnChannel {
    /// Create a channel targeting `snr_db`.
    ///
    /// `samples_per_bit` only enters the Eb/N0 diagnostic. A `Some` seed
    /// makes the noise sequence reproducible; `None` seeds from entropy.
    pub fn new(snr_db: f64, samples_per_bit: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            snr_db,
            samples_per_bit,
            rng,
            last_report: None,
        }
    }

    /// The target SNR in dB.
    pub fn snr_db(&self) -> f64 {
        self.snr_db
    }

    /// Diagnostics of the most recent transmission.
    pub fn last_report(&self) -> Option<NoiseReport> {
        self.last_report
    }

    /// Mean square power of a waveform.
    pub fn signal_power(samples: &[f64]) -> f64 {
        samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64
    }
}

impl ChannelModel for AwgnChannel {
    fn transmit(&mut self, samples: &[f64]) -> Result<Vec<f64>, ChainError> {
        check_signal(samples)?;

        let signal_power = Self::signal_power(samples);
        let target_noise_power = signal_power / 10f64.powf(self.snr_db / 10.0);
        let sigma = target_noise_power.sqrt();
        let normal = Normal::new(0.0, sigma)
            .map_err(|e| ChainError::InvalidSignal(format!("noise sigma {sigma}: {e}")))?;

        let mut noisy = Vec::with_capacity(samples.len());
        let mut noise_energy = 0.0;
        for &sample in samples {
            let noise = normal.sample(&mut self.rng);
            noise_energy += noise * noise;
            noisy.push(sample + noise);
        }

        let noise_power = noise_energy / samples.len() as f64;
        let snr_db = 10.0 * (signal_power / noise_power).log10();
        let eb_n0_db = snr_db + 10.0 * (self.samples_per_bit as f64 / 2.0).log10();
        let report = NoiseReport {
            signal_power,
            noise_power,
            snr_db,
            eb_n0_db,
        };
        debug!(
            signal_power,
            noise_power, snr_db, eb_n0_db, "awgn transmission"
        );
        self.last_report = Some(report);

        Ok(noisy)
    }
}
