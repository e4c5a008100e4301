//! Simulator — One transmission chain run, and SNR sweeps over many
//!
//! Wires a bit source, the optional repetition codec, the line encoder, the
//! selected channel impairments and the line decoder into one run, then
//! compares sent and received bits into a BER. Every block is a push stage
//! (probes included, attached via `connect`); one emission from the source
//! head drives the whole cascade. Every run builds its own components: each
//! holds its own random source and its own buffers, so any number of runs
//! can execute concurrently without sharing state — [`sweep_snr`] relies on
//! exactly that to fan runs out across worker threads.
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::modulation::{ModulationParams, ModulationScheme};
//! use linesim_core::simulator::{ChannelSpec, MessageSpec, SimulationConfig, Simulator};
//!
//! let config = SimulationConfig {
//!     message: MessageSpec::Fixed("0111000111001".into()),
//!     modulation: ModulationParams::new(ModulationScheme::Nrz, 0.0, 1.0, 30).unwrap(),
//!     channel: ChannelSpec::Ideal,
//!     ..SimulationConfig::default()
//! };
//! let report = Simulator::new(config).run().unwrap();
//! assert_eq!(report.ber, 0.0);
//! assert_eq!(report.received, report.sent);
//! ```

use crate::awgn::{AwgnChannel, NoiseReport};
use crate::ber::{bit_error_rate, count_errors, BerSweep, LengthPolicy};
use crate::channel::{ChannelModel, ChannelStage, IdentityChannel};
use crate::error::ChainError;
use crate::line_decoder::{LineDecoder, TrailingPolicy};
use crate::line_encoder::LineEncoder;
use crate::modulation::ModulationParams;
use crate::multipath::{MultipathChannel, MultipathProfile};
use crate::pipeline::{CollectSink, Node, Sink, SourceNode, Transform};
use crate::probe::{BitProbe, WaveformProbe};
use crate::repetition::{RepetitionDecoder, RepetitionEncoder};
use crate::source::{BitSource, FixedSource, RandomSource};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// Noise stage that keeps its channel reachable after the cascade has
/// consumed the node, so the run can read the realized noise figures.
struct SharedAwgn(Rc<RefCell<AwgnChannel>>);

impl Transform for SharedAwgn {
    type In = f64;
    type Out = f64;

    fn apply(&mut self, input: &[f64]) -> Result<Vec<f64>, ChainError> {
        self.0.borrow_mut().transmit(input)
    }
}

/// The logical message of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSpec {
    /// A literal `0`/`1` string, replayed verbatim.
    Fixed(String),
    /// A uniformly random message of the given length.
    Random { length: usize },
}

impl Default for MessageSpec {
    fn default() -> Self {
        MessageSpec::Random { length: 100 }
    }
}

/// The channel impairments of a run. The simulator composes multipath
/// before noise, matching a physical chain where echoes form in the medium
/// and noise enters at the receiver front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChannelSpec {
    /// No impairment.
    Ideal,
    /// Additive white Gaussian noise at a target SNR.
    Awgn { snr_db: f64 },
    /// Delayed, attenuated echoes.
    Multipath { paths: Vec<(usize, f64)> },
    /// Echoes followed by noise.
    MultipathAwgn {
        paths: Vec<(usize, f64)>,
        snr_db: f64,
    },
}

impl Default for ChannelSpec {
    fn default() -> Self {
        ChannelSpec::Ideal
    }
}

/// Full configuration of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Message to transmit.
    pub message: MessageSpec,
    /// Seed for the run's random sources (message and noise); `None` draws
    /// from entropy.
    pub seed: Option<u64>,
    /// Line-coding parameters, shared by encoder and decoder.
    pub modulation: ModulationParams,
    /// Channel impairments.
    pub channel: ChannelSpec,
    /// Wrap the message in the rate-1/3 repetition code.
    pub repetition: bool,
    /// Demodulator policy for a trailing partial window.
    pub trailing: TrailingPolicy,
    /// BER policy for unequal sent/received lengths.
    pub length_policy: LengthPolicy,
    /// Log the intermediate sequences through probes.
    pub probes: bool,
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Message bits handed to the chain.
    pub sent: Vec<bool>,
    /// Bits delivered by the chain.
    pub received: Vec<bool>,
    /// Mismatch fraction.
    pub ber: f64,
    /// Absolute mismatch count.
    pub errors: usize,
    /// Noise diagnostics when the channel added noise.
    pub noise: Option<NoiseReport>,
}

/// One transmission chain, built fresh from its configuration per run.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    /// Create a simulator for the given configuration.
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// The configuration this simulator runs.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Execute one complete chain run.
    ///
    /// The chain is wired as a push cascade: every block is a [`Node`]
    /// (probes attached via `connect`), built tail-first so ownership flows
    /// upstream, and one `emit` on the source head drives the whole run.
    pub fn run(&self) -> Result<SimulationReport, ChainError> {
        let cfg = &self.config;
        let params = cfg.modulation;
        let spb = params.samples_per_bit();

        // Destination and, when coding is on, the repetition decoder.
        let destination = CollectSink::new();
        let received_handle = destination.handle();
        let bits_sink: Box<dyn Sink<bool>> = if cfg.repetition {
            let mut node = Node::new(RepetitionDecoder::default());
            node.connect(Box::new(destination));
            if cfg.probes {
                node.connect(Box::new(BitProbe::new("destination")));
            }
            Box::new(node)
        } else {
            Box::new(destination)
        };

        let mut decoder = Node::new(LineDecoder::with_policy(params, cfg.trailing));
        decoder.connect(bits_sink);
        if cfg.probes && !cfg.repetition {
            decoder.connect(Box::new(BitProbe::new("destination")));
        }
        let decoder_sink: Box<dyn Sink<f64>> = Box::new(decoder);

        // Channel stage(s). The noisy channel stays reachable through a
        // shared handle so the run can surface its diagnostics afterwards.
        let mut noise_handle: Option<Rc<RefCell<AwgnChannel>>> = None;
        let mut shared_awgn = |snr_db: f64| {
            let channel = Rc::new(RefCell::new(AwgnChannel::new(snr_db, spb, cfg.seed)));
            noise_handle = Some(Rc::clone(&channel));
            SharedAwgn(channel)
        };
        let channel_sink: Box<dyn Sink<f64>> = match &cfg.channel {
            ChannelSpec::Ideal => {
                let mut node = Node::new(ChannelStage(IdentityChannel));
                node.connect(decoder_sink);
                if cfg.probes {
                    node.connect(Box::new(WaveformProbe::new("received")));
                }
                Box::new(node)
            }
            ChannelSpec::Awgn { snr_db } => {
                let mut node = Node::new(shared_awgn(*snr_db));
                node.connect(decoder_sink);
                if cfg.probes {
                    node.connect(Box::new(WaveformProbe::new("received")));
                }
                Box::new(node)
            }
            ChannelSpec::Multipath { paths } => {
                let profile = MultipathProfile::from_pairs(paths)?;
                let mut node = Node::new(MultipathChannel::new(profile));
                node.connect(decoder_sink);
                if cfg.probes {
                    node.connect(Box::new(WaveformProbe::new("received")));
                }
                Box::new(node)
            }
            ChannelSpec::MultipathAwgn { paths, snr_db } => {
                let mut awgn = Node::new(shared_awgn(*snr_db));
                awgn.connect(decoder_sink);
                if cfg.probes {
                    awgn.connect(Box::new(WaveformProbe::new("received")));
                }
                let profile = MultipathProfile::from_pairs(paths)?;
                let mut node = Node::new(MultipathChannel::new(profile));
                node.connect(Box::new(awgn));
                Box::new(node)
            }
        };

        let mut encoder = Node::new(LineEncoder::new(params));
        encoder.connect(channel_sink);
        if cfg.probes {
            encoder.connect(Box::new(WaveformProbe::new("transmitted")));
        }
        let encoder_sink: Box<dyn Sink<bool>> = Box::new(encoder);

        let head_sink: Box<dyn Sink<bool>> = if cfg.repetition {
            let mut node = Node::new(RepetitionEncoder::default());
            node.connect(encoder_sink);
            Box::new(node)
        } else {
            encoder_sink
        };

        // Source head: one emit drives the whole cascade.
        let source: Box<dyn BitSource> = match &cfg.message {
            MessageSpec::Fixed(message) => Box::new(FixedSource::new(message)?),
            MessageSpec::Random { length } => Box::new(RandomSource::new(*length, cfg.seed)),
        };
        let mut head = SourceNode::new(source);
        let sent_collect = CollectSink::new();
        let sent_handle = sent_collect.handle();
        head.connect(Box::new(sent_collect));
        if cfg.probes {
            head.connect(Box::new(BitProbe::new("source")));
        }
        head.connect(head_sink);
        head.emit()?;

        let sent = sent_handle.borrow().clone();
        let received = received_handle.borrow().clone();
        let noise = noise_handle.and_then(|channel| channel.borrow().last_report());

        let ber = bit_error_rate(&sent, &received, cfg.length_policy)?;
        let errors = count_errors(&sent, &received);
        info!(
            scheme = %params.scheme(),
            bits = sent.len(),
            errors,
            ber,
            "simulation run complete"
        );

        Ok(SimulationReport {
            sent,
            received,
            ber,
            errors,
            noise,
        })
    }
}

/// Configuration of an SNR-vs-BER sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Line-coding parameters of every run.
    pub modulation: ModulationParams,
    /// Random message length per run.
    pub message_bits: usize,
    /// Independent runs averaged per SNR point (seeded 1..=runs).
    pub runs_per_point: usize,
    /// Lowest SNR to measure, in dB.
    pub snr_min_db: f64,
    /// Highest SNR to measure, in dB.
    pub snr_max_db: f64,
    /// Spacing between SNR points, in dB.
    pub snr_step_db: f64,
    /// Wrap every run in the repetition code.
    pub repetition: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            modulation: ModulationParams::default(),
            message_bits: 300,
            runs_per_point: 10,
            snr_min_db: -10.0,
            snr_max_db: 10.0,
            snr_step_db: 1.0,
            repetition: false,
        }
    }
}

/// Measure BER against SNR over an AWGN channel.
///
/// SNR points run from the highest down to the lowest. Each point averages
/// `runs_per_point` independent runs with distinct seeds; runs execute in
/// parallel, which is sound because every run owns all of its state.
pub fn sweep_snr(config: &SweepConfig) -> Result<BerSweep, ChainError> {
    if config.message_bits == 0 {
        return Err(ChainError::InvalidSignal(
            "sweep message length must be greater than zero".to_string(),
        ));
    }
    if config.runs_per_point == 0 {
        return Err(ChainError::InvalidSignal(
            "sweep needs at least one run per SNR point".to_string(),
        ));
    }
    if !(config.snr_step_db > 0.0) {
        return Err(ChainError::InvalidSignal(
            "sweep SNR step must be positive".to_string(),
        ));
    }

    // Points computed by index, not by repeated subtraction: accumulated
    // rounding must not drop the final snr_min_db point.
    let mut snrs = Vec::new();
    for i in 0.. {
        let snr = config.snr_max_db - i as f64 * config.snr_step_db;
        if snr < config.snr_min_db - 1e-9 {
            break;
        }
        snrs.push(snr);
    }

    let points = snrs
        .par_iter()
        .map(|&snr_db| {
            let mut errors = 0u64;
            let mut bits = 0u64;
            for run in 0..config.runs_per_point {
                let simulator = Simulator::new(SimulationConfig {
                    message: MessageSpec::Random {
                        length: config.message_bits,
                    },
                    seed: Some(run as u64 + 1),
                    modulation: config.modulation,
                    channel: ChannelSpec::Awgn { snr_db },
                    repetition: config.repetition,
                    ..SimulationConfig::default()
                });
                let report = simulator.run()?;
                errors += report.errors as u64;
                bits += report.sent.len() as u64;
            }
            Ok((snr_db, errors, bits))
        })
        .collect::<Result<Vec<_>, ChainError>>()?;

    let mut sweep = BerSweep::new(config.modulation.scheme().name());
    for (snr_db, errors, bits) in points {
        sweep.add_point(snr_db, errors as f64 / bits as f64, bits, errors);
    }
    Ok(sweep)
}
