//! # Digital Transmission Chain Simulation Library
//!
//! This crate simulates a point-to-point digital transmission over an
//! imperfect medium: a logical message is line-coded into an analog
//! waveform, degraded by a configurable channel, then demodulated back into
//! bits whose error rate measures the chain's quality.
//!
//! ## Overview
//!
//! The library implements every block of the chain:
//!
//! - **Line Coding**: NRZ, NRZT and RZ waveform generation and decision
//! - **Channel Models**: ideal, additive white Gaussian noise, multipath echoes
//! - **Forward Error Correction**: rate-1/3 repetition code with an explicit
//!   decision automaton
//! - **Evaluation**: bit error rate, SNR sweeps, CSV export
//! - **Pipeline**: push-based stage wiring with connectable probes
//!
//! ## Signal Flow
//!
//! ```text
//! TX: Bits → [Repetition Encode] → Line Encode → Channel (echoes, noise)
//! RX: Samples → Line Decode → [Repetition Decode] → Bits → BER
//! ```
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::modulation::{ModulationParams, ModulationScheme};
//! use linesim_core::simulator::{ChannelSpec, MessageSpec, SimulationConfig, Simulator};
//!
//! let config = SimulationConfig {
//!     message: MessageSpec::Random { length: 300 },
//!     seed: Some(42),
//!     modulation: ModulationParams::new(ModulationScheme::Nrzt, 0.0, 1.0, 30).unwrap(),
//!     channel: ChannelSpec::Awgn { snr_db: 8.0 },
//!     repetition: true,
//!     ..SimulationConfig::default()
//! };
//! let report = Simulator::new(config).run().unwrap();
//! println!("BER = {}", report.ber);
//! ```

pub mod awgn;
pub mod ber;
pub mod channel;
pub mod error;
pub mod line_decoder;
pub mod line_encoder;
pub mod modulation;
pub mod multipath;
pub mod pipeline;
pub mod probe;
pub mod repetition;
pub mod simulator;
pub mod source;

// Re-export main types
pub use awgn::{AwgnChannel, NoiseReport};
pub use ber::{bit_error_rate, BerPoint, BerSweep, LengthPolicy};
pub use channel::{ChannelChain, ChannelModel, ChannelStage, IdentityChannel};
pub use error::ChainError;
pub use line_decoder::{LineDecoder, TrailingPolicy};
pub use line_encoder::LineEncoder;
pub use modulation::{ModulationParams, ModulationScheme};
pub use multipath::{EchoPath, MultipathChannel, MultipathProfile};
pub use pipeline::{CollectSink, Node, Sink, SinkId, SourceNode, Transform};
pub use probe::{BitProbe, WaveformProbe};
pub use repetition::{RepetitionCodec, RepetitionDecoder, RepetitionEncoder};
pub use simulator::{
    sweep_snr, ChannelSpec, MessageSpec, SimulationConfig, SimulationReport, Simulator,
    SweepConfig,
};
pub use source::{BitSource, FixedSource, RandomSource};
