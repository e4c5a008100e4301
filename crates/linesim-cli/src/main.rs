//! Transmission Chain Simulator Command-Line Interface
//!
//! This CLI provides tools for:
//! - Running a single end-to-end transmission (source → line code →
//!   channel → decision → BER)
//! - Sweeping SNR over an AWGN channel and exporting the BER curve as CSV

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use linesim_core::ber::LengthPolicy;
use linesim_core::line_decoder::TrailingPolicy;
use linesim_core::modulation::{ModulationParams, ModulationScheme};
use linesim_core::simulator::{
    sweep_snr, ChannelSpec, MessageSpec, SimulationConfig, Simulator, SweepConfig,
};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "linesim")]
#[command(author, version, about = "Digital transmission chain simulator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one complete transmission and report the BER
    Run {
        /// Fixed message of 0/1 characters; omit for a random message
        #[arg(short, long)]
        message: Option<String>,

        /// Random message length when no fixed message is given
        #[arg(long, default_value = "100")]
        bits: usize,

        /// Line-coding scheme (NRZ, NRZT, RZ)
        #[arg(short, long, default_value = "NRZ")]
        scheme: String,

        /// Amplitude encoding a logical 0
        #[arg(long, default_value = "0.0")]
        amin: f64,

        /// Amplitude encoding a logical 1
        #[arg(long, default_value = "1.0")]
        amax: f64,

        /// Samples per bit
        #[arg(long, default_value = "30")]
        spb: usize,

        /// Add Gaussian noise at this SNR in dB
        #[arg(long)]
        snr: Option<f64>,

        /// Add an indirect path as delay:attenuation (repeatable, up to 5)
        #[arg(long = "path", value_name = "DELAY:ATT")]
        paths: Vec<String>,

        /// Seed for the message and noise generators
        #[arg(long)]
        seed: Option<u64>,

        /// Wrap the message in the rate-1/3 repetition code
        #[arg(long)]
        coded: bool,

        /// Reject a trailing partial demodulation window instead of
        /// deciding one extra bit from it
        #[arg(long)]
        strict: bool,

        /// Reject unequal sent/received lengths in the BER comparison
        /// instead of comparing up to the shorter sequence
        #[arg(long)]
        strict_length: bool,

        /// Log the intermediate sequences
        #[arg(long)]
        probes: bool,

        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Measure BER against SNR over an AWGN channel
    Sweep {
        /// Line-coding scheme (NRZ, NRZT, RZ)
        #[arg(short, long, default_value = "NRZ")]
        scheme: String,

        /// Amplitude encoding a logical 0
        #[arg(long, default_value = "0.0")]
        amin: f64,

        /// Amplitude encoding a logical 1
        #[arg(long, default_value = "1.0")]
        amax: f64,

        /// Samples per bit
        #[arg(long, default_value = "30")]
        spb: usize,

        /// Random message length per run
        #[arg(long, default_value = "300")]
        bits: usize,

        /// Independent runs averaged per SNR point
        #[arg(long, default_value = "10")]
        runs: usize,

        /// Lowest SNR in dB
        #[arg(long, default_value = "-10.0", allow_hyphen_values = true)]
        snr_min: f64,

        /// Highest SNR in dB
        #[arg(long, default_value = "10.0", allow_hyphen_values = true)]
        snr_max: f64,

        /// SNR spacing in dB
        #[arg(long, default_value = "1.0")]
        snr_step: f64,

        /// Wrap every run in the rate-1/3 repetition code
        #[arg(long)]
        coded: bool,

        /// Write the CSV curve to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            message,
            bits,
            scheme,
            amin,
            amax,
            spb,
            snr,
            paths,
            seed,
            coded,
            strict,
            strict_length,
            probes,
            json,
        } => cmd_run(
            message,
            bits,
            &scheme,
            amin,
            amax,
            spb,
            snr,
            &paths,
            seed,
            coded,
            strict,
            strict_length,
            probes,
            json,
        ),

        Commands::Sweep {
            scheme,
            amin,
            amax,
            spb,
            bits,
            runs,
            snr_min,
            snr_max,
            snr_step,
            coded,
            output,
        } => cmd_sweep(
            &scheme, amin, amax, spb, bits, runs, snr_min, snr_max, snr_step, coded, output,
        ),
    }
}

fn parse_modulation(scheme: &str, amin: f64, amax: f64, spb: usize) -> Result<ModulationParams> {
    let scheme: ModulationScheme = scheme
        .parse()
        .with_context(|| format!("invalid scheme {scheme:?}"))?;
    ModulationParams::new(scheme, amin, amax, spb).context("invalid modulation parameters")
}

/// Parse one `delay:attenuation` pair from the command line.
fn parse_path(spec: &str) -> Result<(usize, f64)> {
    let Some((delay, att)) = spec.split_once(':') else {
        bail!("path {spec:?} is not of the form DELAY:ATT");
    };
    let delay: usize = delay
        .parse()
        .with_context(|| format!("path delay {delay:?} is not a sample count"))?;
    let att: f64 = att
        .parse()
        .with_context(|| format!("path attenuation {att:?} is not a number"))?;
    Ok((delay, att))
}

fn trailing_policy(strict: bool) -> TrailingPolicy {
    if strict {
        TrailingPolicy::Strict
    } else {
        TrailingPolicy::Lenient
    }
}

fn length_policy(strict: bool) -> LengthPolicy {
    if strict {
        LengthPolicy::Strict
    } else {
        LengthPolicy::Truncate
    }
}

fn channel_spec(snr: Option<f64>, paths: &[String]) -> Result<ChannelSpec> {
    let paths = paths
        .iter()
        .map(|p| parse_path(p))
        .collect::<Result<Vec<_>>>()?;
    Ok(match (snr, paths.is_empty()) {
        (None, true) => ChannelSpec::Ideal,
        (Some(snr_db), true) => ChannelSpec::Awgn { snr_db },
        (None, false) => ChannelSpec::Multipath { paths },
        (Some(snr_db), false) => ChannelSpec::MultipathAwgn { paths, snr_db },
    })
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    message: Option<String>,
    bits: usize,
    scheme: &str,
    amin: f64,
    amax: f64,
    spb: usize,
    snr: Option<f64>,
    paths: &[String],
    seed: Option<u64>,
    coded: bool,
    strict: bool,
    strict_length: bool,
    probes: bool,
    json: bool,
) -> Result<()> {
    let config = SimulationConfig {
        message: match message {
            Some(message) => MessageSpec::Fixed(message),
            None => MessageSpec::Random { length: bits },
        },
        seed,
        modulation: parse_modulation(scheme, amin, amax, spb)?,
        channel: channel_spec(snr, paths)?,
        repetition: coded,
        trailing: trailing_policy(strict),
        length_policy: length_policy(strict_length),
        probes,
    };

    info!(?config, "starting simulation");
    let report = Simulator::new(config).run().context("simulation failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("bits sent:     {}", report.sent.len());
        println!("bits received: {}", report.received.len());
        println!("errors:        {}", report.errors);
        println!("BER:           {:.6}", report.ber);
        if let Some(noise) = report.noise {
            println!("realized SNR:  {:.2} dB", noise.snr_db);
            println!("Eb/N0:         {:.2} dB", noise.eb_n0_db);
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_sweep(
    scheme: &str,
    amin: f64,
    amax: f64,
    spb: usize,
    bits: usize,
    runs: usize,
    snr_min: f64,
    snr_max: f64,
    snr_step: f64,
    coded: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = SweepConfig {
        modulation: parse_modulation(scheme, amin, amax, spb)?,
        message_bits: bits,
        runs_per_point: runs,
        snr_min_db: snr_min,
        snr_max_db: snr_max,
        snr_step_db: snr_step,
        repetition: coded,
    };

    info!(?config, "starting sweep");
    let sweep = sweep_snr(&config).context("sweep failed")?;
    let csv = sweep.to_csv();

    match output {
        Some(path) => {
            fs::write(&path, csv).with_context(|| format!("writing {}", path.display()))?;
            println!(
                "wrote {} points to {}",
                sweep.points().len(),
                path.display()
            );
        }
        None => print!("{csv}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path() {
        assert_eq!(parse_path("30:0.5").unwrap(), (30, 0.5));
        assert!(parse_path("30").is_err());
        assert!(parse_path("x:0.5").is_err());
        assert!(parse_path("30:y").is_err());
    }

    #[test]
    fn test_channel_spec_selection() {
        assert_eq!(channel_spec(None, &[]).unwrap(), ChannelSpec::Ideal);
        assert_eq!(
            channel_spec(Some(5.0), &[]).unwrap(),
            ChannelSpec::Awgn { snr_db: 5.0 }
        );
        assert_eq!(
            channel_spec(None, &["2:0.5".into()]).unwrap(),
            ChannelSpec::Multipath {
                paths: vec![(2, 0.5)]
            }
        );
        assert!(matches!(
            channel_spec(Some(5.0), &["2:0.5".into()]).unwrap(),
            ChannelSpec::MultipathAwgn { .. }
        ));
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_strict_flags_parse_and_map() {
        let cli = Cli::try_parse_from(["linesim", "run", "--strict", "--strict-length"]).unwrap();
        let Commands::Run {
            strict,
            strict_length,
            ..
        } = cli.command
        else {
            panic!("expected the run subcommand");
        };
        assert!(strict);
        assert!(strict_length);
        assert_eq!(trailing_policy(strict), TrailingPolicy::Strict);
        assert_eq!(length_policy(strict_length), LengthPolicy::Strict);
    }

    #[test]
    fn test_policies_default_lenient() {
        let cli = Cli::try_parse_from(["linesim", "run"]).unwrap();
        let Commands::Run {
            strict,
            strict_length,
            ..
        } = cli.command
        else {
            panic!("expected the run subcommand");
        };
        assert_eq!(trailing_policy(strict), TrailingPolicy::Lenient);
        assert_eq!(length_policy(strict_length), LengthPolicy::Truncate);
    }
}
