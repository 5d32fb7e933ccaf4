//! Subtone CLI - offline WAV processor
//!
//! Drives the enhancer over WAV files: set the six knobs on the command
//! line or load them from a JSON preset, process, and optionally print a
//! level analysis of the result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;

use subtone::audio::io;
use subtone::audio::verification::AudioAnalysis;
use subtone::{Enhancer, ParamId, Params};

#[derive(Parser)]
#[command(name = "subtone-cli", version, about = "Sub-bass enhancement effect")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the enhancer
    Process {
        /// Input WAV file (mono or stereo)
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file (32-bit float)
        #[arg(short, long)]
        output: PathBuf,

        /// Load all six knobs from a JSON preset first
        #[arg(long)]
        preset: Option<PathBuf>,

        /// Sub-octave voicing amount (0..1)
        #[arg(long)]
        sub_amount: Option<f32>,

        /// Sub-octave output level (0..1)
        #[arg(long)]
        sub_gain: Option<f32>,

        /// Tilt EQ balance (0..1, 0.5 = flat)
        #[arg(long)]
        tilt: Option<f32>,

        /// Output lowpass amount (0..1, 1 = open)
        #[arg(long)]
        lowpass: Option<f32>,

        /// Tilt split frequency (0..1 -> 30..800 Hz)
        #[arg(long)]
        split_freq: Option<f32>,

        /// Output trim (0..1 -> -18..+18 dB)
        #[arg(long)]
        output_gain: Option<f32>,

        /// Save the effective knob values as a JSON preset
        #[arg(long)]
        save_preset: Option<PathBuf>,

        /// Print a level analysis of the processed audio
        #[arg(long)]
        analyze: bool,
    },

    /// Show the six parameters with their current display values
    Params {
        /// JSON preset to display instead of the defaults
        #[arg(long)]
        preset: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Process {
            input,
            output,
            preset,
            sub_amount,
            sub_gain,
            tilt,
            lowpass,
            split_freq,
            output_gain,
            save_preset,
            analyze,
        } => {
            let mut enhancer = Enhancer::new();

            if let Some(path) = preset {
                enhancer.set_params(load_preset(&path)?);
            }
            let overrides = [
                (ParamId::SubAmount, sub_amount),
                (ParamId::SubGain, sub_gain),
                (ParamId::Tilt, tilt),
                (ParamId::Lowpass, lowpass),
                (ParamId::SplitFreq, split_freq),
                (ParamId::OutputGain, output_gain),
            ];
            for (id, value) in overrides {
                if let Some(value) = value {
                    enhancer.set_parameter(id, value);
                }
            }

            if let Some(path) = save_preset {
                save_preset_file(enhancer.params(), &path)?;
                println!("Preset saved: {}", path.display());
            }

            let mut buffer = io::load_wav(&input)
                .with_context(|| format!("loading {}", input.display()))?;
            info!(
                "processing {} ({} ch @ {} Hz, {:.2}s)",
                input.display(),
                buffer.channels(),
                buffer.sample_rate(),
                buffer.duration()
            );

            enhancer.configure(buffer.sample_rate() as f32);
            enhancer
                .process_buffer(&mut buffer)
                .context("processing audio")?;

            io::save_wav(&buffer, &output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Wrote {}", output.display());

            if analyze {
                println!("{}", AudioAnalysis::analyze(&buffer).summary());
            }
            Ok(())
        }

        Commands::Params { preset } => {
            let params = match preset {
                Some(path) => load_preset(&path)?,
                None => Params::default(),
            };
            for id in ParamId::ALL {
                println!(
                    "{:<10} {:>6.3}  {}",
                    id.name(),
                    params.get(id),
                    params.display_value(id)
                );
            }
            Ok(())
        }
    }
}

fn load_preset(path: &Path) -> Result<Params> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading preset {}", path.display()))?;
    let params: Params = serde_json::from_str(&text)
        .with_context(|| format!("parsing preset {}", path.display()))?;
    // Route through the clamping setters so hostile presets stay in range
    let mut clamped = Params::default();
    for id in ParamId::ALL {
        clamped.set(id, params.get(id));
    }
    Ok(clamped)
}

fn save_preset_file(params: &Params, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(params)?;
    std::fs::write(path, json).with_context(|| format!("writing preset {}", path.display()))?;
    Ok(())
}
