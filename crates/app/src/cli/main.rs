//! Squelch CLI: offline radio-effect rendering
//!
//! Reads a WAV file, runs it through the effects pipeline with a chosen
//! modulation/frequency/volume, and writes the processed result. Useful
//! for auditioning effect settings without a live audio route.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use squelch_core::domain::tracks::TrackLibrary;
use squelch_core::domain::{EffectsPipeline, Modulation, SampleWindow, OUTPUT_SAMPLE_RATE};
use squelch_infra::settings::{EffectsConfig, SharedSettingsStore};

/// Samples fed to the pipeline per call, matching a 20 ms render quantum.
const RENDER_CHUNK: usize = 960;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModulationArg {
    Am,
    Fm,
    HaveQuick,
    Mids,
    Satcom,
    Intercom,
}

impl From<ModulationArg> for Modulation {
    fn from(arg: ModulationArg) -> Self {
        match arg {
            ModulationArg::Am => Modulation::Am,
            ModulationArg::Fm => Modulation::Fm,
            ModulationArg::HaveQuick => Modulation::HaveQuick,
            ModulationArg::Mids => Modulation::Mids,
            ModulationArg::Satcom => Modulation::Satcom,
            ModulationArg::Intercom => Modulation::Intercom,
        }
    }
}

#[derive(Parser)]
#[command(name = "squelch")]
#[command(about = "Render a WAV file through the radio effects pipeline", long_about = None)]
struct Cli {
    /// Input WAV file
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// Simulated modulation
    #[arg(long, value_enum, default_value_t = ModulationArg::Am)]
    modulation: ModulationArg,

    /// Carrier frequency in MHz
    #[arg(long, default_value_t = 251.0)]
    frequency_mhz: f64,

    /// Output volume multiplier
    #[arg(long, default_value_t = 1.0)]
    volume: f32,

    /// Directory with the tone/noise effect clips
    #[arg(long)]
    tracks: Option<PathBuf>,

    /// Effect settings TOML file (defaults to the user config dir)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let config = load_settings(cli.settings.clone()).await;
    let store = Arc::new(SharedSettingsStore::new(config));

    let library = Arc::new(TrackLibrary::new());
    if let Some(dir) = &cli.tracks {
        let loaded = squelch_infra::tracks::load_into(&library, dir).await;
        tracing::info!(loaded, dir = %dir.display(), "effect clips loaded");
    }

    let (mut samples, spec) = read_input(&cli.input)?;
    if spec.sample_rate != OUTPUT_SAMPLE_RATE {
        tracing::warn!(
            rate = spec.sample_rate,
            expected = OUTPUT_SAMPLE_RATE,
            "input is not at the render rate; filters will be mistuned"
        );
    }
    if spec.channels != 1 {
        tracing::warn!(
            channels = spec.channels,
            "multi-channel input is processed as a single interleaved stream"
        );
    }

    let mut pipeline = EffectsPipeline::new(store, library);
    let modulation = Modulation::from(cli.modulation);
    let frequency_hz = cli.frequency_mhz * 1_000_000.0;

    let total = samples.len();
    let mut offset = 0;
    while offset < total {
        let count = RENDER_CHUNK.min(total - offset);
        let mut window = SampleWindow::new(&mut samples, offset, count);
        pipeline.process(&mut window, modulation, cli.volume, frequency_hz);
        offset += count;
    }

    write_output(&cli.output, &samples, &spec)?;
    tracing::info!(
        samples = total,
        output = %cli.output.display(),
        "render complete"
    );

    Ok(())
}

async fn load_settings(explicit: Option<PathBuf>) -> EffectsConfig {
    let path = explicit.or_else(|| EffectsConfig::default_path().ok());

    match path {
        Some(path) if path.exists() => match EffectsConfig::load_from_file(&path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load settings, using defaults");
                EffectsConfig::default()
            }
        },
        _ => EffectsConfig::default(),
    }
}

fn read_input(path: &PathBuf) -> anyhow::Result<(Vec<f32>, hound::WavSpec)> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("opening input WAV {}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .context("decoding float samples")?,
        hound::SampleFormat::Int => {
            let scale = (1_u32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .context("decoding integer samples")?
        }
    };

    Ok((samples, spec))
}

fn write_output(path: &PathBuf, samples: &[f32], input_spec: &hound::WavSpec) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: input_spec.channels,
        sample_rate: input_spec.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("creating output WAV {}", path.display()))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize().context("finalizing output WAV")?;

    Ok(())
}
