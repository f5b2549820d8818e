//! WAV-backed effect track loading
//!
//! Decodes the tone/noise clips from disk and installs them into the
//! shared `TrackLibrary`. Loading runs out-of-band (blocking decode on
//! the tokio blocking pool); the pipeline never triggers or awaits it,
//! it only polls the library slots. A missing or undecodable clip is
//! logged and skipped, and the corresponding effect simply stays absent.

use std::path::Path;

use squelch_core::domain::audio::EffectsError;
use squelch_core::domain::tracks::{TrackKind, TrackLibrary};
use squelch_core::domain::OUTPUT_SAMPLE_RATE;
use thiserror::Error;
use tracing::{debug, info, warn};

pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors that can occur while decoding or installing an effect track
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Install(#[from] EffectsError),
}

/// File name of the clip backing a track kind, relative to the
/// effects directory.
pub fn track_file_name(kind: TrackKind) -> &'static str {
    match kind {
        TrackKind::NatoTone => "nato-tone.wav",
        TrackKind::HaveQuickTone => "have-quick-tone.wav",
        TrackKind::FmNoise => "fm-noise.wav",
        TrackKind::HfNoise => "hf-noise.wav",
        TrackKind::VhfNoise => "vhf-noise.wav",
        TrackKind::UhfNoise => "uhf-noise.wav",
    }
}

/// Decode a WAV file into normalized f64 samples, downmixing
/// multi-channel clips to mono by averaging.
pub fn decode_wav(path: &Path) -> Result<Vec<f64>> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    if spec.sample_rate != OUTPUT_SAMPLE_RATE {
        // Tracks are mixed sample-for-sample at the render rate; a
        // mismatched clip plays pitch-shifted rather than resampled.
        warn!(
            path = %path.display(),
            rate = spec.sample_rate,
            expected = OUTPUT_SAMPLE_RATE,
            "effect clip sample rate differs from render rate"
        );
    }

    let channels = spec.channels.max(1) as usize;
    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = f64::from(1_u32 << (spec.bits_per_sample - 1));
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    if channels == 1 {
        return Ok(interleaved);
    }

    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect())
}

/// Load every clip found under `dir` into the library.
///
/// Returns the number of tracks installed. Absent files are skipped
/// silently (debug-logged); decode and install failures are logged and
/// skipped so a single bad clip never takes down the rest.
pub async fn load_into(library: &TrackLibrary, dir: &Path) -> usize {
    let mut loaded = 0;

    for kind in TrackKind::ALL {
        let path = dir.join(track_file_name(kind));
        if !path.exists() {
            debug!(path = %path.display(), ?kind, "effect clip not present");
            continue;
        }

        let decode_path = path.clone();
        let decoded = tokio::task::spawn_blocking(move || decode_wav(&decode_path)).await;

        let samples = match decoded {
            Ok(Ok(samples)) => samples,
            Ok(Err(e)) => {
                warn!(path = %path.display(), error = %e, "failed to decode effect clip");
                continue;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "effect clip decode task failed");
                continue;
            }
        };

        match library.install(kind, samples) {
            Ok(()) => {
                info!(path = %path.display(), ?kind, "effect clip loaded");
                loaded += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to install effect clip");
            }
        }
    }

    loaded
}
