//! Integration tests for the effects pipeline
//!
//! These tests verify the complete path from the infra collaborators
//! (settings store, WAV-loaded effect clips) through the core pipeline,
//! covering the end-to-end scenarios a live radio route exercises.

use std::sync::Arc;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use squelch_core::domain::settings::{BoolSetting, FloatSetting};
use squelch_core::domain::tracks::{TrackKind, TrackLibrary};
use squelch_core::domain::{EffectsPipeline, Modulation, SampleWindow, OUTPUT_SAMPLE_RATE};
use squelch_infra::settings::{EffectsConfig, SharedSettingsStore};
use squelch_infra::tracks::{load_into, track_file_name};

/// Store with every effect disabled; individual tests switch on what
/// they exercise before the pipeline takes its initial snapshot.
fn silent_store() -> Arc<SharedSettingsStore> {
    let store = Arc::new(SharedSettingsStore::new(EffectsConfig::default()));
    store.set_bool(BoolSetting::RadioEffects, false);
    store.set_bool(BoolSetting::RadioEffectsClipping, false);
    store.set_bool(BoolSetting::NatoTone, false);
    store.set_bool(BoolSetting::HaveQuickTone, false);
    store.set_bool(BoolSetting::BackgroundNoise, false);
    store
}

fn seeded_pipeline(
    store: Arc<SharedSettingsStore>,
    tracks: Arc<TrackLibrary>,
) -> EffectsPipeline {
    EffectsPipeline::with_rng(store, tracks, Pcg32::seed_from_u64(99))
}

fn generate_sine(frequency: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            (2.0 * std::f32::consts::PI * frequency * i as f32 / OUTPUT_SAMPLE_RATE as f32).sin()
                * 0.5
        })
        .collect()
}

// ============================================================================
// PASSTHROUGH AND VOLUME
// ============================================================================

#[test]
fn test_disabled_effects_pass_through_with_volume() {
    let mut pipeline = seeded_pipeline(silent_store(), Arc::new(TrackLibrary::new()));

    let mut buffer = generate_sine(440.0, 256);
    let original = buffer.clone();
    let mut window = SampleWindow::full(&mut buffer);
    pipeline.process(&mut window, Modulation::Am, 0.25, 124_000_000.0);

    for (out, input) in buffer.iter().zip(&original) {
        assert_eq!(*out, input * 0.25);
    }
}

#[test]
fn test_volume_applies_to_direct_wire_path_too() {
    let mut pipeline = seeded_pipeline(silent_store(), Arc::new(TrackLibrary::new()));

    let mut buffer = generate_sine(440.0, 64);
    let original = buffer.clone();
    let mut window = SampleWindow::full(&mut buffer);
    // Radio effects off: the intercom chain is skipped, the volume is not.
    pipeline.process(&mut window, Modulation::Intercom, 0.5, 0.0);

    for (out, input) in buffer.iter().zip(&original) {
        assert_eq!(*out, input * 0.5);
    }
}

// ============================================================================
// FILTERED PATHS
// ============================================================================

#[test]
fn test_standard_path_output_is_bounded() {
    let store = silent_store();
    store.set_bool(BoolSetting::RadioEffects, true);
    store.set_bool(BoolSetting::RadioEffectsClipping, true);

    let mut pipeline = seeded_pipeline(store, Arc::new(TrackLibrary::new()));

    let mut buffer: Vec<f32> = (0..1024).map(|i| if i % 2 == 0 { 3.0 } else { -3.0 }).collect();
    let mut window = SampleWindow::full(&mut buffer);
    pipeline.process(&mut window, Modulation::Am, 1.0, 124_000_000.0);

    for out in &buffer {
        assert!(out.is_finite());
        assert!((-1.0..=1.0).contains(out));
    }
}

#[test]
fn test_intercom_path_shapes_the_signal() {
    let store = silent_store();
    store.set_bool(BoolSetting::RadioEffects, true);

    let mut pipeline = seeded_pipeline(store, Arc::new(TrackLibrary::new()));

    // 40 Hz rumble sits far below the 520 Hz double high-pass.
    let mut buffer = generate_sine(40.0, 4096);
    let mut window = SampleWindow::full(&mut buffer);
    pipeline.process(&mut window, Modulation::Mids, 1.0, 0.0);

    let tail = &buffer[2048..];
    let rms = (tail.iter().map(|s| s * s).sum::<f32>() / tail.len() as f32).sqrt();
    assert!(rms < 0.05, "rumble rms {rms}");
}

#[test]
fn test_filter_state_continues_across_buffers() {
    let store = silent_store();
    store.set_bool(BoolSetting::RadioEffects, true);

    // One pipeline fed 2x512 samples must match another fed 1x1024.
    let mut split = seeded_pipeline(Arc::clone(&store), Arc::new(TrackLibrary::new()));
    let mut whole = seeded_pipeline(store, Arc::new(TrackLibrary::new()));

    let signal = generate_sine(1000.0, 1024);

    let mut split_buffer = signal.clone();
    let mut window = SampleWindow::new(&mut split_buffer, 0, 512);
    split.process(&mut window, Modulation::Am, 1.0, 124_000_000.0);
    let mut window = SampleWindow::new(&mut split_buffer, 512, 512);
    split.process(&mut window, Modulation::Am, 1.0, 124_000_000.0);

    let mut whole_buffer = signal;
    let mut window = SampleWindow::full(&mut whole_buffer);
    whole.process(&mut window, Modulation::Am, 1.0, 124_000_000.0);

    for (a, b) in split_buffer.iter().zip(&whole_buffer) {
        assert_eq!(a, b);
    }
}

// ============================================================================
// EFFECT CLIPS LOADED FROM DISK
// ============================================================================

fn write_f32_wav(path: &std::path::Path, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: OUTPUT_SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

#[tokio::test]
async fn test_fm_tone_from_wav_clip() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    write_f32_wav(
        &temp_dir.path().join(track_file_name(TrackKind::NatoTone)),
        &[0.5, -0.5],
    );

    let library = Arc::new(TrackLibrary::new());
    assert_eq!(load_into(&library, temp_dir.path()).await, 1);

    let store = silent_store();
    store.set_bool(BoolSetting::NatoTone, true);
    store.set_float(FloatSetting::NatoToneVolume, 1.0);

    let mut pipeline = seeded_pipeline(store, library);

    let mut buffer = vec![0.0_f32; 4];
    let mut window = SampleWindow::full(&mut buffer);
    pipeline.process(&mut window, Modulation::Fm, 1.0, 32_000_000.0);

    for (out, expected) in buffer.iter().zip([0.5, -0.5, 0.5, -0.5]) {
        assert!((out - expected).abs() < 1e-6, "{out} vs {expected}");
    }
}

#[tokio::test]
async fn test_uhf_noise_from_wav_clip() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    write_f32_wav(
        &temp_dir.path().join(track_file_name(TrackKind::UhfNoise)),
        &[0.1],
    );

    let library = Arc::new(TrackLibrary::new());
    load_into(&library, temp_dir.path()).await;

    let store = silent_store();
    store.set_bool(BoolSetting::BackgroundNoise, true);
    store.set_float(FloatSetting::UhfNoiseVolume, 1.0);

    let mut pipeline = seeded_pipeline(store, library);

    let mut buffer = vec![0.0_f32; 3];
    let mut window = SampleWindow::full(&mut buffer);
    pipeline.process(&mut window, Modulation::Am, 1.0, 250_000_000.0);

    for out in &buffer {
        assert!((out - 0.1).abs() < 1e-6);
    }
}

#[tokio::test]
async fn test_missing_clips_degrade_to_silence() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let library = Arc::new(TrackLibrary::new());
    load_into(&library, temp_dir.path()).await;

    let store = silent_store();
    store.set_bool(BoolSetting::NatoTone, true);
    store.set_bool(BoolSetting::BackgroundNoise, true);

    let mut pipeline = seeded_pipeline(store, library);

    let mut buffer = vec![0.0_f32; 16];
    let mut window = SampleWindow::full(&mut buffer);
    pipeline.process(&mut window, Modulation::Fm, 1.0, 32_000_000.0);

    assert_eq!(buffer, vec![0.0; 16]);
}

// ============================================================================
// SETTINGS STALENESS
// ============================================================================

#[test]
fn test_settings_change_invisible_within_refresh_interval() {
    let store = silent_store();
    let mut pipeline = seeded_pipeline(Arc::clone(&store), Arc::new(TrackLibrary::new()));

    // Flip the master switch right after the pipeline's initial
    // snapshot; the change must not apply within the same interval.
    store.set_bool(BoolSetting::RadioEffects, true);

    let mut buffer = generate_sine(1000.0, 256);
    let original = buffer.clone();
    let mut window = SampleWindow::full(&mut buffer);
    pipeline.process(&mut window, Modulation::Am, 1.0, 124_000_000.0);

    assert_eq!(buffer, original);
}

// ============================================================================
// SHARED TRACKS, INDEPENDENT ROUTES
// ============================================================================

#[test]
fn test_concurrent_routes_do_not_share_cursors() {
    let tracks = Arc::new(TrackLibrary::new());
    tracks
        .install(TrackKind::NatoTone, vec![0.5, -0.5, 0.25])
        .unwrap();

    let store = silent_store();
    store.set_bool(BoolSetting::NatoTone, true);
    store.set_float(FloatSetting::NatoToneVolume, 1.0);

    let mut radio_a = seeded_pipeline(Arc::clone(&store), Arc::clone(&tracks));
    let mut radio_b = seeded_pipeline(store, tracks);

    // Advance route A by one sample; route B must still start at the
    // beginning of the tone.
    let mut warmup = vec![0.0_f32; 1];
    let mut window = SampleWindow::full(&mut warmup);
    radio_a.process(&mut window, Modulation::Fm, 1.0, 32_000_000.0);

    let mut buffer = vec![0.0_f32; 3];
    let mut window = SampleWindow::full(&mut buffer);
    radio_b.process(&mut window, Modulation::Fm, 1.0, 32_000_000.0);

    for (out, expected) in buffer.iter().zip([0.5, -0.5, 0.25]) {
        assert!((out - expected).abs() < 1e-6);
    }
}
