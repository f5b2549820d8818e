//! Per-route effects pipeline orchestrator
//!
//! One `EffectsPipeline` is constructed per active output route (radio
//! or intercom channel) and lives for the duration of that route. It
//! owns every piece of mutable per-route state (filter delay lines,
//! track cursors, the throttled settings snapshot, the resync RNG) and
//! is driven synchronously from the audio render thread. Nothing here
//! blocks, locks, or allocates per sample.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::debug;

use crate::domain::audio::{Modulation, NoiseBand, SampleWindow, OUTPUT_SAMPLE_RATE};
use crate::domain::dsp::{IntercomFilterChain, RadioFilterChain, CLIP_MAX, CLIP_MIN};
use crate::domain::settings::{SettingsProvider, SettingsSnapshot, ThrottledSettings};
use crate::domain::tracks::{EffectTrack, PlaybackCursor, TrackKind, TrackLibrary};

/// One playback cursor per effect track, owned by the pipeline instance
/// so that concurrent routes never interfere.
#[derive(Debug, Default)]
struct CursorBank {
    nato_tone: PlaybackCursor,
    have_quick_tone: PlaybackCursor,
    fm_noise: PlaybackCursor,
    hf_noise: PlaybackCursor,
    vhf_noise: PlaybackCursor,
    uhf_noise: PlaybackCursor,
}

/// Mix a looping track into `audio`, or pass `audio` through untouched
/// while the track is absent.
#[inline]
fn mix_looped(audio: f64, track: &EffectTrack, cursor: &mut PlaybackCursor, volume: f64) -> f64 {
    match track.samples() {
        Some(samples) => audio + cursor.next_looped(samples) * volume,
        None => audio,
    }
}

/// Radio voice effects pipeline
///
/// The single public operation is [`process`](Self::process): transform
/// a sample window in place according to the modulation, carrier
/// frequency, and the current effect settings, then apply the output
/// volume.
pub struct EffectsPipeline {
    provider: Arc<dyn SettingsProvider>,
    tracks: Arc<TrackLibrary>,
    settings: ThrottledSettings,
    radio_chain: RadioFilterChain,
    intercom_chain: IntercomFilterChain,
    cursors: CursorBank,
    rng: Pcg32,
}

impl EffectsPipeline {
    pub fn new(provider: Arc<dyn SettingsProvider>, tracks: Arc<TrackLibrary>) -> Self {
        Self::with_rng(provider, tracks, Pcg32::from_entropy())
    }

    /// Construct with an explicit RNG for the secure-tone resync draw.
    /// Deterministic seeds make the 80/20 boundary behavior testable.
    pub fn with_rng(
        provider: Arc<dyn SettingsProvider>,
        tracks: Arc<TrackLibrary>,
        rng: Pcg32,
    ) -> Self {
        let sample_rate = f64::from(OUTPUT_SAMPLE_RATE);
        let settings = ThrottledSettings::new(provider.as_ref());
        debug!(sample_rate, "effects pipeline created");
        Self {
            provider,
            tracks,
            settings,
            radio_chain: RadioFilterChain::new(sample_rate),
            intercom_chain: IntercomFilterChain::new(sample_rate),
            cursors: CursorBank::default(),
            rng,
        }
    }

    /// Transform a sample window in place.
    ///
    /// Direct-wire modulations run the intercom chain (gated by the
    /// radio-effects flag); everything else runs the standard chain
    /// plus tone and background-noise injection. The uniform `volume`
    /// multiply always runs last, regardless of modulation or flags.
    pub fn process(
        &mut self,
        window: &mut SampleWindow<'_>,
        modulation: Modulation,
        volume: f32,
        frequency_hz: f64,
    ) {
        self.settings.refresh(self.provider.as_ref());

        if modulation.is_direct_wire() {
            if self.settings.current().radio_effects {
                self.apply_intercom_effect(window);
            }
        } else {
            self.apply_radio_effect(window, modulation, frequency_hz);
        }

        for sample in window.samples() {
            *sample *= volume;
        }
    }

    fn apply_intercom_effect(&mut self, window: &mut SampleWindow<'_>) {
        for sample in window.samples() {
            let raw = f64::from(*sample);
            // A non-finite result is dropped on the floor; the raw
            // sample stays in the buffer.
            if let Some(filtered) = self.intercom_chain.process_sample(raw) {
                *sample = filtered as f32;
            }
        }
    }

    fn apply_radio_effect(
        &mut self,
        window: &mut SampleWindow<'_>,
        modulation: Modulation,
        frequency_hz: f64,
    ) {
        let snapshot = *self.settings.current();

        for sample in window.samples() {
            let raw = f64::from(*sample);

            let mut audio = if snapshot.radio_effects {
                self.radio_chain.process_sample(raw, snapshot.clipping)
            } else {
                raw
            };

            audio = self.mix_tone(audio, modulation, &snapshot);
            audio = self.mix_background_noise(audio, modulation, frequency_hz, &snapshot);

            *sample = audio.clamp(CLIP_MIN, CLIP_MAX) as f32;
        }
    }

    fn mix_tone(&mut self, audio: f64, modulation: Modulation, s: &SettingsSnapshot) -> f64 {
        match modulation {
            Modulation::Fm if s.nato_tone => mix_looped(
                audio,
                self.tracks.track(TrackKind::NatoTone),
                &mut self.cursors.nato_tone,
                s.nato_tone_volume,
            ),
            Modulation::HaveQuick if s.have_quick_tone => {
                match self.tracks.track(TrackKind::HaveQuickTone).samples() {
                    Some(samples) => {
                        let rng = &mut self.rng;
                        let tone = self
                            .cursors
                            .have_quick_tone
                            .next_resynced(samples, || rng.gen::<f64>());
                        audio + tone * s.have_quick_tone_volume
                    }
                    None => audio,
                }
            }
            _ => audio,
        }
    }

    fn mix_background_noise(
        &mut self,
        audio: f64,
        modulation: Modulation,
        frequency_hz: f64,
        s: &SettingsSnapshot,
    ) -> f64 {
        if !s.background_noise {
            return audio;
        }

        match modulation {
            // AM-family traffic picks up band static chosen by the
            // carrier frequency.
            Modulation::Am | Modulation::HaveQuick => match NoiseBand::for_frequency(frequency_hz)
            {
                NoiseBand::Uhf => mix_looped(
                    audio,
                    self.tracks.track(TrackKind::UhfNoise),
                    &mut self.cursors.uhf_noise,
                    s.uhf_noise_volume,
                ),
                NoiseBand::Vhf => mix_looped(
                    audio,
                    self.tracks.track(TrackKind::VhfNoise),
                    &mut self.cursors.vhf_noise,
                    s.vhf_noise_volume,
                ),
                NoiseBand::Hf => mix_looped(
                    audio,
                    self.tracks.track(TrackKind::HfNoise),
                    &mut self.cursors.hf_noise,
                    s.hf_noise_volume,
                ),
            },
            // FM static is frequency-independent.
            Modulation::Fm => mix_looped(
                audio,
                self.tracks.track(TrackKind::FmNoise),
                &mut self.cursors.fm_noise,
                s.fm_noise_volume,
            ),
            _ => audio,
        }
    }
}
