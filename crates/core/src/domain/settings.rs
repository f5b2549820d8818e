//! Throttled effect settings for the render path
//!
//! The pipeline never talks to a settings backend per sample. It keeps a
//! plain value snapshot of every flag and volume it needs and re-reads
//! the backend at most once every three seconds. Between refreshes the
//! snapshot is authoritative even if stale; this bounds the cost of
//! settings lookups on the hot path and trades a few seconds of
//! visibility for latency.

use std::time::{Duration, Instant};

use tracing::trace;

/// Minimum wall-clock time between effective snapshot refreshes.
pub const SETTINGS_REFRESH_INTERVAL: Duration = Duration::from_secs(3);

/// Boolean settings keys consumed by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolSetting {
    /// Master switch for the filter chains
    RadioEffects,
    /// Hard-clip ahead of the band-limiting stages
    RadioEffectsClipping,
    NatoTone,
    HaveQuickTone,
    BackgroundNoise,
}

/// Floating-point settings keys consumed by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatSetting {
    NatoToneVolume,
    HaveQuickToneVolume,
    FmNoiseVolume,
    HfNoiseVolume,
    VhfNoiseVolume,
    UhfNoiseVolume,
}

/// Source of user-configured effect parameters
///
/// Getters must be synchronous and non-blocking; they are called in a
/// burst once per refresh interval from the audio thread. The backing
/// store may be written concurrently by other threads; the pipeline
/// only requires eventual visibility within the refresh interval.
pub trait SettingsProvider: Send + Sync {
    fn bool_setting(&self, key: BoolSetting) -> bool;
    fn float_setting(&self, key: FloatSetting) -> f32;
}

/// Value snapshot of every effect parameter the pipeline reads
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsSnapshot {
    pub radio_effects: bool,
    pub clipping: bool,
    pub nato_tone: bool,
    pub have_quick_tone: bool,
    pub background_noise: bool,
    pub nato_tone_volume: f64,
    pub have_quick_tone_volume: f64,
    pub fm_noise_volume: f64,
    pub hf_noise_volume: f64,
    pub vhf_noise_volume: f64,
    pub uhf_noise_volume: f64,
}

impl SettingsSnapshot {
    /// Read every field from the provider in one burst.
    pub fn read_from(provider: &dyn SettingsProvider) -> Self {
        Self {
            radio_effects: provider.bool_setting(BoolSetting::RadioEffects),
            clipping: provider.bool_setting(BoolSetting::RadioEffectsClipping),
            nato_tone: provider.bool_setting(BoolSetting::NatoTone),
            have_quick_tone: provider.bool_setting(BoolSetting::HaveQuickTone),
            background_noise: provider.bool_setting(BoolSetting::BackgroundNoise),
            nato_tone_volume: provider.float_setting(FloatSetting::NatoToneVolume).into(),
            have_quick_tone_volume: provider
                .float_setting(FloatSetting::HaveQuickToneVolume)
                .into(),
            fm_noise_volume: provider.float_setting(FloatSetting::FmNoiseVolume).into(),
            hf_noise_volume: provider.float_setting(FloatSetting::HfNoiseVolume).into(),
            vhf_noise_volume: provider.float_setting(FloatSetting::VhfNoiseVolume).into(),
            uhf_noise_volume: provider.float_setting(FloatSetting::UhfNoiseVolume).into(),
        }
    }
}

/// Snapshot plus the timestamp guard that throttles re-reads
#[derive(Debug)]
pub struct ThrottledSettings {
    snapshot: SettingsSnapshot,
    last_refresh: Instant,
}

impl ThrottledSettings {
    /// Take an eager first snapshot from the provider.
    pub fn new(provider: &dyn SettingsProvider) -> Self {
        Self {
            snapshot: SettingsSnapshot::read_from(provider),
            last_refresh: Instant::now(),
        }
    }

    /// Re-read the provider if the refresh interval has elapsed;
    /// otherwise a cheap timestamp compare and nothing else.
    pub fn refresh(&mut self, provider: &dyn SettingsProvider) {
        self.refresh_at(provider, Instant::now());
    }

    fn refresh_at(&mut self, provider: &dyn SettingsProvider, now: Instant) {
        if now.duration_since(self.last_refresh) < SETTINGS_REFRESH_INTERVAL {
            return;
        }
        self.last_refresh = now;
        self.snapshot = SettingsSnapshot::read_from(provider);
        trace!(snapshot = ?self.snapshot, "effect settings refreshed");
    }

    pub fn current(&self) -> &SettingsSnapshot {
        &self.snapshot
    }
}
