//! Domain entities and business rules

pub mod audio;
pub mod dsp;
pub mod pipeline;
pub mod settings;
pub mod tracks;

// Re-export specific items to avoid ambiguous glob imports
pub use audio::{EffectsError, Modulation, NoiseBand, SampleWindow, OUTPUT_SAMPLE_RATE};
pub use dsp::{
    BiquadCoeffs, BiquadFilter, IntercomFilterChain, RadioFilterChain, BAND_STAGE_BOOST,
    CLIP_MAX, CLIP_MIN,
};
pub use pipeline::EffectsPipeline;
pub use settings::{
    BoolSetting, FloatSetting, SettingsProvider, SettingsSnapshot, ThrottledSettings,
    SETTINGS_REFRESH_INTERVAL,
};
pub use tracks::{EffectTrack, PlaybackCursor, TrackKind, TrackLibrary, TONE_RESYNC_HOLD_CHANCE};
