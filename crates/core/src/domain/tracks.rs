//! Precomputed effect tracks and playback cursors
//!
//! Effect tracks are short tone/noise clips mixed additively into the
//! voice signal. They are loaded once (out-of-band, usually off the
//! audio thread), immutable afterwards, and shared by every pipeline
//! instance in the process. A track that has not finished loading is a
//! well-defined absent state, never an error: the effect is simply not
//! mixed until the slot is populated.

use std::sync::OnceLock;

use crate::domain::audio::{EffectsError, Result};

/// Chance that a secure-tone cursor reaching the end of its track holds
/// the final sample instead of resuming from the start. A uniform draw
/// above this threshold resumes the loop.
pub const TONE_RESYNC_HOLD_CHANCE: f64 = 0.8;

/// The track kinds the pipeline can mix in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// Identification tone heard on standard FM voice radios
    NatoTone,
    /// Sync tone of the frequency-hopping HAVE QUICK mode
    HaveQuickTone,
    FmNoise,
    HfNoise,
    VhfNoise,
    UhfNoise,
}

impl TrackKind {
    pub const ALL: [TrackKind; 6] = [
        TrackKind::NatoTone,
        TrackKind::HaveQuickTone,
        TrackKind::FmNoise,
        TrackKind::HfNoise,
        TrackKind::VhfNoise,
        TrackKind::UhfNoise,
    ];
}

/// Write-once slot holding a decoded effect clip
///
/// Readers only ever observe "absent" or "fully populated"; there is no
/// partially-loaded state and no locking once the slot is set.
#[derive(Debug, Default)]
pub struct EffectTrack {
    samples: OnceLock<Vec<f64>>,
}

impl EffectTrack {
    pub fn loaded(&self) -> bool {
        self.samples.get().is_some()
    }

    /// The clip samples, or `None` while the track is still absent.
    pub fn samples(&self) -> Option<&[f64]> {
        self.samples.get().map(Vec::as_slice)
    }

    fn install(&self, kind: TrackKind, samples: Vec<f64>) -> Result<()> {
        if samples.is_empty() {
            return Err(EffectsError::EmptyTrack(kind));
        }
        self.samples
            .set(samples)
            .map_err(|_| EffectsError::TrackAlreadyLoaded(kind))
    }
}

/// Process-wide set of effect tracks, one slot per [`TrackKind`]
///
/// Loading is the caller's concern (see `squelch-infra`); the pipeline
/// only polls [`EffectTrack::loaded`] and reads.
#[derive(Debug, Default)]
pub struct TrackLibrary {
    nato_tone: EffectTrack,
    have_quick_tone: EffectTrack,
    fm_noise: EffectTrack,
    hf_noise: EffectTrack,
    vhf_noise: EffectTrack,
    uhf_noise: EffectTrack,
}

impl TrackLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, kind: TrackKind) -> &EffectTrack {
        match kind {
            TrackKind::NatoTone => &self.nato_tone,
            TrackKind::HaveQuickTone => &self.have_quick_tone,
            TrackKind::FmNoise => &self.fm_noise,
            TrackKind::HfNoise => &self.hf_noise,
            TrackKind::VhfNoise => &self.vhf_noise,
            TrackKind::UhfNoise => &self.uhf_noise,
        }
    }

    /// Populate a track slot. Each slot accepts exactly one non-empty
    /// clip; a second install is an error, as is an empty clip.
    pub fn install(&self, kind: TrackKind, samples: Vec<f64>) -> Result<()> {
        self.track(kind).install(kind, samples)
    }
}

/// Playback position within an effect track
///
/// One cursor per track kind, owned exclusively by a pipeline instance
/// and advanced once per processed sample. Invariant: the position is
/// always within `[0, track length)` for the track it reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackCursor {
    position: usize,
}

impl PlaybackCursor {
    pub fn position(&self) -> usize {
        self.position
    }

    /// Take the sample under the cursor and advance, wrapping to the
    /// start of the track at the end.
    #[inline]
    pub fn next_looped(&mut self, samples: &[f64]) -> f64 {
        let value = samples[self.position];
        self.position += 1;
        if self.position == samples.len() {
            self.position = 0;
        }
        value
    }

    /// Take the sample under the cursor and advance with the secure-tone
    /// re-synchronization rule.
    ///
    /// At the track boundary a uniform value in `[0, 1)` is drawn: above
    /// [`TONE_RESYNC_HOLD_CHANCE`] the cursor resumes from the start;
    /// otherwise it steps back one, replaying the final sample on the
    /// next call and drawing again at the boundary after that. `draw` is
    /// only invoked when the boundary is actually reached.
    #[inline]
    pub fn next_resynced(&mut self, samples: &[f64], draw: impl FnOnce() -> f64) -> f64 {
        let value = samples[self.position];
        self.position += 1;
        if self.position == samples.len() {
            if draw() > TONE_RESYNC_HOLD_CHANCE {
                self.position = 0;
            } else {
                // one back to try again
                self.position -= 1;
            }
        }
        value
    }
}
