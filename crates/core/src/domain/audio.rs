//! Core audio domain models for the radio effects pipeline
//!
//! This module defines the platform-agnostic value types shared by the
//! filter chains, the effect-track machinery, and the orchestrator:
//! the modulation tag, the in-place sample window, and the noise-band
//! classification of carrier frequencies.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::tracks::TrackKind;

/// Fixed render-path sample rate in Hz.
///
/// All filter coefficients are tuned against this rate; callers are
/// expected to hand the pipeline buffers already resampled to it.
pub const OUTPUT_SAMPLE_RATE: u32 = 48_000;

/// Errors that can occur outside the per-sample hot path
///
/// The hot path itself never reports errors: numerical faults are
/// recovered in place and missing tracks degrade to "effect absent".
#[derive(Debug, Error)]
pub enum EffectsError {
    /// A track slot was written twice; tracks are load-once and immutable
    #[error("effect track {0:?} is already loaded")]
    TrackAlreadyLoaded(TrackKind),

    /// A decoded track contained no samples
    #[error("effect track {0:?} is empty")]
    EmptyTrack(TrackKind),
}

pub type Result<T> = std::result::Result<T, EffectsError>;

/// Simulated radio transmission mode
///
/// The modulation decides which filter chain runs and which tone and
/// background-noise rules apply to a transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modulation {
    Am,
    Fm,
    /// Frequency-hopping UHF voice with its characteristic sync tone
    HaveQuick,
    /// Wideband digital data/voice link
    Mids,
    Satcom,
    Intercom,
}

impl Modulation {
    /// Direct-wire modulations bypass the banded radio chain and run
    /// the simpler intercom filter instead.
    pub fn is_direct_wire(&self) -> bool {
        matches!(self, Modulation::Mids | Modulation::Satcom | Modulation::Intercom)
    }
}

/// Carrier frequency above which AM-family traffic picks up UHF static.
pub const UHF_NOISE_FLOOR_HZ: f64 = 200_000_000.0;

/// Carrier frequency above which AM-family traffic picks up VHF static.
pub const VHF_NOISE_FLOOR_HZ: f64 = 80_000_000.0;

/// Background-static band for a carrier frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseBand {
    Hf,
    Vhf,
    Uhf,
}

impl NoiseBand {
    /// Classify a carrier frequency in Hz into its static band.
    pub fn for_frequency(hz: f64) -> Self {
        if hz >= UHF_NOISE_FLOOR_HZ {
            NoiseBand::Uhf
        } else if hz >= VHF_NOISE_FLOOR_HZ {
            NoiseBand::Vhf
        } else {
            NoiseBand::Hf
        }
    }
}

/// Mutable region of a sample buffer, processed in place
///
/// The window covers `count` samples starting at `offset`. Constructing a
/// window whose region falls outside the buffer is a caller contract
/// violation and fails fast rather than risking out-of-bounds writes.
#[derive(Debug)]
pub struct SampleWindow<'a> {
    buffer: &'a mut [f32],
    offset: usize,
    count: usize,
}

impl<'a> SampleWindow<'a> {
    /// Create a window over `count` samples of `buffer` starting at `offset`.
    ///
    /// # Panics
    /// Panics if `offset + count` exceeds the buffer length.
    pub fn new(buffer: &'a mut [f32], offset: usize, count: usize) -> Self {
        let end = offset.checked_add(count);
        assert!(
            end.is_some_and(|end| end <= buffer.len()),
            "sample window {}+{} out of range for buffer of {} samples",
            offset,
            count,
            buffer.len()
        );
        Self { buffer, offset, count }
    }

    /// Window covering an entire buffer.
    pub fn full(buffer: &'a mut [f32]) -> Self {
        let count = buffer.len();
        Self::new(buffer, 0, count)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The in-place region to transform.
    pub fn samples(&mut self) -> &mut [f32] {
        &mut self.buffer[self.offset..self.offset + self.count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_wire_classification() {
        assert!(Modulation::Intercom.is_direct_wire());
        assert!(Modulation::Mids.is_direct_wire());
        assert!(Modulation::Satcom.is_direct_wire());
        assert!(!Modulation::Am.is_direct_wire());
        assert!(!Modulation::Fm.is_direct_wire());
        assert!(!Modulation::HaveQuick.is_direct_wire());
    }

    #[test]
    fn test_noise_band_classification() {
        assert_eq!(NoiseBand::for_frequency(251_000_000.0), NoiseBand::Uhf);
        assert_eq!(NoiseBand::for_frequency(200_000_000.0), NoiseBand::Uhf);
        assert_eq!(NoiseBand::for_frequency(124_500_000.0), NoiseBand::Vhf);
        assert_eq!(NoiseBand::for_frequency(80_000_000.0), NoiseBand::Vhf);
        assert_eq!(NoiseBand::for_frequency(11_175_000.0), NoiseBand::Hf);
    }

    #[test]
    fn test_sample_window_region() {
        let mut buffer = vec![0.0_f32, 1.0, 2.0, 3.0, 4.0];
        let mut window = SampleWindow::new(&mut buffer, 1, 3);

        assert_eq!(window.offset(), 1);
        assert_eq!(window.len(), 3);
        assert_eq!(window.samples(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sample_window_full() {
        let mut buffer = vec![0.5_f32; 8];
        let mut window = SampleWindow::full(&mut buffer);
        assert_eq!(window.len(), 8);
        assert_eq!(window.samples().len(), 8);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_sample_window_out_of_range() {
        let mut buffer = vec![0.0_f32; 4];
        let _ = SampleWindow::new(&mut buffer, 2, 3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_sample_window_offset_overflow() {
        let mut buffer = vec![0.0_f32; 4];
        let _ = SampleWindow::new(&mut buffer, usize::MAX, 2);
    }
}
