//! Band-limiting filter chains for simulated radio audio
//!
//! Two chains are provided:
//! - `RadioFilterChain`: cascaded band-limiting stages used by every
//!   over-the-air modulation (AM, FM, HAVE QUICK)
//! - `IntercomFilterChain`: a simpler high-pass/low-pass pair used by
//!   direct-wire modulations (intercom, MIDS, SATCOM)
//!
//! Both are designed for the render path:
//! - Zero allocations per sample
//! - State persists across buffers (continuous streaming)
//! - Non-finite filter output is recovered locally and never written
//!   back to the audio buffer

/// Hard-clip bounds applied ahead of the band-limiting stages when the
/// clipping setting is enabled, and again after effect mixing.
pub const CLIP_MIN: f64 = -1.0;
pub const CLIP_MAX: f64 = 1.0;

/// Make-up gain applied by each band-limiting stage to compensate the
/// attenuation of its pass band.
pub const BAND_STAGE_BOOST: f64 = 1.5;

// ============================================================================
// BIQUAD FILTER (low-level IIR building block)
// ============================================================================

/// Biquad filter coefficients
///
/// Direct Form I implementation for numerical stability. Coefficients
/// follow the Audio EQ Cookbook formulas and are pre-computed once at
/// pipeline construction; the per-sample path only multiplies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    /// Numerator coefficients
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    /// Denominator coefficients (a0 is normalized to 1.0)
    pub a1: f64,
    pub a2: f64,
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        // Unity gain (no filtering)
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }
}

impl BiquadCoeffs {
    /// Calculate coefficients for a low-pass filter
    ///
    /// # Parameters
    /// - `sample_rate`: audio sample rate in Hz
    /// - `cutoff`: corner frequency in Hz
    /// - `q`: Q factor (resonance); 0.707 is Butterworth
    #[must_use]
    pub fn low_pass(sample_rate: f64, cutoff: f64, q: f64) -> Self {
        let q = q.max(0.5);
        let w0 = 2.0 * std::f64::consts::PI * cutoff / sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let alpha = sin_w0 / (2.0 * q);

        let b0 = (1.0 - cos_w0) / 2.0;
        let b1 = 1.0 - cos_w0;
        let b2 = (1.0 - cos_w0) / 2.0;

        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        // Normalize by a0
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Calculate coefficients for a high-pass filter
    #[must_use]
    pub fn high_pass(sample_rate: f64, cutoff: f64, q: f64) -> Self {
        let q = q.max(0.5);
        let w0 = 2.0 * std::f64::consts::PI * cutoff / sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let alpha = sin_w0 / (2.0 * q);

        let b0 = (1.0 + cos_w0) / 2.0;
        let b1 = -(1.0 + cos_w0);
        let b2 = (1.0 + cos_w0) / 2.0;

        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Stateful biquad filter using Direct Form I
///
/// Direct Form I is chosen over Transposed Direct Form II for:
/// - Better numerical stability with low-frequency filters
/// - Easier coefficient updates without artifacts
#[derive(Debug, Clone, PartialEq)]
pub struct BiquadFilter {
    coeffs: BiquadCoeffs,
    // Previous input samples (x[n-1], x[n-2])
    x1: f64,
    x2: f64,
    // Previous output samples (y[n-1], y[n-2])
    y1: f64,
    y2: f64,
}

impl BiquadFilter {
    /// Create a new biquad filter with given coefficients
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Update filter coefficients, keeping the delay-line state.
    pub fn set_coeffs(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    /// Process a single sample
    #[inline]
    pub fn process_sample(&mut self, x: f64) -> f64 {
        // Direct Form I: y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
        //                        - a1*y[n-1] - a2*y[n-2]
        let y = self.coeffs.b0 * x
            + self.coeffs.b1 * self.x1
            + self.coeffs.b2 * self.x2
            - self.coeffs.a1 * self.y1
            - self.coeffs.a2 * self.y2;

        // Update state
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;

        y
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

// ============================================================================
// RADIO FILTER CHAIN (over-the-air modulations)
// ============================================================================

/// One band-limiting stage: a high-pass at the band's low edge cascaded
/// with a low-pass at its high edge, Butterworth Q on both.
#[derive(Debug, Clone)]
struct BandLimitStage {
    high_pass: BiquadFilter,
    low_pass: BiquadFilter,
}

impl BandLimitStage {
    fn new(sample_rate: f64, low_edge: f64, high_edge: f64) -> Self {
        Self {
            high_pass: BiquadFilter::new(BiquadCoeffs::high_pass(sample_rate, low_edge, 0.707)),
            low_pass: BiquadFilter::new(BiquadCoeffs::low_pass(sample_rate, high_edge, 0.707)),
        }
    }

    #[inline]
    fn process_sample(&mut self, x: f64) -> f64 {
        self.low_pass.process_sample(self.high_pass.process_sample(x))
    }
}

/// Cascaded band-limiting chain for standard radio modulations
///
/// Two stages, 560–3900 Hz then 100–4500 Hz, each boosted by
/// [`BAND_STAGE_BOOST`] to compensate for pass-band attenuation.
/// Filter state persists across calls; one chain per pipeline instance.
#[derive(Debug, Clone)]
pub struct RadioFilterChain {
    stages: [BandLimitStage; 2],
}

impl RadioFilterChain {
    /// Band edges in Hz for the two cascaded stages.
    pub const BAND_EDGES: [(f64, f64); 2] = [(560.0, 3900.0), (100.0, 4500.0)];

    pub fn new(sample_rate: f64) -> Self {
        let [(lo0, hi0), (lo1, hi1)] = Self::BAND_EDGES;
        Self {
            stages: [
                BandLimitStage::new(sample_rate, lo0, hi0),
                BandLimitStage::new(sample_rate, lo1, hi1),
            ],
        }
    }

    /// Run one raw sample through the chain.
    ///
    /// When `clipping` is set the sample is hard-clamped to
    /// [`CLIP_MIN`, `CLIP_MAX`] before the first stage. A stage whose
    /// output is not finite is discarded: the raw input sample is
    /// substituted for that stage and the boost applied to it instead,
    /// so a numerically faulted filter neither silences nor corrupts
    /// the audio.
    #[inline]
    pub fn process_sample(&mut self, raw: f64, clipping: bool) -> f64 {
        let mut audio = raw;

        if clipping {
            audio = audio.clamp(CLIP_MIN, CLIP_MAX);
        }

        for stage in &mut self.stages {
            let mut shaped = stage.process_sample(audio);
            if !shaped.is_finite() {
                shaped = raw;
            }
            audio = shaped * BAND_STAGE_BOOST;
        }

        audio
    }

    /// Reset all stage state
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.high_pass.reset();
            stage.low_pass.reset();
        }
    }
}

// ============================================================================
// INTERCOM FILTER CHAIN (direct-wire modulations)
// ============================================================================

/// High-pass/low-pass pair for intercom-class audio
///
/// The high-pass (520 Hz) is applied twice through the same filter
/// instance, then the low-pass (4130 Hz) shapes the top end. This path
/// ignores the clipping and tone/noise settings entirely.
#[derive(Debug, Clone)]
pub struct IntercomFilterChain {
    high_pass: BiquadFilter,
    low_pass: BiquadFilter,
}

impl IntercomFilterChain {
    /// High-pass cutoff in Hz and its Q factor.
    pub const HIGH_PASS: (f64, f64) = (520.0, 0.97);
    /// Low-pass cutoff in Hz and its Q factor.
    pub const LOW_PASS: (f64, f64) = (4130.0, 2.0);

    pub fn new(sample_rate: f64) -> Self {
        let (hp_cutoff, hp_q) = Self::HIGH_PASS;
        let (lp_cutoff, lp_q) = Self::LOW_PASS;
        Self {
            high_pass: BiquadFilter::new(BiquadCoeffs::high_pass(sample_rate, hp_cutoff, hp_q)),
            low_pass: BiquadFilter::new(BiquadCoeffs::low_pass(sample_rate, lp_cutoff, lp_q)),
        }
    }

    /// Run one raw sample through the chain.
    ///
    /// Returns the filtered sample clamped to [-1.0, 1.0], or `None`
    /// when the result is not finite, in which case the caller must
    /// leave the buffer sample untouched.
    #[inline]
    pub fn process_sample(&mut self, raw: f64) -> Option<f64> {
        let mut audio = self.high_pass.process_sample(raw);
        audio = self.high_pass.process_sample(audio);

        audio = if audio.is_finite() {
            self.low_pass.process_sample(audio)
        } else {
            self.low_pass.process_sample(raw)
        };

        audio.is_finite().then(|| audio.clamp(CLIP_MIN, CLIP_MAX))
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.high_pass.reset();
        self.low_pass.reset();
    }
}

// ============================================================================
// TESTS
// ============================================================================
