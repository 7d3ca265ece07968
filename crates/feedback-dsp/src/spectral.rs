//! Windowed FFT analysis and fundamental-frequency estimation.
//!
//! Incoming samples accumulate in a FIFO; every `FRAME_SIZE` pushes the
//! frame is Hann-windowed and transformed, and the magnitude spectrum is
//! scanned for the dominant peak. Frames do not overlap, so the pitch
//! estimate updates once per frame, giving one frame of latency between a pitch
//! change and its detection.

use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::f32::consts::PI;
use std::sync::Arc;

/// FFT order; 12 gives enough spectral detail without huge lag.
pub const FFT_ORDER: usize = 12;

/// Analysis frame length in samples.
pub const FRAME_SIZE: usize = 1 << FFT_ORDER;

/// Maps the [0,1] tolerance knob onto a magnitude threshold, calibrated to
/// the unnormalized FFT at this frame size.
pub const TOLERANCE_SCALE: f32 = 250.0;

/// Low end of the band a detected fundamental must fall in (open E is 82 Hz).
pub const LOWEST_GUITAR_FREQ: f32 = 75.0;

/// High end of the detection band, past the 24th fret on the high E string.
pub const HIGHEST_GUITAR_FREQ: f32 = 1200.0;

/// Streaming spectrum analyzer over fixed, non-overlapping frames.
///
/// All buffers are allocated at construction; `push` never allocates.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    /// Ring of the most recent `FRAME_SIZE` input samples.
    fifo: Vec<f32>,
    fifo_index: usize,
    /// Windowed copy of the frame handed to the transform (destroyed by it).
    work: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// `FRAME_SIZE` magnitudes; the real transform fills the first
    /// `FRAME_SIZE / 2 + 1` bins, the trailing region stays zero.
    magnitudes: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FRAME_SIZE);
        let work = fft.make_input_vec();
        let spectrum = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();
        Self {
            fft,
            window: hann_window(FRAME_SIZE),
            fifo: vec![0.0; FRAME_SIZE],
            fifo_index: 0,
            work,
            spectrum,
            scratch,
            magnitudes: vec![0.0; FRAME_SIZE],
        }
    }

    /// Push one input sample, in order, exactly once per sample.
    ///
    /// Returns `true` when this push completed a frame and a fresh magnitude
    /// spectrum is available via [`magnitudes`](Self::magnitudes). A full
    /// buffer is the expected steady-state trigger, not an error.
    #[inline]
    pub fn push(&mut self, sample: f32) -> bool {
        self.fifo[self.fifo_index] = sample;
        self.fifo_index += 1;
        if self.fifo_index < FRAME_SIZE {
            return false;
        }
        self.fifo_index = 0;

        for i in 0..FRAME_SIZE {
            self.work[i] = self.fifo[i] * self.window[i];
        }
        // lengths are fixed at construction, so this cannot fail
        self.fft
            .process_with_scratch(&mut self.work, &mut self.spectrum, &mut self.scratch)
            .unwrap();
        for (mag, bin) in self.magnitudes.iter_mut().zip(self.spectrum.iter()) {
            *mag = bin.norm();
        }
        true
    }

    /// Magnitude spectrum of the most recently completed frame.
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Samples pushed since the last completed frame.
    pub fn fill(&self) -> usize {
        self.fifo_index
    }

    /// Clear the FIFO and the last spectrum.
    pub fn reset(&mut self) {
        self.fifo.fill(0.0);
        self.fifo_index = 0;
        self.magnitudes.fill(0.0);
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Estimate the fundamental as the spectral bin of maximum magnitude.
///
/// Returns the peak bin converted to Hz when the peak clears
/// `tolerance * TOLERANCE_SCALE`, or `0.0` when nothing rises above the
/// noise floor. Exact ties resolve to the first (lowest-frequency) bin.
pub fn fundamental_frequency(magnitudes: &[f32], tolerance: f32, sample_rate: f32) -> f32 {
    let mut max = 0.0_f32;
    let mut index = 0_usize;
    for (i, &mag) in magnitudes.iter().enumerate() {
        if mag > max {
            max = mag;
            index = i;
        }
    }
    if max > tolerance * TOLERANCE_SCALE {
        index as f32 / (magnitudes.len() - 1) as f32 * sample_rate
    } else {
        0.0
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}
