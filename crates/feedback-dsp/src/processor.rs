//! Real-time block processor: analysis, synthesis, and gain staging.
//!
//! Per sample: the raw input feeds the spectrum analyzer (retargeting the
//! frequency ramp once per completed frame), both ramps advance, and the
//! oscillator's output is mixed into the signal. Per block: the output gain
//! stage applies either a flat multiply or a one-block linear ramp when the
//! gain parameter moved.
//!
//! The hot path never allocates, locks, or fails.

use crate::params::{FeedbackParams, SharedParams};
use crate::smoothing::LinearRamp;
use crate::spectral::{
    fundamental_frequency, SpectrumAnalyzer, FRAME_SIZE, HIGHEST_GUITAR_FREQ, LOWEST_GUITAR_FREQ,
};
use crate::wavetable::{pitched_frequency, WavetableOsc};

/// Feedback gain ramp time; short so the knob tracks the player's hand.
const FEEDBACK_RAMP_SECS: f32 = 0.005;

/// Frequency ramp time; longer so the tone glides between detected pitches
/// instead of stepping audibly.
const FREQUENCY_RAMP_SECS: f32 = 0.025;

/// Mono feedback processor.
///
/// Lifecycle: [`prepare`](Self::prepare) once per stream (and again on a
/// sample-rate change), then [`process`](Self::process) per block. Dropping
/// the processor releases everything.
pub struct FeedbackProcessor {
    sample_rate: f32,
    max_block_size: usize,
    analyzer: SpectrumAnalyzer,
    feedback_ramp: LinearRamp,
    frequency_ramp: LinearRamp,
    osc: WavetableOsc,
    previous_gain: f32,
    /// Most recent estimator output, 0.0 when nothing cleared the threshold.
    detected: f32,
}

impl FeedbackProcessor {
    /// Create a processor prepared for 44.1 kHz. Call
    /// [`prepare`](Self::prepare) before processing to match the host.
    pub fn new() -> Self {
        let mut processor = Self {
            sample_rate: 44100.0,
            max_block_size: 0,
            analyzer: SpectrumAnalyzer::new(),
            feedback_ramp: LinearRamp::new(0.0),
            frequency_ramp: LinearRamp::new(0.0),
            osc: WavetableOsc::new(FRAME_SIZE, 44100.0),
            previous_gain: FeedbackParams::default().gain,
            detected: 0.0,
        };
        processor.prepare(44100.0, 512);
        processor
    }

    /// (Re-)initialize for a sample rate and maximum block length.
    ///
    /// Idempotent; rebuilds the wavetable, reconfigures both ramps, and
    /// clears all analysis and phase state. This is the only place that
    /// allocates.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.osc = WavetableOsc::new(FRAME_SIZE, sample_rate as f64);
        self.feedback_ramp = LinearRamp::new(0.0);
        self.feedback_ramp.reset(sample_rate, FEEDBACK_RAMP_SECS);
        self.frequency_ramp = LinearRamp::new(0.0);
        self.frequency_ramp.reset(sample_rate, FREQUENCY_RAMP_SECS);
        self.analyzer.reset();
        self.previous_gain = FeedbackParams::default().gain;
        self.detected = 0.0;
    }

    /// Clear all running state without reallocating; the prepared sample
    /// rate and tables stay valid.
    pub fn reset(&mut self) {
        self.analyzer.reset();
        self.osc.reset_phase();
        self.feedback_ramp.set_current_and_target(0.0);
        self.frequency_ramp.set_current_and_target(0.0);
        self.previous_gain = FeedbackParams::default().gain;
        self.detected = 0.0;
    }

    /// Process one mono block in place.
    ///
    /// `params` is treated as an immutable per-block snapshot; out-of-range
    /// values are clamped, never rejected.
    pub fn process(&mut self, block: &mut [f32], params: &FeedbackParams) {
        if block.is_empty() {
            return;
        }
        debug_assert!(self.max_block_size == 0 || block.len() <= self.max_block_size);

        let params = params.clamped();
        self.feedback_ramp.set_target(params.feedback);

        for sample in block.iter_mut() {
            if self.analyzer.push(*sample) {
                self.update_frequency(params.tolerance);
            }
            let frequency =
                pitched_frequency(self.frequency_ramp.next(), params.offset, params.detune);
            *sample += self.osc.next_sample(frequency) * (self.feedback_ramp.next() / 2.0);
        }

        self.apply_gain(block, params.gain);
    }

    /// Process one mono block, reading the parameters from a lock-free
    /// store a control thread may be writing concurrently.
    ///
    /// Each cell is loaded independently, so values within one block may
    /// reflect slightly different write moments; a stale read just feeds a
    /// one-block-old value into the ramps, which self-corrects on the next
    /// block.
    pub fn process_shared(&mut self, block: &mut [f32], shared: &SharedParams) {
        self.process(block, &shared.snapshot());
    }

    /// Run the estimator on the completed frame and retarget the frequency
    /// ramp when the result sits inside the guitar band. Out-of-band and
    /// below-threshold results leave the ramp holding its last target.
    fn update_frequency(&mut self, tolerance: f32) {
        self.detected =
            fundamental_frequency(self.analyzer.magnitudes(), tolerance, self.sample_rate);
        if self.detected > LOWEST_GUITAR_FREQ && self.detected < HIGHEST_GUITAR_FREQ {
            self.frequency_ramp.set_target(self.detected);
        }
    }

    /// Output gain stage: flat multiply while the parameter is unchanged,
    /// a single-block linear ramp when it moved.
    fn apply_gain(&mut self, block: &mut [f32], gain: f32) {
        if gain == self.previous_gain {
            for sample in block.iter_mut() {
                *sample *= gain;
            }
        } else {
            let step = (gain - self.previous_gain) / block.len() as f32;
            let mut g = self.previous_gain;
            for sample in block.iter_mut() {
                *sample *= g;
                g += step;
            }
            self.previous_gain = gain;
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Estimator output from the most recent completed frame, in Hz.
    /// `0.0` means nothing rose above the tolerance threshold.
    pub fn detected_frequency(&self) -> f32 {
        self.detected
    }

    /// Frequency the ramp is currently heading toward.
    pub fn frequency_target(&self) -> f32 {
        self.frequency_ramp.target()
    }
}

impl Default for FeedbackProcessor {
    fn default() -> Self {
        Self::new()
    }
}
