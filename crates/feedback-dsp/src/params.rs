//! Parameter schema for the feedback engine.
//!
//! All callers (CLI, plugin adapter) use the same `FeedbackParams` struct.
//! The audio thread never reads a shared mutable record directly: a control
//! thread writes individual [`SharedParams`] cells and the processor takes
//! one clamped snapshot per block.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

/// Parameter ranges for continuous parameters (min, max).
pub fn param_range(key: &str) -> Option<(f32, f32)> {
    match key {
        "gain" => Some((0.0, 1.0)),
        "feedback" => Some((0.0, 1.0)),
        "offset" => Some((0.0, 24.0)),
        "tolerance" => Some((0.0, 1.0)),
        "detune" => Some((-50.0, 50.0)),
        _ => None,
    }
}

/// All feedback parameters, as read once per processed block.
///
/// Uses `#[serde(default)]` so sparse preset JSON loads correctly;
/// missing keys get default values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackParams {
    /// Output gain applied to the whole block after mixing.
    pub gain: f32,
    /// Level of the synthesized feedback tone.
    pub feedback: f32,
    /// Pitch offset of the tone above the detected fundamental, in semitones.
    pub offset: i32,
    /// How easily feedback triggers; scales the spectral peak threshold.
    pub tolerance: f32,
    /// Fixed detune of the tone in Hz.
    pub detune: f32,
}

impl Default for FeedbackParams {
    fn default() -> Self {
        Self {
            gain: 1.0,
            feedback: 0.0,
            offset: 12,
            tolerance: 0.5,
            detune: 0.0,
        }
    }
}

impl FeedbackParams {
    /// Parse from JSON string. Missing fields get default values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Return a copy with every field clamped into its declared range.
    ///
    /// A misbehaving host handing us an out-of-range value must degrade
    /// the synthesized audio gracefully, never crash the audio thread.
    pub fn clamped(self) -> Self {
        Self {
            gain: self.gain.clamp(0.0, 1.0),
            feedback: self.feedback.clamp(0.0, 1.0),
            offset: self.offset.clamp(0, 24),
            tolerance: self.tolerance.clamp(0.0, 1.0),
            detune: self.detune.clamp(-50.0, 50.0),
        }
    }
}

/// f32 stored as raw bits in an `AtomicU32` so it can be shared without locks.
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Lock-free parameter store shared between a control thread and the audio
/// thread.
///
/// Each parameter is an independently loaded scalar cell. Values read within
/// one block may reflect slightly different write moments; the per-sample
/// ramps absorb that staleness.
pub struct SharedParams {
    gain: AtomicF32,
    feedback: AtomicF32,
    offset: AtomicI32,
    tolerance: AtomicF32,
    detune: AtomicF32,
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new(FeedbackParams::default())
    }
}

impl SharedParams {
    /// Create a store seeded with the given values.
    pub fn new(params: FeedbackParams) -> Self {
        Self {
            gain: AtomicF32::new(params.gain),
            feedback: AtomicF32::new(params.feedback),
            offset: AtomicI32::new(params.offset),
            tolerance: AtomicF32::new(params.tolerance),
            detune: AtomicF32::new(params.detune),
        }
    }

    pub fn set_gain(&self, value: f32) {
        self.gain.store(value);
    }

    pub fn set_feedback(&self, value: f32) {
        self.feedback.store(value);
    }

    pub fn set_offset(&self, value: i32) {
        self.offset.store(value, Ordering::Relaxed);
    }

    pub fn set_tolerance(&self, value: f32) {
        self.tolerance.store(value);
    }

    pub fn set_detune(&self, value: f32) {
        self.detune.store(value);
    }

    /// Read all cells into a clamped per-block snapshot.
    pub fn snapshot(&self) -> FeedbackParams {
        FeedbackParams {
            gain: self.gain.load(),
            feedback: self.feedback.load(),
            offset: self.offset.load(Ordering::Relaxed),
            tolerance: self.tolerance.load(),
            detune: self.detune.load(),
        }
        .clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_declared_ranges() {
        let p = FeedbackParams::default();
        assert_eq!(p.gain, 1.0);
        assert_eq!(p.feedback, 0.0);
        assert_eq!(p.offset, 12);
        assert_eq!(p.tolerance, 0.5);
        assert_eq!(p.detune, 0.0);
        assert_eq!(p, p.clamped());
    }

    #[test]
    fn sparse_json_gets_defaults() {
        let p = FeedbackParams::from_json(r#"{"feedback": 0.8, "offset": 0}"#).unwrap();
        assert_eq!(p.feedback, 0.8);
        assert_eq!(p.offset, 0);
        assert_eq!(p.gain, 1.0);
        assert_eq!(p.tolerance, 0.5);
    }

    #[test]
    fn out_of_range_values_clamp() {
        let p = FeedbackParams {
            gain: 2.0,
            feedback: -0.5,
            offset: 99,
            tolerance: 1.5,
            detune: -300.0,
        }
        .clamped();
        assert_eq!(p.gain, 1.0);
        assert_eq!(p.feedback, 0.0);
        assert_eq!(p.offset, 24);
        assert_eq!(p.tolerance, 1.0);
        assert_eq!(p.detune, -50.0);
    }

    #[test]
    fn shared_store_roundtrip() {
        let shared = SharedParams::default();
        shared.set_feedback(0.7);
        shared.set_offset(7);
        shared.set_detune(-12.5);
        let snap = shared.snapshot();
        assert_eq!(snap.feedback, 0.7);
        assert_eq!(snap.offset, 7);
        assert_eq!(snap.detune, -12.5);
        // untouched cells keep their seed values
        assert_eq!(snap.gain, 1.0);
    }

    #[test]
    fn snapshot_clamps_rogue_writes() {
        let shared = SharedParams::default();
        shared.set_gain(7.0);
        shared.set_offset(-3);
        let snap = shared.snapshot();
        assert_eq!(snap.gain, 1.0);
        assert_eq!(snap.offset, 0);
    }

    #[test]
    fn range_table_covers_all_keys() {
        for key in ["gain", "feedback", "offset", "tolerance", "detune"] {
            let (lo, hi) = param_range(key).unwrap();
            assert!(lo < hi);
        }
        assert!(param_range("wet_dry").is_none());
    }
}
