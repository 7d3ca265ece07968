//! nih-plug parameter declarations for the feedback plugin.
//!
//! Mirrors the feedback-dsp parameter schema: same ranges, same defaults.
//! The DSP core clamps on its side as well, so host automation can never
//! push the engine out of range.

use nih_plug::prelude::*;
use std::sync::Arc;

#[derive(Params)]
pub struct FeedbackPluginParams {
    /// Output gain applied after the feedback tone is mixed in.
    #[id = "gain"]
    pub gain: FloatParam,

    /// Level of the synthesized feedback tone.
    #[id = "feedback"]
    pub feedback: FloatParam,

    /// Pitch offset above the detected fundamental, in semitones.
    #[id = "offset"]
    pub offset: IntParam,

    /// How easily feedback triggers.
    #[id = "tolerance"]
    pub tolerance: FloatParam,

    /// Fixed detune of the tone in Hz.
    #[id = "detune"]
    pub detune: FloatParam,
}

impl Default for FeedbackPluginParams {
    fn default() -> Self {
        Self {
            gain: FloatParam::new("Gain", 1.0, FloatRange::Linear { min: 0.0, max: 1.0 }),
            feedback: FloatParam::new("Feedback", 0.0, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_step_size(0.01),
            offset: IntParam::new("Offset", 12, IntRange::Linear { min: 0, max: 24 })
                .with_value_to_string(Arc::new(|value| format!("+{value} st"))),
            tolerance: FloatParam::new("Tolerance", 0.5, FloatRange::Linear { min: 0.0, max: 1.0 }),
            detune: FloatParam::new(
                "Detune",
                0.0,
                FloatRange::Linear {
                    min: -50.0,
                    max: 50.0,
                },
            )
            .with_unit(" Hz"),
        }
    }
}

impl FeedbackPluginParams {
    /// Convert current nih-plug param values to a feedback-dsp snapshot.
    pub fn to_dsp_params(&self) -> feedback_dsp::FeedbackParams {
        feedback_dsp::FeedbackParams {
            gain: self.gain.value(),
            feedback: self.feedback.value(),
            offset: self.offset.value(),
            tolerance: self.tolerance.value(),
            detune: self.detune.value(),
        }
    }
}
