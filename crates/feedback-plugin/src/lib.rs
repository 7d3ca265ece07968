//! Guitar feedback emulator: nih-plug VST3/CLAP/standalone plugin.
//!
//! Thin adapter around the feedback-dsp core: snapshots the parameter
//! values once per block and runs the mono processor over the first
//! channel. Everything audible lives in feedback-dsp.

mod params;

use feedback_dsp::FeedbackProcessor;
use nih_plug::prelude::*;
use std::sync::Arc;

use params::FeedbackPluginParams;

pub struct FeedbackPlugin {
    params: Arc<FeedbackPluginParams>,
    processor: FeedbackProcessor,
}

impl Default for FeedbackPlugin {
    fn default() -> Self {
        Self {
            params: Arc::new(FeedbackPluginParams::default()),
            processor: FeedbackProcessor::new(),
        }
    }
}

impl Plugin for FeedbackPlugin {
    const NAME: &'static str = "Feedback";
    const VENDOR: &'static str = "feedback-project";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        // Mono
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
        // Stereo hosts: the engine writes channel 0, the rest is silenced
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            ..AudioIOLayout::const_default()
        },
    ];

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        _layout: &AudioIOLayout,
        config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        self.processor
            .prepare(config.sample_rate, config.max_buffer_size as usize);
        nih_log!("feedback: prepared at {} Hz", config.sample_rate);
        true
    }

    fn reset(&mut self) {
        self.processor.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let dsp_params = self.params.to_dsp_params();

        let channels = buffer.as_slice();
        if let Some((main, rest)) = channels.split_first_mut() {
            self.processor.process(main, &dsp_params);
            for channel in rest.iter_mut() {
                channel.fill(0.0);
            }
        }

        ProcessStatus::Normal
    }
}

impl ClapPlugin for FeedbackPlugin {
    const CLAP_ID: &'static str = "com.feedback-project.feedback";
    const CLAP_DESCRIPTION: Option<&'static str> = Some("Guitar feedback emulator");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Mono,
        ClapFeature::Distortion,
    ];
}

impl Vst3Plugin for FeedbackPlugin {
    const VST3_CLASS_ID: [u8; 16] = *b"FeedbackSustain!";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Distortion];
}

nih_export_clap!(FeedbackPlugin);
nih_export_vst3!(FeedbackPlugin);
