//! Guitar feedback emulation DSP engine.
//!
//! Listens to a mono input stream, tracks the dominant sustained frequency
//! with a windowed FFT, and mixes a pitched sine overtone back into the
//! signal: the "amp about to howl" effect, under player control.
//!
//! Single entry point: [`FeedbackProcessor`]. Call `prepare(sample_rate,
//! max_block)` once, then `process(block, &params)` per audio block.

pub mod params;
pub mod processor;
pub mod smoothing;
pub mod spectral;
pub mod wavetable;

pub use params::{FeedbackParams, SharedParams};
pub use processor::FeedbackProcessor;
