//! CLI tool for running the feedback engine over a WAV file.
//!
//! Usage: feedback-cli <input.wav> <output.wav> [preset.json]
//!
//! Streams the file through the real-time processor in fixed-size blocks,
//! exactly as a host would, and writes the result as 32-bit float WAV.
//! If no preset is given, uses default params (which leave feedback at 0;
//! pass a preset with a nonzero "feedback" to hear the effect).

use feedback_dsp::{FeedbackParams, FeedbackProcessor};
use std::env;
use std::fs;

/// Block length fed to the processor, matching a typical host buffer.
const BLOCK_SIZE: usize = 512;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: feedback-cli <input.wav> <output.wav> [preset.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let preset_path = args.get(3);

    // Load params
    let params = if let Some(path) = preset_path {
        let json = fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Failed to read preset {}: {}", path, e);
            std::process::exit(1);
        });
        FeedbackParams::from_json(&json).unwrap_or_else(|e| {
            eprintln!("Failed to parse preset {}: {}", path, e);
            std::process::exit(1);
        })
    } else {
        FeedbackParams::default()
    };

    // Read input WAV
    let reader = hound::WavReader::open(input_path).unwrap_or_else(|e| {
        eprintln!("Failed to open {}: {}", input_path, e);
        std::process::exit(1);
    });

    let spec = reader.spec();
    let channels = spec.channels as usize;
    let sample_rate = spec.sample_rate;
    let bits = spec.bits_per_sample;

    eprintln!(
        "Input: {} ch, {} Hz, {}-bit, {} samples/ch",
        channels,
        sample_rate,
        bits,
        reader.len() as usize / channels
    );

    // Read samples as f32
    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1_i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.unwrap() as f32 / max_val)
                .collect()
        }
        hound::SampleFormat::Float => reader.into_samples::<f32>().map(|s| s.unwrap()).collect(),
    };

    // The engine is mono; take the first channel of anything wider.
    let mut samples: Vec<f32> = if channels == 1 {
        interleaved
    } else {
        eprintln!("Multichannel input, processing channel 1 only");
        interleaved.iter().step_by(channels).copied().collect()
    };

    let mut processor = FeedbackProcessor::new();
    processor.prepare(sample_rate as f32, BLOCK_SIZE);
    for block in samples.chunks_mut(BLOCK_SIZE) {
        processor.process(block, &params);
    }

    // Write output WAV (always mono 32-bit float)
    let out_spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(output_path, out_spec).unwrap_or_else(|e| {
        eprintln!("Failed to create {}: {}", output_path, e);
        std::process::exit(1);
    });

    for &s in &samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();

    eprintln!("Written {} ({} samples)", output_path, samples.len());
}
