//! Interpolated sine wavetable oscillator.
//!
//! One full sine cycle is sampled into a lookup table at prepare time and
//! read back by phase accumulation. Linear interpolation between adjacent
//! entries gives a slightly cleaner tone than nearest-index lookup.

/// Frequency ratio of one equal-temperament semitone (twelfth root of two).
pub const SEMITONE_RATIO: f32 = 1.05945;

/// Shift `base` up by `offset_semitones` and add a fixed `detune_hz`.
///
/// This is the frequency actually fed to the oscillator: the smoothed
/// detected fundamental, transposed to taste.
#[inline]
pub fn pitched_frequency(base: f32, offset_semitones: i32, detune_hz: f32) -> f32 {
    base * SEMITONE_RATIO.powi(offset_semitones) + detune_hz
}

/// Phase-accumulating oscillator over a precomputed sine table.
pub struct WavetableOsc {
    table: Vec<f32>,
    /// Current read position, in table samples: `[0, table.len())`.
    phase: f64,
    sample_rate: f64,
}

impl WavetableOsc {
    /// Build a sine table of `table_len` samples.
    pub fn new(table_len: usize, sample_rate: f64) -> Self {
        let table = (0..table_len)
            .map(|i| (std::f64::consts::TAU * i as f64 / table_len as f64).sin() as f32)
            .collect();
        Self {
            table,
            phase: 0.0,
            sample_rate,
        }
    }

    /// Read the table at the current phase, then advance by `frequency` Hz.
    ///
    /// The phase wraps with a euclidean remainder so a net-negative
    /// frequency (extreme downward detune) walks the table backwards
    /// instead of indexing out of range.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32) -> f32 {
        let len = self.table.len() as f64;
        let out = self.lookup(self.phase);
        let increment = frequency as f64 * len / self.sample_rate;
        self.phase = (self.phase + increment).rem_euclid(len);
        out
    }

    #[inline]
    fn lookup(&self, phase: f64) -> f32 {
        let whole = phase as usize;
        let frac = (phase - whole as f64) as f32;
        let idx0 = whole % self.table.len();
        let idx1 = (idx0 + 1) % self.table.len();
        self.table[idx0] * (1.0 - frac) + self.table[idx1] * frac
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn table_len(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semitone_ratio_is_twelfth_root_of_two() {
        assert!((SEMITONE_RATIO - 2.0_f32.powf(1.0 / 12.0)).abs() < 1e-4);
    }

    #[test]
    fn octave_offset_doubles_frequency() {
        let f = pitched_frequency(220.0, 12, 0.0);
        assert!((f - 440.0).abs() < 0.5);
        assert_eq!(pitched_frequency(220.0, 0, 3.0), 223.0);
    }

    #[test]
    fn table_starts_at_zero_and_peaks_at_quarter() {
        let osc = WavetableOsc::new(4096, 44100.0);
        assert_eq!(osc.table[0], 0.0);
        assert!((osc.table[1024] - 1.0).abs() < 1e-6);
        assert!((osc.table[3072] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn periodicity_matches_sample_rate_over_frequency() {
        // 441 Hz at 44100 Hz: period is exactly 100 samples, and the
        // increment divides the table length exactly, so the phase revisits
        // the same indices every cycle.
        let mut osc = WavetableOsc::new(4096, 44100.0);
        let out: Vec<f32> = (0..500).map(|_| osc.next_sample(441.0)).collect();
        for i in 0..400 {
            assert!(
                (out[i] - out[i + 100]).abs() < 1e-5,
                "sample {i} not periodic"
            );
        }
    }

    #[test]
    fn output_tracks_a_true_sine() {
        let mut osc = WavetableOsc::new(4096, 44100.0);
        let freq = 220.0_f64;
        for i in 0..2000 {
            let got = osc.next_sample(freq as f32);
            let want = (std::f64::consts::TAU * freq * i as f64 / 44100.0).sin();
            assert!(
                (got as f64 - want).abs() < 1e-3,
                "sample {i}: {got} vs {want}"
            );
        }
    }

    #[test]
    fn negative_net_frequency_stays_in_range() {
        let mut osc = WavetableOsc::new(4096, 44100.0);
        for _ in 0..1000 {
            let s = osc.next_sample(-50.0);
            assert!(s.is_finite());
            assert!(osc.phase() >= 0.0 && osc.phase() < 4096.0);
        }
    }

    #[test]
    fn reset_phase_restarts_the_cycle() {
        let mut osc = WavetableOsc::new(4096, 44100.0);
        let first = osc.next_sample(330.0);
        for _ in 0..37 {
            osc.next_sample(330.0);
        }
        osc.reset_phase();
        assert_eq!(osc.next_sample(330.0), first);
    }
}
