use std::f32::consts::TAU;

use thiserror::Error;

/// Block processing contract violations
/// These are integration errors, never runtime conditions to recover from
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProcessError {
    #[error("parameter '{param}' has {len} values, expected 1 or {block}")]
    ParamLength {
        param: &'static str,
        len: usize,
        block: usize,
    },
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),
}

/// Sine oscillator with a running phase accumulator
/// Frequency, phase offset and gain may change on every sample
pub struct SineOscillator {
    /// Running phase in radians, kept in [0, 2π)
    phase: f32,
}

impl SineOscillator {
    /// Create a new oscillator starting at phase 0
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Create an oscillator starting at an arbitrary phase
    #[cfg(test)]
    pub fn with_phase(phase: f32) -> Self {
        Self {
            phase: wrap_phase(phase),
        }
    }

    /// Current phase in radians
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Fill `output` with one block of samples
    ///
    /// Each parameter slice holds either one value (constant over the block)
    /// or exactly `output.len()` values (one per sample). Everything is checked
    /// before the first sample is written, so on error neither `output` nor the
    /// phase is touched.
    pub fn process_block(
        &mut self,
        output: &mut [f32],
        frequency: &[f32],
        phase_offset: &[f32],
        gain: &[f32],
        sample_rate: f32,
    ) -> Result<(), ProcessError> {
        let block = output.len();
        check_len("targetFrequency", frequency, block)?;
        check_len("phaseOffset", phase_offset, block)?;
        check_len("gain", gain, block)?;
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(ProcessError::InvalidSampleRate(sample_rate));
        }

        for (n, sample) in output.iter_mut().enumerate() {
            let omega = TAU * value_at(frequency, n) / sample_rate;

            // Offset rotates the output only, it never feeds back into the accumulator
            *sample = value_at(gain, n) * (self.phase + value_at(phase_offset, n)).sin();

            self.phase = wrap_phase(self.phase + omega);
        }

        Ok(())
    }
}

impl Default for SineOscillator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_len(param: &'static str, values: &[f32], block: usize) -> Result<(), ProcessError> {
    if values.len() == 1 || values.len() == block {
        Ok(())
    } else {
        Err(ProcessError::ParamLength {
            param,
            len: values.len(),
            block,
        })
    }
}

/// Length-1 slices apply to the whole block
#[inline]
fn value_at(values: &[f32], n: usize) -> f32 {
    if values.len() == 1 { values[0] } else { values[n] }
}

/// Wrap into [0, 2π)
/// One subtraction covers every increment below 2π; anything larger or negative
/// falls through to a full remainder.
#[inline]
fn wrap_phase(phase: f32) -> f32 {
    let mut wrapped = if phase >= TAU { phase - TAU } else { phase };
    if !(0.0..TAU).contains(&wrapped) {
        wrapped = wrapped.rem_euclid(TAU);
        // rem_euclid can round up to exactly 2π for tiny negative inputs
        if wrapped >= TAU || !wrapped.is_finite() {
            wrapped = 0.0;
        }
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_oscillator_creates_at_zero_phase() {
        let osc = SineOscillator::new();
        assert_eq!(osc.phase(), 0.0);
    }

    #[test]
    fn test_concrete_block_at_48k() {
        let mut osc = SineOscillator::new();
        let mut out = [0.0f32; 4];
        osc.process_block(&mut out, &[60.0], &[0.0], &[1.0], 48000.0)
            .unwrap();

        let expected = [0.0, 0.007854, 0.015707, 0.023561];
        for (got, want) in out.iter().zip(expected) {
            assert!((got - want).abs() < 1e-5, "got {}, want {}", got, want);
        }
        assert!((osc.phase() - 0.031416).abs() < 1e-5);
    }

    #[test]
    fn test_wraparound_single_step() {
        let mut osc = SineOscillator::with_phase(TAU - 0.01);
        let mut out = [0.0f32; 1];
        // omega = 0.02 rad/sample
        let sample_rate = 1000.0;
        let frequency = 0.02 * sample_rate / TAU;
        osc.process_block(&mut out, &[frequency], &[0.0], &[1.0], sample_rate)
            .unwrap();

        assert!((osc.phase() - 0.01).abs() < 1e-4);
    }

    #[test]
    fn test_phase_stays_bounded() {
        let mut osc = SineOscillator::new();
        let mut out = [0.0f32; 128];
        for _ in 0..1000 {
            osc.process_block(&mut out, &[200.0], &[0.0], &[1.0], 44100.0)
                .unwrap();
            assert!(osc.phase() >= 0.0 && osc.phase() < TAU);
        }
    }

    #[test]
    fn test_phase_bounded_for_out_of_range_frequencies() {
        let mut osc = SineOscillator::new();
        let mut out = [0.0f32; 16];
        for frequency in [-500.0, 30000.0, 1.0e6, -1.0e6] {
            osc.process_block(&mut out, &[frequency], &[0.0], &[1.0], 8000.0)
                .unwrap();
            assert!(osc.phase() >= 0.0 && osc.phase() < TAU, "phase {}", osc.phase());
        }
    }

    #[test]
    fn test_scalar_matches_per_sample_values() {
        let mut scalar = SineOscillator::new();
        let mut per_sample = SineOscillator::new();
        let mut a = [0.0f32; 128];
        let mut b = [0.0f32; 128];

        scalar
            .process_block(&mut a, &[110.0], &[1.5], &[0.5], 44100.0)
            .unwrap();
        per_sample
            .process_block(&mut b, &[110.0; 128], &[1.5; 128], &[0.5; 128], 44100.0)
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(scalar.phase(), per_sample.phase());
    }

    #[test]
    fn test_mixed_scalar_and_per_sample_params() {
        let mut osc = SineOscillator::new();
        let mut out = [0.0f32; 4];
        let gain = [0.0, 1.0, 0.0, 1.0];
        osc.process_block(&mut out, &[1000.0], &[0.0], &gain, 8000.0)
            .unwrap();

        assert_eq!(out[0], 0.0);
        assert!((out[1] - (TAU / 8.0).sin()).abs() < EPS);
        assert_eq!(out[2], 0.0);
        assert!((out[3] - (3.0 * TAU / 8.0).sin()).abs() < EPS);
    }

    #[test]
    fn test_continuity_across_blocks() {
        let mut osc = SineOscillator::new();
        let sample_rate = 48000.0;
        let frequency = 60.0;
        let omega = TAU * frequency / sample_rate;

        let mut theta0 = osc.phase();
        for _ in 0..8 {
            let mut out = [0.0f32; 128];
            osc.process_block(&mut out, &[frequency], &[0.0], &[1.0], sample_rate)
                .unwrap();
            for (k, sample) in out.iter().enumerate() {
                let expected = (theta0 + omega * k as f32).sin();
                assert!((sample - expected).abs() < 1e-4);
            }
            theta0 = osc.phase();
        }
    }

    #[test]
    fn test_phase_offset_does_not_accumulate() {
        let mut with_offset = SineOscillator::new();
        let mut without = SineOscillator::new();
        let mut a = [0.0f32; 64];
        let mut b = [0.0f32; 64];

        with_offset
            .process_block(&mut a, &[60.0], &[std::f32::consts::PI], &[1.0], 48000.0)
            .unwrap();
        without
            .process_block(&mut b, &[60.0], &[0.0], &[1.0], 48000.0)
            .unwrap();

        assert_eq!(with_offset.phase(), without.phase());
        // Offset of π inverts the signal
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x + y).abs() < EPS);
        }
    }

    #[test]
    fn test_zero_gain_is_silent() {
        let mut osc = SineOscillator::with_phase(1.0);
        let mut out = [1.0f32; 128];
        osc.process_block(&mut out, &[137.0], &[2.0], &[0.0], 44100.0)
            .unwrap();
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_deterministic() {
        let freq: Vec<f32> = (0..64).map(|i| 20.0 + i as f32 * 2.0).collect();
        let mut a = SineOscillator::with_phase(0.3);
        let mut b = SineOscillator::with_phase(0.3);
        let mut out_a = [0.0f32; 64];
        let mut out_b = [0.0f32; 64];

        a.process_block(&mut out_a, &freq, &[0.5], &[0.7], 44100.0)
            .unwrap();
        b.process_block(&mut out_b, &freq, &[0.5], &[0.7], 44100.0)
            .unwrap();

        assert_eq!(out_a, out_b);
        assert_eq!(a.phase(), b.phase());
    }

    #[test]
    fn test_rejects_bad_param_length() {
        let mut osc = SineOscillator::with_phase(0.5);
        let mut out = [0.25f32; 8];
        let err = osc
            .process_block(&mut out, &[60.0; 3], &[0.0], &[1.0], 48000.0)
            .unwrap_err();

        assert_eq!(
            err,
            ProcessError::ParamLength {
                param: "targetFrequency",
                len: 3,
                block: 8
            }
        );
        // Nothing touched
        assert!(out.iter().all(|s| *s == 0.25));
        assert_eq!(osc.phase(), 0.5);
    }

    #[test]
    fn test_rejects_empty_param() {
        let mut osc = SineOscillator::new();
        let mut out = [0.0f32; 8];
        let result = osc.process_block(&mut out, &[60.0], &[0.0], &[], 48000.0);
        assert!(matches!(
            result,
            Err(ProcessError::ParamLength { param: "gain", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_sample_rate() {
        let mut osc = SineOscillator::new();
        let mut out = [0.0f32; 8];
        for rate in [0.0, -44100.0, f32::NAN, f32::INFINITY] {
            let result = osc.process_block(&mut out, &[60.0], &[0.0], &[1.0], rate);
            assert!(matches!(result, Err(ProcessError::InvalidSampleRate(_))));
        }
        assert_eq!(osc.phase(), 0.0);
    }

    #[test]
    fn test_wrap_phase() {
        assert_eq!(wrap_phase(0.0), 0.0);
        assert!((wrap_phase(TAU + 0.5) - 0.5).abs() < EPS);
        assert!((wrap_phase(-0.5) - (TAU - 0.5)).abs() < EPS);
        assert!((wrap_phase(5.0 * TAU + 1.0) - 1.0).abs() < 1e-4);
        assert_eq!(wrap_phase(TAU), 0.0);
    }
}
