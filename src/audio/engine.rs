use crossbeam_channel::Sender;
use std::f32::consts::TAU;
use std::sync::Arc;

use super::automation::ParamRamp;
use super::parameters::{OscillatorParameters, ParamId};
use crate::dsp::oscillator::SineOscillator;

/// Number of samples in each scope snapshot sent to the UI
pub const SCOPE_LEN: usize = 256;

/// Largest block the engine will hand the oscillator
pub const MAX_BLOCK_SIZE: usize = 4096;

/// Which interleaved output channels carry the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRouting {
    /// 0-indexed channel
    Channel(usize),
    All,
}

impl OutputRouting {
    fn carries(&self, channel: usize) -> bool {
        match self {
            OutputRouting::Channel(ch) => *ch == channel,
            OutputRouting::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Frames per oscillator block
    pub block_size: usize,
    /// Glide time for parameter changes in seconds
    pub smoothing_seconds: f32,
    pub output: OutputRouting,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            block_size: 128,
            smoothing_seconds: 0.005,
            output: OutputRouting::All,
        }
    }
}

/// Meter snapshot published from the audio thread
/// Fixed size so it can be built without allocating
#[derive(Debug, Clone, Copy)]
pub struct EngineStatus {
    pub peak: f32,
    pub phase: f32,
    pub frequency: f32,
    pub phase_offset: f32,
    pub gain: f32,
    /// Any parameter still gliding towards its target
    pub gliding: bool,
    pub errors: u64,
    pub scope: [f32; SCOPE_LEN],
}

/// Audio-thread host around one oscillator
/// Runs in real-time audio thread - must be lock-free and allocation-free
pub struct InverterEngine {
    oscillator: SineOscillator,
    sample_rate: f32,
    block_size: usize,
    output: OutputRouting,
    parameters: Arc<OscillatorParameters>,
    frequency: ParamRamp,
    phase_offset: ParamRamp,
    gain: ParamRamp,
    block: Vec<f32>,
    status_tx: Option<Sender<EngineStatus>>,
    status_interval: usize,
    frames_since_status: usize,
    peak: f32,
    errors: u64,
    scope: [f32; SCOPE_LEN],
    scope_pos: usize,
}

impl InverterEngine {
    pub fn new(
        sample_rate: f32,
        settings: EngineSettings,
        parameters: Arc<OscillatorParameters>,
        status_tx: Option<Sender<EngineStatus>>,
    ) -> Self {
        let block_size = settings.block_size.clamp(1, MAX_BLOCK_SIZE);
        let ramp_samples = (settings.smoothing_seconds.max(0.0) * sample_rate).round() as usize;

        let ramp = |id: ParamId| ParamRamp::new(parameters.get(id), ramp_samples, block_size);
        let frequency = ramp(ParamId::TargetFrequency);
        let gain = ramp(ParamId::Gain);
        let phase_offset = ParamRamp::circular(
            parameters.get(ParamId::PhaseOffset),
            ramp_samples,
            block_size,
            TAU,
        );

        Self {
            oscillator: SineOscillator::new(),
            sample_rate,
            block_size,
            output: settings.output,
            parameters,
            frequency,
            phase_offset,
            gain,
            block: vec![0.0; block_size],
            status_tx,
            // ~20 snapshots per second
            status_interval: ((sample_rate / 20.0) as usize).max(1),
            frames_since_status: 0,
            peak: 0.0,
            errors: 0,
            scope: [0.0; SCOPE_LEN],
            scope_pos: 0,
        }
    }

    /// Current oscillator phase in radians
    pub fn phase(&self) -> f32 {
        self.oscillator.phase()
    }

    /// Number of blocks rejected by the oscillator so far
    pub fn error_count(&self) -> u64 {
        self.errors
    }

    /// Fill an interleaved output buffer
    pub fn process(&mut self, output: &mut [f32], num_channels: usize) {
        if num_channels == 0 {
            return;
        }

        // Parameters arrive pre-clamped from the control side
        self.frequency.set_target(self.parameters.get(ParamId::TargetFrequency));
        self.phase_offset.set_target(self.parameters.get(ParamId::PhaseOffset));
        self.gain.set_target(self.parameters.get(ParamId::Gain));

        for frame_chunk in output.chunks_mut(self.block_size * num_channels) {
            let frames = frame_chunk.len() / num_channels;
            let block = &mut self.block[..frames];

            let result = self.oscillator.process_block(
                block,
                self.frequency.next_block(frames),
                self.phase_offset.next_block(frames),
                self.gain.next_block(frames),
                self.sample_rate,
            );
            if result.is_err() {
                // Never panic on the audio thread; count and go quiet
                self.errors += 1;
                block.fill(0.0);
            }

            for (frame, sample) in frame_chunk.chunks_mut(num_channels).zip(block.iter()) {
                for (channel, out) in frame.iter_mut().enumerate() {
                    *out = if self.output.carries(channel) { *sample } else { 0.0 };
                }
            }

            for sample in block.iter() {
                self.peak = self.peak.max(sample.abs());
                self.scope[self.scope_pos] = *sample;
                self.scope_pos = (self.scope_pos + 1) % SCOPE_LEN;
            }
            self.frames_since_status += frames;
        }

        if self.frames_since_status >= self.status_interval {
            self.publish_status();
        }
    }

    fn publish_status(&mut self) {
        if let Some(tx) = &self.status_tx {
            // Unroll the ring so the snapshot reads oldest to newest
            let mut scope = [0.0; SCOPE_LEN];
            let (newer, older) = self.scope.split_at(self.scope_pos);
            scope[..older.len()].copy_from_slice(older);
            scope[older.len()..].copy_from_slice(newer);

            let status = EngineStatus {
                peak: self.peak,
                phase: self.phase(),
                frequency: self.frequency.current(),
                phase_offset: self.phase_offset.current(),
                gain: self.gain.current(),
                gliding: self.frequency.is_ramping()
                    || self.phase_offset.is_ramping()
                    || self.gain.is_ramping(),
                errors: self.error_count(),
                scope,
            };
            // Drop the snapshot if the UI is behind
            let _ = tx.try_send(status);
        }

        self.peak = 0.0;
        self.frames_since_status = 0;
    }
}
