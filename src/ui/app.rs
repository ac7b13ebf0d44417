use std::sync::Arc;

use crate::audio::engine::EngineStatus;
use crate::audio::parameters::{OscillatorParameters, ParamId};

/// Fraction of a parameter's range moved by one fine step
const FINE_STEP: f32 = 0.01;
/// Fraction of a parameter's range moved by one coarse step
const COARSE_STEP: f32 = 0.1;

/// UI application state
pub struct App {
    /// Output device name shown in the title
    pub device_name: String,
    pub sample_rate: f32,
    /// Values as last read from the shared parameters
    pub frequency: f32,
    pub phase_offset: f32,
    pub gain: f32,
    /// Currently selected parameter for editing
    pub selected_param: ParamId,
    /// Most recent meter snapshot from the audio thread
    pub status: Option<EngineStatus>,
    /// Whether to quit the application
    pub should_quit: bool,
    /// Reference to shared parameters
    pub parameters: Arc<OscillatorParameters>,
}

impl App {
    pub fn new(parameters: Arc<OscillatorParameters>, device_name: String, sample_rate: f32) -> Self {
        let mut app = Self {
            device_name,
            sample_rate,
            frequency: 0.0,
            phase_offset: 0.0,
            gain: 0.0,
            selected_param: ParamId::TargetFrequency,
            status: None,
            should_quit: false,
            parameters,
        };
        app.sync_from_audio();
        app
    }

    pub fn value(&self, id: ParamId) -> f32 {
        match id {
            ParamId::TargetFrequency => self.frequency,
            ParamId::PhaseOffset => self.phase_offset,
            ParamId::Gain => self.gain,
        }
    }

    /// Cycle to next parameter
    pub fn next_parameter(&mut self) {
        self.selected_param = match self.selected_param {
            ParamId::TargetFrequency => ParamId::PhaseOffset,
            ParamId::PhaseOffset => ParamId::Gain,
            ParamId::Gain => ParamId::TargetFrequency,
        };
    }

    /// Cycle to previous parameter
    pub fn prev_parameter(&mut self) {
        self.selected_param = match self.selected_param {
            ParamId::TargetFrequency => ParamId::Gain,
            ParamId::PhaseOffset => ParamId::TargetFrequency,
            ParamId::Gain => ParamId::PhaseOffset,
        };
    }

    pub fn increase_value(&mut self, coarse: bool) {
        self.nudge(if coarse { COARSE_STEP } else { FINE_STEP });
    }

    pub fn decrease_value(&mut self, coarse: bool) {
        self.nudge(if coarse { -COARSE_STEP } else { -FINE_STEP });
    }

    fn nudge(&mut self, fraction: f32) {
        let id = self.selected_param;
        let d = id.descriptor();
        let value = self.value(id) + fraction * (d.max_value - d.min_value);
        // Shared store clamps
        self.parameters.set(id, value);
        self.sync_from_audio();
    }

    /// Restore every parameter to its default
    pub fn reset(&mut self) {
        self.parameters.reset();
        self.sync_from_audio();
    }

    /// Pull current values so MIDI changes show up
    pub fn sync_from_audio(&mut self) {
        self.frequency = self.parameters.get(ParamId::TargetFrequency);
        self.phase_offset = self.parameters.get(ParamId::PhaseOffset);
        self.gain = self.parameters.get(ParamId::Gain);
    }

    pub fn update_status(&mut self, status: EngineStatus) {
        self.status = Some(status);
    }

    /// Mark app for quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Arc::new(OscillatorParameters::new()), "test".to_string(), 48000.0)
    }

    #[test]
    fn test_starts_from_shared_values() {
        let app = app();
        assert_eq!(app.frequency, 60.0);
        assert_eq!(app.gain, 0.7);
        assert_eq!(app.selected_param, ParamId::TargetFrequency);
    }

    #[test]
    fn test_parameter_cycle() {
        let mut app = app();
        app.next_parameter();
        assert_eq!(app.selected_param, ParamId::PhaseOffset);
        app.next_parameter();
        app.next_parameter();
        assert_eq!(app.selected_param, ParamId::TargetFrequency);
        app.prev_parameter();
        assert_eq!(app.selected_param, ParamId::Gain);
    }

    #[test]
    fn test_adjust_writes_through_and_clamps() {
        let mut app = app();
        app.increase_value(false);
        // 1% of 180 Hz
        assert!((app.frequency - 61.8).abs() < 1e-3);
        assert_eq!(app.parameters.get(ParamId::TargetFrequency), app.frequency);

        for _ in 0..20 {
            app.increase_value(true);
        }
        assert_eq!(app.frequency, 200.0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut app = app();
        app.selected_param = ParamId::Gain;
        app.decrease_value(true);
        assert!(app.gain < 0.7);
        app.reset();
        assert_eq!(app.gain, 0.7);
    }

    #[test]
    fn test_sees_external_changes() {
        let mut app = app();
        app.parameters.set(ParamId::Gain, 0.1);
        app.sync_from_audio();
        assert_eq!(app.gain, 0.1);
    }
}
