use std::f32::consts::{PI, TAU};
use std::sync::atomic::{AtomicU32, Ordering};

/// Oscillator control parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    TargetFrequency,
    PhaseOffset,
    Gain,
}

impl ParamId {
    pub const ALL: [ParamId; 3] = [ParamId::TargetFrequency, ParamId::PhaseOffset, ParamId::Gain];

    fn index(self) -> usize {
        match self {
            ParamId::TargetFrequency => 0,
            ParamId::PhaseOffset => 1,
            ParamId::Gain => 2,
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn descriptor(self) -> &'static ParamDescriptor {
        &PARAMETER_DESCRIPTORS[self.index()]
    }
}

/// Name, default and range for one parameter
/// The oscillator itself never clamps; this is what the control side clamps against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub default_value: f32,
    pub min_value: f32,
    pub max_value: f32,
}

pub const PARAMETER_DESCRIPTORS: [ParamDescriptor; 3] = [
    ParamDescriptor {
        name: "targetFrequency",
        default_value: 60.0,
        min_value: 20.0,
        max_value: 200.0,
    },
    ParamDescriptor {
        name: "phaseOffset",
        default_value: PI,
        min_value: 0.0,
        max_value: TAU,
    },
    ParamDescriptor {
        name: "gain",
        default_value: 0.7,
        min_value: 0.0,
        max_value: 1.0,
    },
];

impl ParamDescriptor {
    /// Clamp into [min, max]; NaN falls back to the default
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default_value
        } else {
            value.clamp(self.min_value, self.max_value)
        }
    }

    /// Map a value to 0.0..=1.0 across the range
    pub fn normalize(&self, value: f32) -> f32 {
        ((self.clamp(value) - self.min_value) / (self.max_value - self.min_value)).clamp(0.0, 1.0)
    }

    /// Map 0.0..=1.0 back onto the range
    pub fn denormalize(&self, ratio: f32) -> f32 {
        let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        self.min_value + ratio * (self.max_value - self.min_value)
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min_value..=self.max_value).contains(&value)
    }
}

/// Thread-safe parameter storage using atomic operations
/// Written by the UI and MIDI threads, read once per callback by the audio thread
pub struct OscillatorParameters {
    values: [AtomicF32; 3],
}

impl OscillatorParameters {
    pub fn new() -> Self {
        Self {
            values: PARAMETER_DESCRIPTORS.map(|d| AtomicF32::new(d.default_value)),
        }
    }

    /// Build with explicit starting values (clamped)
    pub fn with_values(frequency: f32, phase_offset: f32, gain: f32) -> Self {
        let params = Self::new();
        params.set(ParamId::TargetFrequency, frequency);
        params.set(ParamId::PhaseOffset, phase_offset);
        params.set(ParamId::Gain, gain);
        params
    }

    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()].load(Ordering::Relaxed)
    }

    /// Store a value, clamped to the parameter's range
    pub fn set(&self, id: ParamId, value: f32) {
        let clamped = id.descriptor().clamp(value);
        self.values[id.index()].store(clamped, Ordering::Relaxed);
    }

    /// Restore every parameter to its default
    pub fn reset(&self) {
        for id in ParamId::ALL {
            self.set(id, id.descriptor().default_value);
        }
    }
}

impl Default for OscillatorParameters {
    fn default() -> Self {
        Self::new()
    }
}

/// Atomic f32 wrapper for lock-free parameter updates
pub struct AtomicF32 {
    storage: AtomicU32,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            storage: AtomicU32::new(value.to_bits()),
        }
    }

    pub fn load(&self, ordering: Ordering) -> f32 {
        f32::from_bits(self.storage.load(ordering))
    }

    pub fn store(&self, value: f32, ordering: Ordering) {
        self.storage.store(value.to_bits(), ordering);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_table() {
        let freq = ParamId::TargetFrequency.descriptor();
        assert_eq!(freq.name, "targetFrequency");
        assert_eq!((freq.default_value, freq.min_value, freq.max_value), (60.0, 20.0, 200.0));

        let phase = ParamId::PhaseOffset.descriptor();
        assert_eq!(phase.name, "phaseOffset");
        assert_eq!((phase.default_value, phase.min_value, phase.max_value), (PI, 0.0, TAU));

        let gain = ParamId::Gain.descriptor();
        assert_eq!(gain.name, "gain");
        assert_eq!((gain.default_value, gain.min_value, gain.max_value), (0.7, 0.0, 1.0));
    }

    #[test]
    fn test_clamp() {
        let freq = ParamId::TargetFrequency.descriptor();
        assert_eq!(freq.clamp(5.0), 20.0);
        assert_eq!(freq.clamp(500.0), 200.0);
        assert_eq!(freq.clamp(100.0), 100.0);
        assert_eq!(freq.clamp(f32::NAN), 60.0);
    }

    #[test]
    fn test_normalize_round_trip() {
        let gain = ParamId::Gain.descriptor();
        assert_eq!(gain.normalize(0.25), 0.25);

        let freq = ParamId::TargetFrequency.descriptor();
        assert_eq!(freq.normalize(20.0), 0.0);
        assert_eq!(freq.normalize(200.0), 1.0);
        assert!((freq.denormalize(0.5) - 110.0).abs() < 1e-4);
        assert_eq!(freq.denormalize(2.0), 200.0);
    }

    #[test]
    fn test_parameters_start_at_defaults() {
        let params = OscillatorParameters::new();
        assert_eq!(params.get(ParamId::TargetFrequency), 60.0);
        assert_eq!(params.get(ParamId::PhaseOffset), PI);
        assert_eq!(params.get(ParamId::Gain), 0.7);
    }

    #[test]
    fn test_set_clamps() {
        let params = OscillatorParameters::new();
        params.set(ParamId::Gain, 1.5);
        assert_eq!(params.get(ParamId::Gain), 1.0);
        params.set(ParamId::TargetFrequency, -3.0);
        assert_eq!(params.get(ParamId::TargetFrequency), 20.0);
    }

    #[test]
    fn test_reset() {
        let params = OscillatorParameters::with_values(150.0, 1.0, 0.2);
        assert_eq!(params.get(ParamId::TargetFrequency), 150.0);
        params.reset();
        assert_eq!(params.get(ParamId::TargetFrequency), 60.0);
        assert_eq!(params.get(ParamId::PhaseOffset), PI);
        assert_eq!(params.get(ParamId::Gain), 0.7);
    }

    #[test]
    fn test_atomic_f32() {
        let value = AtomicF32::new(0.5);
        assert_eq!(value.load(Ordering::Relaxed), 0.5);
        value.store(-1.25, Ordering::Relaxed);
        assert_eq!(value.load(Ordering::Relaxed), -1.25);
    }
}
