use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::audio::engine::{EngineSettings, MAX_BLOCK_SIZE, OutputRouting};
use crate::audio::parameters::{OscillatorParameters, ParamId};
use crate::midi::message::CcMap;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InverterConfig {
    #[serde(default)]
    pub devices: DeviceConfig,

    #[serde(default)]
    pub oscillator: OscillatorConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub control: ControlConfig,
}

impl InverterConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: InverterConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.oscillator
            .validate()
            .context("Invalid oscillator configuration")?;
        self.engine.validate().context("Invalid engine configuration")?;
        self.control.validate().context("Invalid control configuration")?;
        Ok(())
    }

    /// Shared parameter store seeded with the configured start values
    pub fn parameters(&self) -> OscillatorParameters {
        OscillatorParameters::with_values(
            self.oscillator.frequency,
            self.oscillator.phase,
            self.oscillator.gain,
        )
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            block_size: self.engine.blocksize,
            smoothing_seconds: self.engine.smoothing,
            output: self.oscillator.output_routing(),
        }
    }
}

/// Device configuration
/// Either may be a device index or a case-insensitive name substring
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeviceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audioout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midiin: Option<String>,
}

/// Oscillator start values and output routing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OscillatorConfig {
    #[serde(default = "default_frequency")]
    pub frequency: f32,

    #[serde(default = "default_phase")]
    pub phase: f32,

    #[serde(default = "default_gain")]
    pub gain: f32,

    #[serde(default)]
    pub audioch: AudioChannelSpec,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            phase: default_phase(),
            gain: default_gain(),
            audioch: AudioChannelSpec::default(),
        }
    }
}

impl OscillatorConfig {
    pub fn validate(&self) -> Result<()> {
        let values = [
            (ParamId::TargetFrequency, self.frequency, "frequency"),
            (ParamId::PhaseOffset, self.phase, "phase"),
            (ParamId::Gain, self.gain, "gain"),
        ];
        for (id, value, key) in values {
            let d = id.descriptor();
            if !d.contains(value) {
                return Err(anyhow!(
                    "{} must be between {} and {}, got {}",
                    key,
                    d.min_value,
                    d.max_value,
                    value
                ));
            }
        }

        // Validate audio channel (1-indexed, must be >= 1)
        if let AudioChannelSpec::Channel(ch) = self.audioch {
            if ch < 1 {
                return Err(anyhow!("Audio channel must be >= 1 (channels are 1-indexed)"));
            }
        }
        if let AudioChannelSpec::All(word) = &self.audioch {
            if !word.eq_ignore_ascii_case("all") {
                return Err(anyhow!("Audio channel must be a number or \"all\", got \"{}\"", word));
            }
        }

        Ok(())
    }

    /// Convert the 1-indexed channel spec to engine routing
    pub fn output_routing(&self) -> OutputRouting {
        match &self.audioch {
            AudioChannelSpec::Channel(ch) => OutputRouting::Channel(ch.saturating_sub(1)),
            AudioChannelSpec::All(_) => OutputRouting::All,
        }
    }
}

/// Block size and parameter smoothing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default = "default_blocksize")]
    pub blocksize: usize,

    /// Parameter glide time in seconds
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            blocksize: default_blocksize(),
            smoothing: default_smoothing(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.blocksize < 1 || self.blocksize > MAX_BLOCK_SIZE {
            return Err(anyhow!("Block size must be between 1 and {}", MAX_BLOCK_SIZE));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(anyhow!("Smoothing must be between 0.0 and 1.0 seconds"));
        }
        Ok(())
    }
}

/// MIDI control mapping
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ControlConfig {
    #[serde(default)]
    pub midich: MidiChannelSpec,

    #[serde(default)]
    pub cc: CcConfig,
}

impl ControlConfig {
    pub fn validate(&self) -> Result<()> {
        // Validate MIDI channel (1-16)
        match &self.midich {
            MidiChannelSpec::Channel(ch) => {
                if *ch < 1 || *ch > 16 {
                    return Err(anyhow!("MIDI channel must be between 1 and 16"));
                }
            }
            MidiChannelSpec::Omni(word) => {
                let word = word.to_lowercase();
                if word != "omni" && word != "all" {
                    return Err(anyhow!("MIDI channel must be 1-16, \"omni\" or \"all\""));
                }
            }
        }

        self.cc.validate()
    }

    /// Get the MIDI channel filter value (0-15 for specific channel, 255 for omni)
    pub fn midi_channel_filter(&self) -> u8 {
        match &self.midich {
            MidiChannelSpec::Channel(ch) => ch.saturating_sub(1), // Convert 1-16 to 0-15
            MidiChannelSpec::Omni(_) => 255,                      // Omni mode
        }
    }
}

/// Controller numbers steering each parameter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CcConfig {
    #[serde(default = "default_cc_frequency")]
    pub frequency: u8,

    #[serde(default = "default_cc_phase")]
    pub phase: u8,

    #[serde(default = "default_cc_gain")]
    pub gain: u8,
}

impl Default for CcConfig {
    fn default() -> Self {
        Self {
            frequency: default_cc_frequency(),
            phase: default_cc_phase(),
            gain: default_cc_gain(),
        }
    }
}

impl CcConfig {
    pub fn validate(&self) -> Result<()> {
        // 120-127 are channel mode messages
        for cc in [self.frequency, self.phase, self.gain] {
            if cc > 119 {
                return Err(anyhow!("Controller numbers must be between 0 and 119, got {}", cc));
            }
        }
        if self.frequency == self.phase || self.frequency == self.gain || self.phase == self.gain {
            return Err(anyhow!("Each parameter needs its own controller number"));
        }
        Ok(())
    }

    pub fn cc_map(&self) -> CcMap {
        CcMap::new(self.frequency, self.phase, self.gain)
    }
}

/// Output channel specification - either a specific channel (1-indexed) or all
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AudioChannelSpec {
    Channel(usize),
    All(String), // "all"
}

impl Default for AudioChannelSpec {
    fn default() -> Self {
        AudioChannelSpec::All("all".to_string())
    }
}

/// MIDI channel specification - either a specific channel (1-16) or omni
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MidiChannelSpec {
    Channel(u8),
    Omni(String), // "omni" or "all"
}

impl Default for MidiChannelSpec {
    fn default() -> Self {
        MidiChannelSpec::Omni("omni".to_string())
    }
}

// Default value functions for serde
fn default_frequency() -> f32 {
    ParamId::TargetFrequency.descriptor().default_value
}

fn default_phase() -> f32 {
    ParamId::PhaseOffset.descriptor().default_value
}

fn default_gain() -> f32 {
    ParamId::Gain.descriptor().default_value
}

fn default_blocksize() -> usize {
    128
}

fn default_smoothing() -> f32 {
    0.005
}

fn default_cc_frequency() -> u8 {
    74
}

fn default_cc_phase() -> u8 {
    71
}

fn default_cc_gain() -> u8 {
    7
}
