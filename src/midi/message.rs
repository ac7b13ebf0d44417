use crate::audio::parameters::ParamId;

/// MIDI message types we care about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiMessage {
    ControlChange { channel: u8, controller: u8, value: u8 },
    Unknown,
}

/// Controller number assigned to each parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcMap {
    frequency: u8,
    phase: u8,
    gain: u8,
}

impl CcMap {
    pub fn new(frequency: u8, phase: u8, gain: u8) -> Self {
        Self {
            frequency,
            phase,
            gain,
        }
    }

    /// Parameter steered by a controller, if any
    pub fn param_for(&self, controller: u8) -> Option<ParamId> {
        if controller == self.frequency {
            Some(ParamId::TargetFrequency)
        } else if controller == self.phase {
            Some(ParamId::PhaseOffset)
        } else if controller == self.gain {
            Some(ParamId::Gain)
        } else {
            None
        }
    }
}

impl MidiMessage {
    /// Parse raw MIDI bytes into a message
    /// Handles standard MIDI protocol: [status, data1, data2]
    pub fn parse(bytes: &[u8]) -> Self {
        if bytes.len() < 3 {
            return MidiMessage::Unknown;
        }

        let status = bytes[0];
        let message_type = status & 0xF0;
        let channel = status & 0x0F;

        match message_type {
            0xB0 => MidiMessage::ControlChange {
                channel,
                controller: bytes[1] & 0x7F,
                value: bytes[2] & 0x7F,
            },
            _ => MidiMessage::Unknown,
        }
    }

    /// Convert to a parameter change scaled across the parameter's range
    /// Filters by MIDI channel: 255 = omni (all channels), 0-15 = specific channel
    pub fn to_param_change(&self, channel_filter: u8, map: &CcMap) -> Option<(ParamId, f32)> {
        match self {
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => {
                if channel_filter != 255 && *channel != channel_filter {
                    return None;
                }
                let param = map.param_for(*controller)?;
                let ratio = *value as f32 / 127.0;
                Some((param, param.descriptor().denormalize(ratio)))
            }
            MidiMessage::Unknown => None,
        }
    }
}
