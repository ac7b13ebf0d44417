use anyhow::{anyhow, Result};
use log::{debug, info};
use midir::{MidiInput, MidiInputConnection};
use std::sync::Arc;

use super::message::{CcMap, MidiMessage};
use crate::audio::parameters::OscillatorParameters;

/// MIDI input handler
/// Writes mapped control changes straight into the shared parameters
pub struct MidiHandler {
    _connection: MidiInputConnection<()>,
}

impl MidiHandler {
    /// Connect to the MIDI input at `device_index`
    pub fn connect(
        device_index: usize,
        channel_filter: u8,
        cc_map: CcMap,
        parameters: Arc<OscillatorParameters>,
    ) -> Result<Self> {
        let midi_in = MidiInput::new("inverter-input")?;
        let ports = midi_in.ports();

        let port = ports
            .get(device_index)
            .ok_or_else(|| anyhow!("MIDI device index {} not available", device_index))?;
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| "Unknown".to_string());

        info!("Connecting to MIDI input: {}", port_name);

        let connection = midi_in
            .connect(
                port,
                "inverter-input",
                move |_timestamp, bytes, _| {
                    let message = MidiMessage::parse(bytes);
                    if let Some((param, value)) = message.to_param_change(channel_filter, &cc_map) {
                        debug!("{} <- {:.3}", param.name(), value);
                        parameters.set(param, value);
                    }
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to connect to MIDI port: {}", e))?;

        Ok(Self {
            _connection: connection,
        })
    }

    /// List all available MIDI input devices
    pub fn list_devices() -> Result<Vec<String>> {
        let midi_in = MidiInput::new("inverter-list")?;
        let ports = midi_in.ports();

        let mut devices = Vec::new();
        for port in ports.iter() {
            if let Ok(name) = midi_in.port_name(port) {
                devices.push(name);
            }
        }

        Ok(devices)
    }
}
