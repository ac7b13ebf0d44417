mod audio;
mod config;
mod dsp;
mod logging;
mod midi;
mod ui;

use anyhow::{anyhow, Result};
use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Receiver;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use audio::engine::{EngineSettings, EngineStatus, InverterEngine, MAX_BLOCK_SIZE};
use audio::parameters::ParamId;
use config::InverterConfig;
use logging::LogTarget;
use midi::handler::MidiHandler;
use ui::{app::App, events, render};

/// Continuous sine source with live frequency, phase and gain control
#[derive(Parser, Debug)]
#[command(name = "inverter")]
#[command(about = "Phase-continuous sine oscillator", long_about = None)]
struct Args {
    /// Configuration file (YAML); built-in defaults when omitted
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// List available devices and exit
    #[arg(short = 'l', long = "list")]
    list_devices: bool,

    /// Play for this many seconds without the terminal UI
    #[arg(long = "headless", value_name = "SECONDS")]
    headless: Option<f32>,

    /// Append log output to this file
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// List available audio output devices
fn list_audio_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();

    let devices = label_devices(
        host.output_devices()?
            .map(|device| device.description().map(|desc| desc.name().to_string())),
    );

    if devices.is_empty() {
        return Err(anyhow!("No audio output devices found"));
    }

    Ok(devices)
}

/// One label per enumerated device, so list positions match enumeration order
/// Devices whose name cannot be read keep their slot under a placeholder.
fn label_devices<E>(names: impl Iterator<Item = Result<String, E>>) -> Vec<String> {
    names
        .enumerate()
        .map(|(i, name)| name.unwrap_or_else(|_| format!("Unknown device {}", i)))
        .collect()
}

/// Convert the --headless argument, rejecting negative, non-finite and oversized values
fn headless_duration(seconds: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(seconds)
        .map_err(|e| anyhow!("Invalid --headless duration {}: {}", seconds, e))
}

/// Find device index by name or index string
fn find_device(kind: &str, devices: &[String], search: &str) -> Result<usize> {
    // Try to parse as index first
    if let Ok(index) = search.parse::<usize>() {
        if index < devices.len() {
            return Ok(index);
        }
        return Err(anyhow!(
            "{} device index {} out of range ({} available)",
            kind,
            index,
            devices.len()
        ));
    }

    // Search by name (case-insensitive substring match)
    let search_lower = search.to_lowercase();
    devices
        .iter()
        .position(|device| device.to_lowercase().contains(&search_lower))
        .ok_or_else(|| anyhow!("{} device '{}' not found", kind, search))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_target = match (&args.log_file, args.headless) {
        (Some(path), _) => LogTarget::File(path),
        (None, Some(_)) => LogTarget::Stderr,
        (None, None) => LogTarget::Off,
    };
    logging::init(log_target)?;

    if args.list_devices {
        return print_devices();
    }

    // Reject a bad duration before any device is opened
    if let Some(seconds) = args.headless {
        headless_duration(seconds)?;
    }

    let config = match &args.config {
        Some(path) => InverterConfig::load(path)?,
        None => InverterConfig::default(),
    };

    run(config, args.headless)
}

fn print_devices() -> Result<()> {
    let audio_devices = list_audio_devices()?;
    let midi_devices = MidiHandler::list_devices()?;

    println!("Available Audio Output Devices:");
    for (i, device) in audio_devices.iter().enumerate() {
        println!("  {}: {}", i, device);
    }
    println!("\nAvailable MIDI Input Devices:");
    for (i, device) in midi_devices.iter().enumerate() {
        println!("  {}: {}", i, device);
    }
    Ok(())
}

fn run(config: InverterConfig, headless: Option<f32>) -> Result<()> {
    let parameters = Arc::new(config.parameters());

    // Connect MIDI control if configured; dropped at the end of this function
    let _midi_handler = match &config.devices.midiin {
        Some(search) => {
            let midi_devices = MidiHandler::list_devices()?;
            let index = find_device("MIDI", &midi_devices, search)?;
            Some(MidiHandler::connect(
                index,
                config.control.midi_channel_filter(),
                config.control.cc.cc_map(),
                parameters.clone(),
            )?)
        }
        None => None,
    };

    let host = cpal::default_host();
    let device = match &config.devices.audioout {
        Some(search) => {
            let audio_devices = list_audio_devices()?;
            let index = find_device("Audio", &audio_devices, search)?;
            host.output_devices()?
                .nth(index)
                .ok_or_else(|| anyhow!("Selected audio device not available"))?
        }
        None => host
            .default_output_device()
            .ok_or_else(|| anyhow!("No default audio output device"))?,
    };
    let device_name = device
        .description()
        .map(|desc| desc.name().to_string())
        .unwrap_or_else(|_| "Unknown".to_string());

    let audio_config = device.default_output_config()?;
    let num_channels = audio_config.channels() as usize;
    let stream_config: cpal::StreamConfig = audio_config.clone().into();
    let sample_rate = stream_config.sample_rate as f32;

    info!(
        "Output: {} ({} ch @ {} Hz, {:?})",
        device_name,
        num_channels,
        sample_rate,
        audio_config.sample_format()
    );

    let settings = config.engine_settings();
    if let audio::engine::OutputRouting::Channel(ch) = settings.output {
        if ch >= num_channels {
            warn!(
                "Audio channel {} not present on a {}-channel device; output will be silent",
                ch + 1,
                num_channels
            );
        }
    }

    // Snapshots beyond this are dropped by the audio thread
    let (status_tx, status_rx) = crossbeam_channel::bounded::<EngineStatus>(8);
    let engine = InverterEngine::new(sample_rate, settings, parameters.clone(), Some(status_tx));

    let _stream = match audio_config.sample_format() {
        cpal::SampleFormat::F32 => {
            start_audio_stream::<f32>(&device, &stream_config, engine, num_channels, settings)?
        }
        cpal::SampleFormat::I16 => {
            start_audio_stream::<i16>(&device, &stream_config, engine, num_channels, settings)?
        }
        cpal::SampleFormat::U16 => {
            start_audio_stream::<u16>(&device, &stream_config, engine, num_channels, settings)?
        }
        other => return Err(anyhow!("Unsupported sample format: {:?}", other)),
    };

    match headless {
        Some(seconds) => run_headless(seconds, status_rx),
        None => {
            let mut app = App::new(parameters, device_name, sample_rate);
            run_ui(&mut app, status_rx)
        }
    }
}

/// Start audio stream driving the engine
fn start_audio_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut engine: InverterEngine,
    num_channels: usize,
    settings: EngineSettings,
) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>,
{
    // Pre-allocate buffer for processing
    let mut temp_buffer = vec![0.0f32; MAX_BLOCK_SIZE.max(settings.block_size) * num_channels];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            // Ensure temp buffer is large enough
            if temp_buffer.len() < data.len() {
                temp_buffer.resize(data.len(), 0.0);
            }
            let buffer = &mut temp_buffer[..data.len()];

            engine.process(buffer, num_channels);

            // Convert to output sample format
            for (out, sample) in data.iter_mut().zip(buffer.iter()) {
                *out = T::from_sample(*sample);
            }
        },
        |err| error!("Audio stream error: {}", err),
        None,
    )?;

    stream.play()?;

    Ok(stream)
}

/// Play without a UI, logging meter snapshots once a second
fn run_headless(seconds: f32, status_rx: Receiver<EngineStatus>) -> Result<()> {
    let duration = headless_duration(seconds)?;
    let started = Instant::now();
    let mut last_report = Instant::now();
    let mut latest: Option<EngineStatus> = None;

    info!("Playing for {:.1} s", seconds);

    while started.elapsed() < duration {
        while let Ok(status) = status_rx.try_recv() {
            latest = Some(status);
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            if let Some(status) = &latest {
                info!(
                    "{} {:.1} Hz | {} {:.3} | {} {:.2} | peak {:.3} | phase {:.3} | errors {}",
                    ParamId::TargetFrequency.name(),
                    status.frequency,
                    ParamId::PhaseOffset.name(),
                    status.phase_offset,
                    ParamId::Gain.name(),
                    status.gain,
                    status.peak,
                    status.phase,
                    status.errors
                );
            }
            last_report = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(50));
    }

    info!("Done");
    Ok(())
}

/// Run the terminal UI until the user quits
fn run_ui(app: &mut App, status_rx: Receiver<EngineStatus>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_ui_loop(&mut terminal, app, status_rx);

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    status_rx: Receiver<EngineStatus>,
) -> Result<()> {
    loop {
        // Update meters from audio thread
        while let Ok(status) = status_rx.try_recv() {
            app.update_status(status);
        }
        // Pick up MIDI-driven changes
        app.sync_from_audio();

        terminal.draw(|f| render::render(f, app))?;

        // Polls for up to ~16 ms, which also paces the loop
        events::handle_events(app)?;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
