use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use super::app::App;
use crate::audio::parameters::ParamId;

/// Render the TUI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title
            Constraint::Length(5),  // Parameter controls
            Constraint::Length(15), // Oscilloscope (13 lines + 2 borders)
            Constraint::Length(3),  // Level meter
            Constraint::Length(3),  // Status line
            Constraint::Length(4),  // Help text (fixed height)
        ])
        .split(frame.size());

    render_title(frame, chunks[0], app);
    render_parameters(frame, chunks[1], app);
    render_oscilloscope(frame, chunks[2], app);
    render_level_meter(frame, chunks[3], app);
    render_status(frame, chunks[4], app);
    render_help(frame, chunks[5]);
}

/// Render title bar
fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let text = format!("Inverter - {} @ {} Hz", app.device_name, app.sample_rate);
    let title = Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(title, area);
}

/// Render the three parameter gauges
fn render_parameters(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title("Oscillator")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let param_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(inner);

    for (id, area) in ParamId::ALL.into_iter().zip(param_chunks.iter()) {
        render_parameter(frame, *area, app, id);
    }
}

/// Render a single parameter with gauge
fn render_parameter(frame: &mut Frame, area: Rect, app: &App, id: ParamId) {
    let value = app.value(id);
    let selected = app.selected_param == id;
    let ratio = id.descriptor().normalize(value);

    let color = if selected { Color::Yellow } else { Color::Green };
    let style = if selected {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };

    let label = match id {
        ParamId::TargetFrequency => format!("Freq: {:.1} Hz", value),
        ParamId::PhaseOffset => format!("Phase: {:.3} rad", value),
        ParamId::Gain => format!("Gain: {:.2}", value),
    };

    let gauge = Gauge::default()
        .block(Block::default())
        .gauge_style(style)
        .label(label)
        .ratio(ratio as f64);

    frame.render_widget(gauge, area);
}

/// Render oscilloscope waveform visualization
/// 13 lines: Line 7 = 0V, Lines 1-6 = positive, Lines 8-13 = negative
fn render_oscilloscope(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title("Oscilloscope")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(status) = &app.status else {
        return;
    };
    let samples = &status.scope;

    let width = inner.width as usize;
    const HEIGHT: usize = 13; // Fixed 13 lines

    if width == 0 {
        return;
    }

    let mut grid = vec![vec![' '; width]; HEIGHT];

    // Downsample audio samples to fit width
    let step = if samples.len() >= width {
        samples.len() as f32 / width as f32
    } else {
        1.0
    };

    let sample_count = width.min(samples.len());

    for x in 0..sample_count {
        let sample_idx = (x as f32 * step) as usize;

        if sample_idx >= samples.len() {
            break;
        }

        // Map sample from -1.0..1.0 to line 0..12 (inverted for display)
        let line = ((1.0 - samples[sample_idx]) * 6.0).clamp(0.0, 12.0).round() as usize;
        grid[line][x] = '.';
    }

    let lines: Vec<Line> = grid
        .iter()
        .map(|row| {
            let text: String = row.iter().collect();
            Line::from(Span::styled(text, Style::default().fg(Color::Green)))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render output peak level
fn render_level_meter(frame: &mut Frame, area: Rect, app: &App) {
    let peak = app.status.map(|s| s.peak).unwrap_or(0.0).clamp(0.0, 1.0);

    let gauge = Gauge::default()
        .block(Block::default().title("Level").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .label(format!("Peak: {:.2}", peak))
        .ratio(peak as f64);

    frame.render_widget(gauge, area);
}

/// Render live engine values
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let text = match &app.status {
        Some(status) => {
            let line = format!(
                "Phase: {:.3} rad  |  Freq: {:.1} Hz  |  Offset: {:.3}  |  Gain: {:.2}{}  |  Errors: {}",
                status.phase,
                status.frequency,
                status.phase_offset,
                status.gain,
                if status.gliding { "  ~" } else { "" },
                status.errors
            );
            let style = if status.errors > 0 {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(line, style))
        }
        None => Line::from("Waiting for audio..."),
    };

    let paragraph = Paragraph::new(text)
        .block(Block::default().title("Engine").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Render help text
fn render_help(frame: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from("Controls:"),
        Line::from("  ←/→: Select  |  ↑/↓: Fine  |  Shift+J/K: Coarse  |  R: Reset  |  Q/Esc: Quit"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));

    frame.render_widget(paragraph, area);
}
