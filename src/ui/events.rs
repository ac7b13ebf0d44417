use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use super::app::App;

/// Handle keyboard events and update app state
pub fn handle_events(app: &mut App) -> anyhow::Result<()> {
    // Poll for events with timeout
    if event::poll(Duration::from_millis(16))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key_event(app, key);
            }
        }
    }
    Ok(())
}

/// Process individual key press
fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Check for Ctrl+C
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        app.quit();
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Navigate parameters (vim-style: h=left, l=right)
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => app.next_parameter(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => app.prev_parameter(),

        // Adjust values (vim-style: k=up, j=down, shifted for coarse steps)
        KeyCode::Char('k') | KeyCode::Up => app.increase_value(false),
        KeyCode::Char('j') | KeyCode::Down => app.decrease_value(false),
        KeyCode::Char('K') | KeyCode::PageUp => app.increase_value(true),
        KeyCode::Char('J') | KeyCode::PageDown => app.decrease_value(true),

        KeyCode::Char('r') => app.reset(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::parameters::{OscillatorParameters, ParamId};
    use std::sync::Arc;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_key_bindings() {
        let mut app = App::new(Arc::new(OscillatorParameters::new()), "test".to_string(), 48000.0);

        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.selected_param, ParamId::PhaseOffset);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.selected_param, ParamId::Gain);

        press(&mut app, KeyCode::Char('J'));
        assert!((app.gain - 0.6).abs() < 1e-6);

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.gain, 0.7);

        assert!(!app.should_quit);
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
